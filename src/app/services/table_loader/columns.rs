//! Column checks and conversion to the canonical in-memory types

use crate::app::models::{
    Checker, ColumnArray, ColumnData, ColumnDescriptor, ScalarType, Shape, Unit,
};
use crate::app::services::fits_io::{RawColumn, RawData};
use std::collections::HashSet;
use tracing::trace;

/// Check the type, repeat count and unit of a column
///
/// `expected_repeat` is `None` when the cardinality depends on a wavelength
/// table that could not be resolved.
pub fn check_column(
    desc: &ColumnDescriptor,
    column: &RawColumn,
    expected_repeat: Option<usize>,
    checker: &mut Checker,
) {
    let found_code = column.code().as_char();
    let expected_code = desc.data_type.code();
    let repeat = column.repeat();

    match expected_repeat {
        Some(expected) => {
            let message = || {
                format!(
                    "Invalid format for column '{}', found '{}{}' should be '{}{}'",
                    desc.name, repeat, found_code, expected, expected_code
                )
            };

            let severe = if found_code != expected_code {
                true
            } else if desc.data_type == ScalarType::Char {
                if repeat < expected {
                    checker.warning(message());
                }
                repeat > expected
            } else {
                repeat != expected
            };

            if severe {
                checker.severe(message());
            }
        }
        None => {
            checker.warning(format!("Can't check repeat for column '{}'", desc.name));
            if found_code != expected_code {
                checker.severe(format!(
                    "Invalid format for column '{}', found '{}' should be '{}'",
                    desc.name, found_code, expected_code
                ));
            }
        }
    }

    let unit = column.unit.as_deref().filter(|u| !u.is_empty());
    if Unit::parse(unit) != Some(desc.unit) {
        match unit {
            None => checker.warning(format!(
                "Missing unit for column '{}', should be '{}'",
                desc.name,
                desc.unit.canonical_token()
            )),
            Some(found) => checker.warning(format!(
                "Invalid unit for column '{}', found '{}' should be '{}'",
                desc.name,
                found,
                desc.unit.canonical_token()
            )),
        }
    }
}

/// Convert raw column values to the descriptor's canonical type
///
/// Numeric data is cast element by element. Logical and character targets
/// cannot be converted from other types; they are filled with `false` and
/// blank strings. Wavelength-dependent columns are always two-dimensional,
/// so a single channel gives a `[rows, 1]` array.
pub fn convert_column(desc: &ColumnDescriptor, column: &RawColumn, n_rows: usize) -> ColumnData {
    let width = column.repeat();
    let shape = if desc.is_wave_dependent() || width != 1 {
        Shape::Vector
    } else {
        Shape::Scalar
    };

    trace!(
        "converting column {} [{}] to {} ({:?})",
        desc.name, column.format, desc.data_type, shape
    );

    let expected_len = n_rows * width;
    let reals = || column.data.to_f64().filter(|v| v.len() == expected_len);

    match desc.data_type {
        ScalarType::Char => {
            let values = match &column.data {
                RawData::Char(values) if values.len() == n_rows => {
                    values.iter().map(|s| s.trim().to_string()).collect()
                }
                _ => vec![String::new(); n_rows],
            };
            ColumnData::Char(values)
        }
        ScalarType::Int => {
            let array = match &column.data {
                RawData::Int16(values) if values.len() == expected_len => {
                    ColumnArray::with_shape(values.clone(), width, shape)
                }
                _ => match reals() {
                    Some(values) => ColumnArray::with_shape(
                        values.into_iter().map(|v| v as i16).collect(),
                        width,
                        shape,
                    ),
                    None => ColumnArray::filled(0, n_rows, width, shape),
                },
            };
            ColumnData::Int(array)
        }
        ScalarType::Double => {
            let array = match reals() {
                Some(values) => ColumnArray::with_shape(values, width, shape),
                None => ColumnArray::filled(f64::NAN, n_rows, width, shape),
            };
            ColumnData::Double(array)
        }
        ScalarType::Real => {
            let array = match &column.data {
                RawData::Float32(values) if values.len() == expected_len => {
                    ColumnArray::with_shape(values.clone(), width, shape)
                }
                _ => match reals() {
                    Some(values) => ColumnArray::with_shape(
                        values.into_iter().map(|v| v as f32).collect(),
                        width,
                        shape,
                    ),
                    None => ColumnArray::filled(f32::NAN, n_rows, width, shape),
                },
            };
            ColumnData::Real(array)
        }
        ScalarType::Complex => {
            let values: Option<Vec<[f32; 2]>> = match &column.data {
                RawData::Complex32(values) => Some(values.clone()),
                RawData::Complex64(values) => {
                    Some(values.iter().map(|c| [c[0] as f32, c[1] as f32]).collect())
                }
                _ => reals().map(|v| v.into_iter().map(|re| [re as f32, 0.0]).collect()),
            };
            let array = match values.filter(|v| v.len() == expected_len) {
                Some(values) => ColumnArray::with_shape(values, width, shape),
                None => ColumnArray::filled([f32::NAN; 2], n_rows, width, shape),
            };
            ColumnData::Complex(array)
        }
        ScalarType::Logical => {
            let array = match &column.data {
                RawData::Logical(values) if values.len() == expected_len => {
                    ColumnArray::with_shape(values.clone(), width, shape)
                }
                _ => ColumnArray::filled(false, n_rows, width, shape),
            };
            ColumnData::Logical(array)
        }
    }
}

/// Severe for each distinct non-blank text value outside the accepted set
pub fn check_accepted_values(desc: &ColumnDescriptor, data: &ColumnData, checker: &mut Checker) {
    let (Some(accepted), Some(values)) = (desc.accepted_values, data.as_text()) else {
        return;
    };

    let mut reported = HashSet::new();
    for value in values {
        if value.is_empty() || accepted.contains(&value.as_str()) {
            continue;
        }
        if reported.insert(value.as_str()) {
            checker.severe(format!(
                "Invalid value for column '{}', found '{}' should be one of [{}]",
                desc.name,
                value,
                accepted.join(", ")
            ));
        }
    }
}
