//! Canonical in-memory keyword values and column arrays
//!
//! Every column is stored row-major in a flat vector. A column is either
//! scalar-per-row or a fixed-width vector per row; a vector column of width 1
//! stays two-dimensional so spectral columns keep a `[rows, nwave]` shape.

use super::units::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Keyword Values
// =============================================================================

/// Converted header keyword value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordValue {
    Text(String),
    Int(i32),
    Double(f64),
}

impl KeywordValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeywordValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            KeywordValue::Int(v) => Some(*v),
            KeywordValue::Double(v) => Some(*v as i32),
            KeywordValue::Text(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeywordValue::Int(v) => Some(*v as f64),
            KeywordValue::Double(v) => Some(*v),
            KeywordValue::Text(_) => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordValue::Text(s) => write!(f, "'{}'", s),
            KeywordValue::Int(v) => write!(f, "{}", v),
            KeywordValue::Double(v) => write!(f, "{}", v),
        }
    }
}

// =============================================================================
// Column Arrays
// =============================================================================

/// Row shape of a column array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// One value per row
    Scalar,
    /// Fixed-width vector per row (two-dimensional, even when width is 1)
    Vector,
}

/// Homogeneous row-major column array
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnArray<T> {
    data: Vec<T>,
    rows: usize,
    width: usize,
    shape: Shape,
}

impl<T> ColumnArray<T> {
    /// Build a one-value-per-row column
    pub fn scalar(data: Vec<T>) -> Self {
        let rows = data.len();
        Self {
            data,
            rows,
            width: 1,
            shape: Shape::Scalar,
        }
    }

    /// Build a `[rows, width]` column from row-major data
    ///
    /// Trailing elements that do not fill a complete row are dropped.
    pub fn vector(mut data: Vec<T>, width: usize) -> Self {
        let rows = if width == 0 { 0 } else { data.len() / width };
        data.truncate(rows * width);
        Self {
            data,
            rows,
            width,
            shape: Shape::Vector,
        }
    }

    /// Build a column of `rows` rows with the requested shape
    pub fn with_shape(data: Vec<T>, width: usize, shape: Shape) -> Self {
        match shape {
            Shape::Scalar if width == 1 => Self::scalar(data),
            _ => Self::vector(data, width),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_two_dimensional(&self) -> bool {
        self.shape == Shape::Vector
    }

    /// Values of row `i`
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.width..(i + 1) * self.width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks_exact panics on a zero width
        self.data.chunks_exact(self.width.max(1))
    }

    /// Flat row-major values
    pub fn values(&self) -> &[T] {
        &self.data
    }

    /// Reshape a scalar column into an explicit `[rows, 1]` array
    pub fn into_two_dimensional(self) -> Self {
        Self {
            shape: Shape::Vector,
            ..self
        }
    }
}

impl<T: Copy> ColumnArray<T> {
    /// First value of row `i` (the value of a scalar column)
    pub fn get(&self, i: usize) -> Option<T> {
        self.data.get(i * self.width).copied()
    }
}

impl<T: Clone> ColumnArray<T> {
    /// Column of `rows` rows filled with `value`
    pub fn filled(value: T, rows: usize, width: usize, shape: Shape) -> Self {
        Self::with_shape(vec![value; rows * width], width, shape)
    }
}

/// Column values converted to their canonical in-memory type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// One trimmed string per row
    Char(Vec<String>),
    Int(ColumnArray<i16>),
    Double(ColumnArray<f64>),
    Real(ColumnArray<f32>),
    Complex(ColumnArray<[f32; 2]>),
    Logical(ColumnArray<bool>),
}

impl ColumnData {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ColumnData::Char(_) => ScalarType::Char,
            ColumnData::Int(_) => ScalarType::Int,
            ColumnData::Double(_) => ScalarType::Double,
            ColumnData::Real(_) => ScalarType::Real,
            ColumnData::Complex(_) => ScalarType::Complex,
            ColumnData::Logical(_) => ScalarType::Logical,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            ColumnData::Char(v) => v.len(),
            ColumnData::Int(a) => a.rows(),
            ColumnData::Double(a) => a.rows(),
            ColumnData::Real(a) => a.rows(),
            ColumnData::Complex(a) => a.rows(),
            ColumnData::Logical(a) => a.rows(),
        }
    }

    /// Elements per row (1 for character columns)
    pub fn width(&self) -> usize {
        match self {
            ColumnData::Char(_) => 1,
            ColumnData::Int(a) => a.width(),
            ColumnData::Double(a) => a.width(),
            ColumnData::Real(a) => a.width(),
            ColumnData::Complex(a) => a.width(),
            ColumnData::Logical(a) => a.width(),
        }
    }

    pub fn is_two_dimensional(&self) -> bool {
        match self {
            ColumnData::Char(_) => false,
            ColumnData::Int(a) => a.is_two_dimensional(),
            ColumnData::Double(a) => a.is_two_dimensional(),
            ColumnData::Real(a) => a.is_two_dimensional(),
            ColumnData::Complex(a) => a.is_two_dimensional(),
            ColumnData::Logical(a) => a.is_two_dimensional(),
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            ColumnData::Char(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&ColumnArray<i16>> {
        match self {
            ColumnData::Int(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<&ColumnArray<f64>> {
        match self {
            ColumnData::Double(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&ColumnArray<f32>> {
        match self {
            ColumnData::Real(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ColumnArray<[f32; 2]>> {
        match self {
            ColumnData::Complex(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_logical(&self) -> Option<&ColumnArray<bool>> {
        match self {
            ColumnData::Logical(a) => Some(a),
            _ => None,
        }
    }
}
