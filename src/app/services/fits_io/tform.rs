//! Binary table column format (`TFORMn`) parsing

use crate::app::models::ScalarType;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// FITS binary table type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Logical,
    Bit,
    Byte,
    Int16,
    Int32,
    Int64,
    Char,
    Float32,
    Float64,
    Complex32,
    Complex64,
    ArrayDescriptor32,
    ArrayDescriptor64,
}

impl TypeCode {
    pub fn from_char(code: char) -> Option<Self> {
        let code = match code {
            'L' => TypeCode::Logical,
            'X' => TypeCode::Bit,
            'B' => TypeCode::Byte,
            'I' => TypeCode::Int16,
            'J' => TypeCode::Int32,
            'K' => TypeCode::Int64,
            'A' => TypeCode::Char,
            'E' => TypeCode::Float32,
            'D' => TypeCode::Float64,
            'C' => TypeCode::Complex32,
            'M' => TypeCode::Complex64,
            'P' => TypeCode::ArrayDescriptor32,
            'Q' => TypeCode::ArrayDescriptor64,
            _ => return None,
        };
        Some(code)
    }

    pub fn as_char(&self) -> char {
        match self {
            TypeCode::Logical => 'L',
            TypeCode::Bit => 'X',
            TypeCode::Byte => 'B',
            TypeCode::Int16 => 'I',
            TypeCode::Int32 => 'J',
            TypeCode::Int64 => 'K',
            TypeCode::Char => 'A',
            TypeCode::Float32 => 'E',
            TypeCode::Float64 => 'D',
            TypeCode::Complex32 => 'C',
            TypeCode::Complex64 => 'M',
            TypeCode::ArrayDescriptor32 => 'P',
            TypeCode::ArrayDescriptor64 => 'Q',
        }
    }

    /// Bytes per element; bit columns are handled by [`ColumnFormat::byte_width`]
    pub fn element_size(&self) -> usize {
        match self {
            TypeCode::Logical | TypeCode::Byte | TypeCode::Char | TypeCode::Bit => 1,
            TypeCode::Int16 => 2,
            TypeCode::Int32 | TypeCode::Float32 => 4,
            TypeCode::Int64 | TypeCode::Float64 | TypeCode::Complex32 => 8,
            TypeCode::ArrayDescriptor32 => 8,
            TypeCode::Complex64 | TypeCode::ArrayDescriptor64 => 16,
        }
    }

    /// OIFITS scalar type sharing this exact code
    pub fn scalar_type(&self) -> Option<ScalarType> {
        ScalarType::from_code(self.as_char())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeCode::Byte
                | TypeCode::Int16
                | TypeCode::Int32
                | TypeCode::Int64
                | TypeCode::Float32
                | TypeCode::Float64
                | TypeCode::Complex32
                | TypeCode::Complex64
        )
    }
}

/// Parsed `TFORMn` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFormat {
    pub repeat: usize,
    pub code: TypeCode,
}

impl ColumnFormat {
    pub fn new(repeat: usize, code: TypeCode) -> Self {
        Self { repeat, code }
    }

    /// Bytes occupied by the column in one row
    pub fn byte_width(&self) -> usize {
        match self.code {
            TypeCode::Bit => self.repeat.div_ceil(8),
            TypeCode::ArrayDescriptor32 | TypeCode::ArrayDescriptor64 => {
                // repeat is 0 or 1 for descriptors
                self.code.element_size() * self.repeat.min(1)
            }
            _ => self.code.element_size().saturating_mul(self.repeat),
        }
    }
}

impl fmt::Display for ColumnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.repeat, self.code.as_char())
    }
}

fn tform_regex() -> Result<&'static Regex> {
    static TFORM: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    TFORM
        .get_or_init(|| Regex::new(r"^\s*(\d*)([LXBIJKAEDCMPQ])(.*)$"))
        .as_ref()
        .map_err(|e| Error::configuration(format!("TFORM pattern: {}", e)))
}

/// Parse a `TFORMn` value such as `1D`, `16A` or `E`
///
/// A missing repeat count means 1. Anything after the type code (the
/// variable-length array element type, for instance) is ignored.
pub fn parse_tform(file: &str, tform: &str) -> Result<ColumnFormat> {
    let captures = tform_regex()?
        .captures(tform)
        .ok_or_else(|| Error::format_corruption(file, format!("invalid TFORM '{}'", tform)))?;

    let repeat = match &captures[1] {
        "" => 1,
        digits => digits.parse::<usize>().map_err(|_| {
            Error::format_corruption(file, format!("invalid repeat count in TFORM '{}'", tform))
        })?,
    };

    let code = captures[2]
        .chars()
        .next()
        .and_then(TypeCode::from_char)
        .ok_or_else(|| Error::format_corruption(file, format!("invalid TFORM '{}'", tform)))?;

    Ok(ColumnFormat::new(repeat, code))
}
