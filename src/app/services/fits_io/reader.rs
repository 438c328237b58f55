//! FITS container decoding into raw binary tables

use super::header::{Header, HeaderCard};
use super::tform::{ColumnFormat, TypeCode, parse_tform};
use crate::constants::{
    FITS_BLOCK_SIZE, FITS_CARD_SIZE, MAX_TFIELDS, VALID_BITPIX, XTENSION_BINTABLE, keywords as kw,
};
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, trace};

/// Column values as stored in the container, row-major
///
/// Numeric vectors hold `rows * repeat` elements. Character columns hold one
/// string per row with trailing NULs removed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawData {
    Logical(Vec<bool>),
    Byte(Vec<u8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Char(Vec<String>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex32(Vec<[f32; 2]>),
    Complex64(Vec<[f64; 2]>),
    /// Bit and variable-length array columns
    Unsupported,
}

impl RawData {
    /// Type code matching the variant
    pub fn type_code(&self) -> Option<TypeCode> {
        let code = match self {
            RawData::Logical(_) => TypeCode::Logical,
            RawData::Byte(_) => TypeCode::Byte,
            RawData::Int16(_) => TypeCode::Int16,
            RawData::Int32(_) => TypeCode::Int32,
            RawData::Int64(_) => TypeCode::Int64,
            RawData::Char(_) => TypeCode::Char,
            RawData::Float32(_) => TypeCode::Float32,
            RawData::Float64(_) => TypeCode::Float64,
            RawData::Complex32(_) => TypeCode::Complex32,
            RawData::Complex64(_) => TypeCode::Complex64,
            RawData::Unsupported => return None,
        };
        Some(code)
    }

    /// Number of stored elements (strings for character columns)
    pub fn len(&self) -> usize {
        match self {
            RawData::Logical(v) => v.len(),
            RawData::Byte(v) => v.len(),
            RawData::Int16(v) => v.len(),
            RawData::Int32(v) => v.len(),
            RawData::Int64(v) => v.len(),
            RawData::Char(v) => v.len(),
            RawData::Float32(v) => v.len(),
            RawData::Float64(v) => v.len(),
            RawData::Complex32(v) => v.len(),
            RawData::Complex64(v) => v.len(),
            RawData::Unsupported => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real parts as `f64`, `None` for non-numeric data
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        let values = match self {
            RawData::Byte(v) => v.iter().map(|&x| x as f64).collect(),
            RawData::Int16(v) => v.iter().map(|&x| x as f64).collect(),
            RawData::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            RawData::Int64(v) => v.iter().map(|&x| x as f64).collect(),
            RawData::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            RawData::Float64(v) => v.clone(),
            RawData::Complex32(v) => v.iter().map(|c| c[0] as f64).collect(),
            RawData::Complex64(v) => v.iter().map(|c| c[0]).collect(),
            _ => return None,
        };
        Some(values)
    }
}

/// One binary table column
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub format: ColumnFormat,
    pub unit: Option<String>,
    pub dims: Option<String>,
    pub data: RawData,
}

impl RawColumn {
    pub fn repeat(&self) -> usize {
        self.format.repeat
    }

    pub fn code(&self) -> TypeCode {
        self.format.code
    }
}

/// One binary table extension
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// HDU position in the container (primary HDU is 0)
    pub index: usize,
    pub header: Header,
    pub n_rows: usize,
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    /// Trimmed `EXTNAME`
    pub fn ext_name(&self) -> Option<&str> {
        self.header.text(kw::EXTNAME)
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Read all binary tables of a FITS file
pub fn read_file(path: &Path) -> Result<Vec<RawTable>> {
    let location = path.display().to_string();
    if !path.exists() {
        return Err(Error::file_not_found(location));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| Error::io(format!("Failed to read {}", location), e))?;
    debug!("Read {} bytes from {}", bytes.len(), location);

    read_from_bytes(&location, &bytes)
}

/// Decode all binary tables of an in-memory container
///
/// `source` names the container in error messages.
pub fn read_from_bytes(source: &str, bytes: &[u8]) -> Result<Vec<RawTable>> {
    let mut tables = Vec::new();
    let mut offset = 0;
    let mut index = 0;

    while offset < bytes.len() {
        let (header, data_start) = read_header(source, bytes, offset)?;

        if index == 0 && header.value(kw::SIMPLE).is_none() {
            return Err(Error::format_corruption(
                source,
                "primary header does not start with SIMPLE",
            ));
        }

        let data_size = data_size(source, index, &header)?;
        let data_end = data_start.checked_add(data_size).ok_or_else(|| {
            Error::format_corruption(source, format!("HDU {} data size overflows", index))
        })?;
        if data_end > bytes.len() {
            return Err(Error::format_corruption(
                source,
                format!(
                    "HDU {} data truncated: expected {} bytes, {} available",
                    index,
                    data_size,
                    bytes.len().saturating_sub(data_start)
                ),
            ));
        }

        let is_bintable = index > 0 && header.text(kw::XTENSION) == Some(XTENSION_BINTABLE);
        if is_bintable {
            let table = decode_bintable(source, index, header, &bytes[data_start..data_end])?;
            debug!(
                "HDU {}: {} with {} rows, {} columns",
                index,
                table.ext_name().unwrap_or("<unnamed>"),
                table.n_rows,
                table.columns.len()
            );
            tables.push(table);
        } else {
            trace!("HDU {}: skipped ({} data bytes)", index, data_size);
        }

        offset = data_start + padded(data_size);
        index += 1;
    }

    if index == 0 {
        return Err(Error::format_corruption(source, "empty file"));
    }

    Ok(tables)
}

fn padded(size: usize) -> usize {
    size.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE
}

/// Read header blocks from `offset` until the END card
///
/// Returns the header and the offset of the first data byte.
fn read_header(source: &str, bytes: &[u8], offset: usize) -> Result<(Header, usize)> {
    let mut header = Header::new();
    let mut block_start = offset;

    loop {
        let block_end = block_start + FITS_BLOCK_SIZE;
        if block_end > bytes.len() {
            return Err(Error::format_corruption(
                source,
                format!("header at byte {} has no END card", offset),
            ));
        }

        for card in bytes[block_start..block_end].chunks_exact(FITS_CARD_SIZE) {
            let card = HeaderCard::parse(card);
            if card.keyword == kw::END {
                return Ok((header, block_end));
            }
            trace!("card {} = {:?}", card.keyword, card.value);
            header.push(card);
        }

        block_start = block_end;
    }
}

fn required_int(source: &str, header: &Header, keyword: &str) -> Result<i64> {
    header.int(keyword).ok_or_else(|| {
        Error::format_corruption(source, format!("missing or invalid keyword {}", keyword))
    })
}

fn non_negative(source: &str, keyword: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        Error::format_corruption(source, format!("negative value {} for {}", value, keyword))
    })
}

/// Data size in bytes, excluding padding
fn data_size(source: &str, index: usize, header: &Header) -> Result<usize> {
    let bitpix = required_int(source, header, kw::BITPIX)?;
    if !VALID_BITPIX.contains(&bitpix) {
        return Err(Error::format_corruption(
            source,
            format!("HDU {}: unsupported BITPIX {}", index, bitpix),
        ));
    }

    let naxis = non_negative(source, kw::NAXIS, required_int(source, header, kw::NAXIS)?)?;
    if naxis == 0 {
        return Ok(0);
    }

    let overflow =
        || Error::format_corruption(source, format!("HDU {} data size overflows", index));

    let mut elements: usize = 1;
    for axis in 1..=naxis {
        let keyword = format!("{}{}", kw::NAXIS, axis);
        let length = non_negative(source, &keyword, required_int(source, header, &keyword)?)?;
        elements = elements.checked_mul(length).ok_or_else(overflow)?;
    }

    let pcount = non_negative(source, kw::PCOUNT, header.int(kw::PCOUNT).unwrap_or(0))?;
    let gcount = non_negative(source, kw::GCOUNT, header.int(kw::GCOUNT).unwrap_or(1))?;
    let bytes_per_element = (bitpix.unsigned_abs() / 8) as usize;

    pcount
        .checked_add(elements)
        .and_then(|n| n.checked_mul(gcount))
        .and_then(|n| n.checked_mul(bytes_per_element))
        .ok_or_else(overflow)
}

fn decode_bintable(source: &str, index: usize, header: Header, data: &[u8]) -> Result<RawTable> {
    let row_width = non_negative(source, "NAXIS1", required_int(source, &header, "NAXIS1")?)?;
    let n_rows = non_negative(source, "NAXIS2", required_int(source, &header, "NAXIS2")?)?;
    let n_fields = non_negative(source, kw::TFIELDS, required_int(source, &header, kw::TFIELDS)?)?;

    if n_fields > MAX_TFIELDS {
        return Err(Error::format_corruption(
            source,
            format!("HDU {}: TFIELDS {} exceeds {}", index, n_fields, MAX_TFIELDS),
        ));
    }

    let mut layouts = Vec::with_capacity(n_fields);
    let mut offset = 0;
    for field in 1..=n_fields {
        let tform = header.text(&format!("TFORM{}", field)).ok_or_else(|| {
            Error::format_corruption(source, format!("HDU {}: missing TFORM{}", index, field))
        })?;
        let format = parse_tform(source, tform)?;
        let name = header
            .text(&format!("TTYPE{}", field))
            .map(str::to_string)
            .unwrap_or_else(|| format!("COL{}", field));
        let unit = header
            .text(&format!("TUNIT{}", field))
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        let dims = header.text(&format!("TDIM{}", field)).map(str::to_string);

        layouts.push((name, format, unit, dims, offset));
        offset = format
            .byte_width()
            .checked_add(offset)
            .ok_or_else(|| {
                Error::format_corruption(source, format!("HDU {}: row width overflows", index))
            })?;
    }

    if offset != row_width {
        return Err(Error::format_corruption(
            source,
            format!(
                "HDU {}: column widths sum to {} bytes but NAXIS1 is {}",
                index, offset, row_width
            ),
        ));
    }

    let table_size = row_width.checked_mul(n_rows);
    if table_size.is_none_or(|size| size > data.len()) {
        return Err(Error::format_corruption(
            source,
            format!(
                "HDU {}: {} rows of {} bytes do not fit in {} data bytes",
                index,
                n_rows,
                row_width,
                data.len()
            ),
        ));
    }

    let columns = layouts
        .into_iter()
        .map(|(name, format, unit, dims, col_offset)| {
            let data = decode_column(data, row_width, n_rows, col_offset, format);
            trace!("column {} [{}] decoded", name, format);
            RawColumn {
                name,
                format,
                unit,
                dims,
                data,
            }
        })
        .collect();

    Ok(RawTable {
        index,
        header,
        n_rows,
        columns,
    })
}

/// Byte slices of one column, one per row
fn column_cells<'a>(
    data: &'a [u8],
    row_width: usize,
    n_rows: usize,
    offset: usize,
    width: usize,
) -> impl Iterator<Item = &'a [u8]> {
    (0..n_rows).map(move |row| {
        let start = row * row_width + offset;
        &data[start..start + width]
    })
}

fn decode_numeric<const N: usize, T>(
    cells: impl Iterator<Item = impl AsRef<[u8]>>,
    decode: impl Fn([u8; N]) -> T,
) -> Vec<T> {
    let mut values = Vec::new();
    for cell in cells {
        for chunk in cell.as_ref().chunks_exact(N) {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            values.push(decode(buf));
        }
    }
    values
}

fn decode_column(
    data: &[u8],
    row_width: usize,
    n_rows: usize,
    offset: usize,
    format: ColumnFormat,
) -> RawData {
    let cells = || column_cells(data, row_width, n_rows, offset, format.byte_width());

    match format.code {
        TypeCode::Logical => RawData::Logical(
            cells().flat_map(|c| c.iter().map(|&b| b == b'T')).collect(),
        ),
        TypeCode::Byte => RawData::Byte(cells().flat_map(|c| c.iter().copied()).collect()),
        TypeCode::Int16 => RawData::Int16(decode_numeric(cells(), i16::from_be_bytes)),
        TypeCode::Int32 => RawData::Int32(decode_numeric(cells(), i32::from_be_bytes)),
        TypeCode::Int64 => RawData::Int64(decode_numeric(cells(), i64::from_be_bytes)),
        TypeCode::Float32 => RawData::Float32(decode_numeric(cells(), f32::from_be_bytes)),
        TypeCode::Float64 => RawData::Float64(decode_numeric(cells(), f64::from_be_bytes)),
        TypeCode::Complex32 => RawData::Complex32(decode_numeric(cells(), |b: [u8; 8]| {
            [
                f32::from_be_bytes([b[0], b[1], b[2], b[3]]),
                f32::from_be_bytes([b[4], b[5], b[6], b[7]]),
            ]
        })),
        TypeCode::Complex64 => RawData::Complex64(decode_numeric(cells(), |b: [u8; 16]| {
            let mut re = [0u8; 8];
            let mut im = [0u8; 8];
            re.copy_from_slice(&b[..8]);
            im.copy_from_slice(&b[8..]);
            [f64::from_be_bytes(re), f64::from_be_bytes(im)]
        })),
        TypeCode::Char => RawData::Char(
            cells()
                .map(|c| {
                    let end = c.iter().position(|&b| b == 0).unwrap_or(c.len());
                    String::from_utf8_lossy(&c[..end]).into_owned()
                })
                .collect(),
        ),
        TypeCode::Bit | TypeCode::ArrayDescriptor32 | TypeCode::ArrayDescriptor64 => {
            RawData::Unsupported
        }
    }
}
