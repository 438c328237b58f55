//! FITS container encoding
//!
//! Writes a minimal primary HDU followed by one `BINTABLE` extension per
//! builder. Used to produce fixtures and to round-trip loaded tables.

use super::header::{CardValue, HeaderCard};
use super::reader::{RawData, RawTable};
use super::tform::{ColumnFormat, TypeCode};
use crate::constants::{FITS_BLOCK_SIZE, XTENSION_BINTABLE, keywords as kw};
use crate::{Error, Result};
use std::path::Path;
use tracing::debug;

const WRITER_SOURCE: &str = "<writer>";

/// Structural keywords generated by the writer itself
const STRUCTURAL_KEYWORDS: &[&str] = &[
    kw::XTENSION,
    kw::BITPIX,
    kw::NAXIS,
    "NAXIS1",
    "NAXIS2",
    kw::PCOUNT,
    kw::GCOUNT,
    kw::TFIELDS,
    kw::EXTNAME,
];

const COLUMN_KEYWORD_PREFIXES: &[&str] = &["TFORM", "TTYPE", "TUNIT", "TDIM"];

#[derive(Debug, Clone)]
struct ColumnSpec {
    name: String,
    format: ColumnFormat,
    unit: Option<String>,
    data: RawData,
}

/// Binary table under construction
#[derive(Debug, Clone)]
pub struct BinTableBuilder {
    ext_name: String,
    n_rows: usize,
    keywords: Vec<(String, CardValue)>,
    columns: Vec<ColumnSpec>,
}

impl BinTableBuilder {
    pub fn new(ext_name: impl Into<String>, n_rows: usize) -> Self {
        Self {
            ext_name: ext_name.into(),
            n_rows,
            keywords: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn keyword(mut self, name: impl Into<String>, value: CardValue) -> Self {
        self.keywords.push((name.into(), value));
        self
    }

    pub fn text_keyword(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keyword(name, CardValue::Text(value.into()))
    }

    pub fn int_keyword(self, name: impl Into<String>, value: i64) -> Self {
        self.keyword(name, CardValue::Int(value))
    }

    pub fn float_keyword(self, name: impl Into<String>, value: f64) -> Self {
        self.keyword(name, CardValue::Float(value))
    }

    /// Add a column of `repeat` elements per row (string width for text)
    ///
    /// The type code follows the data variant.
    pub fn column(
        mut self,
        name: impl Into<String>,
        repeat: usize,
        unit: Option<&str>,
        data: RawData,
    ) -> Self {
        let code = data.type_code().unwrap_or(TypeCode::Byte);
        self.columns.push(ColumnSpec {
            name: name.into(),
            format: ColumnFormat::new(repeat, code),
            unit: unit.map(str::to_string),
            data,
        });
        self
    }

    /// Rebuild a table read from a container
    pub fn from_raw(table: &RawTable) -> Result<Self> {
        let ext_name = table.ext_name().unwrap_or_default();
        let mut builder = Self::new(ext_name, table.n_rows);

        for card in table.header.cards() {
            if is_generated(&card.keyword) {
                continue;
            }
            if let Some(value) = card.typed_value() {
                builder = builder.keyword(card.keyword.clone(), value);
            }
        }

        for column in &table.columns {
            if column.data == RawData::Unsupported {
                return Err(Error::format_corruption(
                    WRITER_SOURCE,
                    format!("column '{}' has an unsupported format", column.name),
                ));
            }
            builder = builder.column(
                column.name.clone(),
                column.repeat(),
                column.unit.as_deref(),
                column.data.clone(),
            );
        }

        Ok(builder)
    }

    fn row_width(&self) -> usize {
        self.columns.iter().map(|c| c.format.byte_width()).sum()
    }

    fn header_cards(&self) -> Vec<String> {
        let mut cards = vec![
            card(kw::XTENSION, CardValue::Text(XTENSION_BINTABLE.to_string())),
            card(kw::BITPIX, CardValue::Int(8)),
            card(kw::NAXIS, CardValue::Int(2)),
            card("NAXIS1", CardValue::Int(self.row_width() as i64)),
            card("NAXIS2", CardValue::Int(self.n_rows as i64)),
            card(kw::PCOUNT, CardValue::Int(0)),
            card(kw::GCOUNT, CardValue::Int(1)),
            card(kw::TFIELDS, CardValue::Int(self.columns.len() as i64)),
        ];

        for (i, column) in self.columns.iter().enumerate() {
            let n = i + 1;
            cards.push(card(&format!("TTYPE{}", n), CardValue::Text(column.name.clone())));
            cards.push(card(
                &format!("TFORM{}", n),
                CardValue::Text(column.format.to_string()),
            ));
            if let Some(unit) = &column.unit {
                cards.push(card(&format!("TUNIT{}", n), CardValue::Text(unit.clone())));
            }
        }

        cards.push(card(kw::EXTNAME, CardValue::Text(self.ext_name.clone())));
        for (name, value) in &self.keywords {
            cards.push(card(name, value.clone()));
        }
        cards
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        for column in &self.columns {
            let expected = match column.data {
                RawData::Char(_) => self.n_rows,
                _ => self.n_rows * column.format.repeat,
            };
            if column.data.len() != expected {
                return Err(Error::format_corruption(
                    WRITER_SOURCE,
                    format!(
                        "column '{}' holds {} values, expected {}",
                        column.name,
                        column.data.len(),
                        expected
                    ),
                ));
            }
        }

        write_header(out, &self.header_cards());

        let data_start = out.len();
        for row in 0..self.n_rows {
            for column in &self.columns {
                encode_cell(out, column, row);
            }
        }
        pad(out, data_start, 0);
        Ok(())
    }
}

fn is_generated(keyword: &str) -> bool {
    STRUCTURAL_KEYWORDS.contains(&keyword)
        || COLUMN_KEYWORD_PREFIXES.iter().any(|prefix| {
            keyword
                .strip_prefix(prefix)
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        })
}

fn card(keyword: &str, value: CardValue) -> String {
    HeaderCard::format(keyword, Some(&value), None)
}

fn write_header(out: &mut Vec<u8>, cards: &[String]) {
    let start = out.len();
    for card in cards {
        out.extend_from_slice(card.as_bytes());
    }
    out.extend_from_slice(HeaderCard::format(kw::END, None, None).as_bytes());
    pad(out, start, b' ');
}

fn pad(out: &mut Vec<u8>, start: usize, fill: u8) {
    let written = out.len() - start;
    let padding = (FITS_BLOCK_SIZE - written % FITS_BLOCK_SIZE) % FITS_BLOCK_SIZE;
    out.resize(out.len() + padding, fill);
}

fn encode_cell(out: &mut Vec<u8>, column: &ColumnSpec, row: usize) {
    let repeat = column.format.repeat;
    let range = row * repeat..(row + 1) * repeat;

    match &column.data {
        RawData::Logical(v) => {
            out.extend(v[range].iter().map(|&b| if b { b'T' } else { b'F' }));
        }
        RawData::Byte(v) => out.extend_from_slice(&v[range]),
        RawData::Int16(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        RawData::Int32(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        RawData::Int64(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        RawData::Float32(v) => {
            v[range].iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes()))
        }
        RawData::Float64(v) => {
            v[range].iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes()))
        }
        RawData::Complex32(v) => v[range].iter().for_each(|c| {
            out.extend_from_slice(&c[0].to_be_bytes());
            out.extend_from_slice(&c[1].to_be_bytes());
        }),
        RawData::Complex64(v) => v[range].iter().for_each(|c| {
            out.extend_from_slice(&c[0].to_be_bytes());
            out.extend_from_slice(&c[1].to_be_bytes());
        }),
        RawData::Char(v) => {
            let mut bytes = v[row].as_bytes().to_vec();
            bytes.resize(repeat, b' ');
            out.extend_from_slice(&bytes);
        }
        RawData::Unsupported => out.resize(out.len() + column.format.byte_width(), 0),
    }
}

/// Encode a complete container
pub fn to_bytes(tables: &[BinTableBuilder]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let primary = [
        card(kw::SIMPLE, CardValue::Logical(true)),
        card(kw::BITPIX, CardValue::Int(8)),
        card(kw::NAXIS, CardValue::Int(0)),
        card("EXTEND", CardValue::Logical(true)),
    ];
    write_header(&mut out, &primary);

    for table in tables {
        table.encode(&mut out)?;
    }
    Ok(out)
}

/// Write a container to `path`
pub fn write_tables(path: &Path, tables: &[BinTableBuilder]) -> Result<()> {
    let bytes = to_bytes(tables)?;
    std::fs::write(path, &bytes)
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
    debug!("Wrote {} tables ({} bytes) to {}", tables.len(), bytes.len(), path.display());
    Ok(())
}
