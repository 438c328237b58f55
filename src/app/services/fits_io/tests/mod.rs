//! Test utilities for FITS container reading and writing

use super::header::{CardValue, HeaderCard};
use super::reader::RawData;
use super::writer::BinTableBuilder;
use crate::constants::FITS_CARD_SIZE;


/// Small squared-visibility table with scalar, vector and text columns
pub fn sample_table() -> BinTableBuilder {
    BinTableBuilder::new("OI_VIS2", 2)
        .int_keyword("OI_REVN", 1)
        .text_keyword("DATE-OBS", "2017-03-14")
        .text_keyword("INSNAME", "AMBER")
        .column("TARGET_ID", 1, None, RawData::Int16(vec![1, 2]))
        .column("MJD", 1, Some("day"), RawData::Float64(vec![57826.1, 57826.2]))
        .column(
            "VIS2DATA",
            3,
            None,
            RawData::Float64(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]),
        )
        .column(
            "FLAG",
            3,
            None,
            RawData::Logical(vec![false, true, false, false, false, true]),
        )
        .column("STA_INDEX", 2, None, RawData::Int16(vec![1, 2, 2, 3]))
}

/// Text-only table used for string encoding checks
pub fn text_table() -> BinTableBuilder {
    BinTableBuilder::new("OI_ARRAY", 2)
        .text_keyword("ARRNAME", "VLTI")
        .column(
            "STA_NAME",
            16,
            None,
            RawData::Char(vec!["A0".to_string(), "K0".to_string()]),
        )
}

/// Replace the first occurrence of `from` with `to` (same length) in `bytes`
pub fn patch(bytes: &mut [u8], from: &str, to: &str) {
    assert_eq!(from.len(), to.len(), "patch must keep the length");
    let pos = bytes
        .windows(from.len())
        .position(|w| w == from.as_bytes())
        .unwrap_or_else(|| panic!("'{}' not found", from));
    bytes[pos..pos + to.len()].copy_from_slice(to.as_bytes());
}

/// Overwrite the last integer card named `keyword` in `bytes`
///
/// With a single extension the last card belongs to the extension header.
pub fn set_int_card(bytes: &mut [u8], keyword: &str, value: i64) {
    let prefix = format!("{:<8}=", keyword);
    let card = bytes
        .chunks_exact(FITS_CARD_SIZE)
        .rposition(|c| c.starts_with(prefix.as_bytes()))
        .unwrap_or_else(|| panic!("card {} not found", keyword));
    let text = HeaderCard::format(keyword, Some(&CardValue::Int(value)), None);
    let start = card * FITS_CARD_SIZE;
    bytes[start..start + FITS_CARD_SIZE].copy_from_slice(text.as_bytes());
}
