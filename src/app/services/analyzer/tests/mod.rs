//! Test utilities for the analyzer
//!
//! Files are produced with the loader fixtures so the analyzer always runs on
//! genuinely loaded tables.

use super::Analyzer;
use crate::app::models::OiFitsFile;
use crate::app::services::fits_io::BinTableBuilder;
use crate::app::services::table_loader::tests::load_builders;

pub use crate::app::services::table_loader::tests::{
    DataRow, array_table, data_table, k_band, row, standard_builders, target_table,
    wavelength_table,
};


/// Load fixture tables without analysing them
pub fn loaded(builders: &[BinTableBuilder]) -> OiFitsFile {
    load_builders(builders).file
}

/// Load and analyse fixture tables with a fresh analyzer
pub fn analyzed(builders: &[BinTableBuilder]) -> OiFitsFile {
    let mut file = loaded(builders);
    Analyzer::default().analyze(&mut file);
    file
}

/// Sorted configurations of the first data table
pub fn configurations(file: &OiFitsFile) -> Vec<Vec<i16>> {
    let mut found: Vec<Vec<i16>> = file.data_tables()[0]
        .distinct_configurations()
        .unwrap()
        .iter()
        .map(|c| c.to_vec())
        .collect();
    found.sort();
    found
}
