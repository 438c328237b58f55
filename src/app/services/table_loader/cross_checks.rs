//! Reference integrity checks between loaded tables
//!
//! These run once both loading passes are done. Every finding is recorded in
//! the checker; nothing here fails the load.

use crate::app::models::{Checker, OiFitsFile, OiTable};
use crate::constants::OI_REVN_SUPPORTED;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeSet, HashSet};

/// Run all cross-table checks
pub fn run(file: &OiFitsFile, checker: &mut Checker) {
    check_target_tables(file, checker);
    check_revisions(file, checker);
    check_data_references(file, checker);
}

fn table_label(table: &OiTable) -> String {
    format!("table [{}]: {}", table.ext_index(), table.kind())
}

fn check_target_tables(file: &OiFitsFile, checker: &mut Checker) {
    match file.target_tables().len() {
        0 => checker.severe("No OI_TARGET table found: one must be present"),
        1 => {}
        n => checker.warning(format!(
            "{} OI_TARGET tables found: only the first one is used",
            n
        )),
    }
}

fn check_revisions(file: &OiFitsFile, checker: &mut Checker) {
    let tables = file
        .target_tables()
        .iter()
        .map(|t| t.table())
        .chain(file.array_tables().iter().map(|t| t.table()))
        .chain(file.wavelength_tables().iter().map(|t| t.table()))
        .chain(file.data_tables().iter().map(|t| t.table()));

    for table in tables {
        if let Some(revision) = table.revision() {
            if revision != OI_REVN_SUPPORTED {
                checker.warning(format!(
                    "Unsupported OI_REVN {} in {} (expected {})",
                    revision,
                    table_label(table),
                    OI_REVN_SUPPORTED
                ));
            }
        }
    }
}

fn check_data_references(file: &OiFitsFile, checker: &mut Checker) {
    let known_targets: Option<HashSet<i16>> = file
        .oi_target()
        .map(|t| t.target_ids().into_iter().collect());

    for data in file.data_tables() {
        let label = table_label(data.table());

        if let Some(ins_name) = data.ins_name() {
            if file.wavelength_for(ins_name).is_none() {
                checker.severe(format!(
                    "No OI_WAVELENGTH table found for INSNAME '{}' in {}",
                    ins_name, label
                ));
            }
        }

        let array = match data.arr_name() {
            Some(arr_name) => {
                let array = file.array_for(arr_name);
                if array.is_none() {
                    checker.warning(format!(
                        "No OI_ARRAY table found for ARRNAME '{}' in {}",
                        arr_name, label
                    ));
                }
                array
            }
            None => None,
        };

        if let Some(known) = &known_targets {
            let unknown: BTreeSet<i16> = data
                .target_ids()
                .into_iter()
                .filter(|id| !known.contains(id))
                .collect();
            for id in unknown {
                checker.severe(format!("Unknown TARGET_ID {} in {}", id, label));
            }
        }

        if let (Some(array), Some(sta_index)) = (array, data.sta_index()) {
            let stations: HashSet<i16> = array.station_ids().into_iter().collect();
            let unknown: BTreeSet<i16> = sta_index
                .values()
                .iter()
                .copied()
                .filter(|id| !stations.contains(id))
                .collect();
            for id in unknown {
                checker.warning(format!("Unknown STA_INDEX {} in {}", id, label));
            }
        }

        if let Some(date) = data.date_obs() {
            if !is_valid_date_obs(date) {
                checker.warning(format!("Invalid DATE-OBS '{}' in {}", date, label));
            }
        }
    }
}

/// `YYYY-MM-DD`, optionally followed by `THH:MM:SS[.fff]`
pub fn is_valid_date_obs(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
