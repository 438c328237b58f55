//! Test utilities for OIFITS table loading
//!
//! Fixtures are written through the container writer and read back, so the
//! loader always sees genuine decoded tables.

use std::path::Path;

use super::loader::{LoadResult, OiFitsLoader};
use crate::app::models::TableKind;
use crate::app::services::fits_io::{BinTableBuilder, RawData, RawTable, read_from_bytes, to_bytes};
use crate::config::LoaderConfig;

// Test modules
mod loader_tests;

/// One observation row of a data table fixture
#[derive(Debug, Clone)]
pub struct DataRow {
    pub target_id: i16,
    pub mjd: f64,
    pub sta_index: Vec<i16>,
}

pub fn row(target_id: i16, mjd: f64, sta_index: &[i16]) -> DataRow {
    DataRow {
        target_id,
        mjd,
        sta_index: sta_index.to_vec(),
    }
}

fn text_column(values: Vec<String>) -> RawData {
    RawData::Char(values)
}

/// OI_TARGET table with every schema column
pub fn target_table(targets: &[(i16, &str)]) -> BinTableBuilder {
    let n = targets.len();
    let names = targets.iter().map(|(_, name)| name.to_string()).collect();
    let ids = targets.iter().map(|(id, _)| *id).collect();
    let coords: Vec<f64> = targets.iter().map(|(id, _)| *id as f64 * 10.0).collect();

    BinTableBuilder::new("OI_TARGET", n)
        .int_keyword("OI_REVN", 1)
        .column("TARGET_ID", 1, None, RawData::Int16(ids))
        .column("TARGET", 16, None, text_column(names))
        .column("RAEP0", 1, Some("deg"), RawData::Float64(coords.clone()))
        .column("DECEP0", 1, Some("deg"), RawData::Float64(coords))
        .column("EQUINOX", 1, Some("year"), RawData::Float32(vec![2000.0; n]))
        .column("RA_ERR", 1, Some("deg"), RawData::Float64(vec![0.0; n]))
        .column("DEC_ERR", 1, Some("deg"), RawData::Float64(vec![0.0; n]))
        .column("SYSVEL", 1, Some("m/s"), RawData::Float64(vec![0.0; n]))
        .column("VELTYP", 8, None, text_column(vec!["LSR".to_string(); n]))
        .column("VELDEF", 8, None, text_column(vec!["OPTICAL".to_string(); n]))
        .column("PMRA", 1, Some("deg/yr"), RawData::Float64(vec![0.0; n]))
        .column("PMDEC", 1, Some("deg/yr"), RawData::Float64(vec![0.0; n]))
        .column("PMRA_ERR", 1, Some("deg/yr"), RawData::Float64(vec![0.0; n]))
        .column("PMDEC_ERR", 1, Some("deg/yr"), RawData::Float64(vec![0.0; n]))
        .column("PARALLAX", 1, Some("deg"), RawData::Float32(vec![0.0; n]))
        .column("PARA_ERR", 1, Some("deg"), RawData::Float32(vec![0.0; n]))
        .column("SPECTYP", 16, None, text_column(vec!["G2V".to_string(); n]))
}

/// OI_ARRAY table listing the given station ids
pub fn array_table(arr_name: &str, stations: &[i16]) -> BinTableBuilder {
    let n = stations.len();
    let names = stations.iter().map(|s| format!("S{}", s)).collect::<Vec<_>>();

    BinTableBuilder::new("OI_ARRAY", n)
        .int_keyword("OI_REVN", 1)
        .text_keyword("ARRNAME", arr_name)
        .text_keyword("FRAME", "GEOCENTRIC")
        .float_keyword("ARRAYX", 1942014.1)
        .float_keyword("ARRAYY", -5455311.5)
        .float_keyword("ARRAYZ", -2654530.5)
        .column("TEL_NAME", 16, None, text_column(names.clone()))
        .column("STA_NAME", 16, None, text_column(names))
        .column("STA_INDEX", 1, None, RawData::Int16(stations.to_vec()))
        .column("DIAMETER", 1, Some("m"), RawData::Float32(vec![1.8; n]))
        .column("STAXYZ", 3, Some("m"), RawData::Float64(vec![0.0; n * 3]))
}

/// OI_WAVELENGTH table with the given channel wavelengths and bandwidths
pub fn wavelength_table(ins_name: &str, channels: &[(f32, f32)]) -> BinTableBuilder {
    BinTableBuilder::new("OI_WAVELENGTH", channels.len())
        .int_keyword("OI_REVN", 1)
        .text_keyword("INSNAME", ins_name)
        .column(
            "EFF_WAVE",
            1,
            Some("m"),
            RawData::Float32(channels.iter().map(|(w, _)| *w).collect()),
        )
        .column(
            "EFF_BAND",
            1,
            Some("m"),
            RawData::Float32(channels.iter().map(|(_, b)| *b).collect()),
        )
}

/// Three-channel K-band setup
pub fn k_band() -> Vec<(f32, f32)> {
    vec![(2.0e-6, 0.1e-6), (2.2e-6, 0.1e-6), (2.4e-6, 0.1e-6)]
}

/// Data table of any kind, all flags cleared
pub fn data_table(
    kind: TableKind,
    ins_name: &str,
    arr_name: Option<&str>,
    n_wave: usize,
    rows: &[DataRow],
) -> BinTableBuilder {
    let n = rows.len();
    let arity = kind.station_arity().unwrap_or(2);
    let wave = |value: f64| RawData::Float64(vec![value; n * n_wave]);
    let scalar = |value: f64| RawData::Float64(vec![value; n]);

    let mut builder = BinTableBuilder::new(kind.ext_name(), n)
        .int_keyword("OI_REVN", 1)
        .text_keyword("DATE-OBS", "2017-03-14");
    if let Some(arr_name) = arr_name {
        builder = builder.text_keyword("ARRNAME", arr_name);
    }
    builder = builder
        .text_keyword("INSNAME", ins_name)
        .column(
            "TARGET_ID",
            1,
            None,
            RawData::Int16(rows.iter().map(|r| r.target_id).collect()),
        )
        .column("TIME", 1, Some("s"), scalar(0.0))
        .column(
            "MJD",
            1,
            Some("day"),
            RawData::Float64(rows.iter().map(|r| r.mjd).collect()),
        )
        .column("INT_TIME", 1, Some("s"), scalar(1.0));

    builder = match kind {
        TableKind::Vis => builder
            .column("VISAMP", n_wave, None, wave(0.9))
            .column("VISAMPERR", n_wave, None, wave(0.01))
            .column("VISPHI", n_wave, Some("deg"), wave(5.0))
            .column("VISPHIERR", n_wave, Some("deg"), wave(0.5))
            .column("UCOORD", 1, Some("m"), scalar(10.0))
            .column("VCOORD", 1, Some("m"), scalar(20.0)),
        TableKind::T3 => builder
            .column("T3AMP", n_wave, None, wave(0.5))
            .column("T3AMPERR", n_wave, None, wave(0.01))
            .column("T3PHI", n_wave, Some("deg"), wave(10.0))
            .column("T3PHIERR", n_wave, Some("deg"), wave(1.0))
            .column("U1COORD", 1, Some("m"), scalar(10.0))
            .column("V1COORD", 1, Some("m"), scalar(20.0))
            .column("U2COORD", 1, Some("m"), scalar(30.0))
            .column("V2COORD", 1, Some("m"), scalar(40.0)),
        _ => builder
            .column("VIS2DATA", n_wave, None, wave(0.8))
            .column("VIS2ERR", n_wave, None, wave(0.02))
            .column("UCOORD", 1, Some("m"), scalar(10.0))
            .column("VCOORD", 1, Some("m"), scalar(20.0)),
    };

    builder
        .column(
            "STA_INDEX",
            arity,
            None,
            RawData::Int16(rows.iter().flat_map(|r| r.sta_index.clone()).collect()),
        )
        .column("FLAG", n_wave, None, RawData::Logical(vec![false; n * n_wave]))
}

/// Complete file: two targets, a four-station array, K-band setup, one VIS2 table
pub fn standard_builders(rows: &[DataRow]) -> Vec<BinTableBuilder> {
    vec![
        target_table(&[(1, "HD 1"), (2, "HD 2")]),
        array_table("VLTI", &[1, 2, 3, 4]),
        wavelength_table("AMBER", &k_band()),
        data_table(TableKind::Vis2, "AMBER", Some("VLTI"), 3, rows),
    ]
}

/// Encode and decode fixture tables
pub fn raw_tables(builders: &[BinTableBuilder]) -> Vec<RawTable> {
    let bytes = to_bytes(builders).unwrap();
    read_from_bytes("fixture.fits", &bytes).unwrap()
}

pub fn load_raw(raw: &[RawTable]) -> LoadResult {
    OiFitsLoader::new(LoaderConfig::default()).load_raw(Path::new("fixture.fits"), raw)
}

/// Encode, decode and load fixture tables with the default configuration
pub fn load_builders(builders: &[BinTableBuilder]) -> LoadResult {
    load_raw(&raw_tables(builders))
}
