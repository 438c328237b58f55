//! Fixture files shared by the integration tests
//!
//! Files are produced with the public container writer and loaded back from
//! disk, exercising the same path as the command-line tool.

#![allow(dead_code)]

use oifits_processor::app::services::fits_io::{BinTableBuilder, RawData, write_tables};
use std::path::Path;

/// One observation: target id, MJD and station ids
pub type Observation = (i16, f64, Vec<i16>);

pub fn obs(target_id: i16, mjd: f64, stations: &[i16]) -> Observation {
    (target_id, mjd, stations.to_vec())
}

fn text(values: impl IntoIterator<Item = String>) -> RawData {
    RawData::Char(values.into_iter().collect())
}

pub fn targets(names: &[(i16, &str)]) -> BinTableBuilder {
    let n = names.len();
    let zeros = || RawData::Float64(vec![0.0; n]);

    BinTableBuilder::new("OI_TARGET", n)
        .int_keyword("OI_REVN", 1)
        .column(
            "TARGET_ID",
            1,
            None,
            RawData::Int16(names.iter().map(|(id, _)| *id).collect()),
        )
        .column("TARGET", 16, None, text(names.iter().map(|(_, n)| n.to_string())))
        .column(
            "RAEP0",
            1,
            Some("deg"),
            RawData::Float64(names.iter().map(|(id, _)| 15.0 * *id as f64).collect()),
        )
        .column("DECEP0", 1, Some("deg"), RawData::Float64(vec![-30.0; n]))
        .column("EQUINOX", 1, Some("year"), RawData::Float32(vec![2000.0; n]))
        .column("RA_ERR", 1, Some("deg"), zeros())
        .column("DEC_ERR", 1, Some("deg"), zeros())
        .column("SYSVEL", 1, Some("m/s"), zeros())
        .column("VELTYP", 8, None, text(vec!["LSR".to_string(); n]))
        .column("VELDEF", 8, None, text(vec!["OPTICAL".to_string(); n]))
        .column("PMRA", 1, Some("deg/yr"), zeros())
        .column("PMDEC", 1, Some("deg/yr"), zeros())
        .column("PMRA_ERR", 1, Some("deg/yr"), zeros())
        .column("PMDEC_ERR", 1, Some("deg/yr"), zeros())
        .column("PARALLAX", 1, Some("deg"), RawData::Float32(vec![0.0; n]))
        .column("PARA_ERR", 1, Some("deg"), RawData::Float32(vec![0.0; n]))
        .column("SPECTYP", 16, None, text(vec!["K0III".to_string(); n]))
}

pub fn array(arr_name: &str, stations: &[(i16, &str)]) -> BinTableBuilder {
    let n = stations.len();
    let names: Vec<String> = stations.iter().map(|(_, name)| name.to_string()).collect();

    BinTableBuilder::new("OI_ARRAY", n)
        .int_keyword("OI_REVN", 1)
        .text_keyword("ARRNAME", arr_name)
        .text_keyword("FRAME", "GEOCENTRIC")
        .float_keyword("ARRAYX", 1942014.1)
        .float_keyword("ARRAYY", -5455311.5)
        .float_keyword("ARRAYZ", -2654530.5)
        .column("TEL_NAME", 16, None, text(names.clone()))
        .column("STA_NAME", 16, None, text(names))
        .column(
            "STA_INDEX",
            1,
            None,
            RawData::Int16(stations.iter().map(|(id, _)| *id).collect()),
        )
        .column("DIAMETER", 1, Some("m"), RawData::Float32(vec![8.2; n]))
        .column("STAXYZ", 3, Some("m"), RawData::Float64(vec![0.0; n * 3]))
}

/// Wavelength table with `channels` evenly spaced H-band channels
pub fn wavelengths(ins_name: &str, channels: usize) -> BinTableBuilder {
    let waves: Vec<f32> = (0..channels).map(|i| 1.5e-6 + i as f32 * 0.1e-6).collect();

    BinTableBuilder::new("OI_WAVELENGTH", channels)
        .int_keyword("OI_REVN", 1)
        .text_keyword("INSNAME", ins_name)
        .column("EFF_WAVE", 1, Some("m"), RawData::Float32(waves))
        .column("EFF_BAND", 1, Some("m"), RawData::Float32(vec![0.1e-6; channels]))
}

fn data_header(
    ext_name: &str,
    ins_name: &str,
    arr_name: &str,
    rows: &[Observation],
) -> BinTableBuilder {
    let n = rows.len();
    BinTableBuilder::new(ext_name, n)
        .int_keyword("OI_REVN", 1)
        .text_keyword("DATE-OBS", "2019-05-02")
        .text_keyword("ARRNAME", arr_name)
        .text_keyword("INSNAME", ins_name)
        .column(
            "TARGET_ID",
            1,
            None,
            RawData::Int16(rows.iter().map(|r| r.0).collect()),
        )
        .column("TIME", 1, Some("s"), RawData::Float64(vec![0.0; n]))
        .column(
            "MJD",
            1,
            Some("day"),
            RawData::Float64(rows.iter().map(|r| r.1).collect()),
        )
        .column("INT_TIME", 1, Some("s"), RawData::Float64(vec![60.0; n]))
}

fn stations(rows: &[Observation]) -> RawData {
    RawData::Int16(rows.iter().flat_map(|r| r.2.clone()).collect())
}

/// Squared visibilities; `flagged` rows have every channel flagged
pub fn vis2(
    ins_name: &str,
    arr_name: &str,
    channels: usize,
    rows: &[Observation],
    flagged: &[usize],
) -> BinTableBuilder {
    let n = rows.len();
    let flags = (0..n)
        .flat_map(|row| vec![flagged.contains(&row); channels])
        .collect();

    data_header("OI_VIS2", ins_name, arr_name, rows)
        .column("VIS2DATA", channels, None, RawData::Float64(vec![0.7; n * channels]))
        .column("VIS2ERR", channels, None, RawData::Float64(vec![0.05; n * channels]))
        .column("UCOORD", 1, Some("m"), RawData::Float64(vec![40.0; n]))
        .column("VCOORD", 1, Some("m"), RawData::Float64(vec![-12.0; n]))
        .column("STA_INDEX", 2, None, stations(rows))
        .column("FLAG", channels, None, RawData::Logical(flags))
}

/// Closure phases, nothing flagged
pub fn t3(ins_name: &str, arr_name: &str, channels: usize, rows: &[Observation]) -> BinTableBuilder {
    let n = rows.len();
    let wave = |value: f64| RawData::Float64(vec![value; n * channels]);
    let scalar = |value: f64| RawData::Float64(vec![value; n]);

    data_header("OI_T3", ins_name, arr_name, rows)
        .column("T3AMP", channels, None, wave(0.3))
        .column("T3AMPERR", channels, None, wave(0.02))
        .column("T3PHI", channels, Some("deg"), wave(2.0))
        .column("T3PHIERR", channels, Some("deg"), wave(0.4))
        .column("U1COORD", 1, Some("m"), scalar(40.0))
        .column("V1COORD", 1, Some("m"), scalar(-12.0))
        .column("U2COORD", 1, Some("m"), scalar(-20.0))
        .column("V2COORD", 1, Some("m"), scalar(35.0))
        .column("STA_INDEX", 3, None, stations(rows))
        .column("FLAG", channels, None, RawData::Logical(vec![false; n * channels]))
}

/// Four auxiliary telescopes on the VLTI platform
pub fn vlti_array() -> BinTableBuilder {
    array("VLTI", &[(1, "A0"), (5, "G1"), (13, "J2"), (28, "K0")])
}

/// Two targets observed with PIONIER over two nights
///
/// Night one has a full four-telescope baseline set minus `(13, 28)`, night
/// two observes a single baseline.
pub fn pionier_night() -> Vec<BinTableBuilder> {
    let baselines = vec![
        obs(1, 58605.10, &[1, 5]),
        obs(1, 58605.10, &[1, 13]),
        obs(1, 58605.10, &[1, 28]),
        obs(1, 58605.10, &[5, 13]),
        obs(1, 58605.10, &[5, 28]),
        obs(2, 58606.20, &[28, 5]),
    ];
    let triplets = vec![
        obs(1, 58605.10, &[1, 5, 13]),
        obs(1, 58605.10, &[1, 5, 28]),
        obs(1, 58605.10, &[5, 13, 28]),
    ];

    vec![
        targets(&[(1, "HD 45677"), (2, "HD 50138")]),
        vlti_array(),
        wavelengths("PIONIER_Pnat(1.6)", 6),
        vis2("PIONIER_Pnat(1.6)", "VLTI", 6, &baselines, &[5]),
        t3("PIONIER_Pnat(1.6)", "VLTI", 6, &triplets),
    ]
}

pub fn write_fixture(path: &Path, tables: &[BinTableBuilder]) {
    write_tables(path, tables).unwrap();
}
