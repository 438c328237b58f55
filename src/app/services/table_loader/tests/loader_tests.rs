//! Tests for schema-driven loading

use super::super::loader::{OiFitsLoader, load_oifits, resolve_location};
use super::*;
use crate::Error;
use crate::app::models::{Checker, Severity};
use crate::config::Config;
use crate::app::services::fits_io::write_tables;
use std::path::PathBuf;
use tempfile::TempDir;

fn clean_rows() -> Vec<DataRow> {
    vec![
        row(1, 58000.2, &[1, 2]),
        row(1, 58000.3, &[2, 3]),
        row(2, 58001.1, &[1, 2]),
    ]
}

#[test]
fn test_clean_file_has_only_info_messages() {
    let result = load_builders(&standard_builders(&clean_rows()));

    assert!(!result.checker.has_severe(), "{}", result.checker.report());
    assert_eq!(result.checker.count(Severity::Warning), 0, "{}", result.checker.report());

    let file = &result.file;
    assert_eq!(file.target_tables().len(), 1);
    assert_eq!(file.array_tables().len(), 1);
    assert_eq!(file.wavelength_tables().len(), 1);
    assert_eq!(file.data_tables().len(), 1);
    assert_eq!(file.table_count(), 4);
}

#[test]
fn test_messages_follow_table_order() {
    let result = load_builders(&standard_builders(&clean_rows()));
    let infos: Vec<&str> = result
        .checker
        .issues_with(Severity::Info)
        .map(|i| i.message.as_str())
        .collect();

    assert_eq!(
        infos,
        vec![
            "Loading File: fixture.fits",
            "Analysing table [1]: OI_TARGET",
            "Analysing table [2]: OI_ARRAY",
            "Analysing table [3]: OI_WAVELENGTH",
            "Analysing table [4]: OI_VIS2",
        ]
    );
}

#[test]
fn test_loaded_values() {
    let result = load_builders(&standard_builders(&clean_rows()));
    let file = &result.file;

    let target = file.oi_target().unwrap();
    assert_eq!(target.target_ids(), vec![1, 2]);
    assert_eq!(
        target.text_column("TARGET").unwrap(),
        &["HD 1".to_string(), "HD 2".to_string()]
    );

    let array = &file.array_tables()[0];
    assert_eq!(array.arr_name(), Some("VLTI"));
    assert_eq!(array.keyword_str("FRAME"), Some("GEOCENTRIC"));
    assert_eq!(array.station_ids(), vec![1, 2, 3, 4]);

    let data = &file.data_tables()[0];
    assert_eq!(data.ins_name(), Some("AMBER"));
    assert_eq!(data.n_wave(), Some(3));
    assert_eq!(data.target_ids(), vec![1, 1, 2]);
    assert_eq!(data.sta_index().unwrap().row(1), &[2, 3]);
    assert_eq!(data.flags().unwrap().width(), 3);
    assert!(data.is_changed());
}

#[test]
fn test_single_channel_data_is_two_dimensional() {
    let builders = vec![
        target_table(&[(1, "HD 1")]),
        wavelength_table("PIONIER", &[(1.65e-6, 0.3e-6)]),
        data_table(TableKind::Vis2, "PIONIER", None, 1, &[row(1, 58000.0, &[1, 2])]),
    ];
    let result = load_builders(&builders);
    let vis2 = result.file.data_tables()[0].double_column("VIS2DATA").unwrap();

    assert!(vis2.is_two_dimensional());
    assert_eq!(vis2.rows(), 1);
    assert_eq!(vis2.width(), 1);
}

#[test]
fn test_missing_mandatory_column_is_severe() {
    let mut raw = raw_tables(&standard_builders(&clean_rows()));
    let data = raw.last_mut().unwrap();
    data.columns.retain(|c| c.name != "MJD");

    let result = load_raw(&raw);
    assert!(result.checker.mentions(Severity::Severe, "Missing column 'MJD'"));

    let data = &result.file.data_tables()[0];
    assert!(data.mjd().is_none());
    assert_eq!(data.night_ids(), vec![0, 0, 0]);
}

#[test]
fn test_missing_mandatory_keyword_is_severe() {
    let builders = vec![
        target_table(&[(1, "HD 1")]),
        BinTableBuilder::new("OI_WAVELENGTH", 1)
            .int_keyword("OI_REVN", 1)
            .column("EFF_WAVE", 1, Some("m"), RawData::Float32(vec![2.2e-6]))
            .column("EFF_BAND", 1, Some("m"), RawData::Float32(vec![0.1e-6])),
        data_table(TableKind::Vis2, "AMBER", None, 1, &[row(1, 58000.0, &[1, 2])]),
    ];
    let result = load_builders(&builders);

    assert!(result.checker.mentions(Severity::Severe, "Missing keyword 'INSNAME'"));
    assert_eq!(result.file.wavelength_tables()[0].ins_name(), None);
}

#[test]
fn test_unresolved_instrument_cannot_check_repeat() {
    let builders = vec![
        target_table(&[(1, "HD 1")]),
        wavelength_table("AMBER", &k_band()),
        data_table(TableKind::Vis2, "GRAVITY", None, 3, &[row(1, 58000.0, &[1, 2])]),
    ];
    let result = load_builders(&builders);
    let checker = &result.checker;

    assert!(checker.mentions(Severity::Warning, "Can't check repeat for column 'VIS2DATA'"));
    assert!(checker.mentions(Severity::Warning, "Can't check repeat for column 'FLAG'"));
    assert!(checker.mentions(
        Severity::Severe,
        "No OI_WAVELENGTH table found for INSNAME 'GRAVITY'"
    ));
    assert_eq!(result.file.data_tables()[0].n_wave(), None);
}

#[test]
fn test_wrong_channel_count_is_severe() {
    let builders = vec![
        target_table(&[(1, "HD 1")]),
        wavelength_table("AMBER", &k_band()),
        data_table(TableKind::T3, "AMBER", None, 2, &[row(1, 58000.0, &[1, 2, 3])]),
    ];
    let result = load_builders(&builders);

    assert!(result.checker.mentions(
        Severity::Severe,
        "Invalid format for column 'T3AMP', found '2D' should be '3D'"
    ));
    assert!(result.checker.mentions(
        Severity::Severe,
        "Invalid format for column 'FLAG', found '2L' should be '3L'"
    ));
}

#[test]
fn test_no_data_table_is_severe() {
    let builders = vec![
        target_table(&[(1, "HD 1")]),
        wavelength_table("AMBER", &k_band()),
    ];
    let result = load_builders(&builders);

    assert!(result.checker.mentions(
        Severity::Severe,
        "No OI_VIS, OI_VIS2, OI_T3 table found: one or more of them must be present"
    ));
    assert!(!result.file.has_data());
}

#[test]
fn test_unknown_extensions_are_skipped() {
    let mut builders = standard_builders(&clean_rows());
    builders.insert(
        1,
        BinTableBuilder::new("IMAGING_INPUT", 1).column(
            "VALUE",
            1,
            None,
            RawData::Float64(vec![1.0]),
        ),
    );
    let result = load_builders(&builders);

    assert_eq!(result.file.table_count(), 4);
    assert!(!result.checker.mentions(Severity::Info, "IMAGING_INPUT"));
    assert!(result.checker.mentions(Severity::Info, "Analysing table [5]: OI_VIS2"));
}

#[test]
fn test_data_before_wavelength_still_resolves_channels() {
    let builders = vec![
        data_table(TableKind::Vis, "AMBER", None, 3, &[row(1, 58000.0, &[1, 2])]),
        target_table(&[(1, "HD 1")]),
        wavelength_table("AMBER", &k_band()),
    ];
    let result = load_builders(&builders);

    assert!(!result.checker.has_severe(), "{}", result.checker.report());
    assert_eq!(result.file.data_tables()[0].n_wave(), Some(3));
}

#[test]
fn test_cross_check_findings() {
    let builders = vec![
        target_table(&[(1, "HD 1")]),
        array_table("VLTI", &[1, 2]),
        wavelength_table("AMBER", &k_band()),
        data_table(
            TableKind::Vis2,
            "AMBER",
            Some("CHARA"),
            3,
            &[row(1, 58000.0, &[1, 2]), row(7, 58000.0, &[1, 2])],
        ),
        data_table(
            TableKind::Vis2,
            "AMBER",
            Some("VLTI"),
            3,
            &[row(1, 58000.0, &[1, 9])],
        ),
    ];
    let result = load_builders(&builders);
    let checker = &result.checker;

    assert!(checker.mentions(Severity::Warning, "No OI_ARRAY table found for ARRNAME 'CHARA'"));
    assert!(checker.mentions(Severity::Severe, "Unknown TARGET_ID 7 in table [4]: OI_VIS2"));
    assert!(checker.mentions(Severity::Warning, "Unknown STA_INDEX 9 in table [5]: OI_VIS2"));
}

#[test]
fn test_missing_target_table_is_severe() {
    let builders = vec![
        wavelength_table("AMBER", &k_band()),
        data_table(TableKind::Vis2, "AMBER", None, 3, &[row(1, 58000.0, &[1, 2])]),
    ];
    let result = load_builders(&builders);

    assert!(result
        .checker
        .mentions(Severity::Severe, "No OI_TARGET table found: one must be present"));
}

#[test]
fn test_cross_checks_can_be_disabled() {
    let builders = vec![
        wavelength_table("AMBER", &k_band()),
        data_table(TableKind::Vis2, "AMBER", None, 3, &[row(1, 58000.0, &[1, 2])]),
    ];
    let raw = raw_tables(&builders);
    let config = Config::default().without_cross_checks();
    let result = OiFitsLoader::new(config.loader).load_raw(Path::new("fixture.fits"), &raw);

    assert!(!result.checker.has_severe(), "{}", result.checker.report());
}

#[test]
fn test_load_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("night.fits");
    write_tables(&path, &standard_builders(&clean_rows())).unwrap();

    let location = format!("file://{}", path.display());
    let result = load_oifits(&location, &LoaderConfig::default()).unwrap();

    assert_eq!(result.file.path(), path.as_path());
    assert_eq!(result.file.data_tables().len(), 1);
    assert!(!result.checker.has_severe());
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.fits");

    let result = OiFitsLoader::default().load(&path);
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}

#[test]
fn test_unreadable_files_are_reported_before_failing() {
    let temp_dir = TempDir::new().unwrap();
    let loader = OiFitsLoader::default();

    let absent = temp_dir.path().join("absent.fits");
    let mut checker = Checker::new();
    let result = loader.load_into(&absent, &mut checker);
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
    assert_eq!(
        checker.issues_with(Severity::Severe).next().unwrap().message,
        format!("File not found: {}", absent.display())
    );

    let garbage = temp_dir.path().join("garbage.fits");
    std::fs::write(&garbage, b"not a fits file").unwrap();
    let mut checker = Checker::new();
    let result = loader.load_into(&garbage, &mut checker);
    assert!(matches!(result, Err(Error::FormatCorruption { .. })));
    assert_eq!(checker.count(Severity::Severe), 1);
    assert_eq!(checker.count(Severity::Info), 1);
}

#[test]
fn test_load_into_matches_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("night.fits");
    write_tables(&path, &standard_builders(&clean_rows())).unwrap();

    let loader = OiFitsLoader::default();
    let mut checker = Checker::new();
    let file = loader.load_into(&path, &mut checker).unwrap();
    let loaded = loader.load(&path).unwrap();

    assert_eq!(file.table_count(), loaded.file.table_count());
    assert_eq!(checker.issues(), loaded.checker.issues());
}

#[test]
fn test_resolve_location() {
    assert_eq!(
        resolve_location("data/night.fits").unwrap(),
        PathBuf::from("data/night.fits")
    );
    assert_eq!(
        resolve_location("file:///tmp/night.fits").unwrap(),
        PathBuf::from("/tmp/night.fits")
    );
    assert!(matches!(
        resolve_location("https://example.org/night.fits"),
        Err(Error::UnsupportedLocation { .. })
    ));
}
