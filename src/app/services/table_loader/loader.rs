//! Two-pass OIFITS loading orchestration

use super::{columns, cross_checks, keywords};
use crate::app::models::{
    Cardinality, Checker, OiArray, OiData, OiFitsFile, OiTable, OiTarget, OiWavelength,
    TableKind,
};
use crate::app::services::fits_io::{self, RawTable};
use crate::config::LoaderConfig;
use crate::constants::keywords as kw;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

const FILE_URL_PREFIX: &str = "file://";

/// Loaded file together with its validation report
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub file: OiFitsFile,
    pub checker: Checker,
}

/// Schema-driven loader for OIFITS files
#[derive(Debug, Clone, Default)]
pub struct OiFitsLoader {
    config: LoaderConfig,
}

impl OiFitsLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load and validate a file
    ///
    /// Only I/O failures and container corruption are errors. Schema
    /// violations are recorded in the returned checker.
    pub fn load(&self, path: &Path) -> Result<LoadResult> {
        let mut checker = Checker::new();
        let file = self.load_into(path, &mut checker)?;
        Ok(LoadResult { file, checker })
    }

    /// Load and validate a file, recording issues into `checker`
    ///
    /// A file that cannot be read leaves a severe entry in `checker` before
    /// the error is returned.
    pub fn load_into(&self, path: &Path, checker: &mut Checker) -> Result<OiFitsFile> {
        let start = Instant::now();
        checker.info(format!("Loading File: {}", path.display()));

        let raw = match fits_io::read_file(path) {
            Ok(raw) => raw,
            Err(e) => {
                match &e {
                    Error::FileNotFound { .. } => {
                        checker.severe(format!("File not found: {}", path.display()))
                    }
                    _ => checker.severe(format!("Unable to load file: {}", e)),
                }
                return Err(e);
            }
        };
        let file = self.build(path, &raw, checker);

        info!(
            "Loaded {} in {:.1} ms: {} tables, {}",
            path.display(),
            start.elapsed().as_secs_f64() * 1000.0,
            file.table_count(),
            checker.summary()
        );
        Ok(file)
    }

    /// Build the domain model from already decoded tables
    pub fn load_raw(&self, path: &Path, raw: &[RawTable]) -> LoadResult {
        let mut checker = Checker::new();
        checker.info(format!("Loading File: {}", path.display()));
        let file = self.build(path, raw, &mut checker);
        LoadResult { file, checker }
    }

    fn build(&self, path: &Path, raw: &[RawTable], checker: &mut Checker) -> OiFitsFile {
        let mut file = OiFitsFile::new(path);
        self.load_reference_tables(&mut file, raw, checker);
        let has_data = self.load_data_tables(&mut file, raw, checker);

        if !has_data {
            checker.severe(
                "No OI_VIS, OI_VIS2, OI_T3 table found: one or more of them must be present",
            );
        }

        if self.config.cross_checks {
            cross_checks::run(&file, checker);
        }

        file
    }

    /// First pass: OI_TARGET, OI_ARRAY and OI_WAVELENGTH
    fn load_reference_tables(&self, file: &mut OiFitsFile, raw: &[RawTable], checker: &mut Checker) {
        for table in raw {
            let Some(kind) = table_kind(table) else {
                continue;
            };
            if kind.is_data() {
                continue;
            }

            checker.info(format!("Analysing table [{}]: {}", table.index, kind));
            let oi_table = self.process_table(table, kind, None, checker);

            match kind {
                TableKind::Target => file.add_target(OiTarget::new(oi_table)),
                TableKind::Array => file.add_array(OiArray::new(oi_table)),
                TableKind::Wavelength => file.add_wavelength(OiWavelength::new(oi_table)),
                TableKind::Vis | TableKind::Vis2 | TableKind::T3 => {}
            }
        }
    }

    /// Second pass: OI_VIS, OI_VIS2 and OI_T3
    ///
    /// Returns whether any data table was found.
    fn load_data_tables(&self, file: &mut OiFitsFile, raw: &[RawTable], checker: &mut Checker) -> bool {
        let mut has_data = false;

        for table in raw {
            let Some(kind) = table_kind(table).filter(TableKind::is_data) else {
                continue;
            };

            let n_wave = table
                .header
                .text(kw::INSNAME)
                .and_then(|ins_name| file.wavelength_for(ins_name))
                .map(|wavelength| wavelength.n_wave());

            checker.info(format!("Analysing table [{}]: {}", table.index, kind));
            let oi_table = self.process_table(table, kind, n_wave, checker);
            file.add_data(OiData::new(oi_table, n_wave));
            has_data = true;
        }

        has_data
    }

    fn process_table(
        &self,
        raw: &RawTable,
        kind: TableKind,
        n_wave: Option<usize>,
        checker: &mut Checker,
    ) -> OiTable {
        debug!("Processing table [{}]: {} ({} rows)", raw.index, kind, raw.n_rows);
        let schema = kind.schema();
        let mut table = OiTable::new(kind, raw.index, raw.n_rows);

        for desc in schema.keywords() {
            match raw.header.get(desc.name) {
                None => {
                    if desc.mandatory {
                        checker.severe(format!("Missing keyword '{}'", desc.name));
                    }
                }
                Some(card) => {
                    let value = keywords::parse_keyword(desc, card, checker);
                    if self.config.check_accepted_values {
                        keywords::check_accepted_value(desc, &value, checker);
                    }
                    table.set_keyword(desc.name, value);
                }
            }
        }

        for desc in schema.columns() {
            match raw.column(desc.name) {
                None => {
                    if desc.mandatory {
                        checker.severe(format!("Missing column '{}'", desc.name));
                    }
                }
                Some(column) => {
                    let expected_repeat = match desc.cardinality {
                        Cardinality::Fixed(n) => Some(n),
                        Cardinality::NWave => n_wave.filter(|n| *n > 0),
                    };
                    columns::check_column(desc, column, expected_repeat, checker);

                    let data = columns::convert_column(desc, column, raw.n_rows);
                    if self.config.check_accepted_values {
                        columns::check_accepted_values(desc, &data, checker);
                    }
                    table.set_column(desc.name, data);
                }
            }
        }

        table
    }
}

fn table_kind(table: &RawTable) -> Option<TableKind> {
    table.ext_name().and_then(TableKind::from_ext_name)
}

/// Map a location to a local path
///
/// Plain paths and `file://` URLs are accepted; any other URL scheme is
/// rejected since files are never fetched remotely.
pub fn resolve_location(location: &str) -> Result<PathBuf> {
    if let Some(path) = location.strip_prefix(FILE_URL_PREFIX) {
        return Ok(PathBuf::from(path));
    }
    if location.contains("://") {
        return Err(Error::unsupported_location(location));
    }
    Ok(PathBuf::from(location))
}

/// Load an OIFITS file from a path or `file://` URL
pub fn load_oifits(location: &str, config: &LoaderConfig) -> Result<LoadResult> {
    let path = resolve_location(location)?;
    OiFitsLoader::new(config.clone()).load(&path)
}
