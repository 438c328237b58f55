//! Post-load analysis of OIFITS files
//!
//! The analyzer walks a loaded file once and fills the derived state of every
//! table: target lookups, instrument modes, station rows, granules, flagged
//! counts, canonical station indexes and inferred station configurations.
//!
//! Analysis never fails. Inconsistencies (unknown targets, rows whose station
//! index has no configuration) fall back to placeholders and are logged.
//!
//! # Usage
//!
//! ```no_run
//! use oifits_processor::{Analyzer, OiFitsLoader};
//! use oifits_processor::config::LoaderConfig;
//! use std::path::Path;
//!
//! let mut result = OiFitsLoader::new(LoaderConfig::default()).load(Path::new("night.fits"))?;
//! Analyzer::default().analyze(&mut result.file);
//!
//! for data in result.file.data_tables() {
//!     println!("{:?}", data.distinct_configurations());
//! }
//! # Ok::<(), oifits_processor::Error>(())
//! ```

use crate::app::models::OiFitsFile;
use crate::config::AnalyzerConfig;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub mod combinations;
pub mod configuration;
pub mod indexing;
pub mod station_index;

#[cfg(test)]
pub mod tests;

pub use combinations::CombinationCache;
pub use configuration::{InferenceResult, infer_configurations};
pub use station_index::{CanonicalStaIndexes, canonicalize, station_names};

use indexing::{DataContext, FileIndexes};

/// Derived-state builder for loaded files
///
/// Cloning an analyzer shares its combination cache.
#[derive(Debug, Clone)]
pub struct Analyzer {
    cache: Arc<CombinationCache>,
    config: AnalyzerConfig,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Arc::new(CombinationCache::new()))
    }
}

impl Analyzer {
    pub fn new(cache: Arc<CombinationCache>) -> Self {
        Self {
            cache,
            config: AnalyzerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &Arc<CombinationCache> {
        &self.cache
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Build the derived state of every table in `file`
    ///
    /// File-level maps are rebuilt from scratch, so analyzing twice gives the
    /// same result.
    pub fn analyze(&self, file: &mut OiFitsFile) {
        let start = Instant::now();
        file.reset_file_indexes();

        let OiFitsFile {
            targets,
            arrays,
            wavelengths,
            data,
            granules,
            tables_per_target,
            ..
        } = file;

        targets.iter_mut().for_each(indexing::index_target);
        wavelengths.iter_mut().for_each(indexing::index_wavelength);
        arrays.iter_mut().for_each(indexing::index_array);

        let ctx = DataContext {
            target: targets.first(),
            wavelengths,
            arrays,
            cache: &self.cache,
            config: &self.config,
        };
        let mut files = FileIndexes {
            granules,
            tables_per_target,
        };
        for (position, table) in data.iter_mut().enumerate() {
            indexing::index_data(position, table, &ctx, &mut files);
        }

        info!(
            "Analyzed {} in {:.1} ms: {} data tables, {} granules, {} targets",
            file.path().display(),
            start.elapsed().as_secs_f64() * 1000.0,
            file.data_tables().len(),
            file.granules().len(),
            file.target_names().count()
        );
    }
}
