//! Configuration management and validation.
//!
//! Provides configuration structures for the table loader, the analyzer
//! and the command-line front end. Configuration is layered: defaults, then
//! an optional JSON file, then command-line overrides.

use crate::constants::DEFAULT_FILE_EXTENSIONS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the application directory under the user config directory
const CONFIG_DIR_NAME: &str = "oifits-processor";

/// Name of the configuration file
const CONFIG_FILE_NAME: &str = "config.json";

/// Table loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Check enumerated keyword and column values (FRAME, VELTYP, VELDEF)
    pub check_accepted_values: bool,

    /// Run reference checks between tables after loading
    pub cross_checks: bool,

    /// File extensions picked up when scanning directories
    pub file_extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            check_accepted_values: true,
            cross_checks: true,
            file_extensions: DEFAULT_FILE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl LoaderConfig {
    /// True when the path carries one of the configured extensions
    pub fn accepts_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.file_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

/// Analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Infer station configurations for data tables
    pub compute_configurations: bool,

    /// Log implied but unobserved station indexes
    pub report_missing: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            compute_configurations: true,
            report_missing: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub analyzer: AnalyzerConfig,

    /// Maximum number of files loaded at the same time
    pub max_concurrent_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            analyzer: AnalyzerConfig::default(),
            max_concurrent_files: num_cpus::get(),
        }
    }
}

impl Config {
    /// Create configuration with a custom concurrency limit
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Disable accepted-value checks
    pub fn without_accepted_value_checks(mut self) -> Self {
        self.loader.check_accepted_values = false;
        self
    }

    /// Disable cross-table reference checks
    pub fn without_cross_checks(mut self) -> Self {
        self.loader.cross_checks = false;
        self
    }

    /// Skip station configuration inference
    pub fn without_configurations(mut self) -> Self {
        self.analyzer.compute_configurations = false;
        self
    }

    /// Replace the recognised file extensions
    pub fn with_file_extensions(mut self, extensions: Vec<String>) -> Self {
        self.loader.file_extensions = extensions;
        self
    }

    /// Default configuration file location
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| Error::serialization(format!("Invalid config {}", path.display()), e))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults overlaid with the given file, if any
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(Error::configuration(
                "max_concurrent_files must be greater than 0",
            ));
        }

        if self.loader.file_extensions.is_empty() {
            return Err(Error::configuration(
                "At least one file extension must be configured",
            ));
        }

        if let Some(bad) = self
            .loader
            .file_extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(Error::configuration(format!(
                "Invalid file extension '{}': use the bare extension, e.g. 'fits'",
                bad
            )));
        }

        Ok(())
    }
}
