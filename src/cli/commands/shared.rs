//! Shared components for CLI commands
//!
//! This module contains the logging setup, layered configuration loading,
//! input discovery and the concurrent file loader used by every command.

use crate::Analyzer;
use crate::app::models::{Checker, OiFitsFile, Severity};
use crate::app::services::table_loader::{OiFitsLoader, resolve_location};
use crate::cli::args::InputArgs;
use crate::config::{Config, LoaderConfig};
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Number of files found in the inputs
    pub files_discovered: usize,
    /// Number of files loaded without error
    pub files_loaded: usize,
    /// Number of files that could not be read
    pub files_failed: usize,
    /// Number of OIFITS tables loaded
    pub tables_loaded: usize,
    /// Number of severe validation issues
    pub severe_issues: usize,
    /// Number of validation warnings
    pub warnings: usize,
    /// Set when the command asked for a failing exit status
    pub check_failed: bool,
    /// Total processing time
    pub processing_time: Duration,
}

impl ProcessingStats {
    /// Process exit status for these statistics
    pub fn exit_code(&self) -> i32 {
        if self.check_failed { 2 } else { 0 }
    }

    /// Fold one file outcome into the totals
    pub fn record(&mut self, outcome: &FileOutcome) {
        match &outcome.result {
            Ok(file) => {
                self.files_loaded += 1;
                self.tables_loaded += file.table_count();
            }
            Err(_) => self.files_failed += 1,
        }
        self.severe_issues += outcome.checker.count(Severity::Severe);
        self.warnings += outcome.checker.count(Severity::Warning);
    }
}

/// Load result of one input file
///
/// The checker is kept for files that failed to load as well.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub checker: Checker,
    pub result: Result<OiFitsFile>,
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` overrides the level derived from the verbosity flags. A second
/// call keeps the subscriber already installed.
pub fn setup_logging(args: &InputArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("oifits_processor={}", log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if installed.is_err() {
        debug!("Logging already initialized");
    }
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> args)
pub fn load_configuration(args: &InputArgs) -> Result<Config> {
    let default_config_path = if args.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    if let Some(config_path) = config_file {
        info!("Using config file: {}", config_path.display());
    } else {
        debug!("No config file found, using defaults");
    }

    let mut config = Config::load_layered(config_file)?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply the options common to every command
pub fn apply_cli_overrides(config: &mut Config, args: &InputArgs) {
    if let Some(jobs) = args.jobs {
        config.max_concurrent_files = jobs;
    }
}

/// Expand files, directories and glob patterns into a list of files
///
/// Directories are walked recursively and filtered by the configured
/// extensions. Explicit files are always kept. The result keeps the input
/// order and lists every file once.
pub fn discover_files(inputs: &[String], loader: &LoaderConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if is_glob_pattern(input) {
            files.extend(expand_glob(input)?);
            continue;
        }

        let path = resolve_location(input)?;
        if path.is_dir() {
            files.extend(walk_directory(&path, loader)?);
        } else if path.is_file() {
            files.push(path);
        } else {
            return Err(Error::file_not_found(path.display().to_string()));
        }
    }

    let mut seen = HashSet::new();
    files.retain(|path| seen.insert(path.clone()));

    debug!("Discovered {} files", files.len());
    for file in &files {
        debug!("  Found: {}", file.display());
    }

    Ok(files)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| {
        Error::configuration(format!("Invalid glob pattern '{}': {}", pattern, e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable glob match: {}", e),
        }
    }

    if files.is_empty() {
        warn!("Pattern '{}' matched no files", pattern);
    }
    files.sort();
    Ok(files)
}

fn walk_directory(dir: &Path, loader: &LoaderConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(format!("Failed to scan {}", dir.display()), e)
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && loader.accepts_path(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Load files concurrently, optionally analysing each one
///
/// Every file is loaded on the blocking pool, at most
/// `config.max_concurrent_files` at a time. Outcomes are returned in input
/// order whatever the completion order.
pub async fn load_files(
    files: Vec<PathBuf>,
    config: &Config,
    analyzer: Option<Analyzer>,
    progress: Option<&ProgressBar>,
) -> Vec<FileOutcome> {
    let loader = OiFitsLoader::new(config.loader.clone());
    let concurrent_limit = config.max_concurrent_files.max(1);

    let mut outcomes: Vec<(usize, FileOutcome)> = stream::iter(files.into_iter().enumerate())
        .map(|(position, path)| {
            let loader = loader.clone();
            let analyzer = analyzer.clone();
            async move {
                let task_path = path.clone();
                let (checker, result) = task::spawn_blocking(move || {
                    let mut checker = Checker::new();
                    let result = loader.load_into(&task_path, &mut checker).map(|mut file| {
                        if let Some(analyzer) = analyzer {
                            analyzer.analyze(&mut file);
                        }
                        file
                    });
                    (checker, result)
                })
                .await
                .unwrap_or_else(|e| {
                    let error = Error::processing_interrupted(format!(
                        "Loader task for {} failed: {}",
                        path.display(),
                        e
                    ));
                    (Checker::new(), Err(error))
                });

                if let Err(e) = &result {
                    warn!("Failed to load {}: {}", path.display(), e);
                }
                let outcome = FileOutcome {
                    path,
                    checker,
                    result,
                };
                (position, outcome)
            }
        })
        .buffer_unordered(concurrent_limit)
        .inspect(|_| {
            if let Some(pb) = progress {
                pb.inc(1);
            }
        })
        .collect()
        .await;

    outcomes.sort_by_key(|(position, _)| *position);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    match ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} [{per_sec}] ETA: {eta}",
    ) {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => debug!("Falling back to default progress style: {}", e),
    }
    pb.set_message(message.to_string());
    pb
}
