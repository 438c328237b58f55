//! Command-line argument definitions for the OIFITS processor
//!
//! This module defines the CLI interface using the clap derive API. Both
//! commands share the input, configuration and verbosity options through
//! [`InputArgs`].

use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the OIFITS processor
///
/// Loads OIFITS files, reports schema violations and infers the station
/// configurations behind each observation.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "oifits-processor",
    version,
    about = "Validate and analyse OIFITS optical interferometry files",
    long_about = "Loads OIFITS files (FITS binary tables following the optical interferometry \
                  exchange standard), checks every table against the standard's schemas and \
                  reports the findings. The analyze command also groups observations by target, \
                  instrument mode and night, and infers the station configurations used."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load files and report schema and cross-table violations
    Validate(ValidateArgs),
    /// Load files and report granules, configurations and missing baselines
    Analyze(AnalyzeArgs),
}

/// Options shared by every command
#[derive(Debug, Clone, Parser)]
pub struct InputArgs {
    /// Files, directories or glob patterns to load
    ///
    /// Directories are scanned recursively for the configured extensions
    /// (fits, oifits, fit by default). `file://` URLs are accepted.
    #[arg(value_name = "PATHS", required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// Path to configuration file
    ///
    /// JSON configuration file. If not specified, looks for
    /// <config dir>/oifits-processor/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of files loaded concurrently
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "COUNT",
        help = "Number of files loaded concurrently (default: number of CPUs)"
    )]
    pub jobs: Option<usize>,

    /// Output format for the report
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the report"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress progress and log output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Exit with a non-zero status when any file has severe issues
    #[arg(long = "fail-on-severe", help = "Exit with status 2 if any severe issue is found")]
    pub fail_on_severe: bool,

    /// Include informational messages in the human report
    #[arg(long = "show-info", help = "Include informational messages in the report")]
    pub show_info: bool,

    /// Skip the reference checks between tables
    #[arg(long = "no-cross-checks", help = "Skip reference checks between tables")]
    pub no_cross_checks: bool,
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// List station indexes implied by a configuration but never observed
    #[arg(long = "show-missing", help = "List unobserved station indexes per table")]
    pub show_missing: bool,

    /// Skip station configuration inference
    #[arg(long = "no-configurations", help = "Skip station configuration inference")]
    pub no_configurations: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<&Commands> {
        self.command.as_ref()
    }
}

impl Commands {
    /// Options shared by every command
    pub fn input(&self) -> &InputArgs {
        match self {
            Commands::Validate(args) => &args.input,
            Commands::Analyze(args) => &args.input,
        }
    }
}

impl InputArgs {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.paths.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::configuration("Input paths cannot be empty"));
        }

        if self.jobs == Some(0) {
            return Err(Error::configuration(
                "Number of jobs must be greater than 0",
            ));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
