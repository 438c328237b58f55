//! Validate command implementation
//!
//! Loads every input file and reports the schema and cross-table findings
//! collected by the loader, either as colored text or as a JSON document.

use super::shared::{
    FileOutcome, ProcessingStats, create_progress_bar, discover_files, load_configuration,
    load_files, setup_logging,
};
use crate::app::models::{Severity, ValidationIssue};
use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Instant;
use tracing::{debug, info};

/// Validation findings for a whole run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub files: Vec<FileValidation>,
}

/// Validation findings for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileValidation {
    pub path: String,
    /// Set when the file could not be read at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tables: usize,
    pub severe: usize,
    pub warnings: usize,
    pub issues: Vec<ValidationIssue>,
}

impl FileValidation {
    fn from_outcome(outcome: &FileOutcome) -> Self {
        let checker = &outcome.checker;
        let (tables, error) = match &outcome.result {
            Ok(file) => (file.table_count(), None),
            Err(e) => (0, Some(e.to_string())),
        };
        Self {
            path: outcome.path.display().to_string(),
            error,
            tables,
            severe: checker.count(Severity::Severe),
            warnings: checker.count(Severity::Warning),
            issues: checker.issues().to_vec(),
        }
    }

    /// True when the file is unreadable or has severe issues
    pub fn is_invalid(&self) -> bool {
        self.error.is_some() || self.severe > 0
    }
}

impl ValidationReport {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        Self {
            generated_at: Utc::now(),
            files: outcomes.iter().map(FileValidation::from_outcome).collect(),
        }
    }

    pub fn invalid_files(&self) -> usize {
        self.files.iter().filter(|f| f.is_invalid()).count()
    }
}

/// Validate command runner
pub async fn run_validate(args: &ValidateArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    setup_logging(&args.input)?;

    debug!("Validation arguments: {:?}", args);
    args.input.validate()?;

    let mut config = load_configuration(&args.input)?;
    if args.no_cross_checks {
        config = config.without_cross_checks();
    }

    let files = discover_files(&args.input.paths, &config.loader)?;
    if files.is_empty() {
        return Err(Error::configuration("No OIFITS files found in the given paths"));
    }
    info!("Validating {} files", files.len());

    let progress = args
        .input
        .show_progress()
        .then(|| create_progress_bar(files.len() as u64, "Validating"));

    let discovered = files.len();
    let outcomes = load_files(files, &config, None, progress.as_ref()).await;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let report = ValidationReport::from_outcomes(&outcomes);
    let rendered = match args.input.output_format {
        OutputFormat::Human => render_human(&report, args.show_info),
        OutputFormat::Json => render_json(&report)?,
    };
    print!("{}", rendered);

    let mut stats = ProcessingStats {
        files_discovered: discovered,
        ..ProcessingStats::default()
    };
    outcomes.iter().for_each(|o| stats.record(o));
    stats.check_failed = args.fail_on_severe && report.invalid_files() > 0;
    stats.processing_time = start_time.elapsed();

    info!(
        "Validation completed in {:.2}s: {} files, {} severe issues, {} warnings",
        stats.processing_time.as_secs_f64(),
        stats.files_discovered,
        stats.severe_issues,
        stats.warnings
    );

    Ok(stats)
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Severe => "SEVERE".bright_red().bold(),
        Severity::Warning => "WARNING".yellow().bold(),
        Severity::Info => "INFO".dimmed(),
    }
}

/// Human-readable report, one block per file
pub fn render_human(report: &ValidationReport, show_info: bool) -> String {
    let mut out = String::new();

    for file in &report.files {
        let _ = writeln!(out, "\n{}", file.path.bold());

        if let Some(error) = &file.error {
            let _ = writeln!(out, "  {} {}", "ERROR".bright_red().bold(), error);
        }

        let shown: Vec<&ValidationIssue> = file
            .issues
            .iter()
            .filter(|i| show_info || i.severity > Severity::Info)
            .collect();

        if shown.is_empty() && file.error.is_none() {
            let _ = writeln!(out, "  {} no issues", "OK".bright_green().bold());
        }
        for issue in shown {
            let _ = writeln!(out, "  {:<8} {}", severity_label(issue.severity), issue.message);
        }
    }

    let invalid = report.invalid_files();
    let summary = format!(
        "{} files checked, {} with severe issues or read errors",
        report.files.len(),
        invalid
    );
    if invalid == 0 {
        let _ = writeln!(out, "\n{}", summary.bright_green());
    } else {
        let _ = writeln!(out, "\n{}", summary.bright_red());
    }
    out
}

/// Pretty-printed JSON report
pub fn render_json(report: &ValidationReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::serialization("Failed to serialize validation report", e))?;
    json.push('\n');
    Ok(json)
}
