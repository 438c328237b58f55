//! Analyze command implementation
//!
//! Loads and analyses every input file, then reports the granules, the
//! inferred station configurations and, on request, the station indexes a
//! configuration implies but no row observed.

use super::shared::{
    FileOutcome, ProcessingStats, create_progress_bar, discover_files, load_configuration,
    load_files, setup_logging,
};
use crate::app::models::{OiData, OiFitsFile, format_sta_index};
use crate::app::services::analyzer::{Analyzer, CombinationCache, station_names};
use crate::cli::args::{AnalyzeArgs, OutputFormat};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Analysis results for a whole run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub files: Vec<FileAnalysis>,
}

/// Analysis results for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub severe_issues: usize,
    pub targets: Vec<TargetSummary>,
    pub granules: Vec<GranuleSummary>,
    pub tables: Vec<TableAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub name: String,
    pub tables: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GranuleSummary {
    pub target: String,
    pub instrument: String,
    pub night_id: i32,
    pub tables: Vec<usize>,
}

/// Per data table results
///
/// `position` is the table's index among the data tables of the file, the
/// index used by granules and targets. `extension` is its HDU number.
#[derive(Debug, Clone, Serialize)]
pub struct TableAnalysis {
    pub position: usize,
    pub extension: usize,
    pub kind: String,
    pub ins_name: Option<String>,
    pub arr_name: Option<String>,
    pub rows: usize,
    pub flagged: usize,
    pub station_indexes: usize,
    pub configurations: Vec<ConfigurationSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Vec<i16>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationSummary {
    pub stations: Vec<i16>,
    pub names: String,
    pub rows: usize,
}

impl TableAnalysis {
    fn from_table(position: usize, table: &OiData, file: &OiFitsFile, show_missing: bool) -> Self {
        let array = table.arr_name().and_then(|name| file.array_for(name));

        let configurations = table
            .distinct_configurations()
            .unwrap_or_default()
            .iter()
            .map(|configuration| ConfigurationSummary {
                stations: configuration.to_vec(),
                names: station_names(array, configuration),
                rows: (0..table.n_rows())
                    .filter(|&row| {
                        table
                            .row_configuration(row)
                            .is_some_and(|c| Arc::ptr_eq(c, configuration))
                    })
                    .count(),
            })
            .collect();

        let missing = if show_missing {
            table
                .missing_sta_indexes()
                .map(|m| m.iter().cloned().collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Self {
            position,
            extension: table.ext_index(),
            kind: table.kind().to_string(),
            ins_name: table.ins_name().map(str::to_string),
            arr_name: table.arr_name().map(str::to_string),
            rows: table.n_rows(),
            flagged: table.flagged_count().unwrap_or(0),
            station_indexes: table.distinct_sta_indexes().map_or(0, <[_]>::len),
            configurations,
            missing,
        }
    }
}

impl FileAnalysis {
    fn from_outcome(outcome: &FileOutcome, show_missing: bool) -> Self {
        let path = outcome.path.display().to_string();
        let severe_issues = outcome.checker.count(crate::Severity::Severe);
        let file = match &outcome.result {
            Ok(file) => file,
            Err(e) => {
                return Self {
                    path,
                    error: Some(e.to_string()),
                    severe_issues,
                    targets: Vec::new(),
                    granules: Vec::new(),
                    tables: Vec::new(),
                };
            }
        };

        let targets = file
            .target_names()
            .map(|name| TargetSummary {
                name: name.to_string(),
                tables: file.tables_for_target(name).to_vec(),
            })
            .collect();

        let granules = file
            .granules()
            .iter()
            .map(|(granule, tables)| GranuleSummary {
                target: granule.target.name.clone(),
                instrument: granule.ins_mode.ins_name.clone(),
                night_id: granule.night_id,
                tables: tables.iter().copied().collect(),
            })
            .collect();

        let tables = file
            .data_tables()
            .iter()
            .enumerate()
            .map(|(position, table)| TableAnalysis::from_table(position, table, file, show_missing))
            .collect();

        Self {
            path,
            error: None,
            severe_issues,
            targets,
            granules,
            tables,
        }
    }
}

impl AnalysisReport {
    pub fn from_outcomes(outcomes: &[FileOutcome], show_missing: bool) -> Self {
        Self {
            generated_at: Utc::now(),
            files: outcomes
                .iter()
                .map(|o| FileAnalysis::from_outcome(o, show_missing))
                .collect(),
        }
    }
}

/// Analyze command runner
pub async fn run_analyze(args: &AnalyzeArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    setup_logging(&args.input)?;

    debug!("Analysis arguments: {:?}", args);
    args.input.validate()?;

    let mut config = load_configuration(&args.input)?;
    if args.no_configurations {
        config = config.without_configurations();
    }

    let files = discover_files(&args.input.paths, &config.loader)?;
    if files.is_empty() {
        return Err(Error::configuration("No OIFITS files found in the given paths"));
    }
    info!("Analysing {} files", files.len());

    let analyzer =
        Analyzer::new(Arc::new(CombinationCache::new())).with_config(config.analyzer.clone());
    let progress = args
        .input
        .show_progress()
        .then(|| create_progress_bar(files.len() as u64, "Analysing"));

    let discovered = files.len();
    let outcomes = load_files(files, &config, Some(analyzer.clone()), progress.as_ref()).await;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    debug!("Combination tables cached: {}", analyzer.cache().len());

    let report = AnalysisReport::from_outcomes(&outcomes, args.show_missing);
    let rendered = match args.input.output_format {
        OutputFormat::Human => render_human(&report, args.show_missing),
        OutputFormat::Json => render_json(&report)?,
    };
    print!("{}", rendered);

    let mut stats = ProcessingStats {
        files_discovered: discovered,
        ..ProcessingStats::default()
    };
    outcomes.iter().for_each(|o| stats.record(o));
    stats.processing_time = start_time.elapsed();

    info!(
        "Analysis completed in {:.2}s: {} files, {} tables",
        stats.processing_time.as_secs_f64(),
        stats.files_loaded,
        stats.tables_loaded
    );

    Ok(stats)
}

/// Human-readable report, one block per file
pub fn render_human(report: &AnalysisReport, show_missing: bool) -> String {
    let mut out = String::new();

    for file in &report.files {
        let _ = writeln!(out, "\n{}", file.path.bold());

        if let Some(error) = &file.error {
            let _ = writeln!(out, "  {} {}", "ERROR".bright_red().bold(), error);
            continue;
        }
        if file.severe_issues > 0 {
            let _ = writeln!(
                out,
                "  {} {} severe validation issues, results may be incomplete",
                "WARNING".yellow().bold(),
                file.severe_issues
            );
        }

        let _ = writeln!(out, "  {}", "Granules:".bright_cyan());
        for granule in &file.granules {
            let _ = writeln!(
                out,
                "    {} | {} | night {} -> tables {:?}",
                granule.target, granule.instrument, granule.night_id, granule.tables
            );
        }

        for table in &file.tables {
            let _ = writeln!(
                out,
                "  {} [{}] {} ({} rows, {} flagged, {} station indexes)",
                "Table".bright_cyan(),
                table.extension,
                table.kind,
                table.rows,
                table.flagged,
                table.station_indexes
            );
            for configuration in &table.configurations {
                let _ = writeln!(
                    out,
                    "    {} {} ({}) : {} rows",
                    "configuration".green(),
                    format_sta_index(&configuration.stations),
                    configuration.names,
                    configuration.rows
                );
            }
            if show_missing {
                for missing in &table.missing {
                    let _ = writeln!(
                        out,
                        "    {} {}",
                        "missing".yellow(),
                        format_sta_index(missing)
                    );
                }
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{}",
        format!("{} files analysed", report.files.len()).bright_green()
    );
    out
}

/// Pretty-printed JSON report
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::serialization("Failed to serialize analysis report", e))?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::app::services::fits_io::write_tables;
    use crate::app::services::table_loader::tests::{row, standard_builders};
    use crate::cli::args::InputArgs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_missing_baseline(path: &Path) {
        let rows = vec![
            row(1, 58000.1, &[1, 2]),
            row(1, 58000.1, &[1, 3]),
            row(1, 58000.1, &[1, 4]),
            row(1, 58000.1, &[2, 3]),
            row(2, 58000.2, &[2, 4]),
        ];
        write_tables(path, &standard_builders(&rows)).unwrap();
    }

    async fn analysed(path: &Path, show_missing: bool) -> AnalysisReport {
        let outcomes = load_files(
            vec![path.to_path_buf()],
            &Config::default(),
            Some(Analyzer::default()),
            None,
        )
        .await;
        AnalysisReport::from_outcomes(&outcomes, show_missing)
    }

    #[tokio::test]
    async fn test_report_lists_configurations_and_granules() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("night.fits");
        write_missing_baseline(&path);

        let report = analysed(&path, true).await;
        let file = &report.files[0];

        assert!(file.error.is_none());
        assert_eq!(file.granules.len(), 2);
        assert_eq!(file.targets.len(), 2);
        assert_eq!(file.targets[0].tables, vec![0]);

        let table = &file.tables[0];
        assert_eq!(table.kind, "OI_VIS2");
        assert_eq!(table.extension, 4);
        assert_eq!(table.configurations.len(), 1);
        assert_eq!(table.configurations[0].stations, vec![1, 2, 3, 4]);
        assert_eq!(table.configurations[0].names, "S1-S2-S3-S4");
        assert_eq!(table.configurations[0].rows, 5);
        assert_eq!(table.missing, vec![vec![3, 4]]);

        let human = render_human(&report, true);
        assert!(human.contains("[1, 2, 3, 4]"));
        assert!(human.contains("[3, 4]"));
    }

    #[tokio::test]
    async fn test_missing_hidden_without_flag() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("night.fits");
        write_missing_baseline(&path);

        let report = analysed(&path, false).await;
        assert!(report.files[0].tables[0].missing.is_empty());

        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert!(json["files"][0]["tables"][0].get("missing").is_none());
        assert_eq!(json["files"][0]["granules"][0]["night_id"], 58000);
    }

    #[tokio::test]
    async fn test_run_analyze() {
        let temp_dir = TempDir::new().unwrap();
        write_missing_baseline(&temp_dir.path().join("a.oifits"));

        let args = AnalyzeArgs {
            input: InputArgs {
                paths: vec![format!("{}/*.oifits", temp_dir.path().display())],
                config_file: None,
                jobs: None,
                output_format: OutputFormat::Json,
                verbose: 0,
                quiet: true,
            },
            show_missing: true,
            no_configurations: false,
        };
        let stats = run_analyze(&args).await.unwrap();

        assert_eq!(stats.files_loaded, 1);
        assert_eq!(stats.tables_loaded, 4);
        assert_eq!(stats.exit_code(), 0);
    }
}
