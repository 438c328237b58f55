//! Command implementations for the OIFITS processor CLI
//!
//! Each command lives in its own module:
//! - `validate`: schema and cross-table findings per file
//! - `analyze`: granules, station configurations and missing baselines
//!
//! Input discovery, logging and the concurrent loader are in `shared`.

pub mod analyze;
pub mod shared;
pub mod validate;

pub use shared::ProcessingStats;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Main command runner
///
/// Dispatches to the handler of the subcommand given on the command line.
pub async fn run(args: Args) -> Result<ProcessingStats> {
    match args.get_command() {
        Some(Commands::Validate(validate_args)) => validate::run_validate(validate_args).await,
        Some(Commands::Analyze(analyze_args)) => analyze::run_analyze(analyze_args).await,
        None => Err(Error::configuration("No command specified")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_without_command_is_error() {
        let args = Args { command: None };
        assert!(matches!(run(args).await, Err(Error::Configuration { .. })));
    }
}
