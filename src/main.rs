use clap::Parser;
use oifits_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Ctrl-C abandons the run
        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = commands::run(args) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(oifits_processor::Error::processing_interrupted(
                    "Processing interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(stats) => process::exit(stats.exit_code()),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("OIFITS Processor - Optical Interferometry Data Checker");
    println!("======================================================");
    println!();
    println!("Load OIFITS files, validate them against the exchange standard and");
    println!("infer the station configurations behind each observation.");
    println!();
    println!("USAGE:");
    println!("    oifits-processor <COMMAND> <PATHS>... [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    validate    Report schema and cross-table violations");
    println!("    analyze     Report granules, station configurations and missing baselines");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Validate a directory tree, failing on severe issues:");
    println!("    oifits-processor validate data/ --fail-on-severe");
    println!();
    println!("    # Analyse matching files and list unobserved baselines as JSON:");
    println!("    oifits-processor analyze 'data/*.fits' --show-missing --format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    oifits-processor <COMMAND> --help");
}
