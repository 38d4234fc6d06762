mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::analyze::AnalyzeArgs;
use commands::ingest::{MapColumnsArgs, MergeArgs};

/// Financial-statement ratio analysis and red-flag risk scoring
#[derive(Parser)]
#[command(
    name = "finstat",
    version,
    about = "Financial-statement ratio analysis and red-flag risk scoring",
    long_about = "Reads yearly financial-statement rows from CSV or JSON, derives growth, \
                  margin, liquidity, leverage, return and cash-flow ratios with decimal \
                  precision, and scores each year against a weighted set of red flags."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive metrics and risk assessments, wrapped with warnings and metadata
    Analyze(AnalyzeArgs),
    /// Derive per-year metrics only
    Metrics(AnalyzeArgs),
    /// Per-year risk score, label and triggered flags
    Risk(AnalyzeArgs),
    /// Merge several statement files and report restatement conflicts
    Merge(MergeArgs),
    /// Show how a CSV file's headers map onto statement fields
    MapColumns(MapColumnsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("finstat=debug,finstat_core=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout carries the result; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Metrics(args) => commands::analyze::run_metrics(args),
        Commands::Risk(args) => commands::analyze::run_risk(args),
        Commands::Merge(args) => commands::ingest::run_merge(args),
        Commands::MapColumns(args) => commands::ingest::run_map_columns(args),
        Commands::Version => {
            println!("finstat {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
