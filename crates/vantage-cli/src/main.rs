//! Vantage CLI - Time-series analytics and insight reports
//!
//! Usage:
//!   vantage stats --file metrics.csv        Descriptive statistics per series
//!   vantage analyze --file metrics.csv      Full analysis (anomalies, forecasts, insights)
//!   vantage analyze --file metrics.csv --json --summary

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Stats { file, series } => commands::cmd_stats(&file, series.as_deref()),
        Commands::Analyze {
            file,
            threshold,
            horizon,
            max_lag,
            shrinking_is_good,
            json,
            summary,
        } => commands::cmd_analyze(
            &file,
            threshold,
            horizon,
            max_lag,
            shrinking_is_good,
            json,
            summary,
        ),
    }
}
