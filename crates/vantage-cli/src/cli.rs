//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vantage - Turn raw business metrics into prioritized insights
#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Time-series analytics and insight reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print descriptive statistics per series
    Stats {
        /// CSV file with series,timestamp,value rows
        #[arg(short, long)]
        file: PathBuf,

        /// Only show the named series
        #[arg(short, long)]
        series: Option<String>,
    },

    /// Run the full analysis pipeline and print findings
    Analyze {
        /// CSV file with series,timestamp,value rows
        #[arg(short, long)]
        file: PathBuf,

        /// Anomaly detection threshold in standard deviations
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Forecast horizon in steps
        #[arg(long)]
        horizon: Option<u32>,

        /// Maximum lag (in points) to search when correlating series
        #[arg(long)]
        max_lag: Option<u32>,

        /// Treat falling metrics as healthy (costs, churn, error rates)
        #[arg(long)]
        shrinking_is_good: bool,

        /// Emit the full result as JSON instead of a text report
        #[arg(long)]
        json: bool,

        /// Append an executive summary to the report
        #[arg(long)]
        summary: bool,
    },
}
