//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fintrack - Statistical analytics for personal spending
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Forecasts, budgets and anomaly detection from a transaction history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Transaction history (.csv or .json)
    #[arg(short, long, default_value = "transactions.csv", global = true)]
    pub file: PathBuf,

    /// Analytics config file
    ///
    /// Defaults to ~/.local/share/fintrack/config/analytics.toml when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD) for forecasts and comparisons
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train every model and show which ones had enough data
    Train,

    /// Forecast upcoming daily spending
    Predict {
        /// Days to forecast (defaults to forecast_days from config)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Categorize the history, or a single description
    Categorize {
        /// Categorize this description instead of the loaded history
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Score the history for unusual transactions
    Anomalies {
        /// Only show flagged transactions
        #[arg(long)]
        only_flagged: bool,
    },

    /// Recommend category budgets
    Budgets,

    /// Find subscriptions, frequent merchants and above-average categories
    Optimize,

    /// Suggest cancellations and cuts that reach a savings target
    ///
    /// Subscription savings are yearly costs; merchant cuts are 30% of past
    /// spending at that merchant.
    Savings {
        /// Amount to save, compared against the summed suggestions
        #[arg(short, long)]
        target: f64,
    },
}
