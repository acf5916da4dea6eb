//! Fintrack CLI - Spending analytics over a transaction history
//!
//! Usage:
//!   fintrack --file history.csv train            Train models and show what trained
//!   fintrack --file history.csv predict --days 14
//!   fintrack --file history.csv anomalies --only-flagged
//!   fintrack --file history.csv savings --target 100

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
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

    let as_of = cli
        .as_of
        .as_deref()
        .map(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --as-of date format (use YYYY-MM-DD)")?;

    let service = commands::load_service(&cli.file, cli.config.as_deref(), as_of)?;

    match cli.command {
        Commands::Train => commands::cmd_train(&service, cli.json),
        Commands::Predict { days } => commands::cmd_predict(&service, days, cli.json),
        Commands::Categorize { description } => {
            commands::cmd_categorize(&service, description.as_deref(), cli.json)
        }
        Commands::Anomalies { only_flagged } => {
            commands::cmd_anomalies(&service, only_flagged, cli.json)
        }
        Commands::Budgets => commands::cmd_budgets(&service, cli.json),
        Commands::Optimize => commands::cmd_optimize(&service, cli.json),
        Commands::Savings { target } => commands::cmd_savings(&service, target, cli.json),
    }
}
