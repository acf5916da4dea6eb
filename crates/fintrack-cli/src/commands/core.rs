//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_service` - Load config and history, then train every model
//! - `print_json` - Shared `--json` output
//! - `cmd_train` - Show the training report

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fintrack_core::{load_transactions, AnalyticsConfig, AnalyticsService, FamilyOutcome};
use serde::Serialize;
use tracing::debug;

/// Build a trained service from a transaction file and optional config path
pub fn load_service(
    file: &Path,
    config: Option<&Path>,
    as_of: Option<NaiveDate>,
) -> Result<AnalyticsService> {
    let config = match config {
        Some(path) => AnalyticsConfig::load_from(path),
        None => AnalyticsConfig::load(),
    }
    .context("Failed to load analytics config")?;

    let transactions = load_transactions(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))?;

    debug!(
        file = %file.display(),
        transactions = transactions.len(),
        "Training analytics models"
    );

    let mut service = AnalyticsService::new(config);
    if let Some(date) = as_of {
        service = service.with_reference_date(date);
    }
    service
        .initialize(&transactions)
        .context("Failed to train analytics models")?;

    Ok(service)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn cmd_train(service: &AnalyticsService, json: bool) -> Result<()> {
    let report = service
        .training_report()
        .context("Models have not been trained")?;

    if json {
        return print_json(report);
    }

    println!();
    println!("🧠 Model Training ({} transactions)", report.transactions);
    println!("   ─────────────────────────────────────────────────────────────");

    let mut any_skipped = false;
    for (family, outcome) in report.families() {
        match outcome {
            FamilyOutcome::Trained { models } => {
                let trained: Vec<&str> = models
                    .iter()
                    .filter(|(_, ok)| **ok)
                    .map(|(name, _)| *name)
                    .collect();
                let skipped: Vec<&str> = models
                    .iter()
                    .filter(|(_, ok)| !**ok)
                    .map(|(name, _)| *name)
                    .collect();

                let icon = if skipped.is_empty() { "✅" } else { "⚠️ " };
                println!("   {} {:22} │ {}", icon, family, trained.join(", "));
                if !skipped.is_empty() {
                    any_skipped = true;
                    println!("      {:22} │ skipped: {}", "", skipped.join(", "));
                }
            }
            FamilyOutcome::Failed { error } => {
                println!("   ❌ {:22} │ {}", family, error);
            }
        }
    }

    if any_skipped {
        println!();
        println!("   Skipped models need a longer history. Run with --verbose for details.");
    }

    Ok(())
}
