//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use fintrack_core::AnalyticsService;
use tempfile::NamedTempFile;

use crate::commands::{self, money, truncate};

/// Three months of spending: subscriptions, weekly groceries and coffee runs
fn write_history() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,amount,category,description").unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for month in 0..3 {
        let first = start + Duration::days(month * 30);
        writeln!(file, "{},-15.99,entertainment,NETFLIX.COM", first + Duration::days(4)).unwrap();
        writeln!(file, "{},-1200.00,housing,Rent payment", first).unwrap();
        for week in 0..4 {
            let day = first + Duration::days(week * 7 + 2);
            let amount = 60.0 + week as f64 * 5.0 + month as f64 * 10.0;
            writeln!(file, "{},-{:.2},food,Grocer weekly groceries", day, amount).unwrap();
        }
        for visit in 0..3 {
            let day = first + Duration::days(visit * 9 + 5);
            writeln!(file, "{},-4.75,food,Starbucks latte", day).unwrap();
        }
    }
    file.flush().unwrap();
    file
}

fn trained_service() -> (NamedTempFile, AnalyticsService) {
    let file = write_history();
    let as_of = NaiveDate::from_ymd_opt(2024, 3, 31);
    let service = commands::load_service(file.path(), None, as_of).unwrap();
    (file, service)
}

// ========== Shared Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Starbucks", 20), "Starbucks");
    assert_eq!(truncate("Grocer weekly groceries", 10), "Grocer ...");
    assert_eq!(truncate("Café crème", 8), "Café ...");
}

#[test]
fn test_money() {
    assert_eq!(money(15.5), "$15.50");
    assert_eq!(money(-1200.0), "-$1200.00");
}

#[test]
fn test_load_service_trains_models() {
    let (_file, service) = trained_service();
    assert!(service.is_ready());
    assert_eq!(service.training_report().unwrap().transactions, 27);
}

#[test]
fn test_load_service_with_config_file() {
    let history = write_history();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "forecast_days = 3\nmin_transactions = 100").unwrap();

    let service = commands::load_service(history.path(), Some(config.path()), None).unwrap();
    assert_eq!(service.config().forecast_days, 3);
    assert!(service.recommend_budgets().unwrap().standard.is_none());
}

#[test]
fn test_load_service_missing_file() {
    let result = commands::load_service(Path::new("/nonexistent/history.csv"), None, None);
    assert!(result.is_err());
}

#[test]
fn test_load_service_empty_history() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,amount").unwrap();
    assert!(commands::load_service(file.path(), None, None).is_err());
}

#[test]
fn test_load_service_invalid_config() {
    let history = write_history();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "moving_average_window = 0").unwrap();
    assert!(commands::load_service(history.path(), Some(config.path()), None).is_err());
}

// ========== Command Tests ==========

#[test]
fn test_cmd_train() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_train(&service, false).is_ok());
    assert!(commands::cmd_train(&service, true).is_ok());
}

#[test]
fn test_cmd_predict() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_predict(&service, None, false).is_ok());
    assert!(commands::cmd_predict(&service, Some(14), true).is_ok());
}

#[test]
fn test_forecast_rows_show_every_model() {
    let (_file, service) = trained_service();
    let predictions = service.predict_expenses(3).unwrap();
    let rows = commands::forecast_rows(&predictions);

    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("   2024-04-01 │"));
    assert!(rows[2].starts_with("   2024-04-03 │"));

    let moving_average = predictions.moving_average.as_ref().unwrap();
    let linear = predictions.linear.as_ref().unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert!(row.contains(&money(predictions.seasonal[i].predicted_amount)));
        assert!(row.contains(&money(moving_average[i])));
        assert!(row.contains(&money(linear[i])));
    }
}

#[test]
fn test_budget_tier_rows_end_with_total() {
    let (_file, service) = trained_service();
    let standard = service.recommend_budgets().unwrap().standard.unwrap();
    let rows = commands::budget_tier_rows(&standard);

    assert_eq!(rows.len(), standard.categories.len() + 1);
    let food = rows.iter().find(|r| r.starts_with("   food ")).unwrap();
    assert!(food.contains(&money(standard.categories["food"].moderate)));
    let total = rows.last().unwrap();
    assert!(total.starts_with("   total "));
    assert!(total.contains(&money(standard.total.monthly)));
}

#[test]
fn test_as_of_pins_today() {
    let (_file, service) = trained_service();
    assert_eq!(service.today(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
}

#[test]
fn test_cmd_categorize() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_categorize(&service, None, false).is_ok());
    assert!(commands::cmd_categorize(&service, Some("Amazon purchase"), false).is_ok());
    assert!(commands::cmd_categorize(&service, Some("weekly groceries"), true).is_ok());
}

#[test]
fn test_cmd_anomalies() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_anomalies(&service, false, false).is_ok());
    assert!(commands::cmd_anomalies(&service, true, false).is_ok());
    assert!(commands::cmd_anomalies(&service, true, true).is_ok());
}

#[test]
fn test_cmd_budgets() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_budgets(&service, false).is_ok());
    assert!(commands::cmd_budgets(&service, true).is_ok());
}

#[test]
fn test_cmd_optimize() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_optimize(&service, false).is_ok());
    assert!(commands::cmd_optimize(&service, true).is_ok());
}

#[test]
fn test_cmd_savings() {
    let (_file, service) = trained_service();
    assert!(commands::cmd_savings(&service, 50.0, false).is_ok());
    assert!(commands::cmd_savings(&service, 50.0, true).is_ok());
    assert!(commands::cmd_savings(&service, -5.0, false).is_err());
}

#[test]
fn test_commands_with_short_history() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,amount,description").unwrap();
    writeln!(file, "2024-01-02,-12.00,Corner cafe").unwrap();
    writeln!(file, "2024-01-05,-30.00,Corner cafe").unwrap();
    let service = commands::load_service(file.path(), None, None).unwrap();

    assert!(commands::cmd_train(&service, false).is_ok());
    assert!(commands::cmd_predict(&service, Some(3), false).is_ok());
    assert!(commands::cmd_anomalies(&service, false, false).is_ok());
    assert!(commands::cmd_budgets(&service, false).is_ok());
    assert!(commands::cmd_optimize(&service, false).is_ok());
    // Savings plans need the pattern optimizer
    assert!(commands::cmd_savings(&service, 10.0, false).is_err());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_savings_args() {
    use clap::Parser;

    let cli = crate::cli::Cli::try_parse_from([
        "fintrack", "--as-of", "2024-03-31", "savings", "--target", "50",
    ])
    .unwrap();
    assert_eq!(cli.as_of.as_deref(), Some("2024-03-31"));
    assert!(matches!(cli.command, crate::cli::Commands::Savings { target } if target == 50.0));
}

#[test]
fn test_savings_help_describes_yearly_and_history_savings() {
    use clap::CommandFactory;

    let command = crate::cli::Cli::command();
    let savings = command.find_subcommand("savings").unwrap();
    let help = savings.get_long_about().unwrap().to_string();
    assert!(help.contains("yearly"));
    assert!(!help.to_lowercase().contains("monthly"));
}
