//! Expense forecast command

use anyhow::Result;
use fintrack_core::{AnalyticsService, PredictionSet};

use super::{money, print_json};

fn column(values: Option<&Vec<f64>>, day: usize) -> String {
    values
        .and_then(|v| v.get(day))
        .map(|a| money(*a))
        .unwrap_or_else(|| "-".to_string())
}

/// One table row per forecast day
pub fn forecast_rows(predictions: &PredictionSet) -> Vec<String> {
    predictions
        .seasonal
        .iter()
        .enumerate()
        .map(|(i, day)| {
            format!(
                "   {:10} │ {:>10} │ {:>12} │ {:>10}",
                day.date.format("%Y-%m-%d").to_string(),
                money(day.predicted_amount),
                column(predictions.moving_average.as_ref(), i),
                column(predictions.linear.as_ref(), i),
            )
        })
        .collect()
}

pub fn cmd_predict(service: &AnalyticsService, days: Option<u32>, json: bool) -> Result<()> {
    let days = days.unwrap_or(service.config().forecast_days);
    let predictions = service.predict_expenses(days)?;

    if json {
        return print_json(&predictions);
    }

    println!();
    println!("📈 Expense Forecast (next {} days)", days);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:10} │ {:>10} │ {:>12} │ {:>10}",
        "Date", "Seasonal", "Moving avg", "Trend"
    );

    for row in forecast_rows(&predictions) {
        println!("{}", row);
    }

    let total: f64 = predictions
        .seasonal
        .iter()
        .map(|d| d.predicted_amount)
        .sum();
    println!();
    println!("   Seasonal total: {}", money(total));

    if predictions.moving_average.is_none() || predictions.linear.is_none() {
        println!("   Some forecasters need a longer history and were skipped.");
    }

    Ok(())
}
