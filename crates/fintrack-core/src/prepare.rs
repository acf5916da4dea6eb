//! Data preparation for the analytics models
//!
//! Turns a raw transaction list into the date-sorted arrays and calendar
//! features every model consumes, plus keyword-based text features.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Spending categories and the keywords that indicate them, in priority order
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "food",
        &["restaurant", "food", "grocery", "meal", "breakfast", "lunch", "dinner", "cafe", "snack"],
    ),
    (
        "transportation",
        &["transport", "train", "bus", "uber", "lyft", "taxi", "gas", "fuel", "car", "auto"],
    ),
    (
        "shopping",
        &["shop", "store", "mall", "amazon", "purchase", "buy", "clothes", "retail"],
    ),
    (
        "entertainment",
        &["movie", "theater", "game", "subscription", "netflix", "spotify", "entertainment"],
    ),
    (
        "utilities",
        &["utility", "electric", "water", "gas", "bill", "phone", "internet", "service"],
    ),
    (
        "health",
        &["health", "doctor", "medicine", "pharmacy", "medical", "hospital", "clinic"],
    ),
    (
        "education",
        &["education", "school", "college", "university", "course", "tuition", "book"],
    ),
    (
        "housing",
        &["rent", "mortgage", "housing", "apartment", "repair", "furniture"],
    ),
];

/// Calendar features of a single transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeFeatures {
    pub amount: f64,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    /// 0 = January .. 11 = December
    pub month: u32,
    pub day_of_month: u32,
}

/// Date-sorted view of a transaction history with parallel feature arrays
#[derive(Debug, Clone, Default)]
pub struct PreparedDataset {
    pub transactions: Vec<Transaction>,
    /// Signed amounts, as given
    pub amounts: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub time_features: Vec<TimeFeatures>,
}

impl PreparedDataset {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Absolute amounts in date order
    pub fn abs_amounts(&self) -> Vec<f64> {
        self.amounts.iter().map(|a| a.abs()).collect()
    }
}

/// Sort transactions by date (stable) and derive amounts, dates and features
pub fn prepare(transactions: &[Transaction]) -> Result<PreparedDataset> {
    if transactions.is_empty() {
        return Err(Error::InvalidInput(
            "transaction history is empty".to_string(),
        ));
    }

    if let Some(bad) = transactions.iter().find(|t| !t.amount.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "non-finite amount on {}",
            bad.date
        )));
    }

    let mut sorted = transactions.to_vec();
    sorted.sort_by_key(|t| t.date);

    let amounts: Vec<f64> = sorted.iter().map(|t| t.amount).collect();
    let dates: Vec<NaiveDate> = sorted.iter().map(|t| t.date).collect();
    let time_features = sorted
        .iter()
        .map(|t| TimeFeatures {
            amount: t.amount,
            day_of_week: t.date.weekday().num_days_from_sunday(),
            month: t.date.month0(),
            day_of_month: t.date.day(),
        })
        .collect();

    Ok(PreparedDataset {
        transactions: sorted,
        amounts,
        dates,
        time_features,
    })
}

/// Keyword presence per category: 1 if any keyword occurs in the description
pub fn extract_text_features(description: &str) -> BTreeMap<&'static str, u8> {
    let text = description.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let hit = keywords.iter().any(|k| text.contains(k));
            (*category, u8::from(hit))
        })
        .collect()
}

/// Min-max scale values into [0, 1]; constant input maps to 0.5
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

/// Sliding windows of `steps` inputs, each paired with the value that follows
pub fn time_series_windows(values: &[f64], steps: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if steps == 0 || values.len() <= steps {
        return (Vec::new(), Vec::new());
    }
    values
        .windows(steps + 1)
        .map(|w| (w[..steps].to_vec(), w[steps]))
        .unzip()
}
