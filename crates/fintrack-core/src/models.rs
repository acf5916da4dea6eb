//! Data models for fintrack

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Category assigned to transactions that carry none
pub const UNCATEGORIZED: &str = "uncategorized";

/// Merchant key used when a description is missing
pub const UNKNOWN_MERCHANT: &str = "unknown";

/// A transaction record handed to the analytics core
///
/// The core only reads these; it never mutates or persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Negative = expense, positive = income
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            category: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Absolute amount, used wherever spending magnitude matters
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// Category if present and non-blank
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Category, or `uncategorized` when absent
    pub fn category_or_default(&self) -> &str {
        self.category().unwrap_or(UNCATEGORIZED)
    }

    /// Description if present and non-blank
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Merchant key: first word of the lowercased description
    pub fn merchant(&self) -> String {
        self.description()
            .and_then(|d| d.split_whitespace().next())
            .map(|w| w.to_lowercase())
            .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string())
    }

    /// Day of week, 0 = Sunday .. 6 = Saturday
    pub fn weekday_index(&self) -> usize {
        self.date.weekday().num_days_from_sunday() as usize
    }

    /// Month, 0 = January .. 11 = December
    pub fn month_index(&self) -> usize {
        self.date.month0() as usize
    }
}

/// A description paired with its known category, used to train classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDescription {
    pub description: String,
    pub category: String,
}

impl LabeledDescription {
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_merchant_extraction() {
        let tx = Transaction::new(date(2024, 1, 1), -12.0).with_description("Starbucks Coffee #12");
        assert_eq!(tx.merchant(), "starbucks");

        let blank = Transaction::new(date(2024, 1, 1), -12.0).with_description("   ");
        assert_eq!(blank.merchant(), UNKNOWN_MERCHANT);

        let missing = Transaction::new(date(2024, 1, 1), -12.0);
        assert_eq!(missing.merchant(), UNKNOWN_MERCHANT);
    }

    #[test]
    fn test_calendar_indices() {
        // 2024-01-07 was a Sunday
        let sunday = Transaction::new(date(2024, 1, 7), 1.0);
        assert_eq!(sunday.weekday_index(), 0);
        assert_eq!(sunday.month_index(), 0);

        let saturday = Transaction::new(date(2024, 12, 14), 1.0);
        assert_eq!(saturday.weekday_index(), 6);
        assert_eq!(saturday.month_index(), 11);
    }

    #[test]
    fn test_blank_category_is_uncategorized() {
        let tx = Transaction::new(date(2024, 1, 1), -5.0).with_category("");
        assert_eq!(tx.category(), None);
        assert_eq!(tx.category_or_default(), UNCATEGORIZED);
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let tx: Transaction = serde_json::from_str(r#"{"date":"2024-03-05","amount":-42.5}"#).unwrap();
        assert_eq!(tx.date, date(2024, 3, 5));
        assert_eq!(tx.amount, -42.5);
        assert!(tx.category.is_none());
        assert!(tx.description.is_none());
    }
}
