//! Transaction import from CSV and JSON files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Load transactions from a `.csv` or `.json` file
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let file = File::open(path)?;
    let transactions = match extension.as_deref() {
        Some("csv") => parse_csv(file)?,
        Some("json") => parse_json(file)?,
        _ => {
            return Err(Error::Import(format!(
                "Unsupported file type: {} (expected .csv or .json)",
                path.display()
            )))
        }
    };

    debug!(
        path = %path.display(),
        count = transactions.len(),
        "Loaded transactions"
    );
    Ok(transactions)
}

/// Column positions resolved from a CSV header row
struct Columns {
    date: usize,
    amount: usize,
    category: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            date: find("date").ok_or_else(|| Error::Import("Missing date column".into()))?,
            amount: find("amount").ok_or_else(|| Error::Import("Missing amount column".into()))?,
            category: find("category"),
            description: find("description"),
        })
    }
}

fn optional_field(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|i| record.get(i))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse CSV with a `date,amount[,category][,description]` header (any order)
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let date_str = record
            .get(columns.date)
            .ok_or_else(|| Error::Import("Missing date".into()))?;
        let amount_str = record
            .get(columns.amount)
            .ok_or_else(|| Error::Import("Missing amount".into()))?;

        transactions.push(Transaction {
            date: parse_date(date_str)?,
            amount: parse_amount(amount_str)?,
            category: optional_field(&record, columns.category),
            description: optional_field(&record, columns.description),
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Parse a JSON array of transactions
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;
    if let Some(bad) = transactions.iter().find(|t| !t.amount.is_finite()) {
        return Err(Error::Import(format!("Non-finite amount on {}", bad.date)));
    }
    debug!("Parsed {} JSON transactions", transactions.len());
    Ok(transactions)
}

/// Parse a date string in various common formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%y", // 01/15/24 (before %Y, which would read "24" as year 24)
        "%m/%d/%Y", // 01/15/2024
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols, commas and
/// parenthesized negatives
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}
