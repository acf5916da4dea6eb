//! Categorization command

use anyhow::Result;
use fintrack_core::{AnalyticsService, CategorizationMethod, Transaction};

use super::{print_json, truncate};

pub fn cmd_categorize(
    service: &AnalyticsService,
    description: Option<&str>,
    json: bool,
) -> Result<()> {
    let transactions = match description {
        Some(text) => vec![Transaction::new(service.today(), 0.0).with_description(text)],
        None => service
            .prepared()
            .map(|data| data.transactions.clone())
            .unwrap_or_default(),
    };

    let results = service.categorize_transactions(&transactions)?;

    if json {
        return print_json(&results);
    }

    println!();
    println!("🏷️  Categorized Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    let mut changed = 0;
    for result in &results {
        let method = match result.method {
            CategorizationMethod::RuleBased => "rules",
            CategorizationMethod::NaiveBayes => "bayes",
        };
        let note = match result.transaction.category() {
            Some(original) if original != result.predicted_category => {
                changed += 1;
                format!(" (was {})", original)
            }
            _ => String::new(),
        };

        println!(
            "   {} │ {:28} │ {:15} {:>4.0}% {:5}{}",
            result.transaction.date,
            truncate(result.transaction.description().unwrap_or("-"), 28),
            truncate(&result.predicted_category, 15),
            result.confidence * 100.0,
            method,
            note
        );
    }

    if description.is_none() {
        println!();
        println!(
            "   {} transactions, {} differ from their recorded category",
            results.len(),
            changed
        );
    }

    Ok(())
}
