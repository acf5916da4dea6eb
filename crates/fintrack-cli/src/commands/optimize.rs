//! Expense optimization and savings plan commands

use anyhow::Result;
use fintrack_core::{AnalyticsService, SavingsSuggestion};

use super::{money, print_json, truncate};

pub fn cmd_optimize(service: &AnalyticsService, json: bool) -> Result<()> {
    let report = service.optimize_expenses()?;

    if json {
        return print_json(&report);
    }

    if report.patterns.is_none() && report.comparative.is_none() {
        println!("Not enough history to analyze spending patterns.");
        return Ok(());
    }

    if let Some(patterns) = &report.patterns {
        println!();
        println!("📋 Detected Subscriptions");
        println!("   ─────────────────────────────────────────────────────────────");
        if patterns.subscriptions.is_empty() {
            println!("   None found");
        }
        for sub in &patterns.subscriptions {
            println!(
                "   🔁 {:20} │ {:>9}/{:<9} │ {:>10}/year",
                truncate(&sub.merchant, 20),
                money(sub.amount.abs()),
                sub.frequency.as_str(),
                money(sub.annual_cost)
            );
            println!("      {}", sub.suggestion);
        }

        if !patterns.high_frequency_spending.is_empty() {
            println!();
            println!("☕ Frequent Merchants");
            println!("   ─────────────────────────────────────────────────────────────");
            for merchant in &patterns.high_frequency_spending {
                println!(
                    "   {:20} │ {:>3} visits │ {:>10} total │ {:>9} avg",
                    truncate(&merchant.merchant, 20),
                    merchant.count,
                    money(merchant.total_spent),
                    money(merchant.average_per_transaction)
                );
            }
        }

        if !patterns.category_optimizations.is_empty() {
            println!();
            println!("🗂️  Top Categories");
            println!("   ─────────────────────────────────────────────────────────────");
            for category in &patterns.category_optimizations {
                let merchants: Vec<&str> = category
                    .top_merchants
                    .iter()
                    .map(|m| m.merchant.as_str())
                    .collect();
                println!(
                    "   {:20} │ {:>10} │ {:>4} txns │ {}",
                    truncate(&category.category, 20),
                    money(category.total_spent),
                    category.transaction_count,
                    merchants.join(", ")
                );
            }
        }
    }

    if let Some(comparative) = &report.comparative {
        println!();
        println!("⚖️  Compared to Typical Spending (monthly)");
        println!("   ─────────────────────────────────────────────────────────────");
        if comparative.is_empty() {
            println!("   Every category is at or below the typical range");
        }
        for suggestion in comparative {
            println!(
                "   {:20} │ {:>10} vs {:>10} │ +{:.0}% │ save up to {}",
                truncate(&suggestion.category, 20),
                money(suggestion.current_spending),
                money(suggestion.average_spending),
                suggestion.percent_above,
                money(suggestion.potential_savings)
            );
        }
    }

    Ok(())
}

pub fn cmd_savings(service: &AnalyticsService, target: f64, json: bool) -> Result<()> {
    let plan = service.generate_savings_plan(target)?;

    if json {
        return print_json(&plan);
    }

    println!();
    println!("💵 Savings Plan (target {})", money(target));
    println!("   ─────────────────────────────────────────────────────────────");

    for step in &plan {
        match step {
            SavingsSuggestion::Subscription {
                merchant,
                action,
                savings_amount,
                timeframe,
                ..
            }
            | SavingsSuggestion::Frequency {
                merchant,
                action,
                savings_amount,
                timeframe,
                ..
            } => {
                println!(
                    "   • {:20} │ {:30} │ {:>9} ({})",
                    truncate(merchant, 20),
                    truncate(action, 30),
                    money(*savings_amount),
                    timeframe
                );
            }
            SavingsSuggestion::Summary {
                potential_savings,
                achievable,
                explanation,
                ..
            } => {
                println!();
                let icon = if *achievable { "✅" } else { "⚠️ " };
                println!("   {} Potential savings: {}", icon, money(*potential_savings));
                println!("      {}", explanation);
            }
        }
    }

    Ok(())
}
