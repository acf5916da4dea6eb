//! Budget recommendation command

use anyhow::Result;
use fintrack_core::budget::TrendDirection;
use fintrack_core::{AnalyticsService, BudgetRecommendations};

use super::{money, print_json, truncate};

/// Tier rows per category, then the overall row
pub fn budget_tier_rows(standard: &BudgetRecommendations) -> Vec<String> {
    standard
        .categories
        .iter()
        .map(|(c, t)| (c.as_str(), t))
        .chain(std::iter::once(("total", &standard.total)))
        .map(|(category, tiers)| {
            format!(
                "   {:18} │ {:>12} │ {:>10} │ {:>10} │ {:>10}",
                truncate(category, 18),
                money(tiers.conservative),
                money(tiers.moderate),
                money(tiers.aggressive),
                money(tiers.monthly)
            )
        })
        .collect()
}

pub fn cmd_budgets(service: &AnalyticsService, json: bool) -> Result<()> {
    let report = service.recommend_budgets()?;

    if json {
        return print_json(&report);
    }

    if report.standard.is_none() && report.trend_aware.is_none() {
        println!("Not enough history to recommend budgets.");
        println!("  Run `fintrack train --verbose` to see the minimum sizes.");
        return Ok(());
    }

    if let Some(standard) = &report.standard {
        println!();
        println!("💰 Budget Recommendations (per transaction)");
        println!("   ─────────────────────────────────────────────────────────────");
        println!(
            "   {:18} │ {:>12} │ {:>10} │ {:>10} │ {:>10}",
            "Category", "Conservative", "Moderate", "Aggressive", "Monthly"
        );
        for row in budget_tier_rows(standard) {
            println!("{}", row);
        }
    }

    if let Some(trend_aware) = &report.trend_aware {
        println!();
        println!("📊 Trend-Aware Monthly Budgets");
        println!("   ─────────────────────────────────────────────────────────────");

        for (category, rec) in trend_aware {
            let arrow = match rec.direction {
                TrendDirection::Increasing => "📈",
                TrendDirection::Decreasing => "📉",
                TrendDirection::Stable => "➖",
            };
            let trend = report
                .trend_analysis
                .as_ref()
                .and_then(|analysis| analysis.get(category))
                .map(|a| a.trend_type.as_str())
                .unwrap_or("-");

            println!(
                "   {} {:18} │ budget {:>10} │ last month {:>10} │ {:>3.0}% {}",
                arrow,
                truncate(category, 18),
                money(rec.trend_aware),
                money(rec.last_month),
                rec.trend_percent,
                trend
            );
        }
    }

    Ok(())
}
