//! Anomaly detection command

use anyhow::Result;
use fintrack_core::{AnalyticsService, AnomalyReport, Transaction};

use super::{money, print_json, truncate};

/// One display row: transaction, detector score, flagged
type Row<'a> = (&'a Transaction, f64, bool);

fn rows(report: &AnomalyReport) -> Vec<Row<'_>> {
    match report {
        AnomalyReport::Pattern(results) => results
            .iter()
            .map(|a| (&a.transaction, a.overall_anomaly_score, a.is_anomaly))
            .collect(),
        AnomalyReport::ZScore(results) => results
            .iter()
            .map(|a| (&a.transaction, a.anomaly_score, a.is_anomaly))
            .collect(),
        AnomalyReport::Iqr(results) => results
            .iter()
            .map(|a| (&a.transaction, a.deviation, a.is_outlier))
            .collect(),
        AnomalyReport::Unscored(_) => Vec::new(),
    }
}

pub fn cmd_anomalies(service: &AnalyticsService, flagged_only: bool, json: bool) -> Result<()> {
    let transactions = service
        .prepared()
        .map(|data| data.transactions.as_slice())
        .unwrap_or_default();
    let report = service.detect_anomalies(transactions)?;

    if json {
        return if flagged_only {
            print_json(&report.flagged())
        } else {
            print_json(&report)
        };
    }

    if let AnomalyReport::Unscored(_) = report {
        println!("Not enough history to train an anomaly detector.");
        println!("  Run `fintrack train --verbose` to see the minimum sizes.");
        return Ok(());
    }

    println!();
    println!("🚨 Anomalies ({} detector)", report.detector());
    println!("   ─────────────────────────────────────────────────────────────");

    let all = rows(&report);
    let flagged = all.iter().filter(|(_, _, flagged)| *flagged).count();

    for (tx, score, is_flagged) in all {
        if flagged_only && !is_flagged {
            continue;
        }
        let icon = if is_flagged { "⚠️ " } else { "  " };
        println!(
            "   {} {} │ {:28} │ {:>10} │ score {:.2}",
            icon,
            tx.date,
            truncate(tx.description().unwrap_or("-"), 28),
            money(tx.amount),
            score
        );
    }

    println!();
    println!("   {} of {} transactions flagged", flagged, report.len());

    Ok(())
}
