//! CLI command implementations
//!
//! Commands are organized by model family:
//! - `core` - Shared utilities (load_service, print_json) and the train command
//! - `predict` - Expense forecasts
//! - `categorize` - Transaction categorization
//! - `anomalies` - Anomaly detection
//! - `budgets` - Budget recommendations and trends
//! - `optimize` - Optimization report and savings plans

pub mod anomalies;
pub mod budgets;
pub mod categorize;
pub mod core;
pub mod optimize;
pub mod predict;

// Re-export command functions for main.rs
pub use anomalies::*;
pub use budgets::*;
pub use categorize::*;
pub use core::*;
pub use optimize::*;
pub use predict::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a signed amount as currency
pub fn money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}
