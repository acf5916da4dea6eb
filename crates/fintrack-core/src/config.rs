//! Analytics configuration
//!
//! Every tuning knob of the analytics service lives here.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (e.g. `--config`), when it exists
//! 2. Override in the data dir (~/.local/share/fintrack/config/analytics.toml)
//! 3. Embedded defaults (compiled into binary)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::optimize::ReferenceRange;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Standard deviations beyond which an amount is anomalous
    pub zscore_threshold: f64,
    /// `k` in `Q1 - k*IQR .. Q3 + k*IQR`
    pub iqr_multiplier: f64,
    /// Headroom added to percentile budgets
    pub budget_buffer: f64,
    /// Weight of recent months in trend budgets (0..=1)
    pub trend_recent_weight: f64,
    pub trend_safety_margin: f64,
    pub moving_average_window: usize,
    pub forecast_days: u32,
    pub comparative_period_days: u32,
    /// History size needed by most model families
    pub min_transactions: usize,
    pub min_trend_transactions: usize,
    pub min_moving_average_transactions: usize,
    /// Overrides the built-in comparative benchmarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<BTreeMap<String, ReferenceRange>>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            zscore_threshold: 2.5,
            iqr_multiplier: 1.5,
            budget_buffer: 0.15,
            trend_recent_weight: 0.7,
            trend_safety_margin: 0.1,
            moving_average_window: 5,
            forecast_days: 7,
            comparative_period_days: 90,
            min_transactions: 10,
            min_trend_transactions: 15,
            min_moving_average_transactions: 3,
            reference: None,
        }
    }
}

impl AnalyticsConfig {
    /// Load from the override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from `path` if it exists, otherwise from embedded defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("zscore_threshold", self.zscore_threshold),
            ("iqr_multiplier", self.iqr_multiplier),
            ("budget_buffer", self.budget_buffer),
            ("trend_safety_margin", self.trend_safety_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.trend_recent_weight) {
            return Err(Error::Config(format!(
                "trend_recent_weight must be between 0 and 1, got {}",
                self.trend_recent_weight
            )));
        }
        if self.moving_average_window == 0 {
            return Err(Error::Config(
                "moving_average_window must be at least 1".to_string(),
            ));
        }
        if self.comparative_period_days == 0 {
            return Err(Error::Config(
                "comparative_period_days must be at least 1".to_string(),
            ));
        }

        if let Some(reference) = &self.reference {
            for (category, range) in reference {
                if range.average <= 0.0 || range.low_bound > range.high_bound {
                    return Err(Error::Config(format!(
                        "reference range for {category} needs a positive average and low_bound <= high_bound"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("config").join("analytics.toml"))
}

/// Load configuration (explicit path, then override location, then default)
fn load_config(explicit: Option<&Path>) -> Result<AnalyticsConfig> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match candidate {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "Loading analytics config");
            fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    AnalyticsConfig::from_toml(&content)
}
