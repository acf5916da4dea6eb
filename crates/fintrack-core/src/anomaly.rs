//! Anomaly detection
//!
//! Detects unusual spending:
//! - Z-score outliers against the mean/standard deviation of past amounts
//! - IQR outliers outside `Q1 - k*IQR .. Q3 + k*IQR`
//! - Pattern anomalies scored against weekday, merchant and frequency norms

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::stats;

/// Amount-to-weekday-average ratio above which the daily signal fires
const DAILY_RATIO_THRESHOLD: f64 = 3.0;
const DAILY_RATIO_SCALE: f64 = 7.0;
/// Amount-to-merchant-average ratio above which the merchant signal fires
const MERCHANT_RATIO_THRESHOLD: f64 = 2.0;
const MERCHANT_RATIO_SCALE: f64 = 8.0;
const MERCHANT_SIGNAL_WEIGHT: f64 = 1.5;
const NEW_MERCHANT_PENALTY: f64 = 0.3;
/// Penalty for a repeat charge within a day when the usual gap exceeds a week
const FREQUENCY_PENALTY: f64 = 0.5;
const FREQUENCY_GAP_DAYS: f64 = 7.0;
/// Overall score above which a transaction is anomalous
const PATTERN_ANOMALY_THRESHOLD: f64 = 0.5;

/// Summary statistics learned by the z-score detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZScoreStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// A value flagged by the z-score detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreAnomaly {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
    pub deviation: f64,
}

/// A transaction scored by the z-score detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreResult {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub deviation: f64,
}

/// Flags values more than `threshold` standard deviations from the mean
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    threshold: f64,
    stats: Option<ZScoreStats>,
}

impl ZScoreDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            stats: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.stats.is_some()
    }

    pub fn stats(&self) -> Option<ZScoreStats> {
        self.stats
    }

    pub fn train(&mut self, values: &[f64]) -> Result<ZScoreStats> {
        if values.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "z-score detector needs at least 2 values, got {}",
                values.len()
            )));
        }
        let mean = stats::mean(values);
        let trained = ZScoreStats {
            mean,
            std_dev: stats::std_dev(values, mean),
        };
        debug!(mean, std_dev = trained.std_dev, "Z-score detector trained");
        self.stats = Some(trained);
        Ok(trained)
    }

    fn trained_stats(&self) -> Result<ZScoreStats> {
        self.stats.ok_or(Error::NotTrained("z-score detector"))
    }

    /// Absolute z-score; 0 when the training data had no spread
    pub fn z_score(&self, value: f64) -> Result<f64> {
        let s = self.trained_stats()?;
        if s.std_dev == 0.0 {
            return Ok(0.0);
        }
        Ok(((value - s.mean) / s.std_dev).abs())
    }

    pub fn detect(&self, values: &[f64]) -> Result<Vec<ZScoreAnomaly>> {
        let s = self.trained_stats()?;
        let mut anomalies = Vec::new();
        for (index, value) in values.iter().copied().enumerate() {
            let z_score = self.z_score(value)?;
            if z_score > self.threshold {
                anomalies.push(ZScoreAnomaly {
                    index,
                    value,
                    z_score,
                    deviation: value - s.mean,
                });
            }
        }
        Ok(anomalies)
    }

    /// Score every transaction by the absolute value of its amount
    pub fn detect_transactions(&self, transactions: &[Transaction]) -> Result<Vec<ZScoreResult>> {
        let s = self.trained_stats()?;
        transactions
            .iter()
            .map(|tx| {
                let amount = tx.abs_amount();
                let z_score = self.z_score(amount)?;
                Ok(ZScoreResult {
                    transaction: tx.clone(),
                    is_anomaly: z_score > self.threshold,
                    anomaly_score: z_score,
                    deviation: amount - s.mean,
                })
            })
            .collect()
    }
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self::new(2.5)
    }
}

/// Quartile bounds learned by the IQR detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierDirection {
    High,
    Low,
}

/// A value outside the IQR bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IqrOutlier {
    pub index: usize,
    pub value: f64,
    pub direction: OutlierDirection,
    /// Distance past the violated bound (positive for high, negative for low)
    pub deviation: f64,
}

/// A transaction checked against the IQR bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IqrResult {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub is_outlier: bool,
    pub is_high_outlier: bool,
    pub is_low_outlier: bool,
    pub deviation: f64,
}

/// Interquartile-range outlier detector
///
/// Quartiles use the truncated index `floor(n * p)` of the sorted data.
#[derive(Debug, Clone)]
pub struct IqrDetector {
    multiplier: f64,
    bounds: Option<IqrBounds>,
}

impl IqrDetector {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            bounds: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn bounds(&self) -> Option<IqrBounds> {
        self.bounds
    }

    pub fn train(&mut self, values: &[f64]) -> Result<IqrBounds> {
        if values.len() < 4 {
            return Err(Error::InsufficientData(format!(
                "IQR detector needs at least 4 values, got {}",
                values.len()
            )));
        }
        let sorted = stats::sorted(values);
        let q1 = stats::truncated_percentile(&sorted, 0.25);
        let q3 = stats::truncated_percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        let bounds = IqrBounds {
            q1,
            q3,
            iqr,
            lower_bound: q1 - iqr * self.multiplier,
            upper_bound: q3 + iqr * self.multiplier,
        };
        debug!(q1, q3, iqr, "IQR detector trained");
        self.bounds = Some(bounds);
        Ok(bounds)
    }

    fn trained_bounds(&self) -> Result<IqrBounds> {
        self.bounds.ok_or(Error::NotTrained("IQR detector"))
    }

    fn classify(bounds: &IqrBounds, value: f64) -> Option<(OutlierDirection, f64)> {
        if value > bounds.upper_bound {
            Some((OutlierDirection::High, value - bounds.upper_bound))
        } else if value < bounds.lower_bound {
            Some((OutlierDirection::Low, value - bounds.lower_bound))
        } else {
            None
        }
    }

    pub fn detect(&self, values: &[f64]) -> Result<Vec<IqrOutlier>> {
        let bounds = self.trained_bounds()?;
        Ok(values
            .iter()
            .copied()
            .enumerate()
            .filter_map(|(index, value)| {
                Self::classify(&bounds, value).map(|(direction, deviation)| IqrOutlier {
                    index,
                    value,
                    direction,
                    deviation,
                })
            })
            .collect())
    }

    /// Check every transaction by the absolute value of its amount
    pub fn detect_transactions(&self, transactions: &[Transaction]) -> Result<Vec<IqrResult>> {
        let bounds = self.trained_bounds()?;
        Ok(transactions
            .iter()
            .map(|tx| {
                let outlier = Self::classify(&bounds, tx.abs_amount());
                IqrResult {
                    transaction: tx.clone(),
                    is_outlier: outlier.is_some(),
                    is_high_outlier: matches!(outlier, Some((OutlierDirection::High, _))),
                    is_low_outlier: matches!(outlier, Some((OutlierDirection::Low, _))),
                    deviation: outlier.map(|(_, d)| d).unwrap_or(0.0),
                }
            })
            .collect())
    }
}

impl Default for IqrDetector {
    fn default() -> Self {
        Self::new(1.5)
    }
}

/// What the pattern detector learned about one merchant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantProfile {
    pub average_amount: f64,
    /// Share of all training transactions at this merchant
    pub frequency: f64,
    pub last_seen: NaiveDate,
}

/// Individual signals contributing to a pattern anomaly score
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnomalySignals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_pattern: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_merchant: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
}

/// A transaction scored by the pattern detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAnomaly {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub anomaly_scores: AnomalySignals,
    /// Combined score, clamped to at most 1
    pub overall_anomaly_score: f64,
    pub is_anomaly: bool,
}

/// Scores transactions against the user's own weekday and merchant habits
#[derive(Debug, Clone, Default)]
pub struct SpendingPatternDetector {
    /// Average absolute amount per weekday (0 = Sunday); 0 when unseen
    weekday_averages: [f64; 7],
    merchants: HashMap<String, MerchantProfile>,
    /// Mean gap in days between consecutive same-merchant transactions
    average_gap_days: f64,
    trained: bool,
}

impl SpendingPatternDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn weekday_averages(&self) -> &[f64; 7] {
        &self.weekday_averages
    }

    pub fn merchant(&self, merchant: &str) -> Option<&MerchantProfile> {
        self.merchants.get(merchant)
    }

    pub fn average_gap_days(&self) -> f64 {
        self.average_gap_days
    }

    pub fn train(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            return Err(Error::InsufficientData(
                "pattern detector needs at least one transaction".to_string(),
            ));
        }

        let mut sorted = transactions.to_vec();
        sorted.sort_by_key(|t| t.date);

        let mut weekday_totals = [0.0; 7];
        let mut weekday_counts = [0usize; 7];
        let mut merchant_totals: HashMap<String, (f64, usize)> = HashMap::new();
        let mut last_dates: HashMap<String, NaiveDate> = HashMap::new();
        let mut gaps: Vec<f64> = Vec::new();

        for tx in &sorted {
            let amount = tx.abs_amount();
            let merchant = tx.merchant();

            weekday_totals[tx.weekday_index()] += amount;
            weekday_counts[tx.weekday_index()] += 1;

            let entry = merchant_totals.entry(merchant.clone()).or_insert((0.0, 0));
            entry.0 += amount;
            entry.1 += 1;

            if let Some(last) = last_dates.get(&merchant) {
                let days = (tx.date - *last).num_days();
                if days > 0 {
                    gaps.push(days as f64);
                }
            }
            last_dates.insert(merchant, tx.date);
        }

        for i in 0..7 {
            self.weekday_averages[i] = if weekday_counts[i] > 0 {
                weekday_totals[i] / weekday_counts[i] as f64
            } else {
                0.0
            };
        }

        let total = sorted.len() as f64;
        self.merchants = merchant_totals
            .into_iter()
            .map(|(merchant, (sum, count))| {
                let last_seen = last_dates[&merchant];
                let profile = MerchantProfile {
                    average_amount: sum / count as f64,
                    frequency: count as f64 / total,
                    last_seen,
                };
                (merchant, profile)
            })
            .collect();
        self.average_gap_days = stats::mean(&gaps);
        self.trained = true;

        debug!(
            transactions = sorted.len(),
            merchants = self.merchants.len(),
            average_gap_days = self.average_gap_days,
            "Spending pattern detector trained"
        );
        Ok(())
    }

    pub fn detect_anomalies(&self, transactions: &[Transaction]) -> Result<Vec<PatternAnomaly>> {
        if !self.trained {
            return Err(Error::NotTrained("spending pattern detector"));
        }
        Ok(transactions.iter().map(|tx| self.score(tx)).collect())
    }

    fn score(&self, tx: &Transaction) -> PatternAnomaly {
        let amount = tx.abs_amount();
        let merchant = tx.merchant();
        let mut signals = AnomalySignals::default();
        let mut overall = 0.0;

        let daily_average = self.weekday_averages[tx.weekday_index()];
        if daily_average > 0.0 {
            let ratio = amount / daily_average;
            let score = if ratio > DAILY_RATIO_THRESHOLD {
                (ratio - DAILY_RATIO_THRESHOLD) / DAILY_RATIO_SCALE
            } else {
                0.0
            };
            signals.daily_pattern = Some(score);
            overall += score;
        }

        let profile = self.merchants.get(&merchant);
        match profile.filter(|p| p.average_amount > 0.0) {
            Some(p) => {
                let ratio = amount / p.average_amount;
                let score = if ratio > MERCHANT_RATIO_THRESHOLD {
                    (ratio - MERCHANT_RATIO_THRESHOLD) / MERCHANT_RATIO_SCALE
                } else {
                    0.0
                };
                signals.merchant_amount = Some(score);
                overall += score * MERCHANT_SIGNAL_WEIGHT;
            }
            None => {
                signals.new_merchant = Some(NEW_MERCHANT_PENALTY);
                overall += NEW_MERCHANT_PENALTY;
            }
        }

        if let Some(p) = profile {
            let days_since = (tx.date - p.last_seen).num_days();
            if days_since < 1 && self.average_gap_days > FREQUENCY_GAP_DAYS {
                signals.frequency = Some(FREQUENCY_PENALTY);
                overall += FREQUENCY_PENALTY;
            }
        }

        let overall = overall.min(1.0);
        PatternAnomaly {
            transaction: tx.clone(),
            anomaly_scores: signals,
            overall_anomaly_score: overall,
            is_anomaly: overall > PATTERN_ANOMALY_THRESHOLD,
        }
    }
}
