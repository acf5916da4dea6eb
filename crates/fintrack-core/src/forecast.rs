//! Expense forecasting models
//!
//! Three independent predictors over a spending history:
//! - Simple linear regression (closed-form least squares)
//! - Recursive moving average
//! - Seasonal blend of overall, weekday and month averages

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Weights of the seasonal blend: overall, weekday, month
const SEASONAL_OVERALL_WEIGHT: f64 = 0.4;
const SEASONAL_WEEKDAY_WEIGHT: f64 = 0.3;
const SEASONAL_MONTH_WEIGHT: f64 = 0.3;

/// Fitted regression coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Simple linear regression `y = slope * x + intercept`
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    fit: Option<RegressionFit>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.fit.is_some()
    }

    pub fn fit(&self) -> Option<RegressionFit> {
        self.fit
    }

    /// Fit slope and intercept by closed-form least squares
    pub fn train(&mut self, x: &[f64], y: &[f64]) -> Result<RegressionFit> {
        if x.len() != y.len() || x.is_empty() {
            return Err(Error::InsufficientData(format!(
                "linear regression needs equal, non-empty inputs (got {} x, {} y)",
                x.len(),
                y.len()
            )));
        }

        let n = x.len() as f64;
        let sum_x: f64 = x.iter().sum();
        let sum_y: f64 = y.iter().sum();
        let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
        let sum_xx: f64 = x.iter().map(|a| a * a).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return Err(Error::InsufficientData(
                "linear regression needs at least two distinct x values".to_string(),
            ));
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        let fit = RegressionFit { slope, intercept };

        debug!(slope, intercept, points = x.len(), "Linear regression trained");
        self.fit = Some(fit);
        Ok(fit)
    }

    pub fn predict(&self, x: f64) -> Result<f64> {
        let fit = self.fit.ok_or(Error::NotTrained("linear regression"))?;
        Ok(fit.slope * x + fit.intercept)
    }

    pub fn predict_many(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|x| self.predict(*x)).collect()
    }
}

/// Recursive moving-average forecaster
///
/// Each predicted step is appended to the working buffer, so later steps
/// average over earlier predictions.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
    buffer: Vec<f64>,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            buffer: Vec::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_trained(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Keep the most recent `3 * window` values as history
    pub fn update(&mut self, series: &[f64]) {
        let keep = self.window * 3;
        let start = series.len().saturating_sub(keep);
        self.buffer = series[start..].to_vec();
        debug!(window = self.window, retained = self.buffer.len(), "Moving average updated");
    }

    pub fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if self.buffer.is_empty() {
            return Err(Error::NoData(
                "moving average has no history to forecast from".to_string(),
            ));
        }

        let mut working = self.buffer.clone();
        let mut predictions = Vec::with_capacity(steps);

        for _ in 0..steps {
            let start = working.len().saturating_sub(self.window);
            let last = &working[start..];
            let next = last.iter().sum::<f64>() / last.len() as f64;
            predictions.push(next);
            working.push(next);
        }

        Ok(predictions)
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(3)
    }
}

/// A forecast amount for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub predicted_amount: f64,
}

/// Day-of-week and month seasonal averaging
///
/// Empty weekday or month buckets fall back to the overall average.
#[derive(Debug, Clone, Default)]
pub struct SeasonalModel {
    weekday_averages: [f64; 7],
    month_averages: [f64; 12],
    overall_average: f64,
    trained: bool,
}

impl SeasonalModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn overall_average(&self) -> f64 {
        self.overall_average
    }

    /// Average absolute amount per weekday, index 0 = Sunday
    pub fn weekday_averages(&self) -> &[f64; 7] {
        &self.weekday_averages
    }

    /// Average absolute amount per month, index 0 = January
    pub fn month_averages(&self) -> &[f64; 12] {
        &self.month_averages
    }

    pub fn train(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            return Err(Error::InsufficientData(
                "seasonal model needs at least one transaction".to_string(),
            ));
        }

        let mut weekday_sums = [0.0; 7];
        let mut weekday_counts = [0usize; 7];
        let mut month_sums = [0.0; 12];
        let mut month_counts = [0usize; 12];
        let mut total = 0.0;

        for tx in transactions {
            let amount = tx.abs_amount();
            weekday_sums[tx.weekday_index()] += amount;
            weekday_counts[tx.weekday_index()] += 1;
            month_sums[tx.month_index()] += amount;
            month_counts[tx.month_index()] += 1;
            total += amount;
        }

        let overall = total / transactions.len() as f64;
        let bucket_average = |sum: f64, count: usize| {
            if count > 0 {
                sum / count as f64
            } else {
                overall
            }
        };

        for i in 0..7 {
            self.weekday_averages[i] = bucket_average(weekday_sums[i], weekday_counts[i]);
        }
        for i in 0..12 {
            self.month_averages[i] = bucket_average(month_sums[i], month_counts[i]);
        }
        self.overall_average = overall;
        self.trained = true;

        debug!(
            transactions = transactions.len(),
            overall_average = overall,
            "Seasonal model trained"
        );
        Ok(())
    }

    /// Fixed-weight blend `0.4 * overall + 0.3 * weekday + 0.3 * month`
    pub fn predict(&self, date: NaiveDate) -> Result<f64> {
        if !self.trained {
            return Err(Error::NotTrained("seasonal model"));
        }
        let weekday = self.weekday_averages[date.weekday().num_days_from_sunday() as usize];
        let month = self.month_averages[date.month0() as usize];
        Ok(self.overall_average * SEASONAL_OVERALL_WEIGHT
            + weekday * SEASONAL_WEEKDAY_WEIGHT
            + month * SEASONAL_MONTH_WEIGHT)
    }

    /// Forecast each of the `days` calendar days following today
    pub fn predict_next_days(&self, days: u32) -> Result<Vec<DailyForecast>> {
        self.predict_days_after(Local::now().date_naive(), days)
    }

    /// Forecast each of the `days` calendar days following `start`
    pub fn predict_days_after(&self, start: NaiveDate, days: u32) -> Result<Vec<DailyForecast>> {
        (1..=days as i64)
            .map(|offset| {
                let date = start + Duration::days(offset);
                Ok(DailyForecast {
                    date,
                    predicted_amount: self.predict(date)?,
                })
            })
            .collect()
    }
}
