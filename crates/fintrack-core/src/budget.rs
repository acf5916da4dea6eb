//! Budget recommendation
//!
//! Two recommenders derive per-category budget ceilings from history:
//! - [`PercentileBudgetRecommender`] buffers per-transaction median/mean/p90
//! - [`TrendAwareBudgetRecommender`] blends recent and older monthly totals
//!   and adds headroom for upward trends

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::stats;

/// Categories with fewer transactions get no percentile recommendation
const MIN_CATEGORY_TRANSACTIONS: usize = 3;
/// Rough days-per-month used to scale a per-transaction mean
const DAYS_PER_MONTH: f64 = 30.0;
/// Categories need spending in at least this many months for a trend
const MIN_MONTHS_WITH_DATA: usize = 2;
/// Cap on the extra multiplier applied for upward trends
const MAX_TREND_ADJUSTMENT: f64 = 0.2;

/// Descriptive statistics over absolute transaction amounts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
    pub count: usize,
    pub total: f64,
}

impl SpendingStats {
    fn from_amounts(amounts: &[f64]) -> Self {
        if amounts.is_empty() {
            return Self::default();
        }
        let sorted = stats::sorted(amounts);
        Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: stats::mean(amounts),
            median: stats::truncated_percentile(&sorted, 0.5),
            p90: stats::truncated_percentile(&sorted, 0.9),
            count: amounts.len(),
            total: amounts.iter().sum(),
        }
    }
}

/// Recommended budget amounts, rounded to whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetTiers {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRecommendations {
    pub categories: BTreeMap<String, BudgetTiers>,
    /// Tiers computed over every transaction regardless of category
    pub total: BudgetTiers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
    Monthly,
}

impl std::str::FromStr for BudgetLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::InvalidInput(format!("unknown budget level: {other}"))),
        }
    }
}

/// Recommends budgets from per-category amount percentiles plus a buffer
#[derive(Debug, Clone)]
pub struct PercentileBudgetRecommender {
    buffer: f64,
    category_stats: BTreeMap<String, SpendingStats>,
    total_stats: SpendingStats,
    trained: bool,
}

impl PercentileBudgetRecommender {
    pub fn new(buffer: f64) -> Self {
        Self {
            buffer,
            category_stats: BTreeMap::new(),
            total_stats: SpendingStats::default(),
            trained: false,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn category_stats(&self) -> &BTreeMap<String, SpendingStats> {
        &self.category_stats
    }

    pub fn total_stats(&self) -> &SpendingStats {
        &self.total_stats
    }

    pub fn train(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            return Err(Error::InsufficientData(
                "no transactions to derive budgets from".to_string(),
            ));
        }

        let mut by_category: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut all = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let amount = tx.abs_amount();
            by_category
                .entry(tx.category_or_default().to_string())
                .or_default()
                .push(amount);
            all.push(amount);
        }

        self.category_stats = by_category
            .into_iter()
            .map(|(category, amounts)| (category, SpendingStats::from_amounts(&amounts)))
            .collect();
        self.total_stats = SpendingStats::from_amounts(&all);
        self.trained = true;

        debug!(
            categories = self.category_stats.len(),
            transactions = all.len(),
            "Percentile budget recommender trained"
        );
        Ok(())
    }

    fn tiers(&self, s: &SpendingStats) -> BudgetTiers {
        let multiplier = 1.0 + self.buffer;
        BudgetTiers {
            conservative: (s.median * multiplier).round(),
            moderate: (s.mean * multiplier).round(),
            aggressive: (s.p90 * multiplier).round(),
            monthly: (s.mean * DAYS_PER_MONTH * multiplier).round(),
        }
    }

    pub fn recommend_budgets(&self) -> Result<BudgetRecommendations> {
        if !self.trained {
            return Err(Error::NotTrained("percentile budget recommender"));
        }
        let categories = self
            .category_stats
            .iter()
            .filter(|(_, s)| s.count >= MIN_CATEGORY_TRANSACTIONS)
            .map(|(category, s)| (category.clone(), self.tiers(s)))
            .collect();
        Ok(BudgetRecommendations {
            categories,
            total: self.tiers(&self.total_stats),
        })
    }

    /// A single budget amount; unknown categories use the overall statistics
    pub fn recommend_category_budget(&self, category: &str, level: BudgetLevel) -> Result<f64> {
        if !self.trained {
            return Err(Error::NotTrained("percentile budget recommender"));
        }
        let s = self.category_stats.get(category).unwrap_or(&self.total_stats);
        let tiers = self.tiers(s);
        Ok(match level {
            BudgetLevel::Conservative => tiers.conservative,
            BudgetLevel::Moderate => tiers.moderate,
            BudgetLevel::Aggressive => tiers.aggressive,
            BudgetLevel::Monthly => tiers.monthly,
        })
    }
}

impl Default for PercentileBudgetRecommender {
    fn default() -> Self {
        Self::new(0.2)
    }
}

/// One category's spending within a calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpending {
    /// `YYYY-MM`
    pub month: String,
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

/// Month-over-month trend of a single category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrend {
    /// One entry per month present anywhere in the data, zero-filled
    pub monthly_series: Vec<MonthlySpending>,
    pub recent_average: f64,
    pub older_average: f64,
    /// `(recent - older) / older`, or 0 when either side has no spending
    pub trend_percentage: f64,
    pub last_month_total: f64,
    pub months_with_data: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecommendation {
    pub conservative: f64,
    pub trend_aware: f64,
    pub last_month: f64,
    pub direction: TrendDirection,
    /// Absolute trend, rounded to whole percent
    pub trend_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    SignificantlyIncreasing,
    SlightlyIncreasing,
    Stable,
    SlightlyDecreasing,
    SignificantlyDecreasing,
}

impl TrendType {
    pub fn classify(trend_percentage: f64) -> Self {
        if trend_percentage > 0.1 {
            Self::SignificantlyIncreasing
        } else if trend_percentage > 0.03 {
            Self::SlightlyIncreasing
        } else if trend_percentage < -0.1 {
            Self::SignificantlyDecreasing
        } else if trend_percentage < -0.03 {
            Self::SlightlyDecreasing
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignificantlyIncreasing => "significantly_increasing",
            Self::SlightlyIncreasing => "slightly_increasing",
            Self::Stable => "stable",
            Self::SlightlyDecreasing => "slightly_decreasing",
            Self::SignificantlyDecreasing => "significantly_decreasing",
        }
    }
}

impl std::fmt::Display for TrendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub trend_type: TrendType,
    pub trend_percentage: f64,
    pub months_analyzed: usize,
    pub last_month_spending: f64,
    pub average_monthly_spending: f64,
}

/// Recommends budgets from monthly category totals, weighting recent months
#[derive(Debug, Clone)]
pub struct TrendAwareBudgetRecommender {
    recent_weight: f64,
    safety_margin: f64,
    trends: BTreeMap<String, CategoryTrend>,
    trained: bool,
}

impl TrendAwareBudgetRecommender {
    pub fn new(recent_weight: f64, safety_margin: f64) -> Self {
        Self {
            recent_weight,
            safety_margin,
            trends: BTreeMap::new(),
            trained: false,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn trends(&self) -> &BTreeMap<String, CategoryTrend> {
        &self.trends
    }

    pub fn train(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            return Err(Error::InsufficientData(
                "no transactions to derive trends from".to_string(),
            ));
        }

        // (year, month) keys keep the series chronological across years
        let mut grouped: BTreeMap<(i32, u32), BTreeMap<String, (f64, usize)>> = BTreeMap::new();
        let mut categories = BTreeSet::new();
        for tx in transactions {
            let category = tx.category_or_default().to_string();
            let bucket = grouped
                .entry((tx.date.year(), tx.date.month()))
                .or_default()
                .entry(category.clone())
                .or_insert((0.0, 0));
            bucket.0 += tx.abs_amount();
            bucket.1 += 1;
            categories.insert(category);
        }

        self.trends = categories
            .into_iter()
            .map(|category| {
                let series: Vec<MonthlySpending> = grouped
                    .iter()
                    .map(|((year, month), by_category)| {
                        let (total, count) = by_category.get(&category).copied().unwrap_or((0.0, 0));
                        MonthlySpending {
                            month: format!("{year}-{month:02}"),
                            total,
                            count,
                            average: if count > 0 { total / count as f64 } else { 0.0 },
                        }
                    })
                    .collect();
                (category, Self::analyze_series(series))
            })
            .collect();
        self.trained = true;

        debug!(
            categories = self.trends.len(),
            months = grouped.len(),
            "Trend-aware budget recommender trained"
        );
        Ok(())
    }

    fn analyze_series(monthly_series: Vec<MonthlySpending>) -> CategoryTrend {
        let half = (monthly_series.len() / 2).max(1);
        let split = monthly_series.len().saturating_sub(half);
        let (older, recent) = monthly_series.split_at(split);

        let average_with_data = |months: &[MonthlySpending]| {
            let totals: Vec<f64> = months
                .iter()
                .filter(|m| m.count > 0)
                .map(|m| m.total)
                .collect();
            stats::mean(&totals)
        };
        let recent_average = average_with_data(recent);
        let older_average = average_with_data(older);

        let trend_percentage = if older_average > 0.0 && recent_average > 0.0 {
            (recent_average - older_average) / older_average
        } else {
            0.0
        };

        CategoryTrend {
            last_month_total: monthly_series.last().map(|m| m.total).unwrap_or(0.0),
            months_with_data: monthly_series.iter().filter(|m| m.count > 0).count(),
            monthly_series,
            recent_average,
            older_average,
            trend_percentage,
        }
    }

    fn eligible(&self) -> impl Iterator<Item = (&String, &CategoryTrend)> {
        self.trends
            .iter()
            .filter(|(_, t)| t.months_with_data >= MIN_MONTHS_WITH_DATA)
    }

    pub fn recommend_budgets(&self) -> Result<BTreeMap<String, TrendRecommendation>> {
        if !self.trained {
            return Err(Error::NotTrained("trend-aware budget recommender"));
        }

        Ok(self
            .eligible()
            .map(|(category, trend)| {
                let weighted = trend.recent_average * self.recent_weight
                    + trend.older_average * (1.0 - self.recent_weight);
                let safety = 1.0 + self.safety_margin;
                let adjustment = if trend.trend_percentage > 0.0 {
                    1.0 + trend.trend_percentage.min(MAX_TREND_ADJUSTMENT)
                } else {
                    1.0
                };
                let direction = if trend.trend_percentage > 0.0 {
                    TrendDirection::Increasing
                } else if trend.trend_percentage < 0.0 {
                    TrendDirection::Decreasing
                } else {
                    TrendDirection::Stable
                };
                let recommendation = TrendRecommendation {
                    conservative: (weighted * safety).round(),
                    trend_aware: (weighted * safety * adjustment).round(),
                    last_month: trend.last_month_total.round(),
                    direction,
                    trend_percent: (trend.trend_percentage * 100.0).round().abs(),
                };
                (category.clone(), recommendation)
            })
            .collect())
    }

    pub fn trend_analysis(&self) -> Result<BTreeMap<String, TrendAnalysis>> {
        if !self.trained {
            return Err(Error::NotTrained("trend-aware budget recommender"));
        }

        Ok(self
            .eligible()
            .map(|(category, trend)| {
                let analysis = TrendAnalysis {
                    trend_type: TrendType::classify(trend.trend_percentage),
                    trend_percentage: trend.trend_percentage,
                    months_analyzed: trend.months_with_data,
                    last_month_spending: trend.last_month_total,
                    average_monthly_spending: (trend.recent_average + trend.older_average) / 2.0,
                };
                (category.clone(), analysis)
            })
            .collect())
    }
}

impl Default for TrendAwareBudgetRecommender {
    fn default() -> Self {
        Self::new(0.7, 0.15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn spend(y: i32, m: u32, d: u32, amount: f64, category: &str) -> Transaction {
        Transaction::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), -amount).with_category(category)
    }

    #[test]
    fn test_percentile_tiers() {
        let history: Vec<Transaction> = [10.0, 20.0, 30.0, 40.0, 50.0]
            .iter()
            .enumerate()
            .map(|(i, a)| spend(2024, 1, i as u32 + 1, *a, "food"))
            .collect();
        let mut recommender = PercentileBudgetRecommender::new(0.2);
        recommender.train(&history).unwrap();

        let budgets = recommender.recommend_budgets().unwrap();
        let food = budgets.categories["food"];
        assert_eq!(food.conservative, 36.0);
        assert_eq!(food.moderate, 36.0);
        assert_eq!(food.aggressive, 60.0);
        assert_eq!(food.monthly, 1080.0);
        assert_eq!(budgets.total, food);

        let stats = &recommender.category_stats()["food"];
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 50.0);
        assert_eq!(stats.total, 150.0);
    }

    #[test]
    fn test_percentile_skips_sparse_categories() {
        let mut history: Vec<Transaction> = (1..=4).map(|d| spend(2024, 1, d, 25.0, "food")).collect();
        history.push(spend(2024, 1, 5, 500.0, "travel"));
        history.push(Transaction::new(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), -5.0));

        let mut recommender = PercentileBudgetRecommender::new(0.15);
        recommender.train(&history).unwrap();
        let budgets = recommender.recommend_budgets().unwrap();

        assert!(budgets.categories.contains_key("food"));
        assert!(!budgets.categories.contains_key("travel"));
        assert!(!budgets.categories.contains_key("uncategorized"));
        assert_eq!(recommender.category_stats()["uncategorized"].count, 1);
    }

    #[test]
    fn test_recommend_category_budget_falls_back_to_total() {
        let history: Vec<Transaction> = (1..=5).map(|d| spend(2024, 1, d, 10.0 * d as f64, "food")).collect();
        let mut recommender = PercentileBudgetRecommender::new(0.2);
        recommender.train(&history).unwrap();

        assert_eq!(
            recommender
                .recommend_category_budget("food", BudgetLevel::Aggressive)
                .unwrap(),
            60.0
        );
        assert_eq!(
            recommender
                .recommend_category_budget("unknown", BudgetLevel::Conservative)
                .unwrap(),
            36.0
        );
        assert_eq!("MONTHLY".parse::<BudgetLevel>().unwrap(), BudgetLevel::Monthly);
        assert!("lavish".parse::<BudgetLevel>().is_err());
    }

    #[test]
    fn test_percentile_requires_training() {
        let recommender = PercentileBudgetRecommender::default();
        assert!(matches!(
            recommender.recommend_budgets(),
            Err(Error::NotTrained(_))
        ));
    }

    fn two_month_history() -> Vec<Transaction> {
        let mut history = Vec::new();
        for day in 1..=5 {
            history.push(spend(2024, 1, day, 20.0, "food"));
            history.push(spend(2024, 1, day + 10, 40.0, "transport"));
            history.push(spend(2024, 2, day, 30.0, "food"));
            history.push(spend(2024, 2, day + 10, 40.0, "transport"));
        }
        history
    }

    #[test]
    fn test_trend_analysis_detects_rising_category() {
        let history = two_month_history();
        assert_eq!(history.len(), 20);

        let mut recommender = TrendAwareBudgetRecommender::default();
        recommender.train(&history).unwrap();
        let analysis = recommender.trend_analysis().unwrap();

        let food = &analysis["food"];
        assert_eq!(food.trend_type, TrendType::SignificantlyIncreasing);
        assert!((food.trend_percentage - 0.5).abs() < 1e-12);
        assert_eq!(food.months_analyzed, 2);
        assert_eq!(food.last_month_spending, 150.0);
        assert_eq!(food.average_monthly_spending, 125.0);

        assert_eq!(analysis["transport"].trend_type, TrendType::Stable);
    }

    #[test]
    fn test_trend_recommendations() {
        let mut recommender = TrendAwareBudgetRecommender::new(0.5, 0.2);
        recommender.train(&two_month_history()).unwrap();
        let budgets = recommender.recommend_budgets().unwrap();

        // weighted = 150 * 0.5 + 100 * 0.5 = 125; the +50% trend is capped at +20%
        let food = &budgets["food"];
        assert_eq!(food.conservative, 150.0);
        assert_eq!(food.trend_aware, 180.0);
        assert_eq!(food.last_month, 150.0);
        assert_eq!(food.direction, TrendDirection::Increasing);
        assert_eq!(food.trend_percent, 50.0);

        let transport = &budgets["transport"];
        assert_eq!(transport.conservative, 240.0);
        assert_eq!(transport.trend_aware, 240.0);
        assert_eq!(transport.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_trend_series_is_chronological_and_zero_filled() {
        let history = vec![
            spend(2023, 12, 5, 10.0, "gifts"),
            spend(2024, 2, 5, 10.0, "food"),
            spend(2023, 11, 5, 10.0, "food"),
        ];
        let mut recommender = TrendAwareBudgetRecommender::default();
        recommender.train(&history).unwrap();

        let food = &recommender.trends()["food"];
        let months: Vec<&str> = food.monthly_series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-02"]);
        assert_eq!(food.monthly_series[1].count, 0);
        assert_eq!(food.months_with_data, 2);

        // A single month of data is not enough for a recommendation
        assert!(!recommender.recommend_budgets().unwrap().contains_key("gifts"));
    }

    #[test]
    fn test_trend_type_thresholds() {
        assert_eq!(TrendType::classify(0.11), TrendType::SignificantlyIncreasing);
        assert_eq!(TrendType::classify(0.05), TrendType::SlightlyIncreasing);
        assert_eq!(TrendType::classify(0.0), TrendType::Stable);
        assert_eq!(TrendType::classify(-0.05), TrendType::SlightlyDecreasing);
        assert_eq!(TrendType::classify(-0.2), TrendType::SignificantlyDecreasing);
        assert_eq!(TrendType::SlightlyIncreasing.to_string(), "slightly_increasing");
    }
}
