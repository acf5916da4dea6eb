//! Fintrack Core Library
//!
//! Statistical analytics over a personal transaction history:
//! - Data preparation (date sorting, calendar and keyword features)
//! - Expense forecasting (linear regression, moving average, seasonal blend)
//! - Transaction categorization (naive Bayes and merchant/keyword rules)
//! - Anomaly detection (z-score, IQR, weekday/merchant pattern scoring)
//! - Budget recommendation (percentile tiers and trend-aware budgets)
//! - Expense optimization (subscriptions, savings plans, benchmarks)
//! - An analytics service that trains and serves all of the above
//! - CSV/JSON transaction import and TOML configuration

pub mod anomaly;
pub mod budget;
pub mod categorize;
pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod optimize;
pub mod prepare;
pub mod service;
pub mod stats;

pub use anomaly::{IqrDetector, SpendingPatternDetector, ZScoreDetector};
pub use budget::{
    BudgetLevel, BudgetRecommendations, PercentileBudgetRecommender, TrendAnalysis,
    TrendAwareBudgetRecommender, TrendType,
};
pub use categorize::{Classification, NaiveBayesClassifier, RuleBasedCategorizer};
pub use config::AnalyticsConfig;
pub use error::{Error, Result};
pub use forecast::{DailyForecast, LinearRegression, MovingAverage, SeasonalModel};
pub use import::load_transactions;
pub use models::{LabeledDescription, Transaction};
pub use optimize::{
    ComparativeSpendingAnalyzer, ReferenceRange, SavingsSuggestion, SpendingPatternOptimizer,
};
pub use prepare::{prepare, PreparedDataset};
pub use service::{
    AnalyticsService, AnomalyReport, BudgetReport, CategorizationMethod, CategorizedTransaction,
    FamilyOutcome, OptimizationReport, PredictionSet, ServiceState, TrainingReport,
};
