//! Analytics service
//!
//! Owns one instance of every model, trains them all from a transaction
//! history and serves read-only queries over the trained state.
//!
//! State machine: `Uninitialized -> Initializing -> Ready`. Each model family
//! trains independently; a family that fails is recorded in the
//! [`TrainingReport`] and never blocks the others.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::anomaly::{
    IqrDetector, IqrResult, PatternAnomaly, SpendingPatternDetector, ZScoreDetector, ZScoreResult,
};
use crate::budget::{
    BudgetRecommendations, PercentileBudgetRecommender, TrendAnalysis,
    TrendAwareBudgetRecommender, TrendRecommendation,
};
use crate::categorize::{NaiveBayesClassifier, RuleBasedCategorizer};
use crate::config::AnalyticsConfig;
use crate::error::{Error, Result};
use crate::forecast::{DailyForecast, LinearRegression, MovingAverage, SeasonalModel};
use crate::models::{LabeledDescription, Transaction};
use crate::optimize::{
    ComparativeSpendingAnalyzer, ComparativeSuggestion, OptimizationRecommendations,
    SavingsSuggestion, SpendingPatternOptimizer,
};
use crate::prepare::{self, PreparedDataset};

/// Naive Bayes overrides the rule-based result only above this confidence
const NAIVE_BAYES_MIN_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Result of training one model family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FamilyOutcome {
    /// Whether each model of the family had enough data to train
    Trained { models: BTreeMap<&'static str, bool> },
    Failed { error: String },
}

impl FamilyOutcome {
    fn from_result(family: &str, result: Result<BTreeMap<&'static str, bool>>) -> Self {
        match result {
            Ok(models) => Self::Trained { models },
            Err(e) => {
                warn!(family, error = %e, "Model family failed to train");
                Self::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether the named model trained; false for failed families
    pub fn model_trained(&self, model: &str) -> bool {
        match self {
            Self::Trained { models } => models.get(model).copied().unwrap_or(false),
            Self::Failed { .. } => false,
        }
    }
}

/// Per-family outcome of [`AnalyticsService::initialize`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub transactions: usize,
    pub expense_prediction: FamilyOutcome,
    pub categorization: FamilyOutcome,
    pub anomaly_detection: FamilyOutcome,
    pub budget_recommendation: FamilyOutcome,
    pub optimization: FamilyOutcome,
}

impl TrainingReport {
    pub fn families(&self) -> [(&'static str, &FamilyOutcome); 5] {
        [
            ("expense_prediction", &self.expense_prediction),
            ("categorization", &self.categorization),
            ("anomaly_detection", &self.anomaly_detection),
            ("budget_recommendation", &self.budget_recommendation),
            ("optimization", &self.optimization),
        ]
    }
}

/// Forecasts keyed by model; untrained models are omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSet {
    pub seasonal: Vec<DailyForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_average: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linear: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorizationMethod {
    RuleBased,
    NaiveBayes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub predicted_category: String,
    pub confidence: f64,
    pub method: CategorizationMethod,
}

/// Anomaly results from the best trained detector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "detector", content = "results", rename_all = "snake_case")]
pub enum AnomalyReport {
    Pattern(Vec<PatternAnomaly>),
    ZScore(Vec<ZScoreResult>),
    Iqr(Vec<IqrResult>),
    /// No detector was trained; transactions are returned as given
    Unscored(Vec<Transaction>),
}

impl AnomalyReport {
    pub fn detector(&self) -> &'static str {
        match self {
            Self::Pattern(_) => "pattern",
            Self::ZScore(_) => "zscore",
            Self::Iqr(_) => "iqr",
            Self::Unscored(_) => "none",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Pattern(r) => r.len(),
            Self::ZScore(r) => r.len(),
            Self::Iqr(r) => r.len(),
            Self::Unscored(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transactions the detector flagged
    pub fn flagged(&self) -> Vec<&Transaction> {
        match self {
            Self::Pattern(r) => r
                .iter()
                .filter(|a| a.is_anomaly)
                .map(|a| &a.transaction)
                .collect(),
            Self::ZScore(r) => r
                .iter()
                .filter(|a| a.is_anomaly)
                .map(|a| &a.transaction)
                .collect(),
            Self::Iqr(r) => r
                .iter()
                .filter(|a| a.is_outlier)
                .map(|a| &a.transaction)
                .collect(),
            Self::Unscored(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<BudgetRecommendations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_aware: Option<BTreeMap<String, TrendRecommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_analysis: Option<BTreeMap<String, TrendAnalysis>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<OptimizationRecommendations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparative: Option<Vec<ComparativeSuggestion>>,
}

/// Every model the service owns, rebuilt on each initialize
#[derive(Debug, Clone)]
struct Models {
    seasonal: SeasonalModel,
    linear: LinearRegression,
    moving_average: MovingAverage,
    naive_bayes: NaiveBayesClassifier,
    rule_based: RuleBasedCategorizer,
    zscore: ZScoreDetector,
    iqr: IqrDetector,
    pattern: SpendingPatternDetector,
    percentile: PercentileBudgetRecommender,
    trend: TrendAwareBudgetRecommender,
    optimizer: SpendingPatternOptimizer,
    comparative: ComparativeSpendingAnalyzer,
}

impl Models {
    fn new(config: &AnalyticsConfig) -> Self {
        Self {
            seasonal: SeasonalModel::new(),
            linear: LinearRegression::new(),
            moving_average: MovingAverage::new(config.moving_average_window),
            naive_bayes: NaiveBayesClassifier::new(),
            rule_based: RuleBasedCategorizer::new(),
            zscore: ZScoreDetector::new(config.zscore_threshold),
            iqr: IqrDetector::new(config.iqr_multiplier),
            pattern: SpendingPatternDetector::new(),
            percentile: PercentileBudgetRecommender::new(config.budget_buffer),
            trend: TrendAwareBudgetRecommender::new(
                config.trend_recent_weight,
                config.trend_safety_margin,
            ),
            optimizer: SpendingPatternOptimizer::new(),
            comparative: ComparativeSpendingAnalyzer::new(config.reference.clone()),
        }
    }
}

/// Check a minimum-data gate, logging when a model is skipped
fn has_enough(model: &'static str, have: usize, need: usize) -> bool {
    if have < need {
        warn!(model, have, need, "Skipping model: insufficient data");
        return false;
    }
    true
}

#[derive(Debug)]
pub struct AnalyticsService {
    config: AnalyticsConfig,
    state: ServiceState,
    models: Models,
    data: Option<PreparedDataset>,
    report: Option<TrainingReport>,
    /// Fixed "today" for forecasts and the comparative window
    reference_date: Option<NaiveDate>,
}

impl AnalyticsService {
    pub fn new(config: AnalyticsConfig) -> Self {
        let models = Models::new(&config);
        Self {
            config,
            state: ServiceState::Uninitialized,
            models,
            data: None,
            report: None,
            reference_date: None,
        }
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ServiceState::Ready
    }

    pub fn training_report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// The prepared (date-sorted) history the models were trained on
    pub fn prepared(&self) -> Option<&PreparedDataset> {
        self.data.as_ref()
    }

    /// The pinned reference date, or the local date
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Train every model family from `transactions`, replacing all prior state
    ///
    /// Fails only when the history cannot be prepared (empty or non-finite).
    pub fn initialize(&mut self, transactions: &[Transaction]) -> Result<&TrainingReport> {
        let data = prepare::prepare(transactions)?;

        self.state = ServiceState::Initializing;
        self.models = Models::new(&self.config);
        self.report = None;

        let expense_prediction =
            FamilyOutcome::from_result("expense_prediction", self.train_expense_prediction(&data));
        let categorization =
            FamilyOutcome::from_result("categorization", self.train_categorization(&data));
        let anomaly_detection =
            FamilyOutcome::from_result("anomaly_detection", self.train_anomaly_detection(&data));
        let budget_recommendation = FamilyOutcome::from_result(
            "budget_recommendation",
            self.train_budget_recommendation(&data),
        );
        let optimization =
            FamilyOutcome::from_result("optimization", self.train_optimization(&data));

        let report = TrainingReport {
            transactions: data.len(),
            expense_prediction,
            categorization,
            anomaly_detection,
            budget_recommendation,
            optimization,
        };
        let failed = report
            .families()
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .count();
        info!(
            transactions = data.len(),
            failed_families = failed,
            "Analytics models initialized"
        );

        self.data = Some(data);
        self.state = ServiceState::Ready;
        Ok(self.report.insert(report))
    }

    fn train_expense_prediction(
        &mut self,
        data: &PreparedDataset,
    ) -> Result<BTreeMap<&'static str, bool>> {
        let n = data.len();
        let models = &mut self.models;

        models.seasonal.train(&data.transactions)?;

        let linear = has_enough("linear", n, self.config.min_transactions);
        if linear {
            let indices: Vec<f64> = (0..n).map(|i| i as f64).collect();
            models.linear.train(&indices, &data.amounts)?;
        }

        let moving_average =
            has_enough("moving_average", n, self.config.min_moving_average_transactions);
        if moving_average {
            models.moving_average.update(&data.amounts);
        }

        debug!(linear, moving_average, "Expense prediction models trained");
        Ok(BTreeMap::from([
            ("seasonal", true),
            ("linear", linear),
            ("moving_average", moving_average),
        ]))
    }

    fn train_categorization(
        &mut self,
        data: &PreparedDataset,
    ) -> Result<BTreeMap<&'static str, bool>> {
        let categorized: Vec<&Transaction> = data
            .transactions
            .iter()
            .filter(|t| t.category().is_some())
            .collect();

        let mut naive_bayes =
            has_enough("naive_bayes", categorized.len(), self.config.min_transactions);
        if naive_bayes {
            let examples: Vec<LabeledDescription> = categorized
                .iter()
                .map(|t| {
                    LabeledDescription::new(
                        t.description().unwrap_or_default(),
                        t.category_or_default(),
                    )
                })
                .collect();
            if let Err(e) = self.models.naive_bayes.train(&examples) {
                warn!(model = "naive_bayes", error = %e, "Skipping model");
                naive_bayes = false;
            }
        }

        self.models.rule_based.train(&data.transactions);

        Ok(BTreeMap::from([
            ("naive_bayes", naive_bayes),
            ("rule_based", true),
        ]))
    }

    fn train_anomaly_detection(
        &mut self,
        data: &PreparedDataset,
    ) -> Result<BTreeMap<&'static str, bool>> {
        let amounts = data.abs_amounts();
        let enough = has_enough("anomaly_detection", amounts.len(), self.config.min_transactions);
        if enough {
            self.models.zscore.train(&amounts)?;
            self.models.iqr.train(&amounts)?;
            self.models.pattern.train(&data.transactions)?;
        }
        Ok(BTreeMap::from([
            ("zscore", enough),
            ("iqr", enough),
            ("pattern", enough),
        ]))
    }

    fn train_budget_recommendation(
        &mut self,
        data: &PreparedDataset,
    ) -> Result<BTreeMap<&'static str, bool>> {
        let n = data.len();

        let percentile = has_enough("percentile", n, self.config.min_transactions);
        if percentile {
            self.models.percentile.train(&data.transactions)?;
        }

        let trend = has_enough("trend", n, self.config.min_trend_transactions);
        if trend {
            self.models.trend.train(&data.transactions)?;
        }

        Ok(BTreeMap::from([("percentile", percentile), ("trend", trend)]))
    }

    fn train_optimization(
        &mut self,
        data: &PreparedDataset,
    ) -> Result<BTreeMap<&'static str, bool>> {
        let n = data.len();

        let patterns = has_enough("patterns", n, self.config.min_transactions);
        if patterns {
            self.models.optimizer.train(&data.transactions)?;
        }

        let comparative = has_enough("comparative", n, self.config.min_trend_transactions);
        if comparative {
            let today = self.today();
            self.models.comparative.train_as_of(
                &data.transactions,
                self.config.comparative_period_days,
                today,
            )?;
        }

        Ok(BTreeMap::from([
            ("patterns", patterns),
            ("comparative", comparative),
        ]))
    }

    /// Forecast the next `days` days with every trained forecaster
    pub fn predict_expenses(&self, days: u32) -> Result<PredictionSet> {
        self.ensure_ready()?;

        let seasonal = self
            .models
            .seasonal
            .predict_days_after(self.today(), days)?;

        let moving_average = if self.models.moving_average.is_trained() {
            Some(self.models.moving_average.predict(days as usize)?)
        } else {
            None
        };

        let linear = match (&self.data, self.models.linear.is_trained()) {
            (Some(data), true) => {
                let last_index = data.len() - 1;
                let xs: Vec<f64> = (1..=days as usize)
                    .map(|i| (last_index + i) as f64)
                    .collect();
                Some(self.models.linear.predict_many(&xs)?)
            }
            _ => None,
        };

        Ok(PredictionSet {
            seasonal,
            moving_average,
            linear,
        })
    }

    /// Categorize each transaction, preferring rules unless naive Bayes is
    /// confident (above 0.7 and above the rule-based confidence)
    pub fn categorize_transactions(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<CategorizedTransaction>> {
        self.ensure_ready()?;

        let rule_results = self.models.rule_based.categorize_batch(transactions);
        let nb_results = if self.models.naive_bayes.is_trained() {
            Some(self.models.naive_bayes.predict_batch(transactions)?)
        } else {
            None
        };

        Ok(transactions
            .iter()
            .zip(rule_results)
            .enumerate()
            .map(|(i, (tx, rule))| {
                let nb = nb_results.as_ref().map(|r| &r[i]);
                match nb {
                    Some(nb)
                        if nb.confidence > NAIVE_BAYES_MIN_CONFIDENCE
                            && nb.confidence > rule.confidence =>
                    {
                        CategorizedTransaction {
                            transaction: tx.clone(),
                            predicted_category: nb.category.clone(),
                            confidence: nb.confidence,
                            method: CategorizationMethod::NaiveBayes,
                        }
                    }
                    _ => CategorizedTransaction {
                        transaction: tx.clone(),
                        predicted_category: rule.category,
                        confidence: rule.confidence,
                        method: CategorizationMethod::RuleBased,
                    },
                }
            })
            .collect())
    }

    /// Score transactions with the pattern detector, else z-score, else IQR
    pub fn detect_anomalies(&self, transactions: &[Transaction]) -> Result<AnomalyReport> {
        self.ensure_ready()?;

        let m = &self.models;
        let report = if m.pattern.is_trained() {
            AnomalyReport::Pattern(m.pattern.detect_anomalies(transactions)?)
        } else if m.zscore.is_trained() {
            AnomalyReport::ZScore(m.zscore.detect_transactions(transactions)?)
        } else if m.iqr.is_trained() {
            AnomalyReport::Iqr(m.iqr.detect_transactions(transactions)?)
        } else {
            AnomalyReport::Unscored(transactions.to_vec())
        };
        Ok(report)
    }

    pub fn recommend_budgets(&self) -> Result<BudgetReport> {
        self.ensure_ready()?;

        let m = &self.models;
        let standard = if m.percentile.is_trained() {
            Some(m.percentile.recommend_budgets()?)
        } else {
            None
        };
        let (trend_aware, trend_analysis) = if m.trend.is_trained() {
            (
                Some(m.trend.recommend_budgets()?),
                Some(m.trend.trend_analysis()?),
            )
        } else {
            (None, None)
        };

        Ok(BudgetReport {
            standard,
            trend_aware,
            trend_analysis,
        })
    }

    pub fn optimize_expenses(&self) -> Result<OptimizationReport> {
        self.ensure_ready()?;

        let m = &self.models;
        let patterns = if m.optimizer.is_trained() {
            Some(m.optimizer.generate_recommendations()?)
        } else {
            None
        };
        let comparative = if m.comparative.is_trained() {
            Some(m.comparative.generate_optimization_suggestions()?)
        } else {
            None
        };

        Ok(OptimizationReport {
            patterns,
            comparative,
        })
    }

    /// Savings plan toward `target`; needs the pattern optimizer trained
    pub fn generate_savings_plan(&self, target: f64) -> Result<Vec<SavingsSuggestion>> {
        self.ensure_ready()?;
        self.models.optimizer.suggest_savings(target)
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn history(n: usize) -> Vec<Transaction> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let (description, category) = if i % 2 == 0 {
                    ("Grocer weekly groceries", "food")
                } else {
                    ("Metro train ticket", "transportation")
                };
                Transaction::new(start + Duration::days(i as i64 * 3), -(20.0 + (i % 5) as f64))
                    .with_description(description)
                    .with_category(category)
            })
            .collect()
    }

    #[test]
    fn test_queries_fail_before_initialize() {
        let service = AnalyticsService::default();
        assert_eq!(service.state(), ServiceState::Uninitialized);
        assert!(matches!(service.predict_expenses(7), Err(Error::NotInitialized)));
        assert!(matches!(service.categorize_transactions(&[]), Err(Error::NotInitialized)));
        assert!(matches!(service.detect_anomalies(&[]), Err(Error::NotInitialized)));
        assert!(matches!(service.recommend_budgets(), Err(Error::NotInitialized)));
        assert!(matches!(service.optimize_expenses(), Err(Error::NotInitialized)));
        assert!(matches!(service.generate_savings_plan(10.0), Err(Error::NotInitialized)));
    }

    #[test]
    fn test_initialize_empty_fails() {
        let mut service = AnalyticsService::default();
        assert!(matches!(service.initialize(&[]), Err(Error::InvalidInput(_))));
        assert!(!service.is_ready());
    }

    #[test]
    fn test_small_history_trains_what_it_can() {
        let mut service = AnalyticsService::default();
        let report = service.initialize(&history(5)).unwrap().clone();

        assert!(report.expense_prediction.model_trained("seasonal"));
        assert!(report.expense_prediction.model_trained("moving_average"));
        assert!(!report.expense_prediction.model_trained("linear"));
        assert!(!report.anomaly_detection.model_trained("pattern"));
        assert!(report.categorization.model_trained("rule_based"));

        let predictions = service.predict_expenses(3).unwrap();
        assert_eq!(predictions.seasonal.len(), 3);
        assert_eq!(predictions.moving_average.as_ref().map(Vec::len), Some(3));
        assert!(predictions.linear.is_none());

        let anomalies = service.detect_anomalies(&history(2)).unwrap();
        assert!(matches!(anomalies, AnomalyReport::Unscored(_)));

        let budgets = service.recommend_budgets().unwrap();
        assert!(budgets.standard.is_none());
        assert!(budgets.trend_aware.is_none());

        assert!(matches!(
            service.generate_savings_plan(10.0),
            Err(Error::NotTrained(_))
        ));
    }

    #[test]
    fn test_full_history_trains_everything() {
        let mut service = AnalyticsService::default()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        let report = service.initialize(&history(30)).unwrap().clone();

        for (family, outcome) in report.families() {
            assert!(!outcome.is_failed(), "{family} failed");
        }
        assert!(report.categorization.model_trained("naive_bayes"));
        assert!(report.optimization.model_trained("comparative"));

        let predictions = service.predict_expenses(7).unwrap();
        assert_eq!(predictions.linear.as_ref().map(Vec::len), Some(7));
        assert_eq!(
            predictions.seasonal[0].date,
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );

        let anomalies = service.detect_anomalies(&history(3)).unwrap();
        assert_eq!(anomalies.detector(), "pattern");
        assert_eq!(anomalies.len(), 3);
    }

    #[test]
    fn test_categorization_prefers_rules_unless_bayes_is_confident() {
        let mut service = AnalyticsService::default();
        service.initialize(&history(20)).unwrap();

        let queries = vec![
            Transaction::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), -3.0)
                .with_description("Amazon purchase"),
            Transaction::new(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), -3.0)
                .with_description("weekly groceries"),
        ];
        let results = service.categorize_transactions(&queries).unwrap();

        assert_eq!(results[0].predicted_category, "shopping");
        assert_eq!(results[0].method, CategorizationMethod::RuleBased);
        assert_eq!(results[0].confidence, 0.9);

        // "weekly" and "groceries" are only ever seen under food
        assert_eq!(results[1].predicted_category, "food");
        assert_eq!(results[1].method, CategorizationMethod::NaiveBayes);
        assert!(results[1].confidence > 0.7);
    }

    #[test]
    fn test_wordless_descriptions_fall_back_to_rules() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let transactions: Vec<Transaction> = (0..12)
            .map(|i| {
                Transaction::new(start + Duration::days(i), -10.0)
                    .with_description("***")
                    .with_category("food")
            })
            .collect();

        let mut service = AnalyticsService::default();
        let report = service.initialize(&transactions).unwrap().clone();
        assert!(!report.categorization.is_failed());
        assert!(!report.categorization.model_trained("naive_bayes"));
        assert!(report.categorization.model_trained("rule_based"));

        let results = service.categorize_transactions(&transactions[..1]).unwrap();
        assert_eq!(results[0].method, CategorizationMethod::RuleBased);
        assert!((0.0..=1.0).contains(&results[0].confidence));
    }

    #[test]
    fn test_reinitialize_replaces_state() {
        let mut service = AnalyticsService::default();
        service.initialize(&history(30)).unwrap();
        assert!(service.recommend_budgets().unwrap().standard.is_some());

        service.initialize(&history(4)).unwrap();
        assert_eq!(service.prepared().map(PreparedDataset::len), Some(4));
        assert!(service.recommend_budgets().unwrap().standard.is_none());
    }
}
