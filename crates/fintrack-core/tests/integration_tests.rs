//! Integration tests for fintrack-core
//!
//! These tests exercise the full import → initialize → query workflow.

use chrono::{Datelike, Duration, NaiveDate};
use fintrack_core::{
    anomaly::OutlierDirection,
    budget::TrendType,
    import::parse_csv,
    prepare, AnalyticsConfig, AnalyticsService, AnomalyReport, Error, IqrDetector,
    LinearRegression, PercentileBudgetRecommender, RuleBasedCategorizer, SavingsSuggestion,
    SeasonalModel, Transaction, TrendAwareBudgetRecommender, ZScoreDetector,
};

/// Three months of household spending as a bank export would give it
/// - Monthly Netflix and Spotify charges (subscriptions)
/// - Frequent coffee purchases
/// - Weekly groceries, monthly rent and utilities
fn household_csv() -> String {
    let mut csv = String::from("date,amount,category,description\n");
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for month in 0..3 {
        let first = start + Duration::days(month * 30);
        csv.push_str(&format!("{},-15.99,entertainment,NETFLIX.COM\n", first + Duration::days(4)));
        csv.push_str(&format!("{},-10.99,entertainment,Spotify USA\n", first + Duration::days(9)));
        csv.push_str(&format!("{},-1200.00,housing,Rent payment\n", first));
        csv.push_str(&format!("{},-85.40,utilities,Electric bill\n", first + Duration::days(14)));
        for week in 0..4 {
            let day = first + Duration::days(week * 7 + 2);
            let amount = 60.0 + (week as f64) * 5.0 + (month as f64) * 10.0;
            csv.push_str(&format!("{},-{:.2},food,Grocer weekly groceries\n", day, amount));
        }
        for visit in 0..3 {
            let day = first + Duration::days(visit * 9 + 5);
            csv.push_str(&format!("{},($4.75),food,Starbucks latte\n", day));
        }
    }
    csv
}

fn household() -> Vec<Transaction> {
    parse_csv(household_csv().as_bytes()).expect("Failed to parse CSV")
}

fn reference_date(transactions: &[Transaction]) -> NaiveDate {
    transactions.iter().map(|t| t.date).max().unwrap()
}

// =============================================================================
// End-to-end service workflow
// =============================================================================

#[test]
fn test_full_analytics_workflow() {
    let transactions = household();
    assert_eq!(transactions.len(), 3 * (4 + 4 + 3));

    let mut service = AnalyticsService::new(AnalyticsConfig::default())
        .with_reference_date(reference_date(&transactions));
    let report = service.initialize(&transactions).unwrap().clone();

    for (family, outcome) in report.families() {
        assert!(!outcome.is_failed(), "{family} failed to train");
    }
    assert!(service.is_ready());

    let predictions = service.predict_expenses(7).unwrap();
    assert_eq!(predictions.seasonal.len(), 7);
    assert!(predictions.seasonal.iter().all(|d| d.predicted_amount > 0.0));
    assert_eq!(predictions.moving_average.as_ref().unwrap().len(), 7);
    assert_eq!(predictions.linear.as_ref().unwrap().len(), 7);

    let budgets = service.recommend_budgets().unwrap();
    let standard = budgets.standard.expect("percentile budgets");
    assert!(standard.categories.contains_key("food"));
    assert!(standard.categories.contains_key("housing"));
    assert!(budgets.trend_analysis.unwrap().contains_key("food"));

    let optimization = service.optimize_expenses().unwrap();
    let patterns = optimization.patterns.expect("pattern recommendations");
    let merchants: Vec<&str> = patterns
        .subscriptions
        .iter()
        .map(|s| s.merchant.as_str())
        .collect();
    assert!(merchants.contains(&"netflix.com"));
    assert!(merchants.contains(&"spotify"));
    // Most expensive recurring charge first
    assert_eq!(merchants[0], "rent");

    let plan = service.generate_savings_plan(50.0).unwrap();
    assert!(matches!(
        plan.last(),
        Some(SavingsSuggestion::Summary { achievable: true, .. })
    ));
}

#[test]
fn test_queries_are_idempotent() {
    let transactions = household();
    let mut service =
        AnalyticsService::default().with_reference_date(reference_date(&transactions));
    service.initialize(&transactions).unwrap();

    assert_eq!(
        service.recommend_budgets().unwrap(),
        service.recommend_budgets().unwrap()
    );
    assert_eq!(
        service.optimize_expenses().unwrap(),
        service.optimize_expenses().unwrap()
    );
    assert_eq!(
        service.detect_anomalies(&transactions).unwrap(),
        service.detect_anomalies(&transactions).unwrap()
    );
}

#[test]
fn test_uninitialized_and_empty_boundaries() {
    let mut service = AnalyticsService::default();
    assert!(matches!(service.recommend_budgets(), Err(Error::NotInitialized)));
    assert!(matches!(service.initialize(&[]), Err(Error::InvalidInput(_))));
    assert!(matches!(service.optimize_expenses(), Err(Error::NotInitialized)));
}

#[test]
fn test_anomalous_purchase_is_flagged() {
    let transactions = household();
    let mut service =
        AnalyticsService::default().with_reference_date(reference_date(&transactions));
    service.initialize(&transactions).unwrap();

    let splurge = Transaction::new(reference_date(&transactions) + Duration::days(1), -950.0)
        .with_description("Starbucks catering order");
    let report = service.detect_anomalies(&[splurge]).unwrap();
    match &report {
        AnomalyReport::Pattern(results) => {
            assert!(results[0].is_anomaly);
            assert!(results[0].overall_anomaly_score <= 1.0);
        }
        other => panic!("expected pattern results, got {}", other.detector()),
    }
    assert_eq!(report.flagged().len(), 1);
}

#[test]
fn test_anomaly_report_serializes_with_detector_tag() {
    let transactions = household();
    let mut service =
        AnalyticsService::default().with_reference_date(reference_date(&transactions));
    service.initialize(&transactions).unwrap();

    let report = service.detect_anomalies(&transactions[..1]).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["detector"], "pattern");
    assert!(json["results"][0]["date"].is_string());
    assert!(json["results"][0]["is_anomaly"].is_boolean());
}

// =============================================================================
// Model properties
// =============================================================================

#[test]
fn test_prepare_preserves_amounts_and_orders_dates() {
    let mut transactions = household();
    transactions.reverse();
    let prepared = prepare(&transactions).unwrap();

    assert!(prepared.dates.windows(2).all(|w| w[0] <= w[1]));
    let mut input: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
    let mut output = prepared.amounts.clone();
    input.sort_by(f64::total_cmp);
    output.sort_by(f64::total_cmp);
    assert_eq!(input, output);
}

#[test]
fn test_linear_regression_exact_fit() {
    let mut model = LinearRegression::new();
    let fit = model
        .train(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0])
        .unwrap();
    assert_eq!(fit.slope, 2.0);
    assert_eq!(fit.intercept, 1.0);
    assert_eq!(model.predict(4.0).unwrap(), 9.0);
}

#[test]
fn test_seasonal_blend_is_exact() {
    let transactions = household();
    let mut model = SeasonalModel::new();
    model.train(&transactions).unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
    let weekday = model.weekday_averages()[date.weekday().num_days_from_sunday() as usize];
    let month = model.month_averages()[date.month0() as usize];
    let expected = 0.4 * model.overall_average() + 0.3 * weekday + 0.3 * month;
    assert!((model.predict(date).unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_iqr_detects_single_high_outlier() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
    let mut detector = IqrDetector::new(1.5);
    detector.train(&values).unwrap();
    let outliers = detector.detect(&values).unwrap();
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].value, 100.0);
    assert_eq!(outliers[0].direction, OutlierDirection::High);
}

#[test]
fn test_zscore_bounded_false_positives() {
    let transactions = household();
    let amounts: Vec<f64> = transactions
        .iter()
        .filter(|t| t.category() == Some("food"))
        .map(|t| t.abs_amount())
        .collect();
    let mut detector = ZScoreDetector::new(2.5);
    detector.train(&amounts).unwrap();
    let flagged = detector.detect(&amounts).unwrap();
    assert!(flagged.len() * 10 <= amounts.len());
}

#[test]
fn test_percentile_conservative_budget() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let transactions: Vec<Transaction> = [10.0, 20.0, 30.0, 40.0, 50.0]
        .iter()
        .enumerate()
        .map(|(i, a)| {
            Transaction::new(start + Duration::days(i as i64), -a).with_category("food")
        })
        .collect();
    let mut recommender = PercentileBudgetRecommender::new(0.2);
    recommender.train(&transactions).unwrap();
    assert_eq!(
        recommender.recommend_budgets().unwrap().categories["food"].conservative,
        36.0
    );
}

#[test]
fn test_rule_based_merchant_shortcut() {
    let categorizer = RuleBasedCategorizer::new();
    let result = categorizer.categorize("Amazon purchase");
    assert_eq!(result.category, "shopping");
    assert_eq!(result.confidence, 0.9);
}

#[test]
fn test_trend_analysis_rising_food() {
    let mut transactions = Vec::new();
    for i in 0..10 {
        let month = if i < 5 { 1 } else { 2 };
        let day = (i % 5) as u32 * 5 + 1;
        let date = NaiveDate::from_ymd_opt(2024, month, day).unwrap();
        let food = if month == 1 { 40.0 } else { 60.0 };
        transactions.push(Transaction::new(date, -food).with_category("food"));
        transactions.push(Transaction::new(date, -25.0).with_category("transport"));
    }
    assert_eq!(transactions.len(), 20);

    let mut recommender = TrendAwareBudgetRecommender::default();
    recommender.train(&transactions).unwrap();
    let analysis = recommender.trend_analysis().unwrap();
    assert_eq!(analysis["food"].trend_type, TrendType::SignificantlyIncreasing);
    assert_eq!(analysis["transport"].trend_type, TrendType::Stable);
}
