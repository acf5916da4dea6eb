//! Expense optimization
//!
//! [`SpendingPatternOptimizer`] finds recurring charges and heavy-spend
//! merchants in a user's own history. [`ComparativeSpendingAnalyzer`]
//! compares recent monthly category spending against reference ranges.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::stats;

/// Gap tolerance around the merchant's own average interval
const INTERVAL_TOLERANCE_DAYS: f64 = 5.0;
/// Known billing cycles (days) and how far a gap may drift from them
const BILLING_CYCLES: &[(f64, f64)] = &[(30.0, 5.0), (90.0, 10.0), (365.0, 15.0)];
/// A subscription may show at most this many distinct amounts
const MAX_DISTINCT_SUBSCRIPTION_AMOUNTS: usize = 2;
const HIGH_FREQUENCY_MIN_COUNT: usize = 5;
const HIGH_FREQUENCY_LIMIT: usize = 5;
const TOP_CATEGORY_LIMIT: usize = 3;
const TOP_MERCHANT_LIMIT: usize = 5;
/// Merchants considered for reduction suggestions, by total spend
const SAVINGS_MERCHANT_LIMIT: usize = 10;
const SAVINGS_REDUCTION_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Biannual,
    Annual,
}

impl SubscriptionFrequency {
    pub fn from_average_gap(days: f64) -> Self {
        if days <= 9.0 {
            Self::Weekly
        } else if days <= 15.0 {
            Self::Biweekly
        } else if days <= 40.0 {
            Self::Monthly
        } else if days <= 100.0 {
            Self::Quarterly
        } else if days <= 200.0 {
            Self::Biannual
        } else {
            Self::Annual
        }
    }

    pub fn occurrences_per_year(&self) -> f64 {
        match self {
            Self::Weekly => 52.0,
            Self::Biweekly => 26.0,
            Self::Monthly => 12.0,
            Self::Quarterly => 4.0,
            Self::Biannual => 2.0,
            Self::Annual => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Biannual => "biannual",
            Self::Annual => "annual",
        }
    }
}

impl std::fmt::Display for SubscriptionFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A merchant whose charges look like a recurring subscription
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub merchant: String,
    pub frequency: SubscriptionFrequency,
    /// Most recent absolute charge
    pub amount: f64,
    pub annual_cost: f64,
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantSpending {
    pub count: usize,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantTotal {
    pub merchant: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub count: usize,
    pub total_spent: f64,
    pub average_amount: f64,
    pub top_merchants: Vec<MerchantTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRecommendation {
    pub merchant: String,
    pub frequency: SubscriptionFrequency,
    pub amount: f64,
    pub annual_cost: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighFrequencyMerchant {
    pub merchant: String,
    pub count: usize,
    pub total_spent: f64,
    pub average_per_transaction: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOptimization {
    pub category: String,
    pub total_spent: f64,
    pub transaction_count: usize,
    pub average_amount: f64,
    pub top_merchants: Vec<MerchantTotal>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationRecommendations {
    pub subscriptions: Vec<SubscriptionRecommendation>,
    pub high_frequency_spending: Vec<HighFrequencyMerchant>,
    pub category_optimizations: Vec<CategoryOptimization>,
}

/// One step of a savings plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SavingsSuggestion {
    Subscription {
        merchant: String,
        action: String,
        savings_amount: f64,
        timeframe: String,
        explanation: String,
    },
    Frequency {
        merchant: String,
        action: String,
        savings_amount: f64,
        timeframe: String,
        explanation: String,
    },
    Summary {
        potential_savings: f64,
        target_savings: f64,
        achievable: bool,
        explanation: String,
    },
}

impl SavingsSuggestion {
    pub fn savings_amount(&self) -> Option<f64> {
        match self {
            Self::Subscription { savings_amount, .. } | Self::Frequency { savings_amount, .. } => {
                Some(*savings_amount)
            }
            Self::Summary { .. } => None,
        }
    }
}

fn day_gaps(sorted: &[&Transaction]) -> Vec<f64> {
    sorted
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days() as f64)
        .collect()
}

fn is_subscription(sorted: &[&Transaction]) -> bool {
    if sorted.len() < 2 {
        return false;
    }

    let distinct: HashSet<u64> = sorted.iter().map(|t| t.amount.to_bits()).collect();
    if distinct.len() > MAX_DISTINCT_SUBSCRIPTION_AMOUNTS {
        return false;
    }

    let gaps = day_gaps(sorted);
    let avg = stats::mean(&gaps);
    gaps.iter().all(|gap| {
        (gap - avg).abs() <= INTERVAL_TOLERANCE_DAYS
            || BILLING_CYCLES
                .iter()
                .any(|(cycle, tolerance)| (gap - cycle).abs() <= *tolerance)
    })
}

fn top_merchants(transactions: &[&Transaction], limit: usize) -> Vec<MerchantTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.merchant()).or_insert(0.0) += tx.abs_amount();
    }
    let mut ranked: Vec<MerchantTotal> = totals
        .into_iter()
        .map(|(merchant, total)| MerchantTotal { merchant, total })
        .collect();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked.truncate(limit);
    ranked
}

/// Finds subscriptions, frequent merchants and heavy categories
#[derive(Debug, Clone, Default)]
pub struct SpendingPatternOptimizer {
    merchant_frequency: BTreeMap<String, MerchantSpending>,
    category_analysis: BTreeMap<String, CategorySpending>,
    /// Sorted by annual cost, highest first
    subscriptions: Vec<Subscription>,
    trained: bool,
}

impl SpendingPatternOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn merchant_frequency(&self) -> &BTreeMap<String, MerchantSpending> {
        &self.merchant_frequency
    }

    pub fn category_analysis(&self) -> &BTreeMap<String, CategorySpending> {
        &self.category_analysis
    }

    pub fn train(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            return Err(Error::InsufficientData(
                "no transactions to optimize".to_string(),
            ));
        }

        let mut by_merchant: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        let mut by_category: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions {
            by_merchant.entry(tx.merchant()).or_default().push(tx);
            by_category
                .entry(tx.category_or_default().to_string())
                .or_default()
                .push(tx);
        }

        self.merchant_frequency = by_merchant
            .iter()
            .map(|(merchant, txs)| {
                let spending = MerchantSpending {
                    count: txs.len(),
                    total_spent: txs.iter().map(|t| t.abs_amount()).sum(),
                };
                (merchant.clone(), spending)
            })
            .collect();

        self.category_analysis = by_category
            .iter()
            .map(|(category, txs)| {
                let total_spent: f64 = txs.iter().map(|t| t.abs_amount()).sum();
                let spending = CategorySpending {
                    count: txs.len(),
                    total_spent,
                    average_amount: total_spent / txs.len() as f64,
                    top_merchants: top_merchants(txs, TOP_MERCHANT_LIMIT),
                };
                (category.clone(), spending)
            })
            .collect();

        self.subscriptions = by_merchant
            .into_iter()
            .filter_map(|(merchant, mut txs)| {
                txs.sort_by_key(|t| t.date);
                if !is_subscription(&txs) {
                    return None;
                }
                let frequency = SubscriptionFrequency::from_average_gap(stats::mean(&day_gaps(&txs)));
                let amount = txs.last().map(|t| t.abs_amount()).unwrap_or(0.0);
                Some(Subscription {
                    merchant,
                    frequency,
                    amount,
                    annual_cost: amount * frequency.occurrences_per_year(),
                    occurrences: txs.len(),
                })
            })
            .collect();
        self.subscriptions
            .sort_by(|a, b| b.annual_cost.total_cmp(&a.annual_cost));
        self.trained = true;

        debug!(
            merchants = self.merchant_frequency.len(),
            categories = self.category_analysis.len(),
            subscriptions = self.subscriptions.len(),
            "Spending pattern optimizer trained"
        );
        Ok(())
    }

    fn merchants_by_spend(&self) -> Vec<(&String, &MerchantSpending)> {
        let mut ranked: Vec<_> = self.merchant_frequency.iter().collect();
        ranked.sort_by(|a, b| b.1.total_spent.total_cmp(&a.1.total_spent));
        ranked
    }

    pub fn generate_recommendations(&self) -> Result<OptimizationRecommendations> {
        if !self.trained {
            return Err(Error::NotTrained("spending pattern optimizer"));
        }

        let subscriptions = self
            .subscriptions
            .iter()
            .map(|sub| SubscriptionRecommendation {
                merchant: sub.merchant.clone(),
                frequency: sub.frequency,
                amount: sub.amount,
                annual_cost: sub.annual_cost,
                suggestion: format!(
                    "Consider if you're getting value from this {} {} subscription. \
                     Cancelling would save you approximately {:.2} per year.",
                    sub.frequency, sub.merchant, sub.annual_cost
                ),
            })
            .collect();

        let high_frequency_spending = self
            .merchants_by_spend()
            .into_iter()
            .filter(|(_, data)| data.count >= HIGH_FREQUENCY_MIN_COUNT)
            .take(HIGH_FREQUENCY_LIMIT)
            .map(|(merchant, data)| HighFrequencyMerchant {
                merchant: merchant.clone(),
                count: data.count,
                total_spent: data.total_spent,
                average_per_transaction: data.total_spent / data.count as f64,
                suggestion: format!(
                    "You spent {:.2} across {} transactions at {}. \
                     Consider reducing frequency or finding alternatives.",
                    data.total_spent, data.count, merchant
                ),
            })
            .collect();

        let mut categories: Vec<_> = self.category_analysis.iter().collect();
        categories.sort_by(|a, b| b.1.total_spent.total_cmp(&a.1.total_spent));
        let category_optimizations = categories
            .into_iter()
            .take(TOP_CATEGORY_LIMIT)
            .map(|(category, data)| {
                let merchants = data
                    .top_merchants
                    .iter()
                    .map(|m| format!("{} ({:.2})", m.merchant, m.total))
                    .collect::<Vec<_>>()
                    .join(", ");
                CategoryOptimization {
                    category: category.clone(),
                    total_spent: data.total_spent,
                    transaction_count: data.count,
                    average_amount: data.average_amount,
                    top_merchants: data.top_merchants.clone(),
                    suggestion: format!(
                        "Your highest spending in {category} is with {merchants}. \
                         Look for alternatives or ways to reduce these expenses."
                    ),
                }
            })
            .collect();

        Ok(OptimizationRecommendations {
            subscriptions,
            high_frequency_spending,
            category_optimizations,
        })
    }

    /// Build a savings plan toward `target`, always ending with a summary
    ///
    /// Subscriptions are proposed first (most expensive first), then 30%
    /// cuts at the highest-spend merchants, stopping once the target is met.
    pub fn suggest_savings(&self, target: f64) -> Result<Vec<SavingsSuggestion>> {
        if !self.trained {
            return Err(Error::NotTrained("spending pattern optimizer"));
        }
        if !target.is_finite() || target < 0.0 {
            return Err(Error::InvalidInput(format!(
                "savings target must be a non-negative amount, got {target}"
            )));
        }

        let mut suggestions = Vec::new();
        let mut potential = 0.0;

        for sub in &self.subscriptions {
            suggestions.push(SavingsSuggestion::Subscription {
                merchant: sub.merchant.clone(),
                action: "Cancel or reduce".to_string(),
                savings_amount: sub.annual_cost,
                timeframe: "year".to_string(),
                explanation: format!(
                    "Cancelling your {} {} subscription would save {:.2} per year.",
                    sub.frequency, sub.merchant, sub.annual_cost
                ),
            });
            potential += sub.annual_cost;
            if potential >= target {
                break;
            }
        }

        if potential < target {
            for (merchant, data) in self
                .merchants_by_spend()
                .into_iter()
                .take(SAVINGS_MERCHANT_LIMIT)
            {
                let reduction = data.total_spent * SAVINGS_REDUCTION_SHARE;
                suggestions.push(SavingsSuggestion::Frequency {
                    merchant: merchant.clone(),
                    action: "Reduce spending".to_string(),
                    savings_amount: reduction,
                    timeframe: "based on history".to_string(),
                    explanation: format!(
                        "Reducing your spending at {merchant} by 30% would save approximately {reduction:.2}."
                    ),
                });
                potential += reduction;
                if potential >= target {
                    break;
                }
            }
        }

        let achievable = potential >= target;
        let explanation = if achievable {
            format!(
                "Following these recommendations could save you {potential:.2}, \
                 meeting your target of {target:.2}."
            )
        } else {
            format!(
                "These recommendations could save you {potential:.2}, which is short of your \
                 target of {target:.2}. Consider more aggressive reductions or finding additional income."
            )
        };
        suggestions.push(SavingsSuggestion::Summary {
            potential_savings: potential,
            target_savings: target,
            achievable,
            explanation,
        });

        Ok(suggestions)
    }
}

/// Typical monthly spending range for a category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub average: f64,
    pub low_bound: f64,
    pub high_bound: f64,
}

impl ReferenceRange {
    pub const fn new(average: f64, low_bound: f64, high_bound: f64) -> Self {
        Self {
            average,
            low_bound,
            high_bound,
        }
    }
}

/// Built-in monthly benchmarks used when no reference table is configured
pub fn default_reference() -> BTreeMap<String, ReferenceRange> {
    [
        ("food", ReferenceRange::new(500.0, 300.0, 800.0)),
        ("transportation", ReferenceRange::new(400.0, 200.0, 600.0)),
        ("shopping", ReferenceRange::new(300.0, 150.0, 500.0)),
        ("entertainment", ReferenceRange::new(200.0, 100.0, 350.0)),
        ("utilities", ReferenceRange::new(350.0, 250.0, 450.0)),
        ("housing", ReferenceRange::new(1200.0, 800.0, 1800.0)),
    ]
    .into_iter()
    .map(|(category, range)| (category.to_string(), range))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSpending {
    pub total: f64,
    pub count: usize,
    /// `total` scaled to a 30-day month
    pub monthly_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    BelowAverage,
    Average,
    AboveAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub user_monthly: f64,
    pub reference_average: f64,
    pub percent_difference: f64,
    pub status: ComparisonStatus,
    /// Monthly excess over the reference average; 0 unless above average
    pub potential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeSuggestion {
    pub category: String,
    pub current_spending: f64,
    pub average_spending: f64,
    pub percent_above: f64,
    pub potential_savings: f64,
    pub suggestion: String,
}

/// Compares recent monthly category spending against reference ranges
#[derive(Debug, Clone)]
pub struct ComparativeSpendingAnalyzer {
    reference: BTreeMap<String, ReferenceRange>,
    spending: BTreeMap<String, PeriodSpending>,
    trained: bool,
}

impl ComparativeSpendingAnalyzer {
    pub fn new(reference: Option<BTreeMap<String, ReferenceRange>>) -> Self {
        Self {
            reference: reference.unwrap_or_else(default_reference),
            spending: BTreeMap::new(),
            trained: false,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn reference(&self) -> &BTreeMap<String, ReferenceRange> {
        &self.reference
    }

    pub fn spending(&self) -> &BTreeMap<String, PeriodSpending> {
        &self.spending
    }

    /// Analyze the trailing `period_days` ending today
    pub fn train(&mut self, transactions: &[Transaction], period_days: u32) -> Result<()> {
        self.train_as_of(transactions, period_days, Local::now().date_naive())
    }

    /// Analyze the trailing `period_days` ending on `today`
    pub fn train_as_of(
        &mut self,
        transactions: &[Transaction],
        period_days: u32,
        today: NaiveDate,
    ) -> Result<()> {
        if transactions.is_empty() {
            return Err(Error::InsufficientData(
                "no transactions to compare".to_string(),
            ));
        }
        if period_days == 0 {
            return Err(Error::InvalidInput(
                "comparison period must be at least one day".to_string(),
            ));
        }

        let threshold = today - Duration::days(i64::from(period_days));
        let months = f64::from(period_days) / 30.0;

        let mut spending: BTreeMap<String, PeriodSpending> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| t.date >= threshold) {
            let entry = spending
                .entry(tx.category_or_default().to_string())
                .or_insert(PeriodSpending {
                    total: 0.0,
                    count: 0,
                    monthly_average: 0.0,
                });
            entry.total += tx.abs_amount();
            entry.count += 1;
        }
        for s in spending.values_mut() {
            s.monthly_average = s.total / months;
        }

        debug!(
            period_days,
            since = %threshold,
            categories = spending.len(),
            "Comparative spending analyzer trained"
        );
        self.spending = spending;
        self.trained = true;
        Ok(())
    }

    /// Compare every category present in both the user data and the reference
    pub fn compare_to_reference(&self) -> Result<BTreeMap<String, CategoryComparison>> {
        if !self.trained {
            return Err(Error::NotTrained("comparative spending analyzer"));
        }

        Ok(self
            .spending
            .iter()
            .filter_map(|(category, s)| {
                let reference = self.reference.get(category)?;
                let user_monthly = s.monthly_average;
                let status = if user_monthly <= reference.low_bound {
                    ComparisonStatus::BelowAverage
                } else if user_monthly >= reference.high_bound {
                    ComparisonStatus::AboveAverage
                } else {
                    ComparisonStatus::Average
                };
                let percent_difference = if reference.average != 0.0 {
                    (user_monthly - reference.average) / reference.average * 100.0
                } else {
                    0.0
                };
                let potential = if status == ComparisonStatus::AboveAverage {
                    user_monthly - reference.average
                } else {
                    0.0
                };
                Some((
                    category.clone(),
                    CategoryComparison {
                        user_monthly,
                        reference_average: reference.average,
                        percent_difference,
                        status,
                        potential,
                    },
                ))
            })
            .collect())
    }

    /// One suggestion per above-average category, largest potential first
    pub fn generate_optimization_suggestions(&self) -> Result<Vec<ComparativeSuggestion>> {
        let mut suggestions: Vec<ComparativeSuggestion> = self
            .compare_to_reference()?
            .into_iter()
            .filter(|(_, c)| c.status == ComparisonStatus::AboveAverage)
            .map(|(category, c)| ComparativeSuggestion {
                suggestion: format!(
                    "Your {category} spending is {:.0}% above average. \
                     Reducing to the average could save you {:.2} per month.",
                    c.percent_difference.abs(),
                    c.potential
                ),
                category,
                current_spending: c.user_monthly,
                average_spending: c.reference_average,
                percent_above: c.percent_difference,
                potential_savings: c.potential,
            })
            .collect();
        suggestions.sort_by(|a, b| b.potential_savings.total_cmp(&a.potential_savings));
        Ok(suggestions)
    }
}

impl Default for ComparativeSpendingAnalyzer {
    fn default() -> Self {
        Self::new(None)
    }
}
