//! Transaction categorization
//!
//! Two classifiers map a free-text description to a spending category:
//! - `NaiveBayesClassifier` learns word frequencies per category
//! - `RuleBasedCategorizer` uses merchant mappings and keyword tables
//!
//! The rule-based result is the default; the statistical classifier only
//! overrides it when it is clearly more confident (see `service`).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{LabeledDescription, Transaction};
use crate::prepare::CATEGORY_KEYWORDS;

/// Category returned when nothing matches
pub const OTHER_CATEGORY: &str = "other";

/// Confidence of a direct merchant mapping
const MERCHANT_MATCH_CONFIDENCE: f64 = 0.9;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Merchants with a well-known category
const DEFAULT_MERCHANTS: &[(&str, &str)] = &[
    ("amazon", "shopping"),
    ("netflix", "entertainment"),
    ("spotify", "entertainment"),
    ("uber", "transportation"),
    ("lyft", "transportation"),
    ("starbucks", "food"),
    ("mcdonald", "food"),
    ("walmart", "shopping"),
    ("target", "shopping"),
    ("cvs", "health"),
    ("walgreens", "health"),
];

/// A predicted category with its confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: String,
    pub confidence: f64,
}

impl Classification {
    fn other() -> Self {
        Self {
            category: OTHER_CATEGORY.to_string(),
            confidence: 0.0,
        }
    }
}

/// Lowercase, replace punctuation with spaces, split, drop one-letter tokens
pub fn tokenize(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Multinomial naive Bayes over description words
///
/// Scores are computed in log space with add-one smoothing; the smoothing
/// term counts every training token occurrence. Confidence is the softmax
/// of the scores.
#[derive(Debug, Clone, Default)]
pub struct NaiveBayesClassifier {
    /// Categories in first-seen order; ties resolve to the earliest
    categories: Vec<String>,
    word_counts: HashMap<String, HashMap<String, usize>>,
    /// Total word occurrences per category
    word_totals: HashMap<String, usize>,
    document_counts: HashMap<String, usize>,
    /// Training tokens seen, repeats included
    vocabulary_size: usize,
    total_documents: usize,
}

impl NaiveBayesClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.total_documents > 0
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn train(&mut self, examples: &[LabeledDescription]) -> Result<()> {
        if examples.is_empty() {
            return Err(Error::InsufficientData(
                "naive Bayes classifier needs labeled examples".to_string(),
            ));
        }

        *self = Self::default();

        for example in examples {
            let category = example.category.clone();
            if !self.document_counts.contains_key(&category) {
                self.categories.push(category.clone());
            }
            *self.document_counts.entry(category.clone()).or_insert(0) += 1;

            let counts = self.word_counts.entry(category.clone()).or_default();
            let words = tokenize(&example.description);
            *self.word_totals.entry(category).or_insert(0) += words.len();
            self.vocabulary_size += words.len();
            for word in words {
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        if self.vocabulary_size == 0 {
            *self = Self::default();
            return Err(Error::InsufficientData(
                "naive Bayes classifier needs descriptions with at least one word".to_string(),
            ));
        }
        self.total_documents = examples.len();

        debug!(
            documents = self.total_documents,
            categories = self.categories.len(),
            vocabulary = self.vocabulary_size,
            "Naive Bayes classifier trained"
        );
        Ok(())
    }

    fn log_score(&self, category: &str, words: &[String]) -> f64 {
        let documents = self.document_counts.get(category).copied().unwrap_or(0);
        let prior = documents as f64 / self.total_documents as f64;
        let total_words = self.word_totals.get(category).copied().unwrap_or(0);
        let denominator = (total_words + self.vocabulary_size) as f64;
        let counts = self.word_counts.get(category);

        words.iter().fold(prior.ln(), |score, word| {
            let count = counts.and_then(|c| c.get(word)).copied().unwrap_or(0);
            score + ((count + 1) as f64 / denominator).ln()
        })
    }

    pub fn classify(&self, description: &str) -> Result<Classification> {
        if !self.is_trained() {
            return Err(Error::NotTrained("naive Bayes classifier"));
        }

        let words = tokenize(description);
        let scores: Vec<f64> = self
            .categories
            .iter()
            .map(|c| self.log_score(c, &words))
            .collect();

        let mut best = 0;
        for (i, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = i;
            }
        }

        // Softmax, shifted by the best score so exp() cannot underflow to zero
        let max = scores[best];
        let normalizer: f64 = scores.iter().map(|s| (s - max).exp()).sum();

        Ok(Classification {
            category: self.categories[best].clone(),
            confidence: 1.0 / normalizer,
        })
    }

    pub fn predict_batch(&self, transactions: &[Transaction]) -> Result<Vec<Classification>> {
        transactions
            .iter()
            .map(|t| self.classify(t.description().unwrap_or_default()))
            .collect()
    }
}

/// Keyword and merchant rule categorizer
#[derive(Debug, Clone)]
pub struct RuleBasedCategorizer {
    merchant_mappings: HashMap<String, String>,
}

impl RuleBasedCategorizer {
    pub fn new() -> Self {
        Self {
            merchant_mappings: DEFAULT_MERCHANTS
                .iter()
                .map(|(m, c)| (m.to_string(), c.to_string()))
                .collect(),
        }
    }

    pub fn merchant_category(&self, merchant: &str) -> Option<&str> {
        self.merchant_mappings.get(merchant).map(String::as_str)
    }

    /// Learn merchant mappings from already-categorized history.
    ///
    /// Existing mappings win; the first category seen for a new merchant sticks.
    pub fn train(&mut self, transactions: &[Transaction]) {
        let before = self.merchant_mappings.len();
        for tx in transactions {
            let (Some(description), Some(category)) = (tx.description(), tx.category()) else {
                continue;
            };
            if let Some(merchant) = extract_merchant_name(description) {
                self.merchant_mappings
                    .entry(merchant)
                    .or_insert_with(|| category.to_string());
            }
        }
        debug!(
            learned = self.merchant_mappings.len() - before,
            total = self.merchant_mappings.len(),
            "Rule-based categorizer trained"
        );
    }

    pub fn categorize(&self, description: &str) -> Classification {
        if description.trim().is_empty() {
            return Classification::other();
        }

        let text = description.to_lowercase();
        if let Some(category) = extract_merchant_name(&text)
            .and_then(|m| self.merchant_mappings.get(&m))
        {
            return Classification {
                category: category.clone(),
                confidence: MERCHANT_MATCH_CONFIDENCE,
            };
        }

        let hits: Vec<(&str, usize)> = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                (*category, keywords.iter().filter(|k| text.contains(*k)).count())
            })
            .collect();
        let total: usize = hits.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return Classification::other();
        }

        let mut best = hits[0];
        for hit in &hits[1..] {
            if hit.1 > best.1 {
                best = *hit;
            }
        }

        Classification {
            category: best.0.to_string(),
            confidence: best.1 as f64 / total as f64,
        }
    }

    pub fn categorize_batch(&self, transactions: &[Transaction]) -> Vec<Classification> {
        transactions
            .iter()
            .map(|t| self.categorize(t.description().unwrap_or_default()))
            .collect()
    }
}

impl Default for RuleBasedCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of the description, lowercased, with non-word characters removed
fn extract_merchant_name(description: &str) -> Option<String> {
    let first = description.split_whitespace().next()?;
    let merchant: String = first
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!merchant.is_empty()).then_some(merchant)
}
