//! Per-skill response tracking
//!
//! Every answer is filed under the `Category` of its item. The tracker keeps the
//! ordered correctness, response-time and difficulty lists for each tested
//! category; accuracy and a rough category θ are derived from them on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sanitize::mean;
use crate::types::Category;

/// Accuracy reported for a category with no observations
pub const NEUTRAL_ACCURACY: f64 = 0.5;

// ==================== Category Mapping ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: Category,
}

/// Keyword table that maps free-text skill labels from content onto categories.
/// Resolved once when content is loaded; rules are tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMapping {
    rules: Vec<KeywordRule>,
}

impl Default for CategoryMapping {
    fn default() -> Self {
        let rule = |keyword: &str, category| KeywordRule {
            keyword: keyword.to_string(),
            category,
        };
        Self {
            rules: vec![
                rule("phonic", Category::PhonicsWordStudy),
                rule("vocabular", Category::VocabularyWordKnowledge),
                rule("grammar", Category::GrammarAwareness),
                rule("comprehend", Category::ComprehendingText),
                rule("analyz", Category::ComprehendingText),
                rule("creat", Category::CreatingComposing),
                rule("compos", Category::CreatingComposing),
                rule("writ", Category::CreatingComposing),
            ],
        }
    }
}

impl CategoryMapping {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Canonical names win over keyword rules
    pub fn resolve(&self, label: &str) -> Option<Category> {
        if let Some(category) = Category::parse(label) {
            return Some(category);
        }
        let lowered = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(&rule.keyword))
            .map(|rule| rule.category)
    }
}

// ==================== Performance ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    correct: Vec<bool>,
    response_times_ms: Vec<u64>,
    difficulties: Vec<f64>,
}

impl CategoryPerformance {
    pub fn record(&mut self, correct: bool, response_time_ms: u64, difficulty: f64) {
        self.correct.push(correct);
        self.response_times_ms.push(response_time_ms);
        self.difficulties.push(difficulty);
    }

    pub fn total(&self) -> usize {
        self.correct.len()
    }

    pub fn correct_count(&self) -> usize {
        self.correct.iter().filter(|&&c| c).count()
    }

    pub fn accuracy(&self) -> f64 {
        if self.correct.is_empty() {
            return NEUTRAL_ACCURACY;
        }
        self.correct_count() as f64 / self.total() as f64
    }

    pub fn average_difficulty(&self) -> f64 {
        mean(&self.difficulties)
    }

    pub fn average_response_time_ms(&self) -> f64 {
        if self.response_times_ms.is_empty() {
            return 0.0;
        }
        self.response_times_ms.iter().sum::<u64>() as f64 / self.response_times_ms.len() as f64
    }

    /// Average difficulty shifted by how far accuracy sits from 50%
    pub fn estimate_theta(&self) -> f64 {
        let accuracy = self.accuracy();
        let avg_difficulty = self.average_difficulty();
        if accuracy > NEUTRAL_ACCURACY {
            avg_difficulty + (accuracy - NEUTRAL_ACCURACY) * 2.0
        } else {
            avg_difficulty - (NEUTRAL_ACCURACY - accuracy) * 2.0
        }
    }
}

// ==================== Tracker ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTracker {
    performance: BTreeMap<Category, CategoryPerformance>,
}

impl CategoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        category: Category,
        correct: bool,
        response_time_ms: u64,
        difficulty: f64,
    ) {
        self.performance
            .entry(category)
            .or_default()
            .record(correct, response_time_ms, difficulty);
    }

    pub fn get(&self, category: Category) -> Option<&CategoryPerformance> {
        self.performance.get(&category)
    }

    pub fn accuracy(&self, category: Category) -> f64 {
        self.get(category)
            .map_or(NEUTRAL_ACCURACY, CategoryPerformance::accuracy)
    }

    pub fn estimate_category_theta(&self, category: Category) -> f64 {
        self.get(category)
            .map_or(0.0, CategoryPerformance::estimate_theta)
    }

    pub fn tested_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.performance.keys().copied()
    }

    pub fn accuracies(&self) -> BTreeMap<Category, f64> {
        self.performance
            .iter()
            .map(|(&cat, perf)| (cat, perf.accuracy()))
            .collect()
    }

    pub fn category_thetas(&self) -> BTreeMap<Category, f64> {
        self.performance
            .iter()
            .map(|(&cat, perf)| (cat, perf.estimate_theta()))
            .collect()
    }

    /// Percent correct per tested category
    pub fn category_scores(&self) -> BTreeMap<Category, f64> {
        self.performance
            .iter()
            .map(|(&cat, perf)| (cat, perf.accuracy() * 100.0))
            .collect()
    }

    pub fn total_responses(&self) -> usize {
        self.performance.values().map(CategoryPerformance::total).sum()
    }
}
