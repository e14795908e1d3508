//! Ensemble placement prediction
//!
//! Turns the response history of an assessment into a placement level, a
//! confidence in that level, an early-stop signal and a list of skill gaps.

pub mod ensemble;
pub mod features;

pub use features::PlacementFeatures;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::category::CategoryTracker;
use crate::config::PlacementConfig;
use crate::types::{Category, PlacementLevel, Response};

pub const INSUFFICIENT_DATA: &str = "Insufficient data - continue assessment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

impl ConfidenceLabel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.90 {
            Self::High
        } else if confidence >= 0.70 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPrediction {
    pub predicted_level: PlacementLevel,
    pub confidence: f64,
    pub can_stop_early: bool,
    pub recommendation: String,
}

impl PlacementPrediction {
    pub fn insufficient_data() -> Self {
        Self {
            predicted_level: PlacementLevel::default(),
            confidence: 0.0,
            can_stop_early: false,
            recommendation: INSUFFICIENT_DATA.to_string(),
        }
    }

    pub fn confidence_label(&self) -> ConfidenceLabel {
        ConfidenceLabel::from_confidence(self.confidence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GapSeverity {
    Low,
    Moderate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub category: Category,
    pub severity: GapSeverity,
    pub accuracy: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlacementPredictor {
    config: PlacementConfig,
}

impl PlacementPredictor {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn predict(
        &self,
        theta: f64,
        responses: &[Response],
        tracker: &CategoryTracker,
    ) -> PlacementPrediction {
        if responses.len() < self.config.min_responses {
            return PlacementPrediction::insufficient_data();
        }

        let features = PlacementFeatures::extract(theta, responses, tracker);
        let votes = ensemble::collect_votes(&features, &self.config);
        let level = ensemble::tally(&votes, &self.config);
        let confidence = ensemble::bayesian_confidence(&features, level, &self.config);
        let can_stop_early = self.should_stop_early(&features, confidence);

        debug!(
            level = %level,
            confidence,
            theta_vote = %votes.theta,
            category_vote = %votes.category,
            pattern_vote = %votes.pattern,
            "placement predicted"
        );
        if can_stop_early {
            info!(level = %level, confidence, questions = features.question_count, "early stop available");
        }

        PlacementPrediction {
            predicted_level: level,
            confidence,
            can_stop_early,
            recommendation: recommendation(level, confidence, can_stop_early),
        }
    }

    fn should_stop_early(&self, features: &PlacementFeatures, confidence: f64) -> bool {
        features.question_count >= self.config.early_stop_min_responses
            && confidence >= self.config.early_stop_confidence
            && features.theta_stability > self.config.early_stop_stability
            && features.consistency > self.config.early_stop_consistency
    }

    /// Categories below the gap thresholds, in category order
    pub fn skill_gaps(&self, tracker: &CategoryTracker) -> Vec<SkillGap> {
        tracker
            .accuracies()
            .into_iter()
            .filter_map(|(category, accuracy)| {
                let (severity, recommendation) = if accuracy < self.config.low_gap_accuracy {
                    (
                        GapSeverity::Low,
                        format!("Needs focused practice in {}", category.label()),
                    )
                } else if accuracy < self.config.moderate_gap_accuracy {
                    (
                        GapSeverity::Moderate,
                        format!("Could benefit from additional {} practice", category.label()),
                    )
                } else {
                    return None;
                };
                Some(SkillGap {
                    category,
                    severity,
                    accuracy,
                    recommendation,
                })
            })
            .collect()
    }
}

fn recommendation(level: PlacementLevel, confidence: f64, can_stop_early: bool) -> String {
    let mut text = String::new();
    if can_stop_early {
        text.push_str("Placement is clear enough to finish the assessment early. ");
    }
    text.push_str(&format!("Predicted level: {level}"));
    match ConfidenceLabel::from_confidence(confidence) {
        ConfidenceLabel::High => text.push_str(" (high confidence)"),
        ConfidenceLabel::Medium => text.push_str(" (medium confidence)"),
        ConfidenceLabel::Low => text.push_str(" (low confidence, keep assessing)"),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize, correct: impl Fn(usize) -> bool) -> (Vec<Response>, CategoryTracker) {
        let mut tracker = CategoryTracker::new();
        let responses: Vec<Response> = (0..n)
            .map(|i| {
                let category = Category::ALL[i % Category::ALL.len()];
                let r = Response {
                    item_id: format!("q{i}"),
                    category,
                    difficulty: 0.0,
                    correct: correct(i),
                    response_time_ms: 20_000,
                    theta_at_answer: 0.0,
                };
                tracker.record(category, r.correct, r.response_time_ms, r.difficulty);
                r
            })
            .collect();
        (responses, tracker)
    }

    #[test]
    fn test_insufficient_data() {
        let predictor = PlacementPredictor::default();
        let (responses, tracker) = history(11, |_| true);
        let p = predictor.predict(2.5, &responses, &tracker);
        assert_eq!(p.predicted_level, PlacementLevel::MidGrade3);
        assert_eq!(p.confidence, 0.0);
        assert!(!p.can_stop_early);
        assert_eq!(p.recommendation, INSUFFICIENT_DATA);
        assert_eq!(p.confidence_label(), ConfidenceLabel::Low);
    }

    #[test]
    fn test_strong_history_predicts_high_level() {
        let predictor = PlacementPredictor::default();
        let (responses, tracker) = history(20, |_| true);
        let p = predictor.predict(2.0, &responses, &tracker);
        // θ → Grade4, category θ = 1.0 → HighGrade3, pattern 1.0 → Grade4
        assert_eq!(p.predicted_level, PlacementLevel::Grade4);
        assert!(p.confidence > 0.0 && p.confidence <= 1.0);
        assert!(p.recommendation.contains("Grade 4"));
    }

    #[test]
    fn test_confidence_is_bounded_and_default_threshold_unreached() {
        let predictor = PlacementPredictor::default();
        let (responses, tracker) = history(28, |_| true);
        let p = predictor.predict(0.0, &responses, &tracker);
        assert!(p.confidence <= 0.79 + 1e-9);
        assert!(!p.can_stop_early);
    }

    #[test]
    fn test_early_stop_with_relaxed_threshold() {
        let predictor = PlacementPredictor::new(PlacementConfig {
            early_stop_confidence: 0.7,
            ..Default::default()
        });
        let (responses, tracker) = history(18, |_| true);
        let p = predictor.predict(0.2, &responses, &tracker);
        assert!(p.can_stop_early, "{p:?}");
        assert!(p.recommendation.starts_with("Placement is clear"));

        let (short, short_tracker) = history(17, |_| true);
        assert!(!predictor.predict(0.2, &short, &short_tracker).can_stop_early);
    }

    #[test]
    fn test_skill_gaps() {
        let mut tracker = CategoryTracker::new();
        for c in [true, false, false, false] {
            tracker.record(Category::PhonicsWordStudy, c, 1000, 0.0);
        }
        for c in [true, true, false, true, true, true, false, true, true, false] {
            tracker.record(Category::GrammarAwareness, c, 1000, 0.0);
        }
        for _ in 0..4 {
            tracker.record(Category::ComprehendingText, true, 1000, 0.0);
        }
        let gaps = PlacementPredictor::default().skill_gaps(&tracker);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].category, Category::PhonicsWordStudy);
        assert_eq!(gaps[0].severity, GapSeverity::Low);
        assert_eq!(gaps[1].category, Category::GrammarAwareness);
        assert_eq!(gaps[1].severity, GapSeverity::Moderate);
        assert!((gaps[1].accuracy - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_labels() {
        assert_eq!(ConfidenceLabel::from_confidence(0.95), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_confidence(0.90), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_confidence(0.75), ConfidenceLabel::Medium);
        assert_eq!(ConfidenceLabel::from_confidence(0.69), ConfidenceLabel::Low);
    }
}
