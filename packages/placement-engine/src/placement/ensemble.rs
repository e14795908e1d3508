//! Weighted-vote ensemble over three level classifiers
//!
//! - θ classifier: overall ability through the level thresholds
//! - category classifier: mean per-category θ through the same thresholds
//! - pattern classifier: accuracy with bonuses for adaptation and speed
//!
//! The vote is not normalised. Ties go to the θ classifier's level.

use serde::{Deserialize, Serialize};

use super::features::PlacementFeatures;
use crate::config::PlacementConfig;
use crate::sanitize::clamp_unit;
use crate::types::PlacementLevel;

const ADAPTATION_BONUS: f64 = 0.1;
const SPEED_BONUS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVotes {
    pub theta: PlacementLevel,
    pub category: PlacementLevel,
    pub pattern: PlacementLevel,
}

/// Map a value onto a level given four ascending cut points
fn level_for(value: f64, cuts: &[f64; 4]) -> PlacementLevel {
    PlacementLevel::ORDERED
        .iter()
        .zip(cuts.iter())
        .find(|(_, &cut)| value < cut)
        .map(|(&level, _)| level)
        .unwrap_or(PlacementLevel::Grade4)
}

pub fn classify_by_theta(theta: f64, config: &PlacementConfig) -> PlacementLevel {
    level_for(theta, &config.theta_thresholds)
}

pub fn classify_by_categories(features: &PlacementFeatures, config: &PlacementConfig) -> PlacementLevel {
    features
        .mean_category_theta()
        .map_or(PlacementLevel::default(), |theta| classify_by_theta(theta, config))
}

pub fn pattern_score(features: &PlacementFeatures, config: &PlacementConfig) -> f64 {
    let mut score = features.accuracy;
    if features.difficulty_adaptation > config.adaptation_bonus_threshold {
        score += ADAPTATION_BONUS;
    }
    if features.avg_response_time_ms < config.fast_response_ms {
        score += SPEED_BONUS;
    }
    score
}

pub fn classify_by_pattern(features: &PlacementFeatures, config: &PlacementConfig) -> PlacementLevel {
    level_for(pattern_score(features, config), &config.pattern_cut_points)
}

pub fn collect_votes(features: &PlacementFeatures, config: &PlacementConfig) -> ClassifierVotes {
    ClassifierVotes {
        theta: classify_by_theta(features.theta, config),
        category: classify_by_categories(features, config),
        pattern: classify_by_pattern(features, config),
    }
}

/// Highest weighted total wins; the θ level starts as the leader and is only
/// displaced by a strictly greater total
pub fn tally(votes: &ClassifierVotes, config: &PlacementConfig) -> PlacementLevel {
    let w = &config.weights;
    let mut totals = [0.0f64; 5];
    totals[votes.theta.index()] += w.theta;
    totals[votes.category.index()] += w.category;
    totals[votes.pattern.index()] += w.pattern;

    let mut best = votes.theta;
    for level in PlacementLevel::ORDERED {
        if totals[level.index()] > totals[best.index()] {
            best = level;
        }
    }
    best
}

/// Base confidence from feature quality, blended with the level prior
pub fn bayesian_confidence(
    features: &PlacementFeatures,
    level: PlacementLevel,
    config: &PlacementConfig,
) -> f64 {
    let mut base = 0.5;
    base += features.theta_stability.min(1.0) * 0.2;
    base += features.consistency * 0.15;
    base += (features.question_count as f64 / config.full_length.max(1) as f64).min(1.0) * 0.1;
    if features.recent_trend.abs() < 0.1 {
        base += 0.05;
    }

    let prior = config.level_priors[level.index()];
    clamp_unit(base * 0.7 + prior * 0.3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn features(theta: f64, accuracy: f64) -> PlacementFeatures {
        PlacementFeatures {
            theta,
            accuracy,
            consistency: 0.5,
            category_thetas: BTreeMap::new(),
            avg_response_time_ms: 20_000.0,
            response_time_variance: 0.0,
            recent_trend: 0.0,
            difficulty_adaptation: 0.0,
            theta_stability: 0.0,
            question_count: 12,
        }
    }

    #[test]
    fn test_theta_thresholds() {
        let config = PlacementConfig::default();
        assert_eq!(classify_by_theta(-2.0, &config), PlacementLevel::Grade2);
        assert_eq!(classify_by_theta(-1.5, &config), PlacementLevel::LowGrade3);
        assert_eq!(classify_by_theta(0.0, &config), PlacementLevel::MidGrade3);
        assert_eq!(classify_by_theta(0.5, &config), PlacementLevel::HighGrade3);
        assert_eq!(classify_by_theta(1.5, &config), PlacementLevel::Grade4);
    }

    #[test]
    fn test_category_classifier_neutral_without_categories() {
        let config = PlacementConfig::default();
        assert_eq!(
            classify_by_categories(&features(2.0, 1.0), &config),
            PlacementLevel::MidGrade3
        );
    }

    #[test]
    fn test_pattern_bonuses() {
        let config = PlacementConfig::default();
        let mut f = features(0.0, 0.75);
        assert_eq!(classify_by_pattern(&f, &config), PlacementLevel::MidGrade3);
        f.difficulty_adaptation = 0.3;
        assert_eq!(classify_by_pattern(&f, &config), PlacementLevel::HighGrade3);
        f.avg_response_time_ms = 8_000.0;
        assert!((pattern_score(&f, &config) - 0.90).abs() < 1e-12);
    }

    #[test]
    fn test_tally_majority_and_ties() {
        let config = PlacementConfig::default();
        // category + pattern (0.45) outvote θ (0.40)
        let votes = ClassifierVotes {
            theta: PlacementLevel::Grade4,
            category: PlacementLevel::HighGrade3,
            pattern: PlacementLevel::HighGrade3,
        };
        assert_eq!(tally(&votes, &config), PlacementLevel::HighGrade3);

        let votes = ClassifierVotes {
            theta: PlacementLevel::Grade2,
            category: PlacementLevel::MidGrade3,
            pattern: PlacementLevel::Grade4,
        };
        assert_eq!(tally(&votes, &config), PlacementLevel::Grade2);
    }

    #[test]
    fn test_tally_tie_goes_to_theta_level() {
        let mut config = PlacementConfig::default();
        config.weights.theta = 0.5;
        config.weights.category = 0.25;
        config.weights.pattern = 0.25;
        let votes = ClassifierVotes {
            theta: PlacementLevel::Grade4,
            category: PlacementLevel::LowGrade3,
            pattern: PlacementLevel::LowGrade3,
        };
        assert_eq!(tally(&votes, &config), PlacementLevel::Grade4);
    }

    #[test]
    fn test_confidence_components() {
        let config = PlacementConfig::default();
        let mut f = features(0.0, 0.8);
        f.theta_stability = 1.0;
        f.consistency = 1.0;
        f.question_count = 28;
        // base = 0.5 + 0.2 + 0.15 + 0.1 + 0.05 = 1.0, prior(Mid) = 0.30
        let c = bayesian_confidence(&f, PlacementLevel::MidGrade3, &config);
        assert!((c - 0.79).abs() < 1e-9);
        let c = bayesian_confidence(&f, PlacementLevel::Grade4, &config);
        assert!((c - 0.73).abs() < 1e-9);
    }
}
