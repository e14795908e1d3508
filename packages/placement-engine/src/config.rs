use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::category::CategoryMapping;
use crate::error::{EngineError, Result};
use crate::types::ThetaBounds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Largest θ change a single Newton step may make
    pub max_step: f64,
    pub bounds: ThetaBounds,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-3,
            max_step: 1.0,
            bounds: ThetaBounds::PLACEMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoppingConfig {
    pub max_items: usize,
    /// Items required before the standard-error rule may end the test
    pub min_items: usize,
    pub target_standard_error: f64,
}

impl Default for StoppingConfig {
    fn default() -> Self {
        Self {
            max_items: 28,
            min_items: 10,
            target_standard_error: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub theta: f64,
    pub category: f64,
    pub pattern: f64,
    /// Declared for reporting, never voted
    pub difficulty_progression: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            theta: 0.40,
            category: 0.25,
            pattern: 0.20,
            difficulty_progression: 0.15,
        }
    }
}

impl EnsembleWeights {
    /// Sum of the weights that take part in the vote
    pub fn voting_total(&self) -> f64 {
        self.theta + self.category + self.pattern
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub min_responses: usize,
    pub early_stop_min_responses: usize,
    /// Full test length, normalises the question-count confidence term
    pub full_length: usize,
    /// Level boundaries on the θ scale, ascending
    pub theta_thresholds: [f64; 4],
    /// Level boundaries on the pattern score, ascending
    pub pattern_cut_points: [f64; 4],
    pub fast_response_ms: f64,
    pub adaptation_bonus_threshold: f64,
    pub weights: EnsembleWeights,
    /// Prior per level in `PlacementLevel::ORDERED` order
    pub level_priors: [f64; 5],
    pub early_stop_confidence: f64,
    pub early_stop_stability: f64,
    pub early_stop_consistency: f64,
    pub low_gap_accuracy: f64,
    pub moderate_gap_accuracy: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_responses: 12,
            early_stop_min_responses: 18,
            full_length: 28,
            theta_thresholds: [-1.5, -0.5, 0.5, 1.5],
            pattern_cut_points: [0.50, 0.65, 0.80, 0.90],
            fast_response_ms: 15_000.0,
            adaptation_bonus_threshold: 0.2,
            weights: EnsembleWeights::default(),
            level_priors: [0.10, 0.25, 0.30, 0.25, 0.10],
            early_stop_confidence: 0.90,
            early_stop_stability: 0.8,
            early_stop_consistency: 0.75,
            low_gap_accuracy: 0.60,
            moderate_gap_accuracy: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub pass_score: u32,
    pub borderline_score: u32,
    pub mastery_score: u32,
    pub trend_delta: i64,
    pub decline_margin: f64,
    pub weak_category_score: f64,
    pub intermediate_hard_score: u32,
    pub intermediate_medium_score: u32,
    pub advanced_medium_below: u32,
    pub advanced_slowdown_average: f64,
    pub intermediate_fast_average: f64,
    pub intermediate_moderate_average: f64,
    pub neutral_category_score: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            pass_score: 70,
            borderline_score: 80,
            mastery_score: 90,
            trend_delta: 10,
            decline_margin: 10.0,
            weak_category_score: 60.0,
            intermediate_hard_score: 85,
            intermediate_medium_score: 75,
            advanced_medium_below: 80,
            advanced_slowdown_average: 75.0,
            intermediate_fast_average: 85.0,
            intermediate_moderate_average: 70.0,
            neutral_category_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub estimator: EstimatorConfig,
    pub stopping: StoppingConfig,
    pub placement: PlacementConfig,
    pub decision: DecisionConfig,
    pub categories: CategoryMapping,
}

fn env_override<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(val) = std::env::var(key) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(key, value = %val, "unparseable config override, keeping default"),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        env_override("PLACEMENT_MAX_ITERATIONS", &mut config.estimator.max_iterations);
        env_override("PLACEMENT_TOLERANCE", &mut config.estimator.tolerance);
        env_override("PLACEMENT_MAX_STEP", &mut config.estimator.max_step);
        env_override("PLACEMENT_THETA_MIN", &mut config.estimator.bounds.min);
        env_override("PLACEMENT_THETA_MAX", &mut config.estimator.bounds.max);
        env_override("PLACEMENT_MAX_ITEMS", &mut config.stopping.max_items);
        env_override("PLACEMENT_MIN_ITEMS", &mut config.stopping.min_items);
        env_override("PLACEMENT_TARGET_SE", &mut config.stopping.target_standard_error);
        env_override(
            "PLACEMENT_EARLY_STOP_CONFIDENCE",
            &mut config.placement.early_stop_confidence,
        );
        env_override("PLACEMENT_PASS_SCORE", &mut config.decision.pass_score);
        env_override("PLACEMENT_MASTERY_SCORE", &mut config.decision.mastery_score);

        if let Err(err) = config.validate() {
            warn!(error = %err, "environment overrides rejected, using defaults");
            return Self::default();
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(EngineError::Config(msg.to_string()));

        if !self.estimator.bounds.is_valid() {
            return fail("theta bounds must be finite with min < max");
        }
        if self.estimator.max_iterations == 0 {
            return fail("max_iterations must be at least 1");
        }
        if !(self.estimator.tolerance > 0.0) || !(self.estimator.max_step > 0.0) {
            return fail("tolerance and max_step must be positive");
        }
        if self.stopping.max_items == 0 || self.stopping.min_items > self.stopping.max_items {
            return fail("stopping requires 0 < min_items <= max_items");
        }
        if !(self.stopping.target_standard_error > 0.0) {
            return fail("target_standard_error must be positive");
        }

        let p = &self.placement;
        if !is_ascending(&p.theta_thresholds) || !is_ascending(&p.pattern_cut_points) {
            return fail("placement thresholds must be strictly ascending");
        }
        let w = &p.weights;
        if [w.theta, w.category, w.pattern, w.difficulty_progression]
            .iter()
            .any(|x| !x.is_finite() || *x < 0.0)
        {
            return fail("ensemble weights must be finite and non-negative");
        }
        if p.level_priors.iter().any(|x| !(0.0..=1.0).contains(x)) {
            return fail("level priors must lie in [0, 1]");
        }
        if p.low_gap_accuracy > p.moderate_gap_accuracy {
            return fail("low gap accuracy must not exceed moderate gap accuracy");
        }

        let d = &self.decision;
        if !(d.pass_score <= d.borderline_score && d.borderline_score <= d.mastery_score) {
            return fail("decision scores must satisfy pass <= borderline <= mastery");
        }
        Ok(())
    }
}

fn is_ascending(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ensemble_weights_sum() {
        let w = EnsembleWeights::default();
        assert!((w.voting_total() - 0.85).abs() < 1e-12);
        assert!((w.voting_total() + w.difficulty_progression - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = EngineConfig::from_json(r#"{"stopping": {"max_items": 20}}"#).unwrap();
        assert_eq!(config.stopping.max_items, 20);
        assert_eq!(config.stopping.min_items, 10);
        assert_eq!(config.estimator, EstimatorConfig::default());
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = EngineConfig::default();
        config.estimator.bounds = ThetaBounds { min: 2.0, max: -2.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unsorted_thresholds() {
        let mut config = EngineConfig::default();
        config.placement.theta_thresholds = [0.5, -0.5, 1.0, 2.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_min_above_max_items() {
        let mut config = EngineConfig::default();
        config.stopping.min_items = 40;
        assert!(config.validate().is_err());
    }
}
