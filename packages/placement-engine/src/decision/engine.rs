use std::collections::BTreeMap;

use tracing::debug;

use super::serving::{select_game_difficulty, select_lesson_pacing};
use super::trend::{average_score, score_trend};
use super::{AdaptiveDecision, DecisionType, GameDifficulty, PacingStrategy, ScoreTrend};
use crate::category::CategoryMapping;
use crate::config::DecisionConfig;
use crate::types::{Category, PlacementTier};

/// Placement percentage for a category, `neutral` when unknown or untested
pub fn category_score_for(
    scores: &BTreeMap<Category, f64>,
    category: Option<Category>,
    neutral: f64,
) -> f64 {
    category
        .and_then(|c| scores.get(&c).copied())
        .unwrap_or(neutral)
}

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Evaluate a finished quiz. Rules are tried in priority order and the
    /// first match wins.
    pub fn evaluate(
        &self,
        tier: PlacementTier,
        quiz_score: u32,
        attempt_count: u32,
        recent: &[u32],
        category_score: f64,
    ) -> AdaptiveDecision {
        let trend = score_trend(recent, self.config.trend_delta);
        let (decision_type, reason) =
            self.decide(tier, quiz_score, attempt_count, recent, category_score, trend);

        debug!(
            tier = tier.as_str(),
            quiz_score,
            attempt_count,
            category_score,
            trend = trend.as_str(),
            decision = decision_type.as_str(),
            reason = %reason,
            "quiz performance evaluated"
        );

        AdaptiveDecision {
            decision_type,
            reason,
            quiz_score,
            attempt_count,
            tier,
            trend,
        }
    }

    fn decide(
        &self,
        tier: PlacementTier,
        score: u32,
        attempts: u32,
        recent: &[u32],
        category_score: f64,
        trend: ScoreTrend,
    ) -> (DecisionType, String) {
        let c = &self.config;

        if score < c.pass_score {
            let reason = if attempts <= 1 {
                format!("Quiz failed at {score}% on the first attempt, adding an intervention lesson")
            } else {
                format!("Still below passing at {score}% after {attempts} attempts, intensive support needed")
            };
            return (DecisionType::AddIntervention, reason);
        }

        if score < c.borderline_score {
            match tier {
                PlacementTier::Beginner => {
                    return (
                        DecisionType::AddSupplemental,
                        format!("Borderline pass at {score}% for a beginner, adding support"),
                    );
                }
                PlacementTier::Intermediate if trend == ScoreTrend::Declining => {
                    return (
                        DecisionType::AddSupplemental,
                        format!("Borderline pass at {score}% with declining scores, preventive support"),
                    );
                }
                PlacementTier::Intermediate if category_score < c.weak_category_score => {
                    return (
                        DecisionType::AddSupplemental,
                        format!(
                            "Borderline pass at {score}% in a weak placement category ({category_score:.0}%)"
                        ),
                    );
                }
                _ => {}
            }
        }

        if trend == ScoreTrend::Declining {
            let average = average_score(recent);
            if f64::from(score) < average - c.decline_margin {
                return (
                    DecisionType::AddSupplemental,
                    format!("Score dropped from an average of {average:.0}% to {score}%, early support"),
                );
            }
        }

        if score >= c.mastery_score && tier == PlacementTier::Advanced {
            return (
                DecisionType::OfferEnrichment,
                format!("Mastery at {score}% for an advanced learner, enrichment available"),
            );
        }

        (
            DecisionType::Proceed,
            format!("On track at {score}% (attempt {attempts}), continue to the next lesson"),
        )
    }

    pub fn game_difficulty(
        &self,
        tier: PlacementTier,
        quiz_score: u32,
        attempts: u32,
    ) -> GameDifficulty {
        select_game_difficulty(tier, quiz_score, attempts, &self.config)
    }

    pub fn lesson_pacing(&self, tier: PlacementTier, recent: &[u32]) -> PacingStrategy {
        select_lesson_pacing(tier, recent, &self.config)
    }

    /// Resolve a free-text skill label and look up its placement score
    pub fn category_score(
        &self,
        scores: &BTreeMap<Category, f64>,
        skill_label: &str,
        mapping: &CategoryMapping,
    ) -> f64 {
        category_score_for(
            scores,
            mapping.resolve(skill_label),
            self.config.neutral_category_score,
        )
    }
}
