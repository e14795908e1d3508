use tracing::debug;

use super::trend::average_score;
use super::{GameDifficulty, PacingStrategy};
use crate::config::DecisionConfig;
use crate::types::PlacementTier;

/// Game difficulty from the tier and the latest quiz score (0 when not yet taken)
pub fn select_game_difficulty(
    tier: PlacementTier,
    quiz_score: u32,
    attempts: u32,
    config: &DecisionConfig,
) -> GameDifficulty {
    let difficulty = match tier {
        PlacementTier::Beginner => GameDifficulty::Easy,
        PlacementTier::Advanced => {
            if quiz_score > 0 && quiz_score < config.advanced_medium_below && attempts > 0 {
                GameDifficulty::Medium
            } else {
                GameDifficulty::Hard
            }
        }
        PlacementTier::Intermediate => {
            if quiz_score >= config.intermediate_hard_score {
                GameDifficulty::Hard
            } else if quiz_score >= config.intermediate_medium_score || quiz_score == 0 {
                GameDifficulty::Medium
            } else {
                GameDifficulty::Easy
            }
        }
    };

    debug!(
        tier = tier.as_str(),
        quiz_score,
        attempts,
        difficulty = difficulty.as_str(),
        "game difficulty selected"
    );
    difficulty
}

pub fn select_lesson_pacing(
    tier: PlacementTier,
    recent: &[u32],
    config: &DecisionConfig,
) -> PacingStrategy {
    let average = average_score(recent);

    let pacing = match tier {
        PlacementTier::Beginner => PacingStrategy::SUPPORTED,
        PlacementTier::Advanced if average < config.advanced_slowdown_average => {
            PacingStrategy::BALANCED
        }
        PlacementTier::Advanced => PacingStrategy::ACCELERATED,
        PlacementTier::Intermediate if average >= config.intermediate_fast_average => {
            PacingStrategy::BRISK
        }
        PlacementTier::Intermediate if average >= config.intermediate_moderate_average => {
            PacingStrategy::BALANCED
        }
        PlacementTier::Intermediate => PacingStrategy::REMEDIAL,
    };

    debug!(tier = tier.as_str(), average, pacing = %pacing.description(), "lesson pacing selected");
    pacing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{ExampleDensity, PacingSpeed, Scaffolding};

    #[test]
    fn test_beginner_always_easy() {
        let config = DecisionConfig::default();
        for score in [0, 40, 70, 85, 100] {
            for attempts in 0..3 {
                assert_eq!(
                    select_game_difficulty(PlacementTier::Beginner, score, attempts, &config),
                    GameDifficulty::Easy
                );
            }
        }
    }

    #[test]
    fn test_advanced_difficulty() {
        let config = DecisionConfig::default();
        let t = PlacementTier::Advanced;
        assert_eq!(select_game_difficulty(t, 0, 0, &config), GameDifficulty::Hard);
        assert_eq!(select_game_difficulty(t, 0, 2, &config), GameDifficulty::Hard);
        assert_eq!(select_game_difficulty(t, 70, 0, &config), GameDifficulty::Hard);
        assert_eq!(select_game_difficulty(t, 70, 1, &config), GameDifficulty::Medium);
        assert_eq!(select_game_difficulty(t, 80, 1, &config), GameDifficulty::Hard);
    }

    #[test]
    fn test_intermediate_difficulty() {
        let config = DecisionConfig::default();
        let t = PlacementTier::Intermediate;
        assert_eq!(select_game_difficulty(t, 90, 1, &config), GameDifficulty::Hard);
        assert_eq!(select_game_difficulty(t, 85, 1, &config), GameDifficulty::Hard);
        assert_eq!(select_game_difficulty(t, 75, 1, &config), GameDifficulty::Medium);
        assert_eq!(select_game_difficulty(t, 0, 0, &config), GameDifficulty::Medium);
        assert_eq!(select_game_difficulty(t, 60, 1, &config), GameDifficulty::Easy);
    }

    #[test]
    fn test_pacing_table() {
        let config = DecisionConfig::default();
        assert_eq!(
            select_lesson_pacing(PlacementTier::Beginner, &[100, 100], &config),
            PacingStrategy::SUPPORTED
        );

        let fast = select_lesson_pacing(PlacementTier::Advanced, &[90, 80], &config);
        assert_eq!(fast.speed, PacingSpeed::Fast);
        assert_eq!(fast.scaffolding, Scaffolding::Minimal);
        assert_eq!(fast.examples, ExampleDensity::Few);
        assert_eq!(fast.duration_minutes, 7);
        assert!(!fast.allow_review);

        assert_eq!(
            select_lesson_pacing(PlacementTier::Advanced, &[70, 72], &config),
            PacingStrategy::BALANCED
        );
        assert_eq!(
            select_lesson_pacing(PlacementTier::Intermediate, &[85, 90], &config),
            PacingStrategy::BRISK
        );
        assert_eq!(
            select_lesson_pacing(PlacementTier::Intermediate, &[70], &config),
            PacingStrategy::BALANCED
        );
        assert_eq!(
            select_lesson_pacing(PlacementTier::Intermediate, &[60, 65], &config),
            PacingStrategy::REMEDIAL
        );
    }

    #[test]
    fn test_empty_window_averages_zero() {
        let config = DecisionConfig::default();
        assert_eq!(
            select_lesson_pacing(PlacementTier::Advanced, &[], &config),
            PacingStrategy::BALANCED
        );
        assert_eq!(
            select_lesson_pacing(PlacementTier::Intermediate, &[], &config),
            PacingStrategy::REMEDIAL
        );
    }
}
