use std::collections::BTreeMap;

use placement_engine::decision::{category_score_for, PacingSpeed};
use placement_engine::{
    Category, CategoryMapping, DecisionEngine, DecisionType, GameDifficulty, PlacementLevel,
    PlacementTier, ScoreTrend,
};

fn tier(level: u8) -> PlacementTier {
    PlacementTier::from_level(level).unwrap()
}

#[test]
fn integration_reference_vectors() {
    let engine = DecisionEngine::default();

    let d = engine.evaluate(tier(1), 65, 1, &[80, 75], 50.0);
    assert_eq!(d.decision_type, DecisionType::AddIntervention);
    assert!(d.needs_support());

    let d = engine.evaluate(tier(3), 95, 1, &[90, 92], 90.0);
    assert_eq!(d.decision_type, DecisionType::OfferEnrichment);
    assert!(d.can_advance());

    let d = engine.evaluate(tier(2), 100, 1, &[95, 98], 95.0);
    assert_eq!(d.decision_type, DecisionType::Proceed);
    assert_eq!(d.trend, ScoreTrend::Stable);
    assert_eq!(d.quiz_score, 100);
    assert_eq!(d.attempt_count, 1);
    assert_eq!(d.tier, PlacementTier::Intermediate);
}

#[test]
fn integration_beginner_games_are_easy() {
    let engine = DecisionEngine::default();
    for score in (0..=100).step_by(5) {
        for attempts in 0..4 {
            assert_eq!(
                engine.game_difficulty(tier(1), score, attempts),
                GameDifficulty::Easy
            );
        }
    }
}

#[test]
fn integration_placement_to_decisions() {
    let engine = DecisionEngine::default();
    let mapping = CategoryMapping::default();

    let mut scores = BTreeMap::new();
    scores.insert(Category::VocabularyWordKnowledge, 45.0);
    scores.insert(Category::ComprehendingText, 90.0);

    let placed = PlacementLevel::MidGrade3.tier();
    let vocab = engine.category_score(&scores, "Vocabulary Builders", &mapping);
    let d = engine.evaluate(placed, 74, 1, &[78, 80, 76], vocab);
    assert_eq!(d.decision_type, DecisionType::AddSupplemental);
    assert!(d.reason.contains("45%"));

    let reading = category_score_for(
        &scores,
        mapping.resolve("Comprehending Stories"),
        engine.config().neutral_category_score,
    );
    let d = engine.evaluate(placed, 74, 1, &[78, 80, 76], reading);
    assert_eq!(d.decision_type, DecisionType::Proceed);

    let pacing = engine.lesson_pacing(placed, &[78, 80, 76]);
    assert_eq!(pacing.speed, PacingSpeed::Moderate);
    assert_eq!(engine.game_difficulty(placed, 74, 1), GameDifficulty::Easy);
}

#[test]
fn integration_advanced_learner_journey() {
    let engine = DecisionEngine::default();
    let advanced = PlacementLevel::Grade4.tier();

    assert_eq!(engine.game_difficulty(advanced, 0, 0), GameDifficulty::Hard);
    assert_eq!(engine.lesson_pacing(advanced, &[]).duration_minutes, 10);
    assert_eq!(engine.lesson_pacing(advanced, &[92, 95]).duration_minutes, 7);

    let struggling = engine.evaluate(advanced, 78, 2, &[95, 90, 84], 80.0);
    assert_eq!(struggling.trend, ScoreTrend::Declining);
    assert_eq!(struggling.decision_type, DecisionType::AddSupplemental);
    assert_eq!(engine.game_difficulty(advanced, 78, 2), GameDifficulty::Medium);
}
