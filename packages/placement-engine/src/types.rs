//! Common Types and Constants
//!
//! Shared data structures used across the estimation, placement and decision modules.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::sanitize::has_invalid_values;

// ==================== Constants ====================

/// Starting ability before any response is recorded
pub const INITIAL_THETA: f64 = 0.0;

/// Fractional digits kept on every reported θ
pub const THETA_PRECISION: i32 = 4;

// ==================== Skill Categories ====================

/// Reading skill area an item measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PhonicsWordStudy,
    VocabularyWordKnowledge,
    GrammarAwareness,
    ComprehendingText,
    CreatingComposing,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::PhonicsWordStudy,
        Category::VocabularyWordKnowledge,
        Category::GrammarAwareness,
        Category::ComprehendingText,
        Category::CreatingComposing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhonicsWordStudy => "phonics_word_study",
            Self::VocabularyWordKnowledge => "vocabulary_word_knowledge",
            Self::GrammarAwareness => "grammar_awareness",
            Self::ComprehendingText => "comprehending_text",
            Self::CreatingComposing => "creating_composing",
        }
    }

    /// Human-readable name for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::PhonicsWordStudy => "Phonics and Word Study",
            Self::VocabularyWordKnowledge => "Vocabulary and Word Knowledge",
            Self::GrammarAwareness => "Grammar Awareness",
            Self::ComprehendingText => "Comprehending Text",
            Self::CreatingComposing => "Creating and Composing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ==================== Items and Responses ====================

/// Calibrated 3PL item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Discrimination a (> 0)
    pub discrimination: f64,
    /// Difficulty b on the θ scale
    pub difficulty: f64,
    /// Guessing c in [0, 1)
    pub guessing: f64,
    pub category: Category,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        discrimination: f64,
        difficulty: f64,
        guessing: f64,
        category: Category,
    ) -> Result<Self> {
        let item = Self {
            id: id.into(),
            discrimination,
            difficulty,
            guessing,
            category,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| EngineError::InvalidItem {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if has_invalid_values(&[self.discrimination, self.difficulty, self.guessing]) {
            return Err(invalid("parameters must be finite"));
        }
        if self.discrimination <= 0.0 {
            return Err(invalid("discrimination must be > 0"));
        }
        if !(0.0..1.0).contains(&self.guessing) {
            return Err(invalid("guessing must lie in [0, 1)"));
        }
        Ok(())
    }
}

/// One answered item, appended to the session history in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub item_id: String,
    pub category: Category,
    /// Difficulty b of the answered item
    pub difficulty: f64,
    pub correct: bool,
    pub response_time_ms: u64,
    /// Ability estimate after this answer was folded in
    pub theta_at_answer: f64,
}

// ==================== Ability Scale ====================

/// Closed interval every θ is clamped to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaBounds {
    pub min: f64,
    pub max: f64,
}

impl ThetaBounds {
    pub const STANDARD: ThetaBounds = ThetaBounds { min: -4.0, max: 4.0 };
    pub const PLACEMENT: ThetaBounds = ThetaBounds { min: -3.0, max: 3.0 };

    pub fn clamp(&self, theta: f64) -> f64 {
        if theta.is_nan() {
            return INITIAL_THETA.clamp(self.min, self.max);
        }
        theta.clamp(self.min, self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

impl Default for ThetaBounds {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ==================== Placement ====================

/// Ordered placement levels produced by the ensemble predictor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum PlacementLevel {
    Grade2,
    LowGrade3,
    #[default]
    MidGrade3,
    HighGrade3,
    Grade4,
}

impl PlacementLevel {
    pub const ORDERED: [PlacementLevel; 5] = [
        PlacementLevel::Grade2,
        PlacementLevel::LowGrade3,
        PlacementLevel::MidGrade3,
        PlacementLevel::HighGrade3,
        PlacementLevel::Grade4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grade2 => "Grade 2",
            Self::LowGrade3 => "Low Grade 3",
            Self::MidGrade3 => "Mid Grade 3",
            Self::HighGrade3 => "High Grade 3",
            Self::Grade4 => "Grade 4",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Grade2 => 0,
            Self::LowGrade3 => 1,
            Self::MidGrade3 => 2,
            Self::HighGrade3 => 3,
            Self::Grade4 => 4,
        }
    }

    /// Collapse onto the three tiers the decision engine works with
    pub fn tier(&self) -> PlacementTier {
        match self {
            Self::Grade2 | Self::LowGrade3 => PlacementTier::Beginner,
            Self::MidGrade3 => PlacementTier::Intermediate,
            Self::HighGrade3 | Self::Grade4 => PlacementTier::Advanced,
        }
    }
}

impl std::fmt::Display for PlacementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl PlacementTier {
    /// Numeric tier as stored by the session collaborator (1, 2, 3)
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Beginner),
            2 => Some(Self::Intermediate),
            3 => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_new_accepts_valid_parameters() {
        let item = Item::new("q1", 1.2, -0.5, 0.25, Category::GrammarAwareness).unwrap();
        assert_eq!(item.id, "q1");
        assert_eq!(item.category, Category::GrammarAwareness);
    }

    #[test]
    fn test_item_new_rejects_non_positive_discrimination() {
        let err = Item::new("q1", 0.0, 0.0, 0.2, Category::PhonicsWordStudy).unwrap_err();
        assert!(matches!(err, EngineError::InvalidItem { ref id, .. } if id == "q1"));
        assert!(Item::new("q2", -1.0, 0.0, 0.2, Category::PhonicsWordStudy).is_err());
    }

    #[test]
    fn test_item_new_rejects_guessing_out_of_range() {
        assert!(Item::new("q1", 1.0, 0.0, 1.0, Category::PhonicsWordStudy).is_err());
        assert!(Item::new("q1", 1.0, 0.0, -0.1, Category::PhonicsWordStudy).is_err());
        assert!(Item::new("q1", 1.0, f64::NAN, 0.1, Category::PhonicsWordStudy).is_err());
    }

    #[test]
    fn test_theta_bounds_clamp() {
        assert_eq!(ThetaBounds::STANDARD.clamp(9.0), 4.0);
        assert_eq!(ThetaBounds::PLACEMENT.clamp(-9.0), -3.0);
        assert_eq!(ThetaBounds::PLACEMENT.clamp(f64::NAN), 0.0);
        assert!(!ThetaBounds { min: 1.0, max: -1.0 }.is_valid());
    }

    #[test]
    fn test_placement_level_ordering_and_tiers() {
        assert!(PlacementLevel::Grade2 < PlacementLevel::LowGrade3);
        assert!(PlacementLevel::HighGrade3 < PlacementLevel::Grade4);
        assert_eq!(PlacementLevel::LowGrade3.tier(), PlacementTier::Beginner);
        assert_eq!(PlacementLevel::MidGrade3.tier(), PlacementTier::Intermediate);
        assert_eq!(PlacementLevel::Grade4.tier(), PlacementTier::Advanced);
        for (i, level) in PlacementLevel::ORDERED.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }

    #[test]
    fn test_tier_level_roundtrip() {
        for level in 1..=3u8 {
            assert_eq!(PlacementTier::from_level(level).unwrap().level(), level);
        }
        assert!(PlacementTier::from_level(0).is_none());
        assert!(PlacementTier::from_level(4).is_none());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            Category::parse("Comprehending_Text"),
            Some(Category::ComprehendingText)
        );
        assert_eq!(Category::parse("unknown"), None);
    }
}
