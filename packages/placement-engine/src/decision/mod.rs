//! Performance-based adaptive decisions
//!
//! Stateless rules that turn quiz outcomes and the placement tier into a
//! pedagogical action, a game difficulty and a lesson pacing. No θ involved:
//! every input is a percentage score, an attempt count or a tier.

pub mod engine;
pub mod serving;
pub mod trend;

pub use engine::{category_score_for, DecisionEngine};
pub use serving::{select_game_difficulty, select_lesson_pacing};
pub use trend::{average_score, score_trend};

use serde::{Deserialize, Serialize};

use crate::types::PlacementTier;

// ==================== Decisions ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionType {
    Proceed,
    AddSupplemental,
    AddIntervention,
    OfferEnrichment,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proceed => "PROCEED",
            Self::AddSupplemental => "ADD_SUPPLEMENTAL",
            Self::AddIntervention => "ADD_INTERVENTION",
            Self::OfferEnrichment => "OFFER_ENRICHMENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreTrend {
    Improving,
    Stable,
    Declining,
}

impl ScoreTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "IMPROVING",
            Self::Stable => "STABLE",
            Self::Declining => "DECLINING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveDecision {
    pub decision_type: DecisionType,
    pub reason: String,
    pub quiz_score: u32,
    pub attempt_count: u32,
    pub tier: PlacementTier,
    pub trend: ScoreTrend,
}

impl AdaptiveDecision {
    /// An extra support node is inserted before the learner moves on
    pub fn needs_support(&self) -> bool {
        matches!(
            self.decision_type,
            DecisionType::AddSupplemental | DecisionType::AddIntervention
        )
    }

    pub fn can_advance(&self) -> bool {
        matches!(
            self.decision_type,
            DecisionType::Proceed | DecisionType::OfferEnrichment
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} (score {}%, attempt {})",
            self.decision_type.as_str(),
            self.reason,
            self.quiz_score,
            self.attempt_count
        )
    }
}

// ==================== Serving Directives ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameDifficulty {
    Easy,
    Medium,
    Hard,
}

impl GameDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PacingSpeed {
    Slow,
    Moderate,
    ModerateFast,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scaffolding {
    High,
    Balanced,
    Low,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExampleDensity {
    Many,
    Adequate,
    Few,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingStrategy {
    pub speed: PacingSpeed,
    pub scaffolding: Scaffolding,
    pub examples: ExampleDensity,
    pub duration_minutes: u32,
    pub allow_review: bool,
}

impl PacingStrategy {
    pub const SUPPORTED: PacingStrategy = PacingStrategy {
        speed: PacingSpeed::Slow,
        scaffolding: Scaffolding::High,
        examples: ExampleDensity::Many,
        duration_minutes: 15,
        allow_review: true,
    };

    pub const REMEDIAL: PacingStrategy = PacingStrategy {
        duration_minutes: 12,
        ..Self::SUPPORTED
    };

    pub const BALANCED: PacingStrategy = PacingStrategy {
        speed: PacingSpeed::Moderate,
        scaffolding: Scaffolding::Balanced,
        examples: ExampleDensity::Adequate,
        duration_minutes: 10,
        allow_review: true,
    };

    pub const BRISK: PacingStrategy = PacingStrategy {
        speed: PacingSpeed::ModerateFast,
        scaffolding: Scaffolding::Low,
        examples: ExampleDensity::Adequate,
        duration_minutes: 8,
        allow_review: false,
    };

    pub const ACCELERATED: PacingStrategy = PacingStrategy {
        speed: PacingSpeed::Fast,
        scaffolding: Scaffolding::Minimal,
        examples: ExampleDensity::Few,
        duration_minutes: 7,
        allow_review: false,
    };

    pub fn description(&self) -> String {
        let speed = match self.speed {
            PacingSpeed::Slow => "slow",
            PacingSpeed::Moderate => "moderate",
            PacingSpeed::ModerateFast => "moderately fast",
            PacingSpeed::Fast => "fast",
        };
        let scaffolding = match self.scaffolding {
            Scaffolding::High => "high",
            Scaffolding::Balanced => "balanced",
            Scaffolding::Low => "low",
            Scaffolding::Minimal => "minimal",
        };
        let examples = match self.examples {
            ExampleDensity::Many => "many",
            ExampleDensity::Adequate => "adequate",
            ExampleDensity::Few => "few",
        };
        format!(
            "{speed} pace, {scaffolding} scaffolding, {examples} examples ({} min)",
            self.duration_minutes
        )
    }
}
