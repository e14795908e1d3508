//! Adaptive reading assessment and placement
//!
//! - `irt`: 3PL model, maximum-likelihood ability estimation, item selection
//! - `category`: per-skill response tracking
//! - `placement`: ensemble placement prediction with early stopping
//! - `decision`: quiz-driven pedagogical decisions, game difficulty, pacing
//! - `session`: the caller-owned assessment tying these together

pub mod bank;
pub mod category;
pub mod config;
pub mod decision;
pub mod error;
pub mod irt;
pub mod logging;
pub mod placement;
pub mod sanitize;
pub mod session;
pub mod types;

pub use bank::ItemBank;
pub use category::{CategoryMapping, CategoryPerformance, CategoryTracker};
pub use config::{
    DecisionConfig, EngineConfig, EnsembleWeights, EstimatorConfig, PlacementConfig,
    StoppingConfig,
};
pub use decision::{
    AdaptiveDecision, DecisionEngine, DecisionType, GameDifficulty, PacingStrategy, ScoreTrend,
};
pub use error::{EngineError, Result};
pub use irt::{AbilityBand, AbilityEstimator};
pub use placement::{
    ConfidenceLabel, GapSeverity, PlacementPrediction, PlacementPredictor, SkillGap,
};
pub use session::{
    AssessmentSession, CategorySummary, RecordedAnswer, SessionSummary, StopReason,
};
pub use types::{Category, Item, PlacementLevel, PlacementTier, Response, ThetaBounds};
