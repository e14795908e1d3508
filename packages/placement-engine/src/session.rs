//! Caller-owned adaptive assessment
//!
//! An `AssessmentSession` owns everything that changes during a placement test:
//! the current θ, the ordered response history, the per-category tracker and
//! the set of items already administered. Items live in a shared, immutable
//! `ItemBank`.
//!
//! The protocol is strictly alternating: `select_next_item` presents an item
//! and `submit_answer` must answer that same item before another is selected.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bank::ItemBank;
use crate::category::CategoryTracker;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::irt::{self, AbilityBand, AbilityEstimator};
use crate::placement::{PlacementPrediction, PlacementPredictor, SkillGap};
use crate::types::{Category, Item, PlacementLevel, Response, INITIAL_THETA};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    MaxItemsReached,
    PoolExhausted,
    PrecisionReached { standard_error: f64 },
    EarlyStopConfident { level: PlacementLevel, confidence: f64 },
}

/// Persistable record of one answer, enough to replay a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub item_id: String,
    pub correct: bool,
    pub response_time_ms: u64,
}

/// Per-category line of a session report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub answered: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub average_response_time_ms: f64,
    /// Items of this category in the bank
    pub bank_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub answered: usize,
    pub theta: f64,
    pub standard_error: Option<f64>,
    pub reliability: f64,
    pub expected_score: f64,
    pub ability_band: AbilityBand,
    pub growth: String,
    /// Enough answers for the estimate to be trusted
    pub sufficient_items: bool,
    /// Difficulty range the next items should come from
    pub target_difficulty: (f64, f64),
    pub categories: Vec<CategorySummary>,
    pub placement: PlacementPrediction,
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    bank: Arc<ItemBank>,
    config: EngineConfig,
    estimator: AbilityEstimator,
    predictor: PlacementPredictor,
    theta: f64,
    responses: Vec<Response>,
    administered: HashSet<String>,
    tracker: CategoryTracker,
    pending: Option<String>,
}

impl AssessmentSession {
    pub fn new(bank: Arc<ItemBank>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            estimator: AbilityEstimator::new(config.estimator.clone()),
            predictor: PlacementPredictor::new(config.placement.clone()),
            theta: config.estimator.bounds.clamp(INITIAL_THETA),
            responses: Vec::new(),
            administered: HashSet::new(),
            tracker: CategoryTracker::new(),
            pending: None,
            bank,
            config,
        })
    }

    /// Rebuild a session by replaying persisted answers in order
    pub fn restore(
        bank: Arc<ItemBank>,
        config: EngineConfig,
        history: &[RecordedAnswer],
    ) -> Result<Self> {
        let mut session = Self::new(bank, config)?;
        for answer in history {
            session.present(&answer.item_id)?;
            session.submit_answer(&answer.item_id, answer.correct, answer.response_time_ms)?;
        }
        debug!(answers = history.len(), theta = session.theta, "session restored");
        Ok(session)
    }

    fn present(&mut self, item_id: &str) -> Result<()> {
        if let Some(expected) = &self.pending {
            return Err(EngineError::UnexpectedItem {
                expected: expected.clone(),
                got: item_id.to_string(),
            });
        }
        self.bank.require(item_id)?;
        if self.administered.contains(item_id) {
            return Err(EngineError::DuplicateItem(item_id.to_string()));
        }
        self.pending = Some(item_id.to_string());
        Ok(())
    }

    /// Item to show next. Repeated calls return the same item until it is answered.
    pub fn select_next_item(&mut self) -> Result<&Item> {
        if let Some(id) = &self.pending {
            return self.bank.require(id);
        }

        let administered = &self.administered;
        let item = irt::select_next_item(
            self.theta,
            self.bank
                .items()
                .iter()
                .filter(|item| !administered.contains(&item.id)),
        )?;

        debug!(item_id = %item.id, theta = self.theta, difficulty = item.difficulty, "item selected");
        self.pending = Some(item.id.clone());
        Ok(item)
    }

    /// Record the answer to the pending item and return the updated θ
    pub fn submit_answer(
        &mut self,
        item_id: &str,
        correct: bool,
        response_time_ms: u64,
    ) -> Result<f64> {
        match self.pending.as_deref() {
            None => return Err(EngineError::NoPendingItem),
            Some(expected) if expected != item_id => {
                return Err(EngineError::UnexpectedItem {
                    expected: expected.to_string(),
                    got: item_id.to_string(),
                });
            }
            Some(_) => {}
        }

        let item = self.bank.require(item_id)?;
        let mut history = self
            .responses
            .iter()
            .map(|r| self.bank.require(&r.item_id).map(|it| (r.correct, it)))
            .collect::<Result<Vec<_>>>()?;
        history.push((correct, item));

        let theta = self.estimator.estimate(self.theta, &history);

        self.tracker
            .record(item.category, correct, response_time_ms, item.difficulty);
        self.responses.push(Response {
            item_id: item.id.clone(),
            category: item.category,
            difficulty: item.difficulty,
            correct,
            response_time_ms,
            theta_at_answer: theta,
        });
        self.administered.insert(item.id.clone());
        self.pending = None;

        debug!(
            item_id,
            correct,
            response_time_ms,
            previous_theta = self.theta,
            theta,
            answered = self.responses.len(),
            "answer recorded"
        );
        self.theta = theta;
        Ok(theta)
    }

    pub fn should_stop(&self) -> Option<StopReason> {
        let answered = self.responses.len();
        let stopping = &self.config.stopping;

        let reason = if answered >= stopping.max_items {
            Some(StopReason::MaxItemsReached)
        } else if self.pending.is_none() && answered >= self.bank.len() {
            Some(StopReason::PoolExhausted)
        } else {
            self.precision_stop(answered).or_else(|| {
                let prediction = self.placement();
                prediction
                    .can_stop_early
                    .then_some(StopReason::EarlyStopConfident {
                        level: prediction.predicted_level,
                        confidence: prediction.confidence,
                    })
            })
        };

        if let Some(reason) = &reason {
            info!(?reason, answered, theta = self.theta, "assessment can stop");
        }
        reason
    }

    fn precision_stop(&self, answered: usize) -> Option<StopReason> {
        if answered < self.config.stopping.min_items {
            return None;
        }
        self.standard_error()
            .filter(|&se| se <= self.config.stopping.target_standard_error)
            .map(|standard_error| StopReason::PrecisionReached { standard_error })
    }

    pub fn placement(&self) -> PlacementPrediction {
        self.predictor
            .predict(self.theta, &self.responses, &self.tracker)
    }

    pub fn skill_gaps(&self) -> Vec<SkillGap> {
        self.predictor.skill_gaps(&self.tracker)
    }

    fn administered_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.responses
            .iter()
            .filter_map(|r| self.bank.get(&r.item_id))
    }

    pub fn standard_error(&self) -> Option<f64> {
        irt::standard_error(self.administered_items(), self.theta)
    }

    pub fn reliability(&self) -> f64 {
        irt::reliability(self.administered_items(), self.theta)
    }

    pub fn expected_score(&self) -> f64 {
        irt::expected_score(self.administered_items(), self.theta)
    }

    pub fn category_scores(&self) -> BTreeMap<Category, f64> {
        self.tracker.category_scores()
    }

    pub fn ability_band(&self) -> AbilityBand {
        AbilityBand::from_theta(self.theta)
    }

    /// Report on the session so far
    pub fn summary(&self) -> SessionSummary {
        let starting_theta = self.config.estimator.bounds.clamp(INITIAL_THETA);
        let categories = Category::ALL
            .iter()
            .filter_map(|&category| {
                let bank_items = self.bank.by_category(category).count();
                let perf = self.tracker.get(category);
                if bank_items == 0 && perf.is_none() {
                    return None;
                }
                Some(CategorySummary {
                    category,
                    answered: perf.map_or(0, |p| p.total()),
                    correct: perf.map_or(0, |p| p.correct_count()),
                    accuracy: self.tracker.accuracy(category),
                    average_response_time_ms: perf
                        .map_or(0.0, |p| p.average_response_time_ms()),
                    bank_items,
                })
            })
            .collect();

        SessionSummary {
            answered: self.responses.len(),
            theta: self.theta,
            standard_error: self.standard_error(),
            reliability: self.reliability(),
            expected_score: self.expected_score(),
            ability_band: self.ability_band(),
            growth: irt::growth_description(starting_theta, self.theta).to_string(),
            sufficient_items: irt::has_sufficient_items(self.responses.len()),
            target_difficulty: irt::difficulty_window(self.theta),
            categories,
            placement: self.placement(),
        }
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn tracker(&self) -> &CategoryTracker {
        &self.tracker
    }

    pub fn pending_item_id(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answers in order, for persistence and `restore`
    pub fn history(&self) -> Vec<RecordedAnswer> {
        self.responses
            .iter()
            .map(|r| RecordedAnswer {
                item_id: r.item_id.clone(),
                correct: r.correct,
                response_time_ms: r.response_time_ms,
            })
            .collect()
    }
}
