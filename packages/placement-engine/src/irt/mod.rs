//! Three-Parameter Logistic (3PL) IRT Model
//!
//! Pure functions over (θ, a, b, c):
//! - Probability: P(θ) = c + (1 - c) / (1 + exp(-a(θ - b)))
//! - Fisher information: I(θ) = a² · ((P - c) / (1 - c))² · (1 - P) / P
//! - Test reliability: I / (1 + I), with I summed over administered items
//! - Standard error: 1 / sqrt(I)
//!
//! θ is the learner ability on the logit scale, a the item discrimination,
//! b the item difficulty and c the pseudo-guessing floor.

pub mod estimator;
pub mod selector;

pub use estimator::AbilityEstimator;
pub use selector::select_next_item;

use serde::{Deserialize, Serialize};

use crate::sanitize::round_to;
use crate::types::{Item, ThetaBounds, INITIAL_THETA, THETA_PRECISION};

// ==================== Constants ====================

/// Logistic exponent limit, keeps exp() finite
const EXPONENT_LIMIT: f64 = 20.0;

/// Proportion clamp for the raw-score logit
const MIN_PROPORTION: f64 = 0.01;
const MAX_PROPORTION: f64 = 0.99;

/// Half-width of the recommended difficulty window around θ
const DIFFICULTY_WINDOW: f64 = 0.5;

/// Fewest administered items for a usable estimate
pub const MIN_RELIABLE_ITEMS: usize = 10;

// ==================== Item Functions ====================

/// Probability of a correct response
pub fn probability(theta: f64, a: f64, b: f64, c: f64) -> f64 {
    let z = (a * (theta - b)).clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT);
    c + (1.0 - c) / (1.0 + (-z).exp())
}

/// Fisher information of one item at θ; zero where P degenerates
pub fn information(theta: f64, a: f64, b: f64, c: f64) -> f64 {
    let p = probability(theta, a, b, c);
    if p <= 0.0 || p >= 1.0 || c >= 1.0 {
        return 0.0;
    }
    let rescaled = (p - c) / (1.0 - c);
    (a * a * rescaled * rescaled * (1.0 - p) / p).max(0.0)
}

pub fn item_probability(theta: f64, item: &Item) -> f64 {
    probability(theta, item.discrimination, item.difficulty, item.guessing)
}

pub fn item_information(theta: f64, item: &Item) -> f64 {
    information(theta, item.discrimination, item.difficulty, item.guessing)
}

// ==================== Test Functions ====================

pub fn total_information<'a>(items: impl IntoIterator<Item = &'a Item>, theta: f64) -> f64 {
    items
        .into_iter()
        .map(|item| item_information(theta, item))
        .sum()
}

/// Reliability coefficient in [0, 1)
pub fn reliability<'a>(items: impl IntoIterator<Item = &'a Item>, theta: f64) -> f64 {
    let info = total_information(items, theta);
    round_to(info / (1.0 + info), THETA_PRECISION)
}

/// Standard error of measurement; `None` when no information has been collected
pub fn standard_error<'a>(items: impl IntoIterator<Item = &'a Item>, theta: f64) -> Option<f64> {
    let info = total_information(items, theta);
    if info <= 0.0 {
        return None;
    }
    Some(round_to(1.0 / info.sqrt(), THETA_PRECISION))
}

/// Expected percentage score over a set of items
pub fn expected_score<'a>(items: impl IntoIterator<Item = &'a Item>, theta: f64) -> f64 {
    let (sum, count) = items
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), item| {
            (sum + item_probability(theta, item), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    round_to(sum / count as f64 * 100.0, 2)
}

/// Logit of the proportion correct, used to seed θ before refinement
pub fn raw_score_to_theta(correct: usize, total: usize, bounds: ThetaBounds) -> f64 {
    if total == 0 {
        return bounds.clamp(INITIAL_THETA);
    }
    let proportion = (correct as f64 / total as f64).clamp(MIN_PROPORTION, MAX_PROPORTION);
    bounds.clamp((proportion / (1.0 - proportion)).ln())
}

pub fn has_sufficient_items(item_count: usize) -> bool {
    item_count >= MIN_RELIABLE_ITEMS
}

/// Difficulty range worth targeting next, centred on θ
pub fn difficulty_window(theta: f64) -> (f64, f64) {
    (theta - DIFFICULTY_WINDOW, theta + DIFFICULTY_WINDOW)
}

// ==================== Reporting ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityBand {
    Beginner,
    Developing,
    Intermediate,
    Advanced,
    Expert,
}

impl AbilityBand {
    pub fn from_theta(theta: f64) -> Self {
        if theta < -1.0 {
            Self::Beginner
        } else if theta < 0.5 {
            Self::Developing
        } else if theta < 1.5 {
            Self::Intermediate
        } else if theta < 2.5 {
            Self::Advanced
        } else {
            Self::Expert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Developing => "Developing",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }
}

/// Describe the change between two ability estimates
pub fn growth_description(initial_theta: f64, final_theta: f64) -> &'static str {
    let change = final_theta - initial_theta;

    if change.abs() < 0.1 {
        "No significant change"
    } else if change > 0.5 {
        "Significant improvement"
    } else if change > 0.2 {
        "Good progress"
    } else if change > 0.0 {
        "Slight improvement"
    } else if change > -0.2 {
        "Slight decline"
    } else {
        "Needs more practice"
    }
}
