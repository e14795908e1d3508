//! Maximum-likelihood ability estimation
//!
//! Newton-Raphson on the 3PL log-likelihood. Where the observed curvature is
//! not negative the expected curvature (minus the test information) is used,
//! so every step still moves uphill.

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{item_information, item_probability, raw_score_to_theta};
use crate::config::EstimatorConfig;
use crate::sanitize::round_to;
use crate::types::{Item, ThetaBounds, THETA_PRECISION};

/// One scored answer paired with the item it answered
pub type ScoredItem<'a> = (bool, &'a Item);

#[derive(Debug, Clone, Default)]
pub struct AbilityEstimator {
    config: EstimatorConfig,
}

impl AbilityEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn bounds(&self) -> ThetaBounds {
        self.config.bounds
    }

    /// Refine θ starting from `theta0`. An empty history returns `theta0`.
    pub fn estimate(&self, theta0: f64, history: &[ScoredItem<'_>]) -> f64 {
        if history.is_empty() {
            return theta0;
        }

        let bounds = self.config.bounds;
        let mut theta = bounds.clamp(theta0);

        for iteration in 0..self.config.max_iterations {
            let (gradient, hessian, info) = log_likelihood_derivatives(theta, history);

            let Some(step) = newton_step(gradient, hessian, info, self.config.max_step) else {
                warn!(
                    theta,
                    iteration,
                    gradient,
                    hessian,
                    info,
                    "degenerate likelihood curvature, keeping last estimate"
                );
                break;
            };

            let next = bounds.clamp(theta - step);
            let delta = (next - theta).abs();
            theta = next;

            if delta < self.config.tolerance {
                debug!(theta, iteration, "ability estimate converged");
                break;
            }
        }

        round_to(bounds.clamp(theta), THETA_PRECISION)
    }

    /// Seed θ from the raw score, then refine
    pub fn estimate_from_scratch(&self, history: &[ScoredItem<'_>]) -> f64 {
        let correct = history.iter().filter(|(c, _)| *c).count();
        let seed = raw_score_to_theta(correct, history.len(), self.config.bounds);
        if history.is_empty() {
            return round_to(seed, THETA_PRECISION);
        }
        self.estimate(seed, history)
    }

    /// Re-score many independent histories in parallel
    pub fn estimate_batch(&self, histories: &[Vec<ScoredItem<'_>>]) -> Vec<f64> {
        histories
            .par_iter()
            .map(|history| self.estimate_from_scratch(history))
            .collect()
    }
}

/// Newton step `L'/L''` capped at `max_step`. A positive `L''` is replaced by
/// the expected curvature `-info`. `None` when the curvature is zero or either
/// input is not finite.
fn newton_step(gradient: f64, hessian: f64, info: f64, max_step: f64) -> Option<f64> {
    let curvature = if hessian > 0.0 { -info } else { hessian };
    if curvature == 0.0 || !curvature.is_finite() || !gradient.is_finite() {
        return None;
    }
    Some((gradient / curvature).clamp(-max_step, max_step))
}

/// First and second derivatives of the log-likelihood, plus the test information
fn log_likelihood_derivatives(theta: f64, history: &[ScoredItem<'_>]) -> (f64, f64, f64) {
    let mut gradient = 0.0;
    let mut hessian = 0.0;
    let mut info = 0.0;

    for &(correct, item) in history {
        let a = item.discrimination;
        let c = item.guessing;
        let p = item_probability(theta, item);
        if p <= 0.0 || p >= 1.0 {
            continue;
        }
        let u = if correct { 1.0 } else { 0.0 };

        gradient += a * (u - p) * (p - c) / (p * (1.0 - c));
        hessian += a * a * (p - c) * (1.0 - p) * (c * u - p * p) / (p * p * (1.0 - c).powi(2));
        info += item_information(theta, item);
    }

    (gradient, hessian, info)
}
