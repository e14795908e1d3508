use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::CategoryTracker;
use crate::sanitize::{mean, variance};
use crate::types::{Category, Response};

const TREND_WINDOW: usize = 3;
const RECENT_WINDOW: usize = 5;

/// Snapshot of the signals the ensemble votes on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementFeatures {
    pub theta: f64,
    pub accuracy: f64,
    /// 1 when every category has the same accuracy
    pub consistency: f64,
    pub category_thetas: BTreeMap<Category, f64>,
    pub avg_response_time_ms: f64,
    pub response_time_variance: f64,
    /// Accuracy of the last three answers minus the three before them
    pub recent_trend: f64,
    pub difficulty_adaptation: f64,
    pub theta_stability: f64,
    pub question_count: usize,
}

impl PlacementFeatures {
    pub fn extract(theta: f64, responses: &[Response], tracker: &CategoryTracker) -> Self {
        let times: Vec<f64> = responses
            .iter()
            .map(|r| r.response_time_ms as f64)
            .collect();

        Self {
            theta,
            accuracy: accuracy_of(responses),
            consistency: category_consistency(tracker),
            category_thetas: tracker.category_thetas(),
            avg_response_time_ms: mean(&times),
            response_time_variance: variance(&times),
            recent_trend: recent_trend(responses),
            difficulty_adaptation: difficulty_adaptation(responses),
            theta_stability: theta_stability(responses),
            question_count: responses.len(),
        }
    }

    pub fn mean_category_theta(&self) -> Option<f64> {
        if self.category_thetas.is_empty() {
            return None;
        }
        let thetas: Vec<f64> = self.category_thetas.values().copied().collect();
        Some(mean(&thetas))
    }
}

fn accuracy_of(responses: &[Response]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    responses.iter().filter(|r| r.correct).count() as f64 / responses.len() as f64
}

fn category_consistency(tracker: &CategoryTracker) -> f64 {
    let accuracies: Vec<f64> = tracker.accuracies().into_values().collect();
    if accuracies.len() < 2 {
        return 0.5;
    }
    (1.0 - variance(&accuracies) * 2.0).max(0.0)
}

fn recent_trend(responses: &[Response]) -> f64 {
    let n = responses.len();
    if n < TREND_WINDOW * 2 {
        return 0.0;
    }
    let recent = &responses[n - TREND_WINDOW..];
    let previous = &responses[n - TREND_WINDOW * 2..n - TREND_WINDOW];
    accuracy_of(recent) - accuracy_of(previous)
}

fn difficulty_adaptation(responses: &[Response]) -> f64 {
    let n = responses.len();
    if n < RECENT_WINDOW {
        return 0.0;
    }
    let recent = &responses[n - RECENT_WINDOW..];
    let difficulties: Vec<f64> = recent.iter().map(|r| r.difficulty).collect();
    mean(&difficulties) * accuracy_of(recent)
}

fn theta_stability(responses: &[Response]) -> f64 {
    let n = responses.len();
    if n < RECENT_WINDOW {
        return 0.0;
    }
    let thetas: Vec<f64> = responses[n - RECENT_WINDOW..]
        .iter()
        .map(|r| r.theta_at_answer)
        .collect();
    (1.0 - variance(&thetas)).max(0.0)
}
