//! Trend of a new result against the patient's earlier results.

use super::range::parse_value;
use crate::model::{AssignedTest, AssignedTestStatus, EntityId, TestResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of earlier results kept for display.
pub const DEFAULT_WINDOW: usize = 3;

/// Smallest absolute change that is not considered stable.
pub const DEFAULT_EPSILON: f64 = 0.001;

/// Direction of change from the previous result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendSignal {
    Increasing,
    Decreasing,
    Stable,
}

/// An earlier result of the same lab test for the same patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriorResult {
    pub assigned_test_id: EntityId,
    pub result_id: EntityId,
    pub result_data: Option<String>,
    pub result_date: Option<DateTime<Utc>>,
}

impl PriorResult {
    pub fn value(&self) -> Option<f64> {
        self.result_data.as_deref().and_then(parse_value)
    }
}

/// Signal plus the earlier results it was computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// `None` when there is no earlier result or a value is not numeric.
    pub signal: Option<TrendSignal>,
    pub delta: Option<f64>,
    /// Newest first. Only the first entry feeds the signal.
    pub previous: Vec<PriorResult>,
}

/// Compares a current value with the most recent earlier one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendAnalyzer {
    window: usize,
    epsilon: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_EPSILON)
    }
}

impl TrendAnalyzer {
    pub fn new(window: usize, epsilon: f64) -> Self {
        Self { window, epsilon }
    }

    /// Pick the earlier results eligible for comparison.
    ///
    /// `candidates` are every assigned test (with its result) of the same lab
    /// test for the same patient. The current test is excluded, as is any
    /// test that is not COMPLETED. The rest are ordered newest first by
    /// result date, ties going to the later result id, and cut to the window.
    pub fn select_priors(
        &self,
        current_assigned_test: EntityId,
        candidates: &[(AssignedTest, TestResult)],
    ) -> Vec<PriorResult> {
        let mut priors: Vec<PriorResult> = candidates
            .iter()
            .filter(|(test, _)| test.id != current_assigned_test)
            .filter(|(test, _)| test.status == AssignedTestStatus::Completed)
            .map(|(test, result)| PriorResult {
                assigned_test_id: test.id,
                result_id: result.id,
                result_data: result.result_data.clone(),
                result_date: result.result_date,
            })
            .collect();

        priors.sort_by(|a, b| newest_first(a, b));
        priors.truncate(self.window);
        priors
    }

    /// Compute the trend of `current` against `priors` (newest first).
    pub fn analyze(&self, current: Option<&str>, priors: Vec<PriorResult>) -> TrendReport {
        let current = current.and_then(parse_value);
        let previous = priors.first().and_then(PriorResult::value);

        let (signal, delta) = match (current, previous) {
            (Some(current), Some(previous)) => {
                let delta = current - previous;
                (Some(self.signal(delta)), Some(delta))
            }
            _ => (None, None),
        };

        tracing::debug!(?signal, ?delta, priors = priors.len(), "trend computed");

        TrendReport {
            signal,
            delta,
            previous: priors,
        }
    }

    fn signal(&self, delta: f64) -> TrendSignal {
        if delta.abs() < self.epsilon {
            TrendSignal::Stable
        } else if delta > 0.0 {
            TrendSignal::Increasing
        } else {
            TrendSignal::Decreasing
        }
    }
}

fn newest_first(a: &PriorResult, b: &PriorResult) -> Ordering {
    // Dated results sort before undated ones.
    match (a.result_date, b.result_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.result_id.cmp(&a.result_id))
}
