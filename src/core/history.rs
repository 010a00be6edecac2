//! Status change history.
//!
//! Every stateful entity carries an immutable audit trail of the status
//! changes applied to it, recording who moved it and when.

use super::state::State;
use crate::model::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single status change.
///
/// # Example
///
/// ```rust
/// use labflow::core::StatusChange;
/// use labflow::model::ExaminationStatus;
/// use chrono::Utc;
///
/// let change = StatusChange {
///     from: ExaminationStatus::Scheduled,
///     to: ExaminationStatus::InProgress,
///     at: Utc::now(),
///     actor: 7,
/// };
/// assert_eq!(change.actor, 7);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StatusChange<S: State> {
    /// The status being left
    pub from: S,
    /// The status being entered
    pub to: S,
    /// When the change was applied
    pub at: DateTime<Utc>,
    /// User who caused the change
    pub actor: EntityId,
}

/// Ordered history of status changes.
///
/// History is immutable: [`record`](Self::record) returns a new history with
/// the change appended.
///
/// # Example
///
/// ```rust
/// use labflow::core::{StatusChange, StatusHistory};
/// use labflow::model::AssignedTestStatus;
/// use chrono::Utc;
///
/// let history = StatusHistory::new()
///     .record(StatusChange {
///         from: AssignedTestStatus::Pending,
///         to: AssignedTestStatus::InProgress,
///         at: Utc::now(),
///         actor: 1,
///     })
///     .record(StatusChange {
///         from: AssignedTestStatus::InProgress,
///         to: AssignedTestStatus::Completed,
///         at: Utc::now(),
///         actor: 1,
///     });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path[2], &AssignedTestStatus::Completed);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StatusHistory<S: State> {
    changes: Vec<StatusChange<S>>,
}

impl<S: State> Default for StatusHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StatusHistory<S> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Record a change, returning a new history.
    ///
    /// The receiver is left untouched.
    pub fn record(&self, change: StatusChange<S>) -> Self {
        let mut changes = self.changes.clone();
        changes.push(change);
        Self { changes }
    }

    /// Statuses traversed: the first `from`, then the `to` of each change.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.changes.first() {
            path.push(&first.from);
        }
        for change in &self.changes {
            path.push(&change.to);
        }
        path
    }

    /// Time between the first and last recorded change.
    ///
    /// `None` when nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.changes.first(), self.changes.last()) {
            last.at.signed_duration_since(first.at).to_std().ok()
        } else {
            None
        }
    }

    /// The most recent change, if any.
    pub fn last(&self) -> Option<&StatusChange<S>> {
        self.changes.last()
    }

    /// All changes in the order they were applied.
    pub fn changes(&self) -> &[StatusChange<S>] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
