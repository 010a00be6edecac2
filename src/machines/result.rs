//! Test result review lifecycle.

use crate::core::{State, StatusChange, TransitionTable};
use crate::error::{EntityKind, WorkflowError, WorkflowResult};
use crate::model::{EntityId, ResultStatus, TestResult};
use crate::validation;
use chrono::{DateTime, Utc};

/// DRAFT -> SUBMITTED -> REVIEWED.
pub fn table() -> TransitionTable<ResultStatus> {
    TransitionTable::new(
        EntityKind::TestResult,
        vec![
            (ResultStatus::Draft, ResultStatus::Submitted),
            (ResultStatus::Submitted, ResultStatus::Reviewed),
        ],
    )
}

/// Fields a technician may change. `None` leaves a field as it is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultChanges {
    pub result_data: Option<String>,
    pub notes: Option<String>,
    pub result_date: Option<DateTime<Utc>>,
    pub technician_id: Option<EntityId>,
}

/// Apply `changes`; rejected once the result has been reviewed.
pub fn update(result: &TestResult, changes: ResultChanges) -> WorkflowResult<TestResult> {
    if result.status == ResultStatus::Reviewed {
        return Err(WorkflowError::ResultLocked { id: result.id });
    }
    let mut next = result.clone();
    if let Some(data) = changes.result_data {
        next.result_data = Some(data);
    }
    if let Some(notes) = changes.notes {
        next.notes = Some(notes);
    }
    if let Some(date) = changes.result_date {
        next.result_date = Some(date);
    }
    if let Some(technician) = changes.technician_id {
        next.technician_id = Some(technician);
    }
    Ok(next)
}

/// Submit a draft for review.
///
/// Value, result date and technician must all be present; every missing one
/// is named in the error.
pub fn submit(result: &TestResult, actor: EntityId, at: DateTime<Utc>) -> WorkflowResult<TestResult> {
    table().check(&result.status, &ResultStatus::Submitted)?;
    validation::collect(vec![
        validation::require_text("result_data", result.result_data.as_deref()),
        validation::require("result_date", result.result_date.as_ref()),
        validation::require("technician_id", result.technician_id.as_ref()),
    ])?;
    Ok(moved(result, ResultStatus::Submitted, actor, at))
}

/// Record a review by `reviewer`.
pub fn review(
    result: &TestResult,
    reviewer: EntityId,
    comment: Option<&str>,
    at: DateTime<Utc>,
) -> WorkflowResult<TestResult> {
    if result.status != ResultStatus::Submitted {
        return Err(WorkflowError::NotSubmitted {
            id: result.id,
            status: result.status.name().to_string(),
        });
    }
    let mut next = moved(result, ResultStatus::Reviewed, reviewer, at);
    next.reviewer_id = Some(reviewer);
    next.reviewed_at = Some(at);
    if let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) {
        next.comment = Some(comment.to_string());
    }
    Ok(next)
}

fn moved(result: &TestResult, to: ResultStatus, actor: EntityId, at: DateTime<Utc>) -> TestResult {
    let mut next = result.clone();
    next.history = result.history.record(StatusChange {
        from: result.status,
        to,
        at,
        actor,
    });
    next.status = to;
    next
}
