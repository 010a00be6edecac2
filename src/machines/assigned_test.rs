//! Assigned test lifecycle.

use crate::core::{State, StatusChange, TransitionTable};
use crate::error::{EntityKind, WorkflowError, WorkflowResult};
use crate::model::{AssignedTest, AssignedTestStatus, EntityId, TestResult};
use chrono::{DateTime, Utc};

/// PENDING -> IN_PROGRESS -> COMPLETED; either open status may be cancelled
/// or completed directly.
pub fn table() -> TransitionTable<AssignedTestStatus> {
    use AssignedTestStatus::*;
    TransitionTable::new(
        EntityKind::AssignedTest,
        vec![
            (Pending, InProgress),
            (Pending, Completed),
            (InProgress, Completed),
            (Pending, Cancelled),
            (InProgress, Cancelled),
        ],
    )
}

/// Cancel an open test.
pub fn cancel(test: &AssignedTest, actor: EntityId, at: DateTime<Utc>) -> WorkflowResult<AssignedTest> {
    if test.status.is_final() {
        return Err(WorkflowError::AlreadyFinalized {
            id: test.id,
            status: test.status.name().to_string(),
        });
    }
    moved(test, AssignedTestStatus::Cancelled, actor, at)
}

/// Whether a result may be attached to `test`.
pub fn ensure_accepts_results(test: &AssignedTest) -> WorkflowResult<()> {
    if test.status.is_final() {
        Err(WorkflowError::TestFinalized {
            id: test.id,
            status: test.status.name().to_string(),
        })
    } else {
        Ok(())
    }
}

/// Attach `result` and advance the test.
///
/// A final result (submitted or reviewed) completes the test; a draft puts it
/// IN_PROGRESS.
pub fn record_result(
    test: &AssignedTest,
    result: &TestResult,
    actor: EntityId,
    at: DateTime<Utc>,
) -> WorkflowResult<AssignedTest> {
    ensure_accepts_results(test)?;

    let target = if result.status.completes_test() {
        AssignedTestStatus::Completed
    } else {
        AssignedTestStatus::InProgress
    };

    let mut next = if test.status == target {
        test.clone()
    } else {
        moved(test, target, actor, at)?
    };
    next.result_id = Some(result.id);
    Ok(next)
}

fn moved(
    test: &AssignedTest,
    to: AssignedTestStatus,
    actor: EntityId,
    at: DateTime<Utc>,
) -> WorkflowResult<AssignedTest> {
    table().check(&test.status, &to)?;
    let mut next = test.clone();
    next.history = test.history.record(StatusChange {
        from: test.status,
        to,
        at,
        actor,
    });
    next.status = to;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StatusHistory;
    use crate::error::ErrorKind;
    use crate::model::ResultStatus;

    fn test_in(status: AssignedTestStatus) -> AssignedTest {
        AssignedTest {
            id: 3,
            examination_id: 1,
            lab_test_id: 2,
            status,
            result_id: None,
            assigned_by: 9,
            assigned_at: Utc::now(),
            history: StatusHistory::new(),
            version: 1,
        }
    }

    fn result_in(status: ResultStatus) -> TestResult {
        let mut result = TestResult::draft(3);
        result.id = 30;
        result.status = status;
        result
    }

    #[test]
    fn cancel_from_open_statuses() {
        for status in [AssignedTestStatus::Pending, AssignedTestStatus::InProgress] {
            let cancelled = cancel(&test_in(status), 9, Utc::now()).unwrap();
            assert_eq!(cancelled.status, AssignedTestStatus::Cancelled);
            assert_eq!(cancelled.history.last().map(|c| c.from), Some(status));
        }
    }

    #[test]
    fn cancel_twice_is_already_finalized() {
        for status in [AssignedTestStatus::Completed, AssignedTestStatus::Cancelled] {
            let err = cancel(&test_in(status), 9, Utc::now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AlreadyFinalized);
        }
    }

    #[test]
    fn submitted_result_completes_test() {
        let test = record_result(
            &test_in(AssignedTestStatus::Pending),
            &result_in(ResultStatus::Submitted),
            9,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(test.status, AssignedTestStatus::Completed);
        assert_eq!(test.result_id, Some(30));
    }

    #[test]
    fn draft_result_moves_test_in_progress() {
        let test = record_result(
            &test_in(AssignedTestStatus::Pending),
            &result_in(ResultStatus::Draft),
            9,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(test.status, AssignedTestStatus::InProgress);

        // Saving the draft again does not add a history entry.
        let again = record_result(&test, &result_in(ResultStatus::Draft), 9, Utc::now()).unwrap();
        assert_eq!(again.history.len(), 1);

        let done = record_result(&again, &result_in(ResultStatus::Reviewed), 9, Utc::now()).unwrap();
        assert_eq!(done.status, AssignedTestStatus::Completed);
        assert_eq!(done.history.len(), 2);
    }

    #[test]
    fn finalized_tests_reject_results() {
        for status in [AssignedTestStatus::Completed, AssignedTestStatus::Cancelled] {
            let err = record_result(
                &test_in(status),
                &result_in(ResultStatus::Submitted),
                9,
                Utc::now(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TestFinalized);
        }
    }
}
