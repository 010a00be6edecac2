//! Examination lifecycle and the operations it gatekeeps.

use crate::config::CompletionPolicy;
use crate::core::{State, StatusChange, TransitionTable};
use crate::error::{EntityKind, WorkflowError, WorkflowResult};
use crate::model::{
    AssignedTest, AssignedTestStatus, EntityId, Examination, ExaminationStatus, LabTest,
    Prescription, PrescriptionItem,
};
use crate::requests::PrescriptionItemRequest;
use crate::validation::{self, FieldCheck};
use chrono::{DateTime, Utc};

/// SCHEDULED -> IN_PROGRESS -> COMPLETED, with CANCELLED reachable from
/// either open status.
pub fn table() -> TransitionTable<ExaminationStatus> {
    use ExaminationStatus::*;
    TransitionTable::new(
        EntityKind::Examination,
        vec![
            (Scheduled, InProgress),
            (Scheduled, Cancelled),
            (InProgress, Completed),
            (InProgress, Cancelled),
        ],
    )
}

/// Move `examination` to `target`.
///
/// `tests` are the examination's assigned tests; they are consulted by the
/// completion policy. The cancellation cascade over those tests is driven by
/// the caller using [`cancellation_targets`].
pub fn transition(
    examination: &Examination,
    target: ExaminationStatus,
    tests: &[AssignedTest],
    policy: CompletionPolicy,
    actor: EntityId,
    at: DateTime<Utc>,
) -> WorkflowResult<Examination> {
    table().check(&examination.status, &target)?;

    if target == ExaminationStatus::Completed && policy == CompletionPolicy::RequireResolvedTests {
        let outstanding: Vec<EntityId> = tests
            .iter()
            .filter(|t| t.status.is_active())
            .map(|t| t.id)
            .collect();
        if !outstanding.is_empty() {
            return Err(WorkflowError::TestsOutstanding {
                id: examination.id,
                outstanding,
            });
        }
    }

    let mut next = examination.clone();
    next.history = examination.history.record(StatusChange {
        from: examination.status,
        to: target,
        at,
        actor,
    });
    next.status = target;
    Ok(next)
}

/// Tests a cancellation must try to cancel: every one not yet terminal.
pub fn cancellation_targets(tests: &[AssignedTest]) -> Vec<&AssignedTest> {
    tests.iter().filter(|t| t.status.is_active()).collect()
}

/// Whether new tests may be ordered.
pub fn ensure_accepts_assignments(examination: &Examination) -> WorkflowResult<()> {
    match examination.status {
        ExaminationStatus::Scheduled | ExaminationStatus::InProgress => Ok(()),
        status => Err(closed(examination.id, status)),
    }
}

/// Order `lab_test` for `examination`, producing an unsaved PENDING test.
///
/// `existing` are the tests already on the examination; a lab test may be
/// re-ordered only once its earlier assignment is cancelled or completed.
pub fn assign_test(
    examination: &Examination,
    lab_test: &LabTest,
    existing: &[AssignedTest],
    actor: EntityId,
    at: DateTime<Utc>,
) -> WorkflowResult<AssignedTest> {
    ensure_accepts_assignments(examination)?;
    if let Some(active) = existing
        .iter()
        .find(|t| t.lab_test_id == lab_test.id && t.status.is_active())
    {
        return Err(WorkflowError::AlreadyAssigned {
            examination_id: examination.id,
            lab_test_id: lab_test.id,
            assigned_test_id: active.id,
        });
    }
    Ok(AssignedTest {
        id: 0,
        examination_id: examination.id,
        lab_test_id: lab_test.id,
        status: AssignedTestStatus::Pending,
        result_id: None,
        assigned_by: actor,
        assigned_at: at,
        history: Default::default(),
        version: 0,
    })
}

/// Build an unsaved prescription for `examination`.
///
/// `is_known_medication` resolves catalog ids. Every missing or unresolved
/// field is reported in one [`WorkflowError::Validation`].
pub fn add_prescription<F>(
    examination: &Examination,
    diagnosis: Option<&str>,
    items: &[PrescriptionItemRequest],
    is_known_medication: F,
    actor: EntityId,
    at: DateTime<Utc>,
) -> WorkflowResult<Prescription>
where
    F: Fn(EntityId) -> bool,
{
    if examination.status == ExaminationStatus::Cancelled {
        return Err(closed(examination.id, examination.status));
    }

    let mut checks: Vec<FieldCheck> = vec![
        validation::require_text("diagnosis", diagnosis),
        validation::ensure("items", !items.is_empty()),
    ];
    for (index, item) in items.iter().enumerate() {
        let field = |name: &str| format!("items[{index}].{name}");
        checks.push(match item.medication_id {
            None => validation::require::<EntityId>(&field("medication_id"), None),
            Some(id) => validation::ensure(&field("medication_id"), is_known_medication(id)),
        });
        checks.push(validation::require_text(&field("dosage"), item.dosage.as_deref()));
        checks.push(validation::require_text(&field("frequency"), item.frequency.as_deref()));
    }
    validation::collect(checks)?;

    let items = items
        .iter()
        .filter_map(|item| {
            Some(PrescriptionItem {
                medication_id: item.medication_id?,
                dosage: item.dosage.as_deref()?.trim().to_string(),
                frequency: item.frequency.as_deref()?.trim().to_string(),
                duration: item
                    .duration
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
            })
        })
        .collect();

    Ok(Prescription {
        id: 0,
        examination_id: examination.id,
        diagnosis: diagnosis.unwrap_or_default().trim().to_string(),
        items,
        prescribed_by: actor,
        created_at: at,
    })
}

/// Prescriptions may be withdrawn only while the examination is open.
pub fn remove_prescription(examination: &Examination) -> WorkflowResult<()> {
    if examination.status.is_active() {
        Ok(())
    } else {
        Err(closed(examination.id, examination.status))
    }
}

fn closed(id: EntityId, status: ExaminationStatus) -> WorkflowError {
    WorkflowError::ExaminationClosed {
        id,
        status: status.name().to_string(),
    }
}
