//! Workflow coordinator: the entry points used by the API layer.
//!
//! The coordinator is stateless between calls. Each operation loads fresh
//! entities from the injected [`WorkflowStore`], applies the matching status
//! machine operation, writes the outcome back, and returns the updated
//! entity or a typed [`WorkflowError`]. Bulk operations collect per-item
//! failures instead of aborting.

mod context;

pub use context::{Action, Actor, RequestContext, Role};

use crate::config::WorkflowConfig;
use crate::core::State;
use crate::error::{EntityKind, WorkflowError, WorkflowResult};
use crate::interpretation::{classify_raw, Classification, TrendReport};
use crate::machines::result::ResultChanges;
use crate::machines::{assigned_test, examination, result};
use crate::model::{
    AssignedTest, AssignedTestStatus, EntityId, Examination, ExaminationStatus, Prescription,
    ResultStatus, TestResult,
};
use crate::requests::{
    AssignTestsRequest, AssignTestsResponse, AssignmentFailure, CascadeFailure,
    CreatePrescriptionRequest, EnterResultRequest, ExaminationUpdate, Interpretation,
    ResultEntry, ReviewResultRequest, UpdateExaminationStatusRequest,
};
use crate::store::WorkflowStore;
use crate::validation;
use std::collections::HashSet;

/// Orchestrates the examination, assigned test and result machines.
#[derive(Clone, Debug, Default)]
pub struct Coordinator {
    config: WorkflowConfig,
}

impl Coordinator {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    fn authorize(&self, ctx: &RequestContext, action: Action) -> WorkflowResult<()> {
        ctx.authorize(action, self.config.enforce_roles)
    }

    /// Order catalog tests for an examination.
    ///
    /// A closed examination fails the whole call with `ExaminationClosed`.
    /// Otherwise each lab test is assigned independently; unknown lab tests
    /// and ones already open on the examination are reported in `failed`.
    pub fn assign_tests<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        request: &AssignTestsRequest,
    ) -> WorkflowResult<AssignTestsResponse> {
        self.authorize(ctx, Action::AssignTests)?;
        let exam = store.examination(request.examination_id)?;
        examination::ensure_accepts_assignments(&exam)?;
        let mut existing = store.assigned_tests_for_examination(exam.id)?;

        let mut response = AssignTestsResponse::default();
        for &lab_test_id in &request.lab_test_ids {
            let assigned = store
                .lab_test(lab_test_id)
                .and_then(|lab| {
                    examination::assign_test(&exam, &lab, &existing, ctx.user_id(), ctx.now)
                })
                .and_then(|test| store.insert_assigned_test(test));

            match assigned {
                Ok(test) => {
                    existing.push(test.clone());
                    tracing::info!(
                        examination = exam.id,
                        lab_test = lab_test_id,
                        assigned_test = test.id,
                        "test assigned"
                    );
                    response.created.push(test);
                }
                Err(err) => {
                    tracing::warn!(examination = exam.id, lab_test = lab_test_id, %err, "assignment failed");
                    response.failed.push(AssignmentFailure {
                        lab_test_id,
                        kind: err.kind(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(response)
    }

    /// Enter or amend the result of an assigned test.
    ///
    /// The first entry creates the result; later entries update it until it
    /// has been reviewed. A final result (SUBMITTED, the default, or REVIEWED)
    /// completes the test; a DRAFT leaves it IN_PROGRESS.
    pub fn enter_result<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        request: &EnterResultRequest,
    ) -> WorkflowResult<ResultEntry> {
        self.authorize(ctx, Action::EnterResult)?;
        let target = request.status.unwrap_or(ResultStatus::Submitted);
        if target == ResultStatus::Reviewed {
            self.authorize(ctx, Action::ReviewResult)?;
        }

        let test = store.assigned_test(request.assigned_test_id)?;
        let exam = store.examination(test.examination_id)?;
        if exam.status == ExaminationStatus::Cancelled {
            return Err(WorkflowError::ExaminationClosed {
                id: exam.id,
                status: exam.status.to_string(),
            });
        }

        let existing = match test.result_id {
            Some(result_id) => {
                // Completed tests still take corrections until the result is reviewed.
                if test.status == AssignedTestStatus::Cancelled {
                    assigned_test::ensure_accepts_results(&test)?;
                }
                Some(store.test_result(result_id)?)
            }
            None => {
                assigned_test::ensure_accepts_results(&test)?;
                // A result saved by an earlier call that failed before linking.
                store.result_for_assigned_test(test.id)?
            }
        };

        let result_date = validation::parse_optional_timestamp(
            "result_date",
            request.result_date.as_deref(),
        )?
        .or(existing.as_ref().and_then(|r| r.result_date))
        .unwrap_or(ctx.now);

        let changes = ResultChanges {
            result_data: non_blank(request.result_data.as_deref()),
            notes: non_blank(request.notes.as_deref()),
            result_date: Some(result_date),
            technician_id: Some(ctx.user_id()),
        };
        let base = existing.clone().unwrap_or_else(|| TestResult::draft(test.id));
        let edited = result::update(&base, changes)?;
        let advanced = advance(&edited, target, ctx)?;

        let (saved_result, saved_test) = match existing {
            None => {
                let saved = store.insert_test_result(advanced)?;
                let linked = assigned_test::record_result(&test, &saved, ctx.user_id(), ctx.now)?;
                let saved_test = store.update_assigned_test(&linked)?;
                (saved, saved_test)
            }
            Some(_) => {
                let saved = store.update_test_result(&advanced)?;
                let saved_test = if test.status.is_active() {
                    let linked = assigned_test::record_result(&test, &saved, ctx.user_id(), ctx.now)?;
                    if linked == test {
                        test
                    } else {
                        store.update_assigned_test(&linked)?
                    }
                } else {
                    test
                };
                (saved, saved_test)
            }
        };

        tracing::info!(
            assigned_test = saved_test.id,
            result = saved_result.id,
            status = %saved_result.status,
            test_status = %saved_test.status,
            "result entered"
        );

        let (classification, trend) = self.interpret(store, &exam, &saved_test, &saved_result)?;
        Ok(ResultEntry {
            result: saved_result,
            assigned_test: saved_test,
            classification,
            trend,
        })
    }

    /// Review a submitted result.
    pub fn review_result<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        request: &ReviewResultRequest,
    ) -> WorkflowResult<TestResult> {
        self.authorize(ctx, Action::ReviewResult)?;
        let current = store.test_result(request.result_id)?;
        let reviewed = result::review(&current, ctx.user_id(), request.comment.as_deref(), ctx.now)
            .inspect_err(|err| tracing::warn!(result = current.id, %err, "review refused"))?;
        let saved = store.update_test_result(&reviewed)?;

        let test = store.assigned_test(saved.assigned_test_id)?;
        if test.status.is_active() {
            let completed = assigned_test::record_result(&test, &saved, ctx.user_id(), ctx.now)?;
            store.update_assigned_test(&completed)?;
        }

        tracing::info!(result = saved.id, reviewer = ctx.user_id(), "result reviewed");
        Ok(saved)
    }

    /// Move an examination to `status`.
    ///
    /// Cancelling cascades to every open assigned test; a test that cannot be
    /// cancelled is reported in `failed_tests` and does not undo the
    /// examination's cancellation.
    pub fn update_examination_status<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        request: &UpdateExaminationStatusRequest,
    ) -> WorkflowResult<ExaminationUpdate> {
        self.authorize(ctx, Action::ChangeExaminationStatus)?;
        let current = store.examination(request.examination_id)?;
        let tests = store.assigned_tests_for_examination(current.id)?;

        let next = examination::transition(
            &current,
            request.status,
            &tests,
            self.config.completion_policy,
            ctx.user_id(),
            ctx.now,
        )
        .inspect_err(|err| tracing::warn!(examination = current.id, %err, "transition refused"))?;
        let saved = store.update_examination(&next)?;
        tracing::info!(
            examination = saved.id,
            from = %current.status,
            to = %saved.status,
            "examination status changed"
        );

        let mut update = ExaminationUpdate {
            examination: saved,
            cancelled_tests: Vec::new(),
            failed_tests: Vec::new(),
        };
        if request.status == ExaminationStatus::Cancelled {
            for test in examination::cancellation_targets(&tests) {
                match cancel_one(store, ctx, test) {
                    Ok(cancelled) => update.cancelled_tests.push(cancelled),
                    Err(err) => {
                        tracing::warn!(assigned_test = test.id, %err, "cascade cancellation failed");
                        update.failed_tests.push(CascadeFailure {
                            assigned_test_id: test.id,
                            kind: err.kind(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }
        Ok(update)
    }

    /// Cancel a single assigned test.
    pub fn cancel_assigned_test<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        assigned_test_id: EntityId,
    ) -> WorkflowResult<AssignedTest> {
        self.authorize(ctx, Action::CancelTest)?;
        let test = store.assigned_test(assigned_test_id)?;
        cancel_one(store, ctx, &test)
            .inspect_err(|err| tracing::warn!(assigned_test = test.id, %err, "cancellation refused"))
    }

    /// Prescribe medications for an examination.
    pub fn create_prescription<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        request: &CreatePrescriptionRequest,
    ) -> WorkflowResult<Prescription> {
        self.authorize(ctx, Action::Prescribe)?;
        let exam = store.examination(request.examination_id)?;

        let mut known = HashSet::new();
        for id in request.items.iter().filter_map(|item| item.medication_id) {
            match store.medication(id) {
                Ok(_) => {
                    known.insert(id);
                }
                Err(WorkflowError::NotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        let prescription = examination::add_prescription(
            &exam,
            request.diagnosis.as_deref(),
            &request.items,
            |id| known.contains(&id),
            ctx.user_id(),
            ctx.now,
        )
        .inspect_err(|err| tracing::warn!(examination = exam.id, %err, "prescription refused"))?;
        let saved = store.insert_prescription(prescription)?;
        tracing::info!(
            examination = exam.id,
            prescription = saved.id,
            items = saved.items.len(),
            "prescription created"
        );
        Ok(saved)
    }

    /// Withdraw a prescription while its examination is still open.
    pub fn delete_prescription<S: WorkflowStore>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
        prescription_id: EntityId,
    ) -> WorkflowResult<()> {
        self.authorize(ctx, Action::Prescribe)?;
        let prescription = store.prescription(prescription_id)?;
        let exam = store.examination(prescription.examination_id)?;
        examination::remove_prescription(&exam)?;
        store.delete_prescription(prescription_id)?;
        tracing::info!(examination = exam.id, prescription = prescription_id, "prescription deleted");
        Ok(())
    }

    /// Classification and trend for a stored result.
    pub fn interpret_result<S: WorkflowStore>(
        &self,
        store: &S,
        ctx: &RequestContext,
        result_id: EntityId,
    ) -> WorkflowResult<Interpretation> {
        self.authorize(ctx, Action::Interpret)?;
        let stored = store.test_result(result_id)?;
        let test = store.assigned_test(stored.assigned_test_id)?;
        let exam = store.examination(test.examination_id)?;
        let (classification, trend) = self.interpret(store, &exam, &test, &stored)?;
        Ok(Interpretation {
            result_id,
            classification,
            trend,
        })
    }

    fn interpret<S: WorkflowStore>(
        &self,
        store: &S,
        exam: &Examination,
        test: &AssignedTest,
        stored: &TestResult,
    ) -> WorkflowResult<(Classification, TrendReport)> {
        let lab = store.lab_test(test.lab_test_id)?;
        let value = stored.result_data.as_deref();
        let classification = classify_raw(value, lab.reference_range.as_ref());

        let analyzer = self.config.trend_analyzer();
        let candidates = store.result_history(exam.patient_id, lab.id)?;
        let trend = analyzer.analyze(value, analyzer.select_priors(test.id, &candidates));

        tracing::debug!(result = stored.id, lab_test = lab.id, ?classification, "result interpreted");
        Ok((classification, trend))
    }
}

/// Re-validate against the loaded test and write the cancellation.
fn cancel_one<S: WorkflowStore>(
    store: &mut S,
    ctx: &RequestContext,
    test: &AssignedTest,
) -> WorkflowResult<AssignedTest> {
    let cancelled = assigned_test::cancel(test, ctx.user_id(), ctx.now)?;
    let saved = store.update_assigned_test(&cancelled)?;
    tracing::info!(assigned_test = saved.id, examination = saved.examination_id, "test cancelled");
    Ok(saved)
}

/// Walk a result forward to `target`.
fn advance(current: &TestResult, target: ResultStatus, ctx: &RequestContext) -> WorkflowResult<TestResult> {
    match (current.status, target) {
        (from, to) if from == to => Ok(current.clone()),
        (ResultStatus::Draft, ResultStatus::Submitted) => result::submit(current, ctx.user_id(), ctx.now),
        (ResultStatus::Draft, ResultStatus::Reviewed) => {
            let submitted = result::submit(current, ctx.user_id(), ctx.now)?;
            result::review(&submitted, ctx.user_id(), None, ctx.now)
        }
        (ResultStatus::Submitted, ResultStatus::Reviewed) => {
            result::review(current, ctx.user_id(), None, ctx.now)
        }
        (from, to) => Err(WorkflowError::InvalidTransition {
            entity: EntityKind::TestResult,
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
