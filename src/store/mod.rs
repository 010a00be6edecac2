//! The persistence collaborator.
//!
//! The engine never owns storage. Every coordinator call receives a store,
//! reads fresh entities through it, and writes the results back. Updates
//! carry the version that was read; a store must refuse the write with
//! [`WorkflowError::ConcurrentModification`](crate::WorkflowError) when the
//! stored version has moved on, and bump the version when it accepts.
//!
//! A coordinator operation may issue several writes. Stores backed by a
//! database should run each operation inside one transaction.

mod memory;

pub use memory::MemoryStore;

use crate::error::WorkflowResult;
use crate::model::{
    AssignedTest, EntityId, Examination, LabTest, Medication, Prescription, TestResult,
};

/// Entity access required by the workflow coordinator.
///
/// Lookups of a missing id fail with `NotFound`.
pub trait WorkflowStore {
    fn examination(&self, id: EntityId) -> WorkflowResult<Examination>;

    fn lab_test(&self, id: EntityId) -> WorkflowResult<LabTest>;

    fn medication(&self, id: EntityId) -> WorkflowResult<Medication>;

    fn assigned_test(&self, id: EntityId) -> WorkflowResult<AssignedTest>;

    /// Every test assigned to an examination, oldest first.
    fn assigned_tests_for_examination(&self, examination_id: EntityId) -> WorkflowResult<Vec<AssignedTest>>;

    fn test_result(&self, id: EntityId) -> WorkflowResult<TestResult>;

    /// The result recorded against an assigned test, linked or not.
    fn result_for_assigned_test(&self, assigned_test_id: EntityId) -> WorkflowResult<Option<TestResult>>;

    /// Every assigned test of `lab_test_id` that belongs to one of the
    /// patient's examinations and has a result, paired with that result.
    fn result_history(
        &self,
        patient_id: EntityId,
        lab_test_id: EntityId,
    ) -> WorkflowResult<Vec<(AssignedTest, TestResult)>>;

    fn prescription(&self, id: EntityId) -> WorkflowResult<Prescription>;

    fn update_examination(&mut self, examination: &Examination) -> WorkflowResult<Examination>;

    /// Persist a new test, assigning its id.
    fn insert_assigned_test(&mut self, test: AssignedTest) -> WorkflowResult<AssignedTest>;

    fn update_assigned_test(&mut self, test: &AssignedTest) -> WorkflowResult<AssignedTest>;

    /// Persist a new result, assigning its id. An assigned test holds at
    /// most one result.
    fn insert_test_result(&mut self, result: TestResult) -> WorkflowResult<TestResult>;

    fn update_test_result(&mut self, result: &TestResult) -> WorkflowResult<TestResult>;

    /// Persist a new prescription, assigning its id.
    fn insert_prescription(&mut self, prescription: Prescription) -> WorkflowResult<Prescription>;

    fn delete_prescription(&mut self, id: EntityId) -> WorkflowResult<()>;
}
