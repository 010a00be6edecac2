//! Canonical entity shapes.
//!
//! One field per concept. The only legacy spelling still accepted is
//! `PENDING` for a draft result.

mod assigned_test;
mod catalog;
mod examination;
mod patient;
mod prescription;
mod result;

pub use assigned_test::{AssignedTest, AssignedTestStatus};
pub use catalog::{LabTest, Medication, ReferenceRange};
pub use examination::{Examination, ExaminationStatus};
pub use patient::{Patient, Sex};
pub use prescription::{Prescription, PrescriptionItem};
pub use result::{ResultStatus, TestResult};

/// Integer identity shared by every entity.
pub type EntityId = i64;
