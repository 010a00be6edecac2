//! Error types returned by workflow operations.

use crate::model::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result alias used across the engine.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Entity families the engine reasons about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    LabTest,
    Medication,
    Examination,
    AssignedTest,
    TestResult,
    Prescription,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Patient => "patient",
            Self::LabTest => "lab test",
            Self::Medication => "medication",
            Self::Examination => "examination",
            Self::AssignedTest => "assigned test",
            Self::TestResult => "test result",
            Self::Prescription => "prescription",
        };
        f.write_str(name)
    }
}

/// What is wrong with a single input field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldProblem {
    Missing,
    Malformed,
}

/// One rejected input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub problem: FieldProblem,
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: FieldProblem::Missing,
        }
    }

    pub fn malformed(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: FieldProblem::Malformed,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is missing", self.field),
            FieldProblem::Malformed => write!(f, "{} is malformed", self.field),
        }
    }
}

/// Coarse classification of [`WorkflowError`] for the API adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    AlreadyFinalized,
    TestFinalized,
    NotSubmitted,
    ResultLocked,
    ExaminationClosed,
    TestsOutstanding,
    AlreadyAssigned,
    ConcurrentModification,
    NotFound,
    Forbidden,
    Storage,
}

/// Errors produced by workflow operations.
///
/// Every variant is a per-call failure; none is fatal to the process.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        entity: EntityKind,
        from: String,
        to: String,
    },

    #[error("Assigned test {id} is already {status}")]
    AlreadyFinalized { id: EntityId, status: String },

    #[error("Assigned test {id} is {status} and accepts no results")]
    TestFinalized { id: EntityId, status: String },

    #[error("Test result {id} is {status}, only submitted results can be reviewed")]
    NotSubmitted { id: EntityId, status: String },

    #[error("Test result {id} has been reviewed and is locked")]
    ResultLocked { id: EntityId },

    #[error("Examination {id} is {status}")]
    ExaminationClosed { id: EntityId, status: String },

    #[error("Examination {id} still has open tests: {outstanding:?}")]
    TestsOutstanding {
        id: EntityId,
        outstanding: Vec<EntityId>,
    },

    #[error("Lab test {lab_test_id} is already assigned to examination {examination_id} as test {assigned_test_id}")]
    AlreadyAssigned {
        examination_id: EntityId,
        lab_test_id: EntityId,
        assigned_test_id: EntityId,
    },

    #[error("{entity} {id} was modified concurrently, reload and retry")]
    ConcurrentModification { entity: EntityKind, id: EntityId },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: EntityId },

    #[error("Role {role} may not {action}")]
    Forbidden { role: String, action: String },

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::AlreadyFinalized { .. } => ErrorKind::AlreadyFinalized,
            Self::TestFinalized { .. } => ErrorKind::TestFinalized,
            Self::NotSubmitted { .. } => ErrorKind::NotSubmitted,
            Self::ResultLocked { .. } => ErrorKind::ResultLocked,
            Self::ExaminationClosed { .. } => ErrorKind::ExaminationClosed,
            Self::TestsOutstanding { .. } => ErrorKind::TestsOutstanding,
            Self::AlreadyAssigned { .. } => ErrorKind::AlreadyAssigned,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Only a stale read is worth retrying after a reload.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    /// Field names carried by a validation failure.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Validation(fields) => fields.iter().map(|f| f.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
