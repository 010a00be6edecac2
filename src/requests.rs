//! Request and response shapes exchanged with the API adapter.
//!
//! Inputs are deliberately loose (`Option` everywhere a form may leave a
//! field blank) so that validation can name every missing field at once.

use crate::error::ErrorKind;
use crate::interpretation::{Classification, TrendReport};
use crate::model::{
    AssignedTest, EntityId, Examination, ExaminationStatus, ResultStatus, TestResult,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignTestsRequest {
    pub examination_id: EntityId,
    pub lab_test_ids: Vec<EntityId>,
}

/// A lab test that could not be assigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignmentFailure {
    pub lab_test_id: EntityId,
    pub kind: ErrorKind,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignTestsResponse {
    pub created: Vec<AssignedTest>,
    pub failed: Vec<AssignmentFailure>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnterResultRequest {
    pub assigned_test_id: EntityId,
    pub result_data: Option<String>,
    pub notes: Option<String>,
    /// ISO-8601; defaults to the request time.
    pub result_date: Option<String>,
    /// Defaults to SUBMITTED.
    pub status: Option<ResultStatus>,
}

/// Outcome of entering a result: the persisted entities plus interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub result: TestResult,
    pub assigned_test: AssignedTest,
    pub classification: Classification,
    pub trend: TrendReport,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewResultRequest {
    pub result_id: EntityId,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateExaminationStatusRequest {
    pub examination_id: EntityId,
    pub status: ExaminationStatus,
}

/// A test the cancellation cascade could not cancel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeFailure {
    pub assigned_test_id: EntityId,
    pub kind: ErrorKind,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExaminationUpdate {
    pub examination: Examination,
    /// Tests cancelled by the cascade; empty unless the target was CANCELLED.
    pub cancelled_tests: Vec<AssignedTest>,
    pub failed_tests: Vec<CascadeFailure>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionItemRequest {
    pub medication_id: Option<EntityId>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePrescriptionRequest {
    pub examination_id: EntityId,
    pub diagnosis: Option<String>,
    pub items: Vec<PrescriptionItemRequest>,
}

/// Classification and trend for a stored result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub result_id: EntityId,
    pub classification: Classification,
    pub trend: TrendReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_result_request_accepts_minimal_payload() {
        let request: EnterResultRequest =
            serde_json::from_str(r#"{"assigned_test_id": 4, "result_data": "120"}"#).unwrap();
        assert_eq!(request.assigned_test_id, 4);
        assert_eq!(request.result_data.as_deref(), Some("120"));
        assert!(request.status.is_none());
        assert!(request.result_date.is_none());
    }

    #[test]
    fn legacy_pending_status_is_accepted() {
        let request: EnterResultRequest =
            serde_json::from_str(r#"{"assigned_test_id": 1, "status": "PENDING"}"#).unwrap();
        assert_eq!(request.status, Some(ResultStatus::Draft));
    }
}
