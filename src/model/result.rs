use super::EntityId;
use crate::core::StatusHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::status_enum! {
    /// Review lifecycle of a test result.
    ///
    /// `DRAFT` is the single pre-submission state; older payloads that say
    /// `PENDING` deserialize to it.
    pub enum ResultStatus {
        #[serde(alias = "PENDING")]
        Draft => "DRAFT",
        Submitted => "SUBMITTED",
        Reviewed => "REVIEWED",
    }
    final: [Reviewed]
}

impl ResultStatus {
    /// Whether a result in this status completes its assigned test.
    pub fn completes_test(&self) -> bool {
        matches!(self, Self::Submitted | Self::Reviewed)
    }
}

/// A measured value entered by a technician for one assigned test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: EntityId,
    pub assigned_test_id: EntityId,
    pub status: ResultStatus,
    /// The value exactly as entered; numeric interpretation happens later.
    pub result_data: Option<String>,
    pub notes: Option<String>,
    /// Reviewer's remark.
    pub comment: Option<String>,
    pub result_date: Option<DateTime<Utc>>,
    pub technician_id: Option<EntityId>,
    pub reviewer_id: Option<EntityId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: StatusHistory<ResultStatus>,
    #[serde(default)]
    pub version: u64,
}

impl TestResult {
    /// An empty draft for `assigned_test_id`, not yet persisted.
    pub fn draft(assigned_test_id: EntityId) -> Self {
        Self {
            id: 0,
            assigned_test_id,
            status: ResultStatus::Draft,
            result_data: None,
            notes: None,
            comment: None,
            result_date: None,
            technician_id: None,
            reviewer_id: None,
            reviewed_at: None,
            history: StatusHistory::new(),
            version: 0,
        }
    }
}
