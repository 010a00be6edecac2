use super::EntityId;
use crate::core::StatusHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::status_enum! {
    /// Lifecycle of one lab test ordered for an examination.
    pub enum AssignedTestStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
    final: [Completed, Cancelled]
}

/// One catalog [`LabTest`](super::LabTest) ordered for a specific examination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignedTest {
    pub id: EntityId,
    pub examination_id: EntityId,
    pub lab_test_id: EntityId,
    pub status: AssignedTestStatus,
    /// The single result entered for this test, once there is one.
    pub result_id: Option<EntityId>,
    pub assigned_by: EntityId,
    pub assigned_at: DateTime<Utc>,
    #[serde(default)]
    pub history: StatusHistory<AssignedTestStatus>,
    #[serde(default)]
    pub version: u64,
}
