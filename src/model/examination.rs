use super::EntityId;
use crate::core::StatusHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::status_enum! {
    /// Lifecycle of a clinical examination.
    pub enum ExaminationStatus {
        Scheduled => "SCHEDULED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
    final: [Completed, Cancelled]
}

/// A clinical encounter between one patient and one doctor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Examination {
    pub id: EntityId,
    pub patient_id: EntityId,
    pub doctor_id: EntityId,
    pub status: ExaminationStatus,
    pub exam_date: Option<DateTime<Utc>>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub history: StatusHistory<ExaminationStatus>,
    #[serde(default)]
    pub version: u64,
}

impl Examination {
    /// A freshly scheduled examination, not yet persisted.
    pub fn scheduled(patient_id: EntityId, doctor_id: EntityId, exam_date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: 0,
            patient_id,
            doctor_id,
            status: ExaminationStatus::Scheduled,
            exam_date,
            symptoms: None,
            diagnosis: None,
            notes: None,
            history: StatusHistory::new(),
            version: 0,
        }
    }
}
