use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One medication line of a prescription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub medication_id: EntityId,
    pub dosage: String,
    pub frequency: String,
    pub duration: Option<String>,
}

/// Medications prescribed during an examination, in the order given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: EntityId,
    pub examination_id: EntityId,
    pub diagnosis: String,
    pub items: Vec<PrescriptionItem>,
    pub prescribed_by: EntityId,
    pub created_at: DateTime<Utc>,
}
