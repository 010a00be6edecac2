use super::EntityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Female,
    Male,
    Other,
}

/// A registered patient.
///
/// Patients are never deleted; `archived` hides them from active lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: EntityId,
    pub medical_record_number: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
    #[serde(default)]
    pub archived: bool,
}

impl Patient {
    pub fn new(medical_record_number: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            medical_record_number: medical_record_number.into(),
            full_name: full_name.into(),
            birth_date: None,
            sex: None,
            archived: false,
        }
    }
}
