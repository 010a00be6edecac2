//! Catalog entries owned by lab and pharmacy administration.

use super::EntityId;
use crate::error::{FieldError, WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` interval considered clinically normal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    /// Build a range, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64) -> WorkflowResult<Self> {
        let range = Self { min, max };
        if range.is_valid() {
            Ok(range)
        } else {
            Err(WorkflowError::Validation(vec![FieldError::malformed(
                "reference_range",
            )]))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A laboratory test that doctors can order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: EntityId,
    pub name: String,
    pub unit: Option<String>,
    pub reference_range: Option<ReferenceRange>,
}

impl LabTest {
    pub fn new(name: impl Into<String>, unit: Option<&str>, reference_range: Option<ReferenceRange>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            unit: unit.map(str::to_string),
            reference_range,
        }
    }
}

/// A prescribable medication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: EntityId,
    pub name: String,
    pub form: Option<String>,
}

impl Medication {
    pub fn new(name: impl Into<String>, form: Option<&str>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            form: form.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_inverted_and_non_finite_bounds() {
        assert!(ReferenceRange::new(70.0, 140.0).is_ok());
        assert!(ReferenceRange::new(5.0, 5.0).is_ok());

        let err = ReferenceRange::new(140.0, 70.0).unwrap_err();
        assert_eq!(err.fields(), vec!["reference_range"]);
        assert!(ReferenceRange::new(f64::NAN, 1.0).is_err());
        assert!(ReferenceRange::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn range_contains_its_bounds() {
        let range = ReferenceRange::new(3.5, 5.1).unwrap();
        assert!(range.contains(3.5));
        assert!(range.contains(5.1));
        assert!(!range.contains(5.11));
    }
}
