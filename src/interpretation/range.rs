//! Reference range evaluation.

use crate::model::ReferenceRange;
use serde::{Deserialize, Serialize};

/// Where a value falls relative to its reference range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Below,
    Within,
    Above,
    /// The value is missing or not a number, or there is no usable range.
    Unclassified,
}

impl Classification {
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::Below | Self::Above)
    }
}

/// Parse an entered value as a finite number.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classify `value` against an inclusive range.
///
/// ```
/// use labflow::interpretation::{classify, Classification};
/// use labflow::model::ReferenceRange;
///
/// let range = ReferenceRange::new(70.0, 140.0).unwrap();
/// assert_eq!(classify(Some(70.0), &range), Classification::Within);
/// assert_eq!(classify(Some(150.0), &range), Classification::Above);
/// assert_eq!(classify(None, &range), Classification::Unclassified);
/// ```
pub fn classify(value: Option<f64>, range: &ReferenceRange) -> Classification {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return Classification::Unclassified;
    };
    if !range.is_valid() {
        return Classification::Unclassified;
    }
    if value < range.min {
        Classification::Below
    } else if value > range.max {
        Classification::Above
    } else {
        Classification::Within
    }
}

/// Classify a raw entered value against an optional range.
pub fn classify_raw(raw: Option<&str>, range: Option<&ReferenceRange>) -> Classification {
    match range {
        Some(range) => classify(raw.and_then(parse_value), range),
        None => Classification::Unclassified,
    }
}
