//! Accumulating field validation.
//!
//! Input checks use stillwater's `Validation` so that a request with several
//! problems reports all of them at once instead of the first one only. The
//! accumulated failures are folded into a single
//! [`WorkflowError::Validation`] at the boundary.

use crate::error::{FieldError, WorkflowError, WorkflowResult};
use chrono::{DateTime, NaiveDate, Utc};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of one field check.
pub type FieldCheck = Validation<(), NonEmptyVec<FieldError>>;

/// Passes when `value` holds non-blank text.
pub fn require_text(field: &str, value: Option<&str>) -> FieldCheck {
    match value {
        Some(text) if !text.trim().is_empty() => Validation::success(()),
        _ => Validation::fail(FieldError::missing(field)),
    }
}

/// Passes when `value` is present.
pub fn require<T>(field: &str, value: Option<&T>) -> FieldCheck {
    if value.is_some() {
        Validation::success(())
    } else {
        Validation::fail(FieldError::missing(field))
    }
}

/// Passes when `condition` holds, otherwise reports `field` as malformed.
pub fn ensure(field: &str, condition: bool) -> FieldCheck {
    if condition {
        Validation::success(())
    } else {
        Validation::fail(FieldError::malformed(field))
    }
}

/// Fold every check, reporting ALL failing fields together.
pub fn collect(checks: Vec<FieldCheck>) -> WorkflowResult<()> {
    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(WorkflowError::Validation(
            errors.iter().cloned().collect(),
        )),
    }
}

/// Parse an ISO-8601 boundary date.
///
/// Accepts RFC 3339 date-times and plain `YYYY-MM-DD` dates, the latter
/// taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse an optional boundary date field.
///
/// Absent or blank input is `Ok(None)`; present but unparseable input is a
/// validation failure naming `field`.
pub fn parse_optional_timestamp(field: &str, raw: Option<&str>) -> WorkflowResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| WorkflowError::Validation(vec![FieldError::malformed(field)])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldProblem;
    use chrono::TimeZone;

    #[test]
    fn collect_accumulates_all_failures() {
        let result = collect(vec![
            require_text("diagnosis", Some("  ")),
            require_text("dosage", Some("5 mg")),
            require::<i64>("medication_id", None),
            ensure("duration", false),
        ]);

        match result {
            Err(WorkflowError::Validation(fields)) => {
                assert_eq!(fields.len(), 3);
                assert_eq!(fields[0], FieldError::missing("diagnosis"));
                assert_eq!(fields[1], FieldError::missing("medication_id"));
                assert_eq!(fields[2].problem, FieldProblem::Malformed);
            }
            other => panic!("Expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn collect_succeeds_when_all_checks_pass() {
        let result = collect(vec![
            require_text("frequency", Some("twice daily")),
            require("medication_id", Some(&3)),
            ensure("items", true),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn collect_of_nothing_succeeds() {
        assert!(collect(Vec::new()).is_ok());
    }

    #[test]
    fn parses_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_timestamp("2024-05-02T10:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp(" 2024-05-02 "),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("02/05/2024"), None);
    }

    #[test]
    fn optional_timestamp_distinguishes_absent_from_malformed() {
        assert_eq!(parse_optional_timestamp("result_date", None), Ok(None));
        assert_eq!(parse_optional_timestamp("result_date", Some("")), Ok(None));

        let err = parse_optional_timestamp("result_date", Some("yesterday")).unwrap_err();
        assert_eq!(err.fields(), vec!["result_date"]);
    }
}
