//! Core State trait for workflow statuses.
//!
//! Every status enum in the engine (examination, assigned test, result)
//! implements this trait, which provides pure methods for inspecting a
//! status without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for workflow statuses.
///
/// All methods are pure. A status is an immutable value describing where
/// an entity currently sits in its lifecycle.
///
/// # Required Traits
///
/// - `Clone`: statuses are copied into history records
/// - `PartialEq`: statuses are compared against transition tables
/// - `Debug`: statuses appear in diagnostics
/// - `Serialize` + `Deserialize`: statuses are persisted with their entity
///
/// Implementations are normally generated by
/// [`status_enum!`](crate::status_enum).
///
/// # Example
///
/// ```rust
/// use labflow::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum SpecimenStatus {
///     Collected,
///     Received,
///     Discarded,
/// }
///
/// impl State for SpecimenStatus {
///     fn name(&self) -> &str {
///         match self {
///             Self::Collected => "COLLECTED",
///             Self::Received => "RECEIVED",
///             Self::Discarded => "DISCARDED",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Discarded)
///     }
/// }
///
/// assert!(SpecimenStatus::Collected.is_active());
/// assert!(!SpecimenStatus::Discarded.is_active());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the status name used on the wire and in logs.
    fn name(&self) -> &str;

    /// Check if this is a terminal status.
    ///
    /// No transition leaves a terminal status.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if the entity is still open for work.
    fn is_active(&self) -> bool {
        !self.is_final()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestStatus {
        Waiting,
        Running,
        Done,
        Dropped,
    }

    impl State for TestStatus {
        fn name(&self) -> &str {
            match self {
                Self::Waiting => "WAITING",
                Self::Running => "RUNNING",
                Self::Done => "DONE",
                Self::Dropped => "DROPPED",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Done | Self::Dropped)
        }
    }

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Bare;

    impl State for Bare {
        fn name(&self) -> &str {
            "BARE"
        }
    }

    #[test]
    fn name_returns_wire_label() {
        assert_eq!(TestStatus::Waiting.name(), "WAITING");
        assert_eq!(TestStatus::Running.name(), "RUNNING");
        assert_eq!(TestStatus::Done.name(), "DONE");
        assert_eq!(TestStatus::Dropped.name(), "DROPPED");
    }

    #[test]
    fn is_final_identifies_terminal_statuses() {
        assert!(!TestStatus::Waiting.is_final());
        assert!(!TestStatus::Running.is_final());
        assert!(TestStatus::Done.is_final());
        assert!(TestStatus::Dropped.is_final());
    }

    #[test]
    fn is_active_is_complement_of_final() {
        assert!(TestStatus::Waiting.is_active());
        assert!(TestStatus::Running.is_active());
        assert!(!TestStatus::Done.is_active());
    }

    #[test]
    fn defaults_treat_status_as_open() {
        assert!(!Bare.is_final());
        assert!(Bare.is_active());
    }
}
