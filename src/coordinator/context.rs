//! Caller identity passed explicitly into every coordinator call.

use crate::error::{WorkflowError, WorkflowResult};
use crate::model::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Technician,
    Reviewer,
    Administrator,
}

/// Operations subject to a role check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    AssignTests,
    CancelTest,
    EnterResult,
    ReviewResult,
    ChangeExaminationStatus,
    Prescribe,
    Interpret,
}

impl Action {
    pub fn permits(&self, role: Role) -> bool {
        use Role::*;
        match (self, role) {
            (_, Administrator) => true,
            (Self::AssignTests | Self::CancelTest | Self::Prescribe, Doctor) => true,
            (Self::EnterResult, Technician) => true,
            (Self::ReviewResult, Reviewer | Doctor) => true,
            (Self::ChangeExaminationStatus, Doctor | Technician) => true,
            (Self::Interpret, _) => true,
            _ => false,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::AssignTests => "assign tests",
            Self::CancelTest => "cancel tests",
            Self::EnterResult => "enter results",
            Self::ReviewResult => "review results",
            Self::ChangeExaminationStatus => "change examination status",
            Self::Prescribe => "manage prescriptions",
            Self::Interpret => "interpret results",
        }
    }
}

/// The authenticated user behind a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: EntityId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: EntityId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Who is calling and when.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RequestContext {
    pub actor: Actor,
    /// Timestamp applied to every change made by the request.
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        Self::at(actor, Utc::now())
    }

    pub fn at(actor: Actor, now: DateTime<Utc>) -> Self {
        Self { actor, now }
    }

    pub fn user_id(&self) -> EntityId {
        self.actor.user_id
    }

    pub(crate) fn authorize(&self, action: Action, enforce: bool) -> WorkflowResult<()> {
        if !enforce || action.permits(self.actor.role) {
            return Ok(());
        }
        tracing::warn!(user = self.actor.user_id, role = ?self.actor.role, ?action, "operation refused");
        Err(WorkflowError::Forbidden {
            role: format!("{:?}", self.actor.role).to_lowercase(),
            action: action.describe().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_may_do_everything() {
        for action in [
            Action::AssignTests,
            Action::CancelTest,
            Action::EnterResult,
            Action::ReviewResult,
            Action::ChangeExaminationStatus,
            Action::Prescribe,
            Action::Interpret,
        ] {
            assert!(action.permits(Role::Administrator), "{action:?}");
        }
    }

    #[test]
    fn technicians_enter_but_do_not_review() {
        assert!(Action::EnterResult.permits(Role::Technician));
        assert!(!Action::ReviewResult.permits(Role::Technician));
        assert!(!Action::Prescribe.permits(Role::Technician));
        assert!(Action::ReviewResult.permits(Role::Reviewer));
        assert!(!Action::EnterResult.permits(Role::Doctor));
    }

    #[test]
    fn authorize_reports_role_and_action() {
        let ctx = RequestContext::new(Actor::new(3, Role::Technician));
        let err = ctx.authorize(Action::Prescribe, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Role technician may not manage prescriptions"
        );
        assert!(ctx.authorize(Action::Prescribe, false).is_ok());
    }
}
