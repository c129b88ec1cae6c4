//! Application status transitions.
//!
//! Each requested status maps to the statuses it may be entered from and the
//! policy action that guards it. `pending` is never a valid target.

use super::models::ApplicationStatus;
use crate::common::ApiError;
use crate::policy::ApplicationAction;

pub struct Transition {
    pub to: ApplicationStatus,
    pub from: &'static [ApplicationStatus],
    pub action: ApplicationAction,
}

pub static TRANSITIONS: &[Transition] = &[
    Transition {
        to: ApplicationStatus::Accepted,
        from: &[ApplicationStatus::Pending],
        action: ApplicationAction::Accept,
    },
    Transition {
        to: ApplicationStatus::Rejected,
        from: &[ApplicationStatus::Pending],
        action: ApplicationAction::Reject,
    },
    Transition {
        to: ApplicationStatus::Completed,
        from: &[ApplicationStatus::Accepted, ApplicationStatus::Incomplete],
        action: ApplicationAction::Complete,
    },
    Transition {
        to: ApplicationStatus::Incomplete,
        from: &[ApplicationStatus::Accepted],
        action: ApplicationAction::Incomplete,
    },
    Transition {
        to: ApplicationStatus::Withdrawn,
        from: &[ApplicationStatus::Pending, ApplicationStatus::Accepted],
        action: ApplicationAction::Withdraw,
    },
];

impl Transition {
    /// Business-initiated transitions notify the applicant; a withdrawal
    /// notifies the business owner instead.
    pub fn notifies_applicant(&self) -> bool {
        self.action != ApplicationAction::Withdraw
    }

    pub fn check_from(&self, current: ApplicationStatus) -> Result<(), ApiError> {
        if self.from.contains(&current) {
            Ok(())
        } else {
            Err(ApiError::Conflict(format!(
                "cannot move application from {} to {}",
                current.as_str(),
                self.to.as_str()
            )))
        }
    }
}

/// Looks up the transition for a requested status
pub fn transition_for(requested: ApplicationStatus) -> Result<&'static Transition, ApiError> {
    TRANSITIONS
        .iter()
        .find(|t| t.to == requested)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "{} is not a valid target status",
                requested.as_str()
            ))
        })
}

/// Parses free-text input; unknown values are a `BadRequest`
pub fn parse_requested(value: &str) -> Result<ApplicationStatus, ApiError> {
    ApplicationStatus::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown application status: {}", value)))
}
