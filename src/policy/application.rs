use super::{evaluate, owns, Rule};
use crate::applications::models::UserApplicationQuery;
use crate::auth::models::{User, UserRole};
use crate::businesses::models::Business;
use crate::common::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationAction {
    Create,
    /// Applications of one post, as the business sees them
    ReadForPost,
    /// Applications of one user, as the applicant sees them
    ReadForUser,
    Accept,
    Reject,
    Complete,
    Incomplete,
    Withdraw,
}

impl ApplicationAction {
    pub const ALL: [ApplicationAction; 8] = [
        ApplicationAction::Create,
        ApplicationAction::ReadForPost,
        ApplicationAction::ReadForUser,
        ApplicationAction::Accept,
        ApplicationAction::Reject,
        ApplicationAction::Complete,
        ApplicationAction::Incomplete,
        ApplicationAction::Withdraw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationAction::Create => "create",
            ApplicationAction::ReadForPost => "read",
            ApplicationAction::ReadForUser => "read_user",
            ApplicationAction::Accept => "accept",
            ApplicationAction::Reject => "reject",
            ApplicationAction::Complete => "complete",
            ApplicationAction::Incomplete => "incomplete",
            ApplicationAction::Withdraw => "withdraw",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ApplicationContext<'a> {
    pub business: Option<&'a Business>,
    pub applicant_id: Option<&'a str>,
    pub query: Option<&'a UserApplicationQuery>,
}

pub type ApplicationCheck = fn(&User, &ApplicationContext<'_>) -> bool;

fn always(_: &User, _: &ApplicationContext<'_>) -> bool {
    true
}

fn is_applicant(user: &User, ctx: &ApplicationContext<'_>) -> bool {
    ctx.applicant_id == Some(user.id.as_str())
}

fn owns_business(user: &User, ctx: &ApplicationContext<'_>) -> bool {
    ctx.business.is_some_and(|b| owns(user, &b.user_id))
}

fn filters_own_applications(user: &User, ctx: &ApplicationContext<'_>) -> bool {
    ctx.query
        .is_some_and(|q| q.user_id.as_deref() == Some(user.id.as_str()))
}

pub static APPLICATION_RULES: &[Rule<ApplicationAction, ApplicationCheck>] = &[
    Rule {
        role: UserRole::Admin,
        actions: &ApplicationAction::ALL,
        allows: always,
    },
    Rule {
        role: UserRole::User,
        actions: &[ApplicationAction::Create, ApplicationAction::Withdraw],
        allows: is_applicant,
    },
    Rule {
        role: UserRole::User,
        actions: &[
            ApplicationAction::ReadForPost,
            ApplicationAction::Accept,
            ApplicationAction::Reject,
            ApplicationAction::Complete,
            ApplicationAction::Incomplete,
        ],
        allows: owns_business,
    },
    Rule {
        role: UserRole::User,
        actions: &[ApplicationAction::ReadForUser],
        allows: filters_own_applications,
    },
];

pub fn authorize_application(
    actor: Option<&User>,
    action: ApplicationAction,
    ctx: &ApplicationContext<'_>,
) -> Result<(), ApiError> {
    evaluate("application", actor, APPLICATION_RULES, action, |user, allows| {
        allows(user, ctx)
    })
}
