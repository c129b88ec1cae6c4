use super::{evaluate, owns, Rule};
use crate::auth::models::{User, UserRole};
use crate::common::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Read,
    Update,
    /// Listing and filtering every user
    Query,
    /// Banning, disabling and reactivating accounts
    Moderate,
}

impl UserAction {
    pub const ALL: [UserAction; 4] = [
        UserAction::Read,
        UserAction::Update,
        UserAction::Query,
        UserAction::Moderate,
    ];
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UserContext<'a> {
    pub target_id: Option<&'a str>,
}

pub type UserCheck = fn(&User, &UserContext<'_>) -> bool;

fn always(_: &User, _: &UserContext<'_>) -> bool {
    true
}

fn is_self(user: &User, ctx: &UserContext<'_>) -> bool {
    ctx.target_id.is_some_and(|id| owns(user, id))
}

pub static USER_RULES: &[Rule<UserAction, UserCheck>] = &[
    Rule {
        role: UserRole::Admin,
        actions: &UserAction::ALL,
        allows: always,
    },
    Rule {
        role: UserRole::User,
        actions: &[UserAction::Read, UserAction::Update],
        allows: is_self,
    },
];

pub fn authorize_user(
    actor: Option<&User>,
    action: UserAction,
    ctx: &UserContext<'_>,
) -> Result<(), ApiError> {
    evaluate("user", actor, USER_RULES, action, |user, allows| {
        allows(user, ctx)
    })
}
