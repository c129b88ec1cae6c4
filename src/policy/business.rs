use super::{evaluate, owns, Rule};
use crate::auth::models::{User, UserRole};
use crate::businesses::models::{Business, BusinessQuery, BusinessStatus};
use crate::common::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessAction {
    Create,
    Read,
    Update,
    /// Any status change, approval included
    Approve,
}

impl BusinessAction {
    pub const ALL: [BusinessAction; 4] = [
        BusinessAction::Create,
        BusinessAction::Read,
        BusinessAction::Update,
        BusinessAction::Approve,
    ];
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BusinessContext<'a> {
    pub business: Option<&'a Business>,
    pub query: Option<&'a BusinessQuery>,
}

pub type BusinessCheck = fn(&User, &BusinessContext<'_>) -> bool;

fn always(_: &User, _: &BusinessContext<'_>) -> bool {
    true
}

fn owns_business(user: &User, ctx: &BusinessContext<'_>) -> bool {
    ctx.business.is_some_and(|b| owns(user, &b.user_id))
}

fn can_read(user: &User, ctx: &BusinessContext<'_>) -> bool {
    let target_active = ctx
        .business
        .is_some_and(|b| b.status == BusinessStatus::Active);
    let filter_allows = ctx.query.is_some_and(|q| {
        q.status == Some(BusinessStatus::Active) || q.user_id.as_deref() == Some(user.id.as_str())
    });
    target_active || filter_allows
}

pub static BUSINESS_RULES: &[Rule<BusinessAction, BusinessCheck>] = &[
    Rule {
        role: UserRole::Admin,
        actions: &BusinessAction::ALL,
        allows: always,
    },
    Rule {
        role: UserRole::User,
        actions: &[BusinessAction::Create],
        allows: always,
    },
    Rule {
        role: UserRole::User,
        actions: &[BusinessAction::Update],
        allows: owns_business,
    },
    Rule {
        role: UserRole::User,
        actions: &[BusinessAction::Read],
        allows: can_read,
    },
];

pub fn authorize_business(
    actor: Option<&User>,
    action: BusinessAction,
    ctx: &BusinessContext<'_>,
) -> Result<(), ApiError> {
    evaluate("business", actor, BUSINESS_RULES, action, |user, allows| {
        allows(user, ctx)
    })
}
