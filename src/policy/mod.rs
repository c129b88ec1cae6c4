//! # Policy Module
//!
//! Pure authorization decisions. Each domain (business, post, application, user)
//! declares a closed action enum, a context of already-loaded targets and a
//! static rule table of `(role, actions, predicate)` rows. A request is
//! allowed when any role the actor holds has a matching row whose predicate
//! passes. There are no deny rules.
//!
//! No storage access happens here; callers load the targets first.

pub mod application;
pub mod business;
pub mod post;
pub mod user;

use std::fmt::Debug;

use tracing::debug;

use crate::auth::models::{User, UserRole};
use crate::common::ApiError;

pub use application::{authorize_application, ApplicationAction, ApplicationContext};
pub use business::{authorize_business, BusinessAction, BusinessContext};
pub use post::{authorize_post, PostAction, PostContext};
pub use user::{authorize_user, UserAction, UserContext};

/// One row of a rule table. `allows` is a plain fn pointer so tables can be
/// `static`.
pub struct Rule<A: 'static, F> {
    pub role: UserRole,
    pub actions: &'static [A],
    pub allows: F,
}

/// Runs a rule table. `check` applies a row's predicate to the caller's
/// context.
pub(crate) fn evaluate<A, F>(
    domain: &'static str,
    actor: Option<&User>,
    rules: &[Rule<A, F>],
    action: A,
    check: impl Fn(&User, &F) -> bool,
) -> Result<(), ApiError>
where
    A: Copy + PartialEq + Debug,
{
    let Some(user) = actor else {
        debug!(domain, action = ?action, "Denied: no authenticated actor");
        return Err(ApiError::unauthenticated());
    };

    let allowed = rules.iter().any(|rule| {
        user.has_role(rule.role) && rule.actions.contains(&action) && check(user, &rule.allows)
    });

    if allowed {
        Ok(())
    } else {
        debug!(domain, action = ?action, user_id = %user.id, "Denied by policy");
        Err(ApiError::unauthorized())
    }
}

/// Resolves an entity the policy decision depends on.
///
/// A missing entity looks exactly like a forbidden one to non-admins; admins,
/// who may see everything, get `NotFound`.
pub fn require_target<T>(actor: Option<&User>, entity: Option<T>, what: &str) -> Result<T, ApiError> {
    match (entity, actor) {
        (Some(entity), _) => Ok(entity),
        (None, None) => Err(ApiError::unauthenticated()),
        (None, Some(user)) if user.is_admin() => {
            Err(ApiError::NotFound(format!("{} not found", what)))
        }
        (None, Some(_)) => Err(ApiError::unauthorized()),
    }
}

pub(crate) fn owns(user: &User, owner_id: &str) -> bool {
    user.id == owner_id
}
