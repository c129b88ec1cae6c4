use tracing::{debug, info};

use crate::auth::models::{UpdateUserRequest, User, UserQuery, UserStatus};
use crate::auth::{load_actor, Session};
use crate::common::ApiError;
use crate::policy::{authorize_user, UserAction, UserContext};
use crate::storage::Store;

/// Path segment standing for the current user
pub const CURRENT_USER: &str = "me";

/// Maps `me` to the session's user id; any other value passes through
pub fn resolve_user_id(session: &Session, user_id: &str) -> Result<String, ApiError> {
    if user_id == CURRENT_USER {
        Ok(session.require_user_id()?.to_string())
    } else {
        Ok(user_id.to_string())
    }
}

pub struct UserService {
    store: Store,
}

impl UserService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, session: &Session, user_id: &str) -> Result<User, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        authorize_user(
            actor.as_ref(),
            UserAction::Read,
            &UserContext {
                target_id: Some(user_id),
            },
        )?;

        let user = uow
            .get_user_for_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        uow.commit().await?;
        Ok(user)
    }

    /// Updates notification preferences. Omitted fields keep their value.
    pub async fn update_user(
        &self,
        session: &Session,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        authorize_user(
            actor.as_ref(),
            UserAction::Update,
            &UserContext {
                target_id: Some(user_id),
            },
        )?;

        let user = uow
            .get_user_for_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        let notifications = request.apply(user.notifications);
        uow.update_user_preferences(user_id, &notifications).await?;
        uow.commit().await?;

        debug!(user_id = %user_id, "User preferences updated");
        Ok(User {
            notifications,
            ..user
        })
    }

    pub async fn query_users(
        &self,
        session: &Session,
        query: &UserQuery,
    ) -> Result<Vec<User>, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        authorize_user(actor.as_ref(), UserAction::Query, &UserContext::default())?;

        let users = uow.query_users(query).await?;
        uow.commit().await?;
        Ok(users)
    }

    /// Bans, disables or reactivates a user. Sessions of a user who is not
    /// active resolve to no actor at all.
    pub async fn set_user_status(
        &self,
        session: &Session,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        authorize_user(
            actor.as_ref(),
            UserAction::Moderate,
            &UserContext {
                target_id: Some(user_id),
            },
        )?;

        if actor.as_ref().is_some_and(|a| a.id == user_id) {
            return Err(ApiError::Conflict(
                "cannot change the status of your own account".to_string(),
            ));
        }

        let user = uow
            .get_user_for_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        uow.set_user_status(user_id, status).await?;
        uow.commit().await?;

        info!(user_id = %user_id, status = ?status, "User status changed");
        Ok(User { status, ..user })
    }
}
