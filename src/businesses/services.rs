use tracing::{debug, info, warn};

use super::models::{
    Business, BusinessQuery, BusinessStatus, CreateBusinessRequest, UpdateBusinessRequest,
};
use crate::auth::models::{UserQuery, UserRole, UserStatus};
use crate::auth::{load_actor, Session};
use crate::common::{ApiError, Validator};
use crate::notifications::{BusinessRequested, NotificationService, Recipient};
use crate::policy::{authorize_business, require_target, BusinessAction, BusinessContext};
use crate::storage::{Store, StoreError};

pub struct BusinessService {
    store: Store,
    notifications: NotificationService,
}

impl BusinessService {
    pub fn new(store: Store, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub async fn get_businesses(
        &self,
        session: &Session,
        query: &BusinessQuery,
    ) -> Result<Vec<Business>, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;

        authorize_business(
            actor.as_ref(),
            BusinessAction::Read,
            &BusinessContext {
                business: None,
                query: Some(query),
            },
        )?;

        let businesses = uow.get_businesses(query).await?;
        uow.commit().await?;
        Ok(businesses)
    }

    pub async fn get_business(
        &self,
        session: &Session,
        business_id: &str,
    ) -> Result<Business, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_business(
            actor.as_ref(),
            BusinessAction::Read,
            &BusinessContext {
                business: Some(&business),
                query: None,
            },
        )?;

        uow.commit().await?;
        Ok(business)
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Requests a new business. It starts `pending` and every active admin is
    /// notified.
    pub async fn create_business(
        &self,
        session: &Session,
        request: CreateBusinessRequest,
    ) -> Result<Business, ApiError> {
        request.validate(&request).into_result()?;

        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        authorize_business(actor.as_ref(), BusinessAction::Create, &BusinessContext::default())?;
        let actor = actor.ok_or_else(ApiError::unauthenticated)?;

        let business = uow
            .create_business(&actor.id, &request)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    ApiError::Conflict("Business name already exists".to_string())
                }
                other => other.into(),
            })?;

        let admins = uow
            .query_users(&UserQuery {
                status: Some(UserStatus::Active),
                role: Some(UserRole::Admin),
            })
            .await?;

        uow.commit().await?;

        info!(
            business_id = %business.id,
            user_id = %actor.id,
            "Business requested"
        );

        let notifications = admins
            .iter()
            .map(|admin| BusinessRequested {
                recipient: Recipient::from(admin),
                requester_name: actor.name.clone(),
                business_id: business.id.clone(),
                business_name: business.name.clone(),
            })
            .collect();
        self.notifications.notify_all(notifications).await;

        Ok(business)
    }

    pub async fn update_business(
        &self,
        session: &Session,
        business_id: &str,
        request: UpdateBusinessRequest,
    ) -> Result<Business, ApiError> {
        request.validate(&request).into_result()?;

        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_business(
            actor.as_ref(),
            BusinessAction::Update,
            &BusinessContext {
                business: Some(&business),
                query: None,
            },
        )?;

        uow.update_business(business_id, &request)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    ApiError::Conflict("Business name already exists".to_string())
                }
                other => other.into(),
            })?;

        let updated = uow
            .get_business_for_id(business_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("business not found".to_string()))?;

        uow.commit().await?;
        debug!(business_id = %business_id, "Business updated");
        Ok(updated)
    }

    /// pending -> active. Anything but a pending business is a conflict.
    pub async fn approve_business(
        &self,
        session: &Session,
        business_id: &str,
    ) -> Result<Business, ApiError> {
        self.change_status(session, business_id, BusinessStatus::Active, Some(BusinessStatus::Pending))
            .await
    }

    /// Admin status change. `pending` can never be re-entered, and a pending
    /// business only leaves it through [`Self::approve_business`].
    pub async fn set_business_status(
        &self,
        session: &Session,
        business_id: &str,
        status: BusinessStatus,
    ) -> Result<Business, ApiError> {
        self.change_status(session, business_id, status, None).await
    }

    async fn change_status(
        &self,
        session: &Session,
        business_id: &str,
        status: BusinessStatus,
        required: Option<BusinessStatus>,
    ) -> Result<Business, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_business(
            actor.as_ref(),
            BusinessAction::Approve,
            &BusinessContext {
                business: Some(&business),
                query: None,
            },
        )?;

        if status == BusinessStatus::Pending {
            return Err(ApiError::BadRequest(
                "a business cannot be returned to pending".to_string(),
            ));
        }
        match required {
            Some(required) if business.status != required => {
                return Err(ApiError::Conflict(format!(
                    "business is {}, expected {}",
                    business.status.as_str(),
                    required.as_str()
                )));
            }
            None if business.status == BusinessStatus::Pending => {
                return Err(ApiError::Conflict(
                    "a pending business must be approved first".to_string(),
                ));
            }
            _ => {}
        }
        if business.status == status {
            return Err(ApiError::Conflict(format!(
                "business is already {}",
                status.as_str()
            )));
        }

        uow.set_business_status(business_id, status, Some(business.status))
            .await
            .map_err(|e| match e {
                StoreError::NotFound | StoreError::Busy => {
                    warn!(business_id = %business_id, "Business status changed concurrently");
                    ApiError::Conflict("business was modified concurrently".to_string())
                }
                other => other.into(),
            })?;

        uow.commit().await?;

        info!(
            business_id = %business_id,
            from = business.status.as_str(),
            to = status.as_str(),
            "Business status changed"
        );

        Ok(Business { status, ..business })
    }
}
