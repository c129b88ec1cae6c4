use tracing::{debug, info, warn};

use super::lifecycle::{parse_requested, transition_for};
use super::models::{
    Application, ApplicationNotesRequest, ApplicationStatus, PostApplications, UserApplication,
    UserApplicationQuery,
};
use crate::auth::{load_actor, Session};
use crate::businesses::models::{Business, BusinessStatus};
use crate::common::{ApiError, Validator};
use crate::notifications::{
    ApplicationReceived, ApplicationSubmitted, ApplicationUpdated, ApplicationWithdrawn,
    NotificationService, Recipient,
};
use crate::policy::{
    authorize_application, require_target, ApplicationAction, ApplicationContext,
};
use crate::posts::models::PostStatus;
use crate::storage::{Store, StoreError, UnitOfWork};

/// What a committed status change should tell whom
enum StatusNotice {
    Applicant(ApplicationUpdated),
    Owner(ApplicationWithdrawn),
}

pub struct ApplicationService {
    store: Store,
    notifications: NotificationService,
}

impl ApplicationService {
    pub fn new(store: Store, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    // ============================================================================
    // Applying
    // ============================================================================

    /// Creates a `pending` application of `user_id` to a post. Once it is
    /// stored the business owner is told about it and the applicant gets a
    /// confirmation.
    pub async fn create_application(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;

        authorize_application(
            actor.as_ref(),
            ApplicationAction::Create,
            &ApplicationContext {
                applicant_id: Some(user_id),
                ..Default::default()
            },
        )?;

        let business = uow
            .get_business_for_id(business_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("business not found".to_string()))?;
        let post = uow
            .get_post_for_id(business_id, post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

        if business.status != BusinessStatus::Active {
            return Err(ApiError::Conflict("business is not active".to_string()));
        }
        if post.status != PostStatus::Active {
            return Err(ApiError::Conflict("post is not active".to_string()));
        }

        let applicant = uow
            .get_user_for_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
        if !applicant.is_student() {
            return Err(ApiError::Conflict("user is not a student".to_string()));
        }

        let application = uow
            .create_application(business_id, post_id, user_id)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    ApiError::Conflict("application already exists".to_string())
                }
                other => other.into(),
            })?;

        let owner = uow.get_business_owner(business_id).await?;

        uow.commit().await?;

        info!(
            business_id = %business_id,
            post_id,
            user_id = %user_id,
            "Application created"
        );

        if let Some(owner) = owner {
            self.notifications
                .notify(ApplicationReceived {
                    recipient: Recipient::from(&owner),
                    applicant_name: applicant.name.clone(),
                    business_id: business.id.clone(),
                    post_id,
                    post_title: post.title.clone(),
                })
                .await;
        }
        self.notifications
            .notify(ApplicationSubmitted {
                recipient: Recipient::from(&applicant),
                business_name: business.name.clone(),
                post_title: post.title.clone(),
            })
            .await;

        Ok(application)
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Status change from free-text input. Unknown values and `pending` are a
    /// `BadRequest`.
    pub async fn set_application_status(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
        requested: &str,
    ) -> Result<Application, ApiError> {
        let status = parse_requested(requested)?;
        self.transition(session, business_id, post_id, user_id, status)
            .await
    }

    pub async fn accept(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, ApiError> {
        self.transition(session, business_id, post_id, user_id, ApplicationStatus::Accepted)
            .await
    }

    pub async fn reject(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, ApiError> {
        self.transition(session, business_id, post_id, user_id, ApplicationStatus::Rejected)
            .await
    }

    pub async fn complete(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, ApiError> {
        self.transition(session, business_id, post_id, user_id, ApplicationStatus::Completed)
            .await
    }

    pub async fn incomplete(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, ApiError> {
        self.transition(session, business_id, post_id, user_id, ApplicationStatus::Incomplete)
            .await
    }

    pub async fn withdraw(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, ApiError> {
        self.transition(session, business_id, post_id, user_id, ApplicationStatus::Withdrawn)
            .await
    }

    async fn transition(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
        requested: ApplicationStatus,
    ) -> Result<Application, ApiError> {
        let transition = transition_for(requested)?;

        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_application(
            actor.as_ref(),
            transition.action,
            &ApplicationContext {
                business: Some(&business),
                applicant_id: Some(user_id),
                query: None,
            },
        )?;

        let application = uow
            .get_application(business_id, post_id, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("application not found".to_string()))?;

        transition.check_from(application.status)?;

        let swapped = uow
            .set_application_status(business_id, post_id, user_id, requested, application.status)
            .await
            .map_err(lost_race)?;
        if !swapped {
            warn!(
                business_id = %business_id,
                post_id,
                user_id = %user_id,
                "Application status changed concurrently"
            );
            return Err(ApiError::Conflict(
                "application was modified concurrently".to_string(),
            ));
        }

        let post_title = uow
            .get_post_for_id(business_id, post_id)
            .await?
            .map(|post| post.title)
            .unwrap_or_default();
        let notice = if transition.notifies_applicant() {
            applicant_notice(&mut uow, &business.name, post_title, user_id, requested).await?
        } else {
            owner_notice(&mut uow, &business, post_id, post_title, user_id).await?
        };

        uow.commit().await.map_err(lost_race)?;

        info!(
            business_id = %business_id,
            post_id,
            user_id = %user_id,
            action = transition.action.as_str(),
            from = application.status.as_str(),
            to = requested.as_str(),
            "Application status changed"
        );

        match notice {
            Some(StatusNotice::Applicant(notification)) => {
                self.notifications.notify(notification).await
            }
            Some(StatusNotice::Owner(notification)) => {
                self.notifications.notify(notification).await
            }
            None => debug!(user_id = %user_id, "No recipient for status notification"),
        }

        Ok(Application {
            status: requested,
            ..application
        })
    }

    // ============================================================================
    // Listings and notes
    // ============================================================================

    /// Every application to one post, with an overview of each applicant
    pub async fn get_post_applications(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
    ) -> Result<PostApplications, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_application(
            actor.as_ref(),
            ApplicationAction::ReadForPost,
            &ApplicationContext {
                business: Some(&business),
                ..Default::default()
            },
        )?;

        if uow.get_post_for_id(business_id, post_id).await?.is_none() {
            return Err(ApiError::NotFound("post not found".to_string()));
        }

        let applications = uow.get_applications_for_post(business_id, post_id).await?;
        uow.commit().await?;
        Ok(applications)
    }

    pub async fn get_user_applications(
        &self,
        session: &Session,
        query: &UserApplicationQuery,
    ) -> Result<Vec<UserApplication>, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;

        authorize_application(
            actor.as_ref(),
            ApplicationAction::ReadForUser,
            &ApplicationContext {
                query: Some(query),
                ..Default::default()
            },
        )?;

        let applications = uow.get_user_applications(query).await?;
        uow.commit().await?;
        Ok(applications)
    }

    /// Free-text notes kept by the business. Whoever may review the post's
    /// applications may annotate them.
    pub async fn set_application_notes(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        user_id: &str,
        request: ApplicationNotesRequest,
    ) -> Result<Application, ApiError> {
        request.validate(&request).into_result()?;

        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_application(
            actor.as_ref(),
            ApplicationAction::ReadForPost,
            &ApplicationContext {
                business: Some(&business),
                ..Default::default()
            },
        )?;

        uow.set_application_notes(business_id, post_id, user_id, request.notes.trim())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::NotFound("application not found".to_string()),
                other => other.into(),
            })?;

        let application = uow
            .get_application(business_id, post_id, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("application not found".to_string()))?;

        uow.commit().await?;
        debug!(business_id = %business_id, post_id, user_id = %user_id, "Application notes saved");
        Ok(application)
    }
}

/// A concurrent writer holding the lock during a status change means the
/// observed status is stale
fn lost_race(err: StoreError) -> ApiError {
    match err {
        StoreError::Busy => {
            warn!("Application status write lost to a concurrent writer");
            ApiError::Conflict("application was modified concurrently".to_string())
        }
        other => other.into(),
    }
}

async fn applicant_notice(
    uow: &mut UnitOfWork,
    business_name: &str,
    post_title: String,
    user_id: &str,
    status: ApplicationStatus,
) -> Result<Option<StatusNotice>, ApiError> {
    let Some(applicant) = uow.get_user_for_id(user_id).await? else {
        return Ok(None);
    };

    Ok(Some(StatusNotice::Applicant(ApplicationUpdated {
        recipient: Recipient::from(&applicant),
        business_name: business_name.to_string(),
        post_title,
        status,
    })))
}

async fn owner_notice(
    uow: &mut UnitOfWork,
    business: &Business,
    post_id: i64,
    post_title: String,
    user_id: &str,
) -> Result<Option<StatusNotice>, ApiError> {
    let Some(owner) = uow.get_business_owner(&business.id).await? else {
        return Ok(None);
    };
    let applicant_name = uow
        .get_user_for_id(user_id)
        .await?
        .map(|user| user.name)
        .unwrap_or_default();

    Ok(Some(StatusNotice::Owner(ApplicationWithdrawn {
        recipient: Recipient::from(&owner),
        applicant_name,
        business_id: business.id.clone(),
        business_name: business.name.clone(),
        post_id,
        post_title,
    })))
}
