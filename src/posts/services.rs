use tracing::{debug, info};

use super::models::{Post, PostContent, PostQuery, PostStatus};
use crate::auth::{load_actor, Session};
use crate::businesses::models::BusinessStatus;
use crate::common::{ApiError, Validator};
use crate::policy::{authorize_post, require_target, PostAction, PostContext};
use crate::storage::{Store, UnitOfWork};

pub struct PostService {
    store: Store,
}

impl PostService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Posts of active businesses matching the query
    pub async fn get_posts(
        &self,
        session: &Session,
        query: &PostQuery,
    ) -> Result<Vec<Post>, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;

        let business = match query.business_id.as_deref() {
            Some(business_id) => uow.get_business_for_id(business_id).await?,
            None => None,
        };

        authorize_post(
            actor.as_ref(),
            PostAction::Read,
            &PostContext {
                business: business.as_ref(),
                post: None,
                query: Some(query),
            },
        )?;

        let posts = uow.get_posts(query).await?;
        uow.commit().await?;
        Ok(posts)
    }

    pub async fn get_post(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
    ) -> Result<Post, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;
        let post = require_target(
            actor.as_ref(),
            uow.get_post_for_id(business_id, post_id).await?,
            "post",
        )?;

        // a single post is readable on the same terms as a listing that
        // would include it
        let query = PostQuery {
            status: (business.status == BusinessStatus::Active).then_some(post.status),
            business_id: Some(business.id.clone()),
            user_id: None,
        };
        authorize_post(
            actor.as_ref(),
            PostAction::Read,
            &PostContext {
                business: Some(&business),
                post: Some(&post),
                query: Some(&query),
            },
        )?;

        uow.commit().await?;
        Ok(post)
    }

    /// New posts start `active`. The business has to be active itself.
    pub async fn create_post(
        &self,
        session: &Session,
        business_id: &str,
        content: PostContent,
    ) -> Result<Post, ApiError> {
        content.validate(&content).into_result()?;

        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;

        authorize_post(
            actor.as_ref(),
            PostAction::Create,
            &PostContext {
                business: Some(&business),
                ..Default::default()
            },
        )?;

        if business.status != BusinessStatus::Active {
            return Err(ApiError::Conflict(format!(
                "business is {}, posts require an active business",
                business.status.as_str()
            )));
        }

        let post = uow.create_post(business_id, &content).await?;
        uow.commit().await?;

        info!(business_id = %business_id, post_id = post.id, "Post created");
        Ok(post)
    }

    pub async fn update_post(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        content: PostContent,
    ) -> Result<Post, ApiError> {
        content.validate(&content).into_result()?;

        let mut uow = self.store.begin().await?;
        let post = self
            .authorize_update(&mut uow, session, business_id, post_id)
            .await?;

        uow.update_post(business_id, post.id, &content).await?;
        let updated = uow
            .get_post_for_id(business_id, post.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

        uow.commit().await?;
        debug!(business_id = %business_id, post_id, "Post updated");
        Ok(updated)
    }

    /// Moves freely between active, disabled and archived
    pub async fn set_post_status(
        &self,
        session: &Session,
        business_id: &str,
        post_id: i64,
        status: PostStatus,
    ) -> Result<Post, ApiError> {
        let mut uow = self.store.begin().await?;
        let post = self
            .authorize_update(&mut uow, session, business_id, post_id)
            .await?;

        uow.set_post_status(business_id, post.id, status).await?;
        uow.commit().await?;

        info!(
            business_id = %business_id,
            post_id,
            from = post.status.as_str(),
            to = status.as_str(),
            "Post status changed"
        );
        Ok(Post { status, ..post })
    }

    async fn authorize_update(
        &self,
        uow: &mut UnitOfWork,
        session: &Session,
        business_id: &str,
        post_id: i64,
    ) -> Result<Post, ApiError> {
        let actor = load_actor(uow, session).await?;
        let business = require_target(
            actor.as_ref(),
            uow.get_business_for_id(business_id).await?,
            "business",
        )?;
        let post = require_target(
            actor.as_ref(),
            uow.get_post_for_id(business_id, post_id).await?,
            "post",
        )?;

        authorize_post(
            actor.as_ref(),
            PostAction::Update,
            &PostContext {
                business: Some(&business),
                post: Some(&post),
                query: None,
            },
        )?;

        Ok(post)
    }
}
