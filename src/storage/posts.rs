use super::{expect_one_row, now_timestamp, StoreError, UnitOfWork};
use crate::businesses::models::BusinessStatus;
use crate::posts::models::{Post, PostContent, PostQuery, PostStatus};

impl UnitOfWork {
    pub async fn get_post_for_id(
        &mut self,
        business_id: &str,
        post_id: i64,
    ) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, business_id, title, description, pay, time_est, status, created_at, updated_at
            FROM posts
            WHERE business_id = ? AND id = ?
            "#,
        )
        .bind(business_id)
        .bind(post_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(post)
    }

    /// Posts matching the filter. Posts of businesses that are not active
    /// are never listed, whatever their own status.
    pub async fn get_posts(&mut self, query: &PostQuery) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT posts.id, posts.business_id, posts.title, posts.description, posts.pay,
                   posts.time_est, posts.status, posts.created_at, posts.updated_at
            FROM posts
            JOIN businesses ON businesses.id = posts.business_id
            WHERE (? IS NULL OR posts.status = ?)
            AND (? IS NULL OR posts.business_id = ?)
            AND (? IS NULL OR businesses.user_id = ?)
            AND businesses.status = ?
            ORDER BY posts.created_at DESC, posts.id DESC
            "#,
        )
        .bind(query.status)
        .bind(query.status)
        .bind(query.business_id.as_deref())
        .bind(query.business_id.as_deref())
        .bind(query.user_id.as_deref())
        .bind(query.user_id.as_deref())
        .bind(BusinessStatus::Active)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(posts)
    }

    pub async fn create_post(
        &mut self,
        business_id: &str,
        content: &PostContent,
    ) -> Result<Post, StoreError> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (business_id, title, description, pay, time_est, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(business_id)
        .bind(content.title.trim())
        .bind(content.description.trim())
        .bind(content.pay)
        .bind(content.time_est)
        .bind(PostStatus::Active)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await?;

        let post_id = result.last_insert_rowid();
        self.get_post_for_id(business_id, post_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Content edit; bumps `updated_at`
    pub async fn update_post(
        &mut self,
        business_id: &str,
        post_id: i64,
        content: &PostContent,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET title = ?, description = ?, pay = ?, time_est = ?, updated_at = ?
            WHERE business_id = ? AND id = ?
            "#,
        )
        .bind(content.title.trim())
        .bind(content.description.trim())
        .bind(content.pay)
        .bind(content.time_est)
        .bind(now_timestamp())
        .bind(business_id)
        .bind(post_id)
        .execute(&mut *self.tx)
        .await?;
        expect_one_row(result)
    }

    /// Status change; leaves `updated_at` alone
    pub async fn set_post_status(
        &mut self,
        business_id: &str,
        post_id: i64,
        status: PostStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE posts SET status = ? WHERE business_id = ? AND id = ?")
            .bind(status)
            .bind(business_id)
            .bind(post_id)
            .execute(&mut *self.tx)
            .await?;
        expect_one_row(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::businesses::models::BusinessStatus;
    use crate::posts::models::{PostQuery, PostStatus};
    use crate::test_support::{business_request, post_content, setup_test_store};

    #[tokio::test]
    async fn test_post_ids_are_scoped_to_business() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = uow.create_user().await.unwrap();
        let first = uow
            .create_business(&owner, &business_request("First Business"))
            .await
            .unwrap();
        let second = uow
            .create_business(&owner, &business_request("Second Business"))
            .await
            .unwrap();

        let post = uow
            .create_post(&first.id, &post_content("Usability test"))
            .await
            .unwrap();
        assert!(uow.get_post_for_id(&first.id, post.id).await.unwrap().is_some());
        assert!(uow.get_post_for_id(&second.id, post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_change_keeps_updated_at() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = uow.create_user().await.unwrap();
        let business = uow
            .create_business(&owner, &business_request("Acme Testing"))
            .await
            .unwrap();
        let post = uow
            .create_post(&business.id, &post_content("Usability test"))
            .await
            .unwrap();

        uow.set_post_status(&business.id, post.id, PostStatus::Archived)
            .await
            .unwrap();
        let archived = uow.get_post_for_id(&business.id, post.id).await.unwrap().unwrap();
        assert_eq!(archived.status, PostStatus::Archived);
        assert_eq!(archived.updated_at, post.updated_at);

        uow.update_post(&business.id, post.id, &post_content("Revised usability test"))
            .await
            .unwrap();
        let edited = uow.get_post_for_id(&business.id, post.id).await.unwrap().unwrap();
        assert_eq!(edited.title, "Revised usability test");
        assert!(edited.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_listing_hides_posts_of_inactive_businesses() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = uow.create_user().await.unwrap();
        let business = uow
            .create_business(&owner, &business_request("Acme Testing"))
            .await
            .unwrap();
        uow.create_post(&business.id, &post_content("Usability test"))
            .await
            .unwrap();

        let pending = uow.get_posts(&PostQuery::default()).await.unwrap();
        assert!(pending.is_empty());

        uow.set_business_status(&business.id, BusinessStatus::Active, None)
            .await
            .unwrap();
        let listed = uow
            .get_posts(&PostQuery {
                status: Some(PostStatus::Active),
                business_id: None,
                user_id: Some(owner.clone()),
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
