use super::{expect_one_row, now_timestamp, StoreError, UnitOfWork};
use crate::auth::models::User;
use crate::businesses::models::{
    Business, BusinessQuery, BusinessStatus, CreateBusinessRequest, UpdateBusinessRequest,
};
use crate::common::generate_business_id;

const BUSINESS_COLUMNS: &str =
    "id, user_id, name, website, description, status, logo, created_at";

impl UnitOfWork {
    pub async fn get_business_for_id(
        &mut self,
        business_id: &str,
    ) -> Result<Option<Business>, StoreError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            "SELECT {} FROM businesses WHERE id = ?",
            BUSINESS_COLUMNS
        ))
        .bind(business_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(business)
    }

    /// The owning user; `None` when the business does not exist
    pub async fn get_business_owner(
        &mut self,
        business_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let owner_id: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM businesses WHERE id = ?")
                .bind(business_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        match owner_id {
            Some(owner_id) => {
                let owner = self.get_user_for_id(&owner_id).await?;
                owner
                    .map(Some)
                    .ok_or_else(|| StoreError::Corrupt(format!("business {} has no owner", business_id)))
            }
            None => Ok(None),
        }
    }

    pub async fn get_businesses(
        &mut self,
        query: &BusinessQuery,
    ) -> Result<Vec<Business>, StoreError> {
        let businesses = sqlx::query_as::<_, Business>(&format!(
            r#"
            SELECT {}
            FROM businesses
            WHERE (? IS NULL OR status = ?)
            AND (? IS NULL OR user_id = ?)
            ORDER BY created_at ASC
            "#,
            BUSINESS_COLUMNS
        ))
        .bind(query.status)
        .bind(query.status)
        .bind(query.user_id.as_deref())
        .bind(query.user_id.as_deref())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(businesses)
    }

    /// Inserts a `pending` business owned by `user_id`
    pub async fn create_business(
        &mut self,
        user_id: &str,
        request: &CreateBusinessRequest,
    ) -> Result<Business, StoreError> {
        let business_id = generate_business_id();

        sqlx::query(
            r#"
            INSERT INTO businesses (id, user_id, name, website, description, status, logo, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&business_id)
        .bind(user_id)
        .bind(request.name.trim())
        .bind(request.website.trim())
        .bind(request.description.trim())
        .bind(BusinessStatus::Pending)
        .bind(request.logo.as_deref())
        .bind(now_timestamp())
        .execute(&mut *self.tx)
        .await?;

        self.get_business_for_id(&business_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn update_business(
        &mut self,
        business_id: &str,
        request: &UpdateBusinessRequest,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE businesses SET name = ?, website = ?, description = ? WHERE id = ?",
        )
        .bind(request.name.trim())
        .bind(request.website.trim())
        .bind(request.description.trim())
        .bind(business_id)
        .execute(&mut *self.tx)
        .await?;
        expect_one_row(result)
    }

    /// Sets the status. With `expected`, the write only happens while the
    /// stored status still equals it; otherwise `NotFound` is returned.
    pub async fn set_business_status(
        &mut self,
        business_id: &str,
        status: BusinessStatus,
        expected: Option<BusinessStatus>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE businesses SET status = ? WHERE id = ? AND (? IS NULL OR status = ?)",
        )
        .bind(status)
        .bind(business_id)
        .bind(expected)
        .bind(expected)
        .execute(&mut *self.tx)
        .await?;
        expect_one_row(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::businesses::models::{BusinessQuery, BusinessStatus, UpdateBusinessRequest};
    use crate::storage::StoreError;
    use crate::test_support::{business_request, setup_test_store};

    #[tokio::test]
    async fn test_business_starts_pending_with_owner() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = uow.create_user().await.unwrap();
        let business = uow
            .create_business(&owner, &business_request("Acme Testing"))
            .await
            .unwrap();

        assert_eq!(business.status, BusinessStatus::Pending);
        let loaded_owner = uow.get_business_owner(&business.id).await.unwrap().unwrap();
        assert_eq!(loaded_owner.id, owner);
        assert!(uow.get_business_owner("B_MISSING0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_business_name_is_unique_violation() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = uow.create_user().await.unwrap();
        uow.create_business(&owner, &business_request("Acme Testing"))
            .await
            .unwrap();
        let err = uow
            .create_business(&owner, &business_request("Acme Testing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
    }

    #[tokio::test]
    async fn test_conditional_status_update() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = uow.create_user().await.unwrap();
        let business = uow
            .create_business(&owner, &business_request("Acme Testing"))
            .await
            .unwrap();

        uow.set_business_status(&business.id, BusinessStatus::Active, Some(BusinessStatus::Pending))
            .await
            .unwrap();
        let again = uow
            .set_business_status(&business.id, BusinessStatus::Active, Some(BusinessStatus::Pending))
            .await;
        assert!(matches!(again, Err(StoreError::NotFound)));

        uow.set_business_status(&business.id, BusinessStatus::Disabled, None)
            .await
            .unwrap();
        let active = uow
            .get_businesses(&BusinessQuery {
                status: Some(BusinessStatus::Active),
                user_id: None,
            })
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_update_business_missing_row() {
        let store = setup_test_store().await;
        let mut uow = store.begin().await.unwrap();

        let request = UpdateBusinessRequest {
            name: "Renamed Co".to_string(),
            website: "https://renamed.example".to_string(),
            description: "A renamed business".to_string(),
        };
        let result = uow.update_business("B_MISSING0", &request).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
