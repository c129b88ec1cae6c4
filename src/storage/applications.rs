use sqlx::FromRow;

use super::{expect_one_row, now_timestamp, StoreError, UnitOfWork};
use crate::applications::models::{
    Application, ApplicationStatus, PostApplicationData, PostApplications, UserApplication,
    UserApplicationQuery,
};
use crate::auth::models::{UserOverview, UserStatus};

#[derive(FromRow)]
struct PostApplicationRow {
    user_id: String,
    user_name: String,
    user_email: String,
    email_verified: bool,
    user_status: UserStatus,
    user_created_at: String,
    notes: String,
    status: ApplicationStatus,
    created_at: String,
}

impl From<PostApplicationRow> for PostApplicationData {
    fn from(row: PostApplicationRow) -> Self {
        Self {
            user: UserOverview {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                email_verified: row.email_verified,
                status: row.user_status,
                created_at: row.user_created_at,
            },
            notes: row.notes,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

impl UnitOfWork {
    pub async fn get_application(
        &mut self,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Option<Application>, StoreError> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT business_id, post_id, user_id, status, notes, created_at
            FROM post_applications
            WHERE business_id = ? AND post_id = ? AND user_id = ?
            "#,
        )
        .bind(business_id)
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(application)
    }

    /// Inserts a `pending` application. A second application for the same
    /// (business, post, user) fails with `UniqueViolation`.
    pub async fn create_application(
        &mut self,
        business_id: &str,
        post_id: i64,
        user_id: &str,
    ) -> Result<Application, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO post_applications (business_id, post_id, user_id, status, notes, created_at)
            VALUES (?, ?, ?, ?, '', ?)
            "#,
        )
        .bind(business_id)
        .bind(post_id)
        .bind(user_id)
        .bind(ApplicationStatus::Pending)
        .bind(now_timestamp())
        .execute(&mut *self.tx)
        .await?;

        self.get_application(business_id, post_id, user_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Compare-and-swap on the status column. Returns `false` when the stored
    /// status no longer equals `expected` (or the row is gone).
    pub async fn set_application_status(
        &mut self,
        business_id: &str,
        post_id: i64,
        user_id: &str,
        status: ApplicationStatus,
        expected: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE post_applications SET status = ?
            WHERE business_id = ? AND post_id = ? AND user_id = ? AND status = ?
            "#,
        )
        .bind(status)
        .bind(business_id)
        .bind(post_id)
        .bind(user_id)
        .bind(expected)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn set_application_notes(
        &mut self,
        business_id: &str,
        post_id: i64,
        user_id: &str,
        notes: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE post_applications SET notes = ?
            WHERE business_id = ? AND post_id = ? AND user_id = ?
            "#,
        )
        .bind(notes)
        .bind(business_id)
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;
        expect_one_row(result)
    }

    pub async fn get_applications_for_post(
        &mut self,
        business_id: &str,
        post_id: i64,
    ) -> Result<PostApplications, StoreError> {
        let rows = sqlx::query_as::<_, PostApplicationRow>(
            r#"
            SELECT users.id AS user_id,
                   COALESCE(accounts.name, '') AS user_name,
                   COALESCE(accounts.email, '') AS user_email,
                   COALESCE(accounts.email_verified, 0) AS email_verified,
                   users.status AS user_status,
                   users.created_at AS user_created_at,
                   post_applications.notes,
                   post_applications.status,
                   post_applications.created_at
            FROM post_applications
            JOIN users ON users.id = post_applications.user_id
            LEFT JOIN accounts ON accounts.user_id = users.id AND accounts.is_primary = 1
            WHERE post_applications.business_id = ? AND post_applications.post_id = ?
            ORDER BY post_applications.created_at ASC
            "#,
        )
        .bind(business_id)
        .bind(post_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(PostApplications {
            business_id: business_id.to_string(),
            post_id,
            applications: rows.into_iter().map(PostApplicationData::from).collect(),
        })
    }

    pub async fn get_user_applications(
        &mut self,
        query: &UserApplicationQuery,
    ) -> Result<Vec<UserApplication>, StoreError> {
        let applications = sqlx::query_as::<_, UserApplication>(
            r#"
            SELECT businesses.id AS business_id,
                   businesses.name AS business_name,
                   businesses.status AS business_status,
                   posts.id AS post_id,
                   posts.title AS post_title,
                   posts.status AS post_status,
                   posts.pay,
                   posts.time_est,
                   post_applications.status,
                   post_applications.created_at
            FROM post_applications
            JOIN posts ON posts.id = post_applications.post_id
                AND posts.business_id = post_applications.business_id
            JOIN businesses ON businesses.id = posts.business_id
            WHERE (? IS NULL OR post_applications.user_id = ?)
            AND (? IS NULL OR post_applications.status = ?)
            AND (? IS NULL OR posts.status = ?)
            ORDER BY post_applications.created_at DESC
            "#,
        )
        .bind(query.user_id.as_deref())
        .bind(query.user_id.as_deref())
        .bind(query.status)
        .bind(query.status)
        .bind(query.post_status)
        .bind(query.post_status)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(applications)
    }
}
