use std::collections::HashSet;

use super::{expect_one_row, now_timestamp, StoreError, UnitOfWork};
use crate::auth::models::{
    LinkedAccount, NotificationPreferences, OpenIdClaims, User, UserQuery, UserRole, UserRow,
    UserStatus,
};
use crate::common::generate_user_id;

impl UnitOfWork {
    /// Loads the user aggregate, or `None` when no such user exists
    pub async fn get_user_for_id(&mut self, user_id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, status, notify_application_received, notify_application_updated,
                   notify_application_withdrawn, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let roles: HashSet<UserRole> =
            sqlx::query_scalar::<_, UserRole>("SELECT role FROM user_roles WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&mut *self.tx)
                .await?
                .into_iter()
                .collect();

        let accounts = sqlx::query_as::<_, LinkedAccount>(
            r#"
            SELECT provider, email, name, email_verified, is_primary, updated_at
            FROM accounts
            WHERE user_id = ?
            ORDER BY is_primary DESC, updated_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(Some(User::from_parts(row, roles, accounts)))
    }

    pub async fn query_users(&mut self, query: &UserQuery) -> Result<Vec<User>, StoreError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT users.id
            FROM users
            LEFT JOIN user_roles ON user_roles.user_id = users.id
            WHERE (? IS NULL OR users.status = ?)
            AND (? IS NULL OR user_roles.role = ?)
            ORDER BY users.created_at ASC
            "#,
        )
        .bind(query.status)
        .bind(query.status)
        .bind(query.role)
        .bind(query.role)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.get_user_for_id(&id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Creates an active user holding the `user` role and returns its id
    pub async fn create_user(&mut self) -> Result<String, StoreError> {
        let user_id = generate_user_id();

        sqlx::query("INSERT INTO users (id, status, created_at) VALUES (?, ?, ?)")
            .bind(&user_id)
            .bind(UserStatus::Active)
            .bind(now_timestamp())
            .execute(&mut *self.tx)
            .await?;

        self.add_user_role(&user_id, UserRole::User).await?;

        Ok(user_id)
    }

    /// Idempotent
    pub async fn add_user_role(&mut self, user_id: &str, role: UserRole) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
            .bind(user_id)
            .bind(role)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn set_user_status(
        &mut self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET status = ? WHERE id = ?")
            .bind(status)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        expect_one_row(result)
    }

    pub async fn update_user_preferences(
        &mut self,
        user_id: &str,
        prefs: &NotificationPreferences,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                notify_application_received = ?,
                notify_application_updated = ?,
                notify_application_withdrawn = ?
            WHERE id = ?
            "#,
        )
        .bind(prefs.application_received)
        .bind(prefs.application_updated)
        .bind(prefs.application_withdrawn)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;
        expect_one_row(result)
    }

    /// Inserts or refreshes the stored claims for an external account.
    /// The link to a local user is left untouched.
    pub async fn save_openid_account(
        &mut self,
        provider: &str,
        claims: &OpenIdClaims,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (provider, id, email, name, email_verified, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (provider, id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                email_verified = excluded.email_verified,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(provider)
        .bind(&claims.sub)
        .bind(claims.email.trim().to_lowercase())
        .bind(&claims.name)
        .bind(claims.email_verified)
        .bind(now_timestamp())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    /// `None` when the account is unknown or not yet linked to a user
    pub async fn get_linked_user_id(
        &mut self,
        provider: &str,
        account_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let user_id: Option<Option<String>> =
            sqlx::query_scalar("SELECT user_id FROM accounts WHERE provider = ? AND id = ?")
                .bind(provider)
                .bind(account_id)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(user_id.flatten())
    }

    /// Links a saved account to `user_id`. Only unlinked accounts (or ones
    /// already linked to the same user) are touched.
    pub async fn link_openid_account(
        &mut self,
        provider: &str,
        account_id: &str,
        user_id: &str,
        is_primary: bool,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET user_id = ?, is_primary = ?
            WHERE provider = ? AND id = ? AND (user_id IS NULL OR user_id = ?)
            "#,
        )
        .bind(user_id)
        .bind(is_primary)
        .bind(provider)
        .bind(account_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;
        expect_one_row(result)
    }
}
