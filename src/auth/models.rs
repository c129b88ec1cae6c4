//! Identity, role and session data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// Institutional email suffix used by [`User::is_student`]
const STUDENT_EMAIL_SUFFIX: &str = ".edu";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Banned,
    Disabled,
}

/// An external OpenID account linked to a user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LinkedAccount {
    pub provider: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub is_primary: bool,
    pub updated_at: String,
}

/// Per-category email opt-ins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub application_received: bool,
    pub application_updated: bool,
    pub application_withdrawn: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            application_received: true,
            application_updated: true,
            application_withdrawn: true,
        }
    }
}

/// Flat `users` row; see [`User`] for the loaded aggregate
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub status: UserStatus,
    pub notify_application_received: bool,
    pub notify_application_updated: bool,
    pub notify_application_withdrawn: bool,
    pub created_at: String,
}

/// User aggregate: the row plus roles and linked accounts.
///
/// `name` and `email` come from the primary linked account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub created_at: String,
    #[serde(skip_serializing)]
    pub roles: HashSet<UserRole>,
    pub accounts: Vec<LinkedAccount>,
    pub notifications: NotificationPreferences,
}

impl User {
    pub fn from_parts(row: UserRow, roles: HashSet<UserRole>, accounts: Vec<LinkedAccount>) -> Self {
        let primary = accounts
            .iter()
            .find(|a| a.is_primary)
            .or_else(|| accounts.first());
        let (name, email) = primary
            .map(|a| (a.name.clone(), a.email.clone()))
            .unwrap_or_default();

        Self {
            id: row.id,
            name,
            email,
            status: row.status,
            created_at: row.created_at,
            roles,
            accounts,
            notifications: NotificationPreferences {
                application_received: row.notify_application_received,
                application_updated: row.notify_application_updated,
                application_withdrawn: row.notify_application_withdrawn,
            },
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    /// Any linked account with an institutional email address.
    ///
    /// This is an email-suffix heuristic, not a verified credential.
    pub fn is_student(&self) -> bool {
        self.accounts.iter().any(|a| {
            a.email
                .trim()
                .to_lowercase()
                .ends_with(STUDENT_EMAIL_SUFFIX)
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Public summary of a user, as shown to a business reviewing applicants
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserOverview {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub status: UserStatus,
    pub created_at: String,
}

/// Verified identity claims from an OpenID provider
#[derive(Debug, Clone, Deserialize)]
pub struct OpenIdClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
}

/// JWT claims structure for session tokens
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}

/// Google ID token payload for OAuth
#[derive(Deserialize)]
pub struct GoogleIdTokenPayload {
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserQuery {
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetUserStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub notify_application_received: Option<bool>,
    pub notify_application_updated: Option<bool>,
    pub notify_application_withdrawn: Option<bool>,
}

impl UpdateUserRequest {
    pub fn apply(&self, current: NotificationPreferences) -> NotificationPreferences {
        NotificationPreferences {
            application_received: self
                .notify_application_received
                .unwrap_or(current.application_received),
            application_updated: self
                .notify_application_updated
                .unwrap_or(current.application_updated),
            application_withdrawn: self
                .notify_application_withdrawn
                .unwrap_or(current.application_withdrawn),
        }
    }
}
