//! Session extractor for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::services::decode_session_token;
use crate::common::{ApiError, AppState};

/// The request's session.
///
/// A missing or invalid bearer token yields an anonymous session rather than
/// a rejection, so that every operation decides for itself whether an actor
/// is required.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn require_user_id(&self) -> Result<&str, ApiError> {
        self.user_id().ok_or_else(ApiError::unauthenticated)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string());

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Session::anonymous());
        };

        let jwt_secret = state_lock.read().await.config.jwt_secret.clone();

        match decode_session_token(&token, &jwt_secret) {
            Ok(claims) => {
                debug!(user_id = %claims.sub, "Session resolved from bearer token");
                Ok(Session::for_user(claims.sub))
            }
            Err(e) => {
                warn!(error = %e, "JWT token validation failed; treating request as anonymous");
                Ok(Session::anonymous())
            }
        }
    }
}
