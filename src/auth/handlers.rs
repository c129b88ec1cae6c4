//! Authentication handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::extractors::Session;
use super::models::{GoogleIdTokenPayload, LoginResponse, User};
use super::services::{
    issue_session_token, verify_google_id_token, AccountService, GOOGLE_PROVIDER,
};
use crate::common::{safe_email_log, ApiError, AppState};

/// POST /api/auth/google
/// Authenticates a user via Google OAuth ID token
///
/// # Request Body
/// ```json
/// {
///   "id_token": "<google id token>"
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "token": "<jwt token>",
///   "user": { ... }
/// }
/// ```
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("Received Google auth request");
    let state = state_lock.read().await.clone();

    let claims = verify_google_id_token(
        &state.http,
        state.config.google_client_id.as_deref(),
        &payload.id_token,
    )
    .await?;

    let service = AccountService::new(state.store.clone(), state.config.clone());
    let returning = service
        .get_linked_user(GOOGLE_PROVIDER, &claims.sub)
        .await?
        .is_some();
    let user = service.save_account(GOOGLE_PROVIDER, &claims).await?;
    let token = issue_session_token(&state.config, &user.id)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        returning,
        "User authentication completed"
    );

    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/auth/google/link
/// Links another Google account to the current user
pub async fn link_google_account(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();
    session.require_user_id()?;

    let claims = verify_google_id_token(
        &state.http,
        state.config.google_client_id.as_deref(),
        &payload.id_token,
    )
    .await?;

    let service = AccountService::new(state.store.clone(), state.config.clone());
    let user = service
        .link_account(&session, GOOGLE_PROVIDER, &claims)
        .await?;

    Ok(Json(user))
}

/// GET /api/me
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();
    let service = AccountService::new(state.store.clone(), state.config.clone());
    let user = service.current_user(&session).await?;
    Ok(Json(user))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client drops its copy.
pub async fn logout_handler(session: Session) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = session.require_user_id()?;
    info!(user_id = %user_id, "User logout successful");
    Ok(Json(serde_json::json!({
        "message": "Logout successful"
    })))
}
