use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::services::{resolve_user_id, UserService};
use crate::auth::models::{SetUserStatusRequest, UpdateUserRequest, UserQuery};
use crate::auth::Session;
use crate::common::{ApiError, AppState};

/// GET /api/users - Admin only
pub async fn query_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let users = UserService::new(state.store)
        .query_users(&session, &query)
        .await?;
    Ok(Json(users))
}

/// GET /api/users/:user_id - `me` means the current user
pub async fn get_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = resolve_user_id(&session, &user_id)?;
    let state = state_lock.read().await.clone();
    let user = UserService::new(state.store)
        .get_user(&session, &user_id)
        .await?;
    Ok(Json(user))
}

/// PUT /api/users/:user_id
pub async fn update_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = resolve_user_id(&session, &user_id)?;
    let state = state_lock.read().await.clone();
    let user = UserService::new(state.store)
        .update_user(&session, &user_id, request)
        .await?;
    Ok(Json(user))
}

/// PUT /api/admin/users/:user_id/status
pub async fn set_user_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(user_id): Path<String>,
    Json(request): Json<SetUserStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let user = UserService::new(state.store)
        .set_user_status(&session, &user_id, request.status)
        .await?;
    Ok(Json(user))
}
