use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{PostContent, PostQuery, SetPostStatusRequest};
use super::services::PostService;
use crate::auth::Session;
use crate::common::{ApiError, AppState};

/// GET /api/posts - List posts of active businesses
pub async fn get_posts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let posts = PostService::new(state.store)
        .get_posts(&session, &query)
        .await?;
    Ok(Json(posts))
}

/// POST /api/businesses/:business_id/posts
pub async fn create_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(business_id): Path<String>,
    Json(content): Json<PostContent>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let post = PostService::new(state.store)
        .create_post(&session, &business_id, content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/businesses/:business_id/posts/:post_id
pub async fn get_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let post = PostService::new(state.store)
        .get_post(&session, &business_id, post_id)
        .await?;
    Ok(Json(post))
}

/// PUT /api/businesses/:business_id/posts/:post_id
pub async fn update_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id)): Path<(String, i64)>,
    Json(content): Json<PostContent>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let post = PostService::new(state.store)
        .update_post(&session, &business_id, post_id, content)
        .await?;
    Ok(Json(post))
}

/// PUT /api/businesses/:business_id/posts/:post_id/status
pub async fn set_post_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id)): Path<(String, i64)>,
    Json(request): Json<SetPostStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let post = PostService::new(state.store)
        .set_post_status(&session, &business_id, post_id, request.status)
        .await?;
    Ok(Json(post))
}
