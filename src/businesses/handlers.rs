use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{
    BusinessQuery, CreateBusinessRequest, SetBusinessStatusRequest, UpdateBusinessRequest,
};
use super::services::BusinessService;
use crate::auth::Session;
use crate::common::{ApiError, AppState};

async fn service(state_lock: &Arc<RwLock<AppState>>) -> BusinessService {
    let state = state_lock.read().await;
    BusinessService::new(state.store.clone(), state.notifications.clone())
}

// ============================================================================
// Business Handlers
// ============================================================================

/// GET /api/businesses - List businesses matching the query
pub async fn get_businesses(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Query(query): Query<BusinessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let businesses = service(&state_lock)
        .await
        .get_businesses(&session, &query)
        .await?;
    Ok(Json(businesses))
}

/// POST /api/businesses - Request a new business
pub async fn create_business(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Json(request): Json<CreateBusinessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let business = service(&state_lock)
        .await
        .create_business(&session, request)
        .await?;
    Ok((StatusCode::CREATED, Json(business)))
}

/// GET /api/businesses/:id
pub async fn get_business(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(business_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let business = service(&state_lock)
        .await
        .get_business(&session, &business_id)
        .await?;
    Ok(Json(business))
}

/// PUT /api/businesses/:id
pub async fn update_business(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(business_id): Path<String>,
    Json(request): Json<UpdateBusinessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let business = service(&state_lock)
        .await
        .update_business(&session, &business_id, request)
        .await?;
    Ok(Json(business))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// POST /api/admin/businesses/:id/approve
pub async fn approve_business(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(business_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let business = service(&state_lock)
        .await
        .approve_business(&session, &business_id)
        .await?;
    Ok(Json(business))
}

/// PUT /api/admin/businesses/:id/status
pub async fn set_business_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(business_id): Path<String>,
    Json(request): Json<SetBusinessStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let business = service(&state_lock)
        .await
        .set_business_status(&session, &business_id, request.status)
        .await?;
    Ok(Json(business))
}
