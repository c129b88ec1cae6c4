use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{ApplicationNotesRequest, SetApplicationStatusRequest, UserApplicationQuery};
use super::services::ApplicationService;
use crate::auth::Session;
use crate::common::{ApiError, AppState};
use crate::users::resolve_user_id;

type ApplicationPath = Path<(String, i64, String)>;

async fn service(state_lock: &Arc<RwLock<AppState>>) -> ApplicationService {
    let state = state_lock.read().await;
    ApplicationService::new(state.store.clone(), state.notifications.clone())
}

// ============================================================================
// Applying and Listing
// ============================================================================

/// POST /api/businesses/:business_id/posts/:post_id/apply
/// The current user applies to the post
pub async fn apply(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = session.require_user_id()?.to_string();
    let application = service(&state_lock)
        .await
        .create_application(&session, &business_id, post_id, &user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/businesses/:business_id/posts/:post_id/applications
pub async fn get_post_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let applications = service(&state_lock)
        .await
        .get_post_applications(&session, &business_id, post_id)
        .await?;
    Ok(Json(applications))
}

/// GET /api/users/:user_id/applications - `me` means the current user
pub async fn get_user_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(user_id): Path<String>,
    Query(mut query): Query<UserApplicationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.user_id = Some(resolve_user_id(&session, &user_id)?);
    let applications = service(&state_lock)
        .await
        .get_user_applications(&session, &query)
        .await?;
    Ok(Json(applications))
}

// ============================================================================
// Status Changes
// ============================================================================

/// PUT /api/businesses/:business_id/posts/:post_id/applications/:user_id/status
pub async fn set_application_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
    Json(request): Json<SetApplicationStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .set_application_status(&session, &business_id, post_id, &user_id, &request.status)
        .await?;
    Ok(Json(application))
}

/// POST .../applications/:user_id/accept
pub async fn accept_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .accept(&session, &business_id, post_id, &user_id)
        .await?;
    Ok(Json(application))
}

/// POST .../applications/:user_id/reject
pub async fn reject_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .reject(&session, &business_id, post_id, &user_id)
        .await?;
    Ok(Json(application))
}

/// POST .../applications/:user_id/complete
pub async fn complete_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .complete(&session, &business_id, post_id, &user_id)
        .await?;
    Ok(Json(application))
}

/// POST .../applications/:user_id/incomplete
pub async fn incomplete_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .incomplete(&session, &business_id, post_id, &user_id)
        .await?;
    Ok(Json(application))
}

/// POST .../applications/:user_id/withdraw
pub async fn withdraw_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .withdraw(&session, &business_id, post_id, &user_id)
        .await?;
    Ok(Json(application))
}

/// PUT .../applications/:user_id/notes
pub async fn set_application_notes(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path((business_id, post_id, user_id)): ApplicationPath,
    Json(request): Json<ApplicationNotesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let application = service(&state_lock)
        .await
        .set_application_notes(&session, &business_id, post_id, &user_id, request)
        .await?;
    Ok(Json(application))
}
