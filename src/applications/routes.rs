use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

const APPLICATION: &str = "/api/businesses/:business_id/posts/:post_id/applications/:user_id";

/// Creates the applications router
///
/// # Routes
/// - `POST .../posts/:post_id/apply` - Apply as the current user
/// - `GET .../posts/:post_id/applications` - Applications to a post
/// - `POST .../applications/:user_id/{accept,reject,complete,incomplete,withdraw}`
/// - `PUT .../applications/:user_id/{status,notes}`
/// - `GET /api/users/:user_id/applications` - Applications of a user
pub fn applications_routes() -> Router {
    Router::new()
        .route(
            "/api/businesses/:business_id/posts/:post_id/apply",
            post(handlers::apply),
        )
        .route(
            "/api/businesses/:business_id/posts/:post_id/applications",
            get(handlers::get_post_applications),
        )
        .route(
            &format!("{}/accept", APPLICATION),
            post(handlers::accept_application),
        )
        .route(
            &format!("{}/reject", APPLICATION),
            post(handlers::reject_application),
        )
        .route(
            &format!("{}/complete", APPLICATION),
            post(handlers::complete_application),
        )
        .route(
            &format!("{}/incomplete", APPLICATION),
            post(handlers::incomplete_application),
        )
        .route(
            &format!("{}/withdraw", APPLICATION),
            post(handlers::withdraw_application),
        )
        .route(
            &format!("{}/status", APPLICATION),
            put(handlers::set_application_status),
        )
        .route(
            &format!("{}/notes", APPLICATION),
            put(handlers::set_application_notes),
        )
        .route(
            "/api/users/:user_id/applications",
            get(handlers::get_user_applications),
        )
}
