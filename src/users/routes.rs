use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

/// Creates the users router
///
/// `/api/users/me` is served by the `:user_id` routes.
pub fn users_routes() -> Router {
    Router::new()
        .route("/api/users", get(handlers::query_users))
        .route(
            "/api/users/:user_id",
            get(handlers::get_user).put(handlers::update_user),
        )
        .route(
            "/api/admin/users/:user_id/status",
            put(handlers::set_user_status),
        )
}
