use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Creates the businesses router
///
/// Post and application routes nested under `/api/businesses/:id` live in
/// their own modules.
pub fn businesses_routes() -> Router {
    Router::new()
        .route(
            "/api/businesses",
            get(handlers::get_businesses).post(handlers::create_business),
        )
        .route(
            "/api/businesses/:business_id",
            get(handlers::get_business).put(handlers::update_business),
        )
        // Admin lifecycle routes
        .route(
            "/api/admin/businesses/:business_id/approve",
            post(handlers::approve_business),
        )
        .route(
            "/api/admin/businesses/:business_id/status",
            put(handlers::set_business_status),
        )
}
