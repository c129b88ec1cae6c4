use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Creates the posts router
pub fn posts_routes() -> Router {
    Router::new()
        .route("/api/posts", get(handlers::get_posts))
        .route(
            "/api/businesses/:business_id/posts",
            post(handlers::create_post),
        )
        .route(
            "/api/businesses/:business_id/posts/:post_id",
            get(handlers::get_post).put(handlers::update_post),
        )
        .route(
            "/api/businesses/:business_id/posts/:post_id/status",
            put(handlers::set_post_status),
        )
}
