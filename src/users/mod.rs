//! # Users Module
//!
//! Profile reads, notification preferences and admin moderation.

pub mod handlers;
pub mod routes;
pub mod services;


pub use routes::users_routes;
pub use services::resolve_user_id;
