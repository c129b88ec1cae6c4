//! # Auth Module
//!
//! This module handles identity and sessions:
//! - Google ID-token login and account linking
//! - Session tokens (JWT) and the `Session` extractor
//! - The user/role model consulted by the policy engine

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use extractors::Session;
pub use routes::auth_routes;
pub use services::load_actor;
