//! # Posts Module
//!
//! Testing opportunities published by active businesses.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::posts_routes;
