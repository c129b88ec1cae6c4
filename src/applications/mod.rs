//! # Applications Module
//!
//! Students apply to posts; businesses review them. Every status change goes
//! through the lifecycle table in [`lifecycle`] and a compare-and-swap
//! update, so two racing identical changes yield one success and one
//! `Conflict`.

pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::applications_routes;
