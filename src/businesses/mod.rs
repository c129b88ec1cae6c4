//! # Businesses Module
//!
//! Businesses are requested by any signed-in user, start out `pending` and
//! become visible once an admin approves them:
//! - Business requests, listing and updates
//! - Admin approval and status changes

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::businesses_routes;
