//! Middleware for the API layer.

pub mod auth;

pub use auth::{AuthStaff, auth_middleware};
