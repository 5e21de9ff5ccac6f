//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the treasury
//! - Staff token middleware
//! - Request extractors
//! - Response types

pub mod middleware;
pub mod routes;

use aula_core::storage::ReceiptStore;
use aula_shared::JwtService;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for staff token validation.
    pub jwt_service: Arc<JwtService>,
    /// Receipt file store (optional; evidence uploads 503 without it).
    pub receipts: Option<Arc<ReceiptStore>>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
