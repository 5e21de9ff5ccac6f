//! Cash pool route.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::AuthStaff};
use aula_db::PaymentRepository;

/// Creates the cash pool routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/treasury/cash-pool", get(cash_pool))
}

/// Cash pool response.
#[derive(Debug, Serialize)]
pub struct CashPoolResponse {
    /// Confirmed inflows.
    #[serde(rename = "in")]
    pub inflow: Decimal,
    /// Confirmed outflows.
    pub out: Decimal,
    /// `in - out`.
    pub net: Decimal,
}

/// GET `/treasury/cash-pool` - Confirmed inflows, outflows, and net pool.
async fn cash_pool(State(state): State<AppState>, _staff: AuthStaff) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo.cash_pool().await {
        Ok(pool) => (
            StatusCode::OK,
            Json(CashPoolResponse {
                inflow: pool.inflow,
                out: pool.outflow,
                net: pool.net(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute cash pool");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
