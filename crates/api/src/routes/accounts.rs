//! Account summary routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::AuthStaff};
use aula_db::AccountRepository;

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/treasury/accounts/guardians/summary", get(guardian_summaries))
        .route("/treasury/accounts/tutors/summary", get(tutor_summaries))
}

/// GET `/treasury/accounts/guardians/summary` - Balance summary per guardian account.
async fn guardian_summaries(State(state): State<AppState>, _staff: AuthStaff) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.guardian_summaries().await {
        Ok(summaries) => (StatusCode::OK, Json(json!({ "accounts": summaries }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute guardian summaries");
            internal_error()
        }
    }
}

/// GET `/treasury/accounts/tutors/summary` - Balance summary per tutor account.
async fn tutor_summaries(State(state): State<AppState>, _staff: AuthStaff) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.tutor_summaries().await {
        Ok(summaries) => (StatusCode::OK, Json(json!({ "accounts": summaries }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute tutor summaries");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
