//! Closing period routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthStaff};
use aula_db::ClosingRepository;
use aula_db::repositories::closing::ClosingError;

/// Creates the closing routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/treasury/closings", post(create_closing))
        .route("/treasury/closings", get(list_closings))
}

/// Request body for creating a closing.
#[derive(Debug, Deserialize)]
pub struct CreateClosingRequest {
    /// Movements dated on or before this day become immutable.
    pub closed_through: NaiveDate,
}

/// Response for a closing period.
#[derive(Debug, Serialize)]
pub struct ClosingResponse {
    /// Closing ID.
    pub id: Uuid,
    /// Calendar month ("YYYY-MM").
    pub month: String,
    /// Boundary date.
    pub closed_through: NaiveDate,
}

impl From<aula_db::entities::closing_periods::Model> for ClosingResponse {
    fn from(row: aula_db::entities::closing_periods::Model) -> Self {
        Self {
            id: row.id,
            month: row.month,
            closed_through: row.closed_through,
        }
    }
}

/// POST `/treasury/closings` - Close the books through a date.
async fn create_closing(
    State(state): State<AppState>,
    staff: AuthStaff,
    Json(payload): Json<CreateClosingRequest>,
) -> impl IntoResponse {
    let repo = ClosingRepository::new((*state.db).clone());

    match repo.create(payload.closed_through).await {
        Ok(closing) => {
            info!(
                closed_through = %closing.closed_through,
                staff_id = %staff.staff_id(),
                "Closing recorded"
            );
            (StatusCode::CREATED, Json(ClosingResponse::from(closing))).into_response()
        }
        Err(e @ ClosingError::FutureDate(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "future_closing_date",
                "message": e.to_string()
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to record closing");
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

/// GET `/treasury/closings` - List closing periods, most recent first.
async fn list_closings(State(state): State<AppState>, _staff: AuthStaff) -> impl IntoResponse {
    let repo = ClosingRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(rows) => {
            let closings: Vec<ClosingResponse> =
                rows.into_iter().map(ClosingResponse::from).collect();
            (StatusCode::OK, Json(json!({ "closings": closings }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list closings");
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
