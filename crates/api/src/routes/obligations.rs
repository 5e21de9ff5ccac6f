//! Obligation listing routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthStaff};
use aula_db::ObligationRepository;
use aula_db::entities::{obligations, sea_orm_active_enums::ObligationState};

/// Creates the obligation routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/treasury/obligations/{account_id}", get(list_obligations))
}

/// Query parameters for listing obligations.
#[derive(Debug, Deserialize)]
pub struct ListObligationsQuery {
    /// "pending" (default) or "all".
    pub state: Option<String>,
}

/// Response for one obligation.
#[derive(Debug, Serialize)]
pub struct ObligationResponse {
    /// Obligation ID.
    pub id: Uuid,
    /// "charge_session" or "payout_session".
    pub kind: String,
    /// Face amount.
    pub amount: Decimal,
    /// Unsettled portion.
    pub remaining: Decimal,
    /// Accrual date.
    pub accrual_date: NaiveDate,
    /// "pending" or "settled".
    pub state: String,
    /// Session that produced the obligation.
    pub session_id: Uuid,
    /// Free-text detail.
    pub detail: String,
}

impl From<obligations::Model> for ObligationResponse {
    fn from(row: obligations::Model) -> Self {
        Self {
            id: row.id,
            kind: match row.kind {
                aula_db::entities::sea_orm_active_enums::ObligationKind::ChargeSession => {
                    "charge_session".to_string()
                }
                aula_db::entities::sea_orm_active_enums::ObligationKind::PayoutSession => {
                    "payout_session".to_string()
                }
            },
            amount: row.amount,
            remaining: row.remaining,
            accrual_date: row.accrual_date,
            state: match row.state {
                ObligationState::Pending => "pending".to_string(),
                ObligationState::Settled => "settled".to_string(),
            },
            session_id: row.session_id,
            detail: row.detail,
        }
    }
}

/// GET `/treasury/obligations/{account_id}` - Obligations for an account in
/// settlement order.
async fn list_obligations(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Path(account_id): Path<Uuid>,
    Query(query): Query<ListObligationsQuery>,
) -> impl IntoResponse {
    let filter = match query.state.as_deref() {
        None | Some("pending") => Some(ObligationState::Pending),
        Some("all") => None,
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_state",
                    "message": format!("Unknown obligation state filter: {other}")
                })),
            )
                .into_response();
        }
    };

    let repo = ObligationRepository::new((*state.db).clone());

    match repo.list_for_account(account_id, filter).await {
        Ok(rows) => {
            let obligations: Vec<ObligationResponse> =
                rows.into_iter().map(ObligationResponse::from).collect();
            (StatusCode::OK, Json(json!({ "obligations": obligations }))).into_response()
        }
        Err(e) => {
            error!(error = %e, %account_id, "Failed to list obligations");
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
