//! Session outcome routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthStaff};
use aula_db::entities::sea_orm_active_enums::SessionState;
use aula_db::repositories::session::SessionError;
use aula_db::{DbGuardianDirectory, DbScheduleProvider, SessionWorkflow};

use super::obligations::ObligationResponse;

/// Creates the session routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/treasury/sessions/{enrollment_id}/{date}/complete",
            post(complete_session),
        )
        .route(
            "/treasury/sessions/{enrollment_id}/{date}/cancel-for-day",
            post(cancel_session),
        )
}

/// Response for a session outcome.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Session ID.
    pub id: Uuid,
    /// Enrollment the session belongs to.
    pub enrollment_id: Uuid,
    /// Session date.
    pub session_date: NaiveDate,
    /// "given" or "cancelled".
    pub state: String,
    /// Scheduled duration, for given sessions.
    pub duration_minutes: Option<i32>,
}

impl From<aula_db::entities::class_sessions::Model> for SessionResponse {
    fn from(row: aula_db::entities::class_sessions::Model) -> Self {
        Self {
            id: row.id,
            enrollment_id: row.enrollment_id,
            session_date: row.session_date,
            state: match row.state {
                SessionState::Given => "given".to_string(),
                SessionState::Cancelled => "cancelled".to_string(),
            },
            duration_minutes: row.duration_minutes,
        }
    }
}

fn session_error_response(e: &SessionError) -> axum::response::Response {
    let (status, error) = match e {
        SessionError::EnrollmentNotFound(_)
        | SessionError::StudentNotFound(_)
        | SessionError::CourseNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        SessionError::NoScheduleForDay { .. } => (StatusCode::BAD_REQUEST, "no_schedule_for_day"),
        SessionError::GuardianUnresolved(_) => (StatusCode::BAD_REQUEST, "guardian_unresolved"),
        SessionError::StateConflict(_) => (StatusCode::CONFLICT, "session_state_conflict"),
        SessionError::PeriodClosed { .. } => (StatusCode::CONFLICT, "period_closed"),
        SessionError::Collaborator(_) => {
            error!(error = %e, "Collaborator unavailable");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "dependency_unavailable",
                    "message": "A required collaborator is unavailable; retry later"
                })),
            )
                .into_response();
        }
        SessionError::Obligation(_) | SessionError::Account(_) | SessionError::Database(_) => {
            error!(error = %e, "Session operation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }
    };

    (status, Json(json!({ "error": error, "message": e.to_string() }))).into_response()
}

fn workflow(state: &AppState) -> SessionWorkflow<DbScheduleProvider, DbGuardianDirectory> {
    SessionWorkflow::new(
        (*state.db).clone(),
        DbScheduleProvider::new((*state.db).clone()),
        DbGuardianDirectory::new((*state.db).clone()),
    )
}

/// POST `/treasury/sessions/{enrollment_id}/{date}/complete` - Mark the
/// session given and create its money facts.
async fn complete_session(
    State(state): State<AppState>,
    staff: AuthStaff,
    Path((enrollment_id, date)): Path<(Uuid, NaiveDate)>,
) -> impl IntoResponse {
    match workflow(&state).complete(enrollment_id, date).await {
        Ok(outcome) => {
            info!(
                %enrollment_id,
                %date,
                staff_id = %staff.staff_id(),
                created = outcome.created,
                "Session completed"
            );
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({
                    "session": SessionResponse::from(outcome.session),
                    "charge": ObligationResponse::from(outcome.charge),
                    "payout": outcome.payout.map(ObligationResponse::from),
                    "created": outcome.created,
                })),
            )
                .into_response()
        }
        Err(e) => session_error_response(&e),
    }
}

/// POST `/treasury/sessions/{enrollment_id}/{date}/cancel-for-day` - Record
/// the session as cancelled; no money facts.
async fn cancel_session(
    State(state): State<AppState>,
    staff: AuthStaff,
    Path((enrollment_id, date)): Path<(Uuid, NaiveDate)>,
) -> impl IntoResponse {
    match workflow(&state).cancel_for_day(enrollment_id, date).await {
        Ok(outcome) => {
            info!(
                %enrollment_id,
                %date,
                staff_id = %staff.staff_id(),
                created = outcome.created,
                "Session cancelled"
            );
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({
                    "session": SessionResponse::from(outcome.session),
                    "created": outcome.created,
                })),
            )
                .into_response()
        }
        Err(e) => session_error_response(&e),
    }
}
