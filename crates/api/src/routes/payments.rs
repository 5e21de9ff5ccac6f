//! Payment routes: registration, receipt evidence, finalize, applications.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthStaff};
use aula_core::treasury::evidence::Evidence;
use aula_db::entities::{
    applications, payments,
    sea_orm_active_enums::{PaymentDirection, PaymentMethod, PaymentState},
};
use aula_db::repositories::payment::PaymentError;
use aula_db::{PaymentRepository, RegisterPaymentInput};

/// Creates the payment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/treasury/payments", post(register_payment))
        .route("/treasury/payments/{id}/evidence", post(attach_evidence))
        .route("/treasury/payments/{id}/finalize", post(finalize_payment))
        .route("/treasury/payments/{id}/applications", get(list_applications))
}

/// Request body for registering a payment.
#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    /// Account the payment belongs to.
    pub account_id: Uuid,
    /// "inflow" or "outflow".
    pub direction: String,
    /// Payment amount.
    pub amount: Decimal,
    /// The day the money moved (YYYY-MM-DD).
    pub pay_date: NaiveDate,
    /// "cash", "transfer", "sinpe", or "card".
    pub method: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Optional free-text detail.
    pub detail: Option<String>,
}

/// Request body for finalizing a payment.
#[derive(Debug, Deserialize)]
pub struct FinalizePaymentRequest {
    /// Target state: "completed" or "verified".
    pub state: String,
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Account the payment belongs to.
    pub account_id: Uuid,
    /// "inflow" or "outflow".
    pub direction: String,
    /// Payment amount.
    pub amount: Decimal,
    /// Pay date.
    pub pay_date: NaiveDate,
    /// Payment method.
    pub method: String,
    /// Payment state.
    pub state: String,
    /// Receipt number, when evidence is attached.
    pub receipt_number: Option<String>,
    /// Receipt date, when evidence is attached.
    pub receipt_date: Option<NaiveDate>,
    /// Receipt URL, when evidence is attached.
    pub receipt_url: Option<String>,
    /// External reference.
    pub reference: Option<String>,
    /// Free-text detail.
    pub detail: Option<String>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(row: payments::Model) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            direction: match row.direction {
                PaymentDirection::Inflow => "inflow".to_string(),
                PaymentDirection::Outflow => "outflow".to_string(),
            },
            amount: row.amount,
            pay_date: row.pay_date,
            method: method_to_string(&row.method).to_string(),
            state: state_to_string(&row.state).to_string(),
            receipt_number: row.receipt_number,
            receipt_date: row.receipt_date,
            receipt_url: row.receipt_url,
            reference: row.reference,
            detail: row.detail,
        }
    }
}

/// Response for one application row.
#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    /// Application ID.
    pub id: Uuid,
    /// Obligation the money was applied to.
    pub obligation_id: Uuid,
    /// Payment the money came from.
    pub payment_id: Uuid,
    /// Applied amount.
    pub amount: Decimal,
}

impl From<applications::Model> for ApplicationResponse {
    fn from(row: applications::Model) -> Self {
        Self {
            id: row.id,
            obligation_id: row.obligation_id,
            payment_id: row.payment_id,
            amount: row.amount,
        }
    }
}

const fn method_to_string(method: &PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "cash",
        PaymentMethod::Transfer => "transfer",
        PaymentMethod::Sinpe => "sinpe",
        PaymentMethod::Card => "card",
    }
}

const fn state_to_string(state: &PaymentState) -> &'static str {
    match state {
        PaymentState::Pending => "pending",
        PaymentState::Completed => "completed",
        PaymentState::Verified => "verified",
    }
}

fn parse_direction(s: &str) -> Option<PaymentDirection> {
    match s {
        "inflow" => Some(PaymentDirection::Inflow),
        "outflow" => Some(PaymentDirection::Outflow),
        _ => None,
    }
}

fn parse_method(s: &str) -> Option<PaymentMethod> {
    match s {
        "cash" => Some(PaymentMethod::Cash),
        "transfer" => Some(PaymentMethod::Transfer),
        "sinpe" => Some(PaymentMethod::Sinpe),
        "card" => Some(PaymentMethod::Card),
        _ => None,
    }
}

/// Maps repository errors to HTTP responses with machine-readable codes.
fn payment_error_response(e: &PaymentError) -> axum::response::Response {
    let (status, error) = match e {
        PaymentError::NotFound(_) => (StatusCode::NOT_FOUND, "payment_not_found"),
        PaymentError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "account_not_found"),
        PaymentError::NonPositiveAmount(_) => (StatusCode::BAD_REQUEST, "invalid_amount"),
        PaymentError::EvidenceIncomplete(_) => (StatusCode::BAD_REQUEST, "evidence_incomplete"),
        PaymentError::InvalidTargetState => (StatusCode::BAD_REQUEST, "invalid_target_state"),
        PaymentError::PeriodClosed { .. } => (StatusCode::CONFLICT, "period_closed"),
        PaymentError::WouldOverdraw { .. } => (StatusCode::CONFLICT, "cash_pool_overdraw"),
        PaymentError::EvidenceAlreadyAttached(_) => {
            (StatusCode::CONFLICT, "evidence_already_attached")
        }
        PaymentError::DuplicateReceipt(_) => (StatusCode::CONFLICT, "duplicate_receipt"),
        PaymentError::AlreadyFinalized(_) => (StatusCode::CONFLICT, "already_finalized"),
        PaymentError::Settlement(_) | PaymentError::Database(_) => {
            error!(error = %e, "Payment operation failed");
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

/// POST `/treasury/payments` - Register a pending payment.
async fn register_payment(
    State(state): State<AppState>,
    staff: AuthStaff,
    Json(payload): Json<RegisterPaymentRequest>,
) -> impl IntoResponse {
    let Some(direction) = parse_direction(&payload.direction) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_direction",
                "message": format!("Unknown payment direction: {}", payload.direction)
            })),
        )
            .into_response();
    };

    let Some(method) = parse_method(&payload.method) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_method",
                "message": format!("Unknown payment method: {}", payload.method)
            })),
        )
            .into_response();
    };

    let repo = PaymentRepository::new((*state.db).clone());
    let input = RegisterPaymentInput {
        account_id: payload.account_id,
        direction,
        amount: payload.amount,
        pay_date: payload.pay_date,
        method,
        reference: payload.reference,
        detail: payload.detail,
    };

    match repo.register(input).await {
        Ok(payment) => {
            info!(
                payment_id = %payment.id,
                staff_id = %staff.staff_id(),
                "Payment registered"
            );
            (StatusCode::CREATED, Json(PaymentResponse::from(payment))).into_response()
        }
        Err(e) => payment_error_response(&e),
    }
}

/// POST `/treasury/payments/{id}/evidence` - Upload a receipt file and attach
/// evidence.
///
/// Multipart fields: `file` (the receipt), `receipt_number`, `receipt_date`
/// (YYYY-MM-DD), and optional `complete=true` to finalize in the same call.
async fn attach_evidence(
    State(state): State<AppState>,
    staff: AuthStaff,
    Path(payment_id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let Some(receipts) = &state.receipts else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "storage_not_configured",
                "message": "Receipt storage is not configured"
            })),
        )
            .into_response();
    };

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut receipt_number: Option<String> = None;
    let mut receipt_date: Option<NaiveDate> = None;
    let mut complete = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_multipart",
                        "message": e.to_string()
                    })),
                )
                    .into_response();
            }
        };

        match field.name().map(ToString::to_string).as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map_or_else(|| "receipt".to_string(), ToString::to_string);
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, bytes.to_vec())),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": "invalid_multipart",
                                "message": e.to_string()
                            })),
                        )
                            .into_response();
                    }
                }
            }
            Some("receipt_number") => {
                receipt_number = field.text().await.ok();
            }
            Some("receipt_date") => {
                receipt_date = field
                    .text()
                    .await
                    .ok()
                    .and_then(|s| s.parse::<NaiveDate>().ok());
            }
            Some("complete") => {
                complete = field.text().await.is_ok_and(|s| s == "true");
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_file",
                "message": "Multipart field 'file' is required"
            })),
        )
            .into_response();
    };

    let stored = match receipts.store_receipt(payment_id, &filename, bytes).await {
        Ok(stored) => stored,
        Err(e) => {
            error!(error = %e, %payment_id, "Failed to store receipt file");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "receipt_rejected",
                    "message": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let repo = PaymentRepository::new((*state.db).clone());
    let evidence = Evidence {
        receipt_number,
        receipt_date,
        receipt_url: Some(stored.url),
    };

    let payment = match repo.attach_evidence(payment_id, evidence).await {
        Ok(payment) => payment,
        Err(e) => return payment_error_response(&e),
    };

    info!(
        %payment_id,
        staff_id = %staff.staff_id(),
        "Evidence attached"
    );

    if complete {
        return match repo.finalize(payment_id, PaymentState::Completed).await {
            Ok(outcome) => settlement_response(StatusCode::OK, outcome),
            Err(e) => payment_error_response(&e),
        };
    }

    (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response()
}

/// POST `/treasury/payments/{id}/finalize` - Validate evidence and settle
/// FIFO against the account's pending obligations.
async fn finalize_payment(
    State(state): State<AppState>,
    staff: AuthStaff,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<FinalizePaymentRequest>,
) -> impl IntoResponse {
    let target = match payload.state.as_str() {
        "completed" => PaymentState::Completed,
        "verified" => PaymentState::Verified,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_target_state",
                    "message": format!("Unknown target state: {other}")
                })),
            )
                .into_response();
        }
    };

    let repo = PaymentRepository::new((*state.db).clone());

    match repo.finalize(payment_id, target).await {
        Ok(outcome) => {
            info!(
                %payment_id,
                staff_id = %staff.staff_id(),
                applications = outcome.applications.len(),
                credit_remainder = %outcome.credit_remainder,
                "Payment finalized"
            );
            settlement_response(StatusCode::OK, outcome)
        }
        Err(e) => payment_error_response(&e),
    }
}

fn settlement_response(
    status: StatusCode,
    outcome: aula_db::SettlementOutcome,
) -> axum::response::Response {
    let applications: Vec<ApplicationResponse> = outcome
        .applications
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();

    (
        status,
        Json(json!({
            "payment": PaymentResponse::from(outcome.payment),
            "applications": applications,
            "credit_remainder": outcome.credit_remainder,
        })),
    )
        .into_response()
}

/// GET `/treasury/payments/{id}/applications` - Applications written for a
/// payment.
async fn list_applications(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo.applications_for(payment_id).await {
        Ok(rows) => {
            let applications: Vec<ApplicationResponse> =
                rows.into_iter().map(ApplicationResponse::from).collect();
            (StatusCode::OK, Json(json!({ "applications": applications }))).into_response()
        }
        Err(e) => payment_error_response(&e),
    }
}
