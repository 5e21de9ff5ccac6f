//! Journal routes: diary, expected-vs-real, CSV export.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthStaff};
use aula_core::journal::DiaryEntry;
use aula_db::JournalRepository;
use aula_db::repositories::journal::JournalError;

/// Creates the journal routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/treasury/journal", get(diary))
        .route("/treasury/journal/expected-vs-real", get(expected_vs_real))
        .route("/treasury/journal/export", get(export_csv))
}

/// Query parameters for the diary.
#[derive(Debug, Deserialize)]
pub struct DiaryQuery {
    /// Range start (inclusive).
    pub from: NaiveDate,
    /// Range end (inclusive).
    pub to: NaiveDate,
    /// Restrict to one account.
    pub account_id: Option<Uuid>,
    /// Include pending obligations (default false).
    #[serde(default)]
    pub include_pending: bool,
}

/// Query parameters for expected-vs-real and export.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Range start (inclusive).
    pub from: NaiveDate,
    /// Range end (inclusive).
    pub to: NaiveDate,
}

fn journal_error_response(e: &JournalError) -> axum::response::Response {
    match e {
        JournalError::InvalidRange { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_range",
                "message": e.to_string()
            })),
        )
            .into_response(),
        JournalError::Database(_) => {
            error!(error = %e, "Journal query failed");
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

/// GET `/treasury/journal` - The diary with per-account running balances.
async fn diary(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<DiaryQuery>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    match repo
        .diary(query.from, query.to, query.account_id, query.include_pending)
        .await
    {
        Ok(entries) => (StatusCode::OK, Json(json!({ "entries": entries }))).into_response(),
        Err(e) => journal_error_response(&e),
    }
}

/// GET `/treasury/journal/expected-vs-real` - Per-day expected versus real
/// totals.
async fn expected_vs_real(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    match repo.expected_vs_real(query.from, query.to).await {
        Ok(days) => (StatusCode::OK, Json(json!({ "days": days }))).into_response(),
        Err(e) => journal_error_response(&e),
    }
}

/// GET `/treasury/journal/export` - The diary as a CSV download.
async fn export_csv(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    let entries = match repo.diary(query.from, query.to, None, true).await {
        Ok(entries) => entries,
        Err(e) => return journal_error_response(&e),
    };

    match render_csv(&entries) {
        Ok(body) => {
            let filename = format!("journal_{}_{}.csv", query.from, query.to);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to render journal CSV");
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

/// Renders diary entries as CSV. Formatting only; the numbers come straight
/// from the diary.
fn render_csv(entries: &[DiaryEntry]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "date", "account_id", "source", "detail", "debit", "credit", "balance",
    ])?;

    for entry in entries {
        writer.write_record([
            entry.date.to_string(),
            entry.account_id.to_string(),
            match entry.source {
                aula_core::journal::EntrySource::Obligation => "obligation".to_string(),
                aula_core::journal::EntrySource::Payment => "payment".to_string(),
            },
            entry.detail.clone(),
            entry.debit.to_string(),
            entry.credit.to_string(),
            entry.balance.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::journal::{EntrySource, JournalRow, with_running_balance};
    use aula_shared::types::AccountId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_csv_includes_header_and_rows() {
        let account = AccountId::new();
        let rows = vec![JournalRow {
            id: Uuid::now_v7(),
            date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            account_id: account,
            debit: dec!(10000),
            credit: dec!(0),
            detail: "Algebra on 2026-04-06".to_string(),
            source: EntrySource::Obligation,
        }];
        let entries = with_running_balance(rows);

        let csv = render_csv(&entries).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,account_id,source,detail,debit,credit,balance"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2026-04-06"));
        assert!(row.contains("obligation"));
        assert!(row.contains("10000"));
    }
}
