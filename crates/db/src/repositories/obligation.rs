//! Obligation repository for the obligation ledger.
//!
//! Obligations are idempotent on `(session_id, kind)`: re-running the
//! workflow that produced one lands on the existing row instead of
//! double-charging.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::{
    obligations,
    sea_orm_active_enums::{ObligationKind, ObligationState},
};

/// Error types for obligation operations.
#[derive(Debug, thiserror::Error)]
pub enum ObligationError {
    /// Obligation amount must be positive.
    #[error("Obligation amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an obligation.
#[derive(Debug, Clone)]
pub struct NewObligation {
    /// Charge or payout.
    pub kind: ObligationKind,
    /// Account the obligation belongs to.
    pub account_id: Uuid,
    /// Face amount; `remaining` starts equal to it.
    pub amount: Decimal,
    /// The day the obligation accrued.
    pub accrual_date: NaiveDate,
    /// Session that produced the obligation.
    pub session_id: Uuid,
    /// Student context, when known.
    pub student_id: Option<Uuid>,
    /// Tutor context, when known.
    pub tutor_id: Option<Uuid>,
    /// Course context, when known.
    pub course_id: Option<Uuid>,
    /// Enrollment context, when known.
    pub enrollment_id: Option<Uuid>,
    /// Free-text detail shown in the journal.
    pub detail: String,
}

/// Inserts the obligation if no row exists for `(session_id, kind)` and
/// returns the stored row.
///
/// Generic over the connection so session completion can call it inside its
/// own transaction.
///
/// # Errors
///
/// Returns an error if the amount is not positive or the database operation
/// fails.
pub async fn create_if_absent<C: ConnectionTrait>(
    conn: &C,
    input: NewObligation,
) -> Result<obligations::Model, ObligationError> {
    if input.amount <= Decimal::ZERO {
        return Err(ObligationError::NonPositiveAmount(input.amount));
    }

    let row = obligations::ActiveModel {
        id: Set(Uuid::now_v7()),
        kind: Set(input.kind.clone()),
        account_id: Set(input.account_id),
        amount: Set(input.amount),
        remaining: Set(input.amount),
        accrual_date: Set(input.accrual_date),
        state: Set(ObligationState::Pending),
        session_id: Set(input.session_id),
        student_id: Set(input.student_id),
        tutor_id: Set(input.tutor_id),
        course_id: Set(input.course_id),
        enrollment_id: Set(input.enrollment_id),
        detail: Set(input.detail),
        created_at: Set(Utc::now().into()),
    };

    obligations::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([obligations::Column::SessionId, obligations::Column::Kind])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = obligations::Entity::find()
        .filter(obligations::Column::SessionId.eq(input.session_id))
        .filter(obligations::Column::Kind.eq(input.kind))
        .one(conn)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("obligation for session {}", input.session_id))
        })?;

    Ok(stored)
}

/// Pending obligations for one account, oldest accrual first.
///
/// The `(accrual_date ASC, id ASC)` order is the FIFO order the settlement
/// allocator consumes; IDs are time-ordered UUIDs so same-day obligations
/// settle in creation order.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn list_pending<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    kind: ObligationKind,
) -> Result<Vec<obligations::Model>, DbErr> {
    obligations::Entity::find()
        .filter(obligations::Column::AccountId.eq(account_id))
        .filter(obligations::Column::Kind.eq(kind))
        .filter(obligations::Column::State.eq(ObligationState::Pending))
        .order_by_asc(obligations::Column::AccrualDate)
        .order_by_asc(obligations::Column::Id)
        .all(conn)
        .await
}

/// Obligation repository.
#[derive(Debug, Clone)]
pub struct ObligationRepository {
    db: DatabaseConnection,
}

impl ObligationRepository {
    /// Creates a new obligation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an obligation if none exists for `(session_id, kind)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the database
    /// operation fails.
    pub async fn create_if_absent(
        &self,
        input: NewObligation,
    ) -> Result<obligations::Model, ObligationError> {
        create_if_absent(&self.db, input).await
    }

    /// Pending obligations of one kind for an account, in settlement order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_pending(
        &self,
        account_id: Uuid,
        kind: ObligationKind,
    ) -> Result<Vec<obligations::Model>, ObligationError> {
        let rows = list_pending(&self.db, account_id, kind).await?;
        Ok(rows)
    }

    /// Obligations for an account, optionally restricted to one state, in
    /// settlement order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_for_account(
        &self,
        account_id: Uuid,
        state: Option<ObligationState>,
    ) -> Result<Vec<obligations::Model>, ObligationError> {
        let mut query = obligations::Entity::find()
            .filter(obligations::Column::AccountId.eq(account_id));

        if let Some(state) = state {
            query = query.filter(obligations::Column::State.eq(state));
        }

        let rows = query
            .order_by_asc(obligations::Column::AccrualDate)
            .order_by_asc(obligations::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}
