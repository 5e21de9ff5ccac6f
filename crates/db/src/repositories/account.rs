//! Account repository for current account database operations.
//!
//! One account per person, keyed `(kind, owner_id)`. Creation always goes
//! through insert-on-conflict plus re-select so concurrent callers converge
//! on the same row.

use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter,
    QuerySelect, RelationTrait, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{
    accounts, applications, obligations, payments,
    sea_orm_active_enums::{
        AccountKind, ObligationKind, ObligationState, PaymentDirection, PaymentState,
    },
};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Balance summary of one guardian account.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GuardianAccountSummary {
    /// Account ID.
    pub account_id: Uuid,
    /// Guardian who owns the account.
    pub guardian_id: Uuid,
    /// Sum of `remaining` over pending charge obligations.
    pub pending_debt: Decimal,
    /// Confirmed inflows not yet applied to any obligation.
    pub credit_balance: Decimal,
    /// `pending_debt - credit_balance`: what the guardian still owes.
    pub net_balance: Decimal,
}

/// Balance summary of one tutor account.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TutorAccountSummary {
    /// Account ID.
    pub account_id: Uuid,
    /// Tutor who owns the account.
    pub tutor_id: Uuid,
    /// Sum of `remaining` over pending payout obligations.
    pub payable: Decimal,
    /// Confirmed outflows already paid to the tutor.
    pub paid: Decimal,
}

/// Inserts the account row if absent and returns the stored row.
///
/// Insert-on-conflict-do-nothing then re-select; concurrent callers race on
/// `UNIQUE (kind, owner_id)` and all land on the same row. Generic over the
/// connection so workflows can call it inside their own transaction.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn get_or_create<C: ConnectionTrait>(
    conn: &C,
    kind: AccountKind,
    owner_id: Uuid,
) -> Result<accounts::Model, AccountError> {
    let row = accounts::ActiveModel {
        id: Set(Uuid::now_v7()),
        kind: Set(kind.clone()),
        owner_id: Set(owner_id),
        created_at: Set(chrono::Utc::now().into()),
    };

    accounts::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([accounts::Column::Kind, accounts::Column::OwnerId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = accounts::Entity::find()
        .filter(accounts::Column::Kind.eq(kind))
        .filter(accounts::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("account for owner {owner_id}")))?;

    Ok(stored)
}

/// Account repository for current account operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the account for `(kind, owner_id)`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_or_create(
        &self,
        kind: AccountKind,
        owner_id: Uuid,
    ) -> Result<accounts::Model, AccountError> {
        get_or_create(&self.db, kind, owner_id).await
    }

    /// Returns an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the database
    /// operation fails.
    pub async fn get(&self, account_id: Uuid) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Balance summaries for every guardian account.
    ///
    /// `credit_balance` is confirmed inflows minus the applications carved
    /// out of them; it is always derived, never stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn guardian_summaries(&self) -> Result<Vec<GuardianAccountSummary>, AccountError> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::Kind.eq(AccountKind::Guardian))
            .all(&self.db)
            .await?;

        let pending = self
            .pending_remaining_by_account(ObligationKind::ChargeSession)
            .await?;
        let inflows = self
            .confirmed_totals_by_account(PaymentDirection::Inflow)
            .await?;
        let applied = self
            .applied_totals_by_account(PaymentDirection::Inflow)
            .await?;

        let summaries = accounts
            .into_iter()
            .map(|account| {
                let pending_debt = pending.get(&account.id).copied().unwrap_or_default();
                let collected = inflows.get(&account.id).copied().unwrap_or_default();
                let consumed = applied.get(&account.id).copied().unwrap_or_default();
                let credit_balance = collected - consumed;
                GuardianAccountSummary {
                    account_id: account.id,
                    guardian_id: account.owner_id,
                    pending_debt,
                    credit_balance,
                    net_balance: pending_debt - credit_balance,
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Balance summaries for every tutor account.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn tutor_summaries(&self) -> Result<Vec<TutorAccountSummary>, AccountError> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::Kind.eq(AccountKind::Tutor))
            .all(&self.db)
            .await?;

        let payable = self
            .pending_remaining_by_account(ObligationKind::PayoutSession)
            .await?;
        let paid = self
            .confirmed_totals_by_account(PaymentDirection::Outflow)
            .await?;

        let summaries = accounts
            .into_iter()
            .map(|account| TutorAccountSummary {
                account_id: account.id,
                tutor_id: account.owner_id,
                payable: payable.get(&account.id).copied().unwrap_or_default(),
                paid: paid.get(&account.id).copied().unwrap_or_default(),
            })
            .collect();

        Ok(summaries)
    }

    /// Sums `remaining` over pending obligations of one kind, per account.
    async fn pending_remaining_by_account(
        &self,
        kind: ObligationKind,
    ) -> Result<HashMap<Uuid, Decimal>, AccountError> {
        let rows: Vec<(Uuid, Option<Decimal>)> = obligations::Entity::find()
            .select_only()
            .column(obligations::Column::AccountId)
            .column_as(obligations::Column::Remaining.sum(), "total")
            .filter(obligations::Column::Kind.eq(kind))
            .filter(obligations::Column::State.eq(ObligationState::Pending))
            .group_by(obligations::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(collect_totals(rows))
    }

    /// Sums confirmed payment amounts in one direction, per account.
    async fn confirmed_totals_by_account(
        &self,
        direction: PaymentDirection,
    ) -> Result<HashMap<Uuid, Decimal>, AccountError> {
        let rows: Vec<(Uuid, Option<Decimal>)> = payments::Entity::find()
            .select_only()
            .column(payments::Column::AccountId)
            .column_as(payments::Column::Amount.sum(), "total")
            .filter(payments::Column::Direction.eq(direction))
            .filter(payments::Column::State.is_in([PaymentState::Completed, PaymentState::Verified]))
            .group_by(payments::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(collect_totals(rows))
    }

    /// Sums application amounts carved out of one direction's payments, per
    /// account.
    async fn applied_totals_by_account(
        &self,
        direction: PaymentDirection,
    ) -> Result<HashMap<Uuid, Decimal>, AccountError> {
        let rows: Vec<(Uuid, Option<Decimal>)> = applications::Entity::find()
            .select_only()
            .column(payments::Column::AccountId)
            .column_as(applications::Column::Amount.sum(), "total")
            .join(JoinType::InnerJoin, applications::Relation::Payments.def())
            .filter(payments::Column::Direction.eq(direction))
            .group_by(payments::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(collect_totals(rows))
    }
}

fn collect_totals(rows: Vec<(Uuid, Option<Decimal>)>) -> HashMap<Uuid, Decimal> {
    rows.into_iter()
        .map(|(account_id, total)| (account_id, total.unwrap_or_default()))
        .collect()
}
