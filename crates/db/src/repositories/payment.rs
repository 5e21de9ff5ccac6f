//! Payment repository: registration, evidence, settlement, cash pool.
//!
//! Settlement persists an allocation plan computed by the pure allocator in
//! `aula-core`. Everything that touches more than one row happens inside a
//! single database transaction, and every fact the decision depends on
//! (pending obligations, the cash pool, the closing boundary) is re-read
//! inside that transaction.

use aula_core::settlement::{self, AllocationPlan, PendingObligation};
use aula_core::treasury::cash_pool::{self, CashPool, CashPoolError};
use aula_core::treasury::evidence::{self, Evidence, EvidenceError};
use aula_shared::types::ObligationId;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    accounts, applications, obligations, payments,
    sea_orm_active_enums::{
        ObligationKind, ObligationState, PaymentDirection, PaymentMethod, PaymentState,
    },
};
use crate::repositories::{closing, obligation};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Payment amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The date falls inside a closed period.
    #[error("Date {date} falls in a closed period (closed through {closed_through})")]
    PeriodClosed {
        /// The rejected movement date.
        date: NaiveDate,
        /// Boundary of the closed period.
        closed_through: NaiveDate,
    },

    /// A payout would drive the cash pool negative.
    #[error("Payout of {requested} exceeds available cash pool of {available}")]
    WouldOverdraw {
        /// Net pool before the payout.
        available: Decimal,
        /// Requested payout amount.
        requested: Decimal,
    },

    /// Evidence is missing or incomplete for the payment method.
    #[error(transparent)]
    EvidenceIncomplete(#[from] EvidenceError),

    /// Evidence has already been attached to this payment.
    #[error("Payment {0} already has evidence attached")]
    EvidenceAlreadyAttached(Uuid),

    /// Receipt number already used within the account.
    #[error("Receipt number '{0}' already used for this account")]
    DuplicateReceipt(String),

    /// Payment has already been finalized.
    #[error("Payment {0} has already been finalized")]
    AlreadyFinalized(Uuid),

    /// Finalize target must be a confirmed state.
    #[error("Finalize target must be 'completed' or 'verified'")]
    InvalidTargetState,

    /// Stored obligation data failed an allocator precondition.
    #[error("Settlement rejected stored data: {0}")]
    Settlement(#[from] settlement::SettlementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CashPoolError> for PaymentError {
    fn from(err: CashPoolError) -> Self {
        match err {
            CashPoolError::WouldOverdraw {
                available,
                requested,
            } => Self::WouldOverdraw {
                available,
                requested,
            },
            CashPoolError::NonPositiveAmount(amount) => Self::NonPositiveAmount(amount),
        }
    }
}

/// Input for registering a payment.
#[derive(Debug, Clone)]
pub struct RegisterPaymentInput {
    /// Account the payment belongs to.
    pub account_id: Uuid,
    /// Inflow (collection) or outflow (payout).
    pub direction: PaymentDirection,
    /// Payment amount.
    pub amount: Decimal,
    /// The day the money moved.
    pub pay_date: NaiveDate,
    /// Payment method.
    pub method: PaymentMethod,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Optional free-text detail.
    pub detail: Option<String>,
}

/// Result of finalizing a payment: the plan as persisted.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    /// The payment in its confirmed state.
    pub payment: payments::Model,
    /// Application rows written by this settlement.
    pub applications: Vec<applications::Model>,
    /// Money left over after every pending obligation settled.
    pub credit_remainder: Decimal,
}

/// Sums confirmed payments into the cash pool.
///
/// Generic over the connection: payout checks read the pool inside their own
/// transaction.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn cash_pool<C: ConnectionTrait>(conn: &C) -> Result<CashPool, DbErr> {
    let rows: Vec<(PaymentDirection, Option<Decimal>)> = payments::Entity::find()
        .select_only()
        .column(payments::Column::Direction)
        .column_as(payments::Column::Amount.sum(), "total")
        .filter(payments::Column::State.is_in([PaymentState::Completed, PaymentState::Verified]))
        .group_by(payments::Column::Direction)
        .into_tuple()
        .all(conn)
        .await?;

    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;
    for (direction, total) in rows {
        let total = total.unwrap_or_default();
        match direction {
            PaymentDirection::Inflow => inflow = total,
            PaymentDirection::Outflow => outflow = total,
        }
    }

    Ok(CashPool::new(inflow, outflow))
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a payment in `pending` state.
    ///
    /// Payouts are checked against the cash pool here and again at finalize;
    /// the pool itself only moves when a payment reaches a confirmed state.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the account does not
    /// exist, the date falls in a closed period, a payout would overdraw the
    /// pool, or a database operation fails.
    pub async fn register(
        &self,
        input: RegisterPaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount(input.amount));
        }

        let txn = self.db.begin().await?;

        ensure_period_open(&txn, input.pay_date).await?;

        accounts::Entity::find_by_id(input.account_id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::AccountNotFound(input.account_id))?;

        if input.direction == PaymentDirection::Outflow {
            let pool = cash_pool(&txn).await?;
            cash_pool::check_payout(pool, input.amount)?;
        }

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(input.account_id),
            direction: Set(input.direction),
            amount: Set(input.amount),
            pay_date: Set(input.pay_date),
            method: Set(input.method),
            state: Set(PaymentState::Pending),
            receipt_number: Set(None),
            receipt_date: Set(None),
            receipt_url: Set(None),
            reference: Set(input.reference),
            detail: Set(input.detail),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let stored = payment.insert(&txn).await?;
        txn.commit().await?;

        Ok(stored)
    }

    /// Attaches receipt evidence to a pending payment.
    ///
    /// Evidence is write-once: a payment that already carries a receipt URL
    /// rejects the attempt, and a receipt number may not repeat within the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist, already carries
    /// evidence, the receipt number is a duplicate, or a database operation
    /// fails.
    pub async fn attach_evidence(
        &self,
        payment_id: Uuid,
        evidence: Evidence,
    ) -> Result<payments::Model, PaymentError> {
        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;

        if payment.receipt_url.is_some() {
            return Err(PaymentError::EvidenceAlreadyAttached(payment_id));
        }

        if let Some(number) = &evidence.receipt_number {
            let duplicate = payments::Entity::find()
                .filter(payments::Column::AccountId.eq(payment.account_id))
                .filter(payments::Column::ReceiptNumber.eq(number.clone()))
                .filter(payments::Column::Id.ne(payment_id))
                .one(&txn)
                .await?;
            if duplicate.is_some() {
                return Err(PaymentError::DuplicateReceipt(number.clone()));
            }
        }

        let mut active: payments::ActiveModel = payment.into();
        active.receipt_number = Set(evidence.receipt_number);
        active.receipt_date = Set(evidence.receipt_date);
        active.receipt_url = Set(evidence.receipt_url);
        active.updated_at = Set(Utc::now().into());

        let stored = active.update(&txn).await?;
        txn.commit().await?;

        Ok(stored)
    }

    /// Finalizes a payment: validates evidence, settles FIFO against the
    /// account's pending obligations, and moves the payment to `target`.
    ///
    /// The whole settlement is one transaction; pending obligations and the
    /// cash pool are re-read inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist or was already
    /// finalized, the target is not a confirmed state, evidence is
    /// incomplete for the method, the date falls in a closed period, a
    /// payout would overdraw the pool, or a database operation fails.
    pub async fn finalize(
        &self,
        payment_id: Uuid,
        target: PaymentState,
    ) -> Result<SettlementOutcome, PaymentError> {
        if !target.is_confirmed() {
            return Err(PaymentError::InvalidTargetState);
        }

        let txn = self.db.begin().await?;

        // SELECT ... FOR UPDATE: a concurrent finalize of the same payment
        // blocks here and then sees the confirmed state.
        let payment = payments::Entity::find_by_id(payment_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;

        if payment.state.is_confirmed() {
            return Err(PaymentError::AlreadyFinalized(payment_id));
        }

        ensure_period_open(&txn, payment.pay_date).await?;

        let method: evidence::PaymentMethod = payment.method.clone().into();
        let attached = Evidence {
            receipt_number: payment.receipt_number.clone(),
            receipt_date: payment.receipt_date,
            receipt_url: payment.receipt_url.clone(),
        };
        evidence::validate_evidence(method, &attached)?;

        if payment.direction == PaymentDirection::Outflow {
            let pool = cash_pool(&txn).await?;
            cash_pool::check_payout(pool, payment.amount)?;
        }

        let plan = plan_for(&txn, &payment).await?;
        let written = persist_plan(&txn, &payment, &plan).await?;

        let mut active: payments::ActiveModel = payment.into();
        active.state = Set(target);
        active.updated_at = Set(Utc::now().into());
        let stored = active.update(&txn).await?;

        txn.commit().await?;

        Ok(SettlementOutcome {
            payment: stored,
            applications: written,
            credit_remainder: plan.credit_remainder,
        })
    }

    /// Computes the allocation plan a finalize would persist, without
    /// writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist or a database
    /// operation fails.
    pub async fn preview(&self, payment_id: Uuid) -> Result<AllocationPlan, PaymentError> {
        let payment = payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let pending = obligation::list_pending(
            &self.db,
            payment.account_id,
            settled_kind(payment.direction),
        )
        .await?;

        let plan = settlement::allocate(payment.amount, &as_pending(&pending))?;
        Ok(plan)
    }

    /// Applications written for a payment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist or a database
    /// operation fails.
    pub async fn applications_for(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<applications::Model>, PaymentError> {
        payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let rows = applications::Entity::find()
            .filter(applications::Column::PaymentId.eq(payment_id))
            .order_by_asc(applications::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Returns a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist or the database
    /// operation fails.
    pub async fn get(&self, payment_id: Uuid) -> Result<payments::Model, PaymentError> {
        payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    /// The current cash pool: confirmed inflows and outflows.
    ///
    /// Always derived from the payment journal, never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn cash_pool(&self) -> Result<CashPool, PaymentError> {
        let pool = cash_pool(&self.db).await?;
        Ok(pool)
    }
}

/// Rejects the date if it falls on or before the latest closing boundary.
async fn ensure_period_open(
    txn: &DatabaseTransaction,
    date: NaiveDate,
) -> Result<(), PaymentError> {
    if let Some(closed_through) = closing::latest_closed_through(txn).await? {
        if date <= closed_through {
            return Err(PaymentError::PeriodClosed {
                date,
                closed_through,
            });
        }
    }
    Ok(())
}

/// The obligation kind a payment direction settles.
const fn settled_kind(direction: PaymentDirection) -> ObligationKind {
    match direction {
        PaymentDirection::Inflow => ObligationKind::ChargeSession,
        PaymentDirection::Outflow => ObligationKind::PayoutSession,
    }
}

fn as_pending(rows: &[obligations::Model]) -> Vec<PendingObligation> {
    rows.iter()
        .map(|row| PendingObligation {
            id: ObligationId::from_uuid(row.id),
            remaining: row.remaining,
        })
        .collect()
}

/// Runs the allocator against the pending obligations read inside `txn`.
async fn plan_for(
    txn: &DatabaseTransaction,
    payment: &payments::Model,
) -> Result<AllocationPlan, PaymentError> {
    let pending =
        obligation::list_pending(txn, payment.account_id, settled_kind(payment.direction)).await?;
    let plan = settlement::allocate(payment.amount, &as_pending(&pending))?;
    Ok(plan)
}

/// Writes the plan: application rows, decremented remainders, settled flips.
async fn persist_plan(
    txn: &DatabaseTransaction,
    payment: &payments::Model,
    plan: &AllocationPlan,
) -> Result<Vec<applications::Model>, PaymentError> {
    let now = Utc::now().into();
    let mut written = Vec::with_capacity(plan.allocations.len());

    for allocation in &plan.allocations {
        let obligation_id = allocation.obligation_id.into_inner();

        let application = applications::ActiveModel {
            id: Set(Uuid::now_v7()),
            obligation_id: Set(obligation_id),
            payment_id: Set(payment.id),
            amount: Set(allocation.amount),
            created_at: Set(now),
        };
        written.push(application.insert(txn).await?);

        let stored = obligations::Entity::find_by_id(obligation_id)
            .one(txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("obligation {obligation_id}")))?;

        let remaining = stored.remaining - allocation.amount;
        let mut active: obligations::ActiveModel = stored.into();
        active.remaining = Set(remaining);
        if allocation.settles_obligation {
            active.state = Set(ObligationState::Settled);
        }
        active.update(txn).await?;
    }

    Ok(written)
}
