//! Journal repository: the diary and the expected-vs-real comparison.
//!
//! Expected movements come from obligations (by accrual date), real
//! movements from confirmed payments (by pay date). The two sources stay
//! disjoint; the pure merge and running-balance rules live in `aula-core`.

use aula_core::journal::{
    self, DayComparison, DayFlow, DiaryEntry, EntrySource, JournalRow,
};
use aula_shared::types::AccountId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::entities::{
    obligations, payments,
    sea_orm_active_enums::{ObligationKind, ObligationState, PaymentDirection, PaymentState},
};

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// The range is inverted.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        /// Range start.
        from: NaiveDate,
        /// Range end.
        to: NaiveDate,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The diary: obligations and confirmed payments in one dated ledger
    /// with a per-account running balance.
    ///
    /// Charges and payouts post as debit and credit expected movements;
    /// inflows and outflows post as credit and debit real movements, so the
    /// balance trends back toward zero as money settles. Pending obligations
    /// are included only when `include_pending` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or a database operation
    /// fails.
    pub async fn diary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<Uuid>,
        include_pending: bool,
    ) -> Result<Vec<DiaryEntry>, JournalError> {
        check_range(from, to)?;

        let mut obligation_query = obligations::Entity::find()
            .filter(obligations::Column::AccrualDate.gte(from))
            .filter(obligations::Column::AccrualDate.lte(to));
        if !include_pending {
            obligation_query =
                obligation_query.filter(obligations::Column::State.eq(ObligationState::Settled));
        }
        if let Some(account_id) = account_id {
            obligation_query =
                obligation_query.filter(obligations::Column::AccountId.eq(account_id));
        }

        let mut payment_query = payments::Entity::find()
            .filter(payments::Column::PayDate.gte(from))
            .filter(payments::Column::PayDate.lte(to))
            .filter(payments::Column::State.is_in([
                PaymentState::Completed,
                PaymentState::Verified,
            ]));
        if let Some(account_id) = account_id {
            payment_query = payment_query.filter(payments::Column::AccountId.eq(account_id));
        }

        let mut rows: Vec<JournalRow> = Vec::new();

        for row in obligation_query.all(&self.db).await? {
            let (debit, credit) = match row.kind {
                ObligationKind::ChargeSession => (row.amount, Decimal::ZERO),
                ObligationKind::PayoutSession => (Decimal::ZERO, row.amount),
            };
            rows.push(JournalRow {
                id: row.id,
                date: row.accrual_date,
                account_id: AccountId::from_uuid(row.account_id),
                debit,
                credit,
                detail: row.detail,
                source: EntrySource::Obligation,
            });
        }

        for row in payment_query.all(&self.db).await? {
            let (debit, credit) = match row.direction {
                PaymentDirection::Inflow => (Decimal::ZERO, row.amount),
                PaymentDirection::Outflow => (row.amount, Decimal::ZERO),
            };
            rows.push(JournalRow {
                id: row.id,
                date: row.pay_date,
                account_id: AccountId::from_uuid(row.account_id),
                debit,
                credit,
                detail: row.detail.unwrap_or_default(),
                source: EntrySource::Payment,
            });
        }

        rows.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));

        Ok(journal::with_running_balance(rows))
    }

    /// Per-day expected (pending obligations) versus real (confirmed
    /// payments) totals over the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or a database operation
    /// fails.
    pub async fn expected_vs_real(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayComparison>, JournalError> {
        check_range(from, to)?;

        let mut expected: BTreeMap<NaiveDate, DayFlow> = BTreeMap::new();
        let pending = obligations::Entity::find()
            .filter(obligations::Column::AccrualDate.gte(from))
            .filter(obligations::Column::AccrualDate.lte(to))
            .filter(obligations::Column::State.eq(ObligationState::Pending))
            .all(&self.db)
            .await?;
        for row in pending {
            let flow = expected.entry(row.accrual_date).or_default();
            match row.kind {
                ObligationKind::ChargeSession => flow.add(row.remaining, Decimal::ZERO),
                ObligationKind::PayoutSession => flow.add(Decimal::ZERO, row.remaining),
            }
        }

        let mut real: BTreeMap<NaiveDate, DayFlow> = BTreeMap::new();
        let confirmed = payments::Entity::find()
            .filter(payments::Column::PayDate.gte(from))
            .filter(payments::Column::PayDate.lte(to))
            .filter(payments::Column::State.is_in([
                PaymentState::Completed,
                PaymentState::Verified,
            ]))
            .all(&self.db)
            .await?;
        for row in confirmed {
            let flow = real.entry(row.pay_date).or_default();
            match row.direction {
                PaymentDirection::Inflow => flow.add(row.amount, Decimal::ZERO),
                PaymentDirection::Outflow => flow.add(Decimal::ZERO, row.amount),
            }
        }

        Ok(journal::expected_vs_real(&expected, &real))
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), JournalError> {
    if from > to {
        return Err(JournalError::InvalidRange { from, to });
    }
    Ok(())
}
