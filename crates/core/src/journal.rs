//! Diary and reconciliation computations.
//!
//! Pure transforms over rows the database layer has already fetched and
//! ordered. The diary carries a running balance per account; the
//! expected-vs-real view compares pending obligations (by accrual date)
//! against confirmed payments (by pay date) - two intentionally disjoint
//! sources, so a gap between them is a business signal.

use std::collections::{BTreeMap, HashMap};

use aula_shared::types::AccountId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Where a diary row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// An expected movement (a pending or settled obligation).
    Obligation,
    /// A real movement (a confirmed payment).
    Payment,
}

/// One fetched journal row, ordered `(date, id)` by the caller.
#[derive(Debug, Clone)]
pub struct JournalRow {
    /// Row ID (obligation or payment ID).
    pub id: Uuid,
    /// Movement date (accrual date or pay date).
    pub date: NaiveDate,
    /// Account the movement belongs to.
    pub account_id: AccountId,
    /// Amount owed to the academy (charges) for this row.
    pub debit: Decimal,
    /// Amount flowing out of the account's debt (collections, payouts).
    pub credit: Decimal,
    /// Free-text detail.
    pub detail: String,
    /// Which journal the row came from.
    pub source: EntrySource,
}

/// A diary entry: a journal row plus its account's running balance.
#[derive(Debug, Clone, Serialize)]
pub struct DiaryEntry {
    /// Row ID.
    pub id: Uuid,
    /// Movement date.
    pub date: NaiveDate,
    /// Account.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running balance for this account after the row.
    pub balance: Decimal,
    /// Free-text detail.
    pub detail: String,
    /// Row source.
    pub source: EntrySource,
}

/// Attaches a per-account running balance to ordered journal rows.
///
/// Rows must already be in `(date, id)` order; the balance after each row is
/// the account's cumulative `debit - credit` so far.
#[must_use]
pub fn with_running_balance(rows: Vec<JournalRow>) -> Vec<DiaryEntry> {
    let mut balances: HashMap<AccountId, Decimal> = HashMap::new();
    let mut entries = Vec::with_capacity(rows.len());

    for row in rows {
        let balance = balances.entry(row.account_id).or_insert(Decimal::ZERO);
        *balance += row.debit - row.credit;

        entries.push(DiaryEntry {
            id: row.id,
            date: row.date,
            account_id: row.account_id,
            debit: row.debit,
            credit: row.credit,
            balance: *balance,
            detail: row.detail,
            source: row.source,
        });
    }

    entries
}

/// Debit/credit totals for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayFlow {
    /// Total debits.
    pub debit: Decimal,
    /// Total credits.
    pub credit: Decimal,
}

impl DayFlow {
    /// Adds a movement to the day's totals.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }
}

/// One day of expected-vs-real comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayComparison {
    /// The day.
    pub date: NaiveDate,
    /// Pending obligations accrued that day: charges.
    pub expected_debit: Decimal,
    /// Pending obligations accrued that day: payouts.
    pub expected_credit: Decimal,
    /// Confirmed payments dated that day: inflows.
    pub real_debit: Decimal,
    /// Confirmed payments dated that day: outflows.
    pub real_credit: Decimal,
}

/// Merges the expected and real day series into one dated comparison.
///
/// Days present in either series appear in the output, in date order, with
/// zeroes on the side that has no movements.
#[must_use]
pub fn expected_vs_real(
    expected: &BTreeMap<NaiveDate, DayFlow>,
    real: &BTreeMap<NaiveDate, DayFlow>,
) -> Vec<DayComparison> {
    let mut dates: Vec<NaiveDate> = expected.keys().chain(real.keys()).copied().collect();
    dates.sort_unstable();
    dates.dedup();

    dates
        .into_iter()
        .map(|date| {
            let exp = expected.get(&date).copied().unwrap_or_default();
            let act = real.get(&date).copied().unwrap_or_default();
            DayComparison {
                date,
                expected_debit: exp.debit,
                expected_credit: exp.credit,
                real_debit: act.debit,
                real_credit: act.credit,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn row(d: u32, account: AccountId, debit: Decimal, credit: Decimal) -> JournalRow {
        JournalRow {
            id: Uuid::now_v7(),
            date: date(d),
            account_id: account,
            debit,
            credit,
            detail: String::new(),
            source: EntrySource::Obligation,
        }
    }

    #[test]
    fn test_running_balance_single_account() {
        let account = AccountId::new();
        let rows = vec![
            row(1, account, dec!(10000), Decimal::ZERO),
            row(2, account, dec!(5000), Decimal::ZERO),
            row(3, account, Decimal::ZERO, dec!(12000)),
        ];

        let entries = with_running_balance(rows);
        assert_eq!(entries[0].balance, dec!(10000));
        assert_eq!(entries[1].balance, dec!(15000));
        assert_eq!(entries[2].balance, dec!(3000));
    }

    #[test]
    fn test_running_balance_is_per_account() {
        let a = AccountId::new();
        let b = AccountId::new();
        let rows = vec![
            row(1, a, dec!(1000), Decimal::ZERO),
            row(1, b, dec!(700), Decimal::ZERO),
            row(2, a, dec!(500), Decimal::ZERO),
        ];

        let entries = with_running_balance(rows);
        assert_eq!(entries[0].balance, dec!(1000));
        assert_eq!(entries[1].balance, dec!(700));
        assert_eq!(entries[2].balance, dec!(1500));
    }

    #[test]
    fn test_expected_vs_real_merges_days() {
        let mut expected = BTreeMap::new();
        expected.insert(
            date(1),
            DayFlow {
                debit: dec!(10000),
                credit: Decimal::ZERO,
            },
        );
        expected.insert(
            date(3),
            DayFlow {
                debit: dec!(5000),
                credit: dec!(2000),
            },
        );

        let mut real = BTreeMap::new();
        real.insert(
            date(1),
            DayFlow {
                debit: dec!(8000),
                credit: Decimal::ZERO,
            },
        );
        real.insert(
            date(2),
            DayFlow {
                debit: dec!(2000),
                credit: Decimal::ZERO,
            },
        );

        let days = expected_vs_real(&expected, &real);
        assert_eq!(days.len(), 3);

        assert_eq!(days[0].date, date(1));
        assert_eq!(days[0].expected_debit, dec!(10000));
        assert_eq!(days[0].real_debit, dec!(8000));

        assert_eq!(days[1].date, date(2));
        assert_eq!(days[1].expected_debit, Decimal::ZERO);
        assert_eq!(days[1].real_debit, dec!(2000));

        assert_eq!(days[2].date, date(3));
        assert_eq!(days[2].expected_credit, dec!(2000));
        assert_eq!(days[2].real_debit, Decimal::ZERO);
    }

    #[test]
    fn test_expected_vs_real_empty() {
        let days = expected_vs_real(&BTreeMap::new(), &BTreeMap::new());
        assert!(days.is_empty());
    }
}
