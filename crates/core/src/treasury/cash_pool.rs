//! Cash pool ("bolsa") aggregation and the payout cap.
//!
//! The pool is a read-side aggregate over confirmed payments only. It is
//! recomputed from the payment journal on every read and never cached, so it
//! cannot drift from the journal.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// The academy's net real cash on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CashPool {
    /// Sum of confirmed inflows (guardian collections).
    pub inflow: Decimal,
    /// Sum of confirmed outflows (tutor payouts).
    pub outflow: Decimal,
}

impl CashPool {
    /// An empty pool.
    pub const ZERO: Self = Self {
        inflow: Decimal::ZERO,
        outflow: Decimal::ZERO,
    };

    /// Creates a pool from confirmed totals.
    #[must_use]
    pub const fn new(inflow: Decimal, outflow: Decimal) -> Self {
        Self { inflow, outflow }
    }

    /// Net cash on hand.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.inflow - self.outflow
    }
}

/// Cash pool rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CashPoolError {
    /// The payout would drive the net pool negative.
    #[error("payout of {requested} exceeds available cash pool of {available}")]
    WouldOverdraw {
        /// Net pool before the payout.
        available: Decimal,
        /// Requested payout amount.
        requested: Decimal,
    },

    /// Payout amount must be strictly positive.
    #[error("payout amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

/// Checks whether a tutor payout fits inside the confirmed cash pool.
///
/// The net pool must never go negative as a result of a payout; a payout of
/// exactly the net pool is allowed. Guardian collections have no such cap.
///
/// # Errors
///
/// Returns an error if the amount is not positive or would overdraw the pool.
pub fn check_payout(pool: CashPool, amount: Decimal) -> Result<(), CashPoolError> {
    if amount <= Decimal::ZERO {
        return Err(CashPoolError::NonPositiveAmount(amount));
    }

    let available = pool.net();
    if amount > available {
        return Err(CashPoolError::WouldOverdraw {
            available,
            requested: amount,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_net() {
        let pool = CashPool::new(dec!(50000), dec!(12000));
        assert_eq!(pool.net(), dec!(38000));
    }

    #[test]
    fn test_payout_up_to_net_allowed() {
        let pool = CashPool::new(dec!(50000), Decimal::ZERO);
        assert!(check_payout(pool, dec!(50000)).is_ok());
    }

    #[test]
    fn test_payout_beyond_net_rejected() {
        let pool = CashPool::new(dec!(50000), dec!(50000));
        assert_eq!(
            check_payout(pool, dec!(1)),
            Err(CashPoolError::WouldOverdraw {
                available: Decimal::ZERO,
                requested: dec!(1),
            })
        );
    }

    #[test]
    fn test_payout_accounts_for_prior_outflows() {
        let pool = CashPool::new(dec!(50000), dec!(30000));
        assert!(check_payout(pool, dec!(20000)).is_ok());
        assert!(check_payout(pool, dec!(20001)).is_err());
    }

    #[test]
    fn test_non_positive_payout_rejected() {
        let pool = CashPool::new(dec!(1000), Decimal::ZERO);
        assert!(matches!(
            check_payout(pool, Decimal::ZERO),
            Err(CashPoolError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            check_payout(pool, dec!(-10)),
            Err(CashPoolError::NonPositiveAmount(_))
        ));
    }
}
