//! The FIFO allocator.
//!
//! Allocation is a pure, deterministic function of the payment amount and
//! the ordered list of pending obligations. The same inputs always yield the
//! same plan, so a plan can be previewed before a payment is confirmed and
//! recomputed for real at confirmation time. Persistence (and its
//! transactional guarantees) lives in the database layer.

use aula_shared::types::ObligationId;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::SettlementError;

/// A pending obligation as seen by the allocator.
///
/// Callers must supply these in FIFO order: `accrual_date` ascending, ties
/// broken by insertion order. The allocator consumes them front to back and
/// never reorders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingObligation {
    /// Obligation ID.
    pub id: ObligationId,
    /// Unsettled balance (0 < remaining <= original amount).
    pub remaining: Decimal,
}

/// One planned application of a payment to an obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAllocation {
    /// Target obligation.
    pub obligation_id: ObligationId,
    /// Amount applied to it.
    pub amount: Decimal,
    /// Whether this application drives the obligation's remaining to zero.
    pub settles_obligation: bool,
}

/// The result of allocating one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPlan {
    /// Applications in FIFO order.
    pub allocations: Vec<PlannedAllocation>,
    /// Unallocated remainder, carried forward as account credit.
    pub credit_remainder: Decimal,
}

impl AllocationPlan {
    /// Sum of all planned application amounts.
    #[must_use]
    pub fn allocated_total(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

/// Allocates a payment across pending obligations, oldest first.
///
/// Walks `pending` in the order given, applying
/// `min(remaining_to_allocate, obligation.remaining)` to each obligation
/// until the payment is exhausted. Whatever cannot be allocated becomes the
/// account's credit balance - an overpayment is never discarded.
///
/// Obligations with a zero remaining balance are skipped without producing
/// an application.
///
/// # Errors
///
/// Returns an error if `payment_amount` is not strictly positive, or if any
/// obligation carries a negative remaining balance.
pub fn allocate(
    payment_amount: Decimal,
    pending: &[PendingObligation],
) -> Result<AllocationPlan, SettlementError> {
    if payment_amount <= Decimal::ZERO {
        return Err(SettlementError::NonPositiveAmount(payment_amount));
    }

    let mut remaining_to_allocate = payment_amount;
    let mut allocations = Vec::new();

    for obligation in pending {
        if obligation.remaining < Decimal::ZERO {
            return Err(SettlementError::CorruptRemaining {
                id: obligation.id,
                remaining: obligation.remaining,
            });
        }

        if remaining_to_allocate.is_zero() {
            break;
        }

        let alloc = remaining_to_allocate.min(obligation.remaining);
        if alloc.is_zero() {
            continue;
        }

        allocations.push(PlannedAllocation {
            obligation_id: obligation.id,
            amount: alloc,
            settles_obligation: alloc == obligation.remaining,
        });
        remaining_to_allocate -= alloc;
    }

    Ok(AllocationPlan {
        allocations,
        credit_remainder: remaining_to_allocate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending(amounts: &[Decimal]) -> Vec<PendingObligation> {
        amounts
            .iter()
            .map(|&remaining| PendingObligation {
                id: ObligationId::new(),
                remaining,
            })
            .collect()
    }

    #[test]
    fn test_exact_payment_settles_single_obligation() {
        let obligations = pending(&[dec!(10000)]);
        let plan = allocate(dec!(10000), &obligations).unwrap();

        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].amount, dec!(10000));
        assert!(plan.allocations[0].settles_obligation);
        assert_eq!(plan.credit_remainder, Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_becomes_credit() {
        let obligations = pending(&[dec!(10000)]);
        let plan = allocate(dec!(15000), &obligations).unwrap();

        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].amount, dec!(10000));
        assert!(plan.allocations[0].settles_obligation);
        assert_eq!(plan.credit_remainder, dec!(5000));
    }

    #[test]
    fn test_partial_payment_leaves_obligation_open() {
        let obligations = pending(&[dec!(10000)]);
        let plan = allocate(dec!(4000), &obligations).unwrap();

        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].amount, dec!(4000));
        assert!(!plan.allocations[0].settles_obligation);
        assert_eq!(plan.credit_remainder, Decimal::ZERO);
    }

    #[test]
    fn test_fifo_order_oldest_settled_first() {
        // d1 = 5000, d2 = 5000, d3 = 5000; payment covers d1 and part of d2.
        let obligations = pending(&[dec!(5000), dec!(5000), dec!(5000)]);
        let plan = allocate(dec!(8000), &obligations).unwrap();

        assert_eq!(plan.allocations.len(), 2);
        assert_eq!(plan.allocations[0].obligation_id, obligations[0].id);
        assert_eq!(plan.allocations[0].amount, dec!(5000));
        assert!(plan.allocations[0].settles_obligation);
        assert_eq!(plan.allocations[1].obligation_id, obligations[1].id);
        assert_eq!(plan.allocations[1].amount, dec!(3000));
        assert!(!plan.allocations[1].settles_obligation);
        assert_eq!(plan.credit_remainder, Decimal::ZERO);
    }

    #[test]
    fn test_no_pending_obligations_all_credit() {
        let plan = allocate(dec!(2500), &[]).unwrap();
        assert!(plan.allocations.is_empty());
        assert_eq!(plan.credit_remainder, dec!(2500));
    }

    #[test]
    fn test_zero_remaining_obligations_skipped() {
        let obligations = vec![
            PendingObligation {
                id: ObligationId::new(),
                remaining: Decimal::ZERO,
            },
            PendingObligation {
                id: ObligationId::new(),
                remaining: dec!(3000),
            },
        ];
        let plan = allocate(dec!(1000), &obligations).unwrap();

        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].obligation_id, obligations[1].id);
        assert_eq!(plan.allocations[0].amount, dec!(1000));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert_eq!(
            allocate(Decimal::ZERO, &[]),
            Err(SettlementError::NonPositiveAmount(Decimal::ZERO))
        );
        assert!(matches!(
            allocate(dec!(-5), &[]),
            Err(SettlementError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_rejects_corrupt_remaining() {
        let obligations = pending(&[dec!(-100)]);
        assert!(matches!(
            allocate(dec!(1000), &obligations),
            Err(SettlementError::CorruptRemaining { .. })
        ));
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let obligations = pending(&[dec!(1200), dec!(800), dec!(950.50)]);
        let a = allocate(dec!(2000), &obligations).unwrap();
        let b = allocate(dec!(2000), &obligations).unwrap();
        assert_eq!(a, b);
    }
}
