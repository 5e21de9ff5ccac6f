//! Property tests for the FIFO allocator.

use aula_shared::types::ObligationId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocator::{PendingObligation, allocate};

/// Strategy for positive decimal amounts with two decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a FIFO-ordered list of pending obligations.
fn pending_strategy() -> impl Strategy<Value = Vec<PendingObligation>> {
    prop::collection::vec(amount_strategy(), 0..12).prop_map(|amounts| {
        amounts
            .into_iter()
            .map(|remaining| PendingObligation {
                id: ObligationId::new(),
                remaining,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every unit of the payment is accounted for: allocated total plus
    /// credit remainder equals the payment amount exactly.
    #[test]
    fn prop_conservation(
        payment in amount_strategy(),
        pending in pending_strategy(),
    ) {
        let plan = allocate(payment, &pending).unwrap();
        prop_assert_eq!(plan.allocated_total() + plan.credit_remainder, payment);
    }

    /// A payment never allocates more than its own amount.
    #[test]
    fn prop_no_overspend(
        payment in amount_strategy(),
        pending in pending_strategy(),
    ) {
        let plan = allocate(payment, &pending).unwrap();
        prop_assert!(plan.allocated_total() <= payment);
        prop_assert!(plan.credit_remainder >= Decimal::ZERO);
    }

    /// No application exceeds the remaining balance of its obligation.
    #[test]
    fn prop_applications_bounded_by_remaining(
        payment in amount_strategy(),
        pending in pending_strategy(),
    ) {
        let plan = allocate(payment, &pending).unwrap();
        for alloc in &plan.allocations {
            let obligation = pending
                .iter()
                .find(|o| o.id == alloc.obligation_id)
                .unwrap();
            prop_assert!(alloc.amount > Decimal::ZERO);
            prop_assert!(alloc.amount <= obligation.remaining);
            prop_assert_eq!(
                alloc.settles_obligation,
                alloc.amount == obligation.remaining
            );
        }
    }

    /// FIFO prefix: allocations hit a prefix of the pending list, every
    /// obligation before the last touched one is fully settled, and only the
    /// last touched one may be partial.
    #[test]
    fn prop_fifo_prefix(
        payment in amount_strategy(),
        pending in pending_strategy(),
    ) {
        let plan = allocate(payment, &pending).unwrap();
        let touched = plan.allocations.len();

        for (i, alloc) in plan.allocations.iter().enumerate() {
            prop_assert_eq!(alloc.obligation_id, pending[i].id);
            if i + 1 < touched {
                prop_assert!(alloc.settles_obligation, "only the last allocation may be partial");
            }
        }

        // Anything beyond the touched prefix is untouched, which requires the
        // payment to be exhausted (unless everything pending was settled).
        if touched < pending.len() {
            prop_assert_eq!(plan.credit_remainder, Decimal::ZERO);
        }
    }

    /// Credit remainder is positive only when every pending obligation is
    /// fully settled.
    #[test]
    fn prop_credit_only_after_full_settlement(
        payment in amount_strategy(),
        pending in pending_strategy(),
    ) {
        let plan = allocate(payment, &pending).unwrap();
        if plan.credit_remainder > Decimal::ZERO {
            prop_assert_eq!(plan.allocations.len(), pending.len());
            for alloc in &plan.allocations {
                prop_assert!(alloc.settles_obligation);
            }
        }
    }

    /// Allocation is a pure function: re-running it yields the same plan.
    #[test]
    fn prop_deterministic(
        payment in amount_strategy(),
        pending in pending_strategy(),
    ) {
        let first = allocate(payment, &pending).unwrap();
        let second = allocate(payment, &pending).unwrap();
        prop_assert_eq!(first, second);
    }
}
