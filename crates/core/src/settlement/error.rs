//! Settlement error types.

use aula_shared::types::ObligationId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the FIFO allocator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// Payment amount must be strictly positive.
    #[error("payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A pending obligation carried a negative remaining balance.
    ///
    /// Remaining balances only ever decrease toward zero; a negative value
    /// means the stored ledger is corrupt and allocation must not proceed.
    #[error("obligation {id} has negative remaining balance {remaining}")]
    CorruptRemaining {
        /// The offending obligation.
        id: ObligationId,
        /// Its stored remaining balance.
        remaining: Decimal,
    },
}
