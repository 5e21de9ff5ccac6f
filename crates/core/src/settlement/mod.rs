//! FIFO settlement of payments against pending obligations.
//!
//! This module implements the allocation core of the treasury:
//! - Pending obligation inputs ordered by accrual
//! - The deterministic FIFO allocator
//! - Allocation plans (applications + credit remainder)
//! - Error types for settlement operations

pub mod allocator;
pub mod error;

#[cfg(test)]
mod allocator_props;

pub use allocator::{AllocationPlan, PendingObligation, PlannedAllocation, allocate};
pub use error::SettlementError;
