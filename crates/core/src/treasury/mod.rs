//! Treasury rules shared by the payment journal.
//!
//! - Cash pool aggregation and the tutor payout cap
//! - Evidence requirements per payment method

pub mod cash_pool;
pub mod evidence;

pub use cash_pool::{CashPool, CashPoolError, check_payout};
pub use evidence::{Evidence, EvidenceError, PaymentMethod, validate_evidence};
