//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod closing;
pub mod directory;
pub mod journal;
pub mod obligation;
pub mod payment;
pub mod schedule;
pub mod session;

pub use account::{
    AccountError, AccountRepository, GuardianAccountSummary, TutorAccountSummary,
};
pub use closing::{ClosingError, ClosingRepository};
pub use directory::DbGuardianDirectory;
pub use journal::{JournalError, JournalRepository};
pub use obligation::{NewObligation, ObligationError, ObligationRepository};
pub use payment::{
    PaymentError, PaymentRepository, RegisterPaymentInput, SettlementOutcome,
};
pub use schedule::DbScheduleProvider;
pub use session::{CancellationOutcome, CompletionOutcome, SessionError, SessionWorkflow};
