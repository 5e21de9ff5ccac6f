//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the academy and treasury tables
//! - Repository abstractions for data access
//! - Database migrations
//! - DB-backed implementations of the core collaborator traits

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, ClosingRepository, DbGuardianDirectory, DbScheduleProvider,
    JournalRepository, ObligationRepository, PaymentRepository, RegisterPaymentInput,
    SessionWorkflow, SettlementOutcome,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
