//! Core treasury logic for Aula.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, settlement rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `settlement` - FIFO allocation of payments to pending obligations
//! - `treasury` - Cash pool cap and payment evidence rules
//! - `sessions` - Session completion state machine and schedule durations
//! - `journal` - Diary running balances and expected-vs-real reconciliation
//! - `collaborators` - Seams for the schedule and guardian-directory services
//! - `storage` - Receipt file storage (OpenDAL)

pub mod collaborators;
pub mod journal;
pub mod sessions;
pub mod settlement;
pub mod storage;
pub mod treasury;
