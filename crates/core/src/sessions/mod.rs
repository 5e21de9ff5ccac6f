//! Session completion domain rules.
//!
//! - The `(enrollment, date)` state machine: `none -> given | cancelled`,
//!   both terminal and mutually exclusive
//! - Course day schedules and session durations

pub mod schedule;
pub mod state;

pub use schedule::DaySchedule;
pub use state::{SessionState, StateConflict, Transition, transition};
