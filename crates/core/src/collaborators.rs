//! Seams for the external collaborators the treasury consumes.
//!
//! Schedule data and the guardian directory are owned by other parts of the
//! academy system; the treasury only depends on these traits. A collaborator
//! failure aborts the enclosing unit of work - the caller maps it to a
//! retryable error and nothing is left half-applied.

use async_trait::async_trait;
use aula_shared::types::{CourseId, GuardianId};
use chrono::Weekday;
use thiserror::Error;

use crate::sessions::DaySchedule;

/// A collaborator call failed.
#[derive(Debug, Error)]
#[error("collaborator '{service}' unavailable: {reason}")]
pub struct CollaboratorError {
    /// Which collaborator failed.
    pub service: &'static str,
    /// Why.
    pub reason: String,
}

impl CollaboratorError {
    /// Creates a collaborator error.
    #[must_use]
    pub fn new(service: &'static str, reason: impl Into<String>) -> Self {
        Self {
            service,
            reason: reason.into(),
        }
    }
}

/// Provides a course's schedule for a given weekday.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Returns the schedule for `course_id` on `weekday`, or `None` when the
    /// course has no session that day.
    async fn day_schedule(
        &self,
        course_id: CourseId,
        weekday: Weekday,
    ) -> Result<Option<DaySchedule>, CollaboratorError>;
}

/// Contact details used to resolve or create a guardian.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardianContact {
    /// Guardian full name.
    pub name: Option<String>,
    /// Guardian email.
    pub email: Option<String>,
    /// Guardian phone number.
    pub phone: Option<String>,
}

impl GuardianContact {
    /// Returns true if no usable contact information is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Resolves guardians from contact details.
///
/// Lookup priority is email, then phone, then exact name; a guardian is
/// created when nothing matches but contact info exists.
#[async_trait]
pub trait GuardianDirectory: Send + Sync {
    /// Finds or creates the guardian matching `contact`.
    ///
    /// Returns `None` when `contact` carries nothing to match or create by.
    async fn find_or_create(
        &self,
        contact: &GuardianContact,
    ) -> Result<Option<GuardianId>, CollaboratorError>;
}
