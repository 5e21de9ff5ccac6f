//! Shared type definitions.

pub mod id;

pub use id::{
    AccountId, ApplicationId, ClassSessionId, CourseId, EnrollmentId, GuardianId, ObligationId,
    PaymentId, StudentId, TutorId,
};
