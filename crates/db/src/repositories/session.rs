//! Session completion workflow.
//!
//! Marking a session given produces the money facts for that session: a
//! charge obligation against the guardian and, when the course has a tutor,
//! a payout obligation for the tutor. Marking it cancelled records the
//! outcome and produces nothing. Both are idempotent per
//! `(enrollment_id, session_date)`, and a retry of a partially applied
//! completion heals whatever sibling rows are missing.

use aula_core::collaborators::{CollaboratorError, GuardianContact, GuardianDirectory,
    ScheduleProvider};
use aula_core::sessions::{self, DaySchedule, StateConflict, Transition};
use aula_shared::types::CourseId;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    class_sessions, courses, enrollments, obligations, students,
    sea_orm_active_enums::{AccountKind, ObligationKind, SessionState},
};
use crate::repositories::account::{self, AccountError};
use crate::repositories::obligation::{self, NewObligation, ObligationError};
use crate::repositories::closing;

/// Error types for session workflow operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Enrollment not found.
    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(Uuid),

    /// Student referenced by the enrollment not found.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// Course referenced by the enrollment not found.
    #[error("Course not found: {0}")]
    CourseNotFound(Uuid),

    /// The course has no schedule on the given weekday.
    #[error("Course {course_id} has no schedule on {date}")]
    NoScheduleForDay {
        /// The course.
        course_id: Uuid,
        /// The requested day.
        date: NaiveDate,
    },

    /// No guardian could be resolved for the student.
    #[error("No guardian linked to student {0} and no contact to resolve one")]
    GuardianUnresolved(Uuid),

    /// The session already has the opposite outcome.
    #[error(transparent)]
    StateConflict(#[from] StateConflict),

    /// The date falls inside a closed period.
    #[error("Date {date} falls in a closed period (closed through {closed_through})")]
    PeriodClosed {
        /// The rejected session date.
        date: NaiveDate,
        /// Boundary of the closed period.
        closed_through: NaiveDate,
    },

    /// A collaborator failed; nothing was applied.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Obligation creation failed.
    #[error(transparent)]
    Obligation(#[from] ObligationError),

    /// Account creation failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result of completing a session.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The session row.
    pub session: class_sessions::Model,
    /// The guardian charge obligation.
    pub charge: obligations::Model,
    /// The tutor payout obligation, when the course has a tutor.
    pub payout: Option<obligations::Model>,
    /// False when this call found the session already given.
    pub created: bool,
}

/// Result of cancelling a session for a day.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    /// The session row.
    pub session: class_sessions::Model,
    /// False when this call found the session already cancelled.
    pub created: bool,
}

/// Orchestrates session outcomes and the money facts they produce.
#[derive(Debug, Clone)]
pub struct SessionWorkflow<S, G> {
    db: DatabaseConnection,
    schedules: S,
    guardians: G,
}

impl<S, G> SessionWorkflow<S, G>
where
    S: ScheduleProvider,
    G: GuardianDirectory,
{
    /// Creates a new session workflow.
    pub const fn new(db: DatabaseConnection, schedules: S, guardians: G) -> Self {
        Self {
            db,
            schedules,
            guardians,
        }
    }

    /// Marks the enrollment's session on `date` as given.
    ///
    /// Creates the session row, the guardian account, the charge obligation,
    /// and the tutor payout obligation (when a tutor is assigned) in one
    /// transaction. Calling again with the same arguments changes nothing
    /// and reports `created: false`; a retry after a partial failure heals
    /// the missing rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment chain is broken, the course has no
    /// schedule that weekday, no guardian can be resolved, the session was
    /// already cancelled, the date falls in a closed period, a collaborator
    /// fails, or a database operation fails.
    pub async fn complete(
        &self,
        enrollment_id: Uuid,
        date: NaiveDate,
    ) -> Result<CompletionOutcome, SessionError> {
        let (enrollment, student, course) = self.load_chain(enrollment_id).await?;

        let schedule = self
            .schedules
            .day_schedule(CourseId::from_uuid(course.id), date.weekday())
            .await?
            .ok_or(SessionError::NoScheduleForDay {
                course_id: course.id,
                date,
            })?;

        let guardian_id = self.resolve_guardian(&student).await?;

        let txn = self.db.begin().await?;

        ensure_period_open(&txn, date).await?;

        let (session, created) =
            upsert_session(&txn, enrollment_id, date, SessionState::Given, Some(&schedule)).await?;

        let guardian_account =
            account::get_or_create(&txn, AccountKind::Guardian, guardian_id).await?;

        let charge = obligation::create_if_absent(
            &txn,
            NewObligation {
                kind: ObligationKind::ChargeSession,
                account_id: guardian_account.id,
                amount: course.price,
                accrual_date: date,
                session_id: session.id,
                student_id: Some(student.id),
                tutor_id: course.tutor_id,
                course_id: Some(course.id),
                enrollment_id: Some(enrollment.id),
                detail: format!("{} on {date} for {}", course.name, student.full_name),
            },
        )
        .await?;

        let payout = match course.tutor_id {
            Some(tutor_id) if course.tutor_rate > Decimal::ZERO => {
                let tutor_account =
                    account::get_or_create(&txn, AccountKind::Tutor, tutor_id).await?;
                let row = obligation::create_if_absent(
                    &txn,
                    NewObligation {
                        kind: ObligationKind::PayoutSession,
                        account_id: tutor_account.id,
                        amount: course.tutor_rate,
                        accrual_date: date,
                        session_id: session.id,
                        student_id: Some(student.id),
                        tutor_id: Some(tutor_id),
                        course_id: Some(course.id),
                        enrollment_id: Some(enrollment.id),
                        detail: format!("{} on {date}, tutor payout", course.name),
                    },
                )
                .await?;
                Some(row)
            }
            _ => None,
        };

        // Heal the student's guardian link when it was resolved by contact.
        if student.guardian_id.is_none() {
            let mut active: students::ActiveModel = student.into();
            active.guardian_id = Set(Some(guardian_id));
            active.update(&txn).await?;
        }

        txn.commit().await?;

        Ok(CompletionOutcome {
            session,
            charge,
            payout,
            created,
        })
    }

    /// Marks the enrollment's session on `date` as cancelled.
    ///
    /// Produces no money facts. Calling again with the same arguments
    /// changes nothing; cancelling a session already given is a conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment does not exist, the session was
    /// already given, the date falls in a closed period, or a database
    /// operation fails.
    pub async fn cancel_for_day(
        &self,
        enrollment_id: Uuid,
        date: NaiveDate,
    ) -> Result<CancellationOutcome, SessionError> {
        enrollments::Entity::find_by_id(enrollment_id)
            .one(&self.db)
            .await?
            .ok_or(SessionError::EnrollmentNotFound(enrollment_id))?;

        let txn = self.db.begin().await?;

        ensure_period_open(&txn, date).await?;

        let (session, created) =
            upsert_session(&txn, enrollment_id, date, SessionState::Cancelled, None).await?;

        txn.commit().await?;

        Ok(CancellationOutcome { session, created })
    }

    /// Loads the enrollment and its student and course.
    async fn load_chain(
        &self,
        enrollment_id: Uuid,
    ) -> Result<(enrollments::Model, students::Model, courses::Model), SessionError> {
        let enrollment = enrollments::Entity::find_by_id(enrollment_id)
            .one(&self.db)
            .await?
            .ok_or(SessionError::EnrollmentNotFound(enrollment_id))?;

        let student = students::Entity::find_by_id(enrollment.student_id)
            .one(&self.db)
            .await?
            .ok_or(SessionError::StudentNotFound(enrollment.student_id))?;

        let course = courses::Entity::find_by_id(enrollment.course_id)
            .one(&self.db)
            .await?
            .ok_or(SessionError::CourseNotFound(enrollment.course_id))?;

        Ok((enrollment, student, course))
    }

    /// Resolves the student's guardian: direct link first, then the
    /// directory using the contact captured at intake.
    async fn resolve_guardian(&self, student: &students::Model) -> Result<Uuid, SessionError> {
        if let Some(guardian_id) = student.guardian_id {
            return Ok(guardian_id);
        }

        let contact = GuardianContact {
            name: student.guardian_name.clone(),
            email: student.guardian_email.clone(),
            phone: student.guardian_phone.clone(),
        };

        let resolved = self.guardians.find_or_create(&contact).await?;
        resolved
            .map(aula_shared::types::GuardianId::into_inner)
            .ok_or(SessionError::GuardianUnresolved(student.id))
    }
}

/// Rejects the date if it falls on or before the latest closing boundary.
async fn ensure_period_open(
    txn: &DatabaseTransaction,
    date: NaiveDate,
) -> Result<(), SessionError> {
    if let Some(closed_through) = closing::latest_closed_through(txn).await? {
        if date <= closed_through {
            return Err(SessionError::PeriodClosed {
                date,
                closed_through,
            });
        }
    }
    Ok(())
}

/// Inserts the session row for `(enrollment_id, date)` with the requested
/// state, or returns the existing row when it already holds that state.
///
/// Insert-on-conflict-do-nothing then re-select: two concurrent calls race
/// on the unique constraint and both observe the same row. The transition
/// rule is applied to the row actually stored, so a session cancelled by a
/// concurrent caller still rejects a completion.
async fn upsert_session<C: ConnectionTrait>(
    conn: &C,
    enrollment_id: Uuid,
    date: NaiveDate,
    requested: SessionState,
    schedule: Option<&DaySchedule>,
) -> Result<(class_sessions::Model, bool), SessionError> {
    let duration = schedule.map(|s| i32::try_from(s.duration_minutes()).unwrap_or(i32::MAX));

    let row = class_sessions::ActiveModel {
        id: Set(Uuid::now_v7()),
        enrollment_id: Set(enrollment_id),
        session_date: Set(date),
        state: Set(requested.clone()),
        duration_minutes: Set(duration),
        created_at: Set(Utc::now().into()),
    };

    let inserted = class_sessions::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                class_sessions::Column::EnrollmentId,
                class_sessions::Column::SessionDate,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = class_sessions::Entity::find()
        .filter(class_sessions::Column::EnrollmentId.eq(enrollment_id))
        .filter(class_sessions::Column::SessionDate.eq(date))
        .one(conn)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("session for enrollment {enrollment_id} on {date}"))
        })?;

    // The rule is applied to the row actually stored: when the insert lost
    // the race (or a previous call created the row), an equal state is a
    // no-op and a differing state is a conflict.
    let current: sessions::SessionState = stored.state.clone().into();
    let wanted: sessions::SessionState = requested.into();
    match sessions::transition(Some(current), wanted)? {
        Transition::Create | Transition::AlreadyInState => Ok((stored, inserted == 1)),
    }
}
