//! Database-backed schedule provider.

use async_trait::async_trait;
use aula_core::collaborators::{CollaboratorError, ScheduleProvider};
use aula_core::sessions::DaySchedule;
use aula_shared::types::CourseId;
use chrono::Weekday;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::course_schedules;

/// Reads course weekday schedules from the course_schedules table.
///
/// Weekdays are stored 0 (Monday) through 6 (Sunday).
#[derive(Debug, Clone)]
pub struct DbScheduleProvider {
    db: DatabaseConnection,
}

impl DbScheduleProvider {
    /// Creates a new schedule provider over the given connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleProvider for DbScheduleProvider {
    async fn day_schedule(
        &self,
        course_id: CourseId,
        weekday: Weekday,
    ) -> Result<Option<DaySchedule>, CollaboratorError> {
        let stored_weekday = i16::try_from(weekday.num_days_from_monday())
            .map_err(|_| CollaboratorError::new("schedule", "weekday out of range"))?;

        let row = course_schedules::Entity::find()
            .filter(course_schedules::Column::CourseId.eq(course_id.into_inner()))
            .filter(course_schedules::Column::Weekday.eq(stored_weekday))
            .one(&self.db)
            .await
            .map_err(|err| CollaboratorError::new("schedule", err.to_string()))?;

        Ok(row.map(|schedule| DaySchedule {
            start: schedule.start_time,
            end: schedule.end_time,
        }))
    }
}
