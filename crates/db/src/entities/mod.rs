//! `SeaORM` entity definitions.

pub mod accounts;
pub mod applications;
pub mod class_sessions;
pub mod closing_periods;
pub mod course_schedules;
pub mod courses;
pub mod enrollments;
pub mod guardians;
pub mod obligations;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod students;
pub mod tutors;
