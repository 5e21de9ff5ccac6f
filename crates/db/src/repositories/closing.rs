//! Closing period repository.
//!
//! A closing row marks everything dated on or before `closed_through` as
//! immutable. Payment and session repositories consult
//! [`latest_closed_through`] inside their own transactions before writing.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::closing_periods;

/// Error types for closing period operations.
#[derive(Debug, thiserror::Error)]
pub enum ClosingError {
    /// The closing date is in the future.
    #[error("Cannot close through a future date: {0}")]
    FutureDate(NaiveDate),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Returns the most recent `closed_through` date, if any period is closed.
///
/// Generic over the connection so callers can read it inside their own
/// transaction.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn latest_closed_through<C: ConnectionTrait>(
    conn: &C,
) -> Result<Option<NaiveDate>, DbErr> {
    let latest = closing_periods::Entity::find()
        .order_by_desc(closing_periods::Column::ClosedThrough)
        .one(conn)
        .await?;

    Ok(latest.map(|row| row.closed_through))
}

/// Repository for closing periods.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    db: DatabaseConnection,
}

impl ClosingRepository {
    /// Creates a new closing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a closing through the given date.
    ///
    /// One row per calendar month; closing the same month again replaces its
    /// `closed_through`.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is in the future or the database
    /// operation fails.
    pub async fn create(
        &self,
        closed_through: NaiveDate,
    ) -> Result<closing_periods::Model, ClosingError> {
        let today = Utc::now().date_naive();
        if closed_through > today {
            return Err(ClosingError::FutureDate(closed_through));
        }

        let month = format!("{:04}-{:02}", closed_through.year(), closed_through.month());

        let row = closing_periods::ActiveModel {
            id: Set(Uuid::now_v7()),
            month: Set(month.clone()),
            closed_through: Set(closed_through),
            created_at: Set(Utc::now().into()),
        };

        closing_periods::Entity::insert(row)
            .on_conflict(
                OnConflict::column(closing_periods::Column::Month)
                    .update_column(closing_periods::Column::ClosedThrough)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let stored = closing_periods::Entity::find()
            .filter(closing_periods::Column::Month.eq(month.clone()))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("closing period {month}")))?;

        Ok(stored)
    }

    /// Lists all closing periods, most recent month first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(&self) -> Result<Vec<closing_periods::Model>, ClosingError> {
        let rows = closing_periods::Entity::find()
            .order_by_desc(closing_periods::Column::Month)
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}
