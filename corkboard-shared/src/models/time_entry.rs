//! Time entry model and database operations
//!
//! Time entries record hours a user spent on a task. Only the user who
//! logged an entry may change or delete it; project admins can read but
//! not rewrite other people's hours.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE time_entries (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     hours DOUBLE PRECISION NOT NULL,
//!     spent_on DATE NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Smallest amount of loggable work, in hours
pub const MIN_HOURS: f64 = 0.1;

/// Error type for time entry operations
#[derive(Debug, Error)]
pub enum TimeEntryError {
    /// No such time entry
    #[error("Time entry not found")]
    NotFound,

    /// Hours below the minimum
    #[error("Hours must be at least {MIN_HOURS}")]
    HoursTooSmall,

    /// Only the creator may change or delete an entry
    #[error("Only the user who logged this entry may modify it")]
    NotOwner,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One logged block of work on a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// Task the time was spent on
    pub task_id: Uuid,

    /// User who logged the entry
    pub user_id: Uuid,

    /// Hours spent (≥ 0.1)
    pub hours: f64,

    /// Day the work happened
    pub spent_on: NaiveDate,

    /// What was done
    pub description: String,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new time entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeEntry {
    /// Hours spent (≥ 0.1)
    pub hours: f64,

    /// Day the work happened
    pub spent_on: NaiveDate,

    /// What was done
    pub description: String,
}

/// Input for updating an existing time entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimeEntry {
    /// New hours value (≥ 0.1)
    pub hours: Option<f64>,

    /// New day
    pub spent_on: Option<NaiveDate>,

    /// New description
    pub description: Option<String>,
}

impl TimeEntry {
    /// Logs time against a task
    ///
    /// # Errors
    ///
    /// - [`TimeEntryError::HoursTooSmall`] if `hours < 0.1`
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
        data: CreateTimeEntry,
    ) -> Result<Self, TimeEntryError> {
        if data.hours < MIN_HOURS {
            return Err(TimeEntryError::HoursTooSmall);
        }

        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"
            INSERT INTO time_entries (task_id, user_id, hours, spent_on, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, task_id, user_id, hours, spent_on, description,
                      created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(data.hours)
        .bind(data.spent_on)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// Finds a time entry by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT id, task_id, user_id, hours, spent_on, description,
                   created_at, updated_at
            FROM time_entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    /// Lists a task's time entries, most recent work first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let entries = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT id, task_id, user_id, hours, spent_on, description,
                   created_at, updated_at
            FROM time_entries
            WHERE task_id = $1
            ORDER BY spent_on DESC, created_at DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Updates an entry on behalf of `user_id`
    ///
    /// # Errors
    ///
    /// - [`TimeEntryError::NotFound`] if the entry doesn't exist
    /// - [`TimeEntryError::NotOwner`] if `user_id` didn't create it
    /// - [`TimeEntryError::HoursTooSmall`] if the new hours are below 0.1
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTimeEntry,
    ) -> Result<Self, TimeEntryError> {
        if let Some(hours) = data.hours {
            if hours < MIN_HOURS {
                return Err(TimeEntryError::HoursTooSmall);
            }
        }

        let existing = Self::find_by_id(pool, id).await?.ok_or(TimeEntryError::NotFound)?;
        if existing.user_id != user_id {
            return Err(TimeEntryError::NotOwner);
        }

        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"
            UPDATE time_entries
            SET hours = COALESCE($2, hours),
                spent_on = COALESCE($3, spent_on),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_id, user_id, hours, spent_on, description,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.hours)
        .bind(data.spent_on)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// Deletes an entry on behalf of `user_id`
    ///
    /// # Errors
    ///
    /// - [`TimeEntryError::NotFound`] if the entry doesn't exist
    /// - [`TimeEntryError::NotOwner`] if `user_id` didn't create it
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), TimeEntryError> {
        let existing = Self::find_by_id(pool, id).await?.ok_or(TimeEntryError::NotFound)?;
        if existing.user_id != user_id {
            return Err(TimeEntryError::NotOwner);
        }

        sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Total hours logged against a task
    pub async fn total_hours(pool: &PgPool, task_id: Uuid) -> Result<f64, sqlx::Error> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(hours), 0) FROM time_entries WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_one(pool)
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_entry_error_display() {
        assert!(TimeEntryError::HoursTooSmall.to_string().contains("0.1"));
        assert!(TimeEntryError::NotOwner.to_string().contains("logged"));
    }
}
