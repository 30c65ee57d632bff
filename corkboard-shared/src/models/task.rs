//! Task model and ordered-position operations
//!
//! Tasks are the ordered children of a column. Position handling follows
//! the same rules as columns within a board — zero-based, dense, shifted
//! transactionally — with one extra move form: a task can move to a
//! different column, provided the destination column belongs to the same
//! board. Archived tasks keep their position (archiving is a display
//! filter, not a removal), so density always holds over the full set.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     column_id UUID NOT NULL REFERENCES board_columns(id) ON DELETE CASCADE,
//!     title VARCHAR(200) NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     position INTEGER NOT NULL,
//!     archived BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE task_assignees (
//!     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (task_id, user_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use super::ordering::{self, PositionShift};

/// Error type for task operations
#[derive(Debug, Error)]
pub enum TaskError {
    /// No such task
    #[error("Task not found")]
    NotFound,

    /// No such column
    #[error("Column not found")]
    ColumnNotFound,

    /// The task is archived and cannot be mutated
    #[error("Task is archived")]
    Archived,

    /// The task is not archived (unarchive of a live task)
    #[error("Task is not archived")]
    NotArchived,

    /// Destination column belongs to a different board
    #[error("Cannot move a task to a column on a different board")]
    DifferentBoard,

    /// Requested position is negative
    #[error("Position must not be negative")]
    NegativePosition,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task model: an ordered child of a column
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Column this task currently sits in
    pub column_id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Zero-based rank among the column's tasks
    pub position: i32,

    /// Whether the task is archived (hidden from the board view)
    pub archived: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Free-form description
    pub description: String,
}

/// Input for updating an existing task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Applies a sibling-range shift within one column
async fn shift_tasks(
    tx: &mut Transaction<'_, Postgres>,
    column_id: Uuid,
    shift: PositionShift,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE tasks
        SET position = position + $2, updated_at = NOW()
        WHERE column_id = $1
          AND position >= $3
          AND ($4::INTEGER IS NULL OR position <= $4)
        "#,
    )
    .bind(column_id)
    .bind(shift.delta)
    .bind(shift.from)
    .bind(shift.to)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// The board a column belongs to, locked for the duration of the transaction
async fn column_board(
    tx: &mut Transaction<'_, Postgres>,
    column_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT board_id FROM board_columns WHERE id = $1 FOR SHARE")
        .bind(column_id)
        .fetch_optional(&mut **tx)
        .await
}

impl Task {
    /// Appends a task at the end of a column
    pub async fn create(
        pool: &PgPool,
        column_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (column_id, title, description, position)
            VALUES (
                $1, $2, $3,
                COALESCE((SELECT MAX(position) + 1 FROM tasks WHERE column_id = $1), 0)
            )
            RETURNING id, column_id, title, description, position, archived,
                      created_at, updated_at
            "#,
        )
        .bind(column_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Inserts a task at an explicit position in a column
    ///
    /// Existing tasks at `position` and above shift up by one before the
    /// new row is written, in one transaction. Positions beyond the
    /// current count are accepted as-is.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NegativePosition`] if `position < 0`
    pub async fn create_at(
        pool: &PgPool,
        column_id: Uuid,
        data: CreateTask,
        position: i32,
    ) -> Result<Self, TaskError> {
        if position < 0 {
            return Err(TaskError::NegativePosition);
        }

        let mut tx = pool.begin().await?;

        shift_tasks(&mut tx, column_id, ordering::insertion_shift(position)).await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (column_id, title, description, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, column_id, title, description, position, archived,
                      created_at, updated_at
            "#,
        )
        .bind(column_id)
        .bind(data.title)
        .bind(data.description)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, column_id, title, description, position, archived,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a column's tasks in position order, archived included
    pub async fn list_by_column(pool: &PgPool, column_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, column_id, title, description, position, archived,
                   created_at, updated_at
            FROM tasks
            WHERE column_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(column_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists every task on a board, grouped by column position then task position
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.column_id, t.title, t.description, t.position, t.archived,
                   t.created_at, t.updated_at
            FROM tasks t
            JOIN board_columns c ON c.id = t.column_id
            WHERE c.board_id = $1
            ORDER BY c.position ASC, t.position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Resolves the project a task belongs to, for authorization
    pub async fn project_id(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT b.project_id
            FROM tasks t
            JOIN board_columns c ON c.id = t.column_id
            JOIN boards b ON b.id = c.board_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Updates a task's title and/or description
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the task doesn't exist
    /// - [`TaskError::Archived`] if the task is archived
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateTask) -> Result<Self, TaskError> {
        let existing = Self::find_by_id(pool, id).await?.ok_or(TaskError::NotFound)?;
        if existing.archived {
            return Err(TaskError::Archived);
        }

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, column_id, title, description, position, archived,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Moves a task within its column or to another column on the same board
    ///
    /// Same column and same position is a no-op returning the unchanged
    /// task. A same-column move shifts the displaced range; a cross-column
    /// move closes the gap in the source column and opens a slot in the
    /// destination. All shifts and the task write happen in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] / [`TaskError::ColumnNotFound`]
    /// - [`TaskError::Archived`] if the task is archived
    /// - [`TaskError::DifferentBoard`] if the destination column belongs
    ///   to another board
    /// - [`TaskError::NegativePosition`] if `position < 0`
    pub async fn move_to(
        pool: &PgPool,
        id: Uuid,
        target_column_id: Uuid,
        position: i32,
    ) -> Result<Self, TaskError> {
        if position < 0 {
            return Err(TaskError::NegativePosition);
        }

        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, column_id, title, description, position, archived,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TaskError::NotFound)?;

        if task.archived {
            return Err(TaskError::Archived);
        }

        if task.column_id == target_column_id {
            let Some(shift) = ordering::move_shift(task.position, position) else {
                return Ok(task);
            };
            shift_tasks(&mut tx, task.column_id, shift).await?;
        } else {
            let source_board = column_board(&mut tx, task.column_id)
                .await?
                .ok_or(TaskError::ColumnNotFound)?;
            let target_board = column_board(&mut tx, target_column_id)
                .await?
                .ok_or(TaskError::ColumnNotFound)?;

            if source_board != target_board {
                return Err(TaskError::DifferentBoard);
            }

            let (source_shift, target_shift) =
                ordering::cross_parent_shifts(task.position, position);
            shift_tasks(&mut tx, task.column_id, source_shift).await?;
            shift_tasks(&mut tx, target_column_id, target_shift).await?;
        }

        let moved = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET column_id = $2, position = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, column_id, title, description, position, archived,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(target_column_id)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(moved)
    }

    /// Archives a task, hiding it from the board view
    ///
    /// The task keeps its position so the column's ordering stays dense.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the task doesn't exist
    /// - [`TaskError::Archived`] if it is already archived
    pub async fn archive(pool: &PgPool, id: Uuid) -> Result<Self, TaskError> {
        Self::set_archived(pool, id, true).await
    }

    /// Restores an archived task to the board view
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the task doesn't exist
    /// - [`TaskError::NotArchived`] if it is not archived
    pub async fn unarchive(pool: &PgPool, id: Uuid) -> Result<Self, TaskError> {
        Self::set_archived(pool, id, false).await
    }

    async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<Self, TaskError> {
        let existing = Self::find_by_id(pool, id).await?.ok_or(TaskError::NotFound)?;

        if existing.archived == archived {
            return Err(if archived {
                TaskError::Archived
            } else {
                TaskError::NotArchived
            });
        }

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET archived = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, column_id, title, description, position, archived,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(archived)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task and closes the gap it leaves in its column
    ///
    /// Time entries and assignee links cascade.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the task doesn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), TaskError> {
        let mut tx = pool.begin().await?;

        let removed: Option<(Uuid, i32)> = sqlx::query_as(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            RETURNING column_id, position
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (column_id, position) = removed.ok_or(TaskError::NotFound)?;

        shift_tasks(&mut tx, column_id, ordering::removal_shift(position)).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Assigns a user to a task (idempotent)
    pub async fn assign_user(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO task_assignees (task_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (task_id, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a user from a task's assignee set
    ///
    /// Returns false if the user was not assigned.
    pub async fn unassign_user(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignees WHERE task_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the user IDs assigned to a task
    pub async fn assignees(pool: &PgPool, id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM task_assignees
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_display() {
        assert!(TaskError::Archived.to_string().contains("archived"));
        assert!(TaskError::DifferentBoard.to_string().contains("different board"));
        assert!(TaskError::NegativePosition.to_string().contains("negative"));
    }

    // Position behavior is covered in models/ordering.rs and the DB-backed
    // tests in tests/model_tests.rs.
}
