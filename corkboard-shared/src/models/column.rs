//! Column model and ordered-position operations
//!
//! Columns are the ordered children of a board. Their `position` values
//! are zero-based and dense within each board; every mutation that
//! disturbs the ordering (insert at an explicit position, move, delete)
//! shifts the affected siblings and writes the row inside one
//! transaction, so a failure leaves the ordering untouched.
//!
//! The shift ranges come from [`crate::models::ordering`]; this module
//! only binds them into SQL.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE board_columns (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
//!     name VARCHAR(100) NOT NULL,
//!     position INTEGER NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE INDEX board_columns_board_position ON board_columns (board_id, position);
//! ```
//!
//! Density is maintained by the transactional shifts, not by a unique
//! constraint: a constraint on (board_id, position) would trip mid-shift
//! while rows pass through each other's values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use super::ordering::{self, PositionShift};

/// Error type for column operations
#[derive(Debug, Error)]
pub enum ColumnError {
    /// No such column
    #[error("Column not found")]
    NotFound,

    /// Requested position is negative
    #[error("Position must not be negative")]
    NegativePosition,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Column model: an ordered child of a board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    /// Unique column ID
    pub id: Uuid,

    /// Board this column belongs to
    pub board_id: Uuid,

    /// Column name (e.g., "To do", "In progress")
    pub name: String,

    /// Zero-based rank among the board's columns
    pub position: i32,

    /// When the column was created
    pub created_at: DateTime<Utc>,

    /// When the column was last updated
    pub updated_at: DateTime<Utc>,
}

/// Applies a sibling-range shift within one board
///
/// Expressed as a single bulk UPDATE so it either applies to every row in
/// the range or, on transaction rollback, to none.
async fn shift_columns(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
    shift: PositionShift,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE board_columns
        SET position = position + $2, updated_at = NOW()
        WHERE board_id = $1
          AND position >= $3
          AND ($4::INTEGER IS NULL OR position <= $4)
        "#,
    )
    .bind(board_id)
    .bind(shift.delta)
    .bind(shift.from)
    .bind(shift.to)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl Column {
    /// Appends a column at the end of a board
    ///
    /// Position is `max(existing) + 1`, or 0 for an empty board, computed
    /// inside the insert itself so no shift is needed.
    pub async fn create(pool: &PgPool, board_id: Uuid, name: &str) -> Result<Self, sqlx::Error> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO board_columns (board_id, name, position)
            VALUES (
                $1, $2,
                COALESCE((SELECT MAX(position) + 1 FROM board_columns WHERE board_id = $1), 0)
            )
            RETURNING id, board_id, name, position, created_at, updated_at
            "#,
        )
        .bind(board_id)
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(column)
    }

    /// Inserts a column at an explicit position
    ///
    /// Existing columns at `position` and above shift up by one before the
    /// new row is written. Positions beyond the current count are accepted
    /// as-is — callers are expected to send sane values.
    ///
    /// # Errors
    ///
    /// - [`ColumnError::NegativePosition`] if `position < 0`
    pub async fn create_at(
        pool: &PgPool,
        board_id: Uuid,
        name: &str,
        position: i32,
    ) -> Result<Self, ColumnError> {
        if position < 0 {
            return Err(ColumnError::NegativePosition);
        }

        let mut tx = pool.begin().await?;

        shift_columns(&mut tx, board_id, ordering::insertion_shift(position)).await?;

        let column = sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO board_columns (board_id, name, position)
            VALUES ($1, $2, $3)
            RETURNING id, board_id, name, position, created_at, updated_at
            "#,
        )
        .bind(board_id)
        .bind(name)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(column)
    }

    /// Finds a column by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, name, position, created_at, updated_at
            FROM board_columns
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(column)
    }

    /// Lists a board's columns in position order
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let columns = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, name, position, created_at, updated_at
            FROM board_columns
            WHERE board_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(columns)
    }

    /// Renames a column
    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            UPDATE board_columns
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, board_id, name, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(column)
    }

    /// Moves a column to a new position within its board
    ///
    /// Moving onto the current position is a no-op that returns the
    /// unchanged column. Otherwise the displaced sibling range shifts and
    /// the column is written to `position`, all in one transaction.
    ///
    /// # Errors
    ///
    /// - [`ColumnError::NotFound`] if the column doesn't exist
    /// - [`ColumnError::NegativePosition`] if `position < 0`
    pub async fn move_to(pool: &PgPool, id: Uuid, position: i32) -> Result<Self, ColumnError> {
        if position < 0 {
            return Err(ColumnError::NegativePosition);
        }

        let mut tx = pool.begin().await?;

        let column = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, name, position, created_at, updated_at
            FROM board_columns
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ColumnError::NotFound)?;

        let Some(shift) = ordering::move_shift(column.position, position) else {
            return Ok(column);
        };

        shift_columns(&mut tx, column.board_id, shift).await?;

        let moved = sqlx::query_as::<_, Column>(
            r#"
            UPDATE board_columns
            SET position = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, board_id, name, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(moved)
    }

    /// Resolves the project a column belongs to, for authorization
    pub async fn project_id(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT b.project_id
            FROM board_columns c
            JOIN boards b ON b.id = c.board_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a column and closes the gap it leaves
    ///
    /// The column's tasks cascade with it.
    ///
    /// # Errors
    ///
    /// - [`ColumnError::NotFound`] if the column doesn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ColumnError> {
        let mut tx = pool.begin().await?;

        let removed: Option<(Uuid, i32)> = sqlx::query_as(
            r#"
            DELETE FROM board_columns
            WHERE id = $1
            RETURNING board_id, position
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (board_id, position) = removed.ok_or(ColumnError::NotFound)?;

        shift_columns(&mut tx, board_id, ordering::removal_shift(position)).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_error_display() {
        assert!(ColumnError::NotFound.to_string().contains("not found"));
        assert!(ColumnError::NegativePosition
            .to_string()
            .contains("negative"));
    }

    // The ordering arithmetic is covered in models/ordering.rs; the SQL
    // application is covered by the DB-backed tests in tests/model_tests.rs.
}
