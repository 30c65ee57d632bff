//! Board model and database operations
//!
//! A board belongs to a project and owns an ordered list of columns.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE boards (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     title VARCHAR(200) NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::column::Column;
use super::task::Task;

/// Board model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Project this board belongs to
    pub project_id: Uuid,

    /// Board title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Board title
    pub title: String,

    /// Free-form description
    pub description: String,
}

/// Input for updating an existing board
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoard {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// A column with its ordered, unarchived tasks, for the board view
#[derive(Debug, Clone, Serialize)]
pub struct ColumnWithTasks {
    /// The column itself
    #[serde(flatten)]
    pub column: Column,

    /// Tasks in position order, archived ones filtered out
    pub tasks: Vec<Task>,
}

/// A board with its full ordered contents
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    /// The board itself
    #[serde(flatten)]
    pub board: Board,

    /// Columns in position order
    pub columns: Vec<ColumnWithTasks>,
}

impl Board {
    /// Creates a board in a project
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        data: CreateBoard,
    ) -> Result<Self, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (project_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, title, description, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, project_id, title, description, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists a project's boards, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, project_id, title, description, created_at, updated_at
            FROM boards
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Updates a board's title and/or description
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Deletes a board; its columns and their tasks cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads a board with its ordered columns and their ordered tasks
    ///
    /// Archived tasks keep their positions in storage but are filtered out
    /// of the view. Returns None if the board doesn't exist.
    pub async fn detail(pool: &PgPool, id: Uuid) -> Result<Option<BoardDetail>, sqlx::Error> {
        let Some(board) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let columns = Column::list_by_board(pool, id).await?;
        let tasks = Task::list_by_board(pool, id).await?;

        let mut grouped: Vec<ColumnWithTasks> = columns
            .into_iter()
            .map(|column| ColumnWithTasks {
                column,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            if task.archived {
                continue;
            }
            if let Some(entry) = grouped.iter_mut().find(|c| c.column.id == task.column_id) {
                entry.tasks.push(task);
            }
        }

        Ok(Some(BoardDetail { board, columns: grouped }))
    }
}
