//! Column endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/boards/:id/columns` - Create a column, appended or at an
//!   explicit position (Developer+)
//! - `PATCH /v1/columns/:id` - Rename (Developer+)
//! - `POST /v1/columns/:id/move` - Move to a new position (Developer+)
//! - `DELETE /v1/columns/:id` - Delete; the gap closes (Developer+)
//!
//! Every position-disturbing operation runs in a single transaction in the
//! model layer, so the board's column ordering is always dense.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use corkboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{board::Board, column::Column, membership::ProjectRole},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create column request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateColumnRequest {
    /// Column name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Explicit position; omitted = append at the end
    pub position: Option<i32>,
}

/// Rename column request
#[derive(Debug, Deserialize, Validate)]
pub struct RenameColumnRequest {
    /// New name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Move column request
#[derive(Debug, Deserialize)]
pub struct MoveColumnRequest {
    /// Target position within the board
    pub position: i32,
}

/// Resolves a column's project and checks the caller's role there
async fn authorize_column(
    state: &AppState,
    column_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> ApiResult<()> {
    let project_id = Column::project_id(&state.db, column_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;

    authorization::require_project_role(&state.db, project_id, user_id, role).await?;

    Ok(())
}

/// Creates a column on a board (Developer+)
///
/// With an explicit position, existing columns at that position and above
/// shift up by one; without, the column is appended.
pub async fn create_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<CreateColumnRequest>,
) -> ApiResult<Json<Column>> {
    req.validate().map_err(ApiError::from_validation)?;

    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    authorization::require_project_role(
        &state.db,
        board.project_id,
        auth.user_id,
        ProjectRole::Developer,
    )
    .await?;

    let column = match req.position {
        Some(position) => Column::create_at(&state.db, board_id, &req.name, position).await?,
        None => Column::create(&state.db, board_id, &req.name).await?,
    };

    Ok(Json(column))
}

/// Renames a column (Developer+)
pub async fn rename_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
    Json(req): Json<RenameColumnRequest>,
) -> ApiResult<Json<Column>> {
    req.validate().map_err(ApiError::from_validation)?;
    authorize_column(&state, column_id, auth.user_id, ProjectRole::Developer).await?;

    let column = Column::rename(&state.db, column_id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;

    Ok(Json(column))
}

/// Moves a column within its board (Developer+)
///
/// Moving onto the current position is a no-op.
pub async fn move_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
    Json(req): Json<MoveColumnRequest>,
) -> ApiResult<Json<Column>> {
    authorize_column(&state, column_id, auth.user_id, ProjectRole::Developer).await?;

    let column = Column::move_to(&state.db, column_id, req.position).await?;

    Ok(Json(column))
}

/// Deletes a column and its tasks; trailing columns close the gap (Developer+)
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize_column(&state, column_id, auth.user_id, ProjectRole::Developer).await?;

    Column::delete(&state.db, column_id).await?;

    Ok(Json(serde_json::json!({ "message": "Column deleted" })))
}
