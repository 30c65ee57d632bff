//! Board endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/projects/:id/boards` - Create a board (Developer+)
//! - `GET /v1/projects/:id/boards` - List a project's boards (members)
//! - `GET /v1/boards/:id` - Board with ordered columns and tasks (members)
//! - `PATCH /v1/boards/:id` - Update (Developer+)
//! - `DELETE /v1/boards/:id` - Delete (project Admin)

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
    models::{
        board::{Board, BoardDetail, CreateBoard, UpdateBoard},
        membership::ProjectRole,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Update board request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Loads a board and checks the caller's role in its project
async fn authorize_board(
    state: &AppState,
    board_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> ApiResult<Board> {
    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    authorization::require_project_role(&state.db, board.project_id, user_id, role).await?;

    Ok(board)
}

/// Creates a board in a project (Developer+)
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate().map_err(ApiError::from_validation)?;
    authorization::require_project_role(
        &state.db,
        project_id,
        auth.user_id,
        ProjectRole::Developer,
    )
    .await?;

    let board = Board::create(
        &state.db,
        project_id,
        CreateBoard {
            title: req.title,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(board))
}

/// Lists a project's boards (members)
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Board>>> {
    authorization::require_membership(&state.db, project_id, auth.user_id).await?;

    let boards = Board::list_by_project(&state.db, project_id).await?;

    Ok(Json(boards))
}

/// Returns a board with its ordered columns and their ordered tasks
///
/// Archived tasks are filtered from the view.
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetail>> {
    authorize_board(&state, board_id, auth.user_id, ProjectRole::Viewer).await?;

    let detail = Board::detail(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(detail))
}

/// Updates a board's title or description (Developer+)
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate().map_err(ApiError::from_validation)?;
    authorize_board(&state, board_id, auth.user_id, ProjectRole::Developer).await?;

    let board = Board::update(
        &state.db,
        board_id,
        UpdateBoard {
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(board))
}

/// Deletes a board and its columns and tasks (project Admin)
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize_board(&state, board_id, auth.user_id, ProjectRole::Admin).await?;

    Board::delete(&state.db, board_id).await?;

    Ok(Json(serde_json::json!({ "message": "Board deleted" })))
}
