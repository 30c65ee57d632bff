//! Task endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/columns/:id/tasks` - Create a task, appended or at an
//!   explicit position (Developer+)
//! - `GET /v1/columns/:id/tasks` - List a column's tasks (members)
//! - `GET /v1/tasks/:id` - Task detail (members)
//! - `PATCH /v1/tasks/:id` - Update title/description (Developer+)
//! - `POST /v1/tasks/:id/move` - Move within or across columns (Developer+)
//! - `POST /v1/tasks/:id/archive` / `/unarchive` (Developer+)
//! - `DELETE /v1/tasks/:id` - Delete; the gap closes (Developer+)
//! - `GET /v1/tasks/:id/assignees` - List assignees (members)
//! - `PUT /v1/tasks/:id/assignees/:user_id` - Assign (Developer+)
//! - `DELETE /v1/tasks/:id/assignees/:user_id` - Unassign (Developer+)
//!
//! Cross-column moves stay within one board; the model rejects a
//! destination column on a different board as a bad request.

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
        column::Column,
        membership::ProjectRole,
        task::{CreateTask, Task, UpdateTask},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Explicit position; omitted = append at the end
    pub position: Option<i32>,
}

/// Update task request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Move task request
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    /// Destination column (may be the task's current column)
    pub column_id: Uuid,

    /// Target position within the destination column
    pub position: i32,
}

/// Resolves a task's project and checks the caller's role there
async fn authorize_task(
    state: &AppState,
    task_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> ApiResult<Uuid> {
    let project_id = Task::project_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorization::require_project_role(&state.db, project_id, user_id, role).await?;

    Ok(project_id)
}

/// Creates a task in a column (Developer+)
///
/// With an explicit position, existing tasks at that position and above
/// shift up by one; without, the task is appended.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project_id = Column::project_id(&state.db, column_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;
    authorization::require_project_role(&state.db, project_id, auth.user_id, ProjectRole::Developer)
        .await?;

    let data = CreateTask {
        title: req.title,
        description: req.description,
    };

    let task = match req.position {
        Some(position) => Task::create_at(&state.db, column_id, data, position).await?,
        None => Task::create(&state.db, column_id, data).await?,
    };

    Ok(Json(task))
}

/// Lists a column's tasks in position order, archived included (members)
pub async fn list_column_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let project_id = Column::project_id(&state.db, column_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;
    authorization::require_membership(&state.db, project_id, auth.user_id).await?;

    let tasks = Task::list_by_column(&state.db, column_id).await?;

    Ok(Json(tasks))
}

/// Returns a task (members)
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Viewer).await?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Updates a task's title or description (Developer+)
///
/// # Errors
///
/// - `400 Bad Request`: the task is archived
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from_validation)?;
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(task))
}

/// Moves a task within its column or to another column (Developer+)
///
/// # Errors
///
/// - `400 Bad Request`: archived task, negative position, or destination
///   column on a different board
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<Task>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    let task = Task::move_to(&state.db, task_id, req.column_id, req.position).await?;

    Ok(Json(task))
}

/// Archives a task (Developer+)
pub async fn archive_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    let task = Task::archive(&state.db, task_id).await?;

    Ok(Json(task))
}

/// Restores an archived task (Developer+)
pub async fn unarchive_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    let task = Task::unarchive(&state.db, task_id).await?;

    Ok(Json(task))
}

/// Deletes a task (Developer+)
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    Task::delete(&state.db, task_id).await?;

    Ok(Json(serde_json::json!({ "message": "Task deleted" })))
}

/// Lists a task's assignees (members)
pub async fn list_assignees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Uuid>>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Viewer).await?;

    let assignees = Task::assignees(&state.db, task_id).await?;

    Ok(Json(assignees))
}

/// Assigns a project member to a task (Developer+)
///
/// The assignee must belong to the task's project.
///
/// # Errors
///
/// - `400 Bad Request`: assignee is not a member of the project
pub async fn assign_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    let project_id = authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    // Assignees must be members of the owning project.
    if authorization::resolve_membership(&state.db, project_id, user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::BadRequest(
            "Assignee is not a member of this project".to_string(),
        ));
    }

    Task::assign_user(&state.db, task_id, user_id).await?;

    Ok(Json(serde_json::json!({ "message": "User assigned" })))
}

/// Removes a user from a task's assignee set (Developer+)
pub async fn unassign_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize_task(&state, task_id, auth.user_id, ProjectRole::Developer).await?;

    let removed = Task::unassign_user(&state.db, task_id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("User is not assigned".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "User unassigned" })))
}
