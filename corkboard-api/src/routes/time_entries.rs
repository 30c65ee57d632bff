//! Time tracking endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/tasks/:id/time-entries` - Log time (members)
//! - `GET /v1/tasks/:id/time-entries` - List a task's entries (members)
//! - `PATCH /v1/time-entries/:id` - Update an entry (creator only)
//! - `DELETE /v1/time-entries/:id` - Delete an entry (creator only)
//!
//! Any project member may log time against a task; only the user who
//! logged an entry may change or delete it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use corkboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        task::Task,
        time_entry::{CreateTimeEntry, TimeEntry, UpdateTimeEntry},
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Create time entry request
#[derive(Debug, Deserialize)]
pub struct CreateTimeEntryRequest {
    /// Hours spent (≥ 0.1)
    pub hours: f64,

    /// Day the work happened
    pub spent_on: NaiveDate,

    /// What was done
    #[serde(default)]
    pub description: String,
}

/// Update time entry request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTimeEntryRequest {
    /// New hours value (≥ 0.1)
    pub hours: Option<f64>,

    /// New day
    pub spent_on: Option<NaiveDate>,

    /// New description
    pub description: Option<String>,
}

/// Logs time against a task (members)
///
/// # Errors
///
/// - `400 Bad Request`: hours below 0.1
pub async fn create_time_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateTimeEntryRequest>,
) -> ApiResult<Json<TimeEntry>> {
    let project_id = Task::project_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    authorization::require_membership(&state.db, project_id, auth.user_id).await?;

    let entry = TimeEntry::create(
        &state.db,
        task_id,
        auth.user_id,
        CreateTimeEntry {
            hours: req.hours,
            spent_on: req.spent_on,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(entry))
}

/// A task's time entries plus their sum
#[derive(Debug, serde::Serialize)]
pub struct TimeEntryListResponse {
    /// Entries, most recent work first
    pub entries: Vec<TimeEntry>,

    /// Sum of hours across all entries
    pub total_hours: f64,
}

/// Lists a task's time entries with their total (members)
pub async fn list_time_entries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TimeEntryListResponse>> {
    let project_id = Task::project_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    authorization::require_membership(&state.db, project_id, auth.user_id).await?;

    let entries = TimeEntry::list_by_task(&state.db, task_id).await?;
    let total_hours = TimeEntry::total_hours(&state.db, task_id).await?;

    Ok(Json(TimeEntryListResponse {
        entries,
        total_hours,
    }))
}

/// Updates a time entry (creator only)
///
/// # Errors
///
/// - `403 Forbidden`: caller didn't create the entry
/// - `400 Bad Request`: hours below 0.1
pub async fn update_time_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<UpdateTimeEntryRequest>,
) -> ApiResult<Json<TimeEntry>> {
    let entry = TimeEntry::update(
        &state.db,
        entry_id,
        auth.user_id,
        UpdateTimeEntry {
            hours: req.hours,
            spent_on: req.spent_on,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(entry))
}

/// Deletes a time entry (creator only)
///
/// # Errors
///
/// - `403 Forbidden`: caller didn't create the entry
pub async fn delete_time_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    TimeEntry::delete(&state.db, entry_id, auth.user_id).await?;

    Ok(Json(serde_json::json!({ "message": "Time entry deleted" })))
}
