//! Project and membership endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/projects` - Create a project (creator becomes Admin member)
//! - `GET /v1/projects` - List my projects (`?all=true` for system admins)
//! - `GET /v1/projects/:id` - Project detail (members)
//! - `PATCH /v1/projects/:id` - Update (project Admin)
//! - `DELETE /v1/projects/:id` - Delete (project Admin)
//! - `GET /v1/projects/:id/members` - List members
//! - `PUT /v1/projects/:id/members/:user_id` - Change a member's role
//! - `DELETE /v1/projects/:id/members/:user_id` - Remove a member / leave
//!
//! The last-admin invariant is enforced in the membership model, inside
//! the same transaction as the mutation; these handlers only authorize.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use corkboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        membership::{ProjectMember, ProjectRole},
        project::{CreateProject, Project, UpdateProject},
        user::UserRole,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Update project request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Listing filter
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    /// List every project instead of only the caller's (system admins)
    #[serde(default)]
    pub all: bool,
}

/// Member role change request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// Role to assign
    pub role: ProjectRole,
}

/// Creates a project; the creator becomes its first Admin member
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = Project::create(
        &state.db,
        auth.user_id,
        CreateProject {
            title: req.title,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(project))
}

/// Lists the caller's projects
///
/// With `?all=true`, lists every project — a cross-project view gated on
/// the system Admin role, independent of memberships.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = if query.all {
        authorization::require_system_role(&state.db, auth.user_id, UserRole::Admin).await?;
        Project::list_all(&state.db).await?
    } else {
        Project::list_for_user(&state.db, auth.user_id).await?
    };

    Ok(Json(projects))
}

/// Returns a project (members only)
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    authorization::require_membership(&state.db, project_id, auth.user_id).await?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Updates a project (project Admin)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(ApiError::from_validation)?;
    authorization::require_project_role(&state.db, project_id, auth.user_id, ProjectRole::Admin)
        .await?;

    let project = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Deletes a project and everything it owns (project Admin)
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorization::require_project_role(&state.db, project_id, auth.user_id, ProjectRole::Admin)
        .await?;

    let deleted = Project::delete(&state.db, project_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Project deleted" })))
}

/// Lists a project's members (members only)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectMember>>> {
    authorization::require_membership(&state.db, project_id, auth.user_id).await?;

    let members = ProjectMember::list_by_project(&state.db, project_id).await?;

    Ok(Json(members))
}

/// Changes a member's role (project Admin)
///
/// # Errors
///
/// - `400 Bad Request`: demotion would leave the project without an admin
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> ApiResult<Json<ProjectMember>> {
    authorization::require_project_role(&state.db, project_id, auth.user_id, ProjectRole::Admin)
        .await?;

    let member = ProjectMember::update_role(&state.db, project_id, user_id, req.role).await?;

    Ok(Json(member))
}

/// Removes a member (project Admin), or lets a member leave on their own
///
/// # Errors
///
/// - `400 Bad Request`: removal would leave the project without an admin
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    // Leaving is always allowed (subject to the last-admin guard);
    // removing someone else requires Admin.
    if auth.user_id != user_id {
        authorization::require_project_role(
            &state.db,
            project_id,
            auth.user_id,
            ProjectRole::Admin,
        )
        .await?;
    } else {
        authorization::require_membership(&state.db, project_id, auth.user_id).await?;
    }

    ProjectMember::remove(&state.db, project_id, user_id).await?;

    Ok(Json(serde_json::json!({ "message": "Member removed" })))
}
