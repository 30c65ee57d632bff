//! Invitation endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/projects/:id/invitations` - Invite a user (project Admin)
//! - `GET /v1/projects/:id/invitations` - List a project's invitations
//! - `GET /v1/invitations` - List invitations I've received
//! - `POST /v1/invitations/:id/respond` - Accept or reject (receiver)
//! - `DELETE /v1/invitations/:id` - Cancel (sender or project Admin)
//!
//! Responding to an invitation past its expiry transitions it to expired
//! and fails — there is no background sweep, expiry is lazy.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use corkboard_shared::{
    auth::{authorization, middleware::AuthContext},
    email::templates,
    models::{
        invitation::ProjectInvitation,
        membership::ProjectRole,
        project::Project,
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create invitation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    /// Email or username of the user to invite
    #[validate(length(min = 1, message = "Receiver is required"))]
    pub receiver: String,

    /// Role to grant on acceptance (defaults to Developer)
    pub role: Option<ProjectRole>,
}

/// Respond request
#[derive(Debug, Deserialize)]
pub struct RespondInvitationRequest {
    /// true to accept, false to reject
    pub accept: bool,
}

/// Invites a user to a project (project Admin)
///
/// The receiver must exist, must not already be a member, and must not
/// already hold a pending invitation for this project. A notification
/// email is sent best-effort.
///
/// # Errors
///
/// - `404 Not Found`: no such user
/// - `409 Conflict`: already a member, or a pending invitation exists
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateInvitationRequest>,
) -> ApiResult<Json<ProjectInvitation>> {
    req.validate().map_err(ApiError::from_validation)?;
    authorization::require_project_role(&state.db, project_id, auth.user_id, ProjectRole::Admin)
        .await?;

    let receiver = User::find_by_identifier(&state.db, &req.receiver)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let invitation = ProjectInvitation::create(
        &state.db,
        project_id,
        auth.user_id,
        receiver.id,
        req.role.unwrap_or(ProjectRole::Developer),
    )
    .await?;

    // Best-effort notification; the invitation stands even if mail fails.
    if let Some(project) = Project::find_by_id(&state.db, project_id).await? {
        if let Some(sender) = User::find_by_id(&state.db, auth.user_id).await? {
            let (subject, body) = templates::invitation_notice(&sender.username, &project.title);
            if let Err(e) = state.mailer.send(&receiver.email, &subject, &body).await {
                tracing::warn!(to = %receiver.email, error = %e, "Failed to send email");
            }
        }
    }

    Ok(Json(invitation))
}

/// Lists a project's invitations (project Admin)
pub async fn list_project_invitations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectInvitation>>> {
    authorization::require_project_role(&state.db, project_id, auth.user_id, ProjectRole::Admin)
        .await?;

    let invitations = ProjectInvitation::list_by_project(&state.db, project_id).await?;

    Ok(Json(invitations))
}

/// Lists invitations the caller has received
pub async fn list_my_invitations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectInvitation>>> {
    let invitations = ProjectInvitation::list_by_receiver(&state.db, auth.user_id).await?;

    Ok(Json(invitations))
}

/// Accepts or rejects an invitation (receiver only)
///
/// Acceptance creates the membership at the invited role in the same
/// transaction as the status flip.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the receiver
/// - `400 Bad Request`: already responded, or expired
pub async fn respond_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invitation_id): Path<Uuid>,
    Json(req): Json<RespondInvitationRequest>,
) -> ApiResult<Json<ProjectInvitation>> {
    let invitation = ProjectInvitation::find_by_id(&state.db, invitation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    if invitation.receiver_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the invited user may respond".to_string(),
        ));
    }

    let updated =
        ProjectInvitation::respond(&state.db, invitation_id, req.accept, Utc::now()).await?;

    Ok(Json(updated))
}

/// Cancels a pending invitation (sender or project Admin)
///
/// Cancellation deletes the invitation outright.
///
/// # Errors
///
/// - `403 Forbidden`: caller is neither the sender nor a project admin
/// - `400 Bad Request`: invitation already responded to
pub async fn cancel_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invitation_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let invitation = ProjectInvitation::find_by_id(&state.db, invitation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    if invitation.sender_id != auth.user_id {
        authorization::require_project_role(
            &state.db,
            invitation.project_id,
            auth.user_id,
            ProjectRole::Admin,
        )
        .await?;
    }

    ProjectInvitation::cancel(&state.db, invitation_id).await?;

    Ok(Json(serde_json::json!({ "message": "Invitation cancelled" })))
}
