//! User profile endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/users/me` - Current user's profile
//! - `PATCH /v1/users/me` - Change username
//! - `PUT /v1/users/me/password` - Change password
//! - `POST /v1/users/me/email-change/request` - Request an email change
//! - `POST /v1/users/me/email-change/confirm` - Confirm the new address
//! - `PUT /v1/users/:id/role` - Grant a system role (administrators)
//!
//! The email-change code goes to the *new* address: completing the flow
//! proves control of the address being claimed, after which the account's
//! email is swapped and marked verified in one step.

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
    auth::{authorization, middleware::AuthContext, password},
    email::templates,
    models::{
        user::{User, UserRole},
        verification::{EmailVerification, VerificationKind},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: String,

    /// Email address
    pub email: String,

    /// Username
    pub username: String,

    /// Whether the email is verified
    pub email_verified: bool,

    /// System-wide role
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            email_verified: user.email_verified,
            role: user.role,
        }
    }
}

/// Username change request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New username
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, for re-authentication
    pub current_password: String,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Email change request
#[derive(Debug, Deserialize, Validate)]
pub struct EmailChangeRequest {
    /// The address to switch to
    #[validate(email(message = "Invalid email format"))]
    pub new_email: String,
}

/// Email change confirmation
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmEmailChangeRequest {
    /// The new address the code was sent to
    #[validate(email(message = "Invalid email format"))]
    pub new_email: String,

    /// Six-digit code
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// System role grant request
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// Role to assign
    pub role: UserRole,
}

/// Returns the authenticated user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Changes the authenticated user's username
///
/// # Errors
///
/// - `409 Conflict`: username already taken
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::update_username(&state.db, auth.user_id, &req.username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Changes the authenticated user's password
///
/// Requires the current password; the new one must pass the strength
/// policy.
///
/// # Errors
///
/// - `401 Unauthorized`: current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.new_password)
        .map_err(ApiError::BadRequest)?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = password::verify_password(&req.current_password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    User::update_password_hash(&state.db, user.id, &password_hash).await?;

    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

/// Starts an email change by sending a code to the new address
///
/// # Errors
///
/// - `409 Conflict`: the new address already belongs to an account
pub async fn request_email_change(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<EmailChangeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate().map_err(ApiError::from_validation)?;

    if User::find_by_email(&state.db, &req.new_email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let verification = EmailVerification::issue(
        &state.db,
        &req.new_email,
        VerificationKind::EmailChange,
        Some(user.id),
    )
    .await?;

    let (subject, body) = templates::email_change(&user.username, &verification.code);
    if let Err(e) = state.mailer.send(&req.new_email, &subject, &body).await {
        tracing::warn!(to = %req.new_email, error = %e, "Failed to send email");
    }

    Ok(Json(serde_json::json!({
        "message": "A confirmation code has been sent to the new address"
    })))
}

/// Completes an email change
///
/// The code must have been issued to this account; confirming it swaps the
/// account's email for the new, now-verified address.
///
/// # Errors
///
/// - `400 Bad Request`: code invalid, expired, or issued to another account
pub async fn confirm_email_change(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ConfirmEmailChangeRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let owner = EmailVerification::verify(
        &state.db,
        &req.new_email,
        &req.code,
        VerificationKind::EmailChange,
        Utc::now(),
    )
    .await?;

    if owner != Some(auth.user_id) {
        return Err(ApiError::BadRequest(
            "Verification code is invalid or expired".to_string(),
        ));
    }

    let user = User::update_email(&state.db, auth.user_id, &req.new_email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Grants a system-wide role
///
/// Requires system Admin; granting Admin or SuperAdmin requires SuperAdmin.
///
/// # Errors
///
/// - `403 Forbidden`: insufficient system role
/// - `404 Not Found`: target user doesn't exist
pub async fn set_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let required = match req.role {
        UserRole::Admin | UserRole::SuperAdmin => UserRole::SuperAdmin,
        _ => UserRole::Admin,
    };
    authorization::require_system_role(&state.db, auth.user_id, required).await?;

    let user = User::update_role(&state.db, user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
