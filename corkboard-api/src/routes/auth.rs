//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/auth/register` - Register and receive a verification code
//! - `POST /v1/auth/login` - Login with email or username
//! - `POST /v1/auth/refresh` - Refresh access token
//! - `POST /v1/auth/verify-email` - Confirm a verification code
//! - `POST /v1/auth/resend-verification` - Re-issue a verification code
//! - `POST /v1/auth/password-reset/request` - Request a reset code
//! - `POST /v1/auth/password-reset/confirm` - Set a new password
//!
//! Email delivery is best-effort: a failed send is logged, never surfaced,
//! so an SMTP outage can't lock users out of registration. The
//! password-reset request always reports success regardless of whether the
//! address matches an account, to avoid account enumeration.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use chrono::Utc;
use corkboard_shared::{
    auth::{jwt, password},
    email::templates,
    models::{
        user::{CreateUser, User},
        verification::{EmailVerification, VerificationKind},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Username
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Password (validated for strength separately)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address or username
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Whether the account's email is verified
    pub email_verified: bool,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Verify email request
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    /// Email address the code was sent to
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Six-digit code
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// Request body carrying only an email address
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation request
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmPasswordResetRequest {
    /// Email address the code was sent to
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Six-digit code
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Generic acknowledgement response
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// Human-readable outcome
    pub message: &'static str,
}

/// Sends a message without letting transport failures fail the request
async fn send_best_effort(state: &AppState, to: &str, content: templates::EmailContent) {
    let (subject, body) = content;
    if let Err(e) = state.mailer.send(to, &subject, &body).await {
        tracing::warn!(to = %to, error = %e, "Failed to send email");
    }
}

/// Register a new user
///
/// Creates the account, issues an email-verification code, and sends it to
/// the registered address. The account is usable immediately; verification
/// only flips the `email_verified` flag.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
/// - `409 Conflict`: email or username already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            username: req.username.clone(),
            password_hash,
        },
    )
    .await?;

    let verification = EmailVerification::issue(
        &state.db,
        &user.email,
        VerificationKind::EmailVerification,
        Some(user.id),
    )
    .await?;

    send_best_effort(
        &state,
        &user.email,
        templates::email_verification(&user.username, &verification.code),
    )
    .await;

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// Authenticates with email or username plus password and returns JWT
/// tokens. Failed lookups and failed password checks produce the same
/// error, so responses don't reveal which accounts exist.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_identifier(&state.db, &req.identifier)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        email_verified: user.email_verified,
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Confirms an email-verification code
///
/// A correct, unexpired code marks the account's email as verified. Codes
/// are single-use: confirming the same code twice fails the second time.
///
/// # Errors
///
/// - `400 Bad Request`: code invalid, expired, or attempt cap reached
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    EmailVerification::verify(
        &state.db,
        &req.email,
        &req.code,
        VerificationKind::EmailVerification,
        Utc::now(),
    )
    .await?;

    Ok(Json(AckResponse {
        message: "Email verified",
    }))
}

/// Re-issues an email-verification code
///
/// Responds with success whether or not the address matches an unverified
/// account, mirroring the password-reset anti-enumeration policy.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        if !user.email_verified {
            let verification = EmailVerification::issue(
                &state.db,
                &user.email,
                VerificationKind::EmailVerification,
                Some(user.id),
            )
            .await?;

            send_best_effort(
                &state,
                &user.email,
                templates::email_verification(&user.username, &verification.code),
            )
            .await;
        }
    }

    Ok(Json(AckResponse {
        message: "If the address matches an unverified account, a code has been sent",
    }))
}

/// Requests a password-reset code
///
/// Always reports success, whether or not the address matches an account —
/// the one intentionally suppressed failure in the API.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        let verification = EmailVerification::issue(
            &state.db,
            &user.email,
            VerificationKind::PasswordReset,
            Some(user.id),
        )
        .await?;

        send_best_effort(
            &state,
            &user.email,
            templates::password_reset(&verification.code),
        )
        .await;
    }

    Ok(Json(AckResponse {
        message: "If the address matches an account, a reset code has been sent",
    }))
}

/// Confirms a password reset
///
/// A correct, unexpired code lets the caller set a new password for the
/// account behind the email address.
///
/// # Errors
///
/// - `400 Bad Request`: code invalid, expired, or attempt cap reached
/// - `422 Unprocessable Entity`: new password too weak
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPasswordResetRequest>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let user_id = EmailVerification::verify(
        &state.db,
        &req.email,
        &req.code,
        VerificationKind::PasswordReset,
        Utc::now(),
    )
    .await?
    .ok_or_else(|| ApiError::BadRequest("Verification code is invalid or expired".to_string()))?;

    let password_hash = password::hash_password(&req.new_password)?;
    User::update_password_hash(&state.db, user_id, &password_hash).await?;

    Ok(Json(AckResponse {
        message: "Password updated",
    }))
}
