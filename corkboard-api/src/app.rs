//! Application state and router builder
//!
//! This module defines the shared application state and builds the Axum
//! router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use corkboard_api::{app::AppState, config::Config};
//! use corkboard_shared::email::build_mailer;
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let mailer = build_mailer(&config.mail.to_mail_config())?;
//! let state = AppState::new(pool, config, mailer);
//! let app = corkboard_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use corkboard_shared::auth::{
    jwt,
    middleware::{AuthContext, AuthError},
};
use corkboard_shared::email::Mailer;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; Arc keeps
/// the clones cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/                             # API v1
///     ├── /auth/                       # Registration, login, verification (public)
///     ├── /users/                      # Profile, password, email change
///     ├── /projects/                   # Projects, members, nested invitations/boards
///     ├── /invitations/                # Received invitations, respond, cancel
///     ├── /boards/                     # Board detail, columns
///     ├── /columns/                    # Column rename/move/delete, tasks
///     ├── /tasks/                      # Task CRUD, moves, assignees, time entries
///     └── /time-entries/               # Time entry update/delete
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top): tracing, CORS, security headers;
/// JWT authentication wraps every group except `/health` and `/v1/auth`.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/verify-email", post(routes::auth::verify_email))
        .route("/resend-verification", post(routes::auth::resend_verification))
        .route("/password-reset/request", post(routes::auth::request_password_reset))
        .route("/password-reset/confirm", post(routes::auth::confirm_password_reset));

    // User profile routes (authenticated)
    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/me", patch(routes::users::update_me))
        .route("/me/password", put(routes::users::change_password))
        .route("/me/email-change/request", post(routes::users::request_email_change))
        .route("/me/email-change/confirm", post(routes::users::confirm_email_change))
        .route("/:id/role", put(routes::users::set_role));

    // Project routes (authenticated)
    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/", get(routes::projects::list_projects))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", patch(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/members", get(routes::projects::list_members))
        .route("/:id/members/:user_id", put(routes::projects::update_member_role))
        .route("/:id/members/:user_id", delete(routes::projects::remove_member))
        .route("/:id/invitations", post(routes::invitations::create_invitation))
        .route("/:id/invitations", get(routes::invitations::list_project_invitations))
        .route("/:id/boards", post(routes::boards::create_board))
        .route("/:id/boards", get(routes::boards::list_boards));

    // Invitation routes for the receiver (authenticated)
    let invitation_routes = Router::new()
        .route("/", get(routes::invitations::list_my_invitations))
        .route("/:id/respond", post(routes::invitations::respond_invitation))
        .route("/:id", delete(routes::invitations::cancel_invitation));

    // Board routes (authenticated)
    let board_routes = Router::new()
        .route("/:id", get(routes::boards::get_board))
        .route("/:id", patch(routes::boards::update_board))
        .route("/:id", delete(routes::boards::delete_board))
        .route("/:id/columns", post(routes::columns::create_column));

    // Column routes (authenticated)
    let column_routes = Router::new()
        .route("/:id", patch(routes::columns::rename_column))
        .route("/:id", delete(routes::columns::delete_column))
        .route("/:id/move", post(routes::columns::move_column))
        .route("/:id/tasks", post(routes::tasks::create_task))
        .route("/:id/tasks", get(routes::tasks::list_column_tasks));

    // Task routes (authenticated)
    let task_routes = Router::new()
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", patch(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/move", post(routes::tasks::move_task))
        .route("/:id/archive", post(routes::tasks::archive_task))
        .route("/:id/unarchive", post(routes::tasks::unarchive_task))
        .route("/:id/assignees", get(routes::tasks::list_assignees))
        .route("/:id/assignees/:user_id", put(routes::tasks::assign_user))
        .route("/:id/assignees/:user_id", delete(routes::tasks::unassign_user))
        .route("/:id/time-entries", post(routes::time_entries::create_time_entry))
        .route("/:id/time-entries", get(routes::time_entries::list_time_entries));

    // Time entry routes (authenticated)
    let time_entry_routes = Router::new()
        .route("/:id", patch(routes::time_entries::update_time_entry))
        .route("/:id", delete(routes::time_entries::delete_time_entry));

    let authenticated = |router: Router<AppState>| {
        router.layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ))
    };

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", authenticated(user_routes))
        .nest("/projects", authenticated(project_routes))
        .nest("/invitations", authenticated(invitation_routes))
        .nest("/boards", authenticated(board_routes))
        .nest("/columns", authenticated(column_routes))
        .nest("/tasks", authenticated(task_routes))
        .nest("/time-entries", authenticated(time_entry_routes));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects an `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let auth_context = AuthContext::from_jwt(claims.sub);

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
