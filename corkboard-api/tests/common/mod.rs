//! Common test utilities for integration tests
//!
//! Provides shared infrastructure:
//! - Test database setup (migrations run on connect)
//! - Test user creation and JWT generation
//! - Request/response helpers around the in-process router

use axum::body::Body;
use axum::http::{Request, Response};
use corkboard_api::app::{build_router, AppState};
use corkboard_api::config::Config;
use corkboard_shared::auth::jwt::{create_token, Claims, TokenType};
use corkboard_shared::db::migrations::run_migrations;
use corkboard_shared::email::{build_mailer, MailConfig};
use corkboard_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context against the configured test database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let user = create_test_user(&db).await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Tests never deliver real mail
        let mailer = build_mailer(&MailConfig::default())
            .map_err(|e| anyhow::anyhow!("mailer: {e}"))?;

        let state = AppState::new(db.clone(), config.clone(), mailer);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value for the context's user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Returns a bearer token for an arbitrary user
    pub fn token_for(&self, user: &User) -> anyhow::Result<String> {
        let claims = Claims::new(user.id, TokenType::Access);
        Ok(create_token(&claims, &self.config.jwt.secret)?)
    }

    /// Sends an authenticated JSON request and returns the raw response
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Sends a request as the context's user
    pub async fn authed(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        self.request(method, uri, Some(&self.jwt_token), body).await
    }
}

/// Creates a user with unique email and username
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let tag = Uuid::new_v4().simple().to_string();
    Ok(User::create(
        db,
        CreateUser {
            email: format!("test-{tag}@example.com"),
            username: format!("user-{tag}"),
            password_hash: corkboard_shared::auth::password::hash_password("Test!Pass1")?,
        },
    )
    .await?)
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
