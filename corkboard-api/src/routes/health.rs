//! Health check endpoint
//!
//! `GET /health` is public and reports service and database health. Load
//! balancers and uptime checks poll it; it performs one `SELECT 1`.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use corkboard_shared::db::pool;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status: "ok" or "degraded"
    pub status: &'static str,

    /// Database reachability
    pub database: &'static str,

    /// Running version
    pub version: &'static str,
}

/// Reports service health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = pool::health_check(&state.db).await.is_ok();

    let (status_code, status, database) = if db_healthy {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
