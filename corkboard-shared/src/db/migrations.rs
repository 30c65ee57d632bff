//! Database migration runner
//!
//! This module provides utilities for running and inspecting database
//! migrations using sqlx's migration system.
//!
//! # Migration Files
//!
//! Migrations are stored in the `migrations/` directory at this crate's root.
//! Each file is named `{version}_{name}.sql` and applied exactly once, in
//! version order.
//!
//! # Example
//!
//! ```no_run
//! use corkboard_shared::db::pool::{create_pool, DatabaseConfig};
//! use corkboard_shared::db::migrations::{run_migrations, get_migration_status};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!
//!     run_migrations(&pool).await?;
//!
//!     let status = get_migration_status(&pool).await?;
//!     println!("Applied {} migrations", status.applied_migrations);
//!
//!     Ok(())
//! }
//! ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,
}

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped. If a migration
/// fails it is rolled back and the error is returned; previously applied
/// migrations stay applied.
///
/// # Errors
///
/// Returns an error if:
/// - A migration file is malformed
/// - A migration fails to execute
/// - Database connection is lost during migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Gets the current migration status
///
/// Returns how many migrations have been applied and the latest applied
/// version, read from sqlx's `_sqlx_migrations` bookkeeping table.
///
/// # Errors
///
/// Returns an error if the migrations table cannot be queried
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(MAX(version), 0)
        FROM _sqlx_migrations
        WHERE success = TRUE
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let (count, latest) = row.unwrap_or((0, 0));

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version: if latest > 0 { Some(latest) } else { None },
    })
}
