//! Database models for Corkboard
//!
//! This module contains all database models and their CRUD and
//! transactional operations.
//!
//! # Models
//!
//! - `user`: User accounts and system-wide roles
//! - `project`: Top-level collaboration unit
//! - `membership`: User-project relationships with roles
//! - `invitation`: Proposed memberships, time-boxed
//! - `board`: Kanban boards owned by projects
//! - `column`: Ordered children of a board
//! - `task`: Ordered children of a column
//! - `time_entry`: Hours logged against tasks
//! - `verification`: Single-use email verification codes
//! - `ordering`: Position arithmetic shared by columns and tasks
//!
//! # Example
//!
//! ```no_run
//! use corkboard_shared::models::user::{User, CreateUser};
//! use corkboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let user = User::create(&pool, CreateUser {
//!     email: "user@example.com".to_string(),
//!     username: "user".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod column;
pub mod invitation;
pub mod membership;
pub mod ordering;
pub mod project;
pub mod task;
pub mod time_entry;
pub mod user;
pub mod verification;
