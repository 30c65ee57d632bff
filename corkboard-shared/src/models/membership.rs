//! Project membership model and database operations
//!
//! This module provides the ProjectMember model for user-project
//! relationships with role-based access control, a many-to-many
//! relationship between users and projects.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE project_role AS ENUM ('viewer', 'developer', 'admin');
//!
//! CREATE TABLE project_members (
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     role project_role NOT NULL DEFAULT 'developer',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (project_id, user_id)
//! );
//! ```
//!
//! # Roles
//!
//! - **admin**: Manage members, invitations, and project settings
//! - **developer**: Create and move boards, columns, and tasks
//! - **viewer**: Read-only access
//!
//! A project must keep at least one admin at all times; removals and
//! demotions that would leave zero admins are rejected.
//!
//! # Example
//!
//! ```no_run
//! use corkboard_shared::models::membership::{ProjectMember, CreateProjectMember, ProjectRole};
//! use corkboard_shared::db::pool::{create_pool, DatabaseConfig};
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let member = ProjectMember::create(&pool, CreateProjectMember {
//!     project_id: Uuid::new_v4(),
//!     user_id: Uuid::new_v4(),
//!     role: ProjectRole::Developer,
//! }).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Error type for membership mutations
#[derive(Debug, Error)]
pub enum MembershipError {
    /// The mutation would leave the project without an admin
    #[error("A project must keep at least one admin")]
    LastAdmin,

    /// No such membership
    #[error("User is not a member of this project")]
    NotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Role a user holds within one project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// Read-only access to the project's boards
    Viewer,

    /// Can create and rearrange boards, columns, and tasks
    Developer,

    /// Can additionally manage members, invitations, and the project itself
    Admin,
}

impl ProjectRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Viewer => "viewer",
            ProjectRole::Developer => "developer",
            ProjectRole::Admin => "admin",
        }
    }

    /// Checks if this role meets the required role
    ///
    /// Hierarchy: Admin > Developer > Viewer
    pub fn has_permission(&self, required: &ProjectRole) -> bool {
        self.rank() >= required.rank()
    }

    /// Numeric rank for ordered comparison
    fn rank(&self) -> u8 {
        match self {
            ProjectRole::Viewer => 1,
            ProjectRole::Developer => 2,
            ProjectRole::Admin => 3,
        }
    }
}

/// Membership of one user in one project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign
    pub role: ProjectRole,
}

impl ProjectMember {
    /// Creates a new membership (adds a user to a project)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Membership already exists (unique constraint violation)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProjectMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a specific membership by project and user
    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Gets a user's role in a project, if they are a member
    pub async fn get_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error> {
        let role: Option<ProjectRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Changes a member's role
    ///
    /// Demoting the last admin is rejected: the count of *other* admins is
    /// taken with the member row locked, inside the same transaction as the
    /// update, so concurrent demotions cannot race past the invariant.
    ///
    /// # Errors
    ///
    /// - [`MembershipError::NotFound`] if the membership doesn't exist
    /// - [`MembershipError::LastAdmin`] if the change would leave the
    ///   project without an admin
    pub async fn update_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<Self, MembershipError> {
        let mut tx = pool.begin().await?;

        let current: Option<ProjectRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_members
            WHERE project_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.ok_or(MembershipError::NotFound)?;

        if current == ProjectRole::Admin && role != ProjectRole::Admin {
            let other_admins: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM project_members
                WHERE project_id = $1 AND user_id <> $2 AND role = 'admin'
                "#,
            )
            .bind(project_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            if other_admins == 0 {
                return Err(MembershipError::LastAdmin);
            }
        }

        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET role = $3
            WHERE project_id = $1 AND user_id = $2
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(member)
    }

    /// Removes a user from a project
    ///
    /// Removing the last admin is rejected under the same transactional
    /// check as [`ProjectMember::update_role`].
    ///
    /// # Errors
    ///
    /// - [`MembershipError::NotFound`] if the membership doesn't exist
    /// - [`MembershipError::LastAdmin`] if the removal would leave the
    ///   project without an admin
    pub async fn remove(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), MembershipError> {
        let mut tx = pool.begin().await?;

        let current: Option<ProjectRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_members
            WHERE project_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.ok_or(MembershipError::NotFound)?;

        if current == ProjectRole::Admin {
            let other_admins: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM project_members
                WHERE project_id = $1 AND user_id <> $2 AND role = 'admin'
                "#,
            )
            .bind(project_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            if other_admins == 0 {
                return Err(MembershipError::LastAdmin);
            }
        }

        sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Lists all members of a project, oldest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_members
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts members of a project
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_members WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_role_as_str() {
        assert_eq!(ProjectRole::Viewer.as_str(), "viewer");
        assert_eq!(ProjectRole::Developer.as_str(), "developer");
        assert_eq!(ProjectRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_role_hierarchy() {
        // Admin outranks everyone
        assert!(ProjectRole::Admin.has_permission(&ProjectRole::Admin));
        assert!(ProjectRole::Admin.has_permission(&ProjectRole::Developer));
        assert!(ProjectRole::Admin.has_permission(&ProjectRole::Viewer));

        // Developer can write but not administer
        assert!(!ProjectRole::Developer.has_permission(&ProjectRole::Admin));
        assert!(ProjectRole::Developer.has_permission(&ProjectRole::Developer));
        assert!(ProjectRole::Developer.has_permission(&ProjectRole::Viewer));

        // Viewer is read-only
        assert!(!ProjectRole::Viewer.has_permission(&ProjectRole::Admin));
        assert!(!ProjectRole::Viewer.has_permission(&ProjectRole::Developer));
        assert!(ProjectRole::Viewer.has_permission(&ProjectRole::Viewer));
    }

    #[test]
    fn test_membership_error_display() {
        assert!(MembershipError::LastAdmin.to_string().contains("at least one admin"));
        assert!(MembershipError::NotFound.to_string().contains("not a member"));
    }

    // Integration tests for the last-admin guard are in tests/model_tests.rs
}
