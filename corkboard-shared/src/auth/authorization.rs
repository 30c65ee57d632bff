//! Authorization guards for project membership and system roles
//!
//! Every mutation in the API is gated by one of these checks. Two
//! independent hierarchies exist:
//!
//! 1. **Project roles** (Viewer < Developer < Admin), resolved from the
//!    `project_members` table — fresh from the database on every call.
//! 2. **System roles** (User < Moderator < Admin < SuperAdmin), resolved
//!    from the `users` row, for cross-project concerns.
//!
//! Roles compare by rank, so `require_project_role(…, Developer)` admits
//! developers and admins while keeping viewers read-only.
//!
//! # Example
//!
//! ```no_run
//! use corkboard_shared::auth::authorization::require_project_role;
//! use corkboard_shared::models::membership::ProjectRole;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! // Only project admins may manage members
//! require_project_role(&pool, project_id, user_id, ProjectRole::Admin).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::{ProjectMember, ProjectRole};
use crate::models::user::{User, UserRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the project
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    /// User's project role is below the required rank
    #[error("Insufficient role: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: ProjectRole,
        actual: ProjectRole,
    },

    /// User's system role is below the required rank
    #[error("Insufficient system role: requires {required:?}")]
    InsufficientSystemRole { required: UserRole },

    /// User doesn't own the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    /// The authenticated user no longer exists
    #[error("Unknown user")]
    UnknownUser,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Resolves a user's membership in a project, if any
pub async fn resolve_membership(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ProjectMember>, AuthzError> {
    Ok(ProjectMember::find(pool, project_id, user_id).await?)
}

/// Checks that a user is a member of a project, at any role
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if the user has no membership
pub async fn require_membership(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectMember, AuthzError> {
    resolve_membership(pool, project_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(project_id))
}

/// Checks that a user's project role meets `required_role`
///
/// # Errors
///
/// Returns an error if:
/// - User is not a member (`AuthzError::NotMember`)
/// - User's role ranks below the requirement (`AuthzError::InsufficientRole`)
pub async fn require_project_role(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    required_role: ProjectRole,
) -> Result<ProjectMember, AuthzError> {
    let member = require_membership(pool, project_id, user_id).await?;

    if !member.role.has_permission(&required_role) {
        return Err(AuthzError::InsufficientRole {
            required: required_role,
            actual: member.role,
        });
    }

    Ok(member)
}

/// Checks that a user's system-wide role meets `required_role`
///
/// Independent of any project membership.
///
/// # Errors
///
/// Returns an error if:
/// - The user row no longer exists (`AuthzError::UnknownUser`)
/// - The role ranks below the requirement (`AuthzError::InsufficientSystemRole`)
pub async fn require_system_role(
    pool: &PgPool,
    user_id: Uuid,
    required_role: UserRole,
) -> Result<User, AuthzError> {
    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or(AuthzError::UnknownUser)?;

    if !user.role.has_permission(&required_role) {
        return Err(AuthzError::InsufficientSystemRole {
            required: required_role,
        });
    }

    Ok(user)
}

/// Checks that the caller owns a resource
///
/// Used for per-row ownership rules such as time entries, which only their
/// creator may modify.
pub fn require_ownership(user_id: Uuid, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if user_id != resource_owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_ownership() {
        let user_id = Uuid::new_v4();

        assert!(require_ownership(user_id, user_id).is_ok());
        assert!(require_ownership(user_id, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotMember(Uuid::new_v4());
        assert!(err.to_string().contains("Not a member"));

        let err = AuthzError::InsufficientRole {
            required: ProjectRole::Admin,
            actual: ProjectRole::Developer,
        };
        assert!(err.to_string().contains("Insufficient role"));

        let err = AuthzError::NotAuthorized;
        assert!(err.to_string().contains("Not authorized"));
    }
}
