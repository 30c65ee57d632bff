//! Project invitation model and lifecycle
//!
//! Invitations are proposed memberships, time-boxed to seven days.
//!
//! # State Machine
//!
//! ```text
//! pending → accepted
//!         → rejected
//!         → expired
//! ```
//!
//! All three outcomes are terminal. Expiry happens lazily: there is no
//! background sweep, so a response attempted after `expires_at` performs
//! the transition to `expired` itself and then fails.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE invitation_status AS ENUM ('pending', 'accepted', 'rejected', 'expired');
//!
//! CREATE TABLE project_invitations (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     sender_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     receiver_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     role project_role NOT NULL DEFAULT 'developer',
//!     status invitation_status NOT NULL DEFAULT 'pending',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     expires_at TIMESTAMPTZ NOT NULL,
//!     responded_at TIMESTAMPTZ
//! );
//!
//! -- At most one pending invitation per (project, receiver)
//! CREATE UNIQUE INDEX project_invitations_one_pending
//!     ON project_invitations (project_id, receiver_id)
//!     WHERE status = 'pending';
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::membership::ProjectRole;

/// How long an invitation stays answerable
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Error type for invitation operations
#[derive(Debug, Error)]
pub enum InvitationError {
    /// No such invitation
    #[error("Invitation not found")]
    NotFound,

    /// The invitation is no longer pending
    #[error("Invitation has already been {0}")]
    AlreadyResponded(&'static str),

    /// The invitation's expiry has passed
    #[error("Invitation has expired")]
    Expired,

    /// The receiver is already a member of the project
    #[error("User is already a member of this project")]
    AlreadyMember,

    /// A pending invitation for this (project, receiver) already exists
    #[error("User already has a pending invitation for this project")]
    DuplicatePending,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Invitation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Waiting for the receiver's decision
    Pending,

    /// Receiver accepted; a membership was created
    Accepted,

    /// Receiver declined
    Rejected,

    /// The seven-day window elapsed before a response
    Expired,
}

impl InvitationStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
            InvitationStatus::Expired => "expired",
        }
    }

    /// Checks if status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }

    /// Checks if transition to target status is valid
    pub fn can_transition_to(&self, target: InvitationStatus) -> bool {
        matches!(
            (self, target),
            (InvitationStatus::Pending, InvitationStatus::Accepted)
                | (InvitationStatus::Pending, InvitationStatus::Rejected)
                | (InvitationStatus::Pending, InvitationStatus::Expired)
        )
    }
}

/// Project invitation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectInvitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Project the receiver is invited to
    pub project_id: Uuid,

    /// Member who sent the invitation
    pub sender_id: Uuid,

    /// User being invited
    pub receiver_id: Uuid,

    /// Role granted on acceptance
    pub role: ProjectRole,

    /// Current lifecycle status
    pub status: InvitationStatus,

    /// When the invitation was created
    pub created_at: DateTime<Utc>,

    /// Past this instant the invitation can only expire
    pub expires_at: DateTime<Utc>,

    /// When the receiver responded (None while pending)
    pub responded_at: Option<DateTime<Utc>>,
}

impl ProjectInvitation {
    /// Whether the invitation's window has passed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Creates an invitation
    ///
    /// Precondition checks — receiver not already a member, no pending
    /// invitation for the pair — run first; the partial unique index backs
    /// the pending check against races.
    ///
    /// # Errors
    ///
    /// - [`InvitationError::AlreadyMember`] if the receiver is a member
    /// - [`InvitationError::DuplicatePending`] if a pending invitation
    ///   exists for (project, receiver)
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        role: ProjectRole,
    ) -> Result<Self, InvitationError> {
        let already_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(receiver_id)
        .fetch_one(pool)
        .await?;

        if already_member {
            return Err(InvitationError::AlreadyMember);
        }

        let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);

        let invitation = sqlx::query_as::<_, ProjectInvitation>(
            r#"
            INSERT INTO project_invitations (project_id, sender_id, receiver_id, role, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, project_id, sender_id, receiver_id, role, status,
                      created_at, expires_at, responded_at
            "#,
        )
        .bind(project_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(role)
        .bind(expires_at)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.constraint().is_some() => {
                InvitationError::DuplicatePending
            }
            _ => InvitationError::Database(e),
        })?;

        Ok(invitation)
    }

    /// Finds an invitation by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, ProjectInvitation>(
            r#"
            SELECT id, project_id, sender_id, receiver_id, role, status,
                   created_at, expires_at, responded_at
            FROM project_invitations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Lists a project's invitations, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, ProjectInvitation>(
            r#"
            SELECT id, project_id, sender_id, receiver_id, role, status,
                   created_at, expires_at, responded_at
            FROM project_invitations
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(invitations)
    }

    /// Lists the invitations a user has received, newest first
    pub async fn list_by_receiver(pool: &PgPool, receiver_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, ProjectInvitation>(
            r#"
            SELECT id, project_id, sender_id, receiver_id, role, status,
                   created_at, expires_at, responded_at
            FROM project_invitations
            WHERE receiver_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(receiver_id)
        .fetch_all(pool)
        .await?;

        Ok(invitations)
    }

    /// Responds to an invitation as its receiver
    ///
    /// Must be pending. A late response transitions the row to expired and
    /// fails with [`InvitationError::Expired`]. Acceptance writes the
    /// status flip and the membership insert in one transaction; the insert
    /// is idempotent (`ON CONFLICT DO NOTHING`) so a membership created by
    /// other means in the meantime does not fail the accept.
    ///
    /// # Errors
    ///
    /// - [`InvitationError::NotFound`] if the invitation doesn't exist
    /// - [`InvitationError::AlreadyResponded`] if it is terminal
    /// - [`InvitationError::Expired`] on a late response
    pub async fn respond(
        pool: &PgPool,
        id: Uuid,
        accept: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, InvitationError> {
        let mut tx = pool.begin().await?;

        let invitation = sqlx::query_as::<_, ProjectInvitation>(
            r#"
            SELECT id, project_id, sender_id, receiver_id, role, status,
                   created_at, expires_at, responded_at
            FROM project_invitations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(InvitationError::NotFound)?;

        if invitation.status.is_terminal() {
            return Err(InvitationError::AlreadyResponded(
                invitation.status.as_str(),
            ));
        }

        if invitation.is_expired(now) {
            Self::transition(&mut tx, id, InvitationStatus::Expired).await?;
            tx.commit().await?;
            return Err(InvitationError::Expired);
        }

        let target = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Rejected
        };
        debug_assert!(invitation.status.can_transition_to(target));

        let updated = Self::transition(&mut tx, id, target).await?;

        if accept {
            sqlx::query(
                r#"
                INSERT INTO project_members (project_id, user_id, role)
                VALUES ($1, $2, $3)
                ON CONFLICT (project_id, user_id) DO NOTHING
                "#,
            )
            .bind(invitation.project_id)
            .bind(invitation.receiver_id)
            .bind(invitation.role)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Cancels a pending invitation by deleting its row
    ///
    /// Cancellation is a hard delete, not a status transition — asymmetric
    /// with accept/reject. See DESIGN.md for the trade-off.
    ///
    /// # Errors
    ///
    /// - [`InvitationError::NotFound`] if the invitation doesn't exist
    /// - [`InvitationError::AlreadyResponded`] if it is no longer pending
    pub async fn cancel(pool: &PgPool, id: Uuid) -> Result<(), InvitationError> {
        let result = sqlx::query(
            "DELETE FROM project_invitations WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "gone" from "already responded" for the caller.
            let existing = Self::find_by_id(pool, id).await?;
            return match existing {
                Some(inv) => Err(InvitationError::AlreadyResponded(inv.status.as_str())),
                None => Err(InvitationError::NotFound),
            };
        }

        Ok(())
    }

    async fn transition(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectInvitation>(
            r#"
            UPDATE project_invitations
            SET status = $2, responded_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, sender_id, receiver_id, role, status,
                      created_at, expires_at, responded_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: InvitationStatus, expires_in_minutes: i64) -> ProjectInvitation {
        let now = Utc::now();
        ProjectInvitation {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            role: ProjectRole::Developer,
            status,
            created_at: now,
            expires_at: now + Duration::minutes(expires_in_minutes),
            responded_at: None,
        }
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(InvitationStatus::Pending.as_str(), "pending");
        assert_eq!(InvitationStatus::Accepted.as_str(), "accepted");
        assert_eq!(InvitationStatus::Rejected.as_str(), "rejected");
        assert_eq!(InvitationStatus::Expired.as_str(), "expired");
    }

    #[test]
    fn test_only_pending_can_transition() {
        let pending = InvitationStatus::Pending;
        assert!(pending.can_transition_to(InvitationStatus::Accepted));
        assert!(pending.can_transition_to(InvitationStatus::Rejected));
        assert!(pending.can_transition_to(InvitationStatus::Expired));
        assert!(!pending.can_transition_to(InvitationStatus::Pending));

        for terminal in [
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Expired,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(InvitationStatus::Accepted));
            assert!(!terminal.can_transition_to(InvitationStatus::Pending));
        }
    }

    #[test]
    fn test_expiry_uses_injected_clock() {
        let invitation = sample(InvitationStatus::Pending, 60);

        assert!(!invitation.is_expired(Utc::now()));
        assert!(invitation.is_expired(Utc::now() + Duration::hours(2)));
        // Exactly at the boundary the invitation is still answerable.
        assert!(!invitation.is_expired(invitation.expires_at));
    }

    #[test]
    fn test_invitation_error_display() {
        assert!(InvitationError::Expired.to_string().contains("expired"));
        assert!(InvitationError::AlreadyMember.to_string().contains("already a member"));
        assert!(InvitationError::AlreadyResponded("accepted")
            .to_string()
            .contains("accepted"));
    }
}
