//! Verification code model and lifecycle
//!
//! Short-lived six-digit codes proving control of an email address, used
//! by the email-verification, password-reset, and email-change flows.
//!
//! Lifecycle rules:
//!
//! - Issuing a code supersedes earlier unverified codes for the same
//!   (email, kind) pair — only the newest code can ever match.
//! - Codes expire 15 minutes after issue.
//! - Codes are single-use: a verified row never matches again.
//! - Five failed guesses burn the code ("too many attempts").
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE verification_kind AS ENUM ('email_verification', 'password_reset', 'email_change');
//!
//! CREATE TABLE email_verifications (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     email CITEXT NOT NULL,
//!     code CHAR(6) NOT NULL,
//!     kind verification_kind NOT NULL,
//!     expires_at TIMESTAMPTZ NOT NULL,
//!     verified BOOLEAN NOT NULL DEFAULT FALSE,
//!     attempts INTEGER NOT NULL DEFAULT 0,
//!     user_id UUID REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// How long an issued code stays valid
pub const CODE_TTL_MINUTES: i64 = 15;

/// Failed guesses allowed before a code is burned
pub const MAX_ATTEMPTS: i32 = 5;

/// Error type for verification operations
#[derive(Debug, Error)]
pub enum VerificationError {
    /// No live code matches, or the supplied code is wrong
    #[error("Verification code is invalid or expired")]
    InvalidOrExpired,

    /// The attempt cap was reached
    #[error("Too many verification attempts")]
    TooManyAttempts,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What a verification code proves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    /// Confirming a freshly registered address
    EmailVerification,

    /// Authorizing a password reset
    PasswordReset,

    /// Claiming a new address during an email change
    EmailChange,
}

impl VerificationKind {
    /// Converts kind to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationKind::EmailVerification => "email_verification",
            VerificationKind::PasswordReset => "password_reset",
            VerificationKind::EmailChange => "email_change",
        }
    }
}

/// One issued verification code
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailVerification {
    /// Unique row ID
    pub id: Uuid,

    /// Address the code was sent to (for EmailChange: the new address)
    pub email: String,

    /// The six-digit code itself
    #[serde(skip_serializing)]
    pub code: String,

    /// Flow this code belongs to
    pub kind: VerificationKind,

    /// Past this instant the code never matches
    pub expires_at: DateTime<Utc>,

    /// Set once the code has matched (or been superseded); excludes the
    /// row from all future lookups
    pub verified: bool,

    /// Failed guesses so far
    pub attempts: i32,

    /// Account the flow belongs to, when known at issue time
    pub user_id: Option<Uuid>,

    /// When the code was issued
    pub created_at: DateTime<Utc>,
}

impl EmailVerification {
    /// Whether the code's window has passed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Issues a fresh code for (email, kind)
    ///
    /// Prior unverified codes for the pair are invalidated in the same
    /// transaction, so at most one live code exists per pair.
    pub async fn issue(
        pool: &PgPool,
        email: &str,
        kind: VerificationKind,
        user_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE email_verifications
            SET verified = TRUE
            WHERE email = $1 AND kind = $2 AND verified = FALSE
            "#,
        )
        .bind(email)
        .bind(kind)
        .execute(&mut *tx)
        .await?;

        let verification = sqlx::query_as::<_, EmailVerification>(
            r#"
            INSERT INTO email_verifications (email, code, kind, expires_at, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, code, kind, expires_at, verified, attempts, user_id, created_at
            "#,
        )
        .bind(email)
        .bind(&code)
        .bind(kind)
        .bind(expires_at)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(verification)
    }

    /// Verifies a code for (email, kind) at `now`
    ///
    /// Looks up the newest unverified, unexpired row for the pair. The
    /// attempt cap is checked before this attempt is consumed; a wrong
    /// code increments the counter and fails. A match marks the row
    /// verified and — for [`VerificationKind::EmailVerification`] with an
    /// associated user — flips the user's `email_verified` flag, in the
    /// same transaction.
    ///
    /// Returns the associated user ID, when one was recorded at issue.
    ///
    /// # Errors
    ///
    /// - [`VerificationError::InvalidOrExpired`] if no live row exists or
    ///   the code doesn't match
    /// - [`VerificationError::TooManyAttempts`] once five guesses failed
    pub async fn verify(
        pool: &PgPool,
        email: &str,
        code: &str,
        kind: VerificationKind,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, VerificationError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT id, email, code, kind, expires_at, verified, attempts, user_id, created_at
            FROM email_verifications
            WHERE email = $1 AND kind = $2 AND verified = FALSE AND expires_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(email)
        .bind(kind)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(VerificationError::InvalidOrExpired)?;

        if row.attempts >= MAX_ATTEMPTS {
            return Err(VerificationError::TooManyAttempts);
        }

        if row.code.trim() != code {
            sqlx::query("UPDATE email_verifications SET attempts = attempts + 1 WHERE id = $1")
                .bind(row.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Err(VerificationError::InvalidOrExpired);
        }

        sqlx::query(
            "UPDATE email_verifications SET verified = TRUE, attempts = attempts + 1 WHERE id = $1",
        )
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        if kind == VerificationKind::EmailVerification {
            if let Some(user_id) = row.user_id {
                sqlx::query(
                    "UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1",
                )
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(row.user_id)
    }
}

/// Generates a uniformly random six-digit code (100000–999999 inclusive)
fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expires_in_minutes: i64) -> EmailVerification {
        let now = Utc::now();
        EmailVerification {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            code: "123456".to_string(),
            kind: VerificationKind::EmailVerification,
            expires_at: now + Duration::minutes(expires_in_minutes),
            verified: false,
            attempts: 0,
            user_id: None,
            created_at: now,
        }
    }

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n), "out of range: {}", n);
        }
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(VerificationKind::EmailVerification.as_str(), "email_verification");
        assert_eq!(VerificationKind::PasswordReset.as_str(), "password_reset");
        assert_eq!(VerificationKind::EmailChange.as_str(), "email_change");
    }

    #[test]
    fn test_expiry_uses_injected_clock() {
        let verification = sample(CODE_TTL_MINUTES);

        assert!(!verification.is_expired(Utc::now()));
        // Fifteen minutes later the code is dead, no real waiting needed.
        assert!(verification.is_expired(Utc::now() + Duration::minutes(CODE_TTL_MINUTES + 1)));
    }

    #[test]
    fn test_verification_error_display() {
        assert!(VerificationError::InvalidOrExpired
            .to_string()
            .contains("invalid or expired"));
        assert!(VerificationError::TooManyAttempts
            .to_string()
            .contains("Too many"));
    }
}
