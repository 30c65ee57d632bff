//! Email transport behind a `Mailer` trait
//!
//! Production uses lettre's async SMTP transport; development and tests
//! use a log-only mailer that records the send at info level and drops the
//! message. Which one is built is decided once, at startup, from an
//! explicit [`MailConfig`] — the sending code never consults global state.
//!
//! # Example
//!
//! ```no_run
//! use corkboard_shared::email::{build_mailer, MailConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MailConfig {
//!     enabled: false, // log-only
//!     ..Default::default()
//! };
//!
//! let mailer = build_mailer(&config)?;
//! mailer.send("user@example.com", "Hello", "<p>Hi!</p>").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::info;

/// Error type for email operations
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// A sender or recipient address failed to parse
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    BuildError(String),

    /// The transport refused or failed the send
    #[error("Failed to send email: {0}")]
    TransportError(String),
}

/// SMTP settings, resolved once at startup
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Whether to actually deliver mail; false selects the log-only mailer
    pub enabled: bool,

    /// SMTP relay hostname
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username (empty = unauthenticated, e.g. a local Mailpit)
    pub smtp_username: String,

    /// SMTP password
    pub smtp_password: String,

    /// From address on every outgoing message
    pub from_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "noreply@corkboard.dev".to_string(),
        }
    }
}

/// Sends a single HTML message
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers `html` to `to` under `subject`
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError>;
}

/// Builds the mailer selected by `config`
///
/// # Errors
///
/// Returns an error if the SMTP relay hostname is not usable
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, EmailError> {
    if !config.enabled {
        info!("Email delivery disabled; outgoing mail will be logged only");
        return Ok(Arc::new(LogMailer));
    }

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        .map_err(|e| EmailError::TransportError(e.to_string()))?
        .port(config.smtp_port);

    if !config.smtp_username.is_empty() {
        builder = builder.credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ));
    }

    Ok(Arc::new(SmtpMailer {
        transport: builder.build(),
        from_address: config.from_address.clone(),
    }))
}

/// SMTP mailer over lettre's async transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{:?}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{:?}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_resp| ())
            .map_err(|e| EmailError::TransportError(e.to_string()))
    }
}

/// Mailer that logs instead of delivering
///
/// Used when delivery is disabled; keeps the verification flows exercisable
/// in development without an SMTP relay.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), EmailError> {
        info!(to = %to, subject = %subject, "Email delivery disabled, dropping message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer;
        let result = mailer
            .send("recipient@example.com", "Test", "<p>body</p>")
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_mailer_disabled() {
        let config = MailConfig::default();
        assert!(!config.enabled);
        assert!(build_mailer(&config).is_ok());
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_invalid_recipient() {
        // builder_dangerous avoids TLS setup for a transport we never use
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost").build();
        let mailer = SmtpMailer {
            transport,
            from_address: "from@example.com".to_string(),
        };

        let result = mailer.send("not-an-email", "Subject", "<p>body</p>").await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_invalid_sender() {
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost").build();
        let mailer = SmtpMailer {
            transport,
            from_address: "bad-from-address".to_string(),
        };

        let result = mailer
            .send("recipient@example.com", "Subject", "<p>body</p>")
            .await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }
}
