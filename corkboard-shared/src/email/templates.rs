//! Message templates for outgoing mail
//!
//! Each builder returns a `(subject, html_body)` pair; the caller hands it
//! to the [`crate::email::Mailer`]. Four message kinds exist: email
//! verification, password reset, email change, and invitation notice.

/// Subject and HTML body of one outgoing message
pub type EmailContent = (String, String);

/// Message for confirming a freshly registered address
pub fn email_verification(username: &str, code: &str) -> EmailContent {
    let subject = "Verify your Corkboard email address".to_string();
    let body = format!(
        r#"<html>
<body style="font-family: sans-serif; color: #222;">
  <h2>Welcome to Corkboard, {username}!</h2>
  <p>Enter this code to verify your email address:</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px;">{code}</p>
  <p>The code expires in 15 minutes. If you didn't create an account, you can ignore this message.</p>
</body>
</html>"#
    );
    (subject, body)
}

/// Message authorizing a password reset
pub fn password_reset(code: &str) -> EmailContent {
    let subject = "Reset your Corkboard password".to_string();
    let body = format!(
        r#"<html>
<body style="font-family: sans-serif; color: #222;">
  <h2>Password reset requested</h2>
  <p>Enter this code to choose a new password:</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px;">{code}</p>
  <p>The code expires in 15 minutes. If you didn't request a reset, your password is unchanged and you can ignore this message.</p>
</body>
</html>"#
    );
    (subject, body)
}

/// Message claiming a new address during an email change
pub fn email_change(username: &str, code: &str) -> EmailContent {
    let subject = "Confirm your new Corkboard email address".to_string();
    let body = format!(
        r#"<html>
<body style="font-family: sans-serif; color: #222;">
  <h2>Email change requested</h2>
  <p>Hi {username}, enter this code to confirm this address as your new login email:</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px;">{code}</p>
  <p>The code expires in 15 minutes. If you didn't request this change, you can ignore this message.</p>
</body>
</html>"#
    );
    (subject, body)
}

/// Notice that the receiver has been invited to a project
pub fn invitation_notice(sender_username: &str, project_title: &str) -> EmailContent {
    let subject = format!("You've been invited to {project_title} on Corkboard");
    let body = format!(
        r#"<html>
<body style="font-family: sans-serif; color: #222;">
  <h2>Project invitation</h2>
  <p><b>{sender_username}</b> invited you to join <b>{project_title}</b>.</p>
  <p>Sign in to Corkboard to accept or decline. The invitation expires in 7 days.</p>
</body>
</html>"#
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_contains_code_and_name() {
        let (subject, body) = email_verification("alice", "123456");
        assert!(subject.contains("Verify"));
        assert!(body.contains("123456"));
        assert!(body.contains("alice"));
    }

    #[test]
    fn test_password_reset_contains_code() {
        let (subject, body) = password_reset("654321");
        assert!(subject.contains("password"));
        assert!(body.contains("654321"));
    }

    #[test]
    fn test_email_change_contains_code() {
        let (_, body) = email_change("bob", "111111");
        assert!(body.contains("111111"));
        assert!(body.contains("bob"));
    }

    #[test]
    fn test_invitation_notice_names_project_and_sender() {
        let (subject, body) = invitation_notice("carol", "Apollo");
        assert!(subject.contains("Apollo"));
        assert!(body.contains("carol"));
        assert!(body.contains("7 days"));
    }
}
