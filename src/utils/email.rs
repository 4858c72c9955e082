use std::sync::{Arc, Mutex};

use academia_config::EmailConfig;
use academia_core::AppError;
use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

/// Mail the application knows how to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    PasswordReset {
        name: String,
        reset_link: String,
        timeout_days: i64,
    },
    PasswordResetConfirmation {
        name: String,
    },
}

impl EmailTemplate {
    pub fn subject(&self) -> &'static str {
        match self {
            EmailTemplate::PasswordReset { .. } => "Password Reset",
            EmailTemplate::PasswordResetConfirmation { .. } => "Password Reset Successful",
        }
    }

    pub fn text_body(&self) -> String {
        match self {
            EmailTemplate::PasswordReset {
                name,
                reset_link,
                timeout_days,
            } => format!(
                "Hi {name},\n\n\
                 You requested to reset your password.\n\n\
                 Follow the link below to choose a new password:\n\
                 {reset_link}\n\n\
                 This link will expire in {timeout_days} day(s) and stops working as soon as \
                 your password changes or you log in again.\n\n\
                 If you didn't request this, please ignore this email.\n\n\
                 The Academia Team"
            ),
            EmailTemplate::PasswordResetConfirmation { name } => format!(
                "Hi {name},\n\n\
                 Your password has been successfully reset.\n\n\
                 If you didn't make this change, please contact your school administrator \
                 immediately.\n\n\
                 The Academia Team"
            ),
        }
    }

    pub fn html_body(&self) -> String {
        let (heading, content) = match self {
            EmailTemplate::PasswordReset {
                name,
                reset_link,
                timeout_days,
            } => (
                "Password Reset",
                format!(
                    r#"<p>Hi <strong>{name}</strong>,</p>
<p>We received a request to reset your password. Click the button below to choose a new one:</p>
<p style="text-align: center; margin: 30px 0;">
  <a href="{reset_link}" style="padding: 14px 40px; background-color: #1D4ED8; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">Reset Password</a>
</p>
<p>Or copy and paste this link into your browser:</p>
<p style="color: #1D4ED8; word-break: break-all;">{reset_link}</p>
<p><strong>This link will expire in {timeout_days} day(s).</strong></p>
<p>If you didn't request a password reset, please ignore this email.</p>"#
                ),
            ),
            EmailTemplate::PasswordResetConfirmation { name } => (
                "Password Reset Successful",
                format!(
                    r#"<p>Hi <strong>{name}</strong>,</p>
<p>Your password has been successfully reset. You can now log in with your new password.</p>
<p style="background-color: #FEF3C7; border-left: 4px solid #F59E0B; padding: 15px;">
  <strong>Security notice:</strong> if you didn't make this change, please contact your school administrator immediately.
</p>"#
                ),
            ),
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{heading}</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
  <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; overflow: hidden;">
    <div style="background-color: #1D4ED8; padding: 30px; text-align: center;">
      <h1 style="margin: 0; color: #ffffff;">Academia</h1>
    </div>
    <div style="padding: 40px 30px; color: #444444; font-size: 16px; line-height: 1.5;">
      <h2 style="color: #333333;">{heading}</h2>
      {content}
    </div>
    <div style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; color: #999999; font-size: 12px;">
      This is an automated email from Academia. Please do not reply.
    </div>
  </div>
</body>
</html>"#
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub template: EmailTemplate,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, template: EmailTemplate) -> Self {
        Self {
            to: to.into(),
            template,
        }
    }

    pub fn subject(&self) -> &'static str {
        self.template.subject()
    }
}

#[async_trait]
pub trait EmailDispatch: Send + Sync + 'static {
    async fn send(&self, message: EmailMessage) -> Result<(), AppError>;
}

/// Sends mail over SMTP.
pub struct SmtpEmailService {
    config: EmailConfig,
}

impl SmtpEmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );
        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to create SMTP relay: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl EmailDispatch for SmtpEmailService {
    #[instrument(skip(self, message), fields(to = %message.to, subject = message.subject()))]
    async fn send(&self, message: EmailMessage) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow::anyhow!("invalid from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| AppError::internal(anyhow::anyhow!("invalid to address: {e}")))?)
            .subject(message.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(message.template.text_body()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(message.template.html_body()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to build email: {e}")))?;

        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("mail task failed: {e}")))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to send email: {e}")))?;

        Ok(())
    }
}

/// Logs mail instead of sending it.
///
/// Only the recipient and subject are logged. A [`recording`] service also
/// keeps every message so tests can read them back.
///
/// [`recording`]: ConsoleEmailService::recording
#[derive(Debug, Clone, Default)]
pub struct ConsoleEmailService {
    sent: Option<Arc<Mutex<Vec<EmailMessage>>>>,
}

impl ConsoleEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording() -> Self {
        Self {
            sent: Some(Arc::default()),
        }
    }

    /// Messages sent so far; always empty unless built with [`Self::recording`].
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .as_ref()
            .map(|sent| sent.lock().unwrap_or_else(|e| e.into_inner()).clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailDispatch for ConsoleEmailService {
    async fn send(&self, message: EmailMessage) -> Result<(), AppError> {
        info!(to = %message.to, subject = message.subject(), "email (console)");
        if let Some(sent) = &self.sent {
            sent.lock().unwrap_or_else(|e| e.into_inner()).push(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_template_contains_link() {
        let template = EmailTemplate::PasswordReset {
            name: "Jane".to_string(),
            reset_link: "http://localhost:8080/password-reset/abc/GE-sig".to_string(),
            timeout_days: 3,
        };
        assert_eq!(template.subject(), "Password Reset");
        assert!(template.text_body().contains("/password-reset/abc/GE-sig"));
        assert!(template.html_body().contains("href=\"http://localhost:8080/password-reset/abc/GE-sig\""));
        assert!(template.text_body().contains("3 day(s)"));
    }

    fn confirmation() -> EmailMessage {
        EmailMessage::new(
            "jane@example.com",
            EmailTemplate::PasswordResetConfirmation {
                name: "Jane".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_console_service_keeps_nothing() {
        let mailer = ConsoleEmailService::new();
        for _ in 0..1000 {
            mailer.send(confirmation()).await.unwrap();
        }
        assert!(mailer.sent().is_empty());
        assert!(mailer.sent.is_none());
    }

    #[tokio::test]
    async fn test_recording_service_records_messages() {
        let mailer = ConsoleEmailService::recording();
        let message = confirmation();
        mailer.send(message.clone()).await.unwrap();
        assert_eq!(mailer.sent(), vec![message]);
    }
}
