/// Outbound email for password resets
/// Uses lettre async SMTP when configured, otherwise logs the message
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, Result};

/// A rendered message ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(host: &str, config: &SmtpConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if email.to.is_empty() {
            return Err(AppError::Email("Recipient email cannot be empty".to_string()));
        }

        let message = Message::builder()
            .from(self.from.parse()?)
            .to(email.to.parse()?)
            .subject(email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body),
                    ),
            )?;

        self.transport.send(message).await?;
        tracing::info!(to = %email.to, "Email sent");
        Ok(())
    }
}

/// Development mailer: writes the message to the log instead of sending it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text_body,
            "SMTP not configured, logging email instead of sending"
        );
        Ok(())
    }
}

pub fn password_reset_email(to: &str, name: &str, reset_url: &str) -> OutgoingEmail {
    let text_body = format!(
        r#"Password Reset Request

Hi {name},

We received a request to reset the password for your account. To choose a new password, visit:

{reset_url}

This link expires in 1 hour. If you didn't request a password reset, you can ignore this email.
"#
    );

    let html_body = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <p>Hi <strong>{name}</strong>,</p>
    <p>We received a request to reset the password for your account.</p>
    <p><a href="{reset_url}">Reset your password</a></p>
    <p style="word-break: break-all;">{reset_url}</p>
    <p style="color: #666; font-size: 14px;">This link expires in 1 hour.
    If you didn't request a password reset, you can ignore this email.</p>
</body>
</html>"#
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Reset Your Password".to_string(),
        text_body,
        html_body,
    }
}
