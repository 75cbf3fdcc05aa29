//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_required};
use eyre::{Result, WrapErr};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::Arc;

const GMAIL_SMTP_HOST: &str = "smtp.gmail.com";
const GMAIL_SMTP_PORT: u16 = 465;

/// Gmail account credentials.
///
/// - `GMAIL_USER`: sending address, also used as the From header
/// - `GMAIL_APP_PASSWORD`: an app password, not the account password
#[derive(Clone)]
pub struct GmailConfig {
    pub user: String,
    pub app_password: String,
}

impl FromEnv for GmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            user: env_required("GMAIL_USER")?,
            app_password: env_required("GMAIL_APP_PASSWORD")?,
        })
    }
}

impl std::fmt::Debug for GmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailConfig")
            .field("user", &self.user)
            .field("app_password", &"****")
            .finish()
    }
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Implicit TLS relay through Gmail
    pub fn gmail(config: &GmailConfig) -> Self {
        Self {
            host: GMAIL_SMTP_HOST.to_string(),
            port: GMAIL_SMTP_PORT,
            username: config.user.clone(),
            password: config.app_password.clone(),
            from_email: config.user.clone(),
            from_name: "FreshJA".to_string(),
            use_tls: true,
        }
    }
}

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let transport = if config.use_tls {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
                .credentials(creds)
                .port(config.port)
                .build()
        } else {
            // Local catchers (Mailpit) take no auth
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        };

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    pub fn gmail(config: &GmailConfig) -> Result<Self> {
        Self::new(SmtpConfig::gmail(config))
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .wrap_err("Invalid from address")?;

        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let mut builder = Message::builder().from(from).to(to).subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            let reply_to: Mailbox = reply_to.parse().wrap_err("Invalid reply-to address")?;
            builder = builder.reply_to(reply_to);
        }

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        self.transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gmail() -> GmailConfig {
        GmailConfig {
            user: "shop@freshja.com".to_string(),
            app_password: "abcd efgh ijkl mnop".to_string(),
        }
    }

    #[test]
    fn test_gmail_smtp_config() {
        let config = SmtpConfig::gmail(&gmail());
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 465);
        assert_eq!(config.from_email, "shop@freshja.com");
        assert!(config.use_tls);
    }

    #[test]
    fn test_gmail_debug_hides_password() {
        assert!(!format!("{:?}", gmail()).contains("abcd"));
    }

    #[test]
    fn test_gmail_from_env_requires_both_vars() {
        temp_env::with_vars(
            [("GMAIL_USER", Some("shop@freshja.com")), ("GMAIL_APP_PASSWORD", None)],
            || {
                let err = GmailConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("GMAIL_APP_PASSWORD"));
            },
        );
    }

    fn local_provider() -> SmtpProvider {
        SmtpProvider::new(SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@freshja.com".to_string(),
            from_name: "FreshJA".to_string(),
            use_tls: false,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_message_requires_body() {
        let provider = local_provider();
        let email = Email::new("customer@freshja.com", "Empty");
        assert!(provider.build_message(&email).is_err());

        let email = email.with_html("<p>hi</p>");
        assert!(provider.build_message(&email).is_ok());
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let provider = local_provider();
        let email = Email::new("not an address", "Hi").with_text("body");
        assert!(provider.build_message(&email).is_err());
    }
}
