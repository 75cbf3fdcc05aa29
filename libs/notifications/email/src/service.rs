//! High level mail API used by the HTTP handlers.

use crate::error::{NotificationError, NotificationResult};
use crate::models::Email;
use crate::provider::{EmailProvider, GmailConfig, LogProvider, SmtpProvider};
use crate::templates::{RESET_CODE, TemplateEngine, WELCOME};
use core_config::FromEnv;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Renders templates and hands them to the configured provider.
#[derive(Clone)]
pub struct Mailer {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
}

impl Mailer {
    pub fn new(provider: Arc<dyn EmailProvider>) -> NotificationResult<Self> {
        let templates =
            TemplateEngine::new().map_err(|e| NotificationError::TemplateError(e.to_string()))?;
        Ok(Self {
            provider,
            templates: Arc::new(templates),
        })
    }

    /// Gmail SMTP when `GMAIL_USER`/`GMAIL_APP_PASSWORD` are set, otherwise
    /// a provider that only logs.
    pub fn from_env() -> NotificationResult<Self> {
        let provider: Arc<dyn EmailProvider> = match GmailConfig::from_env() {
            Ok(config) => {
                let provider = SmtpProvider::gmail(&config)
                    .map_err(|e| NotificationError::ConfigError(format!("{:#}", e)))?;
                info!(user = %config.user, "Gmail SMTP mailer configured");
                Arc::new(provider)
            }
            Err(e) => {
                warn!(error = %e, "Gmail credentials missing, emails will only be logged");
                Arc::new(LogProvider)
            }
        };
        Self::new(provider)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    #[instrument(skip(self))]
    pub async fn send_welcome(&self, to: &str, name: &str) -> NotificationResult<()> {
        self.send_template(to, WELCOME, &json!({ "name": name })).await
    }

    #[instrument(skip(self, code))]
    pub async fn send_reset_code(
        &self,
        to: &str,
        code: &str,
        expiry_minutes: i64,
    ) -> NotificationResult<()> {
        self.send_template(
            to,
            RESET_CODE,
            &json!({ "code": code, "expiry_minutes": expiry_minutes }),
        )
        .await
    }

    async fn send_template(
        &self,
        to: &str,
        template: &str,
        data: &serde_json::Value,
    ) -> NotificationResult<()> {
        let rendered = self
            .templates
            .render(template, data)
            .map_err(|e| NotificationError::TemplateError(e.to_string()))?;

        let mut email = Email::new(to, rendered.subject);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;

        self.provider.send(&email).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("provider", &self.provider.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockSmtpProvider;

    #[tokio::test]
    async fn test_send_reset_code() {
        let provider = MockSmtpProvider::new();
        let mailer = Mailer::new(Arc::new(provider.clone())).unwrap();

        mailer
            .send_reset_code("customer@freshja.com", "123456", 15)
            .await
            .unwrap();

        let sent = provider.last_sent_to("customer@freshja.com").await.unwrap();
        assert_eq!(sent.subject, "FreshJA - Password Reset Code");
        assert!(sent.body_html.unwrap().contains("123456"));
    }

    #[tokio::test]
    async fn test_send_welcome() {
        let provider = MockSmtpProvider::new();
        let mailer = Mailer::new(Arc::new(provider.clone())).unwrap();

        mailer.send_welcome("ann@freshja.com", "Ann").await.unwrap();

        let sent = provider.last_sent_to("ann@freshja.com").await.unwrap();
        assert_eq!(sent.subject, "Welcome to FreshJA!");
        assert!(sent.body_text.unwrap().contains("Ann"));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let mailer = Mailer::new(Arc::new(MockSmtpProvider::failing("smtp down"))).unwrap();
        let err = mailer.send_welcome("a@freshja.com", "A").await.unwrap_err();
        assert!(matches!(err, NotificationError::ProviderError(msg) if msg.contains("smtp down")));
    }

    #[test]
    fn test_from_env_without_credentials_logs_only() {
        temp_env::with_vars_unset(["GMAIL_USER", "GMAIL_APP_PASSWORD"], || {
            let mailer = Mailer::from_env().unwrap();
            assert_eq!(mailer.provider_name(), "log");
        });
    }
}
