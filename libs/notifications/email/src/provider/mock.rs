//! Mock email provider for testing

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Captures sent emails in memory. Clones share the same mailbox.
#[derive(Clone)]
pub struct MockSmtpProvider {
    sent_emails: Arc<Mutex<Vec<Email>>>,
    failure_message: Option<String>,
}

impl MockSmtpProvider {
    pub fn new() -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            failure_message: None,
        }
    }

    /// A provider whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            failure_message: Some(message.into()),
        }
    }

    pub async fn sent_emails(&self) -> Vec<Email> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == email)
    }

    /// Most recent email addressed to `email`
    pub async fn last_sent_to(&self, email: &str) -> Option<Email> {
        self.sent_emails
            .lock()
            .await
            .iter()
            .rev()
            .find(|e| e.to == email)
            .cloned()
    }
}

impl Default for MockSmtpProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MockSmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        if let Some(message) = &self.failure_message {
            return Err(eyre::eyre!(message.clone()));
        }

        self.sent_emails.lock().await.push(email.clone());

        Ok(SendResult {
            message_id: format!("mock-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        if self.failure_message.is_some() {
            return Err(eyre::eyre!("Mock health check failed"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_captures_email() {
        let provider = MockSmtpProvider::new();
        let email = Email::new("customer@freshja.com", "Hello").with_text("Body");

        provider.send(&email).await.unwrap();

        assert_eq!(provider.sent_count().await, 1);
        assert!(provider.was_sent_to("customer@freshja.com").await);
        assert!(!provider.was_sent_to("other@freshja.com").await);
    }

    #[tokio::test]
    async fn test_mock_provider_fails() {
        let provider = MockSmtpProvider::failing("Simulated failure");
        let email = Email::new("customer@freshja.com", "Hello").with_text("Body");

        let err = provider.send(&email).await.unwrap_err();
        assert!(err.to_string().contains("Simulated failure"));
        assert!(provider.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_mailbox() {
        let provider = MockSmtpProvider::new();
        let clone = provider.clone();
        clone
            .send(&Email::new("a@freshja.com", "x").with_text("y"))
            .await
            .unwrap();
        assert_eq!(provider.sent_count().await, 1);
    }
}
