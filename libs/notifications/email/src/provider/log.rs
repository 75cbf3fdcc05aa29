//! Provider used when no mail credentials are configured.

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

/// Logs the message instead of delivering it.
///
/// Bodies are not logged since they may carry reset codes.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProvider;

#[async_trait]
impl EmailProvider for LogProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        tracing::warn!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Mail delivery disabled, email not sent"
        );
        Ok(SendResult {
            message_id: format!("log-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
