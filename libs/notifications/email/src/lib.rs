//! Outgoing email for FreshJA.
//!
//! ## Components
//!
//! - **Providers**: Gmail over SMTP (lettre), a logging provider used when no
//!   credentials are configured, and an in-memory mock for tests
//! - **Templates**: Handlebars `TemplateEngine` with the welcome and password
//!   reset code emails
//! - **Mailer**: renders a template and sends it through the provider
//!
//! ```ignore
//! use email::Mailer;
//!
//! let mailer = Mailer::from_env()?;
//! mailer.send_reset_code("customer@freshja.com", "493021", 15).await?;
//! ```

pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod templates;

pub use error::{NotificationError, NotificationResult};
pub use models::Email;
pub use provider::{
    EmailProvider, GmailConfig, LogProvider, MockSmtpProvider, SendResult, SmtpConfig,
    SmtpProvider,
};
pub use service::Mailer;
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
