//! Handlebars templates for FreshJA emails.
//!
//! Each template registers up to three parts under `<name>_subject`,
//! `<name>_text` and `<name>_html`.

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

pub const WELCOME: &str = "welcome";
pub const RESET_CODE: &str = "reset_code";

#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    /// Engine with the built-in `welcome` and `reset_code` templates
    pub fn new() -> Result<Self> {
        let mut engine = Self {
            handlebars: Handlebars::new(),
            templates: HashMap::new(),
        };
        engine.handlebars.set_strict_mode(true);
        engine.register_defaults()?;
        Ok(engine)
    }

    pub fn register(&mut self, template: EmailTemplate) -> Result<()> {
        self.handlebars
            .register_template_string(&format!("{}_subject", template.name), &template.subject)
            .map_err(|e| eyre!("Failed to register subject template: {}", e))?;

        if let Some(text) = &template.body_text {
            self.handlebars
                .register_template_string(&format!("{}_text", template.name), text)
                .map_err(|e| eyre!("Failed to register text template: {}", e))?;
        }

        if let Some(html) = &template.body_html {
            self.handlebars
                .register_template_string(&format!("{}_html", template.name), html)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| eyre!("Template not found: {}", name))?;

        let subject = self
            .handlebars
            .render(&format!("{}_subject", name), data)
            .map_err(|e| eyre!("Failed to render subject: {}", e))?;

        let body_text = template
            .body_text
            .as_ref()
            .map(|_| {
                self.handlebars
                    .render(&format!("{}_text", name), data)
                    .map_err(|e| eyre!("Failed to render text: {}", e))
            })
            .transpose()?;

        let body_html = template
            .body_html
            .as_ref()
            .map(|_| {
                self.handlebars
                    .render(&format!("{}_html", name), data)
                    .map_err(|e| eyre!("Failed to render HTML: {}", e))
            })
            .transpose()?;

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn register_defaults(&mut self) -> Result<()> {
        self.register(EmailTemplate {
            name: WELCOME.to_string(),
            subject: "Welcome to FreshJA!".to_string(),
            body_text: Some(
                r#"Welcome to FreshJA, {{name}}!

Your account has been successfully created.

Start exploring fresh produce from local farmers today!"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #4CAF50;">Welcome to FreshJA, {{name}}!</h2>
  <p>Your account has been successfully created.</p>
  <p>Start exploring fresh produce from local farmers today!</p>
</div>"#
                    .to_string(),
            ),
        })?;

        self.register(EmailTemplate {
            name: RESET_CODE.to_string(),
            subject: "FreshJA - Password Reset Code".to_string(),
            body_text: Some(
                r#"Your FreshJA verification code is: {{code}}

This code will expire in {{expiry_minutes}} minutes.

If you didn't request this, please ignore this email."#
                    .to_string(),
            ),
            body_html: Some(
                r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #4CAF50;">FreshJA Password Reset</h2>
  <p>Your verification code is:</p>
  <div style="background-color: #f4f4f4; padding: 15px; text-align: center; font-size: 24px; font-weight: bold; letter-spacing: 5px; margin: 20px 0;">
    {{code}}
  </div>
  <p>This code will expire in {{expiry_minutes}} minutes.</p>
  <p>If you didn't request this, please ignore this email.</p>
</div>"#
                    .to_string(),
            ),
        })?;

        Ok(())
    }
}
