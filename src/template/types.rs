//! Template error taxonomy and per-request value types

use std::path::PathBuf;

use thiserror::Error;

/// Name of the per-group fallback template
pub const DEFAULT_TEMPLATE: &str = "default";

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to load templates from {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Template group not found: {0}")]
    GroupNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template {template} execution error: {message}")]
    Render { template: String, message: String },

    #[error("Template {0} title not found: no <title> tag found")]
    TitleNotFound(String),
}

impl TemplateError {
    pub(crate) fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TemplateError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Short label used for metrics and error codes
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateError::Load { .. } => "load",
            TemplateError::GroupNotFound(_) => "group_not_found",
            TemplateError::TemplateNotFound(_) => "template_not_found",
            TemplateError::Render { .. } => "render",
            TemplateError::TitleNotFound(_) => "title_not_found",
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Everything needed to render one message
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Template group (directory name)
    pub group: String,

    /// Candidate template names, tried in order before `default`
    pub names: Vec<String>,

    /// `From` identity
    pub sender: String,

    /// Recipient addresses
    pub recipients: Vec<String>,

    /// Arbitrary JSON data bound to the template
    pub data: serde_json::Value,
}

/// Output of a single template execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Name of the template that was actually executed
    pub template: String,

    /// Text of the first `<title>` element
    pub subject: String,

    /// Rendered HTML, trimmed of surrounding whitespace
    pub body: String,
}

/// A rendered message addressed to its recipients, ready for composition
#[derive(Debug, Clone)]
pub struct RenderedMail {
    pub template: String,
    pub subject: String,
    pub body: String,
    pub sender: String,
    pub recipients: Vec<String>,
}

impl RenderedMail {
    /// Header block plus body, as handed to the mail transport
    pub fn payload(&self) -> Vec<u8> {
        crate::mail::compose(
            &self.sender,
            &self.recipients,
            &self.subject,
            self.body.as_bytes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_names_requested_template() {
        let err = TemplateError::TemplateNotFound("welcome".to_string());
        assert_eq!(err.to_string(), "Template not found: welcome");
        assert_eq!(err.kind(), "template_not_found");
    }

    #[test]
    fn test_title_not_found_message() {
        let err = TemplateError::TitleNotFound("invoice".to_string());
        assert!(err.to_string().contains("invoice"));
        assert!(err.to_string().contains("<title>"));
    }

    #[test]
    fn test_rendered_mail_payload_ends_with_body() {
        let mail = RenderedMail {
            template: "welcome".to_string(),
            subject: "Welcome".to_string(),
            body: "<p>Hello</p>".to_string(),
            sender: "noreply@example.com".to_string(),
            recipients: vec!["alice@example.com".to_string()],
        };

        let payload = String::from_utf8(mail.payload()).unwrap();
        assert!(payload.starts_with("From: noreply@example.com\r\n"));
        assert!(payload.ends_with("\r\n\r\n<p>Hello</p>"));
    }
}
