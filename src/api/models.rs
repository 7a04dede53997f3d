//! Request and response models for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to render a template and mail it
///
/// ```json
/// {
///   "template_group": "billing",
///   "template_name": ["invoice_fr", "invoice"],
///   "targets": ["alice@example.com"],
///   "data": { "ID": 42 }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct SendMailRequest {
    /// Template group (directory name)
    pub template_group: String,
    /// One template name or an ordered list of candidates
    #[serde(default)]
    pub template_name: TemplateNames,
    /// Recipient addresses
    pub targets: Vec<String>,
    /// Data bound to the template
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Template name candidates, accepted as a string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TemplateNames {
    One(String),
    Many(Vec<String>),
}

impl Default for TemplateNames {
    fn default() -> Self {
        TemplateNames::Many(Vec::new())
    }
}

impl TemplateNames {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TemplateNames::One(name) => vec![name],
            TemplateNames::Many(names) => names,
        }
    }
}

/// Response for a delivered message
#[derive(Debug, Serialize)]
pub struct SendMailResponse {
    pub success: bool,
    /// Template that was actually rendered
    pub template: String,
    pub subject: String,
    pub recipients: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub groups: usize,
}

/// One template group and its template names
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub templates: Vec<String>,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub groups: Vec<GroupSummary>,
    /// Total template count across groups
    pub total: usize,
}
