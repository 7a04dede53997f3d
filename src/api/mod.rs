//! API layer - HTTP endpoint handlers.

mod health;
mod mail;
mod metrics;
mod models;
mod routes;
mod templates;

pub use health::health;
pub use mail::send_mail;
pub use metrics::prometheus_metrics;
pub use models::{
    GroupSummary, HealthResponse, SendMailRequest, SendMailResponse, TemplateListResponse,
    TemplateNames,
};
pub use routes::api_routes;
pub use templates::list_templates;
