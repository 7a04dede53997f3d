//! Email template system.
//!
//! This module provides:
//! - Template groups loaded from a directory tree (`root/<group>/<file>`)
//! - Name resolution with `default` fallback inside a group
//! - Handlebars rendering against arbitrary JSON data
//! - Subject extraction from the rendered `<title>` element
//!
//! # Example
//!
//! ```ignore
//! let store = TemplateStore::load("./templates")?;
//!
//! let rendered = store.render(
//!     "billing",
//!     &["invoice".to_string()],
//!     &json!({ "ID": 42 }),
//! )?;
//!
//! assert_eq!(rendered.subject, "Invoice #42");
//! ```

mod render;
mod store;
mod types;

pub use render::extract_title;
pub use store::{load_template_store, TemplateGroup, TemplateStore};
pub use types::{
    RenderRequest, RenderedMail, RenderedTemplate, TemplateError, TemplateResult,
    DEFAULT_TEMPLATE,
};
