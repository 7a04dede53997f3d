//! Prometheus metrics for the mail service.
//!
//! - Request outcomes (sent, rejected, transport failure)
//! - Render failures by error kind
//! - Render latency
//! - Loaded template groups

mod helpers;

pub use helpers::{encode_metrics, MailMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "mail";

lazy_static! {
    /// Send requests by outcome
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_requests_total", METRIC_PREFIX),
        "Total mail send requests by outcome",
        &["outcome"]
    ).unwrap();

    /// Render failures by error kind
    pub static ref RENDER_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_render_failures_total", METRIC_PREFIX),
        "Total template render failures by kind",
        &["kind"]
    ).unwrap();

    /// Time spent resolving, executing and parsing a template
    pub static ref RENDER_DURATION: Histogram = register_histogram!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Template render latency in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]
    ).unwrap();

    /// Number of loaded template groups
    pub static ref TEMPLATE_GROUPS: IntGauge = register_int_gauge!(
        format!("{}_template_groups", METRIC_PREFIX),
        "Number of loaded template groups"
    ).unwrap();
}
