//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{RENDER_DURATION, RENDER_FAILURES_TOTAL, REQUESTS_TOTAL, TEMPLATE_GROUPS};
use crate::template::TemplateError;

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording mail metrics
pub struct MailMetrics;

impl MailMetrics {
    /// Record a message handed to the transport successfully
    pub fn record_sent() {
        REQUESTS_TOTAL.with_label_values(&["sent"]).inc();
    }

    /// Record a request rejected before reaching the transport
    pub fn record_rejected() {
        REQUESTS_TOTAL.with_label_values(&["rejected"]).inc();
    }

    /// Record a transport failure
    pub fn record_transport_failed() {
        REQUESTS_TOTAL.with_label_values(&["transport_failed"]).inc();
    }

    /// Record a render failure
    pub fn record_render_failure(err: &TemplateError) {
        RENDER_FAILURES_TOTAL.with_label_values(&[err.kind()]).inc();
    }

    /// Record render latency
    pub fn observe_render(elapsed: Duration) {
        RENDER_DURATION.observe(elapsed.as_secs_f64());
    }

    /// Record the number of loaded groups
    pub fn set_template_groups(count: usize) {
        TEMPLATE_GROUPS.set(count as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_metrics() {
        MailMetrics::record_sent();
        MailMetrics::record_rejected();
        MailMetrics::record_transport_failed();
        MailMetrics::record_render_failure(&TemplateError::TitleNotFound("t".into()));
        MailMetrics::observe_render(Duration::from_millis(2));
        // Just verify no panics
    }

    #[test]
    fn test_encode_metrics() {
        MailMetrics::set_template_groups(3);

        let output = encode_metrics().unwrap();
        assert!(output.contains("mail_template_groups"));
    }
}
