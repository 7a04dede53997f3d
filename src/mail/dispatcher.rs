//! Render → compose → send pipeline shared by the front-ends

use std::sync::Arc;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::metrics::MailMetrics;
use crate::template::{RenderRequest, TemplateStore};

use super::transport::{parse_address, MailTransport, TransportError};

/// Outcome of a delivered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Template that was actually rendered
    pub template: String,
    pub subject: String,
    pub recipients: usize,
}

/// Renders requests against the template store and hands them to the transport
pub struct MailDispatcher {
    store: Arc<TemplateStore>,
    transport: Arc<dyn MailTransport>,
}

impl MailDispatcher {
    pub fn new(store: Arc<TemplateStore>, transport: Arc<dyn MailTransport>) -> Self {
        Self { store, transport }
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    /// Identity messages are sent from
    pub fn sender_identity(&self) -> &str {
        self.transport.sender_identity()
    }

    /// Render a template and deliver it.
    ///
    /// Any failure aborts before the transport is touched, except a failure
    /// of the transport itself.
    #[tracing::instrument(
        name = "mail.dispatch",
        skip(self, names, recipients, data),
        fields(group = %group, recipients = recipients.len())
    )]
    pub async fn dispatch(
        &self,
        group: &str,
        names: Vec<String>,
        recipients: Vec<String>,
        data: serde_json::Value,
    ) -> Result<DeliveryReceipt> {
        let result = self.deliver(group, names, recipients, data).await;

        match &result {
            Ok(receipt) => {
                MailMetrics::record_sent();
                tracing::info!(
                    template = %receipt.template,
                    subject = %receipt.subject,
                    "Mail sent"
                );
            }
            Err(AppError::Transport(e)) if !matches!(e, TransportError::InvalidAddress { .. }) => {
                MailMetrics::record_transport_failed();
            }
            Err(_) => MailMetrics::record_rejected(),
        }

        result
    }

    async fn deliver(
        &self,
        group: &str,
        names: Vec<String>,
        recipients: Vec<String>,
        data: serde_json::Value,
    ) -> Result<DeliveryReceipt> {
        validate_recipients(&recipients)?;

        let request = RenderRequest {
            group: group.to_string(),
            names,
            sender: self.sender_identity().to_string(),
            recipients,
            data,
        };

        let started = Instant::now();
        let mail = self.store.render_mail(&request).map_err(|e| {
            MailMetrics::record_render_failure(&e);
            e
        })?;
        MailMetrics::observe_render(started.elapsed());

        let payload = mail.payload();
        self.transport.send(&mail.recipients, &payload).await?;

        Ok(DeliveryReceipt {
            template: mail.template,
            subject: mail.subject,
            recipients: mail.recipients.len(),
        })
    }
}

/// Recipients must be present and individually well-formed
fn validate_recipients(recipients: &[String]) -> Result<()> {
    if recipients.is_empty() {
        return Err(AppError::Validation(
            "at least one recipient is required".to_string(),
        ));
    }

    for recipient in recipients {
        parse_address(recipient)?;
    }

    Ok(())
}
