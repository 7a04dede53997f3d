//! SMTP delivery of composed payloads

use std::time::Duration;

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;

use crate::config::{SmtpConfig, TlsMode};

/// Transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid SMTP configuration: {0}")]
    Config(String),

    #[error("Invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Invalid envelope: {0}")]
    Envelope(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),
}

/// Sink for composed messages.
///
/// The transport also owns the identity that messages are sent from.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Identity used for the `From` header
    fn sender_identity(&self) -> &str;

    /// Deliver `payload` verbatim to every recipient
    async fn send(&self, recipients: &[String], payload: &[u8]) -> Result<(), TransportError>;
}

/// Parse an address, reporting the offending input on failure
pub fn parse_address(address: &str) -> Result<Address, TransportError> {
    address
        .parse::<Address>()
        .map_err(|e| TransportError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
}

/// Real SMTP transport backed by lettre
pub struct SmtpMailTransport {
    sender: String,
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Build the transport; no connection is opened until the first send.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let (host, port) = config
            .host_port()
            .map_err(|e| TransportError::Config(e.to_string()))?;
        let tls = config
            .tls_mode()
            .map_err(|e| TransportError::Config(e.to_string()))?;
        parse_address(config.sender()).map_err(|e| {
            TransportError::Config(format!("sender identity (smtp.from or smtp.username): {}", e))
        })?;

        let mut builder = match tls {
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| TransportError::Config(e.to_string()))?,
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| TransportError::Config(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        }
        .port(port)
        .timeout(Some(Duration::from_secs(config.timeout)));

        if !config.username.is_empty() {
            builder = builder
                .credentials(Credentials::new(
                    config.username.clone(),
                    config.password.clone(),
                ))
                .authentication(vec![Mechanism::Plain]);
        }

        tracing::info!(
            host = %host,
            port = port,
            tls = ?tls,
            sender = %config.sender(),
            "SMTP transport configured"
        );

        Ok(Self {
            sender: config.sender().to_string(),
            inner: builder.build(),
        })
    }

    fn envelope(&self, recipients: &[String]) -> Result<Envelope, TransportError> {
        let from = parse_address(&self.sender)?;
        let to = recipients
            .iter()
            .map(|r| parse_address(r))
            .collect::<Result<Vec<_>, _>>()?;

        Envelope::new(Some(from), to).map_err(|e| TransportError::Envelope(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    fn sender_identity(&self) -> &str {
        &self.sender
    }

    #[tracing::instrument(name = "smtp.send", skip(self, payload), fields(recipients = recipients.len(), bytes = payload.len()))]
    async fn send(&self, recipients: &[String], payload: &[u8]) -> Result<(), TransportError> {
        let envelope = self.envelope(recipients)?;

        self.inner
            .send_raw(&envelope, payload)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Smtp(e.to_string()))
    }
}
