//! Process shutdown coordination.
//!
//! A single broadcast channel carries the shutdown request. The signal
//! listener sends on it; every long-running listener loop holds a receiver
//! and stops accepting work once it fires.

use tokio::signal;
use tokio::sync::broadcast;

/// Sending half of the shutdown channel plus a way to hand out receivers
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// New receiver for a listener loop
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Request shutdown; `reason` is logged
    pub fn trigger(&self, reason: &str) {
        tracing::info!(reason = %reason, "Initiating graceful shutdown");
        let _ = self.tx.send(());
    }

    /// Wait for Ctrl+C or SIGTERM, then trigger shutdown
    pub async fn listen_for_signals(self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => self.trigger("received Ctrl+C"),
            _ = terminate => self.trigger("received terminate signal"),
        }
    }
}

/// Resolves once shutdown has been requested (or every sender is gone)
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_trigger_wakes_listeners() {
        let shutdown = Shutdown::new();
        let first = tokio::spawn(wait_for_shutdown(shutdown.subscribe()));
        let second = tokio::spawn(wait_for_shutdown(shutdown.subscribe()));

        shutdown.trigger("test");

        timeout(Duration::from_secs(1), first).await.unwrap().unwrap();
        timeout(Duration::from_secs(1), second).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_pending_until_triggered() {
        let shutdown = Shutdown::new();
        let waiting = timeout(Duration::from_millis(50), wait_for_shutdown(shutdown.subscribe())).await;
        assert!(waiting.is_err());
    }

    #[tokio::test]
    async fn test_trigger_without_listeners_is_harmless() {
        Shutdown::default().trigger("nobody listening");
    }
}
