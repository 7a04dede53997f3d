use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use mail_template_service::config::Settings;
use mail_template_service::mail::SmtpMailTransport;
use mail_template_service::metrics::MailMetrics;
use mail_template_service::server::{create_app, AppState};
use mail_template_service::shutdown::{wait_for_shutdown, Shutdown};
use mail_template_service::telemetry::init_telemetry;
use mail_template_service::template::load_template_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.log, &settings.otel)?;
    tracing::info!("Configuration loaded");

    // Load templates once; any failure aborts start-up
    tracing::info!(directory = %settings.templates.directory, "Loading templates");
    let template_store = load_template_store(&settings.templates.directory)
        .context("Failed to load templates")?;
    MailMetrics::set_template_groups(template_store.len());

    // Create SMTP transport
    let transport = Arc::new(
        SmtpMailTransport::from_config(&settings.smtp)
            .context("Failed to initialize SMTP transport")?,
    );

    // Create application state
    let state = AppState::new(settings.clone(), template_store, transport);
    tracing::info!("Application state initialized");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.clone().listen_for_signals());

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(server_shutdown))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
