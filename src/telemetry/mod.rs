//! Log output and OpenTelemetry trace export.
//!
//! Events always go to stdout, filtered through `RUST_LOG` (default `info`).
//! `LOG_JSON=true` switches the console format to one JSON object per line.
//! With `OTEL_ENABLED=true` spans are additionally exported over OTLP/gRPC.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LOG_JSON` | `false` |
//! | `OTEL_ENABLED` | `false` |
//! | `OTEL_ENDPOINT` | `http://localhost:4317` |
//! | `OTEL_SERVICE` | `mail-template-service` |
//! | `OTEL_SAMPLING` | `1.0` |

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogConfig, OtelConfig};

const TRACER_NAME: &str = "mail-template-service";

pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to build OTLP exporter: {0}")]
    ExporterBuild(String),

    #[error("Failed to shut down tracer provider: {0}")]
    Shutdown(String),
}

/// Holds the tracer provider; dropping it flushes pending spans
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush buffered spans and stop exporting. Later calls are no-ops.
    pub fn shutdown(&mut self) -> TelemetryResult<()> {
        let Some(provider) = self.provider.take() else {
            return Ok(());
        };

        tracing::info!("Flushing OpenTelemetry spans");
        provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "OpenTelemetry shutdown incomplete");
        }
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_telemetry(log: &LogConfig, otel: &OtelConfig) -> TelemetryResult<TelemetryGuard> {
    let provider = if otel.enabled {
        Some(build_provider(otel)?)
    } else {
        None
    };

    let console = if log.json {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer().boxed()
    };

    let export = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(TRACER_NAME)));

    tracing_subscriber::registry()
        .with(console)
        .with(export)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let guard = TelemetryGuard { provider };
    if guard.exporting() {
        tracing::info!(
            endpoint = %otel.endpoint,
            service = %otel.service,
            sampling = otel.sampling,
            "OpenTelemetry export enabled"
        );
    } else {
        tracing::info!(json = log.json, "Logging initialized");
    }

    Ok(guard)
}

fn sampler(ratio: f64) -> Sampler {
    match ratio {
        r if r >= 1.0 => Sampler::AlwaysOn,
        r if r <= 0.0 => Sampler::AlwaysOff,
        r => Sampler::TraceIdRatioBased(r),
    }
}

fn build_provider(otel: &OtelConfig) -> TelemetryResult<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otel.endpoint)
        .build()
        .map_err(|e| TelemetryError::ExporterBuild(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler(otel.sampling))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new([
            KeyValue::new(SERVICE_NAME, otel.service.clone()),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ]))
        .build())
}
