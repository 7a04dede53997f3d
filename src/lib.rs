// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Domain layer
pub mod mail;
pub mod template;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod shutdown;
