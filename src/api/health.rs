use axum::{extract::State, Json};

use crate::server::AppState;

use super::models::HealthResponse;

/// GET /health - Liveness plus the number of loaded template groups
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        groups: state.template_store.len(),
    })
}
