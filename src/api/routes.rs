use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::{health, list_templates, prometheus_metrics, send_mail};

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Endpoints that act on templates or send mail require the API key
    let protected = Router::new()
        .route("/", post(send_mail))
        .nest(
            "/api/v1",
            Router::new()
                .route("/mail/send", post(send_mail))
                .route("/templates", get(list_templates)),
        )
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .merge(protected)
}
