use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::AppError;

use super::AppState;

/// Header carrying the shared API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reject requests whose `X-API-Key` does not match `api.key`.
///
/// With no key configured every request passes.
pub async fn api_key_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.api.key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(next.run(req).await),
        Some(_) => Err(AppError::Auth("invalid API key".to_string())),
        None => Err(AppError::Auth(format!("missing {} header", API_KEY_HEADER))),
    }
}
