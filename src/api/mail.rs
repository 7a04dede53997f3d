//! Mail send endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use tracing::field;

use crate::error::Result;
use crate::server::AppState;

use super::models::{SendMailRequest, SendMailResponse};

/// POST / and POST /api/v1/mail/send - Render a template and deliver it
///
/// Undecodable bodies are reported through the regular error envelope.
#[tracing::instrument(
    name = "http.send_mail",
    skip(state, payload),
    fields(group = field::Empty, recipients = field::Empty)
)]
pub async fn send_mail(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendMailRequest>, JsonRejection>,
) -> Result<Json<SendMailResponse>> {
    let Json(request) = payload?;

    let span = tracing::Span::current();
    span.record("group", request.template_group.as_str());
    span.record("recipients", request.targets.len());

    let receipt = state
        .dispatcher
        .dispatch(
            &request.template_group,
            request.template_name.into_vec(),
            request.targets,
            request.data,
        )
        .await?;

    Ok(Json(SendMailResponse {
        success: true,
        template: receipt.template,
        subject: receipt.subject,
        recipients: receipt.recipients,
        timestamp: Utc::now(),
    }))
}
