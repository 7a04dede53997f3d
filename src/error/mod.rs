use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::mail::TransportError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl AppError {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Template(e) => match e {
                TemplateError::Load { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_LOAD_ERROR")
                }
                TemplateError::GroupNotFound(_) => (StatusCode::BAD_REQUEST, "GROUP_NOT_FOUND"),
                TemplateError::TemplateNotFound(_) => {
                    (StatusCode::BAD_REQUEST, "TEMPLATE_NOT_FOUND")
                }
                TemplateError::Render { .. } => (StatusCode::BAD_REQUEST, "RENDER_ERROR"),
                TemplateError::TitleNotFound(_) => (StatusCode::BAD_REQUEST, "TITLE_NOT_FOUND"),
            },
            AppError::Transport(TransportError::InvalidAddress { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Transport(_) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let log_message = self.to_string();

        let client_message = if status.is_server_error() && is_production() {
            match &self {
                AppError::Transport(_) => "Mail delivery failed".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            log_message.clone()
        };

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_errors_are_client_errors() {
        let cases = [
            (TemplateError::GroupNotFound("g".into()), "GROUP_NOT_FOUND"),
            (TemplateError::TemplateNotFound("t".into()), "TEMPLATE_NOT_FOUND"),
            (
                TemplateError::Render {
                    template: "t".into(),
                    message: "missing".into(),
                },
                "RENDER_ERROR",
            ),
            (TemplateError::TitleNotFound("t".into()), "TITLE_NOT_FOUND"),
        ];

        for (err, expected) in cases {
            let (status, code) = AppError::from(err).status_and_code();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(code, expected);
        }
    }

    #[test]
    fn test_transport_failure_is_bad_gateway() {
        let err = AppError::from(TransportError::Smtp("connection refused".into()));
        assert_eq!(err.status_and_code(), (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"));
    }

    #[test]
    fn test_invalid_recipient_is_validation_error() {
        let err = AppError::from(TransportError::InvalidAddress {
            address: "bogus".into(),
            message: "Missing domain or user".into(),
        });
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"));
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::Validation("targets must not be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
