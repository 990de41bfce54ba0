use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Response body is `{"error": <message>, "code": <CODE>}`. Upstream, render and
/// extraction detail is logged server-side and never echoed to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generation service failed or returned unusable content.
    #[error("Upstream error: {detail}")]
    Upstream {
        message: &'static str,
        detail: String,
    },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream { message, detail } => {
                tracing::error!("Upstream error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    message.to_string(),
                )
            }
            AppError::Render(RenderError::Invalid(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", format!("Invalid document: {e}"))
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "Failed to generate PDF".to_string(),
                )
            }
            AppError::Extraction(detail) => {
                tracing::warn!("PDF extraction failed: {detail}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    "Failed to extract text from PDF".to_string(),
                )
            }
            AppError::PayloadTooLarge(detail) => {
                tracing::warn!("Upload rejected: {detail}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    "Uploaded file is too large".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
