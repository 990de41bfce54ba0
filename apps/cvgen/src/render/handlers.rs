//! Axum route handler for the render API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::Document;
use crate::state::AppState;

/// POST /generate-pdf
///
/// Accepts either document shape (a `coverLetter` object marks a cover letter)
/// and streams back the PDF as an attachment.
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    let document = Document::from_value(payload)
        .map_err(|e| AppError::Validation(format!("Invalid CV data: {e}")))?;

    let rendered = state.renderer.render(&document).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.filename),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}
