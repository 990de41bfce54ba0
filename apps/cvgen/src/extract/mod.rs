//! PDF text extraction for uploaded CVs.

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::{header, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::errors::AppError;

/// Default cap on upload size, overridable via `MAX_UPLOAD_BYTES`.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /extract-pdf
///
/// Takes the first multipart field that carries a file and returns its text
/// content as `text/plain`.
pub async fn handle_extract_pdf(mut multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let bytes = first_file(&mut multipart).await?;
    let text = extract_text(bytes).await?;

    info!("Extracted {} chars from uploaded PDF", text.len());
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

async fn first_file(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(upload_error)?;
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        debug!("Received upload '{file_name}' ({} bytes)", data.len());
        return Ok(data);
    }
    Err(AppError::Validation("No file uploaded".to_string()))
}

fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid upload: {}", e.body_text()))
    }
}

/// Runs the extractor off the async runtime. A panic inside the extractor is
/// reported the same way as a parse failure.
pub async fn extract_text(bytes: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Extraction(format!("extractor task failed: {e}")))?
        .map_err(|e| AppError::Extraction(format!("{e:?}")))
}
