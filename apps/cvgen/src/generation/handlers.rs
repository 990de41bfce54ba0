//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::generator::{
    generate_cover_letter, generate_resume, CoverLetterRequest, Credentials, GenerateRequest,
};
use crate::models::{CoverLetterDocument, ResumeDocument};
use crate::state::AppState;

/// POST /generate
///
/// Generates a résumé tailored to `jobDescription`, grounded in `pdfText` when
/// the user uploaded an existing CV.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ResumeDocument>, AppError> {
    let credentials = Credentials::require(
        request.api_key.as_deref(),
        request.job_description.as_deref(),
    )?;

    let document = generate_resume(&state.llm, credentials, request.pdf_text.as_deref()).await?;

    Ok(Json(document))
}

/// POST /generate-cover-letter
///
/// Writes a cover letter for the same job, using the caller's current résumé
/// (`cvData`) when provided.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterDocument>, AppError> {
    let credentials = Credentials::require(
        request.api_key.as_deref(),
        request.job_description.as_deref(),
    )?;

    let letter =
        generate_cover_letter(&state.llm, credentials, request.cv_data.as_ref()).await?;

    Ok(Json(letter))
}
