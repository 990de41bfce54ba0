//! Document generation: prompt building and fail-closed parsing of model output.
//!
//! Flow: validate request → build prompt → LLM call → extract JSON object →
//!       typed decode → validate identity → normalize → return.
//!
//! Any step failing yields `AppError::Upstream`; partially typed data is never
//! passed on.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, EXISTING_CV_SECTION,
    NO_EXISTING_CV_SECTION, RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM,
};
use crate::llm_client::prompts::PLAUSIBILITY_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::{CoverLetterDocument, ResumeDocument};

const RESUME_FAILURE: &str = "Failed to generate CV";
const COVER_LETTER_FAILURE: &str = "Failed to generate cover letter";

/// Request body for `POST /generate`.
///
/// Fields are optional at the serde layer so that absent values produce the
/// specific 400 messages instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub job_description: Option<String>,
    pub api_key: Option<String>,
    /// Text previously extracted from an uploaded CV.
    pub pdf_text: Option<String>,
}

/// Request body for `POST /generate-cover-letter`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetterRequest {
    pub job_description: Option<String>,
    pub api_key: Option<String>,
    pub cv_data: Option<ResumeDocument>,
}

/// The two inputs every generation call needs, checked in the order the
/// client reports them: API key first, then job description.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub api_key: &'a str,
    pub job_description: &'a str,
}

impl<'a> Credentials<'a> {
    pub fn require(
        api_key: Option<&'a str>,
        job_description: Option<&'a str>,
    ) -> Result<Self, AppError> {
        let api_key = non_blank(api_key)
            .ok_or_else(|| AppError::Validation("API key is required".to_string()))?;
        let job_description = non_blank(job_description)
            .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;
        Ok(Self {
            api_key,
            job_description,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Generates a résumé tailored to the job description, optionally grounded in
/// the text of an existing CV.
pub async fn generate_resume(
    llm: &LlmClient,
    credentials: Credentials<'_>,
    pdf_text: Option<&str>,
) -> Result<ResumeDocument, AppError> {
    let prompt = build_resume_prompt(credentials.job_description, pdf_text);

    let mut document: ResumeDocument = llm
        .call_json(credentials.api_key, &prompt, RESUME_SYSTEM)
        .await
        .map_err(|e| upstream(RESUME_FAILURE, format!("Generation LLM call failed: {e}")))?;

    document
        .validate()
        .map_err(|e| upstream(RESUME_FAILURE, format!("Model output rejected: {e}")))?;
    document.normalize();

    info!(
        "Generated CV for '{}': {} experience, {} education, {} keywords",
        document.identity.name,
        document.experience.len(),
        document.education.len(),
        document.recommended_keywords.len()
    );
    Ok(document)
}

/// Generates a cover letter. When the caller supplies their current résumé, its
/// identity block is authoritative and overrides whatever the model returned.
pub async fn generate_cover_letter(
    llm: &LlmClient,
    credentials: Credentials<'_>,
    cv: Option<&ResumeDocument>,
) -> Result<CoverLetterDocument, AppError> {
    let prompt = build_cover_letter_prompt(credentials.job_description, cv)?;

    let mut letter: CoverLetterDocument = llm
        .call_json(credentials.api_key, &prompt, COVER_LETTER_SYSTEM)
        .await
        .map_err(|e| {
            upstream(
                COVER_LETTER_FAILURE,
                format!("Cover letter LLM call failed: {e}"),
            )
        })?;

    if let Some(cv) = cv {
        letter.identity = cv.identity.clone();
    }
    letter
        .validate()
        .map_err(|e| upstream(COVER_LETTER_FAILURE, format!("Model output rejected: {e}")))?;
    let sections = &letter.cover_letter;
    if [&sections.introduction, &sections.body, &sections.closing]
        .iter()
        .all(|s| s.trim().is_empty())
    {
        return Err(upstream(
            COVER_LETTER_FAILURE,
            "Model output rejected: empty coverLetter".to_string(),
        ));
    }

    info!(
        "Generated cover letter for '{}' to '{}'",
        letter.identity.name,
        letter.company.as_deref().unwrap_or("unspecified company")
    );
    Ok(letter)
}

fn upstream(message: &'static str, detail: String) -> AppError {
    AppError::Upstream { message, detail }
}

fn build_resume_prompt(job_description: &str, pdf_text: Option<&str>) -> String {
    let source_section = match non_blank(pdf_text) {
        Some(text) => EXISTING_CV_SECTION.replace("{pdf_text}", text.trim()),
        None => NO_EXISTING_CV_SECTION.to_string(),
    };

    RESUME_PROMPT_TEMPLATE
        .replace("{plausibility_instruction}", PLAUSIBILITY_INSTRUCTION)
        .replace("{source_section}", &source_section)
        .replace("{job_description}", job_description.trim())
}

fn build_cover_letter_prompt(
    job_description: &str,
    cv: Option<&ResumeDocument>,
) -> Result<String, AppError> {
    let cv_json = match cv {
        Some(cv) => serde_json::to_string_pretty(cv)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize CV: {e}")))?,
        None => "(not provided; write a generic letter for a strong candidate)".to_string(),
    };

    Ok(COVER_LETTER_PROMPT_TEMPLATE
        .replace("{plausibility_instruction}", PLAUSIBILITY_INSTRUCTION)
        .replace("{cv_json}", &cv_json)
        .replace("{job_description}", job_description.trim()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::FakeGemini;
    use crate::models::Identity;
    use serde_json::json;

    fn creds() -> Credentials<'static> {
        Credentials {
            api_key: "key-123",
            job_description: "Senior Rust engineer, Tokio, Kubernetes",
        }
    }

    #[test]
    fn test_credentials_checks_api_key_first() {
        let err = Credentials::require(None, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "API key is required"));

        let err = Credentials::require(Some("k"), Some("   ")).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Job description is required"));

        assert!(Credentials::require(Some("k"), Some("jd")).is_ok());
    }

    #[test]
    fn test_resume_prompt_includes_existing_cv_when_present() {
        let prompt = build_resume_prompt("Build things", Some("Jane Doe\nAcme 2019-2024"));
        assert!(prompt.contains("EXISTING CV:\nJane Doe"));
        assert!(prompt.contains("JOB DESCRIPTION:\nBuild things"));
        assert!(!prompt.contains("{pdf_text}"));

        let prompt = build_resume_prompt("Build things", Some("  "));
        assert!(prompt.contains(NO_EXISTING_CV_SECTION));
    }

    #[test]
    fn test_cover_letter_prompt_embeds_cv_json() {
        let cv = ResumeDocument {
            identity: Identity {
                name: "Jane".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let prompt = build_cover_letter_prompt("JD", Some(&cv)).unwrap();
        assert!(prompt.contains("\"name\": \"Jane\""));
    }

    #[tokio::test]
    async fn test_generate_resume_parses_fenced_output_and_normalizes() {
        let reply = json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "summary": "Rust engineer",
            "recommendedKeywords": ["Rust", " rust ", "Tokio", ""],
            "atsScore": 88
        });
        let fake = FakeGemini::replying(&format!("```json\n{reply}\n```")).await;
        let llm = LlmClient::new(&fake.base_url).unwrap();

        let doc = generate_resume(&llm, creds(), Some("old cv")).await.unwrap();
        assert_eq!(doc.identity.name, "Jane Doe");
        assert_eq!(doc.recommended_keywords, vec!["Rust", "Tokio"]);
        assert_eq!(doc.ats_score, Some(88.0));

        let calls = fake.calls();
        assert_eq!(calls[0].api_key, "key-123");
        let sent = calls[0].body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(sent.contains("old cv"));
    }

    #[tokio::test]
    async fn test_generate_resume_rejects_missing_email() {
        let fake = FakeGemini::replying(r#"{"name": "Jane Doe"}"#).await;
        let llm = LlmClient::new(&fake.base_url).unwrap();

        let err = generate_resume(&llm, creds(), None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream { message, .. } if message == "Failed to generate CV"
        ));
    }

    #[tokio::test]
    async fn test_generate_resume_rejects_wrong_shape() {
        let fake = FakeGemini::replying(r#"{"name": "Jane", "email": "j@x", "experience": "lots"}"#)
            .await;
        let llm = LlmClient::new(&fake.base_url).unwrap();
        assert!(matches!(
            generate_resume(&llm, creds(), None).await,
            Err(AppError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_cover_letter_uses_cv_identity() {
        let reply = json!({
            "name": "Someone Else",
            "email": "other@example.com",
            "company": "Acme",
            "coverLetter": {
                "introduction": "Hello",
                "body": "I build things",
                "closing": "Thanks"
            }
        });
        let fake = FakeGemini::replying(&reply.to_string()).await;
        let llm = LlmClient::new(&fake.base_url).unwrap();
        let cv = ResumeDocument {
            identity: Identity {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let letter = generate_cover_letter(&llm, creds(), Some(&cv)).await.unwrap();
        assert_eq!(letter.identity, cv.identity);
        assert_eq!(letter.company.as_deref(), Some("Acme"));
        assert_eq!(letter.cover_letter.body, "I build things");
    }

    #[tokio::test]
    async fn test_generate_cover_letter_rejects_empty_letter() {
        let fake =
            FakeGemini::replying(r#"{"name": "Jane", "email": "j@example.com", "coverLetter": {}}"#)
                .await;
        let llm = LlmClient::new(&fake.base_url).unwrap();
        let err = generate_cover_letter(&llm, creds(), None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream { message, .. } if message == "Failed to generate cover letter"
        ));
    }
}
