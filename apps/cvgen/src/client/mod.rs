//! HTTP client for the cvgen API, used by the terminal editor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{CoverLetterDocument, Document, DocumentError, ResumeDocument};
use crate::render::{DocumentRenderer, RenderError, RenderedDocument};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("invalid document: {0}")]
    Invalid(#[from] DocumentError),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    job_description: &'a str,
    api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf_text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoverLetterBody<'a> {
    job_description: &'a str,
    api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cv_data: Option<&'a ResumeDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST /generate
    pub async fn generate(
        &self,
        job_description: &str,
        api_key: &str,
        pdf_text: Option<&str>,
    ) -> Result<ResumeDocument, ClientError> {
        let body = GenerateBody {
            job_description,
            api_key,
            pdf_text,
        };
        self.post_json("/generate", &body).await
    }

    /// POST /generate-cover-letter
    pub async fn generate_cover_letter(
        &self,
        job_description: &str,
        api_key: &str,
        cv: Option<&ResumeDocument>,
    ) -> Result<CoverLetterDocument, ClientError> {
        let body = CoverLetterBody {
            job_description,
            api_key,
            cv_data: cv,
        };
        self.post_json("/generate-cover-letter", &body).await
    }

    /// POST /generate-pdf
    pub async fn render_pdf(&self, document: &Document) -> Result<RenderedDocument, ClientError> {
        let response = self
            .client
            .post(self.url("/generate-pdf"))
            .json(document)
            .send()
            .await?;
        let bytes = check(response).await?.bytes().await?;
        debug!("Received {} PDF bytes", bytes.len());
        Ok(RenderedDocument {
            bytes,
            filename: document.kind().filename(),
        })
    }

    /// POST /extract-pdf
    pub async fn extract_pdf(&self, filename: &str, pdf: Vec<u8>) -> Result<String, ClientError> {
        let part = multipart::Part::bytes(pdf)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/extract-pdf"))
            .multipart(form)
            .send()
            .await?;
        Ok(check(response).await?.text().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Passes 2xx responses through; turns anything else into `ClientError::Api`
/// carrying the server's `{error}` message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Lets the edit session preview through the server instead of rendering locally.
#[async_trait]
impl DocumentRenderer for ApiClient {
    async fn render(&self, document: &Document) -> Result<RenderedDocument, RenderError> {
        document.validate()?;
        self.render_pdf(document)
            .await
            .map_err(|e| RenderError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::fake::FakeGemini;
    use crate::llm_client::LlmClient;
    use crate::models::Identity;
    use crate::render::PdfRenderer;
    use crate::routes::build_router;
    use crate::state::AppState;

    /// Serves the real router on an ephemeral port.
    async fn serve(llm_base_url: &str) -> ApiClient {
        let app = build_router(AppState {
            llm: LlmClient::new(llm_base_url).unwrap(),
            renderer: Arc::new(PdfRenderer),
            config: Config::default(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        ApiClient::new(format!("http://{addr}/")).unwrap()
    }

    fn jane() -> ResumeDocument {
        ResumeDocument {
            identity: Identity {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            summary: "Rust engineer".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_render_through_server() {
        let client = serve("http://127.0.0.1:9").await;
        let rendered = client.render(&Document::Resume(jane())).await.unwrap();
        assert_eq!(rendered.filename, "cv.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_render_validates_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .render(&Document::Resume(ResumeDocument::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_generate_surfaces_server_message() {
        let client = serve("http://127.0.0.1:9").await;
        let err = client.generate("Rust dev", "", None).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key is required");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_and_cover_letter_round_trip() {
        let fake = FakeGemini::replying(
            &json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "coverLetter": {"introduction": "Hi", "body": "Body", "closing": "Bye"}
            })
            .to_string(),
        )
        .await;
        let client = serve(&fake.base_url).await;

        let letter = client
            .generate_cover_letter("Rust dev", "key", Some(&jane()))
            .await
            .unwrap();
        assert_eq!(letter.identity.name, "Jane Doe");
        assert_eq!(letter.cover_letter.closing, "Bye");

        let sent = fake.calls()[0].body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(sent.contains("Rust engineer"), "cvData forwarded into the prompt");
    }

    #[tokio::test]
    async fn test_extract_pdf_error_status() {
        let client = serve("http://127.0.0.1:9").await;
        let err = client
            .extract_pdf("cv.pdf", b"garbage".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 422, .. }));
    }
}
