pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extract::handle_extract_pdf;
use crate::generation::handlers as generation;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/generate", post(generation::handle_generate))
        .route(
            "/generate-cover-letter",
            post(generation::handle_generate_cover_letter),
        )
        // Render API
        .route("/generate-pdf", post(render::handle_generate_pdf))
        // Extraction API
        .route(
            "/extract-pdf",
            post(handle_extract_pdf).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::fake::FakeGemini;
    use crate::llm_client::LlmClient;
    use crate::render::PdfRenderer;

    // Nothing listens on the discard port; tests that reach the LLM use FakeGemini.
    const UNREACHABLE_LLM: &str = "http://127.0.0.1:9";

    fn app_with(llm_base_url: &str, config: Config) -> Router {
        build_router(AppState {
            llm: LlmClient::new(llm_base_url).unwrap(),
            renderer: Arc::new(PdfRenderer),
            config,
        })
    }

    fn app() -> Router {
        app_with(UNREACHABLE_LLM, Config::default())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const BOUNDARY: &str = "cvgen-test-boundary";

    fn post_multipart(field: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
        let disposition = match filename {
            Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
            None => format!("form-data; name=\"{field}\""),
        };
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/extract-pdf")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    // ── /generate-pdf ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_generate_pdf_empty_object_is_400() {
        let response = app()
            .oneshot(post_json("/generate-pdf", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_pdf_missing_email_is_400() {
        let response = app()
            .oneshot(post_json("/generate-pdf", json!({"name": "Jane Doe"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_pdf_wrong_field_type_is_400() {
        let response = app()
            .oneshot(post_json(
                "/generate-pdf",
                json!({"name": "Jane", "email": "j@x.io", "experience": 7}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_pdf_resume_attachment() {
        let response = app()
            .oneshot(post_json(
                "/generate-pdf",
                json!({
                    "name": "Jane Doe",
                    "email": "jane@example.com",
                    "summary": "Rust engineer",
                    "experience": [{"title": "Engineer", "company": "Acme", "description": ["Shipped"]}]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_generate_pdf_cover_letter_attachment() {
        let response = app()
            .oneshot(post_json(
                "/generate-pdf",
                json!({
                    "name": "Jane Doe",
                    "email": "jane@example.com",
                    "coverLetter": {"introduction": "Hi", "body": "Body", "closing": "Bye"}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cover-letter.pdf\""
        );
    }

    // ── /generate ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_generate_without_api_key_is_400() {
        let response = app()
            .oneshot(post_json("/generate", json!({"jobDescription": "Rust dev"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "API key is required");
    }

    #[tokio::test]
    async fn test_generate_without_job_description_is_400() {
        let response = app()
            .oneshot(post_json("/generate", json!({"apiKey": "k"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Job description is required"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_resume_json() {
        let fake = FakeGemini::replying(
            &json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "title": "Backend Engineer",
                "recommendedKeywords": ["Rust"]
            })
            .to_string(),
        )
        .await;
        let response = app_with(&fake.base_url, Config::default())
            .oneshot(post_json(
                "/generate",
                json!({"jobDescription": "Rust dev", "apiKey": "user-key"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["name"], "Jane Doe");
        assert_eq!(body["title"], "Backend Engineer");
        assert_eq!(body["recommendedKeywords"], json!(["Rust"]));
        assert_eq!(fake.calls()[0].api_key, "user-key");
    }

    #[tokio::test]
    async fn test_generate_unparseable_output_is_500() {
        let fake = FakeGemini::replying("I cannot produce a CV today.").await;
        let response = app_with(&fake.base_url, Config::default())
            .oneshot(post_json(
                "/generate",
                json!({"jobDescription": "Rust dev", "apiKey": "k"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Failed to generate CV");
    }

    #[tokio::test]
    async fn test_generate_upstream_rejection_is_500() {
        let fake = FakeGemini::start(
            StatusCode::FORBIDDEN,
            json!({"error": {"message": "API key not valid"}}),
        )
        .await;
        let response = app_with(&fake.base_url, Config::default())
            .oneshot(post_json(
                "/generate",
                json!({"jobDescription": "Rust dev", "apiKey": "bad"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(!body.to_string().contains("API key not valid"));
    }

    // ── /generate-cover-letter ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_generate_cover_letter_without_api_key_is_400() {
        let response = app()
            .oneshot(post_json(
                "/generate-cover-letter",
                json!({"jobDescription": "Rust dev"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "API key is required");
    }

    #[tokio::test]
    async fn test_generate_cover_letter_returns_letter_json() {
        let fake = FakeGemini::replying(
            &json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "company": "Acme",
                "coverLetter": {"introduction": "Hi", "body": "I build", "closing": "Bye"}
            })
            .to_string(),
        )
        .await;
        let response = app_with(&fake.base_url, Config::default())
            .oneshot(post_json(
                "/generate-cover-letter",
                json!({"jobDescription": "Rust dev", "apiKey": "k"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["coverLetter"]["body"], "I build");
        assert_eq!(body["company"], "Acme");
    }

    // ── /extract-pdf ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_extract_pdf_garbage_is_422() {
        let response = app()
            .oneshot(post_multipart("file", Some("cv.pdf"), b"not a pdf at all"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"],
            "Failed to extract text from PDF"
        );
    }

    #[tokio::test]
    async fn test_extract_pdf_without_file_is_400() {
        let response = app()
            .oneshot(post_multipart("note", None, b"just a text field"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_extract_pdf_empty_file_is_400() {
        let response = app()
            .oneshot(post_multipart("file", Some("cv.pdf"), b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_pdf_over_limit_is_413() {
        let config = Config {
            max_upload_bytes: 64,
            ..Config::default()
        };
        let response = app_with(UNREACHABLE_LLM, config)
            .oneshot(post_multipart("file", Some("cv.pdf"), &[b'x'; 4096]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
