/// LLM client: the single point of entry for all Gemini API calls in cvgen.
///
/// No other module may call the Gemini API directly. The API key is supplied
/// by the end user with each request, so the client itself holds no credentials.
///
/// Model: gemini-2.0-flash-lite (hardcoded to prevent drift)
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

use prompts::JSON_ONLY_SYSTEM;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The model used for all LLM calls in cvgen.
pub const MODEL: &str = "gemini-2.0-flash-lite";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("no JSON object found in LLM output")]
    NoJson,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: RequestContent<'a>,
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

impl<'a> RequestContent<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![RequestPart { text }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: UsageMetadata,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
}

impl LlmResponse {
    /// Text of the first part of the first candidate, if non-blank.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single LLM client used by all services in cvgen.
/// Wraps the Gemini `generateContent` endpoint with structured output helpers.
/// Calls are made once; failures are reported, never retried.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
}

impl LlmClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    pub async fn call(
        &self,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = GenerateContentRequest {
            system_instruction: RequestContent::text(system),
            contents: vec![RequestContent::text(prompt)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(format!("{}/models/{MODEL}:generateContent", self.base_url))
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
            llm_response.usage_metadata.prompt_token_count,
            llm_response.usage_metadata.candidates_token_count
        );

        Ok(llm_response)
    }

    /// Calls the LLM and deserializes the outermost JSON object in its reply.
    /// `system` is extended with the JSON-only output rules.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let system = format!("{system} {JSON_ONLY_SYSTEM}");
        let response = self.call(api_key, prompt, &system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let json = extract_json_object(text).ok_or(LlmError::NoJson)?;
        serde_json::from_str(json).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}

/// Returns the span from the first `{` to the last `}`, after removing fences.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}


#[cfg(test)]
mod tests {
    use super::fake::FakeGemini;
    use super::*;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_object_ignores_surrounding_prose() {
        let input = "Here is your CV:\n{\"name\": \"Jane\", \"nested\": {\"a\": 1}}\nGood luck!";
        assert_eq!(
            extract_json_object(input),
            Some("{\"name\": \"Jane\", \"nested\": {\"a\": 1}}")
        );
    }

    #[test]
    fn test_extract_json_object_none_without_braces() {
        assert_eq!(extract_json_object("sorry, I cannot help"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[tokio::test]
    async fn test_call_json_sends_key_and_parses_reply() {
        let fake = FakeGemini::replying("```json\n{\"answer\": 42}\n```").await;
        let client = LlmClient::new(&fake.base_url).unwrap();

        let value: Value = client.call_json("secret", "question", "system").await.unwrap();
        assert_eq!(value, json!({"answer": 42}));

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].action, format!("{MODEL}:generateContent"));
        assert_eq!(calls[0].api_key, "secret");
        assert_eq!(calls[0].body["contents"][0]["parts"][0]["text"], "question");
        let system = calls[0].body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(system.starts_with("system "));
        assert!(system.ends_with(prompts::JSON_ONLY_SYSTEM));
        assert_eq!(
            calls[0].body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_api_error_surfaces_message_without_retry() {
        let fake = FakeGemini::start(
            StatusCode::BAD_REQUEST,
            json!({"error": {"code": 400, "message": "API key not valid"}}),
        )
        .await;
        let client = LlmClient::new(&fake.base_url).unwrap();

        let err = client.call("bad", "q", "s").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let fake = FakeGemini::start(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
        let client = LlmClient::new(&fake.base_url).unwrap();
        assert!(client.call("k", "q", "s").await.is_err());
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_content() {
        let fake = FakeGemini::start(StatusCode::OK, json!({"candidates": []})).await;
        let client = LlmClient::new(&fake.base_url).unwrap();
        let err = client.call_json::<Value>("k", "q", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_prose_reply_is_no_json() {
        let fake = FakeGemini::replying("I'd rather not.").await;
        let client = LlmClient::new(&fake.base_url).unwrap();
        let err = client.call_json::<Value>("k", "q", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::NoJson));
    }
}
