use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// In-process `PdfRenderer` in production; swappable in tests.
    pub renderer: Arc<dyn DocumentRenderer>,
    pub config: Config,
}
