// Document rendering: template → page geometry → PDF bytes.
// CPU-bound painting must run inside tokio::task::spawn_blocking.

pub mod handlers;
pub mod metrics;
pub mod page;
pub mod pdf;
pub mod template;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::{Document, DocumentError};

pub use pdf::PdfRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid document: {0}")]
    Invalid(#[from] DocumentError),

    #[error("rendering failed: {0}")]
    Failed(String),
}

/// An opaque rendered document plus the filename it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub bytes: Bytes,
    pub filename: &'static str,
}

/// The one side-effecting operation the edit session drives.
///
/// The server renders in-process with `PdfRenderer`; the editing client renders
/// through `ApiClient`, which forwards to the server over HTTP.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &Document) -> Result<RenderedDocument, RenderError>;
}
