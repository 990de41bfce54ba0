use serde::Serialize;
use serde_json::Value;

use crate::models::cover_letter::CoverLetterDocument;
use crate::models::resume::{DocumentError, Identity, ResumeDocument};

/// JSON key whose presence marks a render payload as a cover letter.
pub const COVER_LETTER_FIELD: &str = "coverLetter";

/// Anything the renderer knows how to lay out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Resume(ResumeDocument),
    CoverLetter(CoverLetterDocument),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Suggested download filename.
    pub fn filename(self) -> &'static str {
        match self {
            DocumentKind::Resume => "cv.pdf",
            DocumentKind::CoverLetter => "cover-letter.pdf",
        }
    }
}

impl Document {
    /// Decodes a loosely-typed payload, dispatching on the `coverLetter` field.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get(COVER_LETTER_FIELD).is_some() {
            serde_json::from_value(value).map(Document::CoverLetter)
        } else {
            serde_json::from_value(value).map(Document::Resume)
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Resume(_) => DocumentKind::Resume,
            Document::CoverLetter(_) => DocumentKind::CoverLetter,
        }
    }

    pub fn identity(&self) -> &Identity {
        match self {
            Document::Resume(doc) => &doc.identity,
            Document::CoverLetter(doc) => &doc.identity,
        }
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        self.identity().validate()
    }
}
