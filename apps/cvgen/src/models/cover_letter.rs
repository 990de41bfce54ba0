use serde::{Deserialize, Serialize};

use crate::models::resume::{DocumentError, Identity};

/// The three free-text sections of a cover letter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetterBody {
    pub introduction: String,
    /// Newline-delimited paragraphs.
    pub body: String,
    pub closing: String,
}

/// Sibling of `ResumeDocument`. The `coverLetter` object is what marks a
/// payload as a cover letter rather than a résumé.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetterDocument {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub cover_letter: CoverLetterBody,
}

impl CoverLetterDocument {
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.identity.validate()
    }

    pub fn body_paragraphs(&self) -> impl Iterator<Item = &str> {
        self.cover_letter
            .body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}
