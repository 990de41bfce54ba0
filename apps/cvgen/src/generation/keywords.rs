//! Keyword coverage: which recommended ATS keywords the résumé text actually uses.
//!
//! Pure-Rust, deterministic, no LLM call. A keyword counts as covered when it
//! appears (case-insensitive substring) in the summary, any achievement line or
//! any technologies string.

use serde::Serialize;

use crate::models::ResumeDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatch {
    pub keyword: String,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordReport {
    pub keywords: Vec<KeywordMatch>,
    /// Share of keywords covered, 0 – 100. Zero when there are no keywords.
    pub coverage: u32,
}

impl KeywordReport {
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter(|k| !k.matched)
            .map(|k| k.keyword.as_str())
    }
}

pub fn keyword_report(doc: &ResumeDocument) -> KeywordReport {
    let haystack = searchable_text(doc);

    let keywords: Vec<KeywordMatch> = doc
        .recommended_keywords
        .iter()
        .map(|keyword| KeywordMatch {
            keyword: keyword.clone(),
            matched: haystack.contains(&keyword.to_lowercase()),
        })
        .collect();

    let matched = keywords.iter().filter(|k| k.matched).count();
    let coverage = if keywords.is_empty() {
        0
    } else {
        ((matched as f64 / keywords.len() as f64) * 100.0).round() as u32
    };

    KeywordReport { keywords, coverage }
}

/// Lower-cased summary, achievements and technologies, one per line so a
/// keyword never matches across two fields.
fn searchable_text(doc: &ResumeDocument) -> String {
    let mut parts: Vec<&str> = vec![doc.summary.as_str()];
    for entry in &doc.experience {
        parts.extend(entry.description.iter().map(String::as_str));
        if let Some(technologies) = &entry.technologies {
            parts.push(technologies);
        }
    }
    parts.join("\n").to_lowercase()
}
