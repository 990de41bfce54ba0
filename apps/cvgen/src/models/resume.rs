use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A document failed the minimal checks required before rendering or returning it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// Identity/contact block shared by résumés and cover letters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    pub name: String,
    pub title: String,
    pub email: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl Identity {
    /// Name and email are the only fields a render or generation result cannot do without.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.name.trim().is_empty() {
            return Err(DocumentError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(DocumentError::MissingField("email"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Free-text "MM/YYYY" label; never parsed as a date.
    pub start_month_year: String,
    pub end_month_year: String,
    /// One achievement per line.
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
}

impl ExperienceEntry {
    pub fn period(&self) -> String {
        period_label(&self.start_month_year, &self.end_month_year)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_month_year: String,
    pub end_month_year: String,
    pub details: Vec<String>,
}

impl EducationEntry {
    pub fn period(&self) -> String {
        period_label(&self.start_month_year, &self.end_month_year)
    }
}

/// The structured résumé that drives rendering and the edit session.
///
/// Every field defaults when absent so partially filled drafts still load;
/// `validate` is the gate that enforces name and email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(flatten)]
    pub identity: Identity,
    pub remote_work: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Newline-delimited paragraphs.
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,

    // Produced only by the job-matching generation path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_years_experience: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommended_keywords: Vec<String>,
}

impl ResumeDocument {
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.identity.validate()
    }

    /// Trims the keyword list and drops case-insensitive duplicates, keeping first-seen order.
    pub fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.recommended_keywords = std::mem::take(&mut self.recommended_keywords)
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
            .collect();
    }

    /// Summary split into display paragraphs, blank lines dropped.
    pub fn summary_paragraphs(&self) -> impl Iterator<Item = &str> {
        self.summary.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

fn period_label(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (start, "") => start.to_string(),
        ("", end) => end.to_string(),
        (start, end) => format!("{start} - {end}"),
    }
}
