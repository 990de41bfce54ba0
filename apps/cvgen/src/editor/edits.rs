//! Typed form edits against a `ResumeDocument`.
//!
//! The terminal editor reads one command per line:
//!
//! ```text
//! name Jane Doe
//! summary First paragraph\nSecond paragraph
//! experience.0.title Staff Engineer
//! experience.0.description Led the migration\nCut p99 latency by 40%
//! add education
//! remove experience 1
//! ```
//!
//! `\n` in a value stands for a line break.

use std::str::FromStr;

use thiserror::Error;

use crate::models::{EducationEntry, ExperienceEntry, ResumeDocument};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("empty command")]
    Empty,

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid row index '{0}'")]
    InvalidIndex(String),

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("{section} row {index} does not exist ({len} rows)")]
    OutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Experience,
    Education,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Experience => write!(f, "experience"),
            Self::Education => write!(f, "education"),
        }
    }
}

impl FromStr for Section {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experience" => Ok(Self::Experience),
            "education" => Ok(Self::Education),
            other => Err(EditError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    Title,
    Email,
    Location,
    Phone,
    Github,
    Linkedin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Title,
    Company,
    Location,
    StartMonthYear,
    EndMonthYear,
    /// Newline-delimited achievements.
    Description,
    Technologies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Degree,
    Institution,
    Location,
    StartMonthYear,
    EndMonthYear,
    /// Newline-delimited details.
    Details,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Identity(IdentityField, String),
    Summary(String),
    RemoteWork(bool),
    Age(String),
    Experience {
        index: usize,
        field: ExperienceField,
        value: String,
    },
    Education {
        index: usize,
        field: EducationField,
        value: String,
    },
    Add(Section),
    Remove(Section, usize),
}

impl FieldEdit {
    /// Applies the edit in place. Row edits against a missing row fail and
    /// leave the document untouched.
    pub fn apply(&self, doc: &mut ResumeDocument) -> Result<(), EditError> {
        match self {
            Self::Identity(field, value) => {
                let identity = &mut doc.identity;
                match field {
                    IdentityField::Name => identity.name = value.clone(),
                    IdentityField::Title => identity.title = value.clone(),
                    IdentityField::Email => identity.email = value.clone(),
                    IdentityField::Location => identity.location = value.clone(),
                    IdentityField::Phone => identity.phone = optional(value),
                    IdentityField::Github => identity.github = optional(value),
                    IdentityField::Linkedin => identity.linkedin = optional(value),
                }
            }
            Self::Summary(value) => doc.summary = value.clone(),
            Self::RemoteWork(remote) => doc.remote_work = *remote,
            Self::Age(value) => doc.age = optional(value),
            Self::Experience {
                index,
                field,
                value,
            } => {
                let len = doc.experience.len();
                let entry = doc.experience.get_mut(*index).ok_or(EditError::OutOfRange {
                    section: Section::Experience,
                    index: *index,
                    len,
                })?;
                match field {
                    ExperienceField::Title => entry.title = value.clone(),
                    ExperienceField::Company => entry.company = value.clone(),
                    ExperienceField::Location => entry.location = value.clone(),
                    ExperienceField::StartMonthYear => entry.start_month_year = value.clone(),
                    ExperienceField::EndMonthYear => entry.end_month_year = value.clone(),
                    ExperienceField::Description => entry.description = lines(value),
                    ExperienceField::Technologies => entry.technologies = optional(value),
                }
            }
            Self::Education {
                index,
                field,
                value,
            } => {
                let len = doc.education.len();
                let entry = doc.education.get_mut(*index).ok_or(EditError::OutOfRange {
                    section: Section::Education,
                    index: *index,
                    len,
                })?;
                match field {
                    EducationField::Degree => entry.degree = value.clone(),
                    EducationField::Institution => entry.institution = value.clone(),
                    EducationField::Location => entry.location = value.clone(),
                    EducationField::StartMonthYear => entry.start_month_year = value.clone(),
                    EducationField::EndMonthYear => entry.end_month_year = value.clone(),
                    EducationField::Details => entry.details = lines(value),
                }
            }
            Self::Add(Section::Experience) => doc.experience.push(ExperienceEntry::default()),
            Self::Add(Section::Education) => doc.education.push(EducationEntry::default()),
            Self::Remove(section, index) => {
                let len = match section {
                    Section::Experience => doc.experience.len(),
                    Section::Education => doc.education.len(),
                };
                if *index >= len {
                    return Err(EditError::OutOfRange {
                        section: *section,
                        index: *index,
                        len,
                    });
                }
                match section {
                    Section::Experience => {
                        doc.experience.remove(*index);
                    }
                    Section::Education => {
                        doc.education.remove(*index);
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromStr for FieldEdit {
    type Err = EditError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(EditError::Empty);
        }
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let value = rest.trim().replace("\\n", "\n");

        match head {
            "add" => Ok(Self::Add(value.parse()?)),
            "remove" => {
                let (section, index) = value
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| EditError::InvalidIndex(value.clone()))?;
                Ok(Self::Remove(section.parse()?, parse_index(index.trim())?))
            }
            "summary" => Ok(Self::Summary(value)),
            "age" => Ok(Self::Age(value)),
            "remoteWork" => match value.as_str() {
                "true" | "yes" => Ok(Self::RemoteWork(true)),
                "false" | "no" => Ok(Self::RemoteWork(false)),
                _ => Err(EditError::InvalidValue {
                    field: "remoteWork",
                    value,
                }),
            },
            "name" => Ok(Self::Identity(IdentityField::Name, value)),
            "title" => Ok(Self::Identity(IdentityField::Title, value)),
            "email" => Ok(Self::Identity(IdentityField::Email, value)),
            "location" => Ok(Self::Identity(IdentityField::Location, value)),
            "phone" => Ok(Self::Identity(IdentityField::Phone, value)),
            "github" => Ok(Self::Identity(IdentityField::Github, value)),
            "linkedin" => Ok(Self::Identity(IdentityField::Linkedin, value)),
            path => parse_row_edit(path, value),
        }
    }
}

fn parse_row_edit(path: &str, value: String) -> Result<FieldEdit, EditError> {
    let mut parts = path.splitn(3, '.');
    let (Some(section), Some(index), Some(field)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(EditError::UnknownField(path.to_string()));
    };
    let index = parse_index(index)?;

    match section.parse()? {
        Section::Experience => {
            let field = match field {
                "title" => ExperienceField::Title,
                "company" => ExperienceField::Company,
                "location" => ExperienceField::Location,
                "startMonthYear" => ExperienceField::StartMonthYear,
                "endMonthYear" => ExperienceField::EndMonthYear,
                "description" => ExperienceField::Description,
                "technologies" => ExperienceField::Technologies,
                other => return Err(EditError::UnknownField(other.to_string())),
            };
            Ok(FieldEdit::Experience {
                index,
                field,
                value,
            })
        }
        Section::Education => {
            let field = match field {
                "degree" => EducationField::Degree,
                "institution" => EducationField::Institution,
                "location" => EducationField::Location,
                "startMonthYear" => EducationField::StartMonthYear,
                "endMonthYear" => EducationField::EndMonthYear,
                "details" => EducationField::Details,
                other => return Err(EditError::UnknownField(other.to_string())),
            };
            Ok(FieldEdit::Education {
                index,
                field,
                value,
            })
        }
    }
}

fn parse_index(s: &str) -> Result<usize, EditError> {
    s.parse().map_err(|_| EditError::InvalidIndex(s.to_string()))
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn lines(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split('\n').map(str::to_string).collect()
}
