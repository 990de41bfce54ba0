pub mod cover_letter;
pub mod document;
pub mod resume;

pub use cover_letter::{CoverLetterBody, CoverLetterDocument};
pub use document::{Document, DocumentKind};
pub use resume::{DocumentError, EducationEntry, ExperienceEntry, Identity, ResumeDocument};
