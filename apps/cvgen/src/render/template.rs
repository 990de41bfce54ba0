//! Declarative document templates.
//!
//! A template turns a document into an ordered list of styled blocks. It
//! decides *what* appears and in which style; `page` decides *where*.

use crate::models::{CoverLetterDocument, Document, Identity, ResumeDocument};
use crate::render::metrics::FontFace;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

pub const PRIMARY: Rgb8 = Rgb8(0x02, 0x3e, 0x8a);
pub const TEXT: Rgb8 = Rgb8(0x2c, 0x3e, 0x50);
pub const HEADLINE: Rgb8 = Rgb8(0x45, 0x5a, 0x64);
pub const MUTED: Rgb8 = Rgb8(0x54, 0x6e, 0x7a);
pub const BULLET_TEXT: Rgb8 = Rgb8(0x37, 0x47, 0x4f);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Name,
    Headline,
    Contact,
    SectionHeading,
    EntryTitle,
    EntrySubtitle,
    Paragraph,
    Bullet,
    Technologies,
    Signature,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSpec {
    pub size_pt: f32,
    pub face: FontFace,
    pub color: Rgb8,
    pub align: Align,
    pub space_before_mm: f32,
    pub indent_mm: f32,
}

impl BlockStyle {
    pub fn spec(self) -> StyleSpec {
        let base = StyleSpec {
            size_pt: 10.0,
            face: FontFace::Regular,
            color: TEXT,
            align: Align::Left,
            space_before_mm: 0.0,
            indent_mm: 0.0,
        };
        match self {
            BlockStyle::Name => StyleSpec {
                size_pt: 24.0,
                face: FontFace::Bold,
                color: PRIMARY,
                align: Align::Center,
                ..base
            },
            BlockStyle::Headline => StyleSpec {
                size_pt: 12.0,
                color: HEADLINE,
                align: Align::Center,
                space_before_mm: 1.5,
                ..base
            },
            BlockStyle::Contact => StyleSpec {
                color: MUTED,
                align: Align::Center,
                space_before_mm: 1.0,
                ..base
            },
            BlockStyle::SectionHeading => StyleSpec {
                face: FontFace::Bold,
                color: PRIMARY,
                space_before_mm: 5.0,
                ..base
            },
            BlockStyle::EntryTitle => StyleSpec {
                face: FontFace::Bold,
                color: PRIMARY,
                space_before_mm: 2.5,
                indent_mm: 3.5,
                ..base
            },
            BlockStyle::EntrySubtitle => StyleSpec {
                color: MUTED,
                indent_mm: 3.5,
                ..base
            },
            BlockStyle::Paragraph => StyleSpec {
                space_before_mm: 1.0,
                ..base
            },
            BlockStyle::Bullet => StyleSpec {
                color: BULLET_TEXT,
                space_before_mm: 0.5,
                indent_mm: 7.0,
                ..base
            },
            BlockStyle::Technologies => StyleSpec {
                face: FontFace::Oblique,
                color: MUTED,
                space_before_mm: 1.0,
                indent_mm: 3.5,
                ..base
            },
            BlockStyle::Signature => StyleSpec {
                face: FontFace::Bold,
                space_before_mm: 6.0,
                ..base
            },
        }
    }
}

/// One styled run of text. `trailing` is right-aligned on the block's first line
/// (used for period and location columns).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub style: BlockStyle,
    pub text: String,
    pub trailing: Option<String>,
}

impl Block {
    fn new(style: BlockStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            trailing: None,
        }
    }

    fn with_trailing(style: BlockStyle, text: impl Into<String>, trailing: &str) -> Self {
        let trailing = trailing.trim();
        Self {
            style,
            text: text.into(),
            trailing: (!trailing.is_empty()).then(|| trailing.to_string()),
        }
    }
}

pub fn compose(document: &Document) -> Vec<Block> {
    match document {
        Document::Resume(doc) => compose_resume(doc),
        Document::CoverLetter(doc) => compose_cover_letter(doc),
    }
}

pub fn compose_resume(doc: &ResumeDocument) -> Vec<Block> {
    let mut blocks = header(&doc.identity);

    let paragraphs: Vec<&str> = doc.summary_paragraphs().collect();
    if !paragraphs.is_empty() {
        blocks.push(Block::new(BlockStyle::SectionHeading, "ABOUT ME"));
        blocks.extend(
            paragraphs
                .into_iter()
                .map(|p| Block::new(BlockStyle::Paragraph, p)),
        );
    }

    if !doc.experience.is_empty() {
        blocks.push(Block::new(BlockStyle::SectionHeading, "WORK EXPERIENCE"));
        for exp in &doc.experience {
            blocks.push(Block::with_trailing(
                BlockStyle::EntryTitle,
                &exp.title,
                &exp.period(),
            ));
            blocks.push(Block::with_trailing(
                BlockStyle::EntrySubtitle,
                &exp.company,
                &exp.location,
            ));
            blocks.extend(bullets(&exp.description));
            if let Some(tech) = exp.technologies.as_deref().map(str::trim) {
                if !tech.is_empty() {
                    blocks.push(Block::new(
                        BlockStyle::Technologies,
                        format!("Technologies: {tech}"),
                    ));
                }
            }
        }
    }

    if !doc.education.is_empty() {
        blocks.push(Block::new(BlockStyle::SectionHeading, "EDUCATION"));
        for edu in &doc.education {
            blocks.push(Block::with_trailing(
                BlockStyle::EntryTitle,
                &edu.degree,
                &edu.period(),
            ));
            blocks.push(Block::with_trailing(
                BlockStyle::EntrySubtitle,
                &edu.institution,
                &edu.location,
            ));
            blocks.extend(bullets(&edu.details));
        }
    }

    blocks
}

pub fn compose_cover_letter(doc: &CoverLetterDocument) -> Vec<Block> {
    let mut blocks = header(&doc.identity);

    if let Some(recipient) = doc.recipient.as_deref().filter(|r| !r.trim().is_empty()) {
        blocks.push(Block::new(
            BlockStyle::Paragraph,
            format!("To: {}", recipient.trim()),
        ));
    }
    if let Some(company) = doc.company.as_deref().filter(|c| !c.trim().is_empty()) {
        blocks.push(Block::new(BlockStyle::Paragraph, company.trim()));
    }

    let letter = &doc.cover_letter;
    if !letter.introduction.trim().is_empty() {
        blocks.push(Block::new(BlockStyle::Paragraph, letter.introduction.trim()));
    }
    blocks.extend(
        doc.body_paragraphs()
            .map(|p| Block::new(BlockStyle::Paragraph, p)),
    );
    if !letter.closing.trim().is_empty() {
        blocks.push(Block::new(BlockStyle::Paragraph, letter.closing.trim()));
    }
    blocks.push(Block::new(BlockStyle::Signature, doc.identity.name.trim()));

    blocks
}

fn header(identity: &Identity) -> Vec<Block> {
    let mut blocks = vec![Block::new(BlockStyle::Name, identity.name.trim())];
    if !identity.title.trim().is_empty() {
        blocks.push(Block::new(BlockStyle::Headline, identity.title.trim()));
    }
    let contact = contact_line(identity);
    if !contact.is_empty() {
        blocks.push(Block::new(BlockStyle::Contact, contact));
    }
    blocks
}

/// Location, email, links and phone joined with separators, empty parts skipped.
pub fn contact_line(identity: &Identity) -> String {
    [
        Some(identity.location.as_str()),
        Some(identity.email.as_str()),
        identity.github.as_deref(),
        identity.linkedin.as_deref(),
        identity.phone.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" | ")
}

fn bullets(lines: &[String]) -> impl Iterator<Item = Block> + '_ {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| Block::new(BlockStyle::Bullet, format!("\u{2022} {l}")))
}
