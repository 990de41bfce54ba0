//! Places styled blocks onto A4 pages.
//!
//! Pure geometry: wraps each block with the metric tables, stacks lines from
//! the top margin down and starts a new page when the next line would cross
//! the bottom margin. Coordinates are PDF-style (origin bottom-left, mm).

use crate::render::metrics::{get_metrics, FontFace, PT_PER_MM};
use crate::render::template::{Align, Block, Rgb8, MUTED};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// 40pt of padding on every side.
pub const MARGIN_MM: f32 = 40.0 / PT_PER_MM;
pub const LINE_HEIGHT: f32 = 1.5;
/// Minimum gap between a block's text and its right-aligned trailing column.
const TRAILING_GAP_MM: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x_mm: f32,
    /// Baseline.
    pub y_mm: f32,
    pub size_pt: f32,
    pub face: FontFace,
    pub color: Rgb8,
}

pub type Page = Vec<PlacedText>;

/// Lays out `blocks` and returns one entry per page. Always returns at least one page.
pub fn paginate(blocks: &[Block]) -> Vec<Page> {
    let content_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let top = PAGE_HEIGHT_MM - MARGIN_MM;

    let mut pages: Vec<Page> = Vec::new();
    let mut current: Page = Vec::new();
    let mut cursor = top;

    for block in blocks {
        let spec = block.style.spec();
        let metrics = get_metrics(spec.face);
        let trailing_metrics = get_metrics(FontFace::Regular);
        let line_height = spec.size_pt * LINE_HEIGHT / PT_PER_MM;

        let trailing_width = block
            .trailing
            .as_deref()
            .map(|t| trailing_metrics.measure_mm(t, spec.size_pt) + TRAILING_GAP_MM)
            .unwrap_or(0.0);
        let available = (content_width - spec.indent_mm - trailing_width).max(10.0);
        let mut lines = metrics.wrap(&block.text, spec.size_pt, available);
        if lines.is_empty() && block.trailing.is_some() {
            lines.push(String::new());
        }
        if lines.is_empty() {
            continue;
        }

        // Leading space is dropped at the top of a page.
        if cursor < top {
            cursor -= spec.space_before_mm;
        }

        for (i, line) in lines.into_iter().enumerate() {
            if cursor - line_height < MARGIN_MM && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                cursor = top;
            }
            cursor -= line_height;
            let baseline = cursor + (line_height - spec.size_pt / PT_PER_MM) / 2.0;

            let x = match spec.align {
                Align::Left => MARGIN_MM + spec.indent_mm,
                Align::Center => {
                    let width = metrics.measure_mm(&line, spec.size_pt);
                    ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM)
                }
            };

            if !line.is_empty() {
                current.push(PlacedText {
                    text: line,
                    x_mm: x,
                    y_mm: baseline,
                    size_pt: spec.size_pt,
                    face: spec.face,
                    color: spec.color,
                });
            }
            if i == 0 {
                if let Some(trailing) = &block.trailing {
                    let width = trailing_metrics.measure_mm(trailing, spec.size_pt);
                    current.push(PlacedText {
                        text: trailing.clone(),
                        x_mm: PAGE_WIDTH_MM - MARGIN_MM - width,
                        y_mm: baseline,
                        size_pt: spec.size_pt,
                        face: FontFace::Regular,
                        color: MUTED,
                    });
                }
            }
        }
    }

    pages.push(current);
    pages
}
