use async_trait::async_trait;
use bytes::Bytes;
use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};
use tracing::{debug, info};

use crate::models::Document;
use crate::render::metrics::FontFace;
use crate::render::page::{paginate, Page, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::render::template::{compose, Rgb8};
use crate::render::{DocumentRenderer, RenderError, RenderedDocument};

/// In-process PDF renderer built on the PDF base-14 Helvetica family.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn render(&self, document: &Document) -> Result<RenderedDocument, RenderError> {
        document.validate()?;

        let title = document.identity().name.trim().to_string();
        let filename = document.kind().filename();
        let blocks = compose(document);

        let bytes = tokio::task::spawn_blocking(move || {
            let pages = paginate(&blocks);
            debug!("Painting {} page(s) for '{}'", pages.len(), title);
            paint(&title, &pages)
        })
        .await
        .map_err(|e| RenderError::Failed(format!("spawn_blocking failed in render: {e}")))??;

        info!("Rendered {filename} ({} bytes)", bytes.len());
        Ok(RenderedDocument {
            bytes: Bytes::from(bytes),
            filename,
        })
    }
}

fn paint(title: &str, pages: &[Page]) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(pdf_error)?;

    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for placed in page {
            let font = match placed.face {
                FontFace::Regular => &regular,
                FontFace::Bold => &bold,
                FontFace::Oblique => &oblique,
            };
            layer.set_fill_color(to_color(placed.color));
            layer.use_text(
                placed.text.as_str(),
                placed.size_pt,
                Mm(placed.x_mm),
                Mm(placed.y_mm),
                font,
            );
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn to_color(Rgb8(r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn pdf_error(e: printpdf::Error) -> RenderError {
    RenderError::Failed(format!("PDF encoding failed: {e}"))
}
