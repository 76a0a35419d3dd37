//! pdfium-backed [`GlyphProvider`].
//!
//! The pdfium library itself is bound once per process: `pdfium-render`
//! wraps a C++ library with global state, so the binding lives in a
//! `OnceCell` and every provider borrows it. Each [`PdfiumGlyphProvider`]
//! owns one open document; dropping the provider closes the document.
//!
//! Page access is lazy and sequential — pdfium does not support concurrent
//! reads of one document, which is why the extraction driver parses the
//! three sections one after another (see `crate::extract`).

use crate::error::ExtractError;
use crate::provider::{Bookmark, Glyph, GlyphProvider, PageGlyphs, Point, Rgb};
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

fn pdfium() -> &'static Pdfium {
    PDFIUM.get_or_init(Pdfium::default)
}

/// A [`GlyphProvider`] reading positioned characters via pdfium.
pub struct PdfiumGlyphProvider {
    document: PdfDocument<'static>,
}

impl PdfiumGlyphProvider {
    /// Open a PDF document from a file path.
    pub fn open(path: &Path, password: Option<&str>) -> Result<Self, ExtractError> {
        let document = pdfium()
            .load_pdf_from_file(path, password)
            .map_err(|e| ExtractError::Provider(format!("{:?}", e)))?;
        info!(
            "PDF loaded: {} pages ({})",
            document.pages().len(),
            path.display()
        );
        Ok(PdfiumGlyphProvider { document })
    }
}

impl GlyphProvider for PdfiumGlyphProvider {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, number: usize) -> Result<PageGlyphs, ExtractError> {
        let total = self.page_count();
        if number == 0 || number > total {
            return Err(ExtractError::PageOutOfRange {
                page: number,
                total,
            });
        }

        let page = self
            .document
            .pages()
            .get((number - 1) as u16)
            .map_err(|e| ExtractError::Provider(format!("page {number}: {:?}", e)))?;
        let text = page
            .text()
            .map_err(|e| ExtractError::Provider(format!("page {number} text: {:?}", e)))?;

        let mut glyphs = Vec::new();
        for ch in text.chars().iter() {
            let Some(displayed) = ch.unicode_string() else {
                continue;
            };
            let origin_x = ch
                .origin_x()
                .map_err(|e| ExtractError::Provider(format!("{:?}", e)))?
                .value as f64;
            let origin_y = ch
                .origin_y()
                .map_err(|e| ExtractError::Provider(format!("{:?}", e)))?
                .value as f64;
            let width = ch
                .loose_bounds()
                .map(|b| b.width().value as f64)
                .unwrap_or(0.0);
            let color = ch
                .fill_color()
                .map(|c| {
                    Rgb::new(
                        c.red() as f64 / 255.0,
                        c.green() as f64 / 255.0,
                        c.blue() as f64 / 255.0,
                    )
                })
                .unwrap_or_default();

            glyphs.push(Glyph {
                text: displayed,
                baseline_start: Point::new(origin_x, origin_y),
                baseline_end: Point::new(origin_x + width, origin_y),
                point_size: ch.unscaled_font_size().value as f64,
                font_name: ch.font_name(),
                color,
            });
        }

        debug!("page {number}: {} glyphs", glyphs.len());

        Ok(PageGlyphs {
            number,
            width: page.width().value as f64,
            height: page.height().value as f64,
            glyphs,
        })
    }

    fn bookmarks(&self) -> Result<Vec<Bookmark>, ExtractError> {
        let mut out = Vec::new();
        let mut node = self.document.bookmarks().root();
        while let Some(bookmark) = node {
            collect_bookmark(&bookmark, 0, &mut out);
            node = bookmark.next_sibling();
        }
        Ok(out)
    }
}

fn collect_bookmark(bookmark: &PdfBookmark, level: usize, out: &mut Vec<Bookmark>) {
    let title = bookmark.title().unwrap_or_default();
    // Bookmarks without a page destination cannot bound a section and are
    // skipped, but their children may still carry destinations.
    if let Some(page_index) = bookmark
        .destination()
        .and_then(|dest| dest.page_index().ok())
    {
        out.push(Bookmark {
            title,
            page_number: page_index as usize + 1,
            level,
        });
    }

    let mut child = bookmark.first_child();
    while let Some(c) = child {
        collect_bookmark(&c, level + 1, out);
        child = c.next_sibling();
    }
}
