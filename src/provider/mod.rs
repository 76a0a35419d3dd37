//! The glyph/word provider interface.
//!
//! The underlying PDF text/layout library is an external collaborator: the
//! core only needs positioned glyph runs and the bookmark outline, so it
//! talks to a [`GlyphProvider`] rather than a concrete PDF crate. The
//! `pdfium` feature supplies a [`pdfium::PdfiumGlyphProvider`] backed by
//! `pdfium-render`; tests use an in-memory provider that typesets synthetic
//! pages.
//!
//! Everything here is plain owned data. A glyph exposes exactly the
//! attributes the typographic classifier and word-stream builder consume:
//! displayed text, position, baseline, point size, font name, fill color.

use crate::error::ExtractError;

#[cfg(feature = "pdfium")]
pub mod pdfium;

/// An RGB fill color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb { r, g, b }
    }

    /// Component-wise comparison with tolerance. PDF producers round color
    /// components differently, so exact equality is too strict.
    pub fn approx_eq(&self, other: &Rgb, tolerance: f64) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
    }
}

/// A point in page space: origin bottom-left, units of 1/72 inch, Y up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// One positioned glyph run (normally a single displayed character).
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// The displayed text of this glyph.
    pub text: String,
    /// Start of the glyph baseline; also the glyph's location.
    pub baseline_start: Point,
    /// End of the glyph baseline.
    pub baseline_end: Point,
    pub point_size: f64,
    /// Full font resource name, e.g. `SUBSET+CiscoSansTT-Oblique`. Matching
    /// is done on suffix because subset prefixes vary per document.
    pub font_name: String,
    /// Fill color of the glyph.
    pub color: Rgb,
}

impl Glyph {
    /// Horizontal position used for column assignment.
    pub fn x(&self) -> f64 {
        self.baseline_start.x
    }

    /// Vertical position used for margin filtering.
    pub fn y(&self) -> f64 {
        self.baseline_start.y
    }
}

/// A segmented word: its text plus the glyphs it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub glyphs: Vec<Glyph>,
}

impl Word {
    /// Baseline Y of the word, taken from its first glyph.
    pub fn baseline_y(&self) -> f64 {
        self.glyphs[0].baseline_start.y
    }

    /// The glyph whose rendering attributes represent this word.
    ///
    /// Leading quotation marks are skipped: the vendor typesets them in a
    /// different effective size than the word they open, which would
    /// misclassify the whole word.
    pub fn style_glyph(&self) -> &Glyph {
        self.glyphs
            .iter()
            .find(|g| g.text != "\"")
            .unwrap_or(&self.glyphs[0])
    }
}

/// One entry of the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub title: String,
    /// 1-based page number the bookmark points at.
    pub page_number: usize,
    /// Nesting depth; 0 for top-level entries.
    pub level: usize,
}

/// The glyphs of one page plus the page geometry needed for margin math.
#[derive(Debug, Clone)]
pub struct PageGlyphs {
    /// 1-based page number.
    pub number: usize,
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Glyphs in the provider's natural order; the word-stream builder
    /// re-orders them into reading order itself.
    pub glyphs: Vec<Glyph>,
}

/// Read access to a positioned-glyph view of one open PDF document.
///
/// The document handle behind an implementation is a single scoped resource:
/// acquired once, used read-only for all section passes, released on drop.
pub trait GlyphProvider {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Glyphs and geometry of the given 1-based page.
    fn page(&self, number: usize) -> Result<PageGlyphs, ExtractError>;

    /// The document outline, in document order.
    fn bookmarks(&self) -> Result<Vec<Bookmark>, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_approx_eq_within_tolerance() {
        let teal = Rgb::new(0.035, 0.376, 0.439);
        let rounded = Rgb::new(0.0353, 0.3765, 0.4392);
        assert!(teal.approx_eq(&rounded, 0.01));
        assert!(!teal.approx_eq(&Rgb::new(0.0, 0.0, 0.0), 0.01));
    }

    #[test]
    fn style_glyph_skips_leading_quotation_marks() {
        let quote = Glyph {
            text: "\"".into(),
            baseline_start: Point::new(0.0, 0.0),
            baseline_end: Point::new(5.0, 0.0),
            point_size: 9.6,
            font_name: "CourierNewPSMT".into(),
            color: Rgb::default(),
        };
        let letter = Glyph {
            text: "a".into(),
            point_size: 8.8,
            ..quote.clone()
        };
        let word = Word {
            text: "\"a".into(),
            glyphs: vec![quote.clone(), letter.clone()],
        };
        assert_eq!(word.style_glyph().point_size, 8.8);

        let only_quotes = Word {
            text: "\"\"".into(),
            glyphs: vec![quote.clone(), quote],
        };
        assert_eq!(only_quotes.style_glyph().point_size, 9.6);
    }
}
