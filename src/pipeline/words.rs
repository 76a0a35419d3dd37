//! Word-stream construction: from raw page glyphs to reading-order words.
//!
//! The vendor lays every content page out as two independent reading
//! columns. A naive top-to-bottom sweep would interleave the columns, so
//! each page is read twice: once restricted to the left half, once to the
//! right, with all left-half words emitted before any right-half word.
//!
//! ## The quotation-mark correction
//!
//! The vendor typesets the monospaced quotation mark at 9.6 pt while the
//! rest of the monospaced run is 8.8 pt, and the enlarged glyph's baseline
//! loses floating-point precision in the producer. Uncorrected, that sinks
//! the quote a fraction of a point below its line and the line-grouping in
//! word segmentation splits `"On"` into three fragments. Two corrections
//! run before segmentation: every baseline Y is rounded to 3 decimals, and
//! the oversized quote glyph is treated as effective 8.8 pt.

use crate::error::ExtractError;
use crate::provider::{Glyph, GlyphProvider, PageGlyphs, Word};
use std::ops::Range;

const POINTS_PER_INCH: f64 = 72.0;

const LEFT_MARGIN: f64 = 5.0 / 8.0 * POINTS_PER_INCH;
const TOP_MARGIN: f64 = 1.0 * POINTS_PER_INCH;
const BOTTOM_MARGIN: f64 = 0.5 * POINTS_PER_INCH;

/// Which reading column of the page a glyph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    Left,
    Right,
}

/// True when the glyph lies inside the content area of the given half.
fn on_half(glyph: &Glyph, page_width: f64, page_height: f64, half: Half) -> bool {
    let x = glyph.x();
    let y = glyph.y();
    let split = (page_width - LEFT_MARGIN) / 2.0 + LEFT_MARGIN;

    y > BOTTOM_MARGIN
        && y < page_height - TOP_MARGIN
        && x > LEFT_MARGIN
        && match half {
            Half::Left => x < split,
            Half::Right => x >= split,
        }
}

/// Round a baseline coordinate to the precision that groups lines reliably.
fn corrected_baseline(y: f64) -> f64 {
    (y * 1000.0).round() / 1000.0
}

/// Apply the baseline rounding and quotation-mark size corrections.
fn corrected(glyph: &Glyph) -> Glyph {
    let mut g = glyph.clone();
    g.baseline_start.y = corrected_baseline(g.baseline_start.y);
    g.baseline_end.y = corrected_baseline(g.baseline_end.y);
    if g.text == "\""
        && (g.point_size - 9.6).abs() < 0.05
        && g.font_name.ends_with("CourierNewPSMT")
    {
        g.point_size = 8.8;
    }
    g
}

/// Segment corrected glyphs into words in reading order.
///
/// Glyphs are grouped into lines by exact corrected baseline, lines ordered
/// top to bottom (descending Y — PDF page space points up), glyphs within a
/// line ordered left to right. A word breaks at a whitespace glyph or at a
/// horizontal gap wider than a quarter of the point size.
pub fn segment_into_words(glyphs: &[Glyph]) -> Vec<Word> {
    let mut ordered: Vec<&Glyph> = glyphs.iter().collect();
    ordered.sort_by(|a, b| {
        b.baseline_start
            .y
            .partial_cmp(&a.baseline_start.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.baseline_start
                    .x
                    .partial_cmp(&b.baseline_start.x)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    let mut words = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();

    for glyph in ordered {
        if glyph.text.chars().all(char::is_whitespace) {
            flush(&mut current, &mut words);
            continue;
        }

        if let Some(last) = current.last() {
            let same_line = last.baseline_start.y == glyph.baseline_start.y;
            let gap = glyph.baseline_start.x - last.baseline_end.x;
            let gap_limit = (glyph.point_size * 0.25).max(1.0);
            if !same_line || gap > gap_limit {
                flush(&mut current, &mut words);
            }
        }

        current.push(glyph.clone());
    }
    flush(&mut current, &mut words);

    words
}

fn flush(current: &mut Vec<Glyph>, words: &mut Vec<Word>) {
    if current.is_empty() {
        return;
    }
    let text: String = current.iter().map(|g| g.text.as_str()).collect();
    words.push(Word {
        text,
        glyphs: std::mem::take(current),
    });
}

/// Yield the words of one page half, corrected and in reading order.
fn words_on_half(page: &PageGlyphs, half: Half) -> Vec<Word> {
    let selected: Vec<Glyph> = page
        .glyphs
        .iter()
        .filter(|g| on_half(g, page.width, page.height, half))
        .map(corrected)
        .collect();
    segment_into_words(&selected)
}

/// Build the flat word stream for a half-open range of 1-based page numbers:
/// all left-half words of a page, then all right-half words, pages ascending.
pub fn words_on_pages<P: GlyphProvider + ?Sized>(
    provider: &P,
    pages: Range<usize>,
) -> Result<Vec<(Word, usize)>, ExtractError> {
    let mut stream = Vec::new();
    for number in pages {
        let page = provider.page(number)?;
        for half in [Half::Left, Half::Right] {
            for word in words_on_half(&page, half) {
                stream.push((word, number));
            }
        }
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Bookmark, Point, Rgb};

    const PAGE_W: f64 = 612.0;
    const PAGE_H: f64 = 792.0;

    fn glyph(c: char, x: f64, y: f64) -> Glyph {
        glyph_sized(c, x, y, 8.8, "CourierNewPSMT")
    }

    fn glyph_sized(c: char, x: f64, y: f64, size: f64, font: &str) -> Glyph {
        Glyph {
            text: c.to_string(),
            baseline_start: Point::new(x, y),
            baseline_end: Point::new(x + 5.0, y),
            point_size: size,
            font_name: font.into(),
            color: Rgb::default(),
        }
    }

    fn place_word(glyphs: &mut Vec<Glyph>, text: &str, x: f64, y: f64) {
        for (i, c) in text.chars().enumerate() {
            glyphs.push(glyph(c, x + i as f64 * 5.0, y));
        }
    }

    struct OnePage(PageGlyphs);

    impl GlyphProvider for OnePage {
        fn page_count(&self) -> usize {
            1
        }
        fn page(&self, number: usize) -> Result<PageGlyphs, ExtractError> {
            assert_eq!(number, 1);
            Ok(self.0.clone())
        }
        fn bookmarks(&self) -> Result<Vec<Bookmark>, ExtractError> {
            Ok(vec![])
        }
    }

    #[test]
    fn segmentation_groups_lines_and_splits_on_gaps() {
        let mut glyphs = Vec::new();
        place_word(&mut glyphs, "Hello", 100.0, 500.0);
        place_word(&mut glyphs, "world", 140.0, 500.0);
        place_word(&mut glyphs, "below", 100.0, 488.0);

        let words = segment_into_words(&glyphs);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["Hello", "world", "below"]);
    }

    #[test]
    fn segmentation_reads_out_of_order_glyphs_in_reading_order() {
        let mut glyphs = Vec::new();
        place_word(&mut glyphs, "second", 100.0, 400.0);
        place_word(&mut glyphs, "first", 100.0, 500.0);

        let words = segment_into_words(&glyphs);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn quote_baseline_defect_is_corrected_before_grouping() {
        // The 9.6pt quote sits a hair below the 8.8pt line it opens. After
        // rounding both baselines coincide and the word stays whole.
        let mut glyphs = vec![glyph_sized('"', 100.0, 500.000_4, 9.6, "CourierNewPSMT")];
        glyphs.push(glyph('O', 105.0, 500.000_2));
        glyphs.push(glyph('n', 110.0, 500.000_2));

        let page = PageGlyphs {
            number: 1,
            width: PAGE_W,
            height: PAGE_H,
            glyphs,
        };
        let words = words_on_half(&page, Half::Left);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "\"On");
        assert_eq!(words[0].glyphs[0].point_size, 8.8);
    }

    #[test]
    fn left_half_words_precede_right_half_words() {
        let mut glyphs = Vec::new();
        // Split point for 612pt width: (612 - 45) / 2 + 45 = 328.5
        place_word(&mut glyphs, "right", 400.0, 700.0);
        place_word(&mut glyphs, "left", 100.0, 100.0);

        let provider = OnePage(PageGlyphs {
            number: 1,
            width: PAGE_W,
            height: PAGE_H,
            glyphs,
        });
        let stream = words_on_pages(&provider, 1..2).unwrap();
        let texts: Vec<&str> = stream.iter().map(|(w, _)| w.text.as_str()).collect();
        assert_eq!(texts, ["left", "right"]);
    }

    #[test]
    fn margins_filter_header_and_footer() {
        let mut glyphs = Vec::new();
        place_word(&mut glyphs, "header", 100.0, 760.0); // above top margin
        place_word(&mut glyphs, "footer", 100.0, 20.0); // below bottom margin
        place_word(&mut glyphs, "gutter", 10.0, 400.0); // left of margin
        place_word(&mut glyphs, "content", 100.0, 400.0);

        let provider = OnePage(PageGlyphs {
            number: 1,
            width: PAGE_W,
            height: PAGE_H,
            glyphs,
        });
        let stream = words_on_pages(&provider, 1..2).unwrap();
        let texts: Vec<&str> = stream.iter().map(|(w, _)| w.text.as_str()).collect();
        assert_eq!(texts, ["content"]);
    }
}
