//! Typographic classification: the tokeniser of this parser.
//!
//! The source PDF carries no semantic markup, so the only grammar signal is
//! typography. Every word gets exactly one [`CharacterStyle`] derived from
//! its representative glyph's font-name suffix, point size, and fill color —
//! never from parser state. That purity is what lets the section parser
//! treat style as the token type: the same word always classifies the same
//! way no matter where the state machine currently is.
//!
//! The table below is the vendor's recurring layout, not a general document
//! model. Font names are matched on suffix because subset-embedding prefixes
//! (`ABCDEF+CiscoSansTT`) vary per document.

use crate::provider::{Rgb, Word};

/// Semantic role of a word, assigned purely from its rendering attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterStyle {
    /// 16 pt section divider ("Audio configuration"). Carries no data.
    MethodFamilyHeading,
    /// 10 pt method path segment ("xConfiguration Audio Volume").
    MethodNameHeading,
    /// Teal oblique sans product token under "Applies to:".
    ProductName,
    /// 8 pt sans `USAGE:` heading.
    UsageHeading,
    /// 8.8/9.6 pt monospace invocation template.
    UsageExample,
    /// 8.8 pt oblique monospace formal parameter name.
    ParameterName,
    /// 8 pt light-oblique sans: value-space literal or availability
    /// disclaimer.
    ValuespaceOrDisclaimer,
    /// 8 pt oblique sans enum value term being defined.
    ValuespaceTerm,
    /// Everything else: descriptions, headings inside prose, preamble.
    Body,
}

const SANS: &str = "CiscoSansTT";
const SANS_OBLIQUE: &str = "CiscoSansTT-Oblique";
const SANS_LIGHT_OBLIQUE: &str = "CiscoSansTTLight-Oblique";
const MONO: &str = "CourierNewPSMT";
const MONO_ITALIC: &str = "CourierNewPS-ItalicMT";

/// The fixed teal used exclusively for product names.
const PRODUCT_NAME_COLOR: Rgb = Rgb::new(0.035, 0.376, 0.439);

/// Point sizes in the PDF are stored with float rounding noise.
fn pt(size: f64, expected: f64) -> bool {
    (size - expected).abs() < 0.05
}

/// Classify a word from its first non-quotation-mark glyph.
pub fn classify(word: &Word) -> CharacterStyle {
    let glyph = word.style_glyph();
    let font = glyph.font_name.as_str();
    let size = glyph.point_size;

    if pt(size, 16.0) {
        CharacterStyle::MethodFamilyHeading
    } else if pt(size, 10.0) {
        CharacterStyle::MethodNameHeading
    } else if font.ends_with(SANS_OBLIQUE) && glyph.color.approx_eq(&PRODUCT_NAME_COLOR, 0.01) {
        CharacterStyle::ProductName
    } else if pt(size, 8.0) && font.ends_with(SANS_LIGHT_OBLIQUE) {
        CharacterStyle::ValuespaceOrDisclaimer
    } else if pt(size, 8.0) && font.ends_with(SANS_OBLIQUE) {
        CharacterStyle::ValuespaceTerm
    } else if pt(size, 8.0) && font.ends_with(SANS) {
        CharacterStyle::UsageHeading
    } else if (pt(size, 8.8) || pt(size, 9.6)) && font.ends_with(MONO) {
        CharacterStyle::UsageExample
    } else if pt(size, 8.8) && font.ends_with(MONO_ITALIC) {
        CharacterStyle::ParameterName
    } else {
        CharacterStyle::Body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Glyph, Point, Word};

    fn word(font: &str, size: f64, color: Rgb) -> Word {
        let glyph = Glyph {
            text: "x".into(),
            baseline_start: Point::new(100.0, 500.0),
            baseline_end: Point::new(105.0, 500.0),
            point_size: size,
            font_name: font.into(),
            color,
        };
        Word {
            text: "x".into(),
            glyphs: vec![glyph],
        }
    }

    const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    const TEAL: Rgb = Rgb::new(0.035, 0.376, 0.439);

    #[test]
    fn point_sizes_pick_headings() {
        assert_eq!(
            classify(&word("CiscoSansTT", 16.0, BLACK)),
            CharacterStyle::MethodFamilyHeading
        );
        assert_eq!(
            classify(&word("CiscoSansTT", 10.0, BLACK)),
            CharacterStyle::MethodNameHeading
        );
    }

    #[test]
    fn product_name_needs_oblique_font_and_teal() {
        assert_eq!(
            classify(&word("ABCDEF+CiscoSansTT-Oblique", 8.0, TEAL)),
            CharacterStyle::ProductName
        );
        // same font, wrong color: it's a value-space term instead
        assert_eq!(
            classify(&word("ABCDEF+CiscoSansTT-Oblique", 8.0, BLACK)),
            CharacterStyle::ValuespaceTerm
        );
    }

    #[test]
    fn light_oblique_wins_over_plain_sans_suffix() {
        // "CiscoSansTTLight-Oblique" does not end with "CiscoSansTT", but a
        // subsetted "XX+CiscoSansTT" must still classify as UsageHeading.
        assert_eq!(
            classify(&word("XX+CiscoSansTTLight-Oblique", 8.0, BLACK)),
            CharacterStyle::ValuespaceOrDisclaimer
        );
        assert_eq!(
            classify(&word("XX+CiscoSansTT", 8.0, BLACK)),
            CharacterStyle::UsageHeading
        );
    }

    #[test]
    fn monospace_sizes() {
        assert_eq!(
            classify(&word("CourierNewPSMT", 8.8, BLACK)),
            CharacterStyle::UsageExample
        );
        assert_eq!(
            classify(&word("CourierNewPSMT", 9.6, BLACK)),
            CharacterStyle::UsageExample
        );
        assert_eq!(
            classify(&word("CourierNewPS-ItalicMT", 8.8, BLACK)),
            CharacterStyle::ParameterName
        );
    }

    #[test]
    fn fallback_is_body() {
        assert_eq!(
            classify(&word("CiscoSansTT", 9.0, BLACK)),
            CharacterStyle::Body
        );
    }

    #[test]
    fn classification_ignores_leading_quotation_mark() {
        let quote = Glyph {
            text: "\"".into(),
            baseline_start: Point::new(0.0, 0.0),
            baseline_end: Point::new(5.0, 0.0),
            point_size: 9.6,
            font_name: "CourierNewPSMT".into(),
            color: BLACK,
        };
        let letter = Glyph {
            text: "O".into(),
            point_size: 8.8,
            font_name: "CourierNewPS-ItalicMT".into(),
            ..quote.clone()
        };
        let w = Word {
            text: "\"O".into(),
            glyphs: vec![quote, letter],
        };
        assert_eq!(classify(&w), CharacterStyle::ParameterName);
    }
}
