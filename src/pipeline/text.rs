//! Free-text accumulation: merging consecutive words into paragraphs.
//!
//! Description fields arrive one word at a time. The separator between a
//! word and the text accumulated so far is decided from the vertical
//! distance between baselines: a large jump is a paragraph break, a small
//! jump is a soft line wrap (where a trailing hyphen or slash means the
//! vendor split one token across lines), and no jump is an ordinary space.

use crate::provider::Word;

/// Baseline delta above which two words are in different paragraphs.
const PARAGRAPH_THRESHOLD: f64 = 10.0;
/// Baseline delta above which two words are on different lines.
const LINE_THRESHOLD: f64 = 3.0;

/// Absolute baseline delta between a word and the previous word's baseline.
/// The first word of a field has no predecessor and gets delta 0.
pub fn baseline_difference(word: &Word, previous_baseline: Option<f64>) -> f64 {
    match previous_baseline {
        Some(prev) => (word.baseline_y() - prev).abs(),
        None => 0.0,
    }
}

pub fn is_different_paragraph(word: &Word, previous_baseline: Option<f64>) -> bool {
    baseline_difference(word, previous_baseline) > PARAGRAPH_THRESHOLD
}

/// Append `word` to the text accumulated in `head`, choosing the separator
/// from the baseline delta.
///
/// - first word: no separator;
/// - different paragraph: `\n`;
/// - different line with `head` ending in `-` or `/`: the wrap character is
///   stripped and the halves joined bare (rejoins a token the vendor wrapped
///   across lines);
/// - otherwise: a single space.
pub fn append_word(head: Option<&str>, word: &Word, previous_baseline: Option<f64>) -> String {
    let delta = baseline_difference(word, previous_baseline);
    let different_line = delta > LINE_THRESHOLD;

    let head = head.unwrap_or("");
    if head.trim().is_empty() {
        return format!("{head}{}", word.text);
    }
    if different_line && (head.ends_with('-') || head.ends_with('/')) {
        let trimmed = head.trim_end_matches(['-', '/']);
        return format!("{trimmed}{}", word.text);
    }
    if delta > PARAGRAPH_THRESHOLD {
        return format!("{head}\n{}", word.text);
    }
    format!("{head} {}", word.text)
}
