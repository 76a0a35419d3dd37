//! Value-space literal parsing: numeric ranges, enum lists, and the
//! ellipsis-range guesser.
//!
//! The vendor prints a parameter's value domain as italic free text —
//! `Integer (0..100)`, `Off/On/Auto`, `1..65535` — with no structure beyond
//! the notation itself, and occasionally compresses long enumerations into
//! an ellipsis form (`Microphone.1/../Microphone.4`) that has to be expanded
//! back into concrete values.

use crate::error::ExtractError;
use crate::model::{EnumValue, EnumValueSet, IntRange, ValueSpace, ValueSpaceKind};
use once_cell::sync::Lazy;
use regex::Regex;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d+)\.\.(-?\d+)$").unwrap());
static INTEGER_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Integer \((-?\d+)\.\.(-?\d+)\)$").unwrap());
static OFF_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Off/(-?\d+)\.\.(-?\d+)$").unwrap());
static LENGTH_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\((-?\d+),(-?\d+)\)$").unwrap());

/// The two bound literals of a `min..max` or `(min..max)` range, as
/// written. Unbalanced parentheses do not match.
pub fn numeric_range_literals(text: &str) -> Option<(&str, &str)> {
    let inner = match (text.starts_with('('), text.ends_with(')')) {
        (true, true) => &text[1..text.len() - 1],
        (false, false) => text,
        _ => return None,
    };
    let captures = RANGE_RE.captures(inner)?;
    Some((
        captures.get(1)?.as_str(),
        captures.get(2)?.as_str(),
    ))
}

/// Parse a bare or parenthesised numeric range literal.
pub fn parse_numeric_range(text: &str) -> Option<(i64, i64)> {
    let (min, max) = numeric_range_literals(text)?;
    Some((min.parse().ok()?, max.parse().ok()?))
}

/// Parse a `min..max` literal with no parentheses allowed.
pub fn parse_bare_numeric_range(text: &str) -> Option<(i64, i64)> {
    let captures = RANGE_RE.captures(text)?;
    let min = captures[1].parse().ok()?;
    let max = captures[2].parse().ok()?;
    Some((min, max))
}

/// Parse a `(min,max)` string-length pair.
pub fn parse_length_pair(text: &str) -> Option<(usize, usize)> {
    let captures = LENGTH_PAIR_RE.captures(text)?;
    let min = captures[1].parse().ok()?;
    let max = captures[2].parse().ok()?;
    Some((min, max))
}

/// Split a delimited enum literal into values, dropping empty tokens and a
/// trailing close-parenthesis.
pub fn parse_enum_values(list: &str, delimiter: &str) -> EnumValueSet {
    list.trim_end_matches(')')
        .split(delimiter)
        .filter(|token| !token.is_empty())
        .map(EnumValue::new)
        .collect()
}

/// Expand a token list containing a literal `..` placeholder into concrete
/// enum values.
///
/// The tokens immediately before and after the placeholder are compared
/// character by character from both ends; the stable prefix and suffix
/// bracket a numeric run, and one token is synthesised for every integer
/// strictly between the bounds. `["Microphone.1", "..", "Microphone.4"]`
/// inserts `Microphone.2` and `Microphone.3`.
///
/// This is a heuristic: it assumes exactly one varying numeric run. When no
/// stable prefix/suffix split exists, or the varying run is not an integer,
/// expansion fails rather than guessing further.
pub fn guess_enum_range(tokens: &[&str]) -> Result<EnumValueSet, ExtractError> {
    let ellipsis = tokens.iter().position(|t| *t == "..").ok_or_else(|| {
        ExtractError::Internal("guess_enum_range called without an ellipsis token".into())
    })?;
    if ellipsis == 0 || ellipsis + 1 >= tokens.len() {
        return Err(ExtractError::EnumRangeGuess {
            lower: tokens.first().unwrap_or(&"").to_string(),
            upper: tokens.last().unwrap_or(&"").to_string(),
            detail: "ellipsis token has no bound on one side".into(),
        });
    }

    let lower = tokens[ellipsis - 1];
    let upper = tokens[ellipsis + 1];
    let guess_error = |detail: &str| ExtractError::EnumRangeGuess {
        lower: lower.to_string(),
        upper: upper.to_string(),
        detail: detail.into(),
    };

    let (prefix_len, suffix_len) = affix_split(lower, upper)
        .ok_or_else(|| guess_error("no stable prefix/suffix split"))?;

    let low: i64 = lower[prefix_len..lower.len() - suffix_len]
        .parse()
        .map_err(|_| guess_error("varying run in lower bound is not an integer"))?;
    let high: i64 = upper[prefix_len..upper.len() - suffix_len]
        .parse()
        .map_err(|_| guess_error("varying run in upper bound is not an integer"))?;

    let prefix = &lower[..prefix_len];
    let suffix = &lower[lower.len() - suffix_len..];

    let mut values = EnumValueSet::new();
    for token in &tokens[..ellipsis] {
        values.insert(EnumValue::new(*token));
    }
    for i in (low + 1)..high {
        values.insert(EnumValue::new(format!("{prefix}{i}{suffix}")));
    }
    for token in &tokens[ellipsis + 1..] {
        values.insert(EnumValue::new(*token));
    }
    Ok(values)
}

/// Longest common prefix and suffix of the two bound tokens, scanning from
/// each end until the first differing character. The suffix scan stops
/// before it would overlap the prefix. Returns `None` when the tokens never
/// differ inside the comparable region (no varying run to expand).
fn affix_split(lower: &str, upper: &str) -> Option<(usize, usize)> {
    let prefix_len = lower
        .char_indices()
        .zip(upper.char_indices())
        .find(|&((_, lc), (_, uc))| lc != uc)
        .map(|((i, _), _)| i)?;

    // both offsets are char boundaries: every char before the split
    // compared equal, so the byte index is the same in both tokens
    let min_len = lower.len().min(upper.len());
    let mut suffix_len = 0;
    for (lc, uc) in lower.chars().rev().zip(upper.chars().rev()) {
        if prefix_len + suffix_len + lc.len_utf8().max(uc.len_utf8()) > min_len {
            return None;
        }
        if lc != uc {
            return Some((prefix_len, suffix_len));
        }
        suffix_len += lc.len_utf8();
    }
    None
}

/// Classify the accumulated literal text of a status's return value space.
///
/// Recognised notations, in order: the bare `Integer`/`String` words, an
/// `Integer (min..max)` or bare `min..max` range, comma- and
/// slash-delimited enum lists (with the ellipsis expansion when a bare `..`
/// token appears), the `Off/min..max` sentinel form, and finally a single
/// enum value.
pub fn parse_status_value_space(text: &str) -> Result<ValueSpace, ExtractError> {
    if text == "Integer" {
        return Ok(ValueSpace::new(ValueSpaceKind::Int {
            ranges: Vec::new(),
            optional_value: None,
        }));
    }
    if text == "String" {
        return Ok(ValueSpace::new(ValueSpaceKind::String));
    }

    if let Some(captures) = INTEGER_RANGE_RE.captures(text) {
        return Ok(int_space(&captures[1], &captures[2], None));
    }
    if let Some(captures) = RANGE_RE.captures(text) {
        return Ok(int_space(&captures[1], &captures[2], None));
    }

    let comma_split: Vec<&str> = text.split(", ").collect();
    if comma_split.len() > 1 {
        return Ok(enum_space(comma_split.into_iter().map(EnumValue::new).collect()));
    }

    let slash_split: Vec<&str> = text.split('/').collect();
    if slash_split.len() > 1 && !text.contains("..") {
        return Ok(enum_space(slash_split.into_iter().map(EnumValue::new).collect()));
    }
    if slash_split.len() > 1 && slash_split.contains(&"..") {
        return Ok(enum_space(guess_enum_range(&slash_split)?));
    }

    if let Some(captures) = OFF_RANGE_RE.captures(text) {
        return Ok(int_space(&captures[1], &captures[2], Some("Off".into())));
    }

    Ok(enum_space(
        std::iter::once(EnumValue::new(text)).collect(),
    ))
}

fn int_space(min: &str, max: &str, optional_value: Option<String>) -> ValueSpace {
    ValueSpace::new(ValueSpaceKind::Int {
        ranges: vec![IntRange {
            // captures are guaranteed integers by the regex
            minimum: min.parse().unwrap_or(0),
            maximum: max.parse().unwrap_or(0),
            description: None,
            applies_to: Default::default(),
        }],
        optional_value,
    })
}

fn enum_space(values: EnumValueSet) -> ValueSpace {
    ValueSpace::new(ValueSpaceKind::Enum { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &EnumValueSet) -> Vec<&str> {
        set.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn numeric_range_forms() {
        assert_eq!(parse_numeric_range("1..65535"), Some((1, 65535)));
        assert_eq!(parse_numeric_range("(-12..8)"), Some((-12, 8)));
        assert_eq!(parse_numeric_range("(1..10"), None);
        assert_eq!(parse_numeric_range("1..10)"), None);
        assert_eq!(parse_numeric_range("Integer"), None);

        assert_eq!(numeric_range_literals("0..255"), Some(("0", "255")));
        assert_eq!(parse_bare_numeric_range("1..10"), Some((1, 10)));
        assert_eq!(parse_bare_numeric_range("(1..10)"), None);
    }

    #[test]
    fn length_pair() {
        assert_eq!(parse_length_pair("(0,255)"), Some((0, 255)));
        assert_eq!(parse_length_pair("(0,255"), None);
    }

    #[test]
    fn enum_list_splitting() {
        assert_eq!(
            names(&parse_enum_values("Off/On/Auto", "/")),
            ["Off", "On", "Auto"]
        );
        assert_eq!(
            names(&parse_enum_values("A,B,C)", ",")),
            ["A", "B", "C"]
        );
        assert_eq!(names(&parse_enum_values("On//Off", "/")), ["On", "Off"]);
    }

    #[test]
    fn ellipsis_expansion_inserts_intermediate_values() {
        let set = guess_enum_range(&["Input.1", "..", "Input.4"]).unwrap();
        assert_eq!(names(&set), ["Input.1", "Input.2", "Input.3", "Input.4"]);
    }

    #[test]
    fn ellipsis_expansion_keeps_surrounding_tokens() {
        let set = guess_enum_range(&[
            "Microphone.1",
            "..",
            "Microphone.4",
            "Line.1",
            "Line.2",
            "HDMI.2",
        ])
        .unwrap();
        assert_eq!(
            names(&set),
            [
                "Microphone.1",
                "Microphone.2",
                "Microphone.3",
                "Microphone.4",
                "Line.1",
                "Line.2",
                "HDMI.2"
            ]
        );
    }

    #[test]
    fn ellipsis_with_adjacent_bounds_adds_nothing() {
        let set = guess_enum_range(&["Out.1", "..", "Out.2"]).unwrap();
        assert_eq!(names(&set), ["Out.1", "Out.2"]);
    }

    #[test]
    fn ellipsis_without_stable_split_is_fatal() {
        let err = guess_enum_range(&["Same", "..", "Same"]).unwrap_err();
        assert!(matches!(err, ExtractError::EnumRangeGuess { .. }));
    }

    #[test]
    fn ellipsis_with_non_numeric_run_is_fatal() {
        let err = guess_enum_range(&["Mode.A", "..", "Mode.D"]).unwrap_err();
        assert!(matches!(err, ExtractError::EnumRangeGuess { .. }));
    }

    #[test]
    fn ellipsis_with_multibyte_bounds_is_fatal() {
        // the differing run starts inside a multi-byte character; the
        // split must land on char boundaries and fail cleanly
        let err = guess_enum_range(&["Ä1", "..", "Ö1"]).unwrap_err();
        assert!(matches!(err, ExtractError::EnumRangeGuess { .. }));
    }

    #[test]
    fn synthetic_token_grid_round_trips() {
        // Hardening for the heuristic: single varying run, assorted
        // prefixes/suffixes and widths.
        for (lower, upper, expected_len) in [
            ("A.1", "A.9", 9),
            ("Port1X", "Port4X", 4),
            ("1", "5", 5),
        ] {
            let set = guess_enum_range(&[lower, "..", upper]).unwrap();
            assert_eq!(set.len(), expected_len, "{lower}..{upper}");
            assert!(set.contains(lower));
            assert!(set.contains(upper));
        }
    }

    #[test]
    fn status_space_plain_words() {
        let vs = parse_status_value_space("Integer").unwrap();
        assert!(matches!(vs.kind, ValueSpaceKind::Int { ref ranges, .. } if ranges.is_empty()));
        let vs = parse_status_value_space("String").unwrap();
        assert!(matches!(vs.kind, ValueSpaceKind::String));
    }

    #[test]
    fn status_space_integer_ranges() {
        let vs = parse_status_value_space("1..65535").unwrap();
        match vs.kind {
            ValueSpaceKind::Int { ranges, .. } => {
                assert_eq!(ranges.len(), 1);
                assert_eq!((ranges[0].minimum, ranges[0].maximum), (1, 65535));
            }
            other => panic!("expected Int, got {other:?}"),
        }

        let vs = parse_status_value_space("Integer (-30..30)").unwrap();
        match vs.kind {
            ValueSpaceKind::Int { ranges, .. } => {
                assert_eq!((ranges[0].minimum, ranges[0].maximum), (-30, 30));
            }
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn status_space_enum_lists() {
        let vs = parse_status_value_space("Off/On/Auto").unwrap();
        match vs.kind {
            ValueSpaceKind::Enum { values } => assert_eq!(names(&values), ["Off", "On", "Auto"]),
            other => panic!("expected Enum, got {other:?}"),
        }

        let vs = parse_status_value_space("Standby, Off, On").unwrap();
        match vs.kind {
            ValueSpaceKind::Enum { values } => {
                assert_eq!(names(&values), ["Standby", "Off", "On"])
            }
            other => panic!("expected Enum, got {other:?}"),
        }
    }

    #[test]
    fn status_space_ellipsis_list_expands() {
        let vs = parse_status_value_space("Input.1/../Input.3").unwrap();
        match vs.kind {
            ValueSpaceKind::Enum { values } => {
                assert_eq!(names(&values), ["Input.1", "Input.2", "Input.3"])
            }
            other => panic!("expected Enum, got {other:?}"),
        }
    }

    #[test]
    fn status_space_off_sentinel() {
        let vs = parse_status_value_space("Off/1..4094").unwrap();
        match vs.kind {
            ValueSpaceKind::Int {
                ranges,
                optional_value,
            } => {
                assert_eq!(optional_value.as_deref(), Some("Off"));
                assert_eq!((ranges[0].minimum, ranges[0].maximum), (1, 4094));
            }
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn status_space_single_value_fallback() {
        let vs = parse_status_value_space("NTP").unwrap();
        match vs.kind {
            ValueSpaceKind::Enum { values } => assert_eq!(names(&values), ["NTP"]),
            other => panic!("expected Enum, got {other:?}"),
        }
    }
}
