//! Error types for the pdf2xapi library.
//!
//! There is deliberately no recoverable/fatal split: extraction is a one-shot
//! offline build step, and a partially-correct schema would silently ship
//! commands with missing parameters. Every variant of [`ExtractError`] aborts
//! the run so a human can fix the input PDF or the parser.
//!
//! Parse failures carry full positional context (word text, page number,
//! parser state, character style) so they can be debugged against the source
//! PDF without re-running under a debugger.

use crate::pipeline::parser::ParserState;
use crate::pipeline::style::CharacterStyle;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2xapi library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Parse errors ──────────────────────────────────────────────────────
    /// A (character style, parser state) combination outside the transition
    /// table. Aborts the current section's parse.
    #[error(
        "failed to parse page {page}: {detail} \
         (word: {word:?}, character style: {style:?}, parser state: {state:?})"
    )]
    StructuralParse {
        word: String,
        page: usize,
        state: ParserState,
        style: CharacterStyle,
        detail: String,
    },

    /// A section-boundary bookmark is absent, so the page scope of a schema
    /// category cannot be determined.
    #[error("bookmark {title:?} not found among top-level PDF bookmarks")]
    MissingSectionBookmark { title: String },

    /// Ellipsis-range expansion could not find a consistent prefix/suffix
    /// split between the bound tokens.
    #[error("cannot expand ellipsis range between {lower:?} and {upper:?}: {detail}")]
    EnumRangeGuess {
        lower: String,
        upper: String,
        detail: String,
    },

    /// A role token did not match the closed [`crate::model::UserRole`]
    /// enumeration. Fatal so applicability data is never silently dropped.
    #[error("unrecognized user role {token:?} on page {page}")]
    UnrecognizedRole { token: String, page: usize },

    /// A product token did not match the closed [`crate::model::Product`]
    /// enumeration.
    #[error("unrecognized product {token:?} on page {page}")]
    UnrecognizedProduct { token: String, page: usize },

    /// A caller-supplied reference table disagrees with freshly parsed data.
    /// The reference table itself needs a human update.
    #[error("reference data mismatch for {path:?}: {detail}")]
    ReferenceDataMismatch { path: String, detail: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("file is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The glyph provider could not open or read the document.
    #[error("glyph provider error: {0}")]
    Provider(String),

    /// Requested page index exceeds the document page count.
    #[error("page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Event schema errors ───────────────────────────────────────────────
    /// The event schema XML could not be read or parsed.
    #[error("event schema XML '{path}': {detail}")]
    EventXml { path: PathBuf, detail: String },

    // ── I/O / config errors ───────────────────────────────────────────────
    /// Could not write the output file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_parse_display_carries_full_context() {
        let e = ExtractError::StructuralParse {
            word: "Bogus".into(),
            page: 42,
            state: ParserState::Valuespace,
            style: CharacterStyle::Body,
            detail: "unexpected state for character style".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 42"), "got: {msg}");
        assert!(msg.contains("\"Bogus\""), "got: {msg}");
        assert!(msg.contains("Valuespace"), "got: {msg}");
        assert!(msg.contains("Body"), "got: {msg}");
    }

    #[test]
    fn missing_bookmark_display() {
        let e = ExtractError::MissingSectionBookmark {
            title: "xStatus commands".into(),
        };
        assert!(e.to_string().contains("xStatus commands"));
    }

    #[test]
    fn enum_range_guess_display() {
        let e = ExtractError::EnumRangeGuess {
            lower: "Line.1".into(),
            upper: "Mic.4".into(),
            detail: "no stable prefix/suffix split".into(),
        };
        assert!(e.to_string().contains("Line.1"));
        assert!(e.to_string().contains("Mic.4"));
    }
}
