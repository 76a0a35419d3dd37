//! # pdf2xapi
//!
//! Extract a machine-readable xAPI schema from a typeset device
//! reference-manual PDF.
//!
//! ## Why this crate?
//!
//! The vendor's collaboration devices speak a rich remote-control protocol
//! (xAPI: configurations, commands, statuses, events), but its only
//! complete description is a visually-typeset PDF with no semantic markup.
//! The grammar signal that survives typesetting is typography: font family,
//! point size, colour, and baseline position of each glyph run. This crate
//! parses that typography deterministically — character styles are the
//! tokens — and refuses to guess: any layout it does not recognise is a
//! structured fatal error rather than a silently wrong schema.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Outline  bound each section's pages from PDF bookmarks
//!  ├─ 3. Words    margin-filter glyphs, two-column reading order
//!  ├─ 4. Style    classify each word from font / size / colour
//!  ├─ 5. Parse    per-section state machine over styled words
//!  └─ 6. Model    ExtractedDocumentation (+ events from XML schema)
//! ```
//!
//! ## Quick Start
//!
//! Requires the `pdfium` feature:
//!
//! ```rust,ignore
//! use pdf2xapi::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .events_xml("schema/event.xml")
//!         .build()?;
//!     let schema = extract("api-reference-guide.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&schema)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `pdf2xapi` binary (clap + anyhow + tracing-subscriber) |
//! | `pdfium` | off     | Bundled pdfium-backed [`provider::GlyphProvider`] |
//!
//! Without `pdfium`, supply your own [`provider::GlyphProvider`] to
//! [`extract_with_provider`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, ReferenceEnumCheck, SectionTitles};
pub use error::ExtractError;
pub use extract::{extract_with_provider, write_json};
#[cfg(feature = "pdfium")]
pub use extract::{extract, extract_sync, extract_to_file};
pub use model::ExtractedDocumentation;
