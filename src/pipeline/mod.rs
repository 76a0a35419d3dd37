//! Pipeline stages for schema extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap the
//! PDF backend without touching the parsing logic.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ outline ──▶ words ──▶ style ──▶ parser ──▶ model
//! (URL/path) (page     (reading  (token    (state     (schema
//!             ranges)   order)    type)     machine)    records)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local file
//! 2. [`outline`] — bound each schema section's page range from bookmarks
//! 3. [`words`]   — margin-filter, correct, and segment glyphs into the
//!    two-column reading-order word stream
//! 4. [`style`]   — classify each word's character style from typography
//! 5. [`parser`]  — the per-section state machine producing schema records;
//!    [`text`] joins prose words and [`values`] parses value-space literals
//!    on its behalf

pub mod input;
pub mod outline;
pub mod parser;
pub mod style;
pub mod text;
pub mod values;
pub mod words;
