//! Extraction entry points.
//!
//! The PDF pass is CPU-bound and runs inside `spawn_blocking`; the three
//! schema sections are parsed sequentially against the single document
//! handle because the glyph backend does not support concurrent page
//! access. The event schema XML, when configured, is parsed concurrently
//! on its own blocking task and joined at the end.

use crate::config::{ExtractionConfig, ReferenceEnumCheck, SectionTitles};
use crate::error::ExtractError;
use crate::events;
use crate::model::{EnumValueSet, ExtractedDocumentation, Parameter, ValueSpaceKind};
use crate::pipeline::parser::{SectionKind, SectionParser, SectionRecords};
use crate::pipeline::{input, outline, words};
use crate::provider::GlyphProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Extract the schema from a PDF file or URL using the bundled pdfium
/// backend.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path or HTTP/HTTPS URL to the reference manual
/// * `config` — Extraction configuration
///
/// # Errors
/// Every error is fatal; a partially parsed schema is never returned.
#[cfg(feature = "pdfium")]
pub async fn extract(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractedDocumentation, ExtractError> {
    let input = input.as_ref();
    info!("Starting extraction: {}", input);

    // `resolved` owns any downloaded temp file; it must outlive the pass.
    let resolved = input::resolve_input(input, config.download_timeout_secs).await?;
    let provider = crate::provider::pdfium::PdfiumGlyphProvider::open(resolved.path(), None)?;
    extract_with_provider(Arc::new(provider), config).await
}

/// Extract the schema through any [`GlyphProvider`] implementation.
///
/// Useful for tests and for embedders with their own PDF backend.
pub async fn extract_with_provider<P>(
    provider: Arc<P>,
    config: &ExtractionConfig,
) -> Result<ExtractedDocumentation, ExtractError>
where
    P: GlyphProvider + Send + Sync + 'static,
{
    let titles = config.section_titles.clone();
    let pdf_pass =
        tokio::task::spawn_blocking(move || parse_document(provider.as_ref(), &titles));

    let events_pass = config.events_xml.clone().map(|path| {
        tokio::task::spawn_blocking(move || events::read_events(&path))
    });

    let mut documentation = pdf_pass
        .await
        .map_err(|e| ExtractError::Internal(format!("extraction task panicked: {e}")))??;

    if let Some(handle) = events_pass {
        documentation.events = handle
            .await
            .map_err(|e| ExtractError::Internal(format!("event reader task panicked: {e}")))??;
    }

    verify_reference_checks(&documentation, &config.reference_checks)?;
    Ok(documentation)
}

/// Extract the schema and write it as JSON directly to a file.
#[cfg(feature = "pdfium")]
pub async fn extract_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
    pretty: bool,
) -> Result<ExtractedDocumentation, ExtractError> {
    let documentation = extract(input, config).await?;
    write_json(&documentation, output_path.as_ref(), pretty).await?;
    Ok(documentation)
}

/// Serialise the schema to a JSON file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_json(
    documentation: &ExtractedDocumentation,
    path: &Path,
    pretty: bool,
) -> Result<(), ExtractError> {
    let json = if pretty {
        serde_json::to_string_pretty(documentation)
    } else {
        serde_json::to_string(documentation)
    }
    .map_err(|e| ExtractError::Internal(format!("JSON serialisation failed: {e}")))?;

    let write_failed = |e: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json).await.map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_failed)?;
    Ok(())
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
#[cfg(feature = "pdfium")]
pub fn extract_sync(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractedDocumentation, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Run the three section parses against one document handle.
fn parse_document<P: GlyphProvider + ?Sized>(
    provider: &P,
    titles: &SectionTitles,
) -> Result<ExtractedDocumentation, ExtractError> {
    let bookmarks = provider.bookmarks()?;

    let configurations = {
        let pages =
            outline::pages_for_section(&bookmarks, &titles.configurations, &titles.commands)?;
        let stream = words::words_on_pages(provider, pages)?;
        let SectionRecords::Configurations(records) =
            SectionParser::parse(SectionKind::Configurations, &stream)?
        else {
            return Err(ExtractError::Internal(
                "section parser returned mismatched record kind".into(),
            ));
        };
        records
    };
    info!("Parsed {} xConfigurations from PDF", configurations.len());

    let commands = {
        let pages = outline::pages_for_section(&bookmarks, &titles.commands, &titles.statuses)?;
        let stream = words::words_on_pages(provider, pages)?;
        let SectionRecords::Commands(records) =
            SectionParser::parse(SectionKind::Commands, &stream)?
        else {
            return Err(ExtractError::Internal(
                "section parser returned mismatched record kind".into(),
            ));
        };
        records
    };
    info!("Parsed {} xCommands from PDF", commands.len());

    let statuses = {
        let pages = outline::pages_for_section(&bookmarks, &titles.statuses, &titles.end)?;
        let stream = words::words_on_pages(provider, pages)?;
        let SectionRecords::Statuses(records) =
            SectionParser::parse(SectionKind::Statuses, &stream)?
        else {
            return Err(ExtractError::Internal(
                "section parser returned mismatched record kind".into(),
            ));
        };
        records
    };
    info!("Parsed {} xStatuses from PDF", statuses.len());

    Ok(ExtractedDocumentation {
        configurations,
        commands,
        statuses,
        events: Vec::new(),
    })
}

// ── Reference verification ───────────────────────────────────────────────

/// Compare parsed enumerations against independently known value sets.
fn verify_reference_checks(
    documentation: &ExtractedDocumentation,
    checks: &[ReferenceEnumCheck],
) -> Result<(), ExtractError> {
    for check in checks {
        let values = enum_values_at(documentation, &check.path).ok_or_else(|| {
            ExtractError::ReferenceDataMismatch {
                path: check.path.clone(),
                detail: "no enumeration was parsed at this path".into(),
            }
        })?;

        let missing: Vec<&str> = check
            .values
            .iter()
            .filter(|expected| !values.iter().any(|v| v.name.eq_ignore_ascii_case(expected)))
            .map(String::as_str)
            .collect();
        let unexpected: Vec<&str> = values
            .iter()
            .filter(|v| !check.values.iter().any(|e| e.eq_ignore_ascii_case(&v.name)))
            .map(|v| v.name.as_str())
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ExtractError::ReferenceDataMismatch {
                path: check.path.clone(),
                detail: format!(
                    "missing values: [{}]; unexpected values: [{}]",
                    missing.join(", "),
                    unexpected.join(", ")
                ),
            });
        }
    }
    Ok(())
}

/// Locate the enumeration a reference check names. A status path resolves
/// to its enum value space; a configuration or command path resolves to
/// the first enum parameter of the matching method.
fn enum_values_at<'a>(
    documentation: &'a ExtractedDocumentation,
    path: &str,
) -> Option<&'a EnumValueSet> {
    for status in &documentation.statuses {
        if status.header.path.join(" ") == path {
            if let Some(space) = &status.value_space {
                if let ValueSpaceKind::Enum { values } = &space.kind {
                    return Some(values);
                }
            }
        }
    }
    for configuration in &documentation.configurations {
        if configuration.header.path.join(" ") == path {
            return first_enum(&configuration.parameters);
        }
    }
    for command in &documentation.commands {
        if command.header.path.join(" ") == path {
            return first_enum(&command.parameters);
        }
    }
    None
}

fn first_enum(parameters: &[Parameter]) -> Option<&EnumValueSet> {
    parameters.iter().find_map(|p| match p {
        Parameter::Enum(e) => Some(&e.values),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumValue, MethodHeader, Status, ValueSpace};

    fn status_with_enum(path: &[&str], values: &[&str]) -> Status {
        Status {
            header: MethodHeader {
                path: path.iter().map(|s| s.to_string()).collect(),
                ..MethodHeader::default()
            },
            array_index_parameters: Vec::new(),
            value_space: Some(ValueSpace::new(ValueSpaceKind::Enum {
                values: values.iter().map(|v| EnumValue::new(v.to_string())).collect(),
            })),
        }
    }

    fn doc_with(status: Status) -> ExtractedDocumentation {
        ExtractedDocumentation {
            statuses: vec![status],
            ..ExtractedDocumentation::default()
        }
    }

    #[test]
    fn matching_reference_check_passes() {
        let doc = doc_with(status_with_enum(
            &["xStatus", "Standby", "State"],
            &["Standby", "EnteringStandby", "Halfwake", "Off"],
        ));
        let checks = [ReferenceEnumCheck::new(
            "xStatus Standby State",
            ["Off", "Halfwake", "Standby", "EnteringStandby"],
        )];
        verify_reference_checks(&doc, &checks).unwrap();
    }

    #[test]
    fn missing_value_is_a_mismatch() {
        let doc = doc_with(status_with_enum(
            &["xStatus", "Standby", "State"],
            &["Standby", "Off"],
        ));
        let checks = [ReferenceEnumCheck::new(
            "xStatus Standby State",
            ["Standby", "Off", "Halfwake"],
        )];
        let err = verify_reference_checks(&doc, &checks).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::ReferenceDataMismatch { detail, .. } if detail.contains("Halfwake")
        ));
    }

    #[test]
    fn unexpected_value_is_a_mismatch() {
        let doc = doc_with(status_with_enum(
            &["xStatus", "Standby", "State"],
            &["Standby", "Off", "Sleeping"],
        ));
        let checks = [ReferenceEnumCheck::new("xStatus Standby State", ["Standby", "Off"])];
        let err = verify_reference_checks(&doc, &checks).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::ReferenceDataMismatch { detail, .. } if detail.contains("Sleeping")
        ));
    }

    #[test]
    fn unresolved_path_is_a_mismatch() {
        let doc = ExtractedDocumentation::default();
        let checks = [ReferenceEnumCheck::new("xStatus Standby State", ["Off"])];
        let err = verify_reference_checks(&doc, &checks).unwrap_err();
        assert!(matches!(err, ExtractError::ReferenceDataMismatch { .. }));
    }
}
