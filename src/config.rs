//! Configuration types for schema extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across tasks and to diff two runs to understand
//! why their outputs differ.

use crate::error::ExtractError;
use std::path::PathBuf;

/// The top-level outline titles that bound each schema section.
///
/// Sections are chained: the configurations section runs from its own
/// bookmark to the commands bookmark, commands to statuses, and statuses to
/// the `end` bookmark (the first chapter after the schema material).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTitles {
    pub configurations: String,
    pub commands: String,
    pub statuses: String,
    pub end: String,
}

impl Default for SectionTitles {
    fn default() -> Self {
        Self {
            configurations: "xConfiguration commands".to_string(),
            commands: "xCommand commands".to_string(),
            statuses: "xStatus commands".to_string(),
            end: "Command overview".to_string(),
        }
    }
}

/// A caller-supplied expectation about an enumeration the manual documents.
///
/// Some enumerations have a canonical value set known independently of the
/// manual (for instance from firmware release notes). Registering a check
/// makes a disagreement between that set and the freshly parsed schema a
/// fatal [`ExtractError::ReferenceDataMismatch`], which usually means the
/// reference table needs a human update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEnumCheck {
    /// Space-joined method path, e.g. `"xStatus Standby State"`.
    pub path: String,
    /// The expected enumeration values, order-insensitive.
    pub values: Vec<String>,
}

impl ReferenceEnumCheck {
    pub fn new(path: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Configuration for a schema extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2xapi::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .events_xml("schema/event.xml")
///     .download_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Outline titles bounding the three PDF sections. Defaults match the
    /// published RoomOS reference guides.
    pub section_titles: SectionTitles,

    /// Path to the event schema XML file. Events are absent from the output
    /// when this is `None`; the manual itself does not document them in a
    /// parseable form.
    pub events_xml: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Enumerations to verify against independently known value sets after
    /// parsing. Default: empty.
    pub reference_checks: Vec<ReferenceEnumCheck>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            section_titles: SectionTitles::default(),
            events_xml: None,
            download_timeout_secs: 120,
            reference_checks: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn section_titles(mut self, titles: SectionTitles) -> Self {
        self.config.section_titles = titles;
        self
    }

    pub fn events_xml(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.events_xml = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn reference_check(mut self, check: ReferenceEnumCheck) -> Self {
        self.config.reference_checks.push(check);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let titles = &self.config.section_titles;
        let all = [
            &titles.configurations,
            &titles.commands,
            &titles.statuses,
            &titles.end,
        ];
        if all.iter().any(|t| t.trim().is_empty()) {
            return Err(ExtractError::InvalidConfig(
                "Section titles must not be empty".into(),
            ));
        }
        for (i, a) in all.iter().enumerate() {
            if all[i + 1..].contains(a) {
                return Err(ExtractError::InvalidConfig(format!(
                    "Section titles must be distinct, {a:?} repeats"
                )));
            }
        }
        if self.config.download_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "Download timeout must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_titles_match_published_guides() {
        let config = ExtractionConfig::default();
        assert_eq!(config.section_titles.configurations, "xConfiguration commands");
        assert_eq!(config.section_titles.end, "Command overview");
        assert_eq!(config.download_timeout_secs, 120);
        assert!(config.events_xml.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ExtractionConfig::builder()
            .events_xml("/tmp/event.xml")
            .download_timeout_secs(30)
            .reference_check(ReferenceEnumCheck::new(
                "xStatus Standby State",
                ["Standby", "EnteringStandby", "Halfwake", "Off"],
            ))
            .build()
            .unwrap();
        assert_eq!(config.events_xml.as_deref(), Some(std::path::Path::new("/tmp/event.xml")));
        assert_eq!(config.download_timeout_secs, 30);
        assert_eq!(config.reference_checks.len(), 1);
    }

    #[test]
    fn empty_section_title_is_rejected() {
        let err = ExtractionConfig::builder()
            .section_titles(SectionTitles {
                configurations: "  ".into(),
                ..SectionTitles::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn duplicate_section_titles_are_rejected() {
        let err = ExtractionConfig::builder()
            .section_titles(SectionTitles {
                end: "xStatus commands".into(),
                ..SectionTitles::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ExtractionConfig::builder()
            .download_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }
}
