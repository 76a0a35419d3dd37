//! End-to-end extraction against a synthetic manual.
//!
//! These tests typeset fake manual pages glyph by glyph, using the vendor's
//! real fonts, point sizes, and colours, and run the whole pipeline through
//! [`extract_with_provider`]. No PDF backend or file is involved, so the
//! tests run everywhere, including CI without pdfium.

use pdf2xapi::model::{Parameter, Product, UserRole, ValueSpaceKind};
use pdf2xapi::provider::{Bookmark, Glyph, GlyphProvider, PageGlyphs, Point, Rgb};
use pdf2xapi::{extract_with_provider, ExtractError, ExtractionConfig, ReferenceEnumCheck};
use std::sync::Arc;

const PAGE_W: f64 = 612.0;
const PAGE_H: f64 = 792.0;

// Words must stay inside the left reading column: glyphs to the right of
// the split are reordered into the second column and break words apart.
const COLUMN_SPLIT: f64 = (PAGE_W - 45.0) / 2.0 + 45.0;

const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
const TEAL: Rgb = Rgb::new(0.035, 0.376, 0.439);

// ── Typesetting helpers ──────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct Face {
    font: &'static str,
    size: f64,
    color: Rgb,
}

const FAMILY: Face = Face { font: "CiscoSansTT", size: 16.0, color: BLACK };
const METHOD: Face = Face { font: "CiscoSansTT", size: 10.0, color: BLACK };
const BODY: Face = Face { font: "CiscoSansTT", size: 9.0, color: BLACK };
const PRODUCT: Face = Face { font: "CiscoSansTT-Oblique", size: 8.0, color: TEAL };
const USAGE_HEADING: Face = Face { font: "CiscoSansTT", size: 8.0, color: BLACK };
const USAGE: Face = Face { font: "CourierNewPSMT", size: 8.8, color: BLACK };
const PARAM_NAME: Face = Face { font: "CourierNewPS-ItalicMT", size: 8.8, color: BLACK };
const VALUESPACE: Face = Face { font: "CiscoSansTTLight-Oblique", size: 8.0, color: BLACK };
const TERM: Face = Face { font: "CiscoSansTT-Oblique", size: 8.0, color: BLACK };

/// A page being typeset top to bottom in the left reading column.
struct PageBuilder {
    number: usize,
    glyphs: Vec<Glyph>,
    y: f64,
}

impl PageBuilder {
    fn new(number: usize) -> Self {
        // first baseline comfortably below the 72 pt top margin
        PageBuilder { number, glyphs: Vec::new(), y: 700.0 }
    }

    /// Typeset one line of words, all in the same face, advancing the
    /// baseline by `leading` afterwards.
    fn line(self, face: Face, words: &[&str], leading: f64) -> Self {
        self.row(&[(face, words)], leading)
    }

    /// Typeset one line mixing faces, e.g. a monospace usage template
    /// followed by an italic parameter name.
    fn row(mut self, segments: &[(Face, &[&str])], leading: f64) -> Self {
        let mut x = 50.0;
        for (face, words) in segments {
            for word in *words {
                for c in word.chars() {
                    self.glyphs.push(Glyph {
                        text: c.to_string(),
                        baseline_start: Point::new(x, self.y),
                        baseline_end: Point::new(x + 5.0, self.y),
                        point_size: face.size,
                        font_name: face.font.to_string(),
                        color: face.color,
                    });
                    x += 5.0;
                }
                // inter-word gap wider than the segmentation limit
                x += 10.0;
            }
        }
        assert!(
            x - 10.0 < COLUMN_SPLIT,
            "row overflows the left reading column at x = {}",
            x - 10.0
        );
        self.y -= leading;
        self
    }

    fn build(self) -> PageGlyphs {
        PageGlyphs {
            number: self.number,
            width: PAGE_W,
            height: PAGE_H,
            glyphs: self.glyphs,
        }
    }
}

struct FakeManual {
    pages: Vec<PageGlyphs>,
    bookmarks: Vec<Bookmark>,
}

impl GlyphProvider for FakeManual {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, number: usize) -> Result<PageGlyphs, ExtractError> {
        self.pages
            .get(number - 1)
            .cloned()
            .ok_or(ExtractError::PageOutOfRange {
                page: number,
                total: self.pages.len(),
            })
    }

    fn bookmarks(&self) -> Result<Vec<Bookmark>, ExtractError> {
        Ok(self.bookmarks.clone())
    }
}

fn bookmark(title: &str, page: usize) -> Bookmark {
    Bookmark {
        title: title.to_string(),
        page_number: page,
        level: 0,
    }
}

/// A five-page manual: preamble, one configuration, one command, one
/// status, and a trailing overview chapter.
fn fake_manual() -> FakeManual {
    let preamble = PageBuilder::new(1)
        .line(BODY, &["About", "this", "guide"], 12.0)
        .build();

    let configurations = PageBuilder::new(2)
        .line(FAMILY, &["Audio", "configuration"], 24.0)
        .line(METHOD, &["xConfiguration", "Audio", "DefaultVolume"], 18.0)
        .line(PRODUCT, &["Applies", "to:", "RoomKit"], 12.0)
        .line(BODY, &["Requires", "user", "role:", "Admin,", "Integrator"], 18.0)
        .line(BODY, &["Set", "the", "default", "volume."], 18.0)
        .line(USAGE_HEADING, &["USAGE:"], 12.0)
        .row(
            &[
                (USAGE, &["xConfiguration", "Audio", "DefaultVolume:"][..]),
                (PARAM_NAME, &["DefaultVolume"][..]),
            ],
            12.0,
        )
        .line(BODY, &["where"], 12.0)
        .line(PARAM_NAME, &["DefaultVolume:"], 12.0)
        .line(VALUESPACE, &["Integer", "(0..100)"], 18.0)
        .line(BODY, &["Default", "value:", "50"], 12.0)
        .build();

    let commands = PageBuilder::new(3)
        .line(METHOD, &["xCommand", "Audio", "Volume", "Set"], 18.0)
        .line(PRODUCT, &["Applies", "to:", "RoomKit"], 12.0)
        .line(BODY, &["Requires", "user", "role:", "Admin"], 18.0)
        .line(BODY, &["Set", "the", "volume", "directly."], 18.0)
        .line(USAGE_HEADING, &["USAGE:"], 12.0)
        .row(
            &[
                (USAGE, &["xCommand", "Audio", "Volume", "Set", "Level:"][..]),
                (PARAM_NAME, &["Level"][..]),
            ],
            12.0,
        )
        .line(BODY, &["where"], 12.0)
        .line(PARAM_NAME, &["Level:"], 12.0)
        .line(VALUESPACE, &["Integer", "(0..100)"], 18.0)
        .build();

    let statuses = PageBuilder::new(4)
        .line(METHOD, &["xStatus", "Standby", "State"], 18.0)
        .line(PRODUCT, &["Applies", "to:", "RoomKit"], 12.0)
        .line(BODY, &["Requires", "user", "role:", "Admin"], 18.0)
        .line(BODY, &["Shows", "the", "standby", "state."], 18.0)
        .line(BODY, &["Value", "space", "of", "the", "result", "returned:"], 12.0)
        .line(VALUESPACE, &["Standby,", "EnteringStandby,", "Halfwake,", "Off"], 18.0)
        .line(BODY, &["Example:"], 12.0)
        .line(USAGE, &["xStatus", "Standby", "State"], 12.0)
        .build();

    let overview = PageBuilder::new(5)
        .line(BODY, &["Command", "overview"], 12.0)
        .build();

    FakeManual {
        pages: vec![preamble, configurations, commands, statuses, overview],
        bookmarks: vec![
            bookmark("Introduction", 1),
            bookmark("xConfiguration commands", 2),
            bookmark("xCommand commands", 3),
            bookmark("xStatus commands", 4),
            bookmark("Command overview", 5),
        ],
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn extracts_all_three_sections() {
    let config = ExtractionConfig::default();
    let schema = extract_with_provider(Arc::new(fake_manual()), &config)
        .await
        .expect("extraction should succeed");

    assert_eq!(schema.configurations.len(), 1);
    assert_eq!(schema.commands.len(), 1);
    assert_eq!(schema.statuses.len(), 1);
    assert!(schema.events.is_empty());

    let configuration = &schema.configurations[0];
    assert_eq!(
        configuration.header.path,
        ["xConfiguration", "Audio", "DefaultVolume"]
    );
    assert_eq!(
        configuration.header.applies_to.iter().copied().collect::<Vec<_>>(),
        [Product::RoomKit]
    );
    assert_eq!(
        configuration
            .header
            .requires_user_role
            .iter()
            .copied()
            .collect::<Vec<_>>(),
        [UserRole::Admin, UserRole::Integrator]
    );
    assert_eq!(configuration.header.description, "Set the default volume.");
    match &configuration.parameters[0] {
        Parameter::Int(p) => {
            assert_eq!(p.meta.name, "DefaultVolume");
            assert!(p.meta.required);
            assert_eq!(p.meta.default_value.as_deref(), Some("50"));
            assert_eq!((p.ranges[0].minimum, p.ranges[0].maximum), (0, 100));
        }
        other => panic!("expected Int parameter, got {other:?}"),
    }

    let command = &schema.commands[0];
    assert_eq!(command.header.path, ["xCommand", "Audio", "Volume", "Set"]);
    match &command.parameters[0] {
        Parameter::Int(p) => {
            assert_eq!(p.meta.name, "Level");
            assert!(p.meta.required);
        }
        other => panic!("expected Int parameter, got {other:?}"),
    }

    let status = &schema.statuses[0];
    assert_eq!(status.header.path, ["xStatus", "Standby", "State"]);
    assert_eq!(status.header.description, "Shows the standby state.");
    match &status.value_space.as_ref().expect("status value space").kind {
        ValueSpaceKind::Enum { values } => {
            let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
            assert_eq!(names, ["Standby", "EnteringStandby", "Halfwake", "Off"]);
        }
        other => panic!("expected Enum value space, got {other:?}"),
    }
}

#[tokio::test]
async fn events_xml_is_merged_into_the_schema() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("event.xml");
    std::fs::write(
        &xml_path,
        r#"<EventSchema>
             <Standby>
               <SecondsToStandby event="True" access="public-api" role="Admin;User">
                 <SecondsToStandby type="int" onlyTextNode="true"/>
               </SecondsToStandby>
             </Standby>
             <Diagnostics event="True" access="internal"/>
           </EventSchema>"#,
    )
    .unwrap();

    let config = ExtractionConfig::builder()
        .events_xml(&xml_path)
        .build()
        .unwrap();
    let schema = extract_with_provider(Arc::new(fake_manual()), &config)
        .await
        .expect("extraction should succeed");

    assert_eq!(schema.events.len(), 1);
    assert_eq!(
        schema.events[0].path,
        ["xEvent", "Standby", "SecondsToStandby"]
    );
}

#[tokio::test]
async fn reference_check_passes_against_parsed_enum() {
    let config = ExtractionConfig::builder()
        .reference_check(ReferenceEnumCheck::new(
            "xStatus Standby State",
            ["Off", "Halfwake", "Standby", "EnteringStandby"],
        ))
        .build()
        .unwrap();
    extract_with_provider(Arc::new(fake_manual()), &config)
        .await
        .expect("matching reference data should pass");
}

#[tokio::test]
async fn stale_reference_check_is_fatal() {
    let config = ExtractionConfig::builder()
        .reference_check(ReferenceEnumCheck::new(
            "xStatus Standby State",
            ["Off", "Halfwake", "Standby", "EnteringStandby", "DeepSleep"],
        ))
        .build()
        .unwrap();
    let err = extract_with_provider(Arc::new(fake_manual()), &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::ReferenceDataMismatch { detail, .. } if detail.contains("DeepSleep")
    ));
}

#[tokio::test]
async fn missing_section_bookmark_is_fatal() {
    let mut manual = fake_manual();
    manual.bookmarks.retain(|b| b.title != "xCommand commands");

    let err = extract_with_provider(Arc::new(manual), &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::MissingSectionBookmark { title } if title == "xCommand commands"
    ));
}
