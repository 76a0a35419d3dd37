//! Section discovery from the document outline.
//!
//! The manual has no machine-readable table of contents beyond its PDF
//! bookmarks, so each schema category's page scope is bounded by two
//! top-level outline entries: the one named for the category and the one
//! that starts the next category. A missing boundary is fatal — without it
//! there is no way to know which pages are in scope.

use crate::error::ExtractError;
use crate::provider::Bookmark;
use std::ops::Range;

/// Resolve the half-open 1-based page range between the top-level bookmark
/// titled `section_title` and the one titled `next_section_title`.
pub fn pages_for_section(
    bookmarks: &[Bookmark],
    section_title: &str,
    next_section_title: &str,
) -> Result<Range<usize>, ExtractError> {
    let mut top_level: Vec<&Bookmark> = bookmarks.iter().filter(|b| b.level == 0).collect();
    top_level.sort_by_key(|b| b.page_number);

    let start = top_level
        .iter()
        .position(|b| b.title == section_title)
        .ok_or_else(|| ExtractError::MissingSectionBookmark {
            title: section_title.to_string(),
        })?;
    let end = top_level[start..]
        .iter()
        .position(|b| b.title == next_section_title)
        .map(|offset| start + offset)
        .ok_or_else(|| ExtractError::MissingSectionBookmark {
            title: next_section_title.to_string(),
        })?;

    Ok(top_level[start].page_number..top_level[end].page_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(title: &str, page: usize, level: usize) -> Bookmark {
        Bookmark {
            title: title.into(),
            page_number: page,
            level,
        }
    }

    fn outline() -> Vec<Bookmark> {
        vec![
            bookmark("Introduction", 1, 0),
            bookmark("xConfiguration commands", 20, 0),
            bookmark("Audio configuration", 21, 1),
            bookmark("xCommand commands", 180, 0),
            bookmark("xStatus commands", 420, 0),
            bookmark("Command overview", 700, 0),
        ]
    }

    #[test]
    fn finds_range_between_top_level_entries() {
        let range =
            pages_for_section(&outline(), "xConfiguration commands", "xCommand commands").unwrap();
        assert_eq!(range, 20..180);
    }

    #[test]
    fn nested_bookmarks_do_not_bound_sections() {
        // "Audio configuration" at level 1 sits inside the range but must
        // not terminate it.
        let range = pages_for_section(&outline(), "xStatus commands", "Command overview").unwrap();
        assert_eq!(range, 420..700);
    }

    #[test]
    fn missing_start_bookmark_is_fatal() {
        let err = pages_for_section(&outline(), "xEvent commands", "Command overview").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingSectionBookmark { title } if title == "xEvent commands"
        ));
    }

    #[test]
    fn missing_end_bookmark_is_fatal() {
        let err = pages_for_section(&outline(), "xStatus commands", "Appendix").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingSectionBookmark { title } if title == "Appendix"
        ));
    }

    #[test]
    fn end_bookmark_before_start_is_not_matched() {
        // The next-section entry must come at or after the section entry in
        // page order.
        let err =
            pages_for_section(&outline(), "xStatus commands", "xConfiguration commands")
                .unwrap_err();
        assert!(matches!(err, ExtractError::MissingSectionBookmark { .. }));
    }
}
