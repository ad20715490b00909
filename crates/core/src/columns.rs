//! Header-row column resolution.
//!
//! Maps the five required logical fields to column positions in the header
//! row. Matching is case-insensitive and exact after trimming and Unicode
//! normalization; there is no fuzzy or partial matching.

use crate::error::{Error, Result};
use unicode_normalization::UnicodeNormalization;

/// Canonical names of the required columns, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["image", "text", "highlighted", "style", "backgroundvoice"];

/// Zero-based column positions of the five logical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndexMap {
    pub image: usize,
    pub text: usize,
    pub highlighted: usize,
    pub style: usize,
    pub background_voice: usize,
}

/// Normalize a header cell for comparison: NFC, trimmed, lowercased.
///
/// NFC first: pickers and spreadsheets written on macOS can disagree on the
/// decomposition of accented characters.
fn normalize_header(cell: &str) -> String {
    cell.nfc().collect::<String>().trim().to_lowercase()
}

/// Resolve all five required columns in the given header row.
///
/// The first column whose normalized header equals the canonical name wins.
/// Fails with [`Error::MissingColumns`] naming every missing field at once,
/// so the caller can report the complete list in one pass.
pub fn resolve_columns(header: &[String]) -> Result<ColumnIndexMap> {
    let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
    log::debug!("Found headers: {:?}", normalized);

    let position = |name: &str| normalized.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| position(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    Ok(ColumnIndexMap {
        image: position("image").unwrap(),
        text: position("text").unwrap(),
        highlighted: position("highlighted").unwrap(),
        style: position("style").unwrap(),
        background_voice: position("backgroundvoice").unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn resolves_canonical_order() {
        let header = row(&["image", "text", "highlighted", "style", "backgroundvoice"]);
        let columns = resolve_columns(&header).unwrap();
        assert_eq!(columns.image, 0);
        assert_eq!(columns.text, 1);
        assert_eq!(columns.highlighted, 2);
        assert_eq!(columns.style, 3);
        assert_eq!(columns.background_voice, 4);
    }

    #[test]
    fn resolves_any_case_and_order() {
        let header = row(&["Style", "BACKGROUNDVOICE", " Image ", "Highlighted", "Text"]);
        let columns = resolve_columns(&header).unwrap();
        assert_eq!(columns.style, 0);
        assert_eq!(columns.background_voice, 1);
        assert_eq!(columns.image, 2);
        assert_eq!(columns.highlighted, 3);
        assert_eq!(columns.text, 4);
    }

    #[test]
    fn ignores_extra_columns() {
        let header = row(&[
            "notes",
            "image",
            "text",
            "highlighted",
            "style",
            "backgroundvoice",
        ]);
        let columns = resolve_columns(&header).unwrap();
        assert_eq!(columns.image, 1);
    }

    #[test]
    fn first_matching_column_wins() {
        let header = row(&[
            "image",
            "Image",
            "text",
            "highlighted",
            "style",
            "backgroundvoice",
        ]);
        let columns = resolve_columns(&header).unwrap();
        assert_eq!(columns.image, 0);
        assert_eq!(columns.text, 2);
    }

    #[test]
    fn reports_every_missing_column() {
        let header = row(&["text", "style"]);
        let err = resolve_columns(&header).unwrap_err();
        match err {
            Error::MissingColumns(missing) => {
                assert_eq!(missing, vec!["image", "highlighted", "backgroundvoice"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn no_partial_matching() {
        let header = row(&[
            "images",
            "text body",
            "highlighted",
            "style",
            "backgroundvoice",
        ]);
        let err = resolve_columns(&header).unwrap_err();
        match err {
            Error::MissingColumns(missing) => {
                assert_eq!(missing, vec!["image", "text"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn empty_header_reports_all_five() {
        let err = resolve_columns(&[]).unwrap_err();
        match err {
            Error::MissingColumns(missing) => assert_eq!(missing.len(), 5),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}
