//! Slide construction from the decoded grid.

use crate::columns::{resolve_columns, ColumnIndexMap};
use crate::error::{Error, Result};
use crate::matcher::{build_image_mapping, normalize_token, ImageNameMapping};
use crate::types::{ImageAsset, RawGrid, Slide, DEFAULT_STYLE, NO_IMAGE};

/// Read a cell, treating missing cells as empty.
fn cell<'a>(row: &'a [String], column: usize) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Build the ordered slide sequence from the decoded grid.
///
/// Walks data rows in order, skipping rows whose every cell is empty.
/// Output ids are renumbered contiguously from `slide-1`, so a skipped row
/// does not consume an id slot. An unresolved image token degrades to the
/// [`NO_IMAGE`] sentinel rather than failing the import; a run that produces
/// zero slides is always an error, never a silent empty state.
pub fn build_slides(
    grid: &RawGrid,
    columns: &ColumnIndexMap,
    mapping: &ImageNameMapping,
) -> Result<Vec<Slide>> {
    let mut slides = Vec::new();

    for row in grid.iter().skip(1) {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let token = normalize_token(cell(row, columns.image));
        let image = match mapping.get(&token) {
            Some(uri) => uri.to_string(),
            None => {
                if !token.is_empty() {
                    log::warn!("No mapping found for image token: {}", token);
                }
                NO_IMAGE.to_string()
            }
        };

        let style = cell(row, columns.style).trim().to_lowercase();
        let style = if style.is_empty() {
            DEFAULT_STYLE.to_string()
        } else {
            style
        };

        slides.push(Slide {
            id: format!("slide-{}", slides.len() + 1),
            image,
            text: cell(row, columns.text).trim().to_string(),
            highlighted: cell(row, columns.highlighted).trim().to_string(),
            style,
            background_voice: cell(row, columns.background_voice).trim().to_string(),
        });
    }

    if slides.is_empty() {
        return Err(Error::NoSlides);
    }

    log::debug!("Built {} slides", slides.len());
    Ok(slides)
}

/// Run the whole import pipeline on a decoded grid: resolve the required
/// columns, build the image mapping from the user's selection, and emit the
/// slide sequence. Each call allocates fresh state; nothing is cached
/// between imports.
pub fn import_slides(grid: &RawGrid, images: &[ImageAsset]) -> Result<Vec<Slide>> {
    let header = grid
        .first()
        .ok_or_else(|| Error::Parse("spreadsheet has no header row".to_string()))?;
    let columns = resolve_columns(header)?;
    let mapping = build_image_mapping(grid, columns.image, images);
    build_slides(grid, &columns, &mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn standard_header() -> &'static [&'static str] {
        &["Image", "Text", "Highlighted", "Style", "BackgroundVoice"]
    }

    #[test]
    fn end_to_end_single_row() {
        let grid = grid(&[
            standard_header(),
            &["1.png", "Hello world", "Hello", "bold", ""],
        ]);
        let images = vec![ImageAsset::new("file:///a.png", "1.png")];

        let slides = import_slides(&grid, &images).unwrap();

        assert_eq!(
            slides,
            vec![Slide {
                id: "slide-1".to_string(),
                image: "file:///a.png".to_string(),
                text: "Hello world".to_string(),
                highlighted: "Hello".to_string(),
                style: "bold".to_string(),
                background_voice: String::new(),
            }]
        );
    }

    #[test]
    fn unmatched_token_gets_sentinel() {
        let grid = grid(&[standard_header(), &["cover.jpg", "Text", "", "", ""]]);

        let slides = import_slides(&grid, &[]).unwrap();

        assert_eq!(slides[0].image, NO_IMAGE);
    }

    #[test]
    fn empty_image_cell_gets_sentinel() {
        let grid = grid(&[standard_header(), &["", "Text", "", "", ""]]);
        let images = vec![ImageAsset::new("file:///a.png", "1.png")];

        let slides = import_slides(&grid, &images).unwrap();

        assert_eq!(slides[0].image, NO_IMAGE);
    }

    #[test]
    fn blank_rows_are_skipped_and_ids_stay_contiguous() {
        let grid = grid(&[
            standard_header(),
            &["1.png", "First", "", "", ""],
            &["", "", "", "", ""],
            &["2.png", "Second", "", "", ""],
        ]);
        let images = vec![
            ImageAsset::new("file:///1.png", "1.png"),
            ImageAsset::new("file:///2.png", "2.png"),
        ];

        let slides = import_slides(&grid, &images).unwrap();

        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].id, "slide-1");
        assert_eq!(slides[0].text, "First");
        assert_eq!(slides[1].id, "slide-2");
        assert_eq!(slides[1].text, "Second");
    }

    #[test]
    fn style_is_lowercased_and_defaults_to_normal() {
        let grid = grid(&[
            standard_header(),
            &["", "Styled", "", "BOLD H2", ""],
            &["", "Plain", "", "", ""],
        ]);

        let slides = import_slides(&grid, &[]).unwrap();

        assert_eq!(slides[0].style, "bold h2");
        assert_eq!(slides[1].style, "normal");
    }

    #[test]
    fn short_rows_default_missing_cells_to_empty() {
        let grid = grid(&[standard_header(), &["1.png", "Text only"]]);
        let images = vec![ImageAsset::new("file:///a.png", "1.png")];

        let slides = import_slides(&grid, &images).unwrap();

        assert_eq!(slides[0].highlighted, "");
        assert_eq!(slides[0].style, "normal");
        assert_eq!(slides[0].background_voice, "");
    }

    #[test]
    fn all_blank_data_rows_is_no_slides() {
        let grid = grid(&[
            standard_header(),
            &["", "", "", "", ""],
            &["", "  ", "", "", ""],
        ]);

        let err = import_slides(&grid, &[]).unwrap_err();
        assert!(matches!(err, Error::NoSlides));
    }

    #[test]
    fn missing_columns_fail_before_any_slide_is_built() {
        let grid = grid(&[&["image", "text"], &["1.png", "Hello"]]);

        let err = import_slides(&grid, &[]).unwrap_err();
        match err {
            Error::MissingColumns(missing) => {
                assert_eq!(missing, vec!["highlighted", "style", "backgroundvoice"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn repeated_runs_yield_identical_output() {
        let grid = grid(&[
            standard_header(),
            &["2.png", "Two", "Two", "italic", "voice"],
            &["1.png", "One", "", "", ""],
        ]);
        let images = vec![
            ImageAsset::new("uri-b", "b_10.jpg"),
            ImageAsset::new("uri-a", "a_2.jpg"),
        ];

        let first = import_slides(&grid, &images).unwrap();
        let second = import_slides(&grid, &images).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn rows_sharing_a_token_share_the_image() {
        let grid = grid(&[
            standard_header(),
            &["1.png", "First", "", "", ""],
            &["1.png", "Again", "", "", ""],
        ]);
        let images = vec![ImageAsset::new("file:///a.png", "1.png")];

        let slides = import_slides(&grid, &images).unwrap();

        assert_eq!(slides[0].image, "file:///a.png");
        assert_eq!(slides[1].image, "file:///a.png");
    }
}
