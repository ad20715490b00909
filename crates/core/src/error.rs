//! Error types for the slide import pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing a spreadsheet into slides.
///
/// Only `Parse`, `MissingColumns`, and `NoSlides` originate in the import
/// pipeline itself; `Io` comes from the file-reading collaborator and
/// `Storage` from the slide-library layer. All of them are terminal for the
/// current import attempt.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream is not a decodable spreadsheet, or the decoded sheet
    /// has no data rows.
    #[error("Spreadsheet could not be read: {0}")]
    Parse(String),

    /// The header row is missing one or more required columns. Carries the
    /// complete list so the user can fix the file in one pass.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A schema-valid spreadsheet produced zero slides.
    #[error("No valid slides found in the spreadsheet")]
    NoSlides,

    /// Failed to load or persist a slide library document.
    #[error("Storage error: {0}")]
    Storage(String),
}
