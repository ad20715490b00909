//! Domain types for spreadsheet-driven slideshows.

use serde::{Deserialize, Serialize};

/// Sentinel stored in [`Slide::image`] when a row's image token could not be
/// resolved to a selected image.
pub const NO_IMAGE: &str = "No image selected";

/// Default style applied when a row leaves the style cell empty.
pub const DEFAULT_STYLE: &str = "normal";

/// Row-major grid of cell strings decoded from a spreadsheet.
///
/// Row 0 is the header row; rows 1..N are data rows. Every cell is already
/// coerced to a string at the reader boundary, so downstream code never
/// branches on cell type. Missing cells read as `""`.
pub type RawGrid = Vec<Vec<String>>;

/// An image the user selected from their device.
///
/// Produced by the external picker collaborator; the pipeline only reads
/// `name` (for numeric-suffix extraction) and `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Opaque handle or location of the image.
    pub uri: String,

    /// Original filename as reported by the OS picker.
    pub name: String,
}

impl ImageAsset {
    /// Create a new image asset.
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
        }
    }
}

/// One normalized slide: an image/text/voice/style bundle.
///
/// This is the sole artifact the import pipeline produces; preview, editing,
/// storage, and playback all consume this shape. The editor replaces a slide
/// by producing a new value with the same `id`; the core never mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Stable identifier, `"slide-<1-based output position>"`.
    pub id: String,

    /// Resolved image URI, or [`NO_IMAGE`] when the row's token had no match.
    pub image: String,

    /// Slide body text.
    pub text: String,

    /// Space-separated literal substrings of `text` to emphasize.
    pub highlighted: String,

    /// Space-separated formatting keywords, lowercased (e.g. `"bold h2"`).
    pub style: String,

    /// Narration text spoken while the slide is shown.
    pub background_voice: String,
}

impl Slide {
    /// Whether this slide resolved to an actual image.
    pub fn has_image(&self) -> bool {
        self.image != NO_IMAGE
    }

    /// The individual highlight substrings.
    pub fn highlighted_tokens(&self) -> Vec<&str> {
        self.highlighted.split_whitespace().collect()
    }

    /// The individual style keywords.
    pub fn style_tokens(&self) -> Vec<&str> {
        self.style.split_whitespace().collect()
    }
}

/// A named, persisted slide sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSlideSet {
    /// Stable identifier assigned at save time.
    pub id: String,

    /// User-visible name.
    pub name: String,

    /// The slides, in playback order.
    pub content: Vec<Slide>,

    /// Creation timestamp as supplied by the caller (ISO 8601 string).
    pub created_at: String,
}

/// A named collection of saved slide sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideGroup {
    /// Stable identifier assigned at creation time.
    pub id: String,

    /// User-visible name.
    pub name: String,

    /// Member slide sets.
    pub slides: Vec<SavedSlideSet>,

    /// Creation timestamp as supplied by the caller (ISO 8601 string).
    pub created_at: String,

    /// Whether the user pinned this group.
    #[serde(default)]
    pub is_favorite: bool,
}
