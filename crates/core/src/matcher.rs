//! Image token to asset matching.
//!
//! The spreadsheet's image column holds human-assigned tokens ("1.png",
//! "cover.jpg") that are not guaranteed to equal the filenames of the images
//! the user actually picked: mobile pickers may rename files on selection,
//! and the user may select them in a different order. Correspondence is
//! therefore positional — distinct tokens in row order are paired with the
//! assets sorted by the number embedded in their filename. No filename
//! equality or fuzzy matching is attempted.

use crate::types::{ImageAsset, RawGrid};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching every non-digit character in a filename.
static NON_DIGIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

/// Immutable mapping from spreadsheet image tokens to asset URIs.
///
/// Keys are exactly the distinct, trimmed, non-empty image tokens found in
/// the image column across all data rows, in first-seen order. Each key maps
/// to at most one URI.
#[derive(Debug, Clone, Default)]
pub struct ImageNameMapping {
    uris: HashMap<String, String>,
    tokens: Vec<String>,
}

impl ImageNameMapping {
    /// Look up the URI mapped to a token, if any.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.uris.get(token).map(String::as_str)
    }

    /// The distinct tokens found in the spreadsheet, in first-seen order.
    /// Tokens beyond the supplied image count appear here but are unmapped.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens that resolved to a URI.
    pub fn mapped_len(&self) -> usize {
        self.uris.len()
    }
}

/// Extract the integer formed by the digits of a filename.
///
/// `"b_10.jpg"` yields 10, `"img2-final3.png"` yields 23 (all digits,
/// concatenated, matching the host platforms' strip-non-digits behavior).
/// Returns `None` when the name contains no digits or the digits overflow.
fn numeric_key(name: &str) -> Option<u64> {
    let digits = NON_DIGIT_REGEX.replace_all(name, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Normalize an image token for use as a mapping key. The slide builder
/// applies the same normalization before lookup.
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.nfc().collect::<String>().trim().to_string()
}

/// Build the token-to-URI mapping for one import.
///
/// `image_column` is the resolved position of the image column in `grid`;
/// `images` is the user's selection in selection order. The result is a pure
/// function of (distinct token order, numerically sorted asset list): the
/// same inputs always yield the same mapping. Assets whose names contain no
/// digits sort after all numbered assets, keeping their relative selection
/// order. Length mismatches are not errors — excess tokens stay unmapped and
/// excess images go unused.
pub fn build_image_mapping(
    grid: &RawGrid,
    image_column: usize,
    images: &[ImageAsset],
) -> ImageNameMapping {
    let mut tokens: Vec<String> = Vec::new();
    for row in grid.iter().skip(1) {
        let token = match row.get(image_column) {
            Some(cell) => normalize_token(cell),
            None => continue,
        };
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    log::debug!("Spreadsheet image tokens: {:?}", tokens);

    // Stable sort: assets without digits keep their selection order at the end.
    let mut sorted: Vec<&ImageAsset> = images.iter().collect();
    sorted.sort_by_key(|asset| numeric_key(&asset.name).unwrap_or(u64::MAX));
    log::debug!(
        "Sorted selected images: {:?}",
        sorted.iter().map(|a| a.name.as_str()).collect::<Vec<_>>()
    );

    if tokens.len() != sorted.len() {
        log::warn!(
            "Spreadsheet references {} distinct images but {} were selected; pairing up to the shorter length",
            tokens.len(),
            sorted.len()
        );
    }

    let mut uris = HashMap::new();
    for (token, asset) in tokens.iter().zip(&sorted) {
        log::debug!("Mapped \"{}\" to \"{}\"", token, asset.name);
        uris.insert(token.clone(), asset.uri.clone());
    }

    ImageNameMapping { uris, tokens }
}
