//! Core domain types, column resolution, image matching, and slide building
//! for spreadsheet-driven slideshows.

pub mod builder;
pub mod columns;
pub mod error;
pub mod matcher;
pub mod store;
pub mod types;

pub use builder::{build_slides, import_slides};
pub use columns::{resolve_columns, ColumnIndexMap, REQUIRED_COLUMNS};
pub use error::{Error, Result};
pub use matcher::{build_image_mapping, ImageNameMapping};
pub use store::{BlobStore, MemoryStore, SlideLibrary};
pub use types::{ImageAsset, RawGrid, SavedSlideSet, Slide, SlideGroup, DEFAULT_STYLE, NO_IMAGE};
