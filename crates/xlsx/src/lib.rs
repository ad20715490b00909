//! XLSX (Office Open XML) spreadsheet reader.
//!
//! Parses .xlsx files, which are ZIP archives containing XML documents,
//! into the row-major cell grid consumed by the slide import pipeline.

pub mod parser;

pub use parser::{is_zip_magic, XlsxReader};
