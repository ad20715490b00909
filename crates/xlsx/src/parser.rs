//! XLSX file parser implementation.

use quick_xml::events::Event;
use quick_xml::Reader;
use slidevox_core::{Error, RawGrid, Result};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// XLSX files are ZIP archives (PK\x03\x04).
pub fn is_zip_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
}

/// Reader for XLSX (Office Open XML) workbooks.
///
/// Only the first sheet of the workbook is read; later sheets are ignored.
/// Every cell value is coerced to a string at this boundary, so downstream
/// code never branches on cell type.
pub struct XlsxReader;

impl XlsxReader {
    /// Create a new XLSX reader.
    pub fn new() -> Self {
        Self
    }

    /// Parse a workbook into the row-major cell grid.
    ///
    /// Fails with [`Error::Parse`] if the byte stream is not a decodable
    /// workbook or the first sheet has fewer than two rows (no header, or
    /// header only).
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<RawGrid> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Parse(format!("failed to open workbook archive: {}", e)))?;

        let sheet_path = self.first_sheet_path(&mut archive);
        log::debug!("Reading sheet: {}", sheet_path);

        let shared_strings = match self.read_archive_file(&mut archive, "xl/sharedStrings.xml") {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        let sheet_xml = self
            .read_archive_file(&mut archive, &sheet_path)
            .ok_or_else(|| Error::Parse(format!("worksheet '{}' not found", sheet_path)))?;

        let grid = parse_sheet_xml(&sheet_xml, &shared_strings)?;

        if grid.len() < 2 {
            return Err(Error::Parse(
                "spreadsheet is empty or has no data rows".to_string(),
            ));
        }

        Ok(grid)
    }

    /// Resolve the archive path of the workbook's first sheet.
    ///
    /// Follows `xl/workbook.xml` (sheet order) through the workbook
    /// relationships part. Falls back to the conventional
    /// `xl/worksheets/sheet1.xml` when either part is missing or malformed.
    fn first_sheet_path<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> String {
        const FALLBACK: &str = "xl/worksheets/sheet1.xml";

        let Some(workbook_xml) = self.read_archive_file(archive, "xl/workbook.xml") else {
            return FALLBACK.to_string();
        };
        let Some(rid) = first_sheet_rid(&workbook_xml) else {
            return FALLBACK.to_string();
        };

        let Some(rels_xml) = self.read_archive_file(archive, "xl/_rels/workbook.xml.rels") else {
            return FALLBACK.to_string();
        };
        match relationship_target(&rels_xml, &rid) {
            Some(target) => {
                if let Some(absolute) = target.strip_prefix('/') {
                    absolute.to_string()
                } else {
                    format!("xl/{}", target)
                }
            }
            None => FALLBACK.to_string(),
        }
    }

    /// Read a file from the ZIP archive, if present.
    fn read_archive_file<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Option<String> {
        let mut file = archive.by_name(path).ok()?;
        let mut content = String::new();
        file.read_to_string(&mut content).ok()?;
        Some(content)
    }
}

impl Default for XlsxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the relationship id of the first `<sheet>` in workbook.xml.
fn first_sheet_rid(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sheet" =>
            {
                for attr in e.attributes().flatten() {
                    if local_name(attr.key.as_ref()) == b"id" {
                        return Some(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
                return None;
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

/// Resolve a relationship id to its target path.
fn relationship_target(xml: &str, rid: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }
                if id == rid {
                    return Some(target);
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

/// Parse the shared-string table. Rich-text runs inside one `<si>` are
/// concatenated into a single string.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    // No trim_text here: rich-text runs may carry significant spaces.
    let mut reader = Reader::from_str(xml);

    let mut current = String::new();
    let mut in_t = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"t" => {
                in_t = true;
            }
            Ok(Event::Text(ref e)) if in_t => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_t = false,
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Parse(format!("malformed shared strings: {}", e)));
            }
            _ => {}
        }
    }

    Ok(strings)
}

/// Cell being assembled while walking the sheet XML.
#[derive(Debug, Default)]
struct CellState {
    column: usize,
    cell_type: String,
    raw: String,
}

/// Parse a worksheet XML document into the row-major grid.
///
/// Rows and cells the file skips entirely (Excel omits empty ones) are gap-
/// filled with empty strings from their `r` references, so the grid indexes
/// line up with what the user sees in the spreadsheet.
fn parse_sheet_xml(xml: &str, shared_strings: &[String]) -> Result<RawGrid> {
    let mut grid: RawGrid = Vec::new();
    // No trim_text here either; cell text is only captured inside <v>/<is><t>.
    let mut reader = Reader::from_str(xml);

    let mut current_row: Vec<String> = Vec::new();
    let mut in_row = false;
    let mut next_column = 0usize;
    let mut cell: Option<CellState> = None;
    let mut in_v = false;
    let mut in_is = false;
    let mut in_is_t = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Parse(format!("malformed sheet XML: {}", e)))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e)
                if local_name(e.name().as_ref()) == b"row" =>
            {
                // Gap-fill skipped rows from the 1-based r attribute.
                if let Some(number) = attribute_value(e, b"r").and_then(|r| r.parse::<usize>().ok())
                {
                    while grid.len() + 1 < number {
                        grid.push(Vec::new());
                    }
                }
                if matches!(event, Event::Start(_)) {
                    in_row = true;
                    current_row.clear();
                    next_column = 0;
                } else {
                    grid.push(Vec::new());
                }
            }
            Event::Start(ref e) | Event::Empty(ref e)
                if in_row && local_name(e.name().as_ref()) == b"c" =>
            {
                let column = attribute_value(e, b"r")
                    .and_then(|r| column_index(&r))
                    .unwrap_or(next_column);

                if matches!(event, Event::Start(_)) {
                    cell = Some(CellState {
                        column,
                        cell_type: attribute_value(e, b"t").unwrap_or_default(),
                        raw: String::new(),
                    });
                } else {
                    // Self-closing cell carries no value.
                    next_column = column + 1;
                }
            }
            Event::Start(ref e) if cell.is_some() => match local_name(e.name().as_ref()) {
                b"v" => in_v = true,
                b"is" => in_is = true,
                b"t" if in_is => in_is_t = true,
                _ => {}
            },
            Event::Text(ref e) if in_v || in_is_t => {
                if let Some(state) = cell.as_mut() {
                    state.raw.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"v" => in_v = false,
                b"is" => in_is = false,
                b"t" if in_is => in_is_t = false,
                b"c" => {
                    if let Some(state) = cell.take() {
                        let value = coerce_cell(&state, shared_strings);
                        if state.column >= current_row.len() {
                            current_row.resize(state.column + 1, String::new());
                        }
                        current_row[state.column] = value;
                        next_column = state.column + 1;
                    }
                }
                b"row" => {
                    grid.push(std::mem::take(&mut current_row));
                    in_row = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(grid)
}

/// Coerce one cell to its string form.
fn coerce_cell(cell: &CellState, shared_strings: &[String]) -> String {
    match cell.cell_type.as_str() {
        "s" => {
            let index = cell.raw.trim().parse::<usize>().ok();
            match index.and_then(|i| shared_strings.get(i)) {
                Some(s) => s.clone(),
                None => {
                    log::warn!("shared string index out of range: {}", cell.raw);
                    String::new()
                }
            }
        }
        "b" => {
            if cell.raw.trim() == "1" {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        "str" | "inlineStr" | "e" => cell.raw.clone(),
        _ => coerce_number(&cell.raw),
    }
}

/// Stringify a numeric cell. Integral values print without a decimal point
/// ("1", not "1.0"), matching what the user typed.
fn coerce_number(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => format!("{}", n as i64),
        _ => trimmed.to_string(),
    }
}

/// Zero-based column index from a cell reference like "B3".
fn column_index(cell_ref: &str) -> Option<usize> {
    let mut column = 0usize;
    let mut seen_letter = false;
    for c in cell_ref.chars() {
        if c.is_ascii_alphabetic() {
            column = column * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
            seen_letter = true;
        } else {
            break;
        }
    }
    if seen_letter {
        Some(column - 1)
    } else {
        None
    }
}

/// Read an attribute's value from an element, unescaped lossily.
fn attribute_value(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
