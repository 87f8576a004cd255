//! Office Open XML (`.xlsx`, `.xlsm`) reader built on `zip` and `quick-xml`.
use crate::error::ScreenerError;
use crate::helpers::xml::match_xml_events;
use crate::helpers::xml::ElementAttributes;
use crate::helpers::zip::ZipHelper;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::in_grid;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::RawSheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use zip::ZipArchive;

// XML tag names for parsing the XLSX parts
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// Local name of relationship elements in `.rels` parts
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELATIONSHIPS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";

/// Everything needed to decode worksheets, loaded once when the workbook is opened.
#[derive(Clone, Debug, Default)]
pub(crate) struct WorkbookParts {
    /// Worksheets as (name, zip_path) pairs in workbook order
    pub(crate) sheets: Vec<(String, String)>,
    /// Cell type per style index
    pub(crate) number_formats: Vec<CellType>,
    /// Shared string table
    pub(crate) shared_strings: Vec<String>,
}

/// Loads the workbook structure, styles and shared strings.
pub(crate) fn load_parts<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<WorkbookParts, ScreenerError> {
    let (sheets, is_1904) = load_workbook(zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError)?
    }
    let number_formats = load_number_formats(zip, is_1904)?;
    let shared_strings = load_shared_strings(zip)?;
    debug!(
        sheets = sheets.len(),
        styles = number_formats.len(),
        shared_strings = shared_strings.len(),
        is_1904,
        "loaded workbook parts"
    );
    Ok(WorkbookParts {
        sheets,
        number_formats,
        shared_strings,
    })
}

/// Reads one worksheet part into a [`RawSheet`].
///
/// Cells without an `r` reference take the running row/column position. Cells
/// placed outside the 1,048,576 x 16,384 grid, or with an unreadable reference,
/// are dropped.
/// Shared strings are resolved so the sheet never holds table indexes.
pub(crate) fn read_worksheet<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    parts: &WorkbookParts,
    sheet_name: &str,
    zip_path: &str,
) -> Result<RawSheet, ScreenerError> {
    let mut sheet = RawSheet::new(sheet_name);
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut position = None::<(usize, usize)>;
    let mut kind = CellType::default();
    let mut value = String::new();
    let mut dropped = 0usize;
    let mut reader = zip
        .part_reader(zip_path)?
        .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_ROW => {
            if let Some(number) = event.parsed_attribute::<usize>("r")? {
                row_count = number.saturating_sub(1);
            }
            col_count = 0;
        }
        Event::End(event) if event.name() == TAG_ROW => {
            row_count = row_count.saturating_add(1);
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            position = match event.attribute("r")? {
                Some(reference) => reference_to_index(&reference),
                None => Some((row_count, col_count)).filter(|(row, col)| in_grid(*row, *col)),
            };
            col_count = position.map(|(_, col)| col).unwrap_or(col_count) + 1;
            kind = event.attribute("t")?.map(|t| {
                match t.as_str() {
                    "inlineStr" | "str" => CellType::InlineString,
                    "s" => CellType::SharedString,
                    "d" => CellType::IsoDateTime,
                    "b" => CellType::Boolean,
                    "e" => CellType::Error,
                    _ => CellType::Number,
                }
            }).unwrap_or(CellType::Number);
            if kind == CellType::Number {
                if let Some(style) = event.parsed_attribute::<usize>("s")? {
                    kind = parts.number_formats.get(style).copied().unwrap_or(CellType::Number);
                }
            }
            value.clear();
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            value = reader.read_text(TAG_INLINE_STRING, true)?;
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            value = reader.read_text(TAG_VALUE, false)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            let Some((row, col)) = position else {
                dropped += 1;
                kind = CellType::default();
                value.clear();
                continue;
            };
            if kind != CellType::Empty && !value.is_empty() {
                if kind == CellType::SharedString {
                    let index = value.trim().parse::<usize>()?;
                    value = parts.shared_strings
                        .get(index)
                        .cloned()
                        .ok_or_else(|| SpreadsheetError::SharedStringError {
                            reference: index_to_reference(row, col),
                            index,
                        })?;
                }
                sheet.push(Cell {
                    row,
                    col,
                    kind,
                    value: std::mem::take(&mut value),
                });
            }
            kind = CellType::default();
            value.clear();
        }
    });
    debug!(sheet = sheet_name, range = ?sheet.used_range(), dropped, "read worksheet");
    Ok(sheet)
}

/// Loads worksheet names and part paths, and the date system, from `xl/workbook.xml`.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(Vec<(String, String)>, bool), ScreenerError> {
    let relationships = load_relationships(zip, WORKBOOK_RELATIONSHIPS_PART)?;
    let mut reader = zip.part_reader(WORKBOOK_PART)?
        .ok_or_else(|| SpreadsheetError::FileError(WORKBOOK_PART.to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            if let Some((name, id)) = event.attribute("name")?.zip(event.attribute("id")?) {
                if let Some(path) = relationships.get(&id) {
                    sheets.push((name, path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.flag("date1904")?;
        }
    });
    Ok((sheets, is_1904))
}

/// Loads worksheet relationships, mapping relationship IDs to part paths.
fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, ScreenerError> {
    let mut reader = zip.part_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.attribute("Id")?;
            let kind = event.attribute("Type")?;
            let target = event.attribute("Target")?;
            // Only worksheets; chartsheets and dialog sheets carry no grid
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id, to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads the cell type of each style index from `xl/styles.xml`.
fn load_number_formats<RS: Read + Seek>(zip: &mut ZipArchive<RS>, is_1904: bool) -> Result<Vec<CellType>, ScreenerError> {
    let mut reader = match zip.part_reader(STYLES_PART)? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.attribute("numFmtId")?;
            let format = event.attribute("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id, CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = false,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            format_indexes.push(event.attribute("numFmtId")?.unwrap_or_default());
        }
    });

    let number_formats = format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect();
    Ok(number_formats)
}

/// Loads the shared string table, empty when the workbook has none.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, ScreenerError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.part_reader(SHARED_STRINGS_PART)? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(reader.read_text(TAG_SHARED_STRING_ITEM, true)?);
        }
    });
    Ok(shared_strings)
}

/// Normalizes a relationship target to a path inside the archive.
fn to_zip_path(path: &str) -> String {
    if let Some(path) = path.strip_prefix('/') {
        path.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{}", path.trim_start_matches("./"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(to_zip_path("xl/worksheets/sheet3.xml"), "xl/worksheets/sheet3.xml");
    }
}
