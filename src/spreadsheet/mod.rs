//! # Workbook loading
//!
//! Opens an uploaded Office Open XML workbook held in memory, lists its sheets
//! and reads individual sheets into [`RawSheet`] grids.
pub(crate) mod cell;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

pub use cell::CellValue;
pub use sheet::RawSheet;

use crate::error::ResultMessage;
use crate::error::ScreenerError;
use crate::error::UnreadableFile;
use crate::spreadsheet::xlsx::WorkbookParts;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use zip::ZipArchive;

/// Signature of OLE compound documents: legacy `.xls` files and encrypted workbooks.
const COMPOUND_DOCUMENT_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Errors raised while reading the workbook container.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing '{0}' in workbook")]
    FileError(String),

    #[error("Workbook contains no worksheets")]
    SpreadsheetEmptyError,

    #[error("Legacy .xls or password protected workbooks are not supported")]
    CompoundDocumentError,

    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFoundError(String),

    #[error("Shared string {index} referenced at {reference} does not exist")]
    SharedStringError { reference: String, index: usize },

    #[error("Unknown entity reference '&{0};'")]
    EntityError(String),

    #[error("Attribute {name}=\"{value}\" is not a valid value")]
    AttributeError { name: String, value: String },
}

/// An uploaded workbook.
///
/// The handle is immutable: it keeps the file bytes plus the decoded workbook
/// structure, and every [`Workbook::read_sheet`] call parses the sheet afresh.
#[derive(Clone, Debug)]
pub struct Workbook {
    bytes: Vec<u8>,
    parts: WorkbookParts,
    sheet_names: Vec<String>,
}

impl Workbook {
    /// Opens workbook bytes, failing with [`UnreadableFile`] when they are not a usable `.xlsx`.
    pub fn open(bytes: impl Into<Vec<u8>>) -> Result<Workbook, UnreadableFile> {
        let bytes = bytes.into();
        let parts = Self::load(&bytes)?;
        let sheet_names = parts.sheets.iter().map(|(name, _)| name.to_owned()).collect::<Vec<_>>();
        info!(size = bytes.len(), sheets = ?sheet_names, "opened workbook");
        Ok(Workbook {
            bytes,
            parts,
            sheet_names,
        })
    }

    fn load(bytes: &[u8]) -> Result<WorkbookParts, ScreenerError> {
        if bytes.starts_with(&COMPOUND_DOCUMENT_SIGNATURE) {
            Err(SpreadsheetError::CompoundDocumentError)?
        }
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        xlsx::load_parts(&mut zip)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Whether a sheet with exactly this name exists.
    pub fn contains(&self, sheet_name: &str) -> bool {
        self.sheet_names.iter().any(|name| name == sheet_name)
    }

    /// Reads one sheet as an unprocessed grid.
    pub fn read_sheet(&self, sheet_name: &str) -> Result<RawSheet, ScreenerError> {
        let (_, zip_path) = self.parts.sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(sheet_name.to_owned()))?;
        debug!(sheet = sheet_name, part = zip_path.as_str(), "reading sheet");
        let mut zip = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        xlsx::read_worksheet(&mut zip, &self.parts, sheet_name, zip_path)
            .with_prefix(&format!("Read sheet '{sheet_name}' failed"))
    }
}
