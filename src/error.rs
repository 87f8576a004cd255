use thiserror::Error;

/// Main error type for the screener sheet crate.
/// Aggregates errors from the standard library, the container/XML parsers and internal modules.
#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Domain module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    ChartError(#[from] crate::chart::ChartError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

/// The uploaded file could not be opened as a workbook.
/// Fatal for the upload: the caller shows the message and waits for another file.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unreadable file: {message}")]
pub struct UnreadableFile {
    /// Underlying parser message
    pub message: String,
}

impl From<ScreenerError> for UnreadableFile {
    fn from(error: ScreenerError) -> Self {
        UnreadableFile {
            message: error.to_string(),
        }
    }
}

/// One sheet could not be shaped into a table.
/// Non-fatal: the sheet is skipped with a warning while other sheets stay usable.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Could not process {sheet}: {cause}")]
pub struct SheetUnprocessable {
    /// Name of the offending sheet
    pub sheet: String,
    /// Human-readable cause
    pub cause: String,
}

impl SheetUnprocessable {
    pub fn new(sheet: &str, cause: impl Into<String>) -> Self {
        SheetUnprocessable {
            sheet: sheet.to_owned(),
            cause: cause.into(),
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, ScreenerError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| ScreenerError::WithContextError(format!("{}: {}", message, e)))
    }
}
