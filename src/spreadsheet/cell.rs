use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::fmt::Display;

/// Storage type of a worksheet cell, from its `t` attribute and number format.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Date and time tokens inside literals, escapes and brackets are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    fn is_1904(&self) -> Option<bool> {
        match self {
            Self::NumberDateTime1900 | Self::NumberDate1900 | Self::NumberTime1900 => Some(false),
            Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904 => Some(true),
            _ => None,
        }
    }
}

/// A single worksheet cell with position, storage type and raw text value.
/// Shared string cells carry the resolved string, not the table index.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the worksheet part
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Interprets the raw text according to the cell type.
    /// Values that do not match their declared type fall back to text.
    pub(crate) fn to_value(&self) -> CellValue {
        match self.kind {
            CellType::Empty => CellValue::Empty,
            CellType::Boolean => CellValue::Boolean(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => match self.value.trim().parse::<f64>() {
                Ok(number) => CellValue::Number(number),
                Err(_) => CellValue::Text(self.value.to_owned()),
            },
            CellType::NumberDateTime1900 | CellType::NumberDate1900 | CellType::NumberTime1900 |
            CellType::NumberDateTime1904 | CellType::NumberDate1904 | CellType::NumberTime1904 => {
                let is_1904 = self.kind.is_1904().unwrap_or(false);
                match self.value.trim().parse::<f64>() {
                    Ok(serial) => serial_to_datetime(serial, is_1904)
                        .map(CellValue::DateTime)
                        .unwrap_or(CellValue::Number(serial)),
                    Err(_) => CellValue::Text(self.value.to_owned()),
                }
            }
            CellType::IsoDateTime => parse_iso_datetime(&self.value)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(self.value.to_owned())),
            CellType::InlineString | CellType::SharedString => CellValue::Text(self.value.to_owned()),
            CellType::Error => CellValue::Error(self.value.to_owned()),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.reference(), self.to_value())
    }
}

/// A cell value as seen by table shaping code.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Boolean(bool),
    Text(String),
    DateTime(NaiveDateTime),
    /// Spreadsheet error literal, e.g. `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// True for blank cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerces the value to a finite number.
    ///
    /// Numbers pass through, booleans become 1/0 and text is parsed after trimming.
    /// Dates, errors, blanks, unparseable text and non-finite results give `None`.
    pub fn to_number(&self) -> Option<f64> {
        let number = match self {
            CellValue::Number(number) => Some(*number),
            CellValue::Boolean(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            CellValue::Text(text) => text.trim().parse::<f64>().ok(),
            CellValue::Empty | CellValue::DateTime(_) | CellValue::Error(_) => None,
        };
        number.filter(|number| number.is_finite())
    }

    /// Display label used for headers, periods and metric names; `None` when empty.
    pub fn label(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(number) => write!(f, "{}", number),
            CellValue::Boolean(flag) => write!(f, "{}", flag),
            CellValue::Text(text) => write!(f, "{}", text.trim()),
            CellValue::DateTime(datetime) if datetime.time() == NaiveTime::MIN => {
                write!(f, "{}", datetime.format("%Y-%m-%d"))
            }
            CellValue::DateTime(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(error) => write!(f, "{}", error),
        }
    }
}

/// Converts an Excel serial number to a date/time.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
pub(crate) fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    let (epoch, correction) = if is_1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, 0)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, if days < 60 { 1 } else { 0 })
    };
    let date = epoch.checked_add_signed(Duration::try_days(days + correction)?)?;
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::try_milliseconds(milliseconds)?)
}

/// Parses ISO 8601 values stored in `t="d"` cells.
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.contains('T') {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    }
}
