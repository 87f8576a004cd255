//! # Sheet normalization
//!
//! Shapes report sheets into period-indexed tables. Two modes share one entry point:
//!
//! - [`NormalizeMode::Transpose`]: metric names run down the first column and periods
//!   across a header row; the sheet is cleaned, transposed and coerced to numbers
//!   ([`NormalizedTable`]).
//! - [`NormalizeMode::Direct`]: the sheet is already period-per-row; fixed column
//!   positions are picked as they are ([`RawTable`]).
//!
//! Both results implement [`TrendSource`], which is all the selector, chart
//! renderer and previews need.
mod direct;
mod transpose;

pub use direct::read_direct;
pub use direct::read_direct_sheet;
pub use direct::RawTable;
pub use transpose::normalize;
pub use transpose::normalize_sheet;
pub use transpose::NormalizedTable;
pub use transpose::PERIOD_INDEX_NAME;

use crate::error::SheetUnprocessable;
use crate::spreadsheet::RawSheet;
use crate::spreadsheet::Workbook;
use serde::Deserialize;
use serde::Serialize;

/// How a sheet is turned into a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NormalizeMode {
    /// Header row at `header_row_offset`, metric names in the first column, periods across.
    Transpose { header_row_offset: usize },
    /// Header row 0, periods down the first column, metrics taken from fixed positions.
    Direct { columns: Vec<usize> },
}

impl NormalizeMode {
    /// Transposed read below the two decorative rows of statement exports.
    pub fn statement() -> Self {
        NormalizeMode::Transpose { header_row_offset: 2 }
    }
}

/// A period-indexed table the selector and chart renderer can read.
pub trait TrendSource {
    /// Name of the sheet the table came from
    fn sheet(&self) -> &str;

    /// Name of the row axis
    fn index_name(&self) -> &str;

    /// Row labels in table order
    fn periods(&self) -> &[String];

    /// Column labels in table order, unique
    fn metrics(&self) -> &[String];

    /// Numeric value at a period row and metric column; `None` when missing.
    fn value(&self, period: usize, metric: usize) -> Option<f64>;

    /// Text shown for a cell in table previews.
    fn display(&self, period: usize, metric: usize) -> String {
        self.value(period, metric)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    fn metric_index(&self, name: &str) -> Option<usize> {
        self.metrics().iter().position(|metric| metric == name)
    }

    fn is_empty(&self) -> bool {
        self.periods().is_empty() || self.metrics().is_empty()
    }
}

/// Result of loading a sheet in either mode.
#[derive(Clone, Debug, PartialEq)]
pub enum SheetTable {
    Normalized(NormalizedTable),
    Direct(RawTable),
}

impl TrendSource for SheetTable {
    fn sheet(&self) -> &str {
        match self {
            SheetTable::Normalized(table) => table.sheet(),
            SheetTable::Direct(table) => table.sheet(),
        }
    }

    fn index_name(&self) -> &str {
        match self {
            SheetTable::Normalized(table) => table.index_name(),
            SheetTable::Direct(table) => table.index_name(),
        }
    }

    fn periods(&self) -> &[String] {
        match self {
            SheetTable::Normalized(table) => table.periods(),
            SheetTable::Direct(table) => table.periods(),
        }
    }

    fn metrics(&self) -> &[String] {
        match self {
            SheetTable::Normalized(table) => table.metrics(),
            SheetTable::Direct(table) => table.metrics(),
        }
    }

    fn value(&self, period: usize, metric: usize) -> Option<f64> {
        match self {
            SheetTable::Normalized(table) => table.value(period, metric),
            SheetTable::Direct(table) => table.value(period, metric),
        }
    }

    fn display(&self, period: usize, metric: usize) -> String {
        match self {
            SheetTable::Normalized(table) => table.display(period, metric),
            SheetTable::Direct(table) => table.display(period, metric),
        }
    }
}

/// Loads a sheet from the workbook in the given mode.
pub fn load_sheet(workbook: &Workbook, sheet_name: &str, mode: &NormalizeMode) -> Result<SheetTable, SheetUnprocessable> {
    match mode {
        NormalizeMode::Transpose { header_row_offset } => {
            normalize(workbook, sheet_name, *header_row_offset).map(SheetTable::Normalized)
        }
        NormalizeMode::Direct { columns } => read_direct(workbook, sheet_name, columns).map(SheetTable::Direct),
    }
}

/// Reads a sheet for normalization, turning every failure into [`SheetUnprocessable`].
fn read_raw(workbook: &Workbook, sheet_name: &str) -> Result<RawSheet, SheetUnprocessable> {
    if !workbook.contains(sheet_name) {
        return Err(SheetUnprocessable::new(sheet_name, "sheet not found in workbook"));
    }
    workbook
        .read_sheet(sheet_name)
        .map_err(|error| SheetUnprocessable::new(sheet_name, error.to_string()))
}

/// Label of a header or axis cell, with a positional placeholder for blanks.
fn label_or_unnamed(value: &crate::spreadsheet::CellValue, position: usize) -> String {
    value.label().unwrap_or_else(|| format!("Unnamed: {position}"))
}
