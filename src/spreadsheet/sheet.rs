use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::index_to_reference;
use std::collections::HashMap;

static EMPTY: CellValue = CellValue::Empty;

/// The unprocessed cell grid of one worksheet.
///
/// Positions are absolute: row 0 is the sheet's first row and column 0 is column `A`,
/// whatever the first used cell is. Blank cells are not stored.
#[derive(Clone, Debug)]
pub struct RawSheet {
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells by `(row, col)`
    cells: HashMap<(usize, usize), CellValue>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl RawSheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: HashMap::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Builds a sheet from a dense grid of values, row 0 first.
    pub fn from_rows(name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Self::new(name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                sheet.insert(row, col, value);
            }
        }
        sheet
    }

    /// Adds a parsed worksheet cell.
    pub(crate) fn push(&mut self, cell: Cell) {
        let value = cell.to_value();
        self.insert(cell.row, cell.col, value);
    }

    fn insert(&mut self, row: usize, col: usize, value: CellValue) {
        if value.is_empty() {
            return;
        }
        self.update_bound(row, col);
        self.cells.insert((row, col), value);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows from the top of the sheet down to the last used row.
    pub fn height(&self) -> usize {
        self.row_upper_bound.map(|row| row + 1).unwrap_or(0)
    }

    /// Number of columns from `A` to the last used column.
    pub fn width(&self) -> usize {
        self.col_upper_bound.map(|col| col + 1).unwrap_or(0)
    }

    /// Used range as an A1-style reference such as `A3:K17`, `None` for an empty sheet.
    pub fn used_range(&self) -> Option<String> {
        let (row_lower, col_lower) = self.row_lower_bound.zip(self.col_lower_bound)?;
        let (row_upper, col_upper) = self.row_upper_bound.zip(self.col_upper_bound)?;
        Some(format!(
            "{}:{}",
            index_to_reference(row_lower, col_lower),
            index_to_reference(row_upper, col_upper)
        ))
    }

    /// Value at `(row, col)`, [`CellValue::Empty`] when nothing is stored there.
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY)
    }

    /// One row padded to the sheet width.
    pub fn row(&self, row: usize) -> Vec<CellValue> {
        (0..self.width()).map(|col| self.get(row, col).clone()).collect()
    }

    /// Indexes of the rows at or below `from` that hold at least one cell, top to bottom.
    pub fn used_rows(&self, from: usize) -> Vec<usize> {
        let mut rows = self
            .cells
            .keys()
            .map(|(row, _)| *row)
            .filter(|row| *row >= from)
            .collect::<Vec<_>>();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// Dense grid of the whole used range, starting at `A1`.
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        (0..self.height()).map(|row| self.row(row)).collect()
    }
}
