use crate::error::SheetUnprocessable;
use crate::normalize::label_or_unnamed;
use crate::normalize::read_raw;
use crate::normalize::TrendSource;
use crate::normalize::PERIOD_INDEX_NAME;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::RawSheet;
use crate::spreadsheet::Workbook;
use std::collections::HashSet;
use tracing::debug;

/// A sheet read as it is: periods down the first column, metrics from fixed column positions.
///
/// Cells keep their original values; numbers are only coerced when a chart asks for them.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    sheet: String,
    index_name: String,
    /// Sheet column position of each metric
    columns: Vec<usize>,
    metrics: Vec<String>,
    periods: Vec<String>,
    /// Row-major: `cells[period][metric]`
    cells: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Sheet column positions the metrics were taken from.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn cell(&self, period: usize, metric: usize) -> Option<&CellValue> {
        self.cells.get(period)?.get(metric)
    }

    pub fn value(&self, period: usize, metric: usize) -> Option<f64> {
        self.cell(period, metric)?.to_number()
    }

    pub fn display(&self, period: usize, metric: usize) -> String {
        self.cell(period, metric)
            .map(|cell| cell.to_string())
            .unwrap_or_default()
    }
}

impl TrendSource for RawTable {
    fn sheet(&self) -> &str {
        RawTable::sheet(self)
    }

    fn index_name(&self) -> &str {
        RawTable::index_name(self)
    }

    fn periods(&self) -> &[String] {
        RawTable::periods(self)
    }

    fn metrics(&self) -> &[String] {
        RawTable::metrics(self)
    }

    fn value(&self, period: usize, metric: usize) -> Option<f64> {
        RawTable::value(self, period, metric)
    }

    fn display(&self, period: usize, metric: usize) -> String {
        RawTable::display(self, period, metric)
    }
}

/// Reads `sheet_name` from the workbook and picks the metric columns at `expected_column_indices`.
pub fn read_direct(
    workbook: &Workbook,
    sheet_name: &str,
    expected_column_indices: &[usize],
) -> Result<RawTable, SheetUnprocessable> {
    let raw = read_raw(workbook, sheet_name)?;
    read_direct_sheet(&raw, expected_column_indices)
}

/// Picks metric columns by position from a period-per-row sheet.
///
/// Row 0 holds the headers, column 0 the period labels. Positions are taken as
/// given, whatever their header says; a repeated position is kept once.
pub fn read_direct_sheet(raw: &RawSheet, expected_column_indices: &[usize]) -> Result<RawTable, SheetUnprocessable> {
    let sheet_name = raw.name();
    let Some(required) = expected_column_indices.iter().max().map(|col| col + 1) else {
        return Err(SheetUnprocessable::new(sheet_name, "no metric columns requested"));
    };
    if raw.is_empty() {
        return Err(SheetUnprocessable::new(sheet_name, "sheet is empty"));
    }
    let width = raw.width();
    if width < required {
        return Err(SheetUnprocessable::new(
            sheet_name,
            format!("expected at least {required} columns, found {width}"),
        ));
    }

    let header = raw.row(0);
    let index_name = header[0].label().unwrap_or_else(|| PERIOD_INDEX_NAME.to_owned());
    let mut seen = HashSet::new();
    let columns = expected_column_indices
        .iter()
        .copied()
        .filter(|col| seen.insert(*col))
        .collect::<Vec<_>>();
    let metrics = columns
        .iter()
        .map(|col| label_or_unnamed(&header[*col], *col))
        .collect::<Vec<_>>();
    debug!(sheet = sheet_name, ?columns, ?metrics, "picked fixed columns");

    let mut periods = Vec::new();
    let mut cells = Vec::new();
    for row in raw.used_rows(1).into_iter().map(|row| raw.row(row)) {
        periods.push(label_or_unnamed(&row[0], periods.len()));
        cells.push(columns.iter().map(|col| row[*col].clone()).collect());
    }

    Ok(RawTable {
        sheet: sheet_name.to_owned(),
        index_name,
        columns,
        metrics,
        periods,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_owned())
    }

    fn number(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    fn ratios() -> RawSheet {
        RawSheet::from_rows("Ratios", vec![
            vec![text("Year"), text("ROE"), text("ROCE"), text("Debt/Equity")],
            vec![text("Mar-22"), number(12.5), number(15.0), number(0.4)],
            vec![],
            vec![text("Mar-23"), text("n/a"), number(16.5), number(0.3)],
        ])
    }

    #[test]
    fn picks_columns_by_position() {
        let table = read_direct_sheet(&ratios(), &[1, 2]).unwrap();

        assert_eq!(table.sheet(), "Ratios");
        assert_eq!(table.index_name(), "Year");
        assert_eq!(table.metrics(), ["ROE", "ROCE"]);
        assert_eq!(table.columns(), [1, 2]);
        assert_eq!(table.periods(), ["Mar-22", "Mar-23"]);
        assert_eq!(table.value(0, 0), Some(12.5));
        assert_eq!(table.value(1, 1), Some(16.5));
    }

    #[test]
    fn raw_cells_are_kept_but_not_plotted() {
        let table = read_direct_sheet(&ratios(), &[1]).unwrap();

        assert_eq!(table.cell(1, 0), Some(&text("n/a")));
        assert_eq!(table.display(1, 0), "n/a");
        assert_eq!(table.value(1, 0), None);
    }

    #[test]
    fn requested_order_is_kept_and_repeats_dropped() {
        let table = read_direct_sheet(&ratios(), &[3, 1, 3]).unwrap();

        assert_eq!(table.metrics(), ["Debt/Equity", "ROE"]);
    }

    #[test]
    fn narrow_sheets_are_rejected() {
        let error = read_direct_sheet(&ratios(), &[1, 4]).unwrap_err();
        assert_eq!(error.sheet, "Ratios");
        assert_eq!(error.cause, "expected at least 5 columns, found 4");

        let error = read_direct_sheet(&ratios(), &[]).unwrap_err();
        assert_eq!(error.cause, "no metric columns requested");

        let empty = RawSheet::from_rows("Quarters", vec![]);
        assert_eq!(read_direct_sheet(&empty, &[1]).unwrap_err().cause, "sheet is empty");
    }

    #[test]
    fn header_only_sheet_has_no_periods() {
        let sheet = RawSheet::from_rows("Quarters", vec![vec![text("Quarter"), text("Sales"), text("Profit")]]);
        let table = read_direct_sheet(&sheet, &[1, 2]).unwrap();

        assert!(table.periods().is_empty());
        assert!(TrendSource::is_empty(&table));
    }
}
