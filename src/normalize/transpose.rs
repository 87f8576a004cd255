use crate::error::SheetUnprocessable;
use crate::normalize::label_or_unnamed;
use crate::normalize::read_raw;
use crate::normalize::TrendSource;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::RawSheet;
use crate::spreadsheet::Workbook;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Name of the row axis of every normalized table.
pub const PERIOD_INDEX_NAME: &str = "Period";

/// Periods as rows, metrics as columns, every cell numeric or missing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedTable {
    sheet: String,
    periods: Vec<String>,
    metrics: Vec<String>,
    /// Row-major: `values[period][metric]`
    values: Vec<Vec<Option<f64>>>,
}

impl NormalizedTable {
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn index_name(&self) -> &str {
        PERIOD_INDEX_NAME
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn row_count(&self) -> usize {
        self.periods.len()
    }

    pub fn value(&self, period: usize, metric: usize) -> Option<f64> {
        self.values.get(period)?.get(metric).copied().flatten()
    }

    /// All values of one metric in period order, `None` if the metric is unknown.
    pub fn column(&self, metric: &str) -> Option<Vec<Option<f64>>> {
        let index = self.metric_index(metric)?;
        Some(self.values.iter().map(|row| row[index]).collect())
    }
}

impl TrendSource for NormalizedTable {
    fn sheet(&self) -> &str {
        NormalizedTable::sheet(self)
    }

    fn index_name(&self) -> &str {
        NormalizedTable::index_name(self)
    }

    fn periods(&self) -> &[String] {
        NormalizedTable::periods(self)
    }

    fn metrics(&self) -> &[String] {
        NormalizedTable::metrics(self)
    }

    fn value(&self, period: usize, metric: usize) -> Option<f64> {
        NormalizedTable::value(self, period, metric)
    }
}

/// Reads `sheet_name` from the workbook and normalizes it with the header at `header_row_offset`.
pub fn normalize(workbook: &Workbook, sheet_name: &str, header_row_offset: usize) -> Result<NormalizedTable, SheetUnprocessable> {
    let raw = read_raw(workbook, sheet_name)?;
    normalize_sheet(&raw, header_row_offset)
}

/// Normalizes a report sheet whose header row sits at `header_row_offset`.
///
/// Rows above the header are discarded, blank data rows dropped, duplicate header
/// labels collapsed to their first column, and the first column taken as metric
/// names. The grid is then transposed so each remaining column becomes a period row.
/// Cells that do not hold a number become missing.
pub fn normalize_sheet(raw: &RawSheet, header_row_offset: usize) -> Result<NormalizedTable, SheetUnprocessable> {
    let sheet_name = raw.name();
    if raw.is_empty() {
        return Err(SheetUnprocessable::new(sheet_name, "sheet is empty"));
    }
    if header_row_offset >= raw.height() {
        return Err(SheetUnprocessable::new(
            sheet_name,
            format!("missing header row {} (sheet has {} rows)", header_row_offset + 1, raw.height()),
        ));
    }
    let width = raw.width();
    if width < 2 {
        return Err(SheetUnprocessable::new(
            sheet_name,
            format!("expected at least 2 columns, found {width}"),
        ));
    }

    let labels = raw
        .row(header_row_offset)
        .iter()
        .enumerate()
        .map(|(col, value)| label_or_unnamed(value, col))
        .collect::<Vec<_>>();

    let data_rows = raw
        .used_rows(header_row_offset + 1)
        .into_iter()
        .map(|row| raw.row(row))
        .collect::<Vec<_>>();

    let mut seen_labels = HashSet::new();
    let columns = (0..width)
        .filter(|col| seen_labels.insert(labels[*col].as_str()))
        .collect::<Vec<_>>();
    if columns.len() < width {
        debug!(sheet = sheet_name, dropped = width - columns.len(), "dropped duplicate columns");
    }

    let (axis, period_columns) = match columns.split_first() {
        Some((axis, period_columns)) if !period_columns.is_empty() => (*axis, period_columns),
        _ => {
            return Err(SheetUnprocessable::new(
                sheet_name,
                "no period columns left after removing duplicate headers",
            ))
        }
    };

    let mut seen_metrics = HashSet::new();
    let mut metrics = Vec::<String>::new();
    let mut metric_rows = Vec::<&Vec<CellValue>>::new();
    for (position, row) in data_rows.iter().enumerate() {
        let name = label_or_unnamed(&row[axis], position);
        if seen_metrics.insert(name.clone()) {
            metrics.push(name);
            metric_rows.push(row);
        } else {
            debug!(sheet = sheet_name, metric = name.as_str(), "ignored repeated metric row");
        }
    }

    if metrics.is_empty() {
        debug!(sheet = sheet_name, "no data rows below header");
    }

    let periods = period_columns
        .iter()
        .map(|col| labels[*col].clone())
        .collect::<Vec<_>>();
    let values = period_columns
        .iter()
        .map(|col| metric_rows.iter().map(|row| row[*col].to_number()).collect())
        .collect();

    debug!(sheet = sheet_name, periods = periods.len(), metrics = metrics.len(), "normalized sheet");
    Ok(NormalizedTable {
        sheet: sheet_name.to_owned(),
        periods,
        metrics,
        values,
    })
}
