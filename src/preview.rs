//! Text grids for showing tables and raw sheets.
use crate::normalize::TrendSource;
use crate::spreadsheet::reference::index_to_column;
use crate::spreadsheet::RawSheet;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

/// The leading rows of a table or sheet, every cell already formatted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridPreview {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows available before truncation
    pub total_rows: usize,
}

impl GridPreview {
    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

impl Display for GridPreview {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut widths = self.headers.iter().map(|header| header.chars().count()).collect::<Vec<_>>();
        for row in &self.rows {
            for (col, cell) in row.iter().enumerate() {
                match widths.get_mut(col) {
                    Some(width) => *width = (*width).max(cell.chars().count()),
                    None => widths.push(cell.chars().count()),
                }
            }
        }
        let write_line = |f: &mut Formatter<'_>, cells: &[String]| -> std::fmt::Result {
            let line = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| format!("{cell:<width$}", width = widths[col]))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{}", line.trim_end())
        };

        writeln!(f, "{}", self.title)?;
        write_line(f, &self.headers)?;
        for row in &self.rows {
            write_line(f, row)?;
        }
        if self.is_truncated() {
            writeln!(f, "... {} of {} rows", self.rows.len(), self.total_rows)?;
        }
        Ok(())
    }
}

/// Period rows of a loaded table, headed by the index name and the metric names.
pub fn table_preview<T: TrendSource + ?Sized>(table: &T, rows: usize) -> GridPreview {
    let metrics = table.metrics();
    let headers = std::iter::once(table.index_name().to_owned())
        .chain(metrics.iter().cloned())
        .collect();
    let preview_rows = table
        .periods()
        .iter()
        .take(rows)
        .enumerate()
        .map(|(period, label)| {
            std::iter::once(label.clone())
                .chain((0..metrics.len()).map(|metric| table.display(period, metric)))
                .collect()
        })
        .collect();
    GridPreview {
        title: table.sheet().to_owned(),
        headers,
        rows: preview_rows,
        total_rows: table.periods().len(),
    }
}

/// Sheet rows exactly as stored, headed by column letters.
pub fn raw_preview(sheet: &RawSheet, rows: usize) -> GridPreview {
    GridPreview {
        title: sheet.name().to_owned(),
        headers: (0..sheet.width()).map(index_to_column).collect(),
        rows: (0..sheet.height().min(rows))
            .map(|row| sheet.row(row).iter().map(|value| value.to_string()).collect())
            .collect(),
        total_rows: sheet.height(),
    }
}
