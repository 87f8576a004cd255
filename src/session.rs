//! # Dashboard session
//!
//! A [`Session`] drives one user's walk through an uploaded workbook:
//!
//! ```text
//! NoFile --upload--> FileLoaded --select_sheet--> SheetNormalized --select_metrics--> Rendered
//! ```
//!
//! Every step recomputes what depends on it. Failures never leave the session in a
//! half-updated state: they fall back to the previous stage and leave a [`Notice`].
use crate::chart::render_trend;
use crate::chart::ChartKind;
use crate::chart::ChartSpec;
use crate::config::SessionConfig;
use crate::error::SheetUnprocessable;
use crate::error::UnreadableFile;
use crate::normalize::load_sheet;
use crate::normalize::SheetTable;
use crate::normalize::TrendSource;
use crate::preview::raw_preview;
use crate::preview::table_preview;
use crate::preview::GridPreview;
use crate::selection::default_selection;
use crate::selection::validate_selection;
use crate::spreadsheet::Workbook;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use tracing::info;
use tracing::warn;

pub const UPLOAD_PROMPT: &str = "Please upload a Screener.in Excel file to begin.";
pub const UPLOAD_SUCCESS: &str = "File uploaded successfully!";
pub const SELECTION_PROMPT: &str = "Please select at least one metric to plot.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    NoFile,
    FileLoaded,
    SheetNormalized,
    Rendered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message for the user about the outcome of an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let level = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{level}] {}", self.message)
    }
}

/// State of one dashboard user.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    file_name: Option<String>,
    workbook: Option<Workbook>,
    sheet: Option<String>,
    table: Option<SheetTable>,
    selection: Vec<String>,
    chart_kind: ChartKind,
    chart: Option<ChartSpec>,
    failed_sheets: Vec<SheetUnprocessable>,
    notices: Vec<Notice>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            config,
            file_name: None,
            workbook: None,
            sheet: None,
            table: None,
            selection: Vec::new(),
            chart_kind: ChartKind::default(),
            chart: None,
            failed_sheets: Vec::new(),
            notices: vec![Notice::new(NoticeLevel::Info, UPLOAD_PROMPT)],
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        match (&self.workbook, &self.table, &self.chart) {
            (None, _, _) => Stage::NoFile,
            (Some(_), None, _) => Stage::FileLoaded,
            (Some(_), Some(_), None) => Stage::SheetNormalized,
            (Some(_), Some(_), Some(_)) => Stage::Rendered,
        }
    }

    /// Replaces whatever was loaded with a new workbook.
    ///
    /// The session is reset before the file is read, so a failed upload leaves no
    /// trace of the previous workbook.
    pub fn upload(&mut self, file_name: &str, bytes: impl Into<Vec<u8>>) -> Result<(), UnreadableFile> {
        self.reset();
        match Workbook::open(bytes) {
            Ok(workbook) => {
                info!(file = file_name, sheets = workbook.sheet_names().len(), "uploaded workbook");
                self.file_name = Some(file_name.to_owned());
                self.workbook = Some(workbook);
                self.notices.clear();
                self.notices.push(Notice::new(NoticeLevel::Success, UPLOAD_SUCCESS));
                Ok(())
            }
            Err(error) => {
                warn!(file = file_name, error = error.message.as_str(), "upload rejected");
                self.notices
                    .push(Notice::new(NoticeLevel::Error, format!("Could not read {file_name}: {}", error.message)));
                Err(error)
            }
        }
    }

    fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        *self = Session::new(config);
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Recognized sheets present in the workbook, in configured order.
    pub fn available_sheets(&self) -> Vec<String> {
        let Some(workbook) = &self.workbook else {
            return Vec::new();
        };
        self.config
            .sheets
            .iter()
            .map(|layout| layout.sheet.sheet_name())
            .filter(|name| workbook.contains(name))
            .map(str::to_owned)
            .collect()
    }

    /// Every sheet of the workbook, recognized or not.
    pub fn all_sheets(&self) -> Vec<String> {
        self.workbook
            .as_ref()
            .map(|workbook| workbook.sheet_names().to_vec())
            .unwrap_or_default()
    }

    /// Sheets that failed to load since the upload.
    pub fn failed_sheets(&self) -> &[SheetUnprocessable] {
        &self.failed_sheets
    }

    /// Loads a recognized sheet, selects its default metrics and takes the chart kind
    /// of its layout.
    ///
    /// Any previous table, selection and chart are dropped first. On failure the
    /// session stays at [`Stage::FileLoaded`] with a warning notice.
    pub fn select_sheet(&mut self, sheet_name: &str) -> Result<(), SheetUnprocessable> {
        self.sheet = None;
        self.table = None;
        self.selection.clear();
        self.chart = None;

        let result = self.load(sheet_name);
        match result {
            Ok(table) => {
                info!(sheet = sheet_name, periods = table.periods().len(), metrics = table.metrics().len(), "loaded sheet");
                self.selection = default_selection(&table, self.config.default_metric_count);
                self.chart_kind = self
                    .config
                    .layout(sheet_name)
                    .map(|layout| layout.chart)
                    .unwrap_or_default();
                self.sheet = Some(sheet_name.to_owned());
                self.table = Some(table);
                self.render();
                Ok(())
            }
            Err(error) => {
                warn!(sheet = error.sheet.as_str(), cause = error.cause.as_str(), "sheet skipped");
                self.notices.push(Notice::new(NoticeLevel::Warning, error.to_string()));
                if !self.failed_sheets.contains(&error) {
                    self.failed_sheets.push(error.clone());
                }
                Err(error)
            }
        }
    }

    fn load(&self, sheet_name: &str) -> Result<SheetTable, SheetUnprocessable> {
        let workbook = self
            .workbook
            .as_ref()
            .ok_or_else(|| SheetUnprocessable::new(sheet_name, "no workbook uploaded"))?;
        let layout = self
            .config
            .layout(sheet_name)
            .ok_or_else(|| SheetUnprocessable::new(sheet_name, "not a recognized sheet"))?;
        load_sheet(workbook, sheet_name, &layout.mode)
    }

    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    pub fn table(&self) -> Option<&SheetTable> {
        self.table.as_ref()
    }

    /// Metrics of the current table, empty before a sheet is loaded.
    pub fn metrics(&self) -> Vec<String> {
        self.table
            .as_ref()
            .map(|table| table.metrics().to_vec())
            .unwrap_or_default()
    }

    /// Replaces the selection with the requested metrics the table has, and redraws.
    pub fn select_metrics<S: AsRef<str>>(&mut self, requested: &[S]) -> &[String] {
        if let Some(table) = &self.table {
            self.selection = validate_selection(table, requested);
            self.render();
        }
        &self.selection
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    /// Switches between line and bar charts, redrawing the current selection.
    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
        if self.table.is_some() {
            self.render();
        }
    }

    fn render(&mut self) {
        self.chart = None;
        let Some(table) = &self.table else {
            return;
        };
        if self.selection.is_empty() {
            self.notices.push(Notice::new(NoticeLevel::Info, SELECTION_PROMPT));
            return;
        }
        let title = self.chart_title().unwrap_or_default();
        match render_trend(table, &self.selection, self.chart_kind, &title) {
            Ok(chart) => self.chart = Some(chart),
            Err(error) => self.notices.push(Notice::new(NoticeLevel::Error, error.to_string())),
        }
    }

    /// Heading above the chart: `<sheet> Trends`.
    pub fn heading(&self) -> Option<String> {
        self.sheet.as_ref().map(|sheet| format!("{sheet} Trends"))
    }

    pub fn chart_title(&self) -> Option<String> {
        let sheet = self.sheet.as_deref()?;
        self.config
            .layout(sheet)
            .map(|layout| layout.chart_title())
            .or_else(|| Some(format!("{sheet} - Selected Metrics")))
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        self.chart.as_ref()
    }

    /// The leading rows of the current table.
    pub fn table_preview(&self) -> Option<GridPreview> {
        self.table
            .as_ref()
            .map(|table| table_preview(table, self.config.preview_rows))
    }

    /// The leading rows of any sheet of the workbook, unprocessed.
    pub fn raw_preview(&self, sheet_name: &str, rows: usize) -> Result<GridPreview, SheetUnprocessable> {
        let workbook = self
            .workbook
            .as_ref()
            .ok_or_else(|| SheetUnprocessable::new(sheet_name, "no workbook uploaded"))?;
        if !workbook.contains(sheet_name) {
            return Err(SheetUnprocessable::new(sheet_name, "sheet not found in workbook"));
        }
        let sheet = workbook
            .read_sheet(sheet_name)
            .map_err(|error| SheetUnprocessable::new(sheet_name, error.to_string()))?;
        Ok(raw_preview(&sheet, rows))
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hands over the pending notices, leaving none behind.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
