//! # Dashboard configuration
//!
//! A [`SessionConfig`] lists the recognized sheets in display order and how each
//! one is shaped and drawn. Two presets cover the usual dashboards; a JSON file
//! can override any field.
use crate::chart::ChartKind;
use crate::normalize::NormalizeMode;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Read config '{path}' failed: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse config '{path}' failed: {source}")]
    ParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Sheet '{0}' is configured more than once")]
    DuplicateSheetError(SheetKind),

    #[error("Sheet '{0}' is read by column position but lists no columns")]
    EmptyColumnsError(SheetKind),
}

/// Sheets a Screener export is known to carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    #[serde(rename = "Profit & Loss")]
    ProfitAndLoss,
    #[serde(rename = "Balance Sheet")]
    BalanceSheet,
    #[serde(rename = "Cash Flow")]
    CashFlow,
    #[serde(rename = "Ratios")]
    Ratios,
    #[serde(rename = "Quarters")]
    Quarters,
}

impl SheetKind {
    pub const ALL: [SheetKind; 5] = [
        SheetKind::ProfitAndLoss,
        SheetKind::BalanceSheet,
        SheetKind::CashFlow,
        SheetKind::Ratios,
        SheetKind::Quarters,
    ];

    /// Sheet name as it appears in the workbook.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            SheetKind::ProfitAndLoss => "Profit & Loss",
            SheetKind::BalanceSheet => "Balance Sheet",
            SheetKind::CashFlow => "Cash Flow",
            SheetKind::Ratios => "Ratios",
            SheetKind::Quarters => "Quarters",
        }
    }

    pub fn from_sheet_name(name: &str) -> Option<SheetKind> {
        Self::ALL.into_iter().find(|kind| kind.sheet_name() == name)
    }
}

impl Display for SheetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

/// How one recognized sheet is loaded and charted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet: SheetKind,
    pub mode: NormalizeMode,
    #[serde(default)]
    pub chart: ChartKind,
    /// Chart title; `<sheet> - Selected Metrics` when absent
    #[serde(default)]
    pub title: Option<String>,
}

impl SheetLayout {
    pub fn new(sheet: SheetKind, mode: NormalizeMode, chart: ChartKind) -> Self {
        SheetLayout {
            sheet,
            mode,
            chart,
            title: None,
        }
    }

    pub fn chart_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} - Selected Metrics", self.sheet))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recognized sheets in display order
    pub sheets: Vec<SheetLayout>,
    /// Metrics selected when a sheet is opened
    pub default_metric_count: usize,
    /// Rows shown by table and raw previews
    pub preview_rows: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::explorer()
    }
}

impl SessionConfig {
    /// Every recognized sheet transposed below a two-row banner, drawn as lines.
    ///
    /// Ratios is part of this dashboard and is read transposed like the statements,
    /// so its years become periods. Use [`SessionConfig::fixed_columns`] for exports
    /// that already list one period per Ratios row.
    pub fn explorer() -> Self {
        SessionConfig {
            sheets: SheetKind::ALL
                .into_iter()
                .map(|sheet| SheetLayout::new(sheet, NormalizeMode::statement(), ChartKind::Line))
                .collect(),
            default_metric_count: 2,
            preview_rows: 20,
        }
    }

    /// Statements transposed; Ratios and Quarters read by column position.
    pub fn fixed_columns() -> Self {
        let direct = || NormalizeMode::Direct { columns: vec![1, 2] };
        SessionConfig {
            sheets: vec![
                SheetLayout::new(SheetKind::ProfitAndLoss, NormalizeMode::statement(), ChartKind::Line),
                SheetLayout::new(SheetKind::BalanceSheet, NormalizeMode::statement(), ChartKind::Line),
                SheetLayout::new(SheetKind::CashFlow, NormalizeMode::statement(), ChartKind::Line),
                SheetLayout::new(SheetKind::Ratios, direct(), ChartKind::Line),
                SheetLayout::new(SheetKind::Quarters, direct(), ChartKind::GroupedBar),
            ],
            default_metric_count: 2,
            preview_rows: 20,
        }
    }

    /// Loads a configuration from JSON; missing fields take the explorer defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_text = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path_text.clone(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|error| match error {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError { path: path_text.clone(), source },
            other => other,
        })?;
        debug!(path = path_text.as_str(), sheets = config.sheets.len(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(text).map_err(|source| ConfigError::ParseError {
            path: "<inline>".to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for layout in &self.sheets {
            if !seen.insert(layout.sheet) {
                return Err(ConfigError::DuplicateSheetError(layout.sheet));
            }
            if let NormalizeMode::Direct { columns } = &layout.mode {
                if columns.is_empty() {
                    return Err(ConfigError::EmptyColumnsError(layout.sheet));
                }
            }
        }
        Ok(())
    }

    /// Layout of a sheet by workbook name, if the sheet is recognized and configured.
    pub fn layout(&self, sheet_name: &str) -> Option<&SheetLayout> {
        self.sheets.iter().find(|layout| layout.sheet.sheet_name() == sheet_name)
    }
}
