//! # Trend charts
//!
//! Turns a period-indexed table and a metric selection into a [`ChartSpec`]: a
//! serializable description of a line or grouped-bar chart that a host charting
//! library can draw.
use crate::error::ScreenerError;
use crate::normalize::TrendSource;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChartError {
    #[error("Select at least one metric to plot")]
    EmptySelection,

    #[error("Metric '{0}' is not a column of the table")]
    UnknownMetric(String),

    #[error("Unknown chart kind '{0}', expected 'line' or 'bar'")]
    UnknownChartKind(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    GroupedBar,
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::GroupedBar => write!(f, "bar"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "bar" | "grouped_bar" | "grouped-bar" => Ok(ChartKind::GroupedBar),
            other => Err(ChartError::UnknownChartKind(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub categories: Vec<String>,
}

/// One plotted metric. `None` marks a missing value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Bar heights with missing values drawn as zero.
    pub fn bar_heights(&self) -> Vec<f64> {
        self.values.iter().map(|value| value.unwrap_or(0.0)).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_axis: Axis,
    pub series: Vec<Series>,
    /// Point markers on line charts
    pub markers: bool,
}

impl ChartSpec {
    pub fn to_json(&self) -> Result<String, ScreenerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds a chart of `metric_names` over the table's periods.
///
/// Series follow the requested order. Every name must be a column of the table.
pub fn render_trend<T, S>(table: &T, metric_names: &[S], kind: ChartKind, title: &str) -> Result<ChartSpec, ChartError>
where
    T: TrendSource + ?Sized,
    S: AsRef<str>,
{
    if metric_names.is_empty() {
        return Err(ChartError::EmptySelection);
    }
    let periods = table.periods();
    let series = metric_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let metric = table
                .metric_index(name)
                .ok_or_else(|| ChartError::UnknownMetric(name.to_owned()))?;
            Ok(Series {
                name: name.to_owned(),
                values: (0..periods.len()).map(|period| table.value(period, metric)).collect(),
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(ChartSpec {
        title: title.to_owned(),
        kind,
        x_axis: Axis {
            title: table.index_name().to_owned(),
            categories: periods.to_vec(),
        },
        series,
        markers: kind == ChartKind::Line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_sheet;
    use crate::normalize::NormalizedTable;
    use crate::spreadsheet::CellValue;
    use crate::spreadsheet::RawSheet;

    fn table() -> NormalizedTable {
        let text = |value: &str| CellValue::Text(value.to_owned());
        let sheet = RawSheet::from_rows("Quarters", vec![
            vec![text("Narration"), text("Jun-23"), text("Sep-23"), text("Dec-23")],
            vec![text("Sales"), CellValue::Number(10.0), text("N/A"), CellValue::Number(12.0)],
            vec![text("Net profit"), CellValue::Number(1.0), CellValue::Number(2.0), CellValue::Number(3.0)],
        ]);
        normalize_sheet(&sheet, 0).unwrap()
    }

    #[test]
    fn line_chart_keeps_gaps() {
        let chart = render_trend(&table(), &["Sales"], ChartKind::Line, "Quarters - Selected Metrics").unwrap();

        assert_eq!(chart.title, "Quarters - Selected Metrics");
        assert_eq!(chart.x_axis.title, "Period");
        assert_eq!(chart.x_axis.categories, ["Jun-23", "Sep-23", "Dec-23"]);
        assert_eq!(chart.series[0].values, [Some(10.0), None, Some(12.0)]);
        assert!(chart.markers);
    }

    #[test]
    fn bars_draw_missing_values_as_zero() {
        let chart = render_trend(&table(), &["Sales"], ChartKind::GroupedBar, "q").unwrap();

        assert!(!chart.markers);
        assert_eq!(chart.series[0].bar_heights(), [10.0, 0.0, 12.0]);
    }

    #[test]
    fn series_follow_requested_order() {
        let chart = render_trend(&table(), &["Net profit", "Sales"], ChartKind::Line, "q").unwrap();
        let names = chart.series.iter().map(|series| series.name.as_str()).collect::<Vec<_>>();

        assert_eq!(names, ["Net profit", "Sales"]);
    }

    #[test]
    fn invalid_selections_are_errors() {
        let none: [&str; 0] = [];
        assert_eq!(render_trend(&table(), &none, ChartKind::Line, "q"), Err(ChartError::EmptySelection));
        assert_eq!(
            render_trend(&table(), &["EBITDA"], ChartKind::Line, "q"),
            Err(ChartError::UnknownMetric("EBITDA".to_owned()))
        );
    }

    #[test]
    fn serializes_missing_values_as_null() {
        let chart = render_trend(&table(), &["Sales"], ChartKind::GroupedBar, "q").unwrap();
        let json: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();

        assert_eq!(json["kind"], "grouped_bar");
        assert_eq!(json["series"][0]["values"], serde_json::json!([10.0, null, 12.0]));
        assert_eq!(json["x_axis"]["categories"][1], "Sep-23");
    }

    #[test]
    fn chart_kind_names() {
        assert_eq!("line".parse::<ChartKind>(), Ok(ChartKind::Line));
        assert_eq!(" Bar ".parse::<ChartKind>(), Ok(ChartKind::GroupedBar));
        assert_eq!(ChartKind::GroupedBar.to_string(), "bar");
        assert!("pie".parse::<ChartKind>().is_err());
    }
}
