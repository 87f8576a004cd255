//! # Screener Sheet
//!
//! Reshapes financial statement workbooks exported by Screener.in into
//! period-indexed tables and describes trend charts of selected line items.
//!
//! ## Features
//!
//! - **Pure Rust `.xlsx` reading**: sheets are parsed from the in-memory upload with
//!   `zip` and `quick-xml`; shared strings, inline strings and date styles are resolved
//! - **Statement normalization**: banner rows skipped, blank rows and duplicate
//!   columns dropped, metric rows transposed into period rows, values coerced to numbers
//! - **Fixed-column reads**: period-per-row sheets such as Ratios or Quarters picked by
//!   column position
//! - **Chart descriptions**: line and grouped-bar [`ChartSpec`]s that serialize to JSON
//! - **Sessions**: an explicit state machine from upload to chart, with notices for
//!   every recoverable failure
//!
//! ## Example
//!
//! ```no_run
//! use screener_sheet::{Session, SessionConfig};
//!
//! let bytes = std::fs::read("ACME.xlsx").unwrap();
//! let mut session = Session::new(SessionConfig::explorer());
//! session.upload("ACME.xlsx", bytes).unwrap();
//! session.select_sheet("Profit & Loss").unwrap();
//! session.select_metrics(&["Sales", "Net profit"]);
//! println!("{}", session.chart().unwrap().to_json().unwrap());
//! ```
pub mod chart;
pub mod config;
pub mod error;
mod helpers;
pub mod normalize;
pub mod preview;
pub mod selection;
pub mod session;
pub mod spreadsheet;

pub use chart::render_trend;
pub use chart::ChartError;
pub use chart::ChartKind;
pub use chart::ChartSpec;
pub use chart::Series;
pub use config::ConfigError;
pub use config::SessionConfig;
pub use config::SheetKind;
pub use config::SheetLayout;
pub use error::ScreenerError;
pub use error::SheetUnprocessable;
pub use error::UnreadableFile;
pub use normalize::load_sheet;
pub use normalize::normalize;
pub use normalize::read_direct;
pub use normalize::NormalizeMode;
pub use normalize::NormalizedTable;
pub use normalize::RawTable;
pub use normalize::SheetTable;
pub use normalize::TrendSource;
pub use preview::GridPreview;
pub use selection::available_metrics;
pub use selection::default_selection;
pub use selection::validate_selection;
pub use session::Notice;
pub use session::NoticeLevel;
pub use session::Session;
pub use session::Stage;
pub use spreadsheet::CellValue;
pub use spreadsheet::RawSheet;
pub use spreadsheet::Workbook;
