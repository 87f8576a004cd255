//! Interactive shell over a dashboard [`Session`].
//!
//! ```bash
//! screener_sheet ACME.xlsx --dashboard fixed
//! > sheet Quarters
//! > metrics Sales, Net Profit
//! > chart
//! ```
//!
//! Set `RUST_LOG=debug` to trace parsing on stderr.
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use screener_sheet::ChartKind;
use screener_sheet::Session;
use screener_sheet::SessionConfig;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "screener_sheet", version, about = "Explore Screener.in financial statement exports")]
struct Cli {
    /// Workbook to open on start
    file: Option<PathBuf>,

    /// Dashboard preset
    #[arg(long, value_enum, default_value_t = Dashboard::Explorer)]
    dashboard: Dashboard,

    /// JSON configuration, replaces the preset
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Dashboard {
    /// Every sheet transposed, line charts
    Explorer,
    /// Ratios and Quarters read by column position
    Fixed,
}

const HELP: &str = "\
Commands:
  open <path>              upload a workbook
  sheets                   list chartable and other sheets
  sheet <name|number>      load a sheet and plot its first metrics
  metrics [a, b, ...]      list metrics, or select them (comma separated, 'none' clears)
  kind <line|bar>          switch chart kind
  chart                    print the chart as JSON
  table                    preview the cleaned table
  raw <sheet>              preview any sheet as stored
  help                     show this text
  quit                     leave";

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Open(&'a str),
    Sheets,
    Sheet(&'a str),
    Metrics(Option<&'a str>),
    Kind(&'a str),
    Chart,
    Table,
    Raw(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Command<'a>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (name, argument) = match line.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (line, ""),
        };
        let argument = Some(argument).filter(|argument| !argument.is_empty());
        let command = match (name.to_ascii_lowercase().as_str(), argument) {
            ("open", Some(path)) => Command::Open(path),
            ("sheets", None) => Command::Sheets,
            ("sheet", Some(sheet)) => Command::Sheet(sheet),
            ("metrics", metrics) => Command::Metrics(metrics),
            ("kind", Some(kind)) => Command::Kind(kind),
            ("chart", None) => Command::Chart,
            ("table", None) => Command::Table,
            ("raw", Some(sheet)) => Command::Raw(sheet),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => Command::Unknown(line),
        };
        Some(command)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => match cli.dashboard {
            Dashboard::Explorer => SessionConfig::explorer(),
            Dashboard::Fixed => SessionConfig::fixed_columns(),
        },
    };
    debug!(?cli, "starting session");

    let mut session = Session::new(config);
    let mut stdout = std::io::stdout().lock();
    match &cli.file {
        Some(path) => open(&mut session, path, &mut stdout)?,
        None => print_notices(&mut session, &mut stdout)?,
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if command == Command::Quit {
            break;
        }
        run(&mut session, command, &mut stdout)?;
    }
    Ok(())
}

fn run(session: &mut Session, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Open(path) => return open(session, Path::new(path), out),
        Command::Sheets => {
            let failed = session.failed_sheets().iter().map(|error| error.sheet.as_str()).collect::<Vec<_>>();
            let available = session.available_sheets();
            writeln!(out, "Chartable sheets:")?;
            for (number, sheet) in available.iter().enumerate() {
                let current = if session.sheet() == Some(sheet.as_str()) { "*" } else { " " };
                let status = if failed.contains(&sheet.as_str()) { " (failed)" } else { "" };
                writeln!(out, " {current}{}. {sheet}{status}", number + 1)?;
            }
            let others = session
                .all_sheets()
                .into_iter()
                .filter(|sheet| !available.contains(sheet))
                .collect::<Vec<_>>();
            if !others.is_empty() {
                writeln!(out, "Other sheets (raw preview only): {}", others.join(", "))?;
            }
        }
        Command::Sheet(sheet) => {
            let available = session.available_sheets();
            let sheet = sheet
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .and_then(|index| available.get(index).cloned())
                .unwrap_or_else(|| sheet.to_owned());
            if session.select_sheet(&sheet).is_ok() {
                show_chart_summary(session, out)?;
            }
        }
        Command::Metrics(None) => {
            for metric in session.metrics() {
                let mark = if session.selection().contains(&metric) { "x" } else { " " };
                writeln!(out, " [{mark}] {metric}")?;
            }
        }
        Command::Metrics(Some(requested)) => {
            let requested = if requested.eq_ignore_ascii_case("none") {
                Vec::new()
            } else {
                requested.split(',').map(str::trim).filter(|name| !name.is_empty()).collect::<Vec<_>>()
            };
            let selected = session.select_metrics(requested.as_slice()).to_vec();
            if selected.len() < requested.len() {
                writeln!(out, "Ignored metrics not in the table")?;
            }
            show_chart_summary(session, out)?;
        }
        Command::Kind(kind) => match kind.parse::<ChartKind>() {
            Ok(kind) => {
                session.set_chart_kind(kind);
                show_chart_summary(session, out)?;
            }
            Err(error) => writeln!(out, "{error}")?,
        },
        Command::Chart => match session.chart() {
            Some(chart) => writeln!(out, "{}", chart.to_json()?)?,
            None => writeln!(out, "Nothing plotted")?,
        },
        Command::Table => match session.table_preview() {
            Some(preview) => write!(out, "{preview}")?,
            None => writeln!(out, "No sheet loaded")?,
        },
        Command::Raw(sheet) => match session.raw_preview(sheet, session.config().preview_rows) {
            Ok(preview) => write!(out, "{preview}")?,
            Err(error) => writeln!(out, "{error}")?,
        },
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Unknown(line) => writeln!(out, "Unknown command '{line}', try 'help'")?,
        Command::Quit => {}
    }
    print_notices(session, out)
}

fn open(session: &mut Session, path: &Path, out: &mut impl Write) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match std::fs::read(path) {
        Ok(bytes) => {
            if session.upload(&file_name, bytes).is_ok() {
                print_notices(session, out)?;
                if let Some(first) = session.available_sheets().first() {
                    if session.select_sheet(first).is_ok() {
                        show_chart_summary(session, out)?;
                    }
                }
            }
        }
        Err(error) => writeln!(out, "Could not read {}: {error}", path.display())?,
    }
    print_notices(session, out)
}

fn show_chart_summary(session: &Session, out: &mut impl Write) -> Result<()> {
    if let Some(heading) = session.heading() {
        writeln!(out, "{heading}")?;
    }
    if let Some(chart) = session.chart() {
        let names = chart.series.iter().map(|series| series.name.as_str()).collect::<Vec<_>>();
        writeln!(
            out,
            "{} ({} chart, {} periods): {}",
            chart.title,
            chart.kind,
            chart.x_axis.categories.len(),
            names.join(", ")
        )?;
    }
    Ok(())
}

fn print_notices(session: &mut Session, out: &mut impl Write) -> Result<()> {
    for notice in session.take_notices() {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_spaced_arguments() {
        assert_eq!(Command::parse("  "), None);
        assert_eq!(Command::parse("sheet Profit & Loss"), Some(Command::Sheet("Profit & Loss")));
        assert_eq!(Command::parse("METRICS Sales, Net profit"), Some(Command::Metrics(Some("Sales, Net profit"))));
        assert_eq!(Command::parse("metrics"), Some(Command::Metrics(None)));
        assert_eq!(Command::parse("raw  Notes "), Some(Command::Raw("Notes")));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn missing_arguments_are_unknown() {
        assert_eq!(Command::parse("sheet"), Some(Command::Unknown("sheet")));
        assert_eq!(Command::parse("chart now"), Some(Command::Unknown("chart now")));
    }

    #[test]
    fn cli_arguments() {
        let cli = Cli::parse_from(["screener_sheet", "ACME.xlsx", "--dashboard", "fixed"]);

        assert_eq!(cli.file, Some(PathBuf::from("ACME.xlsx")));
        assert_eq!(cli.dashboard, Dashboard::Fixed);
        assert!(cli.config.is_none());
    }

    #[test]
    fn commands_without_a_file_report_it() {
        let mut session = Session::default();
        let mut out = Vec::new();
        run(&mut session, Command::Table, &mut out).unwrap();
        run(&mut session, Command::Chart, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("No sheet loaded\n"));
        assert!(text.contains("Nothing plotted"));
    }
}
