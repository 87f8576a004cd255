//! Builds small `.xlsx` workbooks in memory.
#![allow(dead_code)]

use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

#[derive(Clone, Debug)]
pub enum Value {
    Empty,
    Text(String),
    Number(f64),
    /// Serial day number styled with the built-in date format
    Date(f64),
    Bool(bool),
}

pub fn t(text: &str) -> Value {
    Value::Text(text.to_owned())
}

pub fn n(number: f64) -> Value {
    Value::Number(number)
}

enum Content {
    Rows(Vec<Vec<Value>>),
    /// Literal `<sheetData>` children
    Xml(String),
}

pub struct WorkbookBuilder {
    sheets: Vec<(String, Content)>,
    shared_strings: bool,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        WorkbookBuilder {
            sheets: Vec::new(),
            shared_strings: false,
        }
    }

    /// Stores text in the shared string table instead of inline.
    pub fn with_shared_strings(mut self) -> Self {
        self.shared_strings = true;
        self
    }

    pub fn sheet(mut self, name: &str, rows: Vec<Vec<Value>>) -> Self {
        self.sheets.push((name.to_owned(), Content::Rows(rows)));
        self
    }

    /// Adds a sheet whose `<sheetData>` is written exactly as given.
    pub fn sheet_xml(mut self, name: &str, sheet_data: &str) -> Self {
        self.sheets.push((name.to_owned(), Content::Xml(sheet_data.to_owned())));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut shared = Vec::<String>::new();
        let worksheets = self
            .sheets
            .iter()
            .map(|(_, content)| match content {
                Content::Rows(rows) => self.worksheet_xml(rows, &mut shared),
                Content::Xml(data) => worksheet(data),
            })
            .collect::<Vec<_>>();

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let mut part = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        part("[Content_Types].xml", &self.content_types_xml());
        part("_rels/.rels", ROOT_RELATIONSHIPS);
        part("xl/workbook.xml", &self.workbook_xml());
        part("xl/_rels/workbook.xml.rels", &self.relationships_xml());
        part("xl/styles.xml", STYLES);
        if self.shared_strings {
            part("xl/sharedStrings.xml", &shared_strings_xml(&shared));
        }
        for (index, xml) in worksheets.iter().enumerate() {
            part(&format!("xl/worksheets/sheet{}.xml", index + 1), xml);
        }
        zip.finish().unwrap().into_inner()
    }

    fn workbook_xml(&self) -> String {
        let sheets = self
            .sheets
            .iter()
            .enumerate()
            .map(|(index, (name, _))| {
                format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, escape(name), index + 1, index + 1)
            })
            .collect::<String>();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr/><sheets>{sheets}</sheets></workbook>"#
        )
    }

    fn relationships_xml(&self) -> String {
        let mut relationships = (0..self.sheets.len())
            .map(|index| {
                format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                    index + 1,
                    index + 1
                )
            })
            .collect::<String>();
        relationships.push_str(r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        )
    }

    fn content_types_xml(&self) -> String {
        let overrides = (0..self.sheets.len())
            .map(|index| {
                format!(
                    r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                    index + 1
                )
            })
            .collect::<String>();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
        )
    }

    fn worksheet_xml(&self, rows: &[Vec<Value>], shared: &mut Vec<String>) -> String {
        let mut data = String::new();
        for (row, values) in rows.iter().enumerate() {
            if values.is_empty() {
                continue;
            }
            data.push_str(&format!(r#"<row r="{}">"#, row + 1));
            for (col, value) in values.iter().enumerate() {
                let reference = format!("{}{}", column_letter(col), row + 1);
                let cell = match value {
                    Value::Empty => continue,
                    Value::Text(text) if self.shared_strings => {
                        let index = shared.iter().position(|it| it == text).unwrap_or_else(|| {
                            shared.push(text.clone());
                            shared.len() - 1
                        });
                        format!(r#"<c r="{reference}" t="s"><v>{index}</v></c>"#)
                    }
                    Value::Text(text) => {
                        format!(r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#, escape(text))
                    }
                    Value::Number(number) => format!(r#"<c r="{reference}"><v>{number}</v></c>"#),
                    Value::Date(serial) => format!(r#"<c r="{reference}" s="1"><v>{serial}</v></c>"#),
                    Value::Bool(flag) => format!(r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*flag)),
                };
                data.push_str(&cell);
            }
            data.push_str("</row>");
        }
        worksheet(&data)
    }
}

fn worksheet(data: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
}

fn shared_strings_xml(strings: &[String]) -> String {
    let items = strings
        .iter()
        .map(|text| format!("<si><t>{}</t></si>", escape(text)))
        .collect::<String>();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{items}</sst>"#,
        strings.len()
    )
}

fn column_letter(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push((b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters.iter().rev().collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const ROOT_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#;

/// A statement sheet the way Screener lays it out: company banner, blank row,
/// then the header with metric names down column A.
pub fn statement(periods: &[&str], metrics: &[(&str, Vec<Value>)]) -> Vec<Vec<Value>> {
    let mut rows = vec![vec![t("COMPANY NAME"), t("ACME LTD")], vec![]];
    rows.push(std::iter::once(t("Narration")).chain(periods.iter().map(|period| t(period))).collect());
    for (name, values) in metrics {
        rows.push(std::iter::once(t(name)).chain(values.iter().cloned()).collect());
    }
    rows
}

/// A workbook with every recognized sheet except Cash Flow, plus a notes sheet.
pub fn screener_export() -> WorkbookBuilder {
    let years = ["Mar-21", "Mar-22", "Mar-23"];
    WorkbookBuilder::new()
        .sheet("Profit & Loss", statement(&years, &[
            ("Sales", vec![n(100.0), n(120.0), n(150.0)]),
            ("Expenses", vec![n(80.0), t("N/A"), n(110.0)]),
            ("Net profit", vec![n(20.0), n(25.0), n(40.0)]),
        ]))
        .sheet("Balance Sheet", statement(&years, &[
            ("Reserves", vec![n(300.0), n(320.0), n(360.0)]),
            ("Borrowings", vec![n(50.0), n(40.0), n(30.0)]),
        ]))
        .sheet("Ratios", vec![
            vec![t("Year"), t("ROE"), t("ROCE"), t("Debt/Equity")],
            vec![t("Mar-22"), n(12.5), n(15.0), n(0.4)],
            vec![t("Mar-23"), n(14.0), n(16.5), n(0.3)],
        ])
        .sheet("Quarters", vec![
            vec![t("Quarter"), t("Sales"), t("Net profit")],
            vec![t("Jun-23"), n(30.0), n(5.0)],
            vec![t("Sep-23"), n(32.0), n(6.0)],
            vec![t("Dec-23"), n(35.0), n(7.0)],
        ])
        .sheet("Notes", vec![vec![t("Prepared from annual reports")]])
}
