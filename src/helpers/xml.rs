//! Pull reading of the SpreadsheetML parts inside a workbook archive.
use crate::error::ScreenerError;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use std::io::BufRead;
use std::str::FromStr;

/// Runs the given arms over every event left in a [`PartReader`], ignoring the rest.
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(event) = $reader.next()? {
            match event {
                $($arms)*
                _ => (),
            }
        }
    };
}

pub(crate) use match_xml_events;

const TAG_TEXT: QName = QName(b"t");
const TAG_PHONETIC_RUN: QName = QName(b"rPh");

/// Event reader over one part; `<c/>` yields a start and an end like `<c></c>`.
pub(crate) struct PartReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> PartReader<R> {
    pub(crate) fn new(source: R) -> PartReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);
        PartReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Next event, `None` at the end of the part.
    pub(crate) fn next(&mut self) -> Result<Option<Event<'_>>, ScreenerError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }

    /// Collects the text of the element just opened, consuming events up to its `end` tag.
    ///
    /// A cell value (`<v>`) is text throughout. Rich strings (`<si>`, `<is>`) only
    /// count their `<t>` runs, and phonetic guides (`<rPh>`) are left out.
    pub(crate) fn read_text(&mut self, end: QName, runs_only: bool) -> Result<String, ScreenerError> {
        let mut in_phonetic_run = false;
        let mut in_text = !runs_only;
        let mut text = String::new();
        match_xml_events!(self => {
            Event::End(event) if event.name() == end => break,
            Event::Start(event) if event.name() == TAG_PHONETIC_RUN => in_phonetic_run = true,
            Event::End(event) if event.name() == TAG_PHONETIC_RUN => in_phonetic_run = false,
            Event::Start(event) if !in_phonetic_run && event.name() == TAG_TEXT => in_text = true,
            Event::End(event) if in_text && event.name() == TAG_TEXT => in_text = false,
            Event::Text(event) if in_text => text.push_str(&event.xml_content()?),
            Event::CData(event) if in_text => text.push_str(&event.decode()?),
            Event::GeneralRef(event) if in_text => push_reference(&mut text, &event)?,
        });
        Ok(text)
    }
}

/// Appends what an entity (`&amp;`) or character reference (`&#8377;`) stands for.
fn push_reference(text: &mut String, reference: &BytesRef) -> Result<(), ScreenerError> {
    let raw = reference.xml_content()?;
    let resolved = match raw.strip_prefix('#') {
        Some(code) => {
            let code = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => code.parse::<u32>()?,
            };
            char::from_u32(code).map(String::from)
        }
        None => resolve_xml_entity(&raw).map(str::to_owned),
    };
    match resolved {
        Some(resolved) => {
            text.push_str(&resolved);
            Ok(())
        }
        None => Err(SpreadsheetError::EntityError(raw.into_owned()).into()),
    }
}

/// Attribute lookup on start tags, by local name so `r:id` answers to `id`.
pub(crate) trait ElementAttributes {
    /// Unescaped value of the attribute.
    fn attribute(&self, name: &str) -> Result<Option<String>, ScreenerError>;

    /// Attribute value parsed as `T`.
    fn parsed_attribute<T: FromStr>(&self, name: &str) -> Result<Option<T>, ScreenerError> {
        let Some(value) = self.attribute(name)? else {
            return Ok(None);
        };
        let parsed = value.trim().parse::<T>();
        match parsed {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(SpreadsheetError::AttributeError {
                name: name.to_owned(),
                value,
            }
            .into()),
        }
    }

    /// Boolean attribute in either XML form (`1`/`true`); absent means false.
    fn flag(&self, name: &str) -> Result<bool, ScreenerError> {
        Ok(matches!(self.attribute(name)?.as_deref(), Some("1" | "true")))
    }
}

impl ElementAttributes for BytesStart<'_> {
    fn attribute(&self, name: &str) -> Result<Option<String>, ScreenerError> {
        for attribute in self.attributes() {
            let attribute = attribute?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }
            if attribute.key.local_name().as_ref() == name.as_bytes() {
                return Ok(Some(attribute.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(xml: &str, runs_only: bool) -> Result<String, ScreenerError> {
        let mut reader = PartReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(b"si") => {
                text = reader.read_text(QName(b"si"), runs_only)?;
            }
        });
        Ok(text)
    }

    #[test]
    fn resolves_entity_and_character_references() {
        assert_eq!(text_of("<si><t>Profit &amp; Loss</t></si>", true).unwrap(), "Profit & Loss");
        assert_eq!(text_of("<si><t>&#8377;&#x20;Cr</t></si>", true).unwrap(), "\u{20b9} Cr");
    }

    #[test]
    fn unknown_references_are_errors() {
        let error = text_of("<si><t>&bogus;</t></si>", true).unwrap_err();
        assert_eq!(error.to_string(), "Unknown entity reference '&bogus;'");
        assert!(text_of("<si><t>&#xD800;</t></si>", true).is_err());
    }

    #[test]
    fn rich_text_keeps_runs_and_skips_phonetic_guides() {
        let xml = "<si><r><t>Net </t></r>x<r><t>Profit</t></r><rPh><t>ignored</t></rPh></si>";
        assert_eq!(text_of(xml, true).unwrap(), "Net Profit");
        assert_eq!(text_of("<si>12.5</si>", false).unwrap(), "12.5");
    }

    #[test]
    fn reads_attributes_by_local_name() -> Result<(), ScreenerError> {
        let xml = r#"<sheet xmlns:r="urn:r" name="P&amp;L" r:id="rId3" s=" 4 " t="s" date1904="true"/>"#;
        let mut reader = PartReader::new(xml.as_bytes());
        let mut seen = false;
        match_xml_events!(reader => {
            Event::Start(event) => {
                assert_eq!(event.attribute("name")?.as_deref(), Some("P&L"));
                assert_eq!(event.attribute("id")?.as_deref(), Some("rId3"));
                assert_eq!(event.parsed_attribute::<usize>("s")?, Some(4));
                assert_eq!(event.attribute("missing")?, None);
                assert!(event.flag("date1904")?);
                assert!(!event.flag("missing")?);

                let error = event.parsed_attribute::<usize>("t").unwrap_err();
                assert_eq!(error.to_string(), "Attribute t=\"s\" is not a valid value");
                seen = true;
            }
        });
        assert!(seen);
        Ok(())
    }
}
