//! XML parsing utilities for the SpreadsheetML parts of an xlsx package
//! Provides an event reader wrapper plus attribute and rich-text helpers

use crate::error::RateCardError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

const TAG_PHONETIC_TEXT: QName = QName(b"rPh"); // Phonetic run, never part of the cell text
const TAG_TEXT: QName = QName(b"t");

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for worksheet parsing
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of document
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RateCardError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RateCardError::XmlError(error)),
        }
    }

    /// Collects the text of the current element up to `end_tag`.
    ///
    /// Rich-text runs (`<r><t>..</t></r>`) are concatenated and phonetic
    /// annotations are skipped. With `is_text_content` the element body itself
    /// is text (as in `<v>`), otherwise only `<t>` children count.
    pub(crate) fn read_text(&mut self, end_tag: QName, is_text_content: bool) -> Result<String, RateCardError> {
        let mut is_phonetic_text = false;
        let mut is_text = is_text_content;
        let mut text = String::new();
        crate::match_xml_events!(self => {
            Event::End(event) if event.name() == end_tag => break,
            Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
            Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
            Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
            Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
            Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
            Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }
}

/// Helper trait for XML attributes
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, RateCardError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, RateCardError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML start tags providing attribute lookup by name
pub(crate) trait XmlNodeHelper<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RateCardError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RateCardError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }
}

/// Appends entity and character references to a text buffer
pub(crate) trait XmlTextContextHelper {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RateCardError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RateCardError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

/// Drives an `XmlReader` until end of document, dispatching each event to the
/// given match arms. Unmatched events are ignored.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(xml: &str) -> XmlReader<Cursor<Vec<u8>>> {
        XmlReader::new(Cursor::new(xml.as_bytes().to_vec()))
    }

    #[test]
    fn read_text_joins_rich_text_runs() {
        let mut reader = reader("<si><r><t>GOFO</t></r><r><t>-报价</t></r></si>");
        reader.next().unwrap(); // <si>
        let text = reader.read_text(QName(b"si"), false).unwrap();
        assert_eq!(text, "GOFO-报价");
    }

    #[test]
    fn read_text_skips_phonetic_runs() {
        let mut reader = reader("<si><t>重量</t><rPh><t>じゅうりょう</t></rPh></si>");
        reader.next().unwrap();
        let text = reader.read_text(QName(b"si"), false).unwrap();
        assert_eq!(text, "重量");
    }

    #[test]
    fn read_text_resolves_references() {
        let mut reader = reader("<v>A&amp;B&#x41;&#66;</v>");
        reader.next().unwrap();
        let text = reader.read_text(QName(b"v"), true).unwrap();
        assert_eq!(text, "A&BAB");
    }
}
