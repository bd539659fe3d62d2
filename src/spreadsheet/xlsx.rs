use crate::error::RateCardError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use tracing::warn;
use zip::ZipArchive;

// XML tag names for parsing the SpreadsheetML parts
const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_SHARED_STRING_ITEM: QName = QName(b"si"); // Shared string table item
const TAG_SHEET: QName = QName(b"sheet");           // Worksheet declaration in workbook.xml
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

const PART_WORKBOOK: &str = "xl/workbook.xml";
const PART_WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const PART_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Reader over an xlsx package
pub(crate) struct XlsxReader<RS: Read + Seek> {
    /// File name of the workbook, used in diagnostics
    name: String,
    zip: ZipArchive<RS>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
    shared_strings: Vec<String>,
}

impl<RS: Read + Seek> XlsxReader<RS> {
    /// Opens the package and loads the workbook structure and shared strings.
    pub(crate) fn new(name: &str, reader: RS) -> Result<Self, RateCardError> {
        let mut zip = ZipArchive::new(reader)?;
        let sheets = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }
        let shared_strings = load_shared_strings(&mut zip)?;
        Ok(XlsxReader {
            name: name.to_owned(),
            zip,
            sheets,
            shared_strings,
        })
    }

    /// Reads every worksheet. A sheet that fails to parse is logged and left out.
    pub(crate) fn read_sheets(&mut self) -> Vec<Sheet> {
        let entries = std::mem::take(&mut self.sheets);
        let mut sheets = Vec::with_capacity(entries.len());
        for (sheet_name, zip_path) in &entries {
            match self.read_sheet(sheet_name, zip_path) {
                Ok(sheet) => sheets.push(sheet),
                Err(error) => warn!(workbook = %self.name, sheet = %sheet_name, %error, "worksheet skipped"),
            }
        }
        self.sheets = entries;
        sheets
    }

    /// Parses a worksheet part into a sparse grid.
    fn read_sheet(&mut self, sheet_name: &str, zip_path: &str) -> Result<Sheet, RateCardError> {
        let mut sheet = Sheet::new(sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let shared_strings = &self.shared_strings;
        let workbook = self.name.as_str();
        let mut reader = self.zip.xml_reader(zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(index) = event.get_attribute_value("r")?.and_then(|r| row_to_index(&r)) {
                    row_count = index;
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                kind = CellType::from_attribute(event.get_attribute_value("t")?.as_deref());
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = reader.read_text(TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = reader.read_text(TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind == CellType::Error {
                    debug!(sheet = %sheet_name, cell = %index_to_reference(row, col), %value, "error value read as blank");
                } else if !value.is_empty() {
                    if kind == CellType::SharedString {
                        value = resolve_shared_string(shared_strings, &value)
                            .ok_or_else(|| SpreadsheetError::SharedStringIndexError(
                                workbook.to_owned(),
                                sheet_name.to_owned(),
                                index_to_reference(row, col),
                                value.to_owned(),
                            ))?;
                    }
                    sheet.push(Cell::new(row, col, kind, value.to_owned()));
                }
                kind = CellType::default();
                value.clear();
            }
        });
        Ok(sheet)
    }
}

/// Looks up a shared string by the index written in a cell value.
fn resolve_shared_string(shared_strings: &[String], index: &str) -> Option<String> {
    index.trim()
        .parse::<usize>()
        .ok()
        .and_then(|index| shared_strings.get(index))
        .cloned()
}

/// Loads worksheet relationships: relationship id → zip path of the part.
fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<HashMap<String, String>, RateCardError> {
    let mut reader = zip.xml_reader(PART_WORKBOOK_RELS)?
        .ok_or_else(|| SpreadsheetError::FileError(PART_WORKBOOK_RELS.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships matter
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Lists the worksheets declared in workbook.xml as (name, zip_path) pairs.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<(String, String)>, RateCardError> {
    let relationships = load_relationships(zip)?;
    let mut reader = zip.xml_reader(PART_WORKBOOK)?
        .ok_or_else(|| SpreadsheetError::FileError(PART_WORKBOOK.to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads the shared string table; a package without one has no shared strings.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, RateCardError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader(PART_SHARED_STRINGS)? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(reader.read_text(TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Normalizes a relationship target to a path inside the archive.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::write_workbook;
    use std::fs::File;
    use std::io::BufReader;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path(Cow::from("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("xl/worksheets/sheet2.xml")), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn reads_shared_and_numeric_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T0.xlsx");
        write_workbook(&path, &[
            ("GOFO-报价", vec![vec!["Weight", "Zone1", "Zone2"], vec!["1", "5.00", "6"]]),
            ("库内操作费", vec![vec!["", "0-1LB", "", "免费"]]),
        ]);

        let file = File::open(&path).unwrap();
        let mut reader = XlsxReader::new("T0.xlsx", BufReader::new(file)).unwrap();
        let sheets = reader.read_sheets();

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "GOFO-报价");
        assert_eq!(sheets[0].text(0, 1), "Zone1");
        assert_eq!(sheets[0].get(0, 1).unwrap().kind, CellType::SharedString);
        assert_eq!(sheets[0].text(1, 1), "5.00");
        assert_eq!(sheets[0].get(1, 1).unwrap().kind, CellType::Number);
        assert_eq!(sheets[1].name, "库内操作费");
        assert_eq!(sheets[1].text(0, 0), "");
        assert_eq!(sheets[1].text(0, 3), "免费");
        assert_eq!(sheets[1].col_count(), 4);
    }

    #[test]
    fn rejects_non_zip_input() {
        let bytes = std::io::Cursor::new(b"not a workbook".to_vec());
        assert!(XlsxReader::new("broken.xlsx", bytes).is_err());
    }
}
