//! # Spreadsheet Module
//!
//! Reads xlsx workbooks into in-memory sheets of cells. Rate cards are small
//! (a few thousand rows per sheet), so every worksheet of a workbook is parsed
//! up front and the resulting [`Workbook`] is immutable and freely shared
//! between extraction threads.
use crate::error::RateCardError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

pub mod cell;
pub mod reference;
pub mod sheet;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod testing;

pub use cell::Cell;
pub use cell::CellType;
pub use reference::CellRef;
pub use sheet::Sheet;

/// Structural problems of a workbook package.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing package part '{0}'")]
    FileError(String),

    #[error("Spreadsheet '{0}' declares no worksheet")]
    SpreadsheetEmptyError(String),

    #[error("Spreadsheet '{0}' sheet '{1}' cell {2}: invalid shared string index '{3}'")]
    SharedStringIndexError(String, String, String, String),
}

/// A parsed workbook: its worksheets in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    /// File name of the workbook
    pub name: String,
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Opens an xlsx file and reads all of its worksheets.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Workbook, RateCardError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        let mut reader = xlsx::XlsxReader::new(&name, BufReader::new(file))?;
        let sheets = reader.read_sheets();
        Ok(Workbook { name, sheets })
    }

    /// Builds a workbook from sheets already in memory.
    pub fn from_sheets(name: &str, sheets: Vec<Sheet>) -> Workbook {
        Workbook {
            name: name.to_owned(),
            sheets,
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Resolves a configured sheet name: exact match first, then the first
    /// sheet whose name contains `target`.
    pub fn find_sheet(&self, target: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == target)
            .or_else(|| self.sheets.iter().find(|sheet| sheet.name.contains(target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::write_workbook;

    fn workbook(names: &[&str]) -> Workbook {
        Workbook::from_sheets("T0.xlsx", names.iter().map(|name| Sheet::new(name)).collect())
    }

    #[test]
    fn find_sheet_prefers_exact_match() {
        let workbook = workbook(&["FedEx-632-MT-报价(新)", "FedEx-632-MT-报价"]);
        assert_eq!(workbook.find_sheet("FedEx-632-MT-报价").unwrap().name, "FedEx-632-MT-报价");
    }

    #[test]
    fn find_sheet_falls_back_to_substring() {
        let workbook = workbook(&["说明", "2026 GOFO-报价 v2"]);
        assert_eq!(workbook.find_sheet("GOFO-报价").unwrap().name, "2026 GOFO-报价 v2");
        assert!(workbook.find_sheet("XLmiles-报价").is_none());
    }

    #[test]
    fn open_reads_sheets_in_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T1.xlsx");
        write_workbook(&path, &[("A", vec![vec!["1"]]), ("B", vec![vec!["2"]]), ("C", vec![])]);

        let workbook = Workbook::open(&path).unwrap();
        assert_eq!(workbook.name, "T1.xlsx");
        let names: Vec<_> = workbook.sheets().iter().map(|sheet| sheet.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(workbook.find_sheet("C").unwrap().is_empty());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Workbook::open(dir.path().join("T9.xlsx")).is_err());
    }
}
