//! ZIP code → city/state/region table.
//!
//! The table sits at the bottom of a rate sheet, below the prices, so its
//! header is searched bottom-up.
use crate::catalog::state_name;
use crate::dataset::ZipRecord;
use crate::extract::locate::find_header;
use crate::extract::locate::Marker;
use crate::extract::locate::SearchWindow;
use crate::extract::Extraction;
use crate::extract::Note;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::Workbook;
use std::collections::BTreeMap;

/// Rows above the end of the sheet searched for the table header.
const HEADER_SEARCH_ROWS: usize = 600;

/// Column of each field in the table header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Columns {
    zip: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    region: Option<usize>,
}

impl Columns {
    fn from_header(sheet: &Sheet, row: usize) -> Columns {
        let mut columns = Columns::default();
        for col in 0..sheet.col_count() {
            let text = sheet.text(row, col).trim();
            if text.contains("邮编") {
                columns.zip = Some(col);
            } else if text.contains("城市") {
                columns.city = Some(col);
            } else if text.contains("省州") {
                columns.state = Some(col);
            } else if text.contains("大区") {
                columns.region = Some(col);
            }
        }
        columns
    }
}

pub fn extract(workbook: &Workbook, sheet_name: &str) -> Extraction<BTreeMap<String, ZipRecord>> {
    let Some(sheet) = workbook.find_sheet(sheet_name) else {
        return Extraction::with_note(BTreeMap::new(), Note::MissingSheet(sheet_name.to_owned()));
    };
    let window = SearchWindow::backward(sheet, HEADER_SEARCH_ROWS);
    let Some(header) = find_header(sheet, &window, &[Marker::Zip]) else {
        return Extraction::with_note(BTreeMap::new(), Note::HeaderNotFound(sheet.name.to_owned()));
    };
    let columns = Columns::from_header(sheet, header.row);
    let Some(zip_col) = columns.zip else {
        return Extraction::with_note(BTreeMap::new(), Note::HeaderNotFound(sheet.name.to_owned()));
    };

    let field = |row: usize, col: Option<usize>| -> String {
        col.map(|col| sheet.text(row, col).trim().to_owned()).unwrap_or_default()
    };
    let mut table = BTreeMap::new();
    let mut skipped = 0;
    for row in header.row + 1..sheet.row_count() {
        let text = sheet.text(row, zip_col);
        if text.trim().is_empty() {
            continue;
        }
        let Some(zip) = normalize_zip(text) else {
            skipped += 1;
            continue;
        };
        let state = field(row, columns.state).to_uppercase();
        let cn_state = state_name(&state).map(str::to_owned).unwrap_or_else(|| state.clone());
        table.insert(zip, ZipRecord {
            city: field(row, columns.city),
            state,
            cn_state,
            region: field(row, columns.region),
        });
    }

    let mut extraction = Extraction::clean(table);
    if skipped > 0 {
        extraction.note(Note::SkippedRows {
            sheet: sheet.name.to_owned(),
            count: skipped,
        });
    }
    extraction
}

/// Five-digit ZIP of a cell, restoring leading zeros lost to numeric cells.
pub fn normalize_zip(text: &str) -> Option<String> {
    let digits = text.split('.').next().unwrap_or_default().trim();
    let zip = format!("{digits:0>5}");
    (zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())).then_some(zip)
}
