//! Header detection inside noisy sheets.
//!
//! Rate cards put their tables wherever the author liked, under banners,
//! notes and merged titles. A header row is recognized by the marker tokens
//! its cells carry rather than by position.
use crate::spreadsheet::Sheet;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static ZONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"zone\D*(\d+)").expect("Hardcode regex pattern"));

const WEIGHT_TOKENS: [&str; 4] = ["weight", "重量", "lb", "磅"];

/// Token group a header cell can carry. Cells are matched lowercased.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Weight column, in pounds: any weight token and no `kg`
    Weight,
    /// `Zone <n>` price column
    Zone,
    /// ZIP code column of the region table
    Zip,
}

impl Marker {
    pub fn matches(self, folded: &str) -> bool {
        match self {
            Marker::Weight => {
                WEIGHT_TOKENS.iter().any(|token| folded.contains(token)) && !folded.contains("kg")
            }
            Marker::Zone => zone_number(folded).is_some(),
            Marker::Zip => folded.contains("邮编"),
        }
    }
}

/// Zone number of a header cell such as `zone 3` or `Zone-8`.
pub fn zone_number(folded: &str) -> Option<u32> {
    ZONE_PATTERN
        .captures(folded)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Rows and columns a header may be found in, and the order rows are tried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
    pub direction: Direction,
}

impl SearchWindow {
    /// Top-down over `rows`, every column.
    pub fn forward(rows: Range<usize>) -> Self {
        SearchWindow {
            rows,
            cols: 0..usize::MAX,
            direction: Direction::Forward,
        }
    }

    /// Bottom-up over the last `limit` rows of the sheet, every column.
    pub fn backward(sheet: &Sheet, limit: usize) -> Self {
        let end = sheet.row_count();
        SearchWindow {
            rows: end.saturating_sub(limit)..end,
            cols: 0..usize::MAX,
            direction: Direction::Backward,
        }
    }

    pub fn columns(self, cols: Range<usize>) -> Self {
        SearchWindow { cols, ..self }
    }

    /// Clamps the column range to the populated width of the sheet.
    fn clamp_columns(&self, sheet: &Sheet) -> Range<usize> {
        self.cols.start..self.cols.end.min(sheet.col_count())
    }

    fn rows_in(&self, sheet: &Sheet) -> Box<dyn Iterator<Item = usize>> {
        let rows = self.rows.start..self.rows.end.min(sheet.row_count());
        match self.direction {
            Direction::Forward => Box::new(rows),
            Direction::Backward => Box::new(rows.rev()),
        }
    }
}

/// A recognized header row and, per requested marker, its columns ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderMatch {
    pub row: usize,
    markers: Vec<(Marker, Vec<usize>)>,
}

impl HeaderMatch {
    pub fn columns(&self, marker: Marker) -> &[usize] {
        self.markers
            .iter()
            .find(|(candidate, _)| *candidate == marker)
            .map(|(_, columns)| columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn first(&self, marker: Marker) -> Option<usize> {
        self.columns(marker).first().copied()
    }
}

/// Finds the first row, in window order, where every marker matches at least one cell.
pub fn find_header(sheet: &Sheet, window: &SearchWindow, markers: &[Marker]) -> Option<HeaderMatch> {
    let cols = window.clamp_columns(sheet);
    for row in window.rows_in(sheet) {
        let mut found: Vec<(Marker, Vec<usize>)> =
            markers.iter().map(|marker| (*marker, Vec::new())).collect();
        for col in cols.clone() {
            let folded = sheet.folded(row, col);
            if folded.is_empty() {
                continue;
            }
            for (marker, columns) in found.iter_mut() {
                if marker.matches(&folded) {
                    columns.push(col);
                }
            }
        }
        if found.iter().all(|(_, columns)| !columns.is_empty()) {
            return Some(HeaderMatch { row, markers: found });
        }
    }
    None
}

/// Columns with a cell matching `marker` anywhere in `rows`, ascending.
pub fn marker_columns(sheet: &Sheet, rows: Range<usize>, marker: Marker) -> Vec<usize> {
    let rows = rows.start..rows.end.min(sheet.row_count());
    (0..sheet.col_count())
        .filter(|col| rows.clone().any(|row| marker.matches(&sheet.folded(row, *col))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::sheet;

    #[test]
    fn weight_marker_rejects_kilograms() {
        assert!(Marker::Weight.matches("weight (lb)"));
        assert!(Marker::Weight.matches("重量"));
        assert!(Marker::Weight.matches("磅数"));
        assert!(!Marker::Weight.matches("weight (kg)"));
        assert!(!Marker::Weight.matches("zone 1"));
    }

    #[test]
    fn zone_numbers() {
        assert_eq!(zone_number("zone1"), Some(1));
        assert_eq!(zone_number("zone - 8"), Some(8));
        assert_eq!(zone_number("zone"), None);
        assert_eq!(zone_number("weight"), None);
        assert!(Marker::Zip.matches("收件邮编"));
    }

    #[test]
    fn forward_scan_finds_first_complete_row() {
        let sheet = sheet("GOFO-报价", vec![
            vec!["GOFO rate card"],
            vec!["Weight", "note"],
            vec!["Weight (LB)", "Zone 1", "", "Zone 2"],
            vec!["Weight", "Zone 3"],
        ]);
        let header = find_header(&sheet, &SearchWindow::forward(0..200), &[Marker::Weight, Marker::Zone]).unwrap();

        assert_eq!(header.row, 2);
        assert_eq!(header.first(Marker::Weight), Some(0));
        assert_eq!(header.columns(Marker::Zone), &[1, 3]);
        assert_eq!(header.columns(Marker::Zip), &[] as &[usize]);
    }

    #[test]
    fn forward_scan_respects_columns() {
        let sheet = sheet("split", vec![
            vec!["Weight", "Zone1", "", "Weight", "Zone1"],
        ]);
        let window = SearchWindow::forward(0..200).columns(3..usize::MAX);
        let header = find_header(&sheet, &window, &[Marker::Weight, Marker::Zone]).unwrap();

        assert_eq!(header.columns(Marker::Weight), &[3]);
        assert_eq!(header.columns(Marker::Zone), &[4]);
        assert!(find_header(&sheet, &SearchWindow::forward(0..200).columns(1..3), &[Marker::Weight]).is_none());
    }

    #[test]
    fn backward_scan_finds_last_matching_row() {
        let sheet = sheet("GOFO-报价", vec![
            vec!["邮编 note"],
            vec!["1", "2"],
            vec!["邮编", "城市"],
            vec!["08691", "Robbinsville"],
        ]);

        let header = find_header(&sheet, &SearchWindow::backward(&sheet, 600), &[Marker::Zip]).unwrap();
        assert_eq!(header.row, 2);

        let header = find_header(&sheet, &SearchWindow::backward(&sheet, 1), &[Marker::Zip]);
        assert!(header.is_none());
    }

    #[test]
    fn missing_header() {
        let sheet = sheet("blank", vec![vec!["price list"], vec!["1", "2"]]);
        assert!(find_header(&sheet, &SearchWindow::forward(0..200), &[Marker::Weight, Marker::Zone]).is_none());
    }

    #[test]
    fn weight_columns_within_rows() {
        let mut rows = vec![vec![""; 11]; 60];
        rows[3][0] = "Weight";
        rows[5][10] = "重量";
        rows[55][6] = "Weight";
        let sheet = sheet("split", rows);

        assert_eq!(marker_columns(&sheet, 0..50, Marker::Weight), vec![0, 10]);
    }
}
