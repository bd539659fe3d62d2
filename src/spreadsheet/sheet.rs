use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::CellRef;
use std::collections::HashMap;

/// A worksheet held in memory as a sparse grid of populated cells.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name as declared in the workbook
    pub name: String,
    /// All populated cells in document order
    pub(crate) cells: Vec<Cell>,
    /// Index mapping from (row, column) to cell vector position
    indexes: HashMap<(usize, usize), usize>,
    /// Actual data range (determined from cell data)
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet. A later cell at the same position replaces the earlier one.
    pub fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        match self.indexes.get(&(cell.row, cell.col)) {
            Some(&index) => self.cells[index] = cell,
            None => {
                self.indexes.insert((cell.row, cell.col), self.cells.len());
                self.cells.push(cell);
            }
        }
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Number of rows from the top of the sheet to the last populated row.
    pub fn row_count(&self) -> usize {
        self.row_upper_bound.map(|row| row + 1).unwrap_or(0)
    }

    /// Number of columns from column A to the last populated column.
    pub fn col_count(&self) -> usize {
        self.col_upper_bound.map(|col| col + 1).unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.indexes
            .get(&(row, col))
            .and_then(|index| self.cells.get(*index))
    }

    /// Text at (row, col); missing cells and out-of-range positions read as blank.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.get(row, col).map(Cell::text).unwrap_or("")
    }

    /// Trimmed, lowercased text at (row, col), the form marker tokens are matched against.
    pub fn folded(&self, row: usize, col: usize) -> String {
        self.text(row, col).trim().to_lowercase()
    }

    /// Reads the cell at an optional fixed coordinate.
    ///
    /// Returns `None` when no coordinate is configured; a configured coordinate
    /// outside the populated grid reads as blank text.
    pub fn text_at(&self, at: Option<CellRef>) -> Option<&str> {
        at.map(|at| self.text(at.row, at.col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell::new(row, col, CellType::InlineString, value));
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("GOFO-报价");

        assert!(sheet.is_empty());
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.col_count(), 0);
        assert_eq!(sheet.text(0, 0), "");
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 1, 3, "b");
        push(&mut sheet, 3, 1, "c");
        push(&mut sheet, 3, 3, "d");

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.row_count(), 4);
        assert_eq!(sheet.col_count(), 4);
        assert_eq!(sheet.text(3, 1), "c");
        assert_eq!(sheet.text(2, 2), "");
        assert_eq!(sheet.text(99, 99), "");
    }

    #[test]
    fn later_cell_replaces_earlier() {
        let mut sheet = Sheet::new("");
        push(&mut sheet, 0, 0, "old");
        push(&mut sheet, 0, 0, "new");

        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.text(0, 0), "new");
    }

    #[test]
    fn folded_and_fixed_coordinate_reads() {
        let mut sheet = Sheet::new("");
        push(&mut sheet, 1, 0, "  Weight (LB) ");

        assert_eq!(sheet.folded(1, 0), "weight (lb)");
        assert_eq!(sheet.text_at(None), None);
        assert_eq!(sheet.text_at(Some(CellRef::new(1, 0))), Some("  Weight (LB) "));
        assert_eq!(sheet.text_at(Some(CellRef::new(500, 40))), Some(""));
    }
}
