use crate::spreadsheet::reference::index_to_reference;
use std::fmt::Display;

/// Types of cell data in a worksheet, as declared by the `t` attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `0`/`1`
    Boolean,
    /// Numeric values, kept as the decimal text written by the producer
    Number,
    /// Inline, formula-result and ISO date strings
    InlineString,
    /// Shared string table entries, already resolved to their text
    SharedString,
    /// Error values (`#N/A`, `#REF!`, ...)
    Error,
}

impl CellType {
    /// Maps the worksheet `t` attribute to a cell type.
    pub(crate) fn from_attribute(kind: Option<&str>) -> Self {
        match kind {
            Some("inlineStr") | Some("str") | Some("d") => Self::InlineString,
            Some("s") => Self::SharedString,
            Some("b") => Self::Boolean,
            Some("e") => Self::Error,
            _ => Self::Number,
        }
    }
}

/// A single populated cell with its position, type and raw text value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell data type
    pub kind: CellType,
    /// Cell value as string
    pub value: String,
}

impl Cell {
    pub fn new(row: usize, col: usize, kind: CellType, value: impl Into<String>) -> Self {
        Cell {
            row,
            col,
            kind,
            value: value.into(),
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Text of the cell as a reader of the sheet would see it.
    /// Error and empty cells read as blank.
    pub fn text(&self) -> &str {
        match self.kind {
            CellType::Empty | CellType::Error => "",
            CellType::Boolean => if self.value == "1" { "true" } else { "false" },
            _ => &self.value,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.reference(), self.text())
    }
}
