//! Conversions between A1-style references and 0-based (row, column) indexes.
use serde::ser::SerializeTuple;
use serde::Serialize;
use serde::Serializer;
use std::fmt::Display;

/// Largest row count of a worksheet.
const MAX_ROWS: usize = 1_048_576;
/// Largest column count of a worksheet (`XFD`).
const MAX_COLUMNS: usize = 16_384;

/// Parses column letters to a 0-based column index: A = 0, Z = 25, AA = 26.
///
/// Columns past `XFD` are rejected.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0_usize, |index, letter| {
            index.checked_mul(26)?.checked_add(usize::from(letter - b'A') + 1)
        })
        .map(|col| col - 1)
        .filter(|col| *col < MAX_COLUMNS)
}

/// Parses a 1-based row number to a 0-based row index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse()
        .ok()
        .filter(|row| (1..=MAX_ROWS).contains(row))
        .map(|row: usize| row - 1)
}

/// Splits a reference such as `AB12` into its 0-based (row, column).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Converts a 0-based (row, column) to an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = String::new();
    let mut col = col + 1;
    while col > 0 {
        col -= 1;
        letters.insert(0, char::from(b'A' + (col % 26) as u8));
        col /= 26;
    }
    format!("{}{}", letters, row + 1)
}

/// A fixed cell coordinate inside a sheet (0-based).
///
/// Serialized as a `[row, col]` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        CellRef { row, col }
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&index_to_reference(self.row, self.col))
    }
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.row)?;
        tuple.serialize_element(&self.col)?;
        tuple.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_index("A"), Some(0));
        assert_eq!(col_to_index("z"), Some(25));
        assert_eq!(col_to_index("AA"), Some(26));
        assert_eq!(col_to_index("XFD"), Some(16_383));
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
    }

    #[test]
    fn out_of_range_references_are_rejected() {
        assert_eq!(col_to_index("XFE"), None);
        assert_eq!(col_to_index("AAAAAAAAAAAAAAAA"), None);
        assert_eq!(reference_to_index("AAAAAAAAAAAAAAAA1"), None);
        assert_eq!(reference_to_index("A1048576"), Some((1_048_575, 0)));
        assert_eq!(reference_to_index("A1048577"), None);
        assert_eq!(reference_to_index("A99999999999999999999999"), None);
    }

    #[test]
    fn references_round_trip_through_indexes() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("Q178"), Some((177, 16)));
        assert_eq!(reference_to_index("AB12"), Some((11, 27)));
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("B0"), None);
        assert_eq!(index_to_reference(177, 16), "Q178");
        assert_eq!(index_to_reference(0, 26), "AA1");
    }

    #[test]
    fn cell_ref_serializes_as_pair() {
        let json = serde_json::to_string(&CellRef::new(179, 6)).unwrap();
        assert_eq!(json, "[179,6]");
        assert_eq!(CellRef::new(179, 6).to_string(), "G180");
    }
}
