use crate::extract::Extraction;
use crate::extract::Note;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::Workbook;

pub const DEFAULT_FUEL_RATE: f64 = 0.16;

const FUEL_LABEL: &str = "燃油";
const SEARCH_ROWS: usize = 50;
const SEARCH_COLS: usize = 50;

/// Finds the tier's fuel surcharge rate as a fraction.
///
/// Rate sheets of the MT and 632 families carry a `燃油` label with the rate in
/// the cell to its right. The first rate strictly between 0 and 1 wins, in
/// workbook order, and [`DEFAULT_FUEL_RATE`] applies when none is found.
pub fn extract(workbook: &Workbook) -> Extraction<f64> {
    workbook
        .sheets()
        .iter()
        .filter(|sheet| carries_fuel_rate(&sheet.name))
        .find_map(rate_in)
        .map(Extraction::clean)
        .unwrap_or_else(|| Extraction::with_note(DEFAULT_FUEL_RATE, Note::DefaultFuelRate(DEFAULT_FUEL_RATE)))
}

fn carries_fuel_rate(sheet_name: &str) -> bool {
    sheet_name.to_uppercase().contains("MT") || sheet_name.contains("632")
}

fn rate_in(sheet: &Sheet) -> Option<f64> {
    for row in 0..SEARCH_ROWS.min(sheet.row_count()) {
        for col in 0..SEARCH_COLS.min(sheet.col_count()) {
            if sheet.text(row, col).contains(FUEL_LABEL) {
                if let Some(rate) = parse_rate(sheet.text(row, col + 1)) {
                    return Some(rate);
                }
            }
        }
    }
    None
}

/// Reads `18.5%`, `18.5` or `0.185` as 0.185. Rates outside (0, 1) are rejected.
fn parse_rate(text: &str) -> Option<f64> {
    let rate = text.replace('%', "").trim().parse::<f64>().ok()?;
    let rate = if rate > 1.0 { rate / 100.0 } else { rate };
    (rate > 0.0 && rate < 1.0).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::sheet;

    #[test]
    fn rate_forms() {
        assert_eq!(parse_rate("18.5%"), Some(0.185));
        assert_eq!(parse_rate(" 20 "), Some(0.2));
        assert_eq!(parse_rate("0.16"), Some(0.16));
        assert_eq!(parse_rate("0"), None);
        assert_eq!(parse_rate("100%"), None);
        assert_eq!(parse_rate("待定"), None);
        assert_eq!(parse_rate(""), None);
    }

    #[test]
    fn first_usable_rate_in_workbook_order() {
        let workbook = Workbook::from_sheets("T1.xlsx", vec![
            sheet("GOFO-报价", vec![vec!["燃油费率", "0.30"]]),
            sheet("FedEx-632-MT-报价", vec![vec!["燃油附加费", "待定"], vec!["", "燃油", "", "19%"], vec!["燃油", "17.25%"]]),
            sheet("GOFO、UNIUNI-MT-报价", vec![vec!["燃油", "0.12"]]),
        ]);
        let rate = extract(&workbook);

        assert_eq!(rate.value, 0.1725);
        assert!(rate.notes.is_empty());
    }

    #[test]
    fn lowercase_family_marker_counts() {
        let workbook = Workbook::from_sheets("T1.xlsx", vec![sheet("gofo大件-mt", vec![vec!["燃油", "12"]])]);
        assert_eq!(extract(&workbook).value, 0.12);
    }

    #[test]
    fn default_rate_when_absent() {
        let workbook = Workbook::from_sheets("T1.xlsx", vec![sheet("USPS-YSD-报价", vec![vec!["燃油", "0.2"]])]);
        let rate = extract(&workbook);

        assert_eq!(rate.value, DEFAULT_FUEL_RATE);
        assert_eq!(rate.notes, vec![Note::DefaultFuelRate(0.16)]);
    }
}
