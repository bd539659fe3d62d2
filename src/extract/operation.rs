use crate::catalog::OperationLayout;
use crate::dataset::Fee;
use crate::dataset::FeeSchedule;
use crate::extract::Extraction;
use crate::extract::Note;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::Workbook;
use std::ops::Range;

/// Price cell text meaning the operation is free of charge.
const FREE: &str = "免费";

/// Outbound and pickup fee schedules of a tier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationFees {
    pub outbound: FeeSchedule,
    pub pickup: FeeSchedule,
}

/// Reads the operation fee sheet. A missing sheet gives empty schedules.
pub fn extract(workbook: &Workbook, layout: &OperationLayout) -> Extraction<OperationFees> {
    let Some(sheet) = workbook.find_sheet(layout.sheet_name) else {
        return Extraction::with_note(
            OperationFees::default(),
            Note::MissingSheet(layout.sheet_name.to_owned()),
        );
    };
    Extraction::clean(OperationFees {
        outbound: schedule(sheet, layout, layout.outbound_rows.clone()),
        pickup: schedule(sheet, layout, layout.pickup_rows.clone()),
    })
}

/// Label → price for `rows`. Rows without a label or a readable price are left out.
fn schedule(sheet: &Sheet, layout: &OperationLayout, rows: Range<usize>) -> FeeSchedule {
    let mut schedule = FeeSchedule::new();
    for row in rows {
        let label = sheet.text(row, layout.label_col).trim();
        if label.is_empty() {
            continue;
        }
        let price = sheet.text(row, layout.price_col).trim();
        let price = if price == FREE {
            Some(0.0)
        } else {
            price.parse::<f64>().ok().filter(|price| price.is_finite())
        };
        if let Some(price) = price {
            schedule.insert(label.to_owned(), Fee(price));
        }
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OPERATION_LAYOUT;
    use crate::spreadsheet::testing::put;

    fn fee_sheet(rows: &[(usize, &str, &str)]) -> Workbook {
        let mut sheet = Sheet::new("库内操作费");
        for (row, label, price) in rows {
            put(&mut sheet, *row, 1, label);
            put(&mut sheet, *row, 3, price);
        }
        Workbook::from_sheets("T0.xlsx", vec![sheet])
    }

    #[test]
    fn free_and_priced_rows() {
        let workbook = fee_sheet(&[
            (16, "header", "1"),
            (17, "0-1LB", "免费"),
            (18, "1-2LB", "0.45"),
            (19, "", "0.55"),
            (20, "2-5LB", ""),
            (21, "5-10LB", "待定"),
            (22, "10LB+", " 1.2 "),
            (35, "0-1LB", "0.3"),
            (52, "50LB+", "3"),
            (53, "beyond", "9"),
        ]);
        let fees = extract(&workbook, &OPERATION_LAYOUT);

        assert!(fees.notes.is_empty());
        let outbound: Vec<_> = fees.value.outbound.iter().map(|(label, fee)| (label.as_str(), fee.0)).collect();
        assert_eq!(outbound, vec![("0-1LB", 0.0), ("1-2LB", 0.45), ("10LB+", 1.2)]);
        let pickup: Vec<_> = fees.value.pickup.iter().map(|(label, fee)| (label.as_str(), fee.0)).collect();
        assert_eq!(pickup, vec![("0-1LB", 0.3), ("50LB+", 3.0)]);
    }

    #[test]
    fn duplicate_label_keeps_first_position_and_last_price() {
        let workbook = fee_sheet(&[(17, "A", "1"), (18, "B", "2"), (19, "A", "3")]);
        let outbound = extract(&workbook, &OPERATION_LAYOUT).value.outbound;

        assert_eq!(outbound.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(outbound.get("A"), Some(&Fee(3.0)));
    }

    #[test]
    fn missing_sheet_gives_empty_schedules() {
        let workbook = Workbook::from_sheets("T0.xlsx", vec![Sheet::new("GOFO-报价")]);
        let fees = extract(&workbook, &OPERATION_LAYOUT);

        assert_eq!(fees.value, OperationFees::default());
        assert_eq!(fees.notes, vec![Note::MissingSheet("库内操作费".to_owned())]);
    }
}
