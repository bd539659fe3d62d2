//! Value-added service fees.
//!
//! The fee sheet has a fixed layout, so every field is read from a known cell.
//! Cells that do not hold a number read as zero and the schema is always
//! fully populated.
use crate::dataset::Fee;
use crate::dataset::LabelingTiers;
use crate::dataset::Ordered;
use crate::dataset::Packing;
use crate::dataset::RangePrice;
use crate::dataset::TimePrice;
use crate::dataset::VasSchedule;
use crate::dataset::WeightPrice;
use crate::extract::normalize::first_number;
use crate::extract::normalize::float_or_zero;
use crate::extract::Extraction;
use crate::extract::Note;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::Workbook;

const PRICE_COL: usize = 3;
const URGENT_COL: usize = 4;

const RETURN_INBOUND_ROW: usize = 4;
const PHOTO_ROW: usize = 5;
const PACKING_LIST_ROW: usize = 8;
const PALLET_ROW: usize = 20;
const BOX_LABEL_ROW: usize = 52;
/// Disposal is billed at a flat rate that the sheet does not carry.
const DISPOSAL_PER_LB: f64 = 0.25;

const INVENTORY_CHECK: [(&str, usize); 5] = [
    ("0~9.9LB", 22),
    ("10~19.9LB", 23),
    ("20~29.9LB", 24),
    ("30~49.9LB", 25),
    (">50LB", 26),
];

/// SKU-count buckets with the first row of their three weight buckets.
const AMAZON_INBOUND: [(&str, usize); 3] = [("1sku", 30), ("2-5sku", 33), ("6+sku", 36)];
const WEIGHT_BUCKETS: [&str; 3] = ["0-9.9LB", "10-29.9LB", "30LB+"];

/// SKU-count buckets with their row; quantity buckets run across columns 3..7.
const LABELING: [(&str, usize); 3] = [("1sku", 43), ("2-5sku", 46), ("6+sku", 49)];
const QUANTITY_BUCKETS: [&str; 4] = ["<100个", "100~199个", "200~500个", "500+个"];

const URGENT_ORDER: [(&str, usize); 4] = [
    ("<5分钟", 75),
    ("5~30分钟", 76),
    ("30~60分钟", 77),
    (">1小时", 78),
];

/// Reads the VAS fee sheet named `sheet_name`.
pub fn extract(workbook: &Workbook, sheet_name: &str) -> Extraction<VasSchedule> {
    match workbook.find_sheet(sheet_name) {
        Some(sheet) => Extraction::clean(schedule(sheet)),
        None => Extraction::with_note(
            schedule(&Sheet::default()),
            Note::MissingSheet(sheet_name.to_owned()),
        ),
    }
}

fn schedule(sheet: &Sheet) -> VasSchedule {
    let fee = |row: usize, col: usize| Fee(float_or_zero(sheet.text(row, col)));
    let price = |row: usize| fee(row, PRICE_COL);

    let mut amazon_inbound = Ordered::new();
    for (skus, first_row) in AMAZON_INBOUND {
        let prices: Vec<WeightPrice> = WEIGHT_BUCKETS
            .into_iter()
            .enumerate()
            .map(|(offset, wt)| WeightPrice { wt, price: price(first_row + offset) })
            .collect();
        amazon_inbound.insert(skus, prices);
    }

    let mut labeling = Ordered::new();
    for (skus, row) in LABELING {
        let tiers: Vec<RangePrice> = QUANTITY_BUCKETS
            .into_iter()
            .enumerate()
            .map(|(offset, range)| RangePrice { range, price: fee(row, PRICE_COL + offset) })
            .collect();
        labeling.insert(skus, LabelingTiers { tiers });
    }

    VasSchedule {
        return_inbound: price(RETURN_INBOUND_ROW),
        photo: price(PHOTO_ROW),
        attach_packing_list: price(PACKING_LIST_ROW),
        disposal_per_lb: Fee(DISPOSAL_PER_LB),
        pallet_fee: price(PALLET_ROW),
        box_label: Fee(first_number(sheet.text(BOX_LABEL_ROW, PRICE_COL)).unwrap_or(0.0)),
        packing: Packing {
            bag_s: price(12),
            bag_m: price(13),
            bag_l: price(14),
            bubble: price(15),
            box_s: price(16),
            box_m: price(17),
            box_l: price(18),
        },
        inventory_check: INVENTORY_CHECK
            .into_iter()
            .map(|(range, row)| RangePrice { range, price: price(row) })
            .collect(),
        amazon_inbound,
        labeling,
        urgent_order: URGENT_ORDER
            .into_iter()
            .map(|(time, row)| TimePrice { time, price: fee(row, URGENT_COL) })
            .collect(),
    }
}
