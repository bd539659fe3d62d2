//! Channel price tables.
//!
//! Two layouts exist. The standard one has a header row with a weight column
//! and `Zone N` columns, possibly repeated side by side for two channels on one
//! sheet. The service-tiered one groups weight bands under running service
//! labels (`AH`, `OS`, `OM`) and keeps its weight in a fixed column.
use crate::catalog::ChannelConfig;
use crate::catalog::SheetSide;
use crate::catalog::TableFormat;
use crate::catalog::REGION_KEYWORDS;
use crate::catalog::warehouse_ids;
use crate::dataset::ChannelResult;
use crate::dataset::PriceEntry;
use crate::dataset::ServiceLabel;
use crate::extract::locate::find_header;
use crate::extract::locate::marker_columns;
use crate::extract::locate::zone_number;
use crate::extract::locate::Marker;
use crate::extract::locate::SearchWindow;
use crate::extract::normalize::currency;
use crate::extract::normalize::first_number;
use crate::extract::normalize::last_integer;
use crate::extract::Extraction;
use crate::extract::Note;
use crate::spreadsheet::CellRef;
use crate::spreadsheet::Sheet;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::Range;

/// Rows searched for the weight columns that split a shared sheet.
const SPLIT_ROWS: Range<usize> = 0..50;
/// Rows searched for a standard header.
const HEADER_ROWS: Range<usize> = 0..200;
/// Rows searched for a service-tiered header.
const SERVICE_HEADER_ROWS: Range<usize> = 0..20;
const SERVICE_LABEL_COL: usize = 0;
const SERVICE_WEIGHT_COL: usize = 2;

/// Extracts one channel's prices and fixed-cell fees from its sheet.
pub fn extract(sheet: &Sheet, config: &ChannelConfig) -> Extraction<ChannelResult> {
    let layout = &config.layout;
    let mut result = ChannelResult {
        prices: Vec::new(),
        allowed_warehouses: allowed_warehouses(sheet.text_at(layout.allowed_warehouses)),
        residential_fee: fee_at(sheet, layout.residential_fee),
        direct_signature: fee_at(sheet, layout.direct_signature),
        adult_signature: fee_at(sheet, layout.adult_signature),
    };

    let prices = match config.format {
        TableFormat::Standard => match partition(sheet, config.sheet_side) {
            Ok(columns) => standard_prices(sheet, columns),
            Err(note) => Extraction::with_note(Vec::new(), note),
        },
        TableFormat::ServiceTiered => service_prices(sheet),
    };
    result.prices = prices.value;
    Extraction { value: result, notes: prices.notes }
}

/// Warehouses named by the region keywords in `text`, or all of them.
pub fn allowed_warehouses(text: Option<&str>) -> Vec<String> {
    let allowed: Vec<String> = text
        .map(|text| {
            REGION_KEYWORDS
                .iter()
                .filter(|(keyword, _)| text.contains(keyword))
                .flat_map(|(_, ids)| ids.iter().map(|id| id.to_string()))
                .collect()
        })
        .unwrap_or_default();
    if allowed.is_empty() {
        warehouse_ids()
    } else {
        allowed
    }
}

fn fee_at(sheet: &Sheet, at: Option<CellRef>) -> Decimal {
    sheet.text_at(at).map(currency).unwrap_or(Decimal::ZERO)
}

/// Column range a channel reads on its sheet.
///
/// Shared sheets are cut at the second weight column found near the top.
fn partition(sheet: &Sheet, side: Option<SheetSide>) -> Result<Range<usize>, Note> {
    let Some(side) = side else {
        return Ok(0..usize::MAX);
    };
    let weight_columns = marker_columns(sheet, SPLIT_ROWS, Marker::Weight);
    match (side, weight_columns.get(1)) {
        (SheetSide::Left, Some(&split)) => Ok(0..split),
        (SheetSide::Left, None) => Ok(0..usize::MAX),
        (SheetSide::Right, Some(&split)) => Ok(split..usize::MAX),
        (SheetSide::Right, None) => Err(Note::MissingSplit {
            sheet: sheet.name.to_owned(),
            weight_columns: weight_columns.len(),
        }),
    }
}

/// Zone number → column for the zone header cells of `row`.
fn zone_columns(sheet: &Sheet, row: usize, columns: &[usize]) -> BTreeMap<u32, usize> {
    columns
        .iter()
        .filter_map(|col| zone_number(&sheet.folded(row, *col)).map(|zone| (zone, *col)))
        .collect()
}

/// Positive zone prices of a data row.
fn zone_prices(sheet: &Sheet, row: usize, zones: &BTreeMap<u32, usize>) -> BTreeMap<u32, Decimal> {
    zones
        .iter()
        .map(|(zone, col)| (*zone, currency(sheet.text(row, *col))))
        .filter(|(_, price)| *price > Decimal::ZERO)
        .collect()
}

/// Weight in pounds of a weight cell, e.g. `2`, `1.5 lb` or `8oz`.
fn weight_in_pounds(folded: &str) -> Option<f64> {
    let weight = first_number(folded)?;
    let weight = if folded.contains("oz") { weight / 16.0 } else { weight };
    (weight > 0.0).then_some(weight)
}

fn standard_prices(sheet: &Sheet, columns: Range<usize>) -> Extraction<Vec<PriceEntry>> {
    let window = SearchWindow::forward(HEADER_ROWS).columns(columns);
    let Some(header) = find_header(sheet, &window, &[Marker::Weight, Marker::Zone]) else {
        return Extraction::with_note(Vec::new(), Note::HeaderNotFound(sheet.name.to_owned()));
    };
    let Some(weight_col) = header.first(Marker::Weight) else {
        return Extraction::with_note(Vec::new(), Note::HeaderNotFound(sheet.name.to_owned()));
    };
    let zones = zone_columns(sheet, header.row, header.columns(Marker::Zone));

    let mut prices = Vec::new();
    let mut skipped = 0;
    for row in header.row + 1..sheet.row_count() {
        let folded = sheet.folded(row, weight_col);
        if folded.is_empty() {
            continue;
        }
        let Some(weight) = weight_in_pounds(&folded) else {
            skipped += 1;
            continue;
        };
        let zones = zone_prices(sheet, row, &zones);
        if zones.is_empty() {
            skipped += 1;
            continue;
        }
        prices.push(PriceEntry { weight, service: None, zones });
    }
    finish(sheet, prices, skipped)
}

impl ServiceLabel {
    /// Service in effect after a row with the given label cell.
    ///
    /// A label naming a service switches to it; anything else keeps the current one.
    pub fn advance(self, label: &str) -> ServiceLabel {
        if label.contains("AH") {
            ServiceLabel::Ah
        } else if label.contains("OS") {
            ServiceLabel::Os
        } else if label.contains("OM") {
            ServiceLabel::Om
        } else {
            self
        }
    }
}

fn service_prices(sheet: &Sheet) -> Extraction<Vec<PriceEntry>> {
    let window = SearchWindow::forward(SERVICE_HEADER_ROWS);
    let Some(header) = find_header(sheet, &window, &[Marker::Zone]) else {
        return Extraction::with_note(Vec::new(), Note::HeaderNotFound(sheet.name.to_owned()));
    };
    let zones = zone_columns(sheet, header.row, header.columns(Marker::Zone));

    let mut service = ServiceLabel::default();
    let mut prices = Vec::new();
    let mut skipped = 0;
    for row in header.row + 1..sheet.row_count() {
        service = service.advance(sheet.text(row, SERVICE_LABEL_COL));
        let text = sheet.text(row, SERVICE_WEIGHT_COL);
        if text.trim().is_empty() {
            continue;
        }
        let weight = match last_integer(text) {
            Some(weight) if weight > 0.0 => weight,
            _ => {
                skipped += 1;
                continue;
            }
        };
        // Rows quoted on request have no zone prices but stay listed.
        let zones = zone_prices(sheet, row, &zones);
        prices.push(PriceEntry { weight, service: Some(service), zones });
    }
    finish(sheet, prices, skipped)
}

/// Orders entries by weight. Equal weights keep their sheet order.
fn finish(sheet: &Sheet, mut prices: Vec<PriceEntry>, skipped: usize) -> Extraction<Vec<PriceEntry>> {
    prices.sort_by(|a, b| a.weight.total_cmp(&b.weight));
    let mut extraction = Extraction::clean(prices);
    if skipped > 0 {
        extraction.note(Note::SkippedRows {
            sheet: sheet.name.to_owned(),
            count: skipped,
        });
    }
    extraction
}
