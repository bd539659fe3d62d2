//! Compiled-in reference tables: warehouses, state names, tiers and the
//! per-channel sheet layouts.
//!
//! Everything here is `'static` and read-only, so it can be shared by any
//! number of extraction threads.
use crate::spreadsheet::CellRef;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use std::ops::Range;

/// Region a warehouse serves from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    West,
    Central,
    East,
}

#[derive(Clone, Debug, Serialize)]
pub struct Warehouse {
    #[serde(skip)]
    pub id: &'static str,
    pub name: &'static str,
    pub region: Region,
}

pub const WAREHOUSES: &[Warehouse] = &[
    Warehouse { id: "60632", name: "SureGo美中芝加哥-60632仓", region: Region::Central },
    Warehouse { id: "91730", name: "SureGo美西库卡蒙格-91730仓", region: Region::West },
    Warehouse { id: "91752", name: "SureGo美西米拉罗马-91752仓", region: Region::West },
    Warehouse { id: "08691", name: "SureGo美东新泽西-08691仓", region: Region::East },
    Warehouse { id: "06801", name: "SureGo美东贝塞尔-06801仓", region: Region::East },
    Warehouse { id: "11791", name: "SureGo美东长岛-11791仓", region: Region::East },
    Warehouse { id: "07032", name: "SureGo美东新泽西-07032仓", region: Region::East },
    Warehouse { id: "63461", name: "SureGo退货检测-密苏里63461仓", region: Region::Central },
];

/// Keywords of the allowed-warehouse note on a rate sheet and the warehouses
/// each one unlocks. The returns-inspection site is never unlocked by keyword.
pub const REGION_KEYWORDS: &[(&str, &[&str])] = &[
    ("美西", &["91730", "91752"]),
    ("美中", &["60632"]),
    ("美东", &["08691", "06801", "11791", "07032"]),
];

pub fn warehouse_ids() -> Vec<String> {
    WAREHOUSES.iter().map(|warehouse| warehouse.id.to_owned()).collect()
}

/// US state code → localized state name.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "阿拉巴马"), ("AK", "阿拉斯加"), ("AZ", "亚利桑那"), ("AR", "阿肯色"), ("CA", "加利福尼亚"),
    ("CO", "科罗拉多"), ("CT", "康涅狄格"), ("DE", "特拉华"), ("FL", "佛罗里达"), ("GA", "佐治亚"),
    ("HI", "夏威夷"), ("ID", "爱达荷"), ("IL", "伊利诺伊"), ("IN", "印第安纳"), ("IA", "爱荷华"),
    ("KS", "堪萨斯"), ("KY", "肯塔基"), ("LA", "路易斯安那"), ("ME", "缅因"), ("MD", "马里兰"),
    ("MA", "马萨诸塞"), ("MI", "密歇根"), ("MN", "明尼苏达"), ("MS", "密西西比"), ("MO", "密苏里"),
    ("MT", "蒙大拿"), ("NE", "内布拉斯加"), ("NV", "内华达"), ("NH", "新罕布什尔"), ("NJ", "新泽西"),
    ("NM", "新墨西哥"), ("NY", "纽约"), ("NC", "北卡罗来纳"), ("ND", "北达科他"), ("OH", "俄亥俄"),
    ("OK", "俄克拉荷马"), ("OR", "俄勒冈"), ("PA", "宾夕法尼亚"), ("RI", "罗德岛"), ("SC", "南卡罗来纳"),
    ("SD", "南达科他"), ("TN", "田纳西"), ("TX", "德克萨斯"), ("UT", "犹他"), ("VT", "佛蒙特"),
    ("VA", "弗吉尼亚"), ("WA", "华盛顿"), ("WV", "西弗吉尼亚"), ("WI", "威斯康星"), ("WY", "怀俄明"),
    ("DC", "华盛顿特区"),
];

pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(state, _)| *state == code)
        .map(|(_, name)| *name)
}

/// A pricing tier and the workbook that backs it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tier {
    pub id: &'static str,
    pub file_name: &'static str,
}

pub const TIERS: &[Tier] = &[
    Tier { id: "T0", file_name: "T0.xlsx" },
    Tier { id: "T1", file_name: "T1.xlsx" },
    Tier { id: "T2", file_name: "T2.xlsx" },
    Tier { id: "T3", file_name: "T3.xlsx" },
];

/// Tier whose workbook carries the ZIP → region table.
pub const ZIP_SOURCE_TIER: Tier = TIERS[0];

/// Half of a sheet that holds two channels side by side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSide {
    Left,
    Right,
}

/// How a channel's fuel surcharge is applied by the quote page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FuelMode {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "included")]
    Included,
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "discount_85")]
    Discount85,
}

/// Lookup table a channel's zone numbers resolve against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    Gofo,
    General,
    Xlmiles,
}

/// Row layout of a channel's price table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TableFormat {
    /// One header row with a weight column and `Zone N` columns
    Standard,
    /// Rows grouped under running service labels, weight in a fixed column
    ServiceTiered,
}

/// Surcharge schedule the quote page applies on top of the base rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeProfile {
    FedexNew,
}

/// Fixed cells holding per-channel metadata. Absent coordinates fall back to defaults.
///
/// Serialized as `meta_loc`, `res_fee_loc` (only when set) and a
/// `sig_location` object holding the `direct` and `adult` cells, or null.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Free-text note naming the regions allowed to ship this channel
    pub allowed_warehouses: Option<CellRef>,
    pub residential_fee: Option<CellRef>,
    pub direct_signature: Option<CellRef>,
    pub adult_signature: Option<CellRef>,
}

#[derive(Serialize)]
struct SignatureLocation {
    direct: Option<CellRef>,
    adult: Option<CellRef>,
}

impl Serialize for ChannelLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("meta_loc", &self.allowed_warehouses)?;
        if let Some(cell) = &self.residential_fee {
            map.serialize_entry("res_fee_loc", cell)?;
        }
        let signatures = (self.direct_signature.is_some() || self.adult_signature.is_some()).then_some(
            SignatureLocation {
                direct: self.direct_signature,
                adult: self.adult_signature,
            },
        );
        map.serialize_entry("sig_location", &signatures)?;
        map.end()
    }
}

impl ChannelLayout {
    const fn meta(row: usize) -> Self {
        ChannelLayout {
            allowed_warehouses: Some(CellRef::new(row, 0)),
            residential_fee: None,
            direct_signature: None,
            adult_signature: None,
        }
    }

    const fn residential(self, row: usize, col: usize) -> Self {
        ChannelLayout { residential_fee: Some(CellRef::new(row, col)), ..self }
    }

    const fn signatures(self, direct: usize, adult: usize, col: usize) -> Self {
        ChannelLayout {
            direct_signature: Some(CellRef::new(direct, col)),
            adult_signature: Some(CellRef::new(adult, col)),
            ..self
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChannelConfig {
    #[serde(skip)]
    pub id: &'static str,
    pub sheet_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_side: Option<SheetSide>,
    pub fuel_mode: FuelMode,
    pub zone_source: ZoneSource,
    pub dim_divisor: u32,
    #[serde(skip)]
    pub format: TableFormat,
    /// Channel is exempt from peak-season surcharges
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_peak: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surcharges: Option<SurchargeProfile>,
    #[serde(flatten)]
    pub layout: ChannelLayout,
}

const STANDARD: ChannelConfig = ChannelConfig {
    id: "",
    sheet_name: "",
    sheet_side: None,
    fuel_mode: FuelMode::None,
    zone_source: ZoneSource::General,
    dim_divisor: 250,
    format: TableFormat::Standard,
    no_peak: false,
    surcharges: None,
    layout: ChannelLayout::meta(1),
};

pub const CHANNELS: &[ChannelConfig] = &[
    ChannelConfig {
        id: "GOFO-报价",
        sheet_name: "GOFO-报价",
        zone_source: ZoneSource::Gofo,
        ..STANDARD
    },
    ChannelConfig {
        id: "GOFO-MT-报价",
        sheet_name: "GOFO、UNIUNI-MT-报价",
        sheet_side: Some(SheetSide::Left),
        fuel_mode: FuelMode::Included,
        zone_source: ZoneSource::Gofo,
        ..STANDARD
    },
    ChannelConfig {
        id: "UNIUNI-MT-报价",
        sheet_name: "GOFO、UNIUNI-MT-报价",
        sheet_side: Some(SheetSide::Right),
        ..STANDARD
    },
    ChannelConfig {
        id: "USPS-YSD-报价",
        sheet_name: "USPS-YSD-报价",
        no_peak: true,
        layout: ChannelLayout::meta(2),
        ..STANDARD
    },
    ChannelConfig {
        id: "FedEx-632-MT-报价",
        sheet_name: "FedEx-632-MT-报价",
        fuel_mode: FuelMode::Discount85,
        surcharges: Some(SurchargeProfile::FedexNew),
        layout: ChannelLayout::meta(1).residential(179, 6).signatures(177, 178, 16),
        ..STANDARD
    },
    ChannelConfig {
        id: "FedEx-MT-超大包裹-报价",
        sheet_name: "FedEx-MT-超大包裹-报价",
        fuel_mode: FuelMode::Discount85,
        surcharges: Some(SurchargeProfile::FedexNew),
        layout: ChannelLayout::meta(1).residential(90, 6).signatures(88, 89, 16),
        ..STANDARD
    },
    ChannelConfig {
        id: "FedEx-ECO-MT报价",
        sheet_name: "FedEx-ECO-MT报价",
        fuel_mode: FuelMode::Included,
        surcharges: Some(SurchargeProfile::FedexNew),
        ..STANDARD
    },
    ChannelConfig {
        id: "FedEx-MT-危险品-报价",
        sheet_name: "FedEx-MT-危险品-报价",
        fuel_mode: FuelMode::Standard,
        surcharges: Some(SurchargeProfile::FedexNew),
        layout: ChannelLayout::meta(1).residential(179, 6).signatures(177, 178, 16),
        ..STANDARD
    },
    ChannelConfig {
        id: "GOFO大件-MT-报价",
        sheet_name: "GOFO大件-MT-报价",
        fuel_mode: FuelMode::Standard,
        zone_source: ZoneSource::Gofo,
        layout: ChannelLayout::meta(1).residential(179, 6),
        ..STANDARD
    },
    ChannelConfig {
        id: "XLmiles-报价",
        sheet_name: "XLmiles-报价",
        zone_source: ZoneSource::Xlmiles,
        format: TableFormat::ServiceTiered,
        layout: ChannelLayout {
            allowed_warehouses: None,
            residential_fee: None,
            direct_signature: Some(CellRef::new(14, 3)),
            adult_signature: None,
        },
        ..STANDARD
    },
];

/// Fixed layout of the in-warehouse operation fee sheet.
pub struct OperationLayout {
    pub sheet_name: &'static str,
    pub outbound_rows: Range<usize>,
    pub pickup_rows: Range<usize>,
    pub label_col: usize,
    pub price_col: usize,
}

pub const OPERATION_LAYOUT: OperationLayout = OperationLayout {
    sheet_name: "库内操作费",
    outbound_rows: 17..35,
    pickup_rows: 35..53,
    label_col: 1,
    price_col: 3,
};

pub const VAS_SHEET: &str = "增值服务费";

/// Sheet of the ZIP-source tier that ends with the ZIP → region table.
pub const ZIP_SHEET: &str = "GOFO-报价";
