//! The normalized pricing dataset handed to the storefront page.
//!
//! Field names follow the JSON the page script reads, so most structs carry
//! serde renames. Maps whose order matters to the page (channels, tiers, fee
//! labels) are kept as [`Ordered`] rather than hash maps.
use crate::catalog::ChannelConfig;
use crate::catalog::Warehouse;
use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use std::collections::BTreeMap;

/// Insertion-ordered map serialized as a JSON object.
///
/// Inserting an existing key replaces its value in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Ordered<K, V>(Vec<(K, V)>);

impl<K, V> Default for Ordered<K, V> {
    fn default() -> Self {
        Ordered(Vec::new())
    }
}

impl<K: PartialEq, V> Ordered<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, value: V) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.0
            .iter()
            .find(|(existing, _)| existing.borrow() == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter().map(|(key, value)| (key, value))
    }
}

impl<K: Serialize, V: Serialize> Serialize for Ordered<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A plain (non-currency) fee. Serialized as `0` when not finite.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Fee(pub f64);

impl Serialize for Fee {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        finite(&self.0, serializer)
    }
}

fn finite<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(if value.is_finite() { *value } else { 0.0 })
}

/// Running service label of the service-tiered price layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceLabel {
    #[default]
    Ah,
    Os,
    Om,
}

/// One weight break of a channel's price table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceEntry {
    /// Weight break in pounds
    #[serde(rename = "w", serialize_with = "finite")]
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceLabel>,
    /// Zone number → price; only positive prices are present
    #[serde(flatten)]
    pub zones: BTreeMap<u32, Decimal>,
}

/// A channel's prices and fixed-cell fees within one tier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelResult {
    pub prices: Vec<PriceEntry>,
    #[serde(rename = "allow_wh")]
    pub allowed_warehouses: Vec<String>,
    #[serde(rename = "res_fee")]
    pub residential_fee: Decimal,
    #[serde(rename = "sig_direct")]
    pub direct_signature: Decimal,
    #[serde(rename = "sig_adult")]
    pub adult_signature: Decimal,
}

/// Operational fees: range label → price.
pub type FeeSchedule = Ordered<String, Fee>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Packing {
    pub bag_s: Fee,
    pub bag_m: Fee,
    pub bag_l: Fee,
    pub bubble: Fee,
    pub box_s: Fee,
    pub box_m: Fee,
    pub box_l: Fee,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangePrice {
    pub range: &'static str,
    pub price: Fee,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeightPrice {
    pub wt: &'static str,
    pub price: Fee,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimePrice {
    pub time: &'static str,
    pub price: Fee,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelingTiers {
    pub tiers: Vec<RangePrice>,
}

/// Value-added service fees. The schema is fixed; unreadable cells are zero.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VasSchedule {
    pub return_inbound: Fee,
    pub photo: Fee,
    pub attach_packing_list: Fee,
    pub disposal_per_lb: Fee,
    pub pallet_fee: Fee,
    pub box_label: Fee,
    pub packing: Packing,
    pub inventory_check: Vec<RangePrice>,
    /// SKU-count bucket → weight bucket prices
    pub amazon_inbound: Ordered<&'static str, Vec<WeightPrice>>,
    /// SKU-count bucket → quantity bucket prices
    pub labeling: Ordered<&'static str, LabelingTiers>,
    pub urgent_order: Vec<TimePrice>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZipRecord {
    pub city: String,
    pub state: String,
    pub cn_state: String,
    pub region: String,
}

/// Everything extracted from one tier's workbook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierDataset {
    #[serde(serialize_with = "finite")]
    pub fuel_rate: f64,
    pub outbound: FeeSchedule,
    pub pickup: FeeSchedule,
    pub vas: VasSchedule,
    pub channels: Ordered<&'static str, ChannelResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FullDataset {
    #[serde(serialize_with = "warehouses_by_id")]
    pub warehouses: &'static [Warehouse],
    #[serde(serialize_with = "channels_by_id")]
    pub channels: &'static [ChannelConfig],
    pub gofo_zips: BTreeMap<String, ZipRecord>,
    #[serde(serialize_with = "pairs")]
    pub us_states_cn: &'static [(&'static str, &'static str)],
    pub tiers: Ordered<&'static str, TierDataset>,
    pub generated_at: DateTime<Utc>,
}

fn warehouses_by_id<S: Serializer>(warehouses: &&'static [Warehouse], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(warehouses.iter().map(|warehouse| (warehouse.id, warehouse)))
}

fn channels_by_id<S: Serializer>(channels: &&'static [ChannelConfig], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(channels.iter().map(|channel| (channel.id, channel)))
}

fn pairs<S: Serializer>(pairs: &&'static [(&'static str, &'static str)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(pairs.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn ordered_insert_replaces_in_place() {
        let mut schedule = FeeSchedule::new();
        schedule.insert("0-1LB".to_owned(), Fee(0.35));
        schedule.insert("1-2LB".to_owned(), Fee(0.45));
        schedule.insert("0-1LB".to_owned(), Fee(0.4));

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.keys().collect::<Vec<_>>(), vec!["0-1LB", "1-2LB"]);
        assert_eq!(schedule.get("0-1LB"), Some(&Fee(0.4)));
        assert_eq!(serde_json::to_string(&schedule).unwrap(), r#"{"0-1LB":0.4,"1-2LB":0.45}"#);
    }

    #[test]
    fn non_finite_fees_serialize_as_zero() {
        assert_eq!(serde_json::to_string(&Fee(f64::NAN)).unwrap(), "0.0");
        assert_eq!(serde_json::to_string(&Fee(f64::INFINITY)).unwrap(), "0.0");
        assert_eq!(serde_json::to_string(&Fee(1.5)).unwrap(), "1.5");
    }

    #[test]
    fn price_entry_shape() {
        let entry = PriceEntry {
            weight: 2.0,
            service: None,
            zones: BTreeMap::from([(1, dec!(7.50))]),
        };
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"w": 2.0, "1": 7.5}));

        let entry = PriceEntry {
            weight: 150.0,
            service: Some(ServiceLabel::Os),
            zones: BTreeMap::from([(2, dec!(80.25)), (1, dec!(60))]),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"w": 150.0, "service": "OS", "1": 60.0, "2": 80.25})
        );
    }

    #[test]
    fn channel_result_field_names() {
        let result = ChannelResult {
            prices: vec![],
            allowed_warehouses: vec!["60632".to_owned()],
            residential_fee: dec!(3.85),
            direct_signature: dec!(0),
            adult_signature: dec!(0),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"prices": [], "allow_wh": ["60632"], "res_fee": 3.85, "sig_direct": 0.0, "sig_adult": 0.0})
        );
    }
}
