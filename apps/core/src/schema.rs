//! Decoding of the static files at the load boundary.
//!
//! Records are decoded one by one so a single malformed entry is
//! quarantined instead of poisoning the whole dataset.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Coordinates, Record};
use crate::error::{DashboardError, Result};
use crate::vocabulary::FilterVocabulary;

pub const DATASET_RESOURCE: &str = "data.json";
pub const VOCABULARY_RESOURCE: &str = "filters.json";
pub const REGION_KEYS_RESOURCE: &str = "chinese_province_2_map_province.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    hotel_name: Option<String>,
    brand: Option<String>,
    subbrand: Option<String>,
    model: Option<String>,
    coordinates: Option<String>,
    supply: Option<serde_json::Number>,
    province: Option<String>,
    city: Option<String>,
    location: Option<String>,
}

/// A dataset entry that was set aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quarantined {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedRecords {
    pub records: Vec<Record>,
    pub quarantined: Vec<Quarantined>,
}

/// Decodes the dataset file: a JSON array of record objects.
pub fn parse_records(text: &str) -> Result<ParsedRecords> {
    let document: Value = serde_json::from_str(text)
        .map_err(|error| DashboardError::load_failure(DATASET_RESOURCE, error))?;
    let Value::Array(entries) = document else {
        return Err(DashboardError::load_failure(
            DATASET_RESOURCE,
            "expected a JSON array of records",
        ));
    };

    let mut parsed = ParsedRecords::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match decode_record(entry) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                warn!(index, %reason, "quarantined dataset entry");
                parsed.quarantined.push(Quarantined { index, reason });
            }
        }
    }

    Ok(parsed)
}

fn decode_record(entry: Value) -> std::result::Result<Record, String> {
    let raw = RawRecord::deserialize(entry).map_err(|error| error.to_string())?;

    let hotel_name = required("hotelName", raw.hotel_name)?;
    let brand = required("brand", raw.brand)?;
    let model = required("model", raw.model)?;
    let province = required("province", raw.province)?;

    let coordinates = raw
        .coordinates
        .ok_or_else(|| "missing coordinates".to_string())
        .and_then(|value| {
            Coordinates::parse(&value).ok_or_else(|| format!("malformed coordinates {value:?}"))
        })?;

    let supply = raw
        .supply
        .ok_or_else(|| "missing supply".to_string())
        .and_then(|number| supply_units(&number))?;

    Ok(Record {
        hotel_name,
        brand,
        subbrand: raw.subbrand.filter(|value| !value.is_empty()),
        model,
        coordinates,
        supply,
        province,
        city: raw.city.unwrap_or_default(),
        location: raw.location.filter(|value| !value.is_empty()),
    })
}

fn required(field: &str, value: Option<String>) -> std::result::Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(format!("missing {field}")),
    }
}

fn supply_units(number: &serde_json::Number) -> std::result::Result<u32, String> {
    if let Some(units) = number.as_u64() {
        return u32::try_from(units).map_err(|_| format!("supply {units} out of range"));
    }

    match number.as_f64() {
        Some(units) if units >= 0.0 && units.fract() == 0.0 && units <= f64::from(u32::MAX) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let units = units as u32;
            Ok(units)
        }
        _ => Err(format!("supply {number} is not a unit count")),
    }
}

/// Decodes the vocabulary file, restoring any missing sentinel.
pub fn parse_vocabulary(text: &str) -> Result<FilterVocabulary> {
    serde_json::from_str::<FilterVocabulary>(text)
        .map(FilterVocabulary::with_sentinels)
        .map_err(|error| DashboardError::load_failure(VOCABULARY_RESOURCE, error))
}

/// Decodes the `{chineseProvinceName: mapAssetKey}` table.
pub fn parse_region_keys(text: &str) -> Result<BTreeMap<String, String>> {
    serde_json::from_str(text)
        .map_err(|error| DashboardError::load_failure(REGION_KEYS_RESOURCE, error))
}
