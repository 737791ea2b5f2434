use serde::Serialize;

use crate::vocabulary::FilterVocabulary;

/// Province vocabulary sentinel, also the label of the national drill level.
pub const ALL_PROVINCES: &str = "全国";
pub const ALL_BRANDS: &str = "所有品牌";
pub const ALL_MODELS: &str = "所有型号";

/// Map asset key of the national outline.
pub const NATIONAL_MAP_KEY: &str = "china";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Parses the dataset's `"lon,lat"` form. Both parts must be finite and
    /// inside the WGS84 ranges.
    pub fn parse(value: &str) -> Option<Self> {
        let (lon, lat) = value.split_once(',')?;
        let longitude = lon.trim().parse::<f64>().ok()?;
        let latitude = lat.trim().parse::<f64>().ok()?;

        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return None;
        }

        Some(Self::new(longitude, latitude))
    }
}

/// One hotel installation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub hotel_name: String,
    pub brand: String,
    pub subbrand: Option<String>,
    pub model: String,
    pub coordinates: Coordinates,
    pub supply: u32,
    pub province: String,
    pub city: String,
    pub location: Option<String>,
}

/// The loaded records together with the selector vocabularies.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    pub records: Vec<Record>,
    pub vocabulary: FilterVocabulary,
}

impl DatasetIndex {
    pub const fn new(records: Vec<Record>, vocabulary: FilterVocabulary) -> Self {
        Self {
            records,
            vocabulary,
        }
    }

    /// Index whose vocabulary is derived from the records themselves.
    pub fn from_records(records: Vec<Record>) -> Self {
        let vocabulary = FilterVocabulary::from_records(&records);
        Self::new(records, vocabulary)
    }

    pub fn total_supply(&self) -> u64 {
        self.records.iter().map(|record| u64::from(record.supply)).sum()
    }
}
