use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use tvmap_core::domain::NATIONAL_MAP_KEY;
use tvmap_core::ProvinceMatch;

pub const DATA_VAR: &str = "TVMAP_DATA";
pub const FILTERS_VAR: &str = "TVMAP_FILTERS";
pub const MAP_DIR_VAR: &str = "TVMAP_MAP_DIR";
pub const REGION_KEYS_VAR: &str = "TVMAP_REGION_KEYS";
pub const PROVINCE_MATCH_VAR: &str = "TVMAP_PROVINCE_MATCH";

/// Where the dashboard finds its static files and how it matches provinces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub filters_path: PathBuf,
    pub map_dir: PathBuf,
    pub region_keys_path: PathBuf,
    pub province_match: ProvinceMatch,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data.json"),
            filters_path: PathBuf::from("data/filters.json"),
            map_dir: PathBuf::from("map"),
            region_keys_path: PathBuf::from("map/chinese_province_2_map_province.json"),
            province_match: ProvinceMatch::SuffixStrip,
        }
    }
}

impl DashboardConfig {
    /// Reads the configuration from the environment, falling back to the
    /// defaults for anything unset. An unknown match mode keeps the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |name: &str, fallback: PathBuf| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map_or(fallback, PathBuf::from)
        };

        let province_match = match lookup(PROVINCE_MATCH_VAR) {
            Some(value) => ProvinceMatch::parse(&value).unwrap_or_else(|| {
                tracing::warn!(%value, "unknown province match mode, using suffix");
                ProvinceMatch::SuffixStrip
            }),
            None => defaults.province_match,
        };

        Self {
            data_path: path(DATA_VAR, defaults.data_path),
            filters_path: path(FILTERS_VAR, defaults.filters_path),
            map_dir: path(MAP_DIR_VAR, defaults.map_dir),
            region_keys_path: path(REGION_KEYS_VAR, defaults.region_keys_path),
            province_match,
        }
    }

    /// The national outline asset.
    pub fn national_map_path(&self) -> PathBuf {
        self.map_dir.join(format!("{NATIONAL_MAP_KEY}.json"))
    }

    /// The outline asset of one province.
    pub fn province_map_path(&self, key: &str) -> PathBuf {
        self.map_dir.join("province").join(format!("{key}.json"))
    }

    pub fn uses_lookup_table(&self) -> bool {
        self.province_match == ProvinceMatch::LookupTable
    }
}

/// Loads `.env` and reads the dashboard configuration.
pub fn init_dashboard_config() -> DashboardConfig {
    dotenv().ok();
    let config = DashboardConfig::from_env();
    tracing::debug!(
        data = %config.data_path.display(),
        filters = %config.filters_path.display(),
        maps = %config.map_dir.display(),
        mode = config.province_match.as_str(),
        "configuration loaded"
    );
    config
}
