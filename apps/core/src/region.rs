use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

const PROVINCE_SUFFIX: char = '省';

/// Strips one trailing `省` from an administrative name: `广东省` → `广东`.
pub fn normalize_region_key(name: &str) -> &str {
    name.strip_suffix(PROVINCE_SUFFIX).unwrap_or(name)
}

/// How user-facing province names are matched against records and map keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvinceMatch {
    /// Map key is the name without its `省` suffix; the province filter
    /// matches by substring containment.
    #[default]
    SuffixStrip,
    /// Map key comes from the name-to-key table; the province filter
    /// compares the keys both names resolve to.
    LookupTable,
}

impl ProvinceMatch {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuffixStrip => "suffix",
            Self::LookupTable => "lookup",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "suffix" | "suffix-strip" | "substring" => Some(Self::SuffixStrip),
            "lookup" | "lookup-table" | "table" => Some(Self::LookupTable),
            _ => None,
        }
    }
}

/// Resolves province names to the keys of the map assets that are loaded.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    mode: ProvinceMatch,
    name_to_key: BTreeMap<String, String>,
    assets: BTreeSet<String>,
}

impl RegionRegistry {
    pub const fn new(mode: ProvinceMatch) -> Self {
        Self {
            mode,
            name_to_key: BTreeMap::new(),
            assets: BTreeSet::new(),
        }
    }

    /// Registry in lookup-table mode over a `{name: key}` table.
    pub fn with_lookup_table(table: BTreeMap<String, String>) -> Self {
        Self {
            mode: ProvinceMatch::LookupTable,
            name_to_key: table,
            assets: BTreeSet::new(),
        }
    }

    pub const fn mode(&self) -> ProvinceMatch {
        self.mode
    }

    /// Marks a map asset as available under `key`.
    pub fn register_asset(&mut self, key: impl Into<String>) {
        self.assets.insert(key.into());
    }

    pub fn has_asset(&self, key: &str) -> bool {
        self.assets.contains(key)
    }

    pub fn asset_keys(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(String::as_str)
    }

    /// The map key a name would use, whether or not its asset is loaded.
    pub fn key_for(&self, name: &str) -> Option<String> {
        match self.mode {
            ProvinceMatch::SuffixStrip => {
                let key = normalize_region_key(name.trim());
                (!key.is_empty()).then(|| key.to_string())
            }
            ProvinceMatch::LookupTable => self
                .name_to_key
                .get(name)
                .or_else(|| self.name_to_key.get(normalize_region_key(name)))
                .cloned(),
        }
    }

    /// The map key for `name`, only if its asset is registered.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.key_for(name).filter(|key| self.has_asset(key))
    }

    /// The province selector value for a chosen or clicked name, in the
    /// same key space the province predicate compares against.
    pub fn filter_name(&self, name: &str) -> String {
        let name = name.trim();
        match self.mode {
            ProvinceMatch::SuffixStrip => normalize_region_key(name).to_string(),
            ProvinceMatch::LookupTable => name.to_string(),
        }
    }

    /// The key a record's province belongs to, for the drill-level predicate.
    pub fn record_key(&self, province: &str) -> Option<String> {
        self.key_for(province)
    }

    /// Whether a record's province satisfies the province selector.
    ///
    /// In lookup mode names missing from the table fall back to containment.
    pub fn province_matches(&self, record_province: &str, selected: &str) -> bool {
        match self.mode {
            ProvinceMatch::SuffixStrip => record_province.contains(selected),
            ProvinceMatch::LookupTable => {
                match (self.key_for(record_province), self.key_for(selected)) {
                    (Some(record_key), Some(selected_key)) => record_key == selected_key,
                    _ => record_province.contains(selected),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_province_suffix() {
        assert_eq!(normalize_region_key("广东省"), "广东");
        assert_eq!(normalize_region_key("北京"), "北京");
        assert_eq!(normalize_region_key(""), "");
        assert_eq!(normalize_region_key("省"), "");
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        for name in ["广东省", "广东", "内蒙古自治区", "北京", "河北省", ""] {
            let once = normalize_region_key(name);
            assert_eq!(normalize_region_key(once), once, "{name}");
        }
    }

    #[test]
    fn resolves_only_registered_assets() {
        let mut registry = RegionRegistry::new(ProvinceMatch::SuffixStrip);
        registry.register_asset("广东");

        assert_eq!(registry.resolve("广东省"), Some("广东".to_string()));
        assert_eq!(registry.resolve("广东"), Some("广东".to_string()));
        assert_eq!(registry.resolve("西藏"), None);
        assert_eq!(registry.key_for("西藏"), Some("西藏".to_string()));
    }

    #[test]
    fn lookup_table_mode_uses_the_table() {
        let table = BTreeMap::from([
            ("广东".to_string(), "guangdong".to_string()),
            ("北京".to_string(), "beijing".to_string()),
        ]);
        let mut registry = RegionRegistry::with_lookup_table(table);
        registry.register_asset("guangdong");

        assert_eq!(registry.resolve("广东省"), Some("guangdong".to_string()));
        assert_eq!(registry.resolve("北京"), None);
        assert_eq!(registry.record_key("北京"), Some("beijing".to_string()));
        assert_eq!(registry.record_key("火星"), None);
        assert!(registry.province_matches("北京", "北京"));
        assert!(registry.province_matches("广东省", "广东"));
        assert!(!registry.province_matches("广东省", "北京"));
        assert!(registry.province_matches("火星基地", "火星"));
    }

    #[test]
    fn suffix_mode_matches_by_containment() {
        let registry = RegionRegistry::new(ProvinceMatch::SuffixStrip);
        assert!(registry.province_matches("广东省", "广东"));
        assert!(registry.province_matches("广东省", "广东省"));
        assert!(!registry.province_matches("广西", "广东"));
        assert_eq!(registry.filter_name(" 广东省 "), "广东");
    }

    #[test]
    fn parses_match_modes() {
        assert_eq!(ProvinceMatch::parse("Lookup"), Some(ProvinceMatch::LookupTable));
        assert_eq!(ProvinceMatch::parse(" suffix "), Some(ProvinceMatch::SuffixStrip));
        assert_eq!(ProvinceMatch::parse("exact"), None);
    }
}
