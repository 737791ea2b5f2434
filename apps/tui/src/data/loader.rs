//! Reads the dataset, the vocabulary and the map assets from disk.
//!
//! Nothing here is fatal: every failure becomes a `LoadFailure` notice on
//! the returned dashboard and the load carries on with a fallback.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use tvmap_core::domain::NATIONAL_MAP_KEY;
use tvmap_core::schema::{parse_records, parse_region_keys, parse_vocabulary};
use tvmap_core::{
    Dashboard, DashboardError, DatasetIndex, FilterVocabulary, ProvinceMatch, RegionMap,
    RegionRegistry,
};

use crate::config::DashboardConfig;

/// Counts describing what a load produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub records: usize,
    pub quarantined: usize,
    pub vocabulary_from_records: bool,
    pub maps_loaded: usize,
    pub maps_missing: usize,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub dashboard: Dashboard,
    pub report: LoadReport,
}

pub async fn load_dashboard(config: &DashboardConfig) -> Loaded {
    let mut failures = Vec::new();
    let mut report = LoadReport::default();

    let records = match read(&config.data_path).await.and_then(|text| parse_records(&text)) {
        Ok(parsed) => {
            report.quarantined = parsed.quarantined.len();
            parsed.records
        }
        Err(error) => {
            failures.push(error);
            Vec::new()
        }
    };
    report.records = records.len();

    let vocabulary = match read(&config.filters_path)
        .await
        .and_then(|text| parse_vocabulary(&text))
    {
        Ok(vocabulary) => {
            for gap in vocabulary.covers(&records) {
                warn!(kind = gap.kind.label(), value = %gap.value, "record value missing from vocabulary");
            }
            vocabulary
        }
        Err(error) => {
            failures.push(error);
            report.vocabulary_from_records = true;
            FilterVocabulary::from_records(&records)
        }
    };

    let registry = load_registry(config, &mut failures).await;
    let map_keys = province_keys(&registry, &vocabulary);
    let mut dashboard = Dashboard::new(DatasetIndex::new(records, vocabulary), registry);

    let national = load_map(NATIONAL_MAP_KEY, &config.national_map_path()).await;
    let provinces = map_keys
        .iter()
        .map(|key| (key.as_str(), config.province_map_path(key)));
    for result in std::iter::once(national).chain(load_maps(provinces).await) {
        match result {
            Ok(map) => {
                report.maps_loaded += 1;
                dashboard.add_map(map);
            }
            Err(error) => {
                report.maps_missing += 1;
                failures.push(error);
            }
        }
    }

    for failure in &failures {
        dashboard.raise(failure);
    }

    info!(
        records = report.records,
        quarantined = report.quarantined,
        maps = report.maps_loaded,
        missing_maps = report.maps_missing,
        "dashboard loaded"
    );

    Loaded { dashboard, report }
}

async fn load_registry(
    config: &DashboardConfig,
    failures: &mut Vec<DashboardError>,
) -> RegionRegistry {
    if !config.uses_lookup_table() {
        return RegionRegistry::new(ProvinceMatch::SuffixStrip);
    }

    match read(&config.region_keys_path)
        .await
        .and_then(|text| parse_region_keys(&text))
    {
        Ok(table) => RegionRegistry::with_lookup_table(table),
        Err(error) => {
            warn!("region key table unavailable, matching by suffix instead");
            failures.push(error);
            RegionRegistry::new(ProvinceMatch::SuffixStrip)
        }
    }
}

/// Distinct map keys for the provinces the vocabulary names.
fn province_keys(registry: &RegionRegistry, vocabulary: &FilterVocabulary) -> BTreeSet<String> {
    vocabulary
        .named_provinces()
        .iter()
        .filter_map(|name| {
            let key = registry.key_for(name);
            if key.is_none() {
                warn!(province = %name, "no map key for province");
            }
            key
        })
        .collect()
}

async fn load_maps<'a>(
    assets: impl Iterator<Item = (&'a str, PathBuf)>,
) -> Vec<Result<RegionMap, DashboardError>> {
    let mut tasks = tokio::task::JoinSet::new();
    for (key, path) in assets {
        let key = key.to_string();
        tasks.spawn(async move { load_map(&key, &path).await });
    }

    let mut maps = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => maps.push(result),
            Err(error) => maps.push(Err(DashboardError::load_failure("map", error))),
        }
    }
    maps.sort_by(|a, b| map_order(a).cmp(map_order(b)));
    maps
}

fn map_order(result: &Result<RegionMap, DashboardError>) -> &str {
    match result {
        Ok(map) => map.key.as_str(),
        Err(DashboardError::LoadFailure { resource, .. }) => resource.as_str(),
        Err(_) => "",
    }
}

async fn load_map(key: &str, path: &Path) -> Result<RegionMap, DashboardError> {
    let text = read(path).await?;
    RegionMap::from_geojson(key, &text)
}

async fn read(path: &Path) -> Result<String, DashboardError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|error| DashboardError::load_failure(path.display().to_string(), error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tvmap_core::NoticeKind;

    const DATA: &str = r#"[
        { "hotelName": "白云宾馆", "brand": "A", "model": "55X", "coordinates": "113.26,23.13", "supply": 10, "province": "广东省", "city": "广州市" },
        { "hotelName": "长城饭店", "brand": "B", "model": "32Y", "coordinates": "116.4,39.9", "supply": 5, "province": "北京", "city": "北京市" },
        { "hotelName": "broken", "brand": "B", "model": "32Y", "coordinates": "oops", "supply": 5, "province": "北京" }
    ]"#;

    const FILTERS: &str = r#"{
        "provinces": ["全国", "广东", "北京"],
        "brands": ["所有品牌", "A", "B"],
        "models": ["所有型号", "55X", "32Y"]
    }"#;

    const CHINA: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "广东省" },
              "geometry": { "type": "Polygon", "coordinates": [[[109.0, 20.0], [117.0, 20.0], [117.0, 25.5], [109.0, 25.5], [109.0, 20.0]]] } },
            { "type": "Feature", "properties": { "name": "北京" },
              "geometry": { "type": "Polygon", "coordinates": [[[115.4, 39.4], [117.5, 39.4], [117.5, 41.1], [115.4, 41.1], [115.4, 39.4]]] } }
        ]
    }"#;

    const GUANGDONG: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "广州市" },
              "geometry": { "type": "Polygon", "coordinates": [[[112.9, 22.5], [114.0, 22.5], [114.0, 24.0], [112.9, 24.0], [112.9, 22.5]]] } }
        ]
    }"#;

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let dir = std::env::temp_dir().join(format!("tvmap-{label}-{nanos}"));
        std::fs::create_dir_all(dir.join("map").join("province")).expect("create fixture dir");
        dir
    }

    fn write(dir: &Path, relative: &str, contents: &str) {
        std::fs::write(dir.join(relative), contents).expect("write fixture");
    }

    fn config_for(dir: &Path) -> DashboardConfig {
        DashboardConfig {
            data_path: dir.join("data.json"),
            filters_path: dir.join("filters.json"),
            map_dir: dir.join("map"),
            region_keys_path: dir.join("map").join("keys.json"),
            province_match: ProvinceMatch::SuffixStrip,
        }
    }

    fn full_fixture(label: &str) -> PathBuf {
        let dir = temp_dir(label);
        write(&dir, "data.json", DATA);
        write(&dir, "filters.json", FILTERS);
        write(&dir, "map/china.json", CHINA);
        write(&dir, "map/province/广东.json", GUANGDONG);
        dir
    }

    #[tokio::test]
    async fn loads_dataset_vocabulary_and_maps() {
        let dir = full_fixture("full");

        let Loaded { dashboard, report } = load_dashboard(&config_for(&dir)).await;

        assert_eq!(report.records, 2);
        assert_eq!(report.quarantined, 1);
        assert!(!report.vocabulary_from_records);
        assert_eq!(report.maps_loaded, 2);
        assert_eq!(report.maps_missing, 1);

        let views = dashboard.views().expect("views");
        assert_eq!(views.summary.total_supply, 15);
        assert!(dashboard.national_map().is_some());
        assert!(dashboard.registry().has_asset("广东"));
        assert!(!dashboard.registry().has_asset("北京"));

        let notices = dashboard.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::LoadFailure);
        assert!(notices[0].message.contains("北京.json"));
    }

    #[tokio::test]
    async fn missing_dataset_falls_back_to_empty() {
        let dir = temp_dir("no-data");
        write(&dir, "filters.json", FILTERS);

        let Loaded { dashboard, report } = load_dashboard(&config_for(&dir)).await;

        assert_eq!(report.records, 0);
        assert!(dashboard.views().is_none());
        let first = dashboard.notices().first().expect("notice");
        assert_eq!(first.kind, NoticeKind::LoadFailure);
        assert!(first.message.contains("data.json"));
    }

    #[tokio::test]
    async fn broken_vocabulary_is_derived_from_records() {
        let dir = full_fixture("bad-filters");
        write(&dir, "filters.json", "{ not json");

        let Loaded { dashboard, report } = load_dashboard(&config_for(&dir)).await;

        assert!(report.vocabulary_from_records);
        assert_eq!(dashboard.vocabulary().brands, vec!["所有品牌", "A", "B"]);
        assert_eq!(dashboard.vocabulary().provinces, vec!["全国", "广东", "北京"]);
        assert!(dashboard
            .notices()
            .iter()
            .any(|notice| notice.message.contains("filters.json")));
    }

    #[tokio::test]
    async fn lookup_mode_without_table_matches_by_suffix() {
        let dir = full_fixture("no-keys");
        let config = DashboardConfig {
            province_match: ProvinceMatch::LookupTable,
            ..config_for(&dir)
        };

        let Loaded { dashboard, .. } = load_dashboard(&config).await;

        assert_eq!(dashboard.registry().mode(), ProvinceMatch::SuffixStrip);
        assert!(dashboard.registry().has_asset("广东"));
        assert!(dashboard
            .notices()
            .iter()
            .any(|notice| notice.message.contains("keys.json")));
    }

    #[tokio::test]
    async fn lookup_mode_loads_assets_by_table_key() {
        let dir = full_fixture("keys");
        write(&dir, "map/keys.json", r#"{ "广东": "guangdong", "北京": "beijing" }"#);
        write(&dir, "map/province/guangdong.json", GUANGDONG);
        let config = DashboardConfig {
            province_match: ProvinceMatch::LookupTable,
            ..config_for(&dir)
        };

        let Loaded { dashboard, report } = load_dashboard(&config).await;

        assert!(dashboard.registry().has_asset("guangdong"));
        assert!(!dashboard.registry().has_asset("广东"));
        assert_eq!(report.maps_loaded, 2);
    }
}
