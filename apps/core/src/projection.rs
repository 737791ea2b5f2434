//! Filtering and the derived views handed to renderers.
//!
//! Every pass starts from the complete record set; nothing is computed
//! incrementally from a previous subset.

use serde::Serialize;

use crate::domain::{Coordinates, Record};
use crate::error::{DashboardError, Result};
use crate::region::RegionRegistry;
use crate::selection::{DrillLevel, FilterValue, Selection};

const SIZE_CLASS_SUFFIX: &str = "寸";
const PROVINCE_ZOOM: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub label: String,
    pub position: Coordinates,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total_supply: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeShare {
    pub label: String,
    pub value: u64,
    pub percent: f64,
}

impl SizeShare {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Supply per screen-size class, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeDistribution {
    pub total: u64,
    pub shares: Vec<SizeShare>,
}

impl SizeDistribution {
    pub fn get(&self, label: &str) -> Option<&SizeShare> {
        self.shares.iter().find(|share| share.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Where the map view should be centred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapViewport {
    pub center: Option<Coordinates>,
    pub zoom: f64,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: None,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedViews {
    pub markers: Vec<MapMarker>,
    pub summary: Summary,
    pub distribution: SizeDistribution,
    pub brand_index: Vec<String>,
    pub viewport: MapViewport,
}

impl DerivedViews {
    pub fn brand_index_label(&self) -> String {
        self.brand_index.join(", ")
    }
}

/// Records retained by every selector and by the drill level.
pub fn filter_records<'a>(
    records: &'a [Record],
    selection: &Selection,
    registry: &RegionRegistry,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| retains(record, selection, registry))
        .collect()
}

fn retains(record: &Record, selection: &Selection, registry: &RegionRegistry) -> bool {
    if !selection.brand.accepts(&record.brand) || !selection.model.accepts(&record.model) {
        return false;
    }

    if let FilterValue::Only(province) = &selection.province {
        if !registry.province_matches(&record.province, province) {
            return false;
        }
    }

    match &selection.level {
        DrillLevel::National => true,
        DrillLevel::Province(key) => {
            registry.record_key(&record.province).as_deref() == Some(key.as_str())
        }
    }
}

/// Full recomputation of every derived view.
///
/// Returns [`DashboardError::EmptyResult`] when nothing survives the
/// filters, so callers keep whatever they rendered last.
pub fn project(
    records: &[Record],
    selection: &Selection,
    registry: &RegionRegistry,
) -> Result<DerivedViews> {
    let subset = filter_records(records, selection, registry);
    if subset.is_empty() {
        return Err(DashboardError::EmptyResult);
    }

    let markers = markers(&subset);
    let viewport = viewport(&selection.level, &markers);

    Ok(DerivedViews {
        summary: summarize(&subset),
        distribution: size_distribution(&subset),
        brand_index: brand_index(records, &selection.brand),
        markers,
        viewport,
    })
}

pub fn markers(subset: &[&Record]) -> Vec<MapMarker> {
    subset
        .iter()
        .map(|record| MapMarker {
            label: record.hotel_name.clone(),
            position: record.coordinates,
            weight: record.supply,
        })
        .collect()
}

pub fn summarize(subset: &[&Record]) -> Summary {
    Summary {
        count: subset.len(),
        total_supply: subset.iter().map(|record| u64::from(record.supply)).sum(),
    }
}

/// Size class of a model code: its first two characters plus `寸`, when
/// those characters read as a number.
pub fn size_class(model: &str) -> Option<String> {
    let head: String = model.chars().take(2).collect();
    is_numeric_literal(&head).then(|| format!("{head}{SIZE_CLASS_SUFFIX}"))
}

// Same acceptance as JavaScript's `Number()` on a short slice: surrounding
// whitespace ignored, blank rejected.
fn is_numeric_literal(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
        && trimmed.parse::<f64>().is_ok()
}

pub fn size_distribution(subset: &[&Record]) -> SizeDistribution {
    let mut groups: Vec<(String, u64)> = Vec::new();

    for record in subset {
        let Some(label) = size_class(&record.model) else {
            continue;
        };
        let supply = u64::from(record.supply);
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, value)) => *value += supply,
            None => groups.push((label, supply)),
        }
    }

    let total = groups.iter().map(|(_, value)| value).sum::<u64>();
    let shares = groups
        .into_iter()
        .map(|(label, value)| {
            #[allow(clippy::cast_precision_loss)]
            let percent = if total > 0 {
                value as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            SizeShare {
                label,
                value,
                percent,
            }
        })
        .collect();

    SizeDistribution { total, shares }
}

/// Distinct brands among the records kept by the brand selector alone.
pub fn brand_index(records: &[Record], brand: &FilterValue) -> Vec<String> {
    let mut brands: Vec<String> = Vec::new();
    for record in records.iter().filter(|record| brand.accepts(&record.brand)) {
        if !brands.iter().any(|existing| *existing == record.brand) {
            brands.push(record.brand.clone());
        }
    }
    brands
}

fn viewport(level: &DrillLevel, markers: &[MapMarker]) -> MapViewport {
    if *level == DrillLevel::National {
        return MapViewport::default();
    }

    let center = bounds(markers.iter().map(|marker| marker.position)).map(|(min, max)| {
        Coordinates::new(
            (min.longitude + max.longitude) / 2.0,
            (min.latitude + max.latitude) / 2.0,
        )
    });

    MapViewport {
        center,
        zoom: PROVINCE_ZOOM,
    }
}

/// Bounding box of a set of positions as `(south-west, north-east)`.
pub fn bounds(
    positions: impl IntoIterator<Item = Coordinates>,
) -> Option<(Coordinates, Coordinates)> {
    positions.into_iter().fold(None, |acc, position| {
        let (min, max) = acc.unwrap_or((position, position));
        Some((
            Coordinates::new(
                min.longitude.min(position.longitude),
                min.latitude.min(position.latitude),
            ),
            Coordinates::new(
                max.longitude.max(position.longitude),
                max.latitude.max(position.latitude),
            ),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::ProvinceMatch;
    use crate::selection::{transition, Action};

    fn record(brand: &str, model: &str, supply: u32, province: &str, lon: f64, lat: f64) -> Record {
        Record {
            hotel_name: format!("{brand}-{model}-{province}"),
            brand: brand.to_string(),
            subbrand: None,
            model: model.to_string(),
            coordinates: Coordinates::new(lon, lat),
            supply,
            province: province.to_string(),
            city: String::new(),
            location: None,
        }
    }

    fn scenario_records() -> Vec<Record> {
        vec![
            record("A", "55X", 10, "广东省", 113.0, 23.0),
            record("B", "32Y", 5, "北京", 116.0, 39.0),
        ]
    }

    fn wider_records() -> Vec<Record> {
        vec![
            record("A", "55X", 10, "广东省", 113.0, 23.0),
            record("B", "32Y", 5, "北京", 116.0, 39.0),
            record("A", "65Z", 7, "广东省", 114.0, 22.5),
            record("C", "QLED", 3, "浙江省", 120.0, 30.0),
            record("B", "55X", 0, "北京", 116.4, 39.9),
        ]
    }

    fn registry() -> RegionRegistry {
        let mut registry = RegionRegistry::new(ProvinceMatch::SuffixStrip);
        for key in ["广东", "北京", "浙江"] {
            registry.register_asset(key);
        }
        registry
    }

    fn selections() -> Vec<Selection> {
        let registry = registry();
        let actions = [
            vec![],
            vec![Action::ChooseBrand("A".into())],
            vec![Action::ChooseModel("55X".into())],
            vec![Action::ChooseProvince("广东".into())],
            vec![
                Action::ChooseBrand("B".into()),
                Action::ChooseProvince("北京".into()),
            ],
            vec![Action::ChooseBrand("Z".into())],
        ];

        actions
            .iter()
            .map(|steps| {
                steps.iter().fold(Selection::default(), |selection, action| {
                    transition(&selection, action, &registry).expect("transition")
                })
            })
            .collect()
    }

    #[test]
    fn unfiltered_scenario() {
        let records = scenario_records();

        let views = project(&records, &Selection::default(), &registry()).expect("views");

        assert_eq!(views.summary.count, 2);
        assert_eq!(views.summary.total_supply, 15);
        assert_eq!(views.distribution.total, 15);

        let large = views.distribution.get("55寸").expect("55寸");
        let small = views.distribution.get("32寸").expect("32寸");
        assert_eq!(large.value, 10);
        assert_eq!(small.value, 5);
        assert_eq!(large.percent_label(), "66.7%");
        assert_eq!(small.percent_label(), "33.3%");
        assert_eq!(views.brand_index, vec!["A", "B"]);
        assert_eq!(views.viewport, MapViewport::default());
    }

    #[test]
    fn province_filter_matches_by_substring() {
        let records = scenario_records();
        let selection = Selection {
            province: FilterValue::Only("广东".into()),
            ..Selection::default()
        };

        let subset = filter_records(&records, &selection, &registry());
        let views = project(&records, &selection, &registry()).expect("views");

        assert_eq!(subset.len(), 1);
        assert_eq!(views.markers.len(), 1);
        assert_eq!(views.markers[0].label, "A-55X-广东省");
        assert_eq!(views.markers[0].weight, 10);
    }

    #[test]
    fn lookup_mode_filters_vocabulary_names_against_suffixed_records() {
        let records = scenario_records();
        let table = std::collections::BTreeMap::from([
            ("广东".to_string(), "guangdong".to_string()),
            ("北京".to_string(), "beijing".to_string()),
        ]);
        let mut registry = RegionRegistry::with_lookup_table(table);
        registry.register_asset("guangdong");
        let vocabulary = crate::vocabulary::FilterVocabulary::from_records(&records);
        let chosen = vocabulary.named_provinces()[0].clone();
        assert_eq!(chosen, "广东");

        let selection = transition(&Selection::default(), &Action::ChooseProvince(chosen), &registry)
            .expect("transition");
        let views = project(&records, &selection, &registry).expect("views");

        assert_eq!(selection.level, DrillLevel::Province("guangdong".into()));
        assert_eq!(views.summary.count, 1);
        assert_eq!(views.markers[0].label, "A-55X-广东省");
    }

    #[test]
    fn focused_brand_view_applies_brand_and_map_level_only() {
        let records = wider_records();
        let registry = registry();
        let prior = [
            Action::ChooseModel("65Z".into()),
            Action::ChooseProvince("广东省".into()),
        ]
        .iter()
        .fold(Selection::default(), |selection, action| {
            transition(&selection, action, &registry).expect("transition")
        });

        let focused = transition(&prior, &Action::FocusBrand("A".into()), &registry)
            .expect("transition");
        let views = project(&records, &focused, &registry).expect("views");

        let expected: Vec<&str> = records
            .iter()
            .filter(|record| {
                record.brand == "A" && registry.record_key(&record.province).as_deref() == Some("广东")
            })
            .map(|record| record.hotel_name.as_str())
            .collect();
        let labels: Vec<&str> = views.markers.iter().map(|marker| marker.label.as_str()).collect();
        assert_eq!(labels, expected);
        assert_eq!(labels, vec!["A-55X-广东省", "A-65Z-广东省"]);
    }

    #[test]
    fn drill_level_restricts_to_province_key() {
        let records = wider_records();
        let selection = Selection {
            level: DrillLevel::Province("广东".into()),
            ..Selection::default()
        };

        let views = project(&records, &selection, &registry()).expect("views");

        assert_eq!(views.summary.count, 2);
        assert_eq!(views.summary.total_supply, 17);
        let center = views.viewport.center.expect("center");
        assert!((center.longitude - 113.5).abs() < 1e-9);
        assert!((center.latitude - 22.75).abs() < 1e-9);
        assert!((views.viewport.zoom - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_subset_is_an_error() {
        let records = scenario_records();
        let selection = Selection {
            brand: FilterValue::Only("Z".into()),
            ..Selection::default()
        };

        assert_eq!(
            project(&records, &selection, &registry()),
            Err(DashboardError::EmptyResult)
        );
    }

    #[test]
    fn non_numeric_models_skip_the_distribution_only() {
        let records = wider_records();
        let selection = Selection {
            brand: FilterValue::Only("C".into()),
            ..Selection::default()
        };

        let views = project(&records, &selection, &registry()).expect("views");

        assert_eq!(views.summary.count, 1);
        assert_eq!(views.summary.total_supply, 3);
        assert_eq!(views.markers.len(), 1);
        assert!(views.distribution.is_empty());
        assert_eq!(views.distribution.total, 0);
    }

    #[test]
    fn zero_supply_distribution_has_zero_percentages() {
        let records = vec![record("A", "55X", 0, "北京", 116.0, 39.0)];

        let views = project(&records, &Selection::default(), &registry()).expect("views");

        assert_eq!(views.distribution.shares.len(), 1);
        assert!(views
            .distribution
            .shares
            .iter()
            .all(|share| share.percent == 0.0));
    }

    #[test]
    fn size_class_follows_number_semantics() {
        assert_eq!(size_class("55X"), Some("55寸".to_string()));
        assert_eq!(size_class("5"), Some("5寸".to_string()));
        assert_eq!(size_class("4.5"), Some("4.寸".to_string()));
        assert_eq!(size_class(" 5K"), Some(" 5寸".to_string()));
        assert_eq!(size_class("QLED"), None);
        assert_eq!(size_class("0x1F"), None);
        assert_eq!(size_class("  "), None);
        assert_eq!(size_class(""), None);
        assert_eq!(size_class("五五"), None);
    }

    #[test]
    fn brand_index_ignores_model_and_province() {
        let records = wider_records();
        let selection = Selection {
            model: FilterValue::Only("55X".into()),
            province: FilterValue::Only("北京".into()),
            ..Selection::default()
        };

        let views = project(&records, &selection, &registry()).expect("views");

        assert_eq!(views.summary.count, 1);
        assert_eq!(views.brand_index, vec!["A", "B", "C"]);
        assert_eq!(views.brand_index_label(), "A, B, C");

        let branded = Selection {
            brand: FilterValue::Only("B".into()),
            ..selection
        };
        let views = project(&records, &branded, &registry()).expect("views");
        assert_eq!(views.brand_index, vec!["B"]);
    }

    #[test]
    fn subsets_never_fabricate_records() {
        let records = wider_records();
        for selection in selections() {
            for kept in filter_records(&records, &selection, &registry()) {
                assert!(records.iter().any(|record| std::ptr::eq(record, kept)));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = wider_records();
        for selection in selections() {
            let once: Vec<Record> = filter_records(&records, &selection, &registry())
                .into_iter()
                .cloned()
                .collect();
            let twice: Vec<Record> = filter_records(&once, &selection, &registry())
                .into_iter()
                .cloned()
                .collect();
            assert_eq!(once, twice, "{selection:?}");
        }
    }

    #[test]
    fn total_supply_matches_subset_sum() {
        let records = wider_records();
        for selection in selections() {
            let subset = filter_records(&records, &selection, &registry());
            let expected: u64 = subset.iter().map(|record| u64::from(record.supply)).sum();
            assert_eq!(summarize(&subset).total_supply, expected);
        }

        let all = filter_records(&records, &Selection::default(), &registry());
        assert_eq!(summarize(&all).total_supply, 25);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let records = wider_records();
        for selection in selections() {
            let subset = filter_records(&records, &selection, &registry());
            let distribution = size_distribution(&subset);
            if distribution.total == 0 {
                assert!(distribution.shares.iter().all(|share| share.percent == 0.0));
                continue;
            }
            let sum: f64 = distribution.shares.iter().map(|share| share.percent).sum();
            assert!((sum - 100.0).abs() < 1e-6, "{selection:?}: {sum}");
        }
    }

    #[test]
    fn bounds_cover_every_position() {
        let positions = [
            Coordinates::new(113.0, 23.0),
            Coordinates::new(116.0, 39.0),
            Coordinates::new(100.0, 30.0),
        ];

        let (min, max) = bounds(positions).expect("bounds");

        assert_eq!(min, Coordinates::new(100.0, 23.0));
        assert_eq!(max, Coordinates::new(116.0, 39.0));
        assert_eq!(bounds(Vec::new()), None);
    }
}
