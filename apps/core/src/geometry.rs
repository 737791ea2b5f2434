use geo::{BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon};
use geojson::{Feature, GeoJson, Value};
use tracing::warn;

use crate::domain::Coordinates;
use crate::error::{DashboardError, Result};

/// A named area of a map asset.
#[derive(Debug, Clone)]
pub struct RegionFeature {
    pub name: String,
    pub shape: MultiPolygon<f64>,
}

/// One map asset: the national outline or a single province.
#[derive(Debug, Clone)]
pub struct RegionMap {
    pub key: String,
    pub features: Vec<RegionFeature>,
}

impl RegionMap {
    /// Parses a GeoJSON document. Features without a `name` property or
    /// without (multi)polygon geometry are skipped.
    pub fn from_geojson(key: &str, text: &str) -> Result<Self> {
        let resource = format!("map/{key}");
        let geojson = text
            .parse::<GeoJson>()
            .map_err(|error| DashboardError::load_failure(&resource, error))?;

        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(DashboardError::load_failure(
                    resource,
                    "expected a Feature or FeatureCollection",
                ))
            }
        };

        let features = features
            .iter()
            .filter_map(|feature| {
                let region = region_feature(feature);
                if region.is_none() {
                    warn!(map = key, "skipping unnamed or non-polygon feature");
                }
                region
            })
            .collect();

        Ok(Self {
            key: key.to_string(),
            features,
        })
    }

    /// Name of the feature containing `position`, if any.
    pub fn feature_at(&self, position: Coordinates) -> Option<&str> {
        let point = Point::new(position.longitude, position.latitude);
        self.features
            .iter()
            .find(|feature| feature.shape.contains(&point))
            .map(|feature| feature.name.as_str())
    }

    /// Exterior rings of every feature as `(lon, lat)` polylines.
    pub fn outlines(&self) -> Vec<Vec<(f64, f64)>> {
        self.features
            .iter()
            .flat_map(|feature| feature.shape.iter())
            .map(|polygon| {
                polygon
                    .exterior()
                    .coords()
                    .map(|coord| (coord.x, coord.y))
                    .collect()
            })
            .collect()
    }

    /// `(south-west, north-east)` corners of the whole asset.
    pub fn bounds(&self) -> Option<(Coordinates, Coordinates)> {
        self.features
            .iter()
            .filter_map(|feature| feature.shape.bounding_rect())
            .map(|rect| {
                (
                    Coordinates::new(rect.min().x, rect.min().y),
                    Coordinates::new(rect.max().x, rect.max().y),
                )
            })
            .reduce(|(min_a, max_a), (min_b, max_b)| {
                (
                    Coordinates::new(
                        min_a.longitude.min(min_b.longitude),
                        min_a.latitude.min(min_b.latitude),
                    ),
                    Coordinates::new(
                        max_a.longitude.max(max_b.longitude),
                        max_a.latitude.max(max_b.latitude),
                    ),
                )
            })
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|feature| feature.name.as_str())
    }
}

fn region_feature(feature: &Feature) -> Option<RegionFeature> {
    let name = feature.property("name")?.as_str()?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let polygons = match &feature.geometry.as_ref()?.value {
        Value::Polygon(rings) => vec![polygon(rings)?],
        Value::MultiPolygon(parts) => parts
            .iter()
            .map(|rings| polygon(rings))
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };

    Some(RegionFeature {
        name,
        shape: MultiPolygon::new(polygons),
    })
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| line_string(ring));
    let exterior = rings.next()??;
    let interiors = rings.collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn line_string(ring: &[Vec<f64>]) -> Option<LineString<f64>> {
    let points = ring
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (points.len() >= 3).then(|| LineString::from(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVINCES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "广东省" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[109.0, 20.0], [117.0, 20.0], [117.0, 25.5], [109.0, 25.5], [109.0, 20.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "北京" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[115.4, 39.4], [117.5, 39.4], [117.5, 41.1], [115.4, 41.1], [115.4, 39.4]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "adcode": 100000 },
                "geometry": { "type": "Point", "coordinates": [116.0, 39.0] }
            }
        ]
    }"#;

    #[test]
    fn parses_named_polygon_features() {
        let map = RegionMap::from_geojson("china", PROVINCES).expect("map");

        assert_eq!(map.key, "china");
        assert_eq!(map.feature_names().collect::<Vec<_>>(), vec!["广东省", "北京"]);
        assert_eq!(map.outlines().len(), 2);
    }

    #[test]
    fn hit_tests_positions() {
        let map = RegionMap::from_geojson("china", PROVINCES).expect("map");

        assert_eq!(map.feature_at(Coordinates::new(113.26, 23.13)), Some("广东省"));
        assert_eq!(map.feature_at(Coordinates::new(116.4, 39.9)), Some("北京"));
        assert_eq!(map.feature_at(Coordinates::new(87.6, 43.8)), None);
    }

    #[test]
    fn bounds_span_all_features() {
        let map = RegionMap::from_geojson("china", PROVINCES).expect("map");

        let (min, max) = map.bounds().expect("bounds");

        assert_eq!(min, Coordinates::new(109.0, 20.0));
        assert_eq!(max, Coordinates::new(117.5, 41.1));
    }

    #[test]
    fn rejects_bare_geometry_and_garbage() {
        let bare = r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#;
        assert!(matches!(
            RegionMap::from_geojson("x", bare),
            Err(DashboardError::LoadFailure { .. })
        ));
        assert!(RegionMap::from_geojson("x", "not json").is_err());
    }
}
