// Core of the TV supply map dashboards: dataset index, filtering,
// aggregation and drill-down. No I/O happens here; front ends load the
// files and hand the text in.
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod region;
pub mod schema;
pub mod selection;
pub mod vocabulary;

pub use dashboard::{Dashboard, Notice, NoticeKind, ViewSink};
pub use domain::{Coordinates, DatasetIndex, Record};
pub use error::{DashboardError, Result};
pub use geometry::RegionMap;
pub use projection::{
    filter_records, project, DerivedViews, MapMarker, MapViewport, SizeDistribution, SizeShare,
    Summary,
};
pub use region::{normalize_region_key, ProvinceMatch, RegionRegistry};
pub use selection::{transition, Action, ClickTarget, DrillLevel, FilterValue, Selection};
pub use vocabulary::FilterVocabulary;
