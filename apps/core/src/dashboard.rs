use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::domain::{DatasetIndex, NATIONAL_MAP_KEY};
use crate::error::{DashboardError, Result};
use crate::geometry::RegionMap;
use crate::projection::{project, DerivedViews};
use crate::region::RegionRegistry;
use crate::selection::{transition, Action, DrillLevel, Selection};
use crate::vocabulary::FilterVocabulary;

/// Notices kept in the log; older ones are dropped first.
pub const NOTICE_LOG_LIMIT: usize = 32;

/// Receives every successfully recomputed set of views.
pub trait ViewSink {
    fn render(&mut self, views: &DerivedViews);
}

impl<F> ViewSink for F
where
    F: FnMut(&DerivedViews),
{
    fn render(&mut self, views: &DerivedViews) {
        self(views);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoadFailure,
    EmptyResult,
    UnmappedRegion,
}

/// A non-fatal, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&DashboardError> for Notice {
    fn from(error: &DashboardError) -> Self {
        match error {
            DashboardError::LoadFailure { resource, reason } => Self {
                kind: NoticeKind::LoadFailure,
                message: format!("加载 {resource} 失败: {reason}"),
            },
            DashboardError::EmptyResult => Self {
                kind: NoticeKind::EmptyResult,
                message: "暂无销售记录".to_string(),
            },
            DashboardError::UnmappedRegion { region } => Self {
                kind: NoticeKind::UnmappedRegion,
                message: format!("{region} 没有对应的地图"),
            },
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The view controller: owns the dataset, the current selection and the
/// last views that were rendered.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: DatasetIndex,
    registry: RegionRegistry,
    maps: BTreeMap<String, RegionMap>,
    selection: Selection,
    views: Option<DerivedViews>,
    notices: Vec<Notice>,
    raised: usize,
}

impl Dashboard {
    /// Builds the controller and computes the unfiltered views. An empty
    /// dataset is allowed and simply has nothing to show.
    pub fn new(dataset: DatasetIndex, registry: RegionRegistry) -> Self {
        let selection = Selection::default();
        let views = project(&dataset.records, &selection, &registry).ok();

        Self {
            dataset,
            registry,
            maps: BTreeMap::new(),
            selection,
            views,
            notices: Vec::new(),
            raised: 0,
        }
    }

    /// Adds a loaded map asset. Province assets become valid drill targets.
    pub fn add_map(&mut self, map: RegionMap) {
        if map.key != NATIONAL_MAP_KEY {
            self.registry.register_asset(map.key.clone());
        }
        self.maps.insert(map.key.clone(), map);
    }

    /// Applies a user action and recomputes every view from the full
    /// dataset.
    ///
    /// On `UnmappedRegion` nothing changes. On `EmptyResult` the new
    /// selection is kept but the previous views stay as they were and the
    /// sink is not called. Both are also recorded as notices.
    pub fn dispatch(&mut self, action: &Action, sink: &mut impl ViewSink) -> Result<()> {
        let next = transition(&self.selection, action, &self.registry).inspect_err(|error| {
            self.raise(error);
        })?;
        self.selection = next;
        self.refresh(sink)
    }

    /// Recomputes the views for the current selection.
    pub fn refresh(&mut self, sink: &mut impl ViewSink) -> Result<()> {
        match project(&self.dataset.records, &self.selection, &self.registry) {
            Ok(views) => {
                debug!(
                    count = views.summary.count,
                    supply = views.summary.total_supply,
                    "views recomputed"
                );
                sink.render(&views);
                self.views = Some(views);
                Ok(())
            }
            Err(error) => {
                self.raise(&error);
                Err(error)
            }
        }
    }

    /// Records an error as a user-visible notice.
    pub fn raise(&mut self, error: &DashboardError) {
        let notice = Notice::from(error);
        warn!(kind = ?notice.kind, message = %notice.message, "notice raised");
        if self.notices.len() == NOTICE_LOG_LIMIT {
            self.notices.remove(0);
        }
        self.notices.push(notice);
        self.raised += 1;
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub const fn views(&self) -> Option<&DerivedViews> {
        self.views.as_ref()
    }

    pub const fn dataset(&self) -> &DatasetIndex {
        &self.dataset
    }

    pub const fn vocabulary(&self) -> &FilterVocabulary {
        &self.dataset.vocabulary
    }

    pub const fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Notices raised since construction, including dropped and cleared ones.
    pub const fn notices_raised(&self) -> usize {
        self.raised
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    /// The map asset for the current drill level, if loaded.
    pub fn current_map(&self) -> Option<&RegionMap> {
        let key = match &self.selection.level {
            DrillLevel::National => NATIONAL_MAP_KEY,
            DrillLevel::Province(key) => key.as_str(),
        };
        self.maps.get(key)
    }

    pub fn national_map(&self) -> Option<&RegionMap> {
        self.maps.get(NATIONAL_MAP_KEY)
    }
}
