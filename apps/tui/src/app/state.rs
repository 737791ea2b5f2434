use std::cell::Cell;

use chrono::{DateTime, Local};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::layout::Rect;
use throbber_widgets_tui::ThrobberState;
use tracing::debug;
use tvmap::data::{LoadReport, Loaded};
use tvmap_core::vocabulary::FilterKind;
use tvmap_core::{Action, ClickTarget, Dashboard, DerivedViews, FilterVocabulary, Notice};

use crate::ui::widgets::map::{marker_near, MapFrame};

pub const FILTER_KINDS: [FilterKind; 3] = [FilterKind::Brand, FilterKind::Model, FilterKind::Province];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Dashboard,
    Picker,
    BrandIndex,
}

/// Fuzzy search over one selector's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    pub kind: FilterKind,
    pub query: String,
    pub selected: usize,
}

impl PickerState {
    pub const fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            query: String::new(),
            selected: 0,
        }
    }

    /// Vocabulary entries matching the query, best match first. An empty
    /// query keeps the vocabulary order.
    pub fn matches<'a>(&self, vocabulary: &'a FilterVocabulary) -> Vec<&'a str> {
        let entries = vocabulary.list(self.kind);
        if self.query.trim().is_empty() {
            return entries.iter().map(String::as_str).collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, usize, &str)> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                matcher
                    .fuzzy_match(entry, self.query.trim())
                    .map(|score| (score, index, entry.as_str()))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, _, entry)| entry).collect()
    }
}

pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub show_help: bool,
    pub dashboard: Option<Dashboard>,
    pub report: LoadReport,
    pub filter_index: usize,
    pub picker: Option<PickerState>,
    pub brand_selection_index: usize,
    pub status_message: String,
    pub notice_at: Option<DateTime<Local>>,
    pub last_render: Option<DateTime<Local>>,
    pub throbber: ThrobberState,
    /// Inner area of the map canvas as last drawn, for mouse hit tests.
    pub map_area: Cell<Rect>,
    notices_seen: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            screen: AppScreen::Dashboard,
            show_help: false,
            dashboard: None,
            report: LoadReport::default(),
            filter_index: 0,
            picker: None,
            brand_selection_index: 0,
            status_message: String::new(),
            notice_at: None,
            last_render: None,
            throbber: ThrobberState::default(),
            map_area: Cell::new(Rect::default()),
            notices_seen: 0,
        }
    }

    pub const fn is_loading(&self) -> bool {
        self.dashboard.is_none()
    }

    /// Advances the loading throbber.
    pub fn update(&mut self) {
        if self.is_loading() {
            self.throbber.calc_next();
        }
    }

    pub fn finish_loading(&mut self, loaded: Loaded) {
        self.report = loaded.report;
        self.dashboard = Some(loaded.dashboard);
        self.last_render = self
            .dashboard
            .as_ref()
            .and_then(Dashboard::views)
            .map(|_| Local::now());
        self.status_message = format!(
            "Loaded {} records, {} maps",
            self.report.records, self.report.maps_loaded
        );
        self.track_notices();
    }

    pub fn focused_filter(&self) -> FilterKind {
        FILTER_KINDS[self.filter_index % FILTER_KINDS.len()]
    }

    pub fn views(&self) -> Option<&DerivedViews> {
        self.dashboard.as_ref().and_then(Dashboard::views)
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.dashboard.as_ref().and_then(Dashboard::latest_notice)
    }

    /// Dispatches an action to the dashboard. Rejections and empty results
    /// surface as notices; the previous views stay on screen.
    pub fn apply(&mut self, action: &Action) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            self.status_message = "Still loading".to_string();
            return;
        };

        let last_render = &mut self.last_render;
        let outcome = dashboard.dispatch(action, &mut |views: &DerivedViews| {
            debug!(markers = views.markers.len(), "views rendered");
            *last_render = Some(Local::now());
        });

        self.status_message = match outcome {
            Ok(()) => self.views().map_or_else(String::new, |views| {
                format!(
                    "{}家 / {}台",
                    views.summary.count, views.summary.total_supply
                )
            }),
            Err(_) => String::new(),
        };
        self.brand_selection_index = 0;
        self.track_notices();
    }

    pub fn open_picker(&mut self) {
        self.picker = Some(PickerState::new(self.focused_filter()));
        self.screen = AppScreen::Picker;
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
        self.screen = AppScreen::Dashboard;
    }

    /// Applies the highlighted picker entry to its selector.
    pub fn confirm_picker(&mut self) {
        let choice = match (&self.picker, &self.dashboard) {
            (Some(picker), Some(dashboard)) => picker
                .matches(dashboard.vocabulary())
                .get(picker.selected)
                .map(|value| (picker.kind, (*value).to_string())),
            _ => None,
        };
        self.close_picker();

        if let Some((kind, value)) = choice {
            let action = match kind {
                FilterKind::Brand => Action::ChooseBrand(value),
                FilterKind::Model => Action::ChooseModel(value),
                FilterKind::Province => Action::ChooseProvince(value),
            };
            self.apply(&action);
        }
    }

    pub fn brand_index(&self) -> &[String] {
        self.views()
            .map(|views| views.brand_index.as_slice())
            .unwrap_or_default()
    }

    pub fn focus_selected_brand(&mut self) {
        if let Some(brand) = self.brand_index().get(self.brand_selection_index).cloned() {
            self.screen = AppScreen::Dashboard;
            self.apply(&Action::FocusBrand(brand));
        }
    }

    /// Turns a left click on the map canvas into a region or marker click.
    pub fn click_map(&mut self, column: u16, row: u16) {
        let area = self.map_area.get();
        let Some(dashboard) = self.dashboard.as_ref() else {
            return;
        };
        let map = dashboard.current_map();
        let views = dashboard.views();
        let frame = MapFrame::for_view(map, views);
        let Some(position) = frame.position_at(area, column, row) else {
            return;
        };

        let marker = views
            .and_then(|views| marker_near(&views.markers, position, frame.cell_size(area)));
        let (action, hotel) = if let Some(marker) = marker {
            let action = Action::ClickRegion {
                name: marker.label.clone(),
                target: ClickTarget::Marker,
            };
            (action, Some(marker.label.clone()))
        } else if let Some(name) = map.and_then(|map| map.feature_at(position)) {
            let action = Action::ClickRegion {
                name: name.to_string(),
                target: ClickTarget::Geo,
            };
            (action, None)
        } else {
            return;
        };

        debug!(?action, column, row, "map click");
        self.apply(&action);
        if let Some(hotel) = hotel {
            self.status_message = hotel;
        }
    }

    pub fn reset(&mut self) {
        self.apply(&Action::Reset);
    }

    pub fn dismiss_notices(&mut self) {
        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.clear_notices();
        }
        self.notice_at = None;
    }

    fn track_notices(&mut self) {
        let count = self
            .dashboard
            .as_ref()
            .map_or(0, Dashboard::notices_raised);
        if count > self.notices_seen {
            self.notice_at = Some(Local::now());
        }
        self.notices_seen = count;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
