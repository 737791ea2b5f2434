use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::convert::TryFrom;
use std::fmt::{self, Write as _};
use std::io::Stdout;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use tvmap::config::DashboardConfig;
use tvmap::data::{load_dashboard, LoadReport, Loaded};
use tvmap_core::{
    Action, Dashboard, DashboardError, DatasetIndex, DerivedViews, RegionRegistry, SizeShare,
};

use crate::app::{handle_input, App};
use crate::ui;

const HEADLESS_MARKERS: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug)]
enum LoadEvent {
    Start,
    Finished(Box<Loaded>),
    Crashed(String),
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Finished(_) => write!(f, "Finished"),
            Self::Crashed(reason) => write!(f, "Crashed({reason})"),
        }
    }
}

#[derive(Debug)]
struct StateTransitionError {
    from: LoadState,
    event: String,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

/// Tracks the background load so the dashboard only becomes interactive
/// once, after every file has been read.
struct LoadMachine {
    state: LoadState,
}

impl LoadMachine {
    const fn new() -> Self {
        Self {
            state: LoadState::Idle,
        }
    }

    const fn state(&self) -> LoadState {
        self.state
    }

    fn process_event(
        &mut self,
        event: LoadEvent,
        app: &mut App,
    ) -> std::result::Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        self.state = next_state.0;
        Ok(())
    }
}

struct NextState(LoadState);

impl TryFrom<(LoadState, LoadEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(
        value: (LoadState, LoadEvent, &mut App),
    ) -> std::result::Result<Self, Self::Error> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            (LoadState::Idle, LoadEvent::Start) => {
                app.status_message = "Loading...".to_string();
                Ok(Self(LoadState::Loading))
            }
            (LoadState::Loading, LoadEvent::Finished(loaded)) => {
                app.finish_loading(*loaded);
                Ok(Self(LoadState::Ready))
            }
            (LoadState::Loading, LoadEvent::Crashed(reason)) => {
                error!(%reason, "load task failed");
                let mut dashboard =
                    Dashboard::new(DatasetIndex::default(), RegionRegistry::default());
                dashboard.raise(&DashboardError::load_failure("data", reason));
                app.finish_loading(Loaded {
                    dashboard,
                    report: LoadReport::default(),
                });
                Ok(Self(LoadState::Failed))
            }
            (from, event) => Err(StateTransitionError {
                from,
                event: event.to_string(),
            }),
        }
    }
}

/// Loads the files, applies `actions` in order and prints the views.
pub async fn run_headless(config: &DashboardConfig, actions: &[Action], json: bool) -> Result<()> {
    let mut loaded = load_dashboard(config).await;
    for action in actions {
        // Rejections are kept as notices and reported below.
        let _ = loaded
            .dashboard
            .dispatch(action, &mut |_: &DerivedViews| {});
    }

    let report = build_headless_report(&loaded);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_headless_text(&report));
    }

    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct HeadlessReport {
    level: String,
    brand: String,
    model: String,
    province: String,
    hotels: usize,
    total_supply: u64,
    sizes: Vec<SizeShare>,
    brands: Vec<String>,
    markers: Vec<HeadlessMarker>,
    notices: Vec<String>,
    load: LoadReport,
}

#[derive(Debug, serde::Serialize)]
struct HeadlessMarker {
    hotel: String,
    longitude: f64,
    latitude: f64,
    supply: u32,
}

fn build_headless_report(loaded: &Loaded) -> HeadlessReport {
    let dashboard = &loaded.dashboard;
    let selection = dashboard.selection();
    let views = dashboard.views().cloned().unwrap_or_default();

    HeadlessReport {
        level: selection.level.label().to_string(),
        brand: selection.brand_label().to_string(),
        model: selection.model_label().to_string(),
        province: selection.province_label().to_string(),
        hotels: views.summary.count,
        total_supply: views.summary.total_supply,
        sizes: views.distribution.shares,
        brands: views.brand_index,
        markers: views
            .markers
            .into_iter()
            .take(HEADLESS_MARKERS)
            .map(|marker| HeadlessMarker {
                hotel: marker.label,
                longitude: marker.position.longitude,
                latitude: marker.position.latitude,
                supply: marker.weight,
            })
            .collect(),
        notices: dashboard
            .notices()
            .iter()
            .map(ToString::to_string)
            .collect(),
        load: loaded.report.clone(),
    }
}

fn render_headless_text(report: &HeadlessReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nHotel TV Supply");
    let _ = writeln!(out, "===============");
    let _ = writeln!(
        out,
        "Filters: {} / {} / {} (map: {})",
        report.brand, report.model, report.province, report.level
    );
    let _ = writeln!(out, "Hotels: {}家", report.hotels);
    let _ = writeln!(out, "Installed: {}台", report.total_supply);

    let _ = writeln!(out, "\nScreen sizes:");
    for share in &report.sizes {
        let _ = writeln!(
            out,
            "- {}: {} ({})",
            share.label,
            share.value,
            share.percent_label()
        );
    }

    let _ = writeln!(out, "\nBrands: {}", report.brands.join(", "));

    let _ = writeln!(out, "\nHotels on map (first {HEADLESS_MARKERS}):");
    for marker in &report.markers {
        let _ = writeln!(
            out,
            "- {} | {:.4},{:.4} | {}台",
            marker.hotel, marker.longitude, marker.latitude, marker.supply
        );
    }

    if !report.notices.is_empty() {
        let _ = writeln!(out, "\nNotices:");
        for notice in &report.notices {
            let _ = writeln!(out, "- {notice}");
        }
    }

    if report.load.quarantined > 0 {
        let _ = writeln!(
            out,
            "\n{} malformed records were skipped",
            report.load.quarantined
        );
    }

    out
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    config: &DashboardConfig,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut load_machine = LoadMachine::new();
    let mut load_task: Option<JoinHandle<Loaded>> = None;

    if load_machine.process_event(LoadEvent::Start, app).is_ok() {
        let config = config.clone();
        load_task = Some(tokio::spawn(async move { load_dashboard(&config).await }));
    }

    loop {
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if load_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = load_task.take() {
                let event = match task.await {
                    Ok(loaded) => LoadEvent::Finished(Box::new(loaded)),
                    Err(e) => LoadEvent::Crashed(e.to_string()),
                };
                if let Err(e) = load_machine.process_event(event, app) {
                    error!("{e}");
                }
                debug!(state = %load_machine.state(), "load finished");
            }
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                }
                Ok(Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                })) => app.click_map(column, row),
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(_) | Err(_) => {}
            }
        }

        if !app.running {
            break;
        }
    }

    if let Some(task) = load_task {
        task.abort();
    }
    Ok(())
}
