mod state;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, Wrap,
    },
    Frame, Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use serde::de::DeserializeOwned;
use state::{Command, WebState};
use tvmap_core::domain::NATIONAL_MAP_KEY;
use tvmap_core::schema::{parse_records, DATASET_RESOURCE, VOCABULARY_RESOURCE};
use tvmap_core::{
    Dashboard, DashboardError, DatasetIndex, DerivedViews, FilterVocabulary, NoticeKind,
    ProvinceMatch, RegionMap, RegionRegistry,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

const DATA_URL: &str = "data/data.json";
const FILTERS_URL: &str = "data/filters.json";
const MAP_DIR: &str = "map";
const TABLE_ROWS: usize = 12;
const SIZE_COLORS: [Color; 5] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
];

fn main() -> io::Result<()> {
    let state = Rc::new(RefCell::new(WebState::default()));

    spawn_local(load_dashboard(state.clone()));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let state = state.clone();
        move |event| {
            let command = match event.code {
                ratzilla::event::KeyCode::Up => Some(Command::ScrollUp),
                ratzilla::event::KeyCode::Down => Some(Command::ScrollDown),
                ratzilla::event::KeyCode::Esc => Some(Command::Dismiss),
                ratzilla::event::KeyCode::Char(ch) => Command::for_char(ch),
                _ => None,
            };
            if let Some(command) = command {
                if let Err(error) = state.borrow_mut().handle(command) {
                    web_sys::console::warn_1(&error.to_string().into());
                }
            }
        }
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let block = Block::default()
            .title("酒店电视安装分布")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        let state = state.borrow();
        if let Some(dashboard) = state.dashboard.as_ref() {
            render_dashboard(dashboard, state.row_offset, f, inner);
        } else {
            let paragraph = Paragraph::new(Text::from(TextLine::from("Loading data.json...")))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, inner);
        }
    });

    Ok(())
}

fn render_dashboard(dashboard: &Dashboard, row_offset: usize, f: &mut Frame<'_>, area: Rect) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(TABLE_ROWS as u16 + 3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(dashboard, f, main_layout[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(main_layout[1]);

    render_map_panel(dashboard, f, content[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(content[1]);

    let views = dashboard.views();
    render_size_chart(views, f, side[0]);
    render_brand_index(views, f, side[1]);
    render_hotel_table(views, row_offset, f, main_layout[2]);
    render_notice(dashboard, f, main_layout[3]);
}

fn render_header(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let selection = dashboard.selection();
    let (count, supply) = dashboard.views().map_or((0, 0), |views| {
        (views.summary.count, views.summary.total_supply)
    });

    let line = TextLine::from(vec![
        Span::styled(
            format!("{count}家  {supply}台"),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("b ", Style::default().fg(Color::Gray)),
        Span::raw(selection.brand_label().to_string()),
        Span::styled("  m ", Style::default().fg(Color::Gray)),
        Span::raw(selection.model_label().to_string()),
        Span::styled("  p ", Style::default().fg(Color::Gray)),
        Span::raw(selection.province_label().to_string()),
        Span::styled("  r reset", Style::default().fg(Color::Gray)),
    ]);

    let block = Block::default()
        .title("Overview")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Text::from(line))
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn render_map_panel(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(dashboard.selection().level.label().to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let map = dashboard.current_map();
    let views = dashboard.views();
    let outlines = map.map(RegionMap::outlines).unwrap_or_default();
    let points: Vec<(f64, f64)> = views
        .map(|views| views.markers.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|marker| (marker.position.longitude, marker.position.latitude))
        .collect();
    let (longitude, latitude) = map_bounds(map, views);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(longitude)
        .y_bounds(latitude)
        .paint(|ctx| {
            for ring in &outlines {
                for segment in ring.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: segment[0].0,
                        y1: segment[0].1,
                        x2: segment[1].0,
                        y2: segment[1].1,
                        color: Color::DarkGray,
                    });
                }
            }
            ctx.layer();
            ctx.draw(&Points {
                coords: &points,
                color: Color::Yellow,
            });
        });

    f.render_widget(canvas, area);
}

fn map_bounds(map: Option<&RegionMap>, views: Option<&DerivedViews>) -> ([f64; 2], [f64; 2]) {
    if let Some((min, max)) = map.and_then(RegionMap::bounds) {
        return (
            [min.longitude, max.longitude],
            [min.latitude, max.latitude],
        );
    }

    let center = views.and_then(|views| views.viewport.center.map(|c| (c, views.viewport.zoom)));
    match center {
        Some((center, zoom)) => {
            let half = 8.0 / zoom;
            (
                [center.longitude - half, center.longitude + half],
                [center.latitude - half, center.latitude + half],
            )
        }
        None => ([73.0, 135.5], [17.5, 54.0]),
    }
}

fn render_size_chart(views: Option<&DerivedViews>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Screen sizes")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(distribution) = views
        .map(|views| &views.distribution)
        .filter(|distribution| !distribution.is_empty())
    else {
        let paragraph = Paragraph::new("No sized models")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let legend_height = u16::try_from(distribution.shares.len())
        .unwrap_or(u16::MAX)
        .min(inner.height / 2);
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(legend_height)])
        .split(inner);

    let bars: Vec<Bar<'_>> = distribution
        .shares
        .iter()
        .enumerate()
        .map(|(index, share)| {
            Bar::default()
                .value(share.value)
                .label(TextLine::from(share.label.as_str()))
                .style(Style::default().fg(SIZE_COLORS[index % SIZE_COLORS.len()]))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = distribution
        .shares
        .iter()
        .map(|share| share.value)
        .max()
        .unwrap_or(0)
        .max(1);

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(5);
    f.render_widget(chart, split[0]);

    let legend: Vec<TextLine<'_>> = distribution
        .shares
        .iter()
        .enumerate()
        .map(|(index, share)| {
            TextLine::from(vec![
                Span::styled(
                    "■ ",
                    Style::default().fg(SIZE_COLORS[index % SIZE_COLORS.len()]),
                ),
                Span::raw(format!(
                    "{}: {} ({})",
                    share.label,
                    share.value,
                    share.percent_label()
                )),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(legend), split[1]);
}

fn render_brand_index(views: Option<&DerivedViews>, f: &mut Frame<'_>, area: Rect) {
    let label = views.map(DerivedViews::brand_index_label).unwrap_or_default();
    let paragraph = Paragraph::new(label)
        .block(
            Block::default()
                .title("Brands")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_hotel_table(
    views: Option<&DerivedViews>,
    row_offset: usize,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let markers = views
        .map(|views| views.markers.as_slice())
        .unwrap_or_default();

    let header = Row::new(vec![
        Cell::from("Hotel"),
        Cell::from("Lon"),
        Cell::from("Lat"),
        Cell::from("Units"),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows = markers.iter().skip(row_offset).take(TABLE_ROWS).map(|marker| {
        Row::new(vec![
            Cell::from(marker.label.clone()),
            Cell::from(format!("{:.3}", marker.position.longitude)),
            Cell::from(format!("{:.3}", marker.position.latitude)),
            Cell::from(marker.weight.to_string()),
        ])
        .style(Style::default().fg(Color::White))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("Hotels ({})  ↑/↓", markers.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    )
    .column_spacing(1);

    f.render_widget(table, area);

    let mut scrollbar_state = ScrollbarState::new(markers.len())
        .position(row_offset)
        .viewport_content_length(TABLE_ROWS);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .thumb_style(Style::default().fg(Color::Rgb(0, 0, 238)));
    f.render_stateful_widget(scrollbar, area.inner(Margin::new(0, 1)), &mut scrollbar_state);
}

fn render_notice(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let Some(notice) = dashboard.latest_notice() else {
        return;
    };
    let color = match notice.kind {
        NoticeKind::LoadFailure => Color::Red,
        NoticeKind::EmptyResult | NoticeKind::UnmappedRegion => Color::Yellow,
    };
    let line = TextLine::from(vec![
        Span::styled(notice.message.as_str(), Style::default().fg(color)),
        Span::styled("  (Esc)", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

async fn load_dashboard(store: Rc<RefCell<WebState>>) {
    let mut failures = Vec::new();

    let records = match fetch_text(DATA_URL).await.and_then(|text| parse_records(&text)) {
        Ok(parsed) => {
            if !parsed.quarantined.is_empty() {
                web_sys::console::warn_1(
                    &format!("Skipped {} malformed records", parsed.quarantined.len()).into(),
                );
            }
            parsed.records
        }
        Err(error) => {
            failures.push(error);
            Vec::new()
        }
    };

    let vocabulary = match fetch_json::<FilterVocabulary>(FILTERS_URL).await {
        Ok(vocabulary) => vocabulary.with_sentinels(),
        Err(error) => {
            failures.push(error);
            FilterVocabulary::from_records(&records)
        }
    };

    let registry = RegionRegistry::new(ProvinceMatch::SuffixStrip);
    let mut keys: Vec<String> = vocabulary
        .named_provinces()
        .iter()
        .filter_map(|name| registry.key_for(name))
        .collect();
    keys.sort();
    keys.dedup();

    let mut dashboard = Dashboard::new(DatasetIndex::new(records, vocabulary), registry);

    let national = format!("{MAP_DIR}/{NATIONAL_MAP_KEY}.json");
    let assets = std::iter::once((NATIONAL_MAP_KEY.to_string(), national)).chain(
        keys.into_iter()
            .map(|key| {
                let url = format!("{MAP_DIR}/province/{key}.json");
                (key, url)
            }),
    );
    for (key, url) in assets {
        match fetch_text(&url)
            .await
            .and_then(|text| RegionMap::from_geojson(&key, &text))
        {
            Ok(map) => dashboard.add_map(map),
            Err(error) => failures.push(error),
        }
    }

    for failure in &failures {
        web_sys::console::error_1(&failure.to_string().into());
        dashboard.raise(failure);
    }

    store.borrow_mut().dashboard = Some(dashboard);
}

async fn fetch_response(url: &str) -> Result<Response, DashboardError> {
    let failure = |reason: &str| DashboardError::load_failure(resource_name(url), reason);

    let window = web_sys::window().ok_or_else(|| failure("no window"))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|_| failure("bad request"))?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| failure("network error"))?;

    let response = response_value
        .dyn_into::<Response>()
        .map_err(|_| failure("unexpected response"))?;

    if !response.ok() {
        return Err(failure(&format!("HTTP {}", response.status())));
    }
    Ok(response)
}

async fn fetch_text(url: &str) -> Result<String, DashboardError> {
    let response = fetch_response(url).await?;
    let failure = || DashboardError::load_failure(resource_name(url), "unreadable body");

    let promise = response.text().map_err(|_| failure())?;
    JsFuture::from(promise)
        .await
        .ok()
        .and_then(|value| value.as_string())
        .ok_or_else(failure)
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, DashboardError> {
    let response = fetch_response(url).await?;
    let resource = resource_name(url);

    let promise = response
        .json()
        .map_err(|_| DashboardError::load_failure(resource, "unreadable body"))?;
    let json = JsFuture::from(promise)
        .await
        .map_err(|_| DashboardError::load_failure(resource, "invalid JSON"))?;

    serde_wasm_bindgen::from_value::<T>(json)
        .map_err(|error| DashboardError::load_failure(resource, error))
}

/// The file name notices refer to, matching the terminal front end.
fn resource_name(url: &str) -> &str {
    match url {
        DATA_URL => DATASET_RESOURCE,
        FILTERS_URL => VOCABULARY_RESOURCE,
        _ => url,
    }
}
