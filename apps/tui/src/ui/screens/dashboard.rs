use crate::app::state::{AppScreen, FILTER_KINDS};
use crate::app::App;
use crate::ui::widgets::charts::render_size_distribution;
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::tables::render_brand_index;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;
use tvmap_core::vocabulary::FilterKind;
use tvmap_core::{Dashboard, NoticeKind};

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let Some(dashboard) = app.dashboard.as_ref() else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Length(3), // Filters
            Constraint::Min(10),   // Map and side panels
            Constraint::Length(3), // Notices
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)));

    render_summary(dashboard, f, layout[0]);
    render_filter_bar(app, dashboard, f, layout[1]);
    render_body(app, dashboard, f, layout[2]);
    render_notice_line(app, f, layout[3]);
    render_shortcuts(f, layout[4]);
}

fn render_summary(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let selection = dashboard.selection();
    let mut spans = vec![
        Span::styled(
            "酒店电视安装分布 ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}]  ", selection.level.label()),
            Style::default().fg(Color::Yellow),
        ),
    ];

    match dashboard.views() {
        Some(views) => {
            spans.push(Span::styled(
                format!("{}家", views.summary.count),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{}台", views.summary.total_supply),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        None => spans.push(Span::styled(
            "暂无销售记录",
            Style::default().fg(Color::Gray),
        )),
    }

    let paragraph = Paragraph::new(TextLine::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(paragraph, area);
}

fn render_filter_bar(app: &App, dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let selection = dashboard.selection();
    let titles = FILTER_KINDS
        .iter()
        .map(|kind| {
            let value = match kind {
                FilterKind::Brand => selection.brand_label(),
                FilterKind::Model => selection.model_label(),
                FilterKind::Province => selection.province_label(),
            };
            TextLine::from(format!("{}: {value}", kind.label()))
        })
        .collect::<Vec<_>>();

    let focused = app.screen != AppScreen::BrandIndex;
    let highlight = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let tabs = Tabs::new(titles)
        .select(app.filter_index)
        .block(
            Block::default()
                .title("Filters")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::Gray))
        .highlight_style(highlight)
        .divider(Span::raw("|"));
    f.render_widget(tabs, area);
}

fn render_body(app: &App, dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let views = dashboard.views();
    let title = match dashboard.current_map() {
        Some(_) => dashboard.selection().level.label().to_string(),
        None => format!("{} (no outline)", dashboard.selection().level.label()),
    };
    let map_area = render_map(f, columns[0], dashboard.current_map(), views, &title);
    app.map_area.set(map_area);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    render_size_distribution(f, side[0], views.map(|views| &views.distribution));
    render_brand_index(
        f,
        side[1],
        app.brand_index(),
        app.brand_selection_index,
        app.screen == AppScreen::BrandIndex,
    );
}

fn render_notice_line(app: &App, f: &mut Frame<'_>, area: Rect) {
    let line = match app.latest_notice() {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::LoadFailure => Color::Red,
                NoticeKind::EmptyResult | NoticeKind::UnmappedRegion => Color::Yellow,
            };
            let stamp = app
                .notice_at
                .map(|at| at.format("%H:%M:%S ").to_string())
                .unwrap_or_default();
            TextLine::from(vec![
                Span::styled(stamp, Style::default().fg(Color::Gray)),
                Span::styled(notice.message.as_str(), Style::default().fg(color)),
            ])
        }
        None => TextLine::from(Span::styled(
            app.status_message.as_str(),
            Style::default().fg(Color::Green),
        )),
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title("Status")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    );
    f.render_widget(paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let hint = Paragraph::new(
        "Tab filter | Enter pick | b brands | r reset | click map to drill | Esc dismiss | ? help | q quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(hint, area);
}
