use crate::app::App;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use crate::ui::widgets::tables::scroll_offset;
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_picker_popup(app: &App, f: &mut Frame<'_>) {
    let (Some(picker), Some(dashboard)) = (&app.picker, &app.dashboard) else {
        return;
    };

    let area = centered_rect(50, 60, f.area());
    f.render_widget(ClearWidget, area);

    let block = Block::default()
        .title(format!(" Choose {} ", picker.kind.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner.inner(Margin::new(1, 0)));

    let query = Paragraph::new(TextLine::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::Green)),
        Span::raw(picker.query.as_str()),
        Span::styled("_", Style::default().fg(Color::Green)),
    ]));
    f.render_widget(query, split[0]);

    let matches = picker.matches(dashboard.vocabulary());
    if matches.is_empty() {
        f.render_widget(
            Paragraph::new("No matches").style(Style::default().fg(Color::Gray)),
            split[1],
        );
        return;
    }

    let visible = usize::from(split[1].height);
    let offset = scroll_offset(matches.len(), visible, picker.selected);
    let lines: Vec<TextLine<'_>> = matches
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, value)| {
            if index == picker.selected {
                TextLine::styled(
                    format!("> {value}"),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                TextLine::from(format!("  {value}"))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), split[1]);
}

pub fn render_help_popup(f: &mut Frame<'_>) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(ClearWidget, area);

    let rows = [
        ("Tab / Shift-Tab", "Focus the next / previous filter"),
        ("Enter", "Pick a value for the focused filter"),
        ("b", "Browse the brand index, Enter to filter by brand"),
        ("r", "Return to the national map, keeping brand and model"),
        ("Mouse click", "Drill into the province under the cursor"),
        ("Esc", "Dismiss notices / close popups"),
        ("?", "Toggle this help"),
        ("q", "Quit"),
    ];

    let mut lines = vec![
        TextLine::from(Span::styled(
            "Keys",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
    ];
    lines.extend(rows.iter().map(|(key, description)| {
        TextLine::from(vec![
            Span::styled(
                format!("{key:<16}"),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(*description),
        ])
    }));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
