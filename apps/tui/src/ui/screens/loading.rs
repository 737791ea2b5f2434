use crate::app::App;
use crate::ui::widgets::popup::centered_rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_EIGHT};

pub fn render_loading(app: &App, f: &mut Frame<'_>) {
    let area = centered_rect(40, 20, f.area());
    let block = Block::default()
        .title(" tvmap ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let throbber = Throbber::default()
        .label("Loading hotel data and maps...")
        .style(Style::default().fg(Color::White))
        .throbber_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(BRAILLE_EIGHT);

    let mut state = app.throbber.clone();
    f.render_stateful_widget(throbber, inner, &mut state);
}
