use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use ratatui::Frame;
use tvmap_core::SizeDistribution;

const BAR_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::Rgb(0, 0, 238),
];

pub const fn bar_color(index: usize) -> Color {
    BAR_COLORS[index % BAR_COLORS.len()]
}

/// Bar chart of installed units per screen size, with a percentage legend.
pub fn render_size_distribution(
    f: &mut Frame<'_>,
    area: Rect,
    distribution: Option<&SizeDistribution>,
) {
    let block = Block::default()
        .title("Screen sizes")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(distribution) = distribution.filter(|distribution| !distribution.is_empty()) else {
        let paragraph = Paragraph::new("No sized models")
            .block(block)
            .alignment(Alignment::Center);
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
                .style(Style::default().fg(bar_color(index)))
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
                Span::styled("■ ", Style::default().fg(bar_color(index))),
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
