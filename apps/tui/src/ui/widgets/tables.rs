use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line as TextLine;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub const fn scroll_offset(
    total_rows: usize,
    max_visible_rows: usize,
    selected_index: usize,
) -> usize {
    if total_rows <= max_visible_rows {
        return 0;
    }

    if selected_index >= max_visible_rows {
        return selected_index.saturating_sub(max_visible_rows) + 1;
    }

    0
}

/// Brands present under the current brand filter. The highlight only shows
/// while the list has focus.
pub fn render_brand_index(
    f: &mut Frame<'_>,
    area: Rect,
    brands: &[String],
    selected: usize,
    focused: bool,
) {
    let border = if focused { Color::Yellow } else { Color::Cyan };
    let block = Block::default()
        .title(format!("Brands ({})", brands.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let visible = usize::from(block.inner(area).height);
    let offset = scroll_offset(brands.len(), visible, selected);

    let lines: Vec<TextLine<'_>> = brands
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, brand)| {
            if focused && index == selected {
                TextLine::styled(
                    format!("> {brand}"),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                TextLine::from(format!("  {brand}"))
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(5, 10, 4), 0);
        assert_eq!(scroll_offset(20, 5, 3), 0);
        assert_eq!(scroll_offset(20, 5, 5), 1);
        assert_eq!(scroll_offset(20, 5, 19), 15);
    }
}
