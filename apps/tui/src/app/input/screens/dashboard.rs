use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::{App, AppScreen, FILTER_KINDS};
use crossterm::event::KeyCode;

pub fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Tab | KeyCode::Right => {
            app.filter_index = wrap_increment(app.filter_index, FILTER_KINDS.len());
        }
        KeyCode::BackTab | KeyCode::Left => {
            app.filter_index = wrap_decrement(app.filter_index, FILTER_KINDS.len());
        }
        KeyCode::Enter => app.open_picker(),
        KeyCode::Char('b') => {
            app.brand_selection_index = 0;
            app.screen = AppScreen::BrandIndex;
        }
        KeyCode::Char('r') => app.reset(),
        KeyCode::Esc => app.dismiss_notices(),
        _ => {}
    }
}
