use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub fn handle_brand_index_input(app: &mut App, key: KeyCode) {
    let len = app.brand_index().len();
    match key {
        KeyCode::Esc | KeyCode::Char('b') => app.screen = AppScreen::Dashboard,
        KeyCode::Up | KeyCode::Char('k') => {
            app.brand_selection_index = wrap_decrement(app.brand_selection_index, len);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.brand_selection_index = wrap_increment(app.brand_selection_index, len);
        }
        KeyCode::Enter => app.focus_selected_brand(),
        KeyCode::Char('q') => app.running = false,
        _ => {}
    }
}
