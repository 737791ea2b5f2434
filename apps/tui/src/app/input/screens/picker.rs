use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_picker_input(app: &mut App, key: KeyCode) {
    if key == KeyCode::Esc {
        app.close_picker();
        return;
    }
    if key == KeyCode::Enter {
        app.confirm_picker();
        return;
    }

    let match_count = match (&app.picker, &app.dashboard) {
        (Some(picker), Some(dashboard)) => picker.matches(dashboard.vocabulary()).len(),
        _ => 0,
    };
    let Some(picker) = app.picker.as_mut() else {
        return;
    };

    match key {
        KeyCode::Up => picker.selected = wrap_decrement(picker.selected, match_count),
        KeyCode::Down => picker.selected = wrap_increment(picker.selected, match_count),
        KeyCode::Backspace => {
            picker.query.pop();
            picker.selected = 0;
        }
        KeyCode::Char(ch) => {
            picker.query.push(ch);
            picker.selected = 0;
        }
        _ => {}
    }
}
