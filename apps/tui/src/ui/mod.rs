// UI module for the terminal dashboard
// Screens compose widgets; widgets draw one panel each

pub mod screens;
pub mod widgets;

use crate::app::state::AppScreen;
use crate::app::App;
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    if app.is_loading() {
        screens::loading::render_loading(app, f);
        return;
    }

    screens::dashboard::render_dashboard(app, f);

    if app.show_help {
        screens::overlays::render_help_popup(f);
    } else if app.screen == AppScreen::Picker {
        screens::overlays::render_picker_popup(app, f);
    }
}
