use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

mod brand_index;
mod dashboard;
mod help;
mod picker;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if app.screen != AppScreen::Picker && help::handle_help_toggle(app, key) {
        return;
    }

    if app.show_help {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    if app.is_loading() {
        if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
            app.running = false;
        }
        return;
    }

    match app.screen {
        AppScreen::Dashboard => dashboard::handle_dashboard_input(app, key),
        AppScreen::Picker => picker::handle_picker_input(app, key),
        AppScreen::BrandIndex => brand_index::handle_brand_index_input(app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvmap::data::{LoadReport, Loaded};
    use tvmap_core::schema::parse_records;
    use tvmap_core::{Dashboard, DatasetIndex, DrillLevel, RegionMap, RegionRegistry};

    const DATA: &str = r#"[
        { "hotelName": "h1", "brand": "Alpha", "model": "55X", "coordinates": "113,23", "supply": 10, "province": "广东省" },
        { "hotelName": "h2", "brand": "Beta", "model": "32Y", "coordinates": "116,40", "supply": 5, "province": "北京" }
    ]"#;

    fn ready_app() -> App {
        let records = parse_records(DATA).expect("records").records;
        let mut dashboard =
            Dashboard::new(DatasetIndex::from_records(records), RegionRegistry::default());
        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        dashboard.add_map(RegionMap::from_geojson("北京", empty).expect("map"));
        let mut app = App::new();
        app.finish_loading(Loaded {
            dashboard,
            report: LoadReport::default(),
        });
        app
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            dispatch_input(app, *key);
        }
    }

    #[test]
    fn keys_are_ignored_while_loading_except_quit() {
        let mut app = App::new();

        press(&mut app, &[KeyCode::Tab, KeyCode::Enter]);
        assert_eq!(app.screen, AppScreen::Dashboard);
        assert!(app.running);

        press(&mut app, &[KeyCode::Char('q')]);
        assert!(!app.running);
    }

    #[test]
    fn tab_cycles_the_focused_filter() {
        let mut app = ready_app();

        press(&mut app, &[KeyCode::Tab, KeyCode::Tab]);
        assert_eq!(app.filter_index, 2);

        press(&mut app, &[KeyCode::Tab]);
        assert_eq!(app.filter_index, 0);

        press(&mut app, &[KeyCode::BackTab]);
        assert_eq!(app.filter_index, 2);
    }

    #[test]
    fn picker_flow_selects_a_province() {
        let mut app = ready_app();

        press(
            &mut app,
            &[
                KeyCode::BackTab,
                KeyCode::Enter,
                KeyCode::Char('北'),
                KeyCode::Enter,
            ],
        );

        assert_eq!(app.screen, AppScreen::Dashboard);
        let selection = app.dashboard.as_ref().expect("dashboard").selection();
        assert_eq!(selection.province_label(), "北京");
        assert_eq!(app.views().map(|views| views.summary.total_supply), Some(5));
    }

    #[test]
    fn picker_navigation_wraps() {
        let mut app = ready_app();

        press(&mut app, &[KeyCode::Enter, KeyCode::Up, KeyCode::Enter]);

        let selection = app.dashboard.as_ref().expect("dashboard").selection();
        assert_eq!(selection.brand_label(), "Beta");
    }

    #[test]
    fn brand_index_enter_focuses_the_brand() {
        let mut app = ready_app();

        press(&mut app, &[KeyCode::Char('b'), KeyCode::Down, KeyCode::Enter]);

        assert_eq!(app.screen, AppScreen::Dashboard);
        let selection = app.dashboard.as_ref().expect("dashboard").selection();
        assert_eq!(selection.brand_label(), "Beta");
    }

    #[test]
    fn reset_and_help_keys() {
        let mut app = ready_app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Down, KeyCode::Enter]);
        assert_eq!(
            app.dashboard.as_ref().expect("dashboard").selection().brand_label(),
            "Alpha"
        );

        press(&mut app, &[KeyCode::Char('r')]);
        let selection = app.dashboard.as_ref().expect("dashboard").selection();
        assert_eq!(selection.brand_label(), "Alpha");
        assert_eq!(selection.level, DrillLevel::National);

        press(&mut app, &[KeyCode::Char('?')]);
        assert!(app.show_help);
        press(&mut app, &[KeyCode::Char('r'), KeyCode::Esc]);
        assert!(!app.show_help);
        assert!(app.running);
    }
}
