pub mod settings;

pub use settings::{init_dashboard_config, DashboardConfig};
