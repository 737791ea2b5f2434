pub mod loader;

pub use loader::{load_dashboard, LoadReport, Loaded};
