pub mod dashboard;
pub mod loading;
pub mod overlays;
