// Configuration and file loading, shared by the binary and its tests
pub mod config;
pub mod data;
