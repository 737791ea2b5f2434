// App module for the terminal dashboard
// Holds interactive state and maps keys onto dashboard actions

pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::App;
