mod app;
mod cli;
mod event;
mod terminal;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
use tvmap::config::init_dashboard_config;

const LOG_FILE: &str = "tvmap.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    // Headless when asked to, or when stdout is not a terminal
    let headless = args.headless || !is_terminal();
    init_tracing(args.debug, headless)?;

    let config = init_dashboard_config();

    if headless {
        return event::run_headless(&config, &args.filter_actions(), args.json).await;
    }

    let mut app = App::new();
    let mut terminal = terminal::setup()?;

    let result = event::run(&mut terminal, &mut app, &config).await;

    terminal::cleanup(true, true);

    result
}

/// Interactive runs log to a file so output does not tear the alternate
/// screen; headless runs log to stderr.
fn init_tracing(debug: bool, headless: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_FILE)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    Ok(())
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
