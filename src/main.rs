//! Main entry point for kpa-term.
//!
//! Parses the command line, resolves configuration, initializes the TUI,
//! runs the main event loop, and restores the terminal on exit.

use kpa_term::app::App;
use kpa_term::config::{self, Args, Config, USAGE};
use kpa_term::utils;

use anyhow::Result;

use crate::utils::guard::Guard;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }
    let config = config::resolve(&args)?;

    // Initialize logging before the terminal is taken over
    let _log_guard = utils::logger::init_logging(&Config::config_dir());
    tracing::info!(
        server = %config.server_url,
        socket = %config.shell_socket_url(),
        scenario = ?args.scenario_id,
        "Starting kpa-term"
    );

    let mut terminal = ratatui::init();
    // Guard ensures the terminal is restored on both normal exit and panic
    let _restore = Guard::with(ratatui::restore);

    let mut app = App::new(&config, args.scenario_id)?;

    // draw 1st frame
    app.draw(&mut terminal)?;
    // run event-driven main loop of app
    app.run(&mut terminal).await
}
