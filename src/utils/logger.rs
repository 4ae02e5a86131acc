//! Logging initialization and configuration.
//!
//! Logs are written to files under `~/.kpa/logs/` so they never interfere
//! with the TUI. Each run gets its own file.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - Show debug and higher level logs
//! - `RUST_LOG=info` - Show info and higher level logs (default)
//! - `RUST_LOG=warn` - Show warnings and errors only

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Per-run log file name, e.g. `kpa-term.2024-12-06-14-30-25.log`.
fn log_file_name() -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    format!("kpa-term.{}.log", timestamp)
}

/// Initialize file logging under `<config_dir>/logs`.
///
/// The returned guard flushes the non-blocking writer when dropped and must
/// be kept alive until the program exits. Returns `None` if the log file
/// cannot be created; the application then runs without logs.
pub fn init_logging(config_dir: &Path) -> Option<WorkerGuard> {
    let log_dir = config_dir.join("logs");

    // Ensure the logs directory exists
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        return None;
    }

    let log_path: PathBuf = log_dir.join(log_file_name());
    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {}", e);
            return None;
        }
    };

    // Use non-blocking writer to avoid blocking the TUI
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)  // No ANSI colors in log files
        .with_target(true)  // Include module path
        .with_thread_ids(true)
        .with_line_number(true);

    // Default to "info" level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Failed to install logger: {}", e);
        return None;
    }

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Some(guard)
}
