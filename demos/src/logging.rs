//! Tracing setup for the demo binaries.
//!
//! Library crates log through `log`; tracing-subscriber's `tracing-log`
//! bridge picks those records up once a subscriber is installed.

use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_DIR_VAR: &str = "BLOCKVIEW_LOG_DIR";
const LOG_FILE: &str = "blockview.log";

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}

/// Log to stderr. For hosts that do not own the terminal.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `<dir>/blockview.log` only, leaving the terminal to the UI.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_file(dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .init();

    tracing::info!("log file: {}", dir.join(LOG_FILE).display());
    Ok(guard)
}

/// `$BLOCKVIEW_LOG_DIR`, else a `blockview` directory under the system
/// temp dir.
pub fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("blockview"))
}
