//! Terminal demo: the sandbox engine drawn top-down with crossterm.
//!
//! Logs go to a file (see `BLOCKVIEW_LOG_DIR`) since the terminal is in
//! raw mode.

use blockview_core::EventLoopDriver;
use blockview_crossterm::{CrosstermConfig, CrosstermDriver};
use blockview_demos::{Settings, frame_loop, logging};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let _guard = logging::init_file(&logging::log_dir())?;
    tracing::info!(seed = settings.seed, palette = ?settings.view.palette, "starting terminal host");

    let frames = frame_loop(&settings)?;
    CrosstermDriver::new(CrosstermConfig::default()).run(frames)
}
