//! Windowed demo: the sandbox engine as spinning, shaded cubes.

use blockview_core::EventLoopDriver;
use blockview_demos::{Settings, frame_loop, logging};
use blockview_winit::{WinitConfig, WinitDriver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_stderr();
    let settings = Settings::from_env()?;
    tracing::info!(seed = settings.seed, palette = ?settings.view.palette, "starting window host");

    let frames = frame_loop(&settings)?;
    WinitDriver::new(WinitConfig::default()).run(frames)
}
