//! Runnable blockview demos: a sandbox puzzle engine, environment settings
//! and logging setup shared by the `blockview` (terminal) and
//! `blockview-winit` (window) binaries.

pub mod logging;
pub mod sandbox;
pub mod settings;

use std::io;
use std::thread;

use blockview_core::{EngineSlot, FrameLoop};

pub use sandbox::SandboxEngine;
pub use settings::{Settings, SettingsError};

/// Build the engine on a worker thread. The returned slot stays pending
/// until it is done, and the frame loop keeps ticking meanwhile.
pub fn spawn_engine(settings: &Settings) -> io::Result<EngineSlot<SandboxEngine>> {
    let (slot, init) = EngineSlot::pending();
    let (seed, gravity) = (settings.seed, settings.gravity);
    let overlay = settings.view.piece_size.x <= 0 || settings.view.piece_size.y <= 0;
    thread::Builder::new()
        .name("engine-init".into())
        .spawn(move || {
            log::debug!("building sandbox engine (seed {seed}, gravity {gravity})");
            let engine = SandboxEngine::new(seed)
                .with_step_interval(gravity)
                .with_piece_overlay(overlay);
            init.complete(Ok(engine));
        })?;
    Ok(slot)
}

/// A frame loop over a freshly spawned sandbox engine.
pub fn frame_loop(settings: &Settings) -> io::Result<FrameLoop<SandboxEngine>> {
    Ok(FrameLoop::new(&settings.view, spawn_engine(settings)?))
}
