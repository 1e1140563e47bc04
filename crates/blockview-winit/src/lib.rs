//! Winit graphical host for blockview.
//!
//! Renders the scene as flat-shaded spinning cubes in a native window using:
//! - [`winit`] for window creation, input events and redraw pacing
//! - [`softbuffer`] for presenting a CPU-rendered pixel buffer
//!
//! # Usage
//!
//! ```rust,no_run
//! use blockview_winit::{WinitConfig, WinitDriver};
//! use blockview_core::EventLoopDriver;
//!
//! let driver = WinitDriver::new(WinitConfig::default());
//! // let frames = FrameLoop::new(&ViewConfig::default(), slot);
//! // driver.run(frames).unwrap();
//! ```

mod input;
mod raster;

use std::num::NonZeroU32;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use blockview_core::{
    Camera, Color, Engine, EventLoopDriver, FrameLoop, Msg, Presenter, SceneGraph, Scheduler,
};

use raster::Rasterizer;

type Surface = softbuffer::Surface<Arc<Window>, Arc<Window>>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the winit driver.
#[derive(Clone, Debug, PartialEq)]
pub struct WinitConfig {
    /// Window title.
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    /// Clear colour behind the blocks.
    pub background: Color,
    /// Edge length of a block, in grid units.
    pub cube_size: f32,
}

impl Default for WinitConfig {
    fn default() -> Self {
        Self {
            title: "blockview".into(),
            width: 480,
            height: 720,
            background: Color(0x000000),
            cube_size: 0.9,
        }
    }
}

// ---------------------------------------------------------------------------
// WinitDriver
// ---------------------------------------------------------------------------

/// Winit-based graphical driver for blockview.
///
/// Implements [`EventLoopDriver`]: it owns the main-thread event loop and
/// ticks the [`FrameLoop`] on every `RedrawRequested`.
#[derive(Debug, Default)]
pub struct WinitDriver {
    config: WinitConfig,
}

impl WinitDriver {
    pub fn new(config: WinitConfig) -> Self {
        Self { config }
    }
}

impl EventLoopDriver for WinitDriver {
    fn run<E: Engine>(self, frames: FrameLoop<E>) -> Result<(), Box<dyn std::error::Error>> {
        let event_loop = EventLoop::new()?;
        let mut app = WinitApp::new(self.config, frames);
        event_loop.run_app(&mut app)?;
        match app.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Presenter and scheduler
// ---------------------------------------------------------------------------

/// Rasterizes into the window's softbuffer surface.
struct SurfacePresenter<'a> {
    surface: &'a mut Surface,
    raster: &'a mut Rasterizer,
}

impl Presenter for SurfacePresenter<'_> {
    fn present(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (width, height) = self.raster.size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.raster.draw(scene, camera);
        let mut buf = self.surface.buffer_mut()?;
        self.raster.blit_to_buffer(&mut buf, width, height);
        buf.present()?;
        Ok(())
    }
}

/// Asks winit for another `RedrawRequested`.
struct RedrawRequest<'a>(&'a Window);

impl Scheduler for RedrawRequest<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

// ---------------------------------------------------------------------------
// WinitApp: ApplicationHandler
// ---------------------------------------------------------------------------

struct WinitApp<E> {
    config: WinitConfig,
    frames: FrameLoop<E>,
    state: Option<WinitState>,
    error: Option<Box<dyn std::error::Error>>,
}

struct WinitState {
    window: Arc<Window>,
    surface: Surface,
    raster: Rasterizer,
}

fn non_zero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

impl<E: Engine> WinitApp<E> {
    fn new(config: WinitConfig, frames: FrameLoop<E>) -> Self {
        Self {
            config,
            frames,
            state: None,
            error: None,
        }
    }

    fn create_state(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<WinitState, Box<dyn std::error::Error>> {
        let attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(true);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let context = softbuffer::Context::new(window.clone())?;
        let mut surface = softbuffer::Surface::new(&context, window.clone())?;

        let PhysicalSize { width, height } = window.inner_size();
        surface.resize(non_zero(width), non_zero(height))?;
        let raster = Rasterizer::new(
            width as usize,
            height as usize,
            self.config.background,
            self.config.cube_size,
        );
        log::info!("window ready: {width}x{height}");

        Ok(WinitState {
            window,
            surface,
            raster,
        })
    }

    fn redraw(&mut self) {
        let Some(WinitState {
            window,
            surface,
            raster,
        }) = self.state.as_mut()
        else {
            return;
        };
        let mut presenter = SurfacePresenter { surface, raster };
        let mut scheduler = RedrawRequest(&**window);
        self.frames.tick(&mut presenter, &mut scheduler);
    }
}

impl<E: Engine> ApplicationHandler for WinitApp<E> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return; // already initialized
        }
        match self.create_state(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("failed to open window: {err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.frames.handle_msg(Msg::Quit);
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(state) = self.state.as_mut() {
                    if let Err(err) = state.surface.resize(non_zero(width), non_zero(height)) {
                        log::warn!("surface resize failed: {err}");
                    }
                    state.raster.resize(width as usize, height as usize);
                    state.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(msg) = input::translate_keyboard(&event) {
                    if !self.frames.handle_msg(msg) {
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("quit after {} frames", self.frames.frames());
    }
}
