//! **blockview-core** renders a falling-block puzzle engine's state as a
//! retained 3D scene.
//!
//! Each frame the [`FrameLoop`] asks the [`Engine`] whether anything
//! changed. If so, the [`SyncEngine`] reconciles the board and
//! active-piece [`Grid`]s against a fresh snapshot, creating or removing
//! scene objects only where a [`Cell`]'s colour differs. Every block then
//! gets its idle spin and a host-supplied [`Presenter`] draws the
//! [`SceneGraph`]. Key presses are mapped to engine [`Command`]s by the
//! [`InputDispatcher`].

pub mod app;
pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod geom;
pub mod grid;
pub mod input;
pub mod messages;
pub mod palette;
pub mod scene;
pub mod sync;

pub use app::{EventLoopDriver, FrameLoop, FrameOutcome, Presenter, Scheduler};
pub use cell::{Cell, ColorChange};
pub use config::ViewConfig;
pub use engine::{Command, Engine, EngineInit, EngineSlot, StepOutcome};
pub use error::{ColorError, EngineError, SyncError};
pub use geom::{Point, Range};
pub use glam::{self, Vec3};
pub use grid::Grid;
pub use input::{Binding, InputDispatcher};
pub use messages::*;
pub use palette::{Color, ColorId, Material, Palette, PaletteSource};
pub use scene::{Camera, ObjectId, SceneGraph, SceneObject};
pub use sync::{Snapshot, SyncEngine, SyncStats};
