//! The render loop: [`FrameLoop`], plus the host-facing ports [`Presenter`],
//! [`Scheduler`] and [`EventLoopDriver`].
//!
//! A host owns the display-refresh primitive. It calls
//! [`FrameLoop::tick`] once per refresh, and each tick asks the host (through
//! its [`Scheduler`]) for the next one. Key presses go through
//! [`FrameLoop::handle_msg`] whenever they arrive.

use crate::config::ViewConfig;
use crate::engine::{Command, Engine, EngineSlot, StepOutcome};
use glam::Vec3;

use crate::geom::Point;
use crate::grid::Grid;
use crate::input::InputDispatcher;
use crate::messages::{Key, Msg};
use crate::palette::Palette;
use crate::scene::{Camera, SceneGraph};
use crate::sync::{Snapshot, SyncEngine, SyncStats};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Draws the scene. The rendering back-end is opaque to the loop.
pub trait Presenter {
    fn present(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// "Call `tick` again on the next display refresh."
pub trait Scheduler {
    fn request_frame(&mut self);
}

/// A back-end that owns the main-thread event loop and drives a
/// [`FrameLoop`] until the user quits.
pub trait EventLoopDriver {
    fn run<E: Engine>(self, frames: FrameLoop<E>) -> Result<(), Box<dyn std::error::Error>>;
}

/// Requests the next frame when dropped, so a tick re-arms even if its
/// body unwinds.
struct Rearm<'a, S: Scheduler + ?Sized>(&'a mut S);

impl<S: Scheduler + ?Sized> Drop for Rearm<'_, S> {
    fn drop(&mut self) {
        self.0.request_frame();
    }
}

// ---------------------------------------------------------------------------
// FrameOutcome
// ---------------------------------------------------------------------------

/// What one tick did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No engine yet; nothing was queried.
    Uninitialized,
    /// The engine reported no visible change.
    Unchanged,
    /// The grids were reconciled.
    Synced(SyncStats),
    /// Stepping or querying the engine failed; treated as no change.
    SyncFailed,
}

// ---------------------------------------------------------------------------
// FrameLoop
// ---------------------------------------------------------------------------

/// Top-level context: the engine slot, both layers, the scene and
/// everything needed to keep them in step.
pub struct FrameLoop<E> {
    engine: EngineSlot<E>,
    board: Grid,
    piece: Option<Grid>,
    scene: SceneGraph,
    palette: Palette,
    sync: SyncEngine,
    input: InputDispatcher,
    camera: Camera,
    spin: Vec3,
    /// A change was reported and not yet reconciled.
    needs_sync: bool,
    frames: u64,
    quit: bool,
}

impl<E: Engine> FrameLoop<E> {
    pub fn new(config: &ViewConfig, engine: EngineSlot<E>) -> Self {
        let piece = (config.piece_size.x > 0 && config.piece_size.y > 0)
            .then(|| Grid::new(config.piece_size.x, config.piece_size.y));
        Self {
            engine,
            board: Grid::new(config.board_size.x, config.board_size.y),
            piece,
            scene: SceneGraph::new(),
            palette: Palette::new(&config.palette),
            sync: SyncEngine::new(),
            input: InputDispatcher::new(&config.bindings),
            camera: config.camera,
            spin: config.spin_per_frame,
            needs_sync: false,
            frames: 0,
            quit: false,
        }
    }

    /// Run one frame: step, reconcile if changed, animate, present. The
    /// next frame is requested from `scheduler` no matter what happens.
    pub fn tick<P, S>(&mut self, presenter: &mut P, scheduler: &mut S) -> FrameOutcome
    where
        P: Presenter + ?Sized,
        S: Scheduler + ?Sized,
    {
        let _rearm = Rearm(scheduler);

        let outcome = self.update();
        self.animate();
        if let Err(err) = presenter.present(&self.scene, &self.camera) {
            log::warn!("frame {}: present failed: {err}", self.frames);
        }
        self.frames += 1;
        outcome
    }

    fn update(&mut self) -> FrameOutcome {
        match self.engine.step() {
            Ok(StepOutcome::Pending) => return FrameOutcome::Uninitialized,
            Ok(StepOutcome::Changed) => self.needs_sync = true,
            Ok(StepOutcome::Unchanged) => {}
            Err(err) => {
                log::warn!("frame {}: {err}", self.frames);
                return FrameOutcome::SyncFailed;
            }
        }
        if !self.needs_sync {
            return FrameOutcome::Unchanged;
        }
        let outcome = self.reconcile();
        if matches!(outcome, FrameOutcome::Synced(_)) {
            self.needs_sync = false;
        }
        outcome
    }

    /// Capture both layers, then apply both, so a failed query leaves
    /// every cell as it was and the change stays pending.
    fn reconcile(&mut self) -> FrameOutcome {
        let Some(engine) = self.engine.engine() else {
            return FrameOutcome::Uninitialized;
        };

        let snapshots = Snapshot::board(engine, &self.board).and_then(|board| {
            let piece = self
                .piece
                .as_ref()
                .map(|grid| Snapshot::piece(engine, grid))
                .transpose()?;
            Ok((board, piece))
        });
        let (board, piece) = match snapshots {
            Ok(s) => s,
            Err(err) => {
                log::warn!("frame {}: skipping sync: {err}", self.frames);
                return FrameOutcome::SyncFailed;
            }
        };

        let mut stats = self
            .sync
            .apply(&mut self.board, &board, &self.palette, &mut self.scene);
        if let (Some(grid), Some(snapshot)) = (self.piece.as_mut(), piece.as_ref()) {
            stats += self.sync.apply(grid, snapshot, &self.palette, &mut self.scene);
        }
        log::debug!("frame {}: {stats:?}", self.frames);
        FrameOutcome::Synced(stats)
    }

    fn animate(&mut self) {
        self.board.tick(&mut self.scene, self.spin);
        if let Some(grid) = &self.piece {
            grid.tick(&mut self.scene, self.spin);
        }
    }

    /// Route a host message. Returns `false` once the host should stop.
    pub fn handle_msg(&mut self, msg: Msg) -> bool {
        match msg {
            Msg::KeyDown { key } => {
                self.handle_key(key);
            }
            Msg::Quit => self.quit = true,
        }
        !self.quit
    }

    /// Forward a key press to the engine. Returns the command sent, if any.
    /// Presses before the engine is running are dropped.
    pub fn handle_key(&mut self, key: Key) -> Option<Command> {
        self.engine.poll();
        match self.engine.engine_mut() {
            Some(engine) => self.input.dispatch(key, engine),
            None => {
                if let Some(cmd) = self.input.lookup(key) {
                    log::debug!("engine not running; dropping {cmd:?}");
                }
                None
            }
        }
    }

    #[inline]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn engine(&self) -> &EngineSlot<E> {
        &self.engine
    }

    pub fn board(&self) -> &Grid {
        &self.board
    }

    pub fn piece(&self) -> Option<&Grid> {
        self.piece.as_ref()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sync_totals(&self) -> SyncStats {
        self.sync.totals()
    }

    /// Size of the board layer, for hosts sizing their viewport.
    pub fn board_size(&self) -> Point {
        Point::new(self.board.width(), self.board.height())
    }
}

impl<E> std::fmt::Debug for FrameLoop<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("engine", &self.engine)
            .field("objects", &self.scene.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
