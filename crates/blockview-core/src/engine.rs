//! The external puzzle engine as seen from the renderer: the [`Engine`]
//! query/command trait, the six [`Command`]s, and the [`EngineSlot`] that
//! holds an engine whose construction finishes asynchronously.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// An input command forwarded to the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    DropDown,
    RotateLeft,
    RotateRight,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::MoveDown,
        Command::DropDown,
        Command::RotateLeft,
        Command::RotateRight,
    ];
}

// ---------------------------------------------------------------------------
// Engine trait
// ---------------------------------------------------------------------------

/// State queries and commands of a falling-block engine.
///
/// Colour queries return raw identifiers: `-1` for empty, `1..=8` for a
/// palette entry. Anything else is treated as empty by the renderer.
pub trait Engine {
    /// Advance one frame. Returns whether anything visible changed since
    /// the previous call.
    fn run_step(&mut self) -> Result<bool, EngineError>;

    fn board_color_at(&self, x: i32, y: i32) -> Result<i32, EngineError>;

    /// Colour inside the active piece's bounding box, local coordinates.
    fn active_piece_at(&self, x: i32, y: i32) -> Result<i32, EngineError>;

    fn active_piece_x(&self) -> Result<i32, EngineError>;

    fn active_piece_y(&self) -> Result<i32, EngineError>;

    /// Fire-and-forget command.
    fn apply(&mut self, command: Command);
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn run_step(&mut self) -> Result<bool, EngineError> {
        (**self).run_step()
    }

    fn board_color_at(&self, x: i32, y: i32) -> Result<i32, EngineError> {
        (**self).board_color_at(x, y)
    }

    fn active_piece_at(&self, x: i32, y: i32) -> Result<i32, EngineError> {
        (**self).active_piece_at(x, y)
    }

    fn active_piece_x(&self) -> Result<i32, EngineError> {
        (**self).active_piece_x()
    }

    fn active_piece_y(&self) -> Result<i32, EngineError> {
        (**self).active_piece_y()
    }

    fn apply(&mut self, command: Command) {
        (**self).apply(command)
    }
}

// ---------------------------------------------------------------------------
// StepOutcome
// ---------------------------------------------------------------------------

/// Result of asking the slot to advance the engine by one frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// No engine yet (still loading, or loading failed).
    Pending,
    Unchanged,
    Changed,
}

// ---------------------------------------------------------------------------
// EngineSlot / EngineInit
// ---------------------------------------------------------------------------

enum SlotState<E> {
    Pending(Receiver<Result<E, EngineError>>),
    Running(E),
    Failed(EngineError),
}

/// Holds the engine once its asynchronous initialization completes.
///
/// The slot never blocks: [`poll`](EngineSlot::poll) checks for a finished
/// initialization and moves to running or failed. A failed slot stays
/// failed.
pub struct EngineSlot<E> {
    state: SlotState<E>,
}

/// One-shot completion handle for a pending [`EngineSlot`]. Dropping it
/// without calling [`complete`](EngineInit::complete) fails the slot.
pub struct EngineInit<E> {
    tx: Sender<Result<E, EngineError>>,
}

impl<E> EngineInit<E> {
    pub fn complete(self, result: Result<E, EngineError>) {
        // The slot may already be gone; nothing to report to then.
        self.tx.send(result).ok();
    }
}

impl<E> std::fmt::Debug for EngineInit<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EngineInit(..)")
    }
}

impl<E> EngineSlot<E> {
    /// A slot waiting for its engine, plus the handle that delivers it.
    pub fn pending() -> (Self, EngineInit<E>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                state: SlotState::Pending(rx),
            },
            EngineInit { tx },
        )
    }

    /// A slot that already holds a running engine.
    pub fn ready(engine: E) -> Self {
        Self {
            state: SlotState::Running(engine),
        }
    }

    /// Check for a completed initialization. Returns `true` if running.
    pub fn poll(&mut self) -> bool {
        if let SlotState::Pending(rx) = &self.state {
            let next = match rx.try_recv() {
                Ok(Ok(engine)) => {
                    log::info!("engine ready");
                    SlotState::Running(engine)
                }
                Ok(Err(err)) => {
                    log::error!("{err}; staying in animation-only mode");
                    SlotState::Failed(err)
                }
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => {
                    let err = EngineError::Abandoned;
                    log::error!("{err}; staying in animation-only mode");
                    SlotState::Failed(err)
                }
            };
            self.state = next;
        }
        self.is_running()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, SlotState::Running(_))
    }

    /// The initialization error, if initialization failed.
    pub fn failure(&self) -> Option<&EngineError> {
        match &self.state {
            SlotState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn engine(&self) -> Option<&E> {
        match &self.state {
            SlotState::Running(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        match &mut self.state {
            SlotState::Running(engine) => Some(engine),
            _ => None,
        }
    }
}

impl<E: Engine> EngineSlot<E> {
    /// Poll for initialization, then advance a running engine by one step.
    pub fn step(&mut self) -> Result<StepOutcome, EngineError> {
        if !self.poll() {
            return Ok(StepOutcome::Pending);
        }
        match self.engine_mut() {
            Some(engine) => Ok(if engine.run_step()? {
                StepOutcome::Changed
            } else {
                StepOutcome::Unchanged
            }),
            None => Ok(StepOutcome::Pending),
        }
    }
}

impl<E> std::fmt::Debug for EngineSlot<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            SlotState::Pending(_) => f.write_str("EngineSlot::Pending"),
            SlotState::Running(_) => f.write_str("EngineSlot::Running(..)"),
            SlotState::Failed(err) => f.debug_tuple("EngineSlot::Failed").field(err).finish(),
        }
    }
}
