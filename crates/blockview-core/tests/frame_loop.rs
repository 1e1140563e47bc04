//! End-to-end behaviour of the frame loop against a scripted engine.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use blockview_core::{
    Camera, ColorId, Command, Engine, EngineError, EngineSlot, FrameLoop, FrameOutcome, Key, Msg,
    Point, Presenter, SceneGraph, Scheduler, Vec3, ViewConfig,
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    board: HashMap<(i32, i32), i32>,
    piece: HashMap<(i32, i32), i32>,
    offset: (i32, i32),
    changed: bool,
    fail_queries: bool,
    commands: Vec<Command>,
}

impl Script {
    fn set_board(&mut self, x: i32, y: i32, c: i32) {
        self.board.insert((x, y), c);
        self.changed = true;
    }
}

/// Engine whose state the test keeps a handle to.
#[derive(Clone, Default)]
struct Scripted(Rc<RefCell<Script>>);

impl Scripted {
    fn edit(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.0.borrow_mut());
    }

    fn commands(&self) -> Vec<Command> {
        self.0.borrow().commands.clone()
    }
}

impl Engine for Scripted {
    fn run_step(&mut self) -> Result<bool, EngineError> {
        Ok(std::mem::take(&mut self.0.borrow_mut().changed))
    }

    fn board_color_at(&self, x: i32, y: i32) -> Result<i32, EngineError> {
        let s = self.0.borrow();
        if s.fail_queries {
            return Err(EngineError::Query {
                query: "board_color_at",
                reason: "engine busy".into(),
            });
        }
        Ok(s.board.get(&(x, y)).copied().unwrap_or(-1))
    }

    fn active_piece_at(&self, x: i32, y: i32) -> Result<i32, EngineError> {
        Ok(self.0.borrow().piece.get(&(x, y)).copied().unwrap_or(-1))
    }

    fn active_piece_x(&self) -> Result<i32, EngineError> {
        Ok(self.0.borrow().offset.0)
    }

    fn active_piece_y(&self) -> Result<i32, EngineError> {
        Ok(self.0.borrow().offset.1)
    }

    fn apply(&mut self, command: Command) {
        self.0.borrow_mut().commands.push(command);
    }
}

#[derive(Default)]
struct Recorder {
    presented: Vec<usize>,
}

impl Presenter for Recorder {
    fn present(
        &mut self,
        scene: &SceneGraph,
        _camera: &Camera,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.presented.push(scene.len());
        Ok(())
    }
}

#[derive(Default)]
struct Armed(u32);

impl Scheduler for Armed {
    fn request_frame(&mut self) {
        self.0 += 1;
    }
}

fn running() -> (FrameLoop<Scripted>, Scripted) {
    let engine = Scripted::default();
    let frames = FrameLoop::new(&ViewConfig::default(), EngineSlot::ready(engine.clone()));
    (frames, engine)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn single_block_appears_at_its_cell() {
    let (mut frames, engine) = running();
    engine.edit(|s| s.set_board(3, 5, 2));
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());

    let outcome = frames.tick(&mut rec, &mut sched);

    assert!(matches!(outcome, FrameOutcome::Synced(s) if s.created == 1));
    assert_eq!(frames.scene().len(), 1);
    let (_, obj) = frames.scene().iter().next().unwrap();
    assert_eq!(obj.position, Vec3::new(3.0, 5.0, 0.0));
    let two = ColorId::new(2).unwrap();
    assert_eq!(obj.material, frames.palette().material(two));
    assert_eq!(rec.presented, vec![1]);
}

#[test]
fn second_sync_only_adds_the_new_block() {
    let (mut frames, engine) = running();
    engine.edit(|s| s.set_board(3, 5, 2));
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());
    frames.tick(&mut rec, &mut sched);
    let kept = frames.board().at(Point::new(3, 5)).and_then(|c| c.object());

    engine.edit(|s| {
        s.set_board(3, 5, 2);
        s.set_board(4, 5, 5);
    });
    let outcome = frames.tick(&mut rec, &mut sched);

    assert!(matches!(outcome, FrameOutcome::Synced(s) if s.created == 1 && s.replaced == 0));
    assert!(kept.is_some());
    assert_eq!(frames.board().at(Point::new(3, 5)).and_then(|c| c.object()), kept);
    let new = frames.board().at(Point::new(4, 5)).and_then(|c| c.object()).unwrap();
    assert_eq!(frames.scene().get(new).unwrap().position, Vec3::new(4.0, 5.0, 0.0));
    assert_eq!(frames.scene().stats().added, 2);
    assert_eq!(frames.scene().stats().removed, 0);
}

#[test]
fn piece_block_is_offset_by_piece_position() {
    let (mut frames, engine) = running();
    engine.edit(|s| {
        s.piece.insert((1, 1), 7);
        s.offset = (4, 18);
        s.changed = true;
    });

    frames.tick(&mut Recorder::default(), &mut Armed::default());

    let piece = frames.piece().unwrap();
    let cell = piece.at(Point::new(1, 1)).unwrap();
    assert_eq!(cell.world(), Point::new(5, 19));
    let obj = frames.scene().get(cell.object().unwrap()).unwrap();
    assert_eq!(obj.position, Vec3::new(5.0, 19.0, 0.0));
}

#[test]
fn falling_piece_moves_without_churn() {
    let (mut frames, engine) = running();
    engine.edit(|s| {
        for y in 0..4 {
            s.piece.insert((1, y), 1);
        }
        s.offset = (3, 0);
        s.changed = true;
    });
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());
    frames.tick(&mut rec, &mut sched);

    for row in 1..=5 {
        engine.edit(|s| {
            s.offset = (3, row);
            s.changed = true;
        });
        frames.tick(&mut rec, &mut sched);
    }

    assert_eq!(frames.scene().stats().added, 4);
    assert_eq!(frames.piece().unwrap().offset(), Point::new(3, 5));
    assert!(frames
        .scene()
        .iter()
        .any(|(_, o)| o.position == Vec3::new(4.0, 8.0, 0.0)));
}

#[test]
fn ticks_before_init_do_nothing_but_rearm() {
    let (slot, init) = EngineSlot::<Scripted>::pending();
    let mut frames = FrameLoop::new(&ViewConfig::default(), slot);
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());

    for _ in 0..3 {
        assert_eq!(frames.tick(&mut rec, &mut sched), FrameOutcome::Uninitialized);
    }
    assert_eq!(sched.0, 3);
    assert_eq!(frames.board().occupied(), 0);
    assert!(frames.scene().is_empty());
    assert_eq!(frames.sync_totals(), Default::default());

    let engine = Scripted::default();
    engine.edit(|s| s.set_board(0, 0, 1));
    init.complete(Ok(engine));

    assert!(matches!(frames.tick(&mut rec, &mut sched), FrameOutcome::Synced(_)));
    assert_eq!(frames.scene().len(), 1);
    assert_eq!(sched.0, 4);
}

#[test]
fn unmapped_key_sends_no_command() {
    let (mut frames, engine) = running();
    assert_eq!(frames.handle_key(Key::Letter('z')), None);
    assert!(frames.handle_msg(Msg::key(Key::Tab)));
    assert!(engine.commands().is_empty());
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[test]
fn failed_queries_skip_sync_but_keep_looping() {
    let (mut frames, engine) = running();
    engine.edit(|s| {
        s.set_board(1, 1, 3);
        s.fail_queries = true;
    });
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());

    assert_eq!(frames.tick(&mut rec, &mut sched), FrameOutcome::SyncFailed);
    assert_eq!(frames.tick(&mut rec, &mut sched), FrameOutcome::SyncFailed);
    assert!(frames.scene().is_empty());
    assert_eq!(sched.0, 2);
    assert_eq!(rec.presented, vec![0, 0]);

    engine.edit(|s| s.fail_queries = false);
    assert!(matches!(frames.tick(&mut rec, &mut sched), FrameOutcome::Synced(s) if s.created == 1));
    assert_eq!(frames.board().occupied(), 1);
    assert_eq!(frames.tick(&mut rec, &mut sched), FrameOutcome::Unchanged);
}

#[test]
fn change_reported_once_survives_a_failed_query() {
    let (mut frames, engine) = running();
    engine.edit(|s| {
        s.set_board(1, 1, 3);
        s.fail_queries = true;
    });
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());
    assert_eq!(frames.tick(&mut rec, &mut sched), FrameOutcome::SyncFailed);

    // The engine goes idle: its change flag was consumed by the failed frame.
    engine.edit(|s| s.fail_queries = false);
    for _ in 0..100 {
        frames.tick(&mut rec, &mut sched);
    }

    assert!(!engine.0.borrow().changed);
    assert_eq!(frames.scene().len(), 1);
    assert_eq!(frames.board().occupied(), 1);
}

#[test]
fn out_of_palette_colors_render_as_empty() {
    let (mut frames, engine) = running();
    engine.edit(|s| {
        s.set_board(0, 0, 42);
        s.set_board(1, 0, 0);
        s.set_board(2, 0, 4);
    });

    let outcome = frames.tick(&mut Recorder::default(), &mut Armed::default());

    assert!(matches!(outcome, FrameOutcome::Synced(s) if s.invalid == 2 && s.created == 1));
    assert_eq!(frames.board().occupied(), 1);
}

#[test]
fn failed_init_keeps_loop_alive() {
    let (slot, init) = EngineSlot::<Scripted>::pending();
    let mut frames = FrameLoop::new(&ViewConfig::default(), slot);
    init.complete(Err(EngineError::Init("bad build".into())));
    let mut sched = Armed::default();

    for _ in 0..5 {
        assert_eq!(
            frames.tick(&mut Recorder::default(), &mut sched),
            FrameOutcome::Uninitialized
        );
    }
    assert!(!frames.is_running());
    assert!(frames.engine().failure().is_some());
    assert_eq!(frames.handle_key(Key::Letter('a')), None);
    assert_eq!(sched.0, 5);
}

// ---------------------------------------------------------------------------
// Input and animation
// ---------------------------------------------------------------------------

#[test]
fn keys_reach_engine_in_order() {
    let (mut frames, engine) = running();
    for key in [Key::Letter('a'), Key::Letter('a'), Key::Space, Key::Letter('w')] {
        frames.handle_msg(Msg::key(key));
    }
    assert_eq!(
        engine.commands(),
        vec![Command::MoveLeft, Command::MoveLeft, Command::MoveDown, Command::DropDown]
    );
}

#[test]
fn keys_before_init_are_dropped_then_delivered_after() {
    let (slot, init) = EngineSlot::<Scripted>::pending();
    let mut frames = FrameLoop::new(&ViewConfig::default(), slot);
    assert_eq!(frames.handle_key(Key::Letter('q')), None);

    let engine = Scripted::default();
    init.complete(Ok(engine.clone()));
    assert_eq!(frames.handle_key(Key::Letter('q')), Some(Command::RotateLeft));
    assert_eq!(engine.commands(), vec![Command::RotateLeft]);
}

#[test]
fn idle_frames_spin_without_resyncing() {
    let (mut frames, engine) = running();
    engine.edit(|s| s.set_board(2, 2, 1));
    let (mut rec, mut sched) = (Recorder::default(), Armed::default());

    frames.tick(&mut rec, &mut sched);
    for _ in 0..9 {
        assert_eq!(frames.tick(&mut rec, &mut sched), FrameOutcome::Unchanged);
    }

    let (_, obj) = frames.scene().iter().next().unwrap();
    assert!((obj.rotation.x - 0.10).abs() < 1e-4);
    assert!((obj.rotation.y - 0.10).abs() < 1e-4);
    assert_eq!(frames.scene().stats().added, 1);
    assert_eq!(frames.frames(), 10);
}
