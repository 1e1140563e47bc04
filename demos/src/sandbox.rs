//! A small falling-block game implementing [`Engine`], so the hosts have
//! something to show.
//!
//! Pieces spawn at `(3, 0)` inside a 4×4 box, fall one row every
//! `step_interval` steps, freeze when they can no longer fall, and full
//! rows are cleared. A piece that collides on spawn restarts the game.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use blockview_core::{Command, Engine, EngineError};

pub const WIDTH: i32 = 10;
pub const HEIGHT: i32 = 20;
const BOX: i32 = 4;
const EMPTY: i32 = -1;
const SPAWN: (i32, i32) = (3, 0);
pub const DEFAULT_STEP_INTERVAL: u32 = 10;

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// The seven tetrominoes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    I,
    O,
    T,
    J,
    L,
    S,
    Z,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::I,
        Shape::O,
        Shape::T,
        Shape::J,
        Shape::L,
        Shape::S,
        Shape::Z,
    ];

    /// Palette id, `1..=7`.
    pub fn color(self) -> i32 {
        self as i32 + 1
    }

    /// Side of the square the shape rotates in.
    fn span(self) -> i32 {
        match self {
            Shape::I | Shape::O => 4,
            _ => 3,
        }
    }

    /// Occupied cells in the spawn orientation.
    fn cells(self) -> [(i32, i32); 4] {
        match self {
            Shape::I => [(0, 1), (1, 1), (2, 1), (3, 1)],
            Shape::O => [(1, 1), (2, 1), (1, 2), (2, 2)],
            Shape::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
            Shape::J => [(0, 0), (0, 1), (1, 1), (2, 1)],
            Shape::L => [(2, 0), (0, 1), (1, 1), (2, 1)],
            Shape::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
            Shape::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
        }
    }
}

/// The falling piece: shape, quarter turns clockwise and box position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Piece {
    shape: Shape,
    turns: u8,
    x: i32,
    y: i32,
}

impl Piece {
    fn spawn(shape: Shape) -> Self {
        Self {
            shape,
            turns: 0,
            x: SPAWN.0,
            y: SPAWN.1,
        }
    }

    /// Occupied cells relative to the box.
    fn local_cells(self) -> impl Iterator<Item = (i32, i32)> {
        let n = self.shape.span();
        self.shape.cells().into_iter().map(move |(mut x, mut y)| {
            for _ in 0..self.turns {
                (x, y) = (n - 1 - y, x);
            }
            (x, y)
        })
    }

    /// Occupied cells on the board.
    fn board_cells(self) -> impl Iterator<Item = (i32, i32)> {
        self.local_cells().map(move |(x, y)| (self.x + x, self.y + y))
    }

    fn covers(self, x: i32, y: i32) -> bool {
        self.local_cells().any(|c| c == (x, y))
    }

    fn moved(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    fn turned(self, clockwise: bool) -> Self {
        let turns = if clockwise {
            (self.turns + 1) % 4
        } else {
            (self.turns + 3) % 4
        };
        Self { turns, ..self }
    }
}

// ---------------------------------------------------------------------------
// SandboxEngine
// ---------------------------------------------------------------------------

/// A self-contained puzzle engine.
pub struct SandboxEngine {
    rng: StdRng,
    board: Vec<i32>,
    piece: Piece,
    next: Shape,
    time: u32,
    step_interval: u32,
    has_change: bool,
    cleared: u32,
    games: u32,
    overlay: bool,
}

impl SandboxEngine {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let first = random_shape(&mut rng);
        let next = random_shape(&mut rng);
        Self {
            rng,
            board: vec![EMPTY; (WIDTH * HEIGHT) as usize],
            piece: Piece::spawn(first),
            next,
            time: 0,
            step_interval: DEFAULT_STEP_INTERVAL,
            has_change: true,
            cleared: 0,
            games: 1,
            overlay: false,
        }
    }

    /// Steps between gravity moves.
    pub fn with_step_interval(mut self, steps: u32) -> Self {
        self.step_interval = steps.max(1);
        self
    }

    /// Report the falling piece as part of the board, for single-layer
    /// views.
    pub fn with_piece_overlay(mut self, on: bool) -> Self {
        self.overlay = on;
        self
    }

    /// Rows cleared in the current game.
    pub fn cleared(&self) -> u32 {
        self.cleared
    }

    /// Games started, counting the first.
    pub fn games(&self) -> u32 {
        self.games
    }

    fn cell(&self, x: i32, y: i32) -> Option<i32> {
        ((0..WIDTH).contains(&x) && (0..HEIGHT).contains(&y))
            .then(|| self.board[(y * WIDTH + x) as usize])
    }

    fn set_cell(&mut self, x: i32, y: i32, v: i32) {
        if self.cell(x, y).is_some() {
            self.board[(y * WIDTH + x) as usize] = v;
        }
    }

    fn collides(&self, piece: Piece) -> bool {
        piece
            .board_cells()
            .any(|(x, y)| self.cell(x, y) != Some(EMPTY))
    }

    /// Replace the piece if the result fits.
    fn try_place(&mut self, piece: Piece) -> bool {
        if self.collides(piece) {
            return false;
        }
        self.piece = piece;
        self.has_change = true;
        true
    }

    fn lower(&mut self) {
        if !self.try_place(self.piece.moved(0, 1)) {
            self.freeze();
        }
        self.has_change = true;
    }

    fn drop_down(&mut self) {
        let mut piece = self.piece;
        while !self.collides(piece.moved(0, 1)) {
            piece = piece.moved(0, 1);
        }
        self.piece = piece;
        self.has_change = true;
    }

    fn freeze(&mut self) {
        let color = self.piece.shape.color();
        for (x, y) in self.piece.board_cells() {
            self.set_cell(x, y, color);
        }
        let rows = self.clear_full_rows();
        if rows > 0 {
            self.cleared += rows;
            log::debug!("cleared {rows} rows ({} this game)", self.cleared);
        }
        self.spawn_next();
        if self.collides(self.piece) {
            self.new_game();
        }
    }

    fn spawn_next(&mut self) {
        self.piece = Piece::spawn(self.next);
        self.next = random_shape(&mut self.rng);
    }

    fn clear_full_rows(&mut self) -> u32 {
        let mut count = 0;
        for row in 0..HEIGHT {
            if (0..WIDTH).all(|x| self.cell(x, row) != Some(EMPTY)) {
                let end = ((row + 1) * WIDTH) as usize;
                // Shift everything above down one row.
                self.board.copy_within(0..end - WIDTH as usize, WIDTH as usize);
                self.board[..WIDTH as usize].fill(EMPTY);
                count += 1;
            }
        }
        count
    }

    fn new_game(&mut self) {
        log::info!(
            "game {} over after {} rows; starting over",
            self.games,
            self.cleared
        );
        self.board.fill(EMPTY);
        self.spawn_next();
        self.cleared = 0;
        self.games += 1;
        self.has_change = true;
    }

    #[cfg(test)]
    fn force_piece(&mut self, shape: Shape) {
        self.piece = Piece::spawn(shape);
    }
}

fn random_shape(rng: &mut StdRng) -> Shape {
    Shape::ALL[rng.random_range(0..Shape::ALL.len())]
}

fn out_of_range(query: &'static str, x: i32, y: i32) -> EngineError {
    EngineError::Query {
        query,
        reason: format!("({x}, {y}) is out of range"),
    }
}

impl Engine for SandboxEngine {
    fn run_step(&mut self) -> Result<bool, EngineError> {
        self.time = self.time.wrapping_add(1);
        if self.time % self.step_interval == 0 {
            self.lower();
        }
        Ok(std::mem::take(&mut self.has_change))
    }

    fn board_color_at(&self, x: i32, y: i32) -> Result<i32, EngineError> {
        let color = self
            .cell(x, y)
            .ok_or_else(|| out_of_range("board_color_at", x, y))?;
        if self.overlay && self.piece.board_cells().any(|c| c == (x, y)) {
            return Ok(self.piece.shape.color());
        }
        Ok(color)
    }

    fn active_piece_at(&self, x: i32, y: i32) -> Result<i32, EngineError> {
        if !(0..BOX).contains(&x) || !(0..BOX).contains(&y) {
            return Err(out_of_range("active_piece_at", x, y));
        }
        Ok(if self.piece.covers(x, y) {
            self.piece.shape.color()
        } else {
            EMPTY
        })
    }

    fn active_piece_x(&self) -> Result<i32, EngineError> {
        Ok(self.piece.x)
    }

    fn active_piece_y(&self) -> Result<i32, EngineError> {
        Ok(self.piece.y)
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => {
                self.try_place(self.piece.moved(-1, 0));
            }
            Command::MoveRight => {
                self.try_place(self.piece.moved(1, 0));
            }
            Command::MoveDown => self.lower(),
            Command::DropDown => self.drop_down(),
            Command::RotateLeft => {
                self.try_place(self.piece.turned(false));
            }
            Command::RotateRight => {
                self.try_place(self.piece.turned(true));
            }
        }
    }
}

impl std::fmt::Debug for SandboxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxEngine")
            .field("piece", &self.piece)
            .field("next", &self.next)
            .field("cleared", &self.cleared)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(shape: Shape) -> SandboxEngine {
        let mut e = SandboxEngine::new(7);
        e.force_piece(shape);
        e
    }

    fn piece_cells(e: &SandboxEngine) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        for y in 0..BOX {
            for x in 0..BOX {
                if e.active_piece_at(x, y).unwrap() != EMPTY {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    #[test]
    fn rotations_match_rotation_tables() {
        let mut e = engine(Shape::T);
        e.apply(Command::RotateRight);
        assert_eq!(piece_cells(&e), vec![(1, 0), (1, 1), (2, 1), (1, 2)]);

        let mut e = engine(Shape::I);
        e.apply(Command::RotateRight);
        assert_eq!(piece_cells(&e), vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
        e.apply(Command::RotateLeft);
        assert_eq!(piece_cells(&e), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn change_flag_resets_on_read() {
        let mut e = SandboxEngine::new(1);
        assert!(e.run_step().unwrap());
        assert!(!e.run_step().unwrap());
        e.apply(Command::MoveLeft);
        assert!(e.run_step().unwrap());
    }

    #[test]
    fn gravity_every_interval() {
        let mut e = engine(Shape::O);
        for _ in 0..9 {
            e.run_step().unwrap();
        }
        assert_eq!(e.active_piece_y().unwrap(), 0);
        assert!(e.run_step().unwrap());
        assert_eq!(e.active_piece_y().unwrap(), 1);
    }

    #[test]
    fn step_interval_sets_gravity_pace() {
        let mut e = SandboxEngine::new(7).with_step_interval(3);
        e.force_piece(Shape::O);
        e.run_step().unwrap();
        e.run_step().unwrap();
        assert_eq!(e.active_piece_y().unwrap(), 0);
        e.run_step().unwrap();
        assert_eq!(e.active_piece_y().unwrap(), 1);

        let mut e = SandboxEngine::new(7).with_step_interval(0);
        e.force_piece(Shape::O);
        e.run_step().unwrap();
        assert_eq!(e.active_piece_y().unwrap(), 1);
    }

    #[test]
    fn walls_block_moves() {
        let mut e = engine(Shape::O);
        for _ in 0..10 {
            e.apply(Command::MoveLeft);
        }
        // O occupies box columns 1..=2, so the box may hang one past the wall.
        assert_eq!(e.active_piece_x().unwrap(), -1);
    }

    #[test]
    fn drop_lands_on_floor_without_freezing() {
        let mut e = engine(Shape::O);
        e.apply(Command::DropDown);
        assert_eq!(e.active_piece_y().unwrap(), HEIGHT - 3);
        assert!((0..WIDTH).all(|x| e.board_color_at(x, HEIGHT - 1).unwrap() == EMPTY));

        e.apply(Command::MoveDown);
        let o = Shape::O.color();
        assert_eq!(e.board_color_at(4, HEIGHT - 1).unwrap(), o);
        assert_eq!(e.board_color_at(5, HEIGHT - 2).unwrap(), o);
        assert_eq!(e.active_piece_y().unwrap(), SPAWN.1);
    }

    #[test]
    fn full_row_is_cleared() {
        let mut e = engine(Shape::I);
        for x in (0..3).chain(7..WIDTH) {
            e.set_cell(x, HEIGHT - 1, 2);
        }
        e.set_cell(0, HEIGHT - 2, 5);

        e.apply(Command::DropDown);
        e.apply(Command::MoveDown);

        assert_eq!(e.cleared(), 1);
        assert!((1..WIDTH).all(|x| e.board_color_at(x, HEIGHT - 1).unwrap() == EMPTY));
        assert_eq!(e.board_color_at(0, HEIGHT - 1).unwrap(), 5);
    }

    #[test]
    fn top_out_restarts() {
        let mut e = engine(Shape::O);
        for y in 1..HEIGHT {
            e.set_cell(4, y, 3);
        }
        e.apply(Command::MoveDown);
        assert_eq!(e.games(), 2);
        assert!((0..HEIGHT).all(|y| e.board_color_at(4, y).unwrap() == EMPTY));
    }

    #[test]
    fn overlay_merges_piece_into_board() {
        let plain = engine(Shape::O);
        let merged = engine(Shape::O).with_piece_overlay(true);
        assert_eq!(plain.board_color_at(4, 1).unwrap(), EMPTY);
        assert_eq!(merged.board_color_at(4, 1).unwrap(), Shape::O.color());
        assert_eq!(merged.board_color_at(0, 0).unwrap(), EMPTY);
    }

    #[test]
    fn queries_outside_range_fail() {
        let e = SandboxEngine::new(3);
        assert!(e.board_color_at(WIDTH, 0).is_err());
        assert!(e.board_color_at(0, -1).is_err());
        assert!(e.active_piece_at(4, 0).is_err());
        assert!(e.active_piece_at(3, 3).is_ok());
    }

    #[test]
    fn same_seed_same_game() {
        let a = SandboxEngine::new(42);
        let b = SandboxEngine::new(42);
        assert_eq!(a.piece, b.piece);
        assert_eq!(a.next, b.next);
    }
}
