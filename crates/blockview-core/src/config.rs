//! Configuration for a [`FrameLoop`](crate::app::FrameLoop).

use glam::Vec3;

use crate::geom::Point;
use crate::input::{Binding, default_bindings};
use crate::palette::PaletteSource;
use crate::scene::Camera;

/// Board dimensions of the standard game.
pub const BOARD_WIDTH: i32 = 10;
pub const BOARD_HEIGHT: i32 = 20;
/// Bounding box of the largest piece.
pub const PIECE_SIZE: i32 = 4;

/// Everything a frame loop needs to know up front.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewConfig {
    /// Board layer size in cells.
    pub board_size: Point,
    /// Active-piece layer size in cells. Zero disables the layer.
    pub piece_size: Point,
    pub palette: PaletteSource,
    /// Rotation added to every block each frame, radians per axis.
    pub spin_per_frame: Vec3,
    pub camera: Camera,
    pub bindings: Vec<Binding>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            board_size: Point::new(BOARD_WIDTH, BOARD_HEIGHT),
            piece_size: Point::new(PIECE_SIZE, PIECE_SIZE),
            palette: PaletteSource::Fixed,
            spin_per_frame: Vec3::new(0.01, 0.01, 0.0),
            camera: Camera::default(),
            bindings: default_bindings(),
        }
    }
}

impl ViewConfig {
    /// A single merged layer: the board only, no separate piece grid.
    pub fn board_only(mut self) -> Self {
        self.piece_size = Point::ZERO;
        self
    }

    pub fn with_palette(mut self, palette: PaletteSource) -> Self {
        self.palette = palette;
        self
    }
}
