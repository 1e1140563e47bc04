//! The [`Grid`] type: a fixed-size layer of [`Cell`]s.
//!
//! Two layers are used: the board, and the active piece's bounding box.
//! The piece layer carries an offset that is added to every cell's local
//! coordinate to get its world position.

use glam::Vec3;

use crate::cell::Cell;
use crate::geom::{Point, Range};
use crate::scene::SceneGraph;

/// A rectangular layer of cells stored row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Cell>,
    bounds: Range,
    offset: Point,
}

impl Grid {
    /// Create a `width` × `height` grid of empty cells. Negative sizes are
    /// clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let bounds = Range::new(0, 0, width.max(0), height.max(0));
        Self {
            cells: bounds.iter().map(Cell::new).collect(),
            bounds,
            offset: Point::ZERO,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Translation from local to world coordinates.
    #[inline]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Record a new translation. Cells are moved by the caller (see
    /// [`SyncEngine`](crate::sync::SyncEngine)), not here.
    #[inline]
    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.bounds.contains(p) {
            Some((p.y as usize) * (self.bounds.width() as usize) + (p.x as usize))
        } else {
            None
        }
    }

    /// The cell at local coordinate `p`, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    pub fn at_mut(&mut self, p: Point) -> Option<&mut Cell> {
        self.index(p).map(move |i| &mut self.cells[i])
    }

    /// Apply `f` to every cell, row-major.
    pub fn for_each_cell<F: FnMut(&Cell)>(&self, f: F) {
        self.cells.iter().for_each(f);
    }

    /// Apply `f` to every cell mutably, row-major.
    pub fn for_each_cell_mut<F: FnMut(&mut Cell)>(&mut self, f: F) {
        self.cells.iter_mut().for_each(f);
    }

    /// Row-major iterator over the cells.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Number of cells currently showing an object.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Run one idle-animation step on every cell.
    pub fn tick(&self, scene: &mut SceneGraph, spin: Vec3) {
        self.for_each_cell(|cell| cell.tick(scene, spin));
    }
}
