//! Reconciliation of a [`Grid`] against an engine snapshot.
//!
//! A reconciliation runs in two phases. First every colour (and, for the
//! piece layer, the offset) is queried into a [`Snapshot`]; if any query
//! fails nothing has been touched yet and the error is returned. Then the
//! snapshot is applied cell by cell, creating, removing or moving scene
//! objects only where something differs.

use std::ops::AddAssign;

use crate::cell::ColorChange;
use crate::engine::Engine;
use crate::error::{EngineError, SyncError};
use crate::geom::Point;
use crate::grid::Grid;
use crate::palette::{ColorId, Palette};
use crate::scene::SceneGraph;

// ---------------------------------------------------------------------------
// SyncStats
// ---------------------------------------------------------------------------

/// Per-reconciliation counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub created: u32,
    pub removed: u32,
    pub replaced: u32,
    pub moved: u32,
    pub unchanged: u32,
    /// Raw colours outside the palette, shown as empty.
    pub invalid: u32,
}

impl SyncStats {
    /// Whether the reconciliation touched the scene at all.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.removed == 0 && self.replaced == 0 && self.moved == 0
    }

    fn record(&mut self, change: ColorChange) {
        match change {
            ColorChange::Unchanged => self.unchanged += 1,
            ColorChange::Created => self.created += 1,
            ColorChange::Removed => self.removed += 1,
            ColorChange::Replaced => self.replaced += 1,
        }
    }
}

impl AddAssign for SyncStats {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.removed += rhs.removed;
        self.replaced += rhs.replaced;
        self.moved += rhs.moved;
        self.unchanged += rhs.unchanged;
        self.invalid += rhs.invalid;
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Decoded colours for one grid, row-major, plus the layer offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    colors: Vec<Option<ColorId>>,
    offset: Point,
    invalid: u32,
}

impl Snapshot {
    /// Query every cell of `grid` through `color_at`. Out-of-palette values
    /// decode to empty; a failed query aborts the capture.
    pub fn capture<F>(grid: &Grid, offset: Point, mut color_at: F) -> Result<Self, SyncError>
    where
        F: FnMut(i32, i32) -> Result<i32, EngineError>,
    {
        let mut colors = Vec::with_capacity(grid.len());
        let mut invalid = 0;
        for p in grid.bounds() {
            let raw = color_at(p.x, p.y).map_err(|source| SyncError::Color { at: p, source })?;
            let color = ColorId::from_raw(raw).unwrap_or_else(|err| {
                log::warn!("{err} at {p}; treating as empty");
                invalid += 1;
                None
            });
            colors.push(color);
        }
        Ok(Self {
            colors,
            offset,
            invalid,
        })
    }

    /// Query the board layer of `engine`.
    pub fn board<E: Engine + ?Sized>(engine: &E, grid: &Grid) -> Result<Self, SyncError> {
        Self::capture(grid, Point::ZERO, |x, y| engine.board_color_at(x, y))
    }

    /// Query the active-piece layer of `engine`; the offset is read once,
    /// before any colour.
    pub fn piece<E: Engine + ?Sized>(engine: &E, grid: &Grid) -> Result<Self, SyncError> {
        let x = engine.active_piece_x().map_err(SyncError::Offset)?;
        let y = engine.active_piece_y().map_err(SyncError::Offset)?;
        Self::capture(grid, Point::new(x, y), |x, y| engine.active_piece_at(x, y))
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Decoded colour at row-major index `i`.
    pub fn color(&self, i: usize) -> Option<ColorId> {
        self.colors.get(i).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Applies snapshots to grids with minimal scene churn and keeps running
/// totals of what it did.
#[derive(Debug, Default)]
pub struct SyncEngine {
    totals: SyncStats,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything applied since construction.
    pub fn totals(&self) -> SyncStats {
        self.totals
    }

    /// Apply a snapshot captured from `grid`. Cells are moved to
    /// `offset + local` before their colour is set, so new objects are
    /// created in place.
    pub fn apply(
        &mut self,
        grid: &mut Grid,
        snapshot: &Snapshot,
        palette: &Palette,
        scene: &mut SceneGraph,
    ) -> SyncStats {
        let mut stats = SyncStats {
            invalid: snapshot.invalid,
            ..SyncStats::default()
        };
        let offset = snapshot.offset;
        grid.set_offset(offset);

        let mut i = 0;
        grid.for_each_cell_mut(|cell| {
            if cell.set_position(offset + cell.local(), scene) {
                stats.moved += 1;
            }
            stats.record(cell.set_color(snapshot.color(i), palette, scene));
            i += 1;
        });

        self.totals += stats;
        stats
    }

    /// Capture and apply with a fixed offset of zero (board layer).
    pub fn reconcile<F>(
        &mut self,
        grid: &mut Grid,
        color_at: F,
        palette: &Palette,
        scene: &mut SceneGraph,
    ) -> Result<SyncStats, SyncError>
    where
        F: FnMut(i32, i32) -> Result<i32, EngineError>,
    {
        let snapshot = Snapshot::capture(grid, Point::ZERO, color_at)?;
        Ok(self.apply(grid, &snapshot, palette, scene))
    }

    /// Capture and apply a translated layer (active piece). `offset` is
    /// queried once, before any colour.
    pub fn reconcile_with_offset<O, F>(
        &mut self,
        grid: &mut Grid,
        offset: O,
        color_at: F,
        palette: &Palette,
        scene: &mut SceneGraph,
    ) -> Result<SyncStats, SyncError>
    where
        O: FnOnce() -> Result<Point, EngineError>,
        F: FnMut(i32, i32) -> Result<i32, EngineError>,
    {
        let offset = offset().map_err(SyncError::Offset)?;
        let snapshot = Snapshot::capture(grid, offset, color_at)?;
        Ok(self.apply(grid, &snapshot, palette, scene))
    }
}
