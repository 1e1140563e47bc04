//! The [`Cell`] type: one grid position's visual state.

use glam::Vec3;

use crate::geom::Point;
use crate::palette::{ColorId, Palette};
use crate::scene::{ObjectId, SceneGraph};

/// What a [`Cell::set_color`] call did to the scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorChange {
    /// Same colour as before; nothing touched.
    Unchanged,
    /// Was empty, now holds a new object.
    Created,
    /// Had an object, now empty.
    Removed,
    /// Old object removed and a new one created.
    Replaced,
}

/// A grid cell: a colour and, when that colour is not empty, the scene
/// object showing it.
///
/// `object.is_some() == color.is_some()` holds after every method returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    local: Point,
    world: Point,
    color: Option<ColorId>,
    object: Option<ObjectId>,
}

impl Cell {
    /// An empty cell at grid coordinate `local`; its world position starts
    /// out equal to it.
    pub const fn new(local: Point) -> Self {
        Self {
            local,
            world: local,
            color: None,
            object: None,
        }
    }

    /// Grid coordinate inside the owning grid. Fixed for the cell's life.
    #[inline]
    pub const fn local(&self) -> Point {
        self.local
    }

    /// Current world-space grid position.
    #[inline]
    pub const fn world(&self) -> Point {
        self.world
    }

    #[inline]
    pub const fn color(&self) -> Option<ColorId> {
        self.color
    }

    #[inline]
    pub const fn object(&self) -> Option<ObjectId> {
        self.object
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none()
    }

    /// Change the colour. A new colour always gets a fresh object (zero
    /// rotation) since materials are bound at creation.
    pub fn set_color(
        &mut self,
        color: Option<ColorId>,
        palette: &Palette,
        scene: &mut SceneGraph,
    ) -> ColorChange {
        if color == self.color {
            return ColorChange::Unchanged;
        }

        let had_object = match self.object.take() {
            Some(id) => {
                scene.remove(id);
                true
            }
            None => false,
        };

        self.color = color;
        let Some(id) = color else {
            return ColorChange::Removed;
        };

        self.object = Some(scene.add(palette.material(id), self.world.to_world()));
        if had_object {
            ColorChange::Replaced
        } else {
            ColorChange::Created
        }
    }

    /// Move to a new world position, keeping the attached object (if any).
    /// Returns `true` if the position actually changed.
    pub fn set_position(&mut self, world: Point, scene: &mut SceneGraph) -> bool {
        if world == self.world {
            return false;
        }
        self.world = world;
        if let Some(id) = self.object {
            scene.set_position(id, world.to_world());
        }
        true
    }

    /// Idle animation step: spin the attached object by `spin`.
    pub fn tick(&self, scene: &mut SceneGraph, spin: Vec3) {
        if let Some(id) = self.object {
            scene.rotate(id, spin);
        }
    }
}
