//! The retained scene: [`SceneGraph`], [`SceneObject`], [`ObjectId`] and the
//! [`Camera`] it is viewed through.
//!
//! Objects are unit cubes. Each one is bound to a [`Material`] at creation
//! and never re-materialed; a colour change means remove + add.

use std::collections::BTreeMap;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::palette::Material;

/// Opaque handle to an object placed in a [`SceneGraph`]. Never reused
/// within one graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A positioned, materially-bound unit cube.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub material: Material,
    pub position: Vec3,
    /// Euler angles in radians, XYZ order.
    pub rotation: Vec3,
}

impl SceneObject {
    pub fn orientation(&self) -> Quat {
        let r = self.rotation;
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }

    /// Object → world transform.
    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position)
    }
}

/// Lifetime counters, handy for asserting on churn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub added: u64,
    pub removed: u64,
}

/// Add/remove-only container of [`SceneObject`]s.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
    stats: SceneStats,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new cube with zero rotation.
    pub fn add(&mut self, material: Material, position: Vec3) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            SceneObject {
                material,
                position,
                rotation: Vec3::ZERO,
            },
        );
        self.stats.added += 1;
        id
    }

    /// Remove an object. Unknown ids are ignored.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            self.stats.removed += 1;
        }
        removed
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Move an object. Returns `false` if `id` is not in the scene.
    pub fn set_position(&mut self, id: ObjectId, position: Vec3) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.position = position;
                true
            }
            None => false,
        }
    }

    /// Add `delta` to an object's rotation.
    pub fn rotate(&mut self, id: ObjectId, delta: Vec3) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.rotation += delta;
                true
            }
            None => false,
        }
    }

    /// Objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> SceneStats {
        self.stats
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// A perspective camera looking at a target point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Rotation about the viewing axis, radians.
    pub roll: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    /// Behind a 10×20 board looking at its centre, rolled half a turn so
    /// grid row 0 ends up at the top of the screen.
    fn default() -> Self {
        Self {
            eye: Vec3::new(5.0, 10.0, -25.0),
            target: Vec3::new(5.0, 10.0, 0.0),
            fov_y_deg: 50.0,
            roll: std::f32::consts::PI,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// World → view transform. View space is right-handed: x right, y up,
    /// looking down -z. Rolling the camera turns the image the other way.
    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_z(-self.roll) * Mat4::look_at_rh(self.eye, self.target, self.up())
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect, self.near, self.far)
    }

    #[inline]
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// A world point in view space.
    #[inline]
    pub fn to_view(&self, p: Vec3) -> Vec3 {
        self.view().transform_point3(p)
    }

    fn up(&self) -> Vec3 {
        let forward = (self.target - self.eye).normalize_or_zero();
        if forward.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y }
    }
}
