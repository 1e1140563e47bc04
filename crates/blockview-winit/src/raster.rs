//! CPU rasterizer for the block scene.
//!
//! Every [`SceneObject`] is drawn as a unit-ish cube: corners go through
//! the object's model matrix and the [`Camera`]'s view-projection, faces
//! turned away from the eye are culled, and the rest are filled into a
//! z-buffered `0RGB` pixel buffer with one flat shade per face.

use blockview_core::{Camera, Color, SceneGraph, SceneObject};
use glam::{Mat4, Vec3};

/// Cube faces as corner indices (see [`cube_corners`]) plus outward normal.
const FACES: [([usize; 4], Vec3); 6] = [
    ([0, 1, 3, 2], Vec3::NEG_X),
    ([4, 6, 7, 5], Vec3::X),
    ([0, 4, 5, 1], Vec3::NEG_Y),
    ([2, 3, 7, 6], Vec3::Y),
    ([0, 2, 6, 4], Vec3::NEG_Z),
    ([1, 5, 7, 3], Vec3::Z),
];

const AMBIENT: f32 = 0.35;

/// Slack on the edge test so shared quad diagonals leave no gaps.
const EDGE_EPS: f32 = 1e-5;

/// Corner `i` has bit 2 = +x, bit 1 = +y, bit 0 = +z.
fn cube_corners(half: f32) -> [Vec3; 8] {
    std::array::from_fn(|i| {
        let pick = |bit: usize| if i & bit != 0 { half } else { -half };
        Vec3::new(pick(4), pick(2), pick(1))
    })
}

/// Brightness of a face with world-space normal `n`.
pub(crate) fn face_shade(n: Vec3) -> f32 {
    let light = Vec3::new(0.3, 0.5, -1.0).normalize();
    AMBIENT + (1.0 - AMBIENT) * n.dot(light).max(0.0)
}

#[inline]
pub(crate) fn color_to_pixel(c: Color) -> u32 {
    c.0 & 0x00FF_FFFF
}

/// Perspective projection for one frame.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Projection {
    view_proj: Mat4,
    eye: Vec3,
    width: f32,
    height: f32,
}

impl Projection {
    pub fn new(camera: &Camera, width: usize, height: usize) -> Self {
        let (width, height) = (width as f32, height as f32);
        Self {
            view_proj: camera.view_projection(width / height.max(1.0)),
            eye: camera.eye,
            width,
            height,
        }
    }

    /// World point → `(screen x, screen y, depth)`, or `None` when outside
    /// the near/far range. Depth is NDC z, `0.0` at the near plane.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let ndc = self.view_proj.project_point3(p);
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some((
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
            ndc.z,
        ))
    }

    /// True when a face with outward normal `n` through `p` points at the
    /// eye.
    fn faces_eye(&self, p: Vec3, n: Vec3) -> bool {
        (p - self.eye).dot(n) < 0.0
    }
}

// ---------------------------------------------------------------------------
// Rasterizer
// ---------------------------------------------------------------------------

pub(crate) struct Rasterizer {
    width: usize,
    height: usize,
    background: u32,
    cube_half: f32,
    pixels: Vec<u32>,
    depth: Vec<f32>,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize, background: Color, cube_size: f32) -> Self {
        Self {
            width,
            height,
            background: color_to_pixel(background),
            cube_half: cube_size / 2.0,
            pixels: vec![color_to_pixel(background); width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![self.background; width * height];
        self.depth = vec![f32::INFINITY; width * height];
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.depth.fill(f32::INFINITY);
    }

    /// Redraw the whole scene.
    pub fn draw(&mut self, scene: &SceneGraph, camera: &Camera) {
        self.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }
        let proj = Projection::new(camera, self.width, self.height);
        let corners = cube_corners(self.cube_half);
        for (_, obj) in scene.iter() {
            self.draw_cube(&proj, &corners, obj);
        }
    }

    fn draw_cube(&mut self, proj: &Projection, corners: &[Vec3; 8], obj: &SceneObject) {
        let model = obj.model();
        let orientation = obj.orientation();
        let world: [Vec3; 8] = std::array::from_fn(|i| model.transform_point3(corners[i]));

        for (idx, normal) in FACES {
            let n = orientation * normal;
            if !proj.faces_eye(world[idx[0]], n) {
                continue;
            }
            let mut quad = [(0.0, 0.0, 0.0); 4];
            let mut visible = true;
            for (slot, &i) in quad.iter_mut().zip(idx.iter()) {
                match proj.project(world[i]) {
                    Some(v) => *slot = v,
                    None => visible = false,
                }
            }
            if !visible {
                continue;
            }
            let color = color_to_pixel(obj.material.color.shade(face_shade(n)));
            self.fill_triangle(quad[0], quad[1], quad[2], color);
            self.fill_triangle(quad[0], quad[2], quad[3], color);
        }
    }

    /// Edge-function fill with a depth test at pixel centres.
    fn fill_triangle(
        &mut self,
        a: (f32, f32, f32),
        b: (f32, f32, f32),
        c: (f32, f32, f32),
        color: u32,
    ) {
        let edge = |p: (f32, f32, f32), q: (f32, f32, f32), x: f32, y: f32| {
            (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
        };
        let area = edge(a, b, c.0, c.1);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = a.0.min(b.0).min(c.0).floor().max(0.0) as usize;
        let min_y = a.1.min(b.1).min(c.1).floor().max(0.0) as usize;
        let max_x = (a.0.max(b.0).max(c.0).ceil() as isize).min(self.width as isize - 1);
        let max_y = (a.1.max(b.1).max(c.1).ceil() as isize).min(self.height as isize - 1);
        if max_x < 0 || max_y < 0 {
            return;
        }

        for y in min_y..=max_y as usize {
            for x in min_x..=max_x as usize {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 < -EDGE_EPS || w1 < -EDGE_EPS || w2 < -EDGE_EPS {
                    continue;
                }
                let z = w0 * a.2 + w1 * b.2 + w2 * c.2;
                let i = y * self.width + x;
                if z < self.depth[i] {
                    self.depth[i] = z;
                    self.pixels[i] = color;
                }
            }
        }
    }

    /// Copy into a surface buffer of possibly different size.
    pub fn blit_to_buffer(&self, buf: &mut [u32], buf_width: usize, buf_height: usize) {
        let copy_w = self.width.min(buf_width);
        let copy_h = self.height.min(buf_height);

        if buf_width > self.width || buf_height > self.height {
            buf.fill(self.background);
        }

        for y in 0..copy_h {
            let src = y * self.width;
            let dst = y * buf_width;
            if dst + copy_w <= buf.len() {
                buf[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
            }
        }
    }
}
