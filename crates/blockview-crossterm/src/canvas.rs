//! Top-down rasterization of a [`SceneGraph`] into a grid of terminal
//! cells, and the diff between two such grids.

use blockview_core::{Camera, Color, Point, Range, SceneGraph, Vec3};

/// One terminal cell pair (two columns per block).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Texel {
    #[default]
    Blank,
    Block(Color),
}

/// A changed texel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TexelChange {
    pub pos: Point,
    pub texel: Texel,
}

/// Orthographic view of the scene, one texel per grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Canvas {
    texels: Vec<Texel>,
    bounds: Range,
}

impl Canvas {
    pub fn new(width: i32, height: i32) -> Self {
        let bounds = Range::new(0, 0, width.max(0), height.max(0));
        Self {
            texels: vec![Texel::Blank; bounds.len()],
            bounds,
        }
    }

    pub fn bounds(&self) -> Range {
        self.bounds
    }

    pub fn at(&self, p: Point) -> Texel {
        if !self.bounds.contains(p) {
            return Texel::Blank;
        }
        self.texels[(p.y * self.bounds.width() + p.x) as usize]
    }

    fn set(&mut self, p: Point, texel: Texel) {
        if self.bounds.contains(p) {
            let w = self.bounds.width();
            self.texels[(p.y * w + p.x) as usize] = texel;
        }
    }

    /// Redraw from scratch. The camera target lands in the middle of the
    /// canvas; blocks further from the camera are drawn first.
    pub fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        self.texels.fill(Texel::Blank);
        let half_w = self.bounds.width() as f32 / 2.0;
        let half_h = self.bounds.height() as f32 / 2.0;

        let world_to_view = camera.view();
        let mut blocks: Vec<_> = scene
            .iter()
            .map(|(_, obj)| (world_to_view.transform_point3(obj.position), obj))
            .collect();
        // View space looks down -z, so the most negative z is farthest.
        blocks.sort_by(|a, b| a.0.z.total_cmp(&b.0.z));

        for (view, obj) in blocks {
            let p = Point::new(
                (view.x + half_w).round() as i32,
                (half_h - view.y).round() as i32,
            );
            // Spinning cubes dim as they turn edge-on.
            let facing = (obj.orientation() * Vec3::Z).z.abs();
            let shade = 0.55 + 0.45 * facing;
            self.set(p, Texel::Block(obj.material.color.shade(shade)));
        }
    }

    /// Texels that differ from `prev`. A size change yields every texel.
    pub fn diff(&self, prev: &Canvas) -> Vec<TexelChange> {
        self.bounds
            .iter()
            .filter(|&p| prev.bounds != self.bounds || prev.at(p) != self.at(p))
            .map(|pos| TexelChange {
                pos,
                texel: self.at(pos),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockview_core::Material;

    const RED: Material = Material {
        color: Color(0xFF0000),
    };

    #[test]
    fn default_camera_maps_grid_to_canvas() {
        let mut scene = SceneGraph::new();
        scene.add(RED, Vec3::new(3.0, 5.0, 0.0));
        scene.add(RED, Vec3::new(9.0, 19.0, 0.0));
        let mut canvas = Canvas::new(10, 20);

        canvas.render(&scene, &Camera::default());

        assert_eq!(canvas.at(Point::new(3, 5)), Texel::Block(Color(0xFF0000)));
        assert_eq!(canvas.at(Point::new(9, 19)), Texel::Block(Color(0xFF0000)));
        assert_eq!(canvas.at(Point::new(0, 0)), Texel::Blank);
    }

    #[test]
    fn offscreen_blocks_are_clipped() {
        let mut scene = SceneGraph::new();
        scene.add(RED, Vec3::new(-3.0, 25.0, 0.0));
        let mut canvas = Canvas::new(10, 20);
        canvas.render(&scene, &Camera::default());
        assert!(canvas.bounds().iter().all(|p| canvas.at(p) == Texel::Blank));
    }

    #[test]
    fn rotation_dims_block() {
        let mut scene = SceneGraph::new();
        let id = scene.add(RED, Vec3::new(0.0, 0.0, 0.0));
        scene.rotate(id, Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0));
        let mut canvas = Canvas::new(10, 20);
        canvas.render(&scene, &Camera::default());
        assert_eq!(canvas.at(Point::ZERO), Texel::Block(Color(0xFF0000).shade(0.55)));
    }

    #[test]
    fn diff_reports_only_changes() {
        let mut scene = SceneGraph::new();
        let prev = Canvas::new(10, 20);
        let id = scene.add(RED, Vec3::new(4.0, 5.0, 0.0));
        let mut curr = Canvas::new(10, 20);
        curr.render(&scene, &Camera::default());

        let changes = curr.diff(&prev);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].pos, Point::new(4, 5));

        scene.remove(id);
        let mut after = Canvas::new(10, 20);
        after.render(&scene, &Camera::default());
        let changes = after.diff(&curr);
        assert_eq!(changes, vec![TexelChange { pos: Point::new(4, 5), texel: Texel::Blank }]);
    }

    #[test]
    fn resize_redraws_everything() {
        let prev = Canvas::new(2, 2);
        let curr = Canvas::new(3, 2);
        assert_eq!(curr.diff(&prev).len(), 6);
    }
}
