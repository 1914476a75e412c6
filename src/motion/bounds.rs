use cgmath::{Vector2, Vector3};

use crate::gfx::camera::Camera;
use crate::gfx::picking::intersect_ray_with_plane;
use crate::math::Align;

/// Touch area of a model on the `z = 0` plane
///
/// The pivot alignment decides how the rectangle sits around `position`, the
/// same way it does for [`RectangleBuilder`](crate::gfx::geometry::RectangleBuilder).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingRect {
    pub width: f32,
    pub height: f32,
    pub position: Vector3<f32>,
    pub align: Align,
    last_touch: Option<Vector2<f32>>,
    last_touch_world: Option<Vector2<f32>>,
}

impl BoundingRect {
    pub fn new(width: f32, height: f32, position: Vector3<f32>) -> Self {
        Self {
            width,
            height,
            position,
            align: Align::Center,
            last_touch: None,
            last_touch_world: None,
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Moves in x and y, keeping z
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position.x = x;
        self.position.y = y;
    }

    /// Window coordinates of the last successful hit
    pub fn last_touch(&self) -> Option<Vector2<f32>> {
        self.last_touch
    }

    /// World coordinates of the last successful hit
    pub fn last_touch_world(&self) -> Option<Vector2<f32>> {
        self.last_touch_world
    }

    /// Strict containment of a world point, edges excluded
    pub fn contains(&self, point: Vector2<f32>) -> bool {
        let m = self.align.margins(self.width, self.height);
        point.x > self.position.x - m.left
            && point.x < self.position.x + m.right
            && point.y > self.position.y - m.bottom
            && point.y < self.position.y + m.top
    }

    /// Hit-tests a window point and remembers it on success
    pub fn check_if_touched(&mut self, camera: &Camera, x: f32, y: f32) -> bool {
        let Some(world) = intersect_ray_with_plane(x, y, camera) else {
            return false;
        };
        let touched = self.contains(world);
        if touched {
            self.last_touch = Some(Vector2::new(x, y));
            self.last_touch_world = Some(world);
        }
        touched
    }
}

/// Region a dragged model must stay inside, in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl DragBounds {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Clamps a bare point into the region
    pub fn clamp_point(&self, position: &mut Vector3<f32>) {
        position.x = position.x.max(self.left).min(self.right);
        position.y = position.y.max(self.bottom).min(self.top);
    }

    /// Clamps a rectangle so its edges, not its pivot, respect the region.
    ///
    /// A rectangle wider than the region ends up flush with the right (or top)
    /// bound.
    pub fn move_inside(&self, rect: &mut BoundingRect) {
        let m = rect.align.margins(rect.width, rect.height);
        let p = &mut rect.position;
        if p.x - m.left < self.left {
            p.x = self.left + m.left;
        }
        if p.x + m.right > self.right {
            p.x = self.right - m.right;
        }
        if p.y - m.bottom < self.bottom {
            p.y = self.bottom + m.bottom;
        }
        if p.y + m.top > self.top {
            p.y = self.top - m.top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_honours_pivot() {
        let rect = BoundingRect::new(2.0, 1.0, Vector3::new(0.0, 0.0, 0.0));
        assert!(rect.contains(Vector2::new(0.9, 0.4)));
        assert!(!rect.contains(Vector2::new(1.1, 0.0)));

        let rect = rect.with_align(Align::LeftBottom);
        assert!(rect.contains(Vector2::new(1.9, 0.9)));
        assert!(!rect.contains(Vector2::new(-0.1, 0.5)));
    }

    #[test]
    fn test_move_inside_clamps_edges() {
        let bounds = DragBounds::new(-5.0, 5.0, 3.0, -3.0);
        let mut rect = BoundingRect::new(2.0, 2.0, Vector3::new(10.0, -10.0, 1.0));
        bounds.move_inside(&mut rect);
        assert_eq!(rect.position, Vector3::new(4.0, -2.0, 1.0));

        let mut corner = BoundingRect::new(2.0, 2.0, Vector3::new(-10.0, 10.0, 0.0))
            .with_align(Align::LeftTop);
        bounds.move_inside(&mut corner);
        // left edge at -5, top edge at 3
        assert_eq!(corner.position, Vector3::new(-5.0, 3.0, 0.0));
    }

    #[test]
    fn test_clamp_point() {
        let bounds = DragBounds::new(0.0, 1.0, 1.0, 0.0);
        let mut p = Vector3::new(2.0, -1.0, 7.0);
        bounds.clamp_point(&mut p);
        assert_eq!(p, Vector3::new(1.0, 0.0, 7.0));
    }

    #[test]
    fn test_touch_is_remembered() {
        let mut camera = Camera::orthographic();
        camera.set_viewport(100, 100);
        camera.set_projection_matrix();

        let mut rect = BoundingRect::new(2.0, 2.0, Vector3::new(0.0, 0.0, 0.0));
        assert!(rect.check_if_touched(&camera, 50.0, 50.0));
        assert_eq!(rect.last_touch(), Some(Vector2::new(50.0, 50.0)));
        assert!(rect.last_touch_world().is_some());

        assert!(!rect.check_if_touched(&camera, 0.0, 0.0));
        assert_eq!(rect.last_touch(), Some(Vector2::new(50.0, 50.0)));
    }
}
