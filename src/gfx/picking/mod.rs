//! # Ray Picking
//!
//! Turns a point on the surface into a world-space ray and intersects it with the
//! `z = 0` plane, which is where every draggable model in the engine lives.
//!
//! ## How it works
//!
//! 1. **Unproject**: the window point is unprojected twice, at the near clip
//!    plane (depth 0) and at the far clip plane (depth 1), through the inverse of
//!    projection x view.
//! 2. **Ray**: the two world points give the ray origin and direction.
//! 3. **Plane**: the ray is solved for `z = 0`. A ray parallel to the plane has
//!    no intersection and yields `None`.
//!
//! Window coordinates have their origin in the bottom-left corner of the
//! viewport, the way GL reports them. Hosts that deliver top-left coordinates
//! flip `y` first; [`MotionManager`](crate::motion::MotionManager) does this.
//!
//! ## Usage
//!
//! ```rust
//! use glade::gfx::camera::Camera;
//! use glade::gfx::picking::intersect_ray_with_plane;
//!
//! let mut camera = Camera::orthographic();
//! camera.set_viewport(200, 100);
//! camera.set_projection_matrix();
//!
//! let hit = intersect_ray_with_plane(100.0, 50.0, &camera).unwrap();
//! assert!(hit.x.abs() < 1e-4 && hit.y.abs() < 1e-4);
//! ```

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector2, Vector3, Vector4};

use crate::gfx::backend::Viewport;
use crate::gfx::camera::Camera;

/// Directions shorter than this in z count as parallel to the picking plane
const PARALLEL_EPSILON: f32 = 1e-6;

/// Which clip plane a window point is unprojected onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    Near,
    Far,
}

impl ClipPlane {
    /// Window-space depth of the plane
    pub fn depth(self) -> f32 {
        match self {
            ClipPlane::Near => 0.0,
            ClipPlane::Far => 1.0,
        }
    }
}

/// Maps a window point with depth back into world space.
///
/// Returns `None` when `projection * view` is not invertible or the viewport is
/// empty.
pub fn unproject(
    window: Vector3<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    viewport: Viewport,
) -> Option<Vector3<f32>> {
    if viewport.is_empty() {
        return None;
    }
    let inverse = (projection * view).invert()?;

    let ndc = Vector4::new(
        (window.x - viewport.x as f32) / viewport.width as f32 * 2.0 - 1.0,
        (window.y - viewport.y as f32) / viewport.height as f32 * 2.0 - 1.0,
        window.z * 2.0 - 1.0,
        1.0,
    );
    let world = inverse * ndc;
    if world.w == 0.0 {
        return Some(world.truncate());
    }
    Some(world.truncate() / world.w)
}

/// A world-space ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray through a window point, from the near clip plane towards the far one
    pub fn from_window(x: f32, y: f32, camera: &Camera) -> Option<Ray> {
        let at = |plane: ClipPlane| {
            unproject(
                Vector3::new(x, y, plane.depth()),
                camera.view_matrix(),
                camera.projection_matrix(),
                camera.viewport(),
            )
        };
        let near = at(ClipPlane::Near)?;
        let far = at(ClipPlane::Far)?;
        let direction = far - near;
        if direction.magnitude2() == 0.0 {
            return None;
        }
        Some(Ray::new(near, direction))
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Where the ray crosses `z = 0`, or `None` if it runs parallel to it
    pub fn intersect_xy_plane(&self) -> Option<Vector2<f32>> {
        if self.direction.z.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        let hit = self.point_at(t);
        Some(Vector2::new(hit.x, hit.y))
    }
}

/// World point on the `z = 0` plane under the window point `(x, y)`.
///
/// `None` when the camera has no usable projection yet or looks along the plane.
pub fn intersect_ray_with_plane(x: f32, y: f32, camera: &Camera) -> Option<Vector2<f32>> {
    Ray::from_window(x, y, camera)?.intersect_xy_plane()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::SizingPolicy;
    use crate::math::Align;
    use approx::assert_abs_diff_eq;

    fn camera(mut camera: Camera, width: u32, height: u32) -> Camera {
        camera.set_viewport(width, height);
        camera.set_projection_matrix();
        camera.set_view_matrix();
        camera
    }

    #[test]
    fn test_center_tap_hits_origin() {
        for base in [Camera::orthographic(), Camera::perspective()] {
            let cam = camera(base, 1, 1);
            let hit = intersect_ray_with_plane(0.5, 0.5, &cam).unwrap();
            assert_abs_diff_eq!(hit.x, 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(hit.y, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_orthographic_edges() {
        let cam = camera(
            Camera::orthographic().with_sizing(SizingPolicy::FixedHorizontal(10.0)),
            400,
            200,
        );
        let hit = intersect_ray_with_plane(400.0, 200.0, &cam).unwrap();
        assert_abs_diff_eq!(hit.x, 5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.y, 2.5, epsilon = 1e-3);
    }

    #[test]
    fn test_pivot_moves_origin() {
        let cam = camera(Camera::orthographic().with_pivot(Align::LeftBottom), 100, 100);
        let hit = intersect_ray_with_plane(0.0, 0.0, &cam).unwrap();
        assert_abs_diff_eq!(hit.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_parallel_ray_has_no_intersection() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.intersect_xy_plane(), None);
    }

    #[test]
    fn test_camera_looking_along_plane() {
        let mut cam = Camera::orthographic();
        cam.set_position(Vector3::new(0.0, -10.0, 0.0));
        cam.set_up(Vector3::unit_z());
        let cam = camera(cam, 100, 100);
        assert_eq!(intersect_ray_with_plane(50.0, 50.0, &cam), None);
    }

    #[test]
    fn test_empty_viewport_is_not_pickable() {
        let cam = Camera::orthographic();
        assert_eq!(intersect_ray_with_plane(0.0, 0.0, &cam), None);
    }
}
