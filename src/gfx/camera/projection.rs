use cgmath::*;

use super::sizing::{Extents, SizingPolicy};
use crate::gfx::backend::Viewport;
use crate::math::Align;

pub const DEFAULT_NEAR: f32 = 1.0;
pub const DEFAULT_FAR: f32 = 100.0;

/// Which projection matrix the camera builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Orthographic,
    Perspective,
}

/// Look-at camera with a sizing policy and a pivot alignment
///
/// The projection only changes in [`Camera::set_projection_matrix`], and the view
/// in [`Camera::set_view_matrix`]. Setters record new values and leave the cached
/// matrices alone, so a scene decides when to rebuild them.
#[derive(Debug, Clone)]
pub struct Camera {
    projection: Projection,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pivot: Align,
    sizing: SizingPolicy,
    near: f32,
    far: f32,
    viewport: Viewport,
    aspect_ratio: f32,
    extents: Extents,
    view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            position: Vector3::new(0.0, 0.0, 10.0),
            target: Vector3::zero(),
            up: Vector3::unit_y(),
            pivot: Align::Center,
            sizing: SizingPolicy::default(),
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            viewport: Viewport::default(),
            aspect_ratio: 0.0,
            extents: Extents::ZERO,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
        };
        camera.set_view_matrix();
        camera
    }

    pub fn orthographic() -> Self {
        Self::new(Projection::Orthographic)
    }

    pub fn perspective() -> Self {
        Self::new(Projection::Perspective)
    }

    pub fn with_sizing(mut self, sizing: SizingPolicy) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_pivot(mut self, pivot: Align) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn pivot(&self) -> Align {
        self.pivot
    }

    pub fn set_pivot(&mut self, pivot: Align) {
        self.pivot = pivot;
    }

    pub fn sizing(&self) -> SizingPolicy {
        self.sizing
    }

    pub fn set_sizing(&mut self, sizing: SizingPolicy) {
        self.sizing = sizing;
    }

    pub fn set_horizontal_size(&mut self, width: f32) {
        self.sizing = SizingPolicy::FixedHorizontal(width);
    }

    pub fn set_vertical_size(&mut self, height: f32) {
        self.sizing = SizingPolicy::FixedVertical(height);
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn set_target(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    pub fn set_up(&mut self, up: Vector3<f32>) {
        self.up = up;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Ratio from the last [`Camera::set_projection_matrix`]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Visible world size from the last [`Camera::set_projection_matrix`]
    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// Rebuilds the projection from the viewport, sizing policy and pivot.
    ///
    /// Does nothing while the viewport is empty.
    pub fn set_projection_matrix(&mut self) {
        let Some(aspect_ratio) = self.viewport.aspect_ratio() else {
            return;
        };
        self.aspect_ratio = aspect_ratio;
        self.extents = self.sizing.extents(self.aspect_ratio);

        let m = self.pivot.margins(self.extents.width, self.extents.height);
        let (left, right, bottom, top) = (-m.left, m.right, -m.bottom, m.top);
        self.projection_matrix = match self.projection {
            Projection::Orthographic => ortho(left, right, bottom, top, self.near, self.far),
            Projection::Perspective => frustum(left, right, bottom, top, self.near, self.far),
        };
    }

    pub fn set_view_matrix(&mut self) {
        let eye = Point3::from_vec(self.position);
        let target = Point3::from_vec(self.target);
        self.view_matrix = Matrix4::look_at_rh(eye, target, self.up);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix * self.view_matrix
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::orthographic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clip(camera: &Camera, point: Vector3<f32>) -> Vector3<f32> {
        let p = camera.view_projection_matrix() * point.extend(1.0);
        p.truncate() / p.w
    }

    #[test]
    fn test_ratio_follows_viewport() {
        let mut camera = Camera::orthographic();
        camera.set_viewport(1920, 1080);
        camera.set_projection_matrix();
        assert_relative_eq!(camera.aspect_ratio(), 1920.0 / 1080.0);
        let e = camera.extents();
        assert_relative_eq!(e.width, 10.0);
        assert_relative_eq!(e.width / e.height, camera.aspect_ratio(), max_relative = 1e-5);
    }

    #[test]
    fn test_empty_viewport_keeps_previous_projection() {
        let mut camera = Camera::orthographic();
        camera.set_projection_matrix();
        assert_eq!(camera.projection_matrix(), Matrix4::identity());
        assert_eq!(camera.aspect_ratio(), 0.0);

        camera.set_viewport(800, 600);
        camera.set_projection_matrix();
        let before = camera.projection_matrix();
        camera.set_viewport(0, 600);
        camera.set_projection_matrix();
        assert_eq!(camera.projection_matrix(), before);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let mut camera = Camera::perspective().with_sizing(SizingPolicy::FixedDiagonal(7.0));
        camera.set_viewport(640, 480);
        camera.set_projection_matrix();
        let first = camera.projection_matrix();
        camera.set_projection_matrix();
        assert_eq!(camera.projection_matrix(), first);
    }

    #[test]
    fn test_orthographic_and_perspective_share_extents() {
        for sizing in [
            SizingPolicy::FixedVertical(4.0),
            SizingPolicy::InnerBorder { width: 3.0, height: 3.0 },
        ] {
            let mut ortho_cam = Camera::orthographic().with_sizing(sizing);
            let mut persp_cam = Camera::perspective().with_sizing(sizing);
            for camera in [&mut ortho_cam, &mut persp_cam] {
                camera.set_viewport(300, 500);
                camera.set_projection_matrix();
            }
            assert_eq!(ortho_cam.extents(), persp_cam.extents());
        }
    }

    #[test]
    fn test_center_pivot_puts_target_in_middle() {
        let mut camera = Camera::orthographic();
        camera.set_viewport(400, 200);
        camera.set_projection_matrix();
        let p = clip(&camera, Vector3::zero());
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);

        // Visible width is 10 world units, so x = 5 is the right edge.
        let edge = clip(&camera, Vector3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(edge.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_left_bottom_pivot_puts_origin_in_corner() {
        let mut camera = Camera::orthographic().with_pivot(Align::LeftBottom);
        camera.set_viewport(400, 200);
        camera.set_projection_matrix();
        let p = clip(&camera, Vector3::zero());
        assert_relative_eq!(p.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_setters_leave_view_until_rebuilt() {
        let mut camera = Camera::orthographic();
        let before = camera.view_matrix();
        camera.set_position(Vector3::new(1.0, 2.0, 10.0));
        assert_eq!(camera.view_matrix(), before);
        camera.set_view_matrix();
        assert_ne!(camera.view_matrix(), before);
    }
}
