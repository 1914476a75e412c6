use std::fmt;

use cgmath::{Matrix4, SquareMatrix, Vector3};

use super::bounds::{BoundingRect, DragBounds};
use super::MotionContext;
use crate::gfx::geometry::Rectangle;
use crate::gfx::picking::intersect_ray_with_plane;
use crate::math::{self, TransformId};

/// Something a pointer can grab
///
/// Coordinates are window coordinates with the origin in the bottom-left corner.
pub trait Motionable: fmt::Debug {
    /// Hit test on pointer down; returning true grabs the item
    fn check_if_touched(&mut self, ctx: &mut MotionContext<'_>, x: f32, y: f32) -> bool;

    /// Pointer moved while the item is grabbed
    fn on_touch(&mut self, ctx: &mut MotionContext<'_>, x: f32, y: f32);

    /// Pointer released or cancelled
    fn on_end_touch(&mut self, ctx: &mut MotionContext<'_>, x: f32, y: f32);
}

/// Drags a model's transform around the `z = 0` plane
///
/// Hit testing, dragging and [`DragBounds`] all work in world space. For a model
/// that follows another transform, the dragged world position is mapped back
/// through the parent's world matrix before it is written to the model.
#[derive(Debug, Clone)]
pub struct DraggableObject {
    model: TransformId,
    bounds: BoundingRect,
    drag_bounds: Option<DragBounds>,
    dragging: bool,
    initial_position: Vector3<f32>,
    /// World to parent space while dragging a following model
    parent_inverse: Option<Matrix4<f32>>,
}

impl DraggableObject {
    pub fn new(model: impl Into<TransformId>, bounds: BoundingRect) -> Self {
        Self {
            model: model.into(),
            initial_position: bounds.position,
            bounds,
            drag_bounds: None,
            dragging: false,
            parent_inverse: None,
        }
    }

    /// Touch area taken from a rectangle's size and pivot
    pub fn for_rectangle(model: impl Into<TransformId>, rectangle: &Rectangle) -> Self {
        let bounds = BoundingRect::new(rectangle.width, rectangle.height, Vector3::new(0.0, 0.0, 0.0))
            .with_align(rectangle.align);
        Self::new(model, bounds)
    }

    pub fn with_drag_bounds(mut self, drag_bounds: DragBounds) -> Self {
        self.drag_bounds = Some(drag_bounds);
        self
    }

    pub fn model(&self) -> TransformId {
        self.model
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn bounds(&self) -> &BoundingRect {
        &self.bounds
    }

    /// World position of the model plus the inverse of its parent's world matrix
    fn world_position(
        &self,
        ctx: &mut MotionContext<'_>,
    ) -> Option<(Vector3<f32>, Option<Matrix4<f32>>)> {
        let transform = ctx.transforms.transform(self.model)?;
        let local = transform.position();
        let Some(parent) = transform.follow() else {
            return Some((local, None));
        };
        let parent_world = match math::world_matrix(&mut *ctx.transforms, parent) {
            Ok(matrix) => matrix,
            Err(err) => {
                log::warn!("cannot place draggable {}: {}", self.model, err);
                return None;
            }
        };
        let world = (parent_world * local.extend(1.0)).truncate();
        Some((world, parent_world.invert()))
    }
}

impl Motionable for DraggableObject {
    fn check_if_touched(&mut self, ctx: &mut MotionContext<'_>, x: f32, y: f32) -> bool {
        let Some((position, parent_inverse)) = self.world_position(ctx) else {
            log::warn!("draggable refers to missing transform {}", self.model);
            return false;
        };
        self.bounds.position = position;

        self.dragging = self.bounds.check_if_touched(ctx.camera, x, y);
        if self.dragging {
            self.initial_position = position;
            self.parent_inverse = parent_inverse;
        }
        self.dragging
    }

    fn on_touch(&mut self, ctx: &mut MotionContext<'_>, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        let (Some(current), Some(first)) = (
            intersect_ray_with_plane(x, y, ctx.camera),
            self.bounds.last_touch_world(),
        ) else {
            return;
        };

        let delta = current - first;
        self.bounds.set_position(
            self.initial_position.x + delta.x,
            self.initial_position.y + delta.y,
        );
        if let Some(drag_bounds) = &self.drag_bounds {
            drag_bounds.move_inside(&mut self.bounds);
        }

        let local = match self.parent_inverse {
            Some(inverse) => (inverse * self.bounds.position.extend(1.0)).truncate(),
            None => self.bounds.position,
        };
        if let Some(transform) = ctx.transforms.transform_mut(self.model) {
            transform.set_position_vector(local);
        }
    }

    fn on_end_touch(&mut self, _ctx: &mut MotionContext<'_>, _x: f32, _y: f32) {
        self.dragging = false;
        self.parent_inverse = None;
    }
}
