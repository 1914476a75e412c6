//! # Transforms
//!
//! A [`Transform`] holds position, rotation (degrees) and scale and turns them into
//! a model matrix. The local matrix is cached and only rebuilt when one of the three
//! vectors actually changed, so reading it every frame is cheap.
//!
//! The composition order is fixed: translate, then rotate in the configured
//! [`RotationOrder`], then scale. A transform can *follow* another one; the
//! parent's world matrix is then premultiplied on the left.
//!
//! ## Follow graph
//!
//! Parents are referenced by [`TransformId`] inside a [`TransformStore`], never by
//! pointer. [`attach`] is the only way to set a parent and it rejects any link that
//! would make a transform transitively follow itself, so [`world_matrix`] can walk
//! the chain without cycle checks of its own.

use std::fmt;

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

use crate::error::{RenderError, Result};
use crate::math::vector::{Axis, TrackedVector3};

/// Index of a transform inside a [`TransformStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(pub usize);

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Order in which the three axis rotations are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl RotationOrder {
    pub fn axes(self) -> [Axis; 3] {
        match self {
            RotationOrder::Xyz => [Axis::X, Axis::Y, Axis::Z],
            RotationOrder::Xzy => [Axis::X, Axis::Z, Axis::Y],
            RotationOrder::Yxz => [Axis::Y, Axis::X, Axis::Z],
            RotationOrder::Yzx => [Axis::Y, Axis::Z, Axis::X],
            RotationOrder::Zxy => [Axis::Z, Axis::X, Axis::Y],
            RotationOrder::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }
}

/// Wraps an angle in degrees into [0, 360)
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn axis_rotation(axis: Axis, degrees: f32) -> Matrix4<f32> {
    match axis {
        Axis::X => Matrix4::from_angle_x(Deg(degrees)),
        Axis::Y => Matrix4::from_angle_y(Deg(degrees)),
        Axis::Z => Matrix4::from_angle_z(Deg(degrees)),
    }
}

/// Position, rotation and scale of one model
#[derive(Debug, Clone)]
pub struct Transform {
    position: TrackedVector3,
    rotation: TrackedVector3,
    scale: TrackedVector3,
    rotation_order: RotationOrder,
    order_changed: bool,
    follow: Option<TransformId>,

    local: Matrix4<f32>,
    recompute_count: u64,

    world: Matrix4<f32>,
    world_valid: bool,
    world_revision: u64,
    seen_parent_revision: Option<u64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transform: origin, no rotation, unit scale
    pub fn new() -> Self {
        Self {
            position: TrackedVector3::new(0.0, 0.0, 0.0),
            rotation: TrackedVector3::new(0.0, 0.0, 0.0),
            scale: TrackedVector3::new(1.0, 1.0, 1.0),
            rotation_order: RotationOrder::default(),
            order_changed: true,
            follow: None,
            local: Matrix4::identity(),
            recompute_count: 0,
            world: Matrix4::identity(),
            world_valid: false,
            world_revision: 0,
            seen_parent_revision: None,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_position(x, y, z);
        self
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_rotation(x, y, z);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_scale(x, y, z);
        self
    }

    pub fn with_rotation_order(mut self, order: RotationOrder) -> Self {
        self.set_rotation_order(order);
        self
    }

    // Position

    pub fn position(&self) -> Vector3<f32> {
        self.position.get()
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position.set(x, y, z);
    }

    pub fn set_position_vector(&mut self, position: Vector3<f32>) {
        self.position.set_vector(position);
    }

    pub fn set_position_axis(&mut self, axis: Axis, value: f32) {
        self.position.set_axis(axis, value);
    }

    pub fn add_to_position(&mut self, axis: Axis, delta: f32) {
        self.position.add_axis(axis, delta);
    }

    // Rotation, in degrees

    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation.get()
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation.set(x, y, z);
    }

    pub fn set_rotation_axis(&mut self, axis: Axis, degrees: f32) {
        self.rotation.set_axis(axis, degrees);
    }

    /// Adds `delta` degrees around `axis`; the result is wrapped into [0, 360)
    pub fn add_to_rotation(&mut self, axis: Axis, delta: f32) {
        let next = wrap_degrees(self.rotation.axis(axis) + delta);
        self.rotation.set_axis(axis, next);
    }

    pub fn rotation_order(&self) -> RotationOrder {
        self.rotation_order
    }

    pub fn set_rotation_order(&mut self, order: RotationOrder) {
        if self.rotation_order != order {
            self.rotation_order = order;
            self.order_changed = true;
        }
    }

    // Scale

    pub fn scale(&self) -> Vector3<f32> {
        self.scale.get()
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale.set(x, y, z);
    }

    /// Same factor on all three axes
    pub fn set_scale_uniform(&mut self, factor: f32) {
        self.scale.set(factor, factor, factor);
    }

    pub fn set_scale_axis(&mut self, axis: Axis, value: f32) {
        self.scale.set_axis(axis, value);
    }

    pub fn add_to_scale(&mut self, axis: Axis, delta: f32) {
        self.scale.add_axis(axis, delta);
    }

    /// Copies position, rotation, scale and rotation order from `other`
    ///
    /// The follow link is left untouched; use [`attach`] to change it.
    pub fn set_from(&mut self, other: &Transform) {
        self.position.set_vector(other.position());
        self.rotation.set_vector(other.rotation());
        self.scale.set_vector(other.scale());
        self.set_rotation_order(other.rotation_order);
    }

    /// The transform this one follows, if any
    pub fn follow(&self) -> Option<TransformId> {
        self.follow
    }

    pub(crate) fn set_follow(&mut self, parent: Option<TransformId>) {
        self.follow = parent;
        self.world_valid = false;
    }

    /// True when the next [`matrix`](Self::matrix) call will rebuild the matrix
    pub fn is_dirty(&self) -> bool {
        self.order_changed
            || self.position.is_changed()
            || self.rotation.is_changed()
            || self.scale.is_changed()
    }

    /// How many times the local matrix has been rebuilt
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Local model matrix, ignoring any parent
    pub fn matrix(&mut self) -> Matrix4<f32> {
        self.refresh_local();
        self.local
    }

    fn refresh_local(&mut self) -> bool {
        // Non-short-circuiting so every flag is cleared
        let changed = self.position.take_changed()
            | self.rotation.take_changed()
            | self.scale.take_changed()
            | std::mem::replace(&mut self.order_changed, false);
        if !changed {
            return false;
        }

        let rotation = self.rotation.get();
        let mut matrix = Matrix4::from_translation(self.position.get());
        for axis in self.rotation_order.axes() {
            matrix = matrix * axis_rotation(axis, rotation[axis.index()]);
        }
        let scale = self.scale.get();
        matrix = matrix * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);

        self.local = matrix;
        self.recompute_count += 1;
        true
    }

    /// Brings the cached world matrix up to date given the parent's world matrix
    /// and its revision. Returns this transform's world matrix and revision.
    fn resolve_world(&mut self, parent: Option<(Matrix4<f32>, u64)>) -> (Matrix4<f32>, u64) {
        let local_changed = self.refresh_local();
        let parent_revision = parent.map(|(_, revision)| revision);

        if local_changed || !self.world_valid || parent_revision != self.seen_parent_revision {
            self.world = match parent {
                Some((parent_matrix, _)) => parent_matrix * self.local,
                None => self.local,
            };
            self.world_revision += 1;
            self.seen_parent_revision = parent_revision;
            self.world_valid = true;
        }

        (self.world, self.world_revision)
    }
}

/// Anything that owns transforms addressable by [`TransformId`]
pub trait TransformStore {
    fn transform(&self, id: TransformId) -> Option<&Transform>;
    fn transform_mut(&mut self, id: TransformId) -> Option<&mut Transform>;
}

/// Makes `child` follow `parent`, or detaches it when `parent` is `None`.
///
/// Fails with [`RenderError::CyclicTransformGraph`] if `parent` is `child` itself
/// or already (transitively) follows `child`.
pub fn attach<S: TransformStore + ?Sized>(
    store: &mut S,
    child: TransformId,
    parent: Option<TransformId>,
) -> Result<()> {
    if store.transform(child).is_none() {
        return Err(RenderError::UnknownTransform(child));
    }

    if let Some(parent) = parent {
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(RenderError::CyclicTransformGraph(child));
            }
            cursor = store
                .transform(id)
                .ok_or(RenderError::UnknownTransform(id))?
                .follow();
        }
    }

    store
        .transform_mut(child)
        .ok_or(RenderError::UnknownTransform(child))?
        .set_follow(parent);
    Ok(())
}

/// World matrix of `id`: its local matrix premultiplied by every ancestor's.
///
/// Each node in the chain only recomposes when it or an ancestor changed since
/// the last call.
pub fn world_matrix<S: TransformStore + ?Sized>(
    store: &mut S,
    id: TransformId,
) -> Result<Matrix4<f32>> {
    let mut chain = vec![id];
    let mut cursor = store
        .transform(id)
        .ok_or(RenderError::UnknownTransform(id))?
        .follow();
    while let Some(parent) = cursor {
        if chain.contains(&parent) {
            return Err(RenderError::CyclicTransformGraph(id));
        }
        chain.push(parent);
        cursor = store
            .transform(parent)
            .ok_or(RenderError::UnknownTransform(parent))?
            .follow();
    }

    let mut resolved = None;
    for &node in chain.iter().rev() {
        let transform = store
            .transform_mut(node)
            .ok_or(RenderError::UnknownTransform(node))?;
        resolved = Some(transform.resolve_world(resolved));
    }

    resolved
        .map(|(matrix, _)| matrix)
        .ok_or(RenderError::UnknownTransform(id))
}

/// A standalone arena of transforms
#[derive(Debug, Default)]
pub struct TransformTable {
    nodes: Vec<Transform>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transform: Transform) -> TransformId {
        self.nodes.push(transform);
        TransformId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.0)
    }

    pub fn attach(&mut self, child: TransformId, parent: Option<TransformId>) -> Result<()> {
        attach(self, child, parent)
    }

    pub fn world_matrix(&mut self, id: TransformId) -> Result<Matrix4<f32>> {
        world_matrix(self, id)
    }
}

impl TransformStore for TransformTable {
    fn transform(&self, id: TransformId) -> Option<&Transform> {
        self.get(id)
    }

    fn transform_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.get_mut(id)
    }
}
