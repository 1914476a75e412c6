//! # Math Primitives
//!
//! Small value types shared by every other module: dirty-tracked vectors, the
//! pivot alignment used by cameras and procedural shapes, colors, and the
//! [`Transform`] that composes a model matrix.

pub mod align;
pub mod color;
pub mod transform;
pub mod vector;

pub use align::{Align, Margins};
pub use color::Color;
pub use transform::{
    attach, world_matrix, RotationOrder, Transform, TransformId, TransformStore, TransformTable,
};
pub use vector::{Axis, TrackedVector3};
