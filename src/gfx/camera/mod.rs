//! # Camera
//!
//! A look-at camera that turns a surface size into a projection. A
//! [`SizingPolicy`] decides how many world units are visible for the surface's
//! aspect ratio, and the pivot [`Align`](crate::math::Align) decides where the
//! world origin lands on screen.
//!
//! ```
//! use glade::gfx::camera::{Camera, SizingPolicy};
//!
//! let mut camera = Camera::orthographic().with_sizing(SizingPolicy::FixedVertical(6.0));
//! camera.set_viewport(1280, 720);
//! camera.set_projection_matrix();
//! assert_eq!(camera.extents().height, 6.0);
//! ```

pub mod projection;
pub mod sizing;

pub use crate::gfx::backend::Viewport;
pub use projection::{Camera, Projection, DEFAULT_FAR, DEFAULT_NEAR};
pub use sizing::{Extents, SizingPolicy};
