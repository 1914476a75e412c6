//! # Scene Management Module
//!
//! A [`Scene`] is an ordered list of [`Model`]s plus the [`Camera`] that views
//! them. Insertion order is paint order; there is no depth sorting.
//!
//! ## Key Components
//!
//! - [`Scene`] - owns the models, the camera and an optional motion manager
//! - [`Model`] - geometry, [`ModelState`] and an optional animation
//! - [`SceneScript`] - application hooks run around the scene's lifecycle steps
//!
//! Models address each other by [`ModelId`]. Since the scene is a
//! [`TransformStore`](crate::math::TransformStore) over its models, a `ModelId`
//! also names the model's transform, which is how [`Scene::follow`] builds a
//! hierarchy. [`Scene::remove`] leaves every other id untouched.
//!
//! ## Usage
//!
//! ```rust
//! use glade::gfx::camera::Camera;
//! use glade::gfx::geometry::RectangleBuilder;
//! use glade::gfx::scene::Scene;
//! use glade::math::Color;
//!
//! let mut scene = Scene::new(Camera::orthographic());
//! let body = scene.add(
//!     RectangleBuilder::new().color(Color::WHITE).build().unwrap().into_model("body"),
//! );
//! let head = scene.add(
//!     RectangleBuilder::new().size(0.5, 0.5).build().unwrap().into_model("head"),
//! );
//! scene.follow(head, Some(body)).unwrap();
//! assert!(scene.follow(body, Some(head)).is_err());
//! ```
//!
//! [`Camera`]: crate::gfx::camera::Camera

pub mod model;
#[allow(clippy::module_inception)]
pub mod scene;

pub use crate::gfx::backend::{BlendFunc, RenderMode};
pub use model::{Model, ModelId, ModelState};
pub use scene::{Scene, SceneScript};
