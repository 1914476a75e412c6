//! # Graphics Module
//!
//! Everything between a [`Scene`](scene::Scene) and the GPU.
//!
//! ## Architecture Overview
//!
//! - **Backend** ([`backend`]) - the [`GraphicsBackend`](backend::GraphicsBackend)
//!   command surface plus its wgpu and recording implementations
//! - **Resources** ([`resources`]) - context versioning and id registries
//! - **Geometry** ([`geometry`]) - vertex/index buffers and procedural shapes
//! - **Shaders and textures** ([`shader`], [`texture`]) - registries of lazily
//!   created GPU programs and images
//! - **Camera** ([`camera`]) - projection, sizing policies and pivot
//! - **Scene** ([`scene`]) - models drawn in insertion order
//! - **Rendering** ([`rendering`]) - the [`Renderer`](rendering::Renderer) lifecycle
//! - **Picking** ([`picking`]) - window coordinates to world rays
//!
//! ## Usage
//!
//! ```rust
//! use glade::gfx::camera::Camera;
//! use glade::gfx::scene::Scene;
//!
//! let mut renderer = glade::default_renderer();
//! renderer.set_scene(Scene::new(Camera::orthographic())).unwrap();
//! renderer.on_context_created().unwrap();
//! renderer.on_surface_resized(640, 480);
//! renderer.on_tick_at(0).unwrap();
//! ```

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod shader;
pub mod texture;

// Re-export commonly used types
pub use rendering::Renderer;
