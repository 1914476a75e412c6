//! # Glade Prelude
//!
//! Commonly used types and traits in one import:
//!
//! ```rust
//! use glade::prelude::*;
//!
//! let mut scene = Scene::new(Camera::orthographic());
//! let card = RectangleBuilder::new()
//!     .size(1.0, 1.5)
//!     .color(Color::WHITE)
//!     .build()
//!     .unwrap()
//!     .into_model("card")
//!     .with_animation(AxisRotationAnimation::new(90.0, Axis::Z));
//! scene.add(card);
//! assert_eq!(scene.len(), 1);
//! ```

// Application and lifecycle
pub use crate::app::GladeApp;
pub use crate::config::EngineConfig;
pub use crate::default_renderer;
pub use crate::error::{RenderError, Result};
pub use crate::gfx::rendering::{DrawContext, FrameState, Renderer};
pub use crate::logging::{init_logging, LoggingConfig};

// Backends
pub use crate::gfx::backend::{
    BlendFunc, GraphicsBackend, RecordingBackend, RenderMode, WgpuBackend, WgpuBackendOptions,
};

// Scene content
pub use crate::gfx::camera::{Camera, Projection, SizingPolicy};
pub use crate::gfx::geometry::{generate_cube, Geometry, RectangleBuilder, SegmentedPlane};
pub use crate::gfx::scene::{Model, ModelId, ModelState, Scene, SceneScript};
pub use crate::gfx::shader::{BuiltinShader, ShaderKind, ShaderProgram, ShaderVariables};
pub use crate::gfx::texture::{
    AssetLoader, CompressedTexture, DirectoryAssets, MemoryAssets, Multitexture, Texture,
};
pub use crate::math::{Align, Axis, Color, RotationOrder, Transform};

// Animation and input
pub use crate::animation::{
    Animation, AnimationList, AxisMovementAnimation, AxisRotationAnimation, Easing,
    ScalingAnimation, TextureSwitchingAnimation, Transition,
};
pub use crate::motion::{DragBounds, DraggableObject, MotionManager, TouchEvent, TouchPhase};

// Common external dependencies
pub use cgmath::{Matrix4, Vector2, Vector3};
