// src/lib.rs
//! Glade Rendering Engine
//!
//! A lightweight 2D/3D rendering engine built on wgpu and winit. GPU buffers,
//! textures and shaders are versioned against the graphics context, so a lost
//! context is rebuilt lazily on the next frame instead of by hand.
//!
//! The [`Renderer`](gfx::rendering::Renderer) is generic over a
//! [`GraphicsBackend`](gfx::backend::GraphicsBackend): [`WgpuBackend`] draws to a
//! window, [`RecordingBackend`] runs the same scene headless.

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod math;
pub mod motion;
pub mod performance;
pub mod prelude;

// Re-export main types for convenience
pub use app::GladeApp;
pub use error::{RenderError, Result};
pub use gfx::backend::{RecordingBackend, WgpuBackend};

use config::EngineConfig;
use gfx::rendering::Renderer;
use gfx::texture::MemoryAssets;

/// Creates a headless renderer with the built-in shaders registered
///
/// Uses [`RecordingBackend`], in-memory assets and [`EngineConfig::from_env`].
pub fn default_renderer() -> Renderer<RecordingBackend> {
    Renderer::new(RecordingBackend::new(), MemoryAssets::new(), EngineConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::GraphicsBackend;

    #[test]
    fn test_default_renderer_starts_without_context() {
        let renderer = default_renderer();
        assert_eq!(renderer.frame().context_version(), 0);
        assert!(renderer.scene().is_none());
        assert_eq!(renderer.backend().name(), "recording");
    }
}
