//! Frame orchestration
//!
//! [`Renderer`] turns host lifecycle callbacks into scene traversal.
//! [`FrameState`] is the renderer-wide state every drawable reads, and
//! [`DrawContext`] bundles it with the backend and registries for one pass.

pub mod frame;
pub mod renderer;

pub use frame::FrameState;
pub use renderer::Renderer;

use crate::gfx::resources::GpuContext;
use crate::gfx::shader::ShaderManager;
use crate::gfx::texture::TextureManager;

/// Everything a model needs while it is prepared and drawn
pub struct DrawContext<'a> {
    pub gpu: GpuContext<'a>,
    pub shaders: &'a mut ShaderManager,
    pub textures: &'a mut TextureManager,
    pub frame: &'a FrameState,
}
