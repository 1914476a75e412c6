//! # Graphics Backend
//!
//! The engine talks to the GPU through [`GraphicsBackend`], a small immediate-mode
//! command surface shaped after classic GL: create and bind buffers, compile
//! programs and query their attribute/uniform locations, toggle a handful of
//! capabilities, issue indexed draws.
//!
//! All GPU objects are referred to by opaque handles. A handle is only meaningful
//! in the context that created it; after a context loss the engine bumps its
//! context version and every resource recreates its handle on next use.
//!
//! Two implementations ship with the crate:
//!
//! - [`WgpuBackend`](wgpu_backend::WgpuBackend) renders through wgpu onto a window surface.
//! - [`RecordingBackend`] keeps everything in memory and records each command,
//!   which is what the test suite and headless hosts use.

pub mod recording;
pub mod wgpu_backend;

use std::fmt;

use crate::error::Result;
use crate::gfx::shader::ShaderSource;
use crate::gfx::texture::pkm::EtcFormat;
use crate::math::Color;

pub use recording::{Command, RecordingBackend};
pub use wgpu_backend::{WgpuBackend, WgpuBackendOptions};

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

handle_type!(
    /// GPU buffer object
    BufferHandle,
    "buffer:"
);
handle_type!(
    /// Linked GPU program
    ProgramHandle,
    "program:"
);
handle_type!(
    /// GPU texture object
    TextureHandle,
    "texture:"
);

/// Slot a vertex attribute is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeLocation(pub u32);

/// Slot a uniform value is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// Binding point for [`GraphicsBackend::bind_buffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data (`f32`)
    Array,
    /// Index data (`u16`)
    ElementArray,
}

/// Fixed-function state toggled per draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CullFace,
    DepthTest,
    Blend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Source and destination factors of the blend equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }

    /// Classic "over" compositing
    pub const ALPHA: BlendFunc = BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

    /// Additive blending
    pub const ADDITIVE: BlendFunc = BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::One);
}

/// Primitive assembly mode for indexed draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    #[default]
    Triangles,
    TriangleStrip,
    Lines,
    LineStrip,
    Points,
}

/// Value written by [`GraphicsBackend::set_uniform`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix
    Mat4([[f32; 4]; 4]),
    /// Texture unit a sampler reads from
    Sampler(u32),
}

/// Rectangle of the surface that draws land in, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width as f32 / self.height as f32)
    }
}

/// Pixel layout of texture data handed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, tightly packed rows
    Rgba8,
    /// ETC1/ETC2/EAC block-compressed payload
    Compressed(EtcFormat),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Everything needed to create one texture
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: &'a [u8],
    pub mipmaps: bool,
    pub wrap: TextureWrap,
}

/// Well-known uniform names and the locations both backends assign to them
pub mod uniforms {
    use super::UniformLocation;

    pub const MVP_MATRIX: &str = "u_MVPMatrix";
    pub const ALPHA: &str = "u_Alpha";
    pub const MIX_MODIFIER: &str = "u_MixModifier";

    /// Samplers are addressed by texture unit, starting at this location
    pub const SAMPLER_BASE: u32 = 16;

    /// Location of a value uniform, `None` for names outside the shared block
    pub fn value_location(name: &str) -> Option<UniformLocation> {
        match name {
            MVP_MATRIX => Some(UniformLocation(0)),
            ALPHA => Some(UniformLocation(1)),
            MIX_MODIFIER => Some(UniformLocation(2)),
            _ => None,
        }
    }

    pub fn sampler_location(unit: u32) -> UniformLocation {
        UniformLocation(SAMPLER_BASE + unit)
    }
}

/// Immediate-mode GPU command surface
///
/// Implementations keep GL-like "currently bound" state: the bound program,
/// the bound array and element buffers, the enabled capabilities and the
/// textures bound to each unit. Draw calls consume that state.
pub trait GraphicsBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Restores default fixed-function state after a context is created:
    /// counter-clockwise front faces, back-face culling, depth test off.
    fn reset_state(&mut self);

    fn set_clear_color(&mut self, color: Color);

    fn set_viewport(&mut self, viewport: Viewport);

    /// Starts a frame and clears color and depth
    fn begin_frame(&mut self) -> Result<()>;

    /// Finishes the frame and presents it
    fn end_frame(&mut self) -> Result<()>;

    fn set_capability(&mut self, capability: Capability, enabled: bool);

    fn blend_func(&mut self, func: BlendFunc);

    /// Creates a buffer initialized with `contents`
    fn create_buffer(&mut self, target: BufferTarget, contents: &[u8]) -> Result<BufferHandle>;

    /// Binds `buffer` to `target`, or unbinds it with `None`
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);

    /// Releases a buffer. Unknown handles are ignored.
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Compiles and links a program.
    ///
    /// Fails with [`RenderError::CompileFailure`](crate::error::RenderError::CompileFailure)
    /// carrying the backend's log.
    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramHandle>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<()>;

    /// Location of a vertex attribute, `None` if the program does not declare it
    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation>;

    /// Location of a uniform, `None` if the program does not declare it
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Writes a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Wires the currently bound array buffer to an attribute slot
    fn vertex_attrib_buffer(&mut self, location: AttributeLocation, components: u8) -> Result<()>;

    /// Wires client-side data to an attribute slot
    fn vertex_attrib_client(&mut self, location: AttributeLocation, components: u8, data: &[f32]);

    /// Disconnects every attribute slot
    fn disable_vertex_attribs(&mut self);

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<TextureHandle>;

    /// Releases a texture and clears any unit it is bound to. Unknown handles
    /// are ignored.
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Binds `texture` to `unit`, or clears the unit with `None`
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>);

    /// Indexed draw reading `count` indices from the bound element buffer
    fn draw_elements(&mut self, mode: RenderMode, count: u32) -> Result<()>;

    /// Indexed draw reading indices from client memory
    fn draw_elements_client(&mut self, mode: RenderMode, indices: &[u16]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        assert_eq!(Viewport::new(200, 100).aspect_ratio(), Some(2.0));
        assert_eq!(Viewport::new(0, 100).aspect_ratio(), None);
        assert!(Viewport::default().is_empty());
    }

    #[test]
    fn test_uniform_locations_are_distinct() {
        let names = [uniforms::MVP_MATRIX, uniforms::ALPHA, uniforms::MIX_MODIFIER];
        let mut locations: Vec<_> = names
            .iter()
            .filter_map(|n| uniforms::value_location(n))
            .collect();
        locations.push(uniforms::sampler_location(0));
        locations.sort();
        locations.dedup();
        assert_eq!(locations.len(), 4);
        assert_eq!(uniforms::value_location("u_Unknown"), None);
    }
}
