//! # Geometry
//!
//! [`Geometry`] aggregates the buffers of one drawable: positions and indices are
//! mandatory; texture coordinates, normals and colors are optional. Which of the
//! optional ones get wired up at draw time depends on the attributes the bound
//! shader declares, and a shader that wants an attribute the geometry lacks is a
//! [`MissingBuffer`](crate::error::RenderError::MissingBuffer) error.
//!
//! Drawing happens in two phases:
//!
//! - [`prepare`](Geometry::prepare) sets fixed-function state (culling, depth,
//!   blending) and selects the model's shader.
//! - [`draw`](Geometry::draw) pushes shader parameters, binds buffers and issues
//!   the indexed draw, then unbinds everything again.
//!
//! Both device-resident buffers and client-side arrays are supported; the
//! renderer's `vbo_enabled` flag picks one.
//!
//! ## Usage
//!
//! ```rust
//! use glade::gfx::geometry::{generate_cube, Geometry};
//!
//! let mut cube: Geometry = generate_cube().into_geometry().unwrap();
//! cube.set_depth_test(true);
//! ```

pub mod buffer;
pub mod primitives;
pub mod rectangle;

pub use buffer::{BufferElement, GpuBuffer, IndexBuffer, VertexBuffer};
pub use primitives::*;
pub use rectangle::{Rectangle, RectangleBuilder};

use cgmath::Matrix4;

use crate::error::{RenderError, Result};
use crate::gfx::backend::{AttributeLocation, BufferTarget, Capability, GraphicsBackend};
use crate::gfx::camera::Camera;
use crate::gfx::rendering::DrawContext;
use crate::gfx::resources::{GpuContext, VersionedResource};
use crate::gfx::scene::ModelState;

pub const POSITION_COMPONENTS: u8 = 3;
pub const NORMAL_COMPONENTS: u8 = 3;
pub const TEX_COORD_COMPONENTS: u8 = 2;
pub const COLOR_COMPONENTS: u8 = 4;

/// Buffers and fixed-function flags of one drawable
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: VertexBuffer,
    tex_coords: Option<VertexBuffer>,
    normals: Option<VertexBuffer>,
    colors: Option<VertexBuffer>,
    indices: IndexBuffer,

    double_sided: bool,
    depth_test: bool,
    alpha_blending: bool,
}

/// Builds a geometry from flat CPU arrays.
///
/// `positions` holds 3 floats per vertex, `tex_coords` 2, `normals` 3 and
/// `colors` 4. Nothing is allocated or uploaded yet.
pub fn create_geometry(
    positions: Vec<f32>,
    tex_coords: Option<Vec<f32>>,
    normals: Option<Vec<f32>>,
    colors: Option<Vec<f32>>,
    indices: Vec<u16>,
) -> Geometry {
    Geometry {
        positions: VertexBuffer::from_array(positions, POSITION_COMPONENTS),
        tex_coords: tex_coords.map(|a| VertexBuffer::from_array(a, TEX_COORD_COMPONENTS)),
        normals: normals.map(|a| VertexBuffer::from_array(a, NORMAL_COMPONENTS)),
        colors: colors.map(|a| VertexBuffer::from_array(a, COLOR_COMPONENTS)),
        indices: IndexBuffer::from_array(indices, 1),
        double_sided: false,
        depth_test: false,
        alpha_blending: true,
    }
}

impl Geometry {
    pub fn new(positions: Vec<f32>, indices: Vec<u16>) -> Self {
        create_geometry(positions, None, None, None, indices)
    }

    pub fn with_tex_coords(mut self, tex_coords: Vec<f32>) -> Self {
        self.tex_coords = Some(VertexBuffer::from_array(tex_coords, TEX_COORD_COMPONENTS));
        self
    }

    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(VertexBuffer::from_array(normals, NORMAL_COMPONENTS));
        self
    }

    pub fn with_colors(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(VertexBuffer::from_array(colors, COLOR_COMPONENTS));
        self
    }

    pub fn with_double_side(mut self, enabled: bool) -> Self {
        self.double_sided = enabled;
        self
    }

    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn with_alpha_blending(mut self, enabled: bool) -> Self {
        self.alpha_blending = enabled;
        self
    }

    pub fn set_double_side(&mut self, enabled: bool) {
        self.double_sided = enabled;
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    pub fn set_alpha_blending(&mut self, enabled: bool) {
        self.alpha_blending = enabled;
    }

    pub fn is_double_sided(&self) -> bool {
        self.double_sided
    }

    pub fn is_depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn is_alpha_blending_enabled(&self) -> bool {
        self.alpha_blending
    }

    pub fn positions(&self) -> &VertexBuffer {
        &self.positions
    }

    pub fn tex_coords(&self) -> Option<&VertexBuffer> {
        self.tex_coords.as_ref()
    }

    pub fn normals(&self) -> Option<&VertexBuffer> {
        self.normals.as_ref()
    }

    pub fn colors(&self) -> Option<&VertexBuffer> {
        self.colors.as_ref()
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.vertex_count()
    }

    fn vertex_buffers_mut(&mut self) -> impl Iterator<Item = &mut VertexBuffer> {
        std::iter::once(&mut self.positions)
            .chain(self.tex_coords.as_mut())
            .chain(self.normals.as_mut())
            .chain(self.colors.as_mut())
    }

    /// Allocates the staging copy of every buffer
    pub fn allocate_all(&mut self) -> Result<()> {
        for buffer in self.vertex_buffers_mut() {
            buffer.allocate()?;
        }
        self.indices.allocate()
    }

    /// Copies every CPU array into its staging copy
    pub fn put_all_from_inner_arrays(&mut self) -> Result<()> {
        for buffer in self.vertex_buffers_mut() {
            buffer.put_from_inner_array()?;
        }
        self.indices.put_from_inner_array()
    }

    /// Drops the CPU arrays, keeping the staging copies
    pub fn delete_arrays(&mut self) {
        for buffer in self.vertex_buffers_mut() {
            buffer.delete_array();
        }
        self.indices.delete_array();
    }

    /// Allocates and fills every staging copy from the CPU arrays
    pub fn stage(&mut self) -> Result<()> {
        self.allocate_all()?;
        self.put_all_from_inner_arrays()
    }

    /// Uploads every buffer for the current context version
    pub fn init_buffer_objects(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        for buffer in self.vertex_buffers_mut() {
            buffer.init_buffer(gpu)?;
        }
        self.indices.init_buffer(gpu)
    }

    /// Re-uploads buffers whose version is stale
    pub fn ensure_buffers(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        for buffer in self.vertex_buffers_mut() {
            buffer.ensure_current(gpu)?;
        }
        self.indices.ensure_current(gpu)?;
        Ok(())
    }

    /// Unbinds both buffer targets and every attribute slot
    pub fn unbind_all_buffers(backend: &mut dyn GraphicsBackend) {
        backend.bind_buffer(BufferTarget::Array, None);
        backend.bind_buffer(BufferTarget::ElementArray, None);
        backend.disable_vertex_attribs();
    }

    /// Sets culling, depth and blend state and selects the model's shader.
    ///
    /// An invisible model only unbinds buffers.
    pub fn prepare(&mut self, ctx: &mut DrawContext<'_>, state: &ModelState) -> Result<()> {
        if !state.visible {
            Self::unbind_all_buffers(ctx.gpu.backend);
            return Ok(());
        }

        let backend = &mut *ctx.gpu.backend;
        backend.set_capability(Capability::CullFace, !self.double_sided);
        backend.set_capability(Capability::DepthTest, self.depth_test);
        if self.alpha_blending {
            backend.set_capability(Capability::Blend, true);
            backend.blend_func(state.blend.unwrap_or(ctx.frame.default_blend));
        } else {
            backend.set_capability(Capability::Blend, false);
        }

        ctx.shaders.use_shader(&mut ctx.gpu, state.shader)?;
        Ok(())
    }

    /// Pushes shader parameters, wires buffers and issues the indexed draw.
    ///
    /// `model_matrix` is the model's world matrix. Buffers are unbound afterwards
    /// even when the draw fails.
    pub fn draw(
        &mut self,
        ctx: &mut DrawContext<'_>,
        state: &ModelState,
        camera: &Camera,
        model_matrix: Matrix4<f32>,
    ) -> Result<()> {
        if !state.visible {
            Self::unbind_all_buffers(ctx.gpu.backend);
            return Ok(());
        }

        let result = if ctx.frame.vbo_enabled {
            self.draw_device_buffers(ctx, state, camera, model_matrix)
        } else {
            self.draw_client_arrays(ctx, state, camera, model_matrix)
        };
        Self::unbind_all_buffers(ctx.gpu.backend);
        result
    }

    fn draw_device_buffers(
        &mut self,
        ctx: &mut DrawContext<'_>,
        state: &ModelState,
        camera: &Camera,
        model_matrix: Matrix4<f32>,
    ) -> Result<()> {
        self.ensure_buffers(&mut ctx.gpu)?;

        let shader = ctx
            .shaders
            .get(state.shader)
            .ok_or(RenderError::ShaderNotFound(state.shader))?;
        shader.set_params(ctx.gpu.backend, state, camera, model_matrix)?;
        let locations = shader.locations();

        let position = locations.position.ok_or_else(|| no_position(shader.name()))?;
        wire_buffer(ctx.gpu.backend, &self.positions, position)?;

        if let Some(location) = locations.normal {
            wire_buffer(ctx.gpu.backend, required(&self.normals, state, "normal")?, location)?;
        }

        if let Some(location) = locations.tex_coord {
            let tex_coords = required(&self.tex_coords, state, "texture coordinate")?;
            wire_buffer(ctx.gpu.backend, tex_coords, location)?;
            bind_model_texture(ctx, state)?;
        } else {
            ctx.textures.unbind_current(ctx.gpu.backend);
        }

        if let Some(location) = locations.color {
            wire_buffer(ctx.gpu.backend, required(&self.colors, state, "color")?, location)?;
        }

        self.indices.bind(ctx.gpu.backend)?;
        ctx.gpu
            .backend
            .draw_elements(state.render_mode, self.indices.size() as u32)
    }

    fn draw_client_arrays(
        &mut self,
        ctx: &mut DrawContext<'_>,
        state: &ModelState,
        camera: &Camera,
        model_matrix: Matrix4<f32>,
    ) -> Result<()> {
        let shader = ctx
            .shaders
            .get(state.shader)
            .ok_or(RenderError::ShaderNotFound(state.shader))?;
        shader.set_params(ctx.gpu.backend, state, camera, model_matrix)?;
        let locations = shader.locations();

        let position = locations.position.ok_or_else(|| no_position(shader.name()))?;
        wire_client(ctx.gpu.backend, &self.positions, position)?;

        if let Some(location) = locations.normal {
            wire_client(ctx.gpu.backend, required(&self.normals, state, "normal")?, location)?;
        }

        if let Some(location) = locations.tex_coord {
            let tex_coords = required(&self.tex_coords, state, "texture coordinate")?;
            wire_client(ctx.gpu.backend, tex_coords, location)?;
            bind_model_texture(ctx, state)?;
        } else {
            ctx.textures.unbind_current(ctx.gpu.backend);
        }

        if let Some(location) = locations.color {
            wire_client(ctx.gpu.backend, required(&self.colors, state, "color")?, location)?;
        }

        let indices = self
            .indices
            .staging()
            .ok_or(RenderError::ResourceNotInitialized("index buffer"))?;
        ctx.gpu.backend.draw_elements_client(state.render_mode, indices)
    }
}

fn required<'g>(
    buffer: &'g Option<VertexBuffer>,
    state: &ModelState,
    attribute: &'static str,
) -> Result<&'g VertexBuffer> {
    buffer.as_ref().ok_or_else(|| RenderError::MissingBuffer {
        model: state.name.clone(),
        attribute,
    })
}

fn no_position(shader: &str) -> RenderError {
    RenderError::Unsupported(format!("shader '{shader}' declares no position attribute"))
}

fn wire_buffer(
    backend: &mut dyn GraphicsBackend,
    buffer: &VertexBuffer,
    location: AttributeLocation,
) -> Result<()> {
    buffer.bind(backend)?;
    backend.vertex_attrib_buffer(location, buffer.components())
}

fn wire_client(
    backend: &mut dyn GraphicsBackend,
    buffer: &VertexBuffer,
    location: AttributeLocation,
) -> Result<()> {
    let data = buffer
        .staging()
        .ok_or(RenderError::ResourceNotInitialized("vertex buffer"))?;
    backend.vertex_attrib_client(location, buffer.components(), data);
    Ok(())
}

fn bind_model_texture(ctx: &mut DrawContext<'_>, state: &ModelState) -> Result<()> {
    let texture = state.texture.ok_or_else(|| RenderError::MissingTexture {
        model: state.name.clone(),
    })?;
    ctx.textures.bind(&mut ctx.gpu, texture)
}
