//! Headless backend that records every command.
//!
//! Objects live in hash maps keyed by handle. [`RecordingBackend::lose_context`]
//! drops all of them at once, which lets tests check that resources notice the
//! context version bump and recreate themselves. Compile failures can be injected
//! per program name.

use std::collections::{HashMap, HashSet};

use crate::error::{RenderError, Result};
use crate::gfx::backend::{
    uniforms, AttributeLocation, BlendFunc, BufferHandle, BufferTarget, Capability,
    GraphicsBackend, ProgramHandle, RenderMode, TextureFormat, TextureHandle, TextureUpload,
    UniformLocation, UniformValue, Viewport,
};
use crate::gfx::shader::ShaderSource;
use crate::math::Color;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ResetState,
    ClearColor(Color),
    Viewport(Viewport),
    BeginFrame,
    EndFrame,
    Capability(Capability, bool),
    BlendFunc(BlendFunc),
    CreateBuffer {
        handle: BufferHandle,
        target: BufferTarget,
        size: usize,
    },
    BindBuffer {
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    },
    DeleteBuffer(BufferHandle),
    CompileProgram {
        handle: ProgramHandle,
        name: String,
    },
    UseProgram(ProgramHandle),
    SetUniform {
        location: UniformLocation,
        value: UniformValue,
    },
    VertexAttribBuffer {
        location: AttributeLocation,
        components: u8,
        buffer: BufferHandle,
    },
    VertexAttribClient {
        location: AttributeLocation,
        components: u8,
        len: usize,
    },
    DisableVertexAttribs,
    CreateTexture {
        handle: TextureHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
    },
    BindTexture {
        unit: u32,
        texture: Option<TextureHandle>,
    },
    DeleteTexture(TextureHandle),
    DrawElements {
        program: ProgramHandle,
        mode: RenderMode,
        count: u32,
        client: bool,
    },
}

#[derive(Debug, Clone)]
struct BufferRecord {
    target: BufferTarget,
    size: usize,
}

#[derive(Debug, Clone)]
struct ProgramRecord {
    attributes: Vec<String>,
    uniforms: Vec<String>,
    samplers: Vec<String>,
}

/// In-memory [`GraphicsBackend`]
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    next_handle: u32,
    buffers: HashMap<BufferHandle, BufferRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    textures: HashMap<TextureHandle, (u32, u32)>,
    failing_programs: HashMap<String, String>,
    enabled: HashSet<Capability>,
    bound_array: Option<BufferHandle>,
    bound_elements: Option<BufferHandle>,
    current_program: Option<ProgramHandle>,
    bound_textures: HashMap<u32, TextureHandle>,
    viewport: Viewport,
    blend: Option<BlendFunc>,
    in_frame: bool,
    contexts_lost: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command issued since creation or the last [`clear_commands`](Self::clear_commands)
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Makes the next compile of a program called `name` fail with `log`
    pub fn fail_compilation_of(&mut self, name: impl Into<String>, log: impl Into<String>) {
        self.failing_programs.insert(name.into(), log.into());
    }

    /// Drops every GPU object, as if the context had been destroyed.
    ///
    /// Handles are never reused, so stale ones are detected as invalid.
    pub fn lose_context(&mut self) {
        self.buffers.clear();
        self.programs.clear();
        self.textures.clear();
        self.bound_array = None;
        self.bound_elements = None;
        self.current_program = None;
        self.bound_textures.clear();
        self.enabled.clear();
        self.contexts_lost += 1;
    }

    pub fn contexts_lost(&self) -> u32 {
        self.contexts_lost
    }

    /// Size in bytes of a live buffer
    pub fn buffer_size(&self, handle: BufferHandle) -> Option<usize> {
        self.buffers.get(&handle).map(|b| b.size)
    }

    pub fn is_buffer_live(&self, handle: BufferHandle) -> bool {
        self.buffers.contains_key(&handle)
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn is_texture_live(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).copied()
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn blend(&self) -> Option<BlendFunc> {
        self.blend
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.bound_textures.get(&unit).copied()
    }

    /// Number of recorded commands matching `predicate`
    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    pub fn buffers_created(&self) -> usize {
        self.count(|c| matches!(c, Command::CreateBuffer { .. }))
    }

    pub fn textures_created(&self) -> usize {
        self.count(|c| matches!(c, Command::CreateTexture { .. }))
    }

    pub fn programs_compiled(&self) -> usize {
        self.count(|c| matches!(c, Command::CompileProgram { .. }))
    }

    pub fn draw_calls(&self) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawElements { .. }))
            .collect()
    }

    fn allocate_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn check_program(&self) -> Result<ProgramHandle> {
        let program = self
            .current_program
            .ok_or_else(|| RenderError::InvalidHandle("no program in use".to_string()))?;
        if !self.programs.contains_key(&program) {
            return Err(RenderError::InvalidHandle(program.to_string()));
        }
        Ok(program)
    }
}

impl GraphicsBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn reset_state(&mut self) {
        self.enabled.clear();
        self.enabled.insert(Capability::CullFace);
        self.commands.push(Command::ResetState);
    }

    fn set_clear_color(&mut self, color: Color) {
        self.commands.push(Command::ClearColor(color));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(Command::Viewport(viewport));
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.in_frame {
            return Err(RenderError::Backend("frame already in progress".to_string()));
        }
        self.in_frame = true;
        self.commands.push(Command::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(RenderError::Backend("no frame in progress".to_string()));
        }
        self.in_frame = false;
        self.commands.push(Command::EndFrame);
        Ok(())
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.enabled.insert(capability);
        } else {
            self.enabled.remove(&capability);
        }
        self.commands.push(Command::Capability(capability, enabled));
    }

    fn blend_func(&mut self, func: BlendFunc) {
        self.blend = Some(func);
        self.commands.push(Command::BlendFunc(func));
    }

    fn create_buffer(&mut self, target: BufferTarget, contents: &[u8]) -> Result<BufferHandle> {
        let handle = BufferHandle(self.allocate_handle());
        self.buffers.insert(
            handle,
            BufferRecord {
                target,
                size: contents.len(),
            },
        );
        self.commands.push(Command::CreateBuffer {
            handle,
            target,
            size: contents.len(),
        });
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        match target {
            BufferTarget::Array => self.bound_array = buffer,
            BufferTarget::ElementArray => self.bound_elements = buffer,
        }
        self.commands.push(Command::BindBuffer { target, buffer });
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            return;
        }
        if self.bound_array == Some(buffer) {
            self.bound_array = None;
        }
        if self.bound_elements == Some(buffer) {
            self.bound_elements = None;
        }
        self.commands.push(Command::DeleteBuffer(buffer));
    }

    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramHandle> {
        if let Some(log) = self.failing_programs.get(&*source.name) {
            return Err(RenderError::CompileFailure {
                shader: source.name.to_string(),
                log: log.clone(),
            });
        }
        if source.vertex.trim().is_empty() || source.fragment.trim().is_empty() {
            return Err(RenderError::CompileFailure {
                shader: source.name.to_string(),
                log: "empty shader stage".to_string(),
            });
        }

        let handle = ProgramHandle(self.allocate_handle());
        self.programs.insert(
            handle,
            ProgramRecord {
                attributes: source.attributes.iter().map(|a| a.to_string()).collect(),
                uniforms: source.uniforms.iter().map(|u| u.to_string()).collect(),
                samplers: source.samplers.iter().map(|s| s.to_string()).collect(),
            },
        );
        self.commands.push(Command::CompileProgram {
            handle,
            name: source.name.to_string(),
        });
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        if !self.programs.contains_key(&program) {
            return Err(RenderError::InvalidHandle(program.to_string()));
        }
        self.current_program = Some(program);
        self.commands.push(Command::UseProgram(program));
        Ok(())
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        let record = self.programs.get(&program)?;
        record
            .attributes
            .iter()
            .position(|a| a == name)
            .map(|index| AttributeLocation(index as u32))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let record = self.programs.get(&program)?;
        if let Some(unit) = record.samplers.iter().position(|s| s == name) {
            return Some(uniforms::sampler_location(unit as u32));
        }
        if record.uniforms.iter().any(|u| u == name) {
            return uniforms::value_location(name);
        }
        None
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.commands.push(Command::SetUniform { location, value });
    }

    fn vertex_attrib_buffer(&mut self, location: AttributeLocation, components: u8) -> Result<()> {
        let buffer = self
            .bound_array
            .ok_or_else(|| RenderError::InvalidHandle("no array buffer bound".to_string()))?;
        match self.buffers.get(&buffer) {
            Some(record) if record.target == BufferTarget::Array => {}
            _ => return Err(RenderError::InvalidHandle(buffer.to_string())),
        }
        self.commands.push(Command::VertexAttribBuffer {
            location,
            components,
            buffer,
        });
        Ok(())
    }

    fn vertex_attrib_client(&mut self, location: AttributeLocation, components: u8, data: &[f32]) {
        self.commands.push(Command::VertexAttribClient {
            location,
            components,
            len: data.len(),
        });
    }

    fn disable_vertex_attribs(&mut self) {
        self.commands.push(Command::DisableVertexAttribs);
    }

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<TextureHandle> {
        if upload.width == 0 || upload.height == 0 {
            return Err(RenderError::Backend(format!(
                "texture '{}' has zero size",
                upload.label
            )));
        }
        let handle = TextureHandle(self.allocate_handle());
        self.textures.insert(handle, (upload.width, upload.height));
        self.commands.push(Command::CreateTexture {
            handle,
            width: upload.width,
            height: upload.height,
            format: upload.format,
        });
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) {
        match texture {
            Some(handle) => {
                self.bound_textures.insert(unit, handle);
            }
            None => {
                self.bound_textures.remove(&unit);
            }
        }
        self.commands.push(Command::BindTexture { unit, texture });
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_none() {
            return;
        }
        self.bound_textures.retain(|_, bound| *bound != texture);
        self.commands.push(Command::DeleteTexture(texture));
    }

    fn draw_elements(&mut self, mode: RenderMode, count: u32) -> Result<()> {
        let program = self.check_program()?;
        let elements = self
            .bound_elements
            .ok_or_else(|| RenderError::InvalidHandle("no element buffer bound".to_string()))?;
        let record = self
            .buffers
            .get(&elements)
            .ok_or_else(|| RenderError::InvalidHandle(elements.to_string()))?;
        if record.size < count as usize * std::mem::size_of::<u16>() {
            return Err(RenderError::Backend(format!(
                "{elements} holds {} bytes, draw needs {count} indices",
                record.size
            )));
        }
        self.commands.push(Command::DrawElements {
            program,
            mode,
            count,
            client: false,
        });
        Ok(())
    }

    fn draw_elements_client(&mut self, mode: RenderMode, indices: &[u16]) -> Result<()> {
        let program = self.check_program()?;
        self.commands.push(Command::DrawElements {
            program,
            mode,
            count: indices.len() as u32,
            client: true,
        });
        Ok(())
    }
}
