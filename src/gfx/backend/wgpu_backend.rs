//! wgpu implementation of [`GraphicsBackend`]
//!
//! wgpu has no notion of "currently bound" state, so this backend keeps a GL-like
//! state block of its own. Every draw call snapshots that state: it resolves a
//! render pipeline for the combination of program, topology, culling, depth,
//! blending and vertex layout (cached across frames), stages the draw's uniforms
//! into one dynamic uniform buffer and records the buffers and textures it reads.
//! `end_frame` encodes all recorded draws into a single render pass and presents.
//!
//! Bind group layout shared by every program:
//!
//! - group 0, binding 0: the `DrawUniforms` block (MVP matrix, alpha, mix),
//!   addressed with a dynamic offset per draw
//! - group 1: texture unit N at binding 2N (texture) and 2N + 1 (sampler)
//!
//! Matrices arrive in GL clip space and are corrected to wgpu's `[0, 1]` depth
//! range when the MVP uniform is written. Texture units a program samples but
//! nothing is bound to read a 1x1 white texture.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cgmath::Matrix4;
use log::{debug, error, info, warn};
use wgpu::util::DeviceExt;

use super::{
    uniforms, AttributeLocation, BlendFactor, BlendFunc, BufferHandle, BufferTarget, Capability,
    GraphicsBackend, ProgramHandle, RenderMode, TextureFormat, TextureHandle, TextureUpload,
    TextureWrap, UniformLocation, UniformValue, Viewport,
};
use crate::error::{RenderError, Result};
use crate::gfx::shader::ShaderSource;
use crate::gfx::texture::pkm::EtcFormat;
use crate::math::Color;

/// Converts GL clip space (z in `[-1, 1]`) to wgpu clip space (z in `[0, 1]`)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

/// Texture units addressable by one program
pub const MAX_TEXTURE_UNITS: usize = 4;

/// Per-draw uniform block, laid out as `DrawUniforms` in `common.wgsl`
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniforms {
    mvp: [[f32; 4]; 4],
    /// x: alpha, y: mix modifier
    params: [f32; 4],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            mvp: Matrix4::<f32>::from_scale(1.0).into(),
            params: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

const DRAW_UNIFORMS_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;

/// Settings for [`WgpuBackend::new`]
#[derive(Debug, Clone)]
pub struct WgpuBackendOptions {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    pub present_mode: wgpu::PresentMode,
    pub max_texture_dimension: u32,
    /// Requests ETC2/EAC sampling when the adapter offers it
    pub compressed_textures: bool,
}

impl Default for WgpuBackendOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::default(),
            present_mode: wgpu::PresentMode::AutoVsync,
            max_texture_dimension: 4096,
            compressed_textures: true,
        }
    }
}

impl WgpuBackendOptions {
    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    pub fn with_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }

    pub fn with_max_texture_dimension(mut self, dimension: u32) -> Self {
        self.max_texture_dimension = dimension;
        self
    }

    pub fn with_compressed_textures(mut self, enabled: bool) -> Self {
        self.compressed_textures = enabled;
        self
    }
}

/// Depth attachment matching the surface size
struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

struct Program {
    label: String,
    module: wgpu::ShaderModule,
    attributes: Vec<String>,
    uniforms: Vec<String>,
    samplers: Vec<String>,
}

struct SampledTexture {
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Vertex data wired to one attribute slot
#[derive(Clone)]
struct VertexInput {
    components: u8,
    buffer: wgpu::Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    mode: RenderMode,
    cull: bool,
    depth_test: bool,
    blend: Option<BlendFunc>,
    /// (shader location, components) for every wired attribute, ordered by location
    layout: Vec<(u32, u8)>,
}

/// GL-style "currently bound" state
struct BoundState {
    program: Option<ProgramHandle>,
    enabled: HashSet<Capability>,
    blend: BlendFunc,
    viewport: Viewport,
    array_buffer: Option<BufferHandle>,
    element_buffer: Option<BufferHandle>,
    attributes: BTreeMap<u32, VertexInput>,
    textures: BTreeMap<u32, TextureHandle>,
    uniforms: DrawUniforms,
}

impl Default for BoundState {
    fn default() -> Self {
        Self {
            program: None,
            enabled: HashSet::from([Capability::CullFace]),
            blend: BlendFunc::ALPHA,
            viewport: Viewport::default(),
            array_buffer: None,
            element_buffer: None,
            attributes: BTreeMap::new(),
            textures: BTreeMap::new(),
            uniforms: DrawUniforms::default(),
        }
    }
}

/// One draw, resolved against the state at the time it was issued
struct RecordedDraw {
    pipeline: wgpu::RenderPipeline,
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_offset: u32,
    textures: Option<wgpu::BindGroup>,
    viewport: Viewport,
}

/// Growable uniform buffer addressed with dynamic offsets
struct UniformArena {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u64,
    stride: u64,
    staged: Vec<u8>,
}

impl UniformArena {
    const INITIAL_DRAWS: u64 = 64;

    fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DRAW_UNIFORMS_SIZE),
                },
                count: None,
            }],
        });
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_up(DRAW_UNIFORMS_SIZE, alignment);
        let capacity = stride * Self::INITIAL_DRAWS;
        let (buffer, bind_group) = Self::allocate(device, &layout, capacity);
        Self {
            layout,
            buffer,
            bind_group,
            capacity,
            stride,
            staged: Vec::new(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(DRAW_UNIFORMS_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Appends one block and returns its offset
    fn push(&mut self, uniforms: &DrawUniforms) -> u32 {
        let offset = self.staged.len();
        self.staged.extend_from_slice(bytemuck::bytes_of(uniforms));
        self.staged.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    /// Uploads everything staged this frame, growing the buffer if needed
    fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let needed = self.staged.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            let (buffer, bind_group) = Self::allocate(device, &self.layout, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            debug!("Grew draw uniform buffer to {} bytes", self.capacity);
        }
        if !self.staged.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staged);
        }
    }

    fn clear(&mut self) {
        self.staged.clear();
    }
}

/// Renders through wgpu onto a window surface
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
    etc2_supported: bool,
    device_lost: Arc<AtomicBool>,

    clear_color: wgpu::Color,
    state: BoundState,
    next_handle: u32,
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    programs: HashMap<ProgramHandle, Program>,
    textures: HashMap<TextureHandle, SampledTexture>,
    white: SampledTexture,

    uniforms: UniformArena,
    texture_layouts: HashMap<usize, wgpu::BindGroupLayout>,
    pipeline_layouts: HashMap<usize, wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    texture_groups: HashMap<(usize, Vec<Option<TextureHandle>>), wgpu::BindGroup>,

    frame: Option<wgpu::SurfaceTexture>,
    draws: Vec<RecordedDraw>,
}

impl WgpuBackend {
    /// Creates a device for `window` and configures its surface.
    ///
    /// Fails with [`RenderError::Backend`] when no adapter or device is available.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: WgpuBackendOptions,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Backend(format!("cannot create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: options.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Backend(format!("no suitable adapter: {e}")))?;

        let etc2_supported = options.compressed_textures
            && adapter
                .features()
                .contains(wgpu::Features::TEXTURE_COMPRESSION_ETC2);
        let required_features = if etc2_supported {
            wgpu::Features::TEXTURE_COMPRESSION_ETC2
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("glade device"),
                required_features,
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: options.max_texture_dimension,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::Backend(format!("cannot create device: {e}")))?;

        device.on_uncaptured_error(Box::new(|err| {
            error!("Uncaptured wgpu error: {}", err);
        }));
        let device_lost = Arc::new(AtomicBool::new(false));
        {
            let device_lost = device_lost.clone();
            device.set_device_lost_callback(move |reason, message| {
                warn!("Device lost ({:?}): {}", reason, message);
                device_lost.store(true, Ordering::SeqCst);
            });
        }

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| RenderError::Backend("surface reports no formats".to_string()))?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: options.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        info!(
            "wgpu backend on {} ({:?}), surface {:?}, ETC2 {}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            if etc2_supported { "available" } else { "unavailable" }
        );

        let depth = DepthTarget::new(&device, &config);
        let white = Self::create_white_texture(&device, &queue);
        let uniforms = UniformArena::new(&device);

        Ok(Self {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            depth,
            etc2_supported,
            device_lost,
            clear_color: wgpu::Color::BLACK,
            state: BoundState::default(),
            next_handle: 1,
            buffers: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            white,
            uniforms,
            texture_layouts: HashMap::new(),
            pipeline_layouts: HashMap::new(),
            pipelines: HashMap::new(),
            texture_groups: HashMap::new(),
            frame: None,
            draws: Vec::new(),
        })
    }

    /// [`new`](Self::new), blocking on the current thread
    pub fn new_blocking(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: WgpuBackendOptions,
    ) -> Result<Self> {
        pollster::block_on(Self::new(window, width, height, options))
    }

    /// Reconfigures the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthTarget::new(&self.device, &self.config);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// True once the device is gone; the host should build a new backend
    pub fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::SeqCst)
    }

    pub fn supports_compressed_textures(&self) -> bool {
        self.etc2_supported
    }

    /// Number of cached render pipelines
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn create_white_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> SampledTexture {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("white_fallback"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &[255, 255, 255, 255],
        );
        SampledTexture {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler: device.create_sampler(&wgpu::SamplerDescriptor::default()),
        }
    }

    /// Runs `f` inside a validation error scope
    fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        let device: &wgpu::Device = &self.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(device);
        let err = pollster::block_on(device.pop_error_scope());
        (value, err)
    }

    fn texture_layout(&mut self, units: usize) -> &wgpu::BindGroupLayout {
        let device = &self.device;
        self.texture_layouts.entry(units).or_insert_with(|| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..units as u32)
                .flat_map(|unit| {
                    [
                        wgpu::BindGroupLayoutEntry {
                            binding: unit * 2,
                            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                multisampled: false,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: unit * 2 + 1,
                            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ]
                })
                .collect();
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Units Layout"),
                entries: &entries,
            })
        })
    }

    fn pipeline_layout(&mut self, units: usize) -> wgpu::PipelineLayout {
        if let Some(layout) = self.pipeline_layouts.get(&units) {
            return layout.clone();
        }
        let texture_layout = (units > 0).then(|| self.texture_layout(units).clone());
        let mut groups = vec![&self.uniforms.layout];
        if let Some(texture_layout) = &texture_layout {
            groups.push(texture_layout);
        }
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("glade pipeline layout"),
                bind_group_layouts: &groups,
                push_constant_ranges: &[],
            });
        self.pipeline_layouts.insert(units, layout.clone());
        layout
    }

    fn pipeline(&mut self, key: &PipelineKey) -> Result<wgpu::RenderPipeline> {
        if let Some(pipeline) = self.pipelines.get(key) {
            return Ok(pipeline.clone());
        }
        let program = self
            .programs
            .get(&key.program)
            .ok_or_else(|| RenderError::InvalidHandle(key.program.to_string()))?;
        let units = program.samplers.len();
        let label = format!("{} pipeline", program.label);
        let module = program.module.clone();
        let layout = self.pipeline_layout(units);

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .layout
            .iter()
            .map(|&(location, components)| {
                [wgpu::VertexAttribute {
                    format: vertex_format(components),
                    offset: 0,
                    shader_location: location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout> = key
            .layout
            .iter()
            .zip(&attributes)
            .map(|(&(_, components), attribute)| wgpu::VertexBufferLayout {
                array_stride: components as u64 * 4,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attribute,
            })
            .collect();

        let topology = topology(key.mode);
        let strip_index_format = matches!(
            topology,
            wgpu::PrimitiveTopology::TriangleStrip | wgpu::PrimitiveTopology::LineStrip
        )
        .then_some(wgpu::IndexFormat::Uint16);

        let targets = [Some(wgpu::ColorTargetState {
            format: self.config.format,
            blend: key.blend.map(blend_state),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let (pipeline, err) = self.validated(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label.as_str()),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: key.cull.then_some(wgpu::Face::Back),
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTarget::FORMAT,
                    depth_write_enabled: key.depth_test,
                    depth_compare: if key.depth_test {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &targets,
                }),
                multiview: None,
                cache: None,
            })
        });
        if let Some(err) = err {
            return Err(RenderError::Backend(format!("{label}: {err}")));
        }

        debug!("Created {} ({:?}, {} attributes)", label, key.mode, key.layout.len());
        self.pipelines.insert(key.clone(), pipeline.clone());
        Ok(pipeline)
    }

    fn texture_group(&mut self, units: usize) -> wgpu::BindGroup {
        let bound: Vec<Option<TextureHandle>> = (0..units as u32)
            .map(|unit| {
                self.state
                    .textures
                    .get(&unit)
                    .copied()
                    .filter(|handle| self.textures.contains_key(handle))
            })
            .collect();
        let key = (units, bound);
        if let Some(group) = self.texture_groups.get(&key) {
            return group.clone();
        }

        let layout = self.texture_layout(units).clone();
        let sources: Vec<&SampledTexture> = key
            .1
            .iter()
            .map(|handle| {
                handle
                    .and_then(|handle| self.textures.get(&handle))
                    .unwrap_or(&self.white)
            })
            .collect();
        let entries: Vec<wgpu::BindGroupEntry> = sources
            .iter()
            .enumerate()
            .flat_map(|(unit, texture)| {
                [
                    wgpu::BindGroupEntry {
                        binding: unit as u32 * 2,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: unit as u32 * 2 + 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ]
            })
            .collect();
        let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Units"),
            layout: &layout,
            entries: &entries,
        });
        self.texture_groups.insert(key, group.clone());
        group
    }

    fn record_draw(&mut self, mode: RenderMode, index_buffer: wgpu::Buffer, count: u32) -> Result<()> {
        if self.frame.is_none() {
            return Err(RenderError::Backend("draw outside of a frame".to_string()));
        }
        let program = self
            .state
            .program
            .ok_or(RenderError::ResourceNotInitialized("program"))?;
        let units = self
            .programs
            .get(&program)
            .map(|p| p.samplers.len())
            .ok_or_else(|| RenderError::InvalidHandle(program.to_string()))?;

        let blending = self.state.enabled.contains(&Capability::Blend);
        let key = PipelineKey {
            program,
            mode,
            cull: self.state.enabled.contains(&Capability::CullFace),
            depth_test: self.state.enabled.contains(&Capability::DepthTest),
            blend: blending.then_some(self.state.blend),
            layout: self
                .state
                .attributes
                .iter()
                .map(|(&location, input)| (location, input.components))
                .collect(),
        };
        let pipeline = self.pipeline(&key)?;
        let textures = (units > 0).then(|| self.texture_group(units));
        let uniform_offset = self.uniforms.push(&self.state.uniforms);

        self.draws.push(RecordedDraw {
            pipeline,
            vertex_buffers: self
                .state
                .attributes
                .values()
                .map(|input| input.buffer.clone())
                .collect(),
            index_buffer,
            index_count: count,
            uniform_offset,
            textures,
            viewport: self.state.viewport,
        });
        Ok(())
    }

    /// GL viewport (origin bottom-left) to a pass viewport (origin top-left),
    /// clipped to the surface
    fn pass_viewport(&self, viewport: Viewport) -> Option<[f32; 4]> {
        let surface_w = self.config.width as i64;
        let surface_h = self.config.height as i64;
        if viewport.is_empty() {
            return Some([0.0, 0.0, surface_w as f32, surface_h as f32]);
        }
        let left = (viewport.x as i64).clamp(0, surface_w);
        let right = (viewport.x as i64 + viewport.width as i64).clamp(0, surface_w);
        let top = (surface_h - viewport.y as i64 - viewport.height as i64).clamp(0, surface_h);
        let bottom = (surface_h - viewport.y as i64).clamp(0, surface_h);
        (right > left && bottom > top).then(|| {
            [
                left as f32,
                top as f32,
                (right - left) as f32,
                (bottom - top) as f32,
            ]
        })
    }

    fn upload_rgba(&mut self, upload: &TextureUpload<'_>) -> Result<wgpu::Texture> {
        let expected = upload.width as usize * upload.height as usize * 4;
        if upload.data.len() < expected {
            return Err(RenderError::Backend(format!(
                "texture '{}' has {} bytes, expected {}",
                upload.label,
                upload.data.len(),
                expected
            )));
        }

        let levels = if upload.mipmaps {
            mip_chain(upload.width, upload.height, &upload.data[..expected])
        } else {
            vec![(upload.width, upload.height, upload.data[..expected].to_vec())]
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(upload.label),
            size: wgpu::Extent3d {
                width: upload.width,
                height: upload.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (level, (width, height, pixels)) in levels.iter().enumerate() {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(*height),
                },
                wgpu::Extent3d {
                    width: *width,
                    height: *height,
                    depth_or_array_layers: 1,
                },
            );
        }
        Ok(texture)
    }

    fn upload_compressed(&mut self, upload: &TextureUpload<'_>, format: EtcFormat) -> Result<wgpu::Texture> {
        if !self.etc2_supported {
            return Err(RenderError::Unsupported(format!(
                "ETC2/EAC textures are not supported by this device ('{}')",
                upload.label
            )));
        }
        if upload.width % 4 != 0 || upload.height % 4 != 0 {
            return Err(RenderError::Backend(format!(
                "compressed texture '{}' is {}x{}, not a multiple of the 4x4 block",
                upload.label, upload.width, upload.height
            )));
        }
        let blocks_wide = upload.width / 4;
        let blocks_high = upload.height / 4;
        let bytes_per_row = blocks_wide * format.block_bytes() as u32;
        let expected = bytes_per_row as usize * blocks_high as usize;
        if upload.data.len() < expected {
            return Err(RenderError::Backend(format!(
                "compressed texture '{}' has {} bytes, expected {}",
                upload.label,
                upload.data.len(),
                expected
            )));
        }

        let size = wgpu::Extent3d {
            width: upload.width,
            height: upload.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(upload.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: etc_format(format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &upload.data[..expected],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(blocks_high),
            },
            size,
        );
        Ok(texture)
    }
}

impl GraphicsBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn reset_state(&mut self) {
        self.state = BoundState::default();
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        };
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.frame.is_some() {
            return Err(RenderError::Backend("frame already in progress".to_string()));
        }
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| RenderError::Backend(format!("surface unavailable: {e}")))?
            }
            Err(e) => return Err(RenderError::Backend(format!("surface unavailable: {e}"))),
        };
        self.frame = Some(surface_texture);
        self.draws.clear();
        self.uniforms.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        let surface_texture = self
            .frame
            .take()
            .ok_or_else(|| RenderError::Backend("no frame in progress".to_string()))?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.uniforms.flush(&self.device, &self.queue);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for draw in &self.draws {
                let Some([x, y, width, height]) = self.pass_viewport(draw.viewport) else {
                    continue;
                };
                render_pass.set_viewport(x, y, width, height, 0.0, 1.0);
                render_pass.set_pipeline(&draw.pipeline);
                render_pass.set_bind_group(0, &self.uniforms.bind_group, &[draw.uniform_offset]);
                if let Some(textures) = &draw.textures {
                    render_pass.set_bind_group(1, textures, &[]);
                }
                for (slot, buffer) in draw.vertex_buffers.iter().enumerate() {
                    render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        self.draws.clear();
        Ok(())
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.state.enabled.insert(capability);
        } else {
            self.state.enabled.remove(&capability);
        }
    }

    fn blend_func(&mut self, func: BlendFunc) {
        self.state.blend = func;
    }

    fn create_buffer(&mut self, target: BufferTarget, contents: &[u8]) -> Result<BufferHandle> {
        if contents.is_empty() {
            return Err(RenderError::EmptyBuffer);
        }
        let usage = match target {
            BufferTarget::Array => wgpu::BufferUsages::VERTEX,
            BufferTarget::ElementArray => wgpu::BufferUsages::INDEX,
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match target {
                    BufferTarget::Array => "vertex buffer",
                    BufferTarget::ElementArray => "index buffer",
                }),
                contents,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            });
        let handle = BufferHandle(self.next_id());
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        match target {
            BufferTarget::Array => self.state.array_buffer = buffer,
            BufferTarget::ElementArray => self.state.element_buffer = buffer,
        }
    }

    // Dropping our reference is enough; wgpu frees the buffer once no recorded
    // draw still uses it.
    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            return;
        }
        if self.state.array_buffer == Some(buffer) {
            self.state.array_buffer = None;
        }
        if self.state.element_buffer == Some(buffer) {
            self.state.element_buffer = None;
        }
    }

    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramHandle> {
        let text = format!("{}\n{}", source.vertex, source.fragment);
        let (module, err) = self.validated(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.name.as_ref()),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(text)),
            })
        });
        if let Some(err) = err {
            return Err(RenderError::CompileFailure {
                shader: source.name.to_string(),
                log: err.to_string(),
            });
        }
        if source.samplers.len() > MAX_TEXTURE_UNITS {
            return Err(RenderError::Unsupported(format!(
                "program '{}' samples {} textures, at most {} are supported",
                source.name,
                source.samplers.len(),
                MAX_TEXTURE_UNITS
            )));
        }

        let handle = ProgramHandle(self.next_id());
        self.programs.insert(
            handle,
            Program {
                label: source.name.to_string(),
                module,
                attributes: source.attributes.iter().map(|a| a.to_string()).collect(),
                uniforms: source.uniforms.iter().map(|u| u.to_string()).collect(),
                samplers: source.samplers.iter().map(|s| s.to_string()).collect(),
            },
        );
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        if !self.programs.contains_key(&program) {
            return Err(RenderError::InvalidHandle(program.to_string()));
        }
        self.state.program = Some(program);
        Ok(())
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        self.programs
            .get(&program)?
            .attributes
            .iter()
            .position(|a| a == name)
            .map(|slot| AttributeLocation(slot as u32))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let program = self.programs.get(&program)?;
        if let Some(unit) = program.samplers.iter().position(|s| s == name) {
            return Some(uniforms::sampler_location(unit as u32));
        }
        program
            .uniforms
            .iter()
            .any(|u| u == name)
            .then(|| uniforms::value_location(name))
            .flatten()
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        match (location.0, value) {
            (0, UniformValue::Mat4(matrix)) => {
                let corrected = OPENGL_TO_WGPU_MATRIX * Matrix4::from(matrix);
                self.state.uniforms.mvp = corrected.into();
            }
            (1, UniformValue::Float(alpha)) => self.state.uniforms.params[0] = alpha,
            (2, UniformValue::Float(mix)) => self.state.uniforms.params[1] = mix,
            // texture units sit at fixed bindings
            (_, UniformValue::Sampler(_)) => {}
            (location, value) => warn!("Ignoring uniform {:?} at location {}", value, location),
        }
    }

    fn vertex_attrib_buffer(&mut self, location: AttributeLocation, components: u8) -> Result<()> {
        let handle = self
            .state
            .array_buffer
            .ok_or(RenderError::ResourceNotInitialized("array buffer binding"))?;
        let buffer = self
            .buffers
            .get(&handle)
            .ok_or_else(|| RenderError::InvalidHandle(handle.to_string()))?
            .clone();
        self.state
            .attributes
            .insert(location.0, VertexInput { components, buffer });
        Ok(())
    }

    fn vertex_attrib_client(&mut self, location: AttributeLocation, components: u8, data: &[f32]) {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("client vertex data"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.state
            .attributes
            .insert(location.0, VertexInput { components, buffer });
    }

    fn disable_vertex_attribs(&mut self) {
        self.state.attributes.clear();
    }

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<TextureHandle> {
        if upload.width == 0 || upload.height == 0 {
            return Err(RenderError::Unsupported(format!(
                "texture '{}' has no pixels",
                upload.label
            )));
        }
        let (texture, mipmapped) = match upload.format {
            TextureFormat::Rgba8 => (self.upload_rgba(upload)?, upload.mipmaps),
            TextureFormat::Compressed(format) => (self.upload_compressed(upload, format)?, false),
        };

        let address_mode = match upload.wrap {
            TextureWrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            TextureWrap::Repeat => wgpu::AddressMode::Repeat,
        };
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(upload.label),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: if mipmapped {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            ..Default::default()
        });

        let handle = TextureHandle(self.next_id());
        self.textures.insert(
            handle,
            SampledTexture {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                sampler,
            },
        );
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) {
        match texture {
            Some(handle) => self.state.textures.insert(unit, handle),
            None => self.state.textures.remove(&unit),
        };
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_none() {
            return;
        }
        self.state.textures.retain(|_, bound| *bound != texture);
        self.texture_groups
            .retain(|(_, bound), _| !bound.contains(&Some(texture)));
    }

    fn draw_elements(&mut self, mode: RenderMode, count: u32) -> Result<()> {
        let handle = self
            .state
            .element_buffer
            .ok_or(RenderError::ResourceNotInitialized("element buffer binding"))?;
        let index_buffer = self
            .buffers
            .get(&handle)
            .ok_or_else(|| RenderError::InvalidHandle(handle.to_string()))?
            .clone();
        self.record_draw(mode, index_buffer, count)
    }

    fn draw_elements_client(&mut self, mode: RenderMode, indices: &[u16]) -> Result<()> {
        if indices.is_empty() {
            return Err(RenderError::EmptyBuffer);
        }
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("client index data"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.record_draw(mode, index_buffer, indices.len() as u32)
    }
}

fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

fn vertex_format(components: u8) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn topology(mode: RenderMode) -> wgpu::PrimitiveTopology {
    match mode {
        RenderMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
        RenderMode::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        RenderMode::Lines => wgpu::PrimitiveTopology::LineList,
        RenderMode::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        RenderMode::Points => wgpu::PrimitiveTopology::PointList,
    }
}

fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

fn blend_state(func: BlendFunc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: blend_factor(func.src),
        dst_factor: blend_factor(func.dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

fn etc_format(format: EtcFormat) -> wgpu::TextureFormat {
    match format {
        // ETC2 RGB8 decoders read ETC1 data unchanged
        EtcFormat::Etc1Rgb8 | EtcFormat::Etc2Rgb8 => wgpu::TextureFormat::Etc2Rgb8Unorm,
        EtcFormat::Etc2Rgb8Punchthrough => wgpu::TextureFormat::Etc2Rgb8A1Unorm,
        EtcFormat::Etc2Rgba8Eac => wgpu::TextureFormat::Etc2Rgba8Unorm,
        EtcFormat::EacR11 => wgpu::TextureFormat::EacR11Unorm,
        EtcFormat::EacR11Signed => wgpu::TextureFormat::EacR11Snorm,
        EtcFormat::EacRg11 => wgpu::TextureFormat::EacRg11Unorm,
        EtcFormat::EacRg11Signed => wgpu::TextureFormat::EacRg11Snorm,
    }
}

/// Full mip chain of an RGBA8 image, level 0 first, each level halving down to 1x1
fn mip_chain(width: u32, height: u32, rgba: &[u8]) -> Vec<(u32, u32, Vec<u8>)> {
    let mut levels = vec![(width, height, rgba.to_vec())];
    let Some(mut image) = image::RgbaImage::from_raw(width, height, rgba.to_vec()) else {
        return levels;
    };
    let (mut w, mut h) = (width, height);
    while w > 1 || h > 1 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        image = image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle);
        levels.push((w, h, image.as_raw().clone()));
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn test_uniform_block_matches_wgsl_layout() {
        assert_eq!(DRAW_UNIFORMS_SIZE, 80);
        assert_eq!(align_up(DRAW_UNIFORMS_SIZE, 256), 256);
        assert_eq!(align_up(300, 256), 512);
        assert_eq!(align_up(80, 0), 80);
    }

    #[test]
    fn test_clip_space_correction() {
        let near = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z / near.w, 0.0);
        assert_eq!(far.z / far.w, 1.0);
        assert!(OPENGL_TO_WGPU_MATRIX.invert().is_some());
    }

    #[test]
    fn test_mip_chain_halves_to_one() {
        let levels = mip_chain(8, 2, &[128; 8 * 2 * 4]);
        let sizes: Vec<(u32, u32)> = levels.iter().map(|(w, h, _)| (*w, *h)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert!(levels.iter().all(|(w, h, data)| data.len() == (*w * *h * 4) as usize));
    }

    #[test]
    fn test_strip_modes_map_to_strip_topologies() {
        assert_eq!(topology(RenderMode::LineStrip), wgpu::PrimitiveTopology::LineStrip);
        assert_eq!(topology(RenderMode::Points), wgpu::PrimitiveTopology::PointList);
        assert_eq!(vertex_format(2), wgpu::VertexFormat::Float32x2);
        assert_eq!(vertex_format(4), wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_alpha_blend_state() {
        let state = blend_state(BlendFunc::ALPHA);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(etc_format(EtcFormat::Etc1Rgb8), wgpu::TextureFormat::Etc2Rgb8Unorm);
    }
}
