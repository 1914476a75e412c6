//! Shader variants and the compiled program wrapper.
//!
//! [`ShaderKind`] is the closed set of programs the engine knows how to build;
//! [`BuiltinShader`] names the five that get stable registry ids.
//! [`ShaderProgram`] compiles lazily for the current context version and
//! pushes the per-draw uniforms.

use cgmath::Matrix4;
use log::{debug, error};

use crate::error::{RenderError, Result};
use crate::gfx::backend::{
    uniforms, AttributeLocation, GraphicsBackend, ProgramHandle, UniformLocation, UniformValue,
};
use crate::gfx::camera::Camera;
use crate::gfx::resources::{GpuContext, VersionStamp, VersionedResource};
use crate::gfx::scene::ModelState;
use crate::gfx::shader::{ShaderId, ShaderSource};

pub const POSITION_ATTRIBUTE: &str = "a_Position";
pub const NORMAL_ATTRIBUTE: &str = "a_Normal";
pub const TEX_COORD_ATTRIBUTE: &str = "a_TexCoordinate";
pub const COLOR_ATTRIBUTE: &str = "a_Color";

pub const TEXTURE_SAMPLER: &str = "u_Texture";
pub const TEXTURE2_SAMPLER: &str = "u_Texture2";
pub const ALPHA_TEXTURE_SAMPLER: &str = "u_AlphaTexture";
pub const ALPHA_TEXTURE2_SAMPLER: &str = "u_AlphaTexture2";

const COMMON: &str = include_str!("wgsl/common.wgsl");
const TEXTURED_VERT: &str = include_str!("wgsl/textured.vert.wgsl");
const COLORED_VERT: &str = include_str!("wgsl/colored.vert.wgsl");
const TINTED_VERT: &str = include_str!("wgsl/tinted.vert.wgsl");
const SAMPLED_VERT: &str = include_str!("wgsl/sampled.vert.wgsl");
const VERTEX_COLOR_FRAG: &str = include_str!("wgsl/vertex_color.frag.wgsl");
const TEXTURE_FRAG: &str = include_str!("wgsl/texture.frag.wgsl");
const TINTED_FRAG: &str = include_str!("wgsl/tinted.frag.wgsl");
const TEXTURE_MIXING_FRAG: &str = include_str!("wgsl/texture_mixing.frag.wgsl");
const COMPRESSED_FRAG: &str = include_str!("wgsl/compressed.frag.wgsl");
const COMPRESSED_MIXING_SHARED_FRAG: &str = include_str!("wgsl/compressed_mixing_shared.frag.wgsl");
const COMPRESSED_MIXING_PAIR_FRAG: &str = include_str!("wgsl/compressed_mixing_pair.frag.wgsl");

const ALPHA_STEP_MARKER: &str = "// ALPHA_STEP";

/// Where the floating alpha factor comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceAlpha {
    /// Multiply by `u_Alpha`
    #[default]
    SourceAlpha,
    /// Multiply by `1 - u_Alpha`
    OneMinusSourceAlpha,
}

/// What the floating alpha factor is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaTarget {
    #[default]
    AlphaOnly,
    /// Premultiplied-style fade of all four channels
    FullColor,
}

/// How a compressed mixing shader finds the alpha of its two textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaHandling {
    /// Both textures use `u_AlphaTexture`
    ShareSingleAlpha,
    /// `u_AlphaTexture` and `u_AlphaTexture2`
    #[default]
    TwoIndividualAlphas,
}

/// Every program variant the engine can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    DefaultTexture,
    DefaultColor,
    /// Two textures blended by `u_MixModifier`
    TextureMixing,
    /// Samples the texture per vertex
    Blur,
    /// Texture modulated by vertex color
    TintedTexture,
    FloatingAlphaColor {
        source: SourceAlpha,
        target: AlphaTarget,
    },
    FloatingAlphaBlur {
        source: SourceAlpha,
        target: AlphaTarget,
    },
    /// Color texture plus an alpha mask texture
    CompressedTexture,
    CompressedTextureMixing(AlphaHandling),
}

impl ShaderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShaderKind::DefaultTexture => "default_texture",
            ShaderKind::DefaultColor => "default_color",
            ShaderKind::TextureMixing => "texture_mixing",
            ShaderKind::Blur => "blur",
            ShaderKind::TintedTexture => "tinted_texture",
            ShaderKind::FloatingAlphaColor { .. } => "floating_alpha_color",
            ShaderKind::FloatingAlphaBlur { .. } => "floating_alpha_blur",
            ShaderKind::CompressedTexture => "compressed_texture",
            ShaderKind::CompressedTextureMixing(_) => "compressed_texture_mixing",
        }
    }

    /// Builds the program text and declarations for this variant
    pub fn source(&self) -> ShaderSource {
        let textured = [POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE];
        let colored = [POSITION_ATTRIBUTE, COLOR_ATTRIBUTE];

        match *self {
            ShaderKind::DefaultTexture => {
                ShaderSource::new(self.label(), vertex(TEXTURED_VERT), TEXTURE_FRAG)
                    .with_attributes(textured)
                    .with_uniforms([uniforms::MVP_MATRIX])
                    .with_samplers([TEXTURE_SAMPLER])
            }
            ShaderKind::DefaultColor => {
                ShaderSource::new(self.label(), vertex(COLORED_VERT), VERTEX_COLOR_FRAG)
                    .with_attributes(colored)
                    .with_uniforms([uniforms::MVP_MATRIX])
            }
            ShaderKind::TextureMixing => {
                ShaderSource::new(self.label(), vertex(TEXTURED_VERT), TEXTURE_MIXING_FRAG)
                    .with_attributes(textured)
                    .with_uniforms([uniforms::MVP_MATRIX, uniforms::MIX_MODIFIER])
                    .with_samplers([TEXTURE_SAMPLER, TEXTURE2_SAMPLER])
            }
            ShaderKind::Blur => {
                ShaderSource::new(self.label(), vertex(SAMPLED_VERT), VERTEX_COLOR_FRAG)
                    .with_attributes(textured)
                    .with_uniforms([uniforms::MVP_MATRIX])
                    .with_samplers([TEXTURE_SAMPLER])
            }
            ShaderKind::TintedTexture => {
                ShaderSource::new(self.label(), vertex(TINTED_VERT), TINTED_FRAG)
                    .with_attributes([POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE, COLOR_ATTRIBUTE])
                    .with_uniforms([uniforms::MVP_MATRIX])
                    .with_samplers([TEXTURE_SAMPLER])
            }
            ShaderKind::FloatingAlphaColor { source, target } => ShaderSource::new(
                self.label(),
                vertex(COLORED_VERT),
                VERTEX_COLOR_FRAG.replace(ALPHA_STEP_MARKER, &alpha_step(source, target)),
            )
            .with_attributes(colored)
            .with_uniforms([uniforms::MVP_MATRIX, uniforms::ALPHA]),
            ShaderKind::FloatingAlphaBlur { source, target } => ShaderSource::new(
                self.label(),
                vertex(&SAMPLED_VERT.replace(ALPHA_STEP_MARKER, &alpha_step(source, target))),
                VERTEX_COLOR_FRAG,
            )
            .with_attributes(textured)
            .with_uniforms([uniforms::MVP_MATRIX, uniforms::ALPHA])
            .with_samplers([TEXTURE_SAMPLER]),
            ShaderKind::CompressedTexture => {
                ShaderSource::new(self.label(), vertex(TEXTURED_VERT), COMPRESSED_FRAG)
                    .with_attributes(textured)
                    .with_uniforms([uniforms::MVP_MATRIX])
                    .with_samplers([TEXTURE_SAMPLER, ALPHA_TEXTURE_SAMPLER])
            }
            ShaderKind::CompressedTextureMixing(AlphaHandling::ShareSingleAlpha) => {
                ShaderSource::new(
                    self.label(),
                    vertex(TEXTURED_VERT),
                    COMPRESSED_MIXING_SHARED_FRAG,
                )
                .with_attributes(textured)
                .with_uniforms([uniforms::MVP_MATRIX, uniforms::MIX_MODIFIER])
                .with_samplers([TEXTURE_SAMPLER, TEXTURE2_SAMPLER, ALPHA_TEXTURE_SAMPLER])
            }
            ShaderKind::CompressedTextureMixing(AlphaHandling::TwoIndividualAlphas) => {
                ShaderSource::new(self.label(), vertex(TEXTURED_VERT), COMPRESSED_MIXING_PAIR_FRAG)
                    .with_attributes(textured)
                    .with_uniforms([uniforms::MVP_MATRIX, uniforms::MIX_MODIFIER])
                    .with_samplers([
                        TEXTURE_SAMPLER,
                        TEXTURE2_SAMPLER,
                        ALPHA_TEXTURE_SAMPLER,
                        ALPHA_TEXTURE2_SAMPLER,
                    ])
            }
        }
    }
}

fn vertex(stage: &str) -> String {
    format!("{COMMON}\n{stage}")
}

fn alpha_step(source: SourceAlpha, target: AlphaTarget) -> String {
    let factor = match source {
        SourceAlpha::SourceAlpha => "draw.params.x",
        SourceAlpha::OneMinusSourceAlpha => "(1.0 - draw.params.x)",
    };
    let destination = match target {
        AlphaTarget::AlphaOnly => "color.a",
        AlphaTarget::FullColor => "color",
    };
    format!("{destination} *= {factor};")
}

/// Shaders with stable registry ids, equal to their ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinShader {
    DefaultTexture = 0,
    DefaultColor = 1,
    TextureMixing = 2,
    Blur = 3,
    TintedTexture = 4,
}

impl BuiltinShader {
    pub const ALL: [BuiltinShader; 5] = [
        BuiltinShader::DefaultTexture,
        BuiltinShader::DefaultColor,
        BuiltinShader::TextureMixing,
        BuiltinShader::Blur,
        BuiltinShader::TintedTexture,
    ];

    pub fn id(self) -> ShaderId {
        ShaderId(self as u32)
    }

    pub fn kind(self) -> ShaderKind {
        match self {
            BuiltinShader::DefaultTexture => ShaderKind::DefaultTexture,
            BuiltinShader::DefaultColor => ShaderKind::DefaultColor,
            BuiltinShader::TextureMixing => ShaderKind::TextureMixing,
            BuiltinShader::Blur => ShaderKind::Blur,
            BuiltinShader::TintedTexture => ShaderKind::TintedTexture,
        }
    }

    pub fn create(self) -> ShaderProgram {
        ShaderProgram::new(self.kind())
    }
}

/// Per-model values for shaders that read `u_Alpha` or `u_MixModifier`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderVariables {
    /// Written clamped to [0, 1]
    pub alpha: f32,
    pub mix_amount: f32,
}

impl Default for ShaderVariables {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            mix_amount: 1.0,
        }
    }
}

impl ShaderVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.set_alpha(alpha);
        self
    }

    pub fn with_mix_amount(mut self, mix_amount: f32) -> Self {
        self.mix_amount = mix_amount;
        self
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}

/// Resolved attribute slots; `None` when the program does not declare one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeLocations {
    pub position: Option<AttributeLocation>,
    pub normal: Option<AttributeLocation>,
    pub tex_coord: Option<AttributeLocation>,
    pub color: Option<AttributeLocation>,
}

#[derive(Debug, Clone, Default)]
struct UniformLocations {
    mvp: Option<UniformLocation>,
    alpha: Option<UniformLocation>,
    mix: Option<UniformLocation>,
    samplers: Vec<(UniformLocation, u32)>,
}

/// A program compiled on demand for the current context version
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    kind: Option<ShaderKind>,
    source: ShaderSource,
    handle: Option<ProgramHandle>,
    stamp: VersionStamp,
    attributes: AttributeLocations,
    uniforms: UniformLocations,
    /// Last compile error and the version it happened at
    failure: Option<(u64, RenderError)>,
}

impl ShaderProgram {
    pub fn new(kind: ShaderKind) -> Self {
        let mut program = Self::from_source(kind.source());
        program.kind = Some(kind);
        program
    }

    /// Wraps hand-written program text
    pub fn from_source(source: ShaderSource) -> Self {
        Self {
            kind: None,
            source,
            handle: None,
            stamp: VersionStamp::unsynced(),
            attributes: AttributeLocations::default(),
            uniforms: UniformLocations::default(),
            failure: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// `None` for programs built from custom source
    pub fn kind(&self) -> Option<ShaderKind> {
        self.kind
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    pub fn handle(&self) -> Option<ProgramHandle> {
        self.handle
    }

    pub fn locations(&self) -> AttributeLocations {
        self.attributes
    }

    /// Compiles the program unless it is already current.
    ///
    /// A failure is remembered for the version it happened at, so a broken
    /// program is not recompiled every frame.
    pub fn compile(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        if let Some((version, err)) = &self.failure {
            if *version == gpu.version {
                return Err(err.clone());
            }
        }
        match self.ensure_current(gpu) {
            Ok(_) => {
                self.failure = None;
                Ok(())
            }
            Err(err) => {
                if let RenderError::CompileFailure { log, .. } = &err {
                    error!("Shader '{}' failed to compile: {}", self.name(), log);
                }
                self.failure = Some((gpu.version, err.clone()));
                Err(err)
            }
        }
    }

    /// Compiles if needed, makes the program current and points each sampler
    /// at its texture unit
    pub fn use_program(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.compile(gpu)?;
        let handle = self
            .handle
            .ok_or(RenderError::ResourceNotInitialized("shader program"))?;
        gpu.backend.use_program(handle)?;
        for &(location, unit) in &self.uniforms.samplers {
            gpu.backend.set_uniform(location, UniformValue::Sampler(unit));
        }
        Ok(())
    }

    /// Writes the model-view-projection matrix and any shader variables.
    ///
    /// The matrix is `projection * view * model_matrix`.
    pub fn set_params(
        &self,
        backend: &mut dyn GraphicsBackend,
        state: &ModelState,
        camera: &Camera,
        model_matrix: Matrix4<f32>,
    ) -> Result<()> {
        if self.handle.is_none() {
            return Err(RenderError::ResourceNotInitialized("shader program"));
        }

        if let Some(location) = self.uniforms.mvp {
            let mvp = camera.projection_matrix() * camera.view_matrix() * model_matrix;
            backend.set_uniform(location, UniformValue::Mat4(mvp.into()));
        }

        if let Some(vars) = &state.shader_vars {
            if let Some(location) = self.uniforms.alpha {
                backend.set_uniform(location, UniformValue::Float(vars.alpha.clamp(0.0, 1.0)));
            }
            if let Some(location) = self.uniforms.mix {
                backend.set_uniform(location, UniformValue::Float(vars.mix_amount));
            }
        }
        Ok(())
    }
}

impl VersionedResource for ShaderProgram {
    fn stamp(&self) -> VersionStamp {
        self.stamp
    }

    fn stamp_mut(&mut self) -> &mut VersionStamp {
        &mut self.stamp
    }

    fn recreate(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.handle = None;
        let handle = gpu.backend.compile_program(&self.source)?;
        let backend = &*gpu.backend;

        self.attributes = AttributeLocations {
            position: backend.attribute_location(handle, POSITION_ATTRIBUTE),
            normal: backend.attribute_location(handle, NORMAL_ATTRIBUTE),
            tex_coord: backend.attribute_location(handle, TEX_COORD_ATTRIBUTE),
            color: backend.attribute_location(handle, COLOR_ATTRIBUTE),
        };
        self.uniforms = UniformLocations {
            mvp: backend.uniform_location(handle, uniforms::MVP_MATRIX),
            alpha: backend.uniform_location(handle, uniforms::ALPHA),
            mix: backend.uniform_location(handle, uniforms::MIX_MODIFIER),
            samplers: self
                .source
                .samplers
                .iter()
                .enumerate()
                .filter_map(|(unit, name)| {
                    backend
                        .uniform_location(handle, name)
                        .map(|location| (location, unit as u32))
                })
                .collect(),
        };
        self.handle = Some(handle);

        debug!(
            "Compiled shader '{}' as {} for context version {}",
            self.source.name, handle, gpu.version
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::{Command, RecordingBackend};
    use crate::gfx::texture::MemoryAssets;
    use approx::assert_relative_eq;
    use cgmath::{SquareMatrix, Vector3};

    fn mvp_written(backend: &RecordingBackend) -> Option<[[f32; 4]; 4]> {
        backend.commands().iter().rev().find_map(|c| match c {
            Command::SetUniform {
                value: UniformValue::Mat4(m),
                ..
            } => Some(*m),
            _ => None,
        })
    }

    #[test]
    fn test_builtin_ids_are_ordinals() {
        for (ordinal, builtin) in BuiltinShader::ALL.iter().enumerate() {
            assert_eq!(builtin.id(), ShaderId(ordinal as u32));
        }
    }

    #[test]
    fn test_sources_declare_expected_attributes() {
        let tinted = ShaderKind::TintedTexture.source();
        assert_eq!(
            tinted.attributes,
            vec![POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE, COLOR_ATTRIBUTE]
        );

        let pair = ShaderKind::CompressedTextureMixing(AlphaHandling::TwoIndividualAlphas).source();
        assert_eq!(pair.sampler_unit(ALPHA_TEXTURE2_SAMPLER), Some(3));
        let shared = ShaderKind::CompressedTextureMixing(AlphaHandling::ShareSingleAlpha).source();
        assert_eq!(shared.sampler_unit(ALPHA_TEXTURE2_SAMPLER), None);
    }

    #[test]
    fn test_floating_alpha_variants_differ() {
        let plain = ShaderKind::FloatingAlphaColor {
            source: SourceAlpha::SourceAlpha,
            target: AlphaTarget::AlphaOnly,
        }
        .source();
        let inverted = ShaderKind::FloatingAlphaColor {
            source: SourceAlpha::OneMinusSourceAlpha,
            target: AlphaTarget::FullColor,
        }
        .source();
        assert!(plain.fragment.contains("color.a *= draw.params.x;"));
        assert!(inverted.fragment.contains("color *= (1.0 - draw.params.x);"));
        assert!(!plain.fragment.contains(ALPHA_STEP_MARKER));

        let blur = ShaderKind::FloatingAlphaBlur {
            source: SourceAlpha::SourceAlpha,
            target: AlphaTarget::AlphaOnly,
        }
        .source();
        assert!(blur.vertex.contains("color.a *= draw.params.x;"));
    }

    #[test]
    fn test_compile_resolves_locations_once_per_version() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut program = BuiltinShader::DefaultTexture.create();

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        program.use_program(&mut gpu).unwrap();
        program.use_program(&mut gpu).unwrap();

        let locations = program.locations();
        assert_eq!(locations.position, Some(AttributeLocation(0)));
        assert_eq!(locations.tex_coord, Some(AttributeLocation(1)));
        assert_eq!(locations.color, None);
        assert_eq!(backend.programs_compiled(), 1);
        // the sampler is pointed at unit 0 on every use
        assert_eq!(
            backend.count(|c| matches!(
                c,
                Command::SetUniform {
                    value: UniformValue::Sampler(0),
                    ..
                }
            )),
            2
        );
    }

    #[test]
    fn test_compile_failure_is_cached_per_version() {
        let mut backend = RecordingBackend::new();
        backend.fail_compilation_of("default_color", "syntax error");
        let assets = MemoryAssets::new();
        let mut program = BuiltinShader::DefaultColor.create();

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        let first = program.compile(&mut gpu).unwrap_err();
        let second = program.compile(&mut gpu).unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, RenderError::CompileFailure { ref log, .. } if log == "syntax error"));
        assert_eq!(program.handle(), None);
    }

    #[test]
    fn test_set_params_multiplies_projection_view_model() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut program = BuiltinShader::DefaultColor.create();
        let camera = Camera::orthographic();
        let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 0.0));

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        program.use_program(&mut gpu).unwrap();
        program
            .set_params(&mut backend, &ModelState::new("m"), &camera, model)
            .unwrap();

        let expected: [[f32; 4]; 4] =
            (camera.projection_matrix() * camera.view_matrix() * model).into();
        let written = mvp_written(&backend).unwrap();
        for (col, expected_col) in written.iter().zip(expected.iter()) {
            for (value, expected_value) in col.iter().zip(expected_col.iter()) {
                assert_relative_eq!(*value, *expected_value);
            }
        }
    }

    #[test]
    fn test_alpha_is_clamped_when_written() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut program = ShaderProgram::new(ShaderKind::FloatingAlphaColor {
            source: SourceAlpha::SourceAlpha,
            target: AlphaTarget::AlphaOnly,
        });
        let mut state = ModelState::new("fading");
        state.shader_vars = Some(ShaderVariables {
            alpha: 1.7,
            mix_amount: 0.5,
        });

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        program.use_program(&mut gpu).unwrap();
        program
            .set_params(&mut backend, &state, &Camera::orthographic(), Matrix4::identity())
            .unwrap();

        assert!(backend.commands().contains(&Command::SetUniform {
            location: uniforms::value_location(uniforms::ALPHA).unwrap(),
            value: UniformValue::Float(1.0),
        }));
        // no mix uniform declared, so the mix amount is not written
        assert_eq!(
            backend.count(|c| matches!(
                c,
                Command::SetUniform {
                    value: UniformValue::Float(v),
                    ..
                } if *v == 0.5
            )),
            0
        );
    }

    #[test]
    fn test_set_params_before_compile_fails() {
        let mut backend = RecordingBackend::new();
        let program = BuiltinShader::DefaultColor.create();
        let result = program.set_params(
            &mut backend,
            &ModelState::new("m"),
            &Camera::orthographic(),
            Matrix4::identity(),
        );
        assert_eq!(
            result,
            Err(RenderError::ResourceNotInitialized("shader program"))
        );
    }
}
