use cgmath::Matrix4;

use crate::animation::Animation;
use crate::error::Result;
use crate::gfx::backend::{BlendFunc, RenderMode};
use crate::gfx::camera::Camera;
use crate::gfx::geometry::Geometry;
use crate::gfx::rendering::{DrawContext, FrameState};
use crate::gfx::resources::GpuContext;
use crate::gfx::shader::{BuiltinShader, ShaderId, ShaderVariables};
use crate::gfx::texture::TextureId;
use crate::math::{Transform, TransformId, TransformStore};

/// Index of a model inside its [`Scene`](super::Scene)
///
/// Also addresses the model's transform, so it converts into a [`TransformId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

impl From<ModelId> for TransformId {
    fn from(id: ModelId) -> Self {
        TransformId(id.0)
    }
}

/// Everything about a model except its geometry
///
/// Animations and application code mutate it between frames.
#[derive(Debug, Clone)]
pub struct ModelState {
    pub name: String,
    /// Invisible models are skipped by prepare and draw
    pub visible: bool,
    pub shader: ShaderId,
    /// Texture sampled by shaders that read texture coordinates
    pub texture: Option<TextureId>,
    pub render_mode: RenderMode,
    /// Personal blend pair, overriding the renderer default
    pub blend: Option<BlendFunc>,
    pub transform: Transform,
    /// Values for shaders with extra uniforms (alpha, mix amount)
    pub shader_vars: Option<ShaderVariables>,
}

impl ModelState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            shader: BuiltinShader::DefaultColor.id(),
            texture: None,
            render_mode: RenderMode::Triangles,
            blend: None,
            transform: Transform::new(),
            shader_vars: None,
        }
    }

    pub fn with_shader(mut self, shader: ShaderId) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_blend(mut self, blend: BlendFunc) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_shader_vars(mut self, vars: ShaderVariables) -> Self {
        self.shader_vars = Some(vars);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn set_shader_from(&mut self, other: &ModelState) {
        self.shader = other.shader;
    }

    pub fn set_texture_from(&mut self, other: &ModelState) {
        self.texture = other.texture;
    }
}

impl Default for ModelState {
    fn default() -> Self {
        Self::new("")
    }
}

/// A drawable: geometry, state and an optional animation
#[derive(Debug)]
pub struct Model {
    pub geometry: Geometry,
    pub state: ModelState,
    animation: Option<Box<dyn Animation>>,
}

impl Model {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            state: ModelState::default(),
            animation: None,
        }
    }

    pub fn with_state(mut self, state: ModelState) -> Self {
        self.state = state;
        self
    }

    pub fn with_animation(mut self, animation: impl Animation + 'static) -> Self {
        self.set_animation(animation);
        self
    }

    /// Replaces the current animation
    pub fn set_animation(&mut self, animation: impl Animation + 'static) {
        self.animation = Some(Box::new(animation));
    }

    /// Detaches the animation, which is the only way to cancel one
    pub fn take_animation(&mut self) -> Option<Box<dyn Animation>> {
        self.animation.take()
    }

    pub fn animation(&self) -> Option<&dyn Animation> {
        self.animation.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn init_buffer_objects(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.geometry.init_buffer_objects(gpu)
    }

    pub fn prepare(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        self.geometry.prepare(ctx, &self.state)
    }

    /// Ticks the animation, if any. Returns whether it has finished.
    pub fn animate(&mut self, frame: &FrameState) -> bool {
        match &mut self.animation {
            Some(animation) => animation.animate(frame, &mut self.state),
            None => true,
        }
    }

    pub fn draw(
        &mut self,
        ctx: &mut DrawContext<'_>,
        camera: &Camera,
        world_matrix: Matrix4<f32>,
    ) -> Result<()> {
        self.geometry.draw(ctx, &self.state, camera, world_matrix)
    }
}

/// Scene slots; an emptied slot has no transform
impl TransformStore for [Option<Model>] {
    fn transform(&self, id: TransformId) -> Option<&Transform> {
        self.get(id.0)?.as_ref().map(|model| &model.state.transform)
    }

    fn transform_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.get_mut(id.0)?.as_mut().map(|model| &mut model.state.transform)
    }
}

/// Sized form of the slot store, usable as `&mut dyn TransformStore`
impl TransformStore for Vec<Option<Model>> {
    fn transform(&self, id: TransformId) -> Option<&Transform> {
        self.as_slice().transform(id)
    }

    fn transform_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.as_mut_slice().transform_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ScalingAnimation;

    #[test]
    fn test_state_defaults() {
        let state = ModelState::new("card");
        assert!(state.visible);
        assert_eq!(state.shader, BuiltinShader::DefaultColor.id());
        assert_eq!(state.texture, None);
        assert_eq!(state.render_mode, RenderMode::Triangles);
        assert!(state.blend.is_none());
    }

    #[test]
    fn test_copy_shader_and_texture() {
        let source = ModelState::new("a")
            .with_shader(BuiltinShader::Blur.id())
            .with_texture(TextureId(1001));
        let mut target = ModelState::new("b");
        target.set_shader_from(&source);
        target.set_texture_from(&source);
        assert_eq!(target.shader, BuiltinShader::Blur.id());
        assert_eq!(target.texture, Some(TextureId(1001)));
    }

    #[test]
    fn test_animation_can_be_detached() {
        let geometry = Geometry::new(vec![0.0; 9], vec![0, 1, 2]);
        let mut model = Model::new(geometry).with_animation(ScalingAnimation::new(1.0, 2.0, 10.0));
        let mut frame = FrameState::default();
        frame.advance_time(0);
        assert!(!model.animate(&frame));
        assert!(model.take_animation().is_some());
        assert!(model.animate(&frame));
        assert!(model.animation().is_none());
    }

    #[test]
    fn test_models_are_a_transform_store() {
        let geometry = Geometry::new(vec![0.0; 9], vec![0, 1, 2]);
        let mut models = vec![Some(Model::new(geometry.clone())), None, Some(Model::new(geometry))];
        crate::math::attach(models.as_mut_slice(), TransformId(2), Some(TransformId(0))).unwrap();
        let follower = models[2].as_ref().unwrap();
        assert_eq!(follower.state.transform.follow(), Some(TransformId(0)));
        assert!(models.as_slice().transform(TransformId(1)).is_none());
        assert!(models.as_slice().transform(TransformId(3)).is_none());
        assert_eq!(
            crate::math::attach(models.as_mut_slice(), TransformId(2), Some(TransformId(1))),
            Err(crate::error::RenderError::UnknownTransform(TransformId(1)))
        );
    }
}
