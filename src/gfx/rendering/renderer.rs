//! Host lifecycle driver
//!
//! The host calls into the [`Renderer`] from the thread that owns the graphics
//! context, in this order:
//!
//! ```text
//! on_context_created → on_surface_resized → on_tick ... → on_pause → on_resume → ...
//! ```
//!
//! After a context loss the host calls `on_context_created` again (with a fresh
//! backend via [`Renderer::replace_backend`] if the device itself was lost).
//! That bumps the context version, and every buffer, texture and shader rebuilds
//! itself the next time it is used.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::gfx::backend::{GraphicsBackend, Viewport};
use crate::gfx::rendering::{DrawContext, FrameState};
use crate::gfx::resources::GpuContext;
use crate::gfx::scene::Scene;
use crate::gfx::shader::ShaderManager;
use crate::gfx::texture::{AssetLoader, TextureManager};
use crate::motion::TouchEvent;
use crate::performance::FpsCounter;

/// Owns the backend, the registries, the frame state and the current scene
pub struct Renderer<B: GraphicsBackend> {
    backend: B,
    assets: Box<dyn AssetLoader>,
    shaders: ShaderManager,
    textures: TextureManager,
    frame: FrameState,
    config: EngineConfig,
    scene: Option<Scene>,
    fps: FpsCounter,
    clock: Instant,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Creates a renderer with every built-in shader registered
    pub fn new(backend: B, assets: impl AssetLoader + 'static, config: EngineConfig) -> Self {
        let mut shaders = ShaderManager::new();
        shaders.add_builtins();
        Self {
            backend,
            assets: Box::new(assets),
            shaders,
            textures: TextureManager::new(),
            frame: FrameState::new(&config),
            config,
            scene: None,
            fps: FpsCounter::new().with_logging(true),
            clock: Instant::now(),
        }
    }

    /// Installs a scene and runs its attach hook.
    ///
    /// If a context already exists the scene's buffers are uploaded right away.
    pub fn set_scene(&mut self, mut scene: Scene) -> Result<()> {
        let has_context = self.frame.context_version() > 0;
        let surface = self.frame.surface();
        {
            let mut ctx = DrawContext {
                gpu: GpuContext::new(
                    &mut self.backend,
                    self.assets.as_ref(),
                    self.frame.context_version(),
                ),
                shaders: &mut self.shaders,
                textures: &mut self.textures,
                frame: &self.frame,
            };
            scene.on_attach(&mut ctx)?;
            if has_context {
                scene.on_surface_ready(&mut ctx)?;
            }
        }
        if !surface.is_empty() {
            scene.on_resize(&self.frame, surface.width, surface.height);
        }
        self.scene = Some(scene);
        Ok(())
    }

    /// Removes the scene; its models stop drawing
    pub fn take_scene(&mut self) -> Option<Scene> {
        self.scene.take()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// A new graphics context exists; everything created before is gone.
    ///
    /// Bumps the context version, uploads the scene's buffers and compiles
    /// every shader. All steps are attempted; the first failure is returned.
    pub fn on_context_created(&mut self) -> Result<()> {
        self.backend.reset_state();
        self.backend.set_clear_color(self.config.clear_color);
        let version = self.frame.bump_context_version();
        self.shaders.reset_current();
        self.textures.reset_current();
        info!(
            "Context created on {} backend (version {})",
            self.backend.name(),
            version
        );

        let mut ctx = DrawContext {
            gpu: GpuContext::new(&mut self.backend, self.assets.as_ref(), version),
            shaders: &mut self.shaders,
            textures: &mut self.textures,
            frame: &self.frame,
        };

        let mut first_error = None;
        if let Some(scene) = self.scene.as_mut() {
            if let Err(err) = scene.on_surface_ready(&mut ctx) {
                first_error.get_or_insert(err);
            }
        }
        if let Err(err) = ctx.shaders.compile_all(&mut ctx.gpu) {
            first_error.get_or_insert(err);
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn on_surface_resized(&mut self, width: u32, height: u32) {
        self.frame.bump_orientation_version();
        let viewport = Viewport::new(width, height);
        self.frame.set_surface(viewport);
        self.backend.set_viewport(viewport);
        if let Some(scene) = self.scene.as_mut() {
            scene.on_resize(&self.frame, width, height);
        }
        debug!("Surface resized to {}x{}", width, height);
    }

    /// Draws one frame at the wall-clock time since the renderer was created
    pub fn on_tick(&mut self) -> Result<()> {
        let now_ms = self.clock.elapsed().as_millis() as u64;
        self.on_tick_at(now_ms)
    }

    /// Draws one frame at `now_ms`.
    ///
    /// Model failures are logged by the scene and do not fail the frame; only
    /// backend frame errors are returned.
    pub fn on_tick_at(&mut self, now_ms: u64) -> Result<()> {
        self.frame.advance_time(now_ms);
        self.backend.begin_frame()?;

        let mut ctx = DrawContext {
            gpu: GpuContext::new(
                &mut self.backend,
                self.assets.as_ref(),
                self.frame.context_version(),
            ),
            shaders: &mut self.shaders,
            textures: &mut self.textures,
            frame: &self.frame,
        };
        let drawn = match self.scene.as_mut() {
            Some(scene) => {
                let failed = scene.on_draw_frame(&mut ctx).len();
                scene.len().saturating_sub(failed)
            }
            None => 0,
        };
        ctx.shaders.reset_current();
        ctx.textures.unbind_current(ctx.gpu.backend);

        let result = self.backend.end_frame();
        self.fps.set_draw_calls(drawn as u32);
        self.fps
            .record_frame(Duration::from_millis(self.frame.raw_delta_ms()));
        result
    }

    /// Offers a touch event to the scene. Returns whether anything handled it.
    pub fn on_touch(&mut self, event: &TouchEvent) -> bool {
        match self.scene.as_mut() {
            Some(scene) => scene.on_touch(event),
            None => false,
        }
    }

    /// Freezes animation time
    pub fn on_pause(&mut self) {
        self.frame.pause();
        debug!("Renderer paused at {}ms", self.frame.time_ms());
    }

    /// Restarts animation time without jumping over the pause
    pub fn on_resume(&mut self) {
        self.frame.resume();
        debug!("Renderer resumed");
    }

    /// Swaps in a backend for a new device and returns the old one.
    ///
    /// Call [`on_context_created`](Self::on_context_created) afterwards.
    pub fn replace_backend(&mut self, backend: B) -> B {
        warn!("Replacing {} backend; GPU resources will be recreated", self.backend.name());
        std::mem::replace(&mut self.backend, backend)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    pub fn shaders_mut(&mut self) -> &mut ShaderManager {
        &mut self.shaders
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AxisMovementAnimation;
    use crate::error::RenderError;
    use crate::gfx::backend::{Command, RecordingBackend};
    use crate::gfx::camera::Camera;
    use crate::gfx::geometry::RectangleBuilder;
    use crate::gfx::scene::{ModelId, ModelState};
    use crate::gfx::shader::BuiltinShader;
    use crate::gfx::texture::{DecodedImage, MemoryAssets, Texture};
    use crate::math::{Axis, Color};

    fn renderer() -> Renderer<RecordingBackend> {
        Renderer::new(RecordingBackend::new(), MemoryAssets::new(), EngineConfig::default())
    }

    fn card_scene() -> Scene {
        let mut scene = Scene::new(Camera::orthographic());
        scene.add(
            RectangleBuilder::new()
                .size(2.0, 2.0)
                .color(Color::WHITE)
                .build()
                .unwrap()
                .into_model("card"),
        );
        scene
    }

    #[test]
    fn test_context_created_compiles_and_uploads() {
        let mut renderer = renderer();
        renderer.set_scene(card_scene()).unwrap();
        renderer.on_context_created().unwrap();

        assert_eq!(renderer.frame().context_version(), 1);
        assert_eq!(renderer.backend().programs_compiled(), BuiltinShader::ALL.len());
        assert!(renderer.backend().buffers_created() > 0);
    }

    #[test]
    fn test_tick_draws_scene() {
        let mut renderer = renderer();
        renderer.set_scene(card_scene()).unwrap();
        renderer.on_context_created().unwrap();
        renderer.on_surface_resized(200, 100);
        renderer.backend_mut().clear_commands();
        renderer.on_tick_at(0).unwrap();

        let commands = renderer.backend().commands();
        assert_eq!(commands.first(), Some(&Command::BeginFrame));
        assert_eq!(commands.last(), Some(&Command::EndFrame));
        assert_eq!(renderer.backend().draw_calls().len(), 1);
        assert_eq!(renderer.shaders().current(), None);
        assert_eq!(renderer.fps().stats().draw_calls, 1);
    }

    #[test]
    fn test_context_loss_recreates_resources() {
        let mut renderer = renderer();
        renderer.set_scene(card_scene()).unwrap();
        renderer.on_context_created().unwrap();
        renderer.on_tick_at(0).unwrap();
        let buffers = renderer.backend().buffers_created();
        let programs = renderer.backend().programs_compiled();

        let old = renderer.replace_backend(RecordingBackend::new());
        assert_eq!(old.buffers_created(), buffers);
        renderer.on_context_created().unwrap();
        renderer.on_tick_at(16).unwrap();

        assert_eq!(renderer.frame().context_version(), 2);
        assert_eq!(renderer.backend().buffers_created(), buffers);
        assert_eq!(renderer.backend().programs_compiled(), programs);
        assert_eq!(renderer.backend().draw_calls().len(), 1);
    }

    #[test]
    fn test_resize_updates_camera_and_viewport() {
        let mut renderer = renderer();
        renderer.set_scene(card_scene()).unwrap();
        renderer.on_surface_resized(300, 150);

        assert_eq!(renderer.backend().viewport(), Viewport::new(300, 150));
        assert_eq!(renderer.frame().orientation_version(), 1);
        let camera = renderer.scene().unwrap().camera();
        assert_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_scene_set_late_gets_surface() {
        let mut renderer = renderer();
        renderer.on_context_created().unwrap();
        renderer.on_surface_resized(100, 100);
        renderer.set_scene(card_scene()).unwrap();

        assert!(renderer.backend().buffers_created() > 0);
        assert_eq!(renderer.scene().unwrap().camera().viewport(), Viewport::new(100, 100));
    }

    #[test]
    fn test_pause_freezes_animation() {
        let mut renderer = renderer();
        let mut scene = card_scene();
        scene
            .model_mut(ModelId(0))
            .unwrap()
            .set_animation(AxisMovementAnimation::new(Axis::X, 0.0, 10.0, 100.0));
        renderer.set_scene(scene).unwrap();
        renderer.on_context_created().unwrap();

        renderer.on_tick_at(0).unwrap();
        renderer.on_tick_at(20).unwrap();
        renderer.on_pause();
        renderer.on_tick_at(5_000).unwrap();
        renderer.on_resume();
        renderer.on_tick_at(9_000).unwrap();

        let x = renderer.scene().unwrap().model(ModelId(0)).unwrap().state.transform.position().x;
        assert!((x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_compile_failure_is_reported() {
        let mut renderer = renderer();
        renderer.backend_mut().fail_compilation_of("default_color", "syntax error");
        let err = renderer.on_context_created().unwrap_err();
        assert!(matches!(err, RenderError::CompileFailure { .. }));
    }

    #[test]
    fn test_texture_reuploaded_after_context_loss() {
        let mut renderer = renderer();
        let texture = renderer
            .textures_mut()
            .add(Texture::from_image("white", DecodedImage::solid(2, 2, [255; 4])));
        let mut scene = Scene::new(Camera::orthographic());
        scene.add(
            RectangleBuilder::new()
                .with_texture_coords(true)
                .build()
                .unwrap()
                .into_model("card")
                .with_state(
                    ModelState::new("card")
                        .with_texture(texture)
                        .with_shader(BuiltinShader::DefaultTexture.id()),
                ),
        );
        renderer.set_scene(scene).unwrap();
        renderer.on_context_created().unwrap();
        renderer.on_tick_at(0).unwrap();
        assert_eq!(renderer.backend().textures_created(), 1);

        renderer.backend_mut().lose_context();
        renderer.on_context_created().unwrap();
        renderer.on_tick_at(16).unwrap();
        assert_eq!(renderer.backend().textures_created(), 2);
        assert_eq!(renderer.textures().current(), None);
    }
}
