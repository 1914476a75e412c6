use std::collections::HashMap;
use std::fmt;

use cgmath::Matrix4;
use log::{debug, error};

use crate::error::{RenderError, Result};
use crate::gfx::camera::Camera;
use crate::gfx::rendering::{DrawContext, FrameState};
use crate::gfx::scene::{Model, ModelId};
use crate::math::{self, TransformId};
use crate::motion::{MotionContext, MotionManager, TouchEvent};

/// Application hooks called by a [`Scene`] around its own lifecycle steps.
///
/// Every hook has an empty default, so a script only overrides what it needs.
/// The scene is handed in mutably; the script itself is detached from the scene
/// for the duration of the call.
pub trait SceneScript {
    /// Called once when the scene is given to a renderer. Register shaders and
    /// textures here.
    fn on_attach(&mut self, _scene: &mut Scene, _ctx: &mut DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after every context creation, once the scene's buffers are uploaded
    fn on_surface_ready(&mut self, _scene: &mut Scene, _ctx: &mut DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called at the start of every frame, before any model is drawn
    fn before_draw(&mut self, _scene: &mut Scene, _frame: &FrameState) {}

    /// Called after the camera has been resized
    fn on_resize(&mut self, _scene: &mut Scene, _frame: &FrameState, _width: u32, _height: u32) {}

    /// Called before the motion manager sees the event. Returning `true` consumes it.
    fn on_touch(&mut self, _scene: &mut Scene, _event: &TouchEvent) -> bool {
        false
    }
}

/// Ordered models plus the camera that looks at them
///
/// Insertion order is draw order. A model whose draw fails is skipped for the
/// frame; the rest of the scene still draws. Removed models leave an empty slot
/// behind, so the ids of the others never change.
pub struct Scene {
    models: Vec<Option<Model>>,
    camera: Camera,
    motion: Option<MotionManager>,
    script: Option<Box<dyn SceneScript>>,
    /// Context version each failing model was last reported for
    reported_failures: HashMap<usize, u64>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            models: Vec::new(),
            camera,
            motion: None,
            script: None,
            reported_failures: HashMap::new(),
        }
    }

    pub fn with_script(mut self, script: impl SceneScript + 'static) -> Self {
        self.script = Some(Box::new(script));
        self
    }

    /// Routes touch events to draggable objects
    pub fn with_motion(mut self, motion: MotionManager) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Appends a model; it draws after every model added before it
    pub fn add(&mut self, model: Model) -> ModelId {
        self.models.push(Some(model));
        ModelId(self.models.len() - 1)
    }

    /// Takes a model out of the scene. Its animation goes with it and never
    /// ticks again.
    ///
    /// Models that followed it are detached and draw with their local matrix.
    pub fn remove(&mut self, id: ModelId) -> Option<Model> {
        let mut model = self.models.get_mut(id.0)?.take()?;
        let removed = TransformId::from(id);
        for other in self.models.iter_mut().flatten() {
            if other.state.transform.follow() == Some(removed) {
                other.state.transform.set_follow(None);
            }
        }
        model.state.transform.set_follow(None);
        self.reported_failures.remove(&id.0);
        debug!("Removed model '{}' from the scene", model.name());
        Some(model)
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0).and_then(Option::as_ref)
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        self.models.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Looks a model up by name, first match in draw order
    pub fn find(&self, name: &str) -> Option<ModelId> {
        self.models
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|model| model.name() == name))
            .map(ModelId)
    }

    /// Live models in draw order
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &Model)> + '_ {
        self.models
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|model| (ModelId(index), model)))
    }

    /// Number of live models
    pub fn len(&self) -> usize {
        self.models.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.models.iter().all(Option::is_none)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn motion(&self) -> Option<&MotionManager> {
        self.motion.as_ref()
    }

    pub fn motion_mut(&mut self) -> Option<&mut MotionManager> {
        self.motion.as_mut()
    }

    /// Makes `child` follow `parent`, or detaches it with `None`.
    ///
    /// Rejects links that would form a cycle.
    pub fn follow(&mut self, child: ModelId, parent: Option<ModelId>) -> Result<()> {
        math::attach(
            self.models.as_mut_slice(),
            child.into(),
            parent.map(TransformId::from),
        )
    }

    /// World matrix of a model, including every transform it follows
    pub fn world_matrix(&mut self, id: ModelId) -> Result<Matrix4<f32>> {
        math::world_matrix(self.models.as_mut_slice(), id.into())
    }

    pub fn on_attach(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let Some(mut script) = self.script.take() else {
            return Ok(());
        };
        let result = script.on_attach(self, ctx);
        self.script = Some(script);
        result
    }

    /// Uploads buffers for a fresh context, then runs the script hook.
    ///
    /// Every model is attempted; the first failure is returned.
    pub fn on_surface_ready(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let mut first_error = None;
        if ctx.frame.vbo_enabled {
            for index in 0..self.models.len() {
                let Some(model) = self.models[index].as_mut() else {
                    continue;
                };
                if let Err(err) = model.init_buffer_objects(&mut ctx.gpu) {
                    self.report_failure(index, ctx.frame.context_version(), &err);
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(mut script) = self.script.take() {
            if let Err(err) = script.on_surface_ready(self, ctx) {
                first_error.get_or_insert(err);
            }
            self.script = Some(script);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Draws every model in insertion order.
    ///
    /// Each model is prepared, then animated, then drawn with its world matrix.
    /// Failures do not stop the frame; they are logged once per model per
    /// context version and returned.
    pub fn on_draw_frame(&mut self, ctx: &mut DrawContext<'_>) -> Vec<(ModelId, RenderError)> {
        if let Some(mut script) = self.script.take() {
            script.before_draw(self, ctx.frame);
            self.script = Some(script);
        }
        self.camera.set_view_matrix();

        let mut failures = Vec::new();
        for index in 0..self.models.len() {
            if self.models[index].is_none() {
                continue;
            }
            if let Err(err) = self.draw_model(index, ctx) {
                self.report_failure(index, ctx.frame.context_version(), &err);
                failures.push((ModelId(index), err));
            }
        }
        failures
    }

    fn draw_model(&mut self, index: usize, ctx: &mut DrawContext<'_>) -> Result<()> {
        let id = TransformId(index);
        let model = self.models[index]
            .as_mut()
            .ok_or(RenderError::UnknownTransform(id))?;
        let prepared = model.prepare(ctx);
        model.animate(ctx.frame);
        prepared?;

        let matrix = math::world_matrix(self.models.as_mut_slice(), id)?;
        match self.models[index].as_mut() {
            Some(model) => model.draw(ctx, &self.camera, matrix),
            None => Err(RenderError::UnknownTransform(id)),
        }
    }

    fn report_failure(&mut self, index: usize, version: u64, err: &RenderError) {
        if self.reported_failures.get(&index) == Some(&version) {
            return;
        }
        self.reported_failures.insert(index, version);
        let name = self.models[index].as_ref().map_or("<removed>", Model::name);
        error!("Model '{}' failed to draw: {}", name, err);
    }

    /// Resizes the camera, refreshes motion state and runs the script hook
    pub fn on_resize(&mut self, frame: &FrameState, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.camera.set_projection_matrix();
        if let Some(motion) = self.motion.as_mut() {
            motion.on_surface_changed(frame, height);
        }
        debug!("Scene resized to {}x{}", width, height);

        if let Some(mut script) = self.script.take() {
            script.on_resize(self, frame, width, height);
            self.script = Some(script);
        }
    }

    /// Offers the event to the script, then to the motion manager.
    ///
    /// Returns whether either of them handled it.
    pub fn on_touch(&mut self, event: &TouchEvent) -> bool {
        if let Some(mut script) = self.script.take() {
            let consumed = script.on_touch(self, event);
            self.script = Some(script);
            if consumed {
                return true;
            }
        }

        let Some(motion) = self.motion.as_mut() else {
            return false;
        };
        let mut ctx = MotionContext {
            camera: &self.camera,
            transforms: &mut self.models,
        };
        motion.on_touch_event(&mut ctx, event)
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("models", &self.models().map(|(_, model)| model).collect::<Vec<_>>())
            .field("camera", &self.camera)
            .field("motion", &self.motion)
            .field("has_script", &self.script.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AxisMovementAnimation;
    use crate::config::EngineConfig;
    use crate::gfx::backend::{Command, RecordingBackend};
    use crate::gfx::geometry::{Geometry, RectangleBuilder};
    use crate::gfx::resources::GpuContext;
    use crate::gfx::scene::ModelState;
    use crate::gfx::shader::{BuiltinShader, ShaderManager};
    use crate::gfx::texture::{MemoryAssets, TextureManager};
    use crate::math::{Axis, Color};
    use cgmath::Vector3;
    use crate::motion::{BoundingRect, DraggableObject, TouchPhase};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixture {
        backend: RecordingBackend,
        assets: MemoryAssets,
        shaders: ShaderManager,
        textures: TextureManager,
        frame: FrameState,
    }

    impl Fixture {
        fn new() -> Self {
            let mut shaders = ShaderManager::new();
            shaders.add_builtins();
            let mut frame = FrameState::new(&EngineConfig::default());
            frame.bump_context_version();
            Self {
                backend: RecordingBackend::new(),
                assets: MemoryAssets::new(),
                shaders,
                textures: TextureManager::new(),
                frame,
            }
        }

        fn ctx(&mut self) -> DrawContext<'_> {
            DrawContext {
                gpu: GpuContext::new(&mut self.backend, &self.assets, self.frame.context_version()),
                shaders: &mut self.shaders,
                textures: &mut self.textures,
                frame: &self.frame,
            }
        }
    }

    fn colored(name: &str) -> Model {
        RectangleBuilder::new()
            .size(2.0, 2.0)
            .color(Color::WHITE)
            .build()
            .unwrap()
            .into_model(name)
    }

    fn scene() -> Scene {
        let mut camera = Camera::orthographic();
        camera.set_viewport(100, 100);
        camera.set_projection_matrix();
        Scene::new(camera)
    }

    #[test]
    fn test_models_draw_in_insertion_order() {
        let mut fx = Fixture::new();
        let mut scene = scene();
        scene.add(colored("back"));
        scene.add(colored("front"));

        let failures = scene.on_draw_frame(&mut fx.ctx());
        assert!(failures.is_empty());
        assert_eq!(fx.backend.draw_calls().len(), 2);
        assert_eq!(scene.find("front"), Some(ModelId(1)));
    }

    #[test]
    fn test_failing_model_does_not_stop_the_frame() {
        let mut fx = Fixture::new();
        let mut scene = scene();
        // positions only, but the color shader wants colors
        let mut geometry = Geometry::new(vec![0.0; 9], vec![0, 1, 2]);
        geometry.stage().unwrap();
        scene.add(Model::new(geometry).with_state(ModelState::new("bare")));
        scene.add(colored("fine"));

        let failures = scene.on_draw_frame(&mut fx.ctx());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, ModelId(0));
        assert!(failures[0].1.is_missing_resource());
        assert_eq!(fx.backend.draw_calls().len(), 1);
        assert_eq!(scene.reported_failures.get(&0), Some(&1));

        scene.on_draw_frame(&mut fx.ctx());
        assert_eq!(scene.reported_failures.len(), 1);
    }

    #[test]
    fn test_follow_rejects_cycles() {
        let mut scene = scene();
        let a = scene.add(colored("a"));
        let b = scene.add(colored("b"));
        scene.follow(b, Some(a)).unwrap();
        assert_eq!(
            scene.follow(a, Some(b)),
            Err(RenderError::CyclicTransformGraph(TransformId(0)))
        );

        scene.model_mut(a).unwrap().state.transform.set_position(1.0, 2.0, 0.0);
        let matrix = scene.world_matrix(b).unwrap();
        assert_eq!(matrix.w.x, 1.0);
        assert_eq!(matrix.w.y, 2.0);
    }

    #[test]
    fn test_animation_runs_during_draw() {
        let mut fx = Fixture::new();
        let mut scene = scene();
        let id = scene.add(
            colored("mover").with_animation(AxisMovementAnimation::new(Axis::X, 0.0, 4.0, 100.0)),
        );

        fx.frame.advance_time(0);
        scene.on_draw_frame(&mut fx.ctx());
        fx.frame.advance_time(50);
        scene.on_draw_frame(&mut fx.ctx());

        let x = scene.model(id).unwrap().state.transform.position().x;
        assert!((x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_removed_model_stops_drawing_and_animating() {
        let mut fx = Fixture::new();
        let mut scene = scene();
        let parent = scene.add(
            colored("parent").with_animation(AxisMovementAnimation::new(Axis::X, 0.0, 4.0, 100.0)),
        );
        let child = scene.add(colored("child"));
        scene.model_mut(child).unwrap().state.transform.set_position(0.0, 1.0, 0.0);
        scene.follow(child, Some(parent)).unwrap();

        fx.frame.advance_time(0);
        scene.on_draw_frame(&mut fx.ctx());
        fx.frame.advance_time(50);
        scene.on_draw_frame(&mut fx.ctx());
        assert!((scene.world_matrix(child).unwrap().w.x - 2.0).abs() < 1e-4);

        let removed = scene.remove(parent).unwrap();
        assert_eq!(removed.name(), "parent");
        assert!(scene.remove(parent).is_none());
        assert!(scene.model(parent).is_none());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.find("child"), Some(child));
        assert_eq!(removed.state.transform.follow(), None);

        fx.backend.clear_commands();
        fx.frame.advance_time(75);
        assert!(scene.on_draw_frame(&mut fx.ctx()).is_empty());
        assert_eq!(fx.backend.draw_calls().len(), 1);
        assert!((removed.state.transform.position().x - 2.0).abs() < 1e-4);

        // The follower is back on its own matrix
        let model = scene.model(child).unwrap();
        assert_eq!(model.state.transform.follow(), None);
        let matrix = scene.world_matrix(child).unwrap();
        assert_eq!(matrix.w.x, 0.0);
        assert_eq!(matrix.w.y, 1.0);
        assert_eq!(
            scene.follow(child, Some(parent)),
            Err(RenderError::UnknownTransform(TransformId(0)))
        );
    }

    #[test]
    fn test_touch_drags_model() {
        let mut scene = scene().with_motion(MotionManager::new(1));
        let id = scene.add(colored("card"));
        scene.on_resize(&FrameState::default(), 100, 100);
        scene
            .motion_mut()
            .unwrap()
            .add(DraggableObject::new(id, BoundingRect::new(2.0, 2.0, Vector3::new(0.0, 0.0, 0.0))));

        assert!(scene.on_touch(&TouchEvent::new(0, TouchPhase::Down, 50.0, 50.0)));
        assert!(scene.on_touch(&TouchEvent::new(0, TouchPhase::Move, 60.0, 50.0)));
        assert!(scene.model(id).unwrap().state.transform.position().x > 0.5);
        assert!(scene.on_touch(&TouchEvent::new(0, TouchPhase::Up, 60.0, 50.0)));
        assert!(!scene.on_touch(&TouchEvent::new(0, TouchPhase::Move, 70.0, 50.0)));
    }

    struct Swallow(Rc<Cell<u32>>);

    impl SceneScript for Swallow {
        fn on_touch(&mut self, scene: &mut Scene, _event: &TouchEvent) -> bool {
            self.0.set(self.0.get() + scene.len() as u32);
            true
        }
    }

    #[test]
    fn test_script_sees_events_first() {
        let seen = Rc::new(Cell::new(0));
        let mut scene = scene()
            .with_motion(MotionManager::new(1))
            .with_script(Swallow(seen.clone()));
        scene.add(colored("card"));

        assert!(scene.on_touch(&TouchEvent::new(0, TouchPhase::Down, 50.0, 50.0)));
        assert_eq!(seen.get(), 1);
        assert!(scene.script.is_some());
    }

    #[test]
    fn test_surface_ready_uploads_buffers() {
        let mut fx = Fixture::new();
        let mut scene = scene();
        scene.add(colored("card"));
        scene.on_surface_ready(&mut fx.ctx()).unwrap();
        assert!(fx.backend.count(|c| matches!(c, Command::CreateBuffer { .. })) > 0);
        assert_eq!(
            scene.model(ModelId(0)).unwrap().state.shader,
            BuiltinShader::DefaultColor.id()
        );
    }
}
