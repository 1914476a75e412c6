//! # Window Host
//!
//! [`GladeApp`] opens a winit window, creates a [`WgpuBackend`] for it and drives a
//! [`Renderer`] through its lifecycle:
//!
//! - window creation → `on_context_created`, then `on_surface_resized`
//! - `Resized` → surface reconfiguration, then `on_surface_resized`
//! - `RedrawRequested` → `on_tick`
//! - mouse (pointer 0) and touch (pointer `id + 1`) → `on_touch`
//! - suspend / occlusion → `on_pause`, and back → `on_resume`
//!
//! By default a redraw is requested every time the loop goes idle.
//! [`GladeApp::with_target_fps`] paces redraws to a fixed rate instead, and a
//! paused app requests no redraws at all.
//!
//! When the device is lost a new backend is created for the same window and the
//! renderer is told about the new context; resources rebuild on next use.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, Touch, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::EngineConfig;
use crate::gfx::backend::{WgpuBackend, WgpuBackendOptions};
use crate::gfx::rendering::Renderer;
use crate::gfx::scene::Scene;
use crate::gfx::texture::{AssetLoader, MemoryAssets};
use crate::motion::{TouchEvent, TouchPhase};

/// Pointer id used for the mouse; touches use their winit id plus one
pub const MOUSE_POINTER_ID: u64 = 0;

/// Spaces redraw requests at least `interval` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FramePacer {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl FramePacer {
    fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// `None` when a frame is due at `now`, otherwise the instant to wait for.
    ///
    /// Claiming a frame schedules the next one an interval later.
    fn poll(&mut self, now: Instant) -> Option<Instant> {
        let interval = self.interval?;
        match self.next {
            Some(next) if now < next => Some(next),
            _ => {
                self.next = Some(now + interval);
                None
            }
        }
    }

    /// Makes the next poll due immediately
    fn reset(&mut self) {
        self.next = None;
    }
}

/// Windowed application running one [`Scene`]
pub struct GladeApp {
    state: AppState,
}

struct AppState {
    title: String,
    size: LogicalSize<u32>,
    config: EngineConfig,
    options: WgpuBackendOptions,
    assets: Option<Box<dyn AssetLoader>>,
    scene: Option<Scene>,

    window: Option<Arc<Window>>,
    renderer: Option<Renderer<WgpuBackend>>,
    cursor: PhysicalPosition<f64>,
    mouse_down: bool,
    paused: bool,
    pacer: FramePacer,
    error: Option<anyhow::Error>,
}

impl GladeApp {
    pub fn new(scene: Scene) -> Self {
        Self {
            state: AppState {
                title: "glade".to_string(),
                size: LogicalSize::new(1200, 800),
                config: EngineConfig::from_env(),
                options: WgpuBackendOptions::default(),
                assets: None,
                scene: Some(scene),
                window: None,
                renderer: None,
                cursor: PhysicalPosition::new(0.0, 0.0),
                mouse_down: false,
                paused: false,
                pacer: FramePacer::default(),
                error: None,
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.state.title = title.into();
        self
    }

    /// Initial window size in logical pixels
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.state.size = LogicalSize::new(width, height);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.state.config = config;
        self
    }

    pub fn with_backend_options(mut self, options: WgpuBackendOptions) -> Self {
        self.state.options = options;
        self
    }

    /// Redraws at most `fps` times per second. Zero, negative or non-finite
    /// values go back to redrawing whenever the loop is idle.
    pub fn with_target_fps(mut self, fps: f32) -> Self {
        let interval = (fps.is_finite() && fps > 0.0).then(|| Duration::from_secs_f32(1.0 / fps));
        self.state.pacer = FramePacer::new(interval);
        self
    }

    /// Where textures are loaded from; defaults to an empty [`MemoryAssets`]
    pub fn with_assets(mut self, assets: impl AssetLoader + 'static) -> Self {
        self.state.assets = Some(Box::new(assets));
        self
    }

    /// Runs the event loop until the window closes.
    ///
    /// Returns the error that stopped the loop, if any.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.state)
            .context("event loop terminated abnormally")?;
        match self.state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn create_renderer(&mut self, window: Arc<Window>) -> anyhow::Result<Renderer<WgpuBackend>> {
        let PhysicalSize { width, height } = window.inner_size();
        let backend = WgpuBackend::new_blocking(window, width, height, self.options.clone())
            .context("failed to create the wgpu backend")?;

        let assets = self
            .assets
            .take()
            .unwrap_or_else(|| Box::new(MemoryAssets::new()) as Box<dyn AssetLoader>);
        let mut renderer = Renderer::new(backend, assets, self.config.clone());
        if let Some(scene) = self.scene.take() {
            renderer.set_scene(scene).context("scene failed to attach")?;
        }
        if let Err(err) = renderer.on_context_created() {
            // individual models and shaders retry or report on their own
            warn!("Context setup incomplete: {}", err);
        }
        renderer.on_surface_resized(width, height);
        Ok(renderer)
    }

    /// Builds a backend on a new device and hands it to the renderer
    fn recover_device(&mut self) -> anyhow::Result<()> {
        let (Some(window), Some(renderer)) = (self.window.clone(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let PhysicalSize { width, height } = window.inner_size();
        let backend = WgpuBackend::new_blocking(window, width, height, self.options.clone())
            .context("failed to recreate the wgpu backend after device loss")?;
        drop(renderer.replace_backend(backend));
        if let Err(err) = renderer.on_context_created() {
            warn!("Context setup incomplete after device loss: {}", err);
        }
        renderer.on_surface_resized(width, height);
        info!("Recovered from device loss");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        self.pacer.reset();
        if let Some(renderer) = self.renderer.as_mut() {
            if paused {
                renderer.on_pause();
            } else {
                renderer.on_resume();
            }
        }
    }

    fn send_touch(&mut self, event: TouchEvent) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.on_touch(&event);
        }
    }

    fn mouse_event(&mut self, phase: TouchPhase) {
        let event = TouchEvent::new(
            MOUSE_POINTER_ID,
            phase,
            self.cursor.x as f32,
            self.cursor.y as f32,
        );
        self.send_touch(event);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if renderer.backend().is_device_lost() {
            if let Err(err) = self.recover_device() {
                self.fail(event_loop, err);
            }
            return;
        }
        if let Err(err) = renderer.on_tick() {
            warn!("Frame skipped: {}", err);
        }
    }
}

fn touch_phase(phase: winit::event::TouchPhase) -> TouchPhase {
    match phase {
        winit::event::TouchPhase::Started => TouchPhase::Down,
        winit::event::TouchPhase::Moved => TouchPhase::Move,
        winit::event::TouchPhase::Ended => TouchPhase::Up,
        winit::event::TouchPhase::Cancelled => TouchPhase::Cancel,
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.set_paused(false);
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(self.size);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("failed to create window"));
                return;
            }
        };
        self.window = Some(window.clone());

        match self.create_renderer(window) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.set_paused(true);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.backend_mut().resize(width, height);
                    renderer.on_surface_resized(width, height);
                }
            }
            WindowEvent::Occluded(occluded) => self.set_paused(occluded),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                if self.mouse_down {
                    self.mouse_event(TouchPhase::Move);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if pressed != self.mouse_down {
                    self.mouse_down = pressed;
                    self.mouse_event(if pressed { TouchPhase::Down } else { TouchPhase::Up });
                }
            }
            WindowEvent::CursorLeft { .. } if self.mouse_down => {
                self.mouse_down = false;
                self.mouse_event(TouchPhase::Cancel);
            }
            WindowEvent::Touch(Touch {
                id, phase, location, ..
            }) => {
                let event = TouchEvent::new(
                    id + 1,
                    touch_phase(phase),
                    location.x as f32,
                    location.y as f32,
                );
                self.send_touch(event);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.paused {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        if let Some(deadline) = self.pacer.poll(Instant::now()) {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            return;
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
        event_loop.set_control_flow(match self.pacer.next {
            Some(next) => ControlFlow::WaitUntil(next),
            None => ControlFlow::Poll,
        });
    }
}
