use crate::config::EngineConfig;
use crate::gfx::backend::{BlendFunc, Viewport};

/// Renderer-wide state shared by everything drawn in one frame
///
/// Only the renderer mutates it, at three points: context creation bumps the
/// context version, a surface resize bumps the orientation version, and every
/// tick advances the clock.
#[derive(Debug, Clone)]
pub struct FrameState {
    context_version: u64,
    orientation_version: u64,
    surface: Viewport,

    /// Animation clock, the sum of every clamped delta
    time_ms: u64,
    delta_ms: u64,
    raw_delta_ms: u64,
    /// Host time of the previous tick, `None` before the first tick after a start or resume
    last_tick_ms: Option<u64>,
    paused: bool,
    max_frame_time_ms: u64,

    /// Blend pair for models without a personal override
    pub default_blend: BlendFunc,
    /// Device-resident buffers (true) or client-side arrays (false)
    pub vbo_enabled: bool,
    /// When false the clock stands still
    pub animation_enabled: bool,
}

impl FrameState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            context_version: 0,
            orientation_version: 0,
            surface: Viewport::default(),
            time_ms: 0,
            delta_ms: 0,
            raw_delta_ms: 0,
            last_tick_ms: None,
            paused: false,
            max_frame_time_ms: config.max_frame_time_ms,
            default_blend: config.default_blend,
            vbo_enabled: config.vbo_enabled,
            animation_enabled: config.animation_enabled,
        }
    }

    /// Version every GPU resource compares itself against
    pub fn context_version(&self) -> u64 {
        self.context_version
    }

    /// Invalidates every GPU handle created so far
    pub fn bump_context_version(&mut self) -> u64 {
        self.context_version += 1;
        self.context_version
    }

    pub fn orientation_version(&self) -> u64 {
        self.orientation_version
    }

    pub fn bump_orientation_version(&mut self) -> u64 {
        self.orientation_version += 1;
        self.orientation_version
    }

    pub fn surface(&self) -> Viewport {
        self.surface
    }

    pub fn set_surface(&mut self, surface: Viewport) {
        self.surface = surface;
    }

    pub fn max_frame_time_ms(&self) -> u64 {
        self.max_frame_time_ms
    }

    pub fn set_max_frame_time_ms(&mut self, millis: u64) {
        self.max_frame_time_ms = millis;
    }

    /// Advances the clock to the host time `now_ms`.
    ///
    /// The first tick, and the first tick after [`resume`](Self::resume), only
    /// records the host time. Later ticks advance the animation clock by the
    /// elapsed host time, clamped to the max frame time. While paused or with
    /// animation disabled the clock does not move and the delta is zero. A host
    /// clock running backwards gives a zero delta.
    pub fn advance_time(&mut self, now_ms: u64) {
        let elapsed = self
            .last_tick_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.raw_delta_ms = elapsed;
        self.last_tick_ms = Some(self.last_tick_ms.map_or(now_ms, |last| last.max(now_ms)));

        if self.paused || !self.animation_enabled {
            self.delta_ms = 0;
            return;
        }
        self.delta_ms = elapsed.min(self.max_frame_time_ms);
        self.time_ms += self.delta_ms;
    }

    /// Animation time in milliseconds, frozen while paused
    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    /// Clamped time since the previous tick
    pub fn delta_ms(&self) -> u64 {
        self.delta_ms
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta_ms as f32 / 1000.0
    }

    /// Unclamped wall-clock time since the previous tick, used for statistics
    pub fn raw_delta_ms(&self) -> u64 {
        self.raw_delta_ms
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.delta_ms = 0;
    }

    /// Restarts the clock without a jump over the paused period
    pub fn resume(&mut self) {
        self.paused = false;
        self.last_tick_ms = None;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_only_grow() {
        let mut frame = FrameState::default();
        assert_eq!(frame.context_version(), 0);
        assert_eq!(frame.bump_context_version(), 1);
        assert_eq!(frame.bump_context_version(), 2);
        assert_eq!(frame.bump_orientation_version(), 1);
        assert_eq!(frame.context_version(), 2);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut frame = FrameState::new(&EngineConfig::default().with_max_frame_time_ms(150));
        frame.advance_time(1_000);
        assert_eq!(frame.delta_ms(), 0);
        assert_eq!(frame.time_ms(), 0);

        frame.advance_time(1_016);
        assert_eq!(frame.delta_ms(), 16);

        frame.advance_time(5_000);
        assert_eq!(frame.delta_ms(), 150);
        assert_eq!(frame.raw_delta_ms(), 3_984);
        assert_eq!(frame.time_ms(), 166);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut frame = FrameState::default();
        frame.advance_time(100);
        frame.advance_time(150);
        frame.pause();
        frame.advance_time(400);
        assert_eq!(frame.time_ms(), 50);
        assert_eq!(frame.delta_ms(), 0);

        frame.resume();
        frame.advance_time(10_000);
        assert_eq!(frame.delta_ms(), 0);
        assert_eq!(frame.time_ms(), 50);
        frame.advance_time(10_020);
        assert_eq!(frame.delta_ms(), 20);
        assert_eq!(frame.time_ms(), 70);
    }

    #[test]
    fn test_disabled_animation_keeps_delta_zero() {
        let mut frame = FrameState::new(&EngineConfig::default().with_animation(false));
        frame.advance_time(100);
        frame.advance_time(200);
        assert_eq!(frame.delta_ms(), 0);
        assert_eq!(frame.time_ms(), 0);
        assert_eq!(frame.raw_delta_ms(), 100);
    }

    #[test]
    fn test_backwards_clock_gives_zero_delta() {
        let mut frame = FrameState::default();
        frame.advance_time(500);
        frame.advance_time(400);
        assert_eq!(frame.delta_ms(), 0);
        frame.advance_time(520);
        assert_eq!(frame.delta_ms(), 20);
    }
}
