use super::{linear_progress, Easing};
use crate::gfx::rendering::FrameState;

/// A single value tweened over time, for state that is not a transform
///
/// Starts on the first [`update`](Self::update) and holds `to` once complete.
#[derive(Debug, Clone)]
pub struct Transition {
    from: f32,
    to: f32,
    duration_ms: f32,
    easing: Easing,
    value: f32,
    progress: f32,
    started_at: Option<u64>,
}

impl Transition {
    pub fn new(from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing: Easing::Linear,
            value: from,
            progress: 0.0,
            started_at: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn update(&mut self, frame: &FrameState) -> f32 {
        let now = frame.time_ms();
        let started_at = *self.started_at.get_or_insert(now);
        let progress = linear_progress(now.saturating_sub(started_at), self.duration_ms);

        if progress >= 1.0 {
            self.progress = 1.0;
            self.value = self.to;
        } else {
            self.progress = self.easing.apply(progress);
            self.value = self.from + (self.to - self.from) * self.progress;
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Eased progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Restarts on the next update
    pub fn restart(&mut self) {
        self.started_at = None;
        self.progress = 0.0;
        self.value = self.from;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::frame_at;
    use approx::assert_relative_eq;

    #[test]
    fn test_fade_out() {
        let mut fade = Transition::new(1.0, 0.0, 400.0);
        let mut frame = frame_at(1_000);
        assert_eq!(fade.update(&frame), 1.0);

        frame.advance_time(1_100);
        assert_relative_eq!(fade.update(&frame), 0.75);
        assert!(!fade.is_complete());

        frame.advance_time(2_000);
        assert_eq!(fade.update(&frame), 0.0);
        assert!(fade.is_complete());

        fade.restart();
        assert_eq!(fade.value(), 1.0);
        assert_eq!(fade.update(&frame), 1.0);
    }
}
