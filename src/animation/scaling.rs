use super::{linear_progress, Animation, Easing};
use crate::gfx::rendering::FrameState;
use crate::gfx::scene::ModelState;
use crate::math::Axis;

/// Scales a model on one axis, or uniformly, between two factors
///
/// An infinite scaling swaps its ends every time it reaches the target, so it
/// pulses back and forth.
#[derive(Debug, Clone)]
pub struct ScalingAnimation {
    from: f32,
    to: f32,
    duration_ms: f32,
    axis: Option<Axis>,
    easing: Easing,
    infinite: bool,

    finished: bool,
    started_at: Option<u64>,
}

impl ScalingAnimation {
    /// Uniform scaling on all three axes
    pub fn new(from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            duration_ms,
            axis: None,
            easing: Easing::Linear,
            infinite: false,
            finished: false,
            started_at: None,
        }
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    /// True while the current leg grows the model
    pub fn is_increasing(&self) -> bool {
        self.from < self.to
    }

    fn apply(&self, state: &mut ModelState, factor: f32) {
        match self.axis {
            Some(axis) => state.transform.set_scale_axis(axis, factor),
            None => state.transform.set_scale_uniform(factor),
        }
    }
}

impl Animation for ScalingAnimation {
    fn animate(&mut self, frame: &FrameState, state: &mut ModelState) -> bool {
        let now = frame.time_ms();
        let started_at = match self.started_at {
            Some(at) => at,
            None => {
                self.apply(state, self.from);
                self.started_at = Some(now);
                now
            }
        };

        if self.finished {
            return true;
        }

        let progress = linear_progress(now.saturating_sub(started_at), self.duration_ms);
        if progress >= 1.0 {
            self.apply(state, self.to);
            if self.infinite {
                std::mem::swap(&mut self.from, &mut self.to);
            } else {
                self.finished = true;
            }
            self.started_at = Some(now);
        } else {
            let eased = self.easing.apply(progress);
            self.apply(state, self.from + (self.to - self.from) * eased);
        }

        self.finished
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::frame_at;
    use approx::assert_relative_eq;
    use cgmath::Vector3;

    #[test]
    fn test_uniform_scaling() {
        let mut anim = ScalingAnimation::new(1.0, 3.0, 200.0);
        let mut state = ModelState::new("grow");
        let mut frame = frame_at(0);
        anim.animate(&frame, &mut state);
        assert_eq!(state.transform.scale(), Vector3::new(1.0, 1.0, 1.0));

        frame.advance_time(100);
        anim.animate(&frame, &mut state);
        assert_relative_eq!(state.transform.scale(), Vector3::new(2.0, 2.0, 2.0));

        frame.advance_time(250);
        assert!(anim.animate(&frame, &mut state));
        assert_eq!(state.transform.scale(), Vector3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_single_axis_pulses_when_infinite() {
        let mut anim = ScalingAnimation::new(1.0, 2.0, 100.0)
            .on_axis(Axis::Y)
            .with_infinite(true);
        let mut state = ModelState::new("pulse");
        let mut frame = frame_at(0);
        anim.animate(&frame, &mut state);
        assert!(anim.is_increasing());

        frame.advance_time(100);
        assert!(!anim.animate(&frame, &mut state));
        assert_eq!(state.transform.scale().y, 2.0);
        assert!(!anim.is_increasing());

        frame.advance_time(150);
        anim.animate(&frame, &mut state);
        assert_relative_eq!(state.transform.scale().y, 1.5);
        assert_eq!(state.transform.scale().x, 1.0);
    }

    #[test]
    fn test_non_positive_duration_completes_immediately() {
        for duration in [0.0, -10.0] {
            let mut anim = ScalingAnimation::new(0.5, 4.0, duration);
            let mut state = ModelState::new("pop");
            assert!(anim.animate(&frame_at(7), &mut state));
            assert_eq!(state.transform.scale(), Vector3::new(4.0, 4.0, 4.0));
            assert!(state.transform.scale().x.is_finite());
        }
    }
}
