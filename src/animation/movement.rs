use super::{linear_progress, Animation, Easing};
use crate::gfx::rendering::FrameState;
use crate::gfx::scene::ModelState;
use crate::math::Axis;

/// Moves a model along one axis from a start to an end value
///
/// When a leg completes, the flags pick what happens next:
///
/// | `return_to_start` | `infinite` | after reaching the end             |
/// |-------------------|------------|------------------------------------|
/// | false             | false      | stop at the end                    |
/// | false             | true       | jump back to the start and replay  |
/// | true              | false      | play back to the start, then stop  |
/// | true              | true       | ping-pong forever                  |
#[derive(Debug, Clone)]
pub struct AxisMovementAnimation {
    axis: Axis,
    from: f32,
    to: f32,
    duration_ms: f32,
    easing: Easing,
    infinite: bool,
    return_to_start: bool,

    current: f32,
    returning: bool,
    finished: bool,
    started_at: Option<u64>,
}

impl AxisMovementAnimation {
    pub fn new(axis: Axis, from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            axis,
            from,
            to,
            duration_ms,
            easing: Easing::Linear,
            infinite: false,
            return_to_start: false,
            current: from,
            returning: false,
            finished: false,
            started_at: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    pub fn with_return_to_start(mut self, return_to_start: bool) -> Self {
        self.return_to_start = return_to_start;
        self
    }

    /// Value written on the last tick
    pub fn current(&self) -> f32 {
        self.current
    }

    fn swap_ends(&mut self) {
        self.current = self.to;
        std::mem::swap(&mut self.from, &mut self.to);
    }

    fn next_leg(&mut self) {
        match (self.return_to_start, self.returning, self.infinite) {
            (false, _, true) => self.current = self.from,
            (false, _, false) => {
                self.current = self.to;
                self.finished = true;
            }
            (true, false, _) => {
                self.returning = true;
                self.swap_ends();
            }
            (true, true, true) => {
                self.returning = false;
                self.swap_ends();
            }
            (true, true, false) => {
                self.current = self.to;
                self.finished = true;
            }
        }
    }
}

impl Animation for AxisMovementAnimation {
    fn animate(&mut self, frame: &FrameState, state: &mut ModelState) -> bool {
        let now = frame.time_ms();
        let started_at = match self.started_at {
            Some(at) => at,
            None => {
                state.transform.set_position_axis(self.axis, self.from);
                self.started_at = Some(now);
                now
            }
        };

        if self.finished {
            return true;
        }

        let progress = linear_progress(now.saturating_sub(started_at), self.duration_ms);
        if progress >= 1.0 {
            self.next_leg();
            self.started_at = Some(now);
        } else {
            let eased = self.easing.apply(progress);
            self.current = self.from + (self.to - self.from) * eased;
        }

        state.transform.set_position_axis(self.axis, self.current);
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

    fn x(state: &ModelState) -> f32 {
        state.transform.position().x
    }

    #[test]
    fn test_one_shot_stops_at_end() {
        let mut anim = AxisMovementAnimation::new(Axis::X, 0.0, 10.0, 1000.0);
        let mut state = ModelState::new("mover");
        let mut frame = frame_at(2_000);

        anim.animate(&frame, &mut state);
        assert_eq!(x(&state), 0.0);

        frame.advance_time(2_500);
        assert!(!anim.animate(&frame, &mut state));
        assert_relative_eq!(x(&state), 5.0);

        frame.advance_time(3_000);
        assert!(anim.animate(&frame, &mut state));
        assert_eq!(x(&state), 10.0);
        assert!(anim.is_finished());

        frame.advance_time(4_000);
        assert!(anim.animate(&frame, &mut state));
        assert_eq!(x(&state), 10.0);
    }

    #[test]
    fn test_infinite_ping_pong() {
        let mut anim = AxisMovementAnimation::new(Axis::Y, 0.0, 10.0, 1000.0)
            .with_infinite(true)
            .with_return_to_start(true);
        let mut state = ModelState::new("pendulum");
        let mut frame = frame_at(0);
        anim.animate(&frame, &mut state);

        frame.advance_time(1_000);
        anim.animate(&frame, &mut state);
        assert_eq!(state.transform.position().y, 10.0);

        frame.advance_time(1_500);
        anim.animate(&frame, &mut state);
        assert_relative_eq!(state.transform.position().y, 5.0);

        frame.advance_time(2_000);
        anim.animate(&frame, &mut state);
        assert_eq!(state.transform.position().y, 0.0);

        for t in (2_100..10_000).step_by(100) {
            frame.advance_time(t);
            assert!(!anim.animate(&frame, &mut state));
        }
    }

    #[test]
    fn test_return_once_then_stop() {
        let mut anim =
            AxisMovementAnimation::new(Axis::X, 2.0, 4.0, 100.0).with_return_to_start(true);
        let mut state = ModelState::new("bounce");
        let mut frame = frame_at(0);
        anim.animate(&frame, &mut state);
        frame.advance_time(100);
        assert!(!anim.animate(&frame, &mut state));
        assert_eq!(x(&state), 4.0);
        frame.advance_time(200);
        assert!(anim.animate(&frame, &mut state));
        assert_eq!(x(&state), 2.0);
    }

    #[test]
    fn test_infinite_without_return_restarts() {
        let mut anim = AxisMovementAnimation::new(Axis::X, 0.0, 10.0, 100.0).with_infinite(true);
        let mut state = ModelState::new("loop");
        let mut frame = frame_at(0);
        anim.animate(&frame, &mut state);
        frame.advance_time(100);
        anim.animate(&frame, &mut state);
        assert_eq!(x(&state), 0.0);
        frame.advance_time(150);
        anim.animate(&frame, &mut state);
        assert_relative_eq!(x(&state), 5.0);
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut anim = AxisMovementAnimation::new(Axis::Z, 1.0, 3.0, 0.0);
        let mut state = ModelState::new("instant");
        assert!(anim.animate(&frame_at(50), &mut state));
        assert_eq!(state.transform.position().z, 3.0);
    }
}
