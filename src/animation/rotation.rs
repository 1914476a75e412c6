use super::Animation;
use crate::gfx::rendering::FrameState;
use crate::gfx::scene::ModelState;
use crate::math::Axis;

/// Spins a model at a constant speed in degrees per second
///
/// Driven by the clamped frame delta, so a stall never produces a visible jump.
/// It never finishes.
#[derive(Debug, Clone)]
pub struct AxisRotationAnimation {
    speed: f32,
    axis: Axis,
    second: Option<(f32, Axis)>,
}

impl AxisRotationAnimation {
    pub fn new(speed: f32, axis: Axis) -> Self {
        Self {
            speed,
            axis,
            second: None,
        }
    }

    /// Spins around `axis` at the same time
    pub fn with_second_axis(mut self, speed: f32, axis: Axis) -> Self {
        self.second = Some((speed, axis));
        self
    }
}

impl Animation for AxisRotationAnimation {
    fn animate(&mut self, frame: &FrameState, state: &mut ModelState) -> bool {
        let dt = frame.delta_seconds();
        state.transform.add_to_rotation(self.axis, self.speed * dt);
        if let Some((speed, axis)) = self.second {
            state.transform.add_to_rotation(axis, speed * dt);
        }
        false
    }

    fn is_finished(&self) -> bool {
        false
    }
}
