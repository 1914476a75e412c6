use super::Animation;
use crate::gfx::rendering::FrameState;
use crate::gfx::scene::ModelState;

/// Runs several animations on one model every tick
///
/// Finished only once every child has finished. With eviction enabled, children
/// are dropped after the tick on which they finish.
#[derive(Debug, Default)]
pub struct AnimationList {
    animations: Vec<Box<dyn Animation>>,
    evict_finished: bool,
    finished: bool,
}

impl AnimationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eviction(mut self, evict_finished: bool) -> Self {
        self.evict_finished = evict_finished;
        self
    }

    pub fn with(mut self, animation: impl Animation + 'static) -> Self {
        self.push(animation);
        self
    }

    pub fn push(&mut self, animation: impl Animation + 'static) {
        self.animations.push(Box::new(animation));
        self.finished = false;
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl Animation for AnimationList {
    fn animate(&mut self, frame: &FrameState, state: &mut ModelState) -> bool {
        let mut all_finished = true;
        let evict = self.evict_finished;
        self.animations.retain_mut(|animation| {
            let finished = animation.animate(frame, state);
            all_finished &= finished;
            !(evict && finished)
        });
        self.finished = all_finished;
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
    use crate::animation::{AxisMovementAnimation, AxisRotationAnimation, ScalingAnimation};
    use crate::math::Axis;

    #[test]
    fn test_finishes_when_all_children_do() {
        let mut list = AnimationList::new()
            .with(AxisMovementAnimation::new(Axis::X, 0.0, 1.0, 100.0))
            .with(ScalingAnimation::new(1.0, 2.0, 300.0));
        let mut state = ModelState::new("combo");
        let mut frame = frame_at(0);

        assert!(!list.animate(&frame, &mut state));
        frame.advance_time(100);
        assert!(!list.animate(&frame, &mut state));
        frame.advance_time(300);
        assert!(list.animate(&frame, &mut state));
        assert_eq!(list.len(), 2);
        assert_eq!(state.transform.position().x, 1.0);
        assert_eq!(state.transform.scale().z, 2.0);
    }

    #[test]
    fn test_eviction_drops_finished_children() {
        let mut list = AnimationList::new()
            .with_eviction(true)
            .with(AxisMovementAnimation::new(Axis::X, 0.0, 1.0, 0.0))
            .with(AxisRotationAnimation::new(10.0, Axis::Z));
        let mut state = ModelState::new("combo");

        assert!(!list.animate(&frame_at(0), &mut state));
        assert_eq!(list.len(), 1);
        assert!(!list.is_finished());
    }

    #[test]
    fn test_push_reopens_list() {
        let mut list = AnimationList::new();
        let mut state = ModelState::new("combo");
        assert!(list.animate(&frame_at(0), &mut state));
        list.push(ScalingAnimation::new(1.0, 2.0, 100.0));
        assert!(!list.is_finished());
    }
}
