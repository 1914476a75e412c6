//! # Animations
//!
//! Small time-driven state machines that mutate one model's [`ModelState`] every
//! tick. Time is read from [`FrameState::time_ms`] and the start time is captured
//! on the first tick, not at construction, so an animation attached long before
//! its model is drawn still plays from the beginning.
//!
//! | Type                          | Drives                            | Finishes |
//! |-------------------------------|-----------------------------------|----------|
//! | [`AxisMovementAnimation`]     | position on one axis              | optional |
//! | [`AxisRotationAnimation`]     | rotation on one or two axes       | never    |
//! | [`ScalingAnimation`]          | scale on one axis or all three    | optional |
//! | [`TextureSwitchingAnimation`] | the model's texture id            | optional |
//! | [`AnimationList`]             | any number of the above           | when all children are |
//!
//! Animations never fail. Degenerate input such as a zero duration completes
//! immediately.
//!
//! ```
//! use glade::animation::{Animation, AxisMovementAnimation, Easing};
//! use glade::gfx::{rendering::FrameState, scene::ModelState};
//! use glade::math::Axis;
//!
//! let mut slide = AxisMovementAnimation::new(Axis::X, 0.0, 10.0, 1000.0)
//!     .with_easing(Easing::EaseOut);
//! let mut state = ModelState::new("card");
//! let mut frame = FrameState::default();
//! frame.advance_time(0);
//! slide.animate(&frame, &mut state);
//! assert_eq!(state.transform.position().x, 0.0);
//! ```

pub mod easing;
pub mod list;
pub mod movement;
pub mod rotation;
pub mod scaling;
pub mod texture_switching;
pub mod transition;

pub use easing::Easing;
pub use list::AnimationList;
pub use movement::AxisMovementAnimation;
pub use rotation::AxisRotationAnimation;
pub use scaling::ScalingAnimation;
pub use texture_switching::TextureSwitchingAnimation;
pub use transition::Transition;

use std::fmt;

use crate::gfx::rendering::FrameState;
use crate::gfx::scene::ModelState;

/// Per-model time-driven mutator
pub trait Animation: fmt::Debug {
    /// Advances by one tick. Returns true once the animation has finished.
    fn animate(&mut self, frame: &FrameState, state: &mut ModelState) -> bool;

    fn is_finished(&self) -> bool;
}

/// Linear progress of `elapsed_ms` through `duration_ms`.
///
/// A non-positive (or NaN) duration counts as already complete.
pub(crate) fn linear_progress(elapsed_ms: u64, duration_ms: f32) -> f32 {
    if !(duration_ms > 0.0) {
        return 1.0;
    }
    elapsed_ms as f32 / duration_ms
}
