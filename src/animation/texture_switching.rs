use super::Animation;
use crate::gfx::rendering::FrameState;
use crate::gfx::scene::ModelState;
use crate::gfx::texture::TextureId;

/// Flip-book animation over a list of textures
///
/// Frames are timed against [`FrameState::time_ms`], the clamped animation
/// clock. At most one frame is stepped per tick, so after a long stall the
/// flip-book resumes from the frame it was showing.
#[derive(Debug, Clone)]
pub struct TextureSwitchingAnimation {
    frames: Vec<TextureId>,
    frame_time_ms: f32,
    infinite: bool,

    current: usize,
    last_switch: Option<u64>,
    finished: bool,
}

impl TextureSwitchingAnimation {
    pub fn new(frames: Vec<TextureId>, frame_time_ms: f32) -> Self {
        Self {
            frames,
            frame_time_ms,
            infinite: true,
            current: 0,
            last_switch: None,
            finished: false,
        }
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }
}

impl Animation for TextureSwitchingAnimation {
    fn animate(&mut self, frame: &FrameState, state: &mut ModelState) -> bool {
        if self.finished {
            return true;
        }
        if self.frames.is_empty() {
            self.finished = true;
            return true;
        }

        let now = frame.time_ms();
        match self.last_switch {
            None => {
                self.current = 0;
                self.last_switch = Some(now);
            }
            Some(last) if now.saturating_sub(last) as f32 >= self.frame_time_ms => {
                self.current += 1;
                if self.current >= self.frames.len() {
                    if self.infinite {
                        self.current = 0;
                    } else {
                        self.current = self.frames.len() - 1;
                        self.finished = true;
                    }
                }
                self.last_switch = Some(now);
            }
            Some(_) => return false,
        }

        state.texture = Some(self.frames[self.current]);
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

    fn ids() -> Vec<TextureId> {
        vec![TextureId(1000), TextureId(1001), TextureId(1002)]
    }

    #[test]
    fn test_one_shot_freezes_on_last_frame() {
        let mut anim = TextureSwitchingAnimation::new(ids(), 100.0).with_infinite(false);
        let mut state = ModelState::new("flipbook");
        let mut frame = frame_at(0);

        anim.animate(&frame, &mut state);
        assert_eq!(state.texture, Some(TextureId(1000)));

        frame.advance_time(50);
        anim.animate(&frame, &mut state);
        assert_eq!(state.texture, Some(TextureId(1000)));

        for t in [100, 200, 300, 400] {
            frame.advance_time(t);
            anim.animate(&frame, &mut state);
        }
        assert_eq!(state.texture, Some(TextureId(1002)));
        assert!(anim.is_finished());
    }

    #[test]
    fn test_infinite_wraps() {
        let mut anim = TextureSwitchingAnimation::new(ids(), 10.0);
        let mut state = ModelState::new("flipbook");
        let mut frame = frame_at(0);
        anim.animate(&frame, &mut state);
        for t in [10, 20, 30] {
            frame.advance_time(t);
            anim.animate(&frame, &mut state);
        }
        assert_eq!(anim.current_frame(), 0);
        assert_eq!(state.texture, Some(TextureId(1000)));
        assert!(!anim.is_finished());
    }

    #[test]
    fn test_stall_steps_a_single_frame() {
        let mut anim = TextureSwitchingAnimation::new(ids(), 10.0);
        let mut state = ModelState::new("flipbook");
        let mut frame = frame_at(0);
        frame.set_max_frame_time_ms(100);
        anim.animate(&frame, &mut state);

        // Ten frames would be due on the clamped clock
        frame.advance_time(60_000);
        assert_eq!(frame.time_ms(), 100);
        anim.animate(&frame, &mut state);
        assert_eq!(anim.current_frame(), 1);
        assert_eq!(state.texture, Some(TextureId(1001)));

        // Same clock reading, nothing more to step
        anim.animate(&frame, &mut state);
        assert_eq!(anim.current_frame(), 1);
    }

    #[test]
    fn test_empty_list_finishes() {
        let mut anim = TextureSwitchingAnimation::new(Vec::new(), 10.0);
        let mut state = ModelState::new("nothing");
        assert!(anim.animate(&frame_at(0), &mut state));
        assert_eq!(state.texture, None);
    }
}
