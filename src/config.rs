//! # Engine Configuration
//!
//! [`EngineConfig`] collects the renderer-wide knobs. It follows the usual
//! `Default` plus `with_*` builder shape, and [`EngineConfig::from_env`] layers
//! environment overrides on top for quick experiments without recompiling.
//!
//! | Variable                  | Effect                                  |
//! |---------------------------|-----------------------------------------|
//! | `GLADE_MAX_FRAME_TIME_MS` | clamp for the per-frame delta time      |
//! | `GLADE_DISABLE_VBO`       | draw from client-side arrays instead    |
//! | `GLADE_DISABLE_ANIMATION` | freeze animation time (delta is zero)   |

use crate::gfx::backend::{BlendFactor, BlendFunc};
use crate::math::Color;

/// Default clamp applied to the frame delta time
pub const DEFAULT_MAX_FRAME_TIME_MS: u64 = 150;

/// Renderer-wide configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Upper bound for the delta time handed to animations
    pub max_frame_time_ms: u64,
    /// Draw from device-resident buffers (true) or client-side arrays (false)
    pub vbo_enabled: bool,
    /// Blend function used by models without their own override
    pub default_blend: BlendFunc,
    /// Color the surface is cleared to every frame
    pub clear_color: Color,
    /// When false the delta time is always zero
    pub animation_enabled: bool,
    /// Number of simultaneously tracked pointers in the motion layer
    pub max_pointers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_frame_time_ms: DEFAULT_MAX_FRAME_TIME_MS,
            vbo_enabled: true,
            default_blend: BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            clear_color: Color::BLACK,
            animation_enabled: true,
            max_pointers: 1,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_time_ms(mut self, millis: u64) -> Self {
        self.max_frame_time_ms = millis;
        self
    }

    pub fn with_vbo(mut self, enabled: bool) -> Self {
        self.vbo_enabled = enabled;
        self
    }

    pub fn with_default_blend(mut self, blend: BlendFunc) -> Self {
        self.default_blend = blend;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_animation(mut self, enabled: bool) -> Self {
        self.animation_enabled = enabled;
        self
    }

    pub fn with_max_pointers(mut self, count: usize) -> Self {
        self.max_pointers = count.max(1);
        self
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("GLADE_MAX_FRAME_TIME_MS") {
            match raw.trim().parse::<u64>() {
                Ok(millis) => self.max_frame_time_ms = millis,
                Err(_) => log::warn!("ignoring GLADE_MAX_FRAME_TIME_MS={raw:?}: not a number"),
            }
        }
        if lookup("GLADE_DISABLE_VBO").is_some_and(|v| is_truthy(&v)) {
            self.vbo_enabled = false;
        }
        if lookup("GLADE_DISABLE_ANIMATION").is_some_and(|v| is_truthy(&v)) {
            self.animation_enabled = false;
        }
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
