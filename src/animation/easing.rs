use std::f32::consts::PI;
use std::fmt;

/// Maps linear progress in `[0, 1]` onto eased progress
#[derive(Clone, Copy, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Starts slow, accelerates
    EaseIn,
    /// Starts fast, decelerates
    EaseOut,
    /// Slow at both ends
    EaseInOut,
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// Input is clamped to `[0, 1]` first
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
            Easing::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("Linear"),
            Easing::EaseIn => f.write_str("EaseIn"),
            Easing::EaseOut => f.write_str("EaseOut"),
            Easing::EaseInOut => f.write_str("EaseInOut"),
            Easing::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_shapes() {
        assert!(Easing::EaseIn.apply(0.5) < 0.5);
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
        assert_abs_diff_eq!(Easing::EaseInOut.apply(0.5), 0.5, epsilon = 1e-6);
        assert_eq!(Easing::Custom(|t| t * 0.5).apply(4.0), 0.5);
    }
}
