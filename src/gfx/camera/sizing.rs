//! How many world units the camera shows for a given surface aspect ratio.

/// Visible width and height in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extents {
    pub width: f32,
    pub height: f32,
}

impl Extents {
    pub const ZERO: Extents = Extents {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Rule turning an aspect ratio into [`Extents`]
///
/// Every policy keeps `width / height` equal to the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingPolicy {
    /// Width is fixed, height follows the aspect ratio
    FixedHorizontal(f32),
    /// Height is fixed, width follows the aspect ratio
    FixedVertical(f32),
    /// Smallest area that still contains the whole box
    InnerBorder { width: f32, height: f32 },
    /// Largest area that still fits inside the box
    OuterBorder { width: f32, height: f32 },
    /// Length of the diagonal is fixed
    FixedDiagonal(f32),
}

impl Default for SizingPolicy {
    fn default() -> Self {
        SizingPolicy::FixedHorizontal(10.0)
    }
}

impl SizingPolicy {
    /// Extents for `aspect_ratio`; zero for a non-positive or non-finite ratio
    pub fn extents(&self, aspect_ratio: f32) -> Extents {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Extents::ZERO;
        }
        let by_width = |width: f32| Extents::new(width, width / aspect_ratio);
        let by_height = |height: f32| Extents::new(height * aspect_ratio, height);

        match *self {
            SizingPolicy::FixedHorizontal(width) => by_width(width),
            SizingPolicy::FixedVertical(height) => by_height(height),
            SizingPolicy::InnerBorder { width, height } => {
                if width / aspect_ratio >= height {
                    by_width(width)
                } else {
                    by_height(height)
                }
            }
            SizingPolicy::OuterBorder { width, height } => {
                if width / aspect_ratio <= height {
                    by_width(width)
                } else {
                    by_height(height)
                }
            }
            SizingPolicy::FixedDiagonal(diagonal) => {
                by_height(diagonal / (1.0 + aspect_ratio * aspect_ratio).sqrt())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const POLICIES: [SizingPolicy; 5] = [
        SizingPolicy::FixedHorizontal(10.0),
        SizingPolicy::FixedVertical(6.0),
        SizingPolicy::InnerBorder {
            width: 8.0,
            height: 5.0,
        },
        SizingPolicy::OuterBorder {
            width: 8.0,
            height: 5.0,
        },
        SizingPolicy::FixedDiagonal(12.0),
    ];

    #[test]
    fn test_every_policy_keeps_aspect_ratio() {
        for policy in POLICIES {
            for aspect in [0.25_f32, 0.5625, 1.0, 1.7777, 3.0] {
                let e = policy.extents(aspect);
                assert_relative_eq!(e.width / e.height, aspect, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_inner_border_contains_box() {
        let policy = SizingPolicy::InnerBorder {
            width: 8.0,
            height: 5.0,
        };
        for aspect in [0.5_f32, 1.0, 1.6, 2.0, 4.0] {
            let e = policy.extents(aspect);
            assert!(e.width >= 8.0 - 1e-4 && e.height >= 5.0 - 1e-4);
        }
    }

    #[test]
    fn test_outer_border_fits_inside_box() {
        let policy = SizingPolicy::OuterBorder {
            width: 8.0,
            height: 5.0,
        };
        for aspect in [0.5_f32, 1.0, 1.6, 2.0, 4.0] {
            let e = policy.extents(aspect);
            assert!(e.width <= 8.0 + 1e-4 && e.height <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_fixed_diagonal_length() {
        let e = SizingPolicy::FixedDiagonal(10.0).extents(4.0 / 3.0);
        assert_relative_eq!(e.width, 8.0, max_relative = 1e-5);
        assert_relative_eq!(e.height, 6.0, max_relative = 1e-5);
    }

    #[test]
    fn test_degenerate_ratio_gives_zero_extents() {
        for policy in POLICIES {
            assert_eq!(policy.extents(0.0), Extents::ZERO);
            assert_eq!(policy.extents(f32::NAN), Extents::ZERO);
            assert_eq!(policy.extents(f32::INFINITY), Extents::ZERO);
        }
    }
}
