//! # Pivot Alignment
//!
//! A pivot alignment says where the origin of a sized rectangle sits. Each of the
//! nine anchors splits the rectangle's width into a left and a right margin and its
//! height into a top and a bottom margin. Cameras use it to place the world origin
//! on screen; procedural rectangles and bounding shapes use it to place their
//! vertices around the model position.

/// Distances from the pivot to each edge of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// One of nine anchor points of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    #[default]
    Center,
    CenterTop,
    CenterBottom,
    CenterLeft,
    CenterRight,
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
}

impl Align {
    pub const ALL: [Align; 9] = [
        Align::Center,
        Align::CenterTop,
        Align::CenterBottom,
        Align::CenterLeft,
        Align::CenterRight,
        Align::LeftTop,
        Align::LeftBottom,
        Align::RightTop,
        Align::RightBottom,
    ];

    /// Margins as fractions of the rectangle's width and height
    ///
    /// `left + right == 1` and `top + bottom == 1` for every anchor.
    pub fn fractions(self) -> Margins {
        let (left, right) = match self {
            Align::Center | Align::CenterTop | Align::CenterBottom => (0.5, 0.5),
            Align::CenterLeft | Align::LeftTop | Align::LeftBottom => (0.0, 1.0),
            Align::CenterRight | Align::RightTop | Align::RightBottom => (1.0, 0.0),
        };
        let (top, bottom) = match self {
            Align::Center | Align::CenterLeft | Align::CenterRight => (0.5, 0.5),
            Align::CenterTop | Align::LeftTop | Align::RightTop => (0.0, 1.0),
            Align::CenterBottom | Align::LeftBottom | Align::RightBottom => (1.0, 0.0),
        };
        Margins {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Margins in units for a `width` x `height` rectangle
    pub fn margins(self, width: f32, height: f32) -> Margins {
        let f = self.fractions();
        Margins {
            left: f.left * width,
            right: f.right * width,
            top: f.top * height,
            bottom: f.bottom * height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractions_cover_whole_rectangle() {
        for align in Align::ALL {
            let f = align.fractions();
            assert_eq!(f.left + f.right, 1.0, "{align:?}");
            assert_eq!(f.top + f.bottom, 1.0, "{align:?}");
        }
    }

    #[test]
    fn test_corner_margins() {
        let m = Align::LeftTop.margins(4.0, 2.0);
        assert_eq!(m, Margins { left: 0.0, right: 4.0, top: 0.0, bottom: 2.0 });

        let m = Align::RightBottom.margins(4.0, 2.0);
        assert_eq!(m, Margins { left: 4.0, right: 0.0, top: 2.0, bottom: 0.0 });
    }

    #[test]
    fn test_edge_margins() {
        let m = Align::CenterTop.margins(10.0, 6.0);
        assert_eq!((m.left, m.right, m.top, m.bottom), (5.0, 5.0, 0.0, 6.0));

        let m = Align::CenterRight.margins(10.0, 6.0);
        assert_eq!((m.left, m.right, m.top, m.bottom), (10.0, 0.0, 3.0, 3.0));
    }
}
