//! Builder for textured or colored rectangles.
//!
//! ```rust
//! use glade::gfx::geometry::RectangleBuilder;
//! use glade::math::{Align, Color};
//!
//! let card = RectangleBuilder::new()
//!     .size(3.0, 2.0)
//!     .pivot(Align::LeftBottom)
//!     .vertical_gradient(Color::WHITE, Color::BLACK)
//!     .build()
//!     .unwrap();
//! assert_eq!(card.geometry.vertex_count(), 4);
//! ```

use crate::error::Result;
use crate::gfx::geometry::{create_geometry, Geometry};
use crate::gfx::scene::{Model, ModelState};
use crate::gfx::shader::BuiltinShader;
use crate::gfx::texture::TextureId;
use crate::math::{Align, Color};

/// A built rectangle and the parameters it was built with
#[derive(Debug, Clone)]
pub struct Rectangle {
    pub geometry: Geometry,
    pub width: f32,
    pub height: f32,
    pub align: Align,
    pub texture: Option<TextureId>,
}

impl Rectangle {
    /// Wraps the rectangle in a model, carrying over its texture.
    ///
    /// Textured rectangles start with the default texture shader.
    pub fn into_model(self, name: impl Into<String>) -> Model {
        let mut state = ModelState::new(name);
        if let Some(texture) = self.texture {
            state = state
                .with_texture(texture)
                .with_shader(BuiltinShader::DefaultTexture.id());
        }
        Model::new(self.geometry).with_state(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fill {
    None,
    Solid(Color),
    /// Top-left, bottom-left, bottom-right, top-right
    Corners([Color; 4]),
}

/// Configures and builds a [`Rectangle`]
///
/// Vertices are ordered top-left, bottom-left, bottom-right, top-right and
/// placed around the origin according to the pivot alignment.
#[derive(Debug, Clone)]
pub struct RectangleBuilder {
    width: f32,
    height: f32,
    align: Align,
    vertical: bool,
    has_texture: bool,
    has_normals: bool,
    repeats: (f32, f32),
    flip_horizontal: bool,
    flip_vertical: bool,
    fill: Fill,
    texture: Option<TextureId>,
}

impl Default for RectangleBuilder {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            align: Align::Center,
            vertical: false,
            has_texture: false,
            has_normals: false,
            repeats: (1.0, 1.0),
            flip_horizontal: false,
            flip_vertical: false,
            fill: Fill::None,
            texture: None,
        }
    }
}

impl RectangleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn pivot(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Lay the rectangle in the XZ plane instead of XY
    pub fn vertical_geometry(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn with_normals(mut self, has_normals: bool) -> Self {
        self.has_normals = has_normals;
        self
    }

    pub fn with_texture_coords(mut self, has_texture: bool) -> Self {
        self.has_texture = has_texture;
        self
    }

    /// Assigns a texture; implies texture coordinates
    pub fn texture(mut self, texture: TextureId) -> Self {
        self.has_texture = true;
        self.texture = Some(texture);
        self
    }

    /// Texture repeats per axis; implies texture coordinates
    pub fn texture_repeats(mut self, horizontal: f32, vertical: f32) -> Self {
        self.has_texture = true;
        self.repeats = (horizontal, vertical);
        self
    }

    pub fn flip_texture_horizontally(mut self, flip: bool) -> Self {
        self.has_texture = true;
        self.flip_horizontal = flip;
        self
    }

    pub fn flip_texture_vertically(mut self, flip: bool) -> Self {
        self.has_texture = true;
        self.flip_vertical = flip;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.fill = Fill::Solid(color);
        self
    }

    /// Left edge to right edge
    pub fn horizontal_gradient(mut self, left: Color, right: Color) -> Self {
        self.fill = Fill::Corners([left, left, right, right]);
        self
    }

    /// Top edge to bottom edge
    pub fn vertical_gradient(mut self, top: Color, bottom: Color) -> Self {
        self.fill = Fill::Corners([top, bottom, bottom, top]);
        self
    }

    pub fn corner_gradient(
        mut self,
        top_left: Color,
        top_right: Color,
        bottom_left: Color,
        bottom_right: Color,
    ) -> Self {
        self.fill = Fill::Corners([top_left, bottom_left, bottom_right, top_right]);
        self
    }

    fn positions(&self) -> Vec<f32> {
        let m = self.align.margins(self.width, self.height);
        let corners = [
            (-m.left, m.top),
            (-m.left, -m.bottom),
            (m.right, -m.bottom),
            (m.right, m.top),
        ];
        corners
            .iter()
            .flat_map(|&(x, up)| {
                if self.vertical {
                    [x, 0.0, up]
                } else {
                    [x, up, 0.0]
                }
            })
            .collect()
    }

    fn tex_coords(&self) -> Option<Vec<f32>> {
        let (repeat_u, repeat_v) = self.repeats;
        if !self.has_texture || repeat_u <= 0.0 || repeat_v <= 0.0 {
            return None;
        }
        let (left, right) = if self.flip_horizontal { (1.0, 0.0) } else { (0.0, 1.0) };
        let (top, bottom) = if self.flip_vertical { (1.0, 0.0) } else { (0.0, 1.0) };
        let corners = [(left, top), (left, bottom), (right, bottom), (right, top)];
        Some(
            corners
                .iter()
                .flat_map(|&(u, v)| [u * repeat_u, v * repeat_v])
                .collect(),
        )
    }

    fn normals(&self) -> Option<Vec<f32>> {
        if !self.has_normals {
            return None;
        }
        let normal = if self.vertical { [0.0, 1.0, 0.0] } else { [0.0, 0.0, 1.0] };
        Some(normal.repeat(4))
    }

    fn colors(&self) -> Option<Vec<f32>> {
        let corners = match self.fill {
            Fill::None => return None,
            Fill::Solid(color) => [color; 4],
            Fill::Corners(corners) => corners,
        };
        Some(corners.iter().flat_map(|c| c.to_array()).collect())
    }

    /// Builds the rectangle and keeps the CPU arrays around
    pub fn build_and_keep_arrays(self) -> Result<Rectangle> {
        let mut geometry = create_geometry(
            self.positions(),
            self.tex_coords(),
            self.normals(),
            self.colors(),
            vec![1, 2, 3, 1, 3, 0],
        );
        geometry.stage()?;
        Ok(Rectangle {
            geometry,
            width: self.width,
            height: self.height,
            align: self.align,
            texture: self.texture,
        })
    }

    /// Builds the rectangle and drops the CPU arrays
    pub fn build(self) -> Result<Rectangle> {
        let mut rect = self.build_and_keep_arrays()?;
        rect.geometry.delete_arrays();
        Ok(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_places_vertices() {
        let rect = RectangleBuilder::new()
            .size(4.0, 2.0)
            .pivot(Align::LeftBottom)
            .build_and_keep_arrays()
            .unwrap();
        let positions = rect.geometry.positions().array().unwrap();
        assert_eq!(
            positions,
            &[0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 4.0, 2.0, 0.0]
        );
    }

    #[test]
    fn test_vertical_geometry_uses_xz() {
        let rect = RectangleBuilder::new()
            .vertical_geometry(true)
            .with_normals(true)
            .build_and_keep_arrays()
            .unwrap();
        let positions = rect.geometry.positions().array().unwrap();
        assert!(positions.chunks(3).all(|p| p[1] == 0.0));
        assert_eq!(
            rect.geometry.normals().and_then(|n| n.array()).map(|n| &n[..3]),
            Some(&[0.0, 1.0, 0.0][..])
        );
    }

    #[test]
    fn test_texture_coords_follow_repeats_and_flips() {
        let rect = RectangleBuilder::new()
            .texture_repeats(2.0, 3.0)
            .flip_texture_horizontally(true)
            .build_and_keep_arrays()
            .unwrap();
        let uv = rect.geometry.tex_coords().and_then(|t| t.array()).unwrap();
        assert_eq!(uv, &[2.0, 0.0, 2.0, 3.0, 0.0, 3.0, 0.0, 0.0]);

        let plain = RectangleBuilder::new().build().unwrap();
        assert!(plain.geometry.tex_coords().is_none());

        let degenerate = RectangleBuilder::new().texture_repeats(0.0, 1.0).build().unwrap();
        assert!(degenerate.geometry.tex_coords().is_none());
    }

    #[test]
    fn test_gradient_corner_order() {
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        let blue = Color::new(0.0, 0.0, 1.0, 1.0);
        let rect = RectangleBuilder::new()
            .horizontal_gradient(red, blue)
            .build_and_keep_arrays()
            .unwrap();
        let colors = rect.geometry.colors().and_then(|c| c.array()).unwrap();
        // top-left and bottom-left are red, bottom-right and top-right blue
        assert_eq!(&colors[0..4], &red.to_array());
        assert_eq!(&colors[4..8], &red.to_array());
        assert_eq!(&colors[8..12], &blue.to_array());
        assert_eq!(&colors[12..16], &blue.to_array());
    }

    #[test]
    fn test_build_frees_arrays_and_into_model_keeps_texture() {
        let rect = RectangleBuilder::new()
            .texture(TextureId(1000))
            .build()
            .unwrap();
        assert!(rect.geometry.positions().array().is_none());
        assert!(rect.geometry.indices().staging().is_some());

        let model = rect.into_model("card");
        assert_eq!(model.state.texture, Some(TextureId(1000)));
        assert_eq!(model.state.name, "card");
    }
}
