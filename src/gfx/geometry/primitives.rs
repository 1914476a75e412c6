//! # Primitive Shape Generation
//!
//! Procedural shapes returned as [`GeometryData`]: a cube and a segmented plane.
//! Rectangles have their own builder in [`rectangle`](super::rectangle).

use crate::error::Result;
use crate::gfx::geometry::{create_geometry, Geometry};

/// Generated geometry data, one array entry per vertex
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Normal vectors (x, y, z)
    pub normals: Option<Vec<[f32; 3]>>,
    /// Vertex colors (r, g, b, a)
    pub colors: Option<Vec<[f32; 4]>>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u16>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Paints every vertex with one color
    pub fn with_solid_color(mut self, color: [f32; 4]) -> Self {
        self.colors = Some(vec![color; self.positions.len()]);
        self
    }

    /// Flattens the arrays into a [`Geometry`] with staging copies filled.
    ///
    /// The CPU arrays are kept; call [`Geometry::delete_arrays`] to drop them.
    pub fn into_geometry(self) -> Result<Geometry> {
        let mut geometry = create_geometry(
            self.positions.into_iter().flatten().collect(),
            self.tex_coords.map(|a| a.into_iter().flatten().collect()),
            self.normals.map(|a| a.into_iter().flatten().collect()),
            self.colors.map(|a| a.into_iter().flatten().collect()),
            self.indices,
        );
        geometry.stage()?;
        Ok(geometry)
    }
}

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has outward normals and UV coordinates from 0 to 1.
pub fn generate_cube() -> GeometryData {
    let positions = vec![
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let tex_coords = vec![
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
    ];

    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];
    let normals = face_normals.iter().flat_map(|n| [*n; 4]).collect();

    let indices = (0..6u16)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    GeometryData {
        positions,
        tex_coords: Some(tex_coords),
        normals: Some(normals),
        colors: None,
        indices,
    }
}

/// A flat grid of quads, handy for surfaces that get deformed per vertex
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedPlane {
    pub width: f32,
    pub height: f32,
    pub segments_w: u16,
    pub segments_h: u16,
    /// How many times the texture repeats across the plane
    pub texture_repeats: (f32, f32),
    /// XY plane when true, XZ plane otherwise
    pub horizontal: bool,
}

impl SegmentedPlane {
    pub fn new(width: f32, height: f32, segments_w: u16, segments_h: u16) -> Self {
        Self {
            width,
            height,
            segments_w: segments_w.max(1),
            segments_h: segments_h.max(1),
            texture_repeats: (1.0, 1.0),
            horizontal: true,
        }
    }

    pub fn with_texture_repeats(mut self, horizontal: f32, vertical: f32) -> Self {
        self.texture_repeats = (horizontal, vertical);
        self
    }

    pub fn with_vertical_geometry(mut self) -> Self {
        self.horizontal = false;
        self
    }

    /// Generates `(segments_w + 1) * (segments_h + 1)` vertices
    pub fn data(&self) -> GeometryData {
        let segs_w = self.segments_w.max(1);
        let segs_h = self.segments_h.max(1);
        let cell_w = self.width / segs_w as f32;
        let cell_h = self.height / segs_h as f32;
        let (repeat_u, repeat_v) = self.texture_repeats;

        let vertex_total = (segs_w as usize + 1) * (segs_h as usize + 1);
        let mut positions = Vec::with_capacity(vertex_total);
        let mut tex_coords = Vec::with_capacity(vertex_total);

        for row in 0..=segs_h {
            let along = row as f32 * cell_h - self.height / 2.0;
            for col in 0..=segs_w {
                let x = col as f32 * cell_w - self.width / 2.0;
                positions.push(if self.horizontal {
                    [x, along, 0.0]
                } else {
                    [x, 0.0, along]
                });
                tex_coords.push([
                    col as f32 / segs_w as f32 * repeat_u,
                    (1.0 - row as f32 / segs_h as f32) * repeat_v,
                ]);
            }
        }

        let columns = segs_w + 1;
        let mut indices = Vec::with_capacity(segs_w as usize * segs_h as usize * 6);
        for row in 0..segs_h {
            for col in 0..segs_w {
                let lower_left = row * columns + col;
                let lower_right = lower_left + 1;
                let upper_left = lower_left + columns;
                let upper_right = upper_left + 1;
                indices.extend_from_slice(&[
                    lower_left,
                    lower_right,
                    upper_right,
                    lower_left,
                    upper_right,
                    upper_left,
                ]);
            }
        }

        GeometryData {
            positions,
            tex_coords: Some(tex_coords),
            normals: None,
            colors: None,
            indices,
        }
    }

    /// Builds a double-sided geometry with its CPU arrays already dropped
    pub fn build(&self) -> Result<Geometry> {
        let mut geometry = self.data().into_geometry()?;
        geometry.delete_arrays();
        geometry.set_double_side(true);
        Ok(geometry)
    }
}
