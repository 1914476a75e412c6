//! A checkerboard quad spinning under a perspective camera, with a pulsing
//! gradient quad attached to it.
//!
//! ```sh
//! cargo run --example spinning_quad
//! ```

use glade::animation::{AxisRotationAnimation, Easing, ScalingAnimation};
use glade::app::GladeApp;
use glade::error::Result;
use glade::gfx::camera::{Camera, SizingPolicy};
use glade::gfx::geometry::RectangleBuilder;
use glade::gfx::rendering::DrawContext;
use glade::gfx::scene::{Scene, SceneScript};
use glade::gfx::shader::BuiltinShader;
use glade::gfx::texture::{DecodedImage, Texture};
use glade::logging::{init_logging, LoggingConfig};
use glade::math::{Axis, Color, Transform};

/// Registers the generated texture and hands it to the quad
struct Checkerboard;

impl SceneScript for Checkerboard {
    fn on_attach(&mut self, scene: &mut Scene, ctx: &mut DrawContext<'_>) -> Result<()> {
        let image = checkerboard(64, 8)?;
        let texture = ctx
            .textures
            .register("checkerboard", Texture::from_image("checkerboard", image));
        if let Some(quad) = scene.find("quad").and_then(|id| scene.model_mut(id)) {
            quad.state.texture = Some(texture);
            quad.state.shader = BuiltinShader::DefaultTexture.id();
        }
        Ok(())
    }
}

fn checkerboard(size: u32, cells: u32) -> Result<DecodedImage> {
    let cell = (size / cells).max(1);
    let rgba = (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / cell + y / cell) % 2 == 0 {
                [240, 240, 240, 255]
            } else {
                [40, 90, 160, 255]
            }
        })
        .collect();
    DecodedImage::new(size, size, rgba)
}

fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::default());

    let camera = Camera::perspective().with_sizing(SizingPolicy::FixedDiagonal(3.0));
    let mut scene = Scene::new(camera).with_script(Checkerboard);

    let quad = scene.add(
        RectangleBuilder::new()
            .size(2.0, 2.0)
            .with_texture_coords(true)
            .build()?
            .into_model("quad")
            .with_animation(
                AxisRotationAnimation::new(45.0, Axis::Y).with_second_axis(20.0, Axis::Z),
            ),
    );

    let mut badge = RectangleBuilder::new()
        .size(0.6, 0.6)
        .corner_gradient(
            Color::new(1.0, 0.3, 0.3, 1.0),
            Color::new(0.3, 1.0, 0.3, 1.0),
            Color::new(0.3, 0.3, 1.0, 1.0),
            Color::WHITE,
        )
        .build()?
        .into_model("badge")
        .with_animation(
            ScalingAnimation::new(0.8, 1.2, 600.0)
                .with_easing(Easing::EaseInOut)
                .with_infinite(true),
        );
    badge.state.transform = Transform::new().with_position(0.0, 0.0, 0.05);
    let badge = scene.add(badge);
    scene.follow(badge, Some(quad))?;

    GladeApp::new(scene)
        .with_title("glade: spinning quad")
        .with_size(960, 720)
        .run()
}
