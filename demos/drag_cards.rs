//! Cards on a table that can be dragged with the mouse or with up to two fingers.
//!
//! ```sh
//! cargo run --example drag_cards
//! ```

use glade::animation::{AxisMovementAnimation, Easing};
use glade::app::GladeApp;
use glade::config::EngineConfig;
use glade::gfx::camera::{Camera, SizingPolicy};
use glade::gfx::geometry::RectangleBuilder;
use glade::gfx::scene::{BlendFunc, Scene};
use glade::logging::{init_logging, LoggingConfig};
use glade::math::{Axis, Color, Transform};
use glade::motion::{DragBounds, DraggableObject, MotionManager};

const TABLE_HEIGHT: f32 = 10.0;
const POINTERS: usize = 2;

fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::default());

    let camera = Camera::orthographic().with_sizing(SizingPolicy::FixedVertical(TABLE_HEIGHT));
    let mut scene = Scene::new(camera);
    let mut motion = MotionManager::new(POINTERS);
    let table = DragBounds::new(-7.0, 7.0, TABLE_HEIGHT / 2.0, -TABLE_HEIGHT / 2.0);

    scene.add(
        RectangleBuilder::new()
            .size(20.0, TABLE_HEIGHT)
            .vertical_gradient(Color::from_rgba8(22, 92, 54, 255), Color::from_rgba8(8, 40, 24, 255))
            .build()?
            .into_model("table"),
    );

    let suits = [
        Color::from_rgba8(230, 57, 70, 255),
        Color::from_rgba8(241, 250, 238, 255),
        Color::from_rgba8(69, 123, 157, 255),
        Color::from_rgba8(244, 162, 97, 255),
    ];
    for (i, color) in suits.into_iter().enumerate() {
        let card = RectangleBuilder::new().size(1.6, 2.4).color(color).build()?;
        let x = -3.0 + i as f32 * 2.0;

        let mut model = card.clone().into_model(format!("card-{i}"));
        model.state.transform = Transform::new().with_position(x, 0.0, 0.0);
        model.state.blend = Some(BlendFunc::ALPHA);
        let id = scene.add(model);

        motion.add(DraggableObject::for_rectangle(id, &card).with_drag_bounds(table));
    }

    scene.add(
        RectangleBuilder::new()
            .size(3.0, 0.4)
            .horizontal_gradient(Color::from_rgba8(120, 200, 150, 255), Color::WHITE)
            .build()?
            .into_model("hint")
            .with_animation(
                AxisMovementAnimation::new(Axis::Y, -4.0, -3.6, 900.0)
                    .with_easing(Easing::EaseInOut)
                    .with_infinite(true)
                    .with_return_to_start(true),
            ),
    );

    let config = EngineConfig::from_env().with_max_pointers(POINTERS);
    GladeApp::new(scene.with_motion(motion))
        .with_title("glade: drag the cards")
        .with_config(config)
        .with_target_fps(35.0)
        .run()
}
