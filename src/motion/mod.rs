//! # Motion
//!
//! Touch handling for dragging models around the `z = 0` plane.
//!
//! The host delivers [`TouchEvent`]s in window coordinates with the origin in
//! the top-left corner. [`MotionManager`] flips them to GL's bottom-left origin
//! using the surface height, hit-tests its [`Motionable`] items in insertion
//! order, and routes the following moves of that pointer to the grabbed item.
//! Up to `max_pointers` pointers can hold an item at the same time.
//!
//! Events must reach the manager on the render thread; the engine does no
//! locking of its own.

pub mod bounds;
pub mod draggable;

pub use bounds::{BoundingRect, DragBounds};
pub use draggable::{DraggableObject, Motionable};

use crate::gfx::camera::Camera;
use crate::gfx::rendering::FrameState;
use crate::math::TransformStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer sample from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub pointer_id: u64,
    pub phase: TouchPhase,
    /// Window coordinates, origin top-left
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn new(pointer_id: u64, phase: TouchPhase, x: f32, y: f32) -> Self {
        Self {
            pointer_id,
            phase,
            x,
            y,
        }
    }
}

/// What motion items may read and move while handling a pointer
pub struct MotionContext<'a> {
    pub camera: &'a Camera,
    pub transforms: &'a mut dyn TransformStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grab {
    pointer_id: u64,
    item: usize,
}

/// Routes pointers to the items they grabbed
#[derive(Debug)]
pub struct MotionManager {
    items: Vec<Box<dyn Motionable>>,
    slots: Vec<Option<Grab>>,
    surface_height: f32,
    orientation_version: Option<u64>,
}

impl MotionManager {
    pub fn new(max_pointers: usize) -> Self {
        Self {
            items: Vec::new(),
            slots: vec![None; max_pointers.max(1)],
            surface_height: 0.0,
            orientation_version: None,
        }
    }

    pub fn add(&mut self, item: impl Motionable + 'static) {
        self.items.push(Box::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pointers currently holding an item
    pub fn active_pointers(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Picks up the new surface height once per orientation version
    pub fn on_surface_changed(&mut self, frame: &FrameState, height: u32) {
        if self.orientation_version != Some(frame.orientation_version()) {
            self.orientation_version = Some(frame.orientation_version());
            self.surface_height = height as f32;
        }
    }

    fn invert_y(&self, y: f32) -> f32 {
        self.surface_height - y
    }

    /// Handles one event. Returns true when it grabbed, moved or released an item.
    pub fn on_touch_event(&mut self, ctx: &mut MotionContext<'_>, event: &TouchEvent) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let (x, y) = (event.x, self.invert_y(event.y));

        match event.phase {
            TouchPhase::Down => self.grab(ctx, event.pointer_id, x, y),
            TouchPhase::Move => {
                let mut handled = false;
                for grab in self.slots.iter().flatten() {
                    if grab.pointer_id == event.pointer_id {
                        self.items[grab.item].on_touch(ctx, x, y);
                        handled = true;
                    }
                }
                handled
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                let slot = self
                    .slots
                    .iter_mut()
                    .find(|slot| slot.is_some_and(|grab| grab.pointer_id == event.pointer_id));
                match slot.and_then(Option::take) {
                    Some(grab) => {
                        self.items[grab.item].on_end_touch(ctx, x, y);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn grab(&mut self, ctx: &mut MotionContext<'_>, pointer_id: u64, x: f32, y: f32) -> bool {
        if self.slots.iter().flatten().any(|grab| grab.pointer_id == pointer_id) {
            return true;
        }
        let Some(free) = self.slots.iter().position(Option::is_none) else {
            return false;
        };

        let taken: Vec<usize> = self.slots.iter().flatten().map(|grab| grab.item).collect();
        let hit = self
            .items
            .iter_mut()
            .enumerate()
            .filter(|(index, _)| !taken.contains(index))
            .find_map(|(index, item)| item.check_if_touched(ctx, x, y).then_some(index));

        match hit {
            Some(item) => {
                self.slots[free] = Some(Grab { pointer_id, item });
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Align, Transform, TransformTable};
    use approx::assert_abs_diff_eq;
    use cgmath::Vector3;

    struct Fixture {
        camera: Camera,
        table: TransformTable,
        frame: FrameState,
    }

    impl Fixture {
        /// 100x100 px surface showing 10x10 world units centered on the origin
        fn new() -> Self {
            let mut camera = Camera::orthographic();
            camera.set_viewport(100, 100);
            camera.set_projection_matrix();
            let mut frame = FrameState::default();
            frame.bump_orientation_version();
            Self {
                camera,
                table: TransformTable::new(),
                frame,
            }
        }

        fn ctx(&mut self) -> MotionContext<'_> {
            MotionContext {
                camera: &self.camera,
                transforms: &mut self.table,
            }
        }
    }

    fn card(fx: &mut Fixture, x: f32, y: f32) -> DraggableObject {
        let id = fx.table.insert(Transform::new().with_position(x, y, 0.0));
        DraggableObject::new(id, BoundingRect::new(2.0, 2.0, Vector3::new(0.0, 0.0, 0.0)))
    }

    #[test]
    fn test_drag_moves_transform() {
        let mut fx = Fixture::new();
        let mut motion = MotionManager::new(1);
        motion.add(card(&mut fx, 0.0, 0.0));
        motion.on_surface_changed(&fx.frame, 100);

        // Screen center, y measured from the top
        let mut ctx = fx.ctx();
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 50.0, 50.0)));
        assert_eq!(motion.active_pointers(), 1);

        // 10 px right and 20 px up is (1, 2) in world units
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Move, 60.0, 30.0)));
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Up, 60.0, 30.0)));
        assert_eq!(motion.active_pointers(), 0);

        let position = fx.table.get(crate::math::TransformId(0)).unwrap().position();
        assert_abs_diff_eq!(position.x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(position.y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_miss_is_not_handled() {
        let mut fx = Fixture::new();
        let mut motion = MotionManager::new(1);
        motion.add(card(&mut fx, 0.0, 0.0));
        motion.on_surface_changed(&fx.frame, 100);

        let mut ctx = fx.ctx();
        assert!(!motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 5.0, 5.0)));
        assert!(!motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Move, 50.0, 50.0)));
        assert!(!motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Up, 50.0, 50.0)));
    }

    #[test]
    fn test_drag_bounds_limit_edges() {
        let mut fx = Fixture::new();
        let mut motion = MotionManager::new(1);
        let item = card(&mut fx, 0.0, 0.0).with_drag_bounds(DragBounds::new(-3.0, 3.0, 3.0, -3.0));
        motion.add(item);
        motion.on_surface_changed(&fx.frame, 100);

        let mut ctx = fx.ctx();
        motion.on_touch_event(&mut ctx, &TouchEvent::new(7, TouchPhase::Down, 50.0, 50.0));
        motion.on_touch_event(&mut ctx, &TouchEvent::new(7, TouchPhase::Move, 100.0, 50.0));

        let position = fx.table.get(crate::math::TransformId(0)).unwrap().position();
        assert_abs_diff_eq!(position.x, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_two_pointers_two_items() {
        let mut fx = Fixture::new();
        let mut motion = MotionManager::new(2);
        motion.add(card(&mut fx, -3.0, 0.0));
        motion.add(card(&mut fx, 3.0, 0.0));
        motion.on_surface_changed(&fx.frame, 100);

        let mut ctx = fx.ctx();
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 20.0, 50.0)));
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(2, TouchPhase::Down, 80.0, 50.0)));
        assert_eq!(motion.active_pointers(), 2);

        motion.on_touch_event(&mut ctx, &TouchEvent::new(2, TouchPhase::Move, 80.0, 40.0));
        motion.on_touch_event(&mut ctx, &TouchEvent::new(2, TouchPhase::Cancel, 80.0, 40.0));
        assert_eq!(motion.active_pointers(), 1);

        let first = fx.table.get(crate::math::TransformId(0)).unwrap().position();
        let second = fx.table.get(crate::math::TransformId(1)).unwrap().position();
        assert_abs_diff_eq!(first.y, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(second.y, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_following_card_is_hit_and_dragged_in_world_space() {
        let mut fx = Fixture::new();
        let parent = fx
            .table
            .insert(Transform::new().with_position(3.0, 0.0, 0.0).with_scale(2.0, 2.0, 1.0));
        let child = fx.table.insert(Transform::new());
        fx.table.attach(child, Some(parent)).unwrap();

        let mut motion = MotionManager::new(1);
        motion.add(DraggableObject::new(
            child,
            BoundingRect::new(2.0, 2.0, Vector3::new(0.0, 0.0, 0.0)),
        ));
        motion.on_surface_changed(&fx.frame, 100);

        let mut ctx = fx.ctx();
        // Its local origin is empty space, the card is drawn at x = 3
        assert!(!motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 50.0, 50.0)));
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 80.0, 50.0)));

        // One unit right and two up in world space
        motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Move, 90.0, 30.0));
        motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Up, 90.0, 30.0));

        let local = fx.table.get(child).unwrap().position();
        assert_abs_diff_eq!(local.x, 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(local.y, 1.0, epsilon = 1e-4);
        let world = fx.table.world_matrix(child).unwrap();
        assert_abs_diff_eq!(world.w.x, 4.0, epsilon = 1e-4);
        assert_abs_diff_eq!(world.w.y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_surface_height_tracks_orientation_version() {
        let mut fx = Fixture::new();
        let mut motion = MotionManager::new(1);
        motion.on_surface_changed(&fx.frame, 100);
        motion.on_surface_changed(&fx.frame, 300);
        assert_eq!(motion.invert_y(0.0), 100.0);

        fx.frame.bump_orientation_version();
        motion.on_surface_changed(&fx.frame, 300);
        assert_eq!(motion.invert_y(0.0), 300.0);
    }

    #[test]
    fn test_pivot_aligned_card() {
        let mut fx = Fixture::new();
        let id = fx.table.insert(Transform::new());
        let item = DraggableObject::new(
            id,
            BoundingRect::new(2.0, 2.0, Vector3::new(0.0, 0.0, 0.0)).with_align(Align::LeftBottom),
        );
        let mut motion = MotionManager::new(1);
        motion.add(item);
        motion.on_surface_changed(&fx.frame, 100);

        let mut ctx = fx.ctx();
        // (-0.5, -0.5) is outside a card that starts at the origin
        assert!(!motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 45.0, 55.0)));
        assert!(motion.on_touch_event(&mut ctx, &TouchEvent::new(1, TouchPhase::Down, 55.0, 45.0)));
    }
}
