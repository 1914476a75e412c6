use cgmath::Vector3;

/// One of the three world axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A 3-component vector that remembers whether it changed since the last
/// [`take_changed`](Self::take_changed).
///
/// Writes that store the value already held do not count as a change, so a
/// transform that is re-set to the same position every frame stays clean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedVector3 {
    value: Vector3<f32>,
    changed: bool,
}

impl TrackedVector3 {
    /// New vectors start dirty so the first matrix read picks them up
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            value: Vector3::new(x, y, z),
            changed: true,
        }
    }

    pub fn get(&self) -> Vector3<f32> {
        self.value
    }

    pub fn x(&self) -> f32 {
        self.value.x
    }

    pub fn y(&self) -> f32 {
        self.value.y
    }

    pub fn z(&self) -> f32 {
        self.value.z
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        self.value[axis.index()]
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32) {
        self.set_vector(Vector3::new(x, y, z));
    }

    pub fn set_vector(&mut self, value: Vector3<f32>) {
        if self.value != value {
            self.value = value;
            self.changed = true;
        }
    }

    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        if self.value[axis.index()] != value {
            self.value[axis.index()] = value;
            self.changed = true;
        }
    }

    pub fn add_axis(&mut self, axis: Axis, delta: f32) {
        let current = self.axis(axis);
        self.set_axis(axis, current + delta);
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns the pending change flag and clears it
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

impl Default for TrackedVector3 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<Vector3<f32>> for TrackedVector3 {
    fn from(value: Vector3<f32>) -> Self {
        Self {
            value,
            changed: true,
        }
    }
}
