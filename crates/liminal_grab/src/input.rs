//! Per-frame input for the grab session

use glam::Vec2;

/// Input sampled by the host for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrabInput {
    /// Grab button currently held
    pub grab_held: bool,
    /// Rotate modifier currently held
    pub rotate_held: bool,
    /// Mouse/look delta this frame (screen space, +y down)
    pub rotation_delta: Vec2,
}

impl GrabInput {
    /// Create a new input snapshot
    pub fn new(grab_held: bool, rotate_held: bool, rotation_delta: Vec2) -> Self {
        Self {
            grab_held,
            rotate_held,
            rotation_delta,
        }
    }

    /// Only the grab button, no rotation
    pub fn grab(grab_held: bool) -> Self {
        Self {
            grab_held,
            ..Default::default()
        }
    }
}

/// Rising-edge detector over a sampled boolean
///
/// `pressed` is a pure query against the previous sample; `store` must run
/// once at the end of every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    was_held: bool,
}

impl EdgeDetector {
    /// Create a detector whose previous sample is "released"
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `held` is a false -> true transition
    #[inline]
    pub fn pressed(&self, held: bool) -> bool {
        held && !self.was_held
    }

    /// Remember this frame's sample
    #[inline]
    pub fn store(&mut self, held: bool) {
        self.was_held = held;
    }

    /// Query and store in one call
    pub fn sample(&mut self, held: bool) -> bool {
        let pressed = self.pressed(held);
        self.store(held);
        pressed
    }

    /// Previous-frame sample
    pub fn was_held(&self) -> bool {
        self.was_held
    }
}
