//! Per-frame player input

use glam::Vec2;
use liminal_grab::GrabInput;
use serde::{Deserialize, Serialize};

/// Everything the host samples from its input devices for one frame
///
/// Buttons are levels (held or not), never edges; the grab session derives
/// its own press edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Planar movement, x = strafe right, y = forward
    pub move_axis: Vec2,
    /// Mouse/look delta (screen space, +y down)
    pub look_delta: Vec2,
    /// Jump button (sampled, not consumed without a character controller)
    pub jump: bool,
    /// Sprint modifier
    pub sprint: bool,
    /// Grab button
    pub grab: bool,
    /// Rotate-held-object modifier
    pub rotate: bool,
}

impl InputSnapshot {
    /// Empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set movement
    pub fn with_move(mut self, axis: Vec2) -> Self {
        self.move_axis = axis;
        self
    }

    /// Set look delta
    pub fn with_look(mut self, delta: Vec2) -> Self {
        self.look_delta = delta;
        self
    }

    /// Set the grab button
    pub fn with_grab(mut self, held: bool) -> Self {
        self.grab = held;
        self
    }

    /// Set the rotate modifier
    pub fn with_rotate(mut self, held: bool) -> Self {
        self.rotate = held;
        self
    }

    /// Set the sprint modifier
    pub fn with_sprint(mut self, held: bool) -> Self {
        self.sprint = held;
        self
    }

    /// Input forwarded to the grab session
    pub fn grab_input(&self) -> GrabInput {
        GrabInput::new(self.grab, self.rotate, self.look_delta)
    }
}
