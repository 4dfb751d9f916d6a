//! First-person look and walk
//!
//! Yaw and pitch are kept in degrees. The body only turns around Y; pitch
//! is applied to the camera alone. Movement is planar and ignores pitch.

use crate::config::LookConfig;
use crate::input::InputSnapshot;
use glam::{EulerRot, Quat, Vec3};
use liminal_grab::CameraPose;

/// Look and walk state of the player
#[derive(Debug, Clone, PartialEq)]
pub struct LookController {
    config: LookConfig,
    position: Vec3,
    yaw: f32,
    pitch: f32,
}

impl LookController {
    /// Create a controller standing at `position`, looking down -Z
    pub fn new(position: Vec3, config: LookConfig) -> Self {
        Self {
            config,
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Look/walk parameters
    pub fn config(&self) -> &LookConfig {
        &self.config
    }

    /// Body origin
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleport the body
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Yaw in degrees, positive turns left
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, positive looks up
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set yaw and pitch directly; pitch is clamped
    pub fn set_look(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-self.config.max_look_angle, self.config.max_look_angle);
    }

    /// Body rotation (yaw only)
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians())
    }

    /// Camera frame for this frame
    pub fn camera(&self) -> CameraPose {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        );
        CameraPose::new(self.position + Vec3::Y * self.config.eye_height, rotation)
    }

    /// Apply one frame of input
    ///
    /// While the rotate modifier is held the look delta belongs to the held
    /// object, so the view stays put.
    pub fn update(&mut self, input: &InputSnapshot, delta_time: f32) {
        if !input.rotate {
            let sensitivity = self.config.mouse_sensitivity;
            self.yaw -= input.look_delta.x * sensitivity;
            self.set_look(self.yaw, self.pitch - input.look_delta.y * sensitivity);
        }

        let local = Vec3::new(input.move_axis.x, 0.0, -input.move_axis.y);
        let direction = (self.body_rotation() * local).normalize_or_zero();
        let speed = if input.sprint {
            self.config.walk_speed * self.config.sprint_multiplier
        } else {
            self.config.walk_speed
        };
        self.position += direction * speed * delta_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;

    fn controller() -> LookController {
        LookController::new(Vec3::ZERO, LookConfig::default())
    }

    #[test]
    fn test_camera_defaults() {
        let c = controller();
        let camera = c.camera();
        assert_relative_eq!(camera.position.y, 0.6);
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_look_right_and_up() {
        let mut c = controller();
        // 45 units * 2 degrees = 90 degrees to the right
        c.update(&InputSnapshot::new().with_look(Vec2::new(45.0, 0.0)), 0.016);
        assert_relative_eq!(c.yaw(), -90.0);
        assert!(c.camera().forward().abs_diff_eq(Vec3::X, 1e-5));

        let mut c = controller();
        c.update(&InputSnapshot::new().with_look(Vec2::new(0.0, -10.0)), 0.016);
        assert_relative_eq!(c.pitch(), 20.0);
        assert!(c.camera().forward().y > 0.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut c = controller();
        c.update(&InputSnapshot::new().with_look(Vec2::new(0.0, 500.0)), 0.016);
        assert_eq!(c.pitch(), -90.0);
        c.update(&InputSnapshot::new().with_look(Vec2::new(0.0, -1000.0)), 0.016);
        assert_eq!(c.pitch(), 90.0);
    }

    #[test]
    fn test_rotate_modifier_freezes_view() {
        let mut c = controller();
        let input = InputSnapshot::new()
            .with_rotate(true)
            .with_look(Vec2::new(20.0, 20.0));
        c.update(&input, 0.016);
        assert_eq!(c.yaw(), 0.0);
        assert_eq!(c.pitch(), 0.0);
    }

    #[test]
    fn test_walk_follows_yaw() {
        let mut c = controller();
        c.update(&InputSnapshot::new().with_move(Vec2::new(0.0, 1.0)), 1.0);
        assert!(c.position().abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));

        let mut c = controller();
        c.set_look(-90.0, 45.0);
        c.update(&InputSnapshot::new().with_move(Vec2::new(0.0, 1.0)).with_sprint(true), 0.5);
        // Pitch does not lift the body; sprint doubles speed
        assert!(c.position().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut c = controller();
        c.update(&InputSnapshot::new().with_move(Vec2::new(1.0, 1.0)), 1.0);
        assert_relative_eq!(c.position().length(), 5.0, epsilon = 1e-5);
    }
}
