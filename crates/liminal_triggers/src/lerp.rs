//! Timed position interpolation

use glam::Vec3;

/// Linear move toward a target over a fixed duration
///
/// Polled once per frame. Starting a new move replaces the one in flight,
/// so a door never has two writers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorLerp {
    start: Vec3,
    target: Vec3,
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl DoorLerp {
    /// Create an idle lerp
    pub fn new(duration: f32) -> Self {
        Self {
            start: Vec3::ZERO,
            target: Vec3::ZERO,
            duration,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Begin moving from `from` to `to`, superseding any move in flight
    pub fn start(&mut self, from: Vec3, to: Vec3) {
        self.start = from;
        self.target = to;
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Check whether a move is in flight
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current target
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Advance by `delta_time`; returns the position to write this frame
    pub fn advance(&mut self, delta_time: f32) -> Option<Vec3> {
        if !self.active {
            return None;
        }

        self.elapsed += delta_time;
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.active = false;
            return Some(self.target);
        }

        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        Some(self.start.lerp(self.target, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_idle_lerp_writes_nothing() {
        let mut lerp = DoorLerp::new(1.0);
        assert!(!lerp.is_active());
        assert_eq!(lerp.advance(0.5), None);
    }

    #[test]
    fn test_lerp_reaches_target() {
        let mut lerp = DoorLerp::new(1.0);
        lerp.start(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));

        let mid = lerp.advance(0.25).unwrap();
        assert_relative_eq!(mid.y, 0.5, epsilon = 1e-6);

        let end = lerp.advance(1.0).unwrap();
        assert_eq!(end, Vec3::new(0.0, 2.0, 0.0));
        assert!(!lerp.is_active());
        assert_eq!(lerp.advance(0.1), None);
    }

    #[test]
    fn test_restart_supersedes() {
        let mut lerp = DoorLerp::new(1.0);
        lerp.start(Vec3::ZERO, Vec3::Y * 2.0);
        let halfway = lerp.advance(0.5).unwrap();

        // Reverse from wherever the door is now
        lerp.start(halfway, Vec3::ZERO);
        let pos = lerp.advance(0.5).unwrap();
        assert_relative_eq!(pos.y, 0.5, epsilon = 1e-6);
        assert_eq!(lerp.target(), Vec3::ZERO);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut lerp = DoorLerp::new(0.0);
        lerp.start(Vec3::ZERO, Vec3::X);
        assert_eq!(lerp.advance(0.0), Some(Vec3::X));
    }
}
