//! Collision pushback for released objects
//!
//! A per-entity reactor armed by the host when a release happens. While
//! armed, every collision-began callback nudges the object one pushback step
//! back toward the camera snapshot taken at release time and rescales it so
//! the forced-perspective illusion holds. It only reads the snapshot it was
//! armed with; it never looks at the live camera or the grab session.

use crate::error::{check_non_negative, check_positive, Result};
use crate::geometry::{PerspectiveAnchor, Pose};
use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

/// Pushback parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushbackConfig {
    /// Distance pulled toward the camera per collision, before the multiplier
    pub step_size: f32,
    /// Multiplier applied to `step_size`
    pub multiplier: f32,
    /// Seconds an armed reactor stays active before ending itself
    pub settle_time: f32,
}

impl Default for PushbackConfig {
    fn default() -> Self {
        Self {
            step_size: 0.05,
            multiplier: 1.5,
            settle_time: 1.0,
        }
    }
}

impl PushbackConfig {
    /// Distance removed per collision
    #[inline]
    pub fn pushback_distance(&self) -> f32 {
        self.step_size * self.multiplier
    }

    /// Set the settle time
    pub fn with_settle_time(mut self, seconds: f32) -> Self {
        self.settle_time = seconds;
        self
    }

    /// Check parameters
    pub fn validate(&self) -> Result<()> {
        check_positive("step_size", self.step_size)?;
        check_positive("multiplier", self.multiplier)?;
        check_non_negative("settle_time", self.settle_time)
    }
}

/// Snapshot taken when a release starts
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReleaseSnapshot {
    camera_position: Vec3,
    camera_forward: Vec3,
    anchor: PerspectiveAnchor,
    remaining: f32,
}

/// Pushback reactor attached to one grabbable entity
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPushback {
    config: PushbackConfig,
    release: Option<ReleaseSnapshot>,
}

impl CollisionPushback {
    /// Create a dormant reactor
    pub fn new(config: PushbackConfig) -> Self {
        Self {
            config,
            release: None,
        }
    }

    /// Reactor parameters
    pub fn config(&self) -> &PushbackConfig {
        &self.config
    }

    /// Check whether the reactor is armed
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Arm the reactor with the release-time camera snapshot
    pub fn start_release(
        &mut self,
        camera_position: Vec3,
        camera_forward: Vec3,
        original_distance: f32,
        original_scale: Vec3,
    ) {
        self.release = Some(ReleaseSnapshot {
            camera_position,
            camera_forward,
            anchor: PerspectiveAnchor::new(original_distance, original_scale),
            remaining: self.config.settle_time,
        });
    }

    /// Disarm the reactor
    pub fn end_release(&mut self) {
        self.release = None;
    }

    /// React to a collision-began callback on the entity
    ///
    /// Returns true when `pose` was moved. Does not disarm the reactor, so
    /// repeated collisions keep pulling the object in.
    pub fn on_collision_began(&mut self, pose: &mut Pose) -> bool {
        let Some(release) = self.release else {
            return false;
        };

        let current = release.camera_position.distance(pose.position);
        let distance = current - self.config.pushback_distance();
        release
            .anchor
            .place(release.camera_position, release.camera_forward, distance, pose);

        debug!(
            "Collision during release, pushed back from {:.3} to {:.3}",
            current, distance
        );
        true
    }

    /// Advance the settle timer; returns true when the reactor ended this tick
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let Some(release) = self.release.as_mut() else {
            return false;
        };
        release.remaining -= delta_time;
        if release.remaining <= 0.0 {
            self.release = None;
            return true;
        }
        false
    }
}

impl Default for CollisionPushback {
    fn default() -> Self {
        Self::new(PushbackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inactive_reactor_ignores_collisions() {
        let mut reactor = CollisionPushback::default();
        let mut pose = Pose::from_position(Vec3::new(0.0, 0.0, -2.0));
        let before = pose;

        assert!(!reactor.on_collision_began(&mut pose));
        assert_eq!(pose, before);
    }

    #[test]
    fn test_pushback_uses_snapshot() {
        let mut reactor = CollisionPushback::default();
        reactor.start_release(Vec3::ZERO, Vec3::NEG_Z, 10.0, Vec3::ONE);

        let mut pose = Pose::from_position(Vec3::new(0.0, 0.0, -2.0)).with_scale(Vec3::splat(0.2));
        assert!(reactor.on_collision_began(&mut pose));

        // 2.0 - 0.05 * 1.5
        assert_relative_eq!(pose.position.z, -1.925, epsilon = 1e-6);
        assert_relative_eq!(pose.scale.x, 0.1925, epsilon = 1e-6);
        assert!(reactor.is_active());

        // Fires again on the next collision
        assert!(reactor.on_collision_began(&mut pose));
        assert_relative_eq!(pose.position.z, -1.85, epsilon = 1e-6);
    }

    #[test]
    fn test_pushback_projects_onto_snapshot_ray() {
        let mut reactor = CollisionPushback::default();
        reactor.start_release(Vec3::new(1.0, 0.0, 0.0), Vec3::X, 4.0, Vec3::splat(2.0));

        // Object drifted off the release ray; it is put back on it
        let mut pose = Pose::from_position(Vec3::new(1.0, 3.0, 4.0));
        reactor.on_collision_began(&mut pose);
        assert_relative_eq!(pose.position.x, 1.0 + 5.0 - 0.075, epsilon = 1e-5);
        assert_relative_eq!(pose.position.y, 0.0);
        assert!(pose.scale.abs_diff_eq(Vec3::splat(2.0 * 4.925 / 4.0), 1e-5));
    }

    #[test]
    fn test_end_release_disarms() {
        let mut reactor = CollisionPushback::default();
        reactor.start_release(Vec3::ZERO, Vec3::NEG_Z, 1.0, Vec3::ONE);
        reactor.end_release();

        let mut pose = Pose::from_position(Vec3::new(0.0, 0.0, -1.0));
        assert!(!reactor.on_collision_began(&mut pose));
        assert_eq!(pose.position.z, -1.0);
    }

    #[test]
    fn test_settle_timer() {
        let mut reactor = CollisionPushback::new(PushbackConfig::default().with_settle_time(0.1));
        reactor.start_release(Vec3::ZERO, Vec3::NEG_Z, 1.0, Vec3::ONE);

        assert!(!reactor.tick(0.05));
        assert!(reactor.is_active());
        assert!(reactor.tick(0.06));
        assert!(!reactor.is_active());
        assert!(!reactor.tick(0.05));
    }

    #[test]
    fn test_config_validation() {
        assert!(PushbackConfig::default().validate().is_ok());
        assert_relative_eq!(PushbackConfig::default().pushback_distance(), 0.075, epsilon = 1e-7);
        let bad = PushbackConfig {
            multiplier: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
