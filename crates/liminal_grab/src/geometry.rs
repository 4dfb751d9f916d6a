//! Forced-perspective geometry
//!
//! Everything here is pure math over `glam` types: poses, the camera frame,
//! oriented boxes for overlap queries and the scale law tying an object's
//! size to its distance from the camera.

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Distances below this are treated as "object at the camera"
pub const MIN_DISTANCE: f32 = 1e-5;

/// World pose with non-uniform scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Pose {
    /// Identity pose
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new pose
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Set rotation (builder pattern)
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set scale (builder pattern)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Camera frame sampled once per update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CameraPose {
    /// Create a new camera pose
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Camera placed at `position` looking at `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let forward = (target - position).normalize_or_zero();
        let rotation = if forward == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::NEG_Z, forward)
        };
        Self { position, rotation }
    }

    /// Forward direction (-Z in camera space)
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Point `distance` units along the view ray
    #[inline]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        point_along(self.position, self.forward(), distance)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Oriented box used for overlap queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl OrientedBox {
    /// Create a new oriented box
    pub const fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Box covering a unit cube transformed by `pose`
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.scale.abs() * 0.5, pose.rotation)
    }

    /// Check whether a world-space point is inside the box
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local.abs().cmple(self.half_extents).all()
    }
}

/// Point `distance` units from `origin` along `direction`
#[inline]
pub fn point_along(origin: Vec3, direction: Vec3, distance: f32) -> Vec3 {
    origin + direction * distance
}

/// Orientation of an object relative to the camera
///
/// `camera_rotation * offset` gives back `object_rotation`.
#[inline]
pub fn rotation_offset(camera_rotation: Quat, object_rotation: Quat) -> Quat {
    camera_rotation.inverse() * object_rotation
}

/// Rotation produced by a screen-space mouse delta
///
/// Moving right turns the object's front to the right. `delta.y` grows
/// downward, so upward motion pitches the object up. `sensitivity` is in
/// degrees per delta unit.
pub fn mouse_rotation(delta: Vec2, sensitivity: f32) -> Quat {
    let yaw = (-delta.x * sensitivity).to_radians();
    let pitch = (-delta.y * sensitivity).to_radians();
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

/// Frame of reference captured when an object is grabbed
///
/// Holds the camera-to-object distance and the object scale at acquisition;
/// every later placement derives its scale from these two values only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveAnchor {
    pub original_distance: f32,
    pub original_scale: Vec3,
}

impl PerspectiveAnchor {
    /// Create an anchor from already known values
    pub const fn new(original_distance: f32, original_scale: Vec3) -> Self {
        Self {
            original_distance,
            original_scale,
        }
    }

    /// Capture the anchor for an object seen from `camera_position`
    ///
    /// Returns `None` when the object sits on the camera, since no scale
    /// ratio can be derived from a zero distance.
    pub fn capture(camera_position: Vec3, object_position: Vec3, object_scale: Vec3) -> Option<Self> {
        let original_distance = camera_position.distance(object_position);
        (original_distance > MIN_DISTANCE).then(|| Self::new(original_distance, object_scale))
    }

    /// Forced-perspective scale at `distance`
    #[inline]
    pub fn scale_at(&self, distance: f32) -> Vec3 {
        self.original_scale * (distance / self.original_distance)
    }

    /// Move `pose` to `distance` along the ray and rescale it
    pub fn place(&self, origin: Vec3, forward: Vec3, distance: f32, pose: &mut Pose) {
        pose.position = point_along(origin, forward, distance);
        pose.scale = self.scale_at(distance);
    }
}
