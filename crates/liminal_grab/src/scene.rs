//! Scene capabilities required by the grab session
//!
//! The grab core is engine agnostic. The host world exposes transforms,
//! spatial queries and a couple of physics toggles through the traits below,
//! and identifies objects with plain copyable ids.

use crate::geometry::{OrientedBox, Pose};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Scene entity identifier
pub type EntityId = u64;

/// Identifier of a collider owned by the host physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// Identifier of a rigid body owned by the host physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Bitmask of collision layers used to filter queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer
    pub const ALL: Self = Self(u32::MAX);
    /// No layer
    pub const NONE: Self = Self(0);

    /// Mask containing a single layer
    pub const fn layer(layer: u32) -> Self {
        Self(1 << layer)
    }

    /// Mask built from several layers
    pub fn from_layers(layers: &[u32]) -> Self {
        Self(layers.iter().fold(0, |acc, l| acc | (1 << l)))
    }

    /// Add a layer
    pub const fn with_layer(self, layer: u32) -> Self {
        Self(self.0 | (1 << layer))
    }

    /// Check whether a layer is part of the mask
    pub const fn contains(&self, layer: u32) -> bool {
        self.0 & (1 << layer) != 0
    }

    /// Check whether the mask selects anything
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// First hit of a layer-filtered ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit point in world space
    pub point: Vec3,
    /// Entity owning the hit collider
    pub entity: EntityId,
    /// The collider that was hit
    pub collider: ColliderId,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Optional physics capabilities of an entity, resolved once at acquisition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Rigid body driving the entity, if any
    pub rigid_body: Option<BodyId>,
    /// Collider attached to the entity, if any
    pub collider: Option<ColliderId>,
}

/// Read/write access to entity transforms
pub trait SceneTransforms {
    /// World pose of an entity, `None` once the entity no longer exists
    fn pose(&self, entity: EntityId) -> Option<Pose>;

    /// Overwrite the world pose of an entity
    fn set_pose(&mut self, entity: EntityId, pose: Pose);
}

/// Layer-filtered spatial queries
pub trait SpatialQuery {
    /// Cast an unbounded ray and return the closest hit
    fn raycast(&self, origin: Vec3, direction: Vec3, mask: LayerMask) -> Option<RayHit>;

    /// Same as [`raycast`](Self::raycast) but passes through `exclude`
    fn raycast_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        mask: LayerMask,
        exclude: ColliderId,
    ) -> Option<RayHit>;

    /// All colliders overlapping an oriented box
    fn overlap_box(&self, region: &OrientedBox, mask: LayerMask) -> Vec<ColliderId>;

    /// Current world bounds of a collider as an oriented box
    fn collider_bounds(&self, collider: ColliderId) -> Option<OrientedBox>;

    /// Recompute spatial bounds after manual transform writes
    fn resync_bounds(&mut self);
}

/// Physics toggles used while an object is held
pub trait PhysicsCapabilities {
    /// Look up the rigid body and collider of an entity
    fn capabilities(&self, entity: EntityId) -> Capabilities;

    /// Remove a body from (or return it to) the dynamics simulation
    fn set_kinematic(&mut self, body: BodyId, kinematic: bool);

    /// Ignore (or restore) contacts between two colliders
    fn set_collision_ignored(&mut self, a: ColliderId, b: ColliderId, ignored: bool);
}

/// Everything a [`GrabSession`](crate::session::GrabSession) needs from the world
pub trait GrabScene: SceneTransforms + SpatialQuery + PhysicsCapabilities {}

impl<T: SceneTransforms + SpatialQuery + PhysicsCapabilities + ?Sized> GrabScene for T {}
