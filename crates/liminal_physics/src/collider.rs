//! Collider types

use crate::layers::CollisionGroups;
use liminal_grab::ColliderId;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Collider owned by a [`PhysicsWorld`](crate::PhysicsWorld)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    /// Pack into the id the grab session works with
    pub fn id(&self) -> ColliderId {
        let (index, generation) = self.0.into_raw_parts();
        ColliderId(((generation as u64) << 32) | index as u64)
    }

    /// Recover a handle from an id produced by [`ColliderHandle::id`]
    pub fn from_id(id: ColliderId) -> Self {
        Self(rapier::ColliderHandle::from_raw_parts(
            id.0 as u32,
            (id.0 >> 32) as u32,
        ))
    }
}

/// Collider shape at unit entity scale
///
/// The world rebuilds the Rapier shape through [`ColliderShape::scaled`]
/// whenever the entity is rescaled, so a held prop's collider always matches
/// its forced-perspective size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: [f32; 3] },
    /// Y-aligned capsule (player body)
    CapsuleY { half_height: f32, radius: f32 },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl ColliderShape {
    /// Ball
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box from half extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    /// Box from full size
    pub fn from_size(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            half_extents: [width * 0.5, height * 0.5, depth * 0.5],
        }
    }

    /// Y-aligned capsule
    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self::CapsuleY { half_height, radius }
    }

    /// Shape after applying a non-uniform entity scale
    ///
    /// Round shapes cannot stretch, so their radius follows the largest
    /// scale component of the axes they span.
    pub fn scaled(&self, scale: [f32; 3]) -> Self {
        let [sx, sy, sz] = scale.map(f32::abs);
        match self {
            Self::Sphere { radius } => Self::Sphere {
                radius: radius * sx.max(sy).max(sz),
            },
            Self::Box { half_extents } => Self::Box {
                half_extents: [half_extents[0] * sx, half_extents[1] * sy, half_extents[2] * sz],
            },
            Self::CapsuleY { half_height, radius } => Self::CapsuleY {
                half_height: half_height * sy,
                radius: radius * sx.max(sz),
            },
        }
    }

    pub(crate) fn to_rapier(self) -> rapier::SharedShape {
        match self {
            Self::Sphere { radius } => rapier::SharedShape::ball(radius),
            Self::Box {
                half_extents: [hx, hy, hz],
            } => rapier::SharedShape::cuboid(hx, hy, hz),
            Self::CapsuleY { half_height, radius } => rapier::SharedShape::capsule_y(half_height, radius),
        }
    }
}

/// Spawn parameters of one collider of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    /// Offset from the body at unit entity scale
    pub position_offset: [f32; 3],
    /// Reports enter/exit only, no contact response (pressure plates)
    pub is_sensor: bool,
    pub density: f32,
    pub collision_groups: CollisionGroups,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            position_offset: [0.0; 3],
            is_sensor: false,
            density: 1.0,
            collision_groups: CollisionGroups::ALL,
        }
    }
}

impl ColliderDesc {
    /// Solid collider
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Sensor collider
    pub fn sensor(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_sensor: true,
            ..Default::default()
        }
    }

    /// Offset from the body
    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position_offset = [x, y, z];
        self
    }

    /// Layer membership and filter
    pub fn with_collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    /// Rapier builder at the given entity scale, tagged with the owning entity
    pub(crate) fn to_rapier_builder(&self, scale: [f32; 3], user_data: u128) -> rapier::ColliderBuilder {
        let builder = rapier::ColliderBuilder::new(self.shape.scaled(scale).to_rapier())
            .translation(scaled_offset(self.position_offset, scale))
            .sensor(self.is_sensor)
            .density(self.density)
            .collision_groups(self.collision_groups.to_rapier())
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS)
            .user_data(user_data);

        if self.is_sensor {
            // Sensors sit on fixed bodies and must still see kinematic ones
            builder.active_collision_types(
                rapier::ActiveCollisionTypes::default() | rapier::ActiveCollisionTypes::KINEMATIC_FIXED,
            )
        } else {
            builder
        }
    }
}

/// Parent-relative collider offset at the given entity scale
pub(crate) fn scaled_offset(offset: [f32; 3], scale: [f32; 3]) -> rapier::Vector<f32> {
    rapier::Vector::new(offset[0] * scale[0], offset[1] * scale[1], offset[2] * scale[2])
}
