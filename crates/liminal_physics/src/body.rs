//! Rigid bodies
//!
//! Bodies are authored as fixed scenery, simulated props, or host-driven
//! movers (player capsule, doors, a held object).

use liminal_grab::BodyId;
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Rigid body owned by a [`PhysicsWorld`](crate::PhysicsWorld)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

impl RigidBodyHandle {
    /// Pack into the id the grab session works with
    pub fn id(&self) -> BodyId {
        let (index, generation) = self.0.into_raw_parts();
        BodyId(((generation as u64) << 32) | index as u64)
    }

    /// Unpack an id produced by [`RigidBodyHandle::id`]
    pub fn from_id(id: BodyId) -> Self {
        Self(rapier::RigidBodyHandle::from_raw_parts(
            id.0 as u32,
            (id.0 >> 32) as u32,
        ))
    }
}

/// How a body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RigidBodyType {
    /// Level geometry
    Fixed,
    /// Simulated; the only kind the grab session may pick up and toggle
    #[default]
    Dynamic,
    /// Position written by the host every frame
    Kinematic,
}

impl RigidBodyType {
    fn to_rapier(self) -> rapier::RigidBodyType {
        match self {
            Self::Fixed => rapier::RigidBodyType::Fixed,
            Self::Dynamic => rapier::RigidBodyType::Dynamic,
            Self::Kinematic => rapier::RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Spawn parameters of a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyDesc {
    pub body_type: RigidBodyType,
    pub position: [f32; 3],
    /// Quaternion as x, y, z, w
    pub rotation: [f32; 4],
    /// Keep the body upright (thrown props stay axis aligned)
    pub lock_rotations: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            lock_rotations: false,
        }
    }
}

impl RigidBodyDesc {
    fn of_type(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            ..Default::default()
        }
    }

    /// Level geometry
    pub fn fixed() -> Self {
        Self::of_type(RigidBodyType::Fixed)
    }

    /// Simulated prop
    pub fn dynamic() -> Self {
        Self::of_type(RigidBodyType::Dynamic)
    }

    /// Host-driven mover
    pub fn kinematic() -> Self {
        Self::of_type(RigidBodyType::Kinematic)
    }

    /// Spawn position
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    /// Spawn rotation as x, y, z, w
    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Keep the body upright
    pub fn with_locked_rotations(mut self) -> Self {
        self.lock_rotations = true;
        self
    }

    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        let builder = rapier::RigidBodyBuilder::new(self.body_type.to_rapier())
            .position(isometry(self.position, self.rotation));
        if self.lock_rotations {
            builder.lock_rotations()
        } else {
            builder
        }
    }
}

/// Rapier isometry from an array position and an x, y, z, w rotation
pub(crate) fn isometry(position: [f32; 3], rotation: [f32; 4]) -> rapier::Isometry<f32> {
    let [x, y, z, w] = rotation;
    rapier::Isometry::from_parts(
        rapier::Translation::new(position[0], position[1], position[2]),
        UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
    )
}
