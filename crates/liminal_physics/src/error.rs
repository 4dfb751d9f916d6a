//! Error types for the physics world

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use liminal_grab::EntityId;
use thiserror::Error;

/// Physics world errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(RigidBodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(ColliderHandle),

    /// Entity was never registered with the world
    #[error("Entity {0} has no physics body")]
    EntityNotInPhysics(EntityId),

    /// Entity id already registered
    #[error("Entity {0} is already registered")]
    DuplicateEntity(EntityId),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
