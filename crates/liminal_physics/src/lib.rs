//! Liminal Physics - Rapier 3D Integration
//!
//! This crate provides the physics world behind the forced-perspective grab
//! mechanic, built on Rapier 3D.
//!
//! # Features
//!
//! - Entity-keyed rigid bodies (static, dynamic, kinematic)
//! - Non-uniform entity scale rebuilt into collider shapes
//! - Trigger volumes (sensors) with enter/exit events
//! - Raycasting and oriented-box overlap queries
//! - Collision layers and per-pair contact suppression
//! - `liminal_grab` scene traits implemented on [`PhysicsWorld`]
//!
//! # Frame flow
//!
//! ```text
//!   grab session ──writes──▶ entity table ──scale──▶ rebuilt collider shapes
//!        ▲                        │
//!        │ raycast / overlap_box  ▼
//!   query pipeline ◀── sync ── Rapier sets ──step──▶ CollisionEvent list
//!                                 ▲                    (solid + sensor)
//!                     IgnoredPairs hook filters
//!                     player/held-object contacts
//! ```
//!
//! # Example
//!
//! ```ignore
//! use liminal_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::default();
//!
//! physics.spawn_entity(
//!     cube_id,
//!     RigidBodyDesc::dynamic().with_position(0.0, 0.0, -5.0),
//!     &[ColliderDesc::new(ColliderShape::cuboid(0.5, 0.5, 0.5))
//!         .with_collision_groups(CollisionGroups::layer(CollisionLayer::GRABBABLE))],
//!     [1.0; 3],
//! )?;
//!
//! // The world is a grab scene
//! session.update(&input, Some(&camera), &mut physics);
//! physics.step(1.0 / 60.0);
//! ```

pub mod body;
pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod hooks;
pub mod layers;
pub mod query;
pub mod scene;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{RigidBodyDesc, RigidBodyHandle, RigidBodyType};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, ContactPhase};
    pub use crate::layers::{CollisionGroups, CollisionLayer};
    pub use crate::query::{ColliderBounds, LayerFilter, RaycastHit};
    pub use crate::world::{EntityTransform, PhysicsWorld};
}

pub use prelude::*;
