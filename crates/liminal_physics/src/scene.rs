//! Grab scene bridge
//!
//! Implements the `liminal_grab` scene traits on [`PhysicsWorld`] so a
//! `GrabSession` can drive Rapier bodies directly. Failures on the write
//! side are logged and swallowed; the session treats the scene as
//! authoritative and re-reads it every frame.

use crate::body::{RigidBodyHandle, RigidBodyType};
use crate::collider::ColliderHandle;
use crate::query::LayerFilter;
use crate::world::{EntityTransform, PhysicsWorld};
use glam::{Quat, Vec3};
use liminal_grab::{
    BodyId, Capabilities, ColliderId, EntityId, LayerMask, OrientedBox, PhysicsCapabilities, Pose,
    RayHit, SceneTransforms, SpatialQuery,
};
use log::warn;

impl From<EntityTransform> for Pose {
    fn from(t: EntityTransform) -> Self {
        Pose::new(
            Vec3::from_array(t.position),
            Quat::from_array(t.rotation),
            Vec3::from_array(t.scale),
        )
    }
}

impl From<Pose> for EntityTransform {
    fn from(pose: Pose) -> Self {
        Self {
            position: pose.position.to_array(),
            rotation: pose.rotation.to_array(),
            scale: pose.scale.to_array(),
        }
    }
}

impl SceneTransforms for PhysicsWorld {
    fn pose(&self, entity: EntityId) -> Option<Pose> {
        self.entity_transform(entity).map(Pose::from)
    }

    fn set_pose(&mut self, entity: EntityId, pose: Pose) {
        if let Err(e) = self.set_entity_transform(entity, pose.into()) {
            warn!("Could not move entity {}: {}", entity, e);
        }
    }
}

/// Rays only report colliders that belong to a spawned entity
fn entity_ray(world: &PhysicsWorld, origin: Vec3, direction: Vec3, filter: LayerFilter) -> Option<RayHit> {
    let hit = world
        .query()
        .raycast(origin.to_array(), direction.to_array(), filter)?;

    Some(RayHit {
        point: Vec3::from_array(hit.point),
        entity: hit.entity?,
        collider: hit.collider.id(),
        distance: hit.distance,
    })
}

impl SpatialQuery for PhysicsWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, mask: LayerMask) -> Option<RayHit> {
        entity_ray(self, origin, direction, LayerFilter::solid(mask))
    }

    fn raycast_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        mask: LayerMask,
        exclude: ColliderId,
    ) -> Option<RayHit> {
        let filter = LayerFilter::solid(mask).excluding(ColliderHandle::from_id(exclude));
        entity_ray(self, origin, direction, filter)
    }

    fn overlap_box(&self, region: &OrientedBox, mask: LayerMask) -> Vec<ColliderId> {
        self.query()
            .overlap_box(
                region.center.to_array(),
                region.half_extents.to_array(),
                region.rotation.to_array(),
                LayerFilter::solid(mask),
            )
            .into_iter()
            .map(|handle| handle.id())
            .collect()
    }

    fn collider_bounds(&self, collider: ColliderId) -> Option<OrientedBox> {
        let bounds = self
            .query()
            .collider_bounds(ColliderHandle::from_id(collider))?;
        Some(OrientedBox::new(
            Vec3::from_array(bounds.center),
            Vec3::from_array(bounds.half_extents),
            Quat::from_array(bounds.rotation),
        ))
    }

    fn resync_bounds(&mut self) {
        self.sync_query_pipeline();
    }
}

impl PhysicsCapabilities for PhysicsWorld {
    fn capabilities(&self, entity: EntityId) -> Capabilities {
        // Only authored dynamic bodies are handed over for kinematic control
        let rigid_body = match self.body_type_for_entity(entity) {
            Some(RigidBodyType::Dynamic) => self.body_for_entity(entity).map(|b| b.id()),
            _ => None,
        };

        Capabilities {
            rigid_body,
            collider: self.solid_collider_for_entity(entity).map(|c| c.id()),
        }
    }

    fn set_kinematic(&mut self, body: BodyId, kinematic: bool) {
        if let Err(e) = self.set_body_kinematic(RigidBodyHandle::from_id(body), kinematic) {
            warn!("Could not change body mode: {}", e);
        }
    }

    fn set_collision_ignored(&mut self, a: ColliderId, b: ColliderId, ignored: bool) {
        let result = PhysicsWorld::set_collision_ignored(
            self,
            ColliderHandle::from_id(a),
            ColliderHandle::from_id(b),
            ignored,
        );
        if let Err(e) = result {
            warn!("Could not update ignored pair: {}", e);
        }
    }
}
