//! Contact events reported by the simulation

use crate::collider::ColliderHandle;
use crossbeam_channel::Sender;
use liminal_grab::EntityId;
use rapier3d::prelude as rapier;

/// Marks collider user data that carries an entity id
const ENTITY_TAG: u128 = 1 << 64;

/// Encode an entity id into collider user data
pub(crate) fn entity_user_data(entity: EntityId) -> u128 {
    ENTITY_TAG | entity as u128
}

/// Decode an entity id from collider user data
pub(crate) fn user_data_entity(user_data: u128) -> Option<EntityId> {
    (user_data & ENTITY_TAG != 0).then_some(user_data as u64)
}

/// Whether a contact pair just formed or just separated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Began,
    Ended,
}

/// Contact change between two colliders during a step
///
/// Sensor overlaps are reported here too; `is_sensor` tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub colliders: [ColliderHandle; 2],
    /// Owning entity of each collider, in the same order
    pub entities: [Option<EntityId>; 2],
    pub phase: ContactPhase,
    pub is_sensor: bool,
}

impl CollisionEvent {
    /// Resolve a raw event against the collider set that produced it
    pub(crate) fn resolve(event: rapier::CollisionEvent, colliders: &rapier::ColliderSet) -> Self {
        let phase = if event.started() {
            ContactPhase::Began
        } else {
            ContactPhase::Ended
        };
        let handles = [event.collider1(), event.collider2()];
        let lookup = handles.map(|h| colliders.get(h));

        Self {
            colliders: handles.map(ColliderHandle),
            entities: lookup.map(|c| c.and_then(|c| user_data_entity(c.user_data))),
            phase,
            is_sensor: lookup.iter().flatten().any(|c| c.is_sensor()),
        }
    }

    pub fn began(&self) -> bool {
        self.phase == ContactPhase::Began
    }

    /// Both owning entities, when both colliders belong to one
    pub fn entity_pair(&self) -> Option<(EntityId, EntityId)> {
        Some((self.entities[0]?, self.entities[1]?))
    }

    pub fn involves(&self, entity: EntityId) -> bool {
        self.entities.contains(&Some(entity))
    }

    /// The entity on the other side of the contact from `entity`
    pub fn other(&self, entity: EntityId) -> Option<EntityId> {
        match self.entities {
            [Some(a), b] if a == entity => b,
            [a, Some(b)] if b == entity => a,
            _ => None,
        }
    }
}

/// Forwards Rapier's collision callbacks into a channel drained after each substep
pub(crate) struct EventForwarder {
    pub(crate) sender: Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for EventForwarder {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        // The receiver lives for the whole substep
        let _ = self.sender.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(entities: [Option<EntityId>; 2]) -> CollisionEvent {
        let handle = ColliderHandle(rapier::ColliderHandle::from_raw_parts(0, 0));
        CollisionEvent {
            colliders: [handle; 2],
            entities,
            phase: ContactPhase::Began,
            is_sensor: false,
        }
    }

    #[test]
    fn test_user_data_encoding() {
        assert_eq!(user_data_entity(entity_user_data(0)), Some(0));
        assert_eq!(user_data_entity(entity_user_data(u64::MAX)), Some(u64::MAX));
        assert_eq!(user_data_entity(0), None);
    }

    #[test]
    fn test_other_entity() {
        let e = contact([Some(1), Some(2)]);
        assert!(e.involves(1));
        assert!(e.began());
        assert_eq!(e.other(1), Some(2));
        assert_eq!(e.other(2), Some(1));
        assert_eq!(e.other(3), None);
        assert_eq!(e.entity_pair(), Some((1, 2)));
    }

    #[test]
    fn test_unowned_collider() {
        let e = contact([None, Some(4)]);
        assert_eq!(e.other(4), None);
        assert_eq!(e.entity_pair(), None);
        assert!(!e.involves(0));
    }

    #[test]
    fn test_resolve_marks_sensor_pairs() {
        let mut colliders = rapier::ColliderSet::new();
        let solid = colliders.insert(
            rapier::ColliderBuilder::ball(0.5).user_data(entity_user_data(10)),
        );
        let sensor = colliders.insert(rapier::ColliderBuilder::ball(0.5).sensor(true));

        let event = CollisionEvent::resolve(
            rapier::CollisionEvent::Stopped(solid, sensor, rapier::CollisionEventFlags::SENSOR),
            &colliders,
        );
        assert_eq!(event.phase, ContactPhase::Ended);
        assert!(event.is_sensor);
        assert_eq!(event.entities, [Some(10), None]);
    }
}
