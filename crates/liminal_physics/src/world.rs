//! Physics world - main simulation container

use crate::body::{isometry, RigidBodyDesc, RigidBodyHandle, RigidBodyType};
use crate::collider::{scaled_offset, ColliderDesc, ColliderHandle, ColliderShape};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::events::{entity_user_data, user_data_entity, CollisionEvent, EventForwarder};
use crate::hooks::IgnoredPairs;
use crate::query::PhysicsQuery;
use liminal_grab::EntityId;
use log::{debug, trace};
use rapier3d::prelude as rapier;
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Pose of an entity with its non-uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    /// World position
    pub position: [f32; 3],
    /// Rotation (quaternion: x, y, z, w)
    pub rotation: [f32; 4],
    /// Scale applied to every collider of the entity
    pub scale: [f32; 3],
}

impl Default for EntityTransform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

/// Collider attached to an entity, with its unscaled authoring data
#[derive(Debug, Clone)]
struct EntityCollider {
    handle: ColliderHandle,
    shape: ColliderShape,
    offset: [f32; 3],
    is_sensor: bool,
}

/// Everything the world knows about one entity
#[derive(Debug, Clone)]
struct EntityRecord {
    body: RigidBodyHandle,
    body_type: RigidBodyType,
    colliders: Vec<EntityCollider>,
    scale: [f32; 3],
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Query pipeline
    query_pipeline: rapier::QueryPipeline,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Collider pairs with contacts disabled
    ignored_pairs: IgnoredPairs,

    /// Contact changes from every substep of the last `step` call
    events: Vec<CollisionEvent>,

    /// Registered entities
    entities: HashMap<EntityId, EntityRecord>,

    /// Accumulated time for fixed timestep
    accumulated_time: f32,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            ignored_pairs: IgnoredPairs::new(),
            events: Vec::new(),
            entities: HashMap::new(),
            accumulated_time: 0.0,
        }
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Get gravity
    pub fn gravity(&self) -> [f32; 3] {
        [self.gravity.x, self.gravity.y, self.gravity.z]
    }

    // ==================== Entities ====================

    /// Register an entity with one body and its colliders
    ///
    /// `scale` is applied to every collider shape and offset.
    pub fn spawn_entity(
        &mut self,
        entity_id: EntityId,
        body: RigidBodyDesc,
        colliders: &[ColliderDesc],
        scale: [f32; 3],
    ) -> Result<RigidBodyHandle> {
        if self.entities.contains_key(&entity_id) {
            return Err(PhysicsError::DuplicateEntity(entity_id));
        }

        let user_data = entity_user_data(entity_id);
        let body_type = body.body_type;
        let body_handle = RigidBodyHandle(
            self.bodies
                .insert(body.to_rapier_builder().user_data(user_data)),
        );

        let colliders = colliders
            .iter()
            .map(|desc| {
                let handle = self.colliders.insert_with_parent(
                    desc.to_rapier_builder(scale, user_data),
                    body_handle.0,
                    &mut self.bodies,
                );
                EntityCollider {
                    handle: ColliderHandle(handle),
                    shape: desc.shape,
                    offset: desc.position_offset,
                    is_sensor: desc.is_sensor,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Spawned entity {} ({:?}, {} colliders)",
            entity_id,
            body_type,
            colliders.len()
        );

        self.entities.insert(
            entity_id,
            EntityRecord {
                body: body_handle,
                body_type,
                colliders,
                scale,
            },
        );

        Ok(body_handle)
    }

    /// Remove all physics objects for an entity
    pub fn remove_entity(&mut self, entity_id: EntityId) {
        let Some(record) = self.entities.remove(&entity_id) else {
            return;
        };

        for collider in &record.colliders {
            self.ignored_pairs.remove_collider(collider.handle);
        }

        self.bodies.remove(
            record.body.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true, // Remove attached colliders
        );
        debug!("Removed entity {}", entity_id);
    }

    /// Check whether an entity is registered
    pub fn contains_entity(&self, entity_id: EntityId) -> bool {
        self.entities.contains_key(&entity_id)
    }

    /// Get the rigid body handle for an entity
    pub fn body_for_entity(&self, entity_id: EntityId) -> Option<RigidBodyHandle> {
        self.entities.get(&entity_id).map(|r| r.body)
    }

    /// Authored body type of an entity
    pub fn body_type_for_entity(&self, entity_id: EntityId) -> Option<RigidBodyType> {
        self.entities.get(&entity_id).map(|r| r.body_type)
    }

    /// Get collider handles for an entity
    pub fn colliders_for_entity(&self, entity_id: EntityId) -> Vec<ColliderHandle> {
        self.entities
            .get(&entity_id)
            .map(|r| r.colliders.iter().map(|c| c.handle).collect())
            .unwrap_or_default()
    }

    /// First non-sensor collider of an entity
    pub fn solid_collider_for_entity(&self, entity_id: EntityId) -> Option<ColliderHandle> {
        self.entities
            .get(&entity_id)?
            .colliders
            .iter()
            .find(|c| !c.is_sensor)
            .map(|c| c.handle)
    }

    /// Entity owning a collider
    pub fn entity_for_collider(&self, handle: ColliderHandle) -> Option<EntityId> {
        self.colliders
            .get(handle.0)
            .and_then(|c| user_data_entity(c.user_data))
    }

    /// Current transform of an entity
    pub fn entity_transform(&self, entity_id: EntityId) -> Option<EntityTransform> {
        let record = self.entities.get(&entity_id)?;
        let body = self.bodies.get(record.body.0)?;
        let pos = body.translation();
        let rot = body.rotation();

        Some(EntityTransform {
            position: [pos.x, pos.y, pos.z],
            rotation: [rot.i, rot.j, rot.k, rot.w],
            scale: record.scale,
        })
    }

    /// Teleport an entity and apply its scale
    ///
    /// Collider shapes are rebuilt from their unscaled descriptions when the
    /// scale changes. Queries see the new pose after the next
    /// [`PhysicsWorld::sync_query_pipeline`] or step.
    pub fn set_entity_transform(&mut self, entity_id: EntityId, transform: EntityTransform) -> Result<()> {
        let record = self
            .entities
            .get_mut(&entity_id)
            .ok_or(PhysicsError::EntityNotInPhysics(entity_id))?;

        let body = self
            .bodies
            .get_mut(record.body.0)
            .ok_or(PhysicsError::BodyNotFound(record.body))?;
        let iso = isometry(transform.position, transform.rotation);
        body.set_position(iso, true);
        if body.is_kinematic() {
            body.set_next_kinematic_position(iso);
        }

        if record.scale != transform.scale {
            for entry in &record.colliders {
                let collider = self
                    .colliders
                    .get_mut(entry.handle.0)
                    .ok_or(PhysicsError::ColliderNotFound(entry.handle))?;
                collider.set_shape(entry.shape.scaled(transform.scale).to_rapier());
                collider.set_translation_wrt_parent(scaled_offset(entry.offset, transform.scale));
            }
            record.scale = transform.scale;
        }

        trace!("Entity {} moved to {:?}", entity_id, transform.position);
        Ok(())
    }

    /// Move an entity without touching its rotation or scale
    pub fn set_entity_position(&mut self, entity_id: EntityId, position: [f32; 3]) -> Result<()> {
        let mut transform = self
            .entity_transform(entity_id)
            .ok_or(PhysicsError::EntityNotInPhysics(entity_id))?;
        transform.position = position;
        self.set_entity_transform(entity_id, transform)
    }

    // ==================== Rigid Bodies ====================

    /// Get rigid body position
    pub fn get_body_position(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let pos = b.translation();
                [pos.x, pos.y, pos.z]
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get rigid body linear velocity
    pub fn get_body_linear_velocity(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let vel = b.linvel();
                [vel.x, vel.y, vel.z]
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Switch a body between kinematic and dynamic simulation
    ///
    /// Leaving kinematic mode zeroes the velocities so the body drops from
    /// rest.
    pub fn set_body_kinematic(&mut self, handle: RigidBodyHandle, kinematic: bool) -> Result<()> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;

        if kinematic {
            body.set_body_type(rapier::RigidBodyType::KinematicPositionBased, true);
        } else {
            body.set_body_type(rapier::RigidBodyType::Dynamic, true);
            body.set_linvel(rapier::Vector::zeros(), true);
            body.set_angvel(rapier::Vector::zeros(), true);
        }
        Ok(())
    }

    /// Check whether a body is currently kinematic
    pub fn is_body_kinematic(&self, handle: RigidBodyHandle) -> Result<bool> {
        self.bodies
            .get(handle.0)
            .map(|b| b.is_kinematic())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Colliders ====================

    /// Enable or disable contacts between two colliders
    pub fn set_collision_ignored(
        &mut self,
        a: ColliderHandle,
        b: ColliderHandle,
        ignored: bool,
    ) -> Result<()> {
        for handle in [a, b] {
            let collider = self
                .colliders
                .get_mut(handle.0)
                .ok_or(PhysicsError::ColliderNotFound(handle))?;
            if ignored {
                collider.set_active_hooks(
                    collider.active_hooks()
                        | rapier::ActiveHooks::FILTER_CONTACT_PAIRS
                        | rapier::ActiveHooks::FILTER_INTERSECTION_PAIR,
                );
            }
        }

        if self.ignored_pairs.set(a, b, ignored) {
            debug!(
                "Contacts between {:?} and {:?} {}",
                a,
                b,
                if ignored { "ignored" } else { "restored" }
            );
        }
        Ok(())
    }

    /// Check whether contacts between two colliders are ignored
    pub fn is_collision_ignored(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.ignored_pairs.contains(a, b)
    }

    // ==================== Simulation ====================

    /// Step the physics simulation with fixed timestep
    ///
    /// Events from every substep of this call are kept until the next call.
    pub fn step(&mut self, delta_time: f32) {
        self.events.clear();
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }

        if steps == self.config.max_substeps {
            // Drop the backlog instead of spiralling
            self.accumulated_time = self.accumulated_time.min(self.config.timestep);
        }

        // Update query pipeline after stepping
        self.query_pipeline.update(&self.colliders);
    }

    /// Push body poses set since the last step to their colliders and
    /// rebuild the query acceleration structure
    pub fn sync_query_pipeline(&mut self) {
        self.bodies
            .propagate_modified_body_positions_to_colliders(&mut self.colliders);
        self.query_pipeline.update(&self.colliders);
    }

    /// Internal fixed timestep
    fn step_internal(&mut self) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let forwarder = EventForwarder { sender };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &self.ignored_pairs,
            &forwarder,
        );

        let colliders = &self.colliders;
        self.events.extend(
            receiver
                .try_iter()
                .map(|event| CollisionEvent::resolve(event, colliders)),
        );
    }

    // ==================== Queries ====================

    /// Get a query interface for raycasting and shape queries
    pub fn query(&self) -> PhysicsQuery<'_> {
        PhysicsQuery {
            query_pipeline: &self.query_pipeline,
            colliders: &self.colliders,
            bodies: &self.bodies,
        }
    }

    // ==================== Events ====================

    /// Every contact change from the last step, sensors included
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Solid contacts that formed during the last step
    pub fn contacts_began(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.iter().filter(|e| !e.is_sensor && e.began())
    }

    /// Sensor overlaps that formed or ended during the last step
    pub fn sensor_events(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.iter().filter(|e| e.is_sensor)
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Get number of registered entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
