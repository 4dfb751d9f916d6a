//! Per-frame player driver
//!
//! Owns the look controller, the grab session and the pushback reactors of
//! released objects, and runs them against a [`PhysicsWorld`] and a
//! [`PuzzleSystem`] in a fixed order:
//!
//! 1. look/walk, then write the player body
//! 2. grab session (acquire, hold, release)
//! 3. physics step
//! 4. solid collision starts go to armed reactors
//! 5. reactor settle timers
//! 6. sensor enters/exits go to plates, doors are polled and written

use crate::config::PlayerConfig;
use crate::controller::LookController;
use crate::error::Result;
use crate::input::InputSnapshot;
use glam::Vec3;
use liminal_grab::{
    CollisionPushback, EntityId, GrabEvent, GrabSession, LayerMask, PushbackConfig,
    SceneTransforms,
};
use liminal_physics::{
    ColliderDesc, ColliderShape, CollisionGroups, CollisionLayer, PhysicsError, PhysicsWorld,
    RigidBodyDesc,
};
use liminal_triggers::{PuzzleSystem, TransformWrite, TriggerEvent};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Capsule half height of the player body
pub const PLAYER_HALF_HEIGHT: f32 = 0.5;

/// Capsule radius of the player body
pub const PLAYER_RADIUS: f32 = 0.4;

/// What happened during one [`Player::tick`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Grab session state change, if any
    pub grab_event: Option<GrabEvent>,
    /// Entities pushed back toward the camera this frame
    pub pushed_back: Vec<EntityId>,
    /// Entities whose reactor settled this frame
    pub settled: Vec<EntityId>,
    /// Plate enters and exits, in event order
    pub trigger_events: Vec<TriggerEvent>,
    /// Door and plate visual positions written this frame
    pub writes: Vec<TransformWrite>,
}

/// A first-person player with a forced-perspective grab
pub struct Player {
    entity: EntityId,
    controller: LookController,
    session: GrabSession,
    pushback: PushbackConfig,
    reactors: HashMap<EntityId, CollisionPushback>,
}

impl Player {
    /// Spawn the player body at `spawn` and set up its grab session
    ///
    /// The body is a kinematic capsule on [`CollisionLayer::PLAYER`]. Its
    /// layer is removed from the grab and obstruction masks, since the camera
    /// sits inside it. An empty grab mask falls back to
    /// [`CollisionLayer::GRABBABLE`].
    pub fn new(
        entity: EntityId,
        spawn: Vec3,
        config: &PlayerConfig,
        world: &mut PhysicsWorld,
    ) -> Result<Self> {
        config.validate()?;

        let collider = ColliderDesc::new(ColliderShape::capsule(PLAYER_HALF_HEIGHT, PLAYER_RADIUS))
            .with_collision_groups(CollisionGroups::layer(CollisionLayer::PLAYER));
        world.spawn_entity(
            entity,
            RigidBodyDesc::kinematic().with_position(spawn.x, spawn.y, spawn.z),
            &[collider],
            [1.0; 3],
        )?;
        let player_collider = world
            .solid_collider_for_entity(entity)
            .ok_or(PhysicsError::EntityNotInPhysics(entity))?;

        let player_bit = CollisionLayer::PLAYER.as_mask();
        let mut grab = config.grab.clone();
        if grab.grabbable_mask.is_empty() {
            debug!("No grab layers configured, using the grabbable layer");
            grab.grabbable_mask = CollisionLayer::GRABBABLE.query_mask();
        }
        grab.grabbable_mask = LayerMask(grab.grabbable_mask.0 & !player_bit);
        grab.obstruction_mask = LayerMask(grab.obstruction_mask.0 & !player_bit);
        grab.player_collider = Some(player_collider.id());

        info!("Player {} spawned at {:?}", entity, spawn);

        Ok(Self {
            entity,
            controller: LookController::new(spawn, config.look),
            session: GrabSession::new(grab)?,
            pushback: config.pushback,
            reactors: HashMap::new(),
        })
    }

    /// Player entity
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Look/walk state
    pub fn controller(&self) -> &LookController {
        &self.controller
    }

    /// Mutable look/walk state
    pub fn controller_mut(&mut self) -> &mut LookController {
        &mut self.controller
    }

    /// Grab session
    pub fn session(&self) -> &GrabSession {
        &self.session
    }

    /// Reactor of a released entity, while armed
    pub fn reactor(&self, entity: EntityId) -> Option<&CollisionPushback> {
        self.reactors.get(&entity)
    }

    /// Number of armed reactors
    pub fn active_reactors(&self) -> usize {
        self.reactors.len()
    }

    /// Run one frame
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        delta_time: f32,
        world: &mut PhysicsWorld,
        puzzles: &mut PuzzleSystem,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        self.controller.update(input, delta_time);
        if let Err(e) = world.set_entity_position(self.entity, self.controller.position().to_array())
        {
            warn!("Could not move player body: {}", e);
        }

        let camera = self.controller.camera();
        report.grab_event = self.session.update(&input.grab_input(), Some(&camera), world);
        match report.grab_event {
            Some(GrabEvent::Acquired { entity, .. }) => {
                // A reactor left over from an earlier release must not fight the hold
                if let Some(mut reactor) = self.reactors.remove(&entity) {
                    reactor.end_release();
                }
            }
            Some(GrabEvent::Released(release)) => {
                let reactor = self
                    .reactors
                    .entry(release.entity)
                    .or_insert_with(|| CollisionPushback::new(self.pushback));
                reactor.start_release(
                    release.camera_position,
                    release.camera_forward,
                    release.original_distance,
                    release.original_scale,
                );
                debug!("Pushback armed for entity {}", release.entity);
            }
            None => {}
        }

        world.step(delta_time);

        self.apply_pushback(world, &mut report);

        self.reactors.retain(|&entity, reactor| {
            let ended = reactor.tick(delta_time);
            if ended {
                debug!("Pushback settled for entity {}", entity);
                report.settled.push(entity);
            }
            !ended
        });

        Self::feed_puzzles(world, puzzles, delta_time, &mut report);

        report
    }

    fn apply_pushback(&mut self, world: &mut PhysicsWorld, report: &mut FrameReport) {
        if self.reactors.is_empty() {
            return;
        }

        let hit: Vec<EntityId> = world
            .contacts_began()
            .flat_map(|e| e.entities)
            .flatten()
            .filter(|entity| self.reactors.contains_key(entity))
            .collect();

        for entity in hit {
            let (Some(reactor), Some(mut pose)) = (self.reactors.get_mut(&entity), world.pose(entity))
            else {
                continue;
            };
            if reactor.on_collision_began(&mut pose) {
                world.set_pose(entity, pose);
                report.pushed_back.push(entity);
            }
        }
    }

    fn feed_puzzles(
        world: &mut PhysicsWorld,
        puzzles: &mut PuzzleSystem,
        delta_time: f32,
        report: &mut FrameReport,
    ) {
        let events: Vec<TriggerEvent> = world
            .sensor_events()
            .filter_map(|e| {
                let (a, b) = e.entity_pair()?;
                puzzles.classify(a, b, e.began())
            })
            .collect();

        for event in &events {
            puzzles.handle_event(event);
        }
        report.trigger_events = events;

        report.writes = puzzles.update(delta_time);
        for write in &report.writes {
            if let Err(e) = world.set_entity_position(write.entity, write.position.to_array()) {
                warn!("Could not move puzzle entity {}: {}", write.entity, e);
            }
        }
    }
}
