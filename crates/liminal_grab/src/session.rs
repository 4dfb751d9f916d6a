//! Grab session state machine
//!
//! One session per player. Each frame [`GrabSession::update`] runs, in order:
//!
//! 1. rising-edge detection of the grab button,
//! 2. acquisition (when idle) or release (when holding) on a press,
//! 3. the hold update while an object is held,
//! 4. storing the grab sample for the next frame.
//!
//! While holding, the object follows the camera and its scale follows the
//! forced-perspective law. On release the object is walked back out along the
//! view ray, re-checking for obstructions at every candidate scale, because a
//! receding object grows and can start to overlap scenery it cleared before.

use crate::config::{GrabConfig, HoldPlacement};
use crate::error::Result;
use crate::geometry::{mouse_rotation, rotation_offset, CameraPose, OrientedBox, PerspectiveAnchor, Pose};
use crate::input::{EdgeDetector, GrabInput};
use crate::scene::{BodyId, ColliderId, EntityId, GrabScene};
use glam::{Quat, Vec3};
use log::{debug, trace};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabState {
    /// Nothing held
    Idle,
    /// An object is held
    Holding,
}

/// State change produced by one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabEvent {
    /// An object was picked up
    Acquired {
        entity: EntityId,
        original_distance: f32,
    },
    /// The held object was let go
    Released(ReleaseReport),
}

/// How the release search ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// An obstruction was found; the object was pulled back in front of it
    Obstructed {
        /// First collider found overlapping the object
        collider: ColliderId,
        /// Candidate distance at which the overlap was detected
        detected_at: f32,
    },
    /// The step budget ran out without an obstruction
    OpenSpace,
    /// The object has no collider, so no search was possible
    Unchecked,
}

/// Everything known about a finished release
///
/// The camera snapshot and the anchor values are what a
/// [`CollisionPushback`](crate::pushback::CollisionPushback) needs to be armed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseReport {
    /// Released entity
    pub entity: EntityId,
    /// Camera position when the release started
    pub camera_position: Vec3,
    /// Camera forward when the release started
    pub camera_forward: Vec3,
    /// Distance at acquisition
    pub original_distance: f32,
    /// Scale at acquisition
    pub original_scale: Vec3,
    /// Camera distance the object was left at
    pub final_distance: f32,
    /// Search iterations performed
    pub steps: u32,
    /// Search result
    pub outcome: ReleaseOutcome,
}

/// The held object and its frame of reference
#[derive(Debug, Clone, Copy)]
struct HeldObject {
    entity: EntityId,
    rigid_body: Option<BodyId>,
    collider: Option<ColliderId>,
    anchor: PerspectiveAnchor,
    rotation_offset: Quat,
}

/// Result of the stepped withdrawal
struct Withdrawal {
    final_distance: f32,
    steps: u32,
    outcome: ReleaseOutcome,
}

/// Grab / hold / release state machine for one player
#[derive(Debug, Clone)]
pub struct GrabSession {
    config: GrabConfig,
    held: Option<HeldObject>,
    grab_edge: EdgeDetector,
}

impl GrabSession {
    /// Create a session from a validated configuration
    pub fn new(config: GrabConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            held: None,
            grab_edge: EdgeDetector::new(),
        })
    }

    /// Session configuration
    pub fn config(&self) -> &GrabConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> GrabState {
        if self.held.is_some() {
            GrabState::Holding
        } else {
            GrabState::Idle
        }
    }

    /// Check whether an object is held
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Held entity
    pub fn held_entity(&self) -> Option<EntityId> {
        self.held.map(|h| h.entity)
    }

    /// Rigid body cached at acquisition
    pub fn held_rigid_body(&self) -> Option<BodyId> {
        self.held.and_then(|h| h.rigid_body)
    }

    /// Collider cached at acquisition
    pub fn held_collider(&self) -> Option<ColliderId> {
        self.held.and_then(|h| h.collider)
    }

    /// Camera distance at acquisition
    pub fn original_distance(&self) -> Option<f32> {
        self.held.map(|h| h.anchor.original_distance)
    }

    /// Scale at acquisition
    pub fn original_scale(&self) -> Option<Vec3> {
        self.held.map(|h| h.anchor.original_scale)
    }

    /// Orientation of the held object relative to the camera
    pub fn rotation_offset(&self) -> Option<Quat> {
        self.held.map(|h| h.rotation_offset)
    }

    /// Run one frame
    ///
    /// `camera` is `None` when no camera is available, in which case the frame
    /// is skipped apart from storing the grab sample.
    pub fn update<S>(
        &mut self,
        input: &GrabInput,
        camera: Option<&CameraPose>,
        scene: &mut S,
    ) -> Option<GrabEvent>
    where
        S: GrabScene + ?Sized,
    {
        let pressed = self.grab_edge.pressed(input.grab_held);
        let mut event = None;

        match camera {
            Some(camera) => {
                if pressed {
                    event = if self.held.is_none() {
                        self.try_grab(camera, scene)
                    } else {
                        self.release(camera, scene).map(GrabEvent::Released)
                    };
                }

                if self.held.is_some() {
                    self.hold(input, camera, scene);
                }
            }
            None => trace!("No camera this frame, grab update skipped"),
        }

        self.grab_edge.store(input.grab_held);
        event
    }

    /// Pick up whatever grabbable object is under the crosshair
    fn try_grab<S>(&mut self, camera: &CameraPose, scene: &mut S) -> Option<GrabEvent>
    where
        S: GrabScene + ?Sized,
    {
        if self.config.grabbable_mask.is_empty() {
            trace!("Grab pressed but no grabbable layers are configured");
            return None;
        }

        let Some(hit) = scene.raycast(camera.position, camera.forward(), self.config.grabbable_mask)
        else {
            trace!("Grab pressed but nothing grabbable in view");
            return None;
        };

        let pose = scene.pose(hit.entity)?;
        let Some(anchor) = PerspectiveAnchor::capture(camera.position, pose.position, pose.scale)
        else {
            debug!("Entity {} sits on the camera, not grabbing", hit.entity);
            return None;
        };

        let capabilities = scene.capabilities(hit.entity);
        let collider = capabilities.collider.or(Some(hit.collider));

        if let Some(body) = capabilities.rigid_body {
            scene.set_kinematic(body, true);
        }

        if let (Some(player), Some(collider)) = (self.config.player_collider, collider) {
            scene.set_collision_ignored(collider, player, true);
        }

        self.held = Some(HeldObject {
            entity: hit.entity,
            rigid_body: capabilities.rigid_body,
            collider,
            anchor,
            rotation_offset: rotation_offset(camera.rotation, pose.rotation),
        });

        debug!(
            "Grabbed entity {} at distance {:.3}",
            hit.entity, anchor.original_distance
        );

        Some(GrabEvent::Acquired {
            entity: hit.entity,
            original_distance: anchor.original_distance,
        })
    }

    /// Per-frame pose update of the held object
    fn hold<S>(&mut self, input: &GrabInput, camera: &CameraPose, scene: &mut S)
    where
        S: GrabScene + ?Sized,
    {
        let Some(held) = self.held.as_mut() else {
            return;
        };

        let Some(mut pose) = scene.pose(held.entity) else {
            debug!("Held entity {} no longer exists, dropping it", held.entity);
            self.held = None;
            return;
        };

        if input.rotate_held {
            let delta = mouse_rotation(input.rotation_delta, self.config.rotation_sensitivity);
            held.rotation_offset = (held.rotation_offset * delta).normalize();
        }

        let held = *held;
        pose.rotation = camera.rotation * held.rotation_offset;

        match self.config.placement {
            HoldPlacement::FixedOffset => {
                held.anchor
                    .place(camera.position, camera.forward(), self.config.hold_distance, &mut pose);
            }
            HoldPlacement::SurfaceRaycast {
                offset_factor,
                additional_offset,
                backoff_step,
            } => {
                let placed = self.place_on_surface(
                    &held,
                    camera,
                    offset_factor + additional_offset,
                    backoff_step,
                    &mut pose,
                    scene,
                );
                if !placed {
                    held.anchor
                        .place(camera.position, camera.forward(), self.config.hold_distance, &mut pose);
                }
            }
        }

        scene.set_pose(held.entity, pose);
    }

    /// Surface-raycast placement; returns false when the ray hits nothing
    ///
    /// The ray passes through the held object so it lands on the scenery
    /// behind it.
    fn place_on_surface<S>(
        &self,
        held: &HeldObject,
        camera: &CameraPose,
        pullback: f32,
        backoff_step: f32,
        pose: &mut Pose,
        scene: &mut S,
    ) -> bool
    where
        S: GrabScene + ?Sized,
    {
        let forward = camera.forward();
        let mask = self.config.obstruction_mask;
        let hit = match held.collider {
            Some(own) => scene.raycast_excluding(camera.position, forward, mask, own),
            None => scene.raycast(camera.position, forward, mask),
        };
        let Some(hit) = hit else {
            return false;
        };

        pose.position = hit.point - forward * pullback * pose.scale.x;

        for _ in 0..self.config.max_release_steps {
            let region = OrientedBox::from_pose(pose);
            let clipping = scene
                .overlap_box(&region, self.config.obstruction_mask)
                .into_iter()
                .any(|c| Some(c) != held.collider);
            if !clipping {
                break;
            }
            pose.position -= forward * backoff_step;
        }

        let distance = camera.position.distance(pose.position);
        pose.scale = held.anchor.scale_at(distance);
        true
    }

    /// Let go of the held object
    fn release<S>(&mut self, camera: &CameraPose, scene: &mut S) -> Option<ReleaseReport>
    where
        S: GrabScene + ?Sized,
    {
        let held = self.held.take()?;

        if let (Some(player), Some(collider)) = (self.config.player_collider, held.collider) {
            scene.set_collision_ignored(collider, player, false);
        }

        let withdrawal = self.withdraw(&held, camera, scene);

        if let Some(body) = held.rigid_body {
            scene.set_kinematic(body, false);
        }

        match withdrawal.outcome {
            ReleaseOutcome::Obstructed {
                collider,
                detected_at,
            } => debug!(
                "Released entity {}: obstruction {:?} at {:.3}, resting at {:.3}",
                held.entity, collider, detected_at, withdrawal.final_distance
            ),
            ReleaseOutcome::OpenSpace => debug!(
                "Released entity {} into open space at {:.3} after {} steps",
                held.entity, withdrawal.final_distance, withdrawal.steps
            ),
            ReleaseOutcome::Unchecked => debug!(
                "Released entity {} without a collider at {:.3}",
                held.entity, withdrawal.final_distance
            ),
        }

        Some(ReleaseReport {
            entity: held.entity,
            camera_position: camera.position,
            camera_forward: camera.forward(),
            original_distance: held.anchor.original_distance,
            original_scale: held.anchor.original_scale,
            final_distance: withdrawal.final_distance,
            steps: withdrawal.steps,
            outcome: withdrawal.outcome,
        })
    }

    /// Stepped withdrawal along the view ray
    ///
    /// Candidate distances are `hold + step * i` for `i` in `1..=max_steps`.
    /// The first candidate whose bounds overlap another collider ends the
    /// search one step back, minus the pullback margin.
    fn withdraw<S>(&self, held: &HeldObject, camera: &CameraPose, scene: &mut S) -> Withdrawal
    where
        S: GrabScene + ?Sized,
    {
        let hold_distance = self.config.hold_distance;
        let Some(collider) = held.collider else {
            return Withdrawal {
                final_distance: hold_distance,
                steps: 0,
                outcome: ReleaseOutcome::Unchecked,
            };
        };
        let Some(mut pose) = scene.pose(held.entity) else {
            return Withdrawal {
                final_distance: hold_distance,
                steps: 0,
                outcome: ReleaseOutcome::Unchecked,
            };
        };

        let origin = camera.position;
        let forward = camera.forward();
        let step_size = self.config.release_step_size;
        let mut distance = hold_distance;

        for step in 1..=self.config.max_release_steps {
            distance = hold_distance + step_size * step as f32;
            held.anchor.place(origin, forward, distance, &mut pose);
            scene.set_pose(held.entity, pose);
            scene.resync_bounds();

            if let Some(obstruction) = self.find_obstruction(collider, scene) {
                let final_distance = distance - step_size - self.config.collision_pullback;
                held.anchor.place(origin, forward, final_distance, &mut pose);
                scene.set_pose(held.entity, pose);
                scene.resync_bounds();
                return Withdrawal {
                    final_distance,
                    steps: step,
                    outcome: ReleaseOutcome::Obstructed {
                        collider: obstruction,
                        detected_at: distance,
                    },
                };
            }
        }

        Withdrawal {
            final_distance: distance,
            steps: self.config.max_release_steps,
            outcome: ReleaseOutcome::OpenSpace,
        }
    }

    /// First collider other than `own` overlapping `own`'s bounds
    fn find_obstruction<S>(&self, own: ColliderId, scene: &S) -> Option<ColliderId>
    where
        S: GrabScene + ?Sized,
    {
        let bounds = scene.collider_bounds(own)?;
        scene
            .overlap_box(&bounds, self.config.obstruction_mask)
            .into_iter()
            .find(|&c| c != own)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Capabilities, LayerMask, PhysicsCapabilities, RayHit, SceneTransforms, SpatialQuery};
    use approx::assert_relative_eq;
    use glam::Vec2;
    use std::collections::HashMap;

    const BOX: EntityId = 7;
    const BOX_COLLIDER: ColliderId = ColliderId(70);
    const BOX_BODY: BodyId = BodyId(700);
    const BOX_LAYER: u32 = 3;
    const WALL: EntityId = 9;
    const WALL_COLLIDER: ColliderId = ColliderId(99);
    const WALL_LAYER: u32 = 2;
    const PLAYER_COLLIDER: ColliderId = ColliderId(1);

    /// Scene with one grabbable box and an optional wall at a fixed camera distance
    ///
    /// The ray reports the box wherever it is, otherwise the wall.
    #[derive(Default)]
    struct MockScene {
        poses: HashMap<EntityId, Pose>,
        ray_target: Option<EntityId>,
        wall_distance: Option<f32>,
        kinematic: HashMap<BodyId, bool>,
        ignored: Vec<(ColliderId, ColliderId, bool)>,
        written: Vec<Pose>,
        resyncs: usize,
    }

    impl MockScene {
        fn with_box(position: Vec3, scale: Vec3) -> Self {
            let mut scene = Self::default();
            scene
                .poses
                .insert(BOX, Pose::from_position(position).with_scale(scale));
            scene.ray_target = Some(BOX);
            scene
        }

        fn box_pose(&self) -> Pose {
            self.poses[&BOX]
        }

        fn ray(
            &self,
            origin: Vec3,
            direction: Vec3,
            mask: LayerMask,
            exclude: Option<ColliderId>,
        ) -> Option<RayHit> {
            if let Some(entity) = self.ray_target {
                if mask.contains(BOX_LAYER) && exclude != Some(BOX_COLLIDER) {
                    let point = self.poses[&entity].position;
                    return Some(RayHit {
                        point,
                        entity,
                        collider: BOX_COLLIDER,
                        distance: origin.distance(point),
                    });
                }
            }
            let wall = self.wall_distance.filter(|_| mask.contains(WALL_LAYER))?;
            Some(RayHit {
                point: origin + direction.normalize() * wall,
                entity: WALL,
                collider: WALL_COLLIDER,
                distance: wall,
            })
        }
    }

    impl SceneTransforms for MockScene {
        fn pose(&self, entity: EntityId) -> Option<Pose> {
            self.poses.get(&entity).copied()
        }

        fn set_pose(&mut self, entity: EntityId, pose: Pose) {
            self.written.push(pose);
            self.poses.insert(entity, pose);
        }
    }

    impl SpatialQuery for MockScene {
        fn raycast(&self, origin: Vec3, direction: Vec3, mask: LayerMask) -> Option<RayHit> {
            self.ray(origin, direction, mask, None)
        }

        fn raycast_excluding(
            &self,
            origin: Vec3,
            direction: Vec3,
            mask: LayerMask,
            exclude: ColliderId,
        ) -> Option<RayHit> {
            self.ray(origin, direction, mask, Some(exclude))
        }

        fn overlap_box(&self, region: &OrientedBox, _mask: LayerMask) -> Vec<ColliderId> {
            let mut hits = vec![BOX_COLLIDER];
            if let Some(wall) = self.wall_distance {
                if region.center.length() >= wall - 1e-4 {
                    hits.push(WALL_COLLIDER);
                }
            }
            hits
        }

        fn collider_bounds(&self, collider: ColliderId) -> Option<OrientedBox> {
            (collider == BOX_COLLIDER).then(|| OrientedBox::from_pose(&self.poses[&BOX]))
        }

        fn resync_bounds(&mut self) {
            self.resyncs += 1;
        }
    }

    impl PhysicsCapabilities for MockScene {
        fn capabilities(&self, entity: EntityId) -> Capabilities {
            if entity == BOX {
                Capabilities {
                    rigid_body: Some(BOX_BODY),
                    collider: Some(BOX_COLLIDER),
                }
            } else {
                Capabilities::default()
            }
        }

        fn set_kinematic(&mut self, body: BodyId, kinematic: bool) {
            self.kinematic.insert(body, kinematic);
        }

        fn set_collision_ignored(&mut self, a: ColliderId, b: ColliderId, ignored: bool) {
            self.ignored.push((a, b, ignored));
        }
    }

    fn camera() -> CameraPose {
        CameraPose::default()
    }

    fn press() -> GrabInput {
        GrabInput::grab(true)
    }

    fn idle() -> GrabInput {
        GrabInput::grab(false)
    }

    fn session(config: GrabConfig) -> GrabSession {
        GrabSession::new(config).unwrap()
    }

    fn grab_config() -> GrabConfig {
        GrabConfig::default().with_grabbable_mask(LayerMask::layer(BOX_LAYER))
    }

    #[test]
    fn test_grab_scales_to_hold_distance() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        let mut session = session(grab_config());

        let event = session.update(&press(), Some(&camera()), &mut scene);
        assert_eq!(
            event,
            Some(GrabEvent::Acquired {
                entity: BOX,
                original_distance: 10.0
            })
        );
        assert_eq!(session.state(), GrabState::Holding);
        assert_eq!(session.original_scale(), Some(Vec3::ONE));
        assert_eq!(scene.kinematic.get(&BOX_BODY), Some(&true));

        let pose = scene.box_pose();
        assert_relative_eq!(pose.position.z, -0.2, epsilon = 1e-6);
        assert_relative_eq!(pose.scale.x, 0.02, epsilon = 1e-6);
        assert_relative_eq!(pose.scale.y, 0.02, epsilon = 1e-6);
        assert_relative_eq!(pose.scale.z, 0.02, epsilon = 1e-6);
    }

    #[test]
    fn test_failed_grab_stays_idle() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        scene.ray_target = None;
        let mut session = session(grab_config());

        assert_eq!(session.update(&press(), Some(&camera()), &mut scene), None);
        assert_eq!(session.state(), GrabState::Idle);
        assert!(scene.kinematic.is_empty());
        assert!(scene.ignored.is_empty());
        assert!(scene.written.is_empty());
    }

    #[test]
    fn test_held_button_does_not_toggle() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        let mut session = session(grab_config());

        assert!(session.update(&press(), Some(&camera()), &mut scene).is_some());
        for _ in 0..5 {
            assert!(session.update(&press(), Some(&camera()), &mut scene).is_none());
            assert!(session.is_holding());
        }
        assert!(session.update(&idle(), Some(&camera()), &mut scene).is_none());
        assert!(session.is_holding());
    }

    #[test]
    fn test_missing_camera_skips_frame_but_tracks_button() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        let mut session = session(grab_config());

        assert!(session.update(&press(), None, &mut scene).is_none());
        assert_eq!(session.state(), GrabState::Idle);

        // Still held: no new edge once the camera is back
        assert!(session.update(&press(), Some(&camera()), &mut scene).is_none());
        assert_eq!(session.state(), GrabState::Idle);
    }

    #[test]
    fn test_rotation_preserved_without_input() {
        let rotation = Quat::from_rotation_y(0.4) * Quat::from_rotation_z(0.25);
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -4.0), Vec3::ONE);
        scene.poses.get_mut(&BOX).unwrap().rotation = rotation;
        let camera = CameraPose::new(Vec3::ZERO, Quat::from_rotation_x(0.1));
        scene.poses.get_mut(&BOX).unwrap().position = camera.point_at(4.0);

        let mut session = session(grab_config());
        session.update(&press(), Some(&camera), &mut scene);
        for _ in 0..10 {
            session.update(&idle(), Some(&camera), &mut scene);
        }

        assert!(scene.box_pose().rotation.abs_diff_eq(rotation, 1e-6));
    }

    #[test]
    fn test_rotate_modifier_accumulates() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -4.0), Vec3::ONE);
        let mut session = session(grab_config().with_rotation_sensitivity(1.0));
        session.update(&press(), Some(&camera()), &mut scene);

        let turn = GrabInput::new(false, true, Vec2::new(45.0, 0.0));
        session.update(&turn, Some(&camera()), &mut scene);
        session.update(&turn, Some(&camera()), &mut scene);

        // Two 45 degree yaws make a quarter turn: the front faces +X
        let front = scene.box_pose().rotation * Vec3::NEG_Z;
        assert_relative_eq!(front.x, 1.0, epsilon = 1e-5);

        // Delta ignored without the modifier
        let before = session.rotation_offset().unwrap();
        session.update(&GrabInput::new(false, false, Vec2::new(45.0, 0.0)), Some(&camera()), &mut scene);
        assert_eq!(session.rotation_offset().unwrap(), before);
    }

    #[test]
    fn test_object_follows_camera() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -5.0), Vec3::splat(2.0));
        let mut session = session(grab_config().with_hold_distance(0.5));
        session.update(&press(), Some(&camera()), &mut scene);

        let moved = CameraPose::new(Vec3::new(3.0, 1.0, 0.0), Quat::from_rotation_y(1.0));
        session.update(&idle(), Some(&moved), &mut scene);

        let pose = scene.box_pose();
        assert!(pose.position.abs_diff_eq(moved.point_at(0.5), 1e-5));
        assert!(pose.scale.abs_diff_eq(Vec3::splat(0.2), 1e-6));
    }

    #[test]
    fn test_release_stops_before_obstruction() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        scene.wall_distance = Some(0.5);
        let mut session = session(grab_config().with_release_steps(0.05, 0.1));

        session.update(&press(), Some(&camera()), &mut scene);
        session.update(&idle(), Some(&camera()), &mut scene);
        scene.written.clear();

        let Some(GrabEvent::Released(report)) = session.update(&press(), Some(&camera()), &mut scene)
        else {
            panic!("expected a release");
        };

        assert_eq!(session.state(), GrabState::Idle);
        assert_eq!(report.steps, 6);
        match report.outcome {
            ReleaseOutcome::Obstructed {
                collider,
                detected_at,
            } => {
                assert_eq!(collider, WALL_COLLIDER);
                assert_relative_eq!(detected_at, 0.5, epsilon = 1e-5);
                assert!(report.final_distance < detected_at);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_relative_eq!(report.final_distance, 0.35, epsilon = 1e-5);

        let pose = scene.box_pose();
        assert_relative_eq!(pose.position.z, -0.35, epsilon = 1e-5);
        assert_relative_eq!(pose.scale.x, 0.035, epsilon = 1e-6);

        // Candidate distances strictly increase until the pullback write
        let candidates: Vec<f32> = scene.written[..scene.written.len() - 1]
            .iter()
            .map(|p| -p.position.z)
            .collect();
        assert_eq!(candidates.len(), 6);
        assert!(candidates.windows(2).all(|w| w[1] > w[0]));
        for pose in &scene.written {
            let distance = pose.position.length();
            assert!(pose.scale.abs_diff_eq(Vec3::splat(distance / 10.0), 1e-6));
        }

        assert_eq!(scene.kinematic.get(&BOX_BODY), Some(&false));
        assert!(scene.resyncs >= 6);
    }

    #[test]
    fn test_release_into_void_exhausts_steps() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -2.0), Vec3::ONE);
        let config = grab_config()
            .with_release_steps(0.1, 0.1)
            .with_max_release_steps(25);
        let mut session = session(config);

        session.update(&press(), Some(&camera()), &mut scene);
        session.update(&idle(), Some(&camera()), &mut scene);
        scene.resyncs = 0;

        let Some(GrabEvent::Released(report)) = session.update(&press(), Some(&camera()), &mut scene)
        else {
            panic!("expected a release");
        };

        assert_eq!(report.outcome, ReleaseOutcome::OpenSpace);
        assert_eq!(report.steps, 25);
        assert_eq!(scene.resyncs, 25);
        assert_relative_eq!(report.final_distance, 0.2 + 0.1 * 25.0, epsilon = 1e-5);
        assert_relative_eq!(scene.box_pose().position.z, -2.7, epsilon = 1e-5);
        assert_relative_eq!(scene.box_pose().scale.y, 2.7 / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_player_collision_ignored_while_held() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -3.0), Vec3::ONE);
        let config = grab_config()
            .with_player_collider(PLAYER_COLLIDER)
            .with_max_release_steps(4);
        let mut session = session(config);

        session.update(&press(), Some(&camera()), &mut scene);
        assert_eq!(scene.ignored, vec![(BOX_COLLIDER, PLAYER_COLLIDER, true)]);

        session.update(&idle(), Some(&camera()), &mut scene);
        session.update(&press(), Some(&camera()), &mut scene);
        assert_eq!(
            scene.ignored,
            vec![
                (BOX_COLLIDER, PLAYER_COLLIDER, true),
                (BOX_COLLIDER, PLAYER_COLLIDER, false)
            ]
        );
        assert!(session.held_entity().is_none());
        assert!(session.held_collider().is_none());
        assert!(session.held_rigid_body().is_none());
    }

    #[test]
    fn test_release_report_carries_pushback_snapshot() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -8.0), Vec3::splat(3.0));
        let mut session = session(grab_config().with_max_release_steps(2));
        session.update(&press(), Some(&camera()), &mut scene);
        session.update(&idle(), Some(&camera()), &mut scene);

        let Some(GrabEvent::Released(report)) = session.update(&press(), Some(&camera()), &mut scene)
        else {
            panic!("expected a release");
        };
        assert_eq!(report.entity, BOX);
        assert_eq!(report.camera_position, Vec3::ZERO);
        assert_eq!(report.camera_forward, Vec3::NEG_Z);
        assert_relative_eq!(report.original_distance, 8.0);
        assert_eq!(report.original_scale, Vec3::splat(3.0));
    }

    #[test]
    fn test_vanished_entity_is_dropped() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -3.0), Vec3::ONE);
        let mut session = session(grab_config());
        session.update(&press(), Some(&camera()), &mut scene);

        scene.poses.clear();
        session.update(&idle(), Some(&camera()), &mut scene);
        assert_eq!(session.state(), GrabState::Idle);
    }

    #[test]
    fn test_default_mask_grabs_nothing() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        let mut session = session(GrabConfig::default());

        assert_eq!(session.update(&press(), Some(&camera()), &mut scene), None);
        assert_eq!(session.state(), GrabState::Idle);
        assert!(scene.kinematic.is_empty());
        assert!(scene.written.is_empty());
    }

    #[test]
    fn test_grab_ignores_layers_outside_mask() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        scene.ray_target = None;
        scene.wall_distance = Some(4.0);
        let mut session = session(grab_config());

        assert_eq!(session.update(&press(), Some(&camera()), &mut scene), None);
        assert_eq!(session.state(), GrabState::Idle);
        assert!(scene.written.is_empty());
    }

    #[test]
    fn test_long_rotation_stays_normalized() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -4.0), Vec3::ONE);
        let mut session = session(grab_config().with_rotation_sensitivity(0.37));
        session.update(&press(), Some(&camera()), &mut scene);

        let turn = GrabInput::new(false, true, Vec2::new(13.1, -7.9));
        for _ in 0..5000 {
            session.update(&turn, Some(&camera()), &mut scene);
        }
        let offset = session.rotation_offset().unwrap();
        assert_relative_eq!(offset.length(), 1.0, epsilon = 1e-6);
        assert!(scene.box_pose().rotation.is_normalized());
    }

    #[test]
    fn test_surface_placement_rests_in_front_of_wall() {
        let mut scene = MockScene::with_box(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        scene.wall_distance = Some(3.0);
        let config = grab_config().with_placement(HoldPlacement::SurfaceRaycast {
            offset_factor: 0.0,
            additional_offset: 0.0,
            backoff_step: 0.02,
        });
        let mut session = session(config);
        session.update(&press(), Some(&camera()), &mut scene);

        // The ray passes through the box, so every frame lands on the wall
        let first = scene.box_pose().position.length();
        for _ in 0..5 {
            session.update(&idle(), Some(&camera()), &mut scene);
            let pose = scene.box_pose();
            let distance = pose.position.length();
            assert_relative_eq!(distance, first, epsilon = 1e-5);
            assert!(pose.scale.abs_diff_eq(Vec3::splat(distance / 10.0), 1e-5));
        }
        assert!(first < 3.0);
        assert!(first > 2.9);
    }
}
