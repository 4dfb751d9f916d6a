//! Headless sandbox level
//!
//! Builds a small room with a grabbable cube, a pressure plate and a door,
//! then plays a scripted input sequence: look at the cube, grab it, turn
//! toward the plate and let go. The door opens once the cube rests on the
//! plate.
//!
//! Run with: cargo run -p liminal_player --bin liminal_sandbox [config.json]

use glam::{Vec2, Vec3};
use liminal_grab::GrabEvent;
use liminal_physics::{
    ColliderDesc, ColliderShape, CollisionGroups, CollisionLayer, PhysicsWorld, RigidBodyDesc,
};
use liminal_player::{FrameReport, InputSnapshot, Player, PlayerConfig, Result};
use liminal_triggers::{DoorConfig, PlateConfig, PlateDoor, PressurePlate, PuzzleSystem};

const PLAYER: u64 = 1;
const FLOOR: u64 = 100;
const BACK_WALL: u64 = 101;
const CUBE: u64 = 10;
const PLATE: u64 = 20;
const PLATE_TOP: u64 = 21;
const DOOR: u64 = 30;

const FRAME: f32 = 1.0 / 60.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match PlayerConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => PlayerConfig::discover(),
    };

    if let Err(e) = run(&config) {
        log::error!("Sandbox failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &PlayerConfig) -> Result<()> {
    let mut world = PhysicsWorld::new(config.physics.clone());
    let mut puzzles = PuzzleSystem::new();
    build_level(&mut world, &mut puzzles)?;

    let mut player = Player::new(PLAYER, Vec3::new(0.0, 0.9, 0.0), config, &mut world)?;
    log::info!(
        "Level ready: {} entities, {} colliders",
        world.entity_count(),
        world.collider_count()
    );

    // Settle the cube on the floor
    run_frames(&mut player, &mut world, &mut puzzles, InputSnapshot::new(), 30);

    for (label, input, frames) in script() {
        log::info!("Script: {}", label);
        run_frames(&mut player, &mut world, &mut puzzles, input, frames);
    }

    let door = puzzles
        .plate_doors()
        .iter()
        .find(|d| d.entity() == DOOR)
        .map(|d| (d.is_open(), d.position()));
    let occupants = puzzles.plate(PLATE).map(|p| p.occupants()).unwrap_or(0);
    match door {
        Some((open, position)) => log::info!(
            "Done: plate occupants {}, door {} at {:?}",
            occupants,
            if open { "open" } else { "closed" },
            position
        ),
        None => log::warn!("Door {} is not registered", DOOR),
    }

    Ok(())
}

fn build_level(world: &mut PhysicsWorld, puzzles: &mut PuzzleSystem) -> Result<()> {
    let environment = CollisionGroups::layer(CollisionLayer::ENVIRONMENT);

    world.spawn_entity(
        FLOOR,
        RigidBodyDesc::fixed().with_position(0.0, -0.5, 0.0),
        &[ColliderDesc::new(ColliderShape::cuboid(20.0, 0.5, 20.0)).with_collision_groups(environment)],
        [1.0; 3],
    )?;
    world.spawn_entity(
        BACK_WALL,
        RigidBodyDesc::fixed().with_position(0.0, 5.0, -14.0),
        &[ColliderDesc::new(ColliderShape::cuboid(20.0, 5.0, 0.5)).with_collision_groups(environment)],
        [1.0; 3],
    )?;
    world.spawn_entity(
        CUBE,
        RigidBodyDesc::dynamic().with_position(0.0, 0.5, -6.0),
        &[ColliderDesc::new(ColliderShape::cuboid(0.5, 0.5, 0.5))
            .with_collision_groups(CollisionGroups::layer(CollisionLayer::GRABBABLE))],
        [1.0; 3],
    )?;

    let plate_position = Vec3::new(4.0, 0.25, -4.0);
    world.spawn_entity(
        PLATE,
        RigidBodyDesc::fixed().with_position(plate_position.x, plate_position.y, plate_position.z),
        // Only props and the player press the plate, never the moving door
        &[ColliderDesc::sensor(ColliderShape::cuboid(1.5, 0.25, 1.5)).with_collision_groups(
            CollisionGroups::layer_ignoring(
                CollisionLayer::TRIGGERS,
                &[CollisionLayer::ENVIRONMENT, CollisionLayer::DOORS],
            ),
        )],
        [1.0; 3],
    )?;
    let plate_top = Vec3::new(plate_position.x, 0.02, plate_position.z);
    world.spawn_entity(
        PLATE_TOP,
        RigidBodyDesc::kinematic().with_position(plate_top.x, plate_top.y, plate_top.z),
        &[],
        [1.0; 3],
    )?;

    let door_spawn = Vec3::new(0.0, 1.5, -13.0);
    world.spawn_entity(
        DOOR,
        RigidBodyDesc::kinematic().with_position(door_spawn.x, door_spawn.y, door_spawn.z),
        &[ColliderDesc::new(ColliderShape::cuboid(1.0, 1.5, 0.25))
            .with_collision_groups(CollisionGroups::layer(CollisionLayer::DOORS))],
        [1.0; 3],
    )?;
    world.sync_query_pipeline();

    puzzles.register_plate(
        PressurePlate::new(PLATE, PlateConfig::default()).with_visual(PLATE_TOP, plate_top),
    )?;
    puzzles.register_plate_door(PlateDoor::new(
        DOOR,
        PLATE,
        door_spawn,
        DoorConfig::default().with_open_offset(Vec3::new(0.0, 3.0, 0.0)),
    )?)?;

    Ok(())
}

/// Labelled input held for a number of frames
fn script() -> Vec<(&'static str, InputSnapshot, u32)> {
    // Camera at y 1.5 looking at the cube center 6 units away: ~9.5 degrees
    // down, i.e. a look delta of +4.73 at sensitivity 2.
    let look_at_cube = InputSnapshot::new().with_look(Vec2::new(0.0, 4.73));
    let grab = InputSnapshot::new().with_grab(true);
    // 45 degrees to the right and a little further down toward the plate
    let turn = InputSnapshot::new().with_look(Vec2::new(1.125, 0.26));

    vec![
        ("look at the cube", look_at_cube, 1),
        ("grab", grab, 1),
        ("hold", InputSnapshot::new(), 10),
        ("turn toward the plate", turn, 20),
        ("release", grab, 1),
        ("wait for the door", InputSnapshot::new(), 120),
    ]
}

fn run_frames(
    player: &mut Player,
    world: &mut PhysicsWorld,
    puzzles: &mut PuzzleSystem,
    input: InputSnapshot,
    frames: u32,
) {
    for _ in 0..frames {
        let report = player.tick(&input, FRAME, world, puzzles);
        log_report(&report);
    }
}

fn log_report(report: &FrameReport) {
    match &report.grab_event {
        Some(GrabEvent::Acquired {
            entity,
            original_distance,
        }) => log::info!("Grabbed {} at distance {:.2}", entity, original_distance),
        Some(GrabEvent::Released(release)) => log::info!(
            "Released {} at distance {:.2} after {} steps ({:?})",
            release.entity,
            release.final_distance,
            release.steps,
            release.outcome
        ),
        None => {}
    }
    for entity in &report.pushed_back {
        log::info!("Pushed {} back toward the camera", entity);
    }
    for event in &report.trigger_events {
        log::info!("{}", event);
    }
}
