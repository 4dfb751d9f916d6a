//! Plate-driven doors

use crate::error::{Result, TriggerError};
use crate::lerp::DoorLerp;
use crate::plate::PressurePlate;
use glam::Vec3;
use log::info;
use serde::{Deserialize, Serialize};

/// Door parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Offset from the spawn position while closed
    pub closed_offset: Vec3,
    /// Offset from the spawn position while open
    pub open_offset: Vec3,
    /// Seconds an open or close move takes
    pub lerp_duration: f32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            closed_offset: Vec3::ZERO,
            open_offset: Vec3::new(0.0, 2.0, 0.0),
            lerp_duration: 1.0,
        }
    }
}

impl DoorConfig {
    /// Set the open offset
    pub fn with_open_offset(mut self, offset: Vec3) -> Self {
        self.open_offset = offset;
        self
    }

    /// Set the move duration
    pub fn with_lerp_duration(mut self, seconds: f32) -> Self {
        self.lerp_duration = seconds;
        self
    }

    /// Check parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.lerp_duration >= 0.0) || !self.lerp_duration.is_finite() {
            return Err(TriggerError::InvalidConfig {
                field: "lerp_duration",
                value: self.lerp_duration,
            });
        }
        Ok(())
    }
}

/// Open/closed state and the move in flight
#[derive(Debug, Clone, PartialEq)]
struct DoorMotion {
    entity: u64,
    config: DoorConfig,
    spawn_position: Vec3,
    position: Vec3,
    open: bool,
    lerp: DoorLerp,
}

impl DoorMotion {
    fn new(entity: u64, spawn_position: Vec3, config: DoorConfig) -> Self {
        Self {
            entity,
            config,
            spawn_position,
            position: spawn_position,
            open: false,
            lerp: DoorLerp::new(config.lerp_duration),
        }
    }

    fn open(&mut self) {
        self.lerp
            .start(self.position, self.spawn_position + self.config.open_offset);
        self.open = true;
        info!("Door {} opening", self.entity);
    }

    fn close(&mut self) {
        self.lerp
            .start(self.position, self.spawn_position + self.config.closed_offset);
        self.open = false;
        info!("Door {} closing", self.entity);
    }

    fn advance(&mut self, delta_time: f32) -> Option<Vec3> {
        let position = self.lerp.advance(delta_time)?;
        self.position = position;
        Some(position)
    }
}

/// Door opened by a single pressure plate
///
/// Opens while anything stays on the plate and closes once the last body
/// steps off.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateDoor {
    plate: u64,
    motion: DoorMotion,
}

impl PlateDoor {
    /// Create a closed door at `spawn_position`, driven by `plate`
    pub fn new(entity: u64, plate: u64, spawn_position: Vec3, config: DoorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            plate,
            motion: DoorMotion::new(entity, spawn_position, config),
        })
    }

    /// Door entity
    pub fn entity(&self) -> u64 {
        self.motion.entity
    }

    /// Plate driving the door
    pub fn plate(&self) -> u64 {
        self.plate
    }

    /// Check whether the door is open or opening
    pub fn is_open(&self) -> bool {
        self.motion.open
    }

    /// Last position written by the door
    pub fn position(&self) -> Vec3 {
        self.motion.position
    }

    /// Called every frame something overlaps the plate
    pub fn on_plate_stay(&mut self) {
        if !self.motion.open {
            self.motion.open();
        }
    }

    /// Called on every plate exit
    pub fn on_plate_exit(&mut self, plate: &mut PressurePlate) {
        if plate.occupants() <= 0 && self.motion.open {
            plate.clamp_empty();
            self.motion.close();
        }
    }

    /// Advance the move in flight; returns the position to write
    pub fn update(&mut self, delta_time: f32) -> Option<Vec3> {
        self.motion.advance(delta_time)
    }
}

/// Door that opens only while every one of its plates is occupied
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPlateDoor {
    plates: Vec<u64>,
    motion: DoorMotion,
}

impl MultiPlateDoor {
    /// Create a closed door at `spawn_position`, driven by `plates`
    pub fn new(entity: u64, plates: Vec<u64>, spawn_position: Vec3, config: DoorConfig) -> Result<Self> {
        config.validate()?;
        if plates.is_empty() {
            return Err(TriggerError::NoPlates(entity));
        }
        Ok(Self {
            plates,
            motion: DoorMotion::new(entity, spawn_position, config),
        })
    }

    /// Door entity
    pub fn entity(&self) -> u64 {
        self.motion.entity
    }

    /// Plates driving the door
    pub fn plates(&self) -> &[u64] {
        &self.plates
    }

    /// Check whether the door is open or opening
    pub fn is_open(&self) -> bool {
        self.motion.open
    }

    /// Last position written by the door
    pub fn position(&self) -> Vec3 {
        self.motion.position
    }

    /// Evaluate the plates and advance the move in flight
    ///
    /// `occupied` reports whether a plate has a positive count.
    pub fn update(&mut self, occupied: impl Fn(u64) -> bool, delta_time: f32) -> Option<Vec3> {
        let all_active = self.plates.iter().all(|&plate| occupied(plate));

        if all_active && !self.motion.open {
            self.motion.open();
        } else if !all_active && self.motion.open {
            self.motion.close();
        }

        self.motion.advance(delta_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::PlateConfig;
    use approx::assert_relative_eq;

    const DOOR: u64 = 100;
    const PLATE_A: u64 = 1;
    const PLATE_B: u64 = 2;

    #[test]
    fn test_config_validation() {
        assert!(DoorConfig::default().validate().is_ok());
        assert!(DoorConfig::default().with_lerp_duration(-1.0).validate().is_err());
        assert!(DoorConfig::default().with_lerp_duration(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_plate_door_open_and_close() {
        let spawn = Vec3::new(5.0, 0.0, 0.0);
        let mut plate = PressurePlate::new(PLATE_A, PlateConfig::default());
        let mut door = PlateDoor::new(DOOR, PLATE_A, spawn, DoorConfig::default()).unwrap();
        assert_eq!(door.update(0.1), None);

        plate.enter(7);
        door.on_plate_stay();
        assert!(door.is_open());
        let pos = door.update(0.5).unwrap();
        assert_relative_eq!(pos.y, 1.0, epsilon = 1e-6);

        // Staying does not restart the move
        door.on_plate_stay();
        let pos = door.update(0.5).unwrap();
        assert_eq!(pos, spawn + Vec3::new(0.0, 2.0, 0.0));

        plate.exit(7);
        door.on_plate_exit(&mut plate);
        assert!(!door.is_open());
        assert_eq!(door.update(2.0), Some(spawn));
    }

    #[test]
    fn test_plate_door_stays_open_while_occupied() {
        let mut plate = PressurePlate::new(PLATE_A, PlateConfig::default());
        let mut door = PlateDoor::new(DOOR, PLATE_A, Vec3::ZERO, DoorConfig::default()).unwrap();

        plate.enter(7);
        plate.enter(8);
        door.on_plate_stay();
        plate.exit(7);
        door.on_plate_exit(&mut plate);
        assert!(door.is_open());
    }

    #[test]
    fn test_plate_door_clamps_negative_count() {
        let mut plate = PressurePlate::new(PLATE_A, PlateConfig::default());
        let mut door = PlateDoor::new(DOOR, PLATE_A, Vec3::ZERO, DoorConfig::default()).unwrap();

        plate.enter(7);
        door.on_plate_stay();
        plate.exit(7);
        plate.exit(8);
        door.on_plate_exit(&mut plate);
        assert_eq!(plate.occupants(), 0);
    }

    #[test]
    fn test_close_reverses_from_current_position() {
        let mut plate = PressurePlate::new(PLATE_A, PlateConfig::default());
        let mut door = PlateDoor::new(DOOR, PLATE_A, Vec3::ZERO, DoorConfig::default()).unwrap();

        plate.enter(7);
        door.on_plate_stay();
        door.update(0.5);
        plate.exit(7);
        door.on_plate_exit(&mut plate);

        // Halfway back down from y = 1.0
        let pos = door.update(0.5).unwrap();
        assert_relative_eq!(pos.y, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_multi_plate_door() {
        let mut door =
            MultiPlateDoor::new(DOOR, vec![PLATE_A, PLATE_B], Vec3::ZERO, DoorConfig::default())
                .unwrap();

        assert_eq!(door.update(|p| p == PLATE_A, 0.1), None);
        assert!(!door.is_open());

        let pos = door.update(|_| true, 0.25).unwrap();
        assert!(door.is_open());
        assert_relative_eq!(pos.y, 0.5, epsilon = 1e-6);

        door.update(|_| true, 1.0);
        assert_relative_eq!(door.position().y, 2.0);

        door.update(|p| p == PLATE_B, 0.0);
        assert!(!door.is_open());
    }

    #[test]
    fn test_multi_plate_door_needs_plates() {
        assert_eq!(
            MultiPlateDoor::new(DOOR, Vec::new(), Vec3::ZERO, DoorConfig::default()),
            Err(TriggerError::NoPlates(DOOR))
        );
    }
}
