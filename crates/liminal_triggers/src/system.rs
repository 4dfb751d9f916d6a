//! Puzzle system owning plates and the doors they drive

use crate::door::{MultiPlateDoor, PlateDoor};
use crate::error::{Result, TriggerError};
use crate::events::{PlateContact, TriggerEvent};
use crate::plate::PressurePlate;
use glam::Vec3;
use log::trace;
use std::collections::HashMap;

/// Position the host must write to an entity this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformWrite {
    /// Entity to move
    pub entity: u64,
    /// New world position
    pub position: Vec3,
}

/// Plates keyed by sensor entity, plus every door depending on them
#[derive(Debug, Default)]
pub struct PuzzleSystem {
    plates: HashMap<u64, PressurePlate>,
    plate_doors: Vec<PlateDoor>,
    multi_doors: Vec<MultiPlateDoor>,
}

impl PuzzleSystem {
    /// Create an empty system
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plate
    pub fn register_plate(&mut self, plate: PressurePlate) -> Result<()> {
        let entity = plate.entity();
        if self.plates.contains_key(&entity) {
            return Err(TriggerError::DuplicatePlate(entity));
        }
        self.plates.insert(entity, plate);
        Ok(())
    }

    /// Register a single-plate door
    pub fn register_plate_door(&mut self, door: PlateDoor) -> Result<()> {
        if !self.plates.contains_key(&door.plate()) {
            return Err(TriggerError::UnknownPlate(door.plate()));
        }
        self.plate_doors.push(door);
        Ok(())
    }

    /// Register a multi-plate door
    pub fn register_multi_door(&mut self, door: MultiPlateDoor) -> Result<()> {
        if let Some(&missing) = door.plates().iter().find(|p| !self.plates.contains_key(p)) {
            return Err(TriggerError::UnknownPlate(missing));
        }
        self.multi_doors.push(door);
        Ok(())
    }

    /// Check whether an entity is a registered plate
    pub fn is_plate(&self, entity: u64) -> bool {
        self.plates.contains_key(&entity)
    }

    /// Get a plate
    pub fn plate(&self, entity: u64) -> Option<&PressurePlate> {
        self.plates.get(&entity)
    }

    /// Single-plate doors
    pub fn plate_doors(&self) -> &[PlateDoor] {
        &self.plate_doors
    }

    /// Multi-plate doors
    pub fn multi_doors(&self) -> &[MultiPlateDoor] {
        &self.multi_doors
    }

    /// Build a trigger event from an unordered sensor pair, if one side is a plate
    pub fn classify(&self, a: u64, b: u64, entered: bool) -> Option<TriggerEvent> {
        let (plate, other) = if self.is_plate(a) {
            (a, b)
        } else if self.is_plate(b) {
            (b, a)
        } else {
            return None;
        };

        Some(if entered {
            TriggerEvent::entered(plate, other)
        } else {
            TriggerEvent::left(plate, other)
        })
    }

    /// Apply an enter or exit to its plate
    pub fn handle_event(&mut self, event: &TriggerEvent) {
        let Some(plate) = self.plates.get_mut(&event.plate) else {
            trace!("Trigger event for unknown plate {}", event.plate);
            return;
        };

        match event.contact {
            PlateContact::Entered => plate.enter(event.occupant),
            PlateContact::Left => {
                plate.exit(event.occupant);
                for door in self
                    .plate_doors
                    .iter_mut()
                    .filter(|d| d.plate() == event.plate)
                {
                    door.on_plate_exit(plate);
                }
            }
        }
    }

    /// Poll doors and plate visuals; returns the positions to write
    pub fn update(&mut self, delta_time: f32) -> Vec<TransformWrite> {
        let mut writes = Vec::new();

        for plate in self.plates.values_mut() {
            if let Some((entity, position)) = plate.take_visual_update() {
                writes.push(TransformWrite { entity, position });
            }
        }

        for door in &mut self.plate_doors {
            if self
                .plates
                .get(&door.plate())
                .is_some_and(PressurePlate::is_occupied)
            {
                door.on_plate_stay();
            }
            if let Some(position) = door.update(delta_time) {
                writes.push(TransformWrite {
                    entity: door.entity(),
                    position,
                });
            }
        }

        let plates = &self.plates;
        for door in &mut self.multi_doors {
            let occupied = |p: u64| plates.get(&p).is_some_and(PressurePlate::is_occupied);
            if let Some(position) = door.update(occupied, delta_time) {
                writes.push(TransformWrite {
                    entity: door.entity(),
                    position,
                });
            }
        }

        writes
    }

    /// Get plate count
    pub fn plate_count(&self) -> usize {
        self.plates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::DoorConfig;
    use crate::plate::PlateConfig;

    const PLATE_A: u64 = 1;
    const PLATE_B: u64 = 2;
    const DOOR: u64 = 10;
    const GATE: u64 = 11;
    const CUBE: u64 = 20;
    const PLAYER: u64 = 21;

    fn system() -> PuzzleSystem {
        let mut system = PuzzleSystem::new();
        system
            .register_plate(PressurePlate::new(PLATE_A, PlateConfig::default()))
            .unwrap();
        system
            .register_plate(
                PressurePlate::new(PLATE_B, PlateConfig::default()).with_visual(3, Vec3::ZERO),
            )
            .unwrap();
        system
            .register_plate_door(
                PlateDoor::new(DOOR, PLATE_A, Vec3::ZERO, DoorConfig::default()).unwrap(),
            )
            .unwrap();
        system
            .register_multi_door(
                MultiPlateDoor::new(
                    GATE,
                    vec![PLATE_A, PLATE_B],
                    Vec3::X * 4.0,
                    DoorConfig::default(),
                )
                .unwrap(),
            )
            .unwrap();
        system
    }

    fn write_for(writes: &[TransformWrite], entity: u64) -> Option<Vec3> {
        writes.iter().find(|w| w.entity == entity).map(|w| w.position)
    }

    #[test]
    fn test_registration_errors() {
        let mut system = system();
        assert_eq!(system.plate_count(), 2);
        assert_eq!(
            system.register_plate(PressurePlate::new(PLATE_A, PlateConfig::default())),
            Err(TriggerError::DuplicatePlate(PLATE_A))
        );
        assert_eq!(
            system.register_plate_door(
                PlateDoor::new(DOOR, 99, Vec3::ZERO, DoorConfig::default()).unwrap()
            ),
            Err(TriggerError::UnknownPlate(99))
        );
    }

    #[test]
    fn test_classify() {
        let system = system();
        assert_eq!(system.classify(CUBE, PLATE_A, true), Some(TriggerEvent::entered(PLATE_A, CUBE)));
        assert_eq!(system.classify(PLATE_B, CUBE, false), Some(TriggerEvent::left(PLATE_B, CUBE)));
        assert_eq!(system.classify(CUBE, PLAYER, true), None);
    }

    #[test]
    fn test_single_plate_door_cycle() {
        let mut system = system();
        system.handle_event(&TriggerEvent::entered(PLATE_A, CUBE));

        let writes = system.update(1.0);
        assert_eq!(write_for(&writes, DOOR), Some(Vec3::new(0.0, 2.0, 0.0)));
        // Plate B is still empty, the gate stays shut
        assert_eq!(write_for(&writes, GATE), None);

        system.handle_event(&TriggerEvent::left(PLATE_A, CUBE));
        let writes = system.update(1.0);
        assert_eq!(write_for(&writes, DOOR), Some(Vec3::ZERO));
        assert!(!system.plate_doors()[0].is_open());
    }

    #[test]
    fn test_multi_door_needs_every_plate() {
        let mut system = system();
        system.handle_event(&TriggerEvent::entered(PLATE_A, CUBE));
        system.handle_event(&TriggerEvent::entered(PLATE_B, PLAYER));

        let writes = system.update(1.0);
        assert_eq!(write_for(&writes, GATE), Some(Vec3::new(4.0, 2.0, 0.0)));
        assert_eq!(write_for(&writes, 3), Some(Vec3::new(0.0, -0.1, 0.0)));

        system.handle_event(&TriggerEvent::left(PLATE_B, PLAYER));
        let writes = system.update(1.0);
        assert_eq!(write_for(&writes, GATE), Some(Vec3::new(4.0, 0.0, 0.0)));
        assert!(!system.multi_doors()[0].is_open());
        assert!(system.plate_doors()[0].is_open());
    }

    #[test]
    fn test_unknown_plate_event_is_ignored() {
        let mut system = system();
        system.handle_event(&TriggerEvent::entered(99, CUBE));
        assert!(system.update(0.1).is_empty());
    }
}
