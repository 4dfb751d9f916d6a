//! Liminal Triggers - Pressure Plates and Doors
//!
//! This crate provides the puzzle layer sharing the scene with the grab
//! mechanic: plates counting the bodies resting on them, and doors moving
//! between two offsets when their plates are pressed.
//!
//! # Features
//!
//! - Signed occupancy counts fed by trigger enter/exit events
//! - Plate visuals sinking per body on the plate
//! - Single-plate doors (open while occupied)
//! - Multi-plate doors (open while every plate is occupied)
//! - Restartable timed interpolation for door moves
//!
//! # Example
//!
//! ```ignore
//! use liminal_triggers::prelude::*;
//!
//! let mut puzzles = PuzzleSystem::new();
//! puzzles.register_plate(PressurePlate::new(plate_id, PlateConfig::default()))?;
//! puzzles.register_plate_door(PlateDoor::new(door_id, plate_id, door_spawn, DoorConfig::default())?)?;
//!
//! // Each frame
//! if let Some(event) = puzzles.classify(a, b, entered) {
//!     puzzles.handle_event(&event);
//! }
//! for write in puzzles.update(dt) {
//!     world.set_entity_position(write.entity, write.position.to_array())?;
//! }
//! ```

pub mod door;
pub mod error;
pub mod events;
pub mod lerp;
pub mod plate;
pub mod system;

pub mod prelude {
    pub use crate::door::{DoorConfig, MultiPlateDoor, PlateDoor};
    pub use crate::error::{Result, TriggerError};
    pub use crate::events::{PlateContact, TriggerEvent};
    pub use crate::lerp::DoorLerp;
    pub use crate::plate::{PlateConfig, PlateVisual, PressurePlate};
    pub use crate::system::{PuzzleSystem, TransformWrite};
}

pub use prelude::*;
