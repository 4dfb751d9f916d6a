//! Plate contact events derived from sensor overlaps

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an occupant arrived on or left a plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlateContact {
    Entered,
    Left,
}

/// One sensor overlap change on a pressure plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Plate entity whose sensor fired
    pub plate: u64,
    /// Entity on the other side of the overlap
    pub occupant: u64,
    pub contact: PlateContact,
}

impl TriggerEvent {
    pub fn entered(plate: u64, occupant: u64) -> Self {
        Self {
            plate,
            occupant,
            contact: PlateContact::Entered,
        }
    }

    pub fn left(plate: u64, occupant: u64) -> Self {
        Self {
            plate,
            occupant,
            contact: PlateContact::Left,
        }
    }

    /// True for an arrival on the plate
    pub fn is_entry(&self) -> bool {
        matches!(self.contact, PlateContact::Entered)
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.contact {
            PlateContact::Entered => "stepped onto",
            PlateContact::Left => "left",
        };
        write!(f, "entity {} {} plate {}", self.occupant, verb, self.plate)
    }
}
