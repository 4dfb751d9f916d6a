//! Pressure plates

use crate::error::{Result, TriggerError};
use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

/// Plate parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    /// Distance the visual sinks per body entering the plate
    pub visual_press_depth: f32,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            visual_press_depth: 0.1,
        }
    }
}

impl PlateConfig {
    /// Check parameters
    pub fn validate(&self) -> Result<()> {
        if !self.visual_press_depth.is_finite() {
            return Err(TriggerError::InvalidConfig {
                field: "visual_press_depth",
                value: self.visual_press_depth,
            });
        }
        Ok(())
    }
}

/// Entity that visually sinks into the floor when the plate is pressed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateVisual {
    pub entity: u64,
    pub rest_position: Vec3,
}

/// Trigger volume counting the bodies resting on it
///
/// The count is signed: exits are applied as they arrive, so an exit for a
/// body that entered before the plate existed drives it negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PressurePlate {
    entity: u64,
    config: PlateConfig,
    occupants: i32,
    visual: Option<PlateVisual>,
    visual_offset: f32,
    visual_dirty: bool,
}

impl PressurePlate {
    /// Create an empty plate for the sensor entity
    pub fn new(entity: u64, config: PlateConfig) -> Self {
        Self {
            entity,
            config,
            occupants: 0,
            visual: None,
            visual_offset: 0.0,
            visual_dirty: false,
        }
    }

    /// Attach a visual entity
    pub fn with_visual(mut self, entity: u64, rest_position: Vec3) -> Self {
        self.visual = Some(PlateVisual {
            entity,
            rest_position,
        });
        self
    }

    /// Sensor entity of the plate
    pub fn entity(&self) -> u64 {
        self.entity
    }

    /// Bodies currently counted on the plate
    pub fn occupants(&self) -> i32 {
        self.occupants
    }

    /// Check whether anything rests on the plate
    pub fn is_occupied(&self) -> bool {
        self.occupants > 0
    }

    /// A body entered the volume
    pub fn enter(&mut self, other: u64) {
        self.occupants += 1;
        self.visual_offset -= self.config.visual_press_depth;
        self.visual_dirty = self.visual.is_some();
        debug!("Entity {} is on pressure plate {}", other, self.entity);
    }

    /// A body left the volume
    pub fn exit(&mut self, other: u64) {
        self.occupants -= 1;
        self.visual_offset += self.config.visual_press_depth;
        self.visual_dirty = self.visual.is_some();
        debug!("Entity {} stepped off pressure plate {}", other, self.entity);
    }

    /// Reset a non-positive count back to zero
    pub fn clamp_empty(&mut self) {
        if self.occupants < 0 {
            self.occupants = 0;
        }
    }

    /// Visual position, if it moved since the last call
    pub fn take_visual_update(&mut self) -> Option<(u64, Vec3)> {
        if !std::mem::take(&mut self.visual_dirty) {
            return None;
        }
        self.visual
            .map(|v| (v.entity, v.rest_position + Vec3::Y * self.visual_offset))
    }
}
