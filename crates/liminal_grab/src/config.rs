//! Grab configuration

use crate::error::{check_finite, check_non_negative, check_positive, GrabError, Result};
use crate::scene::{ColliderId, LayerMask};
use serde::{Deserialize, Serialize};

/// How a held object is placed each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HoldPlacement {
    /// Rigidly follow the camera at `hold_distance`
    FixedOffset,
    /// Sit just in front of the scenery under the crosshair
    SurfaceRaycast {
        /// Base pullback from the hit surface, scaled by the object size
        offset_factor: f32,
        /// Extra pullback added to `offset_factor`
        additional_offset: f32,
        /// Distance moved back per overlap test while clipping
        backoff_step: f32,
    },
}

impl HoldPlacement {
    /// Surface placement with the default padding
    pub fn surface(offset_factor: f32) -> Self {
        Self::SurfaceRaycast {
            offset_factor,
            additional_offset: 0.2,
            backoff_step: 0.02,
        }
    }
}

impl Default for HoldPlacement {
    fn default() -> Self {
        Self::FixedOffset
    }
}

/// Authoring-time parameters of a grab session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    /// Layers that can be grabbed; empty disables acquisition
    pub grabbable_mask: LayerMask,

    /// Layers that stop a released object
    pub obstruction_mask: LayerMask,

    /// Camera distance kept while holding
    pub hold_distance: f32,

    /// Degrees of rotation per unit of mouse delta
    pub rotation_sensitivity: f32,

    /// Distance added per release search step
    pub release_step_size: f32,

    /// Extra distance pulled back from the first obstruction
    pub collision_pullback: f32,

    /// Upper bound on release search iterations
    pub max_release_steps: u32,

    /// Player body collider; contacts with the held object are ignored while holding
    pub player_collider: Option<ColliderId>,

    /// Hold placement strategy
    pub placement: HoldPlacement,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            grabbable_mask: LayerMask::NONE,
            obstruction_mask: LayerMask::ALL,
            hold_distance: 0.2,
            rotation_sensitivity: 0.5,
            release_step_size: 0.05,
            collision_pullback: 0.1,
            max_release_steps: 1000,
            player_collider: None,
            placement: HoldPlacement::FixedOffset,
        }
    }
}

impl GrabConfig {
    /// Set the grabbable layers
    pub fn with_grabbable_mask(mut self, mask: LayerMask) -> Self {
        self.grabbable_mask = mask;
        self
    }

    /// Set the obstruction layers
    pub fn with_obstruction_mask(mut self, mask: LayerMask) -> Self {
        self.obstruction_mask = mask;
        self
    }

    /// Set hold distance
    pub fn with_hold_distance(mut self, distance: f32) -> Self {
        self.hold_distance = distance;
        self
    }

    /// Set rotation sensitivity
    pub fn with_rotation_sensitivity(mut self, sensitivity: f32) -> Self {
        self.rotation_sensitivity = sensitivity;
        self
    }

    /// Set release step size and pullback margin
    pub fn with_release_steps(mut self, step_size: f32, pullback: f32) -> Self {
        self.release_step_size = step_size;
        self.collision_pullback = pullback;
        self
    }

    /// Set the release iteration bound
    pub fn with_max_release_steps(mut self, max_steps: u32) -> Self {
        self.max_release_steps = max_steps;
        self
    }

    /// Set the player collider
    pub fn with_player_collider(mut self, collider: ColliderId) -> Self {
        self.player_collider = Some(collider);
        self
    }

    /// Set hold placement
    pub fn with_placement(mut self, placement: HoldPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Check parameters for values the session cannot work with
    pub fn validate(&self) -> Result<()> {
        check_positive("hold_distance", self.hold_distance)?;
        check_finite("rotation_sensitivity", self.rotation_sensitivity)?;
        check_positive("release_step_size", self.release_step_size)?;
        check_non_negative("collision_pullback", self.collision_pullback)?;
        if self.max_release_steps == 0 {
            return Err(GrabError::NoReleaseSteps);
        }
        if let HoldPlacement::SurfaceRaycast {
            offset_factor,
            additional_offset,
            backoff_step,
        } = self.placement
        {
            check_finite("offset_factor", offset_factor)?;
            check_finite("additional_offset", additional_offset)?;
            check_positive("backoff_step", backoff_step)?;
        }
        Ok(())
    }
}
