//! World stepping parameters

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Gravity, fixed step and solver settings of a [`PhysicsWorld`](crate::PhysicsWorld)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],

    /// Seconds per simulation substep
    pub timestep: f32,

    /// Substeps run at most per `step` call; older backlog is dropped
    pub max_substeps: u32,

    pub velocity_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            velocity_iterations: 4,
        }
    }
}

impl PhysicsConfig {
    /// Replace gravity
    pub fn with_gravity(mut self, gravity: [f32; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    /// Replace the substep length
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_substeps must be at least 1".into(),
            ));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(PhysicsConfig::default().validate().is_ok());
        assert!(PhysicsConfig::default().with_timestep(0.0).validate().is_err());
        assert!(PhysicsConfig::default().with_timestep(f32::NAN).validate().is_err());
        assert!(PhysicsConfig::default()
            .with_gravity([0.0, f32::INFINITY, 0.0])
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: PhysicsConfig = serde_json::from_str(r#"{ "timestep": 0.01 }"#).unwrap();
        assert_eq!(config.timestep, 0.01);
        assert_eq!(config.gravity, [0.0, -9.81, 0.0]);
    }
}
