//! Player configuration
//!
//! A single JSON document carries every tunable of the player: grab,
//! pushback, look/walk and the physics world. Missing fields take their
//! defaults.
//!
//! ```json
//! {
//!   "grab": { "hold_distance": 0.25, "max_release_steps": 500 },
//!   "look": { "mouse_sensitivity": 1.5 }
//! }
//! ```

use crate::error::{PlayerError, Result};
use liminal_grab::{GrabConfig, PushbackConfig};
use liminal_physics::{CollisionLayer, PhysicsConfig};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "LIMINAL_CONFIG";

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "liminal.json";

/// First-person look and walk parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Degrees of camera rotation per look delta unit
    pub mouse_sensitivity: f32,
    /// Pitch limit in degrees, both up and down
    pub max_look_angle: f32,
    /// Walk speed in units per second
    pub walk_speed: f32,
    /// Speed multiplier while sprinting
    pub sprint_multiplier: f32,
    /// Camera height above the player origin
    pub eye_height: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 2.0,
            max_look_angle: 90.0,
            walk_speed: 5.0,
            sprint_multiplier: 2.0,
            eye_height: 0.6,
        }
    }
}

impl LookConfig {
    /// Set mouse sensitivity
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Set walk speed
    pub fn with_walk_speed(mut self, speed: f32) -> Self {
        self.walk_speed = speed;
        self
    }

    /// Check parameters
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("mouse_sensitivity", self.mouse_sensitivity, self.mouse_sensitivity.is_finite()),
            ("max_look_angle", self.max_look_angle, (0.0..=90.0).contains(&self.max_look_angle)),
            ("walk_speed", self.walk_speed, self.walk_speed >= 0.0 && self.walk_speed.is_finite()),
            (
                "sprint_multiplier",
                self.sprint_multiplier,
                self.sprint_multiplier > 0.0 && self.sprint_multiplier.is_finite(),
            ),
            ("eye_height", self.eye_height, self.eye_height.is_finite()),
        ];

        match checks.into_iter().find(|(_, _, ok)| !ok) {
            Some((field, value, _)) => Err(PlayerError::InvalidLook { field, value }),
            None => Ok(()),
        }
    }
}

/// Every tunable of the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Grab session parameters
    pub grab: GrabConfig,
    /// Pushback reactor parameters
    pub pushback: PushbackConfig,
    /// Look/walk parameters
    pub look: LookConfig,
    /// Physics world parameters
    pub physics: PhysicsConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            grab: GrabConfig::default().with_grabbable_mask(CollisionLayer::GRABBABLE.query_mask()),
            pushback: PushbackConfig::default(),
            look: LookConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load from `LIMINAL_CONFIG`, then `liminal.json`, else defaults
    ///
    /// A file that exists but fails to parse is reported and skipped.
    pub fn discover() -> Self {
        let candidates = std::env::var(CONFIG_ENV)
            .ok()
            .into_iter()
            .chain(std::iter::once(CONFIG_FILE.to_string()));

        for path in candidates {
            if !Path::new(&path).exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    info!("Loaded player config from {}", path);
                    return config;
                }
                Err(e) => warn!("Ignoring config {}: {}", path, e),
            }
        }

        Self::default()
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.grab.validate()?;
        self.pushback.validate()?;
        self.look.validate()?;
        self.physics.validate()?;
        Ok(())
    }
}
