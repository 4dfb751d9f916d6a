//! Error types for the player crate

use liminal_grab::GrabError;
use liminal_physics::PhysicsError;
use liminal_triggers::TriggerError;
use thiserror::Error;

/// Player setup errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`crate::PlayerConfig`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid grab or pushback parameters
    #[error(transparent)]
    Grab(#[from] GrabError),

    /// Physics setup failed
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Plate or door setup failed
    #[error(transparent)]
    Trigger(#[from] TriggerError),

    /// Invalid look/walk parameter
    #[error("Invalid look configuration: {field} = {value}")]
    InvalidLook {
        field: &'static str,
        value: f32,
    },
}

/// Result type for player setup
pub type Result<T> = std::result::Result<T, PlayerError>;
