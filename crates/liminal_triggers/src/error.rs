//! Error types for puzzle triggers

use thiserror::Error;

/// Trigger setup errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriggerError {
    /// A door references a plate that was never registered
    #[error("Unknown pressure plate {0}")]
    UnknownPlate(u64),

    /// A plate entity is registered twice
    #[error("Pressure plate {0} is already registered")]
    DuplicatePlate(u64),

    /// A multi-plate door without plates
    #[error("Door {0} has no pressure plates")]
    NoPlates(u64),

    /// Invalid door or plate parameter
    #[error("Invalid trigger configuration: {field} = {value}")]
    InvalidConfig {
        field: &'static str,
        value: f32,
    },
}

/// Result type for trigger setup
pub type Result<T> = std::result::Result<T, TriggerError>;
