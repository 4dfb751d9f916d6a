//! Error types for the grab mechanic

use thiserror::Error;

/// Grab configuration errors
///
/// Per-frame operations never fail; these are only produced while building a
/// session or a pushback reactor from authoring data.
#[derive(Debug, Error, PartialEq)]
pub enum GrabError {
    /// A parameter that must be strictly positive was not
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// A parameter that must be zero or greater was negative
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    /// A parameter was NaN or infinite
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },

    /// The release search would never run
    #[error("max_release_steps must be at least 1")]
    NoReleaseSteps,
}

/// Result type for grab operations
pub type Result<T> = std::result::Result<T, GrabError>;

pub(crate) fn check_positive(field: &'static str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if value <= 0.0 {
        return Err(GrabError::NotPositive { field, value });
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &'static str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(GrabError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn check_finite(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(GrabError::NotFinite { field });
    }
    Ok(())
}
