//! Error types for the locomotion bridge

use serde::{Deserialize, Serialize};

/// Errors raised while building or configuring an animation state controller.
///
/// Runtime paths (ticks, event handlers) never fail; every error here surfaces at
/// initialization time.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ControllerError {
    /// No character motor was supplied to the builder
    #[error("Character motor is required but was not provided")]
    MissingMotor,

    /// No animation sink was supplied to the builder
    #[error("Animation sink is required but was not provided")]
    MissingSink,

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Configuration could not be (de)serialized
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl ControllerError {
    /// Create an invalid-configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingMotor | Self::MissingSink => "wiring",
            Self::InvalidConfig { .. } => "validation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for ControllerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
