//! Controller configuration.

use serde::{Deserialize, Serialize};

use crate::error::ControllerError;
use crate::params::{Parameter, ParameterNames};

/// Smallest positive subnormal `f32`. With this gate only an exactly-zero lateral speed
/// lets a foot strike through.
pub const DEFAULT_FOOTEDNESS_EPSILON: f32 = 1.401_298_5e-45;

/// Configuration for one animation state controller.
/// Immutable once the controller is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Animator-facing parameter names.
    pub parameters: ParameterNames,
    /// Swap which foot reports `true` for footedness.
    pub invert_footedness: bool,
    /// Lateral speed magnitude below which foot strikes update footedness.
    pub footedness_epsilon: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            parameters: ParameterNames::default(),
            invert_footedness: false,
            footedness_epsilon: DEFAULT_FOOTEDNESS_EPSILON,
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ControllerError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String, ControllerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_invert_footedness(mut self, invert: bool) -> Self {
        self.invert_footedness = invert;
        self
    }

    pub fn with_parameter_name(mut self, param: Parameter, name: impl Into<String>) -> Self {
        self.parameters.set(param, name);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !self.footedness_epsilon.is_finite() || self.footedness_epsilon < 0.0 {
            return Err(ControllerError::invalid_config(
                "footedness epsilon must be finite and non-negative",
            ));
        }

        self.parameters.validate()
    }
}
