//! Logical animation parameters and their configurable names.

use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// How the animation system stores a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Float,
    Bool,
    /// One-shot flag consumed by the animation system.
    Trigger,
}

/// Every parameter the controller writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    ForwardSpeed,
    LateralSpeed,
    TurningSpeed,
    Grounded,
    HasInput,
    FallTime,
    Footedness,
    Jumped,
    JumpedLateralSpeed,
    JumpedForwardSpeed,
    PredictedFallDistance,
    RapidTurn,
}

impl Parameter {
    pub const COUNT: usize = 12;

    pub const ALL: [Parameter; Parameter::COUNT] = [
        Parameter::ForwardSpeed,
        Parameter::LateralSpeed,
        Parameter::TurningSpeed,
        Parameter::Grounded,
        Parameter::HasInput,
        Parameter::FallTime,
        Parameter::Footedness,
        Parameter::Jumped,
        Parameter::JumpedLateralSpeed,
        Parameter::JumpedForwardSpeed,
        Parameter::PredictedFallDistance,
        Parameter::RapidTurn,
    ];

    /// Dense index into [`Parameter::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn kind(self) -> ParamKind {
        match self {
            Parameter::Grounded
            | Parameter::HasInput
            | Parameter::Footedness
            | Parameter::Jumped => ParamKind::Bool,
            Parameter::RapidTurn => ParamKind::Trigger,
            _ => ParamKind::Float,
        }
    }

    /// Name used when the configuration does not override it.
    pub fn default_name(self) -> &'static str {
        match self {
            Parameter::ForwardSpeed => "ForwardSpeed",
            Parameter::LateralSpeed => "LateralSpeed",
            Parameter::TurningSpeed => "TurningSpeed",
            Parameter::Grounded => "Grounded",
            Parameter::HasInput => "HasInput",
            Parameter::FallTime => "FallTime",
            Parameter::Footedness => "OnRightFoot",
            Parameter::Jumped => "Jumped",
            Parameter::JumpedLateralSpeed => "JumpedLateralSpeed",
            Parameter::JumpedForwardSpeed => "JumpedForwardSpeed",
            Parameter::PredictedFallDistance => "PredictedFallDistance",
            Parameter::RapidTurn => "RapidTurn",
        }
    }
}

macro_rules! parameter_names {
    ($($field:ident => $param:ident),+ $(,)?) => {
        /// Animator-facing name of each parameter.
        ///
        /// Missing fields fall back to [`Parameter::default_name`] when deserialized.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ParameterNames {
            $(pub $field: String,)+
        }

        impl Default for ParameterNames {
            fn default() -> Self {
                Self {
                    $($field: Parameter::$param.default_name().to_string(),)+
                }
            }
        }

        impl ParameterNames {
            /// Configured name for `param`.
            pub fn name(&self, param: Parameter) -> &str {
                match param {
                    $(Parameter::$param => &self.$field,)+
                }
            }

            /// Reject names the animation system cannot address.
            pub fn validate(&self) -> Result<(), ControllerError> {
                match Parameter::ALL.into_iter().find(|p| self.name(*p).trim().is_empty()) {
                    Some(param) => Err(ControllerError::invalid_config(format!(
                        "parameter {param:?} has an empty name"
                    ))),
                    None => Ok(()),
                }
            }

            /// Override the name for `param`.
            pub fn set(&mut self, param: Parameter, name: impl Into<String>) {
                match param {
                    $(Parameter::$param => self.$field = name.into(),)+
                }
            }
        }
    };
}

parameter_names! {
    forward_speed => ForwardSpeed,
    lateral_speed => LateralSpeed,
    turning_speed => TurningSpeed,
    grounded => Grounded,
    has_input => HasInput,
    fall_time => FallTime,
    footedness => Footedness,
    jumped => Jumped,
    jumped_lateral_speed => JumpedLateralSpeed,
    jumped_forward_speed => JumpedForwardSpeed,
    predicted_fall_distance => PredictedFallDistance,
    rapid_turn => RapidTurn,
}
