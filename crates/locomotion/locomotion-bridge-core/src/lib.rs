//! Locomotion bridge core (engine-agnostic)
//!
//! Translates character motor state and motor events into animation parameter writes.
//! The host owns the motor, the animation sink and the foot detectors; this crate only
//! subscribes to their event channels and pushes values into the sink.
//!
//! Typical wiring:
//! 1. Build a [`ControllerConfig`] (or use the defaults).
//! 2. Inject the motor, sink and optional foot detectors through [`ControllerBuilder`].
//! 3. Call [`AnimationStateController::activate`] once, then
//!    [`AnimationStateController::update`] every tick.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod feet;
pub mod ids;
pub mod motor;
pub mod params;
pub mod registry;
pub mod sink;

// Re-exports for consumers (hosts)
pub use config::{ControllerConfig, DEFAULT_FOOTEDNESS_EPSILON};
pub use controller::{AnimationStateController, ControllerBuilder, ControllerState};
pub use error::ControllerError;
pub use events::EventChannel;
pub use feet::{
    Foot, FootContactAdapter, FootDetector, FootednessPolicy, MovementDetector, MovementEvent,
};
pub use ids::{ParamKey, SubscriptionId};
pub use motor::{BasicMotor, CharacterMotor, MotorEvents, MotorState};
pub use params::{ParamKind, Parameter, ParameterNames};
pub use registry::ParameterRegistry;
pub use sink::{AnimationSink, ParamValue, ParamWrite, ParameterStore};

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, ControllerError>;
