//! Animation state controller: motor events and readings in, animation parameters out.
//!
//! Methods:
//! - builder/build (inject collaborators, resolve keys), activate/deactivate (subscriptions),
//!   update (per tick), notify_rapid_turn_complete, set_predicted_fall_distance
//!
//! The mutable part (transient state plus the sink handle) lives in a shared core. Event
//! channels only hold weak references to it, so a controller dropped while subscribed is
//! never kept alive by its collaborators, and late callbacks are ignored.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::events::EventChannel;
use crate::feet::{Foot, FootContactAdapter, FootednessPolicy, MovementDetector};
use crate::ids::SubscriptionId;
use crate::motor::CharacterMotor;
use crate::params::Parameter;
use crate::registry::ParameterRegistry;
use crate::sink::AnimationSink;

/// Transient state owned by the controller. Both flags start `false` and persist across
/// activation cycles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub is_grounded: bool,
    pub did_jump: bool,
}

struct ControllerCore {
    motor: Rc<dyn CharacterMotor>,
    sink: Rc<RefCell<dyn AnimationSink>>,
    registry: Rc<ParameterRegistry>,
    footedness: FootednessPolicy,
    state: ControllerState,
}

impl ControllerCore {
    fn update(&mut self) {
        let reading = self.motor.state();
        let reg = &self.registry;
        let mut sink = self.sink.borrow_mut();

        sink.set_float(reg.key(Parameter::ForwardSpeed), reading.forward_speed);
        sink.set_float(reg.key(Parameter::LateralSpeed), reading.lateral_speed);
        sink.set_float(reg.key(Parameter::TurningSpeed), reading.turning_speed);

        let has_input = has_speed(reading.forward_speed) || has_speed(reading.lateral_speed);
        sink.set_bool(reg.key(Parameter::HasInput), has_input);

        // Grounded frames leave FallTime as last written; airborne entry zeroes it.
        if !self.state.is_grounded {
            sink.set_float(reg.key(Parameter::FallTime), reading.fall_time);
        }
    }

    fn on_jump_started(&mut self) {
        self.state.did_jump = true;
        self.state.is_grounded = false;

        let forward = self.motor.normalized_forward_speed();
        let lateral = self.motor.normalized_lateral_speed();
        trace!("jump started: forward={forward} lateral={lateral}");

        let reg = &self.registry;
        let mut sink = self.sink.borrow_mut();
        sink.set_bool(reg.key(Parameter::Jumped), true);
        sink.set_float(reg.key(Parameter::FallTime), 0.0);
        sink.set_bool(reg.key(Parameter::Grounded), false);

        // Ties go to the forward axis.
        if lateral.abs() > forward.abs() {
            sink.set_float(reg.key(Parameter::JumpedForwardSpeed), 0.0);
            sink.set_float(reg.key(Parameter::JumpedLateralSpeed), lateral);
        } else {
            sink.set_float(reg.key(Parameter::JumpedLateralSpeed), 0.0);
            sink.set_float(reg.key(Parameter::JumpedForwardSpeed), forward);
        }
    }

    fn on_landing(&mut self) {
        trace!("landed (did_jump={})", self.state.did_jump);
        self.state.is_grounded = true;
        self.state.did_jump = false;

        let reg = &self.registry;
        let mut sink = self.sink.borrow_mut();
        sink.set_bool(reg.key(Parameter::Grounded), true);
        sink.set_bool(reg.key(Parameter::Jumped), false);
    }

    fn on_fall_started(&mut self, predicted_fall_distance: f32) {
        trace!(
            "fall started: predicted={predicted_fall_distance} did_jump={}",
            self.state.did_jump
        );
        self.state.is_grounded = false;

        let reg = &self.registry;
        let mut sink = self.sink.borrow_mut();
        sink.set_float(reg.key(Parameter::FallTime), 0.0);
        sink.set_bool(reg.key(Parameter::Grounded), false);
        sink.set_bool(reg.key(Parameter::Jumped), self.state.did_jump);
        sink.set_float(
            reg.key(Parameter::PredictedFallDistance),
            predicted_fall_distance,
        );
    }

    /// The turn amount is left to the animation system's own blend selection.
    fn on_rapidly_turned(&mut self, normalized_turn: f32) {
        trace!("rapid turn: {normalized_turn}");
        self.sink
            .borrow_mut()
            .set_trigger(self.registry.key(Parameter::RapidTurn));
    }

    fn on_foot_strike(&mut self, foot: Foot) {
        let lateral = self.motor.normalized_lateral_speed();
        let value = self.footedness.resolve(foot, lateral);
        trace!("{foot:?} foot strike: lateral={lateral} footedness={value}");
        self.sink
            .borrow_mut()
            .set_bool(self.registry.key(Parameter::Footedness), value);
    }

    fn set_predicted_fall_distance(&mut self, distance: f32) {
        self.sink
            .borrow_mut()
            .set_float(self.registry.key(Parameter::PredictedFallDistance), distance);
    }
}

#[inline]
fn has_speed(speed: f32) -> bool {
    speed.abs() > 0.0
}

/// Run `f` against the core if it is still alive and not already mid-update.
fn with_core(core: &Weak<RefCell<ControllerCore>>, f: impl FnOnce(&mut ControllerCore)) {
    let Some(core) = core.upgrade() else {
        return;
    };
    match core.try_borrow_mut() {
        Ok(mut core) => f(&mut core),
        Err(_) => warn!("event delivered while the controller was busy; dropped"),
    };
}

/// Wrap a core method as a channel handler holding only a weak reference to the core.
fn forward_to<T: 'static>(
    core: &Weak<RefCell<ControllerCore>>,
    handler: impl Fn(&mut ControllerCore, &T) + 'static,
) -> impl FnMut(&T) + 'static {
    let core = core.clone();
    move |payload| with_core(&core, |c| handler(c, payload))
}

#[derive(Debug, Clone, Copy)]
struct MotorSubscriptions {
    jump_started: SubscriptionId,
    landed: SubscriptionId,
    fall_started: SubscriptionId,
    rapidly_turned: SubscriptionId,
}

/// Collects the collaborators of an [`AnimationStateController`].
#[derive(Default)]
pub struct ControllerBuilder {
    config: ControllerConfig,
    motor: Option<Rc<dyn CharacterMotor>>,
    sink: Option<Rc<RefCell<dyn AnimationSink>>>,
    left_foot: Option<Rc<dyn MovementDetector>>,
    right_foot: Option<Rc<dyn MovementDetector>>,
}

impl ControllerBuilder {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn motor(mut self, motor: Rc<dyn CharacterMotor>) -> Self {
        self.motor = Some(motor);
        self
    }

    pub fn sink(mut self, sink: Rc<RefCell<dyn AnimationSink>>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn left_foot(mut self, detector: Rc<dyn MovementDetector>) -> Self {
        self.left_foot = Some(detector);
        self
    }

    pub fn right_foot(mut self, detector: Rc<dyn MovementDetector>) -> Self {
        self.right_foot = Some(detector);
        self
    }

    /// Validate the configuration, require motor and sink, and resolve every parameter key.
    /// The returned controller is inactive.
    pub fn build(self) -> Result<AnimationStateController, ControllerError> {
        self.config.validate()?;
        let motor = self.motor.ok_or(ControllerError::MissingMotor)?;
        let sink = self.sink.ok_or(ControllerError::MissingSink)?;
        let registry = Rc::new(ParameterRegistry::resolve(&self.config.parameters)?);

        let core = ControllerCore {
            motor: Rc::clone(&motor),
            sink,
            registry: Rc::clone(&registry),
            footedness: FootednessPolicy::from(&self.config),
            state: ControllerState::default(),
        };

        Ok(AnimationStateController {
            core: Rc::new(RefCell::new(core)),
            registry,
            motor,
            feet: FootContactAdapter::new(self.left_foot, self.right_foot),
            motor_subscriptions: None,
            rapid_turn_complete: EventChannel::new(),
        })
    }
}

/// Drives animation parameters from a character motor.
///
/// Single-threaded: ticks and event deliveries must not overlap, which the `Rc`-based
/// sharing enforces at compile time.
pub struct AnimationStateController {
    core: Rc<RefCell<ControllerCore>>,
    registry: Rc<ParameterRegistry>,
    motor: Rc<dyn CharacterMotor>,
    feet: FootContactAdapter,
    motor_subscriptions: Option<MotorSubscriptions>,
    rapid_turn_complete: EventChannel<()>,
}

impl AnimationStateController {
    pub fn builder(config: ControllerConfig) -> ControllerBuilder {
        ControllerBuilder::new(config)
    }

    /// Subscribe to the motor and, when both are present, the foot detectors.
    /// Calling it on an active controller does nothing.
    pub fn activate(&mut self) {
        if self.motor_subscriptions.is_some() {
            return;
        }

        let weak = Rc::downgrade(&self.core);
        let events = self.motor.events();
        self.motor_subscriptions = Some(MotorSubscriptions {
            jump_started: events
                .jump_started
                .subscribe(forward_to(&weak, |core, _: &()| core.on_jump_started())),
            landed: events
                .landed
                .subscribe(forward_to(&weak, |core, _: &()| core.on_landing())),
            fall_started: events.fall_started.subscribe(forward_to(
                &weak,
                |core, distance: &f32| core.on_fall_started(*distance),
            )),
            rapidly_turned: events.rapidly_turned.subscribe(forward_to(
                &weak,
                |core, turn: &f32| core.on_rapidly_turned(*turn),
            )),
        });

        let feet = self
            .feet
            .subscribe(move |foot| with_core(&weak, |core| core.on_foot_strike(foot)));
        debug!("animation state controller activated (footedness tracking: {feet})");
    }

    /// Release every subscription. Safe on a controller that was never activated.
    pub fn deactivate(&mut self) {
        if let Some(subs) = self.motor_subscriptions.take() {
            let events = self.motor.events();
            events.jump_started.unsubscribe(subs.jump_started);
            events.landed.unsubscribe(subs.landed);
            events.fall_started.unsubscribe(subs.fall_started);
            events.rapidly_turned.unsubscribe(subs.rapidly_turned);
            debug!("animation state controller deactivated");
        }
        self.feet.unsubscribe();
    }

    pub fn is_active(&self) -> bool {
        self.motor_subscriptions.is_some()
    }

    /// Push this tick's continuous values. Call once per frame.
    pub fn update(&mut self) {
        self.core.borrow_mut().update();
    }

    /// Fan out rapid-turn completion to every subscriber of [`Self::rapid_turn_complete`].
    /// Returns the number of subscribers notified.
    pub fn notify_rapid_turn_complete(&self) -> usize {
        self.rapid_turn_complete.emit(&())
    }

    /// Channel fired by [`Self::notify_rapid_turn_complete`].
    pub fn rapid_turn_complete(&self) -> &EventChannel<()> {
        &self.rapid_turn_complete
    }

    /// Overwrite the predicted fall distance, e.g. after a mid-fall re-prediction.
    pub fn set_predicted_fall_distance(&mut self, distance: f32) {
        self.core.borrow_mut().set_predicted_fall_distance(distance);
    }

    pub fn state(&self) -> ControllerState {
        self.core.borrow().state
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn footedness_enabled(&self) -> bool {
        self.feet.is_enabled()
    }
}

impl Drop for AnimationStateController {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for AnimationStateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationStateController")
            .field("active", &self.is_active())
            .field("state", &self.state())
            .field("feet", &self.feet)
            .finish()
    }
}
