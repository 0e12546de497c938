//! Input contract from the character motor.
//!
//! The motor owns the locomotion simulation. The controller reads its normalized readings
//! every tick and subscribes to its four discrete event channels.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::events::EventChannel;

/// Continuous motor readings sampled once per tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorState {
    pub forward_speed: f32,
    pub lateral_speed: f32,
    pub turning_speed: f32,
    /// Seconds spent airborne in the current fall.
    pub fall_time: f32,
}

/// Discrete events emitted by a motor.
#[derive(Debug, Default)]
pub struct MotorEvents {
    pub jump_started: EventChannel<()>,
    pub landed: EventChannel<()>,
    /// Payload: predicted fall distance.
    pub fall_started: EventChannel<f32>,
    /// Payload: normalized turn amount.
    pub rapidly_turned: EventChannel<f32>,
}

impl MotorEvents {
    /// Total subscriptions across the four channels.
    pub fn subscriber_count(&self) -> usize {
        self.jump_started.subscriber_count()
            + self.landed.subscriber_count()
            + self.fall_started.subscriber_count()
            + self.rapidly_turned.subscriber_count()
    }
}

/// A character motor as seen by the animation state controller.
///
/// Readings take `&self`; a motor emitting an event must not hold an exclusive borrow of
/// itself, because handlers read the motor back during delivery.
pub trait CharacterMotor {
    fn normalized_forward_speed(&self) -> f32;
    fn normalized_lateral_speed(&self) -> f32;
    fn normalized_turning_speed(&self) -> f32;
    fn fall_time(&self) -> f32;
    fn events(&self) -> &MotorEvents;

    fn state(&self) -> MotorState {
        MotorState {
            forward_speed: self.normalized_forward_speed(),
            lateral_speed: self.normalized_lateral_speed(),
            turning_speed: self.normalized_turning_speed(),
            fall_time: self.fall_time(),
        }
    }
}

/// Host-driven motor: the host pushes readings in and fires events through it.
#[derive(Debug, Default)]
pub struct BasicMotor {
    state: Cell<MotorState>,
    events: MotorEvents,
}

impl BasicMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&self, state: MotorState) {
        self.state.set(state);
    }

    pub fn set_speeds(&self, forward: f32, lateral: f32) {
        self.update(|s| {
            s.forward_speed = forward;
            s.lateral_speed = lateral;
        });
    }

    pub fn set_turning_speed(&self, turning: f32) {
        self.update(|s| s.turning_speed = turning);
    }

    pub fn set_fall_time(&self, fall_time: f32) {
        self.update(|s| s.fall_time = fall_time);
    }

    pub fn start_jump(&self) -> usize {
        self.events.jump_started.emit(&())
    }

    pub fn land(&self) -> usize {
        self.events.landed.emit(&())
    }

    pub fn start_fall(&self, predicted_distance: f32) -> usize {
        self.events.fall_started.emit(&predicted_distance)
    }

    pub fn rapid_turn(&self, normalized_turn: f32) -> usize {
        self.events.rapidly_turned.emit(&normalized_turn)
    }

    fn update(&self, f: impl FnOnce(&mut MotorState)) {
        let mut s = self.state.get();
        f(&mut s);
        self.state.set(s);
    }
}

impl CharacterMotor for BasicMotor {
    fn normalized_forward_speed(&self) -> f32 {
        self.state.get().forward_speed
    }

    fn normalized_lateral_speed(&self) -> f32 {
        self.state.get().lateral_speed
    }

    fn normalized_turning_speed(&self) -> f32 {
        self.state.get().turning_speed
    }

    fn fall_time(&self) -> f32 {
        self.state.get().fall_time
    }

    fn events(&self) -> &MotorEvents {
        &self.events
    }

    fn state(&self) -> MotorState {
        self.state.get()
    }
}
