//! Foot contact: reduces left/right foot-strike events to a single footedness flag.

use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{ControllerConfig, DEFAULT_FOOTEDNESS_EPSILON};
use crate::events::EventChannel;
use crate::ids::SubscriptionId;

/// Payload of a foot-strike detection. The controller only uses its occurrence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementEvent {
    pub id: String,
    /// World-space point the strike was detected at.
    pub position: [f32; 3],
    pub normalized_speed: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Foot {
    Left,
    Right,
}

/// Anything that reports foot strikes.
pub trait MovementDetector {
    fn detection(&self) -> &EventChannel<MovementEvent>;
}

/// Detector whose strikes are fired by the host (e.g. from collision callbacks).
#[derive(Debug, Default)]
pub struct FootDetector {
    detection: EventChannel<MovementEvent>,
}

impl FootDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self, event: MovementEvent) -> usize {
        self.detection.emit(&event)
    }
}

impl MovementDetector for FootDetector {
    fn detection(&self) -> &EventChannel<MovementEvent> {
        &self.detection
    }
}

/// Inversion flag plus the lateral-speed gate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootednessPolicy {
    pub invert: bool,
    pub epsilon: f32,
}

impl Default for FootednessPolicy {
    fn default() -> Self {
        Self {
            invert: false,
            epsilon: DEFAULT_FOOTEDNESS_EPSILON,
        }
    }
}

impl From<&ControllerConfig> for FootednessPolicy {
    fn from(cfg: &ControllerConfig) -> Self {
        Self {
            invert: cfg.invert_footedness,
            epsilon: cfg.footedness_epsilon,
        }
    }
}

impl FootednessPolicy {
    /// Value a strike of `foot` stands for, before gating.
    #[inline]
    pub fn target(&self, foot: Foot) -> bool {
        match foot {
            Foot::Right => !self.invert,
            Foot::Left => self.invert,
        }
    }

    /// Footedness to write for a strike of `foot` at the given lateral speed.
    /// Suppressed to `false` whenever the character drifts sideways.
    #[inline]
    pub fn resolve(&self, foot: Foot, lateral_speed: f32) -> bool {
        if lateral_speed.abs() < self.epsilon {
            self.target(foot)
        } else {
            false
        }
    }
}

/// Owns the subscriptions on the two foot detectors.
///
/// Both detectors must be present; with only one (or none) the adapter stays disabled and
/// never subscribes.
pub struct FootContactAdapter {
    left: Option<Rc<dyn MovementDetector>>,
    right: Option<Rc<dyn MovementDetector>>,
    subscriptions: Option<(SubscriptionId, SubscriptionId)>,
}

impl FootContactAdapter {
    pub fn new(
        left: Option<Rc<dyn MovementDetector>>,
        right: Option<Rc<dyn MovementDetector>>,
    ) -> Self {
        Self {
            left,
            right,
            subscriptions: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Route strikes from both detectors to `on_strike`. No-op when disabled or already
    /// subscribed. Returns whether the adapter is subscribed afterwards.
    pub fn subscribe<F>(&mut self, on_strike: F) -> bool
    where
        F: Fn(Foot) + Clone + 'static,
    {
        if self.subscriptions.is_some() {
            return true;
        }
        let (Some(left), Some(right)) = (&self.left, &self.right) else {
            debug!(
                "footedness tracking disabled (left detector: {}, right detector: {})",
                self.left.is_some(),
                self.right.is_some()
            );
            return false;
        };

        let on_left = on_strike.clone();
        let left_id = left.detection().subscribe(move |_| on_left(Foot::Left));
        let right_id = right.detection().subscribe(move |_| on_strike(Foot::Right));
        self.subscriptions = Some((left_id, right_id));
        true
    }

    /// Release both subscriptions. Safe to call when never subscribed.
    pub fn unsubscribe(&mut self) {
        let Some((left_id, right_id)) = self.subscriptions.take() else {
            return;
        };
        if let Some(left) = &self.left {
            left.detection().unsubscribe(left_id);
        }
        if let Some(right) = &self.right {
            right.detection().unsubscribe(right_id);
        }
    }
}

impl std::fmt::Debug for FootContactAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FootContactAdapter")
            .field("left", &self.left.is_some())
            .field("right", &self.right.is_some())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}
