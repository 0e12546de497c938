//! Output contract towards the animation system.
//!
//! The controller only ever writes through [`AnimationSink`]. Hosts with a real animator
//! implement the trait over it; [`ParameterStore`] is an in-memory implementation that keeps
//! the latest value per key plus an ordered write log.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::ParamKey;
use crate::registry::ParameterRegistry;

/// Write-only parameter store of the animation system.
/// Multiple writes to one key within a frame are allowed; the last one wins.
pub trait AnimationSink {
    fn set_float(&mut self, key: ParamKey, value: f32);
    fn set_bool(&mut self, key: ParamKey, value: bool);
    /// Arm a one-shot trigger; the animation system resets it when consumed.
    fn set_trigger(&mut self, key: ParamKey);
}

/// A parameter value as seen by the animation system.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
    /// Trigger state: `true` while armed and not yet consumed.
    Trigger(bool),
}

impl ParamValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// One write applied to the sink, in application order.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamWrite {
    pub key: ParamKey,
    pub value: ParamValue,
}

/// In-memory [`AnimationSink`].
#[derive(Debug, Default)]
pub struct ParameterStore {
    values: HashMap<ParamKey, ParamValue>,
    writes: Vec<ParamWrite>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: ParamKey) -> Option<ParamValue> {
        self.values.get(&key).copied()
    }

    pub fn get_float(&self, key: ParamKey) -> Option<f32> {
        self.get(key).and_then(|v| v.as_float())
    }

    pub fn get_bool(&self, key: ParamKey) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Look a value up by its configured name.
    pub fn get_by_name(&self, registry: &ParameterRegistry, name: &str) -> Option<ParamValue> {
        registry.lookup(name).and_then(|key| self.get(key))
    }

    pub fn is_trigger_set(&self, key: ParamKey) -> bool {
        matches!(self.get(key), Some(ParamValue::Trigger(true)))
    }

    /// Consume an armed trigger. Returns whether it was armed.
    pub fn consume_trigger(&mut self, key: ParamKey) -> bool {
        match self.values.get_mut(&key) {
            Some(ParamValue::Trigger(armed)) => std::mem::replace(armed, false),
            _ => false,
        }
    }

    /// Writes recorded since the last drain, oldest first.
    pub fn writes(&self) -> &[ParamWrite] {
        &self.writes
    }

    /// Writes recorded for `key` since the last drain, oldest first.
    pub fn writes_for(&self, key: ParamKey) -> impl Iterator<Item = &ParamValue> + '_ {
        self.writes
            .iter()
            .filter(move |w| w.key == key)
            .map(|w| &w.value)
    }

    /// Take the write log, leaving current values untouched.
    pub fn drain_writes(&mut self) -> Vec<ParamWrite> {
        std::mem::take(&mut self.writes)
    }

    #[inline]
    fn apply(&mut self, key: ParamKey, value: ParamValue) {
        self.values.insert(key, value);
        self.writes.push(ParamWrite { key, value });
    }
}

impl AnimationSink for ParameterStore {
    fn set_float(&mut self, key: ParamKey, value: f32) {
        self.apply(key, ParamValue::Float(value));
    }

    fn set_bool(&mut self, key: ParamKey, value: bool) {
        self.apply(key, ParamValue::Bool(value));
    }

    fn set_trigger(&mut self, key: ParamKey) {
        self.apply(key, ParamValue::Trigger(true));
    }
}
