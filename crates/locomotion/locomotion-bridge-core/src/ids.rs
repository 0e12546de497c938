//! Identifiers and simple allocators for parameters and subscriptions.

use serde::{Deserialize, Serialize};

/// Opaque key of an interned animation parameter name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParamKey(pub u32);

/// Handle returned by [`EventChannel::subscribe`](crate::events::EventChannel::subscribe).
/// Only meaningful for the channel that issued it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Monotonic allocator for ParamKey and SubscriptionId.
/// Param keys are dense so the registry can index its name table with them.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_param: u32,
    next_subscription: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_param(&mut self) -> ParamKey {
        let id = ParamKey(self.next_param);
        self.next_param = self.next_param.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        id
    }
}
