//! Publish-subscribe channels used between the motor, the foot detectors and the controller.
//!
//! Channels are single-threaded and take `&self` everywhere, so a collaborator can emit
//! while other code holds shared references to it. Emission works on a snapshot of the
//! subscriber list: handlers may subscribe or unsubscribe during delivery, and the change
//! applies from the next emission.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::warn;

use crate::ids::{IdAllocator, SubscriptionId};

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

pub struct EventChannel<T> {
    handlers: RefCell<Vec<(SubscriptionId, Handler<T>)>>,
    ids: RefCell<IdAllocator>,
}

impl<T: 'static> EventChannel<T> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            ids: RefCell::new(IdAllocator::new()),
        }
    }

    /// Register `handler`; keep the returned id to unsubscribe later.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.ids.borrow_mut().alloc_subscription();
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Remove a subscription. Returns false if `id` is not (or no longer) registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    /// Deliver `payload` to every subscriber in subscription order.
    /// Returns how many handlers ran; emitting on an empty channel is a no-op.
    pub fn emit(&self, payload: &T) -> usize {
        let snapshot: Vec<Handler<T>> = {
            let handlers = self.handlers.borrow();
            if handlers.is_empty() {
                return 0;
            }
            handlers.iter().map(|(_, h)| Rc::clone(h)).collect()
        };

        let mut delivered = 0;
        for handler in snapshot {
            match handler.try_borrow_mut() {
                Ok(mut f) => {
                    (&mut *f)(payload);
                    delivered += 1;
                }
                // A handler that re-emits on its own channel would otherwise recurse into itself.
                Err(_) => warn!("dropping re-entrant event delivery to a running handler"),
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

impl<T: 'static> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.handlers.borrow().len())
            .finish()
    }
}
