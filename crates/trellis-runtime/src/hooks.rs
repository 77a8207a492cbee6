#![forbid(unsafe_code)]

//! Observer channels for widget notifications.
//!
//! A [`Hooks<E>`] is a shared list of subscriber callbacks. Widgets publish
//! lifecycle and result events through it; callers opt in by subscribing
//! and opt out by dropping the returned [`Subscription`].
//!
//! # Architecture
//!
//! `Hooks<E>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Clones share the same subscriber list, so a widget can move a clone into
//! a deferred completion handler and still reach the caller's callbacks.
//! Subscriptions hold a `Weak` back-reference and never keep the channel
//! alive.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next emit.
//! 3. `emit` snapshots the subscriber list first, so callbacks may subscribe,
//!    unsubscribe, or emit again without a `RefCell` borrow conflict.
//!    Callbacks added during an emit see the next emit, not the current one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<dyn Fn(&E)>;

struct HooksInner<E> {
    next_id: u64,
    subscribers: Vec<(u64, Callback<E>)>,
}

/// A shared observer list.
pub struct Hooks<E> {
    inner: Rc<RefCell<HooksInner<E>>>,
}

impl<E> Clone for Hooks<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Hooks<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HooksInner {
                next_id: 1,
                subscribers: Vec::new(),
            })),
        }
    }
}

impl<E> fmt::Debug for Hooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("subscribers", &self.inner.borrow().subscribers.len())
            .finish()
    }
}

impl<E: 'static> Hooks<E> {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. The callback stays registered until the returned
    /// guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<HooksInner<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    /// Deliver `event` to every subscriber. Returns how many were called.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Callback<E>> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for cb in &snapshot {
            cb(event);
        }
        snapshot.len()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// RAII guard that unsubscribes on drop.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the callback registered for the lifetime of the channel.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    /// Unsubscribe now (same as dropping).
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
