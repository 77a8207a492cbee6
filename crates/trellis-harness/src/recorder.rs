#![forbid(unsafe_code)]

//! Record everything published on a hook channel.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_runtime::{Hooks, Subscription};
use trellis_widgets::lifecycle::{Lifecycle, LifecycleEvent, Operation, Phase};

/// Captures events from one or more channels until dropped.
pub struct Recorder<E> {
    log: Rc<RefCell<Vec<E>>>,
    subscriptions: Vec<Subscription>,
}

impl<E> std::fmt::Debug for Recorder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("events", &self.log.borrow().len())
            .field("channels", &self.subscriptions.len())
            .finish()
    }
}

impl<E> Default for Recorder<E> {
    fn default() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            subscriptions: Vec::new(),
        }
    }
}

impl<E: Clone + 'static> Recorder<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(hooks: &Hooks<E>) -> Self {
        let mut r = Self::new();
        r.attach(hooks);
        r
    }

    pub fn attach(&mut self, hooks: &Hooks<E>) {
        let log = Rc::clone(&self.log);
        self.subscriptions
            .push(hooks.subscribe(move |ev: &E| log.borrow_mut().push(ev.clone())));
    }

    pub fn events(&self) -> Vec<E> {
        self.log.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Return and forget everything recorded so far.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

impl Recorder<LifecycleEvent> {
    pub fn lifecycle(lifecycle: &Lifecycle) -> Self {
        Self::on(lifecycle.hooks())
    }

    /// `(operation, phase)` pairs in publication order.
    pub fn ops(&self) -> Vec<(Operation, Phase)> {
        self.log
            .borrow()
            .iter()
            .map(|e| (e.operation, e.phase))
            .collect()
    }

    pub fn count(&self, operation: Operation, phase: Phase) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|e| e.operation == operation && e.phase == phase)
            .count()
    }
}
