#![forbid(unsafe_code)]

//! The `Ui` host context.
//!
//! `Ui` bundles everything a widget operation may touch: the document, the
//! logical clock with its timer queue, one-shot animation-completion
//! handlers, the listener registry, the element side table, the overlay
//! guard, and the viewport.
//!
//! # Deferred work
//!
//! Timers and completion handlers are `Box<dyn FnOnce(&mut Ui)>`. They are
//! removed from their registry before being invoked, so a handler may freely
//! schedule new timers, register new completions (even on the same element)
//! or remove elements.
//!
//! # Invariants
//!
//! 1. Completion handlers registered on one element fire in registration
//!    order, once, on the next [`Ui::animation_end`] for that element.
//! 2. Removing an element through [`Ui::remove_element`] discards its pending
//!    handlers, side-table entries and listener bindings (descendants
//!    included); a late completion signal is a no-op.
//! 3. Timers fire in `(deadline, schedule order)`; while a timer runs,
//!    [`Ui::now`] reads its deadline.
//! 4. The clock never moves backwards.

use ahash::AHashMap;
use trellis_core::dom::{Document, ElementId};
use web_time::{Duration, Instant};

use crate::element_data::ElementData;
use crate::listeners::ListenerRegistry;
use crate::overlay::OverlayManager;
use crate::timer::{TimerId, TimerQueue};
use crate::viewport::{Easing, Viewport};

/// Work deferred to a timer or an animation-completion signal.
pub type Deferred = Box<dyn FnOnce(&mut Ui)>;

/// Host context shared by every widget.
pub struct Ui {
    pub doc: Document,
    pub listeners: ListenerRegistry,
    pub data: ElementData,
    pub overlays: OverlayManager,
    pub viewport: Viewport,
    now: Instant,
    timers: TimerQueue<Deferred>,
    pending: AHashMap<ElementId, Vec<Deferred>>,
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui")
            .field("elements", &self.doc.len())
            .field("listeners", &self.listeners.len())
            .field("timers", &self.timers.len())
            .field("pending", &self.pending.len())
            .field("overlay_open", &self.overlays.is_open())
            .finish()
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    /// A context over an empty document.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(doc: Document) -> Self {
        Self {
            doc,
            listeners: ListenerRegistry::new(),
            data: ElementData::new(),
            overlays: OverlayManager::new(),
            viewport: Viewport::new(),
            now: Instant::now(),
            timers: TimerQueue::new(),
            pending: AHashMap::new(),
        }
    }

    /// Current logical time.
    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Run `f` once `delay` has elapsed on the logical clock.
    pub fn schedule(&mut self, delay: Duration, f: impl FnOnce(&mut Ui) + 'static) -> TimerId {
        let id = self.timers.schedule(self.now + delay, Box::new(f));
        tracing::trace!(timer = id.get(), delay_ms = delay.as_millis() as u64, "timer scheduled");
        id
    }

    /// Cancel a timer. Returns `false` if it already fired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains(id)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward by `delta`, firing due timers.
    pub fn advance(&mut self, delta: Duration) -> usize {
        let target = self.now + delta;
        self.tick(target)
    }

    /// Move the clock to `now`, firing every timer due at or before it.
    ///
    /// Timers scheduled by a firing timer run in the same call when they
    /// are already due. Returns the number of timers fired.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some((deadline, f)) = self.timers.pop_due(now) {
            if deadline > self.now {
                self.now = deadline;
            }
            self.viewport.sample(self.now);
            f(self);
            fired += 1;
        }
        if now > self.now {
            self.now = now;
        }
        self.viewport.sample(self.now);
        if fired > 0 {
            tracing::trace!(fired, "timers fired");
        }
        fired
    }

    /// Timed completion: run `f` after `duration`, or right away when the
    /// duration is zero.
    pub fn animate(&mut self, duration: Duration, f: impl FnOnce(&mut Ui) + 'static) -> Option<TimerId> {
        if duration.is_zero() {
            f(self);
            None
        } else {
            Some(self.schedule(duration, f))
        }
    }

    // ------------------------------------------------------------------
    // Animation completion
    // ------------------------------------------------------------------

    /// Register a one-shot handler for the next animation-end on `el`.
    ///
    /// Returns `false` (and drops `f`) when `el` is not in the document.
    pub fn on_animation_end(&mut self, el: ElementId, f: impl FnOnce(&mut Ui) + 'static) -> bool {
        if !self.doc.exists(el) {
            tracing::debug!(element = %el, "completion handler for missing element dropped");
            return false;
        }
        self.pending.entry(el).or_default().push(Box::new(f));
        true
    }

    /// Deliver an animation-end signal for `el`. Returns how many handlers
    /// ran; zero for unknown or removed elements.
    pub fn animation_end(&mut self, el: ElementId) -> usize {
        let Some(handlers) = self.pending.remove(&el) else {
            tracing::trace!(element = %el, "animation end with no pending handler");
            return 0;
        };
        let count = handlers.len();
        for handler in handlers {
            handler(self);
        }
        count
    }

    pub fn has_pending_animation(&self, el: ElementId) -> bool {
        self.pending.get(&el).is_some_and(|h| !h.is_empty())
    }

    /// Elements awaiting a completion signal, in id order.
    pub fn pending_animations(&self) -> Vec<ElementId> {
        let mut els: Vec<ElementId> = self.pending.keys().copied().collect();
        els.sort();
        els
    }

    // ------------------------------------------------------------------
    // Element removal
    // ------------------------------------------------------------------

    /// Remove `el` and its subtree, discarding every piece of runtime state
    /// attached to the removed nodes. Returns the removed ids.
    pub fn remove_element(&mut self, el: ElementId) -> Vec<ElementId> {
        let removed = self.doc.remove(el);
        if removed.is_empty() {
            return removed;
        }
        for id in &removed {
            if self.pending.remove(id).is_some() {
                tracing::trace!(element = %id, "pending completion discarded");
            }
        }
        self.data.purge(&removed);
        self.listeners.purge_elements(&removed);
        removed
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Scroll the viewport to `top` over `duration`.
    pub fn scroll_to(&mut self, top: i32, duration: Duration, easing: Easing) {
        let now = self.now;
        self.viewport.start_scroll(now, top, duration, easing);
    }
}
