#![forbid(unsafe_code)]

//! Listener bookkeeping and event routing.
//!
//! Widgets do not store closures on elements. Instead, `initialize` records
//! `(owner, element, kind)` bindings here and `destroy` drops them; when an
//! event arrives, [`ListenerRegistry::route`] answers "which of my bound
//! elements does this event hit?" by walking the propagation path.
//!
//! Bindings are not deduplicated. Binding the same `(owner, element, kind)`
//! twice records two listeners, exactly like attaching two handlers in a
//! browser; lifecycles must unbind before re-binding.

use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};

/// Global counter for unique owner ids.
static OWNER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a listener owner (one per widget instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        Self(OWNER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    owner: OwnerId,
    element: ElementId,
    kind: EventKind,
}

/// All listener bindings of a [`Ui`](crate::Ui).
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    bindings: Vec<Binding>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a listener.
    pub fn bind(&mut self, owner: OwnerId, element: ElementId, kind: EventKind) {
        self.bindings.push(Binding {
            owner,
            element,
            kind,
        });
    }

    /// Remove every listener of `owner` on `element` for `kind`.
    pub fn unbind(&mut self, owner: OwnerId, element: ElementId, kind: EventKind) -> usize {
        let before = self.bindings.len();
        self.bindings
            .retain(|b| !(b.owner == owner && b.element == element && b.kind == kind));
        before - self.bindings.len()
    }

    /// Remove every listener of `owner` on `element`.
    pub fn unbind_element(&mut self, owner: OwnerId, element: ElementId) -> usize {
        let before = self.bindings.len();
        self.bindings
            .retain(|b| !(b.owner == owner && b.element == element));
        before - self.bindings.len()
    }

    /// Remove every listener of `owner`. Returns how many were removed.
    pub fn unbind_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.owner != owner);
        before - self.bindings.len()
    }

    /// Drop bindings on elements that no longer exist.
    pub fn purge_elements(&mut self, removed: &[ElementId]) {
        if removed.is_empty() {
            return;
        }
        self.bindings.retain(|b| !removed.contains(&b.element));
    }

    /// Number of listeners held by `owner`.
    pub fn count(&self, owner: OwnerId) -> usize {
        self.bindings.iter().filter(|b| b.owner == owner).count()
    }

    /// Total number of listeners.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Whether `owner` listens for `kind` on `element`.
    pub fn is_bound(&self, owner: OwnerId, element: ElementId, kind: EventKind) -> bool {
        self.bindings
            .iter()
            .any(|b| b.owner == owner && b.element == element && b.kind == kind)
    }

    /// The nearest element on the event's propagation path that `owner`
    /// listens on, or `None` if the event does not concern `owner`.
    pub fn route(&self, owner: OwnerId, doc: &Document, event: &Event) -> Option<ElementId> {
        let kind = event.kind();
        let target = event.target();
        if kind.bubbles() {
            doc.path(target).find(|&el| self.is_bound(owner, el, kind))
        } else {
            self.is_bound(owner, target, kind).then_some(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_walks_ancestors_for_bubbling_events() {
        let mut doc = Document::new();
        let item = doc.build("div").append_to_body();
        let icon = doc.build("i").append_to(item);
        let owner = OwnerId::next();
        let mut reg = ListenerRegistry::new();
        reg.bind(owner, item, EventKind::Click);
        assert_eq!(reg.route(owner, &doc, &Event::click(icon)), Some(item));
        assert_eq!(reg.route(OwnerId::next(), &doc, &Event::click(icon)), None);
    }

    #[test]
    fn route_prefers_nearest_binding() {
        let mut doc = Document::new();
        let toggle = doc.build("button").append_to_body();
        let owner = OwnerId::next();
        let mut reg = ListenerRegistry::new();
        reg.bind(owner, doc.root(), EventKind::Click);
        reg.bind(owner, toggle, EventKind::Click);
        assert_eq!(reg.route(owner, &doc, &Event::click(toggle)), Some(toggle));
        assert_eq!(
            reg.route(owner, &doc, &Event::click(doc.body())),
            Some(doc.root())
        );
    }

    #[test]
    fn pointer_enter_only_matches_target() {
        let mut doc = Document::new();
        let trigger = doc.build("span").append_to_body();
        let inner = doc.build("b").append_to(trigger);
        let owner = OwnerId::next();
        let mut reg = ListenerRegistry::new();
        reg.bind(owner, trigger, EventKind::PointerEnter);
        assert_eq!(
            reg.route(owner, &doc, &Event::PointerEnter { target: inner }),
            None
        );
        assert_eq!(
            reg.route(owner, &doc, &Event::PointerEnter { target: trigger }),
            Some(trigger)
        );
    }

    #[test]
    fn duplicate_bindings_accumulate_until_unbound() {
        let mut doc = Document::new();
        let el = doc.build("button").append_to_body();
        let owner = OwnerId::next();
        let mut reg = ListenerRegistry::new();
        reg.bind(owner, el, EventKind::Click);
        reg.bind(owner, el, EventKind::Click);
        assert_eq!(reg.count(owner), 2);
        assert_eq!(reg.unbind_owner(owner), 2);
        assert_eq!(reg.count(owner), 0);
    }

    #[test]
    fn purge_drops_bindings_of_removed_elements() {
        let mut doc = Document::new();
        let el = doc.build("button").append_to_body();
        let owner = OwnerId::next();
        let mut reg = ListenerRegistry::new();
        reg.bind(owner, el, EventKind::Click);
        reg.bind(owner, doc.root(), EventKind::KeyDown);
        let removed = doc.remove(el);
        reg.purge_elements(&removed);
        assert_eq!(reg.count(owner), 1);
    }

    #[test]
    fn owner_ids_are_unique() {
        let a = OwnerId::next();
        let b = OwnerId::next();
        assert_ne!(a, b);
    }
}
