#![forbid(unsafe_code)]

//! Typed per-element side table.
//!
//! Replaces ad hoc data bags stored on DOM nodes: widgets keep trigger ↔
//! transient back-references here, keyed by element id and value type, so
//! two widgets can attach different data to the same element without
//! clashing. Entries for removed elements are purged by
//! [`Ui::remove_element`](crate::Ui::remove_element).

use std::any::{Any, TypeId};

use ahash::AHashMap;
use trellis_core::dom::ElementId;

/// Side table keyed by `(element, type)`.
#[derive(Default)]
pub struct ElementData {
    entries: AHashMap<(ElementId, TypeId), Box<dyn Any>>,
}

impl std::fmt::Debug for ElementData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementData")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ElementData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `el`, returning the previous value of that type.
    pub fn insert<T: 'static>(&mut self, el: ElementId, value: T) -> Option<T> {
        self.entries
            .insert((el, TypeId::of::<T>()), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn get<T: 'static>(&self, el: ElementId) -> Option<&T> {
        self.entries
            .get(&(el, TypeId::of::<T>()))
            .and_then(|b| b.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self, el: ElementId) -> Option<&mut T> {
        self.entries
            .get_mut(&(el, TypeId::of::<T>()))
            .and_then(|b| b.downcast_mut::<T>())
    }

    pub fn remove<T: 'static>(&mut self, el: ElementId) -> Option<T> {
        self.entries
            .remove(&(el, TypeId::of::<T>()))
            .and_then(|b| b.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn contains<T: 'static>(&self, el: ElementId) -> bool {
        self.entries.contains_key(&(el, TypeId::of::<T>()))
    }

    /// Drop every entry for the given elements.
    pub fn purge(&mut self, removed: &[ElementId]) {
        if removed.is_empty() {
            return;
        }
        self.entries.retain(|(el, _), _| !removed.contains(el));
    }

    /// Elements holding a value of type `T`.
    pub fn elements_with<T: 'static>(&self) -> Vec<ElementId> {
        let ty = TypeId::of::<T>();
        let mut out: Vec<ElementId> = self
            .entries
            .keys()
            .filter(|(_, t)| *t == ty)
            .map(|(el, _)| *el)
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::dom::Document;

    #[derive(Debug, PartialEq)]
    struct ActiveTip(ElementId);

    #[test]
    fn values_are_keyed_by_type() {
        let mut doc = Document::new();
        let a = doc.create_element("span");
        let b = doc.create_element("div");
        let mut data = ElementData::new();
        data.insert(a, ActiveTip(b));
        data.insert(a, 42u32);
        assert_eq!(data.get::<ActiveTip>(a), Some(&ActiveTip(b)));
        assert_eq!(data.get::<u32>(a), Some(&42));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn insert_returns_previous() {
        let mut doc = Document::new();
        let a = doc.create_element("span");
        let mut data = ElementData::new();
        assert_eq!(data.insert(a, 1u8), None);
        assert_eq!(data.insert(a, 2u8), Some(1));
        if let Some(v) = data.get_mut::<u8>(a) {
            *v += 1;
        }
        assert_eq!(data.remove::<u8>(a), Some(3));
        assert!(!data.contains::<u8>(a));
    }

    #[test]
    fn purge_removes_all_types() {
        let mut doc = Document::new();
        let a = doc.create_element("span");
        let b = doc.create_element("span");
        let mut data = ElementData::new();
        data.insert(a, 1u8);
        data.insert(a, "x");
        data.insert(b, 1u8);
        data.purge(&[a]);
        assert_eq!(data.elements_with::<u8>(), vec![b]);
        assert_eq!(data.len(), 1);
    }
}
