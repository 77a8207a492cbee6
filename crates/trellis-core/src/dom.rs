#![forbid(unsafe_code)]

//! In-memory element tree.
//!
//! [`Document`] is the headless stand-in for the browser DOM. It stores tags,
//! attributes, class lists, parent/child links, per-element layout boxes and
//! the focused element. Widgets read and mutate it; the host mirrors it to a
//! real surface (or a test asserts on it).
//!
//! # Invariants
//!
//! 1. Element ids are never reused: a removed element's id stays dangling
//!    forever, so stale ids held by timers or side tables fail lookups instead
//!    of aliasing a new node.
//! 2. A class appears at most once in an element's class list; insertion order
//!    is preserved.
//! 3. The tree is acyclic: `append_child` refuses to move an element under one
//!    of its own descendants.
//! 4. `focused()` is always a connected element or `None`.
//!
//! # Failure Modes
//!
//! Every accessor on a missing element is a no-op: queries return `None` /
//! `false` / empty, mutations return `false`. Nothing panics.

use std::fmt;

use ahash::AHashMap;

use crate::geometry::Rect;
use crate::selector::Selector;

/// Identity of an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(u64);

impl ElementId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: String,
    rect: Rect,
}

/// The element tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: AHashMap<ElementId, Node>,
    next_id: u64,
    root: ElementId,
    body: ElementId,
    focused: Option<ElementId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an `html` root and an empty `body`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: AHashMap::new(),
            next_id: 1,
            root: ElementId(0),
            body: ElementId(0),
            focused: None,
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.body);
        doc
    }

    /// The document element (`html`).
    #[inline]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The `body` element.
    #[inline]
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Number of live elements (connected or detached).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Construction ---

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                tag: tag.to_ascii_lowercase(),
                ..Node::default()
            },
        );
        id
    }

    /// Start building a detached element.
    pub fn build(&mut self, tag: &str) -> ElementBuilder<'_> {
        let id = self.create_element(tag);
        ElementBuilder { doc: self, id }
    }

    /// Whether the element exists (connected or detached).
    #[inline]
    pub fn exists(&self, el: ElementId) -> bool {
        self.nodes.contains_key(&el)
    }

    /// Whether the element is attached under the document root.
    pub fn is_connected(&self, el: ElementId) -> bool {
        let mut cur = Some(el);
        while let Some(id) = cur {
            if id == self.root {
                return true;
            }
            cur = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    // --- Tree structure ---

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(&el).and_then(|n| n.parent)
    }

    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.nodes
            .get(&el)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, el: ElementId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(el),
        }
    }

    /// `el` followed by its ancestors.
    pub fn path(&self, el: ElementId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.exists(el).then_some(el),
        }
    }

    /// Whether `ancestor` is `el` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, el: ElementId) -> bool {
        self.path(el).any(|id| id == ancestor)
    }

    /// Descendants in document (pre-)order, excluding `el` itself.
    pub fn descendants(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(el).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// Returns `false` if either element is missing or the move would
    /// create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.insert_at(parent, child, None)
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        let first = self.children(parent).first().copied();
        match first {
            Some(reference) if reference != child => self.insert_before(parent, child, reference),
            Some(_) => true,
            None => self.append_child(parent, child),
        }
    }

    /// Insert `child` before `reference` under `parent`.
    ///
    /// Falls back to appending when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: ElementId) -> bool {
        self.insert_at(parent, child, Some(reference))
    }

    fn insert_at(&mut self, parent: ElementId, child: ElementId, before: Option<ElementId>) -> bool {
        if !self.exists(parent) || !self.exists(child) || self.is_inclusive_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        let Some(node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        let index = before
            .and_then(|r| node.children.iter().position(|&c| c == r))
            .unwrap_or(node.children.len());
        node.children.insert(index, child);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Detach `el` from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, el: ElementId) -> bool {
        let Some(parent) = self.parent(el) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != el);
        }
        if let Some(n) = self.nodes.get_mut(&el) {
            n.parent = None;
        }
        if self.focused.is_some_and(|f| !self.is_connected(f)) {
            self.focused = None;
        }
        true
    }

    /// Remove `el` and its subtree from the document.
    ///
    /// Returns every removed id (`el` first, then descendants in document
    /// order) so callers can purge side tables. The root and body cannot be
    /// removed.
    pub fn remove(&mut self, el: ElementId) -> Vec<ElementId> {
        if el == self.root || el == self.body || !self.exists(el) {
            return Vec::new();
        }
        self.detach(el);
        let mut removed = vec![el];
        removed.extend(self.descendants(el));
        for id in &removed {
            self.nodes.remove(id);
        }
        if self.focused.is_some_and(|f| removed.contains(&f)) {
            self.focused = None;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(element = el.get(), count = removed.len(), "removed subtree");
        removed
    }

    /// Deep-copy the children of `source` and append them to `target`.
    pub fn clone_children_into(&mut self, source: ElementId, target: ElementId) {
        let children: Vec<ElementId> = self.children(source).to_vec();
        for child in children {
            if let Some(copy) = self.clone_subtree(child) {
                self.append_child(target, copy);
            }
        }
    }

    /// Deep-copy `el` into a detached subtree.
    pub fn clone_subtree(&mut self, el: ElementId) -> Option<ElementId> {
        let node = self.nodes.get(&el)?.clone();
        let copy = self.create_element(&node.tag);
        if let Some(n) = self.nodes.get_mut(&copy) {
            n.classes = node.classes;
            n.attrs = node.attrs;
            n.text = node.text;
            n.rect = node.rect;
        }
        for child in node.children {
            if let Some(c) = self.clone_subtree(child) {
                self.append_child(copy, c);
            }
        }
        Some(copy)
    }

    // --- Element data ---

    pub fn tag(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(&el).map(|n| n.tag.as_str())
    }

    /// Own text of the element (not including descendants).
    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(&el).map(|n| n.text.as_str())
    }

    pub fn set_text(&mut self, el: ElementId, text: impl Into<String>) -> bool {
        match self.nodes.get_mut(&el) {
            Some(n) => {
                n.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Concatenated text of the element and its descendants.
    pub fn text_content(&self, el: ElementId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(el) {
            out.push_str(t);
        }
        for d in self.descendants(el) {
            if let Some(t) = self.text(d) {
                out.push_str(t);
            }
        }
        out
    }

    pub fn rect(&self, el: ElementId) -> Option<Rect> {
        self.nodes.get(&el).map(|n| n.rect)
    }

    pub fn set_rect(&mut self, el: ElementId, rect: Rect) -> bool {
        match self.nodes.get_mut(&el) {
            Some(n) => {
                n.rect = rect;
                true
            }
            None => false,
        }
    }

    // --- Classes ---

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.nodes
            .get(&el)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Add a class; returns `true` if the class list changed.
    pub fn add_class(&mut self, el: ElementId, class: &str) -> bool {
        let Some(n) = self.nodes.get_mut(&el) else {
            return false;
        };
        if class.is_empty() || n.classes.iter().any(|c| c == class) {
            return false;
        }
        n.classes.push(class.to_owned());
        true
    }

    /// Add every whitespace-separated class in `classes`.
    pub fn add_classes(&mut self, el: ElementId, classes: &str) {
        for class in classes.split_whitespace() {
            self.add_class(el, class);
        }
    }

    /// Remove a class; returns `true` if the class list changed.
    pub fn remove_class(&mut self, el: ElementId, class: &str) -> bool {
        let Some(n) = self.nodes.get_mut(&el) else {
            return false;
        };
        let before = n.classes.len();
        n.classes.retain(|c| c != class);
        n.classes.len() != before
    }

    /// Remove every whitespace-separated class in `classes`.
    pub fn remove_classes(&mut self, el: ElementId, classes: &str) {
        for class in classes.split_whitespace() {
            self.remove_class(el, class);
        }
    }

    /// Toggle a class, or force it on/off. Returns the resulting membership.
    pub fn toggle_class(&mut self, el: ElementId, class: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or(!self.has_class(el, class));
        if on {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
        self.has_class(el, class)
    }

    pub fn classes(&self, el: ElementId) -> &[String] {
        self.nodes
            .get(&el)
            .map(|n| n.classes.as_slice())
            .unwrap_or(&[])
    }

    /// Space-joined class list (the `class` attribute value).
    pub fn class_name(&self, el: ElementId) -> String {
        self.classes(el).join(" ")
    }

    // --- Attributes ---

    pub fn attr(&self, el: ElementId, name: &str) -> Option<&str> {
        let n = self.nodes.get(&el)?;
        if name == "class" {
            return None;
        }
        n.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, el: ElementId, name: &str) -> bool {
        if name == "class" {
            return !self.classes(el).is_empty();
        }
        self.attr(el, name).is_some()
    }

    /// Set an attribute. Setting `class` replaces the class list.
    pub fn set_attr(&mut self, el: ElementId, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(n) = self.nodes.get_mut(&el) else {
            return false;
        };
        let name = name.to_ascii_lowercase();
        if name == "class" {
            n.classes.clear();
            for c in value.split_whitespace() {
                if !n.classes.iter().any(|x| x == c) {
                    n.classes.push(c.to_owned());
                }
            }
            return true;
        }
        match n.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => n.attrs.push((name, value)),
        }
        true
    }

    pub fn remove_attr(&mut self, el: ElementId, name: &str) -> bool {
        let Some(n) = self.nodes.get_mut(&el) else {
            return false;
        };
        let before = n.attrs.len();
        n.attrs.retain(|(k, _)| k != name);
        n.attrs.len() != before
    }

    /// All attributes in insertion order (excluding `class`).
    pub fn attrs(&self, el: ElementId) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .get(&el)
            .into_iter()
            .flat_map(|n| n.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// `data-*` attributes as `(camelCaseKey, value)` pairs.
    ///
    /// `data-delay-in="200"` yields `("delayIn", "200")`.
    pub fn dataset(&self, el: ElementId) -> Vec<(String, String)> {
        self.attrs(el)
            .filter_map(|(k, v)| {
                k.strip_prefix("data-")
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (kebab_to_camel(rest), v.to_owned()))
            })
            .collect()
    }

    /// Whether the element carries `disabled`.
    pub fn is_disabled(&self, el: ElementId) -> bool {
        self.has_attr(el, "disabled")
    }

    // --- Queries ---

    /// Element whose `id` attribute equals `id`, in document order.
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&el| self.attr(el, "id") == Some(id))
    }

    /// Descendants of `scope` matching `selector`, in document order.
    pub fn select(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&el| selector.matches(self, el))
            .collect()
    }

    /// First descendant of `scope` matching `selector`.
    pub fn select_first(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        self.descendants(scope)
            .into_iter()
            .find(|&el| selector.matches(self, el))
    }

    /// Direct children of `el` matching `selector`.
    pub fn children_matching(&self, el: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.children(el)
            .iter()
            .copied()
            .filter(|&c| selector.matches(self, c))
            .collect()
    }

    /// Nearest inclusive ancestor of `el` matching `selector`.
    pub fn closest(&self, el: ElementId, selector: &Selector) -> Option<ElementId> {
        self.path(el).find(|&id| selector.matches(self, id))
    }

    /// Resolve a `data-target`-style reference: `#id` looks up by id, any
    /// other selector is matched against the whole document.
    pub fn resolve_target(&self, reference: &str) -> Option<ElementId> {
        let reference = reference.trim();
        if let Some(id) = reference.strip_prefix('#')
            && !id.is_empty()
            && !id.contains([' ', '.', '[', '#', ','])
        {
            return self.find_by_id(id);
        }
        let selector = Selector::parse(reference).ok()?;
        self.select_first(self.root, &selector)
    }

    // --- Focus ---

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Focus a connected element. Returns `false` for missing or detached
    /// elements.
    pub fn focus(&mut self, el: ElementId) -> bool {
        if !self.is_connected(el) {
            return false;
        }
        self.focused = Some(el);
        true
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Whether `el` takes part in sequential (Tab) focus navigation.
    ///
    /// Focusable: `button`, `input`, `select`, `textarea`, `a[href]`, or any
    /// element with `tabindex >= 0`; never when `disabled`.
    pub fn is_focusable(&self, el: ElementId) -> bool {
        let Some(tag) = self.tag(el) else {
            return false;
        };
        if self.is_disabled(el) {
            return false;
        }
        let natively = match tag {
            "button" | "input" | "select" | "textarea" => true,
            "a" => self.has_attr(el, "href"),
            _ => false,
        };
        natively
            || self
                .attr(el, "tabindex")
                .and_then(|v| v.trim().parse::<i32>().ok())
                .is_some_and(|t| t >= 0)
    }

    /// Focusable descendants of `container` in document order.
    pub fn focusable_within(&self, container: ElementId) -> Vec<ElementId> {
        self.descendants(container)
            .into_iter()
            .filter(|&el| self.is_focusable(el))
            .collect()
    }

    /// Default sequential focus navigation over the whole document.
    ///
    /// Moves to the next (or previous) focusable element after the current
    /// one, wrapping at the ends. Returns the newly focused element.
    pub fn move_focus(&mut self, forward: bool) -> Option<ElementId> {
        let order = self.focusable_within(self.root);
        if order.is_empty() {
            return None;
        }
        let current = self.focused.and_then(|f| order.iter().position(|&e| e == f));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => order.len() - 1,
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
        };
        let target = order[next];
        self.focused = Some(target);
        Some(target)
    }
}

/// Iterator over an element and/or its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let cur = self.next?;
        self.next = self.doc.parent(cur);
        Some(cur)
    }
}

/// Fluent builder returned by [`Document::build`].
pub struct ElementBuilder<'a> {
    doc: &'a mut Document,
    id: ElementId,
}

impl ElementBuilder<'_> {
    /// Add whitespace-separated classes.
    pub fn class(self, classes: &str) -> Self {
        self.doc.add_classes(self.id, classes);
        self
    }

    pub fn attr(self, name: &str, value: impl Into<String>) -> Self {
        self.doc.set_attr(self.id, name, value);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.doc.set_text(self.id, text);
        self
    }

    pub fn rect(self, rect: Rect) -> Self {
        self.doc.set_rect(self.id, rect);
        self
    }

    /// Append to `parent` and return the id.
    pub fn append_to(self, parent: ElementId) -> ElementId {
        self.doc.append_child(parent, self.id);
        self.id
    }

    /// Append to the document body and return the id.
    pub fn append_to_body(self) -> ElementId {
        let body = self.doc.body();
        self.append_to(body)
    }

    /// Finish without attaching.
    pub fn finish(self) -> ElementId {
        self.id
    }
}

fn kebab_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
