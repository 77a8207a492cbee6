#![forbid(unsafe_code)]

//! Animation-gated class transitions.
//!
//! A [`Transition`] describes a class-state change on one element: classes
//! to add, classes to remove, and optionally the animation that plays while
//! the change happens. Running it either settles at once or parks a
//! one-shot completion handler on the element until the host reports
//! `animationend`.
//!
//! # Invariants
//!
//! - While deferred, the element carries `is-animating`, exactly one of
//!   `is-animating-in` / `is-animating-out`, and the animation-name class;
//!   `has-animated` is absent.
//! - On settle all of those are removed, the final classes are applied,
//!   `has-animated` is added (animated runs only), then the continuation
//!   runs.
//! - The continuation runs at most once. It never runs for an element that
//!   was removed before settling.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_runtime::Ui;

pub const IS_ANIMATING: &str = "is-animating";
pub const IS_ANIMATING_IN: &str = "is-animating-in";
pub const IS_ANIMATING_OUT: &str = "is-animating-out";
pub const HAS_ANIMATED: &str = "has-animated";

/// Whether `el` is mid-transition.
pub fn is_animating(doc: &Document, el: ElementId) -> bool {
    doc.has_class(el, IS_ANIMATING)
}

/// Animation switch plus the CSS animation name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub enabled: bool,
    pub name: String,
}

impl AnimationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            name: name.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            name: String::new(),
        }
    }

    /// From a widget's `animation` flag and one of its animation names.
    pub fn from_settings(enabled: bool, name: &str) -> Self {
        Self {
            enabled,
            name: name.to_owned(),
        }
    }

    /// Whether running with this spec waits for a completion signal.
    pub fn is_active(&self) -> bool {
        let name = self.name.trim();
        self.enabled && !name.is_empty() && name != "none"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    const fn class(self) -> &'static str {
        match self {
            Self::In => IS_ANIMATING_IN,
            Self::Out => IS_ANIMATING_OUT,
        }
    }
}

/// How a transition run ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Final classes applied and continuation already ran.
    Immediate,
    /// Waiting for the element's animation-end signal.
    Deferred,
    /// Target not in the document; nothing happened.
    Skipped,
}

/// A pending class-state change.
#[derive(Debug, Clone)]
#[must_use = "a transition does nothing until run"]
pub struct Transition {
    target: ElementId,
    add: Vec<String>,
    remove: Vec<String>,
    animation: Option<(AnimationSpec, Direction)>,
}

impl Transition {
    pub fn on(target: ElementId) -> Self {
        Self {
            target,
            add: Vec::new(),
            remove: Vec::new(),
            animation: None,
        }
    }

    /// Classes (whitespace separated) present once settled.
    pub fn add(mut self, classes: &str) -> Self {
        self.add
            .extend(classes.split_whitespace().map(str::to_owned));
        self
    }

    /// Classes (whitespace separated) absent once settled.
    pub fn remove(mut self, classes: &str) -> Self {
        self.remove
            .extend(classes.split_whitespace().map(str::to_owned));
        self
    }

    pub fn animate(mut self, spec: &AnimationSpec, direction: Direction) -> Self {
        self.animation = Some((spec.clone(), direction));
        self
    }

    /// Apply the change now or once the animation ends, then run `then`.
    pub fn run(self, ui: &mut Ui, then: impl FnOnce(&mut Ui) + 'static) -> Settle {
        let Self {
            target,
            add,
            remove,
            animation,
        } = self;
        if !ui.doc.exists(target) {
            tracing::debug!(element = %target, "transition target missing");
            return Settle::Skipped;
        }
        let Some((spec, direction)) = animation.filter(|(spec, _)| spec.is_active()) else {
            apply_final(&mut ui.doc, target, &add, &remove);
            then(ui);
            return Settle::Immediate;
        };

        let name = spec.name.trim().to_owned();
        ui.doc.remove_class(target, HAS_ANIMATED);
        ui.doc.add_class(target, IS_ANIMATING);
        ui.doc.add_class(target, direction.class());
        ui.doc.add_class(target, &name);
        tracing::trace!(element = %target, animation = %name, ?direction, "transition deferred");

        ui.on_animation_end(target, move |ui| {
            ui.doc.remove_class(target, IS_ANIMATING);
            ui.doc.remove_class(target, direction.class());
            ui.doc.remove_class(target, &name);
            apply_final(&mut ui.doc, target, &add, &remove);
            ui.doc.add_class(target, HAS_ANIMATED);
            then(ui);
        });
        Settle::Deferred
    }
}

fn apply_final(doc: &mut Document, el: ElementId, add: &[String], remove: &[String]) {
    for class in remove {
        doc.remove_class(el, class);
    }
    for class in add {
        doc.add_class(el, class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> (Ui, ElementId) {
        let mut ui = Ui::new();
        let el = ui.doc.build("div").class("is-collapsed has-animated").append_to_body();
        (ui, el)
    }

    #[test]
    fn disabled_animation_settles_immediately() {
        let (mut ui, el) = setup();
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        let settle = Transition::on(el)
            .add("is-expanded")
            .remove("is-collapsed")
            .animate(&AnimationSpec::disabled(), Direction::In)
            .run(&mut ui, move |_| d.set(true));
        assert_eq!(settle, Settle::Immediate);
        assert!(done.get());
        assert!(ui.doc.has_class(el, "is-expanded"));
        assert!(!ui.doc.has_class(el, "is-collapsed"));
        assert!(!ui.has_pending_animation(el));
    }

    #[test]
    fn none_name_counts_as_disabled() {
        let (mut ui, el) = setup();
        let settle = Transition::on(el)
            .add("is-active")
            .animate(&AnimationSpec::new("none"), Direction::In)
            .run(&mut ui, |_| {});
        assert_eq!(settle, Settle::Immediate);
    }

    #[test]
    fn animated_run_waits_for_signal() {
        let (mut ui, el) = setup();
        let done = Rc::new(Cell::new(0));
        let d = Rc::clone(&done);
        let settle = Transition::on(el)
            .add("is-expanded")
            .remove("is-collapsed")
            .animate(&AnimationSpec::new("accordion-expand"), Direction::In)
            .run(&mut ui, move |_| d.set(d.get() + 1));
        assert_eq!(settle, Settle::Deferred);
        assert!(is_animating(&ui.doc, el));
        assert!(ui.doc.has_class(el, IS_ANIMATING_IN));
        assert!(ui.doc.has_class(el, "accordion-expand"));
        assert!(!ui.doc.has_class(el, HAS_ANIMATED));
        assert!(ui.doc.has_class(el, "is-collapsed"));
        assert_eq!(done.get(), 0);

        ui.animation_end(el);
        assert_eq!(done.get(), 1);
        assert!(!is_animating(&ui.doc, el));
        assert!(!ui.doc.has_class(el, IS_ANIMATING_IN));
        assert!(!ui.doc.has_class(el, "accordion-expand"));
        assert!(ui.doc.has_class(el, HAS_ANIMATED));
        assert!(ui.doc.has_class(el, "is-expanded"));
        assert!(!ui.doc.has_class(el, "is-collapsed"));

        ui.animation_end(el);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn removed_target_never_settles() {
        let (mut ui, el) = setup();
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        let _ = Transition::on(el)
            .remove("is-active")
            .animate(&AnimationSpec::new("fade-out"), Direction::Out)
            .run(&mut ui, move |_| d.set(true));
        ui.remove_element(el);
        assert_eq!(ui.animation_end(el), 0);
        assert!(!done.get());
    }

    #[test]
    fn missing_target_is_skipped() {
        let (mut ui, el) = setup();
        ui.remove_element(el);
        let settle = Transition::on(el).add("x").run(&mut ui, |_| panic!("must not run"));
        assert_eq!(settle, Settle::Skipped);
    }
}
