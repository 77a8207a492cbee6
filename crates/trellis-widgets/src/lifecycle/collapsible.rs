#![forbid(unsafe_code)]

//! Collapsed/expanded state machine.
//!
//! ```text
//! collapsed --expand--> expanding --animationend--> expanded
//! expanded --collapse--> collapsing --animationend--> collapsed
//! ```
//!
//! The intermediate states exist only while an animation runs; they are the
//! `is-animating` class. Requests that arrive mid-animation, or that would
//! not change the state, are refused by [`Collapsible::can_expand`] /
//! [`Collapsible::can_collapse`].

use trellis_core::dom::{Document, ElementId};
use trellis_runtime::Ui;

use super::transition::{AnimationSpec, Direction, Settle, Transition, is_animating};

pub const EXPANDED: &str = "is-expanded";
pub const COLLAPSED: &str = "is-collapsed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collapsible {
    pub animation_in: AnimationSpec,
    pub animation_out: AnimationSpec,
}

impl Collapsible {
    pub fn new(enabled: bool, animation_in: &str, animation_out: &str) -> Self {
        Self {
            animation_in: AnimationSpec::from_settings(enabled, animation_in),
            animation_out: AnimationSpec::from_settings(enabled, animation_out),
        }
    }

    pub fn is_expanded(doc: &Document, el: ElementId) -> bool {
        doc.has_class(el, EXPANDED)
    }

    pub fn can_expand(doc: &Document, el: ElementId) -> bool {
        doc.exists(el) && !is_animating(doc, el) && !Self::is_expanded(doc, el)
    }

    pub fn can_collapse(doc: &Document, el: ElementId) -> bool {
        doc.exists(el) && !is_animating(doc, el) && Self::is_expanded(doc, el)
    }

    /// Put `el` into a settled state without animating.
    pub fn set_state(doc: &mut Document, el: ElementId, expanded: bool) {
        if expanded {
            doc.remove_class(el, COLLAPSED);
            doc.add_class(el, EXPANDED);
        } else {
            doc.remove_class(el, EXPANDED);
            doc.add_class(el, COLLAPSED);
        }
    }

    pub fn expand(&self, ui: &mut Ui, el: ElementId, then: impl FnOnce(&mut Ui) + 'static) -> Settle {
        Transition::on(el)
            .add(EXPANDED)
            .remove(COLLAPSED)
            .animate(&self.animation_in, Direction::In)
            .run(ui, then)
    }

    pub fn collapse(
        &self,
        ui: &mut Ui,
        el: ElementId,
        then: impl FnOnce(&mut Ui) + 'static,
    ) -> Settle {
        Transition::on(el)
            .add(COLLAPSED)
            .remove(EXPANDED)
            .animate(&self.animation_out, Direction::Out)
            .run(ui, then)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_redundant_and_mid_animation_requests() {
        let mut ui = Ui::new();
        let el = ui.doc.build("div").append_to_body();
        Collapsible::set_state(&mut ui.doc, el, false);
        assert!(Collapsible::can_expand(&ui.doc, el));
        assert!(!Collapsible::can_collapse(&ui.doc, el));

        let c = Collapsible::new(true, "grow", "shrink");
        assert_eq!(c.expand(&mut ui, el, |_| {}), Settle::Deferred);
        assert!(!Collapsible::can_expand(&ui.doc, el));
        assert!(!Collapsible::can_collapse(&ui.doc, el));

        ui.animation_end(el);
        assert!(Collapsible::is_expanded(&ui.doc, el));
        assert!(Collapsible::can_collapse(&ui.doc, el));
    }

    #[test]
    fn unanimated_collapse_is_immediate() {
        let mut ui = Ui::new();
        let el = ui.doc.build("div").append_to_body();
        Collapsible::set_state(&mut ui.doc, el, true);
        let c = Collapsible::new(false, "grow", "shrink");
        assert_eq!(c.collapse(&mut ui, el, |_| {}), Settle::Immediate);
        assert!(ui.doc.has_class(el, COLLAPSED));
    }
}
