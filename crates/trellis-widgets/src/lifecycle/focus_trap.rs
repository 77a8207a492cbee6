#![forbid(unsafe_code)]

//! Tab-cycling focus trap for open overlays.
//!
//! # Invariants
//!
//! - Tab / Shift+Tab never move focus outside the container while the trap
//!   is active: the last focusable wraps to the first and vice versa.
//! - A container with no focusable descendants swallows Tab without moving
//!   focus.
//! - [`FocusTrap::release`] restores the element focused before activation,
//!   if it is still connected.

use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{KeyCode, KeyEvent};

/// What the trap did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKey {
    /// Tab handled (focus moved or deliberately kept).
    Consumed,
    /// Escape pressed; the owner decides whether to close.
    Escape,
    /// Not a key the trap cares about.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    container: ElementId,
    previous: Option<ElementId>,
}

impl FocusTrap {
    /// Remember the current focus and move it to the container's first
    /// focusable element.
    pub fn activate(doc: &mut Document, container: ElementId) -> Self {
        let previous = doc.focused();
        if let Some(&first) = doc.focusable_within(container).first() {
            doc.focus(first);
        }
        tracing::trace!(container = %container, "focus trap active");
        Self {
            container,
            previous,
        }
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Element that will regain focus on release.
    pub fn previous(&self) -> Option<ElementId> {
        self.previous
    }

    pub fn handle_key(&self, doc: &mut Document, key: &KeyEvent) -> TrapKey {
        match key.code {
            KeyCode::Tab => {
                self.cycle(doc, !key.shift());
                TrapKey::Consumed
            }
            KeyCode::Escape => TrapKey::Escape,
            _ => TrapKey::Ignored,
        }
    }

    fn cycle(&self, doc: &mut Document, forward: bool) {
        let focusables = doc.focusable_within(self.container);
        let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
            return;
        };
        let current = doc
            .focused()
            .and_then(|f| focusables.iter().position(|&el| el == f));
        let next = match (current, forward) {
            (None, true) => first,
            (None, false) => last,
            (Some(i), true) => focusables.get(i + 1).copied().unwrap_or(first),
            (Some(0), false) => last,
            (Some(i), false) => focusables[i - 1],
        };
        doc.focus(next);
    }

    /// Deactivate, restoring the remembered focus when possible.
    pub fn release(self, doc: &mut Document) {
        match self.previous {
            Some(prev) if doc.is_connected(prev) => {
                doc.focus(prev);
            }
            _ => {
                if doc
                    .focused()
                    .is_some_and(|f| doc.is_inclusive_ancestor(self.container, f))
                {
                    doc.blur();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::event::Modifiers;

    fn dialog(doc: &mut Document, buttons: usize) -> (ElementId, Vec<ElementId>) {
        let container = doc.build("div").class("modal-dialog").append_to_body();
        let els = (0..buttons)
            .map(|_| doc.build("button").append_to(container))
            .collect();
        (container, els)
    }

    fn tab() -> KeyEvent {
        KeyEvent::new(KeyCode::Tab)
    }

    fn shift_tab() -> KeyEvent {
        KeyEvent::with_modifiers(KeyCode::Tab, Modifiers::SHIFT)
    }

    #[test]
    fn tab_wraps_forward_and_back() {
        let mut doc = Document::new();
        let (container, b) = dialog(&mut doc, 3);
        let trap = FocusTrap::activate(&mut doc, container);
        assert_eq!(doc.focused(), Some(b[0]));
        trap.handle_key(&mut doc, &tab());
        trap.handle_key(&mut doc, &tab());
        assert_eq!(doc.focused(), Some(b[2]));
        assert_eq!(trap.handle_key(&mut doc, &tab()), TrapKey::Consumed);
        assert_eq!(doc.focused(), Some(b[0]));
        trap.handle_key(&mut doc, &shift_tab());
        assert_eq!(doc.focused(), Some(b[2]));
    }

    #[test]
    fn zero_focusables_swallows_tab() {
        let mut doc = Document::new();
        let outside = doc.build("button").append_to_body();
        doc.focus(outside);
        let (container, _) = dialog(&mut doc, 0);
        let trap = FocusTrap::activate(&mut doc, container);
        assert_eq!(trap.handle_key(&mut doc, &tab()), TrapKey::Consumed);
        assert_eq!(doc.focused(), Some(outside));
        assert_eq!(trap.handle_key(&mut doc, &shift_tab()), TrapKey::Consumed);
        assert_eq!(doc.focused(), Some(outside));
    }

    #[test]
    fn focus_outside_is_pulled_in() {
        let mut doc = Document::new();
        let outside = doc.build("button").append_to_body();
        let (container, b) = dialog(&mut doc, 2);
        let trap = FocusTrap::activate(&mut doc, container);
        doc.focus(outside);
        trap.handle_key(&mut doc, &shift_tab());
        assert_eq!(doc.focused(), Some(b[1]));
    }

    #[test]
    fn release_restores_previous_focus() {
        let mut doc = Document::new();
        let opener = doc.build("button").append_to_body();
        doc.focus(opener);
        let (container, _) = dialog(&mut doc, 2);
        let trap = FocusTrap::activate(&mut doc, container);
        assert_eq!(trap.previous(), Some(opener));
        trap.release(&mut doc);
        assert_eq!(doc.focused(), Some(opener));
    }

    #[test]
    fn escape_is_reported_and_other_keys_ignored() {
        let mut doc = Document::new();
        let (container, _) = dialog(&mut doc, 1);
        let trap = FocusTrap::activate(&mut doc, container);
        assert_eq!(
            trap.handle_key(&mut doc, &KeyEvent::new(KeyCode::Escape)),
            TrapKey::Escape
        );
        assert_eq!(
            trap.handle_key(&mut doc, &KeyEvent::new(KeyCode::Char('a'))),
            TrapKey::Ignored
        );
    }
}
