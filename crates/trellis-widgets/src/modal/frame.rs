#![forbid(unsafe_code)]

//! The transient overlay frame shared by [`Modal`](super::Modal) and
//! [`Dialog`](super::Dialog).
//!
//! ```text
//! body > .modal[.modal-<variant>][role=dialog][aria-modal=true]
//!          .modal-overlay
//!          .modal-dialog
//!            .modal-header > .modal-title
//!            .modal-body
//!            .modal-footer      (dialogs only)
//!            button.modal-close
//! ```
//!
//! While open, the frame root carries the overlay ticket and focus trap in
//! the element side table. Closing takes them out first, so a second close
//! request during the exit animation is refused; the ticket is released and
//! focus restored once the frame has been removed.

use trellis_core::dom::{Document, ElementId};
use trellis_core::event::KeyEvent;
use trellis_runtime::{OverlayTicket, Ui};

use crate::lifecycle::{AnimationSpec, Direction, FocusTrap, Settle, TrapKey, Transition};
use crate::removal::remove_animated;

pub const IS_ACTIVE: &str = "is-active";

/// Handles of one frame's structural elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub root: ElementId,
    pub overlay: ElementId,
    pub dialog: ElementId,
    pub header: ElementId,
    pub body: ElementId,
    pub close: ElementId,
}

#[derive(Debug, Clone)]
struct OpenFrame {
    ticket: OverlayTicket,
    trap: FocusTrap,
}

impl Frame {
    /// Build the frame under `body`. It stays inert until [`Frame::open`].
    pub(crate) fn build(doc: &mut Document, variant: Option<&str>, title: &str) -> Self {
        let mut classes = String::from("modal");
        if let Some(v) = variant {
            classes.push_str(" modal-");
            classes.push_str(v);
        }
        let root = doc
            .build("div")
            .class(&classes)
            .attr("role", "dialog")
            .attr("aria-modal", "true")
            .append_to_body();
        let overlay = doc.build("div").class("modal-overlay").append_to(root);
        let dialog = doc.build("div").class("modal-dialog").append_to(root);
        let header = doc.build("div").class("modal-header").append_to(dialog);
        if !title.trim().is_empty() {
            let title_id = format!("modal-title-{}", root.get());
            doc.build("h2")
                .class("modal-title")
                .attr("id", title_id.as_str())
                .text(title)
                .append_to(header);
            doc.set_attr(root, "aria-labelledby", title_id);
        }
        let body = doc.build("div").class("modal-body").append_to(dialog);
        let close = doc
            .build("button")
            .class("modal-close")
            .attr("type", "button")
            .attr("aria-label", "Close")
            .append_to(dialog);
        Self {
            root,
            overlay,
            dialog,
            header,
            body,
            close,
        }
    }

    /// Add a `.modal-footer` between the body and the close button.
    pub(crate) fn footer(&self, doc: &mut Document) -> ElementId {
        let footer = doc.build("div").class("modal-footer").finish();
        doc.insert_before(self.dialog, footer, self.close);
        footer
    }

    /// Trap focus in the dialog and animate the frame in.
    pub(crate) fn open(
        &self,
        ui: &mut Ui,
        ticket: OverlayTicket,
        animation: &AnimationSpec,
        then: impl FnOnce(&mut Ui) + 'static,
    ) -> Settle {
        let trap = FocusTrap::activate(&mut ui.doc, self.dialog);
        ui.data.insert(self.root, OpenFrame { ticket, trap });
        Transition::on(self.root)
            .add(IS_ACTIVE)
            .animate(animation, Direction::In)
            .run(ui, then)
    }

    /// Whether `root` is an open frame not yet closing.
    pub(crate) fn is_open(ui: &Ui, root: ElementId) -> bool {
        ui.data.contains::<OpenFrame>(root)
    }

    /// Feed a key to the frame's focus trap.
    pub(crate) fn trap_key(ui: &mut Ui, root: ElementId, key: &KeyEvent) -> TrapKey {
        match ui.data.get::<OpenFrame>(root) {
            Some(open) => open.trap.handle_key(&mut ui.doc, key),
            None => TrapKey::Ignored,
        }
    }

    /// Animate the frame out, remove it, release the overlay guard and
    /// restore focus, then run `then`. Returns `false` if `root` is not
    /// open or already closing.
    pub(crate) fn close(
        ui: &mut Ui,
        root: ElementId,
        animation: &AnimationSpec,
        then: impl FnOnce(&mut Ui) + 'static,
    ) -> bool {
        let Some(OpenFrame { ticket, trap }) = ui.data.remove::<OpenFrame>(root) else {
            return false;
        };
        let finish = move |ui: &mut Ui| {
            ui.overlays.release(&mut ui.doc, ticket);
            trap.release(&mut ui.doc);
            then(ui);
        };
        if crate::lifecycle::is_animating(&ui.doc, root) {
            ui.remove_element(root);
            finish(ui);
            return true;
        }
        ui.doc.remove_class(root, IS_ACTIVE);
        remove_animated(ui, root, animation, finish);
        true
    }

    /// Tear down at once, without animation. Used by `destroy`.
    pub(crate) fn discard(ui: &mut Ui, root: ElementId) {
        let open = ui.data.remove::<OpenFrame>(root);
        ui.remove_element(root);
        if let Some(OpenFrame { ticket, trap }) = open {
            ui.overlays.release(&mut ui.doc, ticket);
            trap.release(&mut ui.doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_runtime::{HAS_OVERLAY, OwnerId};

    #[test]
    fn footer_sits_before_close_button() {
        let mut doc = Document::new();
        let frame = Frame::build(&mut doc, Some("confirm"), "Sure?");
        let footer = frame.footer(&mut doc);
        assert_eq!(
            doc.children(frame.dialog),
            &[frame.header, frame.body, footer, frame.close]
        );
        assert!(doc.has_class(frame.root, "modal-confirm"));
        assert!(doc.attr(frame.root, "aria-labelledby").is_some());
    }

    #[test]
    fn close_releases_guard_after_removal() {
        let mut ui = Ui::new();
        let owner = OwnerId::next();
        let frame = Frame::build(&mut ui.doc, None, "");
        let ticket = ui.overlays.try_acquire(&mut ui.doc, owner).expect("free");
        let spec = AnimationSpec::new("modal-out");
        frame.open(&mut ui, ticket, &AnimationSpec::disabled(), |_| {});
        assert_eq!(ui.doc.focused(), Some(frame.close));

        assert!(Frame::close(&mut ui, frame.root, &spec, |_| {}));
        assert!(!Frame::close(&mut ui, frame.root, &spec, |_| {}));
        assert!(ui.overlays.is_open());
        ui.animation_end(frame.root);
        assert!(!ui.doc.exists(frame.root));
        assert!(!ui.overlays.is_open());
        assert!(!ui.doc.has_class(ui.doc.root(), HAS_OVERLAY));
        assert_eq!(ui.doc.focused(), None);
    }
}
