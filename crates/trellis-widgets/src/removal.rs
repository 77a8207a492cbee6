#![forbid(unsafe_code)]

//! Animated element removal shared by panel, card, chip and remover.

use trellis_core::dom::ElementId;
use trellis_runtime::Ui;

use crate::lifecycle::{AnimationSpec, Direction, Settle, Transition, is_animating};

/// Whether `el` can start a removal now.
pub fn can_remove(ui: &Ui, el: ElementId) -> bool {
    ui.doc.exists(el) && !is_animating(&ui.doc, el) && el != ui.doc.body() && el != ui.doc.root()
}

/// Play the exit animation on `el`, then drop it (and all runtime state
/// attached to its subtree) and run `then`.
pub fn remove_animated(
    ui: &mut Ui,
    el: ElementId,
    animation: &AnimationSpec,
    then: impl FnOnce(&mut Ui) + 'static,
) -> Settle {
    Transition::on(el)
        .animate(animation, Direction::Out)
        .run(ui, move |ui| {
            let removed = ui.remove_element(el);
            tracing::debug!(element = %el, nodes = removed.len(), "element removed");
            then(ui);
        })
}
