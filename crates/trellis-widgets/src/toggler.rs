#![forbid(unsafe_code)]

//! Toggler: `[data-toggle]` triggers that expand and collapse a target.
//!
//! The target comes from the trigger's `data-target` (`#id` or any
//! selector), falling back to a non-empty `data-toggle` value. The target
//! carries `is-expanded` / `is-collapsed`; the trigger mirrors it with
//! `is-active` and `aria-expanded`.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::Ui;

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{Collapsible, Emit, Lifecycle, Operation};
use crate::settings::{Options, Settings, selector};

pub const IS_ACTIVE: &str = "is-active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TogglerSettings {
    pub selector: String,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
}

impl Default for TogglerSettings {
    fn default() -> Self {
        Self {
            selector: "[data-toggle]".into(),
            animation: true,
            animation_in: "toggler-expand".into(),
            animation_out: "toggler-collapse".into(),
        }
    }
}

impl Settings for TogglerSettings {
    const NAME: &'static str = "toggler";
}

#[derive(Debug)]
pub struct Toggler {
    scope: ElementId,
    settings: TogglerSettings,
    lifecycle: Lifecycle,
    trigger: Selector,
}

impl Toggler {
    pub fn new(scope: ElementId, settings: TogglerSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            trigger: selector(&settings.selector)?,
            settings,
            lifecycle: Lifecycle::new(TogglerSettings::NAME),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, TogglerSettings::from_options(options)?)
    }

    pub fn triggers(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.trigger)
    }

    /// Element controlled by `trigger`.
    pub fn target_of(doc: &Document, trigger: ElementId) -> Option<ElementId> {
        let reference = doc
            .attr(trigger, "data-target")
            .or_else(|| doc.attr(trigger, "data-toggle"))
            .filter(|r| !r.trim().is_empty())?;
        doc.resolve_target(reference)
    }

    fn mirror(doc: &mut Document, trigger: ElementId, expanded: bool) {
        doc.toggle_class(trigger, IS_ACTIVE, Some(expanded));
        doc.set_attr(trigger, "aria-expanded", if expanded { "true" } else { "false" });
    }

    fn motion_for(&self, doc: &Document, trigger: ElementId) -> Collapsible {
        let s = self.settings.with_data_overrides(doc, trigger);
        Collapsible::new(s.animation, &s.animation_in, &s.animation_out)
    }

    pub fn expand(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.expand_with(ui, trigger, Emit::Notify)
    }

    pub fn expand_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.expand_with(ui, trigger, Emit::Silent)
    }

    pub fn expand_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let Some(target) = Self::target_of(&ui.doc, trigger) else {
            tracing::debug!(element = %trigger, "toggler target missing");
            return false;
        };
        if !Collapsible::can_expand(&ui.doc, target) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Expand, Some(target));
        Self::mirror(&mut ui.doc, trigger, true);
        let lifecycle = self.lifecycle.clone();
        self.motion_for(&ui.doc, trigger).expand(ui, target, move |_| {
            lifecycle.after(emit, Operation::Expand, Some(target));
        });
        true
    }

    pub fn collapse(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.collapse_with(ui, trigger, Emit::Notify)
    }

    pub fn collapse_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.collapse_with(ui, trigger, Emit::Silent)
    }

    pub fn collapse_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let Some(target) = Self::target_of(&ui.doc, trigger) else {
            return false;
        };
        if !Collapsible::can_collapse(&ui.doc, target) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Collapse, Some(target));
        Self::mirror(&mut ui.doc, trigger, false);
        let lifecycle = self.lifecycle.clone();
        self.motion_for(&ui.doc, trigger).collapse(ui, target, move |_| {
            lifecycle.after(emit, Operation::Collapse, Some(target));
        });
        true
    }

    pub fn toggle(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.toggle_with(ui, trigger, Emit::Notify)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.toggle_with(ui, trigger, Emit::Silent)
    }

    /// Flip the target's state, bracketed by `Toggle` events around the
    /// dispatched expand/collapse.
    pub fn toggle_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let Some(target) = Self::target_of(&ui.doc, trigger) else {
            return false;
        };
        let expanded = Collapsible::is_expanded(&ui.doc, target);
        let allowed = if expanded {
            Collapsible::can_collapse(&ui.doc, target)
        } else {
            Collapsible::can_expand(&ui.doc, target)
        };
        if !allowed {
            return false;
        }
        self.lifecycle.before(emit, Operation::Toggle, Some(target));
        if expanded {
            self.collapse_with(ui, trigger, emit);
        } else {
            self.expand_with(ui, trigger, emit);
        }
        self.lifecycle.after(emit, Operation::Toggle, Some(target));
        true
    }
}

impl Widget for Toggler {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for trigger in self.triggers(&ui.doc) {
            if let Some(target) = Self::target_of(&ui.doc, trigger) {
                let expanded = Collapsible::is_expanded(&ui.doc, target);
                Collapsible::set_state(&mut ui.doc, target, expanded);
                Self::mirror(&mut ui.doc, trigger, expanded);
            }
            ui.listeners.bind(self.id(), trigger, EventKind::Click);
        }
        self.lifecycle.after(emit, Operation::Initialize, Some(self.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Destroy, Some(self.scope));
        ui.listeners.unbind_owner(self.id());
        self.lifecycle.after(emit, Operation::Destroy, Some(self.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        if event.kind() != EventKind::Click {
            return false;
        }
        match ui.listeners.route(self.id(), &ui.doc, event) {
            Some(trigger) => {
                self.toggle(ui, trigger);
                true
            }
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{COLLAPSED, EXPANDED};

    fn setup() -> (Ui, ElementId, ElementId) {
        let mut ui = Ui::new();
        let trigger = ui
            .doc
            .build("button")
            .attr("data-toggle", "")
            .attr("data-target", "#nav")
            .append_to_body();
        let nav = ui.doc.build("nav").attr("id", "nav").append_to_body();
        (ui, trigger, nav)
    }

    #[test]
    fn click_expands_target_and_marks_trigger() {
        let (mut ui, trigger, nav) = setup();
        let mut t = Toggler::new(ui.doc.body(), TogglerSettings::default()).expect("valid");
        t.initialize(&mut ui);
        assert!(ui.doc.has_class(nav, COLLAPSED));
        assert!(t.handle_event(&mut ui, &Event::click(trigger)));
        assert!(ui.doc.has_class(trigger, IS_ACTIVE));
        assert_eq!(ui.doc.attr(trigger, "aria-expanded"), Some("true"));
        assert!(!ui.doc.has_class(nav, EXPANDED));
        ui.animation_end(nav);
        assert!(ui.doc.has_class(nav, EXPANDED));
        t.handle_event(&mut ui, &Event::click(trigger));
        ui.animation_end(nav);
        assert!(ui.doc.has_class(nav, COLLAPSED));
        assert!(!ui.doc.has_class(trigger, IS_ACTIVE));
    }

    #[test]
    fn data_animation_override_skips_animation() {
        let (mut ui, trigger, nav) = setup();
        ui.doc.set_attr(trigger, "data-animation", "false");
        let mut t = Toggler::new(ui.doc.body(), TogglerSettings::default()).expect("valid");
        t.initialize(&mut ui);
        t.toggle(&mut ui, trigger);
        assert!(ui.doc.has_class(nav, EXPANDED));
    }

    #[test]
    fn missing_target_is_noop() {
        let (mut ui, trigger, nav) = setup();
        ui.remove_element(nav);
        let mut t = Toggler::new(ui.doc.body(), TogglerSettings::default()).expect("valid");
        t.initialize(&mut ui);
        assert!(!t.toggle(&mut ui, trigger));
    }
}
