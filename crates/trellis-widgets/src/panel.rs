#![forbid(unsafe_code)]

//! Panel widget: a box whose body collapses and which can remove itself.
//!
//! ```text
//! .panel
//!   .panel-toggle      aria-expanded, collapses/expands the body
//!   .panel-remove      animated removal of the whole panel
//!   .panel-body        [.is-expanded | .is-collapsed]
//! ```
//!
//! The same structure with different class names backs [`crate::Card`].

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::Ui;

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Collapsible, Emit, Lifecycle, Operation};
use crate::removal::{can_remove, remove_animated};
use crate::settings::{Options, Settings, selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelSettings {
    pub selector: String,
    pub toggle_selector: String,
    pub body_selector: String,
    pub remove_selector: String,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub animation_remove: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            selector: ".panel".into(),
            toggle_selector: ".panel-toggle".into(),
            body_selector: ".panel-body".into(),
            remove_selector: ".panel-remove".into(),
            animation: true,
            animation_in: "panel-expand".into(),
            animation_out: "panel-collapse".into(),
            animation_remove: "panel-remove".into(),
        }
    }
}

impl Settings for PanelSettings {
    const NAME: &'static str = "panel";
}

#[derive(Debug)]
pub struct Panel {
    scope: ElementId,
    settings: PanelSettings,
    lifecycle: Lifecycle,
    motion: Collapsible,
    removal: AnimationSpec,
    panel: Selector,
    toggle: Selector,
    body: Selector,
    remove: Selector,
}

impl Panel {
    pub fn new(scope: ElementId, settings: PanelSettings) -> Result<Self, ConfigError> {
        Self::with_kind(scope, settings, PanelSettings::NAME)
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, PanelSettings::from_options(options)?)
    }

    pub(crate) fn with_kind(
        scope: ElementId,
        settings: PanelSettings,
        kind: &'static str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            motion: Collapsible::new(
                settings.animation,
                &settings.animation_in,
                &settings.animation_out,
            ),
            removal: AnimationSpec::from_settings(settings.animation, &settings.animation_remove),
            panel: selector(&settings.selector)?,
            toggle: selector(&settings.toggle_selector)?,
            body: selector(&settings.body_selector)?,
            remove: selector(&settings.remove_selector)?,
            settings,
            lifecycle: Lifecycle::new(kind),
        })
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn panels(&self, doc: &Document) -> Vec<ElementId> {
        let mut found = doc.select(self.scope, &self.panel);
        if self.panel.matches(doc, self.scope) {
            found.insert(0, self.scope);
        }
        found
    }

    pub fn body_of(&self, doc: &Document, panel: ElementId) -> Option<ElementId> {
        doc.select_first(panel, &self.body)
    }

    pub fn is_expanded(&self, doc: &Document, panel: ElementId) -> bool {
        self.body_of(doc, panel)
            .is_some_and(|b| Collapsible::is_expanded(doc, b))
    }

    fn sync_toggles(&self, doc: &mut Document, panel: ElementId, expanded: bool) {
        for t in doc.select(panel, &self.toggle) {
            doc.set_attr(t, "aria-expanded", if expanded { "true" } else { "false" });
        }
    }

    pub fn expand(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.expand_with(ui, panel, Emit::Notify)
    }

    pub fn expand_silently(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.expand_with(ui, panel, Emit::Silent)
    }

    pub fn expand_with(&mut self, ui: &mut Ui, panel: ElementId, emit: Emit) -> bool {
        let Some(body) = self.body_of(&ui.doc, panel) else {
            return false;
        };
        if !Collapsible::can_expand(&ui.doc, body) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Expand, Some(panel));
        self.sync_toggles(&mut ui.doc, panel, true);
        let lifecycle = self.lifecycle.clone();
        self.motion.expand(ui, body, move |_| {
            lifecycle.after(emit, Operation::Expand, Some(panel));
        });
        true
    }

    pub fn collapse(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.collapse_with(ui, panel, Emit::Notify)
    }

    pub fn collapse_silently(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.collapse_with(ui, panel, Emit::Silent)
    }

    pub fn collapse_with(&mut self, ui: &mut Ui, panel: ElementId, emit: Emit) -> bool {
        let Some(body) = self.body_of(&ui.doc, panel) else {
            return false;
        };
        if !Collapsible::can_collapse(&ui.doc, body) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Collapse, Some(panel));
        self.sync_toggles(&mut ui.doc, panel, false);
        let lifecycle = self.lifecycle.clone();
        self.motion.collapse(ui, body, move |_| {
            lifecycle.after(emit, Operation::Collapse, Some(panel));
        });
        true
    }

    pub fn toggle(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.toggle_with(ui, panel, Emit::Notify)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.toggle_with(ui, panel, Emit::Silent)
    }

    pub fn toggle_with(&mut self, ui: &mut Ui, panel: ElementId, emit: Emit) -> bool {
        if self.is_expanded(&ui.doc, panel) {
            self.collapse_with(ui, panel, emit)
        } else {
            self.expand_with(ui, panel, emit)
        }
    }

    pub fn remove(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.remove_with(ui, panel, Emit::Notify)
    }

    pub fn remove_silently(&mut self, ui: &mut Ui, panel: ElementId) -> bool {
        self.remove_with(ui, panel, Emit::Silent)
    }

    /// Animate `panel` out and drop it from the document.
    pub fn remove_with(&mut self, ui: &mut Ui, panel: ElementId, emit: Emit) -> bool {
        if !self.panel.matches(&ui.doc, panel) || !can_remove(ui, panel) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Remove, Some(panel));
        let lifecycle = self.lifecycle.clone();
        remove_animated(ui, panel, &self.removal, move |_| {
            lifecycle.after(emit, Operation::Remove, Some(panel));
        });
        true
    }
}

impl Widget for Panel {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for panel in self.panels(&ui.doc) {
            if let Some(body) = self.body_of(&ui.doc, panel) {
                let expanded = !ui.doc.has_class(body, crate::lifecycle::COLLAPSED);
                Collapsible::set_state(&mut ui.doc, body, expanded);
                self.sync_toggles(&mut ui.doc, panel, expanded);
            }
            for el in ui
                .doc
                .select(panel, &self.toggle)
                .into_iter()
                .chain(ui.doc.select(panel, &self.remove))
            {
                ui.listeners.bind(self.id(), el, EventKind::Click);
            }
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
        let Some(control) = ui.listeners.route(self.id(), &ui.doc, event) else {
            return false;
        };
        let Some(panel) = ui.doc.closest(control, &self.panel) else {
            return false;
        };
        if self.remove.matches(&ui.doc, control) {
            self.remove(ui, panel);
        } else {
            self.toggle(ui, panel);
        }
        true
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{COLLAPSED, EXPANDED};

    struct Fixture {
        ui: Ui,
        panel: ElementId,
        toggle: ElementId,
        close: ElementId,
        body: ElementId,
    }

    fn fixture() -> Fixture {
        let mut ui = Ui::new();
        let panel = ui.doc.build("section").class("panel").append_to_body();
        let toggle = ui.doc.build("button").class("panel-toggle").append_to(panel);
        let close = ui.doc.build("button").class("panel-remove").append_to(panel);
        let body = ui.doc.build("div").class("panel-body").append_to(panel);
        Fixture {
            ui,
            panel,
            toggle,
            close,
            body,
        }
    }

    #[test]
    fn bodies_start_expanded_unless_marked() {
        let mut f = fixture();
        let mut p = Panel::new(f.ui.doc.body(), PanelSettings::default()).expect("valid");
        p.initialize(&mut f.ui);
        assert!(f.ui.doc.has_class(f.body, EXPANDED));
        assert_eq!(f.ui.doc.attr(f.toggle, "aria-expanded"), Some("true"));
    }

    #[test]
    fn toggle_click_collapses_body() {
        let mut f = fixture();
        let mut p = Panel::new(f.ui.doc.body(), PanelSettings::default()).expect("valid");
        p.initialize(&mut f.ui);
        assert!(p.handle_event(&mut f.ui, &Event::click(f.toggle)));
        f.ui.animation_end(f.body);
        assert!(f.ui.doc.has_class(f.body, COLLAPSED));
        assert!(!p.is_expanded(&f.ui.doc, f.panel));
    }

    #[test]
    fn remove_click_drops_panel_after_animation() {
        let mut f = fixture();
        let mut p = Panel::new(f.ui.doc.body(), PanelSettings::default()).expect("valid");
        p.initialize(&mut f.ui);
        p.handle_event(&mut f.ui, &Event::click(f.close));
        assert!(f.ui.doc.exists(f.panel));
        f.ui.animation_end(f.panel);
        assert!(!f.ui.doc.exists(f.panel));
        assert_eq!(f.ui.listeners.count(p.id()), 0);
    }

    #[test]
    fn scope_may_be_the_panel_itself() {
        let mut f = fixture();
        let mut p = Panel::new(f.panel, PanelSettings::default()).expect("valid");
        p.initialize(&mut f.ui);
        assert_eq!(f.ui.listeners.count(p.id()), 2);
    }
}
