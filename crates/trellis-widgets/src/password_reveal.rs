#![forbid(unsafe_code)]

//! Password reveal: a `.password-reveal-toggle` switches the container's
//! password input between `type="password"` and `type="text"`.
//!
//! The toggle mirrors the revealed state with `is-active` and
//! `aria-pressed`.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::Ui;

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{Emit, Lifecycle, Operation};
use crate::settings::{Options, Settings, selector};

pub const IS_ACTIVE: &str = "is-active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordRevealSettings {
    pub selector: String,
    pub input_selector: String,
    pub toggle_selector: String,
}

impl Default for PasswordRevealSettings {
    fn default() -> Self {
        Self {
            selector: ".password-reveal".into(),
            input_selector: "input".into(),
            toggle_selector: ".password-reveal-toggle".into(),
        }
    }
}

impl Settings for PasswordRevealSettings {
    const NAME: &'static str = "password-reveal";
}

#[derive(Debug)]
pub struct PasswordReveal {
    scope: ElementId,
    settings: PasswordRevealSettings,
    lifecycle: Lifecycle,
    container: Selector,
    input: Selector,
    toggle: Selector,
}

impl PasswordReveal {
    pub fn new(scope: ElementId, settings: PasswordRevealSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            container: selector(&settings.selector)?,
            input: selector(&settings.input_selector)?,
            toggle: selector(&settings.toggle_selector)?,
            settings,
            lifecycle: Lifecycle::new(PasswordRevealSettings::NAME),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, PasswordRevealSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &PasswordRevealSettings {
        &self.settings
    }

    pub fn containers(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.container)
    }

    fn input_of(&self, doc: &Document, container: ElementId) -> Option<ElementId> {
        doc.select_first(container, &self.input)
    }

    pub fn is_revealed(&self, doc: &Document, container: ElementId) -> bool {
        self.input_of(doc, container)
            .is_some_and(|i| doc.attr(i, "type") == Some("text"))
    }

    fn set(&self, doc: &mut Document, container: ElementId, revealed: bool) {
        if let Some(input) = self.input_of(doc, container) {
            doc.set_attr(input, "type", if revealed { "text" } else { "password" });
        }
        for t in doc.select(container, &self.toggle) {
            doc.toggle_class(t, IS_ACTIVE, Some(revealed));
            doc.set_attr(t, "aria-pressed", if revealed { "true" } else { "false" });
        }
    }

    pub fn show(&mut self, ui: &mut Ui, container: ElementId) -> bool {
        self.show_with(ui, container, Emit::Notify)
    }

    pub fn show_silently(&mut self, ui: &mut Ui, container: ElementId) -> bool {
        self.show_with(ui, container, Emit::Silent)
    }

    pub fn show_with(&mut self, ui: &mut Ui, container: ElementId, emit: Emit) -> bool {
        if self.input_of(&ui.doc, container).is_none() || self.is_revealed(&ui.doc, container) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Show, Some(container));
        self.set(&mut ui.doc, container, true);
        self.lifecycle.after(emit, Operation::Show, Some(container));
        true
    }

    pub fn hide(&mut self, ui: &mut Ui, container: ElementId) -> bool {
        self.hide_with(ui, container, Emit::Notify)
    }

    pub fn hide_silently(&mut self, ui: &mut Ui, container: ElementId) -> bool {
        self.hide_with(ui, container, Emit::Silent)
    }

    pub fn hide_with(&mut self, ui: &mut Ui, container: ElementId, emit: Emit) -> bool {
        if !self.is_revealed(&ui.doc, container) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Hide, Some(container));
        self.set(&mut ui.doc, container, false);
        self.lifecycle.after(emit, Operation::Hide, Some(container));
        true
    }

    pub fn toggle(&mut self, ui: &mut Ui, container: ElementId) -> bool {
        self.toggle_with(ui, container, Emit::Notify)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, container: ElementId) -> bool {
        self.toggle_with(ui, container, Emit::Silent)
    }

    pub fn toggle_with(&mut self, ui: &mut Ui, container: ElementId, emit: Emit) -> bool {
        if self.is_revealed(&ui.doc, container) {
            self.hide_with(ui, container, emit)
        } else {
            self.show_with(ui, container, emit)
        }
    }
}

impl Widget for PasswordReveal {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for container in self.containers(&ui.doc) {
            let revealed = self.is_revealed(&ui.doc, container);
            self.set(&mut ui.doc, container, revealed);
            for t in ui.doc.select(container, &self.toggle) {
                ui.listeners.bind(self.id(), t, EventKind::Click);
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
        let Some(toggle) = ui.listeners.route(self.id(), &ui.doc, event) else {
            return false;
        };
        match ui.doc.closest(toggle, &self.container) {
            Some(container) => self.toggle(ui, container),
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
