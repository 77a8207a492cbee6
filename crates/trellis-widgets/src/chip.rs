#![forbid(unsafe_code)]

//! Chip: `.chip` elements removed by their `.chip-remove` control.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::Ui;

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Emit, Lifecycle, Operation};
use crate::removal::{can_remove, remove_animated};
use crate::settings::{Options, Settings, selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChipSettings {
    pub selector: String,
    pub remove_selector: String,
    pub animation: bool,
    pub animation_remove: String,
}

impl Default for ChipSettings {
    fn default() -> Self {
        Self {
            selector: ".chip".into(),
            remove_selector: ".chip-remove".into(),
            animation: true,
            animation_remove: "chip-remove".into(),
        }
    }
}

impl Settings for ChipSettings {
    const NAME: &'static str = "chip";
}

#[derive(Debug)]
pub struct Chip {
    scope: ElementId,
    lifecycle: Lifecycle,
    removal: AnimationSpec,
    chip: Selector,
    remove: Selector,
}

impl Chip {
    pub fn new(scope: ElementId, settings: ChipSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            lifecycle: Lifecycle::new(ChipSettings::NAME),
            removal: AnimationSpec::from_settings(settings.animation, &settings.animation_remove),
            chip: selector(&settings.selector)?,
            remove: selector(&settings.remove_selector)?,
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, ChipSettings::from_options(options)?)
    }

    pub fn chips(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.chip)
    }

    pub fn remove(&mut self, ui: &mut Ui, chip: ElementId) -> bool {
        self.remove_with(ui, chip, Emit::Notify)
    }

    pub fn remove_silently(&mut self, ui: &mut Ui, chip: ElementId) -> bool {
        self.remove_with(ui, chip, Emit::Silent)
    }

    pub fn remove_with(&mut self, ui: &mut Ui, chip: ElementId, emit: Emit) -> bool {
        if !self.chip.matches(&ui.doc, chip) || !can_remove(ui, chip) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Remove, Some(chip));
        let lifecycle = self.lifecycle.clone();
        remove_animated(ui, chip, &self.removal, move |_| {
            lifecycle.after(emit, Operation::Remove, Some(chip));
        });
        true
    }
}

impl Widget for Chip {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for chip in self.chips(&ui.doc) {
            for control in ui.doc.select(chip, &self.remove) {
                ui.listeners.bind(self.id(), control, EventKind::Click);
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
        match ui.doc.closest(control, &self.chip) {
            Some(chip) => {
                self.remove(ui, chip);
                true
            }
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
