#![forbid(unsafe_code)]

//! Remover: `[data-remove]` triggers that remove another element.
//!
//! The element to remove is the trigger's `data-target` (`#id` or selector)
//! when present; otherwise the closest ancestor of the trigger matching the
//! selector in `data-remove` itself.

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
pub struct RemoverSettings {
    pub selector: String,
    pub animation: bool,
    pub animation_remove: String,
}

impl Default for RemoverSettings {
    fn default() -> Self {
        Self {
            selector: "[data-remove]".into(),
            animation: true,
            animation_remove: "remove".into(),
        }
    }
}

impl Settings for RemoverSettings {
    const NAME: &'static str = "remover";
}

#[derive(Debug)]
pub struct Remover {
    scope: ElementId,
    settings: RemoverSettings,
    lifecycle: Lifecycle,
    trigger: Selector,
}

impl Remover {
    pub fn new(scope: ElementId, settings: RemoverSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            trigger: selector(&settings.selector)?,
            settings,
            lifecycle: Lifecycle::new(RemoverSettings::NAME),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, RemoverSettings::from_options(options)?)
    }

    /// Element that `trigger` removes.
    pub fn target_of(doc: &Document, trigger: ElementId) -> Option<ElementId> {
        if let Some(reference) = doc.attr(trigger, "data-target").filter(|r| !r.trim().is_empty()) {
            return doc.resolve_target(reference);
        }
        let ancestor = doc.attr(trigger, "data-remove").filter(|r| !r.trim().is_empty())?;
        match Selector::parse(ancestor) {
            Ok(sel) => doc.closest(trigger, &sel),
            Err(err) => {
                tracing::warn!(element = %trigger, error = %err, "invalid data-remove selector");
                None
            }
        }
    }

    pub fn remove(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.remove_with(ui, trigger, Emit::Notify)
    }

    pub fn remove_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.remove_with(ui, trigger, Emit::Silent)
    }

    pub fn remove_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let Some(target) = Self::target_of(&ui.doc, trigger) else {
            tracing::debug!(element = %trigger, "remover target missing");
            return false;
        };
        if !can_remove(ui, target) {
            return false;
        }
        let settings = self.settings.with_data_overrides(&ui.doc, trigger);
        let animation = AnimationSpec::from_settings(settings.animation, &settings.animation_remove);
        self.lifecycle.before(emit, Operation::Remove, Some(target));
        let lifecycle = self.lifecycle.clone();
        remove_animated(ui, target, &animation, move |_| {
            lifecycle.after(emit, Operation::Remove, Some(target));
        });
        true
    }
}

impl Widget for Remover {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for trigger in ui.doc.select(self.scope, &self.trigger) {
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
                self.remove(ui, trigger);
                true
            }
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
