#![forbid(unsafe_code)]

//! Popover: a click-triggered transient card next to a `[data-popover]`
//! trigger.
//!
//! ```text
//! body > .popover.popover-<position>
//!          .popover-title      (only with data-popover-title)
//!          .popover-content    text of data-popover
//!          button.popover-close
//! ```
//!
//! Clicking the trigger again, the close button, anywhere outside the
//! popover (`closeOnOutsideClick`) or pressing Escape (`closeOnEscape`)
//! removes it. Popovers of different triggers are independent and may be
//! open at the same time.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind, KeyCode};
use trellis_core::geometry::Side;
use trellis_core::selector::Selector;
use trellis_runtime::{OwnerId, Ui};

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Direction, Emit, Lifecycle, Operation, Transition, is_animating};
use crate::placement::place;
use crate::removal::remove_animated;
use crate::settings::{Options, Settings, selector};

pub const IS_ACTIVE: &str = "is-active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopoverSettings {
    pub selector: String,
    pub position: Side,
    pub offset: i32,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub close_on_outside_click: bool,
    pub close_on_escape: bool,
}

impl Default for PopoverSettings {
    fn default() -> Self {
        Self {
            selector: "[data-popover]".into(),
            position: Side::Top,
            offset: 8,
            animation: true,
            animation_in: "popover-in".into(),
            animation_out: "popover-out".into(),
            close_on_outside_click: true,
            close_on_escape: true,
        }
    }
}

impl Settings for PopoverSettings {
    const NAME: &'static str = "popover";
}

/// Stored on the trigger while its popover is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePopover {
    owner: OwnerId,
    popover: ElementId,
}

/// Stored on the popover: the trigger that opened it.
#[derive(Debug, Clone, Copy)]
struct OpenedBy(ElementId);

#[derive(Debug)]
pub struct Popover {
    scope: ElementId,
    settings: PopoverSettings,
    lifecycle: Lifecycle,
    trigger: Selector,
}

impl Popover {
    pub fn new(scope: ElementId, settings: PopoverSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            trigger: selector(&settings.selector)?,
            settings,
            lifecycle: Lifecycle::new(PopoverSettings::NAME),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, PopoverSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &PopoverSettings {
        &self.settings
    }

    pub fn triggers(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.trigger)
    }

    /// The live popover opened by `trigger`.
    pub fn popover_of(&self, ui: &Ui, trigger: ElementId) -> Option<ElementId> {
        ui.data
            .get::<ActivePopover>(trigger)
            .filter(|a| a.owner == self.id() && ui.doc.exists(a.popover))
            .map(|a| a.popover)
    }

    /// Triggers whose popover is live, in id order.
    pub fn open_triggers(&self, ui: &Ui) -> Vec<ElementId> {
        ui.data
            .elements_with::<ActivePopover>()
            .into_iter()
            .filter(|&t| self.popover_of(ui, t).is_some())
            .collect()
    }

    pub fn insert(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.insert_with(ui, trigger, Emit::Notify)
    }

    pub fn insert_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.insert_with(ui, trigger, Emit::Silent)
    }

    pub fn insert_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        if !ui.doc.is_connected(trigger) {
            return false;
        }
        if let Some(current) = ui.data.get::<ActivePopover>(trigger)
            && ui.doc.exists(current.popover)
        {
            return false;
        }
        let Some(content) = ui
            .doc
            .attr(trigger, "data-popover")
            .filter(|c| !c.trim().is_empty())
            .map(str::to_owned)
        else {
            tracing::debug!(element = %trigger, "popover without content");
            return false;
        };
        let title = ui
            .doc
            .attr(trigger, "data-popover-title")
            .filter(|t| !t.trim().is_empty())
            .map(str::to_owned);
        let s = self.settings.with_data_overrides(&ui.doc, trigger);
        self.lifecycle.before(emit, Operation::Insert, Some(trigger));

        let popover = ui
            .doc
            .build("div")
            .class(&format!("popover popover-{}", s.position.as_str()))
            .attr("role", "dialog")
            .append_to_body();
        if let Some(title) = title {
            ui.doc.build("div").class("popover-title").text(title).append_to(popover);
        }
        ui.doc.build("div").class("popover-content").text(content).append_to(popover);
        let close = ui
            .doc
            .build("button")
            .class("popover-close")
            .attr("type", "button")
            .attr("aria-label", "Close")
            .append_to(popover);
        place(&mut ui.doc, popover, trigger, s.position, s.offset);
        ui.doc.set_attr(trigger, "aria-expanded", "true");
        ui.data.insert(
            trigger,
            ActivePopover {
                owner: self.id(),
                popover,
            },
        );
        ui.data.insert(popover, OpenedBy(trigger));
        ui.listeners.bind(self.id(), close, EventKind::Click);

        let lifecycle = self.lifecycle.clone();
        Transition::on(popover)
            .add(IS_ACTIVE)
            .animate(&AnimationSpec::from_settings(s.animation, &s.animation_in), Direction::In)
            .run(ui, move |_| lifecycle.after(emit, Operation::Insert, Some(trigger)));
        true
    }

    pub fn remove(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.remove_with(ui, trigger, Emit::Notify)
    }

    pub fn remove_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.remove_with(ui, trigger, Emit::Silent)
    }

    pub fn remove_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let Some(popover) = self.popover_of(ui, trigger) else {
            return false;
        };
        self.lifecycle.before(emit, Operation::Remove, Some(trigger));
        ui.data.remove::<ActivePopover>(trigger);
        ui.doc.set_attr(trigger, "aria-expanded", "false");
        let lifecycle = self.lifecycle.clone();
        if is_animating(&ui.doc, popover) {
            ui.remove_element(popover);
            lifecycle.after(emit, Operation::Remove, Some(trigger));
            return true;
        }
        let s = self.settings.with_data_overrides(&ui.doc, trigger);
        ui.doc.remove_class(popover, IS_ACTIVE);
        remove_animated(
            ui,
            popover,
            &AnimationSpec::from_settings(s.animation, &s.animation_out),
            move |_| lifecycle.after(emit, Operation::Remove, Some(trigger)),
        );
        true
    }

    pub fn toggle(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.toggle_with(ui, trigger, Emit::Notify)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.toggle_with(ui, trigger, Emit::Silent)
    }

    pub fn toggle_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        if self.popover_of(ui, trigger).is_some() {
            self.remove_with(ui, trigger, emit)
        } else {
            self.insert_with(ui, trigger, emit)
        }
    }

    /// Close every popover of this instance.
    pub fn remove_all(&mut self, ui: &mut Ui) -> usize {
        self.remove_all_with(ui, Emit::Notify)
    }

    pub fn remove_all_silently(&mut self, ui: &mut Ui) -> usize {
        self.remove_all_with(ui, Emit::Silent)
    }

    fn remove_all_with(&mut self, ui: &mut Ui, emit: Emit) -> usize {
        self.open_triggers(ui)
            .into_iter()
            .filter(|&t| self.remove_with(ui, t, emit))
            .count()
    }

    fn inside_open_popover(&self, ui: &Ui, el: ElementId) -> bool {
        self.open_triggers(ui).into_iter().any(|t| {
            self.popover_of(ui, t)
                .is_some_and(|p| ui.doc.is_inclusive_ancestor(p, el))
        })
    }
}

impl Widget for Popover {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for trigger in self.triggers(&ui.doc) {
            ui.doc.set_attr(trigger, "aria-haspopup", "dialog");
            ui.listeners.bind(self.id(), trigger, EventKind::Click);
        }
        let root = ui.doc.root();
        if self.settings.close_on_outside_click {
            ui.listeners.bind(self.id(), root, EventKind::Click);
        }
        if self.settings.close_on_escape {
            ui.listeners.bind(self.id(), root, EventKind::KeyDown);
        }
        self.lifecycle.after(emit, Operation::Initialize, Some(self.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Destroy, Some(self.scope));
        ui.listeners.unbind_owner(self.id());
        for trigger in self.open_triggers(ui) {
            if let Some(popover) = self.popover_of(ui, trigger) {
                ui.data.remove::<ActivePopover>(trigger);
                ui.doc.set_attr(trigger, "aria-expanded", "false");
                ui.remove_element(popover);
            }
        }
        self.lifecycle.after(emit, Operation::Destroy, Some(self.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        let Some(bound) = ui.listeners.route(self.id(), &ui.doc, event) else {
            return false;
        };
        let root = ui.doc.root();
        match event {
            Event::Key { .. } if event.is_key(KeyCode::Escape) => self.remove_all(ui) > 0,
            Event::Click { target } if bound == root => {
                if self.inside_open_popover(ui, *target) {
                    return false;
                }
                self.remove_all(ui) > 0
            }
            Event::Click { .. } => {
                if self.trigger.matches(&ui.doc, bound) {
                    return self.toggle(ui, bound);
                }
                let opener = ui
                    .doc
                    .path(bound)
                    .find_map(|el| ui.data.get::<OpenedBy>(el).copied());
                match opener {
                    Some(OpenedBy(trigger)) => self.remove(ui, trigger),
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
