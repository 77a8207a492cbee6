#![forbid(unsafe_code)]

//! Tooltip: a transient `.tooltip` bubble next to a `[data-tooltip]` trigger.
//!
//! The text comes from the trigger's `data-tooltip` value, falling back to
//! its `title`. Insert builds
//!
//! ```text
//! body > .tooltip.tooltip-<position>[.tooltip-<color>][.tooltip-<size>]
//! ```
//!
//! positions it from the trigger's layout box and links it through
//! `aria-describedby`. Remove animates it out and drops it.
//!
//! Each trigger has at most one active tooltip, recorded in the element
//! data side table. Delayed actions (hover/focus delays, the `duration`
//! auto-remove) re-check that record when they fire, so a timer outliving
//! its tooltip is a no-op. When two instances cover the same trigger, the
//! one that inserted first owns it until removal.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::geometry::Side;
use trellis_core::selector::Selector;
use trellis_runtime::{Duration, OwnerId, TimerId, Ui};

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Direction, Emit, Lifecycle, Operation, Transition, is_animating};
use crate::placement::place;
use crate::removal::remove_animated;
use crate::settings::{Options, Settings, selector};

pub const IS_ACTIVE: &str = "is-active";

/// What shows and hides a tooltip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    #[default]
    Hover,
    Focus,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipSettings {
    pub selector: String,
    pub trigger: TooltipTrigger,
    pub position: Side,
    /// Color modifier (`tooltip-<color>`); empty for none.
    pub color: String,
    /// Size modifier (`tooltip-<size>`); empty for none.
    pub size: String,
    pub delay_in: u64,
    pub delay_out: u64,
    /// Milliseconds until the tooltip removes itself; 0 keeps it until the
    /// trigger lets go.
    pub duration: u64,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    /// Gap between trigger and tooltip.
    pub offset: i32,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            selector: "[data-tooltip]".into(),
            trigger: TooltipTrigger::Hover,
            position: Side::Top,
            color: String::new(),
            size: String::new(),
            delay_in: 0,
            delay_out: 0,
            duration: 0,
            animation: true,
            animation_in: "tooltip-in".into(),
            animation_out: "tooltip-out".into(),
            offset: 8,
        }
    }
}

impl Settings for TooltipSettings {
    const NAME: &'static str = "tooltip";
}

/// The live tooltip of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveTooltip {
    owner: OwnerId,
    tip: ElementId,
}

/// A pending delayed insert/remove for a trigger.
#[derive(Debug, Clone, Copy)]
struct PendingTooltip(TimerId);

#[derive(Debug)]
struct Core {
    scope: ElementId,
    settings: TooltipSettings,
    lifecycle: Lifecycle,
    trigger: Selector,
}

impl Core {
    fn triggers(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.trigger)
    }

    fn resolved(&self, doc: &Document, trigger: ElementId) -> TooltipSettings {
        self.settings.with_data_overrides(doc, trigger)
    }

    fn text_of(doc: &Document, trigger: ElementId) -> Option<String> {
        doc.attr(trigger, "data-tooltip")
            .filter(|t| !t.trim().is_empty())
            .or_else(|| doc.attr(trigger, "title"))
            .filter(|t| !t.trim().is_empty())
            .map(str::to_owned)
    }

    fn active(&self, ui: &Ui, trigger: ElementId) -> Option<ElementId> {
        ui.data
            .get::<ActiveTooltip>(trigger)
            .filter(|a| a.owner == self.lifecycle.id() && ui.doc.exists(a.tip))
            .map(|a| a.tip)
    }

    fn cancel_pending(ui: &mut Ui, trigger: ElementId) {
        if let Some(PendingTooltip(id)) = ui.data.remove::<PendingTooltip>(trigger) {
            ui.cancel(id);
        }
    }

    fn insert(self: &Rc<Self>, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        if !ui.doc.is_connected(trigger) {
            return false;
        }
        if let Some(current) = ui.data.get::<ActiveTooltip>(trigger)
            && ui.doc.exists(current.tip)
        {
            tracing::trace!(element = %trigger, "tooltip already active");
            return false;
        }
        let Some(text) = Self::text_of(&ui.doc, trigger) else {
            tracing::debug!(element = %trigger, "tooltip without text");
            return false;
        };
        let s = self.resolved(&ui.doc, trigger);
        self.lifecycle.before(emit, Operation::Insert, Some(trigger));

        let mut classes = format!("tooltip tooltip-{}", s.position.as_str());
        for modifier in [&s.color, &s.size] {
            if !modifier.trim().is_empty() {
                classes.push_str(" tooltip-");
                classes.push_str(modifier.trim());
            }
        }
        let tip = ui
            .doc
            .build("div")
            .class(&classes)
            .attr("role", "tooltip")
            .text(text)
            .append_to_body();
        let tip_id = format!("tooltip-{}", tip.get());
        ui.doc.set_attr(tip, "id", tip_id.as_str());
        ui.doc.set_attr(trigger, "aria-describedby", tip_id);
        place(&mut ui.doc, tip, trigger, s.position, s.offset);
        ui.data.insert(
            trigger,
            ActiveTooltip {
                owner: self.lifecycle.id(),
                tip,
            },
        );

        if s.duration > 0 {
            let core = Rc::clone(self);
            ui.schedule(Duration::from_millis(s.duration), move |ui| {
                if core.active(ui, trigger) == Some(tip) {
                    core.remove(ui, trigger, emit);
                }
            });
        }

        let lifecycle = self.lifecycle.clone();
        Transition::on(tip)
            .add(IS_ACTIVE)
            .animate(&AnimationSpec::from_settings(s.animation, &s.animation_in), Direction::In)
            .run(ui, move |_| lifecycle.after(emit, Operation::Insert, Some(trigger)));
        true
    }

    fn remove(&self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let Some(tip) = self.active(ui, trigger) else {
            return false;
        };
        self.lifecycle.before(emit, Operation::Remove, Some(trigger));
        ui.data.remove::<ActiveTooltip>(trigger);
        ui.doc.remove_attr(trigger, "aria-describedby");
        let lifecycle = self.lifecycle.clone();
        if is_animating(&ui.doc, tip) {
            ui.remove_element(tip);
            lifecycle.after(emit, Operation::Remove, Some(trigger));
            return true;
        }
        let s = self.resolved(&ui.doc, trigger);
        ui.doc.remove_class(tip, IS_ACTIVE);
        remove_animated(
            ui,
            tip,
            &AnimationSpec::from_settings(s.animation, &s.animation_out),
            move |_| lifecycle.after(emit, Operation::Remove, Some(trigger)),
        );
        true
    }

    /// Insert or remove after the trigger's configured delay.
    fn delayed(self: &Rc<Self>, ui: &mut Ui, trigger: ElementId, show: bool) {
        Self::cancel_pending(ui, trigger);
        let s = self.resolved(&ui.doc, trigger);
        let delay = if show { s.delay_in } else { s.delay_out };
        if delay == 0 {
            if show {
                self.insert(ui, trigger, Emit::Notify);
            } else {
                self.remove(ui, trigger, Emit::Notify);
            }
            return;
        }
        let core = Rc::clone(self);
        let id = ui.schedule(Duration::from_millis(delay), move |ui| {
            ui.data.remove::<PendingTooltip>(trigger);
            if show {
                core.insert(ui, trigger, Emit::Notify);
            } else {
                core.remove(ui, trigger, Emit::Notify);
            }
        });
        ui.data.insert(trigger, PendingTooltip(id));
    }
}

#[derive(Debug)]
pub struct Tooltip {
    core: Rc<Core>,
}

impl Tooltip {
    pub fn new(scope: ElementId, settings: TooltipSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            core: Rc::new(Core {
                scope,
                trigger: selector(&settings.selector)?,
                settings,
                lifecycle: Lifecycle::new(TooltipSettings::NAME),
            }),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, TooltipSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &TooltipSettings {
        &self.core.settings
    }

    pub fn triggers(&self, doc: &Document) -> Vec<ElementId> {
        self.core.triggers(doc)
    }

    /// The tooltip currently shown for `trigger`.
    pub fn tooltip_of(&self, ui: &Ui, trigger: ElementId) -> Option<ElementId> {
        self.core.active(ui, trigger)
    }

    pub fn insert(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        Core::cancel_pending(ui, trigger);
        self.core.insert(ui, trigger, Emit::Notify)
    }

    pub fn insert_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        Core::cancel_pending(ui, trigger);
        self.core.insert(ui, trigger, Emit::Silent)
    }

    pub fn remove(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        Core::cancel_pending(ui, trigger);
        self.core.remove(ui, trigger, Emit::Notify)
    }

    pub fn remove_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        Core::cancel_pending(ui, trigger);
        self.core.remove(ui, trigger, Emit::Silent)
    }

    pub fn toggle(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        if self.core.active(ui, trigger).is_some() {
            self.remove(ui, trigger)
        } else {
            self.insert(ui, trigger)
        }
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        if self.core.active(ui, trigger).is_some() {
            self.remove_silently(ui, trigger)
        } else {
            self.insert_silently(ui, trigger)
        }
    }
}

impl Widget for Tooltip {
    fn lifecycle(&self) -> &Lifecycle {
        &self.core.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        let core = &self.core;
        let owner = core.lifecycle.id();
        core.lifecycle.before(emit, Operation::Initialize, Some(core.scope));
        for trigger in core.triggers(&ui.doc) {
            let kinds: &[EventKind] = match core.resolved(&ui.doc, trigger).trigger {
                TooltipTrigger::Hover => &[EventKind::PointerEnter, EventKind::PointerLeave],
                TooltipTrigger::Focus => &[EventKind::FocusIn, EventKind::FocusOut],
                TooltipTrigger::Click => &[EventKind::Click],
            };
            for &kind in kinds {
                ui.listeners.bind(owner, trigger, kind);
            }
        }
        core.lifecycle.after(emit, Operation::Initialize, Some(core.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        let core = Rc::clone(&self.core);
        core.lifecycle.before(emit, Operation::Destroy, Some(core.scope));
        ui.listeners.unbind_owner(core.lifecycle.id());
        for trigger in core.triggers(&ui.doc) {
            Core::cancel_pending(ui, trigger);
            if let Some(tip) = core.active(ui, trigger) {
                ui.data.remove::<ActiveTooltip>(trigger);
                ui.doc.remove_attr(trigger, "aria-describedby");
                ui.remove_element(tip);
            }
        }
        core.lifecycle.after(emit, Operation::Destroy, Some(core.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        let core = Rc::clone(&self.core);
        let Some(trigger) = ui.listeners.route(core.lifecycle.id(), &ui.doc, event) else {
            return false;
        };
        match event {
            Event::PointerEnter { .. } | Event::FocusIn { .. } => core.delayed(ui, trigger, true),
            Event::PointerLeave { .. } | Event::FocusOut { .. } => core.delayed(ui, trigger, false),
            Event::Click { .. } => {
                self.toggle(ui, trigger);
            }
            _ => return false,
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
    use trellis_core::geometry::Rect;

    fn setup(attrs: &[(&str, &str)]) -> (Ui, ElementId) {
        let mut ui = Ui::new();
        let mut b = ui
            .doc
            .build("button")
            .attr("data-tooltip", "Save the file")
            .rect(Rect::new(100, 100, 40, 20));
        for (k, v) in attrs {
            b = b.attr(k, *v);
        }
        let trigger = b.append_to_body();
        (ui, trigger)
    }

    fn quiet() -> TooltipSettings {
        TooltipSettings {
            animation: false,
            ..TooltipSettings::default()
        }
    }

    #[test]
    fn hover_inserts_and_leave_removes() {
        let (mut ui, trigger) = setup(&[]);
        let mut t = Tooltip::new(ui.doc.body(), quiet()).expect("valid");
        t.initialize(&mut ui);
        assert!(t.handle_event(&mut ui, &Event::PointerEnter { target: trigger }));
        let tip = t.tooltip_of(&ui, trigger).expect("tooltip shown");
        assert!(ui.doc.has_class(tip, "tooltip-top"));
        assert!(ui.doc.has_class(tip, IS_ACTIVE));
        assert_eq!(ui.doc.text(tip), Some("Save the file"));
        assert_eq!(ui.doc.attr(tip, "data-placement"), Some("top"));
        assert!(ui.doc.attr(trigger, "aria-describedby").is_some());

        t.handle_event(&mut ui, &Event::PointerLeave { target: trigger });
        assert!(!ui.doc.exists(tip));
        assert!(t.tooltip_of(&ui, trigger).is_none());
    }

    #[test]
    fn title_is_the_fallback_text_and_modifiers_apply() {
        let (mut ui, trigger) = setup(&[("title", "From title"), ("data-color", "dark"), ("data-position", "left")]);
        ui.doc.set_attr(trigger, "data-tooltip", "");
        let mut t = Tooltip::new(ui.doc.body(), quiet()).expect("valid");
        t.initialize(&mut ui);
        t.insert(&mut ui, trigger);
        let tip = t.tooltip_of(&ui, trigger).expect("shown");
        assert_eq!(ui.doc.text(tip), Some("From title"));
        assert!(ui.doc.has_class(tip, "tooltip-dark"));
        assert!(ui.doc.has_class(tip, "tooltip-left"));
    }

    #[test]
    fn duration_removes_after_elapsed_time() {
        let (mut ui, trigger) = setup(&[]);
        let settings = TooltipSettings {
            duration: 2000,
            ..quiet()
        };
        let mut t = Tooltip::new(ui.doc.body(), settings).expect("valid");
        t.initialize(&mut ui);
        t.insert(&mut ui, trigger);
        ui.advance(Duration::from_millis(1999));
        assert!(t.tooltip_of(&ui, trigger).is_some());
        ui.advance(Duration::from_millis(1));
        assert!(t.tooltip_of(&ui, trigger).is_none());
    }

    #[test]
    fn stale_duration_timer_spares_newer_tooltip() {
        let (mut ui, trigger) = setup(&[]);
        let settings = TooltipSettings {
            duration: 1000,
            ..quiet()
        };
        let mut t = Tooltip::new(ui.doc.body(), settings).expect("valid");
        t.initialize(&mut ui);
        t.insert(&mut ui, trigger);
        ui.advance(Duration::from_millis(600));
        t.remove(&mut ui, trigger);
        t.insert(&mut ui, trigger);
        let second = t.tooltip_of(&ui, trigger).expect("second tooltip");
        ui.advance(Duration::from_millis(500));
        assert!(ui.doc.exists(second));
        ui.advance(Duration::from_millis(500));
        assert!(!ui.doc.exists(second));
    }

    #[test]
    fn delay_in_is_cancelled_by_leave() {
        let (mut ui, trigger) = setup(&[]);
        let settings = TooltipSettings {
            delay_in: 300,
            ..quiet()
        };
        let mut t = Tooltip::new(ui.doc.body(), settings).expect("valid");
        t.initialize(&mut ui);
        t.handle_event(&mut ui, &Event::PointerEnter { target: trigger });
        ui.advance(Duration::from_millis(100));
        t.handle_event(&mut ui, &Event::PointerLeave { target: trigger });
        ui.advance(Duration::from_millis(500));
        assert!(t.tooltip_of(&ui, trigger).is_none());
    }

    #[test]
    fn click_trigger_toggles_with_animation() {
        let (mut ui, trigger) = setup(&[]);
        let settings = TooltipSettings {
            trigger: TooltipTrigger::Click,
            ..TooltipSettings::default()
        };
        let mut t = Tooltip::new(ui.doc.body(), settings).expect("valid");
        t.initialize(&mut ui);
        assert!(!t.handle_event(&mut ui, &Event::PointerEnter { target: trigger }));
        t.handle_event(&mut ui, &Event::click(trigger));
        let tip = t.tooltip_of(&ui, trigger).expect("shown");
        assert!(ui.doc.has_class(tip, "tooltip-in"));
        ui.animation_end(tip);
        assert!(ui.doc.has_class(tip, IS_ACTIVE));
        t.handle_event(&mut ui, &Event::click(trigger));
        assert!(ui.doc.has_class(tip, "tooltip-out"));
        ui.animation_end(tip);
        assert!(!ui.doc.exists(tip));
    }

    #[test]
    fn destroy_drops_live_tooltips() {
        let (mut ui, trigger) = setup(&[]);
        let mut t = Tooltip::new(ui.doc.body(), quiet()).expect("valid");
        t.initialize(&mut ui);
        t.insert(&mut ui, trigger);
        let tip = t.tooltip_of(&ui, trigger).expect("shown");
        t.destroy(&mut ui);
        assert!(!ui.doc.exists(tip));
        assert_eq!(ui.listeners.count(t.id()), 0);
    }
}
