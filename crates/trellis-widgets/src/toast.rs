#![forbid(unsafe_code)]

//! Toast notifications.
//!
//! [`Toaster::show`] inserts a `.toast` into the `.toast-container` for its
//! position, creating the container under `body` on first use:
//!
//! ```text
//! body > .toast-container.toast-container-<position>[data-position]
//!          .toast.toast-<feedback>
//!            .toast-title     (optional)
//!            .toast-message
//!            button.toast-close   (closeable only)
//! ```
//!
//! A toast with a non-zero `duration` dismisses itself when its timer
//! fires, unless it was already dismissed. When a container holds more than
//! `maxToasts` live toasts the oldest are dismissed. Containers left empty
//! are removed.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::{Duration, OwnerId, TimerId, Ui};

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{
    AnimationSpec, Direction, Emit, IS_ANIMATING_OUT, Lifecycle, Operation, Transition,
};
use crate::removal::remove_animated;
use crate::settings::{Options, Settings};

pub const IS_ACTIVE: &str = "is-active";

/// Screen corner or edge a toast stacks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl ToastPosition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Visual variant of a toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl Feedback {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// ARIA role announced for this variant.
    const fn role(self) -> &'static str {
        match self {
            Self::Error | Self::Warning => "alert",
            Self::Success | Self::Info => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToasterSettings {
    pub position: ToastPosition,
    pub feedback: Feedback,
    /// Auto-dismiss delay in milliseconds; 0 keeps the toast until closed.
    pub duration: u64,
    pub closeable: bool,
    /// Live toasts per container before the oldest is dismissed.
    pub max_toasts: usize,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
}

impl Default for ToasterSettings {
    fn default() -> Self {
        Self {
            position: ToastPosition::TopRight,
            feedback: Feedback::Info,
            duration: 3000,
            closeable: true,
            max_toasts: 5,
            animation: true,
            animation_in: "toast-in".into(),
            animation_out: "toast-out".into(),
        }
    }
}

impl Settings for ToasterSettings {
    const NAME: &'static str = "toast";
}

/// Per-toast overrides of the toaster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToastOptions {
    pub title: Option<String>,
    pub feedback: Option<Feedback>,
    pub position: Option<ToastPosition>,
    pub duration: Option<u64>,
    pub closeable: Option<bool>,
}

impl ToastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    #[must_use]
    pub fn position(mut self, position: ToastPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Auto-dismiss after `ms` milliseconds.
    #[must_use]
    pub fn duration(mut self, ms: u64) -> Self {
        self.duration = Some(ms);
        self
    }

    /// Never auto-dismiss.
    #[must_use]
    pub fn sticky(self) -> Self {
        self.duration(0)
    }

    #[must_use]
    pub fn closeable(mut self, closeable: bool) -> Self {
        self.closeable = Some(closeable);
        self
    }
}

/// Marks a toast element and its owner.
#[derive(Debug, Clone, Copy)]
struct ToastRecord {
    owner: OwnerId,
    timer: Option<TimerId>,
}

#[derive(Debug)]
struct Core {
    scope: ElementId,
    settings: ToasterSettings,
    lifecycle: Lifecycle,
    container: Selector,
    toast: Selector,
}

impl Core {
    fn container_for(&self, doc: &Document, position: ToastPosition) -> Option<ElementId> {
        doc.children_matching(doc.body(), &self.container)
            .into_iter()
            .find(|&c| doc.attr(c, "data-position") == Some(position.as_str()))
    }

    fn ensure_container(&self, doc: &mut Document, position: ToastPosition) -> ElementId {
        if let Some(c) = self.container_for(doc, position) {
            return c;
        }
        doc.build("div")
            .class(&format!("toast-container toast-container-{}", position.as_str()))
            .attr("data-position", position.as_str())
            .attr("aria-live", "polite")
            .append_to_body()
    }

    fn owns(&self, ui: &Ui, toast: ElementId) -> bool {
        ui.data
            .get::<ToastRecord>(toast)
            .is_some_and(|r| r.owner == self.lifecycle.id())
    }

    /// Toasts of this instance that are not already leaving.
    fn live(&self, ui: &Ui, container: ElementId) -> Vec<ElementId> {
        ui.doc
            .children_matching(container, &self.toast)
            .into_iter()
            .filter(|&t| self.owns(ui, t) && !ui.doc.has_class(t, IS_ANIMATING_OUT))
            .collect()
    }

    fn show(self: &Rc<Self>, ui: &mut Ui, message: &str, options: &ToastOptions, emit: Emit) -> ElementId {
        let s = &self.settings;
        let feedback = options.feedback.unwrap_or(s.feedback);
        let position = options.position.unwrap_or(s.position);
        let duration = options.duration.unwrap_or(s.duration);
        let closeable = options.closeable.unwrap_or(s.closeable);

        let container = self.ensure_container(&mut ui.doc, position);
        self.lifecycle.before(emit, Operation::Insert, Some(container));
        let toast = ui
            .doc
            .build("div")
            .class(&format!("toast toast-{}", feedback.as_str()))
            .attr("role", feedback.role())
            .append_to(container);
        if let Some(title) = options.title.as_deref().filter(|t| !t.trim().is_empty()) {
            ui.doc.build("div").class("toast-title").text(title).append_to(toast);
        }
        ui.doc.build("div").class("toast-message").text(message).append_to(toast);
        if closeable {
            let close = ui
                .doc
                .build("button")
                .class("toast-close")
                .attr("type", "button")
                .attr("aria-label", "Close")
                .append_to(toast);
            ui.listeners.bind(self.lifecycle.id(), close, EventKind::Click);
        }

        let timer = (duration > 0).then(|| {
            let core = Rc::clone(self);
            ui.schedule(Duration::from_millis(duration), move |ui| {
                if let Some(record) = ui.data.get_mut::<ToastRecord>(toast) {
                    record.timer = None;
                }
                core.dismiss(ui, toast, emit);
            })
        });
        ui.data.insert(
            toast,
            ToastRecord {
                owner: self.lifecycle.id(),
                timer,
            },
        );
        tracing::debug!(element = %toast, position = position.as_str(), duration_ms = duration, "toast shown");

        let lifecycle = self.lifecycle.clone();
        Transition::on(toast)
            .add(IS_ACTIVE)
            .animate(&AnimationSpec::from_settings(s.animation, &s.animation_in), Direction::In)
            .run(ui, move |_| lifecycle.after(emit, Operation::Insert, Some(toast)));

        let live = self.live(ui, container);
        let max = s.max_toasts.max(1);
        if live.len() > max {
            for &oldest in &live[..live.len() - max] {
                tracing::debug!(element = %oldest, "evicting toast");
                self.dismiss(ui, oldest, emit);
            }
        }
        toast
    }

    fn dismiss(&self, ui: &mut Ui, toast: ElementId, emit: Emit) -> bool {
        if !self.owns(ui, toast) || ui.doc.has_class(toast, IS_ANIMATING_OUT) {
            return false;
        }
        if let Some(id) = ui.data.get::<ToastRecord>(toast).and_then(|r| r.timer) {
            ui.cancel(id);
        }
        self.lifecycle.before(emit, Operation::Remove, Some(toast));
        let container = ui.doc.parent(toast);
        let lifecycle = self.lifecycle.clone();
        let out = AnimationSpec::from_settings(self.settings.animation, &self.settings.animation_out);
        if ui.doc.has_class(toast, crate::lifecycle::IS_ANIMATING) {
            ui.remove_element(toast);
            drop_empty(ui, container);
            lifecycle.after(emit, Operation::Remove, Some(toast));
            return true;
        }
        ui.doc.remove_class(toast, IS_ACTIVE);
        remove_animated(ui, toast, &out, move |ui| {
            drop_empty(ui, container);
            lifecycle.after(emit, Operation::Remove, Some(toast));
        });
        true
    }

    fn all(&self, ui: &Ui) -> Vec<ElementId> {
        ui.data
            .elements_with::<ToastRecord>()
            .into_iter()
            .filter(|&t| self.owns(ui, t) && ui.doc.exists(t))
            .collect()
    }
}

fn drop_empty(ui: &mut Ui, container: Option<ElementId>) {
    if let Some(c) = container
        && ui.doc.exists(c)
        && ui.doc.children(c).is_empty()
    {
        ui.remove_element(c);
    }
}

#[derive(Debug)]
pub struct Toaster {
    core: Rc<Core>,
}

impl Toaster {
    pub fn new(scope: ElementId, settings: ToasterSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            core: Rc::new(Core {
                scope,
                settings,
                lifecycle: Lifecycle::new(ToasterSettings::NAME),
                container: crate::settings::selector(".toast-container")?,
                toast: crate::settings::selector(".toast")?,
            }),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, ToasterSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &ToasterSettings {
        &self.core.settings
    }

    /// Show `message`; returns the toast element.
    pub fn show(&mut self, ui: &mut Ui, message: &str, options: ToastOptions) -> ElementId {
        self.core.show(ui, message, &options, Emit::Notify)
    }

    pub fn show_silently(&mut self, ui: &mut Ui, message: &str, options: ToastOptions) -> ElementId {
        self.core.show(ui, message, &options, Emit::Silent)
    }

    pub fn dismiss(&mut self, ui: &mut Ui, toast: ElementId) -> bool {
        self.core.dismiss(ui, toast, Emit::Notify)
    }

    pub fn dismiss_silently(&mut self, ui: &mut Ui, toast: ElementId) -> bool {
        self.core.dismiss(ui, toast, Emit::Silent)
    }

    pub fn dismiss_all(&mut self, ui: &mut Ui) -> usize {
        self.dismiss_all_with(ui, Emit::Notify)
    }

    pub fn dismiss_all_silently(&mut self, ui: &mut Ui) -> usize {
        self.dismiss_all_with(ui, Emit::Silent)
    }

    /// Dismiss every live toast; returns how many started leaving.
    pub fn dismiss_all_with(&mut self, ui: &mut Ui, emit: Emit) -> usize {
        let core = Rc::clone(&self.core);
        core.all(ui)
            .into_iter()
            .filter(|&t| core.dismiss(ui, t, emit))
            .count()
    }

    /// Live toasts of this instance, in creation order.
    pub fn toasts(&self, ui: &Ui) -> Vec<ElementId> {
        self.core.all(ui)
    }

    /// The container for `position`, if one exists.
    pub fn container(&self, doc: &Document, position: ToastPosition) -> Option<ElementId> {
        self.core.container_for(doc, position)
    }
}

impl Widget for Toaster {
    fn lifecycle(&self) -> &Lifecycle {
        &self.core.lifecycle
    }

    fn initialize_with(&mut self, _ui: &mut Ui, emit: Emit) {
        let core = &self.core;
        core.lifecycle.before(emit, Operation::Initialize, Some(core.scope));
        core.lifecycle.after(emit, Operation::Initialize, Some(core.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        let core = Rc::clone(&self.core);
        core.lifecycle.before(emit, Operation::Destroy, Some(core.scope));
        ui.listeners.unbind_owner(core.lifecycle.id());
        for toast in core.all(ui) {
            if let Some(id) = ui.data.get::<ToastRecord>(toast).and_then(|r| r.timer) {
                ui.cancel(id);
            }
            let container = ui.doc.parent(toast);
            ui.remove_element(toast);
            drop_empty(ui, container);
        }
        core.lifecycle.after(emit, Operation::Destroy, Some(core.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        if event.kind() != EventKind::Click {
            return false;
        }
        let core = Rc::clone(&self.core);
        let Some(close) = ui.listeners.route(core.lifecycle.id(), &ui.doc, event) else {
            return false;
        };
        match ui.doc.closest(close, &core.toast) {
            Some(toast) => core.dismiss(ui, toast, Emit::Notify),
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
