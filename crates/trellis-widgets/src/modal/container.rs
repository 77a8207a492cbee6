#![forbid(unsafe_code)]

//! Modal widget: `[data-modal]` triggers open a transient overlay frame.
//!
//! Content comes from the trigger (`data-modal-title`, `data-modal-content`,
//! or a `data-modal-source` template whose children are cloned into the
//! body) or from a [`ModalContent`] passed to [`Modal::open`].
//!
//! Opening is refused while any modal-class overlay holds the guard; the
//! refused request publishes nothing. The modal closes through its close
//! button, an overlay click (`closeOnOverlayClick`), Escape
//! (`closeOnEscape`) or [`Modal::close`].

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::Ui;

use super::frame::Frame;
use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Emit, Lifecycle, Operation, TrapKey};
use crate::settings::{Options, Settings, selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModalSettings {
    pub selector: String,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub close_on_overlay_click: bool,
    pub close_on_escape: bool,
}

impl Default for ModalSettings {
    fn default() -> Self {
        Self {
            selector: "[data-modal]".into(),
            animation: true,
            animation_in: "modal-in".into(),
            animation_out: "modal-out".into(),
            close_on_overlay_click: true,
            close_on_escape: true,
        }
    }
}

impl Settings for ModalSettings {
    const NAME: &'static str = "modal";
}

/// What a modal shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalContent {
    pub title: String,
    pub text: String,
    /// Template whose children are cloned into the modal body.
    pub source: Option<ElementId>,
}

impl ModalContent {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn template(mut self, source: ElementId) -> Self {
        self.source = Some(source);
        self
    }

    /// Read content from a trigger's `data-modal-*` attributes.
    pub fn from_trigger(doc: &Document, trigger: ElementId) -> Self {
        let attr = |name: &str| doc.attr(trigger, name).unwrap_or_default().to_owned();
        Self {
            title: attr("data-modal-title"),
            text: attr("data-modal-content"),
            source: doc
                .attr(trigger, "data-modal-source")
                .filter(|s| !s.trim().is_empty())
                .and_then(|s| doc.resolve_target(s)),
        }
    }
}

#[derive(Debug, Clone)]
struct Current {
    frame: Frame,
    settings: ModalSettings,
    trigger: Option<ElementId>,
}

#[derive(Debug)]
pub struct Modal {
    scope: ElementId,
    settings: ModalSettings,
    lifecycle: Lifecycle,
    trigger: Selector,
    current: Option<Current>,
}

impl Modal {
    pub fn new(scope: ElementId, settings: ModalSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            trigger: selector(&settings.selector)?,
            settings,
            lifecycle: Lifecycle::new(ModalSettings::NAME),
            current: None,
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, ModalSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &ModalSettings {
        &self.settings
    }

    pub fn triggers(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.trigger)
    }

    /// Root of the open (or closing) modal.
    pub fn frame(&self, ui: &Ui) -> Option<Frame> {
        self.current
            .as_ref()
            .map(|c| c.frame)
            .filter(|f| ui.doc.exists(f.root))
    }

    /// Open and not closing.
    pub fn is_open(&self, ui: &Ui) -> bool {
        self.frame(ui).is_some_and(|f| Frame::is_open(ui, f.root))
    }

    pub fn open(&mut self, ui: &mut Ui, content: ModalContent) -> bool {
        let settings = self.settings.clone();
        self.open_with(ui, content, settings, None, Emit::Notify)
    }

    pub fn open_silently(&mut self, ui: &mut Ui, content: ModalContent) -> bool {
        let settings = self.settings.clone();
        self.open_with(ui, content, settings, None, Emit::Silent)
    }

    pub fn open_from(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.open_from_with(ui, trigger, Emit::Notify)
    }

    pub fn open_from_silently(&mut self, ui: &mut Ui, trigger: ElementId) -> bool {
        self.open_from_with(ui, trigger, Emit::Silent)
    }

    /// Open with content and `data-*` overrides taken from `trigger`.
    pub fn open_from_with(&mut self, ui: &mut Ui, trigger: ElementId, emit: Emit) -> bool {
        let content = ModalContent::from_trigger(&ui.doc, trigger);
        let settings = self.settings.with_data_overrides(&ui.doc, trigger);
        self.open_with(ui, content, settings, Some(trigger), emit)
    }

    fn open_with(
        &mut self,
        ui: &mut Ui,
        content: ModalContent,
        settings: ModalSettings,
        trigger: Option<ElementId>,
        emit: Emit,
    ) -> bool {
        if ui.overlays.is_open() {
            tracing::debug!(widget = self.lifecycle.kind(), "overlay open; modal request ignored");
            return false;
        }
        self.lifecycle.before(emit, Operation::Open, trigger);
        let Some(ticket) = ui.overlays.try_acquire(&mut ui.doc, self.id()) else {
            return false;
        };
        let frame = Frame::build(&mut ui.doc, None, &content.title);
        if !content.text.is_empty() {
            ui.doc.set_text(frame.body, content.text);
        }
        if let Some(source) = content.source {
            ui.doc.clone_children_into(source, frame.body);
        }
        if let Some(t) = trigger {
            ui.doc.set_attr(t, "aria-expanded", "true");
        }
        let owner = self.id();
        ui.listeners.bind(owner, frame.close, EventKind::Click);
        if settings.close_on_overlay_click {
            ui.listeners.bind(owner, frame.overlay, EventKind::Click);
        }
        let root = ui.doc.root();
        ui.listeners.bind(owner, root, EventKind::KeyDown);

        let lifecycle = self.lifecycle.clone();
        frame.open(
            ui,
            ticket,
            &AnimationSpec::from_settings(settings.animation, &settings.animation_in),
            move |_| lifecycle.after(emit, Operation::Open, trigger),
        );
        tracing::debug!(element = %frame.root, "modal opened");
        self.current = Some(Current {
            frame,
            settings,
            trigger,
        });
        true
    }

    pub fn close(&mut self, ui: &mut Ui) -> bool {
        self.close_with(ui, Emit::Notify)
    }

    pub fn close_silently(&mut self, ui: &mut Ui) -> bool {
        self.close_with(ui, Emit::Silent)
    }

    pub fn close_with(&mut self, ui: &mut Ui, emit: Emit) -> bool {
        let Some(Current {
            frame,
            settings,
            trigger,
        }) = self.current.clone()
        else {
            return false;
        };
        if !Frame::is_open(ui, frame.root) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Close, trigger);
        let root = ui.doc.root();
        ui.listeners.unbind(self.id(), root, EventKind::KeyDown);
        if let Some(t) = trigger {
            ui.doc.set_attr(t, "aria-expanded", "false");
        }
        let lifecycle = self.lifecycle.clone();
        Frame::close(
            ui,
            frame.root,
            &AnimationSpec::from_settings(settings.animation, &settings.animation_out),
            move |_| lifecycle.after(emit, Operation::Close, trigger),
        )
    }
}

impl Widget for Modal {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for trigger in self.triggers(&ui.doc) {
            ui.doc.set_attr(trigger, "aria-haspopup", "dialog");
            ui.listeners.bind(self.id(), trigger, EventKind::Click);
        }
        self.lifecycle.after(emit, Operation::Initialize, Some(self.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Destroy, Some(self.scope));
        ui.listeners.unbind_owner(self.id());
        if let Some(current) = self.current.take() {
            Frame::discard(ui, current.frame.root);
        }
        self.lifecycle.after(emit, Operation::Destroy, Some(self.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        let Some(bound) = ui.listeners.route(self.id(), &ui.doc, event) else {
            return false;
        };
        match event {
            Event::Key { key, .. } => {
                let Some(current) = self.current.clone() else {
                    return false;
                };
                match Frame::trap_key(ui, current.frame.root, key) {
                    TrapKey::Consumed => true,
                    TrapKey::Escape if current.settings.close_on_escape => self.close(ui),
                    TrapKey::Escape | TrapKey::Ignored => false,
                }
            }
            Event::Click { .. } => {
                if self.trigger.matches(&ui.doc, bound) {
                    return self.open_from(ui, bound);
                }
                let dismiss = self
                    .current
                    .as_ref()
                    .is_some_and(|c| bound == c.frame.close || bound == c.frame.overlay);
                dismiss && self.close(ui)
            }
            _ => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::event::{KeyCode, Modifiers};
    use trellis_runtime::HAS_OVERLAY;

    fn quiet() -> ModalSettings {
        ModalSettings {
            animation: false,
            ..ModalSettings::default()
        }
    }

    fn setup() -> (Ui, ElementId) {
        let mut ui = Ui::new();
        let trigger = ui
            .doc
            .build("button")
            .attr("data-modal", "")
            .attr("data-modal-title", "Terms")
            .attr("data-modal-content", "Read carefully.")
            .append_to_body();
        (ui, trigger)
    }

    #[test]
    fn trigger_opens_and_close_button_closes() {
        let (mut ui, trigger) = setup();
        ui.doc.focus(trigger);
        let mut m = Modal::new(ui.doc.body(), ModalSettings::default()).expect("valid");
        m.initialize(&mut ui);
        assert!(m.handle_event(&mut ui, &Event::click(trigger)));
        let frame = m.frame(&ui).expect("open");
        assert!(ui.doc.has_class(ui.doc.root(), HAS_OVERLAY));
        assert_eq!(ui.doc.text(frame.body), Some("Read carefully."));
        assert_eq!(ui.doc.text_content(frame.header), "Terms");
        assert_eq!(ui.doc.focused(), Some(frame.close));
        ui.animation_end(frame.root);

        assert!(m.handle_event(&mut ui, &Event::click(frame.close)));
        assert!(!m.is_open(&ui));
        assert!(ui.overlays.is_open());
        ui.animation_end(frame.root);
        assert!(!ui.doc.exists(frame.root));
        assert!(!ui.doc.has_class(ui.doc.root(), HAS_OVERLAY));
        assert_eq!(ui.doc.focused(), Some(trigger));
    }

    #[test]
    fn second_overlay_request_is_ignored() {
        let (mut ui, trigger) = setup();
        let mut a = Modal::new(ui.doc.body(), quiet()).expect("valid");
        let mut b = Modal::new(ui.doc.body(), quiet()).expect("valid");
        a.initialize(&mut ui);
        assert!(a.open_from(&mut ui, trigger));
        let before = ui.doc.len();
        assert!(!b.open(&mut ui, ModalContent::new("Other", "")));
        assert_eq!(ui.doc.len(), before);
        assert_eq!(ui.overlays.holder(), Some(a.id()));
        assert!(a.close(&mut ui));
        assert!(b.open(&mut ui, ModalContent::new("Other", "")));
    }

    #[test]
    fn overlay_click_and_escape_respect_settings() {
        let (mut ui, trigger) = setup();
        let settings = ModalSettings {
            close_on_overlay_click: false,
            ..quiet()
        };
        let mut m = Modal::new(ui.doc.body(), settings).expect("valid");
        m.initialize(&mut ui);
        m.open_from(&mut ui, trigger);
        let frame = m.frame(&ui).expect("open");
        assert!(!m.handle_event(&mut ui, &Event::click(frame.overlay)));
        assert!(m.is_open(&ui));
        assert!(m.handle_event(&mut ui, &Event::key(frame.close, KeyCode::Escape)));
        assert!(m.frame(&ui).is_none());
    }

    #[test]
    fn data_attribute_disables_escape_for_that_trigger() {
        let (mut ui, trigger) = setup();
        ui.doc.set_attr(trigger, "data-close-on-escape", "false");
        let mut m = Modal::new(ui.doc.body(), quiet()).expect("valid");
        m.initialize(&mut ui);
        m.open_from(&mut ui, trigger);
        let body = ui.doc.body();
        assert!(!m.handle_event(&mut ui, &Event::key(body, KeyCode::Escape)));
        assert!(m.is_open(&ui));
    }

    #[test]
    fn template_children_are_cloned_and_tab_cycles() {
        let (mut ui, _) = setup();
        let template = ui.doc.build("template").attr("id", "tpl").append_to_body();
        ui.doc.build("input").attr("name", "email").append_to(template);
        let mut m = Modal::new(ui.doc.body(), quiet()).expect("valid");
        m.initialize(&mut ui);
        m.open(&mut ui, ModalContent::new("Sign up", "").template(template));
        let frame = m.frame(&ui).expect("open");
        let fields = ui.doc.focusable_within(frame.body);
        assert_eq!(fields.len(), 1);
        assert_eq!(ui.doc.focused(), Some(fields[0]));

        let tab = Event::key(fields[0], KeyCode::Tab);
        assert!(m.handle_event(&mut ui, &tab));
        assert_eq!(ui.doc.focused(), Some(frame.close));
        assert!(m.handle_event(&mut ui, &tab));
        assert_eq!(ui.doc.focused(), Some(fields[0]));
        let back = Event::key_with(fields[0], KeyCode::Tab, Modifiers::SHIFT);
        m.handle_event(&mut ui, &back);
        assert_eq!(ui.doc.focused(), Some(frame.close));
    }

    #[test]
    fn destroy_discards_open_frame() {
        let (mut ui, trigger) = setup();
        let mut m = Modal::new(ui.doc.body(), ModalSettings::default()).expect("valid");
        m.initialize(&mut ui);
        m.open_from(&mut ui, trigger);
        let frame = m.frame(&ui).expect("open");
        m.destroy(&mut ui);
        assert!(!ui.doc.exists(frame.root));
        assert!(!ui.overlays.is_open());
        assert_eq!(ui.listeners.count(m.id()), 0);
    }
}
