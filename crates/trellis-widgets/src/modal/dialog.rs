#![forbid(unsafe_code)]

//! Dialog presets on the modal frame: alert, confirm and prompt.
//!
//! - Alert: message + OK.
//! - Confirm: message + OK / Cancel.
//! - Prompt: message + text input + OK / Cancel. Enter submits.
//!
//! The outcome of each open/close cycle is published exactly once on the
//! result channel ([`Dialog::on_result`]), after the close has settled and
//! the overlay guard is free again. Silent mode suppresses lifecycle events
//! only; results are always published.

use serde::{Deserialize, Serialize};
use trellis_core::dom::ElementId;
use trellis_core::event::{Event, EventKind, KeyCode, KeyEvent};
use trellis_runtime::{Hooks, Subscription, Ui};
use unicode_segmentation::UnicodeSegmentation;

use super::frame::Frame;
use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Emit, Lifecycle, Operation, TrapKey};
use crate::settings::{Options, Settings};

/// Dialog preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
}

impl DialogKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Confirm => "confirm",
            Self::Prompt => "prompt",
        }
    }
}

/// How a dialog cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// OK on an alert or confirm.
    Ok,
    Cancel,
    /// Closed without choosing: close button, overlay click, Escape, API.
    Dismissed,
    /// OK on a prompt, with the entered text.
    Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DialogSettings {
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub close_on_overlay_click: bool,
    pub close_on_escape: bool,
    pub ok_label: String,
    pub cancel_label: String,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            animation: true,
            animation_in: "modal-in".into(),
            animation_out: "modal-out".into(),
            close_on_overlay_click: false,
            close_on_escape: true,
            ok_label: "OK".into(),
            cancel_label: "Cancel".into(),
        }
    }
}

impl Settings for DialogSettings {
    const NAME: &'static str = "dialog";
}

/// Editable prompt text with a grapheme-aligned cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptBuffer {
    text: String,
    /// Byte offset, always on a grapheme boundary.
    cursor: usize,
}

impl PromptBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole value, cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        // A combining mark may have merged with the previous grapheme.
        self.cursor = self.boundary_at_or_after(self.cursor);
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
    }

    fn boundary_at_or_after(&self, at: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .map(|(i, g)| i + g.len())
            .find(|&end| end >= at)
            .unwrap_or(0)
    }

    /// Delete the grapheme before the cursor.
    pub fn backspace(&mut self) -> bool {
        let Some(start) = self.prev_boundary() else {
            return false;
        };
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    /// Delete the grapheme after the cursor.
    pub fn delete(&mut self) -> bool {
        let Some(end) = self.next_boundary() else {
            return false;
        };
        self.text.replace_range(self.cursor..end, "");
        true
    }

    pub fn left(&mut self) {
        if let Some(start) = self.prev_boundary() {
            self.cursor = start;
        }
    }

    pub fn right(&mut self) {
        if let Some(end) = self.next_boundary() {
            self.cursor = end;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Apply an editing key. Returns whether the key was an edit or
    /// cursor movement.
    pub fn apply(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => {
                self.backspace();
            }
            KeyCode::Delete => {
                self.delete();
            }
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
struct Current {
    frame: Frame,
    kind: DialogKind,
    ok: ElementId,
    cancel: Option<ElementId>,
    input: Option<ElementId>,
}

#[derive(Debug)]
pub struct Dialog {
    scope: ElementId,
    settings: DialogSettings,
    lifecycle: Lifecycle,
    results: Hooks<DialogOutcome>,
    current: Option<Current>,
    buffer: PromptBuffer,
}

impl Dialog {
    pub fn new(scope: ElementId, settings: DialogSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            settings,
            lifecycle: Lifecycle::new(DialogSettings::NAME),
            results: Hooks::new(),
            current: None,
            buffer: PromptBuffer::default(),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, DialogSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &DialogSettings {
        &self.settings
    }

    /// Receive the outcome of every cycle.
    pub fn on_result(&self, f: impl Fn(&DialogOutcome) + 'static) -> Subscription {
        self.results.subscribe(f)
    }

    pub fn results(&self) -> &Hooks<DialogOutcome> {
        &self.results
    }

    pub fn frame(&self, ui: &Ui) -> Option<Frame> {
        self.current
            .as_ref()
            .map(|c| c.frame)
            .filter(|f| ui.doc.exists(f.root))
    }

    pub fn kind(&self) -> Option<DialogKind> {
        self.current.as_ref().map(|c| c.kind)
    }

    pub fn is_open(&self, ui: &Ui) -> bool {
        self.frame(ui).is_some_and(|f| Frame::is_open(ui, f.root))
    }

    /// Current prompt text.
    pub fn value(&self) -> &str {
        self.buffer.text()
    }

    pub fn alert(&mut self, ui: &mut Ui, title: &str, message: &str) -> bool {
        self.open_with(ui, DialogKind::Alert, title, message, "", Emit::Notify)
    }

    pub fn alert_silently(&mut self, ui: &mut Ui, title: &str, message: &str) -> bool {
        self.open_with(ui, DialogKind::Alert, title, message, "", Emit::Silent)
    }

    pub fn confirm(&mut self, ui: &mut Ui, title: &str, message: &str) -> bool {
        self.open_with(ui, DialogKind::Confirm, title, message, "", Emit::Notify)
    }

    pub fn confirm_silently(&mut self, ui: &mut Ui, title: &str, message: &str) -> bool {
        self.open_with(ui, DialogKind::Confirm, title, message, "", Emit::Silent)
    }

    pub fn prompt(&mut self, ui: &mut Ui, title: &str, message: &str, initial: &str) -> bool {
        self.open_with(ui, DialogKind::Prompt, title, message, initial, Emit::Notify)
    }

    pub fn prompt_silently(&mut self, ui: &mut Ui, title: &str, message: &str, initial: &str) -> bool {
        self.open_with(ui, DialogKind::Prompt, title, message, initial, Emit::Silent)
    }

    fn open_with(
        &mut self,
        ui: &mut Ui,
        kind: DialogKind,
        title: &str,
        message: &str,
        initial: &str,
        emit: Emit,
    ) -> bool {
        if ui.overlays.is_open() {
            tracing::debug!(dialog = kind.as_str(), "overlay open; dialog request ignored");
            return false;
        }
        self.lifecycle.before(emit, Operation::Open, None);
        let Some(ticket) = ui.overlays.try_acquire(&mut ui.doc, self.id()) else {
            return false;
        };
        let s = &self.settings;
        let doc = &mut ui.doc;
        let frame = Frame::build(doc, Some(kind.as_str()), title);
        doc.build("p").class("modal-message").text(message).append_to(frame.body);
        let input = (kind == DialogKind::Prompt).then(|| {
            doc.build("input")
                .class("modal-input")
                .attr("type", "text")
                .attr("value", initial)
                .append_to(frame.body)
        });
        let footer = frame.footer(doc);
        let ok = doc
            .build("button")
            .class("modal-ok")
            .attr("type", "button")
            .text(s.ok_label.as_str())
            .append_to(footer);
        let cancel = (kind != DialogKind::Alert).then(|| {
            doc.build("button")
                .class("modal-cancel")
                .attr("type", "button")
                .text(s.cancel_label.as_str())
                .append_to(footer)
        });

        let owner = self.id();
        let clickable = [Some(ok), cancel, Some(frame.close)];
        for el in clickable.into_iter().flatten() {
            ui.listeners.bind(owner, el, EventKind::Click);
        }
        if s.close_on_overlay_click {
            ui.listeners.bind(owner, frame.overlay, EventKind::Click);
        }
        if let Some(input) = input {
            ui.listeners.bind(owner, input, EventKind::Input);
        }
        let root = ui.doc.root();
        ui.listeners.bind(owner, root, EventKind::KeyDown);

        self.buffer = PromptBuffer::new(initial);
        let lifecycle = self.lifecycle.clone();
        let animation = AnimationSpec::from_settings(s.animation, &s.animation_in);
        frame.open(ui, ticket, &animation, move |_| {
            lifecycle.after(emit, Operation::Open, None);
        });
        self.current = Some(Current {
            frame,
            kind,
            ok,
            cancel,
            input,
        });
        true
    }

    /// Close with `outcome`, published once the close settles.
    pub fn close(&mut self, ui: &mut Ui, outcome: DialogOutcome) -> bool {
        self.close_with(ui, outcome, Emit::Notify)
    }

    pub fn close_silently(&mut self, ui: &mut Ui, outcome: DialogOutcome) -> bool {
        self.close_with(ui, outcome, Emit::Silent)
    }

    pub fn close_with(&mut self, ui: &mut Ui, outcome: DialogOutcome, emit: Emit) -> bool {
        let Some(current) = self.current.clone() else {
            return false;
        };
        if !Frame::is_open(ui, current.frame.root) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Close, None);
        let root = ui.doc.root();
        ui.listeners.unbind(self.id(), root, EventKind::KeyDown);
        let lifecycle = self.lifecycle.clone();
        let results = self.results.clone();
        tracing::debug!(dialog = current.kind.as_str(), ?outcome, "dialog closing");
        Frame::close(
            ui,
            current.frame.root,
            &AnimationSpec::from_settings(self.settings.animation, &self.settings.animation_out),
            move |_| {
                lifecycle.after(emit, Operation::Close, None);
                results.emit(&outcome);
            },
        )
    }

    pub fn submit(&mut self, ui: &mut Ui) -> bool {
        self.submit_with(ui, Emit::Notify)
    }

    pub fn submit_silently(&mut self, ui: &mut Ui) -> bool {
        self.submit_with(ui, Emit::Silent)
    }

    /// OK: the prompt text for prompts, [`DialogOutcome::Ok`] otherwise.
    pub fn submit_with(&mut self, ui: &mut Ui, emit: Emit) -> bool {
        let outcome = match self.kind() {
            Some(DialogKind::Prompt) => DialogOutcome::Input(self.buffer.text().to_owned()),
            Some(_) => DialogOutcome::Ok,
            None => return false,
        };
        self.close_with(ui, outcome, emit)
    }

    fn sync_input(&self, ui: &mut Ui) {
        if let Some(input) = self.current.as_ref().and_then(|c| c.input) {
            ui.doc.set_attr(input, "value", self.buffer.text());
        }
    }

    fn handle_key(&mut self, ui: &mut Ui, key: &KeyEvent, target: ElementId) -> bool {
        let Some(current) = self.current.clone() else {
            return false;
        };
        if !Frame::is_open(ui, current.frame.root) {
            return false;
        }
        match Frame::trap_key(ui, current.frame.root, key) {
            TrapKey::Consumed => return true,
            TrapKey::Escape if self.settings.close_on_escape => {
                return self.close(ui, DialogOutcome::Dismissed);
            }
            TrapKey::Escape => return false,
            TrapKey::Ignored => {}
        }
        if key.code == KeyCode::Enter {
            if current.cancel.is_some_and(|c| ui.doc.focused() == Some(c)) {
                return self.close(ui, DialogOutcome::Cancel);
            }
            return self.submit(ui);
        }
        if current.input == Some(target) && self.buffer.apply(key) {
            self.sync_input(ui);
            return true;
        }
        false
    }
}

impl Widget for Dialog {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, _ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        self.lifecycle.after(emit, Operation::Initialize, Some(self.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Destroy, Some(self.scope));
        ui.listeners.unbind_owner(self.id());
        if let Some(current) = self.current.take()
            && Frame::is_open(ui, current.frame.root)
        {
            Frame::discard(ui, current.frame.root);
            self.results.emit(&DialogOutcome::Dismissed);
        }
        self.lifecycle.after(emit, Operation::Destroy, Some(self.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        let Some(bound) = ui.listeners.route(self.id(), &ui.doc, event) else {
            return false;
        };
        let Some(current) = self.current.clone() else {
            return false;
        };
        match event {
            Event::Key { target, key } => self.handle_key(ui, key, *target),
            Event::Input { value, .. } => {
                self.buffer.set(value.as_str());
                self.sync_input(ui);
                true
            }
            Event::Click { .. } if bound == current.ok => self.submit(ui),
            Event::Click { .. } if Some(bound) == current.cancel => {
                self.close(ui, DialogOutcome::Cancel)
            }
            Event::Click { .. } if bound == current.frame.close || bound == current.frame.overlay => {
                self.close(ui, DialogOutcome::Dismissed)
            }
            _ => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
