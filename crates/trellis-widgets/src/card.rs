#![forbid(unsafe_code)]

//! Card: `.card` with a collapsible `.card-body` and a `.card-remove`
//! control. Behaves exactly like [`Panel`] over card class names.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::Event;
use trellis_runtime::Ui;

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{Emit, Lifecycle};
use crate::panel::{Panel, PanelSettings};
use crate::settings::{Options, Settings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardSettings {
    pub selector: String,
    pub toggle_selector: String,
    pub body_selector: String,
    pub remove_selector: String,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub animation_remove: String,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            selector: ".card".into(),
            toggle_selector: ".card-toggle".into(),
            body_selector: ".card-body".into(),
            remove_selector: ".card-remove".into(),
            animation: true,
            animation_in: "card-expand".into(),
            animation_out: "card-collapse".into(),
            animation_remove: "card-remove".into(),
        }
    }
}

impl Settings for CardSettings {
    const NAME: &'static str = "card";
}

impl From<CardSettings> for PanelSettings {
    fn from(s: CardSettings) -> Self {
        Self {
            selector: s.selector,
            toggle_selector: s.toggle_selector,
            body_selector: s.body_selector,
            remove_selector: s.remove_selector,
            animation: s.animation,
            animation_in: s.animation_in,
            animation_out: s.animation_out,
            animation_remove: s.animation_remove,
        }
    }
}

#[derive(Debug)]
pub struct Card {
    inner: Panel,
}

impl Card {
    pub fn new(scope: ElementId, settings: CardSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Panel::with_kind(scope, settings.into(), CardSettings::NAME)?,
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, CardSettings::from_options(options)?)
    }

    pub fn cards(&self, doc: &Document) -> Vec<ElementId> {
        self.inner.panels(doc)
    }

    pub fn is_expanded(&self, doc: &Document, card: ElementId) -> bool {
        self.inner.is_expanded(doc, card)
    }

    pub fn expand(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.expand(ui, card)
    }

    pub fn expand_silently(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.expand_silently(ui, card)
    }

    pub fn collapse(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.collapse(ui, card)
    }

    pub fn collapse_silently(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.collapse_silently(ui, card)
    }

    pub fn toggle(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.toggle(ui, card)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.toggle_silently(ui, card)
    }

    pub fn remove(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.remove(ui, card)
    }

    pub fn remove_silently(&mut self, ui: &mut Ui, card: ElementId) -> bool {
        self.inner.remove_silently(ui, card)
    }
}

impl Widget for Card {
    fn lifecycle(&self) -> &Lifecycle {
        self.inner.lifecycle()
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.inner.initialize_with(ui, emit);
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.inner.destroy_with(ui, emit);
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        self.inner.handle_event(ui, event)
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
