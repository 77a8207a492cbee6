#![forbid(unsafe_code)]

//! Accordion: a list of items whose content expands and collapses.
//!
//! ```text
//! .accordion                       (scope)
//!   .accordion-item [.is-expanded | .is-collapsed]
//!     .accordion-toggle            aria-expanded
//!     .accordion-content           aria-hidden
//! ```
//!
//! State classes and animation classes live on the item; the host reports
//! `animationend` for the item. With `openMultipleItems = false` expanding an
//! item collapses every other expanded item of the accordion.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::Ui;

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{Collapsible, Emit, IS_ANIMATING_IN, Lifecycle, Operation};
use crate::settings::{Options, Settings, selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccordionSettings {
    pub open_multiple_items: bool,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub item_selector: String,
    pub toggle_selector: String,
    pub content_selector: String,
}

impl Default for AccordionSettings {
    fn default() -> Self {
        Self {
            open_multiple_items: false,
            animation: true,
            animation_in: "accordion-expand".into(),
            animation_out: "accordion-collapse".into(),
            item_selector: ".accordion-item".into(),
            toggle_selector: ".accordion-toggle".into(),
            content_selector: ".accordion-content".into(),
        }
    }
}

impl Settings for AccordionSettings {
    const NAME: &'static str = "accordion";
}

#[derive(Debug)]
pub struct Accordion {
    scope: ElementId,
    settings: AccordionSettings,
    lifecycle: Lifecycle,
    motion: Collapsible,
    item: Selector,
    toggle: Selector,
    content: Selector,
}

impl Accordion {
    pub fn new(scope: ElementId, settings: AccordionSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            motion: Collapsible::new(
                settings.animation,
                &settings.animation_in,
                &settings.animation_out,
            ),
            item: selector(&settings.item_selector)?,
            toggle: selector(&settings.toggle_selector)?,
            content: selector(&settings.content_selector)?,
            settings,
            lifecycle: Lifecycle::new(AccordionSettings::NAME),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, AccordionSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &AccordionSettings {
        &self.settings
    }

    pub fn scope(&self) -> ElementId {
        self.scope
    }

    /// Items of this accordion, in document order.
    pub fn items(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.item)
    }

    pub fn is_expanded(&self, doc: &Document, item: ElementId) -> bool {
        Collapsible::is_expanded(doc, item)
    }

    pub fn expanded_items(&self, doc: &Document) -> Vec<ElementId> {
        self.items(doc)
            .into_iter()
            .filter(|&i| Collapsible::is_expanded(doc, i))
            .collect()
    }

    fn expanding_sibling(&self, doc: &Document, item: ElementId) -> Option<ElementId> {
        self.items(doc)
            .into_iter()
            .find(|&other| other != item && doc.has_class(other, IS_ANIMATING_IN))
    }

    fn owns(&self, doc: &Document, item: ElementId) -> bool {
        doc.is_inclusive_ancestor(self.scope, item) && self.item.matches(doc, item)
    }

    fn sync_aria(&self, doc: &mut Document, item: ElementId, expanded: bool) {
        let (toggles, contents) = (
            doc.select(item, &self.toggle),
            doc.select(item, &self.content),
        );
        for t in toggles {
            doc.set_attr(t, "aria-expanded", if expanded { "true" } else { "false" });
        }
        for c in contents {
            doc.set_attr(c, "aria-hidden", if expanded { "false" } else { "true" });
        }
    }

    fn wants_expanded(doc: &Document, item: ElementId) -> bool {
        doc.has_class(item, crate::lifecycle::EXPANDED) || doc.attr(item, "data-expanded") == Some("true")
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn expand(&mut self, ui: &mut Ui, item: ElementId) -> bool {
        self.expand_with(ui, item, Emit::Notify)
    }

    pub fn expand_silently(&mut self, ui: &mut Ui, item: ElementId) -> bool {
        self.expand_with(ui, item, Emit::Silent)
    }

    /// Expand `item`. Returns `false` if it is not an item of this
    /// accordion, already expanded, or mid-animation. In single mode it is
    /// also refused while a sibling is still expanding.
    pub fn expand_with(&mut self, ui: &mut Ui, item: ElementId, emit: Emit) -> bool {
        if !self.owns(&ui.doc, item) || !Collapsible::can_expand(&ui.doc, item) {
            return false;
        }
        if !self.settings.open_multiple_items
            && let Some(sibling) = self.expanding_sibling(&ui.doc, item)
        {
            tracing::debug!(
                element = %item,
                sibling = %sibling,
                "expand ignored: sibling still expanding"
            );
            return false;
        }
        let _span = tracing::debug_span!("accordion.expand", element = %item).entered();
        self.lifecycle.before(emit, Operation::Expand, Some(item));
        if !self.settings.open_multiple_items {
            for other in self.expanded_items(&ui.doc) {
                if other != item {
                    self.collapse_with(ui, other, emit);
                }
            }
        }
        self.sync_aria(&mut ui.doc, item, true);
        let lifecycle = self.lifecycle.clone();
        self.motion.expand(ui, item, move |_| {
            lifecycle.after(emit, Operation::Expand, Some(item));
        });
        true
    }

    pub fn collapse(&mut self, ui: &mut Ui, item: ElementId) -> bool {
        self.collapse_with(ui, item, Emit::Notify)
    }

    pub fn collapse_silently(&mut self, ui: &mut Ui, item: ElementId) -> bool {
        self.collapse_with(ui, item, Emit::Silent)
    }

    pub fn collapse_with(&mut self, ui: &mut Ui, item: ElementId, emit: Emit) -> bool {
        if !self.owns(&ui.doc, item) || !Collapsible::can_collapse(&ui.doc, item) {
            return false;
        }
        let _span = tracing::debug_span!("accordion.collapse", element = %item).entered();
        self.lifecycle.before(emit, Operation::Collapse, Some(item));
        self.sync_aria(&mut ui.doc, item, false);
        let lifecycle = self.lifecycle.clone();
        self.motion.collapse(ui, item, move |_| {
            lifecycle.after(emit, Operation::Collapse, Some(item));
        });
        true
    }

    pub fn toggle(&mut self, ui: &mut Ui, item: ElementId) -> bool {
        self.toggle_with(ui, item, Emit::Notify)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, item: ElementId) -> bool {
        self.toggle_with(ui, item, Emit::Silent)
    }

    /// Expand a collapsed item, collapse an expanded one. Publishes the
    /// events of whichever operation it dispatches to.
    pub fn toggle_with(&mut self, ui: &mut Ui, item: ElementId, emit: Emit) -> bool {
        if Collapsible::is_expanded(&ui.doc, item) {
            self.collapse_with(ui, item, emit)
        } else {
            self.expand_with(ui, item, emit)
        }
    }

    pub fn expand_all(&mut self, ui: &mut Ui) -> usize {
        self.expand_all_with(ui, Emit::Notify)
    }

    pub fn expand_all_silently(&mut self, ui: &mut Ui) -> usize {
        self.expand_all_with(ui, Emit::Silent)
    }

    /// Expand every collapsed item. Only allowed with `openMultipleItems`;
    /// otherwise a no-op returning zero.
    pub fn expand_all_with(&mut self, ui: &mut Ui, emit: Emit) -> usize {
        if !self.settings.open_multiple_items {
            tracing::debug!("expand_all ignored: openMultipleItems is off");
            return 0;
        }
        self.items(&ui.doc)
            .into_iter()
            .filter(|&item| self.expand_with(ui, item, emit))
            .count()
    }

    pub fn collapse_all(&mut self, ui: &mut Ui) -> usize {
        self.collapse_all_with(ui, Emit::Notify)
    }

    pub fn collapse_all_silently(&mut self, ui: &mut Ui) -> usize {
        self.collapse_all_with(ui, Emit::Silent)
    }

    pub fn collapse_all_with(&mut self, ui: &mut Ui, emit: Emit) -> usize {
        self.items(&ui.doc)
            .into_iter()
            .filter(|&item| self.collapse_with(ui, item, emit))
            .count()
    }
}

impl Widget for Accordion {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        let mut open_seen = false;
        for item in self.items(&ui.doc) {
            let mut expanded = Self::wants_expanded(&ui.doc, item);
            if expanded && open_seen && !self.settings.open_multiple_items {
                expanded = false;
            }
            open_seen |= expanded;
            Collapsible::set_state(&mut ui.doc, item, expanded);
            self.sync_aria(&mut ui.doc, item, expanded);
            for toggle in ui.doc.select(item, &self.toggle) {
                ui.listeners.bind(self.id(), toggle, EventKind::Click);
            }
        }
        tracing::debug!(
            widget = AccordionSettings::NAME,
            listeners = ui.listeners.count(self.id()),
            "initialized"
        );
        self.lifecycle.after(emit, Operation::Initialize, Some(self.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Destroy, Some(self.scope));
        ui.listeners.unbind_owner(self.id());
        self.lifecycle.after(emit, Operation::Destroy, Some(self.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        let Event::Click { .. } = event else {
            return false;
        };
        let Some(toggle) = ui.listeners.route(self.id(), &ui.doc, event) else {
            return false;
        };
        let Some(item) = ui.doc.closest(toggle, &self.item) else {
            return false;
        };
        self.toggle(ui, item);
        true
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
