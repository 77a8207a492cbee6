#![forbid(unsafe_code)]

//! Smooth scroll: in-page anchors (`a[href^="#"]`) scroll the viewport to
//! their target instead of jumping.
//!
//! The destination is the target's top minus `offset`. The scroll eases
//! over `duration` milliseconds (sampled on every `Ui::tick`); when it
//! completes the location hash is updated if `updateHash` is set. A bare
//! `#` or an unknown id is ignored.

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind};
use trellis_core::selector::Selector;
use trellis_runtime::{Duration, Easing, Ui};

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{Emit, Lifecycle, Operation};
use crate::settings::{Options, Settings, selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SmoothScrollSettings {
    pub selector: String,
    /// Pixels left above the target.
    pub offset: i32,
    /// Milliseconds.
    pub duration: u64,
    pub update_hash: bool,
}

impl Default for SmoothScrollSettings {
    fn default() -> Self {
        Self {
            selector: r##"a[href^="#"]"##.into(),
            offset: 0,
            duration: 500,
            update_hash: true,
        }
    }
}

impl Settings for SmoothScrollSettings {
    const NAME: &'static str = "smooth-scroll";
}

#[derive(Debug)]
pub struct SmoothScroll {
    scope: ElementId,
    settings: SmoothScrollSettings,
    lifecycle: Lifecycle,
    anchor: Selector,
}

impl SmoothScroll {
    pub fn new(scope: ElementId, settings: SmoothScrollSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            scope,
            anchor: selector(&settings.selector)?,
            settings,
            lifecycle: Lifecycle::new(SmoothScrollSettings::NAME),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, SmoothScrollSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &SmoothScrollSettings {
        &self.settings
    }

    pub fn anchors(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.anchor)
    }

    /// Element an anchor points at, from its `#id` href.
    pub fn target_of(doc: &Document, anchor: ElementId) -> Option<ElementId> {
        let id = doc.attr(anchor, "href")?.trim().strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        doc.find_by_id(id)
    }

    pub fn follow(&mut self, ui: &mut Ui, anchor: ElementId) -> bool {
        self.follow_with(ui, anchor, Emit::Notify)
    }

    pub fn follow_silently(&mut self, ui: &mut Ui, anchor: ElementId) -> bool {
        self.follow_with(ui, anchor, Emit::Silent)
    }

    /// Scroll to whatever `anchor` points at, with the anchor's `data-*`
    /// overrides.
    pub fn follow_with(&mut self, ui: &mut Ui, anchor: ElementId, emit: Emit) -> bool {
        let Some(target) = Self::target_of(&ui.doc, anchor) else {
            tracing::debug!(element = %anchor, "anchor target missing");
            return false;
        };
        let settings = self.settings.with_data_overrides(&ui.doc, anchor);
        self.scroll_with(ui, target, &settings, emit)
    }

    pub fn scroll_to(&mut self, ui: &mut Ui, target: ElementId) -> bool {
        let settings = self.settings.clone();
        self.scroll_with(ui, target, &settings, Emit::Notify)
    }

    pub fn scroll_to_silently(&mut self, ui: &mut Ui, target: ElementId) -> bool {
        let settings = self.settings.clone();
        self.scroll_with(ui, target, &settings, Emit::Silent)
    }

    fn scroll_with(
        &mut self,
        ui: &mut Ui,
        target: ElementId,
        settings: &SmoothScrollSettings,
        emit: Emit,
    ) -> bool {
        let Some(rect) = ui.doc.rect(target).filter(|_| ui.doc.is_connected(target)) else {
            return false;
        };
        self.lifecycle.before(emit, Operation::Scroll, Some(target));
        let top = rect.y - settings.offset;
        let duration = Duration::from_millis(settings.duration);
        ui.scroll_to(top, duration, Easing::EaseInOutQuad);
        tracing::debug!(element = %target, top, duration_ms = settings.duration, "smooth scroll");

        let hash = settings
            .update_hash
            .then(|| ui.doc.attr(target, "id").map(|id| format!("#{id}")))
            .flatten();
        let lifecycle = self.lifecycle.clone();
        ui.animate(duration, move |ui| {
            if let Some(hash) = hash {
                ui.viewport.set_hash(hash);
            }
            lifecycle.after(emit, Operation::Scroll, Some(target));
        });
        true
    }
}

impl Widget for SmoothScroll {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        self.lifecycle.before(emit, Operation::Initialize, Some(self.scope));
        for anchor in self.anchors(&ui.doc) {
            ui.listeners.bind(self.id(), anchor, EventKind::Click);
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
            Some(anchor) => self.follow(ui, anchor),
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use trellis_core::geometry::Rect;

    fn setup() -> (Ui, ElementId, ElementId) {
        let mut ui = Ui::new();
        let link = ui.doc.build("a").attr("href", "#pricing").append_to_body();
        let section = ui
            .doc
            .build("section")
            .attr("id", "pricing")
            .rect(Rect::new(0, 1200, 800, 400))
            .append_to_body();
        (ui, link, section)
    }

    #[test]
    fn click_eases_to_target_then_sets_hash() {
        let (mut ui, link, _) = setup();
        let settings = SmoothScrollSettings {
            offset: 200,
            ..SmoothScrollSettings::default()
        };
        let mut s = SmoothScroll::new(ui.doc.body(), settings).expect("valid");
        s.initialize(&mut ui);
        assert!(s.handle_event(&mut ui, &Event::click(link)));
        assert!(ui.viewport.is_scrolling());

        ui.advance(Duration::from_millis(250));
        assert_eq!(ui.viewport.scroll_top(), 500);
        assert_eq!(ui.viewport.hash(), None);

        ui.advance(Duration::from_millis(250));
        assert_eq!(ui.viewport.scroll_top(), 1000);
        assert!(!ui.viewport.is_scrolling());
        assert_eq!(ui.viewport.hash(), Some("#pricing"));
    }

    #[test]
    fn data_overrides_apply_per_anchor() {
        let (mut ui, link, _) = setup();
        ui.doc.set_attr(link, "data-duration", "0");
        ui.doc.set_attr(link, "data-update-hash", "false");
        let mut s = SmoothScroll::new(ui.doc.body(), SmoothScrollSettings::default()).expect("valid");
        s.initialize(&mut ui);
        s.handle_event(&mut ui, &Event::click(link));
        assert_eq!(ui.viewport.scroll_top(), 1200);
        assert_eq!(ui.viewport.hash(), None);
    }

    #[test]
    fn follow_silently_scrolls_without_publishing() {
        let (mut ui, link, _) = setup();
        let mut s = SmoothScroll::new(ui.doc.body(), SmoothScrollSettings::default()).expect("valid");
        s.initialize_silently(&mut ui);
        let published = Rc::new(Cell::new(0));
        let seen = Rc::clone(&published);
        let _sub = s.subscribe(move |_| seen.set(seen.get() + 1));
        assert!(s.follow_silently(&mut ui, link));
        ui.advance(Duration::from_millis(500));
        assert_eq!(ui.viewport.scroll_top(), 1200);
        assert_eq!(ui.viewport.hash(), Some("#pricing"));
        assert_eq!(published.get(), 0);
    }

    #[test]
    fn bare_hash_and_unknown_ids_are_ignored() {
        let (mut ui, _, _) = setup();
        let bare = ui.doc.build("a").attr("href", "#").append_to_body();
        let dangling = ui.doc.build("a").attr("href", "#nowhere").append_to_body();
        let mut s = SmoothScroll::new(ui.doc.body(), SmoothScrollSettings::default()).expect("valid");
        s.initialize(&mut ui);
        assert_eq!(ui.listeners.count(s.id()), 3);
        assert!(!s.handle_event(&mut ui, &Event::click(bare)));
        assert!(!s.handle_event(&mut ui, &Event::click(dangling)));
        assert!(!ui.viewport.is_scrolling());
    }
}
