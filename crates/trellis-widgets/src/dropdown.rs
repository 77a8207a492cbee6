#![forbid(unsafe_code)]

//! Dropdown: `.dropdown` containers with a `.dropdown-toggle` and a
//! `.dropdown-menu`.
//!
//! An open dropdown carries `is-active` (as does its menu once the show
//! animation settles); the toggle mirrors it in `aria-expanded`. At most one
//! dropdown of an instance is open: showing one hides the others. Clicks
//! outside any open menu and Escape hide everything.
//!
//! In hover mode, pointer enter/leave on the dropdown show/hide it after
//! `delayIn` / `delayOut` milliseconds. A pending hover timer is cancelled
//! by the opposite pointer event, and the delayed action re-checks the
//! dropdown's state when it fires.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use trellis_core::dom::{Document, ElementId};
use trellis_core::event::{Event, EventKind, KeyCode};
use trellis_core::selector::Selector;
use trellis_runtime::{Duration, TimerId, Ui};

use crate::Widget;
use crate::config::ConfigError;
use crate::lifecycle::{AnimationSpec, Direction, Emit, Lifecycle, Operation, Transition, is_animating};
use crate::settings::{Options, Settings, selector};

pub const IS_ACTIVE: &str = "is-active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropdownSettings {
    pub selector: String,
    pub toggle_selector: String,
    pub menu_selector: String,
    pub hover: bool,
    /// Milliseconds before a hover shows the menu.
    pub delay_in: u64,
    /// Milliseconds before leaving hides the menu.
    pub delay_out: u64,
    pub animation: bool,
    pub animation_in: String,
    pub animation_out: String,
    pub close_on_outside_click: bool,
    pub close_on_escape: bool,
}

impl Default for DropdownSettings {
    fn default() -> Self {
        Self {
            selector: ".dropdown".into(),
            toggle_selector: ".dropdown-toggle".into(),
            menu_selector: ".dropdown-menu".into(),
            hover: false,
            delay_in: 0,
            delay_out: 0,
            animation: true,
            animation_in: "dropdown-show".into(),
            animation_out: "dropdown-hide".into(),
            close_on_outside_click: true,
            close_on_escape: true,
        }
    }
}

impl Settings for DropdownSettings {
    const NAME: &'static str = "dropdown";
}

/// Pending hover show/hide for one dropdown.
#[derive(Debug, Clone, Copy)]
struct HoverTimer(TimerId);

#[derive(Debug)]
struct Core {
    scope: ElementId,
    settings: DropdownSettings,
    lifecycle: Lifecycle,
    show_anim: AnimationSpec,
    hide_anim: AnimationSpec,
    dropdown: Selector,
    toggle: Selector,
    menu: Selector,
}

impl Core {
    fn dropdowns(&self, doc: &Document) -> Vec<ElementId> {
        doc.select(self.scope, &self.dropdown)
    }

    fn menu_of(&self, doc: &Document, dropdown: ElementId) -> Option<ElementId> {
        doc.select_first(dropdown, &self.menu)
    }

    fn is_open(doc: &Document, dropdown: ElementId) -> bool {
        doc.has_class(dropdown, IS_ACTIVE)
    }

    fn set_toggles(&self, doc: &mut Document, dropdown: ElementId, open: bool) {
        for t in doc.select(dropdown, &self.toggle) {
            doc.set_attr(t, "aria-expanded", if open { "true" } else { "false" });
        }
    }

    fn show(&self, ui: &mut Ui, dropdown: ElementId, emit: Emit) -> bool {
        if !self.dropdown.matches(&ui.doc, dropdown) || Self::is_open(&ui.doc, dropdown) {
            return false;
        }
        let Some(menu) = self.menu_of(&ui.doc, dropdown) else {
            tracing::debug!(element = %dropdown, "dropdown without menu");
            return false;
        };
        if is_animating(&ui.doc, menu) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Show, Some(dropdown));
        for other in self.dropdowns(&ui.doc) {
            if other != dropdown && Self::is_open(&ui.doc, other) {
                self.hide(ui, other, emit);
            }
        }
        ui.doc.add_class(dropdown, IS_ACTIVE);
        self.set_toggles(&mut ui.doc, dropdown, true);
        ui.doc.set_attr(menu, "aria-hidden", "false");
        let lifecycle = self.lifecycle.clone();
        Transition::on(menu)
            .add(IS_ACTIVE)
            .animate(&self.show_anim, Direction::In)
            .run(ui, move |_| lifecycle.after(emit, Operation::Show, Some(dropdown)));
        true
    }

    fn hide(&self, ui: &mut Ui, dropdown: ElementId, emit: Emit) -> bool {
        if !Self::is_open(&ui.doc, dropdown) {
            return false;
        }
        let menu = self.menu_of(&ui.doc, dropdown);
        if menu.is_some_and(|m| is_animating(&ui.doc, m) && ui.doc.has_class(m, crate::lifecycle::IS_ANIMATING_OUT)) {
            return false;
        }
        self.lifecycle.before(emit, Operation::Hide, Some(dropdown));
        ui.doc.remove_class(dropdown, IS_ACTIVE);
        self.set_toggles(&mut ui.doc, dropdown, false);
        let lifecycle = self.lifecycle.clone();
        match menu {
            Some(menu) => {
                ui.doc.set_attr(menu, "aria-hidden", "true");
                Transition::on(menu)
                    .remove(IS_ACTIVE)
                    .animate(&self.hide_anim, Direction::Out)
                    .run(ui, move |_| lifecycle.after(emit, Operation::Hide, Some(dropdown)));
            }
            None => lifecycle.after(emit, Operation::Hide, Some(dropdown)),
        }
        true
    }

    fn hide_all(&self, ui: &mut Ui, emit: Emit) -> usize {
        self.dropdowns(&ui.doc)
            .into_iter()
            .filter(|&d| self.hide(ui, d, emit))
            .count()
    }

    fn cancel_hover(ui: &mut Ui, dropdown: ElementId) {
        if let Some(HoverTimer(id)) = ui.data.remove::<HoverTimer>(dropdown) {
            ui.cancel(id);
        }
    }

    fn hover(self: &Rc<Self>, ui: &mut Ui, dropdown: ElementId, show: bool) {
        Self::cancel_hover(ui, dropdown);
        let delay = if show {
            self.settings.delay_in
        } else {
            self.settings.delay_out
        };
        if delay == 0 {
            if show {
                self.show(ui, dropdown, Emit::Notify);
            } else {
                self.hide(ui, dropdown, Emit::Notify);
            }
            return;
        }
        let core = Rc::clone(self);
        let id = ui.schedule(Duration::from_millis(delay), move |ui| {
            ui.data.remove::<HoverTimer>(dropdown);
            if !ui.doc.is_connected(dropdown) {
                return;
            }
            if show {
                core.show(ui, dropdown, Emit::Notify);
            } else {
                core.hide(ui, dropdown, Emit::Notify);
            }
        });
        ui.data.insert(dropdown, HoverTimer(id));
    }
}

#[derive(Debug)]
pub struct Dropdown {
    core: Rc<Core>,
}

impl Dropdown {
    pub fn new(scope: ElementId, settings: DropdownSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            core: Rc::new(Core {
                scope,
                show_anim: AnimationSpec::from_settings(settings.animation, &settings.animation_in),
                hide_anim: AnimationSpec::from_settings(settings.animation, &settings.animation_out),
                dropdown: selector(&settings.selector)?,
                toggle: selector(&settings.toggle_selector)?,
                menu: selector(&settings.menu_selector)?,
                settings,
                lifecycle: Lifecycle::new(DropdownSettings::NAME),
            }),
        })
    }

    pub fn with_options(scope: ElementId, options: &Options) -> Result<Self, ConfigError> {
        Self::new(scope, DropdownSettings::from_options(options)?)
    }

    pub fn settings(&self) -> &DropdownSettings {
        &self.core.settings
    }

    pub fn dropdowns(&self, doc: &Document) -> Vec<ElementId> {
        self.core.dropdowns(doc)
    }

    pub fn is_open(&self, doc: &Document, dropdown: ElementId) -> bool {
        Core::is_open(doc, dropdown)
    }

    pub fn open_dropdowns(&self, doc: &Document) -> Vec<ElementId> {
        self.dropdowns(doc)
            .into_iter()
            .filter(|&d| Core::is_open(doc, d))
            .collect()
    }

    pub fn show(&mut self, ui: &mut Ui, dropdown: ElementId) -> bool {
        self.core.show(ui, dropdown, Emit::Notify)
    }

    pub fn show_silently(&mut self, ui: &mut Ui, dropdown: ElementId) -> bool {
        self.core.show(ui, dropdown, Emit::Silent)
    }

    pub fn hide(&mut self, ui: &mut Ui, dropdown: ElementId) -> bool {
        self.core.hide(ui, dropdown, Emit::Notify)
    }

    pub fn hide_silently(&mut self, ui: &mut Ui, dropdown: ElementId) -> bool {
        self.core.hide(ui, dropdown, Emit::Silent)
    }

    pub fn toggle(&mut self, ui: &mut Ui, dropdown: ElementId) -> bool {
        self.toggle_with(ui, dropdown, Emit::Notify)
    }

    pub fn toggle_silently(&mut self, ui: &mut Ui, dropdown: ElementId) -> bool {
        self.toggle_with(ui, dropdown, Emit::Silent)
    }

    pub fn toggle_with(&mut self, ui: &mut Ui, dropdown: ElementId, emit: Emit) -> bool {
        if Core::is_open(&ui.doc, dropdown) {
            self.core.hide(ui, dropdown, emit)
        } else {
            self.core.show(ui, dropdown, emit)
        }
    }

    /// Hide every open dropdown of this instance.
    pub fn hide_all(&mut self, ui: &mut Ui) -> usize {
        self.core.hide_all(ui, Emit::Notify)
    }

    pub fn hide_all_silently(&mut self, ui: &mut Ui) -> usize {
        self.core.hide_all(ui, Emit::Silent)
    }
}

impl Widget for Dropdown {
    fn lifecycle(&self) -> &Lifecycle {
        &self.core.lifecycle
    }

    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit) {
        let core = &self.core;
        let owner = core.lifecycle.id();
        core.lifecycle.before(emit, Operation::Initialize, Some(core.scope));
        for dropdown in core.dropdowns(&ui.doc) {
            let open = Core::is_open(&ui.doc, dropdown);
            core.set_toggles(&mut ui.doc, dropdown, open);
            if let Some(menu) = core.menu_of(&ui.doc, dropdown) {
                ui.doc.toggle_class(menu, IS_ACTIVE, Some(open));
                ui.doc.set_attr(menu, "aria-hidden", if open { "false" } else { "true" });
            }
            for toggle in ui.doc.select(dropdown, &core.toggle) {
                ui.listeners.bind(owner, toggle, EventKind::Click);
            }
            if core.settings.hover {
                ui.listeners.bind(owner, dropdown, EventKind::PointerEnter);
                ui.listeners.bind(owner, dropdown, EventKind::PointerLeave);
            }
        }
        let root = ui.doc.root();
        if core.settings.close_on_outside_click {
            ui.listeners.bind(owner, root, EventKind::Click);
        }
        if core.settings.close_on_escape {
            ui.listeners.bind(owner, root, EventKind::KeyDown);
        }
        core.lifecycle.after(emit, Operation::Initialize, Some(core.scope));
    }

    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit) {
        let core = Rc::clone(&self.core);
        core.lifecycle.before(emit, Operation::Destroy, Some(core.scope));
        ui.listeners.unbind_owner(core.lifecycle.id());
        for dropdown in core.dropdowns(&ui.doc) {
            Core::cancel_hover(ui, dropdown);
        }
        core.hide_all(ui, Emit::Silent);
        core.lifecycle.after(emit, Operation::Destroy, Some(core.scope));
    }

    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool {
        let core = Rc::clone(&self.core);
        let Some(bound) = ui.listeners.route(core.lifecycle.id(), &ui.doc, event) else {
            return false;
        };
        let root = ui.doc.root();
        match event {
            Event::Click { target } if bound == root => {
                let inside_open = core
                    .dropdowns(&ui.doc)
                    .into_iter()
                    .filter(|&d| Core::is_open(&ui.doc, d))
                    .any(|d| ui.doc.is_inclusive_ancestor(d, *target));
                if inside_open {
                    return false;
                }
                core.hide_all(ui, Emit::Notify) > 0
            }
            Event::Click { .. } => match ui.doc.closest(bound, &core.dropdown) {
                Some(dropdown) => self.toggle(ui, dropdown),
                None => false,
            },
            Event::Key { .. } if event.is_key(KeyCode::Escape) => core.hide_all(ui, Emit::Notify) > 0,
            Event::PointerEnter { .. } => {
                core.hover(ui, bound, true);
                true
            }
            Event::PointerLeave { .. } => {
                core.hover(ui, bound, false);
                true
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

    struct Fixture {
        ui: Ui,
        dropdowns: Vec<ElementId>,
        toggles: Vec<ElementId>,
        menus: Vec<ElementId>,
        outside: ElementId,
    }

    fn fixture(count: usize) -> Fixture {
        let mut ui = Ui::new();
        let (mut dropdowns, mut toggles, mut menus) = (Vec::new(), Vec::new(), Vec::new());
        for _ in 0..count {
            let dd = ui.doc.build("div").class("dropdown").append_to_body();
            toggles.push(ui.doc.build("button").class("dropdown-toggle").append_to(dd));
            menus.push(ui.doc.build("ul").class("dropdown-menu").append_to(dd));
            dropdowns.push(dd);
        }
        let outside = ui.doc.build("p").append_to_body();
        Fixture {
            ui,
            dropdowns,
            toggles,
            menus,
            outside,
        }
    }

    fn unanimated() -> DropdownSettings {
        DropdownSettings {
            animation: false,
            ..DropdownSettings::default()
        }
    }

    #[test]
    fn toggle_click_opens_and_menu_settles() {
        let mut f = fixture(1);
        let mut dd = Dropdown::new(f.ui.doc.body(), DropdownSettings::default()).expect("valid");
        dd.initialize(&mut f.ui);
        assert!(dd.handle_event(&mut f.ui, &Event::click(f.toggles[0])));
        assert!(dd.is_open(&f.ui.doc, f.dropdowns[0]));
        assert_eq!(f.ui.doc.attr(f.toggles[0], "aria-expanded"), Some("true"));
        assert!(!f.ui.doc.has_class(f.menus[0], IS_ACTIVE));
        f.ui.animation_end(f.menus[0]);
        assert!(f.ui.doc.has_class(f.menus[0], IS_ACTIVE));
    }

    #[test]
    fn showing_one_hides_the_other() {
        let mut f = fixture(2);
        let mut dd = Dropdown::new(f.ui.doc.body(), unanimated()).expect("valid");
        dd.initialize(&mut f.ui);
        dd.show(&mut f.ui, f.dropdowns[0]);
        dd.show(&mut f.ui, f.dropdowns[1]);
        assert_eq!(dd.open_dropdowns(&f.ui.doc), vec![f.dropdowns[1]]);
    }

    #[test]
    fn outside_click_and_escape_hide() {
        let mut f = fixture(1);
        let mut dd = Dropdown::new(f.ui.doc.body(), unanimated()).expect("valid");
        dd.initialize(&mut f.ui);
        dd.show(&mut f.ui, f.dropdowns[0]);
        assert!(!dd.handle_event(&mut f.ui, &Event::click(f.menus[0])));
        assert!(dd.is_open(&f.ui.doc, f.dropdowns[0]));
        assert!(dd.handle_event(&mut f.ui, &Event::click(f.outside)));
        assert!(!dd.is_open(&f.ui.doc, f.dropdowns[0]));

        dd.show(&mut f.ui, f.dropdowns[0]);
        let body = f.ui.doc.body();
        assert!(dd.handle_event(&mut f.ui, &Event::key(body, KeyCode::Escape)));
        assert!(dd.open_dropdowns(&f.ui.doc).is_empty());
    }

    #[test]
    fn hover_respects_delays_and_cancellation() {
        let mut f = fixture(1);
        let settings = DropdownSettings {
            hover: true,
            delay_in: 100,
            delay_out: 200,
            ..unanimated()
        };
        let mut dd = Dropdown::new(f.ui.doc.body(), settings).expect("valid");
        dd.initialize(&mut f.ui);
        let d = f.dropdowns[0];
        dd.handle_event(&mut f.ui, &Event::PointerEnter { target: d });
        f.ui.advance(Duration::from_millis(50));
        assert!(!dd.is_open(&f.ui.doc, d));
        dd.handle_event(&mut f.ui, &Event::PointerLeave { target: d });
        f.ui.advance(Duration::from_millis(100));
        assert!(!dd.is_open(&f.ui.doc, d));

        dd.handle_event(&mut f.ui, &Event::PointerEnter { target: d });
        f.ui.advance(Duration::from_millis(100));
        assert!(dd.is_open(&f.ui.doc, d));
        dd.handle_event(&mut f.ui, &Event::PointerLeave { target: d });
        dd.handle_event(&mut f.ui, &Event::PointerEnter { target: d });
        f.ui.advance(Duration::from_millis(500));
        assert!(dd.is_open(&f.ui.doc, d));
    }

    #[test]
    fn destroy_hides_and_unbinds() {
        let mut f = fixture(1);
        let mut dd = Dropdown::new(f.ui.doc.body(), unanimated()).expect("valid");
        dd.initialize(&mut f.ui);
        dd.show(&mut f.ui, f.dropdowns[0]);
        dd.destroy(&mut f.ui);
        assert!(!dd.is_open(&f.ui.doc, f.dropdowns[0]));
        assert_eq!(f.ui.listeners.count(dd.id()), 0);
    }
}
