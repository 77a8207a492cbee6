#![forbid(unsafe_code)]

//! Properties that hold for any interleaving of user actions.

use proptest::prelude::*;
use trellis_harness::strategies::{self, Step};
use trellis_harness::{Fixture, drive};
use trellis_runtime::{HAS_OVERLAY, OwnerId};
use trellis_widgets::{
    Accordion, AccordionSettings, Dropdown, DropdownSettings, Modal, ModalSettings, Popover,
    PopoverSettings, Toggler, TogglerSettings, Tooltip, TooltipSettings, Widget,
};

const MARKUP: &str = r##"
div.accordion#faq
  div.accordion-item
    button.accordion-toggle#t1
    div.accordion-content
  div.accordion-item
    button.accordion-toggle#t2
    div.accordion-content
button#tg[data-toggle][data-target="#drawer"]
div#drawer
div.dropdown#dd
  button.dropdown-toggle#ddt
  ul.dropdown-menu
    li
      a#item[href="#x"]
button#tip[data-tooltip=Hint] @10,10,20,20
button#pop[data-popover=Details][data-popover-title=More] @50,10,20,20
button#open[data-modal][data-modal-title=Hello]
"##;

const TARGETS: [&str; 8] = ["t1", "t2", "tg", "ddt", "item", "tip", "pop", "open"];

struct World {
    fixture: Fixture,
    widgets: Vec<OwnerId>,
    targets: Vec<trellis_core::dom::ElementId>,
}

fn world() -> World {
    let mut fixture = Fixture::parse(MARKUP).expect("markup");
    let body = fixture.body();
    let faq = fixture.el("faq");
    let host = &mut fixture.host;
    let widgets = vec![
        host.mount(Accordion::new(faq, AccordionSettings::default()).expect("accordion")),
        host.mount(Toggler::new(body, TogglerSettings::default()).expect("toggler")),
        host.mount(Dropdown::new(body, DropdownSettings::default()).expect("dropdown")),
        host.mount(Tooltip::new(body, TooltipSettings::default()).expect("tooltip")),
        host.mount(Popover::new(body, PopoverSettings::default()).expect("popover")),
        host.mount(Modal::new(body, ModalSettings::default()).expect("modal")),
    ];
    let targets = TARGETS.iter().map(|id| fixture.el(id)).collect();
    World {
        fixture,
        widgets,
        targets,
    }
}

fn listener_counts(w: &World) -> Vec<usize> {
    w.widgets
        .iter()
        .map(|&id| w.fixture.host.ui.listeners.count(id))
        .collect()
}

fn refresh_all(w: &mut World) {
    let host = &mut w.fixture.host;
    for &id in &w.widgets {
        host.with::<Accordion, _>(id, |x, ui| x.refresh(ui));
        host.with::<Toggler, _>(id, |x, ui| x.refresh(ui));
        host.with::<Dropdown, _>(id, |x, ui| x.refresh(ui));
        host.with::<Tooltip, _>(id, |x, ui| x.refresh(ui));
        host.with::<Popover, _>(id, |x, ui| x.refresh(ui));
        host.with::<Modal, _>(id, |x, ui| x.refresh(ui));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn refresh_keeps_listener_counts(refreshes in 1usize..6) {
        let mut w = world();
        let initial = listener_counts(&w);
        for _ in 0..refreshes {
            refresh_all(&mut w);
        }
        prop_assert_eq!(listener_counts(&w), initial);
    }

    #[test]
    fn overlay_flag_tracks_the_guard(steps in strategies::session(TARGETS.len(), 40)) {
        let mut w = world();
        for step in &steps {
            strategies::replay(&mut w.fixture.host, &w.targets, std::slice::from_ref(step));
            let ui = &w.fixture.host.ui;
            prop_assert_eq!(ui.doc.has_class(ui.doc.root(), HAS_OVERLAY), ui.overlays.is_open());
        }
    }

    #[test]
    fn state_classes_stay_exclusive(steps in strategies::session(TARGETS.len(), 40)) {
        let mut w = world();
        strategies::replay(&mut w.fixture.host, &w.targets, &steps);
        drive::settle_all(&mut w.fixture.host);
        let doc = &w.fixture.host.ui.doc;
        for el in doc.descendants(doc.root()) {
            prop_assert!(!(doc.has_class(el, "is-expanded") && doc.has_class(el, "is-collapsed")));
        }
        prop_assert!(doc.descendants(doc.root()).iter().all(|&el| !doc.has_class(el, "is-animating")));
        let faq = w.fixture.el("faq");
        let open_items = doc
            .descendants(faq)
            .into_iter()
            .filter(|&el| doc.has_class(el, "accordion-item") && doc.has_class(el, "is-expanded"))
            .count();
        prop_assert!(open_items <= 1);
    }

    #[test]
    fn sessions_then_destroy_leave_no_listeners(steps in strategies::session(TARGETS.len(), 30)) {
        let mut w = world();
        strategies::replay(&mut w.fixture.host, &w.targets, &steps);
        let ids = w.widgets.clone();
        for id in ids {
            w.fixture.host.unmount(id);
        }
        prop_assert!(w.fixture.host.ui.listeners.is_empty());
        prop_assert!(w.fixture.host.is_empty());
    }
}

#[test]
fn replay_of_a_fixed_session_settles_cleanly() {
    let mut w = world();
    let script = [
        Step::Click(0),
        Step::SettleAll,
        Step::Click(3),
        Step::Click(7),
        Step::SettleAll,
        Step::ShiftTab,
        Step::Key(trellis_core::event::KeyCode::Escape),
        Step::SettleAll,
        Step::Advance(500),
    ];
    strategies::replay(&mut w.fixture.host, &w.targets, &script);
    assert!(!w.fixture.host.ui.overlays.is_open());
    assert!(w.fixture.host.ui.pending_animations().is_empty());
}
