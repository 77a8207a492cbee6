#![forbid(unsafe_code)]

//! Accordion driven end to end through the widget host.

use trellis_harness::{Fixture, Recorder, drive};
use trellis_widgets::lifecycle::{IS_ANIMATING, Operation, Phase};
use trellis_widgets::{Accordion, AccordionSettings, Widget};

const MARKUP: &str = r#"
div.accordion#faq
  div.accordion-item#a[data-expanded=true]
    button.accordion-toggle#ta "Shipping"
    div.accordion-content#ca "Three to five days."
  div.accordion-item#b
    button.accordion-toggle#tb "Returns"
    div.accordion-content#cb "Thirty days."
"#;

#[test]
fn opening_one_item_collapses_the_other() {
    let mut f = Fixture::parse(MARKUP).expect("markup");
    let accordion = Accordion::new(f.el("faq"), AccordionSettings::default()).expect("settings");
    let rec = Recorder::lifecycle(accordion.lifecycle());
    f.host.mount(accordion);
    let (a, b, tb) = (f.el("a"), f.el("b"), f.el("tb"));

    assert!(f.host.ui.doc.has_class(a, "is-expanded"));
    assert!(f.host.ui.doc.has_class(b, "is-collapsed"));
    assert_eq!(f.host.ui.doc.attr(f.el("tb"), "aria-expanded"), Some("false"));
    rec.take();

    assert!(drive::click(&mut f.host, tb));
    assert!(f.host.ui.doc.has_class(a, IS_ANIMATING));
    assert!(f.host.ui.doc.has_class(b, IS_ANIMATING));
    assert_eq!(
        rec.ops(),
        vec![(Operation::Expand, Phase::Before), (Operation::Collapse, Phase::Before)]
    );

    // Clicks while animating are ignored.
    drive::click(&mut f.host, tb);
    assert_eq!(rec.len(), 2);

    drive::settle(&mut f.host, a);
    assert!(f.host.ui.doc.has_class(a, "is-collapsed"));
    assert_eq!(rec.count(Operation::Collapse, Phase::After), 1);
    assert_eq!(rec.count(Operation::Expand, Phase::After), 0);

    drive::settle(&mut f.host, b);
    assert!(f.host.ui.doc.has_class(b, "is-expanded"));
    assert!(f.host.ui.doc.has_class(b, "has-animated"));
    assert_eq!(f.host.ui.doc.attr(f.el("cb"), "aria-hidden"), Some("false"));
    assert_eq!(rec.count(Operation::Expand, Phase::After), 1);
}

#[test]
fn late_animation_end_after_removal_is_a_noop() {
    let mut f = Fixture::parse(MARKUP).expect("markup");
    let accordion = Accordion::new(f.el("faq"), AccordionSettings::default()).expect("settings");
    let rec = Recorder::lifecycle(accordion.lifecycle());
    f.host.mount(accordion);
    let (b, tb) = (f.el("b"), f.el("tb"));

    drive::click(&mut f.host, tb);
    f.host.ui.remove_element(b);
    rec.take();
    assert!(!drive::settle(&mut f.host, b));
    assert_eq!(rec.count(Operation::Expand, Phase::After), 0);
}

#[test]
fn destroy_unbinds_every_toggle() {
    let mut f = Fixture::parse(MARKUP).expect("markup");
    let accordion = Accordion::new(f.el("faq"), AccordionSettings::default()).expect("settings");
    let tb = f.el("tb");
    let id = f.host.mount(accordion);
    assert_eq!(f.host.ui.listeners.count(id), 2);
    assert!(f.host.unmount(id));
    assert_eq!(f.host.ui.listeners.count(id), 0);
    assert!(!drive::click(&mut f.host, tb));
    assert!(f.host.ui.doc.has_class(f.el("b"), "is-collapsed"));
}

#[test]
fn second_click_before_the_first_settles_keeps_one_item_open() {
    let mut f = Fixture::parse(
        r#"
div.accordion#faq
  div.accordion-item#a
    button.accordion-toggle#ta
    div.accordion-content
  div.accordion-item#b
    button.accordion-toggle#tb
    div.accordion-content
"#,
    )
    .expect("markup");
    let accordion = Accordion::new(f.el("faq"), AccordionSettings::default()).expect("settings");
    f.host.mount(accordion);
    let (a, b, ta, tb) = (f.el("a"), f.el("b"), f.el("ta"), f.el("tb"));

    drive::click(&mut f.host, ta);
    drive::click(&mut f.host, tb);
    drive::settle_all(&mut f.host);

    let doc = &f.host.ui.doc;
    assert!(doc.has_class(a, "is-expanded"));
    assert!(doc.has_class(b, "is-collapsed"));
    assert_eq!(doc.attr(tb, "aria-expanded"), Some("false"));
}
