#![forbid(unsafe_code)]

//! Tab cycling inside a trapped container.

use trellis_core::event::{KeyCode, KeyEvent, Modifiers};
use trellis_harness::Fixture;
use trellis_widgets::lifecycle::{FocusTrap, TrapKey};

const TAB: KeyEvent = KeyEvent::new(KeyCode::Tab);
const SHIFT_TAB: KeyEvent = KeyEvent::with_modifiers(KeyCode::Tab, Modifiers::SHIFT);

#[test]
fn three_focusables_wrap_both_ways() {
    let mut f = Fixture::parse(
        r##"
button#outside
div#box
  button#a
  span "not focusable"
  input#b
  button#skip[disabled]
  a#c[href="#"]
"##,
    )
    .expect("markup");
    let (outside, a, b, c) = (f.el("outside"), f.el("a"), f.el("b"), f.el("c"));
    let container = f.el("box");
    let doc = &mut f.host.ui.doc;
    doc.focus(outside);

    let trap = FocusTrap::activate(doc, container);
    assert_eq!(doc.focused(), Some(a));

    assert_eq!(trap.handle_key(doc, &TAB), TrapKey::Consumed);
    assert_eq!(doc.focused(), Some(b));
    trap.handle_key(doc, &TAB);
    assert_eq!(doc.focused(), Some(c));
    trap.handle_key(doc, &TAB);
    assert_eq!(doc.focused(), Some(a));
    trap.handle_key(doc, &SHIFT_TAB);
    assert_eq!(doc.focused(), Some(c));

    // Focus that escaped the container is pulled back in.
    doc.focus(outside);
    trap.handle_key(doc, &SHIFT_TAB);
    assert_eq!(doc.focused(), Some(c));

    assert_eq!(trap.handle_key(doc, &KeyEvent::new(KeyCode::Escape)), TrapKey::Escape);
    assert_eq!(trap.handle_key(doc, &KeyEvent::new(KeyCode::Enter)), TrapKey::Ignored);

    trap.release(doc);
    assert_eq!(doc.focused(), Some(outside));
}

#[test]
fn zero_focusables_consume_tab_without_moving_focus() {
    let mut f = Fixture::parse("button#outside\ndiv#box\n  p \"Nothing to focus.\"\n").expect("markup");
    let (outside, container) = (f.el("outside"), f.el("box"));
    let doc = &mut f.host.ui.doc;
    doc.focus(outside);

    let trap = FocusTrap::activate(doc, container);
    assert_eq!(doc.focused(), Some(outside));
    assert_eq!(trap.handle_key(doc, &TAB), TrapKey::Consumed);
    assert_eq!(trap.handle_key(doc, &SHIFT_TAB), TrapKey::Consumed);
    assert_eq!(doc.focused(), Some(outside));
}

#[test]
fn release_skips_a_removed_previous_element() {
    let mut f = Fixture::parse("button#outside\ndiv#box\n  button#a\n").expect("markup");
    let (outside, a, container) = (f.el("outside"), f.el("a"), f.el("box"));
    let doc = &mut f.host.ui.doc;
    doc.focus(outside);
    let trap = FocusTrap::activate(doc, container);
    doc.remove(outside);
    trap.release(doc);
    assert_ne!(doc.focused(), Some(a));
    assert_ne!(doc.focused(), Some(outside));
}
