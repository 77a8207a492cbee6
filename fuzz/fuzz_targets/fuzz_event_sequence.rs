#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trellis_core::dom::ElementId;
use trellis_core::event::{Event, KeyCode, Modifiers};
use trellis_runtime::{Duration, HAS_OVERLAY};
use trellis_widgets::{
    Accordion, AccordionSettings, Dialog, DialogOutcome, DialogSettings, Dropdown,
    DropdownSettings, Modal, ModalSettings, Popover, PopoverSettings, Toaster, ToasterSettings,
    ToastOptions, Tooltip, TooltipSettings, WidgetHost,
};

#[derive(Debug, Arbitrary)]
enum Action {
    Click(u8),
    Enter(u8),
    Leave(u8),
    Focus(u8),
    Key(u8, bool),
    Input(u8, String),
    AnimationEnd(u8),
    Advance(u16),
    Toast(String, u16),
    Confirm,
    Answer(bool),
}

fn key(code: u8) -> KeyCode {
    match code % 8 {
        0 => KeyCode::Tab,
        1 => KeyCode::Escape,
        2 => KeyCode::Enter,
        3 => KeyCode::Backspace,
        4 => KeyCode::Left,
        5 => KeyCode::Right,
        6 => KeyCode::Home,
        _ => KeyCode::Char(char::from(b'a' + code % 26)),
    }
}

fuzz_target!(|actions: Vec<Action>| {
    let mut host = WidgetHost::default();
    let doc = &mut host.ui.doc;
    let acc = doc.build("div").class("accordion").append_to_body();
    for _ in 0..3 {
        let item = doc.build("div").class("accordion-item").append_to(acc);
        doc.build("button").class("accordion-toggle").append_to(item);
        doc.build("div").class("accordion-content").append_to(item);
    }
    let dd = doc.build("div").class("dropdown").append_to_body();
    doc.build("button").class("dropdown-toggle").append_to(dd);
    doc.build("ul").class("dropdown-menu").append_to(dd);
    doc.build("button").attr("data-tooltip", "tip").append_to_body();
    doc.build("button").attr("data-popover", "pop").append_to_body();
    doc.build("button").attr("data-modal", "").attr("data-modal-title", "M").append_to_body();
    let body = doc.body();

    let (Ok(a), Ok(d), Ok(t), Ok(p), Ok(m), Ok(g), Ok(toaster)) = (
        Accordion::new(acc, AccordionSettings::default()),
        Dropdown::new(body, DropdownSettings::default()),
        Tooltip::new(body, TooltipSettings::default()),
        Popover::new(body, PopoverSettings::default()),
        Modal::new(body, ModalSettings::default()),
        Dialog::new(body, DialogSettings::default()),
        Toaster::new(body, ToasterSettings::default()),
    ) else {
        return;
    };
    host.mount(a);
    host.mount(d);
    host.mount(t);
    host.mount(p);
    host.mount(m);
    let dialog = host.mount(g);
    let toaster = host.mount(toaster);

    for action in actions.into_iter().take(256) {
        let all: Vec<ElementId> = host.ui.doc.descendants(host.ui.doc.root());
        let pick = |i: u8| all.get(usize::from(i) % all.len().max(1)).copied();
        match action {
            Action::Click(i) => {
                if let Some(el) = pick(i) {
                    host.dispatch(&Event::click(el));
                }
            }
            Action::Enter(i) => {
                if let Some(el) = pick(i) {
                    host.dispatch(&Event::PointerEnter { target: el });
                }
            }
            Action::Leave(i) => {
                if let Some(el) = pick(i) {
                    host.dispatch(&Event::PointerLeave { target: el });
                }
            }
            Action::Focus(i) => {
                if let Some(el) = pick(i) {
                    host.dispatch(&Event::FocusIn { target: el });
                }
            }
            Action::Key(code, shift) => {
                let target = host.ui.doc.focused().unwrap_or(body);
                let mods = if shift { Modifiers::SHIFT } else { Modifiers::empty() };
                host.dispatch(&Event::key_with(target, key(code), mods));
            }
            Action::Input(i, value) => {
                if let Some(el) = pick(i) {
                    host.dispatch(&Event::Input { target: el, value });
                }
            }
            Action::AnimationEnd(i) => {
                if let Some(el) = pick(i) {
                    host.dispatch(&Event::animation_end(el));
                }
            }
            Action::Advance(ms) => {
                host.advance(Duration::from_millis(u64::from(ms)));
            }
            Action::Toast(message, ms) => {
                host.with::<Toaster, _>(toaster, |t, ui| {
                    t.show(ui, &message, ToastOptions::new().duration(u64::from(ms)))
                });
            }
            Action::Confirm => {
                host.with::<Dialog, _>(dialog, |d, ui| d.confirm(ui, "Sure?", ""));
            }
            Action::Answer(ok) => {
                let outcome = if ok { DialogOutcome::Ok } else { DialogOutcome::Cancel };
                host.with::<Dialog, _>(dialog, |d, ui| d.close(ui, outcome));
            }
        }
        let ui = &host.ui;
        assert_eq!(ui.doc.has_class(ui.doc.root(), HAS_OVERLAY), ui.overlays.is_open());
    }
});
