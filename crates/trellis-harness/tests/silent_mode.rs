#![forbid(unsafe_code)]

//! `op_silently` mutates exactly like `op` and publishes nothing.

use trellis_core::dom::Document;
use trellis_harness::{Fixture, Recorder, drive};
use trellis_widgets::{
    Accordion, AccordionSettings, Modal, ModalContent, ModalSettings, PasswordReveal,
    PasswordRevealSettings, Toaster, ToasterSettings, ToastOptions, Widget,
};

const MARKUP: &str = r#"
div.accordion#faq
  div.accordion-item#a
    button.accordion-toggle
    div.accordion-content
  div.accordion-item#b[data-expanded=true]
    button.accordion-toggle
    div.accordion-content
div.password-reveal#pw
  input[type=password]
  button.password-reveal-toggle
button#focus-me
button#open[data-modal][data-modal-title=Terms][data-modal-content="Read carefully."]
"#;

fn snapshot(doc: &Document) -> Vec<(String, String, Vec<(String, String)>, String)> {
    doc.descendants(doc.root())
        .into_iter()
        .map(|el| {
            (
                doc.tag(el).unwrap_or_default().to_owned(),
                doc.class_name(el),
                doc.attrs(el)
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
                doc.text(el).unwrap_or_default().to_owned(),
            )
        })
        .collect()
}

/// Run `script` on two fresh fixtures, loudly and silently, and compare.
fn assert_equivalent(script: impl Fn(&mut Fixture, bool) -> Vec<usize>) {
    let mut loud = Fixture::parse(MARKUP).expect("markup");
    let mut quiet = Fixture::parse(MARKUP).expect("markup");
    let loud_events = script(&mut loud, false);
    let quiet_events = script(&mut quiet, true);
    assert_eq!(snapshot(&loud.host.ui.doc), snapshot(&quiet.host.ui.doc));
    assert_eq!(loud.host.ui.doc.focused(), quiet.host.ui.doc.focused());
    assert!(loud_events.iter().all(|&n| n > 0), "loud run published: {loud_events:?}");
    assert!(quiet_events.iter().all(|&n| n == 0), "silent run published: {quiet_events:?}");
}

#[test]
fn accordion_operations() {
    assert_equivalent(|f, silent| {
        let (faq, a) = (f.el("faq"), f.el("a"));
        let accordion = Accordion::new(faq, AccordionSettings::default()).expect("settings");
        let rec = Recorder::lifecycle(accordion.lifecycle());
        let id = f.host.mount(accordion);
        rec.take();
        let mut counts = Vec::new();
        f.host.with::<Accordion, _>(id, |acc, ui| {
            if silent {
                acc.expand_silently(ui, a);
            } else {
                acc.expand(ui, a);
            }
        });
        drive::settle_all(&mut f.host);
        counts.push(rec.take().len());
        f.host.with::<Accordion, _>(id, |acc, ui| {
            if silent {
                acc.refresh_silently(ui);
                acc.collapse_all_silently(ui);
            } else {
                acc.refresh(ui);
                acc.collapse_all(ui);
            }
        });
        drive::settle_all(&mut f.host);
        counts.push(rec.take().len());
        counts
    });
}

#[test]
fn modal_open_and_close() {
    assert_equivalent(|f, silent| {
        let (body, focus_me) = (f.body(), f.el("focus-me"));
        let modal = Modal::new(body, ModalSettings::default()).expect("settings");
        let rec = Recorder::lifecycle(modal.lifecycle());
        let id = f.host.mount(modal);
        rec.take();
        drive::focus(&mut f.host, focus_me);
        let content = ModalContent::new("Hello", "World");
        f.host.with::<Modal, _>(id, |m, ui| {
            if silent {
                m.open_silently(ui, content);
            } else {
                m.open(ui, content);
            }
        });
        drive::settle_all(&mut f.host);
        let opened = rec.take().len();
        f.host.with::<Modal, _>(id, |m, ui| {
            if silent {
                m.close_silently(ui);
            } else {
                m.close(ui);
            }
        });
        drive::settle_all(&mut f.host);
        vec![opened, rec.take().len()]
    });
}

#[test]
fn modal_opened_from_a_trigger() {
    assert_equivalent(|f, silent| {
        let (body, trigger) = (f.body(), f.el("open"));
        let modal = Modal::new(body, ModalSettings::default()).expect("settings");
        let rec = Recorder::lifecycle(modal.lifecycle());
        let id = f.host.mount(modal);
        rec.take();
        f.host.with::<Modal, _>(id, |m, ui| {
            if silent {
                m.open_from_silently(ui, trigger);
            } else {
                m.open_from(ui, trigger);
            }
        });
        drive::settle_all(&mut f.host);
        assert!(f.host.ui.overlays.is_open());
        let opened = rec.take().len();
        f.host.with::<Modal, _>(id, |m, ui| {
            if silent {
                m.close_silently(ui);
            } else {
                m.close(ui);
            }
        });
        drive::settle_all(&mut f.host);
        vec![opened, rec.take().len()]
    });
}

#[test]
fn dismissing_every_toast() {
    assert_equivalent(|f, silent| {
        let body = f.body();
        let toaster = Toaster::new(body, ToasterSettings::default()).expect("settings");
        let rec = Recorder::lifecycle(toaster.lifecycle());
        let id = f.host.mount(toaster);
        f.host.with::<Toaster, _>(id, |t, ui| {
            for message in ["Saved", "Synced"] {
                t.show_silently(ui, message, ToastOptions::new().sticky());
            }
        });
        drive::settle_all(&mut f.host);
        rec.take();
        let dismissed = f
            .host
            .with::<Toaster, _>(id, |t, ui| {
                if silent {
                    t.dismiss_all_silently(ui)
                } else {
                    t.dismiss_all(ui)
                }
            })
            .unwrap_or_default();
        assert_eq!(dismissed, 2);
        drive::settle_all(&mut f.host);
        let remaining = f.host.with::<Toaster, _>(id, |t, ui| t.toasts(ui).len());
        assert_eq!(remaining, Some(0));
        vec![rec.take().len()]
    });
}

#[test]
fn password_reveal_and_toasts() {
    assert_equivalent(|f, silent| {
        let (body, pw) = (f.body(), f.el("pw"));
        let reveal = PasswordReveal::new(body, PasswordRevealSettings::default()).expect("settings");
        let toaster = Toaster::new(body, ToasterSettings::default()).expect("settings");
        let reveal_rec = Recorder::lifecycle(reveal.lifecycle());
        let toast_rec = Recorder::lifecycle(toaster.lifecycle());
        let reveal = f.host.mount(reveal);
        let toaster = f.host.mount(toaster);
        reveal_rec.take();
        toast_rec.take();

        f.host.with::<PasswordReveal, _>(reveal, |p, ui| {
            if silent {
                p.toggle_silently(ui, pw);
            } else {
                p.toggle(ui, pw);
            }
        });
        f.host.with::<Toaster, _>(toaster, |t, ui| {
            let options = ToastOptions::new().title("Saved").sticky();
            if silent {
                t.show_silently(ui, "Draft stored", options);
            } else {
                t.show(ui, "Draft stored", options);
            }
        });
        drive::settle_all(&mut f.host);
        vec![reveal_rec.take().len(), toast_rec.take().len()]
    });
}
