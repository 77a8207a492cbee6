#![forbid(unsafe_code)]

//! Event helpers that stand in for the browser.
//!
//! Each helper builds the host event a real user action would produce and
//! delivers it through [`WidgetHost::dispatch`].

use trellis_core::dom::ElementId;
use trellis_core::event::{Event, KeyCode, Modifiers};
use trellis_runtime::Duration;
use trellis_widgets::WidgetHost;

/// Upper bound on completion rounds in [`settle_all`]; a widget that keeps
/// starting animations from its own completions would otherwise never stop.
const MAX_SETTLE_ROUNDS: usize = 64;

pub fn click(host: &mut WidgetHost, el: ElementId) -> bool {
    host.dispatch(&Event::click(el))
}

pub fn hover(host: &mut WidgetHost, el: ElementId) -> bool {
    host.dispatch(&Event::PointerEnter { target: el })
}

pub fn leave(host: &mut WidgetHost, el: ElementId) -> bool {
    host.dispatch(&Event::PointerLeave { target: el })
}

pub fn focus(host: &mut WidgetHost, el: ElementId) -> bool {
    host.dispatch(&Event::FocusIn { target: el })
}

pub fn blur(host: &mut WidgetHost, el: ElementId) -> bool {
    host.dispatch(&Event::FocusOut { target: el })
}

/// Key press on the focused element, or on `body` when nothing has focus.
pub fn press(host: &mut WidgetHost, code: KeyCode) -> bool {
    press_with(host, code, Modifiers::empty())
}

pub fn press_with(host: &mut WidgetHost, code: KeyCode, modifiers: Modifiers) -> bool {
    let target = host.ui.doc.focused().unwrap_or_else(|| host.ui.doc.body());
    host.dispatch(&Event::key_with(target, code, modifiers))
}

pub fn tab(host: &mut WidgetHost) -> bool {
    press(host, KeyCode::Tab)
}

pub fn shift_tab(host: &mut WidgetHost) -> bool {
    press_with(host, KeyCode::Tab, Modifiers::SHIFT)
}

/// Replace an input's value, as the browser's `input` event reports it.
pub fn input(host: &mut WidgetHost, el: ElementId, value: &str) -> bool {
    host.dispatch(&Event::Input {
        target: el,
        value: value.to_owned(),
    })
}

/// Report `animationend` for one element.
pub fn settle(host: &mut WidgetHost, el: ElementId) -> bool {
    host.dispatch(&Event::animation_end(el))
}

/// Report `animationend` for every element with a pending completion,
/// repeating while completions start new animations. Returns how many
/// signals were delivered.
pub fn settle_all(host: &mut WidgetHost) -> usize {
    let mut delivered = 0;
    for _ in 0..MAX_SETTLE_ROUNDS {
        let pending = host.ui.pending_animations();
        if pending.is_empty() {
            break;
        }
        for el in pending {
            host.dispatch(&Event::animation_end(el));
            delivered += 1;
        }
    }
    delivered
}

pub fn advance_ms(host: &mut WidgetHost, ms: u64) -> usize {
    host.advance(Duration::from_millis(ms))
}
