#![forbid(unsafe_code)]

//! proptest strategies for random user sessions.

use proptest::prelude::*;
use trellis_core::dom::ElementId;
use trellis_core::event::KeyCode;
use trellis_widgets::WidgetHost;

use crate::drive;

/// One user-level action. Element references are indices into a target
/// list supplied at replay time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Click(usize),
    Hover(usize),
    Leave(usize),
    Key(KeyCode),
    ShiftTab,
    SettleAll,
    Advance(u64),
}

pub fn key_code() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Enter),
        Just(KeyCode::Escape),
        Just(KeyCode::Tab),
        Just(KeyCode::Backspace),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
        proptest::char::range('a', 'z').prop_map(KeyCode::Char),
    ]
}

pub fn step(targets: usize) -> impl Strategy<Value = Step> {
    let idx = 0..targets.max(1);
    prop_oneof![
        4 => idx.clone().prop_map(Step::Click),
        1 => idx.clone().prop_map(Step::Hover),
        1 => idx.prop_map(Step::Leave),
        2 => key_code().prop_map(Step::Key),
        1 => Just(Step::ShiftTab),
        2 => Just(Step::SettleAll),
        1 => (0u64..3_000).prop_map(Step::Advance),
    ]
}

pub fn session(targets: usize, max_len: usize) -> impl Strategy<Value = Vec<Step>> {
    proptest::collection::vec(step(targets), 0..max_len)
}

/// Play `steps` against `host`. Indices past the end of `targets` wrap.
pub fn replay(host: &mut WidgetHost, targets: &[ElementId], steps: &[Step]) {
    let pick = |i: usize| targets.get(i % targets.len().max(1)).copied();
    for step in steps {
        match *step {
            Step::Click(i) => {
                if let Some(el) = pick(i) {
                    drive::click(host, el);
                }
            }
            Step::Hover(i) => {
                if let Some(el) = pick(i) {
                    drive::hover(host, el);
                }
            }
            Step::Leave(i) => {
                if let Some(el) = pick(i) {
                    drive::leave(host, el);
                }
            }
            Step::Key(code) => {
                drive::press(host, code);
            }
            Step::ShiftTab => {
                drive::shift_tab(host);
            }
            Step::SettleAll => {
                drive::settle_all(host);
            }
            Step::Advance(ms) => {
                drive::advance_ms(host, ms);
            }
        }
    }
}
