#![forbid(unsafe_code)]

//! Host events delivered to widgets.
//!
//! Events are deliberately coarse: the host (browser bridge, test harness,
//! fuzzer) translates its native input into these variants and feeds them
//! to `WidgetHost::dispatch`. Each event carries the element it happened on.
//!
//! # Propagation
//!
//! Click, focus, key and input events bubble: listener routing walks from the
//! target up through its ancestors. Pointer enter/leave and animation end do
//! not bubble; only the target itself is considered.

use bitflags::bitflags;

use crate::dom::ElementId;

bitflags! {
    /// Keyboard modifiers held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

/// Logical key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    pub const fn with_modifiers(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Listener category used when binding handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Click,
    PointerEnter,
    PointerLeave,
    FocusIn,
    FocusOut,
    KeyDown,
    Input,
    AnimationEnd,
}

impl EventKind {
    /// Whether events of this kind propagate to ancestors.
    pub const fn bubbles(self) -> bool {
        !matches!(
            self,
            Self::PointerEnter | Self::PointerLeave | Self::AnimationEnd
        )
    }
}

/// A host event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    Click { target: ElementId },
    PointerEnter { target: ElementId },
    PointerLeave { target: ElementId },
    FocusIn { target: ElementId },
    FocusOut { target: ElementId },
    Key { target: ElementId, key: KeyEvent },
    /// The value of a text control changed.
    Input { target: ElementId, value: String },
    /// A CSS animation finished on `target`.
    AnimationEnd { target: ElementId },
}

impl Event {
    pub fn click(target: ElementId) -> Self {
        Self::Click { target }
    }

    pub fn key(target: ElementId, code: KeyCode) -> Self {
        Self::Key {
            target,
            key: KeyEvent::new(code),
        }
    }

    pub fn key_with(target: ElementId, code: KeyCode, modifiers: Modifiers) -> Self {
        Self::Key {
            target,
            key: KeyEvent::with_modifiers(code, modifiers),
        }
    }

    pub fn animation_end(target: ElementId) -> Self {
        Self::AnimationEnd { target }
    }

    /// The element the event happened on.
    pub fn target(&self) -> ElementId {
        match self {
            Self::Click { target }
            | Self::PointerEnter { target }
            | Self::PointerLeave { target }
            | Self::FocusIn { target }
            | Self::FocusOut { target }
            | Self::Key { target, .. }
            | Self::Input { target, .. }
            | Self::AnimationEnd { target } => *target,
        }
    }

    /// Listener category of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click { .. } => EventKind::Click,
            Self::PointerEnter { .. } => EventKind::PointerEnter,
            Self::PointerLeave { .. } => EventKind::PointerLeave,
            Self::FocusIn { .. } => EventKind::FocusIn,
            Self::FocusOut { .. } => EventKind::FocusOut,
            Self::Key { .. } => EventKind::KeyDown,
            Self::Input { .. } => EventKind::Input,
            Self::AnimationEnd { .. } => EventKind::AnimationEnd,
        }
    }

    /// The key payload, if this is a key event.
    pub fn key_event(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Whether this is a press of `code` (modifiers ignored).
    pub fn is_key(&self, code: KeyCode) -> bool {
        self.key_event().is_some_and(|k| k.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn kind_and_target_roundtrip() {
        let mut doc = Document::new();
        let el = doc.create_element("button");
        let ev = Event::key_with(el, KeyCode::Tab, Modifiers::SHIFT);
        assert_eq!(ev.kind(), EventKind::KeyDown);
        assert_eq!(ev.target(), el);
        assert!(ev.key_event().is_some_and(KeyEvent::shift));
        assert!(ev.is_key(KeyCode::Tab));
        assert!(!ev.is_key(KeyCode::Escape));
    }

    #[test]
    fn pointer_events_do_not_bubble() {
        assert!(!EventKind::PointerEnter.bubbles());
        assert!(!EventKind::AnimationEnd.bubbles());
        assert!(EventKind::Click.bubbles());
        assert!(EventKind::KeyDown.bubbles());
    }
}
