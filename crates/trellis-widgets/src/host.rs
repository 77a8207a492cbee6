#![forbid(unsafe_code)]

//! Event dispatch over a set of mounted widgets.
//!
//! [`WidgetHost`] owns the [`Ui`] and the widgets, and is what an embedding
//! (browser bridge, test harness, fuzzer) talks to:
//!
//! - `AnimationEnd` events go straight to the completion registry.
//! - `FocusIn` / `FocusOut` update document focus before widgets see them.
//! - Everything else is offered to every widget in mount order.
//! - An unhandled Tab falls back to document-order focus navigation.

use trellis_core::event::{Event, KeyCode};
use trellis_runtime::{Duration, Instant, OwnerId, Ui};

use crate::Widget;

pub struct WidgetHost {
    pub ui: Ui,
    widgets: Vec<Box<dyn Widget>>,
}

impl std::fmt::Debug for WidgetHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetHost")
            .field("ui", &self.ui)
            .field("widgets", &self.widgets.len())
            .finish()
    }
}

impl Default for WidgetHost {
    fn default() -> Self {
        Self::new(Ui::new())
    }
}

impl WidgetHost {
    pub fn new(ui: Ui) -> Self {
        Self {
            ui,
            widgets: Vec::new(),
        }
    }

    /// Take ownership of `widget` without initializing it.
    pub fn add<W: Widget>(&mut self, widget: W) -> OwnerId {
        let id = widget.id();
        self.widgets.push(Box::new(widget));
        id
    }

    /// Add and initialize `widget`.
    pub fn mount<W: Widget>(&mut self, mut widget: W) -> OwnerId {
        widget.initialize(&mut self.ui);
        self.add(widget)
    }

    /// Destroy and drop a widget. Returns `false` for unknown ids.
    pub fn unmount(&mut self, id: OwnerId) -> bool {
        let Some(pos) = self.widgets.iter().position(|w| w.id() == id) else {
            return false;
        };
        let mut widget = self.widgets.remove(pos);
        widget.destroy(&mut self.ui);
        true
    }

    /// Run `f` against the widget `id`, if it is a `W`.
    pub fn with<W: Widget, R>(&mut self, id: OwnerId, f: impl FnOnce(&mut W, &mut Ui) -> R) -> Option<R> {
        let widget = self.widgets.iter_mut().find(|w| w.id() == id)?;
        let typed = widget.as_any_mut().downcast_mut::<W>()?;
        Some(f(typed, &mut self.ui))
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Deliver one host event. Returns whether anything handled it.
    pub fn dispatch(&mut self, event: &Event) -> bool {
        let _span = tracing::trace_span!("dispatch", kind = ?event.kind(), element = %event.target()).entered();
        match *event {
            Event::AnimationEnd { target } => return self.ui.animation_end(target) > 0,
            Event::FocusIn { target } => {
                self.ui.doc.focus(target);
            }
            Event::FocusOut { target } => {
                if self.ui.doc.focused() == Some(target) {
                    self.ui.doc.blur();
                }
            }
            _ => {}
        }
        let mut handled = false;
        for widget in &mut self.widgets {
            handled |= widget.handle_event(&mut self.ui, event);
        }
        if !handled
            && let Some(key) = event.key_event()
            && key.code == KeyCode::Tab
        {
            self.ui.doc.move_focus(!key.shift());
            handled = true;
        }
        handled
    }

    pub fn advance(&mut self, delta: Duration) -> usize {
        self.ui.advance(delta)
    }

    pub fn tick(&mut self, now: Instant) -> usize {
        self.ui.tick(now)
    }
}
