#![forbid(unsafe_code)]

//! Runtime: the host context widgets operate on.
//!
//! # Role in Trellis
//! `trellis-runtime` owns the mutable world a widget sees during an
//! operation: the [`Ui`] (document, clock, timers, completion handlers,
//! listener registry, side table, overlay guard, viewport) and the
//! [`Hooks`] observer channels used to publish lifecycle and result events.
//!
//! # How it fits in the system
//! Widgets (`trellis-widgets`) take `&mut Ui` in every operation. The host
//! feeds events through the widget host and drives time with
//! [`Ui::advance`] / [`Ui::tick`]; animation completions arrive through
//! [`Ui::animation_end`].

pub mod element_data;
pub mod hooks;
pub mod listeners;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod overlay;
pub mod timer;
pub mod ui;
pub mod viewport;

pub use element_data::ElementData;
pub use hooks::{Hooks, Subscription};
pub use listeners::{ListenerRegistry, OwnerId};
pub use overlay::{HAS_OVERLAY, OverlayManager, OverlayTicket};
pub use timer::{TimerId, TimerQueue};
pub use ui::{Deferred, Ui};
pub use viewport::{Easing, ScrollAnimation, Viewport};

pub use web_time::{Duration, Instant};
