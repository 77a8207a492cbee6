#![forbid(unsafe_code)]

//! Trellis: headless UI widgets with animation-gated lifecycles.
//!
//! This crate re-exports the workspace under one name:
//!
//! - [`core`]: element tree, selectors, host events, geometry
//! - [`runtime`]: the `Ui` host context, timers, hooks, overlay guard
//! - [`widgets`]: accordion, modal, dropdown, tooltip, toast and the rest
//!
//! Most embeddings only need the [`prelude`].
//!
//! ```ignore
//! use trellis::prelude::*;
//!
//! let mut host = WidgetHost::default();
//! let body = host.ui.doc.body();
//! let config = Config::from_toml_str(include_str!("trellis.toml"))?;
//! host.mount(Accordion::new(body, config.settings()?)?);
//! host.dispatch(&Event::click(toggle));
//! host.dispatch(&Event::animation_end(item));
//! ```

pub use trellis_core as core;
pub use trellis_runtime as runtime;
#[cfg(feature = "widgets")]
pub use trellis_widgets as widgets;

#[cfg(feature = "tracing-json")]
pub use trellis_runtime::logging;

pub mod prelude {
    pub use trellis_core::{
        Document, ElementId, Event, EventKind, KeyCode, KeyEvent, Modifiers, Rect, Selector,
        Side,
    };
    pub use trellis_runtime::{Duration, Hooks, Instant, OwnerId, Subscription, Ui};

    #[cfg(feature = "widgets")]
    pub use trellis_widgets::{
        Accordion, AccordionSettings, Card, CardSettings, Chip, ChipSettings, Config,
        ConfigError, Dialog, DialogKind, DialogOutcome, DialogSettings, Dropdown,
        DropdownSettings, Emit, Feedback, LifecycleEvent, Modal, ModalContent, ModalSettings,
        Operation, Options, Panel, PanelSettings, PasswordReveal, PasswordRevealSettings, Phase,
        Popover, PopoverSettings, Remover, RemoverSettings, Settings, SmoothScroll,
        SmoothScrollSettings, ToastOptions, ToastPosition, Toaster, ToasterSettings, Toggler,
        TogglerSettings, Tooltip, TooltipSettings, TooltipTrigger, Widget, WidgetHost,
    };
}
