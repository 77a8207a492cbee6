#![forbid(unsafe_code)]

//! Headless widgets for Trellis.
//!
//! Every widget follows the same shape:
//!
//! - constructed from a scope element and a settings struct
//!   (`new(scope, settings)` or `with_options(scope, &options)`);
//! - `initialize` binds listeners, `destroy` unbinds them and tears down
//!   transient elements, `refresh` is `destroy` + `initialize`, both silent;
//! - each state-changing operation `op` brackets its mutation with
//!   before/after [`LifecycleEvent`]s and has an `op_silently` twin that
//!   publishes nothing;
//! - animated state changes settle when the host reports `animationend`.
//!
//! [`WidgetHost`] routes host events to mounted widgets.

pub mod accordion;
pub mod card;
pub mod chip;
pub mod config;
pub mod dropdown;
pub mod host;
pub mod lifecycle;
pub mod modal;
pub mod panel;
pub mod password_reveal;
pub mod placement;
pub mod popover;
pub mod removal;
pub mod remover;
pub mod settings;
pub mod smooth_scroll;
pub mod toast;
pub mod toggler;
pub mod tooltip;

use std::any::Any;

pub use accordion::{Accordion, AccordionSettings};
pub use card::{Card, CardSettings};
pub use chip::{Chip, ChipSettings};
pub use config::{Config, ConfigError};
pub use dropdown::{Dropdown, DropdownSettings};
pub use host::WidgetHost;
pub use lifecycle::{
    AnimationSpec, Emit, FocusTrap, Lifecycle, LifecycleEvent, Operation, Phase, Settle,
    Transition,
};
pub use modal::{
    Dialog, DialogKind, DialogOutcome, DialogSettings, Modal, ModalContent, ModalSettings,
};
pub use panel::{Panel, PanelSettings};
pub use password_reveal::{PasswordReveal, PasswordRevealSettings};
pub use popover::{Popover, PopoverSettings};
pub use remover::{Remover, RemoverSettings};
pub use settings::{Options, Settings};
pub use smooth_scroll::{SmoothScroll, SmoothScrollSettings};
pub use toast::{Feedback, ToastOptions, ToastPosition, Toaster, ToasterSettings};
pub use toggler::{Toggler, TogglerSettings};
pub use tooltip::{Tooltip, TooltipSettings, TooltipTrigger};

use trellis_core::event::Event;
use trellis_runtime::{OwnerId, Subscription, Ui};

/// A widget instance the host can drive.
///
/// Implementors provide the `*_with` methods; the plain and `*_silently`
/// forms are derived from them.
pub trait Widget: Any {
    fn lifecycle(&self) -> &Lifecycle;

    /// Bind listeners and normalize markup.
    fn initialize_with(&mut self, ui: &mut Ui, emit: Emit);

    /// Unbind listeners and tear down transient elements.
    fn destroy_with(&mut self, ui: &mut Ui, emit: Emit);

    /// React to a host event. Returns whether the widget handled it.
    fn handle_event(&mut self, ui: &mut Ui, event: &Event) -> bool;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn id(&self) -> OwnerId {
        self.lifecycle().id()
    }

    fn subscribe(&self, f: impl Fn(&LifecycleEvent) + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.lifecycle().subscribe(f)
    }

    fn refresh_with(&mut self, ui: &mut Ui, emit: Emit) {
        let lifecycle = self.lifecycle().clone();
        lifecycle.before(emit, Operation::Refresh, None);
        self.destroy_with(ui, Emit::Silent);
        self.initialize_with(ui, Emit::Silent);
        lifecycle.after(emit, Operation::Refresh, None);
    }

    fn initialize(&mut self, ui: &mut Ui) {
        self.initialize_with(ui, Emit::Notify);
    }

    fn initialize_silently(&mut self, ui: &mut Ui) {
        self.initialize_with(ui, Emit::Silent);
    }

    fn destroy(&mut self, ui: &mut Ui) {
        self.destroy_with(ui, Emit::Notify);
    }

    fn destroy_silently(&mut self, ui: &mut Ui) {
        self.destroy_with(ui, Emit::Silent);
    }

    fn refresh(&mut self, ui: &mut Ui) {
        self.refresh_with(ui, Emit::Notify);
    }

    fn refresh_silently(&mut self, ui: &mut Ui) {
        self.refresh_with(ui, Emit::Silent);
    }
}
