#![forbid(unsafe_code)]

//! Modal-class overlays: the [`Modal`] widget and the alert / confirm /
//! prompt [`Dialog`] presets.
//!
//! # Overlay guard
//!
//! Both acquire the per-`Ui` overlay guard before building anything. While
//! one overlay is open (or still animating out) every other open request is
//! ignored: no lifecycle events, no markup, `has-overlay` untouched. The
//! guard is released only after the closing frame has been removed.
//!
//! # Focus management
//!
//! - **Auto-focus**: the first focusable element in the dialog gets focus
//!   on open.
//! - **Focus trap**: Tab / Shift+Tab cycle inside the dialog.
//! - **Focus restore**: the element focused before opening regains focus
//!   after close, if it is still in the document.
//!
//! # Example
//!
//! ```ignore
//! use trellis_widgets::modal::{Dialog, DialogOutcome, DialogSettings};
//!
//! let mut dialog = Dialog::new(ui.doc.body(), DialogSettings::default())?;
//! let _sub = dialog.on_result(|outcome| {
//!     if let DialogOutcome::Input(name) = outcome {
//!         println!("hello {name}");
//!     }
//! });
//! dialog.prompt(&mut ui, "Name", "Who are you?", "");
//! ```

mod container;
mod dialog;
mod frame;

pub use container::{Modal, ModalContent, ModalSettings};
pub use dialog::{Dialog, DialogKind, DialogOutcome, DialogSettings, PromptBuffer};
pub use frame::Frame;
