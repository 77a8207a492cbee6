#![forbid(unsafe_code)]

//! Core: the headless element tree, selectors, host events, and geometry.
//!
//! # Role in Trellis
//! `trellis-core` is the foundation layer. It models the parts of a browser
//! document the widgets depend on (classes, attributes, focus, layout boxes)
//! without any rendering, and defines the event vocabulary the host uses to
//! drive widgets.
//!
//! # Primary responsibilities
//! - **Document**: element tree with class lists, `data-*` datasets, focus.
//! - **Selector**: the CSS subset used by widget settings.
//! - **Event**: click / pointer / focus / key / input / animation-end.
//! - **Geometry**: rectangles and side placement for floating elements.
//!
//! # How it fits in the system
//! The runtime (`trellis-runtime`) owns a `Document` inside its `Ui` host
//! context; widgets (`trellis-widgets`) mutate it in response to events.

pub mod dom;
pub mod event;
pub mod geometry;
pub mod selector;

pub use dom::{Document, ElementBuilder, ElementId};
pub use event::{Event, EventKind, KeyCode, KeyEvent, Modifiers};
pub use geometry::{Rect, Side, Size};
pub use selector::{Selector, SelectorError};
