#![forbid(unsafe_code)]

//! Test harness for Trellis widgets.
//!
//! - [`Fixture`]: build a document from indented markup and look elements
//!   up by `#id`.
//! - [`drive`]: click / key / focus / `animationend` helpers that go through
//!   [`WidgetHost::dispatch`](trellis_widgets::WidgetHost::dispatch).
//! - [`Recorder`]: capture lifecycle or result events from a hook channel.
//! - [`strategies`]: proptest strategies for random user sessions.
//!
//! ```ignore
//! let mut f = Fixture::parse(r#"
//! div.accordion#faq
//!   div.accordion-item#one
//!     button.accordion-toggle#t1
//!     div.accordion-content
//! "#)?;
//! let accordion = Accordion::new(f.el("faq"), AccordionSettings::default())?;
//! let rec = Recorder::lifecycle(accordion.lifecycle());
//! f.host.mount(accordion);
//! let toggle = f.el("t1");
//! drive::click(&mut f.host, toggle);
//! drive::settle_all(&mut f.host);
//! ```

pub mod drive;
pub mod fixture;
pub mod recorder;
pub mod strategies;

pub use fixture::{Fixture, FixtureError, FixtureErrorKind};
pub use recorder::Recorder;
