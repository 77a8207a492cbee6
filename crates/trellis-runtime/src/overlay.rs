#![forbid(unsafe_code)]

//! Overlay singleton guard.
//!
//! Modal-class widgets (modal, alert, confirm, prompt) must never stack. The
//! [`OverlayManager`] is the single holder of the "an overlay is open" flag
//! and mirrors it as the `has-overlay` class on the document root so CSS can
//! lock page scrolling.
//!
//! # Invariants
//!
//! - At most one [`OverlayTicket`] is live at a time.
//! - `has-overlay` is on the root iff a ticket is live.
//! - Only the live ticket can release the guard; releasing twice, or with a
//!   ticket from an earlier cycle, is a no-op returning `false`.
//!
//! # Failure Modes
//!
//! - `try_acquire` while held returns `None` (request ignored, not queued).

use trellis_core::dom::Document;

use crate::listeners::OwnerId;

/// Root class reflecting an open overlay.
pub const HAS_OVERLAY: &str = "has-overlay";

/// Proof of holding the overlay guard for one open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayTicket {
    seq: u64,
    owner: OwnerId,
}

impl OverlayTicket {
    /// The widget that acquired the guard.
    pub const fn owner(self) -> OwnerId {
        self.owner
    }
}

/// Process-wide (per [`Ui`](crate::Ui)) overlay flag.
#[derive(Debug, Default)]
pub struct OverlayManager {
    holder: Option<OverlayTicket>,
    next_seq: u64,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an overlay currently holds the guard.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.holder.is_some()
    }

    /// Owner of the live ticket, if any.
    pub fn holder(&self) -> Option<OwnerId> {
        self.holder.map(|t| t.owner)
    }

    /// Acquire the guard for `owner`, or `None` if another overlay is open.
    pub fn try_acquire(&mut self, doc: &mut Document, owner: OwnerId) -> Option<OverlayTicket> {
        if let Some(current) = self.holder {
            tracing::debug!(
                requested_by = owner.get(),
                held_by = current.owner.get(),
                "overlay already open; request ignored"
            );
            return None;
        }
        self.next_seq += 1;
        let ticket = OverlayTicket {
            seq: self.next_seq,
            owner,
        };
        self.holder = Some(ticket);
        doc.add_class(doc.root(), HAS_OVERLAY);
        tracing::trace!(owner = owner.get(), seq = ticket.seq, "overlay acquired");
        Some(ticket)
    }

    /// Release the guard if `ticket` is the live one.
    pub fn release(&mut self, doc: &mut Document, ticket: OverlayTicket) -> bool {
        if self.holder != Some(ticket) {
            return false;
        }
        self.holder = None;
        doc.remove_class(doc.root(), HAS_OVERLAY);
        tracing::trace!(owner = ticket.owner.get(), seq = ticket.seq, "overlay released");
        true
    }
}
