#![forbid(unsafe_code)]

//! Before/after hook emission shared by every widget.
//!
//! Each widget instance owns one [`Lifecycle`]: its identity plus a
//! [`Hooks`] channel of [`LifecycleEvent`]s. Operations bracket their
//! mutations with [`Lifecycle::before`] and [`Lifecycle::after`]; passing
//! [`Emit::Silent`] suppresses both while leaving the mutation untouched.
//!
//! `Lifecycle` is cheap to clone (the hook list is shared), which is how an
//! operation carries its `after` emission into a deferred completion handler.

use trellis_core::dom::ElementId;
use trellis_runtime::{Hooks, OwnerId, Subscription};

/// Whether an operation publishes lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Emit {
    #[default]
    Notify,
    Silent,
}

impl Emit {
    #[inline]
    pub const fn is_silent(self) -> bool {
        matches!(self, Self::Silent)
    }
}

/// State-changing operations that publish lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    Destroy,
    Refresh,
    Open,
    Close,
    Show,
    Hide,
    Toggle,
    Expand,
    Collapse,
    Insert,
    Remove,
    Scroll,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Destroy => "destroy",
            Self::Refresh => "refresh",
            Self::Open => "open",
            Self::Close => "close",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Toggle => "toggle",
            Self::Expand => "expand",
            Self::Collapse => "collapse",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Scroll => "scroll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// One published lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Instance that emitted the event.
    pub widget: OwnerId,
    /// Widget type name (`"accordion"`, `"modal"`, ...).
    pub kind: &'static str,
    pub operation: Operation,
    pub phase: Phase,
    /// Element the operation acted on, when there is one.
    pub target: Option<ElementId>,
}

/// Identity and hook channel of one widget instance.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    id: OwnerId,
    kind: &'static str,
    hooks: Hooks<LifecycleEvent>,
}

impl Lifecycle {
    pub fn new(kind: &'static str) -> Self {
        Self {
            id: OwnerId::next(),
            kind,
            hooks: Hooks::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn hooks(&self) -> &Hooks<LifecycleEvent> {
        &self.hooks
    }

    /// Receive every lifecycle event of this instance.
    pub fn subscribe(&self, f: impl Fn(&LifecycleEvent) + 'static) -> Subscription {
        self.hooks.subscribe(f)
    }

    /// Receive only `phase` events of `operation`.
    pub fn on(
        &self,
        operation: Operation,
        phase: Phase,
        f: impl Fn(&LifecycleEvent) + 'static,
    ) -> Subscription {
        self.hooks.subscribe(move |ev| {
            if ev.operation == operation && ev.phase == phase {
                f(ev);
            }
        })
    }

    pub fn before(&self, emit: Emit, operation: Operation, target: Option<ElementId>) {
        self.publish(emit, operation, Phase::Before, target);
    }

    pub fn after(&self, emit: Emit, operation: Operation, target: Option<ElementId>) {
        self.publish(emit, operation, Phase::After, target);
    }

    fn publish(&self, emit: Emit, operation: Operation, phase: Phase, target: Option<ElementId>) {
        tracing::trace!(
            widget = self.kind,
            id = self.id.get(),
            op = operation.as_str(),
            ?phase,
            element = target.map(|t| t.get()),
            silent = emit.is_silent(),
            "lifecycle"
        );
        if emit.is_silent() {
            return;
        }
        self.hooks.emit(&LifecycleEvent {
            widget: self.id,
            kind: self.kind,
            operation,
            phase,
            target,
        });
    }
}
