#![forbid(unsafe_code)]

//! Shared machinery every widget composes: hook emission, animation-gated
//! transitions, the focus trap, and the collapse/expand state machine.

mod collapsible;
mod controller;
mod focus_trap;
mod transition;

pub use collapsible::{COLLAPSED, EXPANDED, Collapsible};
pub use controller::{Emit, Lifecycle, LifecycleEvent, Operation, Phase};
pub use focus_trap::{FocusTrap, TrapKey};
pub use transition::{
    AnimationSpec, Direction, HAS_ANIMATED, IS_ANIMATING, IS_ANIMATING_IN, IS_ANIMATING_OUT,
    Settle, Transition, is_animating,
};
