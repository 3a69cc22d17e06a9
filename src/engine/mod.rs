//! Machine execution.
//!
//! This module runs a validated transition table against events:
//!
//! - **Transitions**: guard, action and target per `(state, event kind)`
//! - **Machine**: current state, context, and the notification bus
//! - **Notifications**: `state.enter.*`, `state.exit.*`, `state.change`
//!   and `context.update.*` topics
//!
//! # Update semantics
//!
//! `send` resolves on the first candidate whose guard passes. Actions and
//! hooks work on copies of the context; the engine diffs the result against
//! the live context and commits it before any subscriber hears about it.
//! Self-transitions publish only field updates. Cross-state transitions
//! publish field updates, then exit, enter and change, in that order.

mod machine;
mod notification;
mod transition;

pub use machine::{
    Machine, MachineNotification, MachineSubscription, MachineTopic, WeakMachine,
};
pub use notification::{FieldUpdate, Notification, StateChange, Topic};
pub use transition::{Action, Hook, MachineConfig, StateConfig, Transition};
