//! Core state machine types.
//!
//! This module contains the vocabulary every machine is written in:
//! - State identifiers via the `State` trait
//! - Typed, field-enumerable context via the `Context` trait
//! - Tagged events via the `MachineEvent` trait
//! - Guard predicates over context and event
//!
//! Nothing in here has side effects; the engine module owns execution.

mod context;
mod event;
mod guard;
mod state;

pub use context::{Context, ContextField};
pub use event::{EventKind, MachineEvent};
pub use guard::Guard;
pub use state::State;
