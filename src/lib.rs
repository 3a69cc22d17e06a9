//! Brewstate: a strongly-typed, event-driven state machine engine and the
//! brewing appliance machines built on it.
//!
//! Machines are declared as static transition tables and driven by
//! synchronous `send` calls. Every committed change is published on a typed
//! notification bus that collaborators subscribe to.
//!
//! # Core Concepts
//!
//! - **State**: `Copy` enum implementing [`State`], generated by [`state_enum!`]
//! - **Event**: enum implementing [`MachineEvent`], tagged by a kind enum,
//!   generated by [`event_enum!`]
//! - **Context**: struct implementing [`Context`], one field enum variant per
//!   field, generated by [`context_struct!`]
//! - **Transitions**: ordered candidates per `(state, event kind)`, each with
//!   an optional guard and action; the first passing candidate wins
//! - **Topics**: `state.enter.<state>`, `state.exit.<state>`, `state.change`
//!   and `context.update.<field>`
//!
//! # Example
//!
//! ```rust
//! use brewstate::builder::{transition_to, MachineBuilder, StateBuilder};
//! use brewstate::{context_struct, event_enum, state_enum};
//!
//! state_enum! {
//!     pub enum Kettle {
//!         Cold => "cold",
//!         Boiling => "boiling",
//!     }
//! }
//!
//! event_enum! {
//!     pub enum KettleEvent: KettleEventKind {
//!         Switch { target: f64 },
//!         Off,
//!     }
//! }
//!
//! context_struct! {
//!     #[derive(Default)]
//!     pub struct KettleContext: KettleField {
//!         Target => target: f64,
//!     }
//! }
//!
//! let kettle = MachineBuilder::<Kettle, KettleContext, KettleEvent>::new()
//!     .initial(Kettle::Cold)
//!     .context(KettleContext::default())
//!     .state(
//!         Kettle::Cold,
//!         StateBuilder::new().on(
//!             KettleEventKind::Switch,
//!             transition_to(Kettle::Boiling).action(
//!                 |ctx: &mut KettleContext, event: &KettleEvent| {
//!                     if let KettleEvent::Switch { target } = event {
//!                         ctx.target = *target;
//!                     }
//!                 },
//!             ),
//!         ),
//!     )
//!     .state(
//!         Kettle::Boiling,
//!         StateBuilder::new().on(KettleEventKind::Off, transition_to(Kettle::Cold)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! kettle.on_state_enter(Kettle::Boiling, |change| {
//!     assert_eq!(change.previous, Kettle::Cold);
//! });
//!
//! assert_eq!(kettle.send(KettleEvent::Switch { target: 100.0 }), Kettle::Boiling);
//! assert_eq!(kettle.context().target, 100.0);
//! assert_eq!(kettle.send(KettleEvent::Off), Kettle::Cold);
//! ```

pub mod appliance;
pub mod builder;
pub mod calc;
pub mod clock;
pub mod command;
pub mod config;
pub mod control;
pub mod core;
pub mod emitter;
pub mod engine;
pub mod machines;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

// Re-export commonly used types
pub use builder::{transition_to, BuildError, MachineBuilder, StateBuilder, TransitionBuilder};
pub use core::{Context, ContextField, EventKind, Guard, MachineEvent, State};
pub use engine::{Machine, Notification, Topic, WeakMachine};
