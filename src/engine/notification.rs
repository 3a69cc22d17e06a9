//! Observable events a machine publishes.

use crate::core::{ContextField, State};
use std::fmt;

/// Subscription topic.
///
/// One topic per state for enter/exit, one per context field for updates,
/// and a single topic for every state change.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Topic<S, F> {
    StateEnter(S),
    StateExit(S),
    StateChange,
    ContextUpdate(F),
}

impl<S: State, F: ContextField> fmt::Display for Topic<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::StateEnter(state) => write!(f, "state.enter.{}", state.name()),
            Topic::StateExit(state) => write!(f, "state.exit.{}", state.name()),
            Topic::StateChange => f.write_str("state.change"),
            Topic::ContextUpdate(field) => write!(f, "context.update.{}", field.name()),
        }
    }
}

/// Payload of the lifecycle topics.
#[derive(Clone, Debug, PartialEq)]
pub struct StateChange<S, E> {
    pub previous: S,
    pub current: S,
    pub event: E,
}

/// Payload of a `context.update.<field>` topic.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldUpdate<F> {
    pub field: F,
    pub value: serde_json::Value,
}

/// Anything a machine emits.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification<S, F, E> {
    Lifecycle(StateChange<S, E>),
    ContextUpdate(FieldUpdate<F>),
}
