//! Transition table types.

use crate::core::{Guard, MachineEvent, State};
use std::collections::HashMap;

/// Transition action: mutates a working copy of the context.
pub type Action<C, E> = Box<dyn Fn(&mut C, &E)>;

/// State entry/exit hook. The event is absent only for the initial entry.
pub type Hook<C, E> = Box<dyn Fn(&mut C, Option<&E>)>;

/// One candidate for a `(state, event kind)` pair.
pub struct Transition<S, C, E> {
    pub target: S,
    pub guard: Option<Guard<C, E>>,
    pub action: Option<Action<C, E>>,
}

impl<S: State, C, E> Transition<S, C, E> {
    /// Whether the guard (if any) accepts this context and event.
    pub fn permits(&self, context: &C, event: &E) -> bool {
        self.guard.as_ref().map_or(true, |g| g.check(context, event))
    }

    /// Run the action (if any) against `working`.
    pub fn apply(&self, working: &mut C, event: &E) {
        if let Some(action) = &self.action {
            action(working, event);
        }
    }
}

/// Hooks and outgoing transitions of a single state.
pub struct StateConfig<S, C, E: MachineEvent> {
    pub(crate) on_enter: Option<Hook<C, E>>,
    pub(crate) on_exit: Option<Hook<C, E>>,
    pub(crate) transitions: HashMap<E::Kind, Vec<Transition<S, C, E>>>,
}

impl<S, C, E: MachineEvent> StateConfig<S, C, E> {
    /// Ordered candidates for `kind`, if the state declares any.
    pub fn candidates(&self, kind: &E::Kind) -> Option<&[Transition<S, C, E>]> {
        self.transitions.get(kind).map(Vec::as_slice)
    }

    pub(crate) fn enter(&self, context: &mut C, event: Option<&E>) {
        if let Some(hook) = &self.on_enter {
            hook(context, event);
        }
    }

    pub(crate) fn exit(&self, context: &mut C, event: Option<&E>) {
        if let Some(hook) = &self.on_exit {
            hook(context, event);
        }
    }
}

/// Validated, immutable machine table.
pub struct MachineConfig<S, C, E: MachineEvent> {
    pub(crate) initial: S,
    pub(crate) states: HashMap<S, StateConfig<S, C, E>>,
}

impl<S: State, C, E: MachineEvent> MachineConfig<S, C, E> {
    /// State the machine starts in.
    pub fn initial(&self) -> S {
        self.initial
    }

    /// Entry for `state`, if declared.
    pub fn state(&self, state: &S) -> Option<&StateConfig<S, C, E>> {
        self.states.get(state)
    }

    /// Declared states, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.states.keys()
    }
}
