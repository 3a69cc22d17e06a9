//! Builder for a single state's hooks and outgoing transitions.

use crate::builder::transition::TransitionBuilder;
use crate::core::MachineEvent;
use crate::engine::Hook;

/// Declares what a state does on entry, on exit, and per event kind.
///
/// Calling [`StateBuilder::on`] several times with the same kind declares
/// ordered candidates; the first one whose guard passes wins.
pub struct StateBuilder<S, C, E: MachineEvent> {
    pub(crate) on_enter: Option<Hook<C, E>>,
    pub(crate) on_exit: Option<Hook<C, E>>,
    pub(crate) transitions: Vec<(E::Kind, TransitionBuilder<S, C, E>)>,
}

impl<S, C, E: MachineEvent> StateBuilder<S, C, E> {
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
            transitions: Vec::new(),
        }
    }

    /// Hook run when the state is entered.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C, Option<&E>) + 'static,
    {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Hook run when the state is left for another state.
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C, Option<&E>) + 'static,
    {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Append a candidate for events of `kind`.
    pub fn on(mut self, kind: E::Kind, transition: TransitionBuilder<S, C, E>) -> Self {
        self.transitions.push((kind, transition));
        self
    }
}

impl<S, C, E: MachineEvent> Default for StateBuilder<S, C, E> {
    fn default() -> Self {
        Self::new()
    }
}
