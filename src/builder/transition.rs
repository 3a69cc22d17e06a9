//! Builder for transition candidates.

use crate::builder::error::BuildError;
use crate::core::{Guard, State};
use crate::engine::{Action, Transition};

/// Builder for a single transition candidate with a fluent API.
pub struct TransitionBuilder<S, C, E> {
    target: Option<S>,
    guard: Option<Guard<C, E>>,
    action: Option<Action<C, E>>,
}

impl<S: State, C: 'static, E: 'static> TransitionBuilder<S, C, E> {
    pub fn new() -> Self {
        Self {
            target: None,
            guard: None,
            action: None,
        }
    }

    /// Set the target state (required). Targeting the source state makes a
    /// self-transition.
    pub fn to(mut self, state: S) -> Self {
        self.target = Some(state);
        self
    }

    /// Add a guard (optional).
    pub fn guard(mut self, guard: Guard<C, E>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C, &E) -> bool + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Set the context action (optional).
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut C, &E) + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, C, E>, BuildError> {
        let target = self.target.ok_or(BuildError::MissingTarget)?;

        Ok(Transition {
            target,
            guard: self.guard,
            action: self.action,
        })
    }
}

impl<S: State, C: 'static, E: 'static> Default for TransitionBuilder<S, C, E> {
    fn default() -> Self {
        Self::new()
    }
}
