//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for declaring transition
//! tables with minimal boilerplate while keeping states, events and context
//! fields strongly typed.

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;
pub mod transition;

pub use error::{BuildError, TableViolation};
pub use machine::MachineBuilder;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;

use crate::core::State;

/// Start a transition candidate towards `target`.
///
/// # Example
///
/// ```
/// use brewstate::builder::transition_to;
/// use brewstate::state_enum;
///
/// state_enum! {
///     enum Pot {
///         Cold => "cold",
///         Hot => "hot",
///     }
/// }
///
/// let candidate = transition_to::<Pot, f64, ()>(Pot::Hot)
///     .when(|temperature: &f64, _: &()| *temperature < 100.0);
/// assert!(candidate.build().is_ok());
/// ```
pub fn transition_to<S, C, E>(target: S) -> TransitionBuilder<S, C, E>
where
    S: State,
    C: 'static,
    E: 'static,
{
    TransitionBuilder::new().to(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum TestState {
            Start => "start",
            End => "end",
        }
        final: [End]
    }

    #[test]
    fn transition_to_sets_target() {
        let transition = transition_to::<TestState, (), ()>(TestState::End)
            .build()
            .unwrap();

        assert_eq!(transition.target, TestState::End);
        assert!(transition.permits(&(), &()));
    }

    #[test]
    fn transition_to_respects_guard() {
        let transition = transition_to::<TestState, u32, ()>(TestState::Start)
            .when(|count, _| *count < 10)
            .build()
            .unwrap();

        assert!(transition.permits(&3, &()));
        assert!(!transition.permits(&10, &()));
    }
}
