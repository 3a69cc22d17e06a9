//! Build errors for machines and transitions.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Context not specified. Call .context(value) before .build()")]
    MissingContext,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingTarget,

    #[error("Invalid transition table: {}", describe(.0))]
    InvalidTable(Vec<TableViolation>),
}

/// A single problem found while validating a transition table.
///
/// All violations of a table are reported together.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableViolation {
    #[error("state '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("initial state '{state}' is not declared")]
    UndeclaredInitialState { state: String },

    #[error("transition on '{event}' in state '{state}' has no target")]
    MissingTarget { state: String, event: String },

    #[error("transition on '{event}' in state '{state}' targets undeclared state '{target}'")]
    UnknownTarget {
        state: String,
        event: String,
        target: String,
    },
}

fn describe(violations: &[TableViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
