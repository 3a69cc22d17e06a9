//! Core State trait for state machine states.
//!
//! All state machine states must implement this trait, which provides
//! pure methods for inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// States are small value types (usually fieldless enums) identifying one
/// node of a machine's transition table. Exactly one state is current at
/// any instant.
///
/// # Required Traits
///
/// - `Copy` + `Eq` + `Hash`: states key the transition table and the topic map
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states are exchanged with collaborators by value
///
/// # Example
///
/// ```rust
/// use brewstate::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum KettleState {
///     Idle,
///     Boiling,
///     Off,
/// }
///
/// impl State for KettleState {
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Idle => "idle",
///             Self::Boiling => "boiling",
///             Self::Off => "off",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Off)
///     }
/// }
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + 'static
{
    /// Identifier used in logs and in `state.enter.<id>` / `state.exit.<id>`
    /// topic names.
    fn name(&self) -> &'static str;

    /// Check if this is a final (terminal) state.
    ///
    /// Final states accept no further transitions by convention; the engine
    /// does not enforce it, the table simply declares none.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
