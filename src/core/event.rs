//! Events fed into a machine through `send`.
//!
//! Events are a closed sum type per machine. Each variant has a fieldless
//! tag (its kind) and the transition table is keyed by that tag, so a
//! guard or action registered for `Heat` only ever sees `Heat` events.

use std::fmt::Debug;
use std::hash::Hash;

/// Tag identifying the variant of a [`MachineEvent`].
pub trait EventKind: Copy + Eq + Hash + Debug + 'static {
    /// Tag name for logs.
    fn name(&self) -> &'static str;
}

/// An event a machine can react to.
///
/// Use [`event_enum!`](crate::event_enum) to derive the event enum together
/// with its kind enum.
pub trait MachineEvent: Clone + Debug + 'static {
    type Kind: EventKind;

    /// The tag of this event.
    fn kind(&self) -> Self::Kind;
}
