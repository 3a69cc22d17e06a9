//! Machine context: the typed record a machine carries between transitions.
//!
//! A context is a plain struct whose field set is fixed at compile time. The
//! engine never mutates it in place; actions and hooks work on copies, and
//! the engine commits the copy field by field so every changed field can be
//! announced on its own `context.update.<field>` topic.
//!
//! Use [`context_struct!`](crate::context_struct) to derive both the struct
//! and its field enum.

use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of one field of a [`Context`].
pub trait ContextField: Copy + Eq + Hash + Debug + 'static {
    /// Field name as it appears in `context.update.<name>`.
    fn name(&self) -> &'static str;
}

/// A machine context with an enumerable set of fields.
pub trait Context: Clone + PartialEq + Debug + Serialize + 'static {
    /// Closed set of field identifiers.
    type Field: ContextField;

    /// Every field, in declaration order.
    const FIELDS: &'static [Self::Field];

    /// Whether `field` holds a different value in `self` than in `other`.
    fn differs(&self, other: &Self, field: Self::Field) -> bool;

    /// Overwrite `field` in `self` with the value it has in `source`.
    fn copy_field(&mut self, source: &Self, field: Self::Field);

    /// Current value of `field` as JSON, used as the payload of
    /// field-change notifications.
    fn field_value(&self, field: Self::Field) -> serde_json::Value;

    /// Fields whose value differs between `self` and `before`, in
    /// declaration order.
    fn changed_fields(&self, before: &Self) -> Vec<Self::Field> {
        Self::FIELDS
            .iter()
            .copied()
            .filter(|field| self.differs(before, *field))
            .collect()
    }
}
