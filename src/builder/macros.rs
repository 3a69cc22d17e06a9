//! Macros for ergonomic machine definitions.

/// Generate a state enum and its `State` implementation.
///
/// Each variant is paired with the identifier used in topic names.
///
/// # Example
///
/// ```
/// use brewstate::state_enum;
/// use brewstate::core::State;
///
/// state_enum! {
///     pub enum PotState {
///         Idle => "idle",
///         Boiling => "boiling",
///         Off => "off",
///     }
///     final: [Off]
/// }
///
/// assert_eq!(PotState::Boiling.name(), "boiling");
/// assert!(PotState::Off.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}

/// Generate an event enum, its kind enum, and the `MachineEvent` wiring.
///
/// Variants may be unit-like or carry named fields.
///
/// # Example
///
/// ```
/// use brewstate::event_enum;
/// use brewstate::core::MachineEvent;
///
/// event_enum! {
///     pub enum PotEvent: PotEventKind {
///         Boil { target: f64 },
///         Stop,
///     }
/// }
///
/// let event = PotEvent::Boil { target: 100.0 };
/// assert_eq!(event.kind(), PotEventKind::Boil);
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $($field:ident : $ty:ty),* $(,)? })?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $({ $($field: $ty),* })?
            ),*
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $kind {
            $($variant),*
        }

        impl $crate::core::EventKind for $kind {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl $crate::core::MachineEvent for $name {
            type Kind = $kind;

            fn kind(&self) -> $kind {
                match self {
                    $(Self::$variant { .. } => $kind::$variant),*
                }
            }
        }
    };
}

/// Generate a context struct, its field enum, and the `Context` impl.
///
/// Each field is declared as `Variant => field: Type`; the variant names the
/// field in the generated field enum and the field identifier becomes the
/// topic suffix in `context.update.<field>`.
///
/// # Example
///
/// ```
/// use brewstate::context_struct;
/// use brewstate::core::{Context, ContextField};
///
/// context_struct! {
///     #[derive(Default)]
///     pub struct PotContext: PotField {
///         Temperature => temperature: f64,
///         Target => target: f64,
///     }
/// }
///
/// let before = PotContext::default();
/// let after = PotContext { target: 95.0, ..before.clone() };
/// assert_eq!(after.changed_fields(&before), vec![PotField::Target]);
/// assert_eq!(PotField::Target.name(), "target");
/// ```
#[macro_export]
macro_rules! context_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $field_enum:ident {
            $(
                $(#[$field_meta:meta])*
                $variant:ident => $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $field_enum {
            $($variant),*
        }

        impl $crate::core::ContextField for $field_enum {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($field)),*
                }
            }
        }

        impl $crate::core::Context for $name {
            type Field = $field_enum;

            const FIELDS: &'static [$field_enum] = &[$($field_enum::$variant),*];

            fn differs(&self, other: &Self, field: $field_enum) -> bool {
                match field {
                    $($field_enum::$variant => self.$field != other.$field),*
                }
            }

            fn copy_field(&mut self, source: &Self, field: $field_enum) {
                match field {
                    $(
                        $field_enum::$variant => {
                            self.$field = ::std::clone::Clone::clone(&source.$field)
                        }
                    ),*
                }
            }

            fn field_value(&self, field: $field_enum) -> $crate::__private::serde_json::Value {
                match field {
                    $(
                        $field_enum::$variant => {
                            $crate::__private::serde_json::to_value(&self.$field)
                                .unwrap_or($crate::__private::serde_json::Value::Null)
                        }
                    ),*
                }
            }
        }
    };
}
