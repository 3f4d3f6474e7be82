//! Macros for declaring identifiers.

/// Declare a fieldless enum usable as a state or entry identifier.
///
/// The enum derives everything [`Key`](crate::core::Key) requires and
/// names each variant after itself.
///
/// # Example
///
/// ```
/// use blackboard_fsm::core::Key;
/// use blackboard_fsm::key_enum;
///
/// key_enum! {
///     pub enum CreatureState {
///         Idle,
///         Move,
///         Flee,
///     }
/// }
///
/// assert_eq!(CreatureState::Flee.name(), "Flee");
/// ```
#[macro_export]
macro_rules! key_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Key for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
