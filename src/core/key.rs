//! Identifier trait shared by states and blackboard entries.
//!
//! Both state identifiers and entry identifiers are opaque, comparable and
//! hashable keys. In practice they are closed enumerations declared with
//! [`key_enum!`](crate::key_enum), but interned strings work as well.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state and entry identifiers.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: identifiers are map keys
/// - `Debug`: identifiers show up in diagnostics
/// - `Serialize` + `DeserializeOwned`: identifiers appear in loaded configuration
/// - `Send` + `Sync`: machines may live on different threads
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::core::Key;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Mood {
///     Calm,
///     Angry,
/// }
///
/// impl Key for Mood {
///     fn name(&self) -> &str {
///         match self {
///             Self::Calm => "Calm",
///             Self::Angry => "Angry",
///         }
///     }
/// }
///
/// assert_eq!(Mood::Angry.name(), "Angry");
/// ```
pub trait Key:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the identifier's name for display/logging.
    fn name(&self) -> &str;
}

impl Key for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}
