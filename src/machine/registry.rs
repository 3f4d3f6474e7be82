//! Machine identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one machine instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MachineId(pub u32);

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine-{}", self.0)
    }
}

/// Hands out machine identifiers.
///
/// Whoever constructs machines owns one of these; there is no process-wide
/// counter.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::machine::{MachineId, MachineRegistry};
///
/// let mut registry = MachineRegistry::new();
/// assert_eq!(registry.allocate(), MachineId(0));
/// assert_eq!(registry.allocate(), MachineId(1));
/// ```
#[derive(Debug, Default)]
pub struct MachineRegistry {
    next: u32,
}

impl MachineRegistry {
    /// Create a registry starting at `MachineId(0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next identifier.
    pub fn allocate(&mut self) -> MachineId {
        let id = MachineId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Number of identifiers handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next
    }
}
