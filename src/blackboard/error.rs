//! Blackboard lookup errors.

use thiserror::Error;

/// Errors returned by blackboard accessors.
///
/// Addressing an entry that was never registered is a logic defect in the
/// caller, so it is surfaced instead of defaulting to zero.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BlackboardError {
    #[error("Unknown blackboard entry '{entry}'")]
    UnknownEntry { entry: String },
}
