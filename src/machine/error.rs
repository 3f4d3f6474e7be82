//! Runtime errors of the transition engine.

use thiserror::Error;

/// Errors that can occur while driving a machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error("No state registered for '{state}'")]
    UnknownState { state: String },

    #[error("Machine has not been initialized. Call .initialize() first")]
    NotInitialized,

    #[error("Machine is already initialized")]
    AlreadyInitialized,
}
