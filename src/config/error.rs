//! Configuration errors.

use thiserror::Error;

/// Problems found in a machine's declared states and entries.
///
/// Most of these are non-fatal: the offending item is skipped and the
/// machine keeps running in a degraded configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Duplicate blackboard entry '{entry}', keeping the first declaration")]
    DuplicateEntry { entry: String },

    #[error("Duplicate state '{state}', keeping the first declaration")]
    DuplicateState { state: String },

    #[error("Timer entry '{entry}' has non-positive interval {interval}")]
    InvalidInterval { entry: String, interval: f32 },

    #[error("State factory produced no state for '{state}'")]
    UnknownState { state: String },

    #[error("Start state '{state}' is not among the declared states")]
    StartStateNotDeclared { state: String },

    #[error("Standard state '{state}' is not among the declared states")]
    StandardStateNotDeclared { state: String },

    #[error("Failed to parse machine configuration: {0}")]
    Parse(String),
}
