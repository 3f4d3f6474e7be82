//! Build errors for state machines.

use thiserror::Error;

/// Problems that prevent a machine from being built at all.
///
/// Everything else (duplicate entries, bad intervals, states the factory
/// does not know) is logged and skipped; see
/// [`StateMachine::configuration_errors`](crate::machine::StateMachine::configuration_errors).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Start state not specified. Call .start(state) before .build()")]
    MissingStartState,

    #[error("No states declared. Add at least one state")]
    NoStates,

    #[error("Start state '{state}' is not among the declared states")]
    StartStateNotDeclared { state: String },

    #[error("Factory did not construct the start state '{state}'")]
    StartStateNotConstructed { state: String },
}
