//! Builder API for ergonomic state machine construction.
//!
//! This module provides a fluent builder and the [`key_enum!`](crate::key_enum)
//! macro for creating machines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
