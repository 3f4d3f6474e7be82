//! The state machine: states, hooks, and the transition engine.
//!
//! A [`StateMachine`] owns one [`RegisteredState`] per declared identifier
//! and the [`Blackboard`](crate::blackboard::Blackboard) its states share.
//! Transitions always run to completion: the outgoing state's exit hook
//! finishes before the incoming state's enter hook starts, and any
//! transition requested from inside a hook or a watcher response is queued
//! until the current one is done.

mod behavior;
mod driver;
mod engine;
mod error;
mod factory;
mod registry;

pub use behavior::{Behavior, RegisteredState, StateContext};
pub use driver::{simulate, TickDriver};
pub use engine::{Listener, StateMachine, MAX_CASCADE};
pub use error::MachineError;
pub use factory::StateFactory;
pub use registry::{MachineId, MachineRegistry};
