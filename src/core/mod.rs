//! Core types shared by the blackboard and the state machine.
//!
//! This module contains the leaf building blocks:
//! - Identifiers via the `Key` trait
//! - Deferred transition requests (`Command`, `Outbox`)
//! - Notifications emitted to external observers
//! - Bounded transition history

mod command;
mod history;
mod key;
mod notification;

pub use command::{Command, Commands, Outbox};
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use key::Key;
pub use notification::Notification;
