//! Reactive blackboard of named scalar values.
//!
//! A blackboard owns a set of entries. Each entry propagates strict value
//! changes on an increment or decrement channel to the watchers attached to
//! it, and timer entries auto-increment on whole-second multiples of their
//! interval.
//!
//! # Key Concepts
//!
//! - **Entries**: one scalar each, changed only through the blackboard
//! - **Watchers**: hysteresis-gated threshold predicates that fire responses
//! - **Timers**: entries advanced in whole-second batches by [`Blackboard::tick`]
//!
//! # Example
//!
//! ```rust
//! use blackboard_fsm::blackboard::{Blackboard, Comparison, EntryDescriptor, Response};
//! use blackboard_fsm::core::Notification;
//!
//! let mut blackboard: Blackboard<String, String> = Blackboard::new(vec![
//!     EntryDescriptor::new("fear".to_string(), 0.0)
//!         .watch(Comparison::GreaterThan, 5.0, Response::ChangeState("Flee".to_string())),
//! ]);
//!
//! blackboard.set_value(&"fear".to_string(), 7.0).unwrap();
//!
//! let fired = blackboard
//!     .take_notifications()
//!     .into_iter()
//!     .any(|n| matches!(n, Notification::WatcherFired { .. }));
//! assert!(fired);
//! ```

mod descriptor;
mod entry;
mod error;
mod store;
mod watcher;

pub use descriptor::{EntryDescriptor, WatcherDescriptor};
pub use entry::BlackboardEntry;
pub use error::BlackboardError;
pub use store::Blackboard;
pub use watcher::{Channel, Comparison, Response, Watcher, WatcherCallback};
