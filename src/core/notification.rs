//! Notifications emitted by a running machine.

use super::key::Key;
use serde::{Deserialize, Serialize};

/// Something observable that happened inside a machine.
///
/// Notifications are collected while a tick or transition runs and are
/// handed to listeners, in emission order, once the machine is idle again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum Notification<S: Key, E: Key> {
    /// The active state changed. `previous` is `None` for the start state.
    StateChanged { previous: Option<S>, current: S },

    /// An entry's value went up.
    EntryIncremented { entry: E, value: f32 },

    /// An entry's value went down.
    EntryDecremented { entry: E, value: f32 },

    /// A watcher attached to `entry` fired. `watcher` is its declaration index.
    WatcherFired { entry: E, watcher: usize },
}

impl<S: Key, E: Key> Notification<S, E> {
    /// Mirror the notification to the log.
    pub(crate) fn trace(&self) {
        match self {
            Self::StateChanged { previous, current } => tracing::debug!(
                previous = previous.as_ref().map(|s| s.name()),
                current = current.name(),
                "state changed"
            ),
            Self::EntryIncremented { entry, value } => {
                tracing::trace!(entry = entry.name(), value, "entry incremented")
            }
            Self::EntryDecremented { entry, value } => {
                tracing::trace!(entry = entry.name(), value, "entry decremented")
            }
            Self::WatcherFired { entry, watcher } => {
                tracing::trace!(entry = entry.name(), watcher, "watcher fired")
            }
        }
    }
}
