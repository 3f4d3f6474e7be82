//! Declarative descriptions of blackboard entries and their watchers.

use super::watcher::{Comparison, Response, Watcher};
use crate::core::Key;
use serde::Deserialize;

/// Description of one watcher attached to an entry.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound = "")]
pub struct WatcherDescriptor<S: Key> {
    pub comparison: Comparison,
    pub threshold: f32,
    #[serde(default = "default_suppress_repeats")]
    pub suppress_repeats: bool,
    pub response: Response<S>,
}

fn default_suppress_repeats() -> bool {
    true
}

impl<S: Key> WatcherDescriptor<S> {
    /// Create a latching watcher description.
    pub fn new(comparison: Comparison, threshold: f32, response: Response<S>) -> Self {
        Self {
            comparison,
            threshold,
            suppress_repeats: true,
            response,
        }
    }

    /// Fire on every qualifying change instead of latching after the first.
    pub fn repeating(mut self) -> Self {
        self.suppress_repeats = false;
        self
    }

    pub(crate) fn into_watcher(self) -> Watcher<S> {
        Watcher::new(
            self.comparison,
            self.threshold,
            self.suppress_repeats,
            self.response,
        )
    }
}

/// Description of one blackboard entry.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::blackboard::{Comparison, EntryDescriptor, Response};
///
/// let hunger: EntryDescriptor<String, String> = EntryDescriptor::new("hunger".to_string(), 0.0)
///     .timer(5.0)
///     .watch(Comparison::GreaterThan, 3.0, Response::ChangeState("Eat".to_string()));
///
/// assert!(hunger.is_timer);
/// assert_eq!(hunger.watchers.len(), 1);
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(bound = "")]
pub struct EntryDescriptor<E: Key, S: Key> {
    pub id: E,
    #[serde(default)]
    pub start_value: f32,
    #[serde(default)]
    pub is_timer: bool,
    #[serde(default)]
    pub interval: f32,
    #[serde(default)]
    pub watchers: Vec<WatcherDescriptor<S>>,
    /// Keep the declared watchers but never wire them to the entry.
    #[serde(default)]
    pub watchers_disabled: bool,
}

impl<E: Key, S: Key> EntryDescriptor<E, S> {
    /// Create a plain entry description.
    pub fn new(id: E, start_value: f32) -> Self {
        Self {
            id,
            start_value,
            is_timer: false,
            interval: 0.0,
            watchers: Vec::new(),
            watchers_disabled: false,
        }
    }

    /// Auto-increment the entry every `interval` whole seconds.
    pub fn timer(mut self, interval: f32) -> Self {
        self.is_timer = true;
        self.interval = interval;
        self
    }

    /// Attach a latching watcher.
    pub fn watch(mut self, comparison: Comparison, threshold: f32, response: Response<S>) -> Self {
        self.watchers
            .push(WatcherDescriptor::new(comparison, threshold, response));
        self
    }

    /// Keep the watchers declared but leave them unwired.
    pub fn disable_watchers(mut self) -> Self {
        self.watchers_disabled = true;
        self
    }

    /// Attach a pre-built watcher descriptor.
    pub fn watcher(mut self, watcher: WatcherDescriptor<S>) -> Self {
        self.watchers.push(watcher);
        self
    }
}
