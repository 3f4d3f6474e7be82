//! State transition history tracking.
//!
//! Keeps a bounded, ordered log of the transitions a machine went through,
//! stamped with both logic time and wall-clock time.

use super::key::Key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Number of transitions kept when no explicit capacity is given.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "Idle".to_string(),
///     to: "Move".to_string(),
///     at: 5.0,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "Move");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: Key> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Logic time (seconds of ticked time) when the transition happened
    pub at: f64,
    /// Wall-clock time when the transition happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of state transitions.
///
/// Once `capacity` transitions are stored the oldest one is dropped for
/// every new record.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     from: "Start".to_string(),
///     to: "Middle".to_string(),
///     at: 1.0,
///     timestamp: Utc::now(),
/// });
/// history.record(StateTransition {
///     from: "Middle".to_string(),
///     to: "End".to_string(),
///     at: 2.0,
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // Start -> Middle -> End
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: Key> {
    transitions: VecDeque<StateTransition<S>>,
    capacity: usize,
}

impl<S: Key> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Key> StateHistory<S> {
    /// Create a new empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a new empty history keeping at most `capacity` transitions.
    ///
    /// A capacity of zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Record a transition, evicting the oldest one if the history is full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the `from` state of the oldest
    /// retained transition, then the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Logic time elapsed between the oldest and newest retained transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        Duration::try_from_secs_f64(last.at - first.at).ok()
    }

    /// Iterate over retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    /// Number of retained transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if no transitions are retained.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
