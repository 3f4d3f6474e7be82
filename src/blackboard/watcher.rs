//! Hysteresis-gated threshold watchers attached to blackboard entries.

use crate::core::{Command, Commands, Key};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a watcher compares an entry's new value to its threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Fires when the value drops below the threshold.
    LessThan,
    /// Fires when the value rises above the threshold.
    GreaterThan,
    /// Fires whenever the value lands exactly on the threshold.
    Equals,
    /// Fires on every change.
    AnyChange,
}

/// Change channel of a blackboard entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Increment,
    Decrement,
}

impl Comparison {
    /// Channels a watcher with this comparison subscribes to.
    ///
    /// Threshold comparisons only listen in the direction that can cross
    /// them; the rest listen to both.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Self::LessThan => &[Channel::Decrement],
            Self::GreaterThan => &[Channel::Increment],
            Self::Equals | Self::AnyChange => &[Channel::Increment, Channel::Decrement],
        }
    }
}

/// Callback signature for [`Response::Callback`].
pub type WatcherCallback<S> = Arc<dyn Fn(&mut Commands<'_, S>) + Send + Sync>;

/// What a watcher does when it fires.
///
/// Everything except [`Response::Callback`] can be loaded from configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "snake_case")]
pub enum Response<S: Key> {
    /// Request a transition to the given state.
    ChangeState(S),
    /// Append the given state to the pending-state queue.
    EnqueueState(S),
    /// Request a transition to the next queued state or the standard state.
    ChangeToNextState,
    /// Only emit the watcher-fired notification.
    Notify,
    /// Run arbitrary code that may issue commands.
    #[serde(skip)]
    Callback(WatcherCallback<S>),
}

impl<S: Key> Response<S> {
    /// Wrap a closure as a response.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&mut Commands<'_, S>) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    pub(crate) fn dispatch(&self, commands: &mut Commands<'_, S>) {
        match self {
            Self::ChangeState(state) => commands.push(Command::ChangeState(state.clone())),
            Self::EnqueueState(state) => commands.push(Command::EnqueueState(state.clone())),
            Self::ChangeToNextState => commands.push(Command::ChangeToNextState),
            Self::Notify => {}
            Self::Callback(callback) => callback(commands),
        }
    }
}

impl<S: Key> fmt::Debug for Response<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeState(state) => f.debug_tuple("ChangeState").field(state).finish(),
            Self::EnqueueState(state) => f.debug_tuple("EnqueueState").field(state).finish(),
            Self::ChangeToNextState => f.write_str("ChangeToNextState"),
            Self::Notify => f.write_str("Notify"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A predicate over one entry's value changes.
///
/// A `LessThan`/`GreaterThan` watcher with `suppress_repeats` set behaves like
/// a latch: after firing it stays quiet until the value crosses back over the
/// threshold in the opposite direction. `Equals` and `AnyChange` watchers are
/// never suppressed.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::blackboard::{Comparison, Response, Watcher};
///
/// let mut watcher: Watcher<String> = Watcher::new(Comparison::GreaterThan, 5.0, true, Response::Notify);
///
/// assert!(watcher.evaluate(6.0));
/// assert!(!watcher.evaluate(6.2)); // still above, suppressed
/// assert!(!watcher.evaluate(4.9)); // re-arms, but 4.9 is not above 5
/// assert!(watcher.evaluate(5.2));
/// ```
#[derive(Clone, Debug)]
pub struct Watcher<S: Key> {
    comparison: Comparison,
    threshold: f32,
    suppress_repeats: bool,
    suppressed: bool,
    response: Response<S>,
}

impl<S: Key> Watcher<S> {
    /// Create an armed watcher.
    pub fn new(
        comparison: Comparison,
        threshold: f32,
        suppress_repeats: bool,
        response: Response<S>,
    ) -> Self {
        Self {
            comparison,
            threshold,
            suppress_repeats,
            suppressed: false,
            response,
        }
    }

    /// How the watcher compares values to its threshold.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Threshold the value is compared against.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether the watcher is currently latched off.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// What the watcher does when it fires.
    pub fn response(&self) -> &Response<S> {
        &self.response
    }

    /// Run the suppression gate, then the fire condition.
    ///
    /// Returns `true` if the watcher fired for `value`.
    pub fn evaluate(&mut self, value: f32) -> bool {
        if !self.is_invoking_allowed(value) {
            return false;
        }

        let fired = match self.comparison {
            Comparison::LessThan => value < self.threshold,
            Comparison::GreaterThan => value > self.threshold,
            Comparison::Equals => value == self.threshold,
            Comparison::AnyChange => true,
        };

        if fired
            && self.suppress_repeats
            && matches!(
                self.comparison,
                Comparison::LessThan | Comparison::GreaterThan
            )
        {
            self.suppressed = true;
        }
        fired
    }

    /// Suppression gate. Clears the latch once `value` is back on the
    /// non-firing side of the threshold.
    fn is_invoking_allowed(&mut self, value: f32) -> bool {
        self.rearm(value);
        !self.suppressed
    }

    /// Clear the latch if `value` is on the non-firing side of the threshold.
    ///
    /// Also called for changes on the channel the watcher does not listen
    /// to, so a `GreaterThan` watcher re-arms when the value drops.
    pub(crate) fn rearm(&mut self, value: f32) {
        if !self.suppressed {
            return;
        }
        let rearmed = match self.comparison {
            Comparison::LessThan => value >= self.threshold,
            Comparison::GreaterThan => value <= self.threshold,
            Comparison::Equals | Comparison::AnyChange => true,
        };
        if rearmed {
            self.suppressed = false;
        }
    }
}
