//! Deferred transition requests.
//!
//! Hooks and watcher responses never touch the machine directly. They push
//! [`Command`]s into an [`Outbox`], and the machine applies them one at a
//! time after the current operation has fully unwound. This is what keeps
//! exit/enter pairs from interleaving when a transition is requested from
//! inside another transition or from a watcher fired mid-tick.

use super::key::Key;
use super::notification::Notification;
use std::collections::VecDeque;

/// A transition request waiting to be applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Command<S: Key> {
    /// Transition to the given state.
    ChangeState(S),
    /// Append a state to the pending-state queue.
    EnqueueState(S),
    /// Transition to the next queued state, or to the standard state.
    ChangeToNextState,
    /// Drop every queued state.
    ClearQueue,
    /// Drop every queued state, then change to the standard state.
    ClearQueueAndReset,
    /// Replace the standard (fallback) state.
    SetStandardState(S),
}

/// Narrow write handle over the pending command queue.
///
/// Watcher callbacks and state hooks receive this instead of the machine.
pub struct Commands<'a, S: Key> {
    queue: &'a mut VecDeque<Command<S>>,
}

impl<'a, S: Key> Commands<'a, S> {
    pub(crate) fn new(queue: &'a mut VecDeque<Command<S>>) -> Self {
        Self { queue }
    }

    /// Request a transition to `state`.
    pub fn change_state(&mut self, state: S) {
        self.push(Command::ChangeState(state));
    }

    /// Request that `state` be appended to the pending-state queue.
    pub fn enqueue_state(&mut self, state: S) {
        self.push(Command::EnqueueState(state));
    }

    /// Request a transition to the next queued state (or the standard state).
    pub fn change_to_next_state(&mut self) {
        self.push(Command::ChangeToNextState);
    }

    /// Push an arbitrary command.
    pub fn push(&mut self, command: Command<S>) {
        self.queue.push_back(command);
    }
}

/// Pending commands and undelivered notifications for one machine.
#[derive(Debug)]
pub struct Outbox<S: Key, E: Key> {
    commands: VecDeque<Command<S>>,
    notifications: Vec<Notification<S, E>>,
}

impl<S: Key, E: Key> Default for Outbox<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Key, E: Key> Outbox<S, E> {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self {
            commands: VecDeque::new(),
            notifications: Vec::new(),
        }
    }

    /// Write handle over the pending command queue.
    pub fn commands(&mut self) -> Commands<'_, S> {
        Commands::new(&mut self.commands)
    }

    /// Record a notification and mirror it to the log.
    pub fn notify(&mut self, notification: Notification<S, E>) {
        notification.trace();
        self.notifications.push(notification);
    }

    pub(crate) fn pop_command(&mut self) -> Option<Command<S>> {
        self.commands.pop_front()
    }

    pub(crate) fn discard_commands(&mut self) -> usize {
        let dropped = self.commands.len();
        self.commands.clear();
        dropped
    }

    /// Number of commands waiting to be applied.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Take every notification emitted so far, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification<S, E>> {
        std::mem::take(&mut self.notifications)
    }
}
