//! Construction of state behaviors from identifiers.

use super::behavior::Behavior;
use crate::blackboard::Blackboard;
use crate::core::Key;

/// Maps a state identifier to a freshly constructed behavior.
///
/// Called exactly once per declared identifier while a machine is built.
/// Returning `None` marks the identifier as unknown; the state is then left
/// unregistered and the problem is reported as a configuration error.
pub trait StateFactory<S: Key, E: Key> {
    fn create(&self, id: &S, blackboard: &Blackboard<E, S>) -> Option<Box<dyn Behavior<S, E>>>;
}

impl<S, E, F> StateFactory<S, E> for F
where
    S: Key,
    E: Key,
    F: Fn(&S, &Blackboard<E, S>) -> Option<Box<dyn Behavior<S, E>>>,
{
    fn create(&self, id: &S, blackboard: &Blackboard<E, S>) -> Option<Box<dyn Behavior<S, E>>> {
        self(id, blackboard)
    }
}
