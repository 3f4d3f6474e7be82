//! The per-machine blackboard: entry registry and timer batching.

use super::descriptor::EntryDescriptor;
use super::entry::BlackboardEntry;
use super::error::BlackboardError;
use super::watcher::Channel;
use crate::config::ConfigError;
use crate::core::{Commands, Key, Notification, Outbox};
use std::collections::HashMap;

/// Named scalar values shared by every state of one machine.
///
/// Timer entries are advanced in whole-second batches by [`Blackboard::tick`].
/// Every change, watcher firing and watcher response lands in the
/// blackboard's [`Outbox`], which the owning machine drains.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::blackboard::{Blackboard, EntryDescriptor};
///
/// let mut blackboard: Blackboard<String, String> = Blackboard::new(vec![
///     EntryDescriptor::new("health".to_string(), 100.0),
///     EntryDescriptor::new("hunger".to_string(), 0.0).timer(5.0),
/// ]);
///
/// for _ in 0..12 {
///     blackboard.tick(1.0);
/// }
///
/// assert_eq!(blackboard.get_value(&"hunger".to_string()), Ok(2.0));
/// assert_eq!(blackboard.get_value(&"health".to_string()), Ok(100.0));
/// ```
#[derive(Debug)]
pub struct Blackboard<E: Key, S: Key> {
    entries: HashMap<E, BlackboardEntry<E, S>>,
    /// Timer entries and their intervals, in declaration order.
    timers: Vec<(E, f32)>,
    elapsed: f64,
    whole_seconds: u64,
    outbox: Outbox<S, E>,
    rejected: Vec<ConfigError>,
}

impl<E: Key, S: Key> Blackboard<E, S> {
    /// Build the blackboard from entry descriptors.
    ///
    /// A duplicate identifier is skipped (the first one wins) and a timer
    /// with a non-positive interval is kept as a plain entry. Both are
    /// logged and reported through [`Blackboard::rejected`].
    pub fn new(descriptors: impl IntoIterator<Item = EntryDescriptor<E, S>>) -> Self {
        let mut blackboard = Self {
            entries: HashMap::new(),
            timers: Vec::new(),
            elapsed: 0.0,
            whole_seconds: 0,
            outbox: Outbox::new(),
            rejected: Vec::new(),
        };
        for descriptor in descriptors {
            blackboard.register(descriptor);
        }
        blackboard
    }

    fn register(&mut self, descriptor: EntryDescriptor<E, S>) {
        if self.entries.contains_key(&descriptor.id) {
            self.reject(ConfigError::DuplicateEntry {
                entry: descriptor.id.name().to_string(),
            });
            return;
        }

        let mut entry = BlackboardEntry::new(descriptor);
        if entry.is_timer() {
            if entry.interval() > 0.0 {
                self.timers.push((entry.id().clone(), entry.interval()));
            } else {
                self.reject(ConfigError::InvalidInterval {
                    entry: entry.id().name().to_string(),
                    interval: entry.interval(),
                });
                entry.demote_timer();
            }
        }
        self.entries.insert(entry.id().clone(), entry);
    }

    fn reject(&mut self, error: ConfigError) {
        tracing::warn!(%error, "blackboard configuration error");
        self.rejected.push(error);
    }

    /// Advance logic time by `delta` seconds.
    ///
    /// When the step crosses a whole-second boundary, every timer entry
    /// whose interval evenly divides the new whole second is incremented
    /// once. At most one boundary is detected per call, so a step that
    /// skips several seconds still increments each timer at most once.
    pub fn tick(&mut self, delta: f32) {
        if !delta.is_finite() || delta < 0.0 {
            tracing::warn!(delta, "ignoring invalid blackboard time step");
            return;
        }

        let delta = f64::from(delta);
        let before = self.elapsed.floor();
        let after = (self.elapsed + delta).floor();

        if after > before {
            self.whole_seconds = after as u64;
            for (id, interval) in &self.timers {
                if !divides(*interval, after) {
                    continue;
                }
                if let Some(entry) = self.entries.get_mut(id) {
                    entry.increment(&mut self.outbox);
                }
            }
        }
        self.elapsed += delta;
    }

    /// Seconds of logic time ticked so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The last whole-second boundary crossed.
    pub fn whole_seconds(&self) -> u64 {
        self.whole_seconds
    }

    fn with_entry<R>(
        &mut self,
        id: &E,
        f: impl FnOnce(&mut BlackboardEntry<E, S>, &mut Outbox<S, E>) -> R,
    ) -> Result<R, BlackboardError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| BlackboardError::UnknownEntry {
                entry: id.name().to_string(),
            })?;
        Ok(f(entry, &mut self.outbox))
    }

    /// Look up an entry.
    pub fn entry(&self, id: &E) -> Result<&BlackboardEntry<E, S>, BlackboardError> {
        self.entries
            .get(id)
            .ok_or_else(|| BlackboardError::UnknownEntry {
                entry: id.name().to_string(),
            })
    }

    /// Current value of an entry.
    pub fn get_value(&self, id: &E) -> Result<f32, BlackboardError> {
        self.entry(id).map(BlackboardEntry::value)
    }

    /// Whether an entry's value is strictly positive.
    pub fn get_value_as_bool(&self, id: &E) -> Result<bool, BlackboardError> {
        self.entry(id).map(BlackboardEntry::value_as_bool)
    }

    /// Store a new value, notifying watchers on a strict change.
    pub fn set_value(&mut self, id: &E, value: f32) -> Result<Option<Channel>, BlackboardError> {
        self.with_entry(id, |entry, outbox| entry.set_value(value, outbox))
    }

    /// Add one to an entry.
    pub fn increment(&mut self, id: &E) -> Result<Option<Channel>, BlackboardError> {
        self.with_entry(id, BlackboardEntry::increment)
    }

    /// Subtract one from an entry.
    pub fn decrement(&mut self, id: &E) -> Result<Option<Channel>, BlackboardError> {
        self.with_entry(id, BlackboardEntry::decrement)
    }

    /// Add `amount` to an entry.
    pub fn increase(&mut self, id: &E, amount: f32) -> Result<Option<Channel>, BlackboardError> {
        self.with_entry(id, |entry, outbox| entry.increase(amount, outbox))
    }

    /// Subtract `amount` from an entry.
    pub fn reduce(&mut self, id: &E, amount: f32) -> Result<Option<Channel>, BlackboardError> {
        self.with_entry(id, |entry, outbox| entry.reduce(amount, outbox))
    }

    /// Whether an entry with this identifier exists.
    pub fn contains(&self, id: &E) -> bool {
        self.entries.contains_key(id)
    }

    /// Identifiers of every entry, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &E> {
        self.entries.keys()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the blackboard has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timer entries and their intervals, in declaration order.
    pub fn timers(&self) -> &[(E, f32)] {
        &self.timers
    }

    /// Configuration problems found while building the blackboard.
    pub fn rejected(&self) -> &[ConfigError] {
        &self.rejected
    }

    /// Queue transition requests from outside a watcher.
    pub fn commands(&mut self) -> Commands<'_, S> {
        self.outbox.commands()
    }

    /// Take every notification emitted since the last call.
    ///
    /// A machine drains these itself; this is for driving a blackboard
    /// on its own.
    pub fn take_notifications(&mut self) -> Vec<Notification<S, E>> {
        self.outbox.take_notifications()
    }

    pub(crate) fn outbox_mut(&mut self) -> &mut Outbox<S, E> {
        &mut self.outbox
    }
}

/// Whether `second` is a whole multiple of `interval`.
///
/// Intervals such as `0.1` have no exact binary form. The interval is widened
/// through its shortest decimal form and the quotient is compared against the
/// nearest integer with a relative tolerance.
fn divides(interval: f32, second: f64) -> bool {
    let interval: f64 = interval.to_string().parse().unwrap_or(f64::from(interval));
    let quotient = second / interval;
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.max(1.0)
}
