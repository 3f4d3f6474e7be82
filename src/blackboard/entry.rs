//! A single named scalar with change propagation.

use super::descriptor::EntryDescriptor;
use super::watcher::{Channel, Watcher};
use crate::core::{Key, Notification, Outbox};

/// One blackboard value and the watchers listening to it.
///
/// Each change channel keeps an ordered list of subscribed watcher indices,
/// so watchers are always evaluated in declaration order. A change on one
/// channel only re-arms the latched watchers of the other.
#[derive(Debug)]
pub struct BlackboardEntry<E: Key, S: Key> {
    id: E,
    value: f32,
    start_value: f32,
    is_timer: bool,
    interval: f32,
    watchers: Vec<Watcher<S>>,
    on_increment: Vec<usize>,
    on_decrement: Vec<usize>,
}

impl<E: Key, S: Key> BlackboardEntry<E, S> {
    /// Build an entry from its descriptor and wire its watchers.
    ///
    /// The value starts at `start_value` without emitting anything. Watchers
    /// of a descriptor with `watchers_disabled` set are dropped unwired.
    pub fn new(descriptor: EntryDescriptor<E, S>) -> Self {
        let mut entry = Self {
            id: descriptor.id,
            value: descriptor.start_value,
            start_value: descriptor.start_value,
            is_timer: descriptor.is_timer,
            interval: descriptor.interval,
            watchers: Vec::with_capacity(descriptor.watchers.len()),
            on_increment: Vec::new(),
            on_decrement: Vec::new(),
        };
        if descriptor.watchers_disabled {
            tracing::debug!(entry = entry.id.name(), "watchers disabled");
            return entry;
        }
        for watcher in descriptor.watchers {
            entry.attach(watcher.into_watcher());
        }
        entry
    }

    /// Attach a watcher, subscribing it to the channels its comparison needs.
    pub fn attach(&mut self, watcher: Watcher<S>) -> usize {
        let index = self.watchers.len();
        for channel in watcher.comparison().channels() {
            match channel {
                Channel::Increment => self.on_increment.push(index),
                Channel::Decrement => self.on_decrement.push(index),
            }
        }
        self.watchers.push(watcher);
        index
    }

    /// Identifier of the entry.
    pub fn id(&self) -> &E {
        &self.id
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value the entry was created with.
    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    /// Whether the blackboard advances this entry on its timer.
    pub fn is_timer(&self) -> bool {
        self.is_timer
    }

    /// Timer interval in seconds.
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Attached watchers, in declaration order.
    pub fn watchers(&self) -> &[Watcher<S>] {
        &self.watchers
    }

    pub(crate) fn demote_timer(&mut self) {
        self.is_timer = false;
    }

    /// Store `value` and propagate the change.
    ///
    /// Only a strict increase or decrease counts as a change; setting the
    /// current value again (or NaN) is a no-op. Returns the channel the
    /// change went out on.
    pub fn set_value(&mut self, value: f32, outbox: &mut Outbox<S, E>) -> Option<Channel> {
        let channel = if value > self.value {
            Channel::Increment
        } else if value < self.value {
            Channel::Decrement
        } else {
            return None;
        };
        self.value = value;

        let (notification, subscribers, others) = match channel {
            Channel::Increment => (
                Notification::EntryIncremented {
                    entry: self.id.clone(),
                    value,
                },
                &self.on_increment,
                &self.on_decrement,
            ),
            Channel::Decrement => (
                Notification::EntryDecremented {
                    entry: self.id.clone(),
                    value,
                },
                &self.on_decrement,
                &self.on_increment,
            ),
        };
        outbox.notify(notification);

        for &index in others {
            self.watchers[index].rearm(value);
        }

        for &index in subscribers {
            let watcher = &mut self.watchers[index];
            if watcher.evaluate(value) {
                outbox.notify(Notification::WatcherFired {
                    entry: self.id.clone(),
                    watcher: index,
                });
                watcher.response().dispatch(&mut outbox.commands());
            }
        }
        Some(channel)
    }

    /// Add one.
    pub fn increment(&mut self, outbox: &mut Outbox<S, E>) -> Option<Channel> {
        self.set_value(self.value + 1.0, outbox)
    }

    /// Subtract one.
    pub fn decrement(&mut self, outbox: &mut Outbox<S, E>) -> Option<Channel> {
        self.set_value(self.value - 1.0, outbox)
    }

    /// Add `amount`.
    pub fn increase(&mut self, amount: f32, outbox: &mut Outbox<S, E>) -> Option<Channel> {
        self.set_value(self.value + amount, outbox)
    }

    /// Subtract `amount`.
    pub fn reduce(&mut self, amount: f32, outbox: &mut Outbox<S, E>) -> Option<Channel> {
        self.set_value(self.value - amount, outbox)
    }

    /// `true` when the value is strictly positive.
    pub fn value_as_bool(&self) -> bool {
        self.value > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::watcher::{Comparison, Response};
    use crate::core::Command;

    type Entry = BlackboardEntry<String, String>;

    fn entry(start: f32) -> Entry {
        BlackboardEntry::new(EntryDescriptor::new("fear".to_string(), start))
    }

    #[test]
    fn starts_at_start_value_silently() {
        let mut outbox: Outbox<String, String> = Outbox::new();
        let entry = entry(3.0);

        assert_eq!(entry.value(), 3.0);
        assert_eq!(entry.start_value(), 3.0);
        assert!(outbox.take_notifications().is_empty());
    }

    #[test]
    fn increase_emits_increment() {
        let mut outbox = Outbox::new();
        let mut entry = entry(1.0);

        assert_eq!(entry.set_value(2.0, &mut outbox), Some(Channel::Increment));
        assert_eq!(
            outbox.take_notifications(),
            vec![Notification::EntryIncremented {
                entry: "fear".to_string(),
                value: 2.0
            }]
        );
    }

    #[test]
    fn decrease_emits_decrement() {
        let mut outbox = Outbox::new();
        let mut entry = entry(1.0);

        assert_eq!(entry.reduce(0.5, &mut outbox), Some(Channel::Decrement));
        assert_eq!(entry.value(), 0.5);
        assert_eq!(
            outbox.take_notifications(),
            vec![Notification::EntryDecremented {
                entry: "fear".to_string(),
                value: 0.5
            }]
        );
    }

    #[test]
    fn equal_value_is_a_no_op() {
        let mut outbox = Outbox::new();
        let mut entry = entry(1.0);

        assert_eq!(entry.set_value(1.0, &mut outbox), None);
        assert_eq!(entry.set_value(f32::NAN, &mut outbox), None);
        assert_eq!(entry.value(), 1.0);
        assert!(outbox.take_notifications().is_empty());
    }

    #[test]
    fn watchers_only_see_their_channels() {
        let mut outbox = Outbox::new();
        let mut entry: Entry = BlackboardEntry::new(
            EntryDescriptor::new("fear".to_string(), 5.0)
                .watch(Comparison::LessThan, 100.0, Response::Notify),
        );

        // LessThan ignores increments even when the value is below threshold.
        entry.increment(&mut outbox);
        assert!(!outbox
            .take_notifications()
            .iter()
            .any(|n| matches!(n, Notification::WatcherFired { .. })));

        entry.decrement(&mut outbox);
        assert!(outbox
            .take_notifications()
            .iter()
            .any(|n| matches!(n, Notification::WatcherFired { watcher: 0, .. })));
    }

    #[test]
    fn watchers_fire_in_declaration_order() {
        let mut outbox = Outbox::new();
        let mut entry = BlackboardEntry::new(
            EntryDescriptor::new("fear".to_string(), 0.0)
                .watch(
                    Comparison::GreaterThan,
                    0.5,
                    Response::ChangeState("Flee".to_string()),
                )
                .watch(
                    Comparison::AnyChange,
                    0.0,
                    Response::EnqueueState("Hide".to_string()),
                ),
        );

        entry.increment(&mut outbox);

        assert_eq!(
            outbox.pop_command(),
            Some(Command::ChangeState("Flee".to_string()))
        );
        assert_eq!(
            outbox.pop_command(),
            Some(Command::EnqueueState("Hide".to_string()))
        );
    }

    #[test]
    fn drop_below_threshold_rearms_greater_than_watcher() {
        let mut outbox = Outbox::new();
        let mut entry: Entry = BlackboardEntry::new(
            EntryDescriptor::new("fear".to_string(), 4.0)
                .watch(Comparison::GreaterThan, 5.0, Response::Notify),
        );

        let fired: Vec<bool> = [6.0, 5.5, 6.2, 4.9, 5.2]
            .into_iter()
            .map(|v| {
                entry.set_value(v, &mut outbox);
                outbox
                    .take_notifications()
                    .iter()
                    .any(|n| matches!(n, Notification::WatcherFired { .. }))
            })
            .collect();

        assert_eq!(fired, vec![true, false, false, false, true]);
    }

    #[test]
    fn disabled_watchers_never_fire() {
        let mut outbox = Outbox::new();
        let mut entry: Entry = BlackboardEntry::new(
            EntryDescriptor::new("fear".to_string(), 0.0)
                .watch(Comparison::AnyChange, 0.0, Response::ChangeState("Flee".to_string()))
                .disable_watchers(),
        );

        entry.increase(3.0, &mut outbox);

        assert_eq!(entry.value(), 3.0);
        assert!(entry.watchers().is_empty());
        assert_eq!(
            outbox.take_notifications(),
            vec![Notification::EntryIncremented {
                entry: "fear".to_string(),
                value: 3.0
            }]
        );
        assert_eq!(outbox.pending_commands(), 0);
    }

    #[test]
    fn value_as_bool_is_strictly_positive() {
        let mut outbox = Outbox::new();
        let mut entry = entry(0.0);
        assert!(!entry.value_as_bool());

        entry.increase(0.1, &mut outbox);
        assert!(entry.value_as_bool());

        entry.set_value(-1.0, &mut outbox);
        assert!(!entry.value_as_bool());
    }
}
