//! The transition engine.

use super::behavior::RegisteredState;
use super::error::MachineError;
use super::registry::MachineId;
use crate::blackboard::Blackboard;
use crate::config::ConfigError;
use crate::core::{Command, Key, Notification, StateHistory, StateTransition};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};

/// Upper bound on commands applied by one drain of the outbox.
///
/// Reached only when hooks or watchers keep requesting transitions in a
/// loop; the remaining requests are discarded.
pub const MAX_CASCADE: usize = 64;

/// Observer of machine notifications.
pub type Listener<S, E> = Box<dyn FnMut(&Notification<S, E>) + Send>;

/// A state machine driving one entity.
///
/// The machine owns its states and its blackboard. Exactly one state is
/// active after [`initialize`](Self::initialize). Transition requests made
/// by hooks or watcher responses are queued and applied one after another
/// once the operation that issued them has returned, so exit/enter pairs
/// never interleave.
pub struct StateMachine<S: Key, E: Key> {
    id: MachineId,
    states: HashMap<S, RegisteredState<S, E>>,
    current: Option<S>,
    previous: Option<S>,
    start: S,
    standard: S,
    queue: VecDeque<S>,
    blackboard: Blackboard<E, S>,
    history: StateHistory<S>,
    listeners: Vec<Listener<S, E>>,
    issues: Vec<ConfigError>,
}

impl<S: Key, E: Key> StateMachine<S, E> {
    pub(crate) fn new(
        id: MachineId,
        states: HashMap<S, RegisteredState<S, E>>,
        start: S,
        standard: S,
        blackboard: Blackboard<E, S>,
        history: StateHistory<S>,
        issues: Vec<ConfigError>,
    ) -> Self {
        Self {
            id,
            states,
            current: None,
            previous: None,
            start,
            standard,
            queue: VecDeque::new(),
            blackboard,
            history,
            listeners: Vec::new(),
            issues,
        }
    }

    /// Enter the start state.
    ///
    /// Must be called exactly once, before any tick or transition.
    pub fn initialize(&mut self) -> Result<(), MachineError> {
        if self.current.is_some() {
            return Err(MachineError::AlreadyInitialized);
        }
        let start = self.start.clone();
        let slot = self
            .states
            .get_mut(&start)
            .ok_or_else(|| MachineError::UnknownState {
                state: start.name().to_string(),
            })?;

        self.current = Some(start.clone());
        self.blackboard
            .outbox_mut()
            .notify(Notification::StateChanged {
                previous: None,
                current: start,
            });
        slot.enter(&mut self.blackboard);
        self.process_pending();
        Ok(())
    }

    /// Transition to `state`.
    ///
    /// Returns `Ok(false)` when `state` is already active, in which case no
    /// hook runs. An unregistered `state` leaves the machine where it is.
    pub fn change_state(&mut self, state: S) -> Result<bool, MachineError> {
        self.execute(Command::ChangeState(state))
    }

    /// Append `state` to the pending-state queue.
    pub fn enqueue_state(&mut self, state: S) -> Result<(), MachineError> {
        self.execute(Command::EnqueueState(state)).map(|_| ())
    }

    /// Transition to the next queued state, or to the standard state when
    /// the queue is empty.
    pub fn change_to_next_state(&mut self) -> Result<bool, MachineError> {
        self.execute(Command::ChangeToNextState)
    }

    /// Drop every queued state without changing the active one.
    pub fn clear_queue(&mut self) -> Result<(), MachineError> {
        self.execute(Command::ClearQueue).map(|_| ())
    }

    /// Drop every queued state, then change to the standard state.
    pub fn clear_queue_and_reset(&mut self) -> Result<bool, MachineError> {
        self.execute(Command::ClearQueueAndReset)
    }

    /// Replace the fallback state used when the queue is empty.
    pub fn set_standard_state(&mut self, state: S) -> Result<(), MachineError> {
        self.execute(Command::SetStandardState(state)).map(|_| ())
    }

    /// Run the active state's logic hook, then advance the blackboard.
    pub fn logic_tick(&mut self, delta: f32) -> Result<(), MachineError> {
        let current = self.current.clone().ok_or(MachineError::NotInitialized)?;
        if let Some(slot) = self.states.get_mut(&current) {
            slot.logic_tick(&mut self.blackboard, delta);
        }
        self.blackboard.tick(delta);
        self.process_pending();
        Ok(())
    }

    /// Run the active state's physics hook.
    pub fn physics_tick(&mut self, delta: f32) -> Result<(), MachineError> {
        let current = self.current.clone().ok_or(MachineError::NotInitialized)?;
        if let Some(slot) = self.states.get_mut(&current) {
            slot.physics_tick(&mut self.blackboard, delta);
        }
        self.process_pending();
        Ok(())
    }

    /// Write to the blackboard from outside the tick sequence.
    ///
    /// Watchers fired by the write are resolved before this returns.
    pub fn update_blackboard<R>(&mut self, f: impl FnOnce(&mut Blackboard<E, S>) -> R) -> R {
        let result = f(&mut self.blackboard);
        self.process_pending();
        result
    }

    /// Register an observer for every notification the machine emits.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Notification<S, E>) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Identifier assigned when the machine was built.
    pub fn id(&self) -> MachineId {
        self.id
    }

    /// Whether [`initialize`](Self::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// The active state. `None` before [`initialize`](Self::initialize).
    pub fn current_state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// The state active before the last transition.
    pub fn previous_state(&self) -> Option<&S> {
        self.previous.as_ref()
    }

    /// The state entered by [`initialize`](Self::initialize).
    pub fn start_state(&self) -> &S {
        &self.start
    }

    /// The fallback state for [`change_to_next_state`](Self::change_to_next_state).
    pub fn standard_state(&self) -> &S {
        &self.standard
    }

    /// Whether the active state is one of `states`.
    pub fn is_in_state(&self, states: &[S]) -> bool {
        self.current.as_ref().is_some_and(|c| states.contains(c))
    }

    /// Look up a registered state by identifier.
    pub fn state(&self, id: &S) -> Result<&RegisteredState<S, E>, MachineError> {
        self.states
            .get(id)
            .ok_or_else(|| MachineError::UnknownState {
                state: id.name().to_string(),
            })
    }

    /// Identifiers of every registered state.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.states.keys()
    }

    /// Pending states, next one first.
    pub fn queued_states(&self) -> impl Iterator<Item = &S> {
        self.queue.iter()
    }

    /// Read access to the machine's blackboard.
    pub fn blackboard(&self) -> &Blackboard<E, S> {
        &self.blackboard
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Configuration problems found while the machine was built.
    pub fn configuration_errors(&self) -> &[ConfigError] {
        &self.issues
    }

    fn execute(&mut self, command: Command<S>) -> Result<bool, MachineError> {
        if self.current.is_none() {
            return Err(MachineError::NotInitialized);
        }
        let result = self.apply(command);
        if let Err(error) = &result {
            tracing::warn!(machine = %self.id, %error, "ignoring transition request");
        }
        self.process_pending();
        result
    }

    fn apply(&mut self, command: Command<S>) -> Result<bool, MachineError> {
        match command {
            Command::ChangeState(state) => self.request(state),
            Command::EnqueueState(state) => {
                self.ensure_registered(&state)?;
                self.queue.push_back(state);
                Ok(false)
            }
            Command::ChangeToNextState => {
                let next = self
                    .queue
                    .pop_front()
                    .unwrap_or_else(|| self.standard.clone());
                self.request(next)
            }
            Command::ClearQueue => {
                self.queue.clear();
                Ok(false)
            }
            Command::ClearQueueAndReset => {
                tracing::debug!(machine = %self.id, "resetting states queue");
                self.queue.clear();
                self.request(self.standard.clone())
            }
            Command::SetStandardState(state) => {
                self.ensure_registered(&state)?;
                self.standard = state;
                Ok(false)
            }
        }
    }

    fn ensure_registered(&self, state: &S) -> Result<(), MachineError> {
        if self.states.contains_key(state) {
            Ok(())
        } else {
            Err(MachineError::UnknownState {
                state: state.name().to_string(),
            })
        }
    }

    fn request(&mut self, target: S) -> Result<bool, MachineError> {
        self.ensure_registered(&target)?;
        Ok(self.transition(target))
    }

    /// Exit the active state and enter `target`.
    ///
    /// `target` must be registered. Requests issued by the hooks stay in the
    /// outbox until the caller drains it.
    fn transition(&mut self, target: S) -> bool {
        let Some(from) = self.current.clone() else {
            return false;
        };
        if from == target {
            return false;
        }

        tracing::debug!(
            machine = %self.id,
            from = from.name(),
            to = target.name(),
            "changing state"
        );
        if let Some(slot) = self.states.get_mut(&from) {
            slot.exit(&mut self.blackboard);
        }
        self.previous = Some(from.clone());
        self.current = Some(target.clone());
        self.history.record(StateTransition {
            from: from.clone(),
            to: target.clone(),
            at: self.blackboard.elapsed(),
            timestamp: Utc::now(),
        });
        self.blackboard
            .outbox_mut()
            .notify(Notification::StateChanged {
                previous: Some(from),
                current: target.clone(),
            });

        if let Some(slot) = self.states.get_mut(&target) {
            slot.enter(&mut self.blackboard);
        }
        true
    }

    /// Apply queued commands in order, then deliver notifications.
    ///
    /// Commands stay queued until the machine is initialized.
    fn process_pending(&mut self) {
        if self.current.is_some() {
            let mut applied = 0;
            while let Some(command) = self.blackboard.outbox_mut().pop_command() {
                if applied == MAX_CASCADE {
                    let dropped = self.blackboard.outbox_mut().discard_commands() + 1;
                    tracing::error!(
                        machine = %self.id,
                        dropped,
                        "transition cascade limit reached, discarding pending requests"
                    );
                    break;
                }
                applied += 1;
                if let Err(error) = self.apply(command) {
                    tracing::warn!(machine = %self.id, %error, "ignoring transition request");
                }
            }
        }

        let notifications = self.blackboard.outbox_mut().take_notifications();
        for notification in &notifications {
            for listener in &mut self.listeners {
                listener(notification);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::{Comparison, EntryDescriptor, Response};
    use crate::builder::StateMachineBuilder;
    use crate::machine::{Behavior, StateContext};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records every hook call; optionally requests a transition on enter.
    struct Recorder {
        log: Log,
        on_enter_goto: Option<String>,
    }

    impl Behavior<String, String> for Recorder {
        fn on_enter(&mut self, ctx: &mut StateContext<'_, String, String>) {
            self.log.lock().unwrap().push(format!("enter {}", ctx.id()));
            if let Some(next) = &self.on_enter_goto {
                ctx.change_state(next.clone());
            }
        }

        fn on_exit(&mut self, ctx: &mut StateContext<'_, String, String>) {
            self.log.lock().unwrap().push(format!("exit {}", ctx.id()));
        }

        fn logic_tick(&mut self, ctx: &mut StateContext<'_, String, String>, _delta: f32) {
            self.log.lock().unwrap().push(format!("logic {}", ctx.id()));
        }

        fn physics_tick(&mut self, ctx: &mut StateContext<'_, String, String>, _delta: f32) {
            self.log.lock().unwrap().push(format!("physics {}", ctx.id()));
        }
    }

    fn s(name: &str) -> String {
        name.to_string()
    }

    fn machine_with(
        log: &Log,
        redirects: &[(&str, &str)],
        entries: Vec<EntryDescriptor<String, String>>,
    ) -> StateMachine<String, String> {
        let redirects: HashMap<String, String> = redirects
            .iter()
            .map(|(from, to)| (s(from), s(to)))
            .collect();
        let log = Arc::clone(log);
        let factory = move |id: &String, _: &Blackboard<String, String>| {
            Some(Box::new(Recorder {
                log: Arc::clone(&log),
                on_enter_goto: redirects.get(id).cloned(),
            }) as Box<dyn Behavior<String, String>>)
        };

        StateMachineBuilder::new()
            .states([s("Idle"), s("Move"), s("Attack"), s("Flee")])
            .start(s("Idle"))
            .entries(entries)
            .build(&factory)
            .unwrap()
    }

    fn machine(log: &Log) -> StateMachine<String, String> {
        machine_with(log, &[], Vec::new())
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn initialize_enters_start_state() {
        let log = Log::default();
        let mut machine = machine(&log);

        assert!(!machine.is_initialized());
        machine.initialize().unwrap();

        assert_eq!(machine.current_state(), Some(&s("Idle")));
        assert_eq!(machine.previous_state(), None);
        assert_eq!(take(&log), vec!["enter Idle"]);
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();

        assert_eq!(machine.initialize(), Err(MachineError::AlreadyInitialized));
        assert_eq!(take(&log), vec!["enter Idle"]);
    }

    #[test]
    fn ticks_before_initialize_fail() {
        let log = Log::default();
        let mut machine = machine(&log);

        assert_eq!(machine.logic_tick(0.1), Err(MachineError::NotInitialized));
        assert_eq!(machine.physics_tick(0.1), Err(MachineError::NotInitialized));
        assert_eq!(
            machine.change_state(s("Move")),
            Err(MachineError::NotInitialized)
        );
    }

    #[test]
    fn change_to_current_state_runs_no_hooks() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();
        take(&log);

        assert_eq!(machine.change_state(s("Idle")), Ok(false));
        assert!(take(&log).is_empty());
        assert_eq!(machine.state(&s("Idle")).unwrap().activations(), 1);
    }

    #[test]
    fn exit_completes_before_enter() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();
        take(&log);

        assert_eq!(machine.change_state(s("Move")), Ok(true));

        assert_eq!(take(&log), vec!["exit Idle", "enter Move"]);
        assert_eq!(machine.previous_state(), Some(&s("Idle")));
        assert_eq!(machine.current_state(), Some(&s("Move")));
        assert!(machine.state(&s("Idle")).unwrap().is_exiting());
        assert!(!machine.state(&s("Move")).unwrap().is_exiting());
    }

    #[test]
    fn unknown_state_leaves_machine_in_place() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();
        take(&log);

        assert_eq!(
            machine.change_state(s("Sleep")),
            Err(MachineError::UnknownState { state: s("Sleep") })
        );
        assert_eq!(machine.current_state(), Some(&s("Idle")));
        assert!(take(&log).is_empty());
        assert!(machine.state(&s("Sleep")).is_err());
    }

    #[test]
    fn nested_request_from_enter_is_serialized() {
        let log = Log::default();
        let mut machine = machine_with(&log, &[("Move", "Attack")], Vec::new());
        machine.initialize().unwrap();
        take(&log);

        machine.change_state(s("Move")).unwrap();

        assert_eq!(
            take(&log),
            vec!["exit Idle", "enter Move", "exit Move", "enter Attack"]
        );
        assert_eq!(machine.current_state(), Some(&s("Attack")));
        assert_eq!(machine.previous_state(), Some(&s("Move")));
    }

    #[test]
    fn request_from_start_state_enter_is_applied_after_initialize() {
        let log = Log::default();
        let mut machine = machine_with(&log, &[("Idle", "Move")], Vec::new());

        machine.initialize().unwrap();

        assert_eq!(take(&log), vec!["enter Idle", "exit Idle", "enter Move"]);
        assert_eq!(machine.current_state(), Some(&s("Move")));
    }

    #[test]
    fn watcher_fired_mid_tick_changes_state_after_tick() {
        let log = Log::default();
        let mut machine = machine_with(
            &log,
            &[],
            vec![EntryDescriptor::new(s("fear"), 0.0).timer(1.0).watch(
                Comparison::GreaterThan,
                1.5,
                Response::ChangeState(s("Flee")),
            )],
        );
        machine.initialize().unwrap();
        take(&log);

        machine.logic_tick(1.0).unwrap();
        assert_eq!(take(&log), vec!["logic Idle"]);

        machine.logic_tick(1.0).unwrap();
        assert_eq!(take(&log), vec!["logic Idle", "exit Idle", "enter Flee"]);

        machine.logic_tick(1.0).unwrap();
        machine.physics_tick(1.0).unwrap();
        assert_eq!(take(&log), vec!["logic Flee", "physics Flee"]);
    }

    #[test]
    fn watcher_callback_can_issue_several_requests() {
        let log = Log::default();
        let mut machine = machine_with(
            &log,
            &[],
            vec![EntryDescriptor::new(s("alarm"), 0.0).watch(
                Comparison::Equals,
                1.0,
                Response::callback(|commands| {
                    commands.change_state(s("Move"));
                    commands.change_state(s("Attack"));
                }),
            )],
        );
        machine.initialize().unwrap();
        take(&log);

        machine.update_blackboard(|bb| bb.set_value(&s("alarm"), 1.0).unwrap());

        assert_eq!(
            take(&log),
            vec!["exit Idle", "enter Move", "exit Move", "enter Attack"]
        );
    }

    #[test]
    fn ping_pong_cascade_is_bounded() {
        let log = Log::default();
        let mut machine = machine_with(&log, &[("Move", "Attack"), ("Attack", "Move")], Vec::new());
        machine.initialize().unwrap();

        machine.change_state(s("Move")).unwrap();

        assert_eq!(machine.blackboard.outbox_mut().pending_commands(), 0);
        assert!(machine.is_in_state(&[s("Move"), s("Attack")]));
        // One direct transition plus MAX_CASCADE queued ones.
        assert_eq!(machine.history().len(), MAX_CASCADE + 1);
    }

    #[test]
    fn queue_drives_change_to_next_state() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();

        machine.enqueue_state(s("Move")).unwrap();
        machine.enqueue_state(s("Attack")).unwrap();
        assert_eq!(
            machine.enqueue_state(s("Sleep")),
            Err(MachineError::UnknownState { state: s("Sleep") })
        );
        assert_eq!(machine.queued_states().count(), 2);

        machine.change_to_next_state().unwrap();
        assert_eq!(machine.current_state(), Some(&s("Move")));
        machine.change_to_next_state().unwrap();
        assert_eq!(machine.current_state(), Some(&s("Attack")));

        // Empty queue falls back to the standard state.
        machine.change_to_next_state().unwrap();
        assert_eq!(machine.current_state(), Some(&s("Idle")));
    }

    #[test]
    fn clear_queue_and_reset_goes_to_standard() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();
        machine.set_standard_state(s("Flee")).unwrap();
        machine.enqueue_state(s("Move")).unwrap();

        assert_eq!(machine.clear_queue_and_reset(), Ok(true));

        assert_eq!(machine.queued_states().count(), 0);
        assert_eq!(machine.current_state(), Some(&s("Flee")));
        assert_eq!(machine.standard_state(), &s("Flee"));
    }

    #[test]
    fn listeners_see_notifications_in_order() {
        let log = Log::default();
        let mut machine = machine_with(
            &log,
            &[],
            vec![EntryDescriptor::new(s("fear"), 0.0).watch(
                Comparison::GreaterThan,
                0.5,
                Response::ChangeState(s("Flee")),
            )],
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        machine.subscribe(move |n| sink.lock().unwrap().push(n.clone()));
        machine.initialize().unwrap();

        machine.update_blackboard(|bb| bb.increment(&s("fear")).unwrap());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Notification::StateChanged {
                    previous: None,
                    current: s("Idle")
                },
                Notification::EntryIncremented {
                    entry: s("fear"),
                    value: 1.0
                },
                Notification::WatcherFired {
                    entry: s("fear"),
                    watcher: 0
                },
                Notification::StateChanged {
                    previous: Some(s("Idle")),
                    current: s("Flee")
                },
            ]
        );
    }

    /// Bumps the `visits` entry whenever it is entered.
    struct Counting;

    impl Behavior<String, String> for Counting {
        fn on_enter(&mut self, ctx: &mut StateContext<'_, String, String>) {
            let _ = ctx.blackboard_mut().increment(&s("visits"));
        }
    }

    #[test]
    fn state_change_is_announced_before_enter_side_effects() {
        let factory = |_: &String, _: &Blackboard<String, String>| {
            Some(Box::new(Counting) as Box<dyn Behavior<String, String>>)
        };
        let mut machine = StateMachineBuilder::new()
            .states([s("A"), s("B")])
            .start(s("A"))
            .entry(EntryDescriptor::new(s("visits"), 0.0))
            .build(&factory)
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        machine.subscribe(move |n| sink.lock().unwrap().push(n.clone()));

        machine.initialize().unwrap();
        machine.change_state(s("B")).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Notification::StateChanged {
                    previous: None,
                    current: s("A")
                },
                Notification::EntryIncremented {
                    entry: s("visits"),
                    value: 1.0
                },
                Notification::StateChanged {
                    previous: Some(s("A")),
                    current: s("B")
                },
                Notification::EntryIncremented {
                    entry: s("visits"),
                    value: 2.0
                },
            ]
        );
    }

    #[test]
    fn transitions_are_recorded_with_logic_time() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.initialize().unwrap();

        machine.logic_tick(1.5).unwrap();
        machine.change_state(s("Move")).unwrap();

        let last = machine.history().last().unwrap();
        assert_eq!((last.from.as_str(), last.to.as_str()), ("Idle", "Move"));
        assert_eq!(last.at, 1.5);
        assert_eq!(machine.state(&s("Move")).unwrap().entered_at(), 1.5);
    }
}
