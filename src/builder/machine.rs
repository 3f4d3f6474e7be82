//! Builder for constructing state machines.

use crate::blackboard::{Blackboard, EntryDescriptor};
use crate::builder::error::BuildError;
use crate::config::{ConfigError, MachineConfig};
use crate::core::{Key, StateHistory, DEFAULT_HISTORY_CAPACITY};
use crate::machine::{MachineId, MachineRegistry, RegisteredState, StateFactory, StateMachine};
use std::collections::HashMap;

/// Builder for constructing state machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::blackboard::{Blackboard, EntryDescriptor};
/// use blackboard_fsm::builder::StateMachineBuilder;
/// use blackboard_fsm::machine::Behavior;
///
/// struct Idle;
/// impl Behavior<String, String> for Idle {}
///
/// let factory = |_: &String, _: &Blackboard<String, String>| {
///     Some(Box::new(Idle) as Box<dyn Behavior<String, String>>)
/// };
///
/// let mut machine = StateMachineBuilder::new()
///     .state("Idle".to_string())
///     .start("Idle".to_string())
///     .entry(EntryDescriptor::new("health".to_string(), 100.0))
///     .build(&factory)
///     .unwrap();
///
/// machine.initialize().unwrap();
/// assert!(machine.is_in_state(&["Idle".to_string()]));
/// ```
pub struct StateMachineBuilder<S: Key, E: Key> {
    id: Option<MachineId>,
    states: Vec<S>,
    start: Option<S>,
    standard: Option<S>,
    entries: Vec<EntryDescriptor<E, S>>,
    history_capacity: usize,
}

impl<S: Key, E: Key> StateMachineBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            id: None,
            states: Vec::new(),
            start: None,
            standard: None,
            entries: Vec::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Declare one state.
    pub fn state(mut self, state: S) -> Self {
        self.states.push(state);
        self
    }

    /// Declare several states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.states.extend(states);
        self
    }

    /// Set the start state (required).
    pub fn start(mut self, state: S) -> Self {
        self.start = Some(state);
        self
    }

    /// Set the standard state. Defaults to the start state.
    pub fn standard(mut self, state: S) -> Self {
        self.standard = Some(state);
        self
    }

    /// Add one blackboard entry.
    pub fn entry(mut self, entry: EntryDescriptor<E, S>) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add several blackboard entries at once.
    pub fn entries(mut self, entries: impl IntoIterator<Item = EntryDescriptor<E, S>>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Take states, start, standard and entries from a loaded configuration.
    pub fn config(self, config: MachineConfig<S, E>) -> Self {
        let builder = self.states(config.states).entries(config.entries).start(config.start);
        match config.standard {
            Some(standard) => builder.standard(standard),
            None => builder,
        }
    }

    /// Parse a JSON configuration and load it into a fresh builder.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::new().config(MachineConfig::from_json(json)?))
    }

    /// Set the machine identifier. Defaults to `MachineId(0)`.
    pub fn id(mut self, id: MachineId) -> Self {
        self.id = Some(id);
        self
    }

    /// Bound the transition history. Zero disables recording.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Build with an identifier taken from `registry`.
    pub fn spawn<F>(
        self,
        registry: &mut MachineRegistry,
        factory: &F,
    ) -> Result<StateMachine<S, E>, BuildError>
    where
        F: StateFactory<S, E> + ?Sized,
    {
        self.id(registry.allocate()).build(factory)
    }

    /// Build the state machine.
    ///
    /// The factory is asked once for every distinct declared state. Returns
    /// an error only when the machine would have no usable start state;
    /// every other configuration problem is logged, skipped, and kept on the
    /// machine.
    pub fn build<F>(self, factory: &F) -> Result<StateMachine<S, E>, BuildError>
    where
        F: StateFactory<S, E> + ?Sized,
    {
        let start = self.start.ok_or(BuildError::MissingStartState)?;
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }
        if !self.states.contains(&start) {
            return Err(BuildError::StartStateNotDeclared {
                state: start.name().to_string(),
            });
        }

        let id = self.id.unwrap_or_default();
        let config = MachineConfig {
            states: self.states,
            start,
            standard: self.standard,
            entries: self.entries,
        };
        let mut issues = config.issues();
        for error in &issues {
            tracing::warn!(machine = %id, %error, "configuration error");
        }

        let blackboard = Blackboard::new(config.entries);

        let mut states = HashMap::new();
        for state in config.states {
            if states.contains_key(&state) {
                continue;
            }
            match factory.create(&state, &blackboard) {
                Some(behavior) => {
                    states.insert(state.clone(), RegisteredState::new(state, behavior));
                }
                None => {
                    tracing::warn!(machine = %id, state = state.name(), "State unknown!");
                    issues.push(ConfigError::UnknownState {
                        state: state.name().to_string(),
                    });
                }
            }
        }

        if !states.contains_key(&config.start) {
            return Err(BuildError::StartStateNotConstructed {
                state: config.start.name().to_string(),
            });
        }
        let standard = match config.standard {
            Some(standard) if states.contains_key(&standard) => standard,
            _ => config.start.clone(),
        };

        Ok(StateMachine::new(
            id,
            states,
            config.start,
            standard,
            blackboard,
            StateHistory::with_capacity(self.history_capacity),
            issues,
        ))
    }
}

impl<S: Key, E: Key> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
