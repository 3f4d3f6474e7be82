//! Declarative machine configuration.
//!
//! A [`MachineConfig`] lists the declared states, the start and standard
//! states, and the blackboard entries. It is usually produced by an external
//! loader; [`MachineConfig::from_json`] covers the common JSON case.
//!
//! Validation uses Stillwater's `Validation` type so that every problem in a
//! configuration is reported at once instead of one per run.
//!
//! # Example
//!
//! ```rust
//! use blackboard_fsm::config::MachineConfig;
//!
//! let config: MachineConfig<String, String> = MachineConfig::from_json(r#"{
//!     "states": ["Idle", "Move"],
//!     "start": "Idle",
//!     "entries": [
//!         { "id": "health", "start_value": 100 },
//!         { "id": "hunger", "is_timer": true, "interval": 5 }
//!     ]
//! }"#).unwrap();
//!
//! assert!(config.validate().is_success());
//! assert_eq!(config.standard_state(), "Idle");
//! ```

mod error;

pub use error::ConfigError;

use crate::blackboard::EntryDescriptor;
use crate::core::Key;
use serde::Deserialize;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// States and entries for one machine instance.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound = "")]
pub struct MachineConfig<S: Key, E: Key> {
    /// Declared state identifiers, in declaration order.
    pub states: Vec<S>,
    /// The state entered on initialization.
    pub start: S,
    /// Fallback state for `change_to_next_state`. Defaults to `start`.
    #[serde(default)]
    pub standard: Option<S>,
    #[serde(default)]
    pub entries: Vec<EntryDescriptor<E, S>>,
}

impl<S: Key, E: Key> MachineConfig<S, E> {
    /// Create a configuration with no entries and no explicit standard state.
    pub fn new(states: Vec<S>, start: S) -> Self {
        Self {
            states,
            start,
            standard: None,
            entries: Vec::new(),
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The standard state, falling back to the start state.
    pub fn standard_state(&self) -> &S {
        self.standard.as_ref().unwrap_or(&self.start)
    }

    /// Check the whole configuration, accumulating ALL problems.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = Vec::new();

        let mut declared = HashSet::new();
        for state in &self.states {
            if !declared.insert(state) {
                checks.push(Validation::fail(ConfigError::DuplicateState {
                    state: state.name().to_string(),
                }));
            }
        }

        if !declared.contains(&self.start) {
            checks.push(Validation::fail(ConfigError::StartStateNotDeclared {
                state: self.start.name().to_string(),
            }));
        }

        if let Some(standard) = &self.standard {
            if !declared.contains(standard) {
                checks.push(Validation::fail(ConfigError::StandardStateNotDeclared {
                    state: standard.name().to_string(),
                }));
            }
        }

        let mut entries = HashSet::new();
        for entry in &self.entries {
            if !entries.insert(&entry.id) {
                checks.push(Validation::fail(ConfigError::DuplicateEntry {
                    entry: entry.id.name().to_string(),
                }));
            }
            if entry.is_timer && (entry.interval <= 0.0 || entry.interval.is_nan()) {
                checks.push(Validation::fail(ConfigError::InvalidInterval {
                    entry: entry.id.name().to_string(),
                    interval: entry.interval,
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Every problem [`validate`](Self::validate) finds, as a plain list.
    pub fn issues(&self) -> Vec<ConfigError> {
        match self.validate() {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn valid_config_passes() {
        let mut config: MachineConfig<String, String> =
            MachineConfig::new(vec![id("Idle"), id("Move")], id("Idle"));
        config.entries.push(EntryDescriptor::new(id("hunger"), 0.0).timer(5.0));

        assert!(config.validate().is_success());
        assert!(config.issues().is_empty());
    }

    #[test]
    fn validation_accumulates_all_problems() {
        let mut config: MachineConfig<String, String> =
            MachineConfig::new(vec![id("Idle"), id("Idle")], id("Sleep"));
        config.standard = Some(id("Move"));
        config.entries = vec![
            EntryDescriptor::new(id("hunger"), 0.0).timer(-1.0),
            EntryDescriptor::new(id("hunger"), 0.0),
        ];

        match config.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 5);

                let has = |f: fn(&ConfigError) -> bool| errors.iter().any(f);
                assert!(has(|e| matches!(e, ConfigError::DuplicateState { .. })));
                assert!(has(|e| matches!(e, ConfigError::StartStateNotDeclared { .. })));
                assert!(has(|e| matches!(e, ConfigError::StandardStateNotDeclared { .. })));
                assert!(has(|e| matches!(e, ConfigError::DuplicateEntry { .. })));
                assert!(has(|e| matches!(e, ConfigError::InvalidInterval { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn standard_defaults_to_start() {
        let config: MachineConfig<String, String> =
            MachineConfig::new(vec![id("Idle")], id("Idle"));
        assert_eq!(config.standard_state(), "Idle");
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let result = MachineConfig::<String, String>::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn from_json_reads_watchers() {
        let config = MachineConfig::<String, String>::from_json(
            r#"{
                "states": ["Idle", "Move"],
                "start": "Idle",
                "standard": "Idle",
                "entries": [{
                    "id": "idle_time",
                    "is_timer": true,
                    "interval": 1,
                    "watchers": [{
                        "comparison": "greater_than",
                        "threshold": 5,
                        "response": { "change_state": "Move" }
                    }]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.entries.len(), 1);
        assert_eq!(config.entries[0].watchers[0].threshold, 5.0);
        assert!(config.issues().is_empty());
    }
}
