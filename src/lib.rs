//! blackboard-fsm: tick-driven state machines with a reactive blackboard
//!
//! Each entity owns a [`StateMachine`] whose states share a [`Blackboard`]
//! of named numeric entries. Entries can advance on a whole-second timer and
//! carry hysteresis-gated watchers that react to threshold crossings by
//! requesting state changes.
//!
//! # Core Concepts
//!
//! - **Keys**: state and entry identifiers via the [`Key`] trait
//! - **Blackboard**: numeric entries, timers and watchers
//! - **Behaviors**: per-state hooks run by the machine
//! - **Commands**: transition requests that are serialized, never nested
//!
//! # Example
//!
//! ```rust
//! use blackboard_fsm::blackboard::{Blackboard, Comparison, EntryDescriptor, Response};
//! use blackboard_fsm::machine::{Behavior, StateContext};
//! use blackboard_fsm::{key_enum, StateMachineBuilder};
//!
//! key_enum! {
//!     enum Mode { Idle, Eat }
//! }
//!
//! key_enum! {
//!     enum Stat { Hunger }
//! }
//!
//! struct Idle;
//! impl Behavior<Mode, Stat> for Idle {}
//!
//! struct Eat;
//! impl Behavior<Mode, Stat> for Eat {
//!     fn on_enter(&mut self, ctx: &mut StateContext<'_, Mode, Stat>) {
//!         let _ = ctx.blackboard_mut().set_value(&Stat::Hunger, 0.0);
//!         ctx.change_state(Mode::Idle);
//!     }
//! }
//!
//! let factory = |id: &Mode, _: &Blackboard<Stat, Mode>| -> Option<Box<dyn Behavior<Mode, Stat>>> {
//!     match id {
//!         Mode::Idle => Some(Box::new(Idle)),
//!         Mode::Eat => Some(Box::new(Eat)),
//!     }
//! };
//!
//! let mut machine = StateMachineBuilder::new()
//!     .states([Mode::Idle, Mode::Eat])
//!     .start(Mode::Idle)
//!     .entry(
//!         EntryDescriptor::new(Stat::Hunger, 0.0)
//!             .timer(1.0)
//!             .watch(Comparison::GreaterThan, 2.5, Response::ChangeState(Mode::Eat)),
//!     )
//!     .build(&factory)
//!     .unwrap();
//!
//! machine.initialize().unwrap();
//! for _ in 0..3 {
//!     machine.logic_tick(1.0).unwrap();
//! }
//!
//! assert_eq!(machine.current_state(), Some(&Mode::Idle));
//! assert_eq!(machine.blackboard().get_value(&Stat::Hunger), Ok(0.0));
//! assert_eq!(machine.history().get_path(), vec![&Mode::Idle, &Mode::Eat, &Mode::Idle]);
//! ```

pub mod blackboard;
pub mod builder;
pub mod config;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use blackboard::{Blackboard, BlackboardError, Comparison, EntryDescriptor, Response};
pub use builder::{BuildError, StateMachineBuilder};
pub use config::{ConfigError, MachineConfig};
pub use core::{Key, Notification, StateHistory, StateTransition};
pub use machine::{Behavior, MachineError, StateContext, StateFactory, StateMachine, TickDriver};
