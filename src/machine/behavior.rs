//! State behaviors and the bookkeeping wrapped around them.

use crate::blackboard::Blackboard;
use crate::core::{Commands, Key};

/// Capability set of one state variant.
///
/// Every hook has an empty default, so a variant only implements what it
/// needs. Hooks get a [`StateContext`] borrowing the machine's blackboard for
/// the duration of the call; transition requests made through it are
/// applied after the hook returns.
///
/// # Example
///
/// ```rust
/// use blackboard_fsm::machine::{Behavior, StateContext};
///
/// struct Wander;
///
/// impl Behavior<String, String> for Wander {
///     fn logic_tick(&mut self, ctx: &mut StateContext<'_, String, String>, delta: f32) {
///         let _ = ctx.blackboard_mut().increase(&"distance".to_string(), delta);
///     }
/// }
/// ```
pub trait Behavior<S: Key, E: Key>: Send {
    /// Variant-specific setup, run after the activation bookkeeping.
    fn on_enter(&mut self, _ctx: &mut StateContext<'_, S, E>) {}

    /// Variant-specific teardown. `ctx.is_exiting()` is already `true`.
    fn on_exit(&mut self, _ctx: &mut StateContext<'_, S, E>) {}

    /// Runs once per logic step while the state is active.
    fn logic_tick(&mut self, _ctx: &mut StateContext<'_, S, E>, _delta: f32) {}

    /// Runs once per physics step while the state is active.
    fn physics_tick(&mut self, _ctx: &mut StateContext<'_, S, E>, _delta: f32) {}
}

/// What a hook can see and do.
pub struct StateContext<'a, S: Key, E: Key> {
    id: &'a S,
    blackboard: &'a mut Blackboard<E, S>,
    is_exiting: bool,
    entered_at: f64,
}

impl<'a, S: Key, E: Key> StateContext<'a, S, E> {
    /// Identifier of the state the hook belongs to.
    pub fn id(&self) -> &S {
        self.id
    }

    /// Read access to the shared blackboard.
    pub fn blackboard(&self) -> &Blackboard<E, S> {
        self.blackboard
    }

    /// Write access to the shared blackboard.
    pub fn blackboard_mut(&mut self) -> &mut Blackboard<E, S> {
        self.blackboard
    }

    /// Whether the state is being exited.
    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    /// Logic time at which the state was last entered.
    pub fn entered_at(&self) -> f64 {
        self.entered_at
    }

    /// Logic time spent in the state since it was last entered.
    pub fn time_in_state(&self) -> f64 {
        self.blackboard.elapsed() - self.entered_at
    }

    /// Raw handle for queueing arbitrary commands.
    pub fn commands(&mut self) -> Commands<'_, S> {
        self.blackboard.commands()
    }

    /// Request a transition once this hook has returned.
    pub fn change_state(&mut self, state: S) {
        self.commands().change_state(state);
    }

    /// Request that `state` be appended to the pending-state queue.
    pub fn enqueue_state(&mut self, state: S) {
        self.commands().enqueue_state(state);
    }

    /// Request a transition to the next queued state.
    pub fn change_to_next_state(&mut self) {
        self.commands().change_to_next_state();
    }
}

/// A constructed state: its behavior plus activation bookkeeping.
///
/// Exactly one of these exists per declared identifier for the lifetime of
/// a machine.
pub struct RegisteredState<S: Key, E: Key> {
    id: S,
    behavior: Box<dyn Behavior<S, E>>,
    is_exiting: bool,
    entered_at: f64,
    activations: u32,
}

impl<S: Key, E: Key> RegisteredState<S, E> {
    pub(crate) fn new(id: S, behavior: Box<dyn Behavior<S, E>>) -> Self {
        Self {
            id,
            behavior,
            is_exiting: false,
            entered_at: 0.0,
            activations: 0,
        }
    }

    /// Identifier the state was registered under.
    pub fn id(&self) -> &S {
        &self.id
    }

    /// `true` from the start of `exit` until the next `enter`.
    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    /// Logic time of the most recent activation.
    pub fn entered_at(&self) -> f64 {
        self.entered_at
    }

    /// How many times the state has been entered.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// The behavior the factory constructed.
    pub fn behavior(&self) -> &dyn Behavior<S, E> {
        self.behavior.as_ref()
    }

    pub(crate) fn enter(&mut self, blackboard: &mut Blackboard<E, S>) {
        self.entered_at = blackboard.elapsed();
        self.is_exiting = false;
        self.activations += 1;
        let mut ctx = StateContext {
            id: &self.id,
            blackboard,
            is_exiting: self.is_exiting,
            entered_at: self.entered_at,
        };
        self.behavior.on_enter(&mut ctx);
    }

    pub(crate) fn exit(&mut self, blackboard: &mut Blackboard<E, S>) {
        self.is_exiting = true;
        let mut ctx = StateContext {
            id: &self.id,
            blackboard,
            is_exiting: self.is_exiting,
            entered_at: self.entered_at,
        };
        self.behavior.on_exit(&mut ctx);
    }

    pub(crate) fn logic_tick(&mut self, blackboard: &mut Blackboard<E, S>, delta: f32) {
        let mut ctx = StateContext {
            id: &self.id,
            blackboard,
            is_exiting: self.is_exiting,
            entered_at: self.entered_at,
        };
        self.behavior.logic_tick(&mut ctx, delta);
    }

    pub(crate) fn physics_tick(&mut self, blackboard: &mut Blackboard<E, S>, delta: f32) {
        let mut ctx = StateContext {
            id: &self.id,
            blackboard,
            is_exiting: self.is_exiting,
            entered_at: self.entered_at,
        };
        self.behavior.physics_tick(&mut ctx, delta);
    }
}
