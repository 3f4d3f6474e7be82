//! Host-side tick interface.

use super::engine::StateMachine;
use super::error::MachineError;
use crate::core::Key;

/// Something a host loop ticks once per logic step and once per physics step.
///
/// The machine never calls these itself; the host decides the step sizes.
pub trait TickDriver {
    type Error;

    fn on_logic_tick(&mut self, delta: f32) -> Result<(), Self::Error>;

    fn on_physics_tick(&mut self, delta: f32) -> Result<(), Self::Error>;
}

impl<S: Key, E: Key> TickDriver for StateMachine<S, E> {
    type Error = MachineError;

    fn on_logic_tick(&mut self, delta: f32) -> Result<(), MachineError> {
        self.logic_tick(delta)
    }

    fn on_physics_tick(&mut self, delta: f32) -> Result<(), MachineError> {
        self.physics_tick(delta)
    }
}

/// Run `steps` fixed steps: a logic tick followed by a physics tick each.
pub fn simulate<D: TickDriver>(driver: &mut D, steps: usize, delta: f32) -> Result<(), D::Error> {
    for _ in 0..steps {
        driver.on_logic_tick(delta)?;
        driver.on_physics_tick(delta)?;
    }
    Ok(())
}
