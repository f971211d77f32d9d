//! Utilities for *systems* in ECS.

use std::any::type_name;

use crate::error::Status;

pub use logic::GameLogicSystem;
pub use manager::SystemManager;

use super::{ComponentMask, ComponentRegistry, Entity, EntityComponentManager};

mod logic;
mod manager;

/// Objects of this trait represent *system* of ECS.
///
/// A system declares which components it needs; the [`SystemManager`] keeps
/// the set of entities owning all of them and hands it to the system every tick.
///
pub trait System {
    /// Name of the system used in log messages.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Component types which will be handled by this system.
    ///
    /// Called once when the system is registered. The system may register
    /// the component types it needs.
    ///
    fn required_components(&self, registry: &mut ComponentRegistry) -> ComponentMask;

    /// Handles `dt` seconds of simulation for every tracked entity.
    ///
    /// `entities` does not change during the call even if the manager is
    /// mutated: deletions are applied after this call returns.
    ///
    fn update_internal(
        &mut self,
        dt: f64,
        entities: &[Entity],
        manager: &mut EntityComponentManager,
    ) -> Status;
}
