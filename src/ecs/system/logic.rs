//! System which drives game logic components.

use crate::error::Status;

use super::{
    super::{component::update_entity_logic, GameLogicComponent},
    ComponentMask, ComponentRegistry, Entity, EntityComponentManager, System,
};

/// Updates [`GameLogicComponent`] of every entity which has one.
#[derive(Debug, Default, Copy, Clone)]
pub struct GameLogicSystem;

impl GameLogicSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for GameLogicSystem {
    fn name(&self) -> &'static str {
        "GameLogicSystem"
    }

    fn required_components(&self, registry: &mut ComponentRegistry) -> ComponentMask {
        let ordinal = registry.register::<GameLogicComponent>();
        super::super::index_to_mask(ordinal)
    }

    fn update_internal(
        &mut self,
        dt: f64,
        entities: &[Entity],
        manager: &mut EntityComponentManager,
    ) -> Status {
        entities
            .iter()
            .fold(Status::OK, |status, entity| {
                status | update_entity_logic(manager, *entity, dt)
            })
    }
}
