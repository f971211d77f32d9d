//! Entity Component System (ECS) utilities for game engine.

pub use component::{
    detach_children, set_parent, set_world_position, sibling_index, world_position,
    BehaviourContext, BehaviourHandle, Component, ComponentHandle, ComponentRegistry,
    ComponentStorage, DrawFunction, GameBehaviour, GameLogicComponent, IndexType, Indices,
    Primitive, RenderComponent, ShaderProgram, TransformComponent, VertexAttribute,
};
pub use entity::{Entity, EntityHandle};
pub use manager::{EntityComponentManager, ManagerBuilder};
pub use mask::{has_all, index_to_mask, ComponentMask, MAX_COMPONENT_TYPES};
pub use system::{GameLogicSystem, System, SystemManager};

mod component;
mod entity;
mod manager;
mod mask;
mod system;
mod tests;
