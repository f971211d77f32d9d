//! Utilities for *entities* in ECS.

use std::fmt;

use crate::error::{Error, Result};

use super::{has_all, Component, ComponentHandle, ComponentMask, EntityComponentManager};

/// Unique identifier of the *entity* of ECS.
///
/// Identifiers are handed out by [`EntityComponentManager`] in increasing order
/// starting from 1 and are never reused. Identifier 0 ([`Entity::NULL`]) means
/// "no entity" or "destroyed".
///
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Reserved identifier which never refers to a live entity.
    pub const NULL: Entity = Entity(0);

    /// Wraps raw identifier.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Raw value of this identifier.
    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Returns `true` if this is [`Entity::NULL`].
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "entity #{}", self.0)
    }
}

impl From<EntityHandle<'_>> for Entity {
    fn from(handle: EntityHandle) -> Self {
        handle.entity
    }
}

/// Transient reference to an entity together with the manager which owns it.
///
/// Handle does not own the entity. Once [destroyed](EntityHandle::destroy)
/// it refers to [`Entity::NULL`] and every forwarded operation short-circuits.
///
pub struct EntityHandle<'m> {
    manager: &'m mut EntityComponentManager,
    entity: Entity,
}

impl<'m> EntityHandle<'m> {
    pub(crate) fn new(manager: &'m mut EntityComponentManager, entity: Entity) -> Self {
        Self { manager, entity }
    }

    /// Identifier of the entity, [`Entity::NULL`] if destroyed through this handle.
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns `true` if this handle no longer refers to an entity.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.entity.is_null()
    }

    /// Queues the entity for deletion and detaches this handle from it.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchEntity`] is returned if the handle was already destroyed.
    ///
    pub fn destroy(&mut self) -> Result<()> {
        if self.is_destroyed() {
            return Err(Error::NoSuchEntity);
        }
        let entity = std::mem::replace(&mut self.entity, Entity::NULL);
        self.manager.delete_entity(entity)
    }

    /// Attaches component to the entity.
    pub fn add_component<T>(&mut self, component: T) -> Result<()>
    where
        T: Component,
    {
        if self.is_destroyed() {
            return Err(Error::EntityAlreadyDeleted);
        }
        self.manager.add_component(self.entity, component)
    }

    /// Detaches component of type `T` from the entity.
    pub fn remove_component<T>(&mut self) -> Result<()>
    where
        T: Component,
    {
        if self.is_destroyed() {
            return Err(Error::EntityAlreadyDeleted);
        }
        self.manager.remove_component::<T>(self.entity)
    }

    /// Retrieves handle of component of type `T` attached to the entity.
    ///
    /// Handle is invalid if the entity was destroyed or has no such component.
    ///
    pub fn component<T>(&mut self) -> ComponentHandle<'_, T>
    where
        T: Component,
    {
        self.manager.component::<T>(self.entity)
    }

    /// Returns `true` if the entity owns every component of the given mask.
    pub fn has_components(&self, mask: ComponentMask) -> bool {
        if self.is_destroyed() {
            return false;
        }
        has_all(self.manager.components_mask(self.entity), mask)
    }

    /// Capability bitmask of the entity.
    pub fn components_mask(&self) -> ComponentMask {
        self.manager.components_mask(self.entity)
    }

    /// Manager which owns the entity.
    pub fn manager(&mut self) -> &mut EntityComponentManager {
        &mut *self.manager
    }
}

impl fmt::Debug for EntityHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("entity", &self.entity)
            .finish()
    }
}

impl PartialEq<Entity> for EntityHandle<'_> {
    fn eq(&self, other: &Entity) -> bool {
        self.entity == *other
    }
}
