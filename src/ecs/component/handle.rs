//! Transient references to components owned by the manager.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;

use super::{
    super::{Entity, EntityComponentManager},
    Component, TransformComponent,
};

/// Transient reference to component of type `T` attached to some entity.
///
/// Handle does not point into the storage directly: storages compact
/// on every removal, so each access looks the owner up again
/// and checks its capability bitmask first.
///
pub struct ComponentHandle<'m, T>
where
    T: Component,
{
    manager: &'m mut EntityComponentManager,
    owner: Entity,
    _marker: PhantomData<fn() -> T>,
}

impl<'m, T> ComponentHandle<'m, T>
where
    T: Component,
{
    pub(crate) fn new(manager: &'m mut EntityComponentManager, owner: Entity) -> Self {
        Self {
            manager,
            owner,
            _marker: PhantomData,
        }
    }

    /// Entity which owned the component when the handle was fetched.
    ///
    /// [`Entity::NULL`] if there was no such component at that time.
    ///
    pub fn owner(&self) -> Entity {
        self.owner
    }

    /// Returns `true` if the owner still has component of type `T`.
    pub fn is_valid(&self) -> bool {
        !self.owner.is_null() && self.manager.has_component::<T>(self.owner)
    }

    /// Retrieves an immutable reference to the component, if still valid.
    pub fn get(&self) -> Option<&T> {
        if !self.is_valid() {
            return None;
        }
        self.manager.get_component(self.owner)
    }

    /// Retrieves a mutable reference to the component, if still valid.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if !self.is_valid() {
            return None;
        }
        self.manager.get_component_mut(self.owner)
    }

    /// Detaches the component from its owner.
    ///
    /// Transform component can not be detached: for it this is a no-op.
    ///
    pub fn destroy(self) -> Result<()> {
        if TypeId::of::<T>() == TypeId::of::<TransformComponent>() {
            return Ok(());
        }
        self.manager.remove_component::<T>(self.owner)
    }
}

impl<T> fmt::Debug for ComponentHandle<'_, T>
where
    T: Component,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("type", &std::any::type_name::<T>())
            .field("owner", &self.owner)
            .field("valid", &self.is_valid())
            .finish()
    }
}
