//! Dense storage of statically typed **components** of ECS.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

use super::{super::Entity, Component};

/// Storage for statically typed components of ECS.
///
/// Components are kept contiguously; the owner of each slot is tracked
/// in both directions so that removal can move the last component
/// into the freed slot.
///
pub struct ComponentStorage<T>
where
    T: Component,
{
    /// Components are actually stored here.
    components: Vec<T>,
    entity_to_index: HashMap<Entity, usize>,
    index_to_entity: HashMap<usize, Entity>,
}

impl<T> ComponentStorage<T>
where
    T: Component,
{
    /// Creates an empty component storage.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty component storage with space for `capacity` components.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::with_capacity(capacity),
            entity_to_index: HashMap::with_capacity(capacity),
            index_to_entity: HashMap::with_capacity(capacity),
        }
    }

    /// Appends component and attaches it to the entity.
    ///
    /// When the storage is full its capacity grows by a tenth.
    /// Returns index of the slot the component was put in.
    ///
    /// # Errors
    ///
    /// [`Error::ComponentAlreadyAdded`] if the entity already owns a component here,
    /// [`Error::NoSpaceRemaining`] if the storage cannot grow.
    ///
    pub fn insert(&mut self, entity: Entity, component: T) -> Result<usize> {
        if self.contains(entity) {
            return Err(Error::ComponentAlreadyAdded);
        }
        let capacity = self.components.capacity();
        if self.components.len() == capacity {
            let additional = usize::max(capacity / 10, 1);
            self.components
                .try_reserve_exact(additional)
                .map_err(|_| Error::NoSpaceRemaining)?;
        }
        let index = self.components.len();
        self.components.push(component);
        self.entity_to_index.insert(entity, index);
        self.index_to_entity.insert(index, entity);
        Ok(index)
    }

    /// Removes component of the entity by moving the last component into its slot.
    ///
    /// Returns component that was attached to the entity.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchElement`] if the entity owns no component here.
    ///
    pub fn swap_remove(&mut self, entity: Entity) -> Result<T> {
        let index = self.index_of(entity).ok_or(Error::NoSuchElement)?;
        let last = self.components.len() - 1;
        let last_entity = self.entity_at(last).ok_or(Error::NoSuchElement)?;

        let component = self.components.swap_remove(index);
        self.entity_to_index.remove(&entity);
        self.index_to_entity.remove(&last);
        if last_entity != entity {
            self.entity_to_index.insert(last_entity, index);
            self.index_to_entity.insert(index, last_entity);
        }
        Ok(component)
    }

    /// Returns `true` if component was already attached to the entity.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Index of the slot which holds component of the entity.
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.entity_to_index.get(&entity).copied()
    }

    /// Entity which owns component in the given slot.
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.index_to_entity.get(&index).copied()
    }

    /// Retrieves an immutable reference to component attached to the entity.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let index = self.index_of(entity)?;
        self.components.get(index)
    }

    /// Retrieves a mutable reference to component attached to the entity.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let index = self.index_of(entity)?;
        self.components.get_mut(index)
    }

    /// Count of stored components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if there are no components stored.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Count of components the storage can hold without growing.
    pub fn capacity(&self) -> usize {
        self.components.capacity()
    }

    /// All stored components as contiguous slice.
    ///
    /// Order is not meaningful and changes whenever a component is removed.
    ///
    pub fn as_slice(&self) -> &[T] {
        &self.components
    }

    /// Returns immutable iterator over all components with their entities.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        let index_to_entity = &self.index_to_entity;
        self.components
            .iter()
            .enumerate()
            .filter_map(move |(index, component)| {
                index_to_entity.get(&index).map(|entity| (*entity, component))
            })
    }

    /// Returns mutable iterator over all components with their entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let index_to_entity = &self.index_to_entity;
        self.components
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, component)| {
                index_to_entity.get(&index).map(|entity| (*entity, component))
            })
    }

    /// Returns iterator over all entities which have component of this type.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entity_to_index.keys().copied()
    }
}

impl<T> Default for ComponentStorage<T>
where
    T: Component,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Entity> for ComponentStorage<T>
where
    T: Component,
{
    type Output = T;

    /// # Panics
    ///
    /// Panics if there is no component attached to the entity.
    ///
    fn index(&self, entity: Entity) -> &Self::Output {
        self.get(entity)
            .expect("there is no component attached to the entity")
    }
}

impl<T> IndexMut<Entity> for ComponentStorage<T>
where
    T: Component,
{
    /// # Panics
    ///
    /// Panics if there is no component attached to the entity.
    ///
    fn index_mut(&mut self, entity: Entity) -> &mut Self::Output {
        self.get_mut(entity)
            .expect("there is no component attached to the entity")
    }
}

/// Type-erased view of [`ComponentStorage`] used by the manager
/// to sweep components without knowing their type.
pub(crate) trait AnyStorage {
    /// Swap-removes and drops component of the entity.
    fn remove_entity(&mut self, entity: Entity) -> Result<()>;

    fn len(&self) -> usize;

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> AnyStorage for ComponentStorage<T>
where
    T: Component,
{
    fn remove_entity(&mut self, entity: Entity) -> Result<()> {
        self.swap_remove(entity).map(drop)
    }

    fn len(&self) -> usize {
        ComponentStorage::len(self)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
