//! Utilities for registering component types and managing their storages.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::config::DEFAULT_INITIAL_CAPACITY;
use crate::error::{Error, Result};

use super::{
    super::{index_to_mask, ComponentMask, MAX_COMPONENT_TYPES},
    AnyStorage, Component, ComponentStorage,
};

/// Registry of all component types known to the manager.
///
/// Every registered type gets an ordinal (its position in the capability
/// bitmask) and a dedicated [`ComponentStorage`].
///
pub struct ComponentRegistry {
    ordinals: HashMap<TypeId, usize>,
    storages: Vec<Box<dyn AnyStorage>>,
    initial_capacity: usize,
}

impl ComponentRegistry {
    /// Creates new component registry.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates new component registry whose storages reserve `initial_capacity` slots.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            ordinals: HashMap::new(),
            storages: Vec::new(),
            initial_capacity,
        }
    }

    /// Registers component type `T` and returns its ordinal.
    ///
    /// Registering the same type again returns the ordinal it already has.
    ///
    /// # Panics
    ///
    /// Panics if there are already as many types registered as the mask has bits.
    ///
    pub fn register<T>(&mut self) -> usize
    where
        T: Component,
    {
        let type_id = TypeId::of::<T>();
        if let Some(ordinal) = self.ordinals.get(&type_id) {
            return *ordinal;
        }
        assert!(
            self.storages.len() < MAX_COMPONENT_TYPES,
            "cannot register more than {} component types",
            MAX_COMPONENT_TYPES,
        );
        let ordinal = self.storages.len();
        let storage = ComponentStorage::<T>::with_capacity(self.initial_capacity);
        self.storages.push(Box::new(storage));
        self.ordinals.insert(type_id, ordinal);
        log::debug!(
            "registered component type `{}` with ordinal {}",
            type_name::<T>(),
            ordinal,
        );
        ordinal
    }

    /// Returns `true` if component type `T` was registered.
    pub fn is_registered<T>(&self) -> bool
    where
        T: Component,
    {
        self.ordinals.contains_key(&TypeId::of::<T>())
    }

    /// Ordinal of component type `T`.
    pub fn ordinal_of<T>(&self) -> Result<usize>
    where
        T: Component,
    {
        self.ordinals
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(Error::ComponentNotRegistered(type_name::<T>()))
    }

    /// Single-bit mask of component type `T`.
    pub fn mask_of<T>(&self) -> Result<ComponentMask>
    where
        T: Component,
    {
        self.ordinal_of::<T>().map(index_to_mask)
    }

    /// Storage of component type `T`.
    pub fn storage<T>(&self) -> Result<&ComponentStorage<T>>
    where
        T: Component,
    {
        let ordinal = self.ordinal_of::<T>()?;
        self.storages[ordinal]
            .as_any()
            .downcast_ref()
            .ok_or(Error::ComponentNotRegistered(type_name::<T>()))
    }

    /// Mutable storage of component type `T`.
    pub fn storage_mut<T>(&mut self) -> Result<&mut ComponentStorage<T>>
    where
        T: Component,
    {
        let ordinal = self.ordinal_of::<T>()?;
        self.storages[ordinal]
            .as_any_mut()
            .downcast_mut()
            .ok_or(Error::ComponentNotRegistered(type_name::<T>()))
    }

    pub(crate) fn storage_at_mut(
        &mut self,
        ordinal: usize,
    ) -> Option<&mut (dyn AnyStorage + 'static)> {
        self.storages.get_mut(ordinal).map(|storage| storage.as_mut())
    }

    /// Name of component type with the given ordinal.
    pub fn type_name_at(&self, ordinal: usize) -> Option<&'static str> {
        self.storages.get(ordinal).map(|storage| storage.type_name())
    }

    /// Count of components stored for the type with the given ordinal.
    pub fn stored_at(&self, ordinal: usize) -> Option<usize> {
        self.storages.get(ordinal).map(|storage| storage.len())
    }

    /// Count of registered component types.
    pub fn len(&self) -> usize {
        self.storages.len()
    }

    /// Returns `true` if no component type was registered yet.
    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
