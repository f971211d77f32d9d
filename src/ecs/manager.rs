//! The entity-component manager: sole owner of entities and their components.

use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::{Config, DEFAULT_INITIAL_CAPACITY};
use crate::error::{Error, Result, Status};

use super::{
    has_all, index_to_mask, Component, ComponentHandle, ComponentMask, ComponentRegistry,
    ComponentStorage, Entity, EntityHandle, GameLogicComponent, GameLogicSystem,
    RenderComponent, System, SystemManager, TransformComponent,
};

/// Manager of all entities and components of ECS.
///
/// Every entity owns a [`TransformComponent`] from creation on.
/// Deleted entities stay intact until [`garbage_collect`](Self::garbage_collect)
/// is called, so iteration in progress never observes a half-removed entity.
///
pub struct EntityComponentManager {
    next_entity: u64,
    registry: ComponentRegistry,
    masks: HashMap<Entity, ComponentMask>,
    deleted_uncleaned: Vec<Entity>,
    pending_deletion: HashSet<Entity>,
    pub(crate) systems: SystemManager,
}

impl EntityComponentManager {
    /// Creates manager with built-in components and the game logic system.
    ///
    /// Ordinals: transform is 0, game logic is 1, render is 2.
    ///
    pub fn new() -> Self {
        Self::builder().standard_components().build()
    }

    /// Same as [`new`](Self::new), but storages reserve capacity from the configuration.
    pub fn with_config(config: &Config) -> Self {
        Self::builder()
            .with_initial_capacity(config.initial_capacity())
            .standard_components()
            .build()
    }

    /// Creates builder of the manager with custom list of components and systems.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// Creates new entity with the default transform attached.
    pub fn create_entity(&mut self) -> EntityHandle<'_> {
        self.next_entity += 1;
        let entity = Entity::from_raw(self.next_entity);
        self.masks.insert(entity, 0);
        log::debug!("created {}", entity);
        if let Err(error) = self.add_component(entity, TransformComponent::new()) {
            log::error!("failed to attach transform to {}: {}", entity, error);
        }
        EntityHandle::new(self, entity)
    }

    /// Handle of an existing entity, [`None`] if it was never created or already swept.
    pub fn entity(&mut self, entity: Entity) -> Option<EntityHandle<'_>> {
        if !self.contains_entity(entity) {
            return None;
        }
        Some(EntityHandle::new(self, entity))
    }

    /// Returns `true` if the entity was created and not swept yet.
    pub fn contains_entity(&self, entity: Entity) -> bool {
        self.masks.contains_key(&entity)
    }

    /// Count of entities which were not swept yet, including those pending deletion.
    pub fn entity_count(&self) -> usize {
        self.masks.len()
    }

    /// Capability bitmask of the entity.
    ///
    /// Empty for [`Entity::NULL`] and for entities which do not exist.
    ///
    pub fn components_mask(&self, entity: Entity) -> ComponentMask {
        if entity.is_null() {
            return 0;
        }
        self.masks.get(&entity).copied().unwrap_or(0)
    }

    /// Returns `true` if the entity owns every component of the given mask.
    pub fn has_components(&self, entity: Entity, mask: ComponentMask) -> bool {
        !entity.is_null() && has_all(self.components_mask(entity), mask)
    }

    /// Returns `true` if the entity owns component of type `T`.
    pub fn has_component<T>(&self, entity: Entity) -> bool
    where
        T: Component,
    {
        match self.registry.mask_of::<T>() {
            Ok(mask) => self.has_components(entity, mask),
            Err(_) => false,
        }
    }

    /// Single-bit mask of component type `T`.
    pub fn mask_of<T>(&self) -> Result<ComponentMask>
    where
        T: Component,
    {
        self.registry.mask_of::<T>()
    }

    /// Registry of component types of this manager.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Attaches component to the entity.
    ///
    /// # Errors
    ///
    /// - [`Error::EntityAlreadyDeleted`] if the entity is [`Entity::NULL`] or pending deletion;
    /// - [`Error::NoSuchEntity`] if the entity does not exist;
    /// - [`Error::ComponentNotRegistered`] if `T` is unknown to this manager;
    /// - [`Error::ComponentAlreadyAdded`] if the entity already has component of type `T`;
    /// - [`Error::NoSpaceRemaining`] if the storage can not grow.
    ///
    pub fn add_component<T>(&mut self, entity: Entity, component: T) -> Result<()>
    where
        T: Component,
    {
        if entity.is_null() || self.pending_deletion.contains(&entity) {
            return Err(Error::EntityAlreadyDeleted);
        }
        let current = *self.masks.get(&entity).ok_or(Error::NoSuchEntity)?;
        let bit = self.registry.mask_of::<T>()?;
        if has_all(current, bit) {
            return Err(Error::ComponentAlreadyAdded);
        }
        let index = self.registry.storage_mut::<T>()?.insert(entity, component)?;

        let mask = current | bit;
        self.masks.insert(entity, mask);
        self.systems.update_system_entities(entity, mask);
        log::trace!("added `{}` to {} at slot {}", type_name::<T>(), entity, index);
        Ok(())
    }

    /// Detaches component of type `T` from the entity.
    ///
    /// Transform component can not be detached: for it this is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::EntityAlreadyDeleted`] if the entity is [`Entity::NULL`];
    /// - [`Error::NoSuchEntity`] if the entity does not exist;
    /// - [`Error::NoSuchElement`] if the entity has no component of type `T`.
    ///
    pub fn remove_component<T>(&mut self, entity: Entity) -> Result<()>
    where
        T: Component,
    {
        if entity.is_null() {
            return Err(Error::EntityAlreadyDeleted);
        }
        if TypeId::of::<T>() == TypeId::of::<TransformComponent>() {
            log::warn!("transform can not be removed from {}", entity);
            return Ok(());
        }
        let current = *self.masks.get(&entity).ok_or(Error::NoSuchEntity)?;
        let ordinal = self.registry.ordinal_of::<T>()?;
        if !has_all(current, index_to_mask(ordinal)) {
            return Err(Error::NoSuchElement);
        }
        let mask = self.remove_component_at(entity, ordinal)?;
        if !self.pending_deletion.contains(&entity) {
            self.systems.update_system_entities(entity, mask);
        }
        log::trace!("removed `{}` from {}", type_name::<T>(), entity);
        Ok(())
    }

    /// Swap-removes component with the given ordinal and clears its bit.
    ///
    /// Returns the new mask of the entity.
    ///
    fn remove_component_at(&mut self, entity: Entity, ordinal: usize) -> Result<ComponentMask> {
        let storage = self
            .registry
            .storage_at_mut(ordinal)
            .ok_or(Error::NoSuchElement)?;
        storage.remove_entity(entity)?;
        let mask = self.masks.entry(entity).or_insert(0);
        *mask &= !index_to_mask(ordinal);
        Ok(*mask)
    }

    /// Retrieves handle of component of type `T` attached to the entity.
    ///
    /// Handle is invalid if the entity is [`Entity::NULL`] or has no such component.
    ///
    pub fn component<T>(&mut self, entity: Entity) -> ComponentHandle<'_, T>
    where
        T: Component,
    {
        let owner = if self.has_component::<T>(entity) {
            entity
        } else {
            Entity::NULL
        };
        ComponentHandle::new(self, owner)
    }

    /// Retrieves an immutable reference to component of type `T` attached to the entity.
    pub fn get_component<T>(&self, entity: Entity) -> Option<&T>
    where
        T: Component,
    {
        if !self.has_component::<T>(entity) {
            return None;
        }
        self.registry.storage::<T>().ok()?.get(entity)
    }

    /// Retrieves a mutable reference to component of type `T` attached to the entity.
    pub fn get_component_mut<T>(&mut self, entity: Entity) -> Option<&mut T>
    where
        T: Component,
    {
        if !self.has_component::<T>(entity) {
            return None;
        }
        self.registry.storage_mut::<T>().ok()?.get_mut(entity)
    }

    /// All components of type `T` as contiguous slice.
    ///
    /// The slice must not be kept across additions or removals of `T`:
    /// the borrow checker enforces this.
    ///
    pub fn component_store<T>(&self) -> Result<&[T]>
    where
        T: Component,
    {
        self.registry.storage::<T>().map(ComponentStorage::as_slice)
    }

    /// Iterator over all components of type `T` with their owners.
    pub fn component_iter<T>(&self) -> Result<impl Iterator<Item = (Entity, &T)>>
    where
        T: Component,
    {
        self.registry.storage::<T>().map(ComponentStorage::iter)
    }

    /// Queues the entity for deletion.
    ///
    /// Components of the entity stay fetchable until the next garbage collection;
    /// systems forget the entity after their next update.
    ///
    /// # Errors
    ///
    /// - [`Error::EntityAlreadyDeleted`] if the entity is [`Entity::NULL`] or already queued;
    /// - [`Error::NoSuchEntity`] if the entity does not exist.
    ///
    pub fn delete_entity(&mut self, entity: Entity) -> Result<()> {
        if entity.is_null() || self.pending_deletion.contains(&entity) {
            return Err(Error::EntityAlreadyDeleted);
        }
        if !self.contains_entity(entity) {
            return Err(Error::NoSuchEntity);
        }
        self.deleted_uncleaned.push(entity);
        self.pending_deletion.insert(entity);
        self.systems.unregister_entity(entity);
        log::debug!("{} queued for deletion", entity);
        Ok(())
    }

    /// Returns `true` if the entity is queued for deletion and not swept yet.
    pub fn is_pending_deletion(&self, entity: Entity) -> bool {
        self.pending_deletion.contains(&entity)
    }

    /// Entities queued for deletion in order of deletion.
    pub fn deleted_uncleaned_entities(&self) -> &[Entity] {
        &self.deleted_uncleaned
    }

    /// Removes every component of entities queued for deletion.
    ///
    /// Swept entities disappear from the bitmask table and from every system.
    /// Their identifiers are never reused.
    ///
    pub fn garbage_collect(&mut self) {
        if self.deleted_uncleaned.is_empty() {
            return;
        }
        let deleted = std::mem::take(&mut self.deleted_uncleaned);
        let count = deleted.len();
        for entity in deleted {
            let mask = self.components_mask(entity);
            for ordinal in 0..self.registry.len() {
                if !has_all(mask, index_to_mask(ordinal)) {
                    continue;
                }
                if let Err(error) = self.remove_component_at(entity, ordinal) {
                    log::error!(
                        "failed to sweep component #{} of {}: {}",
                        ordinal,
                        entity,
                        error,
                    );
                }
            }
            self.masks.remove(&entity);
            self.pending_deletion.remove(&entity);
            self.systems.forget_entity(entity);
        }
        log::debug!("garbage collected {} entities", count);
    }

    /// Adds system and returns its index.
    ///
    /// Entities which already own the required components are tracked at once.
    ///
    pub fn register_system<S>(&mut self, system: S) -> usize
    where
        S: System + 'static,
    {
        self.register_boxed_system(Box::new(system))
    }

    fn register_boxed_system(&mut self, system: Box<dyn System>) -> usize {
        let masks = self
            .masks
            .iter()
            .filter(|(entity, _)| !self.pending_deletion.contains(*entity));
        self.systems.add_system(system, &mut self.registry, masks)
    }

    /// Runs every system once.
    pub fn update_systems(&mut self, dt: f64) -> Status {
        SystemManager::update_systems(self, dt)
    }

    /// Systems of this manager.
    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }
}

impl Default for EntityComponentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EntityComponentManager")
            .field("entities", &self.masks.len())
            .field("component_types", &self.registry.len())
            .field("deleted_uncleaned", &self.deleted_uncleaned)
            .field("systems", &self.systems)
            .finish()
    }
}

type Registration = fn(&mut ComponentRegistry) -> usize;

/// Builder of [`EntityComponentManager`].
///
/// Component types get ordinals in order of registration.
/// [`TransformComponent`] is registered last if it was not registered explicitly.
///
pub struct ManagerBuilder {
    initial_capacity: usize,
    registrations: Vec<Registration>,
    systems: Vec<Box<dyn System>>,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            registrations: Vec::new(),
            systems: Vec::new(),
        }
    }

    /// Registers component type `T`.
    pub fn component<T>(mut self) -> Self
    where
        T: Component,
    {
        let register: Registration = ComponentRegistry::register::<T>;
        self.registrations.push(register);
        self
    }

    /// Registers built-in components and the game logic system.
    pub fn standard_components(self) -> Self {
        self.component::<TransformComponent>()
            .component::<GameLogicComponent>()
            .component::<RenderComponent>()
            .system(GameLogicSystem::new())
    }

    /// Adds system to the manager.
    pub fn system<S>(mut self, system: S) -> Self
    where
        S: System + 'static,
    {
        self.systems.push(Box::new(system));
        self
    }

    /// Count of components each storage reserves space for.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn build(self) -> EntityComponentManager {
        let mut registry = ComponentRegistry::with_capacity(self.initial_capacity);
        for register in self.registrations {
            register(&mut registry);
        }
        registry.register::<TransformComponent>();

        let mut manager = EntityComponentManager {
            next_entity: 0,
            registry,
            masks: HashMap::new(),
            deleted_uncleaned: Vec::new(),
            pending_deletion: HashSet::new(),
            systems: SystemManager::new(),
        };
        for system in self.systems {
            manager.register_boxed_system(system);
        }
        manager
    }
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
