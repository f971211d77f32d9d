//! Bookkeeping of systems and the entities they are interested in.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;

use crate::error::{Error, Status};

use super::{
    super::has_all, ComponentMask, ComponentRegistry, Entity, EntityComponentManager, System,
};

struct SystemEntry {
    /// [`None`] while the system is being updated.
    system: Option<Box<dyn System>>,
    name: &'static str,
    required: ComponentMask,
    tracked: BTreeSet<Entity>,
    to_unregister: Vec<Entity>,
}

impl SystemEntry {
    fn complete_unregister_entities(&mut self) -> Status {
        let mut status = Status::OK;
        for entity in mem::take(&mut self.to_unregister) {
            if !self.tracked.remove(&entity) {
                status |= Error::NoSuchEntity;
            }
        }
        status
    }
}

/// Owner of all systems of the manager.
///
/// For each system it keeps the set of tracked entities and the queue
/// of entities to forget once the current update is over.
///
#[derive(Default)]
pub struct SystemManager {
    entries: Vec<SystemEntry>,
}

impl SystemManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds system and returns its index.
    ///
    /// `masks` seeds the tracked set with entities which already exist.
    ///
    pub(crate) fn add_system<'a>(
        &mut self,
        system: Box<dyn System>,
        registry: &mut ComponentRegistry,
        masks: impl IntoIterator<Item = (&'a Entity, &'a ComponentMask)>,
    ) -> usize {
        let required = system.required_components(registry);
        let tracked = masks
            .into_iter()
            .filter(|(_, mask)| has_all(**mask, required))
            .map(|(entity, _)| *entity)
            .collect();
        let name = system.name();
        log::debug!("registered system `{}` requiring mask {:#b}", name, required);
        self.entries.push(SystemEntry {
            system: Some(system),
            name,
            required,
            tracked,
            to_unregister: Vec::new(),
        });
        self.entries.len() - 1
    }

    /// Starts or stops tracking the entity according to its new mask.
    pub(crate) fn update_system_entities(&mut self, entity: Entity, mask: ComponentMask) {
        for entry in &mut self.entries {
            if has_all(mask, entry.required) {
                entry.tracked.insert(entity);
            } else {
                entry.tracked.remove(&entity);
            }
        }
    }

    /// Queues the entity to be forgotten by every system after their next update.
    pub(crate) fn unregister_entity(&mut self, entity: Entity) {
        for entry in &mut self.entries {
            entry.to_unregister.push(entity);
        }
    }

    /// Drops every trace of a swept entity, including pending unregistrations.
    pub(crate) fn forget_entity(&mut self, entity: Entity) {
        for entry in &mut self.entries {
            entry.tracked.remove(&entity);
            entry.to_unregister.retain(|pending| *pending != entity);
        }
    }

    /// Runs every system once, then drains its unregistration queue.
    ///
    /// Failures of all systems are combined into the returned status.
    ///
    pub(crate) fn update_systems(manager: &mut EntityComponentManager, dt: f64) -> Status {
        let mut status = Status::OK;
        let mut index = 0;
        while index < manager.systems.entries.len() {
            let entry = &mut manager.systems.entries[index];
            let (mut system, entities) = match entry.system.take() {
                Some(system) => (system, entry.tracked.iter().copied().collect::<Vec<_>>()),
                None => {
                    index += 1;
                    continue;
                }
            };

            let system_status = system.update_internal(dt, &entities, manager);
            if !system_status.is_ok() {
                log::trace!("system `{}` reported {}", system.name(), system_status);
            }
            status |= system_status;

            let entry = &mut manager.systems.entries[index];
            entry.system = Some(system);
            status |= entry.complete_unregister_entities();
            index += 1;
        }
        status
    }

    /// Entities tracked by the system with the given index.
    pub fn tracked_entities(&self, index: usize) -> Option<&BTreeSet<Entity>> {
        self.entries.get(index).map(|entry| &entry.tracked)
    }

    /// Entities which the system with the given index will forget after its next update.
    pub fn pending_unregistrations(&self, index: usize) -> Option<&[Entity]> {
        self.entries
            .get(index)
            .map(|entry| entry.to_unregister.as_slice())
    }

    /// Mask of components required by the system with the given index.
    pub fn required_mask(&self, index: usize) -> Option<ComponentMask> {
        self.entries.get(index).map(|entry| entry.required)
    }

    /// Count of registered systems.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (entry.name, entry.required, entry.tracked.len())),
            )
            .finish()
    }
}
