//! Game level logic attached to entities.

use std::fmt;
use std::mem;

use slotmap::{new_key_type, DenseSlotMap};

use crate::error::{Error, Result, Status};

use super::super::{Entity, EntityComponentManager, EntityHandle};

new_key_type! {
    /// Opaque key of a behaviour registered in some [`GameLogicComponent`].
    pub struct BehaviourHandle;
}

/// Unit of game level logic, updated once per tick.
///
/// Behaviours are open-ended: games implement this trait for their own types
/// and register them in the [`GameLogicComponent`] of an entity.
///
pub trait GameBehaviour {
    /// Simulates `dt` seconds of this behaviour.
    fn update(&mut self, dt: f64, context: &mut BehaviourContext<'_>);
}

/// Everything a behaviour can reach during its update.
pub struct BehaviourContext<'a> {
    owner: Entity,
    handle: BehaviourHandle,
    manager: &'a mut EntityComponentManager,
    removals: &'a mut Vec<BehaviourHandle>,
}

impl<'a> BehaviourContext<'a> {
    /// Entity which owns the behaviour.
    pub fn owner(&self) -> Entity {
        self.owner
    }

    /// Handle of the behaviour being updated.
    pub fn handle(&self) -> BehaviourHandle {
        self.handle
    }

    pub fn manager(&mut self) -> &mut EntityComponentManager {
        &mut *self.manager
    }

    /// Handle of the entity which owns the behaviour.
    pub fn owning_entity(&mut self) -> EntityHandle<'_> {
        EntityHandle::new(&mut *self.manager, self.owner)
    }

    /// Removes the behaviour being updated before the next update.
    pub fn unregister_this(&mut self) {
        self.removals.push(self.handle);
    }

    /// Removes some behaviour of the same component before the next update.
    pub fn enqueue_behaviour_removal(&mut self, handle: BehaviourHandle) {
        self.removals.push(handle);
    }
}

/// Component which owns behaviours of an entity.
///
/// Behaviours can not be removed while they are being updated:
/// removals are queued and applied at the start of the next [`update`](Self::update).
///
#[derive(Default)]
pub struct GameLogicComponent {
    /// Slot is [`None`] while its behaviour is being updated.
    behaviours: DenseSlotMap<BehaviourHandle, Option<Box<dyn GameBehaviour>>>,
    removals: Vec<BehaviourHandle>,
}

impl GameLogicComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of the behaviour and returns its handle.
    ///
    /// Behaviours registered while the component is updating are first updated on the next tick.
    ///
    pub fn register_behaviour(&mut self, behaviour: Box<dyn GameBehaviour>) -> BehaviourHandle {
        self.behaviours.insert(Some(behaviour))
    }

    /// Queues the behaviour for removal before the next update.
    pub fn enqueue_behaviour_removal(&mut self, handle: BehaviourHandle) {
        self.removals.push(handle);
    }

    pub(crate) fn unregister_behaviour(&mut self, handle: BehaviourHandle) -> Result<()> {
        self.behaviours
            .remove(handle)
            .map(drop)
            .ok_or(Error::NoSuchElement)
    }

    /// Returns `true` if the behaviour is registered and not removed yet.
    pub fn contains_behaviour(&self, handle: BehaviourHandle) -> bool {
        self.behaviours.contains_key(handle)
    }

    pub fn behaviour_count(&self) -> usize {
        self.behaviours.len()
    }

    /// Handles queued for removal.
    pub fn pending_removals(&self) -> &[BehaviourHandle] {
        &self.removals
    }

    /// Applies queued removals and updates every remaining behaviour once.
    ///
    /// Removals of unknown handles are reported as [`Error::NoSuchElement`].
    /// Use this for components which are not attached to the owner:
    /// attached ones are updated by [`GameLogicSystem`](crate::ecs::GameLogicSystem).
    ///
    pub fn update(
        &mut self,
        dt: f64,
        owner: Entity,
        manager: &mut EntityComponentManager,
    ) -> Status {
        let status = self.apply_removals();
        let mut removals = Vec::new();
        for (handle, behaviour) in self.behaviours.iter_mut() {
            if let Some(behaviour) = behaviour {
                let mut context = BehaviourContext {
                    owner,
                    handle,
                    manager: &mut *manager,
                    removals: &mut removals,
                };
                behaviour.update(dt, &mut context);
            }
        }
        self.removals.extend(removals);
        status
    }

    fn apply_removals(&mut self) -> Status {
        mem::take(&mut self.removals)
            .into_iter()
            .fold(Status::OK, |status, handle| {
                status | Status::from(self.unregister_behaviour(handle))
            })
    }

    fn check_out(&mut self, handle: BehaviourHandle) -> Option<Box<dyn GameBehaviour>> {
        self.behaviours.get_mut(handle).and_then(Option::take)
    }

    fn check_in(&mut self, handle: BehaviourHandle, behaviour: Box<dyn GameBehaviour>) {
        if let Some(slot) = self.behaviours.get_mut(handle) {
            *slot = Some(behaviour);
        }
    }
}

impl fmt::Debug for GameLogicComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GameLogicComponent")
            .field("behaviours", &self.behaviours.len())
            .field("removals", &self.removals)
            .finish()
    }
}

/// Updates logic component attached to the entity.
///
/// The component stays in its storage: only the behaviour being updated
/// is taken out of it, so behaviours are free to use the manager and the
/// handles they register on their own entity stay valid.
///
pub(crate) fn update_entity_logic(
    manager: &mut EntityComponentManager,
    entity: Entity,
    dt: f64,
) -> Status {
    let (status, handles) = match manager.get_component_mut::<GameLogicComponent>(entity) {
        Some(logic) => {
            let status = logic.apply_removals();
            (status, logic.behaviours.keys().collect::<Vec<_>>())
        }
        None => return Error::NoSuchElement.into(),
    };

    let mut removals = Vec::new();
    for handle in handles {
        let behaviour = match manager.get_component_mut::<GameLogicComponent>(entity) {
            Some(logic) => logic.check_out(handle),
            None => {
                log::debug!("logic component of {} was removed during its update", entity);
                return status;
            }
        };
        let mut behaviour = match behaviour {
            Some(behaviour) => behaviour,
            None => continue,
        };
        let mut context = BehaviourContext {
            owner: entity,
            handle,
            manager: &mut *manager,
            removals: &mut removals,
        };
        behaviour.update(dt, &mut context);
        if let Some(logic) = manager.get_component_mut::<GameLogicComponent>(entity) {
            logic.check_in(handle, behaviour);
        }
    }
    if let Some(logic) = manager.get_component_mut::<GameLogicComponent>(entity) {
        logic.removals.extend(removals);
    }
    status
}
