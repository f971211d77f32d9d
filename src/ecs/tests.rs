#![cfg(test)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{Error, Status};

use super::*;

#[derive(Debug, PartialEq)]
struct Position(i32);

#[derive(Debug, PartialEq)]
struct Velocity(i32);

/// Manager where `Position` is ordinal 0, `Velocity` is 1 and transform is 2.
fn test_manager() -> EntityComponentManager {
    EntityComponentManager::builder()
        .component::<Position>()
        .component::<Velocity>()
        .with_initial_capacity(16)
        .build()
}

#[test]
fn test_default_ordinals() {
    let manager = EntityComponentManager::new();
    assert_eq!(manager.mask_of::<TransformComponent>(), Ok(0b001));
    assert_eq!(manager.mask_of::<GameLogicComponent>(), Ok(0b010));
    assert_eq!(manager.mask_of::<RenderComponent>(), Ok(0b100));
    assert_eq!(manager.systems().len(), 1);
}

#[test]
fn test_bitmask_scenario() {
    let mut manager = test_manager();
    let transform = manager.mask_of::<TransformComponent>().unwrap();
    assert_eq!(transform, 0b100);

    let entity = manager.create_entity().entity();
    assert_eq!(manager.components_mask(entity), transform);

    manager.add_component(entity, Position(1)).unwrap();
    assert_eq!(manager.components_mask(entity) & !transform, 1);

    manager.add_component(entity, Velocity(2)).unwrap();
    assert_eq!(manager.components_mask(entity) & !transform, 3);
    assert_eq!(manager.components_mask(entity), 0b111);

    manager.remove_component::<Position>(entity).unwrap();
    assert_eq!(manager.components_mask(entity) & !transform, 2);
    assert_eq!(manager.components_mask(entity), 0b110);
}

#[test]
fn test_add_remove_errors() {
    let mut manager = test_manager();
    let entity = manager.create_entity().entity();

    assert_eq!(
        manager.add_component(Entity::NULL, Position(0)),
        Err(Error::EntityAlreadyDeleted)
    );
    assert_eq!(
        manager.add_component(Entity::from_raw(100), Position(0)),
        Err(Error::NoSuchEntity)
    );
    assert!(matches!(
        manager.add_component(entity, 5u8),
        Err(Error::ComponentNotRegistered(_))
    ));

    manager.add_component(entity, Position(0)).unwrap();
    assert_eq!(
        manager.add_component(entity, Position(1)),
        Err(Error::ComponentAlreadyAdded)
    );
    assert_eq!(manager.get_component::<Position>(entity), Some(&Position(0)));

    assert_eq!(
        manager.remove_component::<Velocity>(entity),
        Err(Error::NoSuchElement)
    );
    assert_eq!(
        manager.remove_component::<Position>(Entity::NULL),
        Err(Error::EntityAlreadyDeleted)
    );
    assert_eq!(manager.remove_component::<TransformComponent>(entity), Ok(()));
    assert!(manager.has_component::<TransformComponent>(entity));
}

#[test]
fn test_bit_tracks_presence() {
    let mut manager = test_manager();
    let entity = manager.create_entity().entity();
    let bit = manager.mask_of::<Velocity>().unwrap();

    for step in 0..10 {
        if step % 3 == 2 {
            let _ = manager.remove_component::<Velocity>(entity);
        } else {
            let _ = manager.add_component(entity, Velocity(step));
        }
        let present = manager.get_component::<Velocity>(entity).is_some();
        assert_eq!(manager.components_mask(entity) & bit != 0, present);
    }
}

#[test]
fn test_remove_shrinks_store() {
    let mut manager = test_manager();
    let entities: Vec<_> = (0..5)
        .map(|value| {
            let mut handle = manager.create_entity();
            handle.add_component(Position(value)).unwrap();
            handle.entity()
        })
        .collect();
    assert_eq!(manager.component_store::<Position>().unwrap().len(), 5);

    manager.remove_component::<Position>(entities[1]).unwrap();
    assert_eq!(manager.component_store::<Position>().unwrap().len(), 4);
    assert!(!manager.component::<Position>(entities[1]).is_valid());

    // Others are still reachable after compaction.
    for (value, entity) in entities.iter().enumerate().filter(|(index, _)| *index != 1) {
        assert_eq!(
            manager.get_component::<Position>(*entity),
            Some(&Position(value as i32))
        );
    }
    let mut owners: Vec<_> = manager
        .component_iter::<Position>()
        .unwrap()
        .map(|(entity, _)| entity)
        .collect();
    owners.sort();
    assert_eq!(owners.len(), 4);
    assert!(!owners.contains(&entities[1]));
}

#[test]
fn test_query_idempotence() {
    let mut manager = test_manager();
    let entity = manager.create_entity().entity();
    manager.add_component(entity, Velocity(1)).unwrap();
    let mask = manager.components_mask(entity);
    let velocity = manager.mask_of::<Velocity>().unwrap();

    for _ in 0..5 {
        assert_eq!(manager.components_mask(entity), mask);
        assert!(manager.has_components(entity, velocity));
        assert!(!manager.has_components(entity, manager.mask_of::<Position>().unwrap()));
    }
    assert_eq!(manager.components_mask(Entity::NULL), 0);
    assert!(!manager.has_components(Entity::NULL, 0));
}

#[test]
fn test_deferred_deletion() {
    let mut manager = test_manager();
    let first = manager.create_entity().entity();
    let second = manager.create_entity().entity();
    manager.add_component(first, Position(1)).unwrap();
    manager.add_component(second, Position(2)).unwrap();

    manager.delete_entity(first).unwrap();
    assert!(manager.is_pending_deletion(first));
    assert_eq!(manager.deleted_uncleaned_entities(), &[first]);
    assert_eq!(manager.get_component::<Position>(first), Some(&Position(1)));
    assert_eq!(
        manager.add_component(first, Velocity(0)),
        Err(Error::EntityAlreadyDeleted)
    );

    manager.garbage_collect();
    assert!(!manager.contains_entity(first));
    assert!(!manager.is_pending_deletion(first));
    assert!(manager.deleted_uncleaned_entities().is_empty());
    assert_eq!(manager.components_mask(first), 0);
    assert_eq!(manager.get_component::<Position>(first), None);
    assert_eq!(manager.component_store::<Position>().unwrap(), &[Position(2)]);
    assert_eq!(
        manager.component_store::<TransformComponent>().unwrap().len(),
        1
    );
    assert_eq!(manager.get_component::<Position>(second), Some(&Position(2)));

    // Nothing queued: no-op.
    manager.garbage_collect();
    assert_eq!(manager.entity_count(), 1);

    // Identifiers are never reused.
    let third = manager.create_entity().entity();
    assert_eq!(third.id(), 3);
}

#[test]
fn test_delete_twice_through_manager() {
    let mut manager = test_manager();
    let entity = (0..37).map(|_| manager.create_entity().entity()).last().unwrap();
    assert_eq!(entity, Entity::from_raw(37));

    assert_eq!(manager.delete_entity(entity), Ok(()));
    assert_eq!(
        manager.delete_entity(entity),
        Err(Error::EntityAlreadyDeleted)
    );
    assert_eq!(
        manager.delete_entity(Entity::NULL),
        Err(Error::EntityAlreadyDeleted)
    );
    manager.garbage_collect();
    assert_eq!(manager.delete_entity(entity), Err(Error::NoSuchEntity));
}

#[test]
fn test_delete_twice_through_handle() {
    let mut manager = test_manager();
    for _ in 0..36 {
        manager.create_entity();
    }
    let mut handle = manager.create_entity();
    assert_eq!(handle.entity(), Entity::from_raw(37));

    assert_eq!(handle.destroy(), Ok(()));
    assert!(handle.is_destroyed());
    assert_eq!(handle, Entity::NULL);
    assert_eq!(handle.destroy(), Err(Error::NoSuchEntity));
    assert_eq!(
        handle.add_component(Position(0)),
        Err(Error::EntityAlreadyDeleted)
    );
    assert_eq!(
        handle.remove_component::<Position>(),
        Err(Error::EntityAlreadyDeleted)
    );
    assert!(!handle.component::<TransformComponent>().is_valid());
    assert!(manager.is_pending_deletion(Entity::from_raw(37)));
}

#[test]
fn test_entity_handle() {
    let mut manager = test_manager();
    let mut handle = manager.create_entity();
    handle.add_component(Position(3)).unwrap();
    let position = handle.manager().mask_of::<Position>().unwrap();
    assert!(handle.has_components(position));
    assert_eq!(handle.components_mask(), 0b101);

    handle.remove_component::<Position>().unwrap();
    assert!(!handle.has_components(position));

    let entity = Entity::from(handle);
    assert!(manager.entity(entity).is_some());
    assert!(manager.entity(Entity::from_raw(99)).is_none());
}

#[test]
fn test_component_handle() {
    let mut manager = test_manager();
    let first = manager.create_entity().entity();
    let second = manager.create_entity().entity();
    manager.add_component(first, Position(1)).unwrap();
    manager.add_component(second, Position(2)).unwrap();

    {
        let mut handle = manager.component::<Position>(second);
        assert!(handle.is_valid());
        assert_eq!(handle.owner(), second);
        handle.get_mut().unwrap().0 = 20;
    }
    // Compaction moves the second component, the handle still resolves it.
    manager.remove_component::<Position>(first).unwrap();
    let handle = manager.component::<Position>(second);
    assert_eq!(handle.get(), Some(&Position(20)));
    handle.destroy().unwrap();
    assert!(!manager.has_component::<Position>(second));

    let handle = manager.component::<Velocity>(first);
    assert!(!handle.is_valid());
    assert_eq!(handle.owner(), Entity::NULL);
    assert_eq!(handle.get(), None);

    let handle = manager.component::<TransformComponent>(first);
    assert_eq!(handle.destroy(), Ok(()));
    assert!(manager.has_component::<TransformComponent>(first));
}

/// Records what it sees and optionally deletes entities on its first update.
struct RecordingSystem {
    seen: Rc<RefCell<Vec<Vec<Entity>>>>,
    delete_on_update: Vec<Entity>,
}

impl System for RecordingSystem {
    fn required_components(&self, registry: &mut ComponentRegistry) -> ComponentMask {
        let position = registry.register::<Position>();
        let velocity = registry.register::<Velocity>();
        index_to_mask(position) | index_to_mask(velocity)
    }

    fn update_internal(
        &mut self,
        _: f64,
        entities: &[Entity],
        manager: &mut EntityComponentManager,
    ) -> Status {
        self.seen.borrow_mut().push(entities.to_vec());
        let mut status = Status::OK;
        for entity in self.delete_on_update.drain(..) {
            status |= Status::from(manager.delete_entity(entity));
        }
        status
    }
}

fn expected_tracked(manager: &EntityComponentManager, candidates: &[Entity]) -> Vec<Entity> {
    let required = manager.systems().required_mask(1).unwrap();
    candidates
        .iter()
        .copied()
        .filter(|entity| manager.has_components(*entity, required))
        .collect()
}

#[test]
fn test_tracked_set_convergence() {
    let mut manager = test_manager();
    let seen = Rc::new(RefCell::new(Vec::new()));
    manager.register_system(GameLogicSystem::new());
    let index = manager.register_system(RecordingSystem {
        seen: Rc::clone(&seen),
        delete_on_update: Vec::new(),
    });
    assert_eq!(index, 1);

    let entities: Vec<_> = (0..6).map(|_| manager.create_entity().entity()).collect();
    for (step, entity) in entities.iter().enumerate() {
        manager.add_component(*entity, Position(0)).unwrap();
        if step % 2 == 0 {
            manager.add_component(*entity, Velocity(0)).unwrap();
        }
    }
    manager.remove_component::<Position>(entities[4]).unwrap();
    manager.add_component(entities[1], Velocity(1)).unwrap();
    manager.delete_entity(entities[0]).unwrap();
    assert_eq!(manager.systems().pending_unregistrations(index).unwrap(), &[entities[0]]);

    let status = manager.update_systems(1.0);
    // The logic system never tracked the deleted entity.
    assert!(status.contains(Error::NoSuchEntity));
    assert_eq!(seen.borrow()[0], vec![entities[0], entities[1], entities[2]]);

    let tracked: Vec<_> = manager
        .systems()
        .tracked_entities(index)
        .unwrap()
        .iter()
        .copied()
        .collect();
    let alive: Vec<_> = entities[1..].to_vec();
    assert_eq!(tracked, expected_tracked(&manager, &alive));
    assert_eq!(tracked, vec![entities[1], entities[2]]);
}

#[test]
fn test_deletion_during_update() {
    let mut manager = test_manager();
    let entities: Vec<_> = (0..3)
        .map(|_| {
            let mut handle = manager.create_entity();
            handle.add_component(Position(0)).unwrap();
            handle.add_component(Velocity(0)).unwrap();
            handle.entity()
        })
        .collect();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let index = manager.register_system(RecordingSystem {
        seen: Rc::clone(&seen),
        delete_on_update: vec![entities[1]],
    });
    // Registered late: seeded from existing entities.
    assert_eq!(manager.systems().tracked_entities(index).unwrap().len(), 3);

    assert!(manager.update_systems(1.0).is_ok());
    assert!(manager.update_systems(1.0).is_ok());

    let seen = seen.borrow();
    assert_eq!(seen[0], entities);
    assert_eq!(seen[1], vec![entities[0], entities[2]]);
    assert!(manager.is_pending_deletion(entities[1]));
}

/// Deletes the given entities on its first update, whatever components they own.
struct DeletingSystem {
    targets: Vec<Entity>,
}

impl System for DeletingSystem {
    fn required_components(&self, _: &mut ComponentRegistry) -> ComponentMask {
        0
    }

    fn update_internal(
        &mut self,
        _: f64,
        _: &[Entity],
        manager: &mut EntityComponentManager,
    ) -> Status {
        self.targets
            .drain(..)
            .fold(Status::OK, |status, entity| {
                status | Status::from(manager.delete_entity(entity))
            })
    }
}

#[test]
fn test_swept_entity_is_forgotten() {
    let mut manager = EntityComponentManager::new();
    let calls = Rc::new(Cell::new(0));
    let mut logic = GameLogicComponent::new();
    logic.register_behaviour(Box::new(CountingBehaviour {
        calls: Rc::clone(&calls),
        remove_self: false,
    }));
    let entity = {
        let mut handle = manager.create_entity();
        handle.add_component(logic).unwrap();
        handle.entity()
    };
    // Runs after the game logic system, so that one has drained its queue already.
    let deleter = manager.register_system(DeletingSystem {
        targets: vec![entity],
    });
    assert_eq!(deleter, 1);

    assert!(manager.update_systems(1.0).is_ok());
    assert_eq!(calls.get(), 1);
    assert!(manager.systems().tracked_entities(0).unwrap().contains(&entity));

    manager.garbage_collect();
    assert!(!manager.contains_entity(entity));
    for index in 0..manager.systems().len() {
        assert!(!manager.systems().tracked_entities(index).unwrap().contains(&entity));
        assert!(manager.systems().pending_unregistrations(index).unwrap().is_empty());
    }

    assert!(manager.update_systems(1.0).is_ok());
    assert_eq!(calls.get(), 1);
}

struct CountingBehaviour {
    calls: Rc<Cell<u32>>,
    remove_self: bool,
}

impl GameBehaviour for CountingBehaviour {
    fn update(&mut self, _: f64, context: &mut BehaviourContext<'_>) {
        self.calls.set(self.calls.get() + 1);
        if self.remove_self {
            context.unregister_this();
        }
    }
}

#[test]
fn test_logic_scenario() {
    let mut manager = EntityComponentManager::new();
    let counters: Vec<_> = (0..5).map(|_| Rc::new(Cell::new(0))).collect();
    for (index, calls) in counters.iter().enumerate() {
        let mut logic = GameLogicComponent::new();
        logic.register_behaviour(Box::new(CountingBehaviour {
            calls: Rc::clone(calls),
            remove_self: index < 2,
        }));
        manager.create_entity().add_component(logic).unwrap();
    }

    assert!(manager.update_systems(0.5).is_ok());
    assert!(counters.iter().all(|calls| calls.get() == 1));

    assert!(manager.update_systems(0.5).is_ok());
    let calls: Vec<_> = counters.iter().map(|calls| calls.get()).collect();
    assert_eq!(calls, vec![1, 1, 2, 2, 2]);
}

struct DestroyingBehaviour;

impl GameBehaviour for DestroyingBehaviour {
    fn update(&mut self, _: f64, context: &mut BehaviourContext<'_>) {
        context.unregister_this();
        context.owning_entity().destroy().unwrap();
    }
}

#[test]
fn test_behaviour_destroys_entity() {
    let mut manager = EntityComponentManager::new();
    let mut logic = GameLogicComponent::new();
    logic.register_behaviour(Box::new(DestroyingBehaviour));
    let entity = {
        let mut handle = manager.create_entity();
        handle.add_component(logic).unwrap();
        handle.entity()
    };

    assert!(manager.update_systems(1.0).is_ok());
    assert!(manager.is_pending_deletion(entity));
    assert!(manager.systems().tracked_entities(0).unwrap().is_empty());

    manager.garbage_collect();
    assert!(!manager.contains_entity(entity));
    assert!(manager
        .component_store::<GameLogicComponent>()
        .unwrap()
        .is_empty());
    assert!(manager.update_systems(1.0).is_ok());
}

struct SpawningBehaviour {
    spawned: Rc<Cell<Option<BehaviourHandle>>>,
}

impl GameBehaviour for SpawningBehaviour {
    fn update(&mut self, _: f64, context: &mut BehaviourContext<'_>) {
        if self.spawned.get().is_some() {
            return;
        }
        let owner = context.owner();
        let calls = Rc::new(Cell::new(0));
        let logic = context
            .manager()
            .get_component_mut::<GameLogicComponent>(owner)
            .unwrap();
        let handle = logic.register_behaviour(Box::new(CountingBehaviour {
            calls,
            remove_self: false,
        }));
        self.spawned.set(Some(handle));
    }
}

#[test]
fn test_handle_registered_during_update() {
    let mut manager = EntityComponentManager::new();
    let spawned = Rc::new(Cell::new(None));
    let mut logic = GameLogicComponent::new();
    let spawner = logic.register_behaviour(Box::new(SpawningBehaviour {
        spawned: Rc::clone(&spawned),
    }));
    let entity = {
        let mut handle = manager.create_entity();
        handle.add_component(logic).unwrap();
        handle.entity()
    };

    assert!(manager.update_systems(1.0).is_ok());
    let spawned = spawned.get().unwrap();
    assert_ne!(spawned, spawner);

    manager
        .get_component_mut::<GameLogicComponent>(entity)
        .unwrap()
        .enqueue_behaviour_removal(spawned);
    assert!(manager.update_systems(1.0).is_ok());

    let logic = manager.get_component::<GameLogicComponent>(entity).unwrap();
    assert_eq!(logic.behaviour_count(), 1);
    assert!(logic.contains_behaviour(spawner));
    assert!(!logic.contains_behaviour(spawned));
}
