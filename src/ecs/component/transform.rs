//! Parent-relative transform of an entity.
//!
//! Hierarchy links are entity identifiers, never references into the storage:
//! storages compact on removal, so every link is resolved through the manager.

use ultraviolet::Vec3;

use crate::error::{Error, Result};

use super::super::{Entity, EntityComponentManager};

/// Position and scale of an entity relative to its parent.
///
/// Every entity has exactly one transform from creation until it is swept.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    parent: Option<Entity>,
    children: Vec<Entity>,
    local_position: Vec3,
    local_scale: Vec3,
}

impl TransformComponent {
    /// Creates transform at the origin with unit scale and no parent.
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local_position: Vec3::zero(),
            local_scale: Vec3::one(),
        }
    }

    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    pub fn set_local_position(&mut self, position: Vec3) {
        self.local_position = position;
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local_scale = scale;
    }

    /// Moves the transform relative to its current local position.
    pub fn translate_local(&mut self, translation: Vec3) {
        self.local_position += translation;
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Child at the given position, [`None`] if out of range.
    pub fn child(&self, index: usize) -> Option<Entity> {
        self.children.get(index).copied()
    }

    /// Position of the given entity among the children of this transform.
    pub fn child_index(&self, child: Entity) -> Option<usize> {
        self.children.iter().position(|entity| *entity == child)
    }

    /// Returns `true` if the given entity is the direct parent.
    pub fn is_child_of(&self, parent: Entity) -> bool {
        self.parent == Some(parent)
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent of the entity, skipping parents which were already swept.
fn live_parent(manager: &EntityComponentManager, entity: Entity) -> Option<Entity> {
    let transform = manager.get_component::<TransformComponent>(entity)?;
    transform
        .parent
        .filter(|parent| manager.has_component::<TransformComponent>(*parent))
}

/// Makes `parent` the parent of `child`, or makes `child` a root if `parent` is [`None`].
///
/// Local position of the child is kept as is.
///
/// # Errors
///
/// [`Error::NoSuchEntity`] if either entity has no transform,
/// [`Error::InvalidParent`] if `parent` is `child` itself or one of its descendants.
///
pub fn set_parent(
    manager: &mut EntityComponentManager,
    child: Entity,
    parent: Option<Entity>,
) -> Result<()> {
    if !manager.has_component::<TransformComponent>(child) {
        return Err(Error::NoSuchEntity);
    }
    if let Some(parent) = parent {
        if !manager.has_component::<TransformComponent>(parent) {
            return Err(Error::NoSuchEntity);
        }
        let mut ancestor = Some(parent);
        while let Some(entity) = ancestor {
            if entity == child {
                return Err(Error::InvalidParent);
            }
            ancestor = live_parent(manager, entity);
        }
    }

    let old_parent = manager
        .get_component_mut::<TransformComponent>(child)
        .and_then(|transform| std::mem::replace(&mut transform.parent, parent));
    if let Some(old_parent) = old_parent {
        if let Some(transform) = manager.get_component_mut::<TransformComponent>(old_parent) {
            transform.children.retain(|entity| *entity != child);
        }
    }
    if let Some(parent) = parent {
        if let Some(transform) = manager.get_component_mut::<TransformComponent>(parent) {
            transform.children.push(child);
        }
    }
    log::trace!("parent of {} set to {:?}", child, parent);
    Ok(())
}

/// Makes every child of the entity a root.
pub fn detach_children(manager: &mut EntityComponentManager, entity: Entity) -> Result<()> {
    let children = manager
        .get_component_mut::<TransformComponent>(entity)
        .map(|transform| std::mem::take(&mut transform.children))
        .ok_or(Error::NoSuchEntity)?;
    for child in children {
        if let Some(transform) = manager.get_component_mut::<TransformComponent>(child) {
            transform.parent = None;
        }
    }
    Ok(())
}

/// Position of the entity among the children of its parent.
///
/// [`None`] if the entity is a root.
///
pub fn sibling_index(manager: &EntityComponentManager, entity: Entity) -> Option<usize> {
    let parent = live_parent(manager, entity)?;
    manager
        .get_component::<TransformComponent>(parent)?
        .child_index(entity)
}

/// Position of the entity in world space.
///
/// Returns [`None`] if the entity has no transform.
///
pub fn world_position(manager: &EntityComponentManager, entity: Entity) -> Option<Vec3> {
    let mut position = manager
        .get_component::<TransformComponent>(entity)?
        .local_position;
    let mut ancestor = live_parent(manager, entity);
    while let Some(parent) = ancestor {
        if let Some(transform) = manager.get_component::<TransformComponent>(parent) {
            position += transform.local_position;
        }
        ancestor = live_parent(manager, parent);
    }
    Some(position)
}

/// Moves the entity so that its world space position becomes `position`.
pub fn set_world_position(
    manager: &mut EntityComponentManager,
    entity: Entity,
    position: Vec3,
) -> Result<()> {
    let parent_position = live_parent(manager, entity)
        .and_then(|parent| world_position(manager, parent))
        .unwrap_or_else(Vec3::zero);
    let transform = manager
        .get_component_mut::<TransformComponent>(entity)
        .ok_or(Error::NoSuchEntity)?;
    transform.local_position = position - parent_position;
    Ok(())
}
