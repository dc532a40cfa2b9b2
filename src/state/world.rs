//! The world: every live entity, folded from the update stream.
//!
//! A [`World`] is cheap to query and cloneable; keyframes capture world
//! state by cloning it at interval boundaries.

use std::collections::HashMap;

use crate::message::{handle_to_index, EntityOp, EntityUpdateMessage, INVALID_HANDLE};
use crate::state::entity::Entity;

/// The set of live entities at some point in the stream.
#[derive(Debug, Clone, Default)]
pub struct World {
    entities: HashMap<u32, Entity>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        World::default()
    }

    /// Folds one entity update into the world.
    ///
    /// Updates addressed to an unknown index create a classless entity
    /// rather than failing; a recording sliced mid-stream can reference
    /// entities whose create fell before the slice.
    pub fn apply(&mut self, update: &EntityUpdateMessage) {
        match update.op {
            EntityOp::Created => {
                let class = update.class_name.as_deref().unwrap_or("");
                let mut entity = Entity::new(update.entity, class);
                for change in &update.changes {
                    entity.set(change.key.clone(), change.value.clone());
                }
                self.entities.insert(update.entity, entity);
            }
            EntityOp::Updated => {
                let entity = self
                    .entities
                    .entry(update.entity)
                    .or_insert_with(|| Entity::new(update.entity, ""));
                for change in &update.changes {
                    entity.set(change.key.clone(), change.value.clone());
                }
            }
            EntityOp::Deleted => {
                self.entities.remove(&update.entity);
            }
        }
    }

    /// Looks up an entity by index.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Entity> {
        self.entities.get(&index)
    }

    /// Looks up an entity through a handle, masking off the serial bits.
    ///
    /// Returns `None` for the invalid-handle sentinel.
    #[must_use]
    pub fn by_handle(&self, handle: u32) -> Option<&Entity> {
        if handle == INVALID_HANDLE {
            return None;
        }
        self.entities.get(&handle_to_index(handle))
    }

    /// Iterates all live entities in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterates entities whose class name starts with `prefix`.
    pub fn of_class<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .values()
            .filter(move |e| e.class_name().starts_with(prefix))
    }

    /// Finds the first entity with exactly the given class name.
    #[must_use]
    pub fn first_of_class(&self, class_name: &str) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.class_name() == class_name)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
