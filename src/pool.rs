use serde::{Deserialize, Serialize};

use crate::store::{ALL_COMPONENTS, Entity, EntityKind, EntityStore, TRANSFORM};

/// Free-list of dormant entity handles kept alive for reuse.
///
/// Parked handles carry nothing but a Transform and are marked [`EntityKind::Pooled`].
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool {
    pub available: Vec<Entity>,
}

impl EntityPool {
    /// Strip every component except Transform and park the handle
    pub fn release(&mut self, store: &mut EntityStore, entity: Entity) -> bool {
        if !store.remove_components(entity, ALL_COMPONENTS & !TRANSFORM) {
            return false;
        }
        store.set_kind(entity, EntityKind::Pooled);
        self.available.push(entity);
        true
    }

    /// Pop the most recently parked handle that is still alive
    pub fn acquire(&mut self, store: &EntityStore) -> Option<Entity> {
        while let Some(entity) = self.available.pop() {
            if store.kind(entity) == Some(EntityKind::Pooled) {
                return Some(entity);
            }
            tracing::trace!(%entity, "dropping stale pooled handle");
        }
        None
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn clear(&mut self) {
        self.available.clear();
    }
}
