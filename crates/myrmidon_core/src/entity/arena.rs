//! # Entity Arena
//!
//! Fixed-capacity slot storage for entities. All slots are allocated when
//! the scheduler is created; spawning reuses a free slot and bumps its
//! generation so old handles stop resolving.

use crate::entity::{Entity, EntityId};
use crate::error::{MyrmidonError, MyrmidonResult};

struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Generational entity storage.
pub struct EntityArena {
    slots: Box<[Slot]>,
    free_indices: Vec<u32>,
    len: usize,
}

impl EntityArena {
    /// Creates an arena with `capacity` pre-allocated slots.
    ///
    /// Capacities beyond `u32::MAX` are clamped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                entity: None,
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        // Popped from the back, so low indices are handed out first
        #[allow(clippy::cast_possible_truncation)]
        let free_indices: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            free_indices,
            len: 0,
        }
    }

    /// Maximum number of entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reserves a slot for `entity` and returns its new handle.
    ///
    /// `build` receives the handle before the entity is stored, so the
    /// entity can record its own id.
    ///
    /// # Errors
    /// `EntityCapacity` when every slot is in use.
    pub fn insert_with(&mut self, build: impl FnOnce(EntityId) -> Entity) -> MyrmidonResult<EntityId> {
        let Some(index) = self.free_indices.pop() else {
            return Err(MyrmidonError::EntityCapacity {
                capacity: self.capacity(),
            });
        };

        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let id = EntityId::new(index, slot.generation);
        slot.entity = Some(build(id));
        self.len += 1;
        Ok(id)
    }

    /// Frees the slot behind `id`, returning the entity.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slot_mut(id)?;
        let entity = slot.entity.take()?;
        self.free_indices.push(id.index());
        self.len -= 1;
        Some(entity)
    }

    /// True if `id` resolves to a stored entity.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Looks up an entity.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entity.as_ref()
    }

    /// Looks up an entity mutably.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slot_mut(id)?.entity.as_mut()
    }

    /// Looks up an entity or fails with `StaleEntity`.
    ///
    /// # Errors
    /// `StaleEntity` if the handle does not resolve.
    #[inline]
    pub fn try_get(&self, id: EntityId) -> MyrmidonResult<&Entity> {
        self.get(id).ok_or(MyrmidonError::StaleEntity(id))
    }

    /// Mutable lookup or `StaleEntity`.
    ///
    /// # Errors
    /// `StaleEntity` if the handle does not resolve.
    #[inline]
    pub fn try_get_mut(&mut self, id: EntityId) -> MyrmidonResult<&mut Entity> {
        self.get_mut(id).ok_or(MyrmidonError::StaleEntity(id))
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get_mut(id.index() as usize)?;
        (slot.generation == id.generation()).then_some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::RoutineBlueprint;
    use std::rc::Rc;

    fn blank(id: EntityId) -> Entity {
        Entity::new(id, Rc::new(RoutineBlueprint::idle("blank")))
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = EntityArena::new(4);
        let id = arena.insert_with(blank).unwrap();
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(id).map(Entity::id), Some(id));
    }

    #[test]
    fn test_capacity_exhausted() {
        let mut arena = EntityArena::new(2);
        arena.insert_with(blank).unwrap();
        arena.insert_with(blank).unwrap();
        let err = arena.insert_with(blank).unwrap_err();
        assert!(matches!(err, MyrmidonError::EntityCapacity { capacity: 2 }));
    }

    #[test]
    fn test_reused_slot_rejects_stale_handle() {
        let mut arena = EntityArena::new(1);
        let first = arena.insert_with(blank).unwrap();
        assert!(arena.remove(first).is_some());
        let second = arena.insert_with(blank).unwrap();

        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(arena.get(first).is_none());
        assert!(matches!(arena.try_get(first), Err(MyrmidonError::StaleEntity(_))));
        assert!(arena.contains(second));
    }

    #[test]
    fn test_double_remove_is_harmless() {
        let mut arena = EntityArena::new(2);
        let id = arena.insert_with(blank).unwrap();
        assert!(arena.remove(id).is_some());
        assert!(arena.remove(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_null_never_resolves() {
        let arena = EntityArena::new(2);
        assert!(arena.get(EntityId::NULL).is_none());
    }
}
