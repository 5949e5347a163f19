//! # Entity Handles
//!
//! Handles are plain copyable identifiers consisting of:
//! - An index into the entity arena
//! - A generation counter that detects use after destruction

use std::fmt;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the arena
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// A handle kept after its entity was purged never aliases the entity
/// that later reuses the slot; lookups with it fail with `StaleEntity`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - Slot in the arena
    /// * `generation` - How many times the slot has been handed out
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Raw packed value, stable for the lifetime of the entity.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(NULL)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_packing() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
    }

    #[test]
    fn test_entity_id_null() {
        assert!(EntityId::NULL.is_null());
        assert!(!EntityId::new(0, 0).is_null());
        assert_eq!(EntityId::default(), EntityId::NULL);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", EntityId::new(3, 1)), "EntityId(3v1)");
        assert_eq!(format!("{:?}", EntityId::NULL), "EntityId(NULL)");
    }
}
