//! Paint order kept by render backends.

use crate::entity::EntityId;

/// Entities sorted for drawing, highest depth first.
///
/// Re-sorted lazily: changes only mark the order dirty.
#[derive(Debug, Default)]
pub struct DepthOrder {
    entries: Vec<(EntityId, i32)>,
    ordered: Vec<EntityId>,
    dirty: bool,
}

impl DepthOrder {
    /// Empty order
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity at depth `z`.
    pub fn insert(&mut self, id: EntityId, z: i32) {
        self.entries.push((id, z));
        self.dirty = true;
    }

    /// Drops an entity.
    pub fn remove(&mut self, id: EntityId) {
        let before = self.entries.len();
        self.entries.retain(|&(e, _)| e != id);
        if self.entries.len() != before {
            self.dirty = true;
        }
    }

    /// Moves an entity to depth `z`.
    pub fn set_z(&mut self, id: EntityId, z: i32) {
        if let Some(entry) = self.entries.iter_mut().find(|(e, _)| *e == id) {
            if entry.1 != z {
                entry.1 = z;
                self.dirty = true;
            }
        }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw order. Equal depths keep registration order.
    pub fn ordered(&mut self) -> &[EntityId] {
        if self.dirty {
            self.entries.sort_by(|a, b| b.1.cmp(&a.1));
            self.ordered.clear();
            self.ordered.extend(self.entries.iter().map(|&(id, _)| id));
            self.dirty = false;
        }
        &self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_depth_first() {
        let a = EntityId::new(0, 1);
        let b = EntityId::new(1, 1);
        let c = EntityId::new(2, 1);
        let mut order = DepthOrder::new();
        order.insert(a, 0);
        order.insert(b, 10);
        order.insert(c, 0);
        assert_eq!(order.ordered(), &[b, a, c]);

        order.set_z(b, -5);
        assert_eq!(order.ordered(), &[a, c, b]);

        order.remove(a);
        assert_eq!(order.ordered(), &[c, b]);
        assert_eq!(order.len(), 2);
    }
}
