//! Collision queries between live entities.

use crate::collision::{collide, CollisionResult};
use crate::entity::EntityId;
use crate::scheduler::Scheduler;

impl Scheduler {
    /// Tests `id` against each of `others` in order and reports the first
    /// hit.
    ///
    /// Misses at once if `id` has collision turned off. Candidates that
    /// are `id` itself, destroyed, stale or have collision turned off are
    /// skipped.
    ///
    /// ```rust,ignore
    /// let hit = scheduler.collide_with(bullet, enemies.iter().copied());
    /// if let Some(enemy) = hit.entity {
    ///     scheduler.destroy(enemy, true)?;
    /// }
    /// ```
    pub fn collide_with(&mut self, id: EntityId, others: impl IntoIterator<Item = EntityId>) -> CollisionResult {
        let Some(own) = self
            .arena
            .get_mut(id)
            .filter(|entity| entity.collision().enabled)
            .map(|entity| entity.geometry())
        else {
            return CollisionResult::MISS;
        };
        self.collision_checked = true;

        for other in others {
            if other == id {
                continue;
            }
            let Some(entity) = self.arena.get_mut(other) else {
                continue;
            };
            if entity.is_destroyed() || !entity.collision().enabled {
                continue;
            }
            if collide(&own, &entity.geometry()) {
                return CollisionResult::hit(other);
            }
        }

        CollisionResult::MISS
    }

    /// Tests `id` against every live entity of `kind`, in step order.
    pub fn collide_with_kind(&mut self, id: EntityId, kind: &str) -> CollisionResult {
        let candidates = self.entities_of_kind(kind);
        self.collide_with(id, candidates)
    }

    /// True once any collision check has run this frame.
    #[must_use]
    pub const fn collision_checked(&self) -> bool {
        self.collision_checked
    }
}

#[cfg(test)]
mod tests {
    use myrmidon_shared::Vec2;

    use super::*;
    use crate::blueprint::RoutineBlueprint;
    use crate::collision::CollisionShape;

    fn place(scheduler: &mut Scheduler, kind: &'static str, shape: CollisionShape, at: Vec2) -> EntityId {
        scheduler
            .spawn(RoutineBlueprint::idle(kind).with_defaults(move |entity| {
                entity.set_collision(shape);
                entity.set_position(at);
            }))
            .unwrap()
    }

    #[test]
    fn test_first_hit_in_order() {
        let mut scheduler = Scheduler::headless();
        let probe = place(&mut scheduler, "probe", CollisionShape::circle(5.0), Vec2::ZERO);
        let far = place(&mut scheduler, "rock", CollisionShape::circle(5.0), Vec2::new(50.0, 0.0));
        let near = place(&mut scheduler, "rock", CollisionShape::circle(5.0), Vec2::new(6.0, 0.0));
        let touching = place(&mut scheduler, "rock", CollisionShape::circle(5.0), Vec2::new(10.0, 0.0));

        assert_eq!(
            scheduler.collide_with(probe, [far, touching, near]),
            CollisionResult::hit(touching)
        );
        assert_eq!(
            scheduler.collide_with(probe, [near, touching]),
            CollisionResult::hit(near)
        );
        assert_eq!(scheduler.collide_with(probe, [far]), CollisionResult::MISS);
        assert_eq!(scheduler.collide_with_kind(probe, "rock"), CollisionResult::hit(near));
        assert!(scheduler.collision_checked());
    }

    #[test]
    fn test_disabled_self_does_not_mark_check() {
        let mut scheduler = Scheduler::headless();
        let probe = place(&mut scheduler, "probe", CollisionShape::default(), Vec2::ZERO);
        let rock = place(&mut scheduler, "rock", CollisionShape::circle(5.0), Vec2::ZERO);

        assert_eq!(scheduler.collide_with(probe, [rock]), CollisionResult::MISS);
        assert!(!scheduler.collision_checked());
    }

    #[test]
    fn test_skips_self_disabled_and_destroyed() {
        let mut scheduler = Scheduler::headless();
        let probe = place(&mut scheduler, "probe", CollisionShape::rectangle(10.0, 10.0), Vec2::ZERO);
        let off = place(&mut scheduler, "off", CollisionShape::default(), Vec2::ZERO);
        let dead = place(&mut scheduler, "dead", CollisionShape::rectangle(10.0, 10.0), Vec2::ZERO);
        scheduler.destroy(dead, false).unwrap();

        assert_eq!(scheduler.collide_with(probe, [probe, off, dead]), CollisionResult::MISS);
    }

    #[test]
    fn test_geometry_cache_dropped_after_checked_frame() {
        let mut scheduler = Scheduler::headless();
        let a = place(&mut scheduler, "a", CollisionShape::circle(5.0), Vec2::ZERO);
        let b = place(&mut scheduler, "b", CollisionShape::circle(5.0), Vec2::new(8.0, 0.0));

        assert!(scheduler.collide_with(a, [b]).result);
        assert!(scheduler.entity(a).unwrap().geometry_cached());

        scheduler.run_frame().unwrap();
        assert!(!scheduler.entity(a).unwrap().geometry_cached());
        assert!(!scheduler.entity(b).unwrap().geometry_cached());
        assert!(!scheduler.collision_checked());
    }

    #[test]
    fn test_point_on_rectangle_edge_misses() {
        let mut scheduler = Scheduler::headless();
        // 10x10 rectangle centred on (5, 5) spans 0..10
        let wall = place(&mut scheduler, "wall", CollisionShape::rectangle(10.0, 10.0), Vec2::new(5.0, 5.0));
        let edge = place(&mut scheduler, "dot", CollisionShape::point(), Vec2::new(10.0, 5.0));
        let inside = place(&mut scheduler, "dot", CollisionShape::point(), Vec2::new(9.0, 5.0));

        assert!(!scheduler.collide_with(edge, [wall]).result);
        assert!(scheduler.collide_with(inside, [wall]).result);
    }
}
