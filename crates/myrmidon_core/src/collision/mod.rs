//! # Collision Engine
//!
//! Narrow-phase tests between rectangles, circles and points.
//!
//! Each entity declares a [`CollisionShape`]. When first tested in a frame
//! its world-space [`CollisionGeometry`] is derived from the transform and
//! cached; the scheduler drops every cache once at the end of any frame in
//! which a collision check ran.
//!
//! ## Boundaries
//!
//! - rectangle↔rectangle: touching edges collide
//! - point↔rectangle: points on an edge do not collide
//! - circle↔circle and point↔circle: touching collides

mod geometry;
mod narrow;

pub use geometry::{Circle, CollisionGeometry, OrientedRect};
pub use narrow::{
    circle_to_circle, circle_to_rectangle, collide, point_to_circle, point_to_point,
    point_to_rectangle, rectangle_to_rectangle,
};

use myrmidon_shared::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Which primitive an entity collides as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Rotated rectangle
    #[default]
    Rectangle,
    /// Circle
    Circle,
    /// Single point
    Point,
}

/// Per-entity collision configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionShape {
    /// Collision checks against this entity are skipped when off
    pub enabled: bool,
    /// Primitive used in tests
    pub kind: CollisionKind,
    /// Rectangle width before scaling; image width when unset
    pub rectangle_width: Option<f64>,
    /// Rectangle height before scaling; image height when unset
    pub rectangle_height: Option<f64>,
    /// Circle radius before scaling; half the image width when unset
    pub circle_radius: Option<f64>,
    /// Offset from the entity position, rotated with the entity
    pub offset: Vec2,
}

impl CollisionShape {
    /// Enabled rectangle of the given unscaled size.
    #[must_use]
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            enabled: true,
            kind: CollisionKind::Rectangle,
            rectangle_width: Some(width),
            rectangle_height: Some(height),
            ..Self::default()
        }
    }

    /// Enabled circle of the given unscaled radius.
    #[must_use]
    pub fn circle(radius: f64) -> Self {
        Self {
            enabled: true,
            kind: CollisionKind::Circle,
            circle_radius: Some(radius),
            ..Self::default()
        }
    }

    /// Enabled point.
    #[must_use]
    pub fn point() -> Self {
        Self {
            enabled: true,
            kind: CollisionKind::Point,
            ..Self::default()
        }
    }

    /// Same shape moved by `offset`.
    #[must_use]
    pub fn with_offset(self, offset: Vec2) -> Self {
        Self { offset, ..self }
    }
}

/// Outcome of [`collide_with`](crate::scheduler::Scheduler::collide_with).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// True if any candidate was hit
    pub result: bool,
    /// The first candidate hit, in iteration order
    pub entity: Option<EntityId>,
}

impl CollisionResult {
    /// No hit
    pub const MISS: Self = Self {
        result: false,
        entity: None,
    };

    /// Hit on `entity`
    #[must_use]
    pub const fn hit(entity: EntityId) -> Self {
        Self {
            result: true,
            entity: Some(entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape_is_disabled_rectangle() {
        let shape = CollisionShape::default();
        assert!(!shape.enabled);
        assert_eq!(shape.kind, CollisionKind::Rectangle);
        assert_eq!(shape.offset, Vec2::ZERO);
    }

    #[test]
    fn test_shape_constructors() {
        let c = CollisionShape::circle(4.0).with_offset(Vec2::new(1.0, 0.0));
        assert!(c.enabled);
        assert_eq!(c.kind, CollisionKind::Circle);
        assert_eq!(c.circle_radius, Some(4.0));
        assert_eq!(c.offset, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_collision_result() {
        let id = EntityId::new(2, 1);
        assert!(!CollisionResult::MISS.result);
        assert_eq!(CollisionResult::hit(id).entity, Some(id));
    }
}
