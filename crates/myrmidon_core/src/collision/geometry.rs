//! World-space collision geometry derived from an entity's transform.

use myrmidon_shared::{rotate_point, Vec2};

use super::CollisionKind;
use crate::entity::Entity;

/// Rectangle rotated about a pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    /// Point the rectangle rotates about (the entity position)
    pub pivot: Vec2,
    /// Rotation in degrees
    pub rotation: f64,
    /// Unrotated top left corner relative to the pivot
    pub local_min: Vec2,
    /// Scaled width and height
    pub size: Vec2,
    /// World corners: upper left, upper right, lower right, lower left
    pub corners: [Vec2; 4],
}

impl OrientedRect {
    /// Builds the rectangle and its world corners.
    #[must_use]
    pub fn new(pivot: Vec2, rotation: f64, local_min: Vec2, size: Vec2) -> Self {
        let local = [
            local_min,
            local_min + Vec2::new(size.x, 0.0),
            local_min + size,
            local_min + Vec2::new(0.0, size.y),
        ];
        let corners = local.map(|p| pivot + rotate_point(p, rotation));
        Self {
            pivot,
            rotation,
            local_min,
            size,
            corners,
        }
    }

    /// Axis-aligned rectangle with its top left at `top_left`.
    #[must_use]
    pub fn axis_aligned(top_left: Vec2, size: Vec2) -> Self {
        Self::new(top_left, 0.0, Vec2::ZERO, size)
    }

    /// Unrotated bounds relative to the pivot: (top left, bottom right).
    #[must_use]
    pub fn local_bounds(&self) -> (Vec2, Vec2) {
        (self.local_min, self.local_min + self.size)
    }

    /// Brings a world point into the rectangle's unrotated frame.
    #[must_use]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        rotate_point(point - self.pivot, -self.rotation)
    }
}

/// Circle in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Centre
    pub centre: Vec2,
    /// Scaled radius
    pub radius: f64,
}

/// Cached world-space shape of one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollisionGeometry {
    /// Rotated rectangle
    Rectangle(OrientedRect),
    /// Circle
    Circle(Circle),
    /// Point
    Point(Vec2),
}

impl CollisionGeometry {
    /// Derives geometry from the entity's current transform.
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        let shape = entity.collision();
        let position = entity.position();
        let rotation = entity.rotation();
        let scale = entity.scale();
        let image = entity.image();

        match shape.kind {
            CollisionKind::Rectangle => {
                let width = shape
                    .rectangle_width
                    .or_else(|| image.map(|i| f64::from(i.width)))
                    .unwrap_or(0.0);
                let height = shape
                    .rectangle_height
                    .or_else(|| image.map(|i| f64::from(i.height)))
                    .unwrap_or(0.0);
                let local_min = shape.offset - entity.centre_point() * scale;
                Self::Rectangle(OrientedRect::new(
                    position,
                    rotation,
                    local_min,
                    Vec2::new(width * scale, height * scale),
                ))
            }
            CollisionKind::Circle => {
                let radius = match (shape.circle_radius, image) {
                    (Some(r), _) => r * scale,
                    (None, Some(i)) => f64::from(i.width) * scale / 2.0,
                    (None, None) => 0.0,
                };
                Self::Circle(Circle {
                    centre: position + rotate_point(shape.offset, rotation),
                    radius,
                })
            }
            CollisionKind::Point => Self::Point(position + rotate_point(shape.offset, rotation)),
        }
    }

    /// Which primitive this is.
    #[must_use]
    pub const fn kind(&self) -> CollisionKind {
        match self {
            Self::Rectangle(_) => CollisionKind::Rectangle,
            Self::Circle(_) => CollisionKind::Circle,
            Self::Point(_) => CollisionKind::Point,
        }
    }
}
