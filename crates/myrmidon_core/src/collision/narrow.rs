//! Pairwise tests, one per unordered pair of primitives.

use myrmidon_shared::{point_in_rectangle, project, Vec2};

use super::geometry::{Circle, CollisionGeometry, OrientedRect};

/// Dispatches to the test for this pair of primitives.
#[must_use]
pub fn collide(a: &CollisionGeometry, b: &CollisionGeometry) -> bool {
    use CollisionGeometry as G;
    match (a, b) {
        (G::Rectangle(a), G::Rectangle(b)) => rectangle_to_rectangle(a, b),
        (G::Point(p), G::Rectangle(r)) | (G::Rectangle(r), G::Point(p)) => point_to_rectangle(*p, r),
        (G::Circle(c), G::Rectangle(r)) | (G::Rectangle(r), G::Circle(c)) => circle_to_rectangle(c, r),
        (G::Circle(a), G::Circle(b)) => circle_to_circle(a, b),
        (G::Point(p), G::Circle(c)) | (G::Circle(c), G::Point(p)) => point_to_circle(*p, c),
        (G::Point(a), G::Point(b)) => point_to_point(*a, *b),
    }
}

/// Separating axis test over the two edge directions of each rectangle.
///
/// Intervals that only touch count as overlapping.
#[must_use]
pub fn rectangle_to_rectangle(a: &OrientedRect, b: &OrientedRect) -> bool {
    let axes = [
        a.corners[1] - a.corners[0],
        a.corners[3] - a.corners[0],
        b.corners[1] - b.corners[0],
        b.corners[3] - b.corners[0],
    ];

    axes.iter()
        .all(|&axis| project(&a.corners, axis).overlaps(project(&b.corners, axis)))
}

/// Strict containment of a point in a rotated rectangle.
#[must_use]
pub fn point_to_rectangle(point: Vec2, rect: &OrientedRect) -> bool {
    let (top_left, bottom_right) = rect.local_bounds();
    point_in_rectangle(rect.to_local(point), top_left, bottom_right)
}

/// Circle against a rotated rectangle.
#[must_use]
pub fn circle_to_rectangle(circle: &Circle, rect: &OrientedRect) -> bool {
    let half = rect.size * 0.5;
    let centre = rect.local_min + half;
    let local = rect.to_local(circle.centre);
    let distance = Vec2::new((local.x - centre.x).abs(), (local.y - centre.y).abs());

    if distance.x > half.x + circle.radius || distance.y > half.y + circle.radius {
        return false;
    }
    if distance.x <= half.x || distance.y <= half.y {
        return true;
    }

    let corner = Vec2::new(distance.x - half.x, distance.y - half.y);
    corner.length_squared() <= circle.radius * circle.radius
}

/// Touching circles collide.
#[must_use]
pub fn circle_to_circle(a: &Circle, b: &Circle) -> bool {
    a.centre.distance(b.centre) <= a.radius + b.radius
}

/// Points on the circumference collide.
#[must_use]
pub fn point_to_circle(point: Vec2, circle: &Circle) -> bool {
    point.distance(circle.centre) <= circle.radius
}

/// Exact equality.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn point_to_point(a: Vec2, b: Vec2) -> bool {
    a.x == b.x && a.y == b.y
}
