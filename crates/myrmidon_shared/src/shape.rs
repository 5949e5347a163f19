//! # Shape Math
//!
//! Stateless helpers underneath the collision engine: point rotation,
//! strict point-in-rectangle containment and axis projection for the
//! separating axis test.

use crate::math::Vec2;

/// Rotates `point` about the origin by `angle` degrees.
#[inline]
#[must_use]
pub fn rotate_point(point: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.to_radians().sin_cos();
    Vec2::new(
        point.x * cos - point.y * sin,
        point.x * sin + point.y * cos,
    )
}

/// Rotates `point` about `pivot` by `angle` degrees.
#[inline]
#[must_use]
pub fn rotate_point_about_point(point: Vec2, angle: f64, pivot: Vec2) -> Vec2 {
    rotate_point(point - pivot, angle) + pivot
}

/// Strict containment test against an axis-aligned rectangle.
///
/// A point lying exactly on an edge is outside.
#[inline]
#[must_use]
pub fn point_in_rectangle(point: Vec2, top_left: Vec2, bottom_right: Vec2) -> bool {
    point.x > top_left.x
        && point.x < bottom_right.x
        && point.y > top_left.y
        && point.y < bottom_right.y
}

/// Closed interval of a shape projected onto an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    /// Smallest projection
    pub min: f64,
    /// Largest projection
    pub max: f64,
}

impl Interval {
    /// True if the two intervals share at least one point.
    ///
    /// Touching endpoints count as overlap.
    #[inline]
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Projects every point onto `axis` and returns the covered interval.
///
/// The axis does not need to be normalised; both shapes compared on one
/// axis just need the same one.
#[must_use]
pub fn project(points: &[Vec2], axis: Vec2) -> Interval {
    points.iter().fold(
        Interval {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        },
        |acc, p| {
            let d = p.dot(axis);
            Interval {
                min: acc.min.min(d),
                max: acc.max.max(d),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_rotate_point() {
        let p = rotate_point(Vec2::new(2.0, 3.0), 10.0);
        assert!(close(p, Vec2::new(1.449, 3.302)));
    }

    #[test]
    fn test_rotate_point_about_point() {
        let p = rotate_point_about_point(Vec2::new(2.0, 3.0), 10.0, Vec2::new(6.0, 7.0));
        assert!(close(p, Vec2::new(2.755, 2.366)));
    }

    #[test]
    fn test_full_turn_is_identity() {
        let p = rotate_point(Vec2::new(5.0, -2.0), 360.0);
        assert!(close(p, Vec2::new(5.0, -2.0)));
    }

    #[test]
    fn test_point_in_rectangle_is_strict() {
        let tl = Vec2::new(0.0, 0.0);
        let br = Vec2::new(10.0, 10.0);
        assert!(point_in_rectangle(Vec2::new(1.0, 1.0), tl, br));
        assert!(point_in_rectangle(Vec2::new(9.0, 9.0), tl, br));
        assert!(!point_in_rectangle(Vec2::new(0.0, 5.0), tl, br));
        assert!(!point_in_rectangle(Vec2::new(10.0, 5.0), tl, br));
        assert!(!point_in_rectangle(Vec2::new(5.0, 0.0), tl, br));
        assert!(!point_in_rectangle(Vec2::new(5.0, 10.0), tl, br));
    }

    #[test]
    fn test_project_and_overlap() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let iv = project(&square, Vec2::new(1.0, 0.0));
        assert_eq!(iv, Interval { min: 0.0, max: 2.0 });

        let touching = Interval { min: 2.0, max: 3.0 };
        assert!(iv.overlaps(touching));
        let apart = Interval { min: 2.5, max: 3.0 };
        assert!(!iv.overlaps(apart));
    }
}
