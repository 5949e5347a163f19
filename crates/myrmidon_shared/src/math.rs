//! # Game Math
//!
//! Vectors, angle helpers and interpolation used by entity routines.
//!
//! Angles are in degrees throughout. The y axis grows downwards, as on
//! screen, so a positive rotation turns clockwise visually.

use serde::{Deserialize, Serialize};

/// 2D Vector - positions, offsets, velocities
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Converts to a tuple
    #[must_use]
    pub const fn to_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Dot product
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Distance squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Component-wise multiplication
    #[inline]
    #[must_use]
    pub fn scale_by(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Vec2> for (f64, f64) {
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

// =============================================================================
// DISTANCE & MOVEMENT
// =============================================================================

/// Euclidean distance between two points.
#[inline]
#[must_use]
pub fn get_distance(a: Vec2, b: Vec2) -> f64 {
    a.distance(b)
}

/// Returns the point `distance` units away from `position` along `angle`.
#[must_use]
pub fn move_forward(position: Vec2, distance: f64, angle: f64) -> Vec2 {
    let rad = angle.to_radians();
    Vec2::new(
        position.x + distance * rad.cos(),
        position.y + distance * rad.sin(),
    )
}

// =============================================================================
// ANGLES
// =============================================================================

/// Angle in degrees of the line from `start` to `end`, in `[0, 360)`.
#[must_use]
pub fn angle_between_points(start: Vec2, end: Vec2) -> f64 {
    normalise_angle((end.y - start.y).atan2(end.x - start.x).to_degrees())
}

/// Equivalent angle in `[0, 360)`.
#[inline]
#[must_use]
pub fn normalise_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed turn needed to get from `start` to `end`, in `[-180, 180]`.
///
/// The sign gives the direction of the shortest turn.
#[must_use]
pub fn angle_difference(start: f64, end: f64) -> f64 {
    let mut difference = normalise_angle(end) - normalise_angle(start);
    if difference > 180.0 {
        difference -= 360.0;
    }
    if difference < -180.0 {
        difference += 360.0;
    }
    difference
}

/// Moves `current` towards `target` by at most `increment` degrees.
///
/// # Arguments
/// * `current` - Angle to rotate from
/// * `target` - Angle to rotate towards
/// * `increment` - Step size, always positive; the shortest direction is taken
/// * `leeway` - Accepted distance from the target. Within it, `current`
///   is returned unchanged.
///
/// # Returns
/// The new angle. Both inputs are normalised first, so the result is
/// relative to the normalised `current`.
#[must_use]
pub fn near_angle(current: f64, target: f64, increment: f64, leeway: f64) -> f64 {
    let current = normalise_angle(current);
    let target = normalise_angle(target);
    let difference = angle_difference(current, target);

    if difference.abs() <= leeway {
        current
    } else if difference.abs() < increment {
        target
    } else {
        current + increment * difference.signum()
    }
}

// =============================================================================
// INTERPOLATION
// =============================================================================

/// Linear interpolation between `start` and `end`.
#[inline]
#[must_use]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Smoothstep-eased interpolation between `start` and `end`.
///
/// Starts and ends slowly. Equal to [`lerp`] at `t` of 0, 0.5 and 1.
#[inline]
#[must_use]
pub fn slerp(start: f64, end: f64, t: f64) -> f64 {
    lerp(start, end, t * t * (3.0 - 2.0 * t))
}

/// Interpolation curve used by fades.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Constant speed
    #[default]
    Linear,
    /// Smoothstep easing
    Smooth,
}

impl Interpolation {
    /// Interpolates between `start` and `end` along this curve.
    #[inline]
    #[must_use]
    pub fn apply(self, start: f64, end: f64, t: f64) -> f64 {
        match self {
            Self::Linear => lerp(start, end, t),
            Self::Smooth => slerp(start, end, t),
        }
    }
}

// =============================================================================
// TIMER TICKS
// =============================================================================

/// Iterator yielding `(1, n), (2, n) … (n, n)`.
///
/// Drives effects that run for a fixed number of frames: dividing the
/// pair gives the progress through the effect.
#[derive(Clone, Debug)]
pub struct TimerTicks {
    current: u32,
    total: u32,
}

impl TimerTicks {
    /// Progress in `(0, 1]` for a yielded tick pair.
    #[must_use]
    pub fn progress((tick, total): (u32, u32)) -> f64 {
        if total == 0 {
            1.0
        } else {
            f64::from(tick) / f64::from(total)
        }
    }
}

impl Iterator for TimerTicks {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }
        self.current += 1;
        Some((self.current, self.total))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TimerTicks {}

/// Ticks over `total` frames.
#[must_use]
pub const fn timer_ticks(total: u32) -> TimerTicks {
    TimerTicks { current: 0, total }
}
