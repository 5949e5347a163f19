//! Colour types. Channels run from 0 to 1.

use serde::{Deserialize, Serialize};

use crate::math::lerp;

/// RGB colour tint
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
}

impl Colour {
    /// Creates a new colour
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// White, the untinted default
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Adds an alpha channel
    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

/// RGBA colour, used where transparency is animated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
    /// Alpha
    pub a: f64,
}

impl Rgba {
    /// Creates a new colour
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Drops the alpha channel
    #[must_use]
    pub const fn rgb(self) -> Colour {
        Colour::new(self.r, self.g, self.b)
    }

    /// Interpolates every channel with `f`.
    #[must_use]
    pub fn blend_with(self, to: Self, t: f64, f: impl Fn(f64, f64, f64) -> f64) -> Self {
        Self::new(
            f(self.r, to.r, t),
            f(self.g, to.g, t),
            f(self.b, to.b, t),
            f(self.a, to.a, t),
        )
    }

    /// Linear interpolation of every channel.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        self.blend_with(to, t, lerp)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_white() {
        assert_eq!(Colour::default(), Colour::WHITE);
        assert_eq!(Rgba::default(), Rgba::WHITE);
    }

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::TRANSPARENT.lerp(Rgba::BLACK, 0.5);
        assert_eq!(mid, Rgba::new(0.0, 0.0, 0.0, 0.5));
        assert_eq!(Colour::BLACK.with_alpha(0.25).rgb(), Colour::BLACK);
    }
}
