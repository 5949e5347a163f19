//! # Framework Constants
//!
//! Defaults shared by configuration, the scheduler and the backends.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Frames per second the main loop paces to unless configured otherwise
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Window size used when none is configured
pub const DEFAULT_RESOLUTION: (u32, u32) = (1024, 768);

/// Smallest window the framework will open
pub const LOWEST_RESOLUTION: (u32, u32) = (640, 480);

/// Entity slots allocated at startup
pub const DEFAULT_MAX_ENTITIES: usize = 4096;

/// Name of the state every entity starts in
pub const EXECUTE_STATE: &str = "execute";

/// Anchor point used when positioning text and images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    /// Top left corner
    #[default]
    TopLeft,
    /// Middle of the top edge
    Top,
    /// Top right corner
    TopRight,
    /// Middle of the left edge
    CentreLeft,
    /// Centre
    Centre,
    /// Middle of the right edge
    CentreRight,
    /// Bottom left corner
    BottomLeft,
    /// Middle of the bottom edge
    Bottom,
    /// Bottom right corner
    BottomRight,
}

impl Alignment {
    /// Offset of the anchor from the top left corner of a box of `size`.
    #[must_use]
    pub fn anchor(self, size: Vec2) -> Vec2 {
        let fx = match self {
            Self::TopLeft | Self::CentreLeft | Self::BottomLeft => 0.0,
            Self::Top | Self::Centre | Self::Bottom => 0.5,
            Self::TopRight | Self::CentreRight | Self::BottomRight => 1.0,
        };
        let fy = match self {
            Self::TopLeft | Self::Top | Self::TopRight => 0.0,
            Self::CentreLeft | Self::Centre | Self::CentreRight => 0.5,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => 1.0,
        };
        Vec2::new(size.x * fx, size.y * fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_anchor() {
        let size = Vec2::new(100.0, 40.0);
        assert_eq!(Alignment::TopLeft.anchor(size), Vec2::ZERO);
        assert_eq!(Alignment::Centre.anchor(size), Vec2::new(50.0, 20.0));
        assert_eq!(Alignment::BottomRight.anchor(size), size);
    }
}
