//! # MYRMIDON SHARED
//!
//! Pure value types and functions used across the framework.
//!
//! Nothing in this crate holds state: vectors, colours, angle helpers,
//! interpolation curves and the shape math the collision engine is
//! built on.

#![warn(missing_docs)]

pub mod colour;
pub mod constants;
pub mod math;
pub mod shape;

pub use colour::{Colour, Rgba};
pub use constants::*;
pub use math::{
    angle_between_points, angle_difference, get_distance, lerp, move_forward, near_angle,
    normalise_angle, slerp, timer_ticks, Interpolation, TimerTicks, Vec2,
};
pub use shape::{point_in_rectangle, project, rotate_point, rotate_point_about_point, Interval};
