//! Headless demo games.
//!
//! Each demo spawns its entities into a caller-supplied scheduler so the
//! binaries and the tests drive the same code.

pub mod bouncing_balls;
pub mod overlay_fade;
