//! # MYRMIDON
//!
//! A 2D actor framework: game objects are entities whose behaviour is a
//! set of cooperative routines, stepped once per frame by a scheduler.
//!
//! ## Crates
//!
//! - `myrmidon_shared`: vectors, colours, angles, interpolation
//! - `myrmidon_core`: scheduler, entities, collision, overlay, backends
//!
//! ## Modules
//!
//! - `demos`: small games that run headless, used by the binaries

#![warn(missing_docs)]

pub mod demos;

pub use myrmidon_core;
pub use myrmidon_shared;

/// Everything needed to write and run entities.
pub mod prelude {
    pub use myrmidon_core::prelude::*;
    pub use myrmidon_shared::{
        angle_between_points, get_distance, move_forward, near_angle, timer_ticks,
    };
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
