//! # Myrmidon Core
//!
//! Single-threaded actor scheduler for 2D games:
//! - Entities are cooperative routines advanced one step per frame
//! - Entities spawned from inside another's step become its children
//! - Narrow-phase collision between rectangles, circles and points
//!
//! ## Architecture Rules
//!
//! 1. **One thread of control** - nothing preempts a running step
//! 2. **Logic before drawing** - every step of a frame runs before render
//! 3. **Deferred destruction** - destroyed entities leave the live list
//!    only at the end of the frame
//!
//! ## Example
//!
//! ```rust,ignore
//! use myrmidon_core::prelude::*;
//!
//! let mut scheduler = Scheduler::headless();
//! scheduler.spawn(RoutineBlueprint::new("ticker", |_| {
//!     let mut frames = 0;
//!     routine(move |_ctx| {
//!         frames += 1;
//!         Ok(if frames < 60 { Step::Continue } else { Step::finish() })
//!     })
//! }))?;
//! scheduler.run_frames(60)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod blueprint;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod overlay;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use backend::{BackendKind, BackendRegistry, Backends};
pub use blueprint::{Blueprint, RoutineBlueprint};
pub use collision::{CollisionKind, CollisionResult, CollisionShape};
pub use config::{BackendSelection, GameConfig};
pub use entity::{Entity, EntityId, EntityMut};
pub use error::{MyrmidonError, MyrmidonResult};
pub use overlay::{OverlayCallback, OverlaySpec};
pub use scheduler::{Scheduler, Signal, SignalTarget, StepContext};
pub use state::{routine, ArgValue, Idle, Routine, StateArgs, Step};
pub use stats::{FrameStats, FrameStatsAccumulator};

/// Everything a game needs to define and run entities.
pub mod prelude {
    pub use crate::backend::{Canvas, Image, KeyCode, MouseState, TextSpec};
    pub use crate::blueprint::{Blueprint, RoutineBlueprint};
    pub use crate::collision::{CollisionKind, CollisionResult, CollisionShape};
    pub use crate::config::GameConfig;
    pub use crate::entity::{Entity, EntityId};
    pub use crate::error::{MyrmidonError, MyrmidonResult};
    pub use crate::overlay::OverlaySpec;
    pub use crate::scheduler::{Scheduler, Signal, StepContext};
    pub use crate::state::{routine, Idle, Routine, StateArgs, Step};
    pub use crate::state_args;
    pub use myrmidon_shared::{Colour, Interpolation, Rgba, Vec2};
}
