//! # Entities
//!
//! An entity is the unit of simulation: a transform, visuals, a set of
//! named cooperative states, links into the ownership tree and a
//! collision shape.
//!
//! Entities live in a fixed-capacity [`EntityArena`] owned by the
//! scheduler and are referred to by copyable [`EntityId`] handles.

mod arena;
mod data;
mod handle;
mod id;

pub use arena::EntityArena;
pub use data::{ClipRect, Entity, TreeLinks};
pub use handle::EntityMut;
pub use id::EntityId;
