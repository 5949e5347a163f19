//! What a routine sees while it runs.

use std::any::Any;

use crate::blueprint::Blueprint;
use crate::collision::{CollisionKind, CollisionResult};
use crate::entity::{Entity, EntityId, EntityMut};
use crate::error::MyrmidonResult;
use crate::scheduler::{Scheduler, Signal, SignalTarget};
use crate::state::{Routine, StateArgs};

/// Handle passed to a routine for the duration of one step.
///
/// Everything acts on the stepping entity unless it takes an id. The full
/// scheduler is reachable through [`StepContext::scheduler`].
pub struct StepContext<'a> {
    scheduler: &'a mut Scheduler,
    id: EntityId,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(scheduler: &'a mut Scheduler, id: EntityId) -> Self {
        Self { scheduler, id }
    }

    /// The stepping entity
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// The whole scheduler
    pub fn scheduler(&mut self) -> &mut Scheduler {
        &mut *self.scheduler
    }

    /// Read access to the stepping entity.
    ///
    /// # Errors
    /// `StaleEntity` if it was purged, which cannot happen mid-frame.
    pub fn entity(&self) -> MyrmidonResult<&Entity> {
        self.scheduler.entity(self.id)
    }

    /// Write access to the stepping entity.
    ///
    /// # Errors
    /// As [`StepContext::entity`].
    pub fn entity_mut(&mut self) -> MyrmidonResult<EntityMut<'_>> {
        self.scheduler.entity_mut(self.id)
    }

    /// Read access to any entity
    ///
    /// # Errors
    /// `StaleEntity` for purged handles.
    pub fn get(&self, id: EntityId) -> MyrmidonResult<&Entity> {
        self.scheduler.entity(id)
    }

    /// Write access to any entity
    ///
    /// # Errors
    /// `StaleEntity` for purged handles.
    pub fn get_mut(&mut self, id: EntityId) -> MyrmidonResult<EntityMut<'_>> {
        self.scheduler.entity_mut(id)
    }

    /// User data of the stepping entity, if it is a `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.scheduler.arena.get(self.id)?.data()
    }

    /// Mutable user data of the stepping entity, if it is a `T`.
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.scheduler.arena.get_mut(self.id)?.data_mut()
    }

    /// Spawns a child of the stepping entity.
    ///
    /// # Errors
    /// As [`Scheduler::spawn`].
    pub fn spawn(&mut self, blueprint: impl Blueprint) -> MyrmidonResult<EntityId> {
        self.scheduler.spawn(blueprint)
    }

    /// Spawns a child with arguments for its `execute` state.
    ///
    /// # Errors
    /// As [`Scheduler::spawn`].
    pub fn spawn_with(&mut self, blueprint: impl Blueprint, args: &StateArgs) -> MyrmidonResult<EntityId> {
        self.scheduler.spawn_with(blueprint, args)
    }

    /// Destroys the stepping entity, and its descendants if `tree`.
    ///
    /// The running step still finishes; the entity stops stepping and
    /// disappears at the end of the frame.
    ///
    /// # Errors
    /// Whatever an `on_exit` callback returns.
    pub fn destroy_self(&mut self, tree: bool) -> MyrmidonResult<()> {
        self.scheduler.destroy(self.id, tree)
    }

    /// Sends a signal.
    ///
    /// # Errors
    /// As [`Scheduler::signal`].
    pub fn signal<'t>(&mut self, target: impl Into<SignalTarget<'t>>, signal: Signal, tree: bool) -> MyrmidonResult<()> {
        self.scheduler.signal(target, signal, tree)
    }

    /// Registers a state on the stepping entity and builds its routine
    /// from `args`, without switching to it.
    ///
    /// # Errors
    /// As [`Scheduler::add_state`].
    pub fn add_state(
        &mut self,
        name: &str,
        factory: impl Fn(&StateArgs) -> Box<dyn Routine> + 'static,
        args: &StateArgs,
    ) -> MyrmidonResult<()> {
        self.scheduler.add_state(self.id, name, factory, args)
    }

    /// Restarts the named state from its beginning and makes it current.
    ///
    /// # Errors
    /// As [`Scheduler::switch_state`].
    pub fn switch_state(&mut self, name: &str, args: &StateArgs) -> MyrmidonResult<()> {
        self.scheduler.switch_state(self.id, name, args)
    }

    /// Makes the named state current without restarting it.
    ///
    /// # Errors
    /// As [`Scheduler::resume_state`].
    pub fn resume_state(&mut self, name: &str) -> MyrmidonResult<()> {
        self.scheduler.resume_state(self.id, name)
    }

    /// Returns to the previous state without restarting it.
    ///
    /// # Errors
    /// As [`Scheduler::resume_previous_state`].
    pub fn resume_previous_state(&mut self) -> MyrmidonResult<()> {
        self.scheduler.resume_previous_state(self.id)
    }

    /// Restarts the previous state.
    ///
    /// # Errors
    /// As [`Scheduler::switch_previous_state`].
    pub fn switch_previous_state(&mut self, args: &StateArgs) -> MyrmidonResult<()> {
        self.scheduler.switch_previous_state(self.id, args)
    }

    /// First of `others` the stepping entity collides with.
    pub fn collide_with(&mut self, others: impl IntoIterator<Item = EntityId>) -> CollisionResult {
        self.scheduler.collide_with(self.id, others)
    }

    /// First live entity of `kind` the stepping entity collides with.
    pub fn collide_with_kind(&mut self, kind: &str) -> CollisionResult {
        self.scheduler.collide_with_kind(self.id, kind)
    }

    /// Collision kind of the stepping entity
    ///
    /// # Errors
    /// As [`StepContext::entity`].
    pub fn collision_kind(&self) -> MyrmidonResult<CollisionKind> {
        Ok(self.entity()?.collision().kind)
    }
}
