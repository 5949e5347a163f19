//! State transitions.
//!
//! `switch_*` always builds a fresh routine; `resume_*` keeps a started
//! routine where it left off. Names that nothing can build become idle
//! states rather than errors.

use std::rc::Rc;

use myrmidon_shared::EXECUTE_STATE;
use tracing::{debug, warn};

use crate::entity::EntityId;
use crate::error::MyrmidonResult;
use crate::scheduler::Scheduler;
use crate::state::{Idle, Routine, StateArgs, StateFactory};

impl Scheduler {
    /// Registers a state and builds its routine from `args`. A running
    /// instance of the same name is replaced. The current state is kept.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn add_state(
        &mut self,
        id: EntityId,
        name: &str,
        factory: impl Fn(&StateArgs) -> Box<dyn Routine> + 'static,
        args: &StateArgs,
    ) -> MyrmidonResult<()> {
        let factory: StateFactory = Rc::new(factory);
        let routine = factory(args);
        self.arena
            .try_get_mut(id)?
            .states
            .install(name, Some(factory), routine);
        debug!(%id, state = name, "State added");
        Ok(())
    }

    /// Makes `name` current with a freshly built routine.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn switch_state(&mut self, id: EntityId, name: &str, args: &StateArgs) -> MyrmidonResult<()> {
        let routine = self.build_routine(id, name, args)?;
        let entity = self.arena.try_get_mut(id)?;
        entity.states.set_current(name);
        entity.states.install(name, None, routine);
        debug!(%id, state = name, previous = ?entity.previous_state(), "State switched");
        Ok(())
    }

    /// Makes `name` current, starting it without arguments only if it
    /// has no running routine.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn resume_state(&mut self, id: EntityId, name: &str) -> MyrmidonResult<()> {
        let entity = self.arena.try_get_mut(id)?;
        entity.states.set_current(name);
        debug!(%id, state = name, previous = ?entity.previous_state(), "State resumed");
        self.ensure_state(id, name);
        Ok(())
    }

    /// Resumes the previous state. Does nothing if there is none.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn resume_previous_state(&mut self, id: EntityId) -> MyrmidonResult<()> {
        match self.previous_state_name(id)? {
            Some(previous) => self.resume_state(id, &previous),
            None => Ok(()),
        }
    }

    /// Restarts the previous state. Does nothing if there is none.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn switch_previous_state(&mut self, id: EntityId, args: &StateArgs) -> MyrmidonResult<()> {
        match self.previous_state_name(id)? {
            Some(previous) => self.switch_state(id, &previous, args),
            None => Ok(()),
        }
    }

    /// Name of the running state.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn current_state(&self, id: EntityId) -> MyrmidonResult<&str> {
        Ok(self.arena.try_get(id)?.current_state())
    }

    fn previous_state_name(&self, id: EntityId) -> MyrmidonResult<Option<String>> {
        Ok(self.arena.try_get(id)?.previous_state().map(str::to_owned))
    }

    /// Starts `name` with no arguments if it is not running.
    pub(crate) fn ensure_state(&mut self, id: EntityId, name: &str) {
        let started = self
            .arena
            .get(id)
            .is_some_and(|entity| entity.states.is_started(name));
        if started {
            return;
        }
        if let Ok(routine) = self.build_routine(id, name, &StateArgs::new()) {
            if let Some(entity) = self.arena.get_mut(id) {
                entity.states.install(name, None, routine);
            }
        }
    }

    /// True if `name` is registered on the entity or its blueprint can
    /// build it.
    pub(crate) fn knows_state(&self, id: EntityId, name: &str) -> bool {
        let Some(entity) = self.arena.get(id) else {
            return false;
        };
        name == EXECUTE_STATE
            || entity.states.has_state(name)
            || entity.blueprint().has_state(name)
    }

    /// Registered factory first, then the blueprint, then idle.
    fn build_routine(&self, id: EntityId, name: &str, args: &StateArgs) -> MyrmidonResult<Box<dyn Routine>> {
        let entity = self.arena.try_get(id)?;
        if let Some(factory) = entity.states.factory(name) {
            return Ok(factory(args));
        }

        let blueprint = entity.blueprint();
        if name == EXECUTE_STATE {
            return Ok(blueprint.execute(args));
        }
        if let Some(routine) = blueprint.state(name, args) {
            return Ok(routine);
        }

        warn!(%id, kind = entity.kind(), state = name, "No routine for state, idling");
        Ok(Box::new(Idle))
    }
}
