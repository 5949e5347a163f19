//! # Ownership Tree Operations
//!
//! Every tree-wide operation first collects the target and, if asked, all
//! of its descendants into a duplicate-free list, and only then applies
//! the change. Destroying a subtree therefore never disturbs the walk.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::entity::EntityId;
use crate::error::MyrmidonResult;
use crate::scheduler::{Scheduler, StepContext};

/// Lifecycle command sent to entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Destroy
    Kill,
    /// Execute and show
    Wakeup,
    /// Stop executing and hide
    Sleep,
    /// Stop executing, stay visible and collidable
    Freeze,
}

/// Who a signal is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalTarget<'a> {
    /// One entity
    Entity(EntityId),
    /// Every live entity spawned from a blueprint of this kind
    Kind(&'a str),
}

impl From<EntityId> for SignalTarget<'_> {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

impl<'a> From<&'a str> for SignalTarget<'a> {
    fn from(kind: &'a str) -> Self {
        Self::Kind(kind)
    }
}

impl Scheduler {
    /// `root` followed by its descendants if `tree`, depth first, each
    /// entity once.
    ///
    /// # Errors
    /// `StaleEntity` if `root` is gone.
    pub fn collect_tree(&self, root: EntityId, tree: bool) -> MyrmidonResult<Vec<EntityId>> {
        let entity = self.arena.try_get(root)?;
        let mut out = vec![root];
        if !tree {
            return Ok(out);
        }

        let mut seen = HashSet::from([root]);
        // (next sibling to visit) per open level
        let mut stack = vec![entity.child()];
        while let Some(cursor) = stack.last_mut() {
            let Some(id) = cursor.take() else {
                stack.pop();
                continue;
            };
            let Some(entity) = self.arena.get(id) else {
                continue;
            };
            if !seen.insert(id) {
                // already visited through another path; do not re-walk its list
                continue;
            }
            *cursor = entity.next_sibling();
            out.push(id);
            stack.push(entity.child());
        }

        Ok(out)
    }

    /// Destroys an entity, and its descendants if `tree`.
    ///
    /// Each entity stops stepping at once, is unregistered from the render
    /// backend, runs its blueprint's `on_exit` and is purged at the end of
    /// the frame. Destroying an already destroyed entity does nothing.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone, or the first `on_exit` error. The
    /// remaining entities are still destroyed.
    pub fn destroy(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        let targets = self.collect_tree(id, tree)?;
        let mut first_error = None;
        for target in targets {
            if let Err(err) = self.destroy_single(target) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn destroy_single(&mut self, id: EntityId) -> MyrmidonResult<()> {
        let Some(entity) = self.arena.get_mut(id) else {
            return Ok(());
        };
        if entity.is_destroyed() {
            return Ok(());
        }
        entity.mark_destroyed();
        let blueprint = Rc::clone(entity.blueprint());
        let kind = entity.kind();

        self.pending_removal.push(id);
        self.backends.gfx.remove_entity(id);
        if self.overlay == Some(id) {
            self.overlay = None;
            self.execution_suspended = false;
        }
        debug!(%id, kind, "Entity destroyed");

        blueprint.on_exit(&mut StepContext::new(self, id))
    }

    /// Stops stepping.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn stop_executing(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        self.apply_tree(id, tree, |s, e| s.set_executing(e, false))
    }

    /// Resumes stepping.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn start_executing(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        self.apply_tree(id, tree, |s, e| s.set_executing(e, true))
    }

    /// Flips stepping on each entity independently.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn toggle_executing(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        self.apply_tree(id, tree, |s, e| {
            let executing = s.arena.get(e).is_some_and(|entity| entity.executing());
            s.set_executing(e, !executing);
        })
    }

    /// Stops drawing.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn hide(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        self.apply_tree(id, tree, |s, e| s.set_drawing(e, false))
    }

    /// Resumes drawing.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn show(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        self.apply_tree(id, tree, |s, e| s.set_drawing(e, true))
    }

    /// Flips drawing on each entity independently.
    ///
    /// # Errors
    /// `StaleEntity` if `id` is gone.
    pub fn toggle_display(&mut self, id: EntityId, tree: bool) -> MyrmidonResult<()> {
        self.apply_tree(id, tree, |s, e| {
            let drawing = s.arena.get(e).is_some_and(|entity| entity.drawing());
            s.set_drawing(e, !drawing);
        })
    }

    /// Sends a signal to an entity or to every live entity of a kind.
    ///
    /// ```rust,ignore
    /// scheduler.signal("Enemy", Signal::Freeze, true)?;
    /// scheduler.signal(player, Signal::Kill, false)?;
    /// ```
    ///
    /// # Errors
    /// `StaleEntity` if a single target is gone, or an `on_exit` error
    /// for `Kill`. Kinds with no live entities are not an error.
    pub fn signal<'t>(&mut self, target: impl Into<SignalTarget<'t>>, signal: Signal, tree: bool) -> MyrmidonResult<()> {
        let targets = match target.into() {
            SignalTarget::Entity(id) => vec![id],
            SignalTarget::Kind(kind) => self.entities_of_kind(kind),
        };
        debug!(?signal, count = targets.len(), tree, "Signal");

        for id in targets {
            match signal {
                Signal::Kill => self.destroy(id, tree)?,
                Signal::Sleep => {
                    self.stop_executing(id, tree)?;
                    self.hide(id, tree)?;
                }
                Signal::Freeze => self.stop_executing(id, tree)?,
                Signal::Wakeup => {
                    self.start_executing(id, tree)?;
                    self.show(id, tree)?;
                }
            }
        }
        Ok(())
    }

    fn apply_tree(
        &mut self,
        id: EntityId,
        tree: bool,
        mut apply: impl FnMut(&mut Self, EntityId),
    ) -> MyrmidonResult<()> {
        for target in self.collect_tree(id, tree)? {
            apply(self, target);
        }
        Ok(())
    }

    fn set_executing(&mut self, id: EntityId, executing: bool) {
        if let Some(entity) = self.arena.get_mut(id) {
            if !entity.is_destroyed() {
                entity.set_executing(executing);
            }
        }
    }

    fn set_drawing(&mut self, id: EntityId, drawing: bool) {
        if let Ok(mut entity) = self.entity_mut(id) {
            entity.set_drawing(drawing);
        }
    }
}
