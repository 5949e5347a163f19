//! # Scheduler
//!
//! Owns every entity and drives the fixed-tick main loop.
//!
//! ## Frame
//!
//! 1. Re-sort entities by descending priority if any priority changed
//! 2. Poll input
//! 3. Advance each live entity's current state by one step, in priority
//!    order. While a blocking overlay is fading only the overlay steps.
//! 4. Purge entities destroyed during the pass
//! 5. Drop cached collision geometry if any collision check ran
//! 6. Render
//! 7. Pace to the target frame rate
//!
//! All logic happens before any drawing, and nothing is removed from the
//! live list while it is being iterated.
//!
//! ## Cooperative scheduling
//!
//! There is one thread of control. A routine that never returns from its
//! step hangs the process; nothing preempts it.

mod collide;
mod context;
mod states;
mod tree;

pub use context::StepContext;
pub use tree::{Signal, SignalTarget};

use std::rc::Rc;
use std::time::Instant;

use myrmidon_shared::EXECUTE_STATE;
use tracing::{debug, info, trace, warn};

use crate::backend::{
    AudioClip, BackendKind, BackendRegistry, Backends, Clock, Font, Image, KeyCode, MouseState,
    SceneView, TextId, TextSpec,
};
use crate::blueprint::Blueprint;
use crate::config::GameConfig;
use crate::entity::{Entity, EntityArena, EntityId, EntityMut, TreeLinks};
use crate::error::{MyrmidonError, MyrmidonResult};
use crate::state::{StateArgs, Step};
use crate::stats::{FrameStats, FrameStatsAccumulator};

/// The entity scheduler and main loop.
pub struct Scheduler {
    pub(crate) config: GameConfig,
    pub(crate) arena: EntityArena,
    /// Live entities in step order
    pub(crate) live: Vec<EntityId>,
    /// Destroyed this frame, purged at frame end
    pub(crate) pending_removal: Vec<EntityId>,
    /// Entity whose step is running
    pub(crate) current: Option<EntityId>,
    pub(crate) started: bool,
    pub(crate) priority_dirty: bool,
    pub(crate) collision_checked: bool,
    pub(crate) execution_suspended: bool,
    /// Set while `run_frame` is on the stack
    in_frame: bool,
    pub(crate) overlay: Option<EntityId>,
    pub(crate) backends: Backends,
    clock: Box<dyn Clock>,
    fps: f64,
    frame: u64,
    last_stats: FrameStats,
    stats: FrameStatsAccumulator,
}

impl Scheduler {
    /// Creates a scheduler on the given backends.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate, or any
    /// error the window backend raises while applying the resolution.
    pub fn new(config: GameConfig, mut backends: Backends) -> MyrmidonResult<Self> {
        config.validate()?;
        backends.window.change_resolution(config.screen_resolution)?;
        backends.gfx.change_resolution(config.screen_resolution);
        Ok(Self::assemble(config, backends))
    }

    /// Creates a scheduler with backends resolved by name.
    ///
    /// # Errors
    /// `UnknownBackend` for unregistered names, otherwise as [`Scheduler::new`].
    pub fn from_config(config: GameConfig, registry: &BackendRegistry) -> MyrmidonResult<Self> {
        config.validate()?;
        let backends = registry.build(&config)?;
        Self::new(config, backends)
    }

    /// Unpaced scheduler with no input or audio, for tests and tools.
    #[must_use]
    pub fn headless() -> Self {
        Self::assemble(GameConfig::headless(), Backends::headless())
    }

    /// Headless configuration on custom backends.
    #[must_use]
    pub fn headless_with(backends: Backends) -> Self {
        Self::assemble(GameConfig::headless(), backends)
    }

    fn assemble(config: GameConfig, mut backends: Backends) -> Self {
        let clock = backends.window.clock();
        let stats = FrameStatsAccumulator::new(config.target_fps);
        Self {
            arena: EntityArena::new(config.max_entities),
            live: Vec::with_capacity(config.max_entities.min(1024)),
            pending_removal: Vec::new(),
            current: None,
            started: false,
            priority_dirty: false,
            collision_checked: false,
            execution_suspended: false,
            in_frame: false,
            overlay: None,
            backends,
            clock,
            fps: 0.0,
            frame: 0,
            last_stats: FrameStats::default(),
            stats,
            config,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True once the first entity has been spawned.
    #[must_use]
    pub const fn started(&self) -> bool {
        self.started
    }

    /// Frames run so far
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame rate reported by the clock
    #[must_use]
    pub const fn fps(&self) -> f64 {
        self.fps
    }

    /// Timings of the last frame
    #[must_use]
    pub const fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Accumulated timings
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Live entities in step order, including ones pending removal.
    #[must_use]
    pub fn live(&self) -> &[EntityId] {
        &self.live
    }

    /// Number of live entities
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.live.len()
    }

    /// Entity whose step is running, if any.
    #[must_use]
    pub const fn current_entity(&self) -> Option<EntityId> {
        self.current
    }

    /// True while a blocking overlay holds every other entity still.
    #[must_use]
    pub const fn execution_suspended(&self) -> bool {
        self.execution_suspended
    }

    /// The screen overlay, if one exists.
    #[must_use]
    pub const fn overlay(&self) -> Option<EntityId> {
        self.overlay
    }

    /// The backends, for anything not wrapped here.
    pub fn backends_mut(&mut self) -> &mut Backends {
        &mut self.backends
    }

    /// Looks up an entity.
    ///
    /// Destroyed entities stay readable until the end of the frame.
    ///
    /// # Errors
    /// `StaleEntity` once the entity has been purged.
    pub fn entity(&self, id: EntityId) -> MyrmidonResult<&Entity> {
        self.arena.try_get(id)
    }

    /// Mutable access whose setters notify the render backend.
    ///
    /// # Errors
    /// `StaleEntity` once the entity has been purged.
    pub fn entity_mut(&mut self, id: EntityId) -> MyrmidonResult<EntityMut<'_>> {
        let entity = self.arena.try_get_mut(id)?;
        Ok(EntityMut {
            id,
            entity,
            gfx: self.backends.gfx.as_mut(),
            priority_dirty: &mut self.priority_dirty,
        })
    }

    /// True while the entity is live and not destroyed.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.arena.get(id).is_some_and(|e| !e.is_destroyed())
    }

    /// Live entities spawned from blueprints of this kind.
    #[must_use]
    pub fn entities_of_kind(&self, kind: &str) -> Vec<EntityId> {
        self.live
            .iter()
            .copied()
            .filter(|&id| {
                self.arena
                    .get(id)
                    .is_some_and(|e| !e.is_destroyed() && e.kind() == kind)
            })
            .collect()
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawns an entity from a blueprint.
    ///
    /// The entity becomes the newest child of the entity whose step is
    /// running, if any, and runs the first step of its `execute` state
    /// before this returns. It may destroy itself in that step.
    ///
    /// # Errors
    /// `EntityCapacity` when the arena is full, or whatever the first
    /// step returns.
    pub fn spawn(&mut self, blueprint: impl Blueprint) -> MyrmidonResult<EntityId> {
        self.spawn_rc(Rc::new(blueprint), &StateArgs::new())
    }

    /// Spawns with arguments for the `execute` state.
    ///
    /// # Errors
    /// As [`Scheduler::spawn`].
    pub fn spawn_with(&mut self, blueprint: impl Blueprint, args: &StateArgs) -> MyrmidonResult<EntityId> {
        self.spawn_rc(Rc::new(blueprint), args)
    }

    /// Spawns from a shared blueprint.
    ///
    /// # Errors
    /// As [`Scheduler::spawn`].
    pub fn spawn_rc(&mut self, blueprint: Rc<dyn Blueprint>, args: &StateArgs) -> MyrmidonResult<EntityId> {
        let parent = self.current.filter(|&p| self.arena.contains(p));
        let execute = blueprint.execute(args);

        let id = self.arena.insert_with(|id| {
            let mut entity = Entity::new(id, Rc::clone(&blueprint));
            blueprint.defaults(&mut entity);
            entity.states.install(EXECUTE_STATE, None, execute);
            entity
        })?;

        if !self.started {
            self.started = true;
            info!(
                target_fps = self.config.target_fps,
                capacity = self.arena.capacity(),
                "Scheduler started"
            );
        }

        self.live.push(id);
        self.priority_dirty = true;
        if let Some(entity) = self.arena.get(id) {
            self.backends.gfx.register_entity(id, entity);
        }
        if let Some(parent) = parent {
            self.link_child(parent, id);
        }
        debug!(%id, kind = blueprint.kind(), parent = ?parent, "Entity spawned");

        let saved = self.current.replace(id);
        let result = self.step(id);
        self.current = saved;
        result?;

        Ok(id)
    }

    // =========================================================================
    // Main loop
    // =========================================================================

    /// Runs frames until the input backend reports a quit request.
    ///
    /// Without an input backend this only returns on error.
    ///
    /// # Errors
    /// `FrameInProgress` inside a running frame, otherwise the first error
    /// raised by an entity step or a backend.
    pub fn run(&mut self) -> MyrmidonResult<()> {
        if self.in_frame {
            return Err(MyrmidonError::FrameInProgress);
        }
        info!(target_fps = self.config.target_fps, "Main loop running");
        while !self.quit_requested() {
            self.run_frame()?;
        }
        info!(frames = self.frame, "Main loop stopped");
        self.stats.log_summary();
        Ok(())
    }

    /// Runs exactly `frames` frames.
    ///
    /// # Errors
    /// As [`Scheduler::run_frame`], checked once before the first frame.
    pub fn run_frames(&mut self, frames: u32) -> MyrmidonResult<()> {
        if self.in_frame {
            return Err(MyrmidonError::FrameInProgress);
        }
        for _ in 0..frames {
            self.run_frame()?;
        }
        Ok(())
    }

    /// Runs one frame.
    ///
    /// # Errors
    /// `FrameInProgress` when called from a step or callback inside a
    /// running frame. Otherwise the first error raised by an entity step,
    /// `on_exit` callback or backend; the frame is abandoned at that point.
    pub fn run_frame(&mut self) -> MyrmidonResult<()> {
        if self.in_frame {
            return Err(MyrmidonError::FrameInProgress);
        }
        self.in_frame = true;
        let result = self.frame_inner();
        self.in_frame = false;
        self.current = None;
        result
    }

    fn frame_inner(&mut self) -> MyrmidonResult<()> {
        let frame_start = Instant::now();

        if self.priority_dirty {
            let arena = &self.arena;
            let priority = |id: &EntityId| arena.get(*id).map_or(0, Entity::priority);
            // stable, so equal priorities keep their relative order
            self.live.sort_by(|a, b| priority(b).cmp(&priority(a)));
            self.priority_dirty = false;
        }

        if let Some(input) = self.backends.input.as_mut() {
            input.process_input();
        }

        let stepped = self.logic_pass()?;
        let logic_done = Instant::now();

        self.purge_removed();
        if self.collision_checked {
            for &id in &self.live {
                if let Some(entity) = self.arena.get_mut(id) {
                    entity.invalidate_geometry();
                }
            }
            self.collision_checked = false;
        }
        let removal_done = Instant::now();

        let gfx = &mut self.backends.gfx;
        gfx.update_screen_pre();
        gfx.draw_entities(&SceneView::new(&self.arena, &self.live));
        gfx.update_screen_post();
        let render_done = Instant::now();

        self.fps = self.clock.get_fps();
        self.clock.tick(self.config.target_fps);

        self.record_frame(FrameStats {
            frame: self.frame,
            logic_us: micros(logic_done - frame_start),
            removal_us: micros(removal_done - logic_done),
            render_us: micros(render_done - removal_done),
            total_us: micros(render_done - frame_start),
            entities_stepped: stepped,
            live_entities: u32::try_from(self.live.len()).unwrap_or(u32::MAX),
        });
        self.frame += 1;
        Ok(())
    }

    fn logic_pass(&mut self) -> MyrmidonResult<u32> {
        let mut stepped = 0;

        if self.execution_suspended {
            stepped += self.step_overlay()?;
        } else {
            // entities spawned during the pass already had their first step
            let count = self.live.len();
            for index in 0..count {
                let id = self.live[index];
                self.current = Some(id);
                if self.step(id)? {
                    stepped += 1;
                }
                if self.execution_suspended {
                    self.current = None;
                    stepped += self.step_overlay()?;
                    break;
                }
            }
        }

        self.current = None;
        Ok(stepped)
    }

    fn step_overlay(&mut self) -> MyrmidonResult<u32> {
        let Some(overlay) = self.overlay else {
            return Ok(0);
        };
        self.current = Some(overlay);
        let stepped = self.step(overlay);
        self.current = None;
        Ok(u32::from(stepped?))
    }

    fn record_frame(&mut self, stats: FrameStats) {
        self.last_stats = stats;
        self.stats.record(stats);

        if self.config.slow_frame_warning && stats.total_us > self.stats.budget_us * 2 {
            #[allow(clippy::cast_precision_loss)]
            let frame_ms = stats.total_us as f64 / 1000.0;
            warn!(
                frame = stats.frame,
                frame_ms,
                budget_ms = self.config.frame_budget_ms(),
                "Frame exceeded budget"
            );
        }
    }

    fn quit_requested(&self) -> bool {
        self.backends
            .input
            .as_ref()
            .is_some_and(|input| input.quit_requested())
    }

    /// Advances one entity by a single step. Returns true if its routine ran.
    pub(crate) fn step(&mut self, id: EntityId) -> MyrmidonResult<bool> {
        if !self.started {
            return Ok(false);
        }
        let state = {
            let Some(entity) = self.arena.get_mut(id) else {
                return Ok(false);
            };
            if entity.is_destroyed() || !entity.executing() {
                return Ok(false);
            }
            if entity.states.tick_sleep() {
                return Ok(false);
            }
            entity.current_state().to_owned()
        };

        self.ensure_state(id, &state);
        let Some((mut routine, epoch)) = self
            .arena
            .get_mut(id)
            .and_then(|entity| entity.states.take(&state))
        else {
            return Ok(false);
        };

        trace!(%id, state = %state, "Step");
        let outcome = routine.resume(&mut StepContext::new(self, id));

        let Some(entity) = self.arena.get_mut(id) else {
            return outcome.map(|_| true);
        };
        match outcome {
            Ok(Step::Continue) => entity.states.restore(&state, routine, epoch),
            Ok(Step::SleepFor(frames)) => {
                entity.states.restore(&state, routine, epoch);
                entity.states.set_sleep(frames);
            }
            Ok(Step::Terminate(next)) => {
                entity.states.finish(&state, epoch);
                // a state switched away from during its own step just ends
                let moved_on = entity.is_destroyed() || entity.current_state() != state;
                if moved_on {
                    return Ok(true);
                }
                match next.filter(|name| self.knows_state(id, name)) {
                    Some(name) => self.resume_state(id, &name)?,
                    None => {
                        debug!(%id, state = %state, "State finished, destroying entity");
                        self.destroy(id, false)?;
                    }
                }
            }
            Err(err) => {
                entity.states.restore(&state, routine, epoch);
                return Err(err);
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Ownership tree bookkeeping
    // =========================================================================

    fn link_child(&mut self, parent: EntityId, child: EntityId) {
        let Some(parent_entity) = self.arena.get_mut(parent) else {
            return;
        };
        let old_head = parent_entity.links.child.replace(child);

        if let Some(head) = old_head.and_then(|h| self.arena.get_mut(h)) {
            head.links.prev_sibling = Some(child);
        }
        if let Some(child_entity) = self.arena.get_mut(child) {
            child_entity.links.parent = Some(parent);
            child_entity.links.prev_sibling = None;
            child_entity.links.next_sibling = old_head;
        }
    }

    fn unlink(&mut self, id: EntityId) {
        let Some(links) = self.arena.get(id).map(Entity::links) else {
            return;
        };

        if let Some(prev) = links.prev_sibling.and_then(|p| self.arena.get_mut(p)) {
            prev.links.next_sibling = links.next_sibling;
        } else if let Some(parent) = links.parent.and_then(|p| self.arena.get_mut(p)) {
            if parent.links.child == Some(id) {
                parent.links.child = links.next_sibling;
            }
        }
        if let Some(next) = links.next_sibling.and_then(|n| self.arena.get_mut(n)) {
            next.links.prev_sibling = links.prev_sibling;
        }

        // orphan the children; their sibling list goes with the parent
        let mut cursor = links.child;
        while let Some(child) = cursor.and_then(|c| self.arena.get_mut(c)) {
            if child.links.parent != Some(id) {
                break;
            }
            cursor = child.links.next_sibling;
            child.links.parent = None;
            child.links.prev_sibling = None;
            child.links.next_sibling = None;
        }

        if let Some(entity) = self.arena.get_mut(id) {
            entity.links = TreeLinks::default();
        }
    }

    fn purge_removed(&mut self) {
        if self.pending_removal.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.pending_removal);

        for &id in &pending {
            self.unlink(id);
        }
        let arena = &self.arena;
        self.live
            .retain(|&id| arena.get(id).is_some_and(|e| !e.is_destroyed()));
        for &id in &pending {
            if self.arena.remove(id).is_some() {
                debug!(%id, "Entity purged");
            }
        }

        pending.clear();
        self.pending_removal = pending;
    }

    // =========================================================================
    // Backend passthrough
    // =========================================================================

    fn input(&self) -> MyrmidonResult<&dyn crate::backend::InputBackend> {
        self.backends
            .input
            .as_deref()
            .ok_or(MyrmidonError::BackendUnavailable(BackendKind::Input))
    }

    /// True while `key` is held.
    ///
    /// # Errors
    /// `BackendUnavailable` without an input backend.
    pub fn keyboard_key_down(&self, key: KeyCode) -> MyrmidonResult<bool> {
        Ok(self.input()?.keyboard_key_down(key))
    }

    /// True on the frame `key` was let go.
    ///
    /// # Errors
    /// `BackendUnavailable` without an input backend.
    pub fn keyboard_key_released(&self, key: KeyCode) -> MyrmidonResult<bool> {
        Ok(self.input()?.keyboard_key_released(key))
    }

    /// Mouse snapshot.
    ///
    /// # Errors
    /// `BackendUnavailable` without an input backend.
    pub fn mouse(&self) -> MyrmidonResult<MouseState> {
        Ok(self.input()?.mouse())
    }

    /// Loads an image through the render backend.
    ///
    /// # Errors
    /// `AssetLoad` if the backend cannot read it.
    pub fn load_image(&mut self, path: &str) -> MyrmidonResult<Image> {
        self.backends.gfx.load_image(path)
    }

    /// Creates a blank image.
    ///
    /// # Errors
    /// Backend specific.
    pub fn new_image(&mut self, width: u32, height: u32, colour: myrmidon_shared::Rgba) -> MyrmidonResult<Image> {
        self.backends.gfx.new_image(width, height, colour)
    }

    /// Writes text through the render backend.
    ///
    /// # Errors
    /// `AssetLoad` if the font cannot be used.
    pub fn write_text(&mut self, text: &TextSpec) -> MyrmidonResult<TextId> {
        self.backends.gfx.write_text(text)
    }

    /// Removes text.
    pub fn delete_text(&mut self, text: TextId) {
        self.backends.gfx.delete_text(text);
    }

    /// Loads a font through the window backend.
    ///
    /// # Errors
    /// `AssetLoad` if the font cannot be read.
    pub fn load_font(&mut self, path: Option<&str>, size: u32) -> MyrmidonResult<Font> {
        self.backends.window.load_font(path, size)
    }

    /// Loads a sound.
    ///
    /// # Errors
    /// `BackendUnavailable` without an audio backend, `AssetLoad` if the
    /// file cannot be read.
    pub fn load_audio(&mut self, path: &str) -> MyrmidonResult<AudioClip> {
        self.backends
            .audio
            .as_mut()
            .ok_or(MyrmidonError::BackendUnavailable(BackendKind::Audio))?
            .load_audio(path)
    }

    /// Resizes the window and tells the render backend.
    ///
    /// # Errors
    /// Whatever the window backend raises.
    pub fn change_resolution(&mut self, resolution: (u32, u32)) -> MyrmidonResult<()> {
        self.backends.window.change_resolution(resolution)?;
        self.backends.gfx.change_resolution(resolution);
        self.config.screen_resolution = resolution;
        info!(width = resolution.0, height = resolution.1, "Resolution changed");
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn micros(duration: std::time::Duration) -> u64 {
    duration.as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::RoutineBlueprint;
    use crate::state::{routine, Idle};

    #[test]
    fn test_not_started_until_first_spawn() {
        let mut scheduler = Scheduler::headless();
        assert!(!scheduler.started());
        scheduler.spawn(RoutineBlueprint::idle("idle")).unwrap();
        assert!(scheduler.started());
        assert_eq!(scheduler.entity_count(), 1);
    }

    #[test]
    fn test_spawn_runs_first_step_immediately() {
        let mut scheduler = Scheduler::headless();
        let id = scheduler
            .spawn(RoutineBlueprint::new("mover", |_| {
                routine(|ctx| {
                    ctx.entity_mut()?.move_by(myrmidon_shared::Vec2::new(1.0, 0.0));
                    Ok(Step::Continue)
                })
            }))
            .unwrap();
        assert!((scheduler.entity(id).unwrap().x() - 1.0).abs() < f64::EPSILON);

        scheduler.run_frame().unwrap();
        assert!((scheduler.entity(id).unwrap().x() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_capacity_error() {
        let config = GameConfig {
            max_entities: 1,
            ..GameConfig::headless()
        };
        let mut scheduler = Scheduler::new(config, Backends::headless()).unwrap();
        scheduler.spawn(RoutineBlueprint::idle("a")).unwrap();
        let err = scheduler.spawn(RoutineBlueprint::idle("b")).unwrap_err();
        assert!(matches!(err, MyrmidonError::EntityCapacity { capacity: 1 }));
    }

    #[test]
    fn test_input_unavailable_when_headless() {
        let scheduler = Scheduler::headless();
        assert!(matches!(
            scheduler.keyboard_key_down(32),
            Err(MyrmidonError::BackendUnavailable(BackendKind::Input))
        ));
        assert!(scheduler.mouse().is_err());
    }

    #[test]
    fn test_audio_unavailable_when_headless() {
        let mut scheduler = Scheduler::headless();
        assert!(matches!(
            scheduler.load_audio("boom.wav"),
            Err(MyrmidonError::BackendUnavailable(BackendKind::Audio))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            target_fps: 0,
            ..GameConfig::headless()
        };
        assert!(Scheduler::new(config, Backends::headless()).is_err());
    }

    #[test]
    fn test_change_resolution_updates_config() {
        let mut scheduler = Scheduler::headless();
        scheduler.change_resolution((800, 600)).unwrap();
        assert_eq!(scheduler.config().screen_resolution, (800, 600));
    }

    #[test]
    fn test_frame_cannot_start_inside_a_frame() {
        let mut scheduler = Scheduler::headless();
        let victim = scheduler.spawn(RoutineBlueprint::idle("victim")).unwrap();
        let nested = Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen = Rc::clone(&nested);
        scheduler
            .spawn(
                RoutineBlueprint::new("reentrant", move |_| {
                    let seen = Rc::clone(&seen);
                    let mut steps = 0;
                    routine(move |ctx| {
                        steps += 1;
                        if steps == 2 {
                            ctx.scheduler().destroy(victim, false)?;
                            let frame = ctx.scheduler().run_frame();
                            let frames = ctx.scheduler().run_frames(1);
                            seen.borrow_mut().push(matches!(frame, Err(MyrmidonError::FrameInProgress)));
                            seen.borrow_mut().push(matches!(frames, Err(MyrmidonError::FrameInProgress)));
                            frame?;
                        }
                        Ok(Step::Continue)
                    })
                })
                .with_defaults(|e| e.set_priority(10)),
            )
            .unwrap();

        let err = scheduler.run_frame().unwrap_err();
        assert!(matches!(err, MyrmidonError::FrameInProgress));
        assert_eq!(*nested.borrow(), vec![true, true]);
        assert_eq!(scheduler.frame(), 0);
        assert_eq!(scheduler.current_entity(), None);

        // the abandoned frame releases the guard; the next one purges normally
        scheduler.run_frame().unwrap();
        assert!(scheduler.entity(victim).is_err());
        assert_eq!(scheduler.entity_count(), 1);
        assert_eq!(scheduler.frame(), 1);
    }

    #[test]
    fn test_frame_counter_and_stats() {
        let mut scheduler = Scheduler::headless();
        scheduler.spawn(RoutineBlueprint::new("idle", |_| Box::new(Idle))).unwrap();
        scheduler.run_frames(3).unwrap();
        assert_eq!(scheduler.frame(), 3);
        assert_eq!(scheduler.stats().frames_recorded, 3);
        assert_eq!(scheduler.last_frame_stats().entities_stepped, 1);
        assert_eq!(scheduler.last_frame_stats().live_entities, 1);
    }
}
