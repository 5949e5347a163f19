//! # Screen Overlay
//!
//! A full-screen coloured rectangle that fades between two colours over a
//! fixed number of frames. At most one exists at a time.
//!
//! A blocking fade suspends every other entity until it completes. A
//! fade over `n` ticks shows its final colour on tick `n` and completes on
//! the step after. When it completes, in this order:
//!
//! 1. the suspension is lifted (blocking fades only)
//! 2. the completion callback runs, once
//! 3. a deactivating fade destroys the overlay
//!
//! ```rust,ignore
//! scheduler.activate_overlay(
//!     OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 30)
//!         .blocking(true)
//!         .on_complete(|scheduler| scheduler.signal("Level", Signal::Kill, true)),
//! )?;
//! ```

use std::cell::RefCell;
use std::fmt;

use myrmidon_shared::{Interpolation, Rgba, TimerTicks, Vec2};
use tracing::debug;

use crate::backend::Canvas;
use crate::blueprint::Blueprint;
use crate::entity::{Entity, EntityId};
use crate::error::MyrmidonResult;
use crate::scheduler::{Scheduler, StepContext};
use crate::state::{Routine, StateArgs, Step};

/// Runs once when a fade completes.
pub type OverlayCallback = Box<dyn FnOnce(&mut Scheduler) -> MyrmidonResult<()>>;

/// How to fade in a new overlay.
pub struct OverlaySpec {
    /// Starting colour
    pub from: Rgba,
    /// Final colour
    pub to: Rgba,
    /// Frames the fade takes
    pub ticks: u32,
    /// Suspend every other entity until the fade completes
    pub blocking: bool,
    /// Colour curve
    pub interpolation: Interpolation,
    /// Top left corner
    pub position: Vec2,
    /// Covered area; the whole screen when unset
    pub size: Option<Vec2>,
    /// Depth
    pub z: i32,
    /// Runs when the fade completes
    pub on_complete: Option<OverlayCallback>,
}

impl OverlaySpec {
    /// Non-blocking linear fade over the whole screen.
    #[must_use]
    pub fn new(from: Rgba, to: Rgba, ticks: u32) -> Self {
        Self {
            from,
            to,
            ticks,
            blocking: false,
            interpolation: Interpolation::Linear,
            position: Vec2::ZERO,
            size: None,
            z: i32::MIN,
            on_complete: None,
        }
    }

    /// Sets blocking
    #[must_use]
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Sets the colour curve
    #[must_use]
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Covers only part of the screen
    #[must_use]
    pub fn region(mut self, position: Vec2, size: Vec2) -> Self {
        self.position = position;
        self.size = Some(size);
        self
    }

    /// Sets depth
    #[must_use]
    pub fn z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Sets the completion callback
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(&mut Scheduler) -> MyrmidonResult<()> + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for OverlaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlaySpec")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("ticks", &self.ticks)
            .field("blocking", &self.blocking)
            .field("interpolation", &self.interpolation)
            .field("has_callback", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

/// Fade progress, kept in the overlay entity's user data.
struct OverlayFade {
    from: Rgba,
    to: Rgba,
    ticks: TimerTicks,
    interpolation: Interpolation,
    current: Rgba,
    blocking: bool,
    deactivating: bool,
    done: bool,
    position: Vec2,
    size: Vec2,
    on_complete: Option<OverlayCallback>,
}

impl OverlayFade {
    /// Advances one frame. Returns true on the frame the fade completes,
    /// which is the frame after the final colour was first shown.
    fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        let Some(tick) = self.ticks.next() else {
            self.current = self.to;
            self.done = true;
            return true;
        };
        let interpolation = self.interpolation;
        self.current = self.from.blend_with(self.to, TimerTicks::progress(tick), |a, b, t| {
            interpolation.apply(a, b, t)
        });
        false
    }
}

/// Blueprint of the overlay entity.
struct ScreenOverlay {
    fade: RefCell<Option<OverlayFade>>,
    z: i32,
}

impl Blueprint for ScreenOverlay {
    fn kind(&self) -> &'static str {
        "ScreenOverlay"
    }

    fn defaults(&self, entity: &mut Entity) {
        entity.set_normal_draw(false);
        entity.set_z(self.z);
        if let Some(fade) = self.fade.borrow_mut().take() {
            entity.set_position(fade.position);
            entity.set_data(fade);
        }
    }

    fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
        Box::new(FadeRoutine)
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        if let Some(fade) = entity.data::<OverlayFade>() {
            canvas.draw_rectangle(fade.position, fade.size, fade.current);
        }
    }
}

struct FadeRoutine;

impl Routine for FadeRoutine {
    fn resume(&mut self, ctx: &mut StepContext<'_>) -> MyrmidonResult<Step> {
        let Some(fade) = ctx.data_mut::<OverlayFade>() else {
            return Ok(Step::Continue);
        };
        if !fade.advance() {
            return Ok(Step::Continue);
        }

        let blocking = fade.blocking;
        let deactivating = fade.deactivating;
        let callback = fade.on_complete.take();
        debug!(id = %ctx.id(), deactivating, "Overlay fade complete");

        if blocking {
            ctx.scheduler().execution_suspended = false;
        }
        if let Some(callback) = callback {
            callback(ctx.scheduler())?;
        }
        if deactivating {
            ctx.destroy_self(false)?;
        }
        Ok(Step::Continue)
    }
}

impl Scheduler {
    /// Creates the overlay and starts its fade.
    ///
    /// Returns `None` without doing anything if an overlay already exists.
    /// The overlay has no parent, takes its first fade step before this
    /// returns and, if blocking, suspends every other entity from now on.
    ///
    /// # Errors
    /// `EntityCapacity` if the arena is full, or an error from a
    /// completion callback that ran during the first step.
    pub fn activate_overlay(&mut self, spec: OverlaySpec) -> MyrmidonResult<Option<EntityId>> {
        if self.overlay.is_some() {
            return Ok(None);
        }

        let (width, height) = self.config.screen_resolution;
        let size = spec
            .size
            .unwrap_or_else(|| Vec2::new(f64::from(width), f64::from(height)));
        let fade = OverlayFade {
            from: spec.from,
            to: spec.to,
            ticks: myrmidon_shared::timer_ticks(spec.ticks),
            interpolation: spec.interpolation,
            current: spec.from,
            blocking: spec.blocking,
            deactivating: false,
            done: false,
            position: spec.position,
            size,
            on_complete: spec.on_complete,
        };
        let blueprint = ScreenOverlay {
            fade: RefCell::new(Some(fade)),
            z: spec.z,
        };

        if spec.blocking {
            self.execution_suspended = true;
        }
        let saved = self.current.take();
        let spawned = self.spawn(blueprint);
        self.current = saved;

        let id = match spawned {
            Ok(id) => id,
            Err(err) => {
                if spec.blocking {
                    self.execution_suspended = false;
                }
                return Err(err);
            }
        };
        if self.is_alive(id) {
            self.overlay = Some(id);
        }
        debug!(%id, blocking = spec.blocking, ticks = spec.ticks, "Overlay activated");
        Ok(Some(id))
    }

    /// Fades the overlay back to the colour it started from, then
    /// destroys it.
    ///
    /// Returns false if there is no overlay.
    ///
    /// # Errors
    /// `StaleEntity` if the overlay vanished underneath the scheduler.
    pub fn deactivate_overlay(
        &mut self,
        ticks: u32,
        blocking: bool,
        on_complete: Option<OverlayCallback>,
    ) -> MyrmidonResult<bool> {
        let Some(id) = self.overlay else {
            return Ok(false);
        };
        let entity = self.arena.try_get_mut(id)?;
        let Some(fade) = entity.data_mut::<OverlayFade>() else {
            return Ok(false);
        };

        let (from, to) = (fade.current, fade.from);
        fade.from = from;
        fade.to = to;
        fade.ticks = myrmidon_shared::timer_ticks(ticks);
        fade.blocking = blocking;
        fade.deactivating = true;
        fade.done = false;
        fade.on_complete = on_complete;

        if blocking {
            self.execution_suspended = true;
        }
        debug!(%id, blocking, ticks, "Overlay deactivating");
        Ok(true)
    }

    /// Colour the overlay is drawn with this frame.
    #[must_use]
    pub fn overlay_colour(&self) -> Option<Rgba> {
        let entity = self.arena.get(self.overlay?)?;
        entity.data::<OverlayFade>().map(|fade| fade.current)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::blueprint::RoutineBlueprint;
    use crate::state::routine;

    fn counter(scheduler: &mut Scheduler) -> Rc<Cell<u32>> {
        let steps = Rc::new(Cell::new(0));
        let shared = Rc::clone(&steps);
        scheduler
            .spawn(RoutineBlueprint::new("counter", move |_| {
                let steps = Rc::clone(&shared);
                routine(move |_ctx| {
                    steps.set(steps.get() + 1);
                    Ok(Step::Continue)
                })
            }))
            .unwrap();
        steps
    }

    fn close(a: Rgba, b: Rgba) -> bool {
        [(a.r, b.r), (a.g, b.g), (a.b, b.b), (a.a, b.a)]
            .iter()
            .all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_blocking_fade_suspends_then_releases() {
        let mut scheduler = Scheduler::headless();
        let steps = counter(&mut scheduler);
        let completions = Rc::new(Cell::new(0));
        let seen = Rc::clone(&completions);

        let overlay = scheduler
            .activate_overlay(
                OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 3)
                    .blocking(true)
                    .on_complete(move |_| {
                        seen.set(seen.get() + 1);
                        Ok(())
                    }),
            )
            .unwrap();
        assert!(overlay.is_some());
        assert!(scheduler.execution_suspended());

        // last colour on the second frame, completion on the third
        scheduler.run_frames(2).unwrap();
        assert_eq!(completions.get(), 0);
        assert!(scheduler.execution_suspended());
        assert!(close(scheduler.overlay_colour().unwrap(), Rgba::BLACK));

        scheduler.run_frame().unwrap();
        assert_eq!(steps.get(), 1);
        assert_eq!(completions.get(), 1);
        assert!(!scheduler.execution_suspended());
        assert!(close(scheduler.overlay_colour().unwrap(), Rgba::BLACK));

        scheduler.run_frames(3).unwrap();
        assert_eq!(steps.get(), 4);
        assert_eq!(completions.get(), 1);
        assert_eq!(scheduler.overlay(), overlay);
    }

    #[test]
    fn test_only_one_overlay() {
        let mut scheduler = Scheduler::headless();
        let first = scheduler
            .activate_overlay(OverlaySpec::new(Rgba::TRANSPARENT, Rgba::WHITE, 5))
            .unwrap();
        let second = scheduler
            .activate_overlay(OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 5))
            .unwrap();
        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(scheduler.entities_of_kind("ScreenOverlay").len(), 1);
    }

    #[test]
    fn test_linear_progress() {
        let mut scheduler = Scheduler::headless();
        scheduler
            .activate_overlay(OverlaySpec::new(Rgba::TRANSPARENT, Rgba::new(0.0, 0.0, 0.0, 1.0), 4))
            .unwrap();
        assert!((scheduler.overlay_colour().unwrap().a - 0.25).abs() < 1e-9);
        scheduler.run_frame().unwrap();
        assert!((scheduler.overlay_colour().unwrap().a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_deactivate_fades_back_and_destroys() {
        let mut scheduler = Scheduler::headless();
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        let id = scheduler
            .activate_overlay(OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 1))
            .unwrap()
            .unwrap();

        assert!(scheduler
            .deactivate_overlay(
                2,
                true,
                Some(Box::new(move |_| {
                    flag.set(true);
                    Ok(())
                }))
            )
            .unwrap());
        assert!(scheduler.execution_suspended());

        scheduler.run_frame().unwrap();
        assert!(scheduler.is_alive(id));
        assert!((scheduler.overlay_colour().unwrap().a - 0.5).abs() < 1e-9);

        scheduler.run_frame().unwrap();
        assert!(!done.get());
        assert!(scheduler.overlay_colour().unwrap().a.abs() < 1e-9);

        scheduler.run_frame().unwrap();
        assert!(done.get());
        assert_eq!(scheduler.overlay(), None);
        assert!(!scheduler.execution_suspended());
        assert!(scheduler.entity(id).is_err());

        // a new overlay may be created once the old one is gone
        assert!(scheduler
            .activate_overlay(OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 1))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_zero_tick_fade_completes_at_activation() {
        let mut scheduler = Scheduler::headless();
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        scheduler
            .activate_overlay(
                OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 0)
                    .blocking(true)
                    .on_complete(move |_| {
                        flag.set(true);
                        Ok(())
                    }),
            )
            .unwrap();

        assert!(done.get());
        assert!(!scheduler.execution_suspended());
        assert!(close(scheduler.overlay_colour().unwrap(), Rgba::BLACK));
    }

    #[test]
    fn test_deactivate_without_overlay() {
        let mut scheduler = Scheduler::headless();
        assert!(!scheduler.deactivate_overlay(3, false, None).unwrap());
    }

    #[test]
    fn test_blocking_raised_mid_pass_stops_the_pass() {
        let mut scheduler = Scheduler::headless();
        let trigger = RoutineBlueprint::new("trigger", |_| {
            let mut frames = 0;
            routine(move |ctx| {
                frames += 1;
                if frames == 2 {
                    let spec = OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 10).blocking(true);
                    ctx.scheduler().activate_overlay(spec)?;
                }
                Ok(Step::Continue)
            })
        });
        scheduler
            .spawn(trigger.with_defaults(|e| e.set_priority(5)))
            .unwrap();
        let steps = counter(&mut scheduler);
        assert_eq!(steps.get(), 1);

        // the trigger steps first and suspends everything after it
        scheduler.run_frame().unwrap();
        assert!(scheduler.execution_suspended());
        assert_eq!(steps.get(), 1);
        assert_eq!(scheduler.entity(scheduler.overlay().unwrap()).unwrap().parent(), None);

        scheduler.run_frame().unwrap();
        assert_eq!(steps.get(), 1);
    }

    #[test]
    fn test_overlay_covers_region() {
        let mut scheduler = Scheduler::headless();
        let id = scheduler
            .activate_overlay(
                OverlaySpec::new(Rgba::TRANSPARENT, Rgba::BLACK, 2)
                    .region(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)),
            )
            .unwrap()
            .unwrap();
        let entity = scheduler.entity(id).unwrap();
        assert!(!entity.normal_draw());
        assert_eq!(entity.position(), Vec2::new(1.0, 2.0));
    }
}
