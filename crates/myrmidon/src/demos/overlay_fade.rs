//! Title screen that fades in from black, shows a menu for a while and
//! fades back out.
//!
//! Both fades block, so nothing but the overlay runs while the screen is
//! changing. The fade-out callback kills the whole `Director` tree.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use myrmidon_core::prelude::*;

/// Demo settings.
#[derive(Clone, Copy, Debug)]
pub struct OverlayDemo {
    /// Frames each fade takes
    pub fade_ticks: u32,
    /// Frames the menu stays up before fading out
    pub menu_frames: u32,
}

impl Default for OverlayDemo {
    fn default() -> Self {
        Self {
            fade_ticks: 30,
            menu_frames: 60,
        }
    }
}

/// What happened during a run.
#[derive(Debug, Default)]
pub struct FadeLog {
    /// Fade-in finished
    pub faded_in: Cell<bool>,
    /// Fade-out finished
    pub faded_out: Cell<bool>,
    /// Steps the menu ran
    pub menu_steps: Cell<u32>,
}

/// Summary after a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeReport {
    /// Frames run
    pub frames: u64,
    /// Frames that ended with execution suspended
    pub suspended_frames: u64,
    /// Steps the menu ran
    pub menu_steps: u32,
    /// Both fades completed and every entity is gone
    pub finished: bool,
}

struct Director {
    settings: OverlayDemo,
    log: Rc<FadeLog>,
}

impl Blueprint for Director {
    fn kind(&self) -> &'static str {
        "Director"
    }

    fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
        let ticks = self.settings.fade_ticks;
        let log = Rc::clone(&self.log);
        routine(move |ctx| {
            let log = Rc::clone(&log);
            ctx.scheduler().activate_overlay(
                OverlaySpec::new(Rgba::BLACK, Rgba::TRANSPARENT, ticks)
                    .blocking(true)
                    .on_complete(move |_| {
                        log.faded_in.set(true);
                        Ok(())
                    }),
            )?;
            Ok(Step::goto("title"))
        })
    }

    fn state(&self, name: &str, _args: &StateArgs) -> Option<Box<dyn Routine>> {
        if name != "title" {
            return None;
        }
        let settings = self.settings;
        let log = Rc::clone(&self.log);
        let mut menu = None;
        Some(routine(move |ctx| {
            if menu.is_none() && log.faded_in.get() {
                menu = Some(ctx.spawn(Menu {
                    settings,
                    log: Rc::clone(&log),
                })?);
                debug!("Menu up");
            }
            Ok(Step::Continue)
        }))
    }

    fn has_state(&self, name: &str) -> bool {
        name == "title"
    }
}

struct Menu {
    settings: OverlayDemo,
    log: Rc<FadeLog>,
}

impl Blueprint for Menu {
    fn kind(&self) -> &'static str {
        "Menu"
    }

    fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
        let settings = self.settings;
        let log = Rc::clone(&self.log);
        routine(move |ctx| {
            let steps = log.menu_steps.get() + 1;
            log.menu_steps.set(steps);
            if steps < settings.menu_frames {
                return Ok(Step::Continue);
            }

            let log = Rc::clone(&log);
            ctx.scheduler().deactivate_overlay(
                settings.fade_ticks,
                true,
                Some(Box::new(move |scheduler: &mut Scheduler| {
                    log.faded_out.set(true);
                    scheduler.signal("Director", Signal::Kill, true)
                })),
            )?;
            Ok(Step::Continue)
        })
    }
}

/// Spawns the director, which starts the fade-in at once.
///
/// # Errors
/// `EntityCapacity` if the scheduler is full.
pub fn spawn(scheduler: &mut Scheduler, settings: OverlayDemo, log: &Rc<FadeLog>) -> MyrmidonResult<EntityId> {
    scheduler.spawn(Director {
        settings,
        log: Rc::clone(log),
    })
}

/// Runs until both fades are done and the board is empty, or
/// `max_frames` pass.
///
/// # Errors
/// Any error raised by a step, callback or backend.
pub fn run(scheduler: &mut Scheduler, settings: OverlayDemo, max_frames: u32) -> MyrmidonResult<FadeReport> {
    let log = Rc::new(FadeLog::default());
    spawn(scheduler, settings, &log)?;

    let mut suspended_frames = 0;
    let mut finished = false;
    for _ in 0..max_frames {
        scheduler.run_frame()?;
        if scheduler.execution_suspended() {
            suspended_frames += 1;
        }
        if log.faded_out.get() && scheduler.entity_count() == 0 {
            finished = true;
            break;
        }
    }

    let report = FadeReport {
        frames: scheduler.frame(),
        suspended_frames,
        menu_steps: log.menu_steps.get(),
        finished,
    };
    info!(
        frames = report.frames,
        suspended = report.suspended_frames,
        menu_steps = report.menu_steps,
        finished = report.finished,
        "Overlay demo finished"
    );
    Ok(report)
}
