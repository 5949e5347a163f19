//! Balls bouncing off the screen edges and off each other.
//!
//! An `Arena` entity spawns the balls in its first step, so every ball
//! is its child and killing the arena tree clears the board.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use myrmidon_core::prelude::*;

/// Ball radius in pixels.
pub const BALL_RADIUS: f64 = 12.0;

/// Demo settings.
#[derive(Clone, Copy, Debug)]
pub struct BouncingBalls {
    /// Balls to spawn
    pub balls: usize,
    /// Random seed for positions and velocities
    pub seed: u64,
    /// Fastest starting speed, pixels per frame
    pub max_speed: f64,
}

impl Default for BouncingBalls {
    fn default() -> Self {
        Self {
            balls: 32,
            seed: 0x5eed,
            max_speed: 6.0,
        }
    }
}

/// Totals gathered while the demo runs.
#[derive(Debug, Default)]
pub struct BounceCounters {
    /// Times a ball hit a screen edge
    pub wall_bounces: Cell<u64>,
    /// Times a ball found itself overlapping another
    pub ball_hits: Cell<u64>,
}

/// Summary after a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BounceReport {
    /// Frames run
    pub frames: u64,
    /// Balls still alive
    pub live_balls: usize,
    /// Edge bounces
    pub wall_bounces: u64,
    /// Ball to ball hits
    pub ball_hits: u64,
}

#[derive(Clone, Copy, Debug)]
struct Velocity(Vec2);

struct Ball {
    start: Vec2,
    velocity: Vec2,
    bounds: Vec2,
    counters: Rc<BounceCounters>,
}

impl Blueprint for Ball {
    fn kind(&self) -> &'static str {
        "Ball"
    }

    fn defaults(&self, entity: &mut Entity) {
        entity.set_position(self.start);
        entity.set_collision(CollisionShape::circle(BALL_RADIUS));
        entity.set_data(Velocity(self.velocity));
    }

    fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
        let bounds = self.bounds;
        let counters = Rc::clone(&self.counters);
        routine(move |ctx| {
            let Some(&Velocity(mut velocity)) = ctx.data::<Velocity>() else {
                return Ok(Step::finish());
            };
            let mut position = ctx.entity()?.position() + velocity;

            let hit_side = bounce(&mut position.x, &mut velocity.x, bounds.x);
            let hit_top = bounce(&mut position.y, &mut velocity.y, bounds.y);
            if hit_side || hit_top {
                counters.wall_bounces.set(counters.wall_bounces.get() + 1);
            }
            ctx.entity_mut()?.set_position(position);

            if let Some(other) = ctx.collide_with_kind("Ball").entity {
                counters.ball_hits.set(counters.ball_hits.get() + 1);
                let away = position - ctx.get(other)?.position();
                let distance = away.length();
                if distance > f64::EPSILON {
                    velocity = away * (velocity.length() / distance);
                } else {
                    velocity = -velocity;
                }
            }

            if let Some(stored) = ctx.data_mut::<Velocity>() {
                stored.0 = velocity;
            }
            Ok(Step::Continue)
        })
    }
}

/// Reflects one axis off `0..limit`, keeping the ball inside.
fn bounce(position: &mut f64, velocity: &mut f64, limit: f64) -> bool {
    if *position < BALL_RADIUS {
        *position = BALL_RADIUS;
        *velocity = velocity.abs();
        true
    } else if *position > limit - BALL_RADIUS {
        *position = limit - BALL_RADIUS;
        *velocity = -velocity.abs();
        true
    } else {
        false
    }
}

struct Arena {
    settings: BouncingBalls,
    counters: Rc<BounceCounters>,
}

impl Blueprint for Arena {
    fn kind(&self) -> &'static str {
        "Arena"
    }

    fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
        let settings = self.settings;
        let counters = Rc::clone(&self.counters);
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let mut filled = false;
        routine(move |ctx| {
            if filled {
                return Ok(Step::Continue);
            }
            let (width, height) = ctx.scheduler().config().screen_resolution;
            let bounds = Vec2::new(f64::from(width), f64::from(height));
            for _ in 0..settings.balls {
                let start = Vec2::new(
                    rng.gen_range(BALL_RADIUS..bounds.x - BALL_RADIUS),
                    rng.gen_range(BALL_RADIUS..bounds.y - BALL_RADIUS),
                );
                let angle = rng.gen_range(0.0..360.0);
                let speed = rng.gen_range(1.0..=settings.max_speed.max(1.0));
                let velocity = myrmidon_shared::move_forward(Vec2::ZERO, speed, angle);
                ctx.spawn(Ball {
                    start,
                    velocity,
                    bounds,
                    counters: Rc::clone(&counters),
                })?;
            }
            debug!(balls = settings.balls, "Arena filled");
            filled = true;
            Ok(Step::Continue)
        })
    }
}

/// Spawns the arena and its balls. Returns the arena's id.
///
/// # Errors
/// `CapacityExceeded` if the balls do not fit in the scheduler.
pub fn spawn(
    scheduler: &mut Scheduler,
    settings: BouncingBalls,
    counters: &Rc<BounceCounters>,
) -> MyrmidonResult<EntityId> {
    scheduler.spawn(Arena {
        settings,
        counters: Rc::clone(counters),
    })
}

/// Runs the demo for `frames` frames.
///
/// # Errors
/// Any error raised by a step or backend.
pub fn run(scheduler: &mut Scheduler, settings: BouncingBalls, frames: u32) -> MyrmidonResult<BounceReport> {
    let counters = Rc::new(BounceCounters::default());
    spawn(scheduler, settings, &counters)?;
    scheduler.run_frames(frames)?;

    let report = BounceReport {
        frames: scheduler.frame(),
        live_balls: scheduler.entities_of_kind("Ball").len(),
        wall_bounces: counters.wall_bounces.get(),
        ball_hits: counters.ball_hits.get(),
    };
    info!(
        frames = report.frames,
        balls = report.live_balls,
        wall_bounces = report.wall_bounces,
        ball_hits = report.ball_hits,
        "Bouncing balls finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balls_are_children_of_arena() {
        let mut scheduler = Scheduler::headless();
        let counters = Rc::new(BounceCounters::default());
        let arena = spawn(&mut scheduler, BouncingBalls { balls: 5, ..Default::default() }, &counters).unwrap();

        let balls = scheduler.entities_of_kind("Ball");
        assert_eq!(balls.len(), 5);
        for ball in balls {
            assert_eq!(scheduler.entity(ball).unwrap().parent(), Some(arena));
        }
    }

    #[test]
    fn test_balls_stay_on_screen() {
        let mut scheduler = Scheduler::headless();
        run(&mut scheduler, BouncingBalls { balls: 20, ..Default::default() }, 300).unwrap();

        let (width, height) = scheduler.config().screen_resolution;
        for ball in scheduler.entities_of_kind("Ball") {
            let position = scheduler.entity(ball).unwrap().position();
            assert!(position.x >= BALL_RADIUS && position.x <= f64::from(width) - BALL_RADIUS);
            assert!(position.y >= BALL_RADIUS && position.y <= f64::from(height) - BALL_RADIUS);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let settings = BouncingBalls { balls: 12, ..Default::default() };
        let first = run(&mut Scheduler::headless(), settings, 200).unwrap();
        let second = run(&mut Scheduler::headless(), settings, 200).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.live_balls, 12);
        assert!(first.wall_bounces > 0);
    }

    #[test]
    fn test_overlapping_balls_push_apart() {
        let mut scheduler = Scheduler::headless();
        let counters = Rc::new(BounceCounters::default());
        let left = scheduler
            .spawn(Ball {
                start: Vec2::new(100.0, 100.0),
                velocity: Vec2::new(2.0, 0.0),
                bounds: Vec2::new(640.0, 480.0),
                counters: Rc::clone(&counters),
            })
            .unwrap();
        scheduler
            .spawn(Ball {
                start: Vec2::new(120.0, 100.0),
                velocity: Vec2::new(-2.0, 0.0),
                bounds: Vec2::new(640.0, 480.0),
                counters: Rc::clone(&counters),
            })
            .unwrap();
        scheduler.run_frame().unwrap();

        assert!(counters.ball_hits.get() > 0);
        let Velocity(velocity) = *scheduler.entity(left).unwrap().data::<Velocity>().unwrap();
        assert!(velocity.x < 0.0);
    }

    #[test]
    fn test_killing_arena_clears_balls() {
        let mut scheduler = Scheduler::headless();
        let counters = Rc::new(BounceCounters::default());
        spawn(&mut scheduler, BouncingBalls { balls: 8, ..Default::default() }, &counters).unwrap();
        scheduler.run_frames(2).unwrap();

        scheduler.signal("Arena", Signal::Kill, true).unwrap();
        scheduler.run_frame().unwrap();
        assert_eq!(scheduler.entity_count(), 0);
    }
}
