//! # Bouncing Balls
//!
//! Runs the bouncing balls demo headless and logs a frame summary.
//!
//! ## Usage
//!
//! ```bash
//! bouncing_balls [BALLS] [FRAMES] [CONFIG.toml]
//! RUST_LOG=debug bouncing_balls 200 600
//! ```

use std::process::ExitCode;

use tracing::{error, info};

use myrmidon::demos::bouncing_balls::{self, BouncingBalls};
use myrmidon::prelude::*;
use myrmidon::myrmidon_core::BackendRegistry;

fn main() -> ExitCode {
    myrmidon::init_tracing();

    let mut args = std::env::args().skip(1);
    let balls = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(32);
    let frames = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(300);
    let config_path = args.next();

    match run(balls, frames, config_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Bouncing balls failed");
            ExitCode::FAILURE
        }
    }
}

fn run(balls: usize, frames: u32, config_path: Option<&str>) -> MyrmidonResult<()> {
    let config = match config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::headless(),
    };
    info!(balls, frames, resolution = ?config.screen_resolution, "Starting bouncing balls");

    let mut scheduler = Scheduler::from_config(config, &BackendRegistry::with_builtins())?;
    let settings = BouncingBalls {
        balls,
        ..BouncingBalls::default()
    };
    bouncing_balls::run(&mut scheduler, settings, frames)?;
    scheduler.stats().log_summary();
    Ok(())
}
