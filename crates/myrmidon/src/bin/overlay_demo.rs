//! # Overlay Demo
//!
//! Fades a title screen in, shows a menu, fades it out.
//!
//! ```bash
//! overlay_demo [FADE_TICKS] [MENU_FRAMES]
//! ```

use std::process::ExitCode;

use tracing::{error, warn};

use myrmidon::demos::overlay_fade::{self, OverlayDemo};
use myrmidon::prelude::*;

fn main() -> ExitCode {
    myrmidon::init_tracing();

    let defaults = OverlayDemo::default();
    let mut args = std::env::args().skip(1);
    let settings = OverlayDemo {
        fade_ticks: args.next().and_then(|arg| arg.parse().ok()).unwrap_or(defaults.fade_ticks),
        menu_frames: args.next().and_then(|arg| arg.parse().ok()).unwrap_or(defaults.menu_frames),
    };
    let max_frames = settings.fade_ticks.saturating_mul(2).saturating_add(settings.menu_frames).saturating_add(10);

    let mut scheduler = Scheduler::headless();
    match overlay_fade::run(&mut scheduler, settings, max_frames) {
        Ok(report) => {
            if !report.finished {
                warn!(max_frames, "Overlay demo stopped before both fades completed");
            }
            scheduler.stats().log_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Overlay demo failed");
            ExitCode::FAILURE
        }
    }
}
