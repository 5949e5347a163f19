//! # Frame Statistics
//!
//! Per-frame timings recorded by the scheduler and a running summary.

use tracing::info;

/// Timings for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Input through end of the logic pass, in microseconds.
    pub logic_us: u64,
    /// Purging destroyed entities, in microseconds.
    pub removal_us: u64,
    /// Pre-render, draw and post-render hooks, in microseconds.
    pub render_us: u64,
    /// Everything except clock pacing, in microseconds.
    pub total_us: u64,
    /// Entities whose state advanced.
    pub entities_stepped: u32,
    /// Live entities after the purge.
    pub live_entities: u32,
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Frame budget in microseconds.
    pub budget_us: u64,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of logic times.
    pub logic_us_sum: u64,
    /// Sum of removal times.
    pub removal_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator for a given frame rate.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self {
            budget_us: 1_000_000 / u64::from(target_fps.max(1)),
            frames_recorded: 0,
            total_us_sum: 0,
            logic_us_sum: 0,
            removal_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.logic_us_sum += stats.logic_us;
        self.removal_us_sum += stats.removal_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if stats.total_us > self.budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS the work alone would allow.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn log_summary(&self) {
        if self.frames_recorded == 0 {
            info!("No frames recorded");
            return;
        }
        let frames = self.frames_recorded as f64;
        info!(
            frames = self.frames_recorded,
            avg_ms = format_args!("{:.3}", self.avg_frame_ms()),
            min_ms = format_args!("{:.3}", self.min_frame_us as f64 / 1000.0),
            max_ms = format_args!("{:.3}", self.max_frame_us as f64 / 1000.0),
            over_budget = self.frames_over_budget,
            "Frame statistics"
        );
        info!(
            logic_ms = format_args!("{:.3}", self.logic_us_sum as f64 / frames / 1000.0),
            removal_ms = format_args!("{:.3}", self.removal_us_sum as f64 / frames / 1000.0),
            render_ms = format_args!("{:.3}", self.render_us_sum as f64 / frames / 1000.0),
            "Frame breakdown"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(myrmidon_shared::DEFAULT_TARGET_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(total_us: u64) -> FrameStats {
        FrameStats {
            total_us,
            logic_us: total_us / 2,
            ..FrameStats::default()
        }
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = FrameStatsAccumulator::new(30);
        assert!(acc.avg_frame_ms().abs() < f64::EPSILON);
        assert!(acc.avg_fps().abs() < f64::EPSILON);
        assert!(acc.over_budget_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_and_averages() {
        let mut acc = FrameStatsAccumulator::new(100);
        acc.record(frame(5_000));
        acc.record(frame(15_000));

        assert_eq!(acc.frames_recorded, 2);
        assert_eq!(acc.min_frame_us, 5_000);
        assert_eq!(acc.max_frame_us, 15_000);
        assert!((acc.avg_frame_ms() - 10.0).abs() < 1e-9);
        assert!((acc.avg_fps() - 100.0).abs() < 1e-9);
        assert_eq!(acc.frames_over_budget, 1);
        assert!((acc.over_budget_ratio() - 0.5).abs() < 1e-9);
    }
}
