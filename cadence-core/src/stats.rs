//! Pipeline counters
//!
//! Written by the sampling and inference activities, read by anyone. All
//! counters are monotonic and wrap on overflow; compare snapshots with
//! [`StatsSnapshot::since`] rather than subtracting by hand.

use portable_atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shared event counters
pub struct PipelineStats {
    cycles: AtomicU32,
    overruns: AtomicU32,
    sensor_errors: AtomicU32,
    repeated: AtomicU32,
    skipped: AtomicU32,
    windows: AtomicU32,
    overflows: AtomicU32,
    classified: AtomicU32,
    engine_errors: AtomicU32,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatsSnapshot {
    /// Sampling cycles started
    pub cycles: u32,
    /// Cycles that took a full period or longer
    pub overruns: u32,
    /// Failed sensor reads
    pub sensor_errors: u32,
    /// Failed reads covered by repeating the previous sample
    pub repeated: u32,
    /// Failed reads that appended nothing
    pub skipped: u32,
    /// Windows completed by the sampler
    pub windows: u32,
    /// Windows lost because the consumer was busy
    pub overflows: u32,
    /// Windows classified
    pub classified: u32,
    /// Windows discarded after an engine error
    pub engine_errors: u32,
}

impl StatsSnapshot {
    /// Counter deltas from `earlier` to `self`
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.wrapping_sub(earlier.cycles),
            overruns: self.overruns.wrapping_sub(earlier.overruns),
            sensor_errors: self.sensor_errors.wrapping_sub(earlier.sensor_errors),
            repeated: self.repeated.wrapping_sub(earlier.repeated),
            skipped: self.skipped.wrapping_sub(earlier.skipped),
            windows: self.windows.wrapping_sub(earlier.windows),
            overflows: self.overflows.wrapping_sub(earlier.overflows),
            classified: self.classified.wrapping_sub(earlier.classified),
            engine_errors: self.engine_errors.wrapping_sub(earlier.engine_errors),
        }
    }
}

fn bump(counter: &AtomicU32) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            cycles: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            sensor_errors: AtomicU32::new(0),
            repeated: AtomicU32::new(0),
            skipped: AtomicU32::new(0),
            windows: AtomicU32::new(0),
            overflows: AtomicU32::new(0),
            classified: AtomicU32::new(0),
            engine_errors: AtomicU32::new(0),
        }
    }

    pub fn record_cycle(&self) {
        bump(&self.cycles);
    }

    pub fn record_overrun(&self) {
        bump(&self.overruns);
    }

    pub fn record_sensor_error(&self) {
        bump(&self.sensor_errors);
    }

    pub fn record_repeated(&self) {
        bump(&self.repeated);
    }

    pub fn record_skipped(&self) {
        bump(&self.skipped);
    }

    pub fn record_window(&self) {
        bump(&self.windows);
    }

    pub fn record_overflow(&self) {
        bump(&self.overflows);
    }

    pub fn record_classified(&self) {
        bump(&self.classified);
    }

    pub fn record_engine_error(&self) {
        bump(&self.engine_errors);
    }

    /// Copy all counters
    ///
    /// Counters are read one by one, so a snapshot taken while the
    /// activities run may be off by one between fields.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            sensor_errors: self.sensor_errors.load(Ordering::Relaxed),
            repeated: self.repeated.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            windows: self.windows.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            classified: self.classified.load(Ordering::Relaxed),
            engine_errors: self.engine_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(PipelineStats::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_record_and_delta() {
        let stats = PipelineStats::new();
        stats.record_cycle();
        stats.record_overrun();
        let before = stats.snapshot();

        stats.record_cycle();
        stats.record_cycle();
        stats.record_window();
        stats.record_overflow();

        let delta = stats.snapshot().since(&before);
        assert_eq!(delta.cycles, 2);
        assert_eq!(delta.overruns, 0);
        assert_eq!(delta.windows, 1);
        assert_eq!(delta.overflows, 1);
    }

    #[test]
    fn test_delta_across_wrap() {
        let earlier = StatsSnapshot {
            cycles: u32::MAX - 1,
            ..StatsSnapshot::default()
        };
        let later = StatsSnapshot {
            cycles: 3,
            ..StatsSnapshot::default()
        };
        assert_eq!(later.since(&earlier).cycles, 5);
    }
}
