//! Degraded-mode detection
//!
//! The monitor is fed a [`StatsSnapshot`] once per observation interval
//! (the firmware uses one window's worth of cycles) and looks at the deltas.

use crate::stats::StatsSnapshot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default overrun share that counts as persistent, in permille
pub const DEFAULT_OVERRUN_PERMILLE: u16 = 100;
/// Default number of consecutive intervals with an overflow
pub const DEFAULT_OVERFLOW_STREAK: u8 = 3;
/// Default number of consecutive intervals with only engine failures
pub const DEFAULT_ENGINE_ERROR_STREAK: u8 = 3;

/// Thresholds for entering degraded mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HealthConfig {
    /// Overruns per thousand cycles at or above which timing is degraded
    pub overrun_permille: u16,
    /// Intervals in a row that lost a window
    pub overflow_streak: u8,
    /// Intervals in a row where every inference failed
    pub engine_error_streak: u8,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            overrun_permille: DEFAULT_OVERRUN_PERMILLE,
            overflow_streak: DEFAULT_OVERFLOW_STREAK,
            engine_error_streak: DEFAULT_ENGINE_ERROR_STREAK,
        }
    }
}

/// Why the pipeline is degraded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegradedReason {
    /// Every read in the interval failed
    SensorFault,
    /// Inference failed for several intervals in a row
    EngineFault,
    /// Windows were lost for several intervals in a row
    PersistentOverflow,
    /// Too many cycles ran past their period
    PersistentOverrun,
}

/// Pipeline health indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HealthStatus {
    #[default]
    Nominal,
    Degraded(DegradedReason),
}

impl HealthStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Degraded(_))
    }
}

/// Health monitor over successive counter snapshots
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    config: HealthConfig,
    last: StatsSnapshot,
    overflow_streak: u8,
    engine_streak: u8,
    status: HealthStatus,
}

impl HealthMonitor {
    /// Create a monitor with `baseline` as the first reference point
    pub fn new(config: HealthConfig, baseline: StatsSnapshot) -> Self {
        Self {
            config,
            last: baseline,
            overflow_streak: 0,
            engine_streak: 0,
            status: HealthStatus::Nominal,
        }
    }

    /// Feed the counters at the end of an interval
    ///
    /// Returns the status for that interval. Recovery is immediate: an
    /// interval without the fault clears it.
    pub fn observe(&mut self, now: StatsSnapshot) -> HealthStatus {
        let delta = now.since(&self.last);
        self.last = now;

        if delta.overflows > 0 {
            self.overflow_streak = self.overflow_streak.saturating_add(1);
        } else if delta.windows > 0 {
            self.overflow_streak = 0;
        }

        if delta.engine_errors > 0 && delta.classified == 0 {
            self.engine_streak = self.engine_streak.saturating_add(1);
        } else if delta.classified > 0 {
            self.engine_streak = 0;
        }

        self.status = self.check(&delta);
        self.status
    }

    /// Status from the last observation
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    fn check(&self, delta: &StatsSnapshot) -> HealthStatus {
        if delta.cycles > 0 && delta.sensor_errors >= delta.cycles {
            return HealthStatus::Degraded(DegradedReason::SensorFault);
        }

        if self.config.engine_error_streak > 0 && self.engine_streak >= self.config.engine_error_streak {
            return HealthStatus::Degraded(DegradedReason::EngineFault);
        }

        if self.config.overflow_streak > 0 && self.overflow_streak >= self.config.overflow_streak {
            return HealthStatus::Degraded(DegradedReason::PersistentOverflow);
        }

        if delta.cycles > 0 && self.config.overrun_permille > 0 {
            let share = u64::from(delta.overruns) * 1000;
            let limit = u64::from(delta.cycles) * u64::from(self.config.overrun_permille);
            if share >= limit {
                return HealthStatus::Degraded(DegradedReason::PersistentOverrun);
            }
        }

        HealthStatus::Nominal
    }
}
