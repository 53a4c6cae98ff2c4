//! Periodic sampling scheduler
//!
//! One cycle: note the start time, read one sample, append it, hand off a
//! completed window, then sleep for whatever is left of the period.
//!
//! ```text
//!   t0 ── read ── append ── [drain + offer] ── now
//!   |<───────────── elapsed ──────────────>|<── period - elapsed ──>|
//! ```
//!
//! The sleep is computed from the measured elapsed time of the current
//! cycle. A cycle that runs past the period is counted as an overrun and
//! the next cycle starts at once; there is no catch-up burst.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use super::handoff::{Offer, WindowHandoff};
use super::shutdown::ShutdownFlag;
use crate::config::{ReadFailurePolicy, SamplingConfig};
use crate::sample::Sample;
use crate::stats::PipelineStats;
use crate::traits::{Clock, SampleSource, SensorError};
use crate::window::{WindowBuffer, WindowError};

/// Timing decision at the end of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pace {
    /// Sleep this many microseconds before the next cycle
    Sleep(u32),
    /// Cycle took at least one full period
    Overrun { elapsed_us: u64 },
}

/// Sleep (or overrun) for a cycle that started at `started_us`
pub fn pace(started_us: u64, now_us: u64, period_us: u32) -> Pace {
    let elapsed_us = now_us.saturating_sub(started_us);
    let period = u64::from(period_us);

    if elapsed_us < period {
        // Strictly less than the period, so it fits in u32
        Pace::Sleep((period - elapsed_us) as u32)
    } else {
        Pace::Overrun { elapsed_us }
    }
}

/// How the sample for a cycle was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Acquired {
    /// Fresh reading from the sensor
    Fresh,
    /// Read failed, previous sample repeated with this cycle's timestamp
    Repeated(SensorError),
    /// Read failed and nothing was appended
    Skipped(SensorError),
}

/// Summary of one scheduler cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub started_us: u64,
    pub elapsed_us: u64,
    pub acquired: Acquired,
    /// Set when this cycle completed a window
    pub offer: Option<Offer>,
    pub pace: Pace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// Append was attempted on a full buffer
    BufferContract(WindowError),
}

/// Fixed-rate sampler feeding a [`WindowHandoff`]
pub struct SamplingScheduler<const N: usize> {
    period_us: u32,
    read_failure: ReadFailurePolicy,
    buffer: WindowBuffer<N>,
    last: Option<Sample>,
}

impl<const N: usize> SamplingScheduler<N> {
    pub const fn new(config: &SamplingConfig) -> Self {
        Self {
            period_us: config.period_us,
            read_failure: config.read_failure,
            buffer: WindowBuffer::new(),
            last: None,
        }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Samples collected towards the next window
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Run one cycle, including its trailing sleep
    pub async fn step<S, C, D, M>(
        &mut self,
        source: &mut S,
        clock: &C,
        delay: &mut D,
        handoff: &WindowHandoff<M, N>,
        stats: &PipelineStats,
    ) -> Result<CycleReport, SchedulerError>
    where
        S: SampleSource,
        C: Clock,
        D: DelayNs,
        M: RawMutex,
    {
        let started_us = clock.now_us();
        stats.record_cycle();

        let (sample, acquired) = self.acquire(source, started_us, stats);

        let mut offer = None;
        if let Some(sample) = sample {
            match self.buffer.append(sample) {
                Ok(true) => {
                    let window = self.buffer.drain().map_err(SchedulerError::BufferContract)?;
                    stats.record_window();

                    let result = handoff.offer(window);
                    if result.is_overflow() {
                        stats.record_overflow();
                    }
                    offer = Some(result);
                }
                Ok(false) => {}
                Err(e) => {
                    debug_assert!(false, "window buffer appended past capacity");
                    return Err(SchedulerError::BufferContract(e));
                }
            }
        }

        let now_us = clock.now_us();
        let pace = pace(started_us, now_us, self.period_us);
        match pace {
            Pace::Sleep(us) => delay.delay_us(us).await,
            Pace::Overrun { .. } => stats.record_overrun(),
        }

        Ok(CycleReport {
            started_us,
            elapsed_us: now_us.saturating_sub(started_us),
            acquired,
            offer,
            pace,
        })
    }

    /// Run cycles until `shutdown` is requested
    ///
    /// On exit the partial window is discarded and the handoff is closed,
    /// which lets the consumer finish any pending window and stop. Returns
    /// the number of completed cycles.
    pub async fn run<S, C, D, M>(
        &mut self,
        source: &mut S,
        clock: &C,
        delay: &mut D,
        handoff: &WindowHandoff<M, N>,
        stats: &PipelineStats,
        shutdown: &ShutdownFlag,
    ) -> Result<u32, SchedulerError>
    where
        S: SampleSource,
        C: Clock,
        D: DelayNs,
        M: RawMutex,
    {
        let mut cycles = 0u32;

        let result = loop {
            if shutdown.is_requested() {
                break Ok(cycles);
            }
            if let Err(e) = self.step(source, clock, delay, handoff, stats).await {
                break Err(e);
            }
            cycles = cycles.wrapping_add(1);
        };

        self.buffer.discard();
        handoff.close();
        result
    }

    fn acquire<S: SampleSource>(
        &mut self,
        source: &mut S,
        started_us: u64,
        stats: &PipelineStats,
    ) -> (Option<Sample>, Acquired) {
        match source.read() {
            Ok(sample) => {
                self.last = Some(sample);
                (Some(sample), Acquired::Fresh)
            }
            Err(error) => {
                stats.record_sensor_error();
                match (self.read_failure, self.last) {
                    (ReadFailurePolicy::RepeatLast, Some(last)) => {
                        stats.record_repeated();
                        (Some(last.restamped(started_us)), Acquired::Repeated(error))
                    }
                    _ => {
                        stats.record_skipped();
                        (None, Acquired::Skipped(error))
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeClock, FakeDelay, FakeSource, PERIOD_US};
    use super::*;
    use crate::config::OverflowPolicy;
    use crate::window::Window;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;

    fn config(read_failure: ReadFailurePolicy) -> SamplingConfig {
        SamplingConfig {
            period_us: PERIOD_US,
            read_failure,
        }
    }

    #[test]
    fn test_pace_sleeps_remainder() {
        assert_eq!(pace(100, 100, PERIOD_US), Pace::Sleep(20_000));
        assert_eq!(pace(100, 5_100, PERIOD_US), Pace::Sleep(15_000));
        assert_eq!(pace(100, 20_099, PERIOD_US), Pace::Sleep(1));
    }

    #[test]
    fn test_pace_overrun_at_or_past_period() {
        assert_eq!(
            pace(0, 20_000, PERIOD_US),
            Pace::Overrun { elapsed_us: 20_000 }
        );
        assert_eq!(
            pace(0, 45_000, PERIOD_US),
            Pace::Overrun { elapsed_us: 45_000 }
        );
    }

    #[test]
    fn test_pace_clock_going_backwards_sleeps_full_period() {
        assert_eq!(pace(500, 100, PERIOD_US), Pace::Sleep(PERIOD_US));
    }

    #[test]
    fn test_step_sleeps_period_minus_work() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 3_000);
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let report = block_on(scheduler.step(&mut source, &clock, &mut delay, &handoff, &stats)).unwrap();

        assert_eq!(report.elapsed_us, 3_000);
        assert_eq!(report.pace, Pace::Sleep(17_000));
        assert_eq!(report.acquired, Acquired::Fresh);
        assert_eq!(report.offer, None);
        assert_eq!(&delay.sleeps[..], &[17_000]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_slow_cycle_is_overrun_without_sleep() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 25_000);
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        block_on(async {
            for _ in 0..3 {
                scheduler
                    .step(&mut source, &clock, &mut delay, &handoff, &stats)
                    .await
                    .unwrap();
            }
        });

        assert!(delay.sleeps.is_empty());
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cycles, 3);
        assert_eq!(snapshot.overruns, 3);
        // No catch-up: three cycles took exactly three reads' worth of time
        assert_eq!(clock.now_us(), 1_000 + 75_000);
    }

    #[test]
    fn test_cycle_starts_are_one_period_apart() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 7_500);
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let mut starts: heapless::Vec<u64, 8> = heapless::Vec::new();
        block_on(async {
            for _ in 0..6 {
                let report = scheduler
                    .step(&mut source, &clock, &mut delay, &handoff, &stats)
                    .await
                    .unwrap();
                let _ = starts.push(report.started_us);
            }
        });

        for pair in starts.windows(2) {
            assert_eq!(pair[1] - pair[0], u64::from(PERIOD_US));
        }
        assert_eq!(stats.snapshot().overruns, 0);
    }

    #[test]
    fn test_consecutive_windows_share_no_sample() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 1_000);
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let mut windows: heapless::Vec<Window<4>, 4> = heapless::Vec::new();
        block_on(async {
            for _ in 0..12 {
                let report = scheduler
                    .step(&mut source, &clock, &mut delay, &handoff, &stats)
                    .await
                    .unwrap();
                if report.offer.is_some() {
                    let in_flight = handoff.try_receive().unwrap();
                    let _ = windows.push(in_flight.window().clone());
                }
            }
        });

        assert_eq!(windows.len(), 3);
        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.seq(), i as u32);
            // Accel x carries the read counter, so samples are 4i..4i+3
            for (j, sample) in window.samples().iter().enumerate() {
                assert_eq!(sample.accel_g()[0], (i * 4 + j) as f32);
            }
        }
        for pair in windows.windows(2) {
            assert!(pair[0].end_us() < pair[1].start_us());
        }
    }

    #[test]
    fn test_busy_consumer_drops_newest_window() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 1_000);
        let handoff: WindowHandoff<NoopRawMutex, 2> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<2> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let mut offers: heapless::Vec<Offer, 4> = heapless::Vec::new();
        block_on(async {
            // Nobody receives, so the second window finds the slot occupied
            for _ in 0..4 {
                let report = scheduler
                    .step(&mut source, &clock, &mut delay, &handoff, &stats)
                    .await
                    .unwrap();
                if let Some(offer) = report.offer {
                    let _ = offers.push(offer);
                }
            }
        });

        assert_eq!(&offers[..], &[Offer::Accepted, Offer::Dropped { seq: 1 }]);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.windows, 2);
        assert_eq!(snapshot.overflows, 1);
        assert_eq!(handoff.try_receive().unwrap().window().seq(), 0);
    }

    #[test]
    fn test_read_failure_repeats_last_sample() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 1_000);
        source.fail_reads = &[1];
        let handoff: WindowHandoff<NoopRawMutex, 2> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<2> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let second = block_on(async {
            scheduler
                .step(&mut source, &clock, &mut delay, &handoff, &stats)
                .await
                .unwrap();
            scheduler
                .step(&mut source, &clock, &mut delay, &handoff, &stats)
                .await
                .unwrap()
        });

        assert_eq!(second.acquired, Acquired::Repeated(SensorError::Bus));
        let in_flight = handoff.try_receive().unwrap();
        let samples = in_flight.window().samples();
        assert_eq!(samples[1].accel_g(), samples[0].accel_g());
        assert_eq!(samples[1].timestamp_us(), second.started_us);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.sensor_errors, 1);
        assert_eq!(snapshot.repeated, 1);
    }

    #[test]
    fn test_read_failure_without_history_skips() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 1_000);
        source.fail_reads = &[0];
        let handoff: WindowHandoff<NoopRawMutex, 2> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<2> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let report = block_on(scheduler.step(&mut source, &clock, &mut delay, &handoff, &stats)).unwrap();

        assert_eq!(report.acquired, Acquired::Skipped(SensorError::Bus));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(stats.snapshot().skipped, 1);
        // Timing is unaffected by the failure
        assert_eq!(report.pace, Pace::Sleep(19_000));
    }

    #[test]
    fn test_skip_policy_never_repeats() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let mut source = FakeSource::new(&clock, 1_000);
        source.fail_reads = &[1, 2];
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::Skip));

        block_on(async {
            for _ in 0..4 {
                scheduler
                    .step(&mut source, &clock, &mut delay, &handoff, &stats)
                    .await
                    .unwrap();
            }
        });

        assert_eq!(scheduler.pending(), 2);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.skipped, 2);
        assert_eq!(snapshot.repeated, 0);
    }

    #[test]
    fn test_run_discards_partial_window_and_closes() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let shutdown = ShutdownFlag::new();
        let mut source = FakeSource::new(&clock, 1_000);
        source.stop_after = Some((6, &shutdown));
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let cycles = block_on(scheduler.run(
            &mut source,
            &clock,
            &mut delay,
            &handoff,
            &stats,
            &shutdown,
        ))
        .unwrap();

        assert_eq!(cycles, 6);
        assert_eq!(scheduler.pending(), 0);
        assert!(handoff.is_closed());
        // The completed window is still delivered after close
        assert_eq!(handoff.try_receive().map(|w| w.window().seq()), Some(0));
        assert!(handoff.try_receive().is_none());
    }

    #[test]
    fn test_shutdown_before_start_runs_no_cycle() {
        let clock = FakeClock::new();
        let mut delay = FakeDelay::new(&clock);
        let shutdown = ShutdownFlag::new();
        shutdown.request();
        let mut source = FakeSource::new(&clock, 1_000);
        let handoff: WindowHandoff<NoopRawMutex, 4> = WindowHandoff::new(OverflowPolicy::DropNewest);
        let stats = PipelineStats::new();
        let mut scheduler: SamplingScheduler<4> =
            SamplingScheduler::new(&config(ReadFailurePolicy::RepeatLast));

        let cycles = block_on(scheduler.run(
            &mut source,
            &clock,
            &mut delay,
            &handoff,
            &stats,
            &shutdown,
        ))
        .unwrap();

        assert_eq!(cycles, 0);
        assert_eq!(source.reads, 0);
        assert!(handoff.is_closed());
    }

    proptest! {
        #[test]
        fn prop_sleep_plus_elapsed_is_period(
            start in 0u64..1_000_000_000,
            work in 0u64..40_000,
            period in 1u32..100_000,
        ) {
            match pace(start, start + work, period) {
                Pace::Sleep(us) => {
                    prop_assert!(work < u64::from(period));
                    prop_assert_eq!(u64::from(us) + work, u64::from(period));
                }
                Pace::Overrun { elapsed_us } => {
                    prop_assert!(work >= u64::from(period));
                    prop_assert_eq!(elapsed_us, work);
                }
            }
        }
    }
}
