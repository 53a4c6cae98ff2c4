//! Shared pipeline state
//!
//! Statics shared between the sampling, inference and presenter tasks. The
//! window handoff is built at startup because its overflow policy comes
//! from the configuration, so it lives in a `StaticCell` in `main`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use cadence_core::inference::Outcome;
use cadence_core::{PipelineStats, ShutdownFlag, WindowHandoff, AXES};

/// Samples per window (2 s at 50 Hz)
pub const WINDOW_SIZE: usize = 100;

/// Values in one model input tensor
pub const MODEL_INPUT: usize = WINDOW_SIZE * AXES;

/// Capacity for classification results awaiting the presenter
const OUTCOME_CHANNEL_SIZE: usize = 4;

/// Window handoff between the sampling and inference tasks
pub type Handoff = WindowHandoff<CriticalSectionRawMutex, WINDOW_SIZE>;

/// Pipeline counters, written by sampling and inference
pub static STATS: PipelineStats = PipelineStats::new();

/// Set once by the shutdown button
pub static SHUTDOWN: ShutdownFlag = ShutdownFlag::new();

/// Inference outcomes for the presenter
pub static OUTCOMES: Channel<CriticalSectionRawMutex, Outcome, OUTCOME_CHANNEL_SIZE> = Channel::new();

/// Inference task has drained the handoff and stopped
pub static INFERENCE_DONE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
