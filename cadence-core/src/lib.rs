//! Board-agnostic core logic for the activity recognition firmware
//!
//! This crate contains everything between the motion sensor and the
//! display that does not depend on specific hardware:
//!
//! - Sample and window types with a bounded, drain-to-reset window buffer
//! - Hardware abstraction traits (sample source, inference engine, presenter, clock)
//! - Periodic sampling scheduler with overrun accounting
//! - Single-slot window handoff between the sampling and inference activities
//! - Inference gate (input layout contract, arg-max label mapping)
//! - Pipeline counters and degraded-mode health monitoring
//! - Configuration types and the embedded `pipeline.toml` parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod inference;
pub mod sample;
pub mod scheduler;
pub mod stats;
pub mod traits;
pub mod window;

pub use config::{ConfigError, OverflowPolicy, PipelineConfig};
pub use health::{HealthMonitor, HealthStatus};
pub use inference::{InferenceGate, InferenceResult, Label, N_CLASSES};
pub use sample::{Channel, Sample, AXES};
pub use scheduler::{SamplingScheduler, ShutdownFlag, WindowHandoff};
pub use stats::{PipelineStats, StatsSnapshot};
pub use window::{Window, WindowBuffer, WindowError};
