//! Health monitoring
//!
//! Turns pipeline counters into a nominal/degraded indicator.

pub mod monitor;

pub use monitor::{DegradedReason, HealthConfig, HealthMonitor, HealthStatus};
