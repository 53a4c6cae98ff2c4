//! Sampling activity and its link to the inference activity

mod handoff;
mod sampler;
mod shutdown;

pub use handoff::{InFlight, Offer, WindowHandoff};
pub use sampler::{pace, Acquired, CycleReport, Pace, SamplingScheduler, SchedulerError};
pub use shutdown::ShutdownFlag;

#[cfg(test)]
pub(crate) use sampler::fakes;
