//! Sample source trait

use crate::sample::Sample;

/// Errors that can occur while acquiring a sample
///
/// All variants are transient from the scheduler's point of view: the cycle
/// is repeated or skipped and sampling continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed (NACK, arbitration loss, timeout)
    Bus,
    /// Device reported no new data for this period
    NotReady,
    /// Device identity check failed
    WrongDevice,
}

/// Source of combined accelerometer + gyroscope samples
///
/// One call produces one sample. Expected latency is well below the
/// sampling period.
pub trait SampleSource {
    /// Acquire one sample
    fn read(&mut self) -> Result<Sample, SensorError>;
}
