//! Motion samples
//!
//! A sample is one combined accelerometer + gyroscope reading taken in a
//! single sampling cycle. Samples are plain `Copy` values and cannot be
//! modified after construction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of channels per sample (3 accelerometer + 3 gyroscope axes)
pub const AXES: usize = 6;

/// One channel of a motion sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    /// Acceleration along X (g)
    AccelX,
    /// Acceleration along Y (g)
    AccelY,
    /// Acceleration along Z (g)
    AccelZ,
    /// Angular rate around X (dps)
    GyroX,
    /// Angular rate around Y (dps)
    GyroY,
    /// Angular rate around Z (dps)
    GyroZ,
}

impl Channel {
    /// All channels in storage order
    pub const ALL: [Channel; AXES] = [
        Channel::AccelX,
        Channel::AccelY,
        Channel::AccelZ,
        Channel::GyroX,
        Channel::GyroY,
        Channel::GyroZ,
    ];

    /// Position of this channel in storage order
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single timestamped 6-axis reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    accel_g: [f32; 3],
    gyro_dps: [f32; 3],
    timestamp_us: u64,
}

impl Sample {
    /// All-zero sample at time zero
    pub const ZERO: Sample = Sample::new([0.0; 3], [0.0; 3], 0);

    /// Create a sample from accelerometer (g), gyroscope (dps) and a
    /// monotonic timestamp in microseconds
    pub const fn new(accel_g: [f32; 3], gyro_dps: [f32; 3], timestamp_us: u64) -> Self {
        Self {
            accel_g,
            gyro_dps,
            timestamp_us,
        }
    }

    /// Acceleration in g (x, y, z)
    pub const fn accel_g(&self) -> [f32; 3] {
        self.accel_g
    }

    /// Angular rate in degrees per second (x, y, z)
    pub const fn gyro_dps(&self) -> [f32; 3] {
        self.gyro_dps
    }

    /// Monotonic acquisition time in microseconds
    pub const fn timestamp_us(&self) -> u64 {
        self.timestamp_us
    }

    /// Value of a single channel
    pub const fn channel(&self, channel: Channel) -> f32 {
        match channel {
            Channel::AccelX => self.accel_g[0],
            Channel::AccelY => self.accel_g[1],
            Channel::AccelZ => self.accel_g[2],
            Channel::GyroX => self.gyro_dps[0],
            Channel::GyroY => self.gyro_dps[1],
            Channel::GyroZ => self.gyro_dps[2],
        }
    }

    /// Copy of this sample with a new timestamp
    ///
    /// Used when a failed read is replaced by the previous values.
    pub const fn restamped(&self, timestamp_us: u64) -> Self {
        Self {
            accel_g: self.accel_g,
            gyro_dps: self.gyro_dps,
            timestamp_us,
        }
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order() {
        let sample = Sample::new([1.0, 2.0, 3.0], [4.0, 5.0, 6.0], 42);
        let values: [f32; AXES] = Channel::ALL.map(|ch| sample.channel(ch));
        assert_eq!(values, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        for (i, ch) in Channel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
    }

    #[test]
    fn test_restamped_keeps_values() {
        let sample = Sample::new([0.1, 0.2, 1.0], [10.0, -5.0, 0.5], 1_000);
        let repeated = sample.restamped(21_000);

        assert_eq!(repeated.accel_g(), sample.accel_g());
        assert_eq!(repeated.gyro_dps(), sample.gyro_dps());
        assert_eq!(repeated.timestamp_us(), 21_000);
        assert_eq!(sample.timestamp_us(), 1_000);
    }
}
