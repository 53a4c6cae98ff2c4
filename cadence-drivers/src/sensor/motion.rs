//! Combined accelerometer + gyroscope sample source

use cadence_core::traits::{Clock, SampleSource, SensorError};
use cadence_core::Sample;
use embedded_hal::i2c::I2c;

use super::{Error, Fxas21002, Fxos8700};

/// Accelerometer and gyroscope on one bus, read as one [`Sample`]
///
/// The accelerometer is read first. The sample is stamped when the
/// gyroscope read completes.
pub struct MotionSensor<I2C, C> {
    i2c: I2C,
    accel: Fxos8700,
    gyro: Fxas21002,
    clock: C,
}

impl<I2C: I2c, C: Clock> MotionSensor<I2C, C> {
    /// Both parts at their default addresses and ranges
    pub fn new(i2c: I2C, clock: C) -> Self {
        Self::with_devices(i2c, Fxos8700::default(), Fxas21002::default(), clock)
    }

    pub fn with_devices(i2c: I2C, accel: Fxos8700, gyro: Fxas21002, clock: C) -> Self {
        Self {
            i2c,
            accel,
            gyro,
            clock,
        }
    }

    /// Identify and configure both parts
    ///
    /// An error here is an unrecoverable hardware fault.
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.accel.init(&mut self.i2c)?;
        self.gyro.init(&mut self.i2c)
    }

    /// Give back the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c, C: Clock> SampleSource for MotionSensor<I2C, C> {
    fn read(&mut self) -> Result<Sample, SensorError> {
        let accel = self.accel.read_g(&mut self.i2c)?;
        let gyro = self.gyro.read_dps(&mut self.i2c)?;
        Ok(Sample::new(accel, gyro, self.clock.now_us()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::fake::FakeBus;
    use crate::sensor::{fxas21002, fxos8700};
    use core::cell::Cell;

    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        fn now_us(&self) -> u64 {
            let now = self.0.get();
            self.0.set(now + 20_000);
            now
        }
    }

    fn bus() -> FakeBus {
        FakeBus::new()
            .with_device(fxos8700::DEFAULT_ADDRESS, 0x0D, fxos8700::DEVICE_ID)
            .with_device(fxas21002::DEFAULT_ADDRESS, 0x0C, fxas21002::DEVICE_ID)
    }

    #[test]
    fn test_init_and_read() {
        let mut i2c = bus();
        let x = (4096i16 << 2).to_be_bytes();
        i2c.regs(fxos8700::DEFAULT_ADDRESS)[1..3].copy_from_slice(&x);
        let gz = 160i16.to_be_bytes();
        i2c.regs(fxas21002::DEFAULT_ADDRESS)[5..7].copy_from_slice(&gz);

        let mut sensor = MotionSensor::new(i2c, StepClock(Cell::new(40_000)));
        sensor.init().unwrap();

        let first = sensor.read().unwrap();
        assert_eq!(first.accel_g(), [1.0, 0.0, 0.0]);
        assert_eq!(first.gyro_dps(), [0.0, 0.0, 10.0]);
        assert_eq!(first.timestamp_us(), 40_000);

        let second = sensor.read().unwrap();
        assert_eq!(second.timestamp_us(), 60_000);
    }

    #[test]
    fn test_missing_gyro_fails_init() {
        let i2c = FakeBus::new().with_device(fxos8700::DEFAULT_ADDRESS, 0x0D, fxos8700::DEVICE_ID);
        let mut sensor = MotionSensor::new(i2c, StepClock(Cell::new(0)));
        assert!(matches!(sensor.init(), Err(Error::I2c(_))));
    }

    #[test]
    fn test_bus_fault_maps_to_sensor_error() {
        let mut sensor = MotionSensor::new(bus(), StepClock(Cell::new(0)));
        sensor.init().unwrap();

        let mut i2c = sensor.release();
        i2c.fail = true;
        let mut sensor = MotionSensor::new(i2c, StepClock(Cell::new(0)));
        assert_eq!(sensor.read(), Err(SensorError::Bus));
    }
}
