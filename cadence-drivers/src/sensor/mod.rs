//! Motion sensor drivers
//!
//! Both parts sit on the same I2C bus. The drivers hold only their address
//! and configuration; the bus is passed in per call so one bus can serve
//! both without a sharing layer.

pub mod fxas21002;
pub mod fxos8700;
pub mod motion;

pub use fxas21002::{Fxas21002, GyroRange};
pub use fxos8700::{AccelRange, Fxos8700};
pub use motion::MotionSensor;

use cadence_core::traits::SensorError;
use embedded_hal::i2c::I2c;

/// Driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transaction failed
    I2c(E),
    /// WHO_AM_I returned an unexpected value
    InvalidDevice(u8),
}

impl<E> From<Error<E>> for SensorError {
    fn from(e: Error<E>) -> Self {
        match e {
            Error::I2c(_) => SensorError::Bus,
            Error::InvalidDevice(_) => SensorError::WrongDevice,
        }
    }
}

fn read_reg<I: I2c>(i2c: &mut I, address: u8, reg: u8) -> Result<u8, Error<I::Error>> {
    let mut buf = [0u8];
    i2c.write_read(address, &[reg], &mut buf).map_err(Error::I2c)?;
    Ok(buf[0])
}

fn write_reg<I: I2c>(i2c: &mut I, address: u8, reg: u8, value: u8) -> Result<(), Error<I::Error>> {
    i2c.write(address, &[reg, value]).map_err(Error::I2c)
}

/// Read three consecutive big-endian 16-bit axis registers
fn read_axes<I: I2c>(i2c: &mut I, address: u8, reg: u8) -> Result<[i16; 3], Error<I::Error>> {
    let mut buf = [0u8; 6];
    i2c.write_read(address, &[reg], &mut buf).map_err(Error::I2c)?;
    Ok([
        i16::from_be_bytes([buf[0], buf[1]]),
        i16::from_be_bytes([buf[2], buf[3]]),
        i16::from_be_bytes([buf[4], buf[5]]),
    ])
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory I2C bus with auto-incrementing register files

    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

    pub struct Device {
        pub address: u8,
        pub regs: [u8; 128],
    }

    pub struct FakeBus {
        pub devices: heapless::Vec<Device, 2>,
        pub writes: heapless::Vec<(u8, u8, u8), 32>,
        pub fail: bool,
        pointer: u8,
    }

    impl FakeBus {
        pub fn new() -> Self {
            Self {
                devices: heapless::Vec::new(),
                writes: heapless::Vec::new(),
                fail: false,
                pointer: 0,
            }
        }

        pub fn with_device(mut self, address: u8, who_am_i_reg: u8, who_am_i: u8) -> Self {
            let mut regs = [0u8; 128];
            regs[who_am_i_reg as usize] = who_am_i;
            let _ = self.devices.push(Device { address, regs });
            self
        }

        pub fn regs(&mut self, address: u8) -> &mut [u8; 128] {
            let device = self
                .devices
                .iter_mut()
                .find(|d| d.address == address)
                .expect("no such device");
            &mut device.regs
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::ArbitrationLoss);
            }
            let index = self
                .devices
                .iter()
                .position(|d| d.address == address)
                .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;

            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        let Some((&reg, data)) = bytes.split_first() else {
                            continue;
                        };
                        self.pointer = reg;
                        for &value in data {
                            let _ = self.writes.push((address, self.pointer, value));
                            self.devices[index].regs[self.pointer as usize] = value;
                            self.pointer = self.pointer.wrapping_add(1) % 128;
                        }
                    }
                    Operation::Read(buf) => {
                        for byte in buf.iter_mut() {
                            *byte = self.devices[index].regs[self.pointer as usize];
                            self.pointer = self.pointer.wrapping_add(1) % 128;
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
